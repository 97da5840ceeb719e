//! In-Memory Session Manager Implementation

use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;

use crate::application::ports::{
    BookSession, GenerationStatistics, SessionError, SessionManagerPort, SessionStatus,
};
use crate::domain::book::{Book, SectionPath};

/// 内存会话管理器
pub struct InMemorySessionManager {
    sessions: DashMap<String, BookSession>,
}

impl InMemorySessionManager {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn with_session<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut BookSession) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let mut session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        session.last_activity = Utc::now();
        f(&mut session)
    }
}

impl Default for InMemorySessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionManagerPort for InMemorySessionManager {
    fn create(&self, session: BookSession) -> Result<String, SessionError> {
        let session_id = session.id.clone();
        if self.sessions.contains_key(&session_id) {
            return Err(SessionError::AlreadyExists(session_id));
        }
        self.sessions.insert(session_id.clone(), session);
        tracing::info!(session_id = %session_id, "Session created");
        Ok(session_id)
    }

    fn get(&self, id: &str) -> Result<BookSession, SessionError> {
        self.sessions
            .get(id)
            .map(|s| s.clone())
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    fn begin_generation(&self, id: &str) -> Result<(), SessionError> {
        // get_mut 持有分片写锁，检查与置位是原子的
        self.with_session(id, |session| {
            if session.status == SessionStatus::Generating {
                return Err(SessionError::GenerationInProgress(id.to_string()));
            }
            session.status = SessionStatus::Generating;
            session.last_error = None;
            tracing::debug!(session_id = %id, "Generation started");
            Ok(())
        })
    }

    fn complete_generation(
        &self,
        id: &str,
        book: Book,
        statistics: GenerationStatistics,
    ) -> Result<(), SessionError> {
        self.with_session(id, |session| {
            session.status = SessionStatus::Ready;
            session.book = Some(book);
            session.statistics = Some(statistics);
            session.last_error = None;
            tracing::debug!(session_id = %id, "Book committed to session");
            Ok(())
        })
    }

    fn fail_generation(&self, id: &str, error: String) -> Result<(), SessionError> {
        self.with_session(id, |session| {
            session.status = SessionStatus::Failed;
            session.last_error = Some(error);
            Ok(())
        })
    }

    fn update_section(
        &self,
        id: &str,
        path: &SectionPath,
        content: String,
    ) -> Result<(), SessionError> {
        self.with_session(id, |session| {
            let book = session
                .book
                .as_mut()
                .ok_or_else(|| SessionError::NoBook(id.to_string()))?;
            book.update_content(path, content)?;
            tracing::debug!(session_id = %id, path = %path, "Section content updated");
            Ok(())
        })
    }

    fn reset(&self, id: &str) -> Result<(), SessionError> {
        self.with_session(id, |session| {
            if session.status == SessionStatus::Generating {
                return Err(SessionError::GenerationInProgress(id.to_string()));
            }
            session.status = SessionStatus::Idle;
            session.book = None;
            session.statistics = None;
            session.last_error = None;
            tracing::debug!(session_id = %id, "Session reset");
            Ok(())
        })
    }

    fn is_valid(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    fn close(&self, id: &str) -> Result<(), SessionError> {
        self.sessions
            .remove(id)
            .map(|_| {
                tracing::info!(session_id = %id, "Session closed");
            })
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    fn touch(&self, id: &str) {
        if let Some(mut session) = self.sessions.get_mut(id) {
            session.last_activity = Utc::now();
        }
    }

    fn get_expired_sessions(&self, idle_timeout_secs: u64) -> Vec<String> {
        let now = Utc::now();
        let timeout = chrono::Duration::seconds(idle_timeout_secs as i64);

        self.sessions
            .iter()
            .filter(|entry| entry.status != SessionStatus::Generating)
            .filter(|entry| now - entry.last_activity > timeout)
            .map(|entry| entry.key().clone())
            .collect()
    }

    fn list_all(&self) -> Vec<String> {
        self.sessions.iter().map(|e| e.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::book::{BookTitle, Outline, OutlineLimits};

    fn book(title: &str) -> Book {
        let outline =
            Outline::parse(r#"{"One": "first", "Two": "second"}"#, &OutlineLimits::default())
                .unwrap();
        Book::new(BookTitle::new(title).unwrap(), outline)
    }

    #[test]
    fn test_session_lifecycle() {
        let manager = InMemorySessionManager::new();
        let session_id = manager.create(BookSession::new()).unwrap();

        assert!(manager.is_valid(&session_id));
        assert_eq!(manager.get(&session_id).unwrap().status, SessionStatus::Idle);
        assert_eq!(manager.list_all(), vec![session_id.clone()]);

        manager.close(&session_id).unwrap();
        assert!(!manager.is_valid(&session_id));
        assert!(matches!(
            manager.close(&session_id),
            Err(SessionError::NotFound(_))
        ));
    }

    #[test]
    fn test_generation_is_exclusive() {
        let manager = InMemorySessionManager::new();
        let id = manager.create(BookSession::new()).unwrap();

        manager.begin_generation(&id).unwrap();
        assert!(matches!(
            manager.begin_generation(&id),
            Err(SessionError::GenerationInProgress(_))
        ));
        assert!(matches!(
            manager.reset(&id),
            Err(SessionError::GenerationInProgress(_))
        ));

        manager
            .complete_generation(&id, book("First"), GenerationStatistics::default())
            .unwrap();
        let session = manager.get(&id).unwrap();
        assert_eq!(session.status, SessionStatus::Ready);
        assert!(session.book.is_some());

        manager.begin_generation(&id).unwrap();
    }

    #[test]
    fn test_failure_keeps_previous_book() {
        let manager = InMemorySessionManager::new();
        let id = manager.create(BookSession::new()).unwrap();

        manager.begin_generation(&id).unwrap();
        manager
            .complete_generation(&id, book("Kept"), GenerationStatistics::default())
            .unwrap();

        manager.begin_generation(&id).unwrap();
        manager.fail_generation(&id, "boom".to_string()).unwrap();

        let session = manager.get(&id).unwrap();
        assert_eq!(session.status, SessionStatus::Failed);
        assert_eq!(session.last_error.as_deref(), Some("boom"));
        assert_eq!(session.book.unwrap().title().as_str(), "Kept");
    }

    #[test]
    fn test_update_section() {
        let manager = InMemorySessionManager::new();
        let id = manager.create(BookSession::new()).unwrap();
        let path = SectionPath::root("Two");

        assert!(matches!(
            manager.update_section(&id, &path, "x".into()),
            Err(SessionError::NoBook(_))
        ));

        manager
            .complete_generation(&id, book("Edited"), GenerationStatistics::default())
            .unwrap();
        manager
            .update_section(&id, &path, "new text".into())
            .unwrap();
        assert!(matches!(
            manager.update_section(&id, &SectionPath::root("Nine"), "x".into()),
            Err(SessionError::Book(_))
        ));

        let book = manager.get(&id).unwrap().book.unwrap();
        assert_eq!(book.section(&path).unwrap().content(), Some("new text"));
        assert_eq!(
            book.section(&SectionPath::root("One")).unwrap().content(),
            None
        );
    }

    #[test]
    fn test_reset_clears_book() {
        let manager = InMemorySessionManager::new();
        let id = manager.create(BookSession::new()).unwrap();
        manager
            .complete_generation(&id, book("Gone"), GenerationStatistics::default())
            .unwrap();

        manager.reset(&id).unwrap();
        let session = manager.get(&id).unwrap();
        assert_eq!(session.status, SessionStatus::Idle);
        assert!(session.book.is_none());
        assert!(session.statistics.is_none());
    }

    #[test]
    fn test_expired_sessions_skip_generating() {
        let manager = InMemorySessionManager::new();
        let idle = manager.create(BookSession::new()).unwrap();
        let busy = manager.create(BookSession::new()).unwrap();

        for id in [&idle, &busy] {
            manager.sessions.get_mut(id.as_str()).unwrap().last_activity =
                Utc::now() - chrono::Duration::seconds(600);
        }
        manager.sessions.get_mut(busy.as_str()).unwrap().status = SessionStatus::Generating;

        assert_eq!(manager.get_expired_sessions(60), vec![idle]);
    }
}
