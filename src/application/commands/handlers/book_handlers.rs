//! Book Command Handlers

use std::sync::Arc;

use crate::application::commands::book_commands::*;
use crate::application::error::ApplicationError;
use crate::application::generation::{generate_section, generate_structure, generate_title};
use crate::application::ports::{
    BookExporterPort, ExportedFile, GenerationStatistics, InferenceError, InferencePort,
    SessionError, SessionManagerPort,
};
use crate::domain::book::{Book, BookError, BookTitle, Outline, OutlineLimits, SectionPath};
use crate::infrastructure::events::{EventPublisher, GenerationEvent};

/// GenerateBook Handler - 书名 → 结构 → 逐章节正文
///
/// 书在本地构建，全部叶子章节写完后才提交到会话；
/// 任一步失败则放弃本次结果，会话中已有的书保持不变。
/// 流程在独立任务中运行，请求被丢弃（客户端断开）时仍会执行到结束。
#[derive(Clone)]
pub struct GenerateBookHandler {
    inference: Arc<dyn InferencePort>,
    session_manager: Arc<dyn SessionManagerPort>,
    event_publisher: Arc<EventPublisher>,
    limits: OutlineLimits,
}

impl GenerateBookHandler {
    pub fn new(
        inference: Arc<dyn InferencePort>,
        session_manager: Arc<dyn SessionManagerPort>,
        event_publisher: Arc<EventPublisher>,
        limits: OutlineLimits,
    ) -> Self {
        Self {
            inference,
            session_manager,
            event_publisher,
            limits,
        }
    }

    pub async fn handle(
        &self,
        cmd: GenerateBookCommand,
    ) -> Result<GenerateBookResponse, ApplicationError> {
        validate(&cmd)?;

        self.session_manager.begin_generation(&cmd.session_id)?;
        self.event_publisher.publish(
            &cmd.session_id,
            GenerationEvent::GenerationStarted {
                session_id: cmd.session_id.clone(),
            },
        );

        tracing::info!(
            session_id = %cmd.session_id,
            title_model = %cmd.title_model,
            structure_model = %cmd.structure_model,
            content_model = %cmd.content_model,
            "Book generation started"
        );

        let session_id = cmd.session_id.clone();
        let worker = self.clone();
        match tokio::spawn(async move { worker.finish(cmd).await }).await {
            Ok(result) => result,
            Err(e) => {
                let message = format!("Generation task failed: {}", e);
                tracing::error!(session_id = %session_id, error = %e, "Generation task aborted");
                if let Err(se) = self.session_manager.fail_generation(&session_id, message.clone()) {
                    tracing::debug!(
                        session_id = %session_id,
                        error = %se,
                        "Failed to record generation failure"
                    );
                }
                self.event_publisher.publish(
                    &session_id,
                    GenerationEvent::GenerationFailed {
                        error: message.clone(),
                    },
                );
                Err(ApplicationError::internal(message))
            }
        }
    }

    /// 执行生成并把结果提交到会话（成功）或记录失败
    async fn finish(
        &self,
        cmd: GenerateBookCommand,
    ) -> Result<GenerateBookResponse, ApplicationError> {
        let outcome = match self.run(&cmd).await {
            Ok((book, statistics)) => self
                .session_manager
                .complete_generation(&cmd.session_id, book.clone(), statistics.clone())
                .map(|_| (book, statistics))
                .map_err(ApplicationError::from),
            Err(e) => Err(e),
        };

        match outcome {
            Ok((book, statistics)) => {
                tracing::info!(
                    session_id = %cmd.session_id,
                    title = %book.title(),
                    sections = book.leaf_count(),
                    input_tokens = statistics.input_tokens,
                    output_tokens = statistics.output_tokens,
                    total_time = statistics.total_time,
                    "Book generation completed"
                );
                self.event_publisher.publish(
                    &cmd.session_id,
                    GenerationEvent::GenerationCompleted {
                        title: book.title().to_string(),
                        statistics: statistics.clone(),
                    },
                );
                Ok(GenerateBookResponse {
                    session_id: cmd.session_id,
                    book,
                    statistics,
                })
            }
            Err(e) => {
                tracing::warn!(
                    session_id = %cmd.session_id,
                    error = %e,
                    "Book generation failed"
                );
                if let Err(se) = self
                    .session_manager
                    .fail_generation(&cmd.session_id, e.to_string())
                {
                    tracing::debug!(
                        session_id = %cmd.session_id,
                        error = %se,
                        "Failed to record generation failure"
                    );
                }
                self.event_publisher.publish(
                    &cmd.session_id,
                    GenerationEvent::GenerationFailed {
                        error: e.to_string(),
                    },
                );
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        cmd: &GenerateBookCommand,
    ) -> Result<(Book, GenerationStatistics), ApplicationError> {
        let inference = self.inference.as_ref();
        let mut statistics = GenerationStatistics::default();

        // 1. 书名
        let response = generate_title(inference, &cmd.topic, &cmd.title_model).await?;
        statistics.add(&response.statistics);
        let title =
            BookTitle::new(response.text).map_err(|e| BookError::InvalidTitle(e.to_string()))?;

        tracing::debug!(session_id = %cmd.session_id, title = %title, "Title generated");
        self.event_publisher.publish(
            &cmd.session_id,
            GenerationEvent::TitleGenerated {
                title: title.to_string(),
            },
        );

        // 2. 结构
        let response = generate_structure(
            inference,
            &cmd.topic,
            &cmd.instructions,
            &cmd.structure_model,
        )
        .await?;
        statistics.add(&response.statistics);
        let outline = Outline::parse(&response.text, &self.limits)?;
        let mut book = Book::new(title, outline);

        let total = book.leaf_count();
        tracing::debug!(
            session_id = %cmd.session_id,
            total_sections = total,
            depth = book.leaves().iter().map(|(p, _)| p.depth()).max().unwrap_or(0),
            "Structure generated"
        );
        self.event_publisher.publish(
            &cmd.session_id,
            GenerationEvent::StructureGenerated {
                total_sections: total,
            },
        );

        // 3. 正文：深度优先、按大纲顺序逐个生成
        let prompts: Vec<(SectionPath, String)> = book
            .leaves()
            .into_iter()
            .map(|(path, section)| {
                let prompt = format!(
                    "{}: {}",
                    section.title(),
                    section.description().unwrap_or_default()
                );
                (path, prompt)
            })
            .collect();

        for (index, (path, prompt)) in prompts.into_iter().enumerate() {
            let response =
                generate_section(inference, &prompt, &cmd.instructions, &cmd.content_model)
                    .await?;
            statistics.add(&response.statistics);

            if response.text.trim().is_empty() {
                return Err(InferenceError::InvalidResponse(format!(
                    "empty content for section {}",
                    path
                ))
                .into());
            }
            book.update_content(&path, response.text)?;

            tracing::info!(
                session_id = %cmd.session_id,
                path = %path,
                completed = index + 1,
                total = total,
                output_tokens = response.statistics.output_tokens,
                "Section generated"
            );
            self.event_publisher.publish(
                &cmd.session_id,
                GenerationEvent::SectionGenerated {
                    path,
                    completed: index + 1,
                    total,
                },
            );
        }

        Ok((book, statistics))
    }
}

fn validate(cmd: &GenerateBookCommand) -> Result<(), ApplicationError> {
    if cmd.topic.trim().is_empty() {
        return Err(ApplicationError::validation("Topic must not be empty"));
    }
    for (name, model) in [
        ("title_model", &cmd.title_model),
        ("structure_model", &cmd.structure_model),
        ("content_model", &cmd.content_model),
    ] {
        if model.trim().is_empty() {
            return Err(ApplicationError::validation(format!(
                "{} must not be empty",
                name
            )));
        }
    }
    Ok(())
}

/// EditSection Handler - 手动覆盖单个章节正文
pub struct EditSectionHandler {
    session_manager: Arc<dyn SessionManagerPort>,
}

impl EditSectionHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub async fn handle(
        &self,
        cmd: EditSectionCommand,
    ) -> Result<EditSectionResponse, ApplicationError> {
        self.session_manager
            .update_section(&cmd.session_id, &cmd.path, cmd.content)?;

        tracing::info!(
            session_id = %cmd.session_id,
            path = %cmd.path,
            "Section edited"
        );

        Ok(EditSectionResponse {
            session_id: cmd.session_id,
            path: cmd.path,
        })
    }
}

/// ExportBook Handler - 把会话中已提交的书渲染为文件
pub struct ExportBookHandler {
    session_manager: Arc<dyn SessionManagerPort>,
    exporter: Arc<dyn BookExporterPort>,
}

impl ExportBookHandler {
    pub fn new(
        session_manager: Arc<dyn SessionManagerPort>,
        exporter: Arc<dyn BookExporterPort>,
    ) -> Self {
        Self {
            session_manager,
            exporter,
        }
    }

    pub async fn handle(&self, cmd: ExportBookCommand) -> Result<ExportedFile, ApplicationError> {
        let session = self.session_manager.get(&cmd.session_id)?;
        let book = session
            .book
            .ok_or_else(|| SessionError::NoBook(cmd.session_id.clone()))?;
        self.session_manager.touch(&cmd.session_id);

        // 渲染是 CPU 密集操作，放到阻塞线程池
        let exporter = self.exporter.clone();
        let format = cmd.format;
        let file = tokio::task::spawn_blocking(move || exporter.export(&book, format))
            .await
            .map_err(|e| ApplicationError::internal(format!("Export task failed: {}", e)))??;

        tracing::info!(
            session_id = %cmd.session_id,
            format = %cmd.format,
            file_name = %file.file_name,
            bytes = file.data.len(),
            "Book exported"
        );

        Ok(file)
    }
}
