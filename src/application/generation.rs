//! Generation Helpers - 书名 / 结构 / 章节生成
//!
//! 每个函数拼装固定的提示词模板并调用一次推理端口，不做重试。
//! 结构生成要求模型输出 JSON，解析与校验由调用方负责。

use crate::application::ports::{ChatRequest, ChatResponse, InferenceError, InferencePort};

const TITLE_SYSTEM_PROMPT: &str = "You name books. Reply with exactly one book title and nothing \
else: no explanation, no quotation marks, no markdown. The title should be between 7 and 25 \
words long and make a reader want to open the book.";

const STRUCTURE_SYSTEM_PROMPT: &str = "You are a book architect. Reply only with a JSON object \
describing the book's structure. Keys are section titles. A value is either a string \
describing what that section covers, or a nested JSON object of the same shape for sections \
that have subsections. Example: {\"Section title\": \"What this section covers\", \
\"Section title\": {\"Subsection title\": \"What this subsection covers\"}}";

const SECTION_SYSTEM_PROMPT: &str = "You are an expert writer. Write a long, comprehensive, \
well structured chapter for the section you are given. Treat any additional instructions as \
very important. Output only the chapter content, without repeating the section title.";

/// 生成书名
pub async fn generate_title(
    inference: &dyn InferencePort,
    topic: &str,
    model: &str,
) -> Result<ChatResponse, InferenceError> {
    let prompt = format!("Write a title for a book about the following topic:\n{}", topic);

    tracing::debug!(model = %model, "Generating book title");

    let mut response = inference
        .complete(ChatRequest::new(model, prompt).with_system(TITLE_SYSTEM_PROMPT))
        .await?;
    response.text = clean_title(&response.text);
    Ok(response)
}

/// 生成书籍结构（JSON 文本）
pub async fn generate_structure(
    inference: &dyn InferencePort,
    topic: &str,
    additional_instructions: &str,
    model: &str,
) -> Result<ChatResponse, InferenceError> {
    let prompt = format!(
        "Write a comprehensive structure for a long (more than 300 pages) book. Leave out \
introduction and conclusion style sections such as a foreword, an author's note or a summary. \
It is very important that you follow the subject and the additional instructions below.\n\
<subject>{}</subject>\n\
<additional_instructions>{}</additional_instructions>",
        topic, additional_instructions
    );

    tracing::debug!(model = %model, "Generating book structure");

    inference
        .complete(
            ChatRequest::new(model, prompt)
                .with_system(STRUCTURE_SYSTEM_PROMPT)
                .json(),
        )
        .await
}

/// 生成单个章节正文
///
/// `prompt` 形如 `"{章节标题}: {章节描述}"`
pub async fn generate_section(
    inference: &dyn InferencePort,
    prompt: &str,
    additional_instructions: &str,
    model: &str,
) -> Result<ChatResponse, InferenceError> {
    let prompt = format!(
        "Write a long, comprehensive, structured chapter for the following section.\n\
<section_title>{}</section_title>\n\
<additional_instructions>{}</additional_instructions>",
        prompt, additional_instructions
    );

    inference
        .complete(ChatRequest::new(model, prompt).with_system(SECTION_SYSTEM_PROMPT))
        .await
}

/// 取第一行非空文本并去掉包裹的引号与 Markdown 标记
fn clean_title(raw: &str) -> String {
    let line = raw
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default();

    line.trim_start_matches('#')
        .trim()
        .trim_matches(|c| matches!(c, '"' | '\'' | '*' | '“' | '”'))
        .trim()
        .to_string()
}
