//! 正文分块
//!
//! 模型生成的正文是轻量 Markdown。非 Markdown 格式（PDF / DOCX / EPUB）
//! 只需要区分标题与段落，这里把正文切成块并去掉行内强调标记。

/// 正文块
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// 正文内的小标题，level 为 `#` 的个数
    Heading { level: usize, text: String },
    /// 普通段落或列表项
    Paragraph(String),
}

/// 把正文切分为块
///
/// 空行结束段落；`#` 开头的行是小标题；列表项各自成段；其余相邻行合并为一段。
pub fn split_blocks(content: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    fn flush(current: &mut Vec<&str>, blocks: &mut Vec<Block>) {
        if !current.is_empty() {
            blocks.push(Block::Paragraph(strip_emphasis(&current.join(" "))));
            current.clear();
        }
    }

    for line in content.lines().map(str::trim) {
        if line.is_empty() {
            flush(&mut current, &mut blocks);
        } else if let Some(level) = heading_level(line) {
            flush(&mut current, &mut blocks);
            let text = strip_emphasis(line.trim_start_matches('#').trim());
            if !text.is_empty() {
                blocks.push(Block::Heading { level, text });
            }
        } else if is_list_item(line) {
            flush(&mut current, &mut blocks);
            blocks.push(Block::Paragraph(strip_emphasis(line)));
        } else {
            current.push(line);
        }
    }
    flush(&mut current, &mut blocks);

    blocks
}

fn heading_level(line: &str) -> Option<usize> {
    let level = line.chars().take_while(|c| *c == '#').count();
    if (1..=6).contains(&level) && line[level..].starts_with(' ') {
        Some(level)
    } else {
        None
    }
}

fn is_list_item(line: &str) -> bool {
    if line.starts_with("- ") || line.starts_with("* ") || line.starts_with("+ ") {
        return true;
    }
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    digits > 0 && line[digits..].starts_with(". ")
}

fn strip_emphasis(text: &str) -> String {
    text.replace("**", "").replace("__", "")
}
