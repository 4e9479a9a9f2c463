// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;

const FENCE: &str = "```";

static HTML_FENCE_OPENER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^```html\s*\n").expect("valid regex"));
static FENCE_CLOSER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^```\s*$").expect("valid regex"));
static TRAILING_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n```\s*$").expect("valid regex"));
static BARE_FENCE_OPENER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^```\s*\n").expect("valid regex"));
static HTML_CLOSE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</html>").expect("valid regex"));
static TITLE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<title>(.*?)</title>").expect("valid regex"));

/// Markdown 清理器
///
/// 模型经常把 HTML 包在 markdown 代码块里返回，这里把它还原成纯 HTML。
/// 对已经干净的输入再次调用不会产生变化。
///
/// # 参数
/// * `raw` - 模型原始输出
///
/// # 返回值
/// 去掉首尾代码块标记并裁剪空白后的内容。重复清理直到结果不再变化，
/// 因此连续的多个代码块标记也会被全部去掉。
pub fn sanitize(raw: &str) -> String {
    let mut content = sanitize_once(raw);
    loop {
        // Each pass keeps or shortens the text, so this terminates
        let next = sanitize_once(&content);
        if next == content {
            return content;
        }
        content = next;
    }
}

fn sanitize_once(raw: &str) -> String {
    let content = HTML_FENCE_OPENER.replace_all(raw, "");
    let content = FENCE_CLOSER_LINE.replace_all(&content, "");
    let content = TRAILING_FENCE.replace(&content, "");
    let content = BARE_FENCE_OPENER.replace_all(&content, "");

    let mut content = content.trim();
    if let Some(rest) = content.strip_prefix(FENCE) {
        content = rest.trim();
    }
    if let Some(rest) = content.strip_suffix(FENCE) {
        content = rest.trim();
    }

    content.to_string()
}

/// 截断最后一个 `</html>`（不区分大小写）之后的所有内容，保留该标签本身
///
/// 没有闭合标签时原样返回
pub fn truncate_after_document(content: &str) -> &str {
    match HTML_CLOSE_TAG.find_iter(content).last() {
        Some(m) => &content[..m.end()],
        None => content,
    }
}

/// 流式路径的最终清理：先清理代码块，再丢弃文档之后的附加说明
pub fn finalize_streamed(raw: &str) -> String {
    let cleaned = sanitize(raw);
    truncate_after_document(&cleaned).to_string()
}

/// 从 HTML 中提取 `<title>` 内容（不区分大小写，取第一个匹配）
pub fn extract_title(content: &str) -> Option<String> {
    TITLE_TAG
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|title| !title.is_empty())
}

/// 推导应用标题，缺少 `<title>` 时使用带时间戳的后备标题
pub fn derive_title<Tz>(content: &str, now: DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    extract_title(content).unwrap_or_else(|| fallback_title(now))
}

pub fn fallback_title<Tz>(now: DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("Chat App {}", now.format("%Y-%m-%d %H:%M"))
}
