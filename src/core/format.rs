//! Turning raw search items into the numbered text blocks of a report.

use crate::domain::model::{Article, NewsItem};
use chrono::DateTime;
use url::Url;

pub const UNKNOWN_PUBLISHER: &str = "알 수 없는 언론사";
pub const UNTITLED: &str = "제목 없음";
pub const UNDATED: &str = "날짜 정보 없음";
pub const MISSING_LINK: &str = "#";

// The leading weekday is dropped before parsing; chrono rejects one that
// disagrees with the date.
const API_DATE_FORMAT: &str = "%d %b %Y %H:%M:%S %z";
const DISPLAY_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";
const NAVER_NEWS_HOST: &str = "news.naver.com";
const SOURCE_MARKER: &str = "출처 : ";

/// Strip the `<b>` highlight markup the search API wraps around matches and
/// decode the handful of entities it emits.
pub fn clean_title(raw: &str) -> String {
    let title = raw
        .replace("<b>", "")
        .replace("</b>", "")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");

    if title.trim().is_empty() {
        UNTITLED.to_string()
    } else {
        title
    }
}

/// `Mon, 06 May 2025 10:30:00 +0900` -> `2025-05-06 10:30`, kept in the
/// item's own offset. Unparsable input is returned as-is.
pub fn format_date(raw: &str) -> String {
    if raw.trim().is_empty() {
        return UNDATED.to_string();
    }

    let parsed = match strip_weekday(raw.trim()) {
        Some(rest) => DateTime::parse_from_str(rest, API_DATE_FORMAT).map_err(|e| e.to_string()),
        None => Err("missing weekday".to_string()),
    };

    match parsed {
        Ok(dt) => dt.format(DISPLAY_DATE_FORMAT).to_string(),
        Err(e) => {
            tracing::warn!("Failed to convert date format '{}': {}", raw, e);
            raw.to_string()
        }
    }
}

fn strip_weekday(raw: &str) -> Option<&str> {
    let (day, rest) = raw.split_once(", ")?;
    (!day.is_empty() && day.chars().all(|c| c.is_ascii_alphabetic())).then_some(rest)
}

pub fn extract_publisher(item: &NewsItem) -> String {
    if let Some((_, publisher)) = item.title.rsplit_once(" - ") {
        return publisher.trim().to_string();
    }

    if item.link.is_empty() {
        return UNKNOWN_PUBLISHER.to_string();
    }

    let host = Url::parse(&item.link)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_default();

    if host.contains(NAVER_NEWS_HOST) {
        // Naver-hosted copies may name the original outlet in the description.
        if let Some(source) = item.description.split(SOURCE_MARKER).nth(1) {
            return source.trim().to_string();
        }
    }

    let publisher = host.replace("www.", "");
    if publisher.is_empty() {
        UNKNOWN_PUBLISHER.to_string()
    } else {
        publisher
    }
}

pub fn present(item: &NewsItem, content: Option<String>) -> Article {
    let link = if item.link.is_empty() {
        MISSING_LINK.to_string()
    } else {
        item.link.clone()
    };

    Article {
        publisher: extract_publisher(item),
        title: clean_title(&item.title),
        published: format_date(&item.pub_date),
        link,
        content,
    }
}

/// Numbered block for one article; `index` is 1-based.
pub fn render_article(index: usize, article: &Article) -> String {
    let mut block = format!(
        "{}. [언론사] {}\n   [제목] {}\n   [시간] {}\n   [링크] {}",
        index, article.publisher, article.title, article.published, article.link
    );

    if let Some(content) = &article.content {
        block.push_str("\n   [본문]\n");
        block.push_str(content);
    }

    block
}
