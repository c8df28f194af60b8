//! Article body extraction from downloaded HTML.

use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;

pub const MAX_CONTENT_LENGTH: usize = 1000;
pub const EXTRACTION_FAILED: &str = "본문 내용을 추출할 수 없습니다.";

const NAVER_NEWS_HOST: &str = "news.naver.com";
const MIN_PARAGRAPH_CHARS: usize = 50;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

static NAVER_BODY: LazyLock<Selector> = LazyLock::new(|| {
    selector("#articleBodyContents, #articeBody, #newsEndContents, .news_end")
});
static NAVER_NOISE: LazyLock<Selector> =
    LazyLock::new(|| selector("script, style, .end_photo_org, .reporter_area"));
static GENERIC_BODY: LazyLock<Selector> =
    LazyLock::new(|| selector("article, main, .article, .content, .news-content"));
static SCRIPTS: LazyLock<Selector> = LazyLock::new(|| selector("script, style"));
static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| selector("p"));

/// Best-effort body text of a news page, truncated to `max_chars` characters.
///
/// Naver article containers are tried first for Naver URLs, then common
/// article/main containers, then long paragraphs.
pub fn extract_content(url: &str, html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);

    if url.contains(NAVER_NEWS_HOST) {
        if let Some(body) = document.select(&NAVER_BODY).next() {
            return finish(&element_text(body, &NAVER_NOISE), max_chars);
        }
    }

    if let Some(body) = document.select(&GENERIC_BODY).next() {
        return finish(&element_text(body, &SCRIPTS), max_chars);
    }

    let paragraphs: Vec<String> = document
        .select(&PARAGRAPH)
        .map(|p| element_text(p, &SCRIPTS))
        .filter(|text| text.chars().count() > MIN_PARAGRAPH_CHARS)
        .collect();

    if paragraphs.is_empty() {
        return EXTRACTION_FAILED.to_string();
    }

    finish(&paragraphs.join(" "), max_chars)
}

fn finish(text: &str, max_chars: usize) -> String {
    let collapsed = collapse_whitespace(text);
    if collapsed.is_empty() {
        return EXTRACTION_FAILED.to_string();
    }
    truncate_chars(&collapsed, max_chars)
}

/// Text of `root` with every subtree matching `skip` left out.
fn element_text(root: ElementRef<'_>, skip: &Selector) -> String {
    let mut pieces = Vec::new();
    collect_text(root, skip, &mut pieces);
    collapse_whitespace(&pieces.join(" "))
}

fn collect_text<'a>(element: ElementRef<'a>, skip: &Selector, out: &mut Vec<&'a str>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    out.push(trimmed);
                }
            }
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    if !skip.matches(&child_element) {
                        collect_text(child_element, skip, out);
                    }
                }
            }
            _ => {}
        }
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep at most `max_chars` characters, appending `...` only when something was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naver_body_skips_noise() {
        let html = r#"
            <html><body>
              <div id="newsEndContents">
                첫 문장입니다.
                <script>var tracking = 1;</script>
                <span class="end_photo_org">사진 설명</span>
                <p>둘째   문장입니다.</p>
                <div class="reporter_area">기자 정보</div>
              </div>
            </body></html>"#;

        let content = extract_content("https://n.news.naver.com/mnews/article/1", html, 1000);
        assert_eq!(content, "첫 문장입니다. 둘째 문장입니다.");
    }

    #[test]
    fn test_naver_selector_only_for_naver_urls() {
        let html = r#"<div class="news_end">네이버 본문</div><article>일반 본문</article>"#;
        assert_eq!(extract_content("https://www.example.com/a", html, 1000), "일반 본문");
        assert_eq!(
            extract_content("https://news.naver.com/main/read", html, 1000),
            "네이버 본문"
        );
    }

    #[test]
    fn test_generic_container() {
        let html = r#"<html><body><nav>메뉴</nav><main><h1>제목</h1><p>내용</p></main></body></html>"#;
        assert_eq!(extract_content("https://www.example.com/a", html, 1000), "제목 내용");
    }

    #[test]
    fn test_long_paragraph_fallback() {
        let long = "가".repeat(60);
        let html = format!("<div><p>짧은 문단</p><p>{}</p><p>{}</p></div>", long, long);
        let content = extract_content("https://www.example.com/a", &html, 1000);
        assert_eq!(content, format!("{} {}", long, long));
    }

    #[test]
    fn test_nothing_extractable() {
        let html = "<div><p>짧음</p></div>";
        assert_eq!(extract_content("https://www.example.com/a", html, 1000), EXTRACTION_FAILED);
    }

    #[test]
    fn test_truncation_counts_characters() {
        let text = "뉴스".repeat(600);
        let truncated = truncate_chars(&text, MAX_CONTENT_LENGTH);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), MAX_CONTENT_LENGTH + 3);

        assert_eq!(truncate_chars("짧은 글", 10), "짧은 글");
        assert_eq!(truncate_chars("abcd", 4), "abcd");
    }
}
