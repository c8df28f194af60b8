use crate::config::SearchSettings;
use crate::core::context::ToolContext;
use crate::core::extract::extract_content;
use crate::core::format::{present, render_article};
use crate::domain::model::{NewsItem, SearchQuery, SearchResponse};
use crate::domain::ports::{NewsSource, PageFetcher};
use crate::utils::error::{NewsError, ResponseDefect};
use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};

pub const EMPTY_KEYWORD: &str = "검색어를 입력해주세요.";
const FETCH_FAILED: &str = "기사 내용 추출 실패";

pub const PERSPECTIVE_FOCUS: &str =
    "특히 각 언론사별 보도 관점과 프레임의 차이점을 중점적으로 분석해 주세요.";

const HEADLINE_ANALYSIS_REQUEST: &str = "이 뉴스들의 맥락과 주요 내용을 분석해주세요. 다음 사항에 대해 알려주세요:
1. 제목들의 공통 주제
2. 주요 키워드 3개
3. 어떤 사건이나 이슈를 다루고 있는지
4. 이 뉴스들이 시사하는 사회적/경제적/정치적 맥락
";

const CONTENT_ANALYSIS_REQUEST: &str = "이 뉴스들의 상세 내용을 바탕으로 다음 사항을 분석해주세요:
1. 주요 사건/이슈 요약 (5-6문장)
2. 핵심 인물, 기관, 장소
3. 각 언론사별 보도 관점 차이
4. 사회적/경제적/정치적 맥락과 영향
5. 향후 전개 가능성
";

/// The operations exposed as MCP tools. Every operation answers with text;
/// failures are folded into user-facing messages.
#[async_trait]
pub trait NewsAnalyzer: Send + Sync {
    fn simple_test(&self, text: &str) -> String;

    async fn search_news(&self, keyword: &str, ctx: &ToolContext) -> String;

    async fn search_news_with_content(&self, keyword: &str, ctx: &ToolContext) -> String;

    async fn compare_news_perspectives(&self, keyword: &str, ctx: &ToolContext) -> String;
}

pub struct NewsService<S: NewsSource, F: PageFetcher> {
    source: S,
    fetcher: F,
    settings: SearchSettings,
}

impl<S: NewsSource, F: PageFetcher> NewsService<S, F> {
    pub fn new(source: S, fetcher: F, settings: SearchSettings) -> Self {
        Self {
            source,
            fetcher,
            settings,
        }
    }

    fn query(&self, keyword: &str) -> SearchQuery {
        SearchQuery {
            keyword: keyword.to_string(),
            display: self.settings.max_news_items,
            sort: self.settings.sort,
        }
    }

    /// Download and extract every article body, at most
    /// `max_concurrent_fetches` at a time. Output order follows `items`.
    async fn fetch_contents(&self, items: &[NewsItem]) -> Vec<String> {
        let links: Vec<String> = items.iter().map(|item| item.link.clone()).collect();
        stream::iter(links)
            .map(|link| async move { self.fetch_content(&link).await })
            .buffered(self.settings.max_concurrent_fetches.max(1))
            .collect()
            .await
    }

    async fn fetch_content(&self, link: &str) -> String {
        if link.is_empty() {
            return format!("{}: 링크가 없습니다", FETCH_FAILED);
        }

        match self.fetcher.fetch_html(link).await {
            Ok(html) => extract_content(link, &html, self.settings.max_content_length),
            Err(e) => {
                tracing::error!("Error while extracting article content: {}", e);
                format!("{}: {}", FETCH_FAILED, e)
            }
        }
    }
}

fn render_articles(items: &[NewsItem], contents: Option<Vec<String>>) -> String {
    let blocks: Vec<String> = match contents {
        Some(contents) => items
            .iter()
            .zip(contents)
            .enumerate()
            .map(|(i, (item, content))| render_article(i + 1, &present(item, Some(content))))
            .collect(),
        None => items
            .iter()
            .enumerate()
            .map(|(i, item)| render_article(i + 1, &present(item, None)))
            .collect(),
    };
    blocks.join("\n\n")
}

fn no_results(keyword: &str) -> String {
    format!("'{}'에 대한 검색 결과가 없습니다.", keyword)
}

/// Message shown to the client when the headline search fails.
pub fn describe_search_failure(err: &NewsError, ctx: &ToolContext) -> String {
    match err {
        NewsError::TimeoutError { .. } => {
            ctx.info("Request timed out after retries");
            "검색 중 시간 초과가 발생했습니다. 잠시 후 다시 시도해 주세요.".to_string()
        }
        NewsError::StatusError { status, body } => {
            ctx.info(format!("HTTP error {}: {}", status, body));
            match *status {
                401 | 403 => "API 인증에 실패했습니다. API 키를 확인해 주세요.".to_string(),
                429 => "너무 많은 요청을 보냈습니다. 잠시 후 다시 시도해 주세요.".to_string(),
                s if s >= 500 => "서버 오류가 발생했습니다. 잠시 후 다시 시도해 주세요.".to_string(),
                s => format!("검색 중 오류가 발생했습니다 (HTTP {})", s),
            }
        }
        NewsError::HttpError(e) => {
            ctx.info(format!("Request error: {}", e));
            "네트워크 연결 문제가 발생했습니다. 인터넷 연결을 확인해 주세요.".to_string()
        }
        NewsError::InvalidResponseError { defect } => format!(
            "검색 결과를 처리하는 중 오류가 발생했습니다: {}",
            defect.describe()
        ),
        other => {
            ctx.info(format!("Unexpected error in search_news: {}", other));
            format!("뉴스 검색 중 예상치 못한 오류가 발생했습니다: {}", other)
        }
    }
}

#[async_trait]
impl<S: NewsSource, F: PageFetcher> NewsAnalyzer for NewsService<S, F> {
    fn simple_test(&self, text: &str) -> String {
        tracing::info!("Simple test called with: {}", text);
        format!("입력 받은 텍스트: {}", text)
    }

    async fn search_news(&self, keyword: &str, ctx: &ToolContext) -> String {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return EMPTY_KEYWORD.to_string();
        }

        ctx.info(format!("Searching for news about: {}", keyword));

        let response: SearchResponse = match self.source.search(&self.query(keyword)).await {
            Ok(response) => response,
            Err(e) => return describe_search_failure(&e, ctx),
        };

        if response.items.is_empty() {
            return no_results(keyword);
        }

        let total = response.total_count();
        let shown = response.items.len();
        ctx.info(format!(
            "Found {} news items for '{}', showing {}",
            total, keyword, shown
        ));

        format!(
            "\"{}\"에 관한 뉴스 {}건 중 {}건을 찾았습니다.\n\n{}\n\n{}",
            keyword,
            total,
            shown,
            render_articles(&response.items, None),
            HEADLINE_ANALYSIS_REQUEST
        )
    }

    async fn search_news_with_content(&self, keyword: &str, ctx: &ToolContext) -> String {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return EMPTY_KEYWORD.to_string();
        }

        ctx.info(format!("Searching for news with content about: {}", keyword));

        let response = match self.source.search(&self.query(keyword)).await {
            Ok(response) => response,
            Err(NewsError::InvalidResponseError {
                defect: ResponseDefect::MissingItems,
            }) => return no_results(keyword),
            Err(e) => {
                ctx.info(format!("Error in API request or processing: {}", e));
                return format!("뉴스 검색 및 내용 가져오기 중 오류가 발생했습니다: {}", e);
            }
        };

        if response.items.is_empty() {
            return no_results(keyword);
        }

        let contents = self.fetch_contents(&response.items).await;

        let total = response.total_count();
        let shown = response.items.len();
        let failed = contents.iter().filter(|c| c.starts_with(FETCH_FAILED)).count();
        if failed > 0 {
            ctx.warning(format!("{} of {} article bodies could not be fetched", failed, shown));
        }
        ctx.info(format!(
            "Found {} news items with content for '{}', showing {}",
            total, keyword, shown
        ));

        format!(
            "\"{}\"에 관한 뉴스 {}건 중 {}건의 제목과 내용을 찾았습니다.\n\n\n\n{}\n\n{}",
            keyword,
            total,
            shown,
            render_articles(&response.items, Some(contents)),
            CONTENT_ANALYSIS_REQUEST
        )
    }

    async fn compare_news_perspectives(&self, keyword: &str, ctx: &ToolContext) -> String {
        ctx.info(format!("Comparing news perspectives for: {}", keyword));
        let report = self.search_news_with_content(keyword, ctx).await;
        format!("{}\n\n{}", report, PERSPECTIVE_FOCUS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::Result;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct StubSource {
        outcome: Mutex<Option<Result<SearchResponse>>>,
        queries: Mutex<Vec<SearchQuery>>,
    }

    impl StubSource {
        fn returning(outcome: Result<SearchResponse>) -> Self {
            Self {
                outcome: Mutex::new(Some(outcome)),
                queries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl NewsSource for StubSource {
        async fn search(&self, query: &SearchQuery) -> Result<SearchResponse> {
            self.queries.lock().unwrap().push(query.clone());
            self.outcome
                .lock()
                .unwrap()
                .take()
                .expect("search called more than once")
        }
    }

    #[derive(Default)]
    struct StubFetcher {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch_html(&self, url: &str) -> Result<String> {
            self.pages
                .get(url)
                .cloned()
                .ok_or(NewsError::StatusError { status: 404, body: "missing".to_string() })
        }
    }

    fn news(title: &str, link: &str) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            link: link.to_string(),
            pub_date: "Tue, 06 May 2025 10:30:00 +0900".to_string(),
            ..NewsItem::default()
        }
    }

    fn response(items: Vec<NewsItem>, total: Option<u64>) -> SearchResponse {
        SearchResponse {
            total,
            items,
            ..SearchResponse::default()
        }
    }

    fn service(
        outcome: Result<SearchResponse>,
        fetcher: StubFetcher,
    ) -> NewsService<StubSource, StubFetcher> {
        NewsService::new(StubSource::returning(outcome), fetcher, SearchSettings::default())
    }

    #[tokio::test]
    async fn test_empty_keyword_short_circuits() {
        let svc = service(Ok(response(vec![], None)), StubFetcher::default());
        let ctx = ToolContext::new();

        assert_eq!(svc.search_news("   ", &ctx).await, EMPTY_KEYWORD);
        assert_eq!(svc.search_news_with_content("", &ctx).await, EMPTY_KEYWORD);
        assert!(svc.source.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_news_report() {
        let items = vec![
            news("<b>반도체</b> 수출 반등 - 연합뉴스", "https://www.yna.co.kr/1"),
            news("메모리 가격 상승", "https://www.hankyung.com/2"),
        ];
        let svc = service(Ok(response(items, Some(1520))), StubFetcher::default());
        let ctx = ToolContext::new();

        let report = svc.search_news("  반도체 ", &ctx).await;

        assert!(report.starts_with("\"반도체\"에 관한 뉴스 1520건 중 2건을 찾았습니다.\n\n1. [언론사] 연합뉴스"));
        assert!(report.contains("   [제목] 반도체 수출 반등 - 연합뉴스"));
        assert!(report.contains("\n\n2. [언론사] hankyung.com"));
        assert!(report.contains("   [시간] 2025-05-06 10:30"));
        assert!(report.ends_with(HEADLINE_ANALYSIS_REQUEST));

        let queries = svc.source.queries.lock().unwrap();
        assert_eq!(queries[0].keyword, "반도체");
        assert_eq!(queries[0].display, 20);
        assert!(!ctx.drain().is_empty());
    }

    #[tokio::test]
    async fn test_no_results() {
        let svc = service(Ok(response(vec![], Some(0))), StubFetcher::default());
        let report = svc.search_news("없는뉴스", &ToolContext::new()).await;
        assert_eq!(report, "'없는뉴스'에 대한 검색 결과가 없습니다.");
    }

    #[tokio::test]
    async fn test_status_failures_map_to_messages() {
        let cases = [
            (401, "API 인증에 실패했습니다"),
            (403, "API 인증에 실패했습니다"),
            (429, "너무 많은 요청을 보냈습니다"),
            (502, "서버 오류가 발생했습니다"),
            (404, "검색 중 오류가 발생했습니다 (HTTP 404)"),
        ];

        for (status, expected) in cases {
            let svc = service(
                Err(NewsError::StatusError { status, body: String::new() }),
                StubFetcher::default(),
            );
            let report = svc.search_news("금리", &ToolContext::new()).await;
            assert!(report.contains(expected), "status {} gave {}", status, report);
        }
    }

    #[tokio::test]
    async fn test_timeout_and_defects() {
        let svc = service(Err(NewsError::TimeoutError { attempts: 3 }), StubFetcher::default());
        let report = svc.search_news("금리", &ToolContext::new()).await;
        assert!(report.contains("시간 초과"));

        let svc = service(
            Err(NewsError::InvalidResponseError { defect: ResponseDefect::MissingItems }),
            StubFetcher::default(),
        );
        let report = svc.search_news("금리", &ToolContext::new()).await;
        assert_eq!(report, "검색 결과를 처리하는 중 오류가 발생했습니다: 항목을 찾을 수 없음");
    }

    #[tokio::test]
    async fn test_search_with_content_keeps_item_order() {
        let items = vec![
            news("첫 기사", "https://www.a.com/1"),
            news("둘째 기사", "https://www.b.com/2"),
            news("링크 없음", ""),
        ];
        let mut fetcher = StubFetcher::default();
        fetcher.pages.insert(
            "https://www.a.com/1".to_string(),
            "<article>첫 번째 본문</article>".to_string(),
        );

        let svc = service(Ok(response(items, None)), fetcher);
        let ctx = ToolContext::new();
        let report = svc.search_news_with_content("경제", &ctx).await;

        assert!(report.starts_with("\"경제\"에 관한 뉴스 3건 중 3건의 제목과 내용을 찾았습니다.\n\n\n\n1. "));
        let first = report.find("첫 번째 본문").unwrap();
        let second = report.find("기사 내용 추출 실패: HTTP 404").unwrap();
        let third = report.find("기사 내용 추출 실패: 링크가 없습니다").unwrap();
        assert!(first < second && second < third);
        assert!(report.contains("   [링크] #"));
        assert!(report.ends_with(CONTENT_ANALYSIS_REQUEST));

        let warnings: Vec<_> = ctx
            .drain()
            .into_iter()
            .filter(|m| m.level == crate::core::context::LogLevel::Warning)
            .collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].data.starts_with("2 of 3"));
    }

    #[tokio::test]
    async fn test_with_content_missing_items_means_no_results() {
        let svc = service(
            Err(NewsError::InvalidResponseError { defect: ResponseDefect::MissingItems }),
            StubFetcher::default(),
        );
        let report = svc.search_news_with_content("경제", &ToolContext::new()).await;
        assert_eq!(report, "'경제'에 대한 검색 결과가 없습니다.");
    }

    #[tokio::test]
    async fn test_compare_perspectives_appends_focus() {
        let items = vec![news("기사", "https://www.a.com/1")];
        let svc = service(Ok(response(items, Some(1))), StubFetcher::default());
        let report = svc.compare_news_perspectives("선거", &ToolContext::new()).await;

        assert!(report.contains("1건의 제목과 내용을 찾았습니다"));
        assert!(report.ends_with(&format!("\n\n{}", PERSPECTIVE_FOCUS)));
    }

    #[test]
    fn test_simple_test_echo() {
        let svc = service(Ok(response(vec![], None)), StubFetcher::default());
        assert_eq!(svc.simple_test("안녕"), "입력 받은 텍스트: 안녕");
    }
}
