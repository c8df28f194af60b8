use crate::adapters::http::{build_client, send_with_retry, RetryPolicy, BROWSER_USER_AGENT};
use crate::config::NaverSettings;
use crate::domain::model::{SearchQuery, SearchResponse};
use crate::domain::ports::NewsSource;
use crate::utils::error::{NewsError, ResponseDefect, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;

const MAX_DISPLAY: usize = 100;

/// Client for the Naver news search Open API.
#[derive(Debug, Clone)]
pub struct NaverClient {
    client: Client,
    settings: NaverSettings,
    policy: RetryPolicy,
}

impl NaverClient {
    pub fn new(settings: NaverSettings, policy: RetryPolicy) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(
            "x-naver-client-id",
            header_value("naver.client_id", &settings.client_id)?,
        );
        headers.insert(
            "x-naver-client-secret",
            header_value("naver.client_secret", &settings.client_secret)?,
        );

        Ok(Self {
            client: build_client(headers)?,
            settings,
            policy,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.settings.endpoint
    }
}

fn header_value(field: &str, value: &str) -> Result<HeaderValue> {
    let mut header = HeaderValue::from_str(value).map_err(|e| NewsError::InvalidConfigValueError {
        field: field.to_string(),
        value: "<hidden>".to_string(),
        reason: format!("not a valid header value: {}", e),
    })?;
    header.set_sensitive(true);
    Ok(header)
}

#[async_trait]
impl NewsSource for NaverClient {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse> {
        let page_size = query.display.clamp(1, MAX_DISPLAY).to_string();
        let params = [
            ("query", query.keyword.as_str()),
            ("display", page_size.as_str()),
            ("sort", query.sort.as_str()),
        ];

        tracing::debug!(
            "Searching news: query={}, display={}, sort={}",
            query.keyword,
            page_size,
            query.sort.as_str()
        );

        let response = send_with_retry(&self.policy, &self.settings.endpoint, || {
            self.client.get(&self.settings.endpoint).query(&params)
        })
        .await?;

        let body = response.text().await?;
        parse_search_response(&body)
    }
}

/// Decode a search API body, distinguishing broken JSON, a non-object payload
/// and an object lacking `items`.
pub fn parse_search_response(body: &str) -> Result<SearchResponse> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|_| {
        let preview: String = body.chars().take(100).collect();
        tracing::info!("Invalid JSON response: {}...", preview);
        NewsError::InvalidResponseError { defect: ResponseDefect::MalformedJson }
    })?;

    let Some(object) = value.as_object() else {
        tracing::info!("Unexpected response format: {}", json_kind(&value));
        return Err(NewsError::InvalidResponseError { defect: ResponseDefect::UnexpectedFormat });
    };

    if !object.contains_key("items") {
        let keys: Vec<&String> = object.keys().collect();
        tracing::info!("No 'items' in response: {:?}", keys);
        return Err(NewsError::InvalidResponseError { defect: ResponseDefect::MissingItems });
    }

    serde_json::from_value(value).map_err(|e| {
        tracing::info!("Search response did not match the expected shape: {}", e);
        NewsError::InvalidResponseError { defect: ResponseDefect::UnexpectedFormat }
    })
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_response() {
        let body = r#"{
            "lastBuildDate": "Tue, 06 May 2025 11:00:00 +0900",
            "total": 1520,
            "start": 1,
            "display": 1,
            "items": [{
                "title": "<b>반도체</b> 수출 회복",
                "originallink": "https://www.example.co.kr/news/1",
                "link": "https://n.news.naver.com/mnews/article/001/0001",
                "description": "요약",
                "pubDate": "Tue, 06 May 2025 10:30:00 +0900"
            }]
        }"#;

        let response = parse_search_response(body).unwrap();
        assert_eq!(response.total_count(), 1520);
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].pub_date, "Tue, 06 May 2025 10:30:00 +0900");
    }

    #[test]
    fn test_parse_defects() {
        let defect = |body: &str| match parse_search_response(body) {
            Err(NewsError::InvalidResponseError { defect }) => Some(defect),
            _ => None,
        };

        assert_eq!(defect("<html>oops</html>"), Some(ResponseDefect::MalformedJson));
        assert_eq!(defect("[1, 2, 3]"), Some(ResponseDefect::UnexpectedFormat));
        assert_eq!(defect(r#"{"total": 0}"#), Some(ResponseDefect::MissingItems));
        assert_eq!(defect(r#"{"items": "nope"}"#), Some(ResponseDefect::UnexpectedFormat));
    }

    #[test]
    fn test_total_falls_back_to_item_count() {
        let response = parse_search_response(r#"{"items": [{"title": "a"}, {"title": "b"}]}"#)
            .unwrap();
        assert_eq!(response.total_count(), 2);
    }

    #[test]
    fn test_invalid_credential_header_is_rejected() {
        let settings = NaverSettings {
            client_id: "bad\nvalue".to_string(),
            ..NaverSettings::default()
        };
        assert!(NaverClient::new(settings, RetryPolicy::default()).is_err());
    }
}
