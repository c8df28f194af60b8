use crate::domain::model::{SearchQuery, SearchResponse};
use crate::utils::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse>;
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_html(&self, url: &str) -> Result<String>;
}
