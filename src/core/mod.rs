pub mod context;
pub mod extract;
pub mod format;
pub mod service;

pub use crate::domain::model::{Article, NewsItem, SearchQuery, SearchResponse, SortOrder};
pub use crate::domain::ports::{NewsSource, PageFetcher};
pub use crate::utils::error::Result;
pub use context::ToolContext;
pub use service::{NewsAnalyzer, NewsService};
