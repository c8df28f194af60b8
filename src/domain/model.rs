use serde::{Deserialize, Serialize};

/// One entry of the news search API `items` array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub originallink: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "pubDate")]
    pub pub_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub last_build_date: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub start: Option<u64>,
    #[serde(default)]
    pub display: Option<u64>,
    pub items: Vec<NewsItem>,
}

impl SearchResponse {
    /// Reported hit count, falling back to the number of returned items.
    pub fn total_count(&self) -> u64 {
        self.total.unwrap_or(self.items.len() as u64)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Relevance.
    #[default]
    Sim,
    Date,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Sim => "sim",
            SortOrder::Date => "date",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub keyword: String,
    pub display: usize,
    pub sort: SortOrder,
}

/// A search hit prepared for the text report.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub publisher: String,
    pub title: String,
    pub published: String,
    pub link: String,
    pub content: Option<String>,
}
