// Adapters layer: concrete implementations of the domain ports over HTTP.

pub mod http;
pub mod naver;

pub use http::{HttpFetcher, RetryPolicy};
pub use naver::NaverClient;
