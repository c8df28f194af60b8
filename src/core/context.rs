use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// MCP log severities, ordered from least to most severe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogMessage {
    pub level: LogLevel,
    pub data: String,
}

/// Per-call progress channel handed to tool implementations.
///
/// Messages go to the tracing subscriber right away and are also queued so
/// the transport can forward them to the MCP client as log notifications.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    messages: Arc<Mutex<Vec<LogMessage>>>,
}

impl ToolContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{}", message);
        self.push(LogLevel::Info, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.push(LogLevel::Warning, message);
    }

    fn push(&self, level: LogLevel, data: String) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(LogMessage { level, data });
        }
    }

    /// Take every queued message, leaving the queue empty.
    pub fn drain(&self) -> Vec<LogMessage> {
        self.messages
            .lock()
            .map(|mut messages| std::mem::take(&mut *messages))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_queued_in_order() {
        let ctx = ToolContext::new();
        ctx.info("searching");
        ctx.clone().warning("slow upstream");

        let messages = ctx.drain();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].level, LogLevel::Info);
        assert_eq!(messages[1].data, "slow upstream");
        assert!(ctx.drain().is_empty());
    }

    #[test]
    fn test_levels_are_ordered_by_severity() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Emergency);

        let level: LogLevel = serde_json::from_str("\"notice\"").unwrap();
        assert_eq!(level, LogLevel::Notice);
    }
}
