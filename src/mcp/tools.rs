//! Tool catalogue advertised through `tools/list`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const SIMPLE_TEST: &str = "simple_test";
pub const SEARCH_NEWS: &str = "search_news";
pub const SEARCH_NEWS_WITH_CONTENT: &str = "search_news_with_content";
pub const COMPARE_NEWS_PERSPECTIVES: &str = "compare_news_perspectives";

/// MCP tool definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// JSON Schema for the `arguments` object.
    pub input_schema: Value,
}

impl Tool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder: a single required string argument.
    pub fn with_string_arg(mut self, arg: &str, description: &str) -> Self {
        self.input_schema = json!({
            "type": "object",
            "properties": {
                arg: {
                    "type": "string",
                    "description": description
                }
            },
            "required": [arg]
        });
        self
    }
}

pub fn catalogue() -> Vec<Tool> {
    vec![
        Tool::new(SIMPLE_TEST)
            .with_description("간단한 테스트 도구: 입력 텍스트를 그대로 반환합니다.")
            .with_string_arg("text", "되돌려 받을 텍스트"),
        Tool::new(SEARCH_NEWS)
            .with_description(
                "키워드로 뉴스 검색하기. 검색된 뉴스 목록 (언론사, 제목, 시간, 링크 포함)을 반환합니다.",
            )
            .with_string_arg("keyword", "검색할 키워드"),
        Tool::new(SEARCH_NEWS_WITH_CONTENT)
            .with_description("키워드로 뉴스 검색 및 각 기사 본문 내용 가져오기")
            .with_string_arg("keyword", "검색할 키워드"),
        Tool::new(COMPARE_NEWS_PERSPECTIVES)
            .with_description("키워드 관련 뉴스의 다양한 언론사 관점 비교 분석")
            .with_string_arg("keyword", "검색할 키워드"),
    ]
}

/// Read a required string argument, producing the message for an
/// invalid-params error otherwise.
pub fn string_arg<'a>(arguments: &'a Map<String, Value>, name: &str) -> Result<&'a str, String> {
    match arguments.get(name) {
        Some(Value::String(value)) => Ok(value.as_str()),
        Some(other) => Err(format!(
            "Argument '{}' must be a string, got {}",
            name,
            other
        )),
        None => Err(format!("Missing required argument '{}'", name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_names() {
        let names: Vec<String> = catalogue().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                SIMPLE_TEST,
                SEARCH_NEWS,
                SEARCH_NEWS_WITH_CONTENT,
                COMPARE_NEWS_PERSPECTIVES
            ]
        );
    }

    #[test]
    fn test_schema_serialization() {
        let tool = catalogue().remove(1);
        let value = serde_json::to_value(&tool).unwrap();

        assert_eq!(value["name"], SEARCH_NEWS);
        assert_eq!(value["inputSchema"]["required"], json!(["keyword"]));
        assert_eq!(value["inputSchema"]["properties"]["keyword"]["type"], "string");
    }

    #[test]
    fn test_string_arg() {
        let args: Map<String, Value> =
            serde_json::from_value(json!({"keyword": "경제", "count": 3})).unwrap();

        assert_eq!(string_arg(&args, "keyword"), Ok("경제"));
        assert!(string_arg(&args, "count").unwrap_err().contains("must be a string"));
        assert!(string_arg(&args, "missing").unwrap_err().contains("Missing"));
    }
}
