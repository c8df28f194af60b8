use serde_json::{json, Map, Value};

pub const ANALYZE_NEWS_CONTEXT: &str = "analyze_news_context_prompt";

const ANALYSIS_INSTRUCTIONS: &str = "다음 뉴스 기사들을 분석하여 맥락과 관계를 파악해주세요.

1. 공통 주제 및 메인 스토리: 이 뉴스들이 다루는 핵심 이슈나 사건은 무엇인가요?
2. 주요 키워드 5개: 이 뉴스들에서 반복적으로 등장하는 핵심 키워드는 무엇인가요?
3. 관점 분석: 각 언론사별로 보도 관점이나 강조점에 차이가 있나요?
4. 시간적 맥락: 이 이슈가 어떻게 발전해왔고, 향후 어떻게 전개될 가능성이 있나요?
5. 사회적/경제적/정치적 의미: 이 뉴스들이 어떤 더 넓은 맥락에서 중요한지 설명해주세요.

다음 뉴스 정보를 바탕으로 분석해주세요:";

pub fn catalogue() -> Value {
    json!([{
        "name": ANALYZE_NEWS_CONTEXT,
        "description": "뉴스 맥락 분석 프롬프트",
        "arguments": [{
            "name": "search_results",
            "description": "search_news 계열 도구가 반환한 검색 결과",
            "required": true
        }]
    }])
}

fn user_message(text: &str) -> Value {
    json!({
        "role": "user",
        "content": { "type": "text", "text": text }
    })
}

/// Render a prompt by name. `Err` carries the invalid-params message.
pub fn render(name: &str, arguments: &Map<String, Value>) -> Result<Value, String> {
    if name != ANALYZE_NEWS_CONTEXT {
        return Err(format!("Unknown prompt: {}", name));
    }

    let search_results = super::tools::string_arg(arguments, "search_results")?;

    Ok(json!({
        "description": "뉴스 맥락 분석 프롬프트",
        "messages": [
            user_message(ANALYSIS_INSTRUCTIONS),
            user_message(search_results),
        ]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_two_user_messages() {
        let mut args = Map::new();
        args.insert("search_results".to_string(), json!("1. [언론사] 연합뉴스"));

        let prompt = render(ANALYZE_NEWS_CONTEXT, &args).unwrap();
        let messages = prompt["messages"].as_array().unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert!(messages[0]["content"]["text"]
            .as_str()
            .unwrap()
            .starts_with("다음 뉴스 기사들을 분석하여"));
        assert_eq!(messages[1]["content"]["text"], "1. [언론사] 연합뉴스");
    }

    #[test]
    fn test_render_errors() {
        assert!(render("other", &Map::new()).is_err());
        assert!(render(ANALYZE_NEWS_CONTEXT, &Map::new())
            .unwrap_err()
            .contains("search_results"));
    }
}
