//! Prompt template and fixed user-facing strings.

/// Instruction template wrapped around the workspace history and the question.
///
/// `{history}` and `{question}` are substituted by [`build_prompt`].
pub const CONTEXT_PROMPT_TEMPLATE: &str = r#####"
다음은 슬랙 워크스페이스에서 최근에 오간 대화 내용입니다. 이를 참고해서 아래 질문에 답변해 주세요.
The following are recent conversations from the Slack workspace. Use them as context to answer the question below.

슬랙 대화 (Slack conversations):
{history}

질문 (Question):
{question}
"#####;

/// Sent when the model produced no text block.
pub const NO_ANSWER_FALLBACK: &str = "[⚠️] 클로드가 적절한 답변을 생성하지 못했습니다.";

/// Sent in place of an answer when handling a message fails.
pub const FAILURE_APOLOGY: &str = "죄송합니다. 처리 중 오류가 발생했습니다.";

/// Builds the completion prompt from the history lines and the user's question.
///
/// Pure: the same inputs always yield the same string. The history is joined with
/// newlines and no truncation is applied.
pub fn build_prompt(history: &[String], question: &str) -> String {
    let context = history.join("\n");

    // Substitute the question first so a literal `{question}` inside the history stays untouched.
    let (head, tail) = CONTEXT_PROMPT_TEMPLATE.split_once("{question}").unwrap_or((CONTEXT_PROMPT_TEMPLATE, ""));

    format!("{}{}{}", head.replacen("{history}", &context, 1), question, tail)
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_history_and_question() {
        let history = vec!["[general] U1: launch is Friday".to_string(), "[DM] U2: ok".to_string()];
        let prompt = build_prompt(&history, "What did Alice say about the launch?");

        assert!(prompt.contains("[general] U1: launch is Friday\n[DM] U2: ok"));
        assert!(prompt.contains("What did Alice say about the launch?"));
        assert!(!prompt.contains("{history}"));
        assert!(!prompt.contains("{question}"));

        // History comes before the question.
        assert!(prompt.find("launch is Friday").unwrap() < prompt.find("What did Alice").unwrap());
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let history = vec!["[general] U1: a".to_string()];

        assert_eq!(build_prompt(&history, "q"), build_prompt(&history, "q"));
    }

    #[test]
    fn test_prompt_with_empty_history() {
        let prompt = build_prompt(&[], "anyone there?");

        assert!(prompt.contains("anyone there?"));
        assert!(prompt.contains("슬랙 대화"));
    }

    #[test]
    fn test_placeholders_in_user_text_are_kept_verbatim() {
        let history = vec!["[general] U1: what is {question}?".to_string()];
        let prompt = build_prompt(&history, "explain {history}");

        assert!(prompt.contains("[general] U1: what is {question}?"));
        assert!(prompt.contains("explain {history}"));
    }
}
