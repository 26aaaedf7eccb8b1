//! Question generation from document text.
//!
//! One chat-completion request per run. The reply is split into lines and
//! truncated to the requested count. When the service fails or the reply
//! holds no usable lines, the [`FallbackStrategy`] decides between
//! deterministic placeholder questions and surfacing the error.

mod client;

use tracing::{info, instrument, warn};

use qaforge_shared::{ChatMessage, FallbackStrategy, QaForgeError, QuestionCount, Result};

pub use client::{ChatCompletion, OpenAiClient};

/// System role sent with every generation request.
pub const SYSTEM_PROMPT: &str =
    "You are an AI assistant who is an expert at producing analytical questions from text.";

/// Generates questions about a document through an injected completion client.
#[derive(Debug, Clone)]
pub struct QuestionGenerator<C> {
    client: C,
    fallback: FallbackStrategy,
}

impl<C: ChatCompletion> QuestionGenerator<C> {
    pub fn new(client: C, fallback: FallbackStrategy) -> Self {
        Self { client, fallback }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn fallback(&self) -> FallbackStrategy {
        self.fallback
    }

    /// Ask the service for `count` questions about `document`.
    ///
    /// Returns between 1 and `count` questions on success, exactly `count`
    /// placeholders on any failure under [`FallbackStrategy::Placeholder`].
    #[instrument(skip_all, fields(count = %count, doc_chars = document.len()))]
    pub async fn generate(&self, document: &str, count: QuestionCount) -> Result<Vec<String>> {
        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(build_prompt(document, count)),
        ];

        let content = match self.client.complete(&messages).await {
            Ok(Some(content)) => content,
            Ok(None) => {
                return self.recover(count, QaForgeError::Generation("API response was empty".into()));
            }
            Err(e) => return self.recover(count, e),
        };

        let questions = parse_questions(&content, count);
        if questions.is_empty() {
            return self.recover(
                count,
                QaForgeError::Generation("API response contained no questions".into()),
            );
        }

        info!(generated = questions.len(), "questions generated");
        Ok(questions)
    }

    fn recover(&self, count: QuestionCount, err: QaForgeError) -> Result<Vec<String>> {
        match self.fallback {
            FallbackStrategy::Placeholder => {
                warn!(error = %err, "question generation failed, using default questions");
                Ok(placeholder_questions(count))
            }
            FallbackStrategy::Fail => Err(err),
        }
    }
}

/// The user instruction embedding the whole document and the count.
pub fn build_prompt(document: &str, count: QuestionCount) -> String {
    format!(
        "Based on the following document, write {count} detailed and varied questions. \
         The questions should reflect an in-depth analysis of the document's content:\n\n\
         {document}\n\n\
         Make the questions varied and thorough."
    )
}

/// Trimmed, non-empty lines of `content`, at most `count` of them.
pub fn parse_questions(content: &str, count: QuestionCount) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(count.get())
        .map(String::from)
        .collect()
}

/// `default question 1` through `default question N`.
pub fn placeholder_questions(count: QuestionCount) -> Vec<String> {
    (1..=count.get())
        .map(|i| format!("default question {i}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Replays a canned reply and records the conversation it was sent.
    struct ScriptedClient {
        reply: Mutex<Option<Result<Option<String>>>>,
        seen: Mutex<Vec<ChatMessage>>,
    }

    impl ScriptedClient {
        fn new(reply: Result<Option<String>>) -> Self {
            Self {
                reply: Mutex::new(Some(reply)),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl ChatCompletion for ScriptedClient {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<Option<String>> {
            self.seen.lock().unwrap().extend_from_slice(messages);
            self.reply
                .lock()
                .unwrap()
                .take()
                .expect("client called more than once")
        }
    }

    fn count(n: usize) -> QuestionCount {
        QuestionCount::new(n).unwrap()
    }

    fn placeholder_gen(reply: Result<Option<String>>) -> QuestionGenerator<ScriptedClient> {
        QuestionGenerator::new(ScriptedClient::new(reply), FallbackStrategy::Placeholder)
    }

    #[test]
    fn parse_trims_and_drops_blank_lines() {
        let content = "\n  First?  \n\n\tSecond?\r\n   \nThird?\n";
        assert_eq!(parse_questions(content, count(5)), vec!["First?", "Second?", "Third?"]);
    }

    #[test]
    fn parse_truncates_to_count() {
        let content = "a\nb\nc\nd";
        assert_eq!(parse_questions(content, count(2)), vec!["a", "b"]);
    }

    #[test]
    fn placeholders_are_numbered_from_one() {
        assert_eq!(
            placeholder_questions(count(3)),
            vec!["default question 1", "default question 2", "default question 3"]
        );
    }

    #[test]
    fn prompt_embeds_document_and_count() {
        let prompt = build_prompt("The sky is blue.", count(7));
        assert!(prompt.contains("write 7 detailed"));
        assert!(prompt.contains("The sky is blue."));
    }

    #[tokio::test]
    async fn sky_scenario_returns_reply_lines_in_order() {
        let generator = placeholder_gen(Ok(Some(
            "Why is the sky blue?\nWhat color is the sky?".into(),
        )));

        let questions = generator.generate("The sky is blue.", count(2)).await.unwrap();
        assert_eq!(questions, vec!["Why is the sky blue?", "What color is the sky?"]);

        let seen = generator.client.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], ChatMessage::system(SYSTEM_PROMPT));
        assert!(seen[1].content.contains("The sky is blue."));
    }

    #[tokio::test]
    async fn short_reply_is_not_padded() {
        let generator = placeholder_gen(Ok(Some("Only one?".into())));
        let questions = generator.generate("doc", count(4)).await.unwrap();
        assert_eq!(questions, vec!["Only one?"]);
    }

    #[tokio::test]
    async fn client_error_yields_placeholders() {
        let generator = placeholder_gen(Err(QaForgeError::Network("connection refused".into())));
        let questions = generator.generate("doc", count(3)).await.unwrap();
        assert_eq!(questions, placeholder_questions(count(3)));
    }

    #[tokio::test]
    async fn empty_content_yields_placeholders() {
        let generator = placeholder_gen(Ok(None));
        assert_eq!(
            generator.generate("doc", count(2)).await.unwrap(),
            placeholder_questions(count(2))
        );

        let generator = placeholder_gen(Ok(Some(" \n\n  \n".into())));
        assert_eq!(
            generator.generate("doc", count(2)).await.unwrap(),
            placeholder_questions(count(2))
        );
    }

    #[tokio::test]
    async fn fail_strategy_surfaces_errors() {
        let generator = QuestionGenerator::new(
            ScriptedClient::new(Err(QaForgeError::Network("timeout".into()))),
            FallbackStrategy::Fail,
        );
        let err = generator.generate("doc", count(2)).await.unwrap_err();
        assert!(matches!(err, QaForgeError::Network(_)));

        let generator =
            QuestionGenerator::new(ScriptedClient::new(Ok(None)), FallbackStrategy::Fail);
        let err = generator.generate("doc", count(2)).await.unwrap_err();
        assert!(matches!(err, QaForgeError::Generation(_)));
    }
}
