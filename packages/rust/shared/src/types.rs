//! Core domain types for question/answer sessions.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::error::QaForgeError;

// ---------------------------------------------------------------------------
// QaPair
// ---------------------------------------------------------------------------

/// A generated question paired with its human-supplied answer.
///
/// Field order is the serialized order: `question`, then `answer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

impl QaPair {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Chat messages
// ---------------------------------------------------------------------------

/// Role tag of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single role-tagged chat message, as sent to the completion API
/// and as written in chat-style training records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// QuestionCount
// ---------------------------------------------------------------------------

/// Largest question count accepted from the user.
pub const MAX_QUESTION_COUNT: usize = 1000;

/// Number of questions requested from the generator. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuestionCount(NonZeroUsize);

impl QuestionCount {
    /// Returns `None` for zero.
    pub fn new(n: usize) -> Option<Self> {
        NonZeroUsize::new(n).map(Self)
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl std::fmt::Display for QuestionCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for QuestionCount {
    type Err = QaForgeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let n: i64 = trimmed.parse().map_err(|_| {
            QaForgeError::validation(format!("'{trimmed}' is not a whole number"))
        })?;

        if n < 1 {
            return Err(QaForgeError::validation(format!(
                "question count must be at least 1 (got {n})"
            )));
        }

        usize::try_from(n)
            .ok()
            .filter(|&n| n <= MAX_QUESTION_COUNT)
            .and_then(Self::new)
            .ok_or_else(|| {
                QaForgeError::validation(format!(
                    "question count must be at most {MAX_QUESTION_COUNT} (got {n})"
                ))
            })
    }
}
