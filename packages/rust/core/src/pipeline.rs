//! End-to-end session: document → questions → answers → dataset files.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, instrument};

use qaforge_generator::{ChatCompletion, QuestionGenerator};
use qaforge_shared::{OutputConfig, QaForgeError, QuestionCount, Result};

use crate::answers::{Prompter, collect_answers};

/// Prompt shown when no document path was given up front.
pub const DOCUMENT_PROMPT: &str = "Enter the source document path: ";

/// Prompt shown when no question count was given up front.
pub const COUNT_PROMPT: &str = "How many questions would you like to generate? ";

/// Configuration for a single session.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Source document; prompted for when `None`.
    pub document: Option<PathBuf>,
    /// Requested number of questions; prompted for when `None`.
    pub count: Option<QuestionCount>,
    /// Where the dataset files go.
    pub output: OutputConfig,
}

/// Result of a completed session.
#[derive(Debug)]
pub struct SessionResult {
    /// Number of question/answer pairs exported.
    pub pair_count: usize,
    /// Number of questions that were asked for.
    pub requested: QuestionCount,
    /// Written dataset files, in export order.
    pub files: Vec<PathBuf>,
    /// Total elapsed time, including time spent waiting on the user.
    pub elapsed: Duration,
}

/// Progress callback for reporting session status.
pub trait ProgressReporter {
    /// Called when a non-interactive phase starts.
    fn phase(&self, name: &str);
    /// Called when that phase ends, before the user is prompted again.
    fn phase_done(&self);
    /// Called when the session completes.
    fn done(&self, result: &SessionResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn phase_done(&self) {}
    fn done(&self, _result: &SessionResult) {}
}

/// Run one full session.
///
/// 1. Resolve the document path (prompt if needed) and load it
/// 2. Resolve the question count (prompt if needed)
/// 3. Generate questions
/// 4. Collect one answer per question
/// 5. Export all three dataset formats
///
/// An unreadable or empty document stops the run before anything is
/// generated. Export failures leave earlier files in place.
#[instrument(skip_all)]
pub async fn run_session<C: ChatCompletion>(
    config: &SessionConfig,
    generator: &QuestionGenerator<C>,
    prompter: &mut dyn Prompter,
    progress: &dyn ProgressReporter,
) -> Result<SessionResult> {
    let start = Instant::now();

    // --- Phase 1: Document ---
    let path = match &config.document {
        Some(path) => path.clone(),
        None => PathBuf::from(prompter.read_line(DOCUMENT_PROMPT)?.trim()),
    };

    progress.phase("Loading document");
    let loaded = qaforge_loader::load_document(&path);
    progress.phase_done();

    let document = loaded?;
    if document.is_empty() {
        return Err(QaForgeError::EmptyDocument { path });
    }
    info!(path = %path.display(), chars = document.chars().count(), "document ready");

    // --- Phase 2: Question count ---
    let count = match config.count {
        Some(count) => count,
        None => prompter.read_line(COUNT_PROMPT)?.parse::<QuestionCount>()?,
    };

    // --- Phase 3: Generate ---
    progress.phase("Generating questions");
    let generated = generator.generate(&document, count).await;
    progress.phase_done();

    let questions = generated?;
    info!(requested = %count, generated = questions.len(), "questions ready");

    // --- Phase 4: Answers ---
    let pairs = collect_answers(&questions, prompter)?;

    // --- Phase 5: Export ---
    progress.phase("Exporting dataset");
    let exported = qaforge_export::export_all(&pairs, &config.output);
    progress.phase_done();

    let result = SessionResult {
        pair_count: pairs.len(),
        requested: count,
        files: exported?,
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        pairs = result.pair_count,
        elapsed_ms = result.elapsed.as_millis(),
        "session complete"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use qaforge_shared::{ChatMessage, FallbackStrategy, QaPair};
    use serde_json::Value;

    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("qaforge-session-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Feeds scripted lines and records every prompt shown.
    struct ScriptedPrompter {
        lines: VecDeque<String>,
        prompts: Vec<String>,
    }

    impl ScriptedPrompter {
        fn new(lines: &[&str]) -> Self {
            Self {
                lines: lines.iter().map(|s| s.to_string()).collect(),
                prompts: Vec::new(),
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn read_line(&mut self, prompt: &str) -> Result<String> {
            self.prompts.push(prompt.to_string());
            self.lines
                .pop_front()
                .ok_or_else(|| QaForgeError::Input("script exhausted".into()))
        }
    }

    /// Always replies with the same text and counts calls.
    struct FixedReply {
        reply: Option<String>,
        calls: AtomicUsize,
    }

    impl FixedReply {
        fn new(reply: Option<&str>) -> Self {
            Self {
                reply: reply.map(String::from),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl ChatCompletion for FixedReply {
        async fn complete(&self, _messages: &[ChatMessage]) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        events: RefCell<Vec<String>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn phase(&self, name: &str) {
            self.events.borrow_mut().push(name.to_string());
        }
        fn phase_done(&self) {
            self.events.borrow_mut().push("-".into());
        }
        fn done(&self, result: &SessionResult) {
            self.events.borrow_mut().push(format!("done:{}", result.pair_count));
        }
    }

    fn output_in(dir: &Path) -> OutputConfig {
        OutputConfig {
            dir: dir.join("out"),
            ..OutputConfig::default()
        }
    }

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn sky_scenario_end_to_end() {
        let dir = temp_dir();
        let doc = dir.join("sky.txt");
        std::fs::write(&doc, "The sky is blue.").unwrap();

        let generator = QuestionGenerator::new(
            FixedReply::new(Some("Why is the sky blue?\nWhat color is the sky?")),
            FallbackStrategy::Placeholder,
        );
        let doc_str = doc.to_string_lossy().into_owned();
        let mut prompter = ScriptedPrompter::new(&[
            doc_str.as_str(),
            "2",
            "Because of Rayleigh scattering.",
            "Blue.",
        ]);
        let config = SessionConfig {
            output: output_in(&dir),
            ..SessionConfig::default()
        };
        let progress = RecordingProgress::default();

        let result = run_session(&config, &generator, &mut prompter, &progress)
            .await
            .unwrap();

        assert_eq!(result.pair_count, 2);
        assert_eq!(result.requested.get(), 2);
        assert_eq!(result.files.len(), 3);
        assert_eq!(
            prompter.prompts,
            vec![
                DOCUMENT_PROMPT.to_string(),
                COUNT_PROMPT.to_string(),
                "Q: Why is the sky blue?\nA: ".to_string(),
                "Q: What color is the sky?\nA: ".to_string(),
            ]
        );

        let expected = [
            QaPair::new("Why is the sky blue?", "Because of Rayleigh scattering."),
            QaPair::new("What color is the sky?", "Blue."),
        ];

        let jsonl: Vec<QaPair> = read_lines(&result.files[0])
            .into_iter()
            .map(|v| serde_json::from_value(v).unwrap())
            .collect();
        assert_eq!(jsonl, expected);

        let chat = read_lines(&result.files[1]);
        assert_eq!(chat.len(), 2);
        assert_eq!(chat[1]["messages"][1]["content"], "What color is the sky?");
        assert_eq!(chat[1]["messages"][2]["content"], "Blue.");

        let gemini: Vec<Value> =
            serde_json::from_str(&std::fs::read_to_string(&result.files[2]).unwrap()).unwrap();
        assert_eq!(gemini.len(), 2);
        assert_eq!(gemini[0]["input"], "Why is the sky blue?");
        assert_eq!(gemini[0]["output"], "Because of Rayleigh scattering.");

        assert_eq!(
            *progress.events.borrow(),
            vec![
                "Loading document",
                "-",
                "Generating questions",
                "-",
                "Exporting dataset",
                "-",
                "done:2"
            ]
        );
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn preset_inputs_skip_prompts_and_fallback_fills_pairs() {
        let dir = temp_dir();
        let doc = dir.join("doc.txt");
        std::fs::write(&doc, "Some text.").unwrap();

        let generator =
            QuestionGenerator::new(FixedReply::new(None), FallbackStrategy::Placeholder);
        let mut prompter = ScriptedPrompter::new(&["a1", "a2", "a3"]);
        let config = SessionConfig {
            document: Some(doc),
            count: QuestionCount::new(3),
            output: output_in(&dir),
        };

        let result = run_session(&config, &generator, &mut prompter, &SilentProgress)
            .await
            .unwrap();

        assert_eq!(result.pair_count, 3);
        assert_eq!(prompter.prompts[0], "Q: default question 1\nA: ");
        assert_eq!(prompter.prompts.len(), 3);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn empty_document_aborts_before_generation() {
        let dir = temp_dir();
        let doc = dir.join("empty.txt");
        std::fs::write(&doc, "").unwrap();

        let generator = QuestionGenerator::new(FixedReply::new(Some("Q?")), FallbackStrategy::Placeholder);
        let mut prompter = ScriptedPrompter::new(&[]);
        let config = SessionConfig {
            document: Some(doc),
            output: output_in(&dir),
            ..SessionConfig::default()
        };

        let err = run_session(&config, &generator, &mut prompter, &SilentProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, QaForgeError::EmptyDocument { .. }));
        assert_eq!(generator_calls(&generator), 0);
        assert!(!dir.join("out").exists());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn missing_document_aborts() {
        let dir = temp_dir();
        let generator = QuestionGenerator::new(FixedReply::new(Some("Q?")), FallbackStrategy::Placeholder);
        let missing = dir.join("missing.txt").to_string_lossy().into_owned();
        let mut prompter = ScriptedPrompter::new(&[missing.as_str()]);
        let config = SessionConfig {
            output: output_in(&dir),
            ..SessionConfig::default()
        };

        let err = run_session(&config, &generator, &mut prompter, &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, QaForgeError::Load { .. }));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn invalid_count_is_rejected_before_generation() {
        let dir = temp_dir();
        let doc = dir.join("doc.txt");
        std::fs::write(&doc, "Some text.").unwrap();

        let generator = QuestionGenerator::new(FixedReply::new(Some("Q?")), FallbackStrategy::Placeholder);
        let mut prompter = ScriptedPrompter::new(&["0"]);
        let config = SessionConfig {
            document: Some(doc),
            output: output_in(&dir),
            ..SessionConfig::default()
        };

        let err = run_session(&config, &generator, &mut prompter, &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, QaForgeError::Validation { .. }));
        assert_eq!(generator_calls(&generator), 0);
        std::fs::remove_dir_all(&dir).ok();
    }

    fn generator_calls(generator: &QuestionGenerator<FixedReply>) -> usize {
        generator.client().calls.load(Ordering::SeqCst)
    }
}
