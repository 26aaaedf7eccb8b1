//! Console prompting and answer collection.

use std::io::{BufRead, Write};

use tracing::debug;

use qaforge_shared::{QaForgeError, QaPair, Result};

/// A line-oriented source of human input.
pub trait Prompter {
    /// Show `prompt` and block until one line is entered.
    /// The line terminator is stripped; nothing else is.
    fn read_line(&mut self, prompt: &str) -> Result<String>;
}

/// [`Prompter`] over any reader/writer pair, typically stdin/stdout.
pub struct ConsolePrompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> ConsolePrompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl ConsolePrompter<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter for ConsolePrompter<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        let console = |e: std::io::Error| QaForgeError::Input(format!("console: {e}"));

        self.writer.write_all(prompt.as_bytes()).map_err(console)?;
        self.writer.flush().map_err(console)?;

        let mut line = String::new();
        let read = self.reader.read_line(&mut line).map_err(console)?;
        if read == 0 {
            return Err(QaForgeError::Input("unexpected end of input".into()));
        }

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }
}

/// Show one question and return the answer exactly as typed.
pub fn collect_answer(prompter: &mut dyn Prompter, question: &str) -> Result<String> {
    prompter.read_line(&format!("Q: {question}\nA: "))
}

/// Ask every question in order, one answer each.
pub fn collect_answers(questions: &[String], prompter: &mut dyn Prompter) -> Result<Vec<QaPair>> {
    let mut pairs = Vec::with_capacity(questions.len());
    for (i, question) in questions.iter().enumerate() {
        let answer = collect_answer(prompter, question)?;
        debug!(index = i + 1, answer_chars = answer.chars().count(), "answer recorded");
        pairs.push(QaPair::new(question.as_str(), answer));
    }
    Ok(pairs)
}
