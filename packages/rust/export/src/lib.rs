//! Dataset exporters.
//!
//! Each exporter takes the collected pairs read-only and writes exactly one
//! file, replacing whatever was at that path:
//!
//! | Format            | Layout                                              |
//! |-------------------|-----------------------------------------------------|
//! | [`Jsonl`]         | one `{"question", "answer"}` object per line        |
//! | [`OpenAiChat`]    | one `{"messages": [system, user, assistant]}` per line |
//! | [`Gemini`]        | a single pretty-printed `[{"input", "output"}]` array |
//!
//! [`Jsonl`]: ExportFormat::Jsonl
//! [`OpenAiChat`]: ExportFormat::OpenAiChat
//! [`Gemini`]: ExportFormat::Gemini

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use qaforge_shared::{ChatMessage, OutputConfig, QaForgeError, QaPair, Result};

/// System message written into every chat-style training record.
pub const TRAINING_SYSTEM_MESSAGE: &str = "You are a helpful assistant.";

/// The three supported output formats, in the order they are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Jsonl,
    OpenAiChat,
    Gemini,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [Self::Jsonl, Self::OpenAiChat, Self::Gemini];

    /// File name for this format under the configured output settings.
    pub fn file_name(self, output: &OutputConfig) -> &str {
        match self {
            Self::Jsonl => &output.jsonl_file,
            Self::OpenAiChat => &output.openai_file,
            Self::Gemini => &output.gemini_file,
        }
    }

    /// Write `pairs` to `path` in this format.
    pub fn write(self, pairs: &[QaPair], path: &Path) -> Result<()> {
        match self {
            Self::Jsonl => export_jsonl(pairs, path),
            Self::OpenAiChat => export_openai_chat(pairs, path),
            Self::Gemini => export_gemini(pairs, path),
        }
    }
}

// ---------------------------------------------------------------------------
// Record shapes
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ChatRecord {
    messages: [ChatMessage; 3],
}

impl From<&QaPair> for ChatRecord {
    fn from(pair: &QaPair) -> Self {
        Self {
            messages: [
                ChatMessage::system(TRAINING_SYSTEM_MESSAGE),
                ChatMessage::user(pair.question.as_str()),
                ChatMessage::assistant(pair.answer.as_str()),
            ],
        }
    }
}

#[derive(Serialize)]
struct InputOutput<'a> {
    input: &'a str,
    output: &'a str,
}

// ---------------------------------------------------------------------------
// Exporters
// ---------------------------------------------------------------------------

/// Line-delimited `{question, answer}` objects.
pub fn export_jsonl(pairs: &[QaPair], path: &Path) -> Result<()> {
    write_lines(path, pairs)
}

/// Line-delimited chat-style training records.
pub fn export_openai_chat(pairs: &[QaPair], path: &Path) -> Result<()> {
    let records: Vec<ChatRecord> = pairs.iter().map(ChatRecord::from).collect();
    write_lines(path, &records)
}

/// One pretty-printed array of `{input, output}` objects.
pub fn export_gemini(pairs: &[QaPair], path: &Path) -> Result<()> {
    let records: Vec<InputOutput<'_>> = pairs
        .iter()
        .map(|p| InputOutput {
            input: &p.question,
            output: &p.answer,
        })
        .collect();

    let mut writer = create(path)?;
    serde_json::to_writer_pretty(&mut writer, &records)?;
    finish(writer, path)
}

/// Write every format into `output.dir`, creating it if needed.
///
/// Stops at the first failure; files already written stay on disk.
/// Returns the written paths in format order.
#[instrument(skip_all, fields(pairs = pairs.len(), dir = %output.dir.display()))]
pub fn export_all(pairs: &[QaPair], output: &OutputConfig) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(&output.dir).map_err(|e| QaForgeError::io(&output.dir, e))?;

    let mut written = Vec::with_capacity(ExportFormat::ALL.len());
    for format in ExportFormat::ALL {
        let path = output.dir.join(format.file_name(output));
        format.write(pairs, &path)?;
        debug!(?format, path = %path.display(), "export written");
        written.push(path);
    }

    info!(files = written.len(), "dataset exported");
    Ok(written)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).map_err(|e| QaForgeError::io(path, e))?;
    Ok(BufWriter::new(file))
}

/// Single-line JSON with `", "` between items and `": "` after keys.
struct SpacedFormatter;

impl serde_json::ser::Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        separate(writer, first)
    }

    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        separate(writer, first)
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

fn separate<W: ?Sized + Write>(writer: &mut W, first: bool) -> io::Result<()> {
    if first {
        Ok(())
    } else {
        writer.write_all(b", ")
    }
}

fn write_lines<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let mut writer = create(path)?;
    for record in records {
        let mut ser = serde_json::Serializer::with_formatter(&mut writer, SpacedFormatter);
        record.serialize(&mut ser)?;
        writer.write_all(b"\n").map_err(|e| QaForgeError::io(path, e))?;
    }
    finish(writer, path)
}

fn finish(mut writer: BufWriter<File>, path: &Path) -> Result<()> {
    writer.flush().map_err(|e| QaForgeError::io(path, e))
}
