//! Boundary to the PDF table-extraction service.
//!
//! The service turns PDF bytes into candidate rows `{date, teacher, course,
//! subject, content}`. It runs out of process: the daemon writes one JSON
//! request to the configured command's stdin and reads the JSON array of rows
//! from its stdout. Anything other than a well-formed array aborts the import.

use crate::model::CandidateRow;
use base64::{engine::general_purpose, Engine as _};
use serde_json::json;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::debug;

pub const PDF_MIME_TYPE: &str = "application/pdf";

pub const DEFAULT_INSTRUCTION: &str = "Analiza el PDF adjunto, que contiene una tabla de \
registros de contenidos de clases. Devuelve cada fila de la tabla como un objeto JSON con \
los campos date (YYYY-MM-DD), teacher, course, subject y content, todos dentro de un único \
array. Ignora cualquier texto que no pertenezca a la tabla.";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("only .pdf files can be imported: {0}")]
    NotPdf(PathBuf),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no extraction service is configured")]
    NotConfigured,
    #[error("failed to run extraction command {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("extraction command failed ({status}): {stderr}")]
    Failed { status: String, stderr: String },
    #[error("extraction output is not valid UTF-8")]
    NotUtf8,
    #[error("extraction output is not a JSON array of rows: {0}")]
    Malformed(#[source] serde_json::Error),
}

pub trait Extractor {
    fn extract(&self, pdf: &[u8], instruction: &str) -> Result<Vec<CandidateRow>, ExtractError>;
}

/// JSON schema the service is asked to constrain its output to.
pub fn response_schema() -> serde_json::Value {
    let field = |description: &str| json!({ "type": "string", "description": description });
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "date": field("Date formatted as YYYY-MM-DD"),
                "teacher": field("Teacher's full name"),
                "course": field("Course name"),
                "subject": field("Subject name"),
                "content": field("Description of the content taught"),
            },
            "required": ["date", "teacher", "course", "subject", "content"],
        }
    })
}

/// Parses the service output. Fields may be missing or null, but every
/// present field must be a string and the top level must be an array.
pub fn parse_rows(text: &str) -> Result<Vec<CandidateRow>, ExtractError> {
    serde_json::from_str(text.trim()).map_err(ExtractError::Malformed)
}

pub struct CommandExtractor {
    program: String,
    args: Vec<String>,
}

impl CommandExtractor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Whitespace-separated command line, e.g. `python3 extract.py --model x`.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }
}

impl Extractor for CommandExtractor {
    fn extract(&self, pdf: &[u8], instruction: &str) -> Result<Vec<CandidateRow>, ExtractError> {
        let request = json!({
            "mimeType": PDF_MIME_TYPE,
            "data": general_purpose::STANDARD.encode(pdf),
            "instruction": instruction,
            "responseSchema": response_schema(),
        });
        let body = request.to_string().into_bytes();

        let spawn_err = |source| ExtractError::Spawn {
            program: self.program.clone(),
            source,
        };
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;
        debug!(program = %self.program, bytes = body.len(), "extraction command started");

        // Feed stdin from another thread so a chatty child cannot deadlock us.
        let writer = child.stdin.take().map(|mut stdin| {
            std::thread::spawn(move || stdin.write_all(&body))
        });
        let output = child.wait_with_output().map_err(spawn_err)?;
        if let Some(handle) = writer {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Ok(Err(e)) => return Err(spawn_err(e)),
                Err(_) => {
                    return Err(ExtractError::Failed {
                        status: "stdin writer panicked".to_string(),
                        stderr: String::new(),
                    })
                }
            }
        }

        if !output.status.success() {
            return Err(ExtractError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        let text = String::from_utf8(output.stdout).map_err(|_| ExtractError::NotUtf8)?;
        parse_rows(&text)
    }
}

pub fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Reads a `.pdf` file and runs it through `extractor`.
pub fn extract_file(
    extractor: &dyn Extractor,
    path: &Path,
    instruction: &str,
) -> Result<Vec<CandidateRow>, ExtractError> {
    if !is_pdf_path(path) {
        return Err(ExtractError::NotPdf(path.to_path_buf()));
    }
    let bytes = std::fs::read(path).map_err(|source| ExtractError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    extractor.extract(&bytes, instruction)
}
