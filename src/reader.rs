//! Reading step files produced by [`crate::StepWriter`].
//!
//! A step file is JSON Lines: one `header` line, one `step` line per frame
//! and a closing `footer` carrying the frame count. Files ending in `.br`
//! are Brotli-decompressed on the fly.

use crate::step::Step;
use anyhow::{anyhow, Context, Result};
use brotli::Decompressor;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepFileHeader {
    pub version: String,
    #[serde(default)]
    pub compact: bool,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFileFooter {
    pub total_steps: usize,
}

/// Fully decoded content of a step file.
#[derive(Debug, Clone, PartialEq)]
pub struct StepFile {
    pub header: StepFileHeader,
    pub steps: Vec<Step>,
    /// `None` when the file was cut off before the footer was written.
    pub footer: Option<StepFileFooter>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum LineKind {
    Header,
    Step,
    Footer,
}

/// Reads a step file.
///
/// # Supported Formats
///
/// - `.jsonl`: Uncompressed JSON Lines
/// - `.jsonl.br`: Brotli-compressed JSON Lines
///
/// The header must come before anything else and appear once; when a footer
/// is present its `total_steps` must match the number of step lines.
///
/// # Examples
///
/// ```no_run
/// # use algoviz::read_steps;
/// # fn main() -> anyhow::Result<()> {
/// let file = read_steps("steps.jsonl.br")?;
/// println!("{} frames", file.steps.len());
/// # Ok(())
/// # }
/// ```
pub fn read_steps(file_path: &str) -> Result<StepFile> {
    let file = File::open(file_path).with_context(|| format!("Failed to open file: {}", file_path))?;

    let reader: Box<dyn BufRead> = if file_path.ends_with(".br") {
        let decompressor = Decompressor::new(file, 4096);
        Box::new(BufReader::new(decompressor))
    } else {
        Box::new(BufReader::new(file))
    };

    let mut header: Option<StepFileHeader> = None;
    let mut footer: Option<StepFileFooter> = None;
    let mut steps = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result.with_context(|| format!("Failed to read line {}", line_num + 1))?;

        if line.trim().is_empty() {
            continue;
        }

        let value: serde_json::Value = serde_json::from_str(&line)
            .with_context(|| format!("Failed to parse JSON at line {}", line_num + 1))?;
        let kind = LineKind::deserialize(&value)
            .with_context(|| format!("Unknown line type at line {}", line_num + 1))?;

        if footer.is_some() {
            return Err(anyhow!("Unexpected line after footer at line {}", line_num + 1));
        }

        match kind {
            LineKind::Header => {
                if header.is_some() || !steps.is_empty() {
                    return Err(anyhow!("Header must be first line (found at line {})", line_num + 1));
                }
                header = Some(
                    StepFileHeader::deserialize(&value)
                        .with_context(|| format!("Invalid header at line {}", line_num + 1))?,
                );
            }

            LineKind::Step => {
                if header.is_none() {
                    return Err(anyhow!("Step before header at line {}", line_num + 1));
                }
                let step = Step::from_json(&value)
                    .with_context(|| format!("Invalid step at line {}", line_num + 1))?;
                steps.push(step);
            }

            LineKind::Footer => {
                let parsed = StepFileFooter::deserialize(&value)
                    .with_context(|| format!("Invalid footer at line {}", line_num + 1))?;
                if parsed.total_steps != steps.len() {
                    return Err(anyhow!(
                        "Footer announces {} steps but {} were read (line {})",
                        parsed.total_steps,
                        steps.len(),
                        line_num + 1
                    ));
                }
                footer = Some(parsed);
            }
        }
    }

    let header = header.ok_or_else(|| anyhow!("Missing header line"))?;
    if footer.is_none() {
        tracing::warn!(path = file_path, steps = steps.len(), "step file has no footer");
    }

    Ok(StepFile { header, steps, footer })
}
