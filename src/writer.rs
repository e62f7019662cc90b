use crate::step::Step;
use anyhow::{Context, Result};
use brotli::enc::BrotliEncoderParams;
use brotli::CompressorWriter;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};

/// Version tag written into every step file header.
pub const STEP_FILE_VERSION: &str = "1.0";

pub struct StepWriter {
    writer: Box<dyn Write>,
    compact: bool,
    step_count: usize,
}

impl StepWriter {
    /// Creates a new StepWriter for the specified file path.
    ///
    /// Automatically enables Brotli compression if the file path ends with `.br`
    /// (e.g., `steps.jsonl.br`). Steps are written in compact mode unless
    /// [`StepWriter::with_compact`] says otherwise.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use algoviz::StepWriter;
    /// # fn main() -> anyhow::Result<()> {
    /// // Uncompressed, compact steps
    /// let mut writer = StepWriter::new("steps.jsonl")?;
    ///
    /// // Compressed, every field written out
    /// let mut writer = StepWriter::new("steps.jsonl.br")?.with_compact(false);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(file_path: &str) -> Result<Self> {
        let file = File::create(file_path)
            .with_context(|| format!("Failed to create file: {}", file_path))?;

        let writer: Box<dyn Write> = if file_path.ends_with(".br") {
            let buf_writer = BufWriter::new(file);
            let params = BrotliEncoderParams {
                quality: 6,
                lgwin: 22,
                ..Default::default()
            };
            Box::new(CompressorWriter::with_params(buf_writer, 4096, &params))
        } else {
            Box::new(BufWriter::new(file))
        };

        tracing::debug!(path = file_path, "opened step file");
        Ok(StepWriter {
            writer,
            compact: true,
            step_count: 0,
        })
    }

    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Writes the header line. `metadata` describes the problem the steps
    /// belong to (name, topic, renderer type, source code, parameters).
    pub fn write_header(&mut self, version: &str, metadata: serde_json::Value) -> Result<()> {
        let header = serde_json::json!({
            "type": "header",
            "version": version,
            "compact": self.compact,
            "metadata": metadata
        });

        self.write_line(&header)
    }

    pub fn write_step(&mut self, step: &Step) -> Result<()> {
        let mut map = serde_json::Map::new();
        map.insert("type".to_string(), serde_json::Value::String("step".to_string()));
        if let serde_json::Value::Object(fields) = step.to_json(self.compact) {
            map.extend(fields);
        }

        self.write_line(&serde_json::Value::Object(map))
            .with_context(|| format!("Failed to write step {}", self.step_count + 1))?;
        self.step_count += 1;
        Ok(())
    }

    pub fn write_steps<'a>(&mut self, steps: impl IntoIterator<Item = &'a Step>) -> Result<()> {
        for step in steps {
            self.write_step(step)?;
        }
        Ok(())
    }

    pub fn write_footer(&mut self) -> Result<()> {
        let footer = serde_json::json!({
            "type": "footer",
            "total_steps": self.step_count
        });

        self.write_line(&footer)?;
        tracing::debug!(steps = self.step_count, "closed step file");
        Ok(())
    }

    fn write_line<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let json = serde_json::to_string(value).context("Failed to serialize to JSON")?;

        writeln!(self.writer, "{}", json).context("Failed to write line")?;

        self.writer.flush().context("Failed to flush writer")?;

        Ok(())
    }
}

impl Drop for StepWriter {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
