//! Sinks that consume chain rows as they are produced.
//!
//! The driver pushes every row through a [`ChainSink`]; the plain-text
//! writer reproduces the usual chain file layout with a `#likelihood L_1
//! L_2` header, one row per state.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::sampler::ChainRecord;

/// Append-only consumer of chain rows.
pub trait ChainSink {
    fn record(&mut self, record: &ChainRecord) -> Result<()>;

    /// Push buffered rows to their destination.
    fn flush(&mut self) -> Result<()>;
}

/// Writes rows to a plain text file, one state per line.
///
/// The buffer is flushed by the run driver and on drop, so a chain cut
/// short still leaves a readable file.
pub struct TextChainWriter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl TextChainWriter {
    /// Create the file and write the header row.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)
            .with_context(|| format!("Could not create chain file {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "#likelihood L_1 L_2")
            .with_context(|| format!("Could not write the header of {}", path.display()))?;
        Ok(Self { path, writer })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush and close the file.
    pub fn finalize(mut self) -> Result<()> {
        self.writer
            .flush()
            .with_context(|| format!("Could not flush chain file {}", self.path.display()))
    }
}

impl ChainSink for TextChainWriter {
    fn record(&mut self, record: &ChainRecord) -> Result<()> {
        writeln!(
            self.writer,
            "{} {} {}",
            record.log_likelihood, record.l1, record.l2
        )
        .with_context(|| format!("Could not append to chain file {}", self.path.display()))
    }

    fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .with_context(|| format!("Could not flush chain file {}", self.path.display()))
    }
}

/// Keeps every row in memory. The sink for tests and in-process analysis.
#[derive(Debug, Default)]
pub struct MemoryChain {
    records: Vec<ChainRecord>,
}

impl MemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[ChainRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ChainRecord> {
        self.records
    }
}

impl ChainSink for MemoryChain {
    fn record(&mut self, record: &ChainRecord) -> Result<()> {
        self.records.push(*record);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
