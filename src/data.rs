//! Measurement channels and how they get into memory.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::RangingError;

/// The two raw interferometer channels, equal length and time aligned.
#[derive(Debug, Clone)]
pub struct TdiData {
    channel_1: Vec<f64>,
    channel_2: Vec<f64>,
}

impl TdiData {
    pub fn new(channel_1: Vec<f64>, channel_2: Vec<f64>) -> crate::config::Result<Self> {
        if channel_1.len() != channel_2.len() {
            return Err(RangingError::ChannelMismatch {
                len_1: channel_1.len(),
                len_2: channel_2.len(),
            });
        }
        if channel_1.is_empty() {
            return Err(RangingError::EmptyChannels);
        }
        Ok(Self {
            channel_1,
            channel_2,
        })
    }

    pub fn len(&self) -> usize {
        self.channel_1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel_1.is_empty()
    }

    pub fn channel_1(&self) -> &[f64] {
        &self.channel_1
    }

    pub fn channel_2(&self) -> &[f64] {
        &self.channel_2
    }
}

/// Where the two channels come from. The application decides; the chain
/// only ever sees a loaded [`TdiData`].
pub trait ChannelSource {
    fn load(&mut self) -> Result<TdiData>;
}

/// Reads each channel from a plain text file, one sample per line.
/// Blank lines and lines starting with `#` are skipped.
pub struct TextColumnSource {
    path_1: PathBuf,
    path_2: PathBuf,
}

impl TextColumnSource {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(path_1: P, path_2: Q) -> Self {
        Self {
            path_1: path_1.as_ref().to_path_buf(),
            path_2: path_2.as_ref().to_path_buf(),
        }
    }
}

impl ChannelSource for TextColumnSource {
    fn load(&mut self) -> Result<TdiData> {
        let channel_1 = read_samples(&self.path_1)?;
        let channel_2 = read_samples(&self.path_2)?;
        Ok(TdiData::new(channel_1, channel_2)?)
    }
}

fn read_samples(path: &Path) -> Result<Vec<f64>> {
    let file = File::open(path)
        .with_context(|| format!("Could not open channel file {}", path.display()))?;
    let mut samples = Vec::new();
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line =
            line.with_context(|| format!("Could not read from {}", path.display()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let value: f64 = trimmed.parse().with_context(|| {
            format!("Invalid sample on line {} of {}", number + 1, path.display())
        })?;
        samples.push(value);
    }
    Ok(samples)
}
