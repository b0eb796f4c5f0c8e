//! Contig name/length dictionary.
//!
//! Contigs are addressed everywhere else by a small integer id (`chr_id`), the
//! position of the contig in this dictionary. Lengths are needed to express
//! minus-strand transcript coordinates on the forward strand.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Context;
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors while building or querying a [`ReferenceDictionary`].
#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("I/O error while reading reference dictionary: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed FASTA index line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("contig '{0}' listed twice")]
    DuplicateContig(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceDictionary {
    names: Vec<String>,
    lengths: Vec<u32>,
    name_to_id: HashMap<String, usize>,
}

impl ReferenceDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a contig, returning its id.
    pub fn add(&mut self, name: &str, length: u32) -> Result<usize, ReferenceError> {
        if self.name_to_id.contains_key(name) {
            return Err(ReferenceError::DuplicateContig(name.to_string()));
        }
        let id = self.names.len();
        self.names.push(name.to_string());
        self.lengths.push(length);
        self.name_to_id.insert(name.to_string(), id);
        Ok(id)
    }

    /// Read a samtools FASTA index (`.fai`): name, length, offset, ...
    pub fn from_fai_reader<R: BufRead>(reader: R) -> Result<Self, ReferenceError> {
        let mut dict = Self::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let s = line.trim_end();
            if s.is_empty() || s.starts_with('#') {
                continue;
            }
            let mut cols = s.split('\t');
            let name = cols.next().filter(|n| !n.is_empty()).ok_or_else(|| {
                ReferenceError::Malformed {
                    line: i + 1,
                    message: "missing contig name".to_string(),
                }
            })?;
            let length = cols
                .next()
                .and_then(|l| l.trim().parse::<u32>().ok())
                .ok_or_else(|| ReferenceError::Malformed {
                    line: i + 1,
                    message: format!("missing or invalid length for '{name}'"),
                })?;
            dict.add(name, length)?;
        }
        tracing::debug!(contigs = dict.len(), "reference dictionary loaded");
        Ok(dict)
    }

    /// Load a `.fai` file, transparently decompressing `.gz`.
    pub fn from_fai_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let f = File::open(path)
            .with_context(|| format!("open FASTA index {}", path.display()))?;
        let is_gz = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("gz"))
            .unwrap_or(false);

        let dict = if is_gz {
            Self::from_fai_reader(BufReader::new(GzDecoder::new(f)))
        } else {
            Self::from_fai_reader(BufReader::new(f))
        };
        dict.with_context(|| format!("parse FASTA index {}", path.display()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, chr_id: usize) -> Option<&str> {
        self.names.get(chr_id).map(|s| s.as_str())
    }

    pub fn length(&self, chr_id: usize) -> Option<u32> {
        self.lengths.get(chr_id).copied()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Resolve a contig name, accepting the `chr` prefix either way
    /// (`chr1` / `1`, `chrM` / `MT`).
    pub fn contig_id(&self, name: &str) -> Option<usize> {
        if let Some(&id) = self.name_to_id.get(name) {
            return Some(id);
        }
        let alias = match name {
            "chrM" => "MT".to_string(),
            "MT" => "chrM".to_string(),
            _ => match name.strip_prefix("chr") {
                Some(rest) => rest.to_string(),
                None => format!("chr{name}"),
            },
        };
        self.name_to_id.get(&alias).copied()
    }
}
