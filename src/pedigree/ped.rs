//! PED (linkage pedigree) file import.
//!
//! Six whitespace-separated columns per line:
//! `family individual father mother sex phenotype`, followed by optional
//! extra columns. `0` in a parent column means unknown. A leading `#` line is
//! taken as the header naming the columns; other `#` lines are comments.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Context;
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};

use crate::pedigree::person::{Disease, PersonSpec, Sex};
use crate::pedigree::PedigreeError;

/// One raw PED line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PedPerson {
    pub family: String,
    pub name: String,
    /// `"0"` when unknown.
    pub father: String,
    /// `"0"` when unknown.
    pub mother: String,
    pub sex: Sex,
    pub disease: Disease,
    pub extra_fields: Vec<String>,
}

impl PedPerson {
    pub fn to_spec(&self) -> PersonSpec {
        let parent = |s: &str| (s != "0" && !s.is_empty()).then(|| s.to_string());
        PersonSpec {
            name: self.name.clone(),
            father: parent(&self.father),
            mother: parent(&self.mother),
            sex: self.sex,
            disease: self.disease,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PedFileContents {
    /// Names of the columns after the sixth, from the header line if any.
    pub extra_column_headers: Vec<String>,
    pub individuals: Vec<PedPerson>,
}

impl PedFileContents {
    /// Parse PED text.
    ///
    /// # Example
    /// ```
    /// use std::io::Cursor;
    /// use genewise_mendel::pedigree::{PedFileContents, Pedigree};
    ///
    /// let ped = "fam\tdad\t0\t0\t1\t1\nfam\tmom\t0\t0\t2\t1\nfam\tkid\tdad\tmom\t2\t2\n";
    /// let contents = PedFileContents::from_reader(Cursor::new(ped)).unwrap();
    /// let pedigree = Pedigree::from_ped(&contents, "fam").unwrap();
    /// assert_eq!(pedigree.len(), 3);
    /// ```
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, PedigreeError> {
        let mut contents = PedFileContents::default();
        let mut seen_data = false;

        for (i, line) in reader.lines().enumerate() {
            let line_no = i + 1;
            let line = line.map_err(|e| PedigreeError::Parse {
                line: line_no,
                message: e.to_string(),
            })?;
            let s = line.trim();
            if s.is_empty() {
                continue;
            }
            if let Some(header) = s.strip_prefix('#') {
                if !seen_data && contents.extra_column_headers.is_empty() {
                    contents.extra_column_headers =
                        header.split_whitespace().skip(6).map(str::to_string).collect();
                }
                continue;
            }

            let cols: Vec<&str> = s.split_whitespace().collect();
            if cols.len() < 6 {
                return Err(PedigreeError::Parse {
                    line: line_no,
                    message: format!("expected at least 6 columns, found {}", cols.len()),
                });
            }
            seen_data = true;

            contents.individuals.push(PedPerson {
                family: cols[0].to_string(),
                name: cols[1].to_string(),
                father: cols[2].to_string(),
                mother: cols[3].to_string(),
                sex: Sex::from_ped_code(cols[4]),
                disease: Disease::from_ped_code(cols[5]),
                extra_fields: cols[6..].iter().map(|c| c.to_string()).collect(),
            });
        }

        Ok(contents)
    }

    /// Load a PED file, transparently decompressing `.gz`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let f = File::open(path).with_context(|| format!("open PED file {}", path.display()))?;
        let is_gz = path.extension().map(|e| e == "gz").unwrap_or(false);

        let contents = if is_gz {
            Self::from_reader(BufReader::new(GzDecoder::new(f)))
        } else {
            Self::from_reader(BufReader::new(f))
        };
        contents.with_context(|| format!("parse PED file {}", path.display()))
    }

    /// Distinct family names in first-seen order.
    pub fn family_names(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for p in &self.individuals {
            if !out.contains(&p.family.as_str()) {
                out.push(&p.family);
            }
        }
        out
    }
}
