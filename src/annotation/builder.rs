use std::collections::{HashMap, HashSet};
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::annotation::io::{AnnotationError, AnnotationReader};
use crate::model::transcript::TranscriptRecord;
use crate::model::types::ContigId;
use crate::reference::ReferenceDictionary;
use crate::types::{Span, Strand};

/// Configure which attribute keys and feature types are used to extract
/// transcripts from GTF/GFF3.
///
/// Notes:
/// - Multiple keys per category are allowed; first present wins.
/// - If no transcript id key is present, the parent keys are tried; GFF3
///   `Parent` values are split on ',' and the feature counted for each.
/// - Features linked by `Parent` take their gene symbol from the top-most
///   ancestor (found through `id_keys`) that carries one, and only fall back
///   to their own attributes when no ancestor does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeKeys {
    pub gene_symbol_keys: Vec<String>,
    pub transcript_id_keys: Vec<String>,

    /// GFF3 exon->transcript linkage (most commonly: Parent)
    pub parent_keys: Vec<String>,

    /// GFF3 feature identifiers that `Parent` values refer to
    pub id_keys: Vec<String>,

    /// Feature types whose spans make up a transcript (default: ["exon"])
    pub feature_types: Vec<String>,
}

impl Default for AttributeKeys {
    fn default() -> Self {
        Self {
            gene_symbol_keys: vec!["gene_name".into(), "gene".into(), "Name".into(), "gene_id".into()],
            transcript_id_keys: vec!["transcript_id".into(), "transcript".into()],
            parent_keys: vec!["Parent".into()],
            id_keys: vec!["ID".into()],
            feature_types: vec!["exon".into()],
        }
    }
}

/// Builds [`TranscriptRecord`]s from a GTF/GFF3 annotation.
///
/// - parses whole file (optionally gzipped)
/// - configurable attribute keys
/// - resolves contigs through a [`ReferenceDictionary`]; records on contigs
///   the dictionary does not know are skipped with a warning
#[derive(Debug, Clone, Default)]
pub struct TranscriptImporter {
    pub keys: AttributeKeys,
}

struct PendingTranscript {
    accession: String,
    line_no: usize,
    own_symbol: Option<String>,
    via_parent: bool,
    chr_id: ContigId,
    strand: Strand,
    span: Span,
}

impl TranscriptImporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys(keys: AttributeKeys) -> Self {
        Self { keys }
    }

    /// Convenience: set preferred keys for the gene symbol.
    pub fn gene_symbol_keys(mut self, keys: &[&str]) -> Self {
        self.keys.gene_symbol_keys = keys.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Convenience: set transcript id key(s).
    pub fn transcript_id_keys(mut self, keys: &[&str]) -> Self {
        self.keys.transcript_id_keys = keys.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Convenience: set parent keys for GFF3 exon->transcript linking.
    pub fn parent_keys(mut self, keys: &[&str]) -> Self {
        self.keys.parent_keys = keys.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Convenience: set the identifier keys `Parent` values point at.
    pub fn id_keys(mut self, keys: &[&str]) -> Self {
        self.keys.id_keys = keys.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Convenience: define which feature types count towards transcript spans.
    pub fn feature_types(mut self, types: &[&str]) -> Self {
        self.keys.feature_types = types.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Import transcripts from anything implementing `BufRead`.
    ///
    /// Transcripts are returned in first-seen order with ids `0..n`.
    ///
    /// # Example
    /// ```
    /// use std::io::Cursor;
    /// use genewise_mendel::annotation::TranscriptImporter;
    /// use genewise_mendel::reference::ReferenceDictionary;
    ///
    /// let mut dict = ReferenceDictionary::new();
    /// dict.add("chr1", 10_000).unwrap();
    ///
    /// let gtf = "\
    /// chr1\tsrc\texon\t101\t150\t.\t+\t.\tgene_id \"G1\"; gene_name \"ALPHA\"; transcript_id \"T1\";\n\
    /// chr1\tsrc\texon\t201\t250\t.\t+\t.\tgene_id \"G1\"; gene_name \"ALPHA\"; transcript_id \"T1\";\n";
    ///
    /// let txs = TranscriptImporter::new().import_reader(Cursor::new(gtf), &dict).unwrap();
    /// assert_eq!(txs.len(), 1);
    /// assert_eq!(txs[0].gene_symbol, "ALPHA");
    /// assert_eq!((txs[0].span.start, txs[0].span.end), (100, 250));
    /// ```
    pub fn import_reader<R: BufRead>(
        &self,
        reader: R,
        dict: &ReferenceDictionary,
    ) -> Result<Vec<TranscriptRecord>, AnnotationError> {
        let mut pending: Vec<PendingTranscript> = Vec::new();
        let mut key_to_idx: HashMap<String, usize> = HashMap::new();
        let mut unknown_contigs: HashSet<String> = HashSet::new();
        let mut hierarchy: HashMap<String, ParentFeature> = HashMap::new();

        for rec in AnnotationReader::new(reader).records() {
            let rec = rec?;
            if let Some(id) = rec.pick_first_attr(&self.keys.id_keys) {
                hierarchy.insert(
                    id.to_string(),
                    ParentFeature {
                        parents: rec
                            .pick_first_attr(&self.keys.parent_keys)
                            .map(split_gff3_parent_list)
                            .unwrap_or_default(),
                        symbol: rec.pick_first_attr(&self.keys.gene_symbol_keys).map(str::to_string),
                    },
                );
            }
            if !rec.is_feature(&self.keys.feature_types) {
                continue;
            }

            let Some(chr_id) = dict.contig_id(&rec.seqname) else {
                if unknown_contigs.insert(rec.seqname.clone()) {
                    tracing::warn!(contig = %rec.seqname, line = rec.line_no, "skipping annotation on contig missing from reference dictionary");
                }
                continue;
            };

            let own_symbol = rec.pick_first_attr(&self.keys.gene_symbol_keys).map(str::to_string);

            let (tx_keys, via_parent) = match rec.pick_first_attr(&self.keys.transcript_id_keys) {
                Some(k) => {
                    if own_symbol.is_none() {
                        return Err(self.missing_symbol(rec.line_no));
                    }
                    (vec![k.to_string()], false)
                }
                None => {
                    let raw = rec.pick_first_attr(&self.keys.parent_keys).ok_or_else(|| {
                        let mut keys = self.keys.transcript_id_keys.clone();
                        keys.extend(self.keys.parent_keys.iter().cloned());
                        AnnotationError::MissingAttribute {
                            line_no: rec.line_no,
                            keys,
                        }
                    })?;
                    (split_gff3_parent_list(raw), true)
                }
            };

            let span = Span::new(rec.start0, rec.end0);
            if let Some(len) = dict.length(chr_id) {
                if span.end > len {
                    return Err(AnnotationError::BadCoordinates {
                        line_no: rec.line_no,
                        message: format!(
                            "feature ends at {} past the end of {} ({len} bp)",
                            span.end, rec.seqname
                        ),
                    });
                }
            }
            for tx_key in tx_keys {
                match key_to_idx.get(&tx_key) {
                    Some(&i) => {
                        let tx = &mut pending[i];
                        if tx.chr_id != chr_id {
                            return Err(AnnotationError::MalformedLine {
                                line_no: rec.line_no,
                                message: format!("transcript '{tx_key}' spans several contigs"),
                            });
                        }
                        tx.span = tx.span.union(span);
                    }
                    None => {
                        key_to_idx.insert(tx_key.clone(), pending.len());
                        pending.push(PendingTranscript {
                            accession: tx_key,
                            line_no: rec.line_no,
                            own_symbol: own_symbol.clone(),
                            via_parent,
                            chr_id,
                            strand: rec.strand,
                            span,
                        });
                    }
                }
            }
        }

        let mut txs: Vec<TranscriptRecord> = Vec::with_capacity(pending.len());
        for (id, tx) in pending.into_iter().enumerate() {
            let inherited = if tx.via_parent {
                inherited_symbol(&hierarchy, &tx.accession)
            } else {
                None
            };
            let symbol = inherited
                .or(tx.own_symbol)
                .ok_or_else(|| self.missing_symbol(tx.line_no))?;
            // contig came from the dictionary, so the length is known
            let len = dict.length(tx.chr_id).unwrap_or(tx.span.end);
            txs.push(TranscriptRecord::from_forward(
                id,
                tx.accession,
                symbol,
                tx.chr_id,
                tx.strand,
                tx.span,
                len,
            ));
        }

        tracing::debug!(transcripts = txs.len(), skipped_contigs = unknown_contigs.len(), "annotation imported");
        Ok(txs)
    }

    fn missing_symbol(&self, line_no: usize) -> AnnotationError {
        AnnotationError::MissingAttribute {
            line_no,
            keys: self.keys.gene_symbol_keys.clone(),
        }
    }

    /// Import transcripts from a file path.
    ///
    /// - If path ends with `.gz`, uses the gzip decoder.
    /// - Otherwise reads as plain text.
    pub fn import_path<P: AsRef<Path>>(
        &self,
        path: P,
        dict: &ReferenceDictionary,
    ) -> anyhow::Result<Vec<TranscriptRecord>> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("open annotation file {}", path.display()))?;

        let is_gz = path.extension().map(|e| e == "gz").unwrap_or(false);

        let txs = if is_gz {
            let decoder = flate2::read::GzDecoder::new(file);
            self.import_reader(BufReader::new(decoder), dict)
        } else {
            self.import_reader(BufReader::new(file), dict)
        };
        txs.with_context(|| format!("import transcripts from {}", path.display()))
    }
}

/// A GFF3 feature with an `ID`, kept so `Parent` chains can be walked.
struct ParentFeature {
    parents: Vec<String>,
    symbol: Option<String>,
}

/// Symbol of the top-most ancestor of `id` that has one. The first parent is
/// followed at each level; cycles end the walk.
fn inherited_symbol(hierarchy: &HashMap<String, ParentFeature>, id: &str) -> Option<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut symbol = None;
    let mut current = id;
    while seen.insert(current) {
        let Some(feature) = hierarchy.get(current) else { break };
        if feature.symbol.is_some() {
            symbol = feature.symbol.as_deref();
        }
        match feature.parents.first() {
            Some(parent) => current = parent.as_str(),
            None => break,
        }
    }
    symbol.map(str::to_string)
}

/// Split Parent= list (GFF3) by commas; also trim whitespace.
fn split_gff3_parent_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

// -------------------- tests --------------------
