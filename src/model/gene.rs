use std::hash::{Hash, Hasher};

use crate::model::types::{ContigId, GeneId, TranscriptId};
use crate::types::Span;
use serde::{Serialize, Deserialize};

/// Gene model: the union of all transcripts sharing a symbol on one contig.
///
/// Notes:
/// - `region` is the forward-strand bounding box of the transcripts.
/// - Identity is the symbol alone; two `Gene`s with the same symbol compare
///   equal regardless of their regions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gene {
    pub id: GeneId,
    pub symbol: String,
    pub chr_id: ContigId,
    pub region: Span,
    transcript_ids: Vec<TranscriptId>,
}

impl Gene {
    pub fn new(id: GeneId, symbol: impl Into<String>, chr_id: ContigId, region: Span) -> Self {
        Self {
            id,
            symbol: symbol.into(),
            chr_id,
            region,
            transcript_ids: Vec::new(),
        }
    }

    /// Add a transcript, growing the region to cover its forward span.
    pub fn add_transcript(&mut self, tx_id: TranscriptId, forward: Span) {
        if self.transcript_ids.is_empty() {
            self.region = forward;
        } else {
            self.region = self.region.union(forward);
        }
        self.transcript_ids.push(tx_id);
    }

    pub fn transcript_ids(&self) -> &[TranscriptId] {
        &self.transcript_ids
    }

    /// Sort transcript IDs and remove duplicates.
    pub fn finalize(&mut self) {
        self.transcript_ids.sort_unstable();
        self.transcript_ids.dedup();
    }
}

impl PartialEq for Gene {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

impl Eq for Gene {}

impl Hash for Gene {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.symbol.hash(state);
    }
}
