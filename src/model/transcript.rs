use crate::model::types::{ContigId, TranscriptId};
use crate::reference::ReferenceDictionary;
use crate::types::{Span, Strand};
use serde::{Serialize, Deserialize};

/// One transcript as supplied by the transcript database.
///
/// `span` is 0-based half-open and expressed on the transcript's own strand:
/// for `Strand::Minus` positions count from the 3' end of the contig.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub id: TranscriptId,
    pub accession: String,
    pub gene_symbol: String,
    pub chr_id: ContigId,
    pub strand: Strand,
    pub span: Span,
}

impl TranscriptRecord {
    pub fn new(
        id: TranscriptId,
        accession: impl Into<String>,
        gene_symbol: impl Into<String>,
        chr_id: ContigId,
        strand: Strand,
        span: Span,
    ) -> Self {
        Self {
            id,
            accession: accession.into(),
            gene_symbol: gene_symbol.into(),
            chr_id,
            strand,
            span,
        }
    }

    /// Build a record from forward-strand coordinates (as found in GTF files),
    /// converting to the transcript's strand when it is `Minus`.
    pub fn from_forward(
        id: TranscriptId,
        accession: impl Into<String>,
        gene_symbol: impl Into<String>,
        chr_id: ContigId,
        strand: Strand,
        forward: Span,
        contig_len: u32,
    ) -> Self {
        // the mapping is its own inverse
        let span = forward.to_forward(strand, contig_len);
        Self::new(id, accession, gene_symbol, chr_id, strand, span)
    }

    /// Transcript span on the forward strand.
    ///
    /// Returns `None` when the contig is not in `dict`.
    pub fn forward_span(&self, dict: &ReferenceDictionary) -> Option<Span> {
        let len = dict.length(self.chr_id)?;
        Some(self.span.to_forward(self.strand, len))
    }
}
