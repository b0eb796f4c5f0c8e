/// Internal numeric IDs (indexes into Vecs).
pub type GeneId = usize;
pub type TranscriptId = usize;

/// Position of a contig in the [`crate::reference::ReferenceDictionary`].
pub type ContigId = usize;
