pub mod types;
pub mod transcript;
pub mod gene;

pub use types::{ContigId, GeneId, TranscriptId};
