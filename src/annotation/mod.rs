pub mod io;
pub mod builder;

pub use builder::{AttributeKeys, TranscriptImporter};
