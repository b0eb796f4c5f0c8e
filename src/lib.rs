//! genewise_mendel
//!
//! Gene-wise Mendelian inheritance annotation for variants called in a
//! family. Genes are derived from transcript annotations and indexed per
//! contig; a coordinate-sorted variant stream is buffered per gene and, once
//! a gene is behind the stream, its variants are checked for compatibility
//! with dominant and recessive (homozygous or compound-heterozygous)
//! autosomal and X-linked inheritance. Coordinates are 0-based, half-open.

pub mod types;
pub mod model;
pub mod annotation;
pub mod index;
pub mod interval;
pub mod reference;
pub mod pedigree;
pub mod genotype;
pub mod mendel;
pub mod stream;
pub mod error;

pub use error::{Error, Result};

pub use index::GeneIndex;
pub use interval::{Interval, IntervalIndex, QueryResult};
pub use reference::ReferenceDictionary;

pub use annotation::{AttributeKeys, TranscriptImporter};

pub use types::{Span, Strand};

pub use model::transcript::TranscriptRecord;
pub use model::gene::Gene;
pub use model::types::{ContigId, GeneId, TranscriptId};

pub use pedigree::{Disease, Pedigree, PedigreeQueries, Person, PersonSpec, Sex};
pub use genotype::{ChromosomeType, Genotype, GenotypeCalls};
pub use mendel::{CompatibleCalls, MendelianInheritanceChecker, ModeOfInheritance, SubModeOfInheritance};
pub use stream::{AnnotatedVariant, GeneWiseProcessor, ProcessorOptions, ProcessorStats, VariantRecord};
