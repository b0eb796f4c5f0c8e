//! Crate-wide error handling.
//!
//! Every component owns a small `thiserror` enum for its own failure modes;
//! [`Error`] wraps them so callers driving the whole pipeline can use a single
//! `Result` type.

use thiserror::Error;

use crate::annotation::io::AnnotationError;
use crate::interval::IntervalError;
use crate::mendel::MendelError;
use crate::pedigree::PedigreeError;
use crate::reference::ReferenceError;
use crate::stream::StreamError;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// A malformed interval was handed to an index build.
    #[error(transparent)]
    Interval(#[from] IntervalError),

    /// Pedigree construction or PED parsing failed.
    #[error(transparent)]
    Pedigree(#[from] PedigreeError),

    /// A genotype batch did not fit the pedigree.
    #[error(transparent)]
    Mendel(#[from] MendelError),

    /// The variant stream violated its ordering contract.
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// GTF/GFF3 import failed.
    #[error(transparent)]
    Annotation(#[from] AnnotationError),

    /// Reference dictionary import or lookup failed.
    #[error(transparent)]
    Reference(#[from] ReferenceError),
}

/// Type alias for results using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_errors_convert_and_keep_message() {
        let err: Error = IntervalError::Malformed { begin: 10, end: 5 }.into();
        assert!(matches!(err, Error::Interval(_)));
        assert_eq!(err.to_string(), "malformed interval: end 5 < begin 10");

        let err: Error = MendelError::PedigreeMismatch {
            sample: "kid".into(),
        }
        .into();
        assert!(err.to_string().contains("kid"));
    }
}
