//! Mendelian inheritance compatibility checks.
//!
//! Each [`SubModeOfInheritance`] dispatches to a free function taking the
//! cached pedigree queries and one gene's worth of [`GenotypeCalls`]. The
//! result is a [`CompatibleCalls`] bitset over the input positions; the input
//! calls are never touched. [`MendelianInheritanceChecker`] is the entry
//! point: it validates sample names and unions sub-mode results per mode.

pub mod checker;
pub mod comp_het;
pub mod dominant;
pub mod hom_alt;

use std::fmt;

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::genotype::GenotypeCalls;
use crate::pedigree::PedigreeQueries;

pub use checker::MendelianInheritanceChecker;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MendelError {
    #[error("sample '{sample}' in genotype calls is not a member of the pedigree")]
    PedigreeMismatch { sample: String },
}

/// Coarse mode of inheritance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModeOfInheritance {
    AutosomalDominant,
    AutosomalRecessive,
    XDominant,
    XRecessive,
    /// Pass-through; every call is compatible.
    Any,
}

impl ModeOfInheritance {
    /// Every mode that actually constrains the calls.
    pub const REAL: [ModeOfInheritance; 4] = [
        ModeOfInheritance::AutosomalDominant,
        ModeOfInheritance::AutosomalRecessive,
        ModeOfInheritance::XDominant,
        ModeOfInheritance::XRecessive,
    ];

    pub fn abbreviation(self) -> &'static str {
        match self {
            ModeOfInheritance::AutosomalDominant => "AD",
            ModeOfInheritance::AutosomalRecessive => "AR",
            ModeOfInheritance::XDominant => "XD",
            ModeOfInheritance::XRecessive => "XR",
            ModeOfInheritance::Any => "ANY",
        }
    }

    pub fn sub_modes(self) -> &'static [SubModeOfInheritance] {
        use SubModeOfInheritance as S;
        match self {
            ModeOfInheritance::AutosomalDominant => &[S::AutosomalDominant],
            ModeOfInheritance::AutosomalRecessive => {
                &[S::AutosomalRecessiveHomAlt, S::AutosomalRecessiveCompHet]
            }
            ModeOfInheritance::XDominant => &[S::XDominant],
            ModeOfInheritance::XRecessive => &[S::XRecessiveHomAlt, S::XRecessiveCompHet],
            ModeOfInheritance::Any => &[S::Any],
        }
    }
}

impl fmt::Display for ModeOfInheritance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Mode of inheritance with the recessive modes split by mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SubModeOfInheritance {
    AutosomalDominant,
    AutosomalRecessiveHomAlt,
    AutosomalRecessiveCompHet,
    XDominant,
    XRecessiveHomAlt,
    XRecessiveCompHet,
    Any,
}

impl SubModeOfInheritance {
    pub const REAL: [SubModeOfInheritance; 6] = [
        SubModeOfInheritance::AutosomalDominant,
        SubModeOfInheritance::AutosomalRecessiveHomAlt,
        SubModeOfInheritance::AutosomalRecessiveCompHet,
        SubModeOfInheritance::XDominant,
        SubModeOfInheritance::XRecessiveHomAlt,
        SubModeOfInheritance::XRecessiveCompHet,
    ];

    pub fn mode(self) -> ModeOfInheritance {
        match self {
            SubModeOfInheritance::AutosomalDominant => ModeOfInheritance::AutosomalDominant,
            SubModeOfInheritance::AutosomalRecessiveHomAlt
            | SubModeOfInheritance::AutosomalRecessiveCompHet => {
                ModeOfInheritance::AutosomalRecessive
            }
            SubModeOfInheritance::XDominant => ModeOfInheritance::XDominant,
            SubModeOfInheritance::XRecessiveHomAlt | SubModeOfInheritance::XRecessiveCompHet => {
                ModeOfInheritance::XRecessive
            }
            SubModeOfInheritance::Any => ModeOfInheritance::Any,
        }
    }

    /// Run this sub-mode's checker. Sample names are not validated here.
    pub fn filter_compatible(
        self,
        queries: &PedigreeQueries,
        calls: &[GenotypeCalls],
    ) -> CompatibleCalls {
        match self {
            SubModeOfInheritance::AutosomalDominant => dominant::autosomal_dominant(queries, calls),
            SubModeOfInheritance::AutosomalRecessiveHomAlt => {
                hom_alt::autosomal_recessive_hom_alt(queries, calls)
            }
            SubModeOfInheritance::AutosomalRecessiveCompHet => {
                comp_het::autosomal_recessive_comp_het(queries, calls)
            }
            SubModeOfInheritance::XDominant => dominant::x_dominant(queries, calls),
            SubModeOfInheritance::XRecessiveHomAlt => hom_alt::x_recessive_hom_alt(queries, calls),
            SubModeOfInheritance::XRecessiveCompHet => {
                comp_het::x_recessive_comp_het(queries, calls)
            }
            SubModeOfInheritance::Any => CompatibleCalls::all(calls.len()),
        }
    }
}

/// Set of compatible positions in a slice of [`GenotypeCalls`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibleCalls {
    bits: BitVec<u64, Lsb0>,
}

impl CompatibleCalls {
    /// Nothing compatible out of `n` calls.
    pub fn none(n: usize) -> Self {
        Self {
            bits: bitvec![u64, Lsb0; 0; n],
        }
    }

    /// Everything compatible out of `n` calls.
    pub fn all(n: usize) -> Self {
        Self {
            bits: bitvec![u64, Lsb0; 1; n],
        }
    }

    pub fn from_predicate<F>(calls: &[GenotypeCalls], mut pred: F) -> Self
    where
        F: FnMut(&GenotypeCalls) -> bool,
    {
        let mut out = Self::none(calls.len());
        for (i, c) in calls.iter().enumerate() {
            if pred(c) {
                out.mark(i);
            }
        }
        out
    }

    pub fn mark(&mut self, i: usize) {
        self.bits.set(i, true);
    }

    pub fn contains(&self, i: usize) -> bool {
        self.bits.get(i).map_or(false, |b| *b)
    }

    /// Number of input positions covered, compatible or not.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Number of compatible positions.
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    /// True when no position is compatible.
    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Compatible positions in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    pub fn union_with(&mut self, other: &CompatibleCalls) {
        debug_assert_eq!(self.len(), other.len());
        for i in other.bits.iter_ones() {
            self.bits.set(i, true);
        }
    }
}
