use std::collections::BTreeMap;

use crate::genotype::GenotypeCalls;
use crate::mendel::{CompatibleCalls, MendelError, ModeOfInheritance, SubModeOfInheritance};
use crate::pedigree::{Pedigree, PedigreeQueries};

/// Entry point for compatibility checks against one pedigree.
///
/// Every method first verifies that each sample named in the calls is a
/// pedigree member and fails the whole batch otherwise. Checks are pure; the
/// same batch always yields the same result.
///
/// # Example
/// ```
/// use genewise_mendel::genotype::{ChromosomeType, Genotype, GenotypeCalls};
/// use genewise_mendel::mendel::{MendelianInheritanceChecker, ModeOfInheritance};
/// use genewise_mendel::pedigree::{Disease, Pedigree, PersonSpec, Sex};
///
/// let ped = Pedigree::new("solo", vec![PersonSpec::new("p1", Sex::Female, Disease::Affected)]).unwrap();
/// let checker = MendelianInheritanceChecker::new(ped);
/// let calls = vec![
///     GenotypeCalls::new(ChromosomeType::Autosomal, vec![("p1", Genotype::HomAlt)]),
///     GenotypeCalls::new(ChromosomeType::Autosomal, vec![("p1", Genotype::Het)]),
/// ];
/// let ar = checker.filter_compatible(&calls, ModeOfInheritance::AutosomalRecessive).unwrap();
/// assert_eq!(ar.indices().collect::<Vec<_>>(), vec![0]);
/// ```
#[derive(Debug, Clone)]
pub struct MendelianInheritanceChecker {
    queries: PedigreeQueries,
}

impl MendelianInheritanceChecker {
    pub fn new(pedigree: Pedigree) -> Self {
        Self::from_queries(PedigreeQueries::new(pedigree))
    }

    pub fn from_queries(queries: PedigreeQueries) -> Self {
        Self { queries }
    }

    pub fn pedigree(&self) -> &Pedigree {
        self.queries.pedigree()
    }

    pub fn queries(&self) -> &PedigreeQueries {
        &self.queries
    }

    /// Calls compatible with `mode`: the union over its sub-modes.
    pub fn filter_compatible(
        &self,
        calls: &[GenotypeCalls],
        mode: ModeOfInheritance,
    ) -> Result<CompatibleCalls, MendelError> {
        self.verify_samples(calls)?;
        Ok(self.union_of_sub_modes(calls, mode))
    }

    pub fn filter_compatible_sub_mode(
        &self,
        calls: &[GenotypeCalls],
        sub_mode: SubModeOfInheritance,
    ) -> Result<CompatibleCalls, MendelError> {
        self.verify_samples(calls)?;
        Ok(sub_mode.filter_compatible(&self.queries, calls))
    }

    /// Results for all four constraining modes.
    pub fn check(
        &self,
        calls: &[GenotypeCalls],
    ) -> Result<BTreeMap<ModeOfInheritance, CompatibleCalls>, MendelError> {
        self.check_modes(calls, &ModeOfInheritance::REAL)
    }

    pub fn check_modes(
        &self,
        calls: &[GenotypeCalls],
        modes: &[ModeOfInheritance],
    ) -> Result<BTreeMap<ModeOfInheritance, CompatibleCalls>, MendelError> {
        self.verify_samples(calls)?;
        Ok(modes
            .iter()
            .map(|&mode| (mode, self.union_of_sub_modes(calls, mode)))
            .collect())
    }

    /// Results for all six constraining sub-modes.
    pub fn check_sub_modes(
        &self,
        calls: &[GenotypeCalls],
    ) -> Result<BTreeMap<SubModeOfInheritance, CompatibleCalls>, MendelError> {
        self.verify_samples(calls)?;
        Ok(SubModeOfInheritance::REAL
            .iter()
            .map(|&sub| (sub, sub.filter_compatible(&self.queries, calls)))
            .collect())
    }

    fn union_of_sub_modes(&self, calls: &[GenotypeCalls], mode: ModeOfInheritance) -> CompatibleCalls {
        let mut out = CompatibleCalls::none(calls.len());
        for sub in mode.sub_modes() {
            out.union_with(&sub.filter_compatible(&self.queries, calls));
        }
        out
    }

    fn verify_samples(&self, calls: &[GenotypeCalls]) -> Result<(), MendelError> {
        let pedigree = self.queries.pedigree();
        for name in calls.iter().flat_map(|c| c.sample_names()) {
            if !pedigree.has_person(name) {
                return Err(MendelError::PedigreeMismatch {
                    sample: name.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genotype::ChromosomeType::{Autosomal, X};
    use crate::genotype::Genotype::*;
    use crate::mendel::test_util::tri;
    use crate::pedigree::{Disease, PersonSpec, Sex};

    fn trio_checker() -> MendelianInheritanceChecker {
        let ped = Pedigree::new(
            "trio",
            vec![
                PersonSpec::new("dad", Sex::Male, Disease::Unaffected),
                PersonSpec::new("mom", Sex::Female, Disease::Unaffected),
                PersonSpec::new("kid", Sex::Male, Disease::Affected)
                    .father("dad")
                    .mother("mom"),
            ],
        )
        .unwrap();
        MendelianInheritanceChecker::new(ped)
    }

    fn gene_calls() -> Vec<GenotypeCalls> {
        vec![
            tri(Autosomal, Het, HomRef, Het),
            tri(Autosomal, HomRef, Het, Het),
            tri(Autosomal, Het, Het, HomAlt),
            tri(Autosomal, HomRef, HomRef, Het),
            tri(X, HomRef, Het, HomAlt),
        ]
    }

    #[test]
    fn modes_are_unions_of_sub_modes() {
        let checker = trio_checker();
        let calls = gene_calls();
        let modes = checker.check(&calls).unwrap();
        let subs = checker.check_sub_modes(&calls).unwrap();

        let idx = |c: &CompatibleCalls| c.indices().collect::<Vec<_>>();
        assert_eq!(idx(&subs[&SubModeOfInheritance::AutosomalRecessiveHomAlt]), vec![2]);
        assert_eq!(idx(&subs[&SubModeOfInheritance::AutosomalRecessiveCompHet]), vec![0, 1]);
        assert_eq!(idx(&modes[&ModeOfInheritance::AutosomalRecessive]), vec![0, 1, 2]);
        assert_eq!(idx(&modes[&ModeOfInheritance::AutosomalDominant]), vec![3]);
        assert_eq!(idx(&modes[&ModeOfInheritance::XRecessive]), vec![4]);
        // the unaffected mother carries it
        assert!(modes[&ModeOfInheritance::XDominant].is_empty());
        assert_eq!(modes.len(), 4);
    }

    #[test]
    fn any_returns_everything() {
        let checker = trio_checker();
        let calls = gene_calls();
        let any = checker.filter_compatible(&calls, ModeOfInheritance::Any).unwrap();
        assert_eq!(any.count(), calls.len());
    }

    #[test]
    fn unknown_sample_fails_whole_batch() {
        let checker = trio_checker();
        let mut calls = gene_calls();
        calls.push(GenotypeCalls::new(Autosomal, vec![("stranger", Het)]));
        let err = checker.check(&calls).unwrap_err();
        assert_eq!(
            err,
            MendelError::PedigreeMismatch {
                sample: "stranger".into()
            }
        );
        assert!(checker
            .filter_compatible(&calls, ModeOfInheritance::Any)
            .is_err());
    }

    #[test]
    fn checks_are_idempotent() {
        let checker = trio_checker();
        let calls = gene_calls();
        let first = checker.check_sub_modes(&calls).unwrap();
        let second = checker.check_sub_modes(&calls).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_batch_is_empty_result() {
        let checker = trio_checker();
        let modes = checker.check(&[]).unwrap();
        assert!(modes.values().all(|c| c.len() == 0 && c.is_empty()));
    }
}
