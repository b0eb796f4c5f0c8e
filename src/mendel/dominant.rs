//! Autosomal and X-linked dominant inheritance.

use crate::genotype::{ChromosomeType, GenotypeCalls};
use crate::mendel::CompatibleCalls;
use crate::pedigree::{PedigreeQueries, Person};

/// One shared heterozygous call in every affected, absent in every
/// unaffected. Only autosomal calls are considered.
pub fn autosomal_dominant(queries: &PedigreeQueries, calls: &[GenotypeCalls]) -> CompatibleCalls {
    CompatibleCalls::from_predicate(calls, |c| {
        c.chrom_type() == ChromosomeType::Autosomal
            && if queries.is_single_sample() {
                c.genotype_for_sample(&queries.members()[0].name).is_het()
            } else {
                autosomal_dominant_multi(queries.members(), c)
            }
    })
}

fn autosomal_dominant_multi(members: &[Person], calls: &GenotypeCalls) -> bool {
    let mut num_het = 0;
    for p in members {
        let gt = calls.genotype_for_sample(&p.name);
        if p.is_affected() {
            if gt.is_hom() {
                return false;
            }
            if gt.is_het() {
                num_het += 1;
            }
        } else if p.is_unaffected() && (gt.is_het() || gt.is_hom_alt()) {
            return false;
        }
    }
    num_het > 0
}

/// Dominant on X: females carry one copy, males may show a hemizygous call.
/// Only X calls are considered.
pub fn x_dominant(queries: &PedigreeQueries, calls: &[GenotypeCalls]) -> CompatibleCalls {
    CompatibleCalls::from_predicate(calls, |c| {
        PedigreeQueries::is_x_chromosomal(c.chrom_type())
            && if queries.is_single_sample() {
                let p = &queries.members()[0];
                let gt = c.genotype_for_sample(&p.name);
                if p.is_female() {
                    gt.is_het()
                } else {
                    gt.is_het() || gt.is_hom_alt()
                }
            } else {
                x_dominant_multi(queries.members(), c)
            }
    })
}

fn x_dominant_multi(members: &[Person], calls: &GenotypeCalls) -> bool {
    let mut num_carriers = 0;
    for p in members {
        let gt = calls.genotype_for_sample(&p.name);
        if p.is_affected() {
            if gt.is_hom_ref() || (p.is_female() && gt.is_hom_alt()) {
                return false;
            }
            if gt.is_het() || gt.is_hom_alt() {
                num_carriers += 1;
            }
        } else if p.is_unaffected() && (gt.is_het() || gt.is_hom_alt()) {
            return false;
        }
    }
    num_carriers > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genotype::ChromosomeType::{Autosomal, X};
    use crate::genotype::Genotype::*;
    use crate::mendel::test_util::{one, single, tri, trio};
    use crate::pedigree::Sex;

    fn hits(c: &CompatibleCalls) -> Vec<usize> {
        c.indices().collect()
    }

    #[test]
    fn ad_single_sample_needs_het() {
        let q = single(Sex::Female);
        let calls = vec![one(Autosomal, Het), one(Autosomal, HomAlt), one(X, Het)];
        assert_eq!(hits(&autosomal_dominant(&q, &calls)), vec![0]);
    }

    #[test]
    fn ad_trio_rules() {
        let q = trio(Sex::Male);
        let calls = vec![
            // de novo
            tri(Autosomal, HomRef, HomRef, Het),
            // inherited from an unaffected parent
            tri(Autosomal, Het, HomRef, Het),
            // affected homozygous
            tri(Autosomal, HomRef, HomRef, HomAlt),
            // affected not observed: no carrier
            tri(Autosomal, HomRef, HomRef, NotObserved),
            // parents missing
            tri(Autosomal, NotObserved, NotObserved, Het),
        ];
        assert_eq!(hits(&autosomal_dominant(&q, &calls)), vec![0, 4]);
    }

    #[test]
    fn xd_single_sample_depends_on_sex() {
        let calls = vec![one(X, Het), one(X, HomAlt), one(Autosomal, Het)];
        assert_eq!(hits(&x_dominant(&single(Sex::Female), &calls)), vec![0]);
        assert_eq!(hits(&x_dominant(&single(Sex::Male), &calls)), vec![0, 1]);
    }

    #[test]
    fn xd_trio_rules() {
        let girl = trio(Sex::Female);
        let boy = trio(Sex::Male);
        let calls = vec![
            tri(X, HomRef, HomRef, Het),
            tri(X, HomRef, HomRef, HomAlt),
            tri(X, HomRef, Het, Het),
            tri(Autosomal, HomRef, HomRef, Het),
        ];
        assert_eq!(hits(&x_dominant(&girl, &calls)), vec![0]);
        assert_eq!(hits(&x_dominant(&boy, &calls)), vec![0, 1]);
    }
}
