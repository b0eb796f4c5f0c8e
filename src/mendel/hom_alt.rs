//! Recessive inheritance through a homozygous (or hemizygous) alt call.

use crate::genotype::{ChromosomeType, GenotypeCalls};
use crate::mendel::CompatibleCalls;
use crate::pedigree::PedigreeQueries;

pub fn autosomal_recessive_hom_alt(
    queries: &PedigreeQueries,
    calls: &[GenotypeCalls],
) -> CompatibleCalls {
    CompatibleCalls::from_predicate(calls, |c| {
        c.chrom_type() == ChromosomeType::Autosomal
            && if queries.is_single_sample() {
                c.genotype_for_sample(&queries.members()[0].name).is_hom_alt()
            } else {
                ar_affecteds_compatible(queries, c)
                    && ar_parents_compatible(queries, c)
                    && unaffecteds_not_hom_alt(queries, c)
            }
    })
}

fn ar_affecteds_compatible(queries: &PedigreeQueries, calls: &GenotypeCalls) -> bool {
    let mut num_hom_alt = 0;
    for p in queries.members().iter().filter(|p| p.is_affected()) {
        let gt = calls.genotype_for_sample(&p.name);
        if gt.is_hom_ref() || gt.is_het() {
            return false;
        }
        if gt.is_hom_alt() {
            num_hom_alt += 1;
        }
    }
    num_hom_alt > 0
}

/// Unaffected parents of affecteds are obligate carriers.
fn ar_parents_compatible(queries: &PedigreeQueries, calls: &GenotypeCalls) -> bool {
    queries
        .unaffected_parent_names_of_affecteds()
        .iter()
        .all(|name| !calls.genotype_for_sample(name).is_hom())
}

fn unaffecteds_not_hom_alt(queries: &PedigreeQueries, calls: &GenotypeCalls) -> bool {
    queries
        .unaffected_names()
        .iter()
        .all(|name| !calls.genotype_for_sample(name).is_hom_alt())
}

/// Males are hemizygous on X, so a heterozygous male call counts as a
/// carrier. Only X calls are considered.
pub fn x_recessive_hom_alt(queries: &PedigreeQueries, calls: &[GenotypeCalls]) -> CompatibleCalls {
    // an unaffected father of an affected daughter rules out the mode for
    // every call, whatever the genotypes
    let structurally_possible = queries.members().iter().all(|p| {
        !(p.is_unaffected()
            && p.is_male()
            && queries.affected_female_parent_names().contains(&p.name))
    });

    CompatibleCalls::from_predicate(calls, |c| {
        if !PedigreeQueries::is_x_chromosomal(c.chrom_type()) {
            return false;
        }
        if queries.is_single_sample() {
            let p = &queries.members()[0];
            let gt = c.genotype_for_sample(&p.name);
            return gt.is_hom_alt() || (gt.is_het() && !p.is_female());
        }
        structurally_possible
            && xr_affecteds_compatible(queries, c)
            && xr_mothers_compatible(queries, c)
            && xr_unaffecteds_compatible(queries, c)
    })
}

fn xr_affecteds_compatible(queries: &PedigreeQueries, calls: &GenotypeCalls) -> bool {
    let mut num_mut = 0;
    for p in queries.members().iter().filter(|p| p.is_affected()) {
        let gt = calls.genotype_for_sample(&p.name);
        if gt.is_hom_ref() || (p.is_female() && gt.is_het()) {
            return false;
        }
        if gt.is_hom_alt() || (!p.is_female() && gt.is_het()) {
            num_mut += 1;
        }
    }
    num_mut > 0
}

/// Unaffected mothers of affecteds must be carriers.
fn xr_mothers_compatible(queries: &PedigreeQueries, calls: &GenotypeCalls) -> bool {
    queries
        .unaffected_mother_names_of_affecteds()
        .iter()
        .all(|name| !calls.genotype_for_sample(name).is_hom())
}

fn xr_unaffecteds_compatible(queries: &PedigreeQueries, calls: &GenotypeCalls) -> bool {
    queries
        .members()
        .iter()
        .filter(|p| p.is_unaffected())
        .all(|p| {
            let gt = calls.genotype_for_sample(&p.name);
            !(gt.is_hom_alt() || (p.is_male() && gt.is_het()))
        })
}
