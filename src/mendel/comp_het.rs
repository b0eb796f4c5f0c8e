//! Compound-heterozygous recessive inheritance.
//!
//! For every affected member with a known parent, calls are split into a
//! paternal side (allele could come from the father only) and a maternal side.
//! Every cross pair is a [`Candidate`]; a candidate that survives the checks
//! around all affected and all unaffected members marks both of its calls
//! compatible. The X-linked variant reuses the same machinery with relaxed
//! rules for hemizygous males.

use crate::genotype::{ChromosomeType, Genotype, GenotypeCalls};
use crate::mendel::CompatibleCalls;
use crate::pedigree::{Pedigree, PedigreeQueries, Person};

/// Rule set distinguishing the autosomal and X-linked searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Linkage {
    Autosomal,
    X,
}

impl Linkage {
    fn applies_to(self, chrom_type: ChromosomeType) -> bool {
        match self {
            Linkage::Autosomal => chrom_type == ChromosomeType::Autosomal,
            Linkage::X => PedigreeQueries::is_x_chromosomal(chrom_type),
        }
    }
}

/// Proposed pair of causal calls for one affected member, by input position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    paternal: usize,
    maternal: usize,
}

pub fn autosomal_recessive_comp_het(
    queries: &PedigreeQueries,
    calls: &[GenotypeCalls],
) -> CompatibleCalls {
    if queries.is_single_sample() {
        single_sample(queries, calls, Linkage::Autosomal)
    } else {
        multi_sample(queries, calls, Linkage::Autosomal)
    }
}

pub fn x_recessive_comp_het(queries: &PedigreeQueries, calls: &[GenotypeCalls]) -> CompatibleCalls {
    if queries.is_single_sample() {
        if queries.members()[0].is_male() {
            CompatibleCalls::none(calls.len())
        } else {
            single_sample(queries, calls, Linkage::X)
        }
    } else {
        multi_sample(queries, calls, Linkage::X)
    }
}

/// All heterozygous calls, provided there are at least two.
fn single_sample(queries: &PedigreeQueries, calls: &[GenotypeCalls], linkage: Linkage) -> CompatibleCalls {
    let name = &queries.members()[0].name;
    let hets = CompatibleCalls::from_predicate(calls, |c| {
        linkage.applies_to(c.chrom_type()) && c.genotype_for_sample(name).is_het()
    });
    if hets.count() >= 2 {
        hets
    } else {
        CompatibleCalls::none(calls.len())
    }
}

fn multi_sample(queries: &PedigreeQueries, calls: &[GenotypeCalls], linkage: Linkage) -> CompatibleCalls {
    let pedigree = queries.pedigree();
    let relevant: Vec<usize> = (0..calls.len())
        .filter(|&i| linkage.applies_to(calls[i].chrom_type()))
        .collect();

    let mut out = CompatibleCalls::none(calls.len());
    for index in queries
        .members()
        .iter()
        .filter(|p| p.is_affected() && p.has_parent())
    {
        let father = pedigree.father_of(index);
        let mother = pedigree.mother_of(index);
        let trio = Trio {
            child: index,
            father,
            mother,
        };

        let paternal: Vec<usize> = relevant
            .iter()
            .copied()
            .filter(|&i| trio.is_paternal_side(&calls[i], linkage))
            .collect();
        let maternal: Vec<usize> = relevant
            .iter()
            .copied()
            .filter(|&i| trio.is_maternal_side(&calls[i], linkage))
            .collect();

        for &p in &paternal {
            if trio.all_not_observed(&calls[p]) {
                continue;
            }
            for &m in &maternal {
                if p == m || trio.all_not_observed(&calls[m]) {
                    continue;
                }
                let candidate = Candidate {
                    paternal: p,
                    maternal: m,
                };
                if is_compatible_with_trios_around_affecteds(queries, calls, candidate, linkage)
                    && is_compatible_with_unaffecteds(queries, calls, candidate, linkage)
                {
                    out.mark(p);
                    out.mark(m);
                }
            }
        }
    }
    out
}

/// An affected member and their known parents.
struct Trio<'a> {
    child: &'a Person,
    father: Option<&'a Person>,
    mother: Option<&'a Person>,
}

impl Trio<'_> {
    fn child_may_carry(&self, gt: Genotype, linkage: Linkage) -> bool {
        gt.is_het()
            || gt.is_not_observed()
            || (linkage == Linkage::X && !self.child.is_female() && gt.is_hom_alt())
    }

    /// Allele transmitted by the father: he carries it, the mother does not.
    fn is_paternal_side(&self, calls: &GenotypeCalls, linkage: Linkage) -> bool {
        self.child_may_carry(calls.genotype_for_sample(&self.child.name), linkage)
            && self.father.map_or(true, |f| {
                let gt = calls.genotype_for_sample(&f.name);
                gt.is_het() || gt.is_not_observed()
            })
            && self.mother.map_or(true, |m| {
                let gt = calls.genotype_for_sample(&m.name);
                gt.is_not_observed() || gt.is_hom_ref()
            })
    }

    fn is_maternal_side(&self, calls: &GenotypeCalls, linkage: Linkage) -> bool {
        self.child_may_carry(calls.genotype_for_sample(&self.child.name), linkage)
            && self.mother.map_or(true, |m| {
                let gt = calls.genotype_for_sample(&m.name);
                gt.is_het() || gt.is_not_observed()
            })
            && self.father.map_or(true, |f| {
                let gt = calls.genotype_for_sample(&f.name);
                gt.is_not_observed() || gt.is_hom_ref()
            })
    }

    fn all_not_observed(&self, calls: &GenotypeCalls) -> bool {
        [Some(self.child), self.father, self.mother]
            .into_iter()
            .flatten()
            .all(|p| calls.genotype_for_sample(&p.name).is_not_observed())
    }
}

fn gt(calls: &GenotypeCalls, p: &Person) -> Genotype {
    calls.genotype_for_sample(&p.name)
}

fn is_compatible_with_trios_around_affecteds(
    queries: &PedigreeQueries,
    calls: &[GenotypeCalls],
    candidate: Candidate,
    linkage: Linkage,
) -> bool {
    let pedigree: &Pedigree = queries.pedigree();
    let pat = &calls[candidate.paternal];
    let mat = &calls[candidate.maternal];

    for affected in queries.members().iter().filter(|p| p.is_affected()) {
        // the affected member must carry both alleles
        let forbidden_in_affected = |g: Genotype| match linkage {
            Linkage::Autosomal => g.is_hom(),
            Linkage::X => g.is_hom_ref() || (affected.is_female() && g.is_hom_alt()),
        };
        if forbidden_in_affected(gt(pat, affected)) || forbidden_in_affected(gt(mat, affected)) {
            return false;
        }

        if let Some(father) = pedigree.father_of(affected) {
            let g = gt(pat, father);
            let forbidden = match linkage {
                Linkage::Autosomal => g.is_hom(),
                Linkage::X => g.is_hom_ref(),
            };
            if forbidden {
                return false;
            }
        }
        if let Some(mother) = pedigree.mother_of(affected) {
            if gt(mat, mother).is_hom() {
                return false;
            }
        }

        let sib_has_both = queries
            .siblings_of(affected)
            .filter(|s| s.is_unaffected())
            .any(|s| gt(pat, s).is_het() && gt(mat, s).is_het());
        if sib_has_both {
            return false;
        }
    }
    true
}

fn is_compatible_with_unaffecteds(
    queries: &PedigreeQueries,
    calls: &[GenotypeCalls],
    candidate: Candidate,
    linkage: Linkage,
) -> bool {
    let pedigree = queries.pedigree();
    let pat = &calls[candidate.paternal];
    let mat = &calls[candidate.maternal];

    for unaffected in queries.members().iter().filter(|p| p.is_unaffected()) {
        let pat_gt = gt(pat, unaffected);
        let mat_gt = gt(mat, unaffected);
        if pat_gt.is_hom_alt() || mat_gt.is_hom_alt() {
            return false;
        }
        if linkage == Linkage::X && unaffected.is_male() && (pat_gt.is_het() || mat_gt.is_het()) {
            return false;
        }
        if !(pat_gt.is_het() && mat_gt.is_het()) {
            continue;
        }

        // both alleles in trans in an unaffected member; the X-linked search
        // applies this autosomal phase rule unchanged
        if let (Some(father), Some(mother)) = (pedigree.father_of(unaffected), pedigree.mother_of(unaffected)) {
            let (pf, pm) = (gt(pat, father), gt(pat, mother));
            let (mf, mm) = (gt(mat, father), gt(mat, mother));
            let in_trans = (pf.is_het() && pm.is_hom_ref() && mf.is_hom_ref() && mm.is_het())
                || (pf.is_hom_ref() && pm.is_het() && mf.is_het() && mm.is_hom_ref());
            if in_trans {
                return false;
            }
        }
    }
    true
}
