use std::collections::BTreeSet;

use crate::genotype::ChromosomeType;
use crate::pedigree::{Pedigree, Person};

/// A pedigree plus the derived member sets the inheritance checkers need.
///
/// Everything is computed once in [`PedigreeQueries::new`]; the type is
/// read-only afterwards and can be shared between threads.
#[derive(Debug, Clone)]
pub struct PedigreeQueries {
    pedigree: Pedigree,
    /// Indexed by member index.
    siblings: Vec<Vec<usize>>,
    unaffected_parent_names_of_affecteds: BTreeSet<String>,
    unaffected_names: BTreeSet<String>,
    affected_female_parent_names: BTreeSet<String>,
    unaffected_mother_names_of_affecteds: BTreeSet<String>,
}

impl PedigreeQueries {
    pub fn new(pedigree: Pedigree) -> Self {
        let members = pedigree.members();

        let siblings: Vec<Vec<usize>> = members
            .iter()
            .map(|p| {
                members
                    .iter()
                    .filter(|q| q.index != p.index && shares_parent(p, q))
                    .map(|q| q.index)
                    .collect::<Vec<usize>>()
            })
            .collect();

        let parents_of = |filter: &dyn Fn(&Person) -> bool| -> BTreeSet<String> {
            members
                .iter()
                .filter(|p| filter(p))
                .flat_map(|p| [p.father, p.mother])
                .flatten()
                .map(|i| members[i].name.clone())
                .collect()
        };

        let unaffected_parent_names_of_affecteds: BTreeSet<String> = parents_of(&|p: &Person| p.is_affected())
            .into_iter()
            .filter(|n| pedigree.member_by_name(n).map_or(false, Person::is_unaffected))
            .collect();

        let affected_female_parent_names = parents_of(&|p: &Person| p.is_affected() && p.is_female());

        let unaffected_mother_names_of_affecteds: BTreeSet<String> = members
            .iter()
            .filter(|p| p.is_affected())
            .filter_map(|p| pedigree.mother_of(p))
            .filter(|m| m.is_unaffected())
            .map(|m| m.name.clone())
            .collect();

        let unaffected_names: BTreeSet<String> = members
            .iter()
            .filter(|p| p.is_unaffected())
            .map(|p| p.name.clone())
            .collect();

        Self {
            siblings,
            unaffected_parent_names_of_affecteds,
            unaffected_names,
            affected_female_parent_names,
            unaffected_mother_names_of_affecteds,
            pedigree,
        }
    }

    pub fn pedigree(&self) -> &Pedigree {
        &self.pedigree
    }

    pub fn members(&self) -> &[Person] {
        self.pedigree.members()
    }

    pub fn is_single_sample(&self) -> bool {
        self.pedigree.len() == 1
    }

    /// Members sharing at least one known parent with `person`.
    pub fn siblings_of(&self, person: &Person) -> impl Iterator<Item = &Person> {
        self.siblings[person.index]
            .iter()
            .map(move |&i| &self.pedigree.members()[i])
    }

    /// Unaffected fathers and mothers of affected members.
    pub fn unaffected_parent_names_of_affecteds(&self) -> &BTreeSet<String> {
        &self.unaffected_parent_names_of_affecteds
    }

    pub fn unaffected_names(&self) -> &BTreeSet<String> {
        &self.unaffected_names
    }

    /// Parents (of either sex and status) of affected female members.
    pub fn affected_female_parent_names(&self) -> &BTreeSet<String> {
        &self.affected_female_parent_names
    }

    /// Unaffected mothers of affected members.
    pub fn unaffected_mother_names_of_affecteds(&self) -> &BTreeSet<String> {
        &self.unaffected_mother_names_of_affecteds
    }

    /// Only calls on the X chromosome take part in X-linked checks.
    pub fn is_x_chromosomal(chrom_type: ChromosomeType) -> bool {
        chrom_type == ChromosomeType::X
    }
}

fn shares_parent(a: &Person, b: &Person) -> bool {
    (a.father.is_some() && a.father == b.father) || (a.mother.is_some() && a.mother == b.mother)
}
