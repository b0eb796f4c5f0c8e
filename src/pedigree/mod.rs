//! Family graph: members, parent links, sex and affection status.
//!
//! Members live in one `Vec`; parents are stored as indices into it, so the
//! graph has no ownership cycles. A `Pedigree` never changes after
//! construction. Derived sets used by the inheritance checkers are cached in
//! [`queries::PedigreeQueries`].

pub mod ped;
pub mod person;
pub mod queries;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use ped::{PedFileContents, PedPerson};
pub use person::{Disease, Person, PersonSpec, Sex};
pub use queries::PedigreeQueries;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PedigreeError {
    #[error("pedigree '{pedigree}': parent '{parent}' of '{person}' is not a member")]
    UnknownParent {
        pedigree: String,
        person: String,
        parent: String,
    },

    #[error("pedigree '{pedigree}': member '{person}' listed twice")]
    DuplicateMember { pedigree: String, person: String },

    #[error("no family '{0}' in PED file")]
    UnknownFamily(String),

    #[error("PED parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pedigree {
    name: String,
    members: Vec<Person>,
    name_to_index: HashMap<String, usize>,
}

impl Pedigree {
    /// Resolve parent names and build the pedigree.
    ///
    /// Fails if a name appears twice or a parent is not in `members`; no
    /// partial pedigree is returned.
    ///
    /// # Example
    /// ```
    /// use genewise_mendel::pedigree::{Disease, Pedigree, PersonSpec, Sex};
    ///
    /// let ped = Pedigree::new("fam", vec![
    ///     PersonSpec::new("dad", Sex::Male, Disease::Unaffected),
    ///     PersonSpec::new("mom", Sex::Female, Disease::Unaffected),
    ///     PersonSpec::new("kid", Sex::Female, Disease::Affected).father("dad").mother("mom"),
    /// ]).unwrap();
    ///
    /// let kid = ped.member_by_name("kid").unwrap();
    /// assert_eq!(kid.father, Some(0));
    /// assert_eq!(kid.index, 2);
    /// ```
    pub fn new(name: impl Into<String>, members: Vec<PersonSpec>) -> Result<Self, PedigreeError> {
        let name = name.into();

        let mut name_to_index: HashMap<String, usize> = HashMap::with_capacity(members.len());
        for (i, m) in members.iter().enumerate() {
            if name_to_index.insert(m.name.clone(), i).is_some() {
                return Err(PedigreeError::DuplicateMember {
                    pedigree: name,
                    person: m.name.clone(),
                });
            }
        }

        let resolve = |person: &str, parent: &Option<String>| -> Result<Option<usize>, PedigreeError> {
            match parent {
                None => Ok(None),
                Some(p) => name_to_index.get(p).copied().map(Some).ok_or_else(|| {
                    PedigreeError::UnknownParent {
                        pedigree: name.clone(),
                        person: person.to_string(),
                        parent: p.clone(),
                    }
                }),
            }
        };

        let mut people = Vec::with_capacity(members.len());
        for (index, m) in members.iter().enumerate() {
            people.push(Person {
                name: m.name.clone(),
                father: resolve(&m.name, &m.father)?,
                mother: resolve(&m.name, &m.mother)?,
                sex: m.sex,
                disease: m.disease,
                index,
            });
        }

        tracing::debug!(pedigree = %name, members = people.len(), "pedigree built");

        Ok(Self {
            name,
            members: people,
            name_to_index,
        })
    }

    /// Build the pedigree of one family from parsed PED contents.
    ///
    /// Parent codes of `0` mean unknown; a named parent from another family
    /// is an error.
    pub fn from_ped(contents: &PedFileContents, family: &str) -> Result<Self, PedigreeError> {
        let members: Vec<PersonSpec> = contents
            .individuals
            .iter()
            .filter(|p| p.family == family)
            .map(PedPerson::to_spec)
            .collect();
        if members.is_empty() {
            return Err(PedigreeError::UnknownFamily(family.to_string()));
        }
        Self::new(family, members)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[Person] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn has_person(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    pub fn member_by_name(&self, name: &str) -> Option<&Person> {
        self.name_to_index.get(name).map(|&i| &self.members[i])
    }

    pub fn father_of(&self, person: &Person) -> Option<&Person> {
        person.father.map(|i| &self.members[i])
    }

    pub fn mother_of(&self, person: &Person) -> Option<&Person> {
        person.mother.map(|i| &self.members[i])
    }

    /// Member names in member order.
    pub fn names(&self) -> Vec<&str> {
        self.members.iter().map(|p| p.name.as_str()).collect()
    }

    /// Restrict to the members named in `names`, keeping member order.
    ///
    /// Parents outside the subset become unknown.
    pub fn subset_of_members<S: AsRef<str>>(&self, names: &[S]) -> Pedigree {
        let keep: Vec<&Person> = self
            .members
            .iter()
            .filter(|p| names.iter().any(|n| n.as_ref() == p.name))
            .collect();
        let kept_name = |i: Option<usize>| {
            i.map(|i| &self.members[i])
                .filter(|parent| keep.iter().any(|k| k.index == parent.index))
                .map(|parent| parent.name.clone())
        };
        let specs = keep
            .iter()
            .map(|p| PersonSpec {
                name: p.name.clone(),
                father: kept_name(p.father),
                mother: kept_name(p.mother),
                sex: p.sex,
                disease: p.disease,
            })
            .collect();
        // parents were filtered to kept members and names are unique
        Pedigree::new(self.name.clone(), specs).unwrap_or_else(|e| {
            unreachable!("subset of a valid pedigree failed to build: {e}")
        })
    }
}
