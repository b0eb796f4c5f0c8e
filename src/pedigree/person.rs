use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
    Unknown,
}

impl Sex {
    /// PED encoding: `1` male, `2` female, anything else unknown.
    pub fn from_ped_code(code: &str) -> Sex {
        match code {
            "1" => Sex::Male,
            "2" => Sex::Female,
            _ => Sex::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Disease {
    Affected,
    Unaffected,
    Unknown,
}

impl Disease {
    /// PED encoding: `1` unaffected, `2` affected, `0`/`-9`/other unknown.
    pub fn from_ped_code(code: &str) -> Disease {
        match code {
            "1" => Disease::Unaffected,
            "2" => Disease::Affected,
            _ => Disease::Unknown,
        }
    }
}

/// A pedigree member.
///
/// `father` and `mother` are positions in the owning pedigree's member list,
/// never owning links. `index` is this person's own position and the key
/// every genotype vector is aligned on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub father: Option<usize>,
    pub mother: Option<usize>,
    pub sex: Sex,
    pub disease: Disease,
    pub index: usize,
}

impl Person {
    #[inline]
    pub fn is_affected(&self) -> bool {
        self.disease == Disease::Affected
    }

    #[inline]
    pub fn is_unaffected(&self) -> bool {
        self.disease == Disease::Unaffected
    }

    #[inline]
    pub fn is_male(&self) -> bool {
        self.sex == Sex::Male
    }

    #[inline]
    pub fn is_female(&self) -> bool {
        self.sex == Sex::Female
    }

    /// No parent is known.
    pub fn is_founder(&self) -> bool {
        self.father.is_none() && self.mother.is_none()
    }

    pub fn has_parent(&self) -> bool {
        !self.is_founder()
    }
}

/// Unresolved input for one member; parents are referenced by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSpec {
    pub name: String,
    pub father: Option<String>,
    pub mother: Option<String>,
    pub sex: Sex,
    pub disease: Disease,
}

impl PersonSpec {
    pub fn new(name: impl Into<String>, sex: Sex, disease: Disease) -> Self {
        Self {
            name: name.into(),
            father: None,
            mother: None,
            sex,
            disease,
        }
    }

    pub fn father(mut self, name: impl Into<String>) -> Self {
        self.father = Some(name.into());
        self
    }

    pub fn mother(mut self, name: impl Into<String>) -> Self {
        self.mother = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ped_codes() {
        assert_eq!(Sex::from_ped_code("1"), Sex::Male);
        assert_eq!(Sex::from_ped_code("2"), Sex::Female);
        assert_eq!(Sex::from_ped_code("0"), Sex::Unknown);
        assert_eq!(Disease::from_ped_code("2"), Disease::Affected);
        assert_eq!(Disease::from_ped_code("1"), Disease::Unaffected);
        assert_eq!(Disease::from_ped_code("-9"), Disease::Unknown);
    }

    #[test]
    fn spec_builder_sets_parents() {
        let p = PersonSpec::new("kid", Sex::Female, Disease::Affected)
            .father("dad")
            .mother("mom");
        assert_eq!(p.father.as_deref(), Some("dad"));
        assert_eq!(p.mother.as_deref(), Some("mom"));
    }
}
