//! Per-variant genotype calls of the pedigree members.

use serde::{Deserialize, Serialize};

/// Zygosity of one sample at one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genotype {
    HomRef,
    Het,
    HomAlt,
    NotObserved,
}

impl Genotype {
    /// Classify a call from its allele numbers; `None` is a missing allele.
    ///
    /// Only observed alleles count: no observed allele gives `NotObserved`,
    /// all observed alleles `0` give `HomRef`, all observed alleles equal and
    /// non-zero give `HomAlt`, anything else is `Het`. Haploid calls follow
    /// the same rule, so a hemizygous `1` is `HomAlt`.
    ///
    /// ```
    /// use genewise_mendel::genotype::Genotype;
    ///
    /// assert_eq!(Genotype::from_allele_calls(&[Some(0), Some(1)]), Genotype::Het);
    /// assert_eq!(Genotype::from_allele_calls(&[Some(1)]), Genotype::HomAlt);
    /// assert_eq!(Genotype::from_allele_calls(&[None, None]), Genotype::NotObserved);
    /// ```
    pub fn from_allele_calls(alleles: &[Option<u32>]) -> Genotype {
        let mut observed = alleles.iter().flatten();
        let Some(&first) = observed.next() else {
            return Genotype::NotObserved;
        };
        if observed.any(|&a| a != first) {
            Genotype::Het
        } else if first == 0 {
            Genotype::HomRef
        } else {
            Genotype::HomAlt
        }
    }

    #[inline]
    pub fn is_het(self) -> bool {
        self == Genotype::Het
    }

    #[inline]
    pub fn is_hom_ref(self) -> bool {
        self == Genotype::HomRef
    }

    #[inline]
    pub fn is_hom_alt(self) -> bool {
        self == Genotype::HomAlt
    }

    #[inline]
    pub fn is_not_observed(self) -> bool {
        self == Genotype::NotObserved
    }

    /// `HomRef` or `HomAlt`.
    #[inline]
    pub fn is_hom(self) -> bool {
        self.is_hom_ref() || self.is_hom_alt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChromosomeType {
    Autosomal,
    X,
    Y,
    Mitochondrial,
}

impl ChromosomeType {
    /// Guess the type from a contig name (`X`, `chrX`, `MT`, `chrM`, ...).
    pub fn from_contig_name(name: &str) -> ChromosomeType {
        let bare = name.strip_prefix("chr").unwrap_or(name);
        match bare {
            "X" | "x" | "23" => ChromosomeType::X,
            "Y" | "y" | "24" => ChromosomeType::Y,
            "M" | "MT" | "m" | "mt" => ChromosomeType::Mitochondrial,
            _ => ChromosomeType::Autosomal,
        }
    }
}

/// Genotype calls of one variant, one entry per sample.
///
/// Samples are normally listed in pedigree member order; lookups are by name
/// so any order works. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenotypeCalls {
    chrom_type: ChromosomeType,
    samples: Vec<String>,
    genotypes: Vec<Genotype>,
}

impl GenotypeCalls {
    pub fn new<I, S>(chrom_type: ChromosomeType, calls: I) -> Self
    where
        I: IntoIterator<Item = (S, Genotype)>,
        S: Into<String>,
    {
        let (samples, genotypes) = calls.into_iter().map(|(s, g)| (s.into(), g)).unzip();
        Self {
            chrom_type,
            samples,
            genotypes,
        }
    }

    pub fn chrom_type(&self) -> ChromosomeType {
        self.chrom_type
    }

    pub fn sample_names(&self) -> &[String] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Call for `name`; samples without a call are `NotObserved`.
    pub fn genotype_for_sample(&self, name: &str) -> Genotype {
        self.samples
            .iter()
            .position(|s| s == name)
            .map_or(Genotype::NotObserved, |i| self.genotypes[i])
    }

    /// Call by column number; out-of-range is `NotObserved`.
    pub fn genotype_by_sample_no(&self, i: usize) -> Genotype {
        self.genotypes.get(i).copied().unwrap_or(Genotype::NotObserved)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Genotype)> {
        self.samples
            .iter()
            .map(String::as_str)
            .zip(self.genotypes.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_observed_is_no_zygosity() {
        let g = Genotype::NotObserved;
        assert!(!g.is_het() && !g.is_hom_ref() && !g.is_hom_alt() && !g.is_hom());
        assert!(g.is_not_observed());
    }

    #[test]
    fn allele_calls_only_count_observed_alleles() {
        assert_eq!(Genotype::from_allele_calls(&[Some(0), Some(0)]), Genotype::HomRef);
        assert_eq!(Genotype::from_allele_calls(&[Some(2), Some(2)]), Genotype::HomAlt);
        assert_eq!(Genotype::from_allele_calls(&[Some(1), Some(2)]), Genotype::Het);
        assert_eq!(Genotype::from_allele_calls(&[None, Some(1)]), Genotype::HomAlt);
        assert_eq!(Genotype::from_allele_calls(&[Some(0), None]), Genotype::HomRef);
        assert_eq!(Genotype::from_allele_calls(&[]), Genotype::NotObserved);
    }

    #[test]
    fn lookup_by_name_and_column() {
        let calls = GenotypeCalls::new(
            ChromosomeType::X,
            vec![("dad", Genotype::HomRef), ("kid", Genotype::Het)],
        );
        assert_eq!(calls.chrom_type(), ChromosomeType::X);
        assert_eq!(calls.genotype_for_sample("kid"), Genotype::Het);
        assert_eq!(calls.genotype_for_sample("mom"), Genotype::NotObserved);
        assert_eq!(calls.genotype_by_sample_no(0), Genotype::HomRef);
        assert_eq!(calls.genotype_by_sample_no(5), Genotype::NotObserved);
        assert_eq!(calls.sample_names(), &["dad".to_string(), "kid".to_string()]);
    }

    #[test]
    fn chromosome_type_from_names() {
        assert_eq!(ChromosomeType::from_contig_name("chrX"), ChromosomeType::X);
        assert_eq!(ChromosomeType::from_contig_name("Y"), ChromosomeType::Y);
        assert_eq!(ChromosomeType::from_contig_name("MT"), ChromosomeType::Mitochondrial);
        assert_eq!(ChromosomeType::from_contig_name("chrM"), ChromosomeType::Mitochondrial);
        assert_eq!(ChromosomeType::from_contig_name("chr17"), ChromosomeType::Autosomal);
    }
}
