//! Gene-wise streaming annotation.
//!
//! Variants arrive sorted by contig and start. Each one is assigned to the
//! genes it overlaps and buffered. Once the stream has moved past a gene (its
//! end is at or before the current start, or the contig changed) the gene is
//! flushed: the inheritance checker runs over all of its variants and the
//! resulting modes are merged into each buffered variant. A variant is
//! released when no active gene references it any more and everything before
//! it has been released, so output order equals input order.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::genotype::GenotypeCalls;
use crate::index::GeneIndex;
use crate::mendel::{MendelError, MendelianInheritanceChecker, ModeOfInheritance};
use crate::model::types::{ContigId, GeneId};
use crate::pedigree::Pedigree;
use crate::types::Span;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("variant stream not sorted on {contig}: start {start} after {previous}")]
    NotSorted {
        contig: String,
        previous: u32,
        start: u32,
    },

    #[error("contig {contig} reappeared after another contig")]
    ContigReappeared { contig: String },

    #[error("malformed variant on {contig}: end {end} < start {start}")]
    MalformedVariant { contig: String, start: u32, end: u32 },

    #[error(transparent)]
    Mendel(#[from] MendelError),
}

/// One variant as handed over by the variant source.
///
/// `payload` is carried through untouched and returned with the annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRecord<P> {
    pub contig_id: ContigId,
    /// 0-based start.
    pub start0: u32,
    /// Exclusive end; equal to `start0` for insertions.
    pub end0: u32,
    pub calls: GenotypeCalls,
    pub payload: P,
}

impl<P> VariantRecord<P> {
    pub fn new(contig_id: ContigId, start0: u32, end0: u32, calls: GenotypeCalls, payload: P) -> Self {
        Self {
            contig_id,
            start0,
            end0,
            calls,
            payload,
        }
    }

    /// Footprint on the contig. Panics on `end0 < start0`.
    pub fn span(&self) -> Span {
        Span::new(self.start0, self.end0)
    }
}

/// A released variant and the modes it is compatible with in at least one
/// of its genes. Empty for variants outside all genes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedVariant<P> {
    pub record: VariantRecord<P>,
    pub modes: BTreeSet<ModeOfInheritance>,
}

impl<P> AnnotatedVariant<P> {
    pub fn is_compatible_with(&self, mode: ModeOfInheritance) -> bool {
        self.modes.contains(&mode)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorOptions {
    /// Modes evaluated for every gene.
    pub modes: Vec<ModeOfInheritance>,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            modes: ModeOfInheritance::REAL.to_vec(),
        }
    }
}

impl ProcessorOptions {
    pub fn modes(mut self, modes: impl IntoIterator<Item = ModeOfInheritance>) -> Self {
        self.modes = modes.into_iter().collect();
        self
    }
}

/// Running counters of a [`GeneWiseProcessor`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessorStats {
    pub variants_seen: usize,
    /// Variants overlapping at least one gene.
    pub variants_in_genes: usize,
    pub genes_flushed: usize,
    pub variants_emitted: usize,
    /// Emitted variants compatible with each mode.
    pub mode_counts: BTreeMap<ModeOfInheritance, usize>,
}

impl fmt::Display for ProcessorStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "variants={} in_genes={} genes_flushed={} emitted={}",
            self.variants_seen, self.variants_in_genes, self.genes_flushed, self.variants_emitted
        )?;
        for (mode, n) in &self.mode_counts {
            write!(f, " {}={}", mode, n)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
struct Buffered<P> {
    record: VariantRecord<P>,
    modes: BTreeSet<ModeOfInheritance>,
    /// Active genes still holding this variant.
    ref_count: usize,
}

/// Sweep-line processor over a coordinate-sorted variant stream.
///
/// # Example
/// ```
/// use genewise_mendel::genotype::{ChromosomeType, Genotype, GenotypeCalls};
/// use genewise_mendel::index::GeneIndex;
/// use genewise_mendel::mendel::ModeOfInheritance;
/// use genewise_mendel::model::transcript::TranscriptRecord;
/// use genewise_mendel::pedigree::{Disease, Pedigree, PersonSpec, Sex};
/// use genewise_mendel::reference::ReferenceDictionary;
/// use genewise_mendel::stream::{GeneWiseProcessor, ProcessorOptions, VariantRecord};
/// use genewise_mendel::types::{Span, Strand};
///
/// let mut dict = ReferenceDictionary::new();
/// dict.add("1", 10_000).unwrap();
/// let txs = vec![TranscriptRecord::new(0, "NM_1", "GENE", 0, Strand::Plus, Span::new(100, 200))];
/// let index = GeneIndex::build(&txs, dict).unwrap();
/// let ped = Pedigree::new("solo", vec![PersonSpec::new("p", Sex::Male, Disease::Affected)]).unwrap();
///
/// let mut processor = GeneWiseProcessor::new(index, ped, ProcessorOptions::default());
/// let calls = GenotypeCalls::new(ChromosomeType::Autosomal, vec![("p", Genotype::HomAlt)]);
/// assert!(processor.push(VariantRecord::new(0, 150, 151, calls, ())).unwrap().is_empty());
///
/// let out = processor.finish().unwrap();
/// assert_eq!(out.len(), 1);
/// assert!(out[0].is_compatible_with(ModeOfInheritance::AutosomalRecessive));
/// ```
#[derive(Debug)]
pub struct GeneWiseProcessor<P> {
    index: GeneIndex,
    checker: MendelianInheritanceChecker,
    options: ProcessorOptions,
    /// Gene -> ordinals of its buffered variants, in input order.
    active_genes: BTreeMap<GeneId, Vec<u64>>,
    /// Input ordinal -> buffered variant.
    buffered: BTreeMap<u64, Buffered<P>>,
    next_ordinal: u64,
    /// Contig and start of the last accepted variant.
    current: Option<(ContigId, u32)>,
    seen_contigs: BTreeSet<ContigId>,
    stats: ProcessorStats,
}

impl<P> GeneWiseProcessor<P> {
    pub fn new(index: GeneIndex, pedigree: Pedigree, options: ProcessorOptions) -> Self {
        tracing::debug!(
            genes = index.genes().len(),
            pedigree = pedigree.name(),
            modes = ?options.modes,
            "gene-wise processor ready"
        );
        Self {
            index,
            checker: MendelianInheritanceChecker::new(pedigree),
            options,
            active_genes: BTreeMap::new(),
            buffered: BTreeMap::new(),
            next_ordinal: 0,
            current: None,
            seen_contigs: BTreeSet::new(),
            stats: ProcessorStats::default(),
        }
    }

    pub fn gene_index(&self) -> &GeneIndex {
        &self.index
    }

    pub fn pedigree(&self) -> &Pedigree {
        self.checker.pedigree()
    }

    pub fn options(&self) -> &ProcessorOptions {
        &self.options
    }

    pub fn stats(&self) -> &ProcessorStats {
        &self.stats
    }

    pub fn active_gene_count(&self) -> usize {
        self.active_genes.len()
    }

    pub fn buffered_variant_count(&self) -> usize {
        self.buffered.len()
    }

    /// Consume one variant; returns the variants released by it.
    ///
    /// Fails without changing any state if the variant breaks the stream
    /// order or names a sample outside the pedigree.
    pub fn push(&mut self, record: VariantRecord<P>) -> Result<Vec<AnnotatedVariant<P>>, StreamError> {
        self.check_samples(&record)?;
        self.check_order(&record)?;
        self.seen_contigs.insert(record.contig_id);
        self.current = Some((record.contig_id, record.start0));
        self.stats.variants_seen += 1;

        let mut out = Vec::new();

        let chr = record.contig_id;
        let start = record.start0;
        let passed: Vec<GeneId> = self
            .active_genes
            .keys()
            .copied()
            .filter(|&g| {
                let gene = self.index.gene(g);
                gene.chr_id != chr || gene.region.end <= start
            })
            .collect();
        self.flush_genes(passed)?;

        let genes = self.index.genes_at(chr, record.span());
        let ordinal = self.next_ordinal;
        self.next_ordinal += 1;
        for &g in &genes {
            self.active_genes.entry(g).or_default().push(ordinal);
        }
        if !genes.is_empty() {
            self.stats.variants_in_genes += 1;
        }
        tracing::trace!(
            contig = chr,
            start,
            end = record.end0,
            genes = genes.len(),
            "variant buffered"
        );
        self.buffered.insert(
            ordinal,
            Buffered {
                record,
                modes: BTreeSet::new(),
                ref_count: genes.len(),
            },
        );

        self.release(&mut out);
        Ok(out)
    }

    /// Close the stream: flush every active gene and release everything.
    ///
    /// # Panics
    /// If a gene or variant is still pending after the final flush.
    pub fn finish(&mut self) -> Result<Vec<AnnotatedVariant<P>>, StreamError> {
        let mut out = Vec::new();
        let remaining: Vec<GeneId> = self.active_genes.keys().copied().collect();
        self.flush_genes(remaining)?;
        self.release(&mut out);

        assert!(
            self.active_genes.is_empty(),
            "{} genes still active after final flush",
            self.active_genes.len()
        );
        assert!(
            self.buffered.is_empty(),
            "{} variants still buffered after final flush",
            self.buffered.len()
        );

        tracing::info!(stats = %self.stats, "variant stream finished");
        Ok(out)
    }

    fn contig_name(&self, chr: ContigId) -> String {
        self.index
            .dict()
            .name(chr)
            .map_or_else(|| format!("#{chr}"), str::to_string)
    }

    fn check_samples(&self, record: &VariantRecord<P>) -> Result<(), MendelError> {
        let pedigree = self.checker.pedigree();
        match record.calls.sample_names().iter().find(|s| !pedigree.has_person(s)) {
            Some(sample) => Err(MendelError::PedigreeMismatch {
                sample: sample.clone(),
            }),
            None => Ok(()),
        }
    }

    fn check_order(&self, record: &VariantRecord<P>) -> Result<(), StreamError> {
        if record.end0 < record.start0 {
            return Err(StreamError::MalformedVariant {
                contig: self.contig_name(record.contig_id),
                start: record.start0,
                end: record.end0,
            });
        }
        match self.current {
            Some((chr, previous)) if chr == record.contig_id => {
                if record.start0 < previous {
                    return Err(StreamError::NotSorted {
                        contig: self.contig_name(chr),
                        previous,
                        start: record.start0,
                    });
                }
            }
            _ => {
                if self.seen_contigs.contains(&record.contig_id) {
                    return Err(StreamError::ContigReappeared {
                        contig: self.contig_name(record.contig_id),
                    });
                }
            }
        }
        Ok(())
    }

    /// Flush in `(begin, end, id)` order.
    fn flush_genes(&mut self, mut genes: Vec<GeneId>) -> Result<(), StreamError> {
        genes.sort_by_key(|&g| {
            let gene = self.index.gene(g);
            (gene.region.start, gene.region.end, g)
        });
        for g in genes {
            self.flush_gene(g)?;
        }
        Ok(())
    }

    fn flush_gene(&mut self, gene_id: GeneId) -> Result<(), StreamError> {
        let Some(ordinals) = self.active_genes.remove(&gene_id) else {
            return Ok(());
        };

        let calls: Vec<GenotypeCalls> = ordinals
            .iter()
            .map(|o| self.buffered_mut(*o).record.calls.clone())
            .collect();
        let results = self.checker.check_modes(&calls, &self.options.modes)?;

        for (mode, compatible) in &results {
            for i in compatible.indices() {
                self.buffered_mut(ordinals[i]).modes.insert(*mode);
            }
        }
        for &o in &ordinals {
            let b = self.buffered_mut(o);
            assert!(b.ref_count > 0, "variant #{o} released twice");
            b.ref_count -= 1;
        }

        self.stats.genes_flushed += 1;
        tracing::debug!(
            gene = %self.index.gene(gene_id).symbol,
            variants = ordinals.len(),
            compatible = ?results.iter().map(|(m, c)| (m.abbreviation(), c.count())).collect::<Vec<_>>(),
            "gene flushed"
        );
        Ok(())
    }

    fn buffered_mut(&mut self, ordinal: u64) -> &mut Buffered<P> {
        self.buffered
            .get_mut(&ordinal)
            .unwrap_or_else(|| panic!("variant #{ordinal} referenced by a gene but not buffered"))
    }

    /// Release the longest input-order prefix no gene still holds.
    fn release(&mut self, out: &mut Vec<AnnotatedVariant<P>>) {
        while let Some(entry) = self.buffered.first_entry() {
            if entry.get().ref_count > 0 {
                break;
            }
            let b = entry.remove();
            self.stats.variants_emitted += 1;
            for mode in &b.modes {
                *self.stats.mode_counts.entry(*mode).or_default() += 1;
            }
            out.push(AnnotatedVariant {
                record: b.record,
                modes: b.modes,
            });
        }
    }
}
