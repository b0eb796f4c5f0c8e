use std::collections::HashMap;
use std::fmt;

use crate::interval::{IntervalError, IntervalIndex, QueryResult};
use crate::model::gene::Gene;
use crate::model::transcript::TranscriptRecord;
use crate::model::types::{ContigId, GeneId};
use crate::reference::ReferenceDictionary;
use crate::types::Span;

/// The genome-wide gene index:
/// - chromosome dictionary (chr name/length -> chr_id)
/// - genes derived from transcripts
/// - one interval index of gene ids per chromosome
#[derive(Debug, Clone)]
pub struct GeneIndex {
    dict: ReferenceDictionary,
    genes: Vec<Gene>,
    per_contig: Vec<IntervalIndex<GeneId>>,
}

/// Human-readable summary of the `GeneIndex`.
///
/// Prints the number of genes and contigs, then per contig the gene count
/// and the mean gene region length. Intended for logging and diagnostics.
impl fmt::Display for GeneIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "GeneIndex: {} genes, {} contigs",
            self.genes.len(),
            self.dict.len()
        )?;

        for (chr_id, tree) in self.per_contig.iter().enumerate() {
            if tree.is_empty() {
                continue;
            }
            let name = self.dict.name(chr_id).unwrap_or("?");
            let total: u64 = tree
                .iter()
                .map(|&g| self.genes[g].region.len() as u64)
                .sum();
            writeln!(
                f,
                "  - {}: genes={}, mean_len={:.1}",
                name,
                tree.len(),
                total as f64 / tree.len() as f64
            )?;
        }

        Ok(())
    }
}

impl GeneIndex {
    /// Group transcripts into genes and build per-contig interval indexes.
    ///
    /// Workflow:
    /// 1) map every transcript span onto the forward strand
    /// 2) group by (gene symbol, contig); the gene region is the bounding box
    /// 3) build one `IntervalIndex<GeneId>` per contig
    ///
    /// Transcripts on contigs unknown to `dict` are ignored. Genes keep the
    /// first-seen order of their symbols.
    pub fn build(
        transcripts: &[TranscriptRecord],
        dict: ReferenceDictionary,
    ) -> Result<Self, IntervalError> {
        let mut genes: Vec<Gene> = Vec::new();
        let mut key_to_gene: HashMap<(String, ContigId), GeneId> = HashMap::new();

        for tx in transcripts {
            let Some(fwd) = tx.forward_span(&dict) else {
                tracing::trace!(accession = %tx.accession, chr_id = tx.chr_id, "transcript on unknown contig");
                continue;
            };
            let key = (tx.gene_symbol.clone(), tx.chr_id);
            let gid = *key_to_gene.entry(key).or_insert_with(|| {
                let gid = genes.len();
                genes.push(Gene::new(gid, tx.gene_symbol.clone(), tx.chr_id, fwd));
                gid
            });
            genes[gid].add_transcript(tx.id, fwd);
        }
        for g in &mut genes {
            g.finalize();
        }

        let mut buckets: Vec<Vec<GeneId>> = vec![Vec::new(); dict.len()];
        for g in &genes {
            buckets[g.chr_id].push(g.id);
        }

        let per_contig = buckets
            .into_iter()
            .map(|ids| {
                IntervalIndex::build(ids, |&gid| (genes[gid].region.start, genes[gid].region.end))
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(genes = genes.len(), contigs = dict.len(), "gene index built");

        Ok(Self {
            dict,
            genes,
            per_contig,
        })
    }

    pub fn dict(&self) -> &ReferenceDictionary {
        &self.dict
    }

    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    pub fn gene(&self, id: GeneId) -> &Gene {
        &self.genes[id]
    }

    /// Interval index for one contig (`None` for an unknown contig).
    pub fn contig_index(&self, chr_id: ContigId) -> Option<&IntervalIndex<GeneId>> {
        self.per_contig.get(chr_id)
    }

    /// Gene ids overlapping a variant footprint.
    ///
    /// Zero-length footprints (insertions between two bases) are looked up
    /// as the point `start`; everything else as the range `[start, end)`.
    pub fn genes_at(&self, chr_id: ContigId, span: Span) -> Vec<GeneId> {
        self.query(chr_id, span)
            .map(|res| res.overlaps.into_iter().copied().collect())
            .unwrap_or_default()
    }

    /// Full query including neighbours for intergenic positions.
    pub fn query(&self, chr_id: ContigId, span: Span) -> Option<QueryResult<'_, GeneId>> {
        let tree = self.per_contig.get(chr_id)?;
        Some(if span.is_empty() {
            tree.query_point(span.start)
        } else {
            tree.query_range(span.start, span.end)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Strand;

    fn dict() -> ReferenceDictionary {
        let mut d = ReferenceDictionary::new();
        d.add("chr1", 10_000).unwrap();
        d.add("chrX", 5_000).unwrap();
        d
    }

    fn tx(id: usize, symbol: &str, chr_id: usize, strand: Strand, s: u32, e: u32) -> TranscriptRecord {
        TranscriptRecord::new(id, format!("NM_{id}"), symbol, chr_id, strand, Span::new(s, e))
    }

    #[test]
    fn genes_are_bounding_boxes_of_transcripts() {
        let txs = vec![
            tx(0, "A", 0, Strand::Plus, 100, 500),
            tx(1, "A", 0, Strand::Plus, 300, 900),
            // minus strand [9000, 9500) -> forward [500, 1000)
            tx(2, "B", 0, Strand::Minus, 9_000, 9_500),
            tx(3, "C", 1, Strand::Plus, 10, 20),
        ];
        let idx = GeneIndex::build(&txs, dict()).unwrap();

        assert_eq!(idx.genes().len(), 3);
        assert_eq!(idx.gene(0).region, Span::new(100, 900));
        assert_eq!(idx.gene(0).transcript_ids(), &[0, 1]);
        assert_eq!(idx.gene(1).region, Span::new(500, 1_000));
        assert_eq!(idx.gene(2).chr_id, 1);
    }

    #[test]
    fn genes_at_points_and_ranges() {
        let txs = vec![
            tx(0, "A", 0, Strand::Plus, 100, 500),
            tx(1, "B", 0, Strand::Plus, 400, 800),
        ];
        let idx = GeneIndex::build(&txs, dict()).unwrap();

        assert_eq!(idx.genes_at(0, Span::new(450, 451)), vec![0, 1]);
        assert_eq!(idx.genes_at(0, Span::new(499, 501)), vec![0, 1]);
        assert_eq!(idx.genes_at(0, Span::new(500, 500)), vec![1]);
        assert!(idx.genes_at(0, Span::new(900, 901)).is_empty());
        assert!(idx.genes_at(1, Span::new(450, 451)).is_empty());
        assert!(idx.genes_at(9, Span::new(450, 451)).is_empty());

        let res = idx.query(0, Span::new(50, 51)).unwrap();
        assert_eq!(res.right.copied(), Some(0));
        assert!(res.left.is_none());
    }

    #[test]
    fn display_lists_populated_contigs() {
        let txs = vec![tx(0, "A", 0, Strand::Plus, 100, 200)];
        let idx = GeneIndex::build(&txs, dict()).unwrap();
        let s = idx.to_string();
        assert!(s.starts_with("GeneIndex: 1 genes, 2 contigs"));
        assert!(s.contains("chr1: genes=1, mean_len=100.0"));
        assert!(!s.contains("chrX"));
    }
}
