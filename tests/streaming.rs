use std::collections::BTreeSet;
use std::io::Cursor;

use genewise_mendel::genotype::Genotype::{self, *};
use genewise_mendel::pedigree::PedFileContents;
use genewise_mendel::stream::StreamError;
use genewise_mendel::{
    AnnotatedVariant, ChromosomeType, GeneIndex, GeneWiseProcessor, GenotypeCalls,
    ModeOfInheritance, Pedigree, ProcessorOptions, ReferenceDictionary, TranscriptImporter,
    VariantRecord,
};

const FAI: &str = "chr1\t100000\t6\t60\t61\nchrX\t50000\t101700\t60\t61\n";

// ALPHA [1000, 2000) and BETA [1500, 3000) overlap; XG [100, 500) on X.
const GTF: &str = "\
chr1\tt\texon\t1001\t1200\t.\t+\t.\tgene_id \"G1\"; gene_name \"ALPHA\"; transcript_id \"A1\";
chr1\tt\texon\t1801\t2000\t.\t+\t.\tgene_id \"G1\"; gene_name \"ALPHA\"; transcript_id \"A1\";
chr1\tt\texon\t1501\t3000\t.\t-\t.\tgene_id \"G2\"; gene_name \"BETA\"; transcript_id \"B1\";
chr7\tt\texon\t1\t100\t.\t+\t.\tgene_id \"G9\"; gene_name \"ELSEWHERE\"; transcript_id \"E1\";
chrX\tt\texon\t101\t500\t.\t+\t.\tgene_id \"G3\"; gene_name \"XG\"; transcript_id \"X1\";
";

const PED: &str = "\
#FAMILY\tNAME\tFATHER\tMOTHER\tSEX\tDISEASE
fam\tdad\t0\t0\t1\t1
fam\tmom\t0\t0\t2\t1
fam\tkid\tdad\tmom\t1\t2
";

fn setup() -> (GeneIndex, Pedigree) {
    let dict = ReferenceDictionary::from_fai_reader(Cursor::new(FAI)).unwrap();
    let txs = TranscriptImporter::new()
        .import_reader(Cursor::new(GTF), &dict)
        .unwrap();
    let index = GeneIndex::build(&txs, dict).unwrap();
    let ped = PedFileContents::from_reader(Cursor::new(PED)).unwrap();
    let pedigree = Pedigree::from_ped(&ped, "fam").unwrap();
    (index, pedigree)
}

fn variant(
    index: &GeneIndex,
    chr: &str,
    pos: u32,
    [dad, mom, kid]: [Genotype; 3],
    label: &'static str,
) -> VariantRecord<&'static str> {
    let chr_id = index.dict().contig_id(chr).unwrap();
    let calls = GenotypeCalls::new(
        ChromosomeType::from_contig_name(chr),
        vec![("dad", dad), ("mom", mom), ("kid", kid)],
    );
    VariantRecord::new(chr_id, pos, pos + 1, calls, label)
}

fn modes(m: &[ModeOfInheritance]) -> BTreeSet<ModeOfInheritance> {
    m.iter().copied().collect()
}

#[test]
fn genes_from_annotation_and_reference() {
    let (index, _) = setup();
    let symbols: Vec<&str> = index.genes().iter().map(|g| g.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["ALPHA", "BETA", "XG"]);
    assert_eq!(index.gene(0).region.start, 1_000);
    assert_eq!(index.gene(0).region.end, 2_000);
    // minus-strand transcript still lands on forward coordinates
    assert_eq!(index.gene(1).region.start, 1_500);
    assert_eq!(index.gene(1).region.end, 3_000);

    let summary = index.to_string();
    assert!(summary.starts_with("GeneIndex: 3 genes, 2 contigs"));
}

#[test]
fn overlapping_genes_emit_each_variant_once_in_order() {
    let (index, pedigree) = setup();
    let input = vec![
        // ALPHA only, from dad
        variant(&index, "chr1", 1_100, [Het, HomRef, Het], "v1"),
        // ALPHA and BETA, from mom
        variant(&index, "chr1", 1_600, [HomRef, Het, Het], "v2"),
        // BETA only, homozygous in the affected son
        variant(&index, "chr1", 2_500, [Het, Het, HomAlt], "v3"),
        // intergenic
        variant(&index, "chr1", 5_000, [HomRef, HomRef, Het], "v4"),
        // hemizygous son, carrier mother
        variant(&index, "chrX", 200, [HomRef, Het, HomAlt], "v5"),
    ];

    let mut processor = GeneWiseProcessor::new(index.clone(), pedigree, ProcessorOptions::default());
    let mut out: Vec<AnnotatedVariant<&'static str>> = Vec::new();
    let mut released_per_push = Vec::new();
    for v in input {
        let released = processor.push(v).unwrap();
        released_per_push.push(released.len());
        out.extend(released);
    }
    out.extend(processor.finish().unwrap());

    // v1 waits for ALPHA, v2 for BETA too
    assert_eq!(released_per_push, vec![0, 0, 1, 3, 0]);

    let labels: Vec<&str> = out.iter().map(|a| a.record.payload).collect();
    assert_eq!(labels, vec!["v1", "v2", "v3", "v4", "v5"]);

    let starts: Vec<(usize, u32)> = out.iter().map(|a| (a.record.contig_id, a.record.start0)).collect();
    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts, sorted);

    let ar = modes(&[ModeOfInheritance::AutosomalRecessive]);
    assert_eq!(out[0].modes, ar, "v1 is the paternal compound-het allele");
    assert_eq!(out[1].modes, ar, "v2 is the maternal compound-het allele in ALPHA");
    assert_eq!(out[2].modes, ar, "v3 is homozygous alt in BETA");
    assert!(out[3].modes.is_empty());
    assert_eq!(out[4].modes, modes(&[ModeOfInheritance::XRecessive]));

    let stats = processor.stats();
    assert_eq!(stats.variants_seen, 5);
    assert_eq!(stats.variants_emitted, 5);
    assert_eq!(stats.variants_in_genes, 4);
    assert_eq!(stats.genes_flushed, 3);
    assert_eq!(stats.mode_counts[&ModeOfInheritance::AutosomalRecessive], 3);
}

#[test]
fn reappearing_contig_is_fatal() {
    let (index, pedigree) = setup();
    let mut processor = GeneWiseProcessor::new(index.clone(), pedigree, ProcessorOptions::default());
    processor.push(variant(&index, "chr1", 1_100, [Het, HomRef, Het], "a"))
        .unwrap();
    processor.push(variant(&index, "chrX", 200, [HomRef, Het, HomAlt], "b"))
        .unwrap();
    let err = processor
        .push(variant(&index, "chr1", 2_500, [Het, Het, HomAlt], "c"))
        .unwrap_err();
    assert_eq!(
        err,
        StreamError::ContigReappeared {
            contig: "chr1".into()
        }
    );
}

#[test]
fn same_input_gives_same_annotation() {
    let run = || {
        let (index, pedigree) = setup();
        let mut processor = GeneWiseProcessor::new(index.clone(), pedigree, ProcessorOptions::default());
        let mut out = Vec::new();
        for (pos, gts) in [
            (1_100, [Het, HomRef, Het]),
            (1_600, [HomRef, Het, Het]),
            (2_500, [Het, Het, HomAlt]),
        ] {
            out.extend(processor.push(variant(&index, "chr1", pos, gts, "x")).unwrap());
        }
        out.extend(processor.finish().unwrap());
        out.into_iter().map(|a| a.modes).collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}
