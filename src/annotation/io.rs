use std::collections::HashMap;
use std::io::BufRead;

use thiserror::Error;

use crate::types::Strand;

/// Attribute column syntax: `key=value;` for GFF3, `key "value";` for GTF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Gff3,
    Gtf,
    Unknown,
}

/// One feature line, converted to 0-based half-open `[start0, end0)`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRecord {
    pub line_no: usize,
    pub seqname: String,
    pub feature_type: String,
    pub start0: u32,
    pub end0: u32,
    pub strand: Strand,
    pub attrs: HashMap<String, String>,
    pub dialect: Dialect,
}

impl AnnotationRecord {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(|s| s.as_str())
    }

    pub fn is_feature(&self, types: &[String]) -> bool {
        types.iter().any(|t| t == &self.feature_type)
    }

    /// First non-empty value among `keys`.
    pub fn pick_first_attr(&self, keys: &[String]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.attr(k))
            .map(str::trim)
            .find(|v| !v.is_empty())
    }
}

/// Errors while reading GTF/GFF3.
#[derive(Error, Debug)]
pub enum AnnotationError {
    #[error("I/O error while reading annotation: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed annotation line {line_no}: {message}")]
    MalformedLine { line_no: usize, message: String },

    #[error("bad coordinates on annotation line {line_no}: {message}")]
    BadCoordinates { line_no: usize, message: String },

    #[error("annotation line {line_no} has none of the attributes {keys:?}")]
    MissingAttribute { line_no: usize, keys: Vec<String> },
}

/// Streaming parser for GTF/GFF3 records.
///
/// Most users want [`crate::annotation::TranscriptImporter`], which turns the
/// records into transcript spans.
///
/// # Example
/// ```
/// use std::io::Cursor;
/// use genewise_mendel::annotation::io::AnnotationReader;
///
/// let gtf = "#header\nchr1\tsrc\texon\t101\t150\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";\n";
/// let recs: Vec<_> = AnnotationReader::new(Cursor::new(gtf))
///     .records()
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(recs.len(), 1);
/// assert_eq!(recs[0].start0, 100);
/// ```
pub struct AnnotationReader<R: BufRead> {
    reader: R,
    buf: String,
    line_no: usize,
}

impl<R: BufRead> AnnotationReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            line_no: 0,
        }
    }

    /// Parsed records; blank and `#` lines are skipped but still counted.
    pub fn records(mut self) -> impl Iterator<Item = Result<AnnotationRecord, AnnotationError>> {
        std::iter::from_fn(move || loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line_no += 1,
                Err(e) => return Some(Err(AnnotationError::Io(e))),
            }

            let line = self.buf.trim_end_matches(&['\n', '\r'][..]);
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            return Some(parse_record_line(line, self.line_no));
        })
    }
}

/// Parse a single non-comment line into an `AnnotationRecord`.
pub fn parse_record_line(line: &str, line_no: usize) -> Result<AnnotationRecord, AnnotationError> {
    // seqname source feature start end score strand phase attributes
    let cols: Vec<&str> = line.split('\t').collect();
    if cols.len() != 9 {
        return Err(AnnotationError::MalformedLine {
            line_no,
            message: format!("expected 9 tab-separated columns, found {}", cols.len()),
        });
    }

    // 1-based inclusive -> 0-based half-open [start-1, end)
    let parse_coord = |s: &str| {
        s.parse::<u32>().map_err(|_| AnnotationError::BadCoordinates {
            line_no,
            message: format!("'{s}' is not a position"),
        })
    };
    let start_1 = parse_coord(cols[3])?;
    let end_1 = parse_coord(cols[4])?;
    if start_1 == 0 || end_1 < start_1 {
        return Err(AnnotationError::BadCoordinates {
            line_no,
            message: format!("invalid range {start_1}..{end_1}"),
        });
    }

    let strand = Strand::from_symbol(cols[6]).ok_or_else(|| AnnotationError::MalformedLine {
        line_no,
        message: format!("invalid strand '{}'", cols[6]),
    })?;

    let (dialect, attrs) = parse_attributes(cols[8]);

    Ok(AnnotationRecord {
        line_no,
        seqname: cols[0].to_string(),
        feature_type: cols[2].to_string(),
        start0: start_1 - 1,
        end0: end_1,
        strand,
        attrs,
        dialect,
    })
}

/// Split column 9 into key/value pairs. Any `=` means GFF3, quotes mean
/// GTF; otherwise each entry is tried both ways.
pub fn parse_attributes(s: &str) -> (Dialect, HashMap<String, String>) {
    let s = s.trim();

    let dialect = if s.contains('=') {
        Dialect::Gff3
    } else if s.contains('"') {
        Dialect::Gtf
    } else {
        Dialect::Unknown
    };

    let mut map = HashMap::new();
    for part in s.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let kv = match dialect {
            Dialect::Gff3 => part.split_once('='),
            Dialect::Gtf => part.split_once(char::is_whitespace),
            Dialect::Unknown => part
                .split_once('=')
                .or_else(|| part.split_once(char::is_whitespace)),
        };
        let Some((key, value)) = kv else { continue };
        let key = key.trim();
        let value = unquote(value);
        if !key.is_empty() && !value.is_empty() {
            map.insert(key.to_string(), value);
        }
    }

    (dialect, map)
}

fn unquote(v: &str) -> String {
    let v = v.trim();
    let v = v.strip_prefix('"').unwrap_or(v);
    let v = v.strip_suffix('"').unwrap_or(v);
    v.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parse_gtf_line() {
        let line = "chr1\tsrc\texon\t101\t150\t.\t+\t.\tgene_id \"G1\"; gene_name \"ALPHA\"; transcript_id \"T1\";";
        let rec = parse_record_line(line, 3).unwrap();

        assert_eq!(rec.dialect, Dialect::Gtf);
        assert_eq!(rec.line_no, 3);
        assert_eq!(rec.seqname, "chr1");
        assert_eq!(rec.feature_type, "exon");
        // 101..150 inclusive -> [100,150)
        assert_eq!(rec.start0, 100);
        assert_eq!(rec.end0, 150);
        assert_eq!(rec.strand, Strand::Plus);
        assert_eq!(rec.attr("gene_name"), Some("ALPHA"));
        assert_eq!(rec.attr("transcript_id"), Some("T1"));
    }

    #[test]
    fn parse_gff3_line() {
        let line = "chr2\tsrc\texon\t5\t20\t.\t-\t.\tID=ex1;Parent=tx1;gene_id=G9";
        let rec = parse_record_line(line, 1).unwrap();

        assert_eq!(rec.dialect, Dialect::Gff3);
        assert_eq!((rec.start0, rec.end0), (4, 20));
        assert_eq!(rec.strand, Strand::Minus);
        assert_eq!(rec.attr("Parent"), Some("tx1"));
        assert_eq!(
            rec.pick_first_attr(&["gene_name".to_string(), "gene_id".to_string()]),
            Some("G9")
        );
    }

    #[test]
    fn rejects_bad_lines() {
        let short = parse_record_line("chr1\tsrc\texon\t1\t2", 7).unwrap_err();
        assert!(matches!(short, AnnotationError::MalformedLine { line_no: 7, .. }));

        let inverted =
            parse_record_line("chr1\tsrc\texon\t20\t10\t.\t+\t.\tgene_id \"G\";", 2).unwrap_err();
        assert!(matches!(inverted, AnnotationError::BadCoordinates { .. }));

        let strand =
            parse_record_line("chr1\tsrc\texon\t1\t10\t.\t*\t.\tgene_id \"G\";", 2).unwrap_err();
        assert!(matches!(strand, AnnotationError::MalformedLine { .. }));
    }

    #[test]
    fn streaming_reader_skips_comments_and_counts_lines() {
        let data = "\
#comment
chr1\tsrc\texon\t1\t2\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";

chr1\tsrc\texon\t3\t4\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";
";
        let recs: Vec<_> = AnnotationReader::new(Cursor::new(data.as_bytes()))
            .records()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].line_no, 2);
        assert_eq!(recs[1].line_no, 4);
        assert_eq!((recs[1].start0, recs[1].end0), (2, 4));
    }
}
