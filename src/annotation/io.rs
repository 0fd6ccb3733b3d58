use std::collections::HashMap;
use std::io::BufRead;

use thiserror::Error;

use crate::types::Strand;

/// Attribute syntax of the annotation file.
///
/// - GFF3: key=value;key2=value2
/// - GTF: key "value"; key2 "value2";
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    Gff3,
    Gtf,
    Unknown,
}

/// A single parsed GTF/GFF3 feature line.
///
/// Coordinates are kept exactly as written: 1-based, inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRecord {
    pub line_no: usize,
    pub seqname: String,
    pub feature_type: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
    pub attrs: HashMap<String, String>,
}

impl AnnotationRecord {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(|s| s.as_str())
    }

    pub fn is_exon_feature(&self, exon_types: &[String]) -> bool {
        exon_types.iter().any(|t| t == &self.feature_type)
    }

    /// First non-empty attribute among `keys`, in preference order.
    pub fn pick_first_attr(&self, keys: &[String]) -> Option<String> {
        keys.iter()
            .filter_map(|k| self.attr(k))
            .map(str::trim)
            .find(|v| !v.is_empty())
            .map(str::to_string)
    }
}

/// Parsing errors for GTF/GFF3.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("I/O error while reading '{path}': {source}")]
    IoPath {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed GTF/GFF line {line_no}: {problem}: {line}")]
    MalformedLine {
        line_no: usize,
        problem: &'static str,
        line: String,
    },

    #[error("bad coordinates in line {line_no}: {line}")]
    BadCoordinates { line_no: usize, line: String },

    #[error("line {line_no}: missing attribute, tried keys {tried:?}")]
    MissingAttribute { line_no: usize, tried: Vec<String> },
}

/// Streaming parser for GTF/GFF3 files.
///
/// Most callers go through [`crate::annotation::AnnotationBuilder`] instead.
///
/// ```
/// use std::io::Cursor;
/// use variant_splice_index::annotation::io::AnnotationReader;
///
/// let gtf = "chr1\tsrc\texon\t101\t200\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";\n";
/// let recs: Vec<_> = AnnotationReader::new(Cursor::new(gtf))
///     .records()
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(recs[0].start, 101);
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

    /// Iterator over parsed records; blank lines and `#` comments are skipped.
    pub fn records(mut self) -> impl Iterator<Item = Result<AnnotationRecord, ParseError>> {
        std::iter::from_fn(move || loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line_no += 1,
                Err(e) => {
                    return Some(Err(ParseError::IoPath {
                        path: "<reader>".to_string(),
                        source: e,
                    }))
                }
            }

            let line = self.buf.trim_end_matches(&['\n', '\r'][..]);
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            return Some(parse_record_line(line, self.line_no));
        })
    }
}

/// Parse one non-comment line. GTF/GFF have 9 tab-separated columns:
/// seqname source feature start end score strand phase attributes
pub fn parse_record_line(line: &str, line_no: usize) -> Result<AnnotationRecord, ParseError> {
    let malformed = |problem| ParseError::MalformedLine {
        line_no,
        problem,
        line: line.to_string(),
    };

    let cols: Vec<&str> = line.split('\t').collect();
    if cols.len() != 9 {
        return Err(malformed("expected 9 tab-separated columns"));
    }

    let bad_coords = || ParseError::BadCoordinates {
        line_no,
        line: line.to_string(),
    };
    let start: u64 = cols[3].parse().map_err(|_| bad_coords())?;
    let end: u64 = cols[4].parse().map_err(|_| bad_coords())?;
    if start == 0 || end < start {
        return Err(bad_coords());
    }

    let strand = Strand::from_symbol(cols[6]).ok_or_else(|| malformed("bad strand"))?;
    let attrs = parse_attributes(cols[8]);

    Ok(AnnotationRecord {
        line_no,
        seqname: cols[0].to_string(),
        feature_type: cols[2].to_string(),
        start,
        end,
        strand,
        attrs,
    })
}

/// Parse the attributes column for either dialect.
///
/// `=` anywhere means GFF3, otherwise a quote means GTF; anything else is
/// parsed best-effort per field.
pub fn parse_attributes(s: &str) -> HashMap<String, String> {
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
        let split = match dialect {
            Dialect::Gff3 => part.split_once('='),
            Dialect::Gtf => part.split_once(char::is_whitespace),
            Dialect::Unknown => part
                .split_once('=')
                .or_else(|| part.split_once(char::is_whitespace)),
        };
        let Some((key, value)) = split else { continue };
        let key = key.trim();
        let value = unquote(value);
        if !key.is_empty() && !value.is_empty() {
            map.insert(key.to_string(), value);
        }
    }

    map
}

fn unquote(v: &str) -> String {
    let v = v.trim();
    let v = v.strip_prefix('"').unwrap_or(v);
    let v = v.strip_suffix('"').unwrap_or(v);
    v.to_string()
}
