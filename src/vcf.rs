//! Minimal VCF text handling: enough to read CHROM/POS, pass the header
//! through, and set the four annotation INFO keys on each record.
//!
//! Plain, gzip and bgzip input are accepted; output is gzip-compressed when
//! the path ends in `.gz`.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{AnnotateError, Result};
use crate::types::Variant;

/// INFO definitions added to the output header, one per output field.
pub const ANNOTATION_INFO_HEADERS: [(&str, &str); 4] = [
    ("genes", "The Variant falls in the splice region of these genes"),
    ("transcripts", "The Variant falls in the splice region of these transcripts"),
    ("distances", "Vector of Min(Distance from start/end of exon in the transcript.)"),
    ("annotations", "Does the variant fall in exonic/intronic splicing related space in the transcript."),
];

const INFO_COLUMN: usize = 7;

/// One VCF data line, split into its tab-separated columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcfRecord {
    pub line_no: usize,
    fields: Vec<String>,
    pos: u64,
}

impl VcfRecord {
    pub fn parse(line: &str, line_no: usize) -> Result<Self> {
        let fields: Vec<String> = line.split('\t').map(str::to_string).collect();
        if fields.len() <= INFO_COLUMN {
            return Err(AnnotateError::MalformedVcf {
                line_no,
                problem: format!("expected at least 8 columns, found {}", fields.len()),
            });
        }
        let pos = fields[1]
            .parse::<u64>()
            .ok()
            .filter(|&p| p > 0)
            .ok_or_else(|| AnnotateError::MalformedVcf {
                line_no,
                problem: format!("bad POS '{}'", fields[1]),
            })?;
        Ok(Self { line_no, fields, pos })
    }

    pub fn chrom(&self) -> &str {
        &self.fields[0]
    }

    /// 1-based POS column.
    pub fn pos(&self) -> u64 {
        self.pos
    }

    pub fn variant(&self) -> Variant {
        Variant::from_one_based(self.chrom(), self.pos)
    }

    pub fn info(&self) -> &str {
        &self.fields[INFO_COLUMN]
    }

    /// Set `key=value` in the INFO column, replacing an existing entry for `key`.
    pub fn set_info(&mut self, key: &str, value: &str) {
        let entry = format!("{key}={value}");
        let info = self.info();
        if info == "." || info.is_empty() {
            self.fields[INFO_COLUMN] = entry;
            return;
        }

        let mut replaced = false;
        let mut parts: Vec<String> = info
            .split(';')
            .map(|part| {
                let k = part.split_once('=').map_or(part, |(k, _)| k);
                if k == key {
                    replaced = true;
                    entry.clone()
                } else {
                    part.to_string()
                }
            })
            .collect();
        if !replaced {
            parts.push(entry);
        }
        self.fields[INFO_COLUMN] = parts.join(";");
    }
}

impl fmt::Display for VcfRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fields.join("\t"))
    }
}

/// Streaming VCF reader. The header is read eagerly by `new`.
pub struct VcfReader<R: BufRead> {
    reader: R,
    buf: String,
    line_no: usize,
    header: Vec<String>,
}

impl<R: BufRead> VcfReader<R> {
    /// Read header lines up to and including `#CHROM`.
    pub fn new(mut reader: R) -> Result<Self> {
        let mut header = Vec::new();
        let mut buf = String::new();
        let mut line_no = 0;
        loop {
            buf.clear();
            if reader.read_line(&mut buf)? == 0 {
                return Err(AnnotateError::MissingVcfHeader);
            }
            line_no += 1;
            let line = buf.trim_end_matches(&['\n', '\r'][..]);
            if !line.starts_with('#') {
                return Err(AnnotateError::MissingVcfHeader);
            }
            header.push(line.to_string());
            if line.starts_with("#CHROM") {
                break;
            }
        }
        Ok(Self {
            reader,
            buf,
            line_no,
            header,
        })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Data records in file order; blank lines are skipped.
    pub fn records(mut self) -> impl Iterator<Item = Result<VcfRecord>> {
        std::iter::from_fn(move || loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line_no += 1,
                Err(e) => return Some(Err(e.into())),
            }
            let line = self.buf.trim_end_matches(&['\n', '\r'][..]);
            if line.is_empty() {
                continue;
            }
            return Some(VcfRecord::parse(line, self.line_no));
        })
    }
}

/// VCF writer that adds the annotation INFO definitions to the header.
pub struct VcfWriter<W: Write> {
    inner: W,
}

impl<W: Write> VcfWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Write `header`, inserting the annotation INFO lines before `#CHROM`.
    /// IDs the input already defines are not repeated.
    pub fn write_header(&mut self, header: &[String]) -> Result<()> {
        for line in header {
            if line.starts_with("#CHROM") {
                for (id, description) in ANNOTATION_INFO_HEADERS {
                    let prefix = format!("##INFO=<ID={id},");
                    if header.iter().any(|l| l.starts_with(&prefix)) {
                        continue;
                    }
                    writeln!(
                        self.inner,
                        "##INFO=<ID={id},Number=1,Type=String,Description=\"{description}\">"
                    )?;
                }
            }
            writeln!(self.inner, "{line}")?;
        }
        Ok(())
    }

    pub fn write_record(&mut self, record: &VcfRecord) -> Result<()> {
        writeln!(self.inner, "{record}")?;
        Ok(())
    }

    pub fn into_inner(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Open a VCF for reading; `-` is stdin, `.gz`/`.bgz` are decompressed.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(path)?;
    let compressed = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("gz") | Some("bgz")
    );
    if compressed {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Output destination; gzip output must be finished explicitly.
pub enum Output {
    Plain(BufWriter<Box<dyn Write>>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl Output {
    /// `None` or `-` is stdout; a `.gz` path is gzip-compressed.
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path.filter(|p| p.as_os_str() != "-") else {
            return Ok(Output::Plain(BufWriter::new(Box::new(io::stdout()))));
        };
        let file = File::create(path)?;
        if path.extension().and_then(|e| e.to_str()) == Some("gz") {
            Ok(Output::Gzip(GzEncoder::new(BufWriter::new(file), Compression::default())))
        } else {
            Ok(Output::Plain(BufWriter::new(Box::new(file))))
        }
    }

    pub fn finish(self) -> Result<()> {
        match self {
            Output::Plain(mut w) => w.flush()?,
            Output::Gzip(enc) => enc.finish()?.flush()?,
        }
        Ok(())
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Plain(w) => w.write(buf),
            Output::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Plain(w) => w.flush(),
            Output::Gzip(w) => w.flush(),
        }
    }
}
