use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use log::{debug, info};
// to serialize the data
use serde::{Serialize, Deserialize};

use crate::annotation::io::{AnnotationReader, AnnotationRecord, ParseError};
use crate::bins::{bin_for_span, bins_for_query, Bin};
use crate::error::{AnnotateError, Result};
use crate::model::gene::Gene;
use crate::model::transcript::Transcript;
use crate::model::types::{GeneId, TranscriptId};
use crate::types::{Exon, Strand};

const MAGIC: &[u8; 4] = b"VSX1";
const VERSION_STR: &str = env!("CARGO_PKG_VERSION");

/// Which attribute keys identify genes and transcripts, and which feature
/// types are exons.
///
/// - Several keys per category are allowed; the first one present wins.
/// - GFF3 `Parent` values are split on ',' and each parent becomes a
///   transcript.
#[derive(Debug, Clone)]
pub struct IdNameKeys {
    pub gene_id_keys: Vec<String>,
    pub transcript_id_keys: Vec<String>,

    /// GFF3 exon->transcript linkage (most commonly: Parent)
    pub parent_keys: Vec<String>,

    /// Feature types that count as exons (default: ["exon"])
    pub exon_feature_types: Vec<String>,
}

impl Default for IdNameKeys {
    fn default() -> Self {
        Self {
            gene_id_keys: vec!["gene_id".into(), "gene".into(), "GeneID".into()],
            transcript_id_keys: vec!["transcript_id".into(), "transcript".into()],
            parent_keys: vec!["Parent".into()],
            exon_feature_types: vec!["exon".into()],
        }
    }
}

/// Source of transcript models for the annotator.
///
/// Exon lists are 1-based inclusive, sorted ascending and non-overlapping.
pub trait TranscriptProvider {
    /// Transcripts registered in `bin` on `chrom`. Unknown chromosomes and
    /// empty bins give an empty slice.
    fn transcripts_in_bin(&self, chrom: &str, bin: Bin) -> &[TranscriptId];

    /// Exons of `tx`. A transcript without exons means the provider is corrupt.
    fn exons_for_transcript(&self, tx: TranscriptId) -> Result<&[Exon]>;

    fn strand_for_transcript(&self, tx: TranscriptId) -> Result<Strand>;

    /// Stable gene key of the gene that owns `tx`.
    fn gene_for_transcript(&self, tx: TranscriptId) -> Result<&str>;

    /// Stable transcript key, as written to output.
    fn transcript_name(&self, tx: TranscriptId) -> Result<&str>;

    /// Multi-level bin query around `pos0` (0-based) widened by `slop`.
    ///
    /// The same transcript can be registered in only one bin, but callers
    /// should not rely on that: the result may contain repeats.
    fn candidates(&self, chrom: &str, pos0: u64, slop: u64) -> Vec<TranscriptId> {
        let mut out = Vec::new();
        for bin in bins_for_query(pos0, slop) {
            out.extend_from_slice(self.transcripts_in_bin(chrom, bin));
        }
        out
    }
}

/// Per-chromosome bin table: bin id -> transcript ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChrBins {
    pub bins: HashMap<Bin, Vec<TranscriptId>>,
}

impl ChrBins {
    /// Register a 1-based inclusive span.
    fn add_span(&mut self, tx_id: TranscriptId, start: u64, end: u64) {
        let bin = bin_for_span(start - 1, end);
        self.bins.entry(bin).or_default().push(tx_id);
    }

    fn finalize(&mut self) {
        for txs in self.bins.values_mut() {
            txs.sort_unstable();
            txs.dedup();
        }
    }
}

/// The transcript model:
/// - chromosome dictionary (chr name -> chr_id)
/// - genes + transcripts
/// - per-chromosome hierarchical bins for candidate lookup
///
/// Built once and then only read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptIndex {
    pub chr_names: Vec<String>,
    chr_to_id: HashMap<String, usize>,

    pub genes: Vec<Gene>,
    pub transcripts: Vec<Transcript>,

    pub chr_bins: Vec<ChrBins>,
}

/// Human-readable summary, one global line and one line per chromosome:
/// occupied bins, genes, transcripts, and how many transcripts have a single
/// exon (those are skipped by default when annotating).
impl fmt::Display for TranscriptIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let single = self.transcripts.iter().filter(|t| t.is_single_exon()).count();
        writeln!(
            f,
            "TranscriptIndex: {} genes, {} transcripts ({} single-exon), {} chromosomes",
            self.genes.len(),
            self.transcripts.len(),
            single,
            self.chr_names.len()
        )?;

        for (chr_id, chr_name) in self.chr_names.iter().enumerate() {
            let Some(chr) = self.chr_bins.get(chr_id) else {
                writeln!(f, "  - {}: <missing bins>", chr_name)?;
                continue;
            };

            let mut txs: HashSet<TranscriptId> = HashSet::new();
            let mut genes: HashSet<GeneId> = HashSet::new();
            for &tx_id in chr.bins.values().flatten() {
                txs.insert(tx_id);
                genes.insert(self.transcripts[tx_id].gene_id);
            }
            let single = txs
                .iter()
                .filter(|&&t| self.transcripts[t].is_single_exon())
                .count();

            writeln!(
                f,
                "  - {}: bins={}, genes={}, transcripts={}, single_exon={}",
                chr_name,
                chr.bins.len(),
                genes.len(),
                txs.len(),
                single
            )?;
        }

        Ok(())
    }
}

impl TranscriptIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open either a serialized index (detected by its magic bytes) or a
    /// GTF/GFF3 annotation, plain or gzipped.
    pub fn open<P: AsRef<Path>>(path: P, keys: IdNameKeys) -> Result<Self> {
        let path = path.as_ref();
        let mut magic = [0u8; 4];
        let is_index = match File::open(path) {
            Ok(mut f) => f.read_exact(&mut magic).is_ok() && &magic == MAGIC,
            Err(_) => false,
        };

        if is_index {
            info!("loading transcript index {}", path.display());
            Self::load(path)
        } else {
            info!("building transcript index from {}", path.display());
            Self::from_path(path, keys)
        }
    }

    /// Build from a GTF/GFF3 path; `.gz` files are decompressed on the fly.
    ///
    /// Chromosome ids follow first-seen order in the file.
    pub fn from_path<P: AsRef<Path>>(path: P, keys: IdNameKeys) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ParseError::IoPath {
            path: path.display().to_string(),
            source,
        })?;

        let is_gz = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("gz"))
            .unwrap_or(false);

        let reader: Box<dyn BufRead> = if is_gz {
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        Self::new().from_reader(reader, keys)
    }

    /// Build directly from a GTF/GFF3 reader.
    ///
    /// 1) parse records, keep exon features
    /// 2) intern chromosome, gene and transcript; add the exon
    /// 3) finalize transcripts (sort, reject overlaps) and register each
    ///    span in its bin
    ///
    /// ```
    /// use std::io::Cursor;
    /// use variant_splice_index::index::{IdNameKeys, TranscriptIndex};
    ///
    /// let gtf = "\
    /// chr1\tsrc\texon\t101\t150\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";\n\
    /// chr1\tsrc\texon\t201\t250\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";\n";
    ///
    /// let idx = TranscriptIndex::new()
    ///     .from_reader(Cursor::new(gtf.as_bytes()), IdNameKeys::default())
    ///     .unwrap();
    ///
    /// assert_eq!(idx.genes.len(), 1);
    /// assert_eq!(idx.transcripts[0].exons().len(), 2);
    /// ```
    pub fn from_reader<R: BufRead>(mut self, reader: R, keys: IdNameKeys) -> Result<Self> {
        let mut gene_key_to_id: HashMap<String, GeneId> = HashMap::new();
        let mut tx_key_to_id: HashMap<String, TranscriptId> = HashMap::new();
        let mut skipped = 0usize;

        for rec in AnnotationReader::new(reader).records() {
            let rec = rec?;

            if !rec.is_exon_feature(&keys.exon_feature_types) {
                skipped += 1;
                continue;
            }

            let chr_id = self.intern_chr(&rec.seqname);

            let gene_key = rec.pick_first_attr(&keys.gene_id_keys).ok_or_else(|| {
                ParseError::MissingAttribute {
                    line_no: rec.line_no,
                    tried: keys.gene_id_keys.clone(),
                }
            })?;

            let tx_key_raw = rec
                .pick_first_attr(&keys.transcript_id_keys)
                .or_else(|| rec.pick_first_attr(&keys.parent_keys))
                .ok_or_else(|| ParseError::MissingAttribute {
                    line_no: rec.line_no,
                    tried: keys
                        .transcript_id_keys
                        .iter()
                        .chain(&keys.parent_keys)
                        .cloned()
                        .collect(),
                })?;

            let gene_id = self.intern_gene(&gene_key, &mut gene_key_to_id);

            // Parent can be comma-separated in GFF3; support multi-parent exons.
            for tx_key in split_gff3_parent_list(&tx_key_raw) {
                let tx_id = self.intern_tx(&rec, chr_id, gene_id, &tx_key, &mut tx_key_to_id)?;
                self.transcripts[tx_id].add_exon(Exon::new(rec.start, rec.end), rec.strand)?;
            }
        }

        for tx in &mut self.transcripts {
            let (start, end) = tx.finalize()?;
            self.chr_bins[tx.chr_id].add_span(tx.id, start, end);
        }
        for cb in &mut self.chr_bins {
            cb.finalize();
        }

        let single = self.transcripts.iter().filter(|t| t.is_single_exon()).count();
        debug!(
            "indexed {} transcripts ({} single-exon) of {} genes on {} chromosomes ({} non-exon features skipped)",
            self.transcripts.len(),
            single,
            self.genes.len(),
            self.chr_names.len(),
            skipped
        );

        Ok(self)
    }

    pub fn chr_id(&self, chrom: &str) -> Option<usize> {
        self.chr_to_id.get(chrom).copied()
    }

    pub fn transcript(&self, tx: TranscriptId) -> Result<&Transcript> {
        self.transcripts.get(tx).ok_or(AnnotateError::UnknownTranscript(tx))
    }

    // -----------------------
    // Internal helpers
    // -----------------------

    fn intern_chr(&mut self, chr: &str) -> usize {
        if let Some(&id) = self.chr_to_id.get(chr) {
            return id;
        }
        let id = self.chr_names.len();
        self.chr_names.push(chr.to_string());
        self.chr_to_id.insert(chr.to_string(), id);
        self.chr_bins.push(ChrBins::default());
        id
    }

    fn intern_gene(&mut self, gene_key: &str, gene_key_to_id: &mut HashMap<String, GeneId>) -> GeneId {
        if let Some(&gid) = gene_key_to_id.get(gene_key) {
            return gid;
        }
        let gid = self.genes.len();
        self.genes.push(Gene::new(gid, gene_key));
        gene_key_to_id.insert(gene_key.to_string(), gid);
        gid
    }

    /// A transcript keeps the gene, chromosome and strand of its first exon.
    fn intern_tx(
        &mut self,
        rec: &AnnotationRecord,
        chr_id: usize,
        gene_id: GeneId,
        tx_key: &str,
        tx_key_to_id: &mut HashMap<String, TranscriptId>,
    ) -> Result<TranscriptId> {
        if let Some(&tid) = tx_key_to_id.get(tx_key) {
            if self.transcripts[tid].chr_id != chr_id {
                return Err(AnnotateError::ChromosomeMismatch {
                    transcript: tx_key.to_string(),
                });
            }
            return Ok(tid);
        }

        let tid = self.transcripts.len();
        self.transcripts
            .push(Transcript::new(tid, tx_key, gene_id, chr_id, rec.strand));
        tx_key_to_id.insert(tx_key.to_string(), tid);
        Ok(tid)
    }

    /// Serialize with a small header (magic + crate version) and a bincode payload.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut f = BufWriter::new(File::create(path)?);

        f.write_all(MAGIC)?;

        let v = VERSION_STR.as_bytes();
        f.write_all(&(v.len() as u16).to_le_bytes())?;
        f.write_all(v)?;

        bincode::serialize_into(&mut f, self)?;
        f.flush()?;

        Ok(())
    }

    /// Load an index written by `save()`. Rejects wrong file types and version mismatches.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut f = BufReader::new(File::open(path)?);

        let mut magic = [0u8; 4];
        f.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(AnnotateError::IndexFormat(format!(
                "{} is not a transcript index (bad magic)",
                path.display()
            )));
        }

        let mut len_buf = [0u8; 2];
        f.read_exact(&mut len_buf)?;
        let mut ver_buf = vec![0u8; u16::from_le_bytes(len_buf) as usize];
        f.read_exact(&mut ver_buf)?;
        let file_version = String::from_utf8_lossy(&ver_buf);

        if file_version != VERSION_STR {
            return Err(AnnotateError::IndexFormat(format!(
                "version mismatch: file={}, binary={}",
                file_version, VERSION_STR
            )));
        }

        Ok(bincode::deserialize_from(f)?)
    }
}

impl TranscriptProvider for TranscriptIndex {
    fn transcripts_in_bin(&self, chrom: &str, bin: Bin) -> &[TranscriptId] {
        self.chr_id(chrom)
            .and_then(|chr_id| self.chr_bins[chr_id].bins.get(&bin))
            .map(|txs| txs.as_slice())
            .unwrap_or(&[])
    }

    fn exons_for_transcript(&self, tx: TranscriptId) -> Result<&[Exon]> {
        let t = self.transcript(tx)?;
        if t.exons().is_empty() {
            return Err(AnnotateError::EmptyTranscript {
                transcript: t.key.clone(),
            });
        }
        Ok(t.exons())
    }

    fn strand_for_transcript(&self, tx: TranscriptId) -> Result<Strand> {
        Ok(self.transcript(tx)?.strand)
    }

    fn gene_for_transcript(&self, tx: TranscriptId) -> Result<&str> {
        let gene_id = self.transcript(tx)?.gene_id;
        Ok(&self.genes[gene_id].key)
    }

    fn transcript_name(&self, tx: TranscriptId) -> Result<&str> {
        Ok(&self.transcript(tx)?.key)
    }
}

/// Split Parent= list (GFF3) by commas; also trim whitespace.
fn split_gff3_parent_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
