use std::fs;
use std::io::Read;
use std::path::Path;

use flate2::read::MultiGzDecoder;
use tempfile::tempdir;

use variant_splice_index::{
    annotate_file, AnnotateError, AnnotateOptions, IdNameKeys, SpliceOptions, TranscriptIndex,
};

const GTF: &str = "\
#!genome-build test
chr1\tsrc\tgene\t100\t400\t.\t+\t.\tgene_id \"GPLUS\";
chr1\tsrc\texon\t100\t200\t.\t+\t.\tgene_id \"GPLUS\"; transcript_id \"TPLUS\";
chr1\tsrc\texon\t300\t400\t.\t+\t.\tgene_id \"GPLUS\"; transcript_id \"TPLUS\";
chr1\tsrc\texon\t1200\t1300\t.\t-\t.\tgene_id \"GMINUS\"; transcript_id \"TMINUS\";
chr1\tsrc\texon\t1000\t1100\t.\t-\t.\tgene_id \"GMINUS\"; transcript_id \"TMINUS\";
chr2\tsrc\texon\t50\t500\t.\t+\t.\tgene_id \"GSINGLE\"; transcript_id \"TSINGLE\";
";

const VCF: &str = "\
##fileformat=VCFv4.2
##contig=<ID=chr1>
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO
chr1\t199\t.\tA\tT\t.\tPASS\t.
chr1\t202\t.\tA\tT\t.\tPASS\t.
chr1\t250\t.\tA\tT\t.\tPASS\t.
chr1\t1201\t.\tA\tT\t.\tPASS\tDP=7
chr1\t1102\t.\tA\tT\t.\tPASS\t.
chr2\t60\t.\tA\tT\t.\tPASS\t.
";

fn write(path: &Path, text: &str) {
    fs::write(path, text).unwrap();
}

fn info_column(line: &str) -> &str {
    line.split('\t').nth(7).unwrap()
}

fn records(text: &str) -> Vec<&str> {
    text.lines().filter(|l| !l.starts_with('#')).collect()
}

#[test]
fn annotates_both_strands_end_to_end() {
    let dir = tempdir().unwrap();
    let gtf = dir.path().join("genes.gtf");
    let vcf = dir.path().join("calls.vcf");
    let out = dir.path().join("annotated.vcf");
    write(&gtf, GTF);
    write(&vcf, VCF);

    let idx = TranscriptIndex::open(&gtf, IdNameKeys::default()).unwrap();
    let opts = AnnotateOptions {
        output: Some(out.clone()),
        ..Default::default()
    };
    let stats = annotate_file(&idx, &vcf, &opts).unwrap();
    assert_eq!(stats.records, 6);
    assert_eq!(stats.annotated, 4);

    let text = fs::read_to_string(&out).unwrap();
    let header: Vec<_> = text.lines().filter(|l| l.starts_with('#')).collect();
    assert_eq!(header.len(), 7);
    assert_eq!(
        header[2],
        "##INFO=<ID=genes,Number=1,Type=String,Description=\"The Variant falls in the splice region of these genes\">"
    );
    assert!(header[6].starts_with("#CHROM"));

    let recs = records(&text);
    assert_eq!(recs.len(), 6);
    assert_eq!(
        info_column(recs[0]),
        "genes=GPLUS;transcripts=TPLUS;distances=1;annotations=splicing_exonic"
    );
    assert_eq!(
        info_column(recs[1]),
        "genes=GPLUS;transcripts=TPLUS;distances=2;annotations=splicing_intronic"
    );
    assert_eq!(
        info_column(recs[2]),
        "genes=NA;transcripts=NA;distances=NA;annotations=NA"
    );
    assert_eq!(
        info_column(recs[3]),
        "DP=7;genes=GMINUS;transcripts=TMINUS;distances=1;annotations=splicing_exonic"
    );
    assert_eq!(
        info_column(recs[4]),
        "genes=GMINUS;transcripts=TMINUS;distances=2;annotations=splicing_intronic"
    );
    // Single-exon transcripts are skipped by default.
    assert_eq!(
        info_column(recs[5]),
        "genes=NA;transcripts=NA;distances=NA;annotations=NA"
    );
}

#[test]
fn saved_index_and_gzip_output_give_the_same_records() {
    let dir = tempdir().unwrap();
    let gtf = dir.path().join("genes.gtf");
    let index = dir.path().join("genes.vsx");
    let vcf = dir.path().join("calls.vcf");
    let plain = dir.path().join("plain.vcf");
    let gz = dir.path().join("annotated.vcf.gz");
    write(&gtf, GTF);
    write(&vcf, VCF);

    let built = TranscriptIndex::from_path(&gtf, IdNameKeys::default()).unwrap();
    built.save(&index).unwrap();

    let opts = AnnotateOptions {
        output: Some(plain.clone()),
        ..Default::default()
    };
    annotate_file(&built, &vcf, &opts).unwrap();

    let loaded = TranscriptIndex::open(&index, IdNameKeys::default()).unwrap();
    let opts = AnnotateOptions {
        output: Some(gz.clone()),
        ..Default::default()
    };
    annotate_file(&loaded, &vcf, &opts).unwrap();

    let mut unzipped = String::new();
    MultiGzDecoder::new(fs::File::open(&gz).unwrap())
        .read_to_string(&mut unzipped)
        .unwrap();
    assert_eq!(unzipped, fs::read_to_string(&plain).unwrap());
}

#[test]
fn forced_modes_and_single_exon_transcripts() {
    let dir = tempdir().unwrap();
    let gtf = dir.path().join("genes.gtf");
    let vcf = dir.path().join("calls.vcf");
    let out = dir.path().join("annotated.vcf");
    write(&gtf, GTF);
    write(&vcf, VCF);

    let idx = TranscriptIndex::open(&gtf, IdNameKeys::default()).unwrap();
    let opts = AnnotateOptions {
        splice: SpliceOptions {
            force_intronic: true,
            force_exonic: true,
            skip_single_exon_transcripts: false,
            ..Default::default()
        },
        output: Some(out.clone()),
    };
    let stats = annotate_file(&idx, &vcf, &opts).unwrap();
    assert_eq!(stats.annotated, 6);

    let text = fs::read_to_string(&out).unwrap();
    let recs = records(&text);
    assert_eq!(
        info_column(recs[2]),
        "genes=GPLUS;transcripts=TPLUS;distances=50;annotations=intronic"
    );
    assert_eq!(
        info_column(recs[5]),
        "genes=GSINGLE;transcripts=TSINGLE;distances=10;annotations=exonic"
    );
}

#[test]
fn malformed_record_stops_the_run() {
    let dir = tempdir().unwrap();
    let gtf = dir.path().join("genes.gtf");
    let vcf = dir.path().join("calls.vcf");
    write(&gtf, GTF);
    write(
        &vcf,
        "##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\nchr1\tabc\t.\tA\tT\t.\tPASS\t.\n",
    );

    let idx = TranscriptIndex::open(&gtf, IdNameKeys::default()).unwrap();
    let opts = AnnotateOptions {
        output: Some(dir.path().join("out.vcf")),
        ..Default::default()
    };
    let err = annotate_file(&idx, &vcf, &opts).unwrap_err();
    assert!(matches!(err, AnnotateError::MalformedVcf { line_no: 3, .. }));
}
