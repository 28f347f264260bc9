/// End-to-end runs of the pseudofinder binary
use assert_cmd::Command;
use flate2::write::GzEncoder;
use flate2::Compression;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

const HEADER: &str = "sample,chromosome,sv_start,sv_end,sv_type,gene_id,transcript_id,matched_exon_indices,classification_score\n";

const VCF_HEADER: &str = "##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n";

/// T1 on chr1: exon 1 [100,200), exon 2 [300,400)
fn write_exons(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("exons.tsv");
    let mut file = fs::File::create(&path).unwrap();
    writeln!(file, "chrom\tgene_id\ttranscript_id\texon_index\tstart\tend\tstrand").unwrap();
    writeln!(file, "chr1\tG1\tT1\t1\t100\t200\t+").unwrap();
    writeln!(file, "chr1\tG1\tT1\t2\t300\t400\t+").unwrap();
    path
}

fn write_vcf(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("calls.vcf");
    fs::write(&path, format!("{VCF_HEADER}{body}")).unwrap();
    path
}

fn pseudofinder() -> Command {
    Command::cargo_bin("pseudofinder").unwrap()
}

#[test]
fn exact_exon_deletion_is_reported() {
    let tmpdir = TempDir::new().unwrap();
    let exons = write_exons(&tmpdir);
    let vcf = write_vcf(&tmpdir, "chr1\t100\tsv1\tN\t<DEL>\t.\tPASS\tSVTYPE=DEL;END=200\n");

    pseudofinder()
        .arg("--exons")
        .arg(&exons)
        .arg("--sample")
        .arg("S1")
        .arg(&vcf)
        .assert()
        .success()
        .stdout(format!("{HEADER}S1,chr1,100,200,deletion,G1,T1,1,0\n"));
}

#[test]
fn partial_exon_deletion_gives_header_only() {
    let tmpdir = TempDir::new().unwrap();
    let exons = write_exons(&tmpdir);
    let vcf = write_vcf(&tmpdir, "chr1\t150\tsv1\tN\t<DEL>\t.\tPASS\tSVTYPE=DEL;END=350\n");

    pseudofinder()
        .args(["--sample", "S1", "--exons"])
        .arg(&exons)
        .arg(&vcf)
        .assert()
        .success()
        .stdout(HEADER);
}

#[test]
fn unprefixed_vcf_chromosome_matches() {
    let tmpdir = TempDir::new().unwrap();
    let exons = write_exons(&tmpdir);
    let vcf = write_vcf(&tmpdir, "1\t100\tsv1\tN\t<DUP>\t.\tPASS\tSVTYPE=DUP;END=200\n");

    pseudofinder()
        .args(["--sample", "S1", "--exons"])
        .arg(&exons)
        .arg(&vcf)
        .assert()
        .success()
        .stdout(predicate::str::contains(",G1,T1,1,0"));
}

#[test]
fn sv_type_selection_excludes_other_types() {
    let tmpdir = TempDir::new().unwrap();
    let exons = write_exons(&tmpdir);
    let vcf = write_vcf(&tmpdir, "chr1\t100\tsv1\tN\t<DEL>\t.\tPASS\tSVTYPE=DEL;END=200\n");

    pseudofinder()
        .args(["--sample", "S1", "--sv-type", "duplication", "--exons"])
        .arg(&exons)
        .arg(&vcf)
        .assert()
        .success()
        .stdout(HEADER);
}

#[test]
fn output_is_identical_across_runs() {
    let tmpdir = TempDir::new().unwrap();
    let exons = write_exons(&tmpdir);
    let vcf = write_vcf(
        &tmpdir,
        "chr1\t300\tsv2\tN\t<DUP>\t.\tPASS\tSVTYPE=DUP;END=402\n\
         chr1\t100\tsv1\tN\t<DEL>\t.\tPASS\tSVTYPE=DEL;END=200\n\
         chr1\t95\tsv3\tN\t<DEL>\t.\tPASS\tSVTYPE=DEL;END=405\n",
    );

    let run = || {
        pseudofinder()
            .args(["--sample", "S1", "--exons"])
            .arg(&exons)
            .arg(&vcf)
            .output()
            .unwrap()
    };
    let first = run();
    let second = run();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);

    let text = String::from_utf8(first.stdout).unwrap();
    assert_eq!(text.lines().count(), 4);
}

#[test]
fn gzipped_inputs_are_read() {
    let tmpdir = TempDir::new().unwrap();
    let plain = write_exons(&tmpdir);
    let exons = tmpdir.path().join("exons.tsv.gz");
    let mut enc = GzEncoder::new(fs::File::create(&exons).unwrap(), Compression::default());
    enc.write_all(&fs::read(&plain).unwrap()).unwrap();
    enc.finish().unwrap();

    let vcf = tmpdir.path().join("calls.vcf.gz");
    let mut enc = GzEncoder::new(fs::File::create(&vcf).unwrap(), Compression::default());
    write!(enc, "{VCF_HEADER}chr1\t100\tsv1\tN\t<DEL>\t.\tPASS\tSVTYPE=DEL;END=200\n").unwrap();
    enc.finish().unwrap();

    pseudofinder()
        .args(["--sample", "S1", "--exons"])
        .arg(&exons)
        .arg(&vcf)
        .assert()
        .success()
        .stdout(predicate::str::contains("S1,chr1,100,200,deletion,G1,T1,1,0"));
}

#[test]
fn log_file_is_written() {
    let tmpdir = TempDir::new().unwrap();
    let exons = write_exons(&tmpdir);
    let vcf = write_vcf(&tmpdir, "chr1\t100\tsv1\tN\t<DEL>\t.\tPASS\tSVTYPE=DEL;END=200\n");
    let log = tmpdir.path().join("run.log");

    pseudofinder()
        .args(["--sample", "S1", "--exons"])
        .arg(&exons)
        .arg("--log")
        .arg(&log)
        .arg(&vcf)
        .assert()
        .success();

    let text = fs::read_to_string(&log).unwrap();
    assert!(text.contains("program started"));
    assert!(text.contains("program finished"));
}

#[test]
fn missing_exon_file_exits_1() {
    let tmpdir = TempDir::new().unwrap();
    let vcf = write_vcf(&tmpdir, "");

    pseudofinder()
        .args(["--sample", "S1", "--exons"])
        .arg(tmpdir.path().join("nope.tsv"))
        .arg(&vcf)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("pseudofinder ERROR:"));
}

#[test]
fn empty_exon_table_exits_1() {
    let tmpdir = TempDir::new().unwrap();
    let exons = tmpdir.path().join("exons.tsv");
    fs::write(&exons, "chrom\tgene_id\ttranscript_id\texon_index\tstart\tend\tstrand\n").unwrap();
    let vcf = write_vcf(&tmpdir, "");

    pseudofinder()
        .args(["--sample", "S1", "--exons"])
        .arg(&exons)
        .arg(&vcf)
        .assert()
        .code(1);
}

#[test]
fn missing_sample_exits_2() {
    let tmpdir = TempDir::new().unwrap();
    let exons = write_exons(&tmpdir);
    let vcf = write_vcf(&tmpdir, "");

    pseudofinder()
        .arg("--exons")
        .arg(&exons)
        .arg(&vcf)
        .assert()
        .code(2);
}

#[test]
fn vcf_without_header_exits_3() {
    let tmpdir = TempDir::new().unwrap();
    let exons = write_exons(&tmpdir);
    let vcf = tmpdir.path().join("calls.vcf");
    fs::write(&vcf, "chr1\t100\tsv1\tN\t<DEL>\t.\tPASS\tSVTYPE=DEL;END=200\n").unwrap();

    pseudofinder()
        .args(["--sample", "S1", "--exons"])
        .arg(&exons)
        .arg(&vcf)
        .assert()
        .code(3);
}

#[test]
fn short_flags_are_not_accepted() {
    let tmpdir = TempDir::new().unwrap();
    let exons = write_exons(&tmpdir);
    let vcf = write_vcf(&tmpdir, "");

    pseudofinder()
        .args(["--sample", "S1", "-t", "5", "--exons"])
        .arg(&exons)
        .arg(&vcf)
        .assert()
        .code(2);
}

#[test]
fn non_utf8_vcf_record_is_skipped() {
    let tmpdir = TempDir::new().unwrap();
    let exons = write_exons(&tmpdir);
    let vcf = tmpdir.path().join("calls.vcf");
    let mut bytes = VCF_HEADER.as_bytes().to_vec();
    bytes.extend_from_slice(b"chr1\t50\tbad\xff\xfe\tN\t<DEL>\t.\tPASS\tSVTYPE=DEL;END=60\n");
    bytes.extend_from_slice(b"chr1\t100\tsv1\tN\t<DEL>\t.\tPASS\tSVTYPE=DEL;END=200\n");
    fs::write(&vcf, bytes).unwrap();

    pseudofinder()
        .args(["--sample", "S1", "--exons"])
        .arg(&exons)
        .arg(&vcf)
        .assert()
        .success()
        .stdout(format!("{HEADER}S1,chr1,100,200,deletion,G1,T1,1,0\n"));
}
