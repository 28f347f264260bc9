use std::collections::{HashMap, VecDeque};
use std::io::BufRead;
use std::path::Path;

use crate::error::{PseudoError, Result};
use crate::types::{GenomicInterval, Strand};

/// Exon table layout.
///
/// - `ExonTsv`: chrom, gene_id, transcript_id, exon_index, start, end, strand
///   (tab-separated, 0-based half-open)
/// - `Gtf`: GTF/GFF3 annotation; only `exon` features are read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableDialect {
    ExonTsv,
    Gtf,
}

impl TableDialect {
    /// Pick the dialect from the file name (`.gz` is looked through).
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        let name = name.strip_suffix(".gz").unwrap_or(&name);
        if name.ends_with(".gtf") || name.ends_with(".gff") || name.ends_with(".gff3") {
            TableDialect::Gtf
        } else {
            TableDialect::ExonTsv
        }
    }
}

/// A single exon line, before it is attached to a transcript.
///
/// `exon_index` is `None` when a GTF line carries no `exon_number`; the
/// builder numbers such exons from genomic order and strand.
#[derive(Debug, Clone, PartialEq)]
pub struct ExonRecord {
    pub line_no: usize,
    pub interval: GenomicInterval,
    pub gene_id: String,
    pub transcript_id: String,
    pub exon_index: Option<u32>,
    pub strand: Strand,
}

/// Streaming reader for exon tables.
///
/// Most users should go through [`crate::annotation::ExonIndexBuilder`].
///
/// # Example
/// ```
/// use std::io::Cursor;
/// use pseudofinder::annotation::io::{ExonTableReader, TableDialect};
///
/// let data = "chr1\tG1\tT1\t1\t100\t200\t+\n";
/// let rdr = ExonTableReader::new(Cursor::new(data), TableDialect::ExonTsv);
/// let recs: Vec<_> = rdr.records().collect::<Result<_, _>>().unwrap();
/// assert_eq!(recs[0].interval.start(), 100);
/// ```
pub struct ExonTableReader<R: BufRead> {
    reader: R,
    dialect: TableDialect,
    buf: Vec<u8>,
    line_no: usize,
    pending: VecDeque<ExonRecord>,
}

impl<R: BufRead> ExonTableReader<R> {
    pub fn new(reader: R, dialect: TableDialect) -> Self {
        Self {
            reader,
            dialect,
            buf: Vec::new(),
            line_no: 0,
            pending: VecDeque::new(),
        }
    }

    /// Returns an iterator over parsed exon records.
    ///
    /// - Skips blank lines, `#` comments and a TSV header line
    /// - Skips non-exon GTF features
    /// - Yields one record per parent transcript for multi-parent GFF3 exons
    /// - Yields `MalformedExonRecord` for bad lines, including lines that are
    ///   not UTF-8 (recoverable), and `Io` for read failures (fatal)
    pub fn records(mut self) -> impl Iterator<Item = Result<ExonRecord>> {
        std::iter::from_fn(move || loop {
            if let Some(rec) = self.pending.pop_front() {
                return Some(Ok(rec));
            }

            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line_no += 1,
                Err(e) => return Some(Err(PseudoError::io(e, "<exon table>"))),
            }

            let line = match std::str::from_utf8(&self.buf) {
                Ok(line) => line.trim_end_matches(&['\n', '\r'][..]),
                Err(e) => {
                    return Some(Err(PseudoError::exon_at_line(
                        self.line_no,
                        format!("not valid UTF-8: {e}"),
                    )))
                }
            };
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let parsed = match self.dialect {
                TableDialect::ExonTsv => parse_tsv_line(line, self.line_no).map(Vec::from_iter),
                TableDialect::Gtf => parse_gtf_line(line, self.line_no),
            };
            match parsed {
                Ok(recs) => self.pending.extend(recs),
                Err(e) => return Some(Err(e)),
            }
        })
    }
}

/// Parse one exon TSV line. Returns `Ok(None)` for a header line.
pub fn parse_tsv_line(line: &str, line_no: usize) -> Result<Option<ExonRecord>> {
    let fields: Vec<&str> = line.split('\t').map(str::trim).collect();

    if matches!(fields[0].to_ascii_lowercase().as_str(), "chrom" | "chromosome") {
        return Ok(None);
    }
    if fields.len() != 7 {
        return Err(PseudoError::exon_at_line(
            line_no,
            format!("expected 7 tab-separated fields, found {}", fields.len()),
        ));
    }

    let [chrom, gene_id, transcript_id, idx_s, start_s, end_s, strand_s] =
        [fields[0], fields[1], fields[2], fields[3], fields[4], fields[5], fields[6]];

    for (name, value) in [("gene_id", gene_id), ("transcript_id", transcript_id)] {
        if value.is_empty() {
            return Err(PseudoError::exon_at_line(line_no, format!("missing {name}")));
        }
    }

    let exon_index: u32 = idx_s
        .parse()
        .ok()
        .filter(|&i| i >= 1)
        .ok_or_else(|| PseudoError::exon_at_line(line_no, format!("bad exon index '{idx_s}'")))?;
    let start = parse_coord(start_s, line_no)?;
    let end = parse_coord(end_s, line_no)?;
    let strand = parse_strand(strand_s, line_no)?;
    let interval = make_interval(chrom, start, end, line_no)?;

    Ok(Some(ExonRecord {
        line_no,
        interval,
        gene_id: gene_id.to_string(),
        transcript_id: transcript_id.to_string(),
        exon_index: Some(exon_index),
        strand,
    }))
}

/// Attribute keys tried, in order, for the gene id.
const GENE_ID_KEYS: [&str; 3] = ["gene_id", "gene", "GeneID"];

/// Parse one GTF/GFF3 line.
///
/// Returns no records for non-exon features, and one record per parent for a
/// GFF3 exon shared by several transcripts (`Parent=tx1,tx2`).
pub fn parse_gtf_line(line: &str, line_no: usize) -> Result<Vec<ExonRecord>> {
    // seqname source feature start end score strand phase attributes
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != 9 {
        return Err(PseudoError::exon_at_line(
            line_no,
            format!("expected 9 GTF columns, found {}", fields.len()),
        ));
    }
    if fields[2] != "exon" {
        return Ok(Vec::new());
    }

    // 1-based inclusive -> 0-based half-open [start-1, end)
    let start_1 = parse_coord(fields[3], line_no)?;
    let end_1 = parse_coord(fields[4], line_no)?;
    if start_1 == 0 {
        return Err(PseudoError::exon_at_line(line_no, "GTF start must be >= 1"));
    }
    let interval = make_interval(fields[0], start_1 - 1, end_1, line_no)?;
    let strand = parse_strand(fields[6], line_no)?;

    let attrs = parse_attributes(fields[8]);
    let gene_id = GENE_ID_KEYS
        .iter()
        .find_map(|k| attrs.get(*k))
        .cloned()
        .ok_or_else(|| {
            PseudoError::exon_at_line(
                line_no,
                format!("missing gene id attribute (tried {})", GENE_ID_KEYS.join(", ")),
            )
        })?;

    let transcript_ids: Vec<String> = match attrs.get("transcript_id") {
        Some(tx) => vec![tx.clone()],
        None => attrs
            .get("Parent")
            .map(|p| {
                p.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
    };
    if transcript_ids.is_empty() {
        return Err(PseudoError::exon_at_line(
            line_no,
            "missing transcript_id (or Parent) attribute",
        ));
    }

    let exon_index = match attrs.get("exon_number") {
        Some(v) => Some(v.parse::<u32>().ok().filter(|&i| i >= 1).ok_or_else(|| {
            PseudoError::exon_at_line(line_no, format!("bad exon_number '{v}'"))
        })?),
        None => None,
    };

    Ok(transcript_ids
        .into_iter()
        .map(|transcript_id| ExonRecord {
            line_no,
            interval: interval.clone(),
            gene_id: gene_id.clone(),
            transcript_id,
            exon_index,
            strand,
        })
        .collect())
}

/// Parse a GTF (`key "value";`) or GFF3 (`key=value;`) attribute column.
pub fn parse_attributes(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for part in s.trim().split(';') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (key, value) = match part.split_once('=') {
            Some((k, v)) if !k.contains(char::is_whitespace) => (k, v),
            _ => match part.split_once(char::is_whitespace) {
                Some((k, v)) => (k, v),
                None => continue,
            },
        };
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

fn parse_coord(s: &str, line_no: usize) -> Result<u32> {
    s.trim()
        .parse()
        .map_err(|_| PseudoError::exon_at_line(line_no, format!("bad coordinate '{s}'")))
}

fn parse_strand(s: &str, line_no: usize) -> Result<Strand> {
    Strand::from_symbol(s.trim())
        .ok_or_else(|| PseudoError::exon_at_line(line_no, format!("bad strand '{s}'")))
}

fn make_interval(chrom: &str, start: u32, end: u32, line_no: usize) -> Result<GenomicInterval> {
    GenomicInterval::new(chrom, start, end)
        .map_err(|e| PseudoError::exon_at_line(line_no, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parse_tsv_exon_line() {
        let rec = parse_tsv_line("chr1\tG1\tT1\t2\t300\t400\t-", 5)
            .unwrap()
            .unwrap();
        assert_eq!(rec.line_no, 5);
        assert_eq!(rec.interval, GenomicInterval::new("chr1", 300, 400).unwrap());
        assert_eq!(rec.gene_id, "G1");
        assert_eq!(rec.transcript_id, "T1");
        assert_eq!(rec.exon_index, Some(2));
        assert_eq!(rec.strand, Strand::Minus);
    }

    #[test]
    fn tsv_header_is_skipped() {
        let rec = parse_tsv_line("chrom\tgene_id\ttranscript_id\texon\tstart\tend\tstrand", 1);
        assert!(matches!(rec, Ok(None)));
    }

    #[test]
    fn tsv_rejects_bad_records() {
        let bad = [
            "chr1\tG1\tT1\t1\t200\t100\t+", // start >= end
            "chr1\tG1\tT1\t1\t100\t100\t+", // empty
            "chr1\t\tT1\t1\t100\t200\t+",   // missing gene
            "chr1\tG1\tT1\t0\t100\t200\t+", // exon index is 1-based
            "chr1\tG1\tT1\t1\t100\t200\t.", // no strand
            "chr1\tG1\tT1\t1\t100\t200",    // missing column
            "chr1\tG1\tT1\t1\tabc\t200\t+",
        ];
        for line in bad {
            let err = parse_tsv_line(line, 7).unwrap_err();
            assert!(
                matches!(err, PseudoError::MalformedExonRecord { .. }),
                "{line}: {err}"
            );
        }
    }

    #[test]
    fn parse_gtf_exon_line() {
        let line = "chr1\tsrc\texon\t101\t150\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\"; exon_number \"1\";";
        let rec = parse_gtf_line(line, 1).unwrap().remove(0);
        // 101..150 inclusive -> [100,150)
        assert_eq!(rec.interval.start(), 100);
        assert_eq!(rec.interval.end(), 150);
        assert_eq!(rec.gene_id, "G1");
        assert_eq!(rec.transcript_id, "T1");
        assert_eq!(rec.exon_index, Some(1));
    }

    #[test]
    fn shared_gff3_exon_belongs_to_every_parent() {
        let line = "chr2\tsrc\texon\t5\t20\t.\t-\t.\tID=ex1;Parent=tx1,tx2;gene=G9";
        let recs = parse_gtf_line(line, 1).unwrap();
        let txs: Vec<&str> = recs.iter().map(|r| r.transcript_id.as_str()).collect();
        assert_eq!(txs, vec!["tx1", "tx2"]);
        for rec in &recs {
            assert_eq!(rec.interval.start(), 4);
            assert_eq!(rec.gene_id, "G9");
            assert_eq!(rec.exon_index, None);
            assert_eq!(rec.strand, Strand::Minus);
        }
    }

    #[test]
    fn gene_id_falls_back_through_known_keys() {
        let line = "chr2\tsrc\texon\t5\t20\t.\t+\t.\tParent=tx1;GeneID=4242";
        assert_eq!(parse_gtf_line(line, 1).unwrap()[0].gene_id, "4242");

        let line = "chr2\tsrc\texon\t5\t20\t.\t+\t.\tParent=tx1";
        assert!(parse_gtf_line(line, 1).unwrap_err().is_recoverable());
    }

    #[test]
    fn gtf_non_exon_features_are_ignored() {
        let line = "chr1\tsrc\tCDS\t101\t150\t.\t+\t0\tgene_id \"G1\"; transcript_id \"T1\";";
        assert!(parse_gtf_line(line, 1).unwrap().is_empty());
    }

    #[test]
    fn dialect_from_file_name() {
        assert_eq!(TableDialect::from_path(Path::new("genes.gtf.gz")), TableDialect::Gtf);
        assert_eq!(TableDialect::from_path(Path::new("a.GFF3")), TableDialect::Gtf);
        assert_eq!(TableDialect::from_path(Path::new("exons.tsv")), TableDialect::ExonTsv);
        assert_eq!(TableDialect::from_path(Path::new("exons.txt.gz")), TableDialect::ExonTsv);
    }

    #[test]
    fn streaming_reader_skips_comments_and_keeps_going_after_errors() {
        let data = "\
#comment
chr1\tG1\tT1\t1\t100\t200\t+

chr1\tG1\tT1\t2\tbad\t400\t+
chr1\tG1\tT1\t2\t300\t400\t+
";
        let recs: Vec<_> = ExonTableReader::new(Cursor::new(data), TableDialect::ExonTsv)
            .records()
            .collect();
        assert_eq!(recs.len(), 3);
        assert!(recs[0].is_ok());
        assert!(recs[1].as_ref().unwrap_err().is_recoverable());
        assert_eq!(recs[2].as_ref().unwrap().line_no, 5);
    }

    #[test]
    fn non_utf8_line_is_skipped_not_fatal() {
        let mut data = b"chr1\tG1\tT1\t1\t100\t200\t+\n".to_vec();
        data.extend_from_slice(b"chr1\tG\xff\xfe\tT1\t2\t300\t400\t+\n");
        data.extend_from_slice(b"chr1\tG1\tT1\t3\t500\t600\t+\n");
        let recs: Vec<_> = ExonTableReader::new(Cursor::new(data), TableDialect::ExonTsv)
            .records()
            .collect();
        assert_eq!(recs.len(), 3);
        assert!(recs[1].as_ref().unwrap_err().is_recoverable());
        assert_eq!(recs[2].as_ref().unwrap().exon_index, Some(3));
    }
}
