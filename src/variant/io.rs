use std::io::BufRead;
use std::path::{Path, PathBuf};

use rust_htslib::bcf::{self, record::Numeric, Read as _};
use rust_htslib::errors::Error as HtsError;

use crate::error::{PseudoError, Result};
use crate::utils::open_bufread;

/// Stop after this many unparseable records in a row; the file is not VCF.
const MAX_CONSECUTIVE_INVALID: usize = 1_000;

/// The VCF fields the SV pipeline consumes, copied out of an htslib record.
///
/// `pos` is kept as written (1-based); the normalizer converts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawSvRecord {
    /// 1-based ordinal among the data records of the file
    pub record_no: usize,
    pub chrom: String,
    pub pos: u64,
    pub id: Option<String>,
    pub reference: String,
    pub alts: Vec<String>,
    pub qual: Option<f32>,
    /// FILTER names joined by `;`, `.` when unset
    pub filter: String,
    /// INFO/SVTYPE
    pub svtype: Option<String>,
    /// INFO/END
    pub end: Option<String>,
    /// INFO/SVLEN (first value)
    pub svlen: Option<String>,
}

impl RawSvRecord {
    pub fn is_pass(&self) -> bool {
        self.filter == "PASS" || self.filter == "."
    }
}

/// Record-level filters applied before normalization.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SvFilter {
    /// Keep only FILTER == PASS (or '.').
    pub pass_only: bool,

    /// Keep only QUAL >= this value (records without QUAL are dropped).
    pub min_qual: Option<f32>,
}

impl SvFilter {
    pub fn accepts(&self, rec: &RawSvRecord) -> bool {
        if self.pass_only && !rec.is_pass() {
            return false;
        }
        match (self.min_qual, rec.qual) {
            (Some(min), Some(q)) => q >= min,
            (Some(_), None) => false,
            (None, _) => true,
        }
    }
}

/// Streaming VCF reader on top of `rust_htslib::bcf::Reader`.
///
/// Plain, gzipped and bgzipped VCF (and BCF) are accepted. A record htslib
/// cannot parse comes back as a recoverable `MalformedSvRecord`; a missing
/// `#CHROM` header is a fatal `VcfFormat` error raised when opening.
pub struct VcfReader {
    inner: bcf::Reader,
    path: PathBuf,
}

impl VcfReader {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        check_header(path)?;

        let inner = bcf::Reader::from_path(path).map_err(|e| PseudoError::VcfFormat {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            inner,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Iterate over records in file order.
    ///
    /// Iteration ends after a fatal error.
    pub fn records(mut self) -> impl Iterator<Item = Result<RawSvRecord>> {
        let mut record = self.inner.empty_record();
        let mut record_no = 0usize;
        let mut invalid_run = 0usize;
        let mut done = false;

        std::iter::from_fn(move || {
            if done {
                return None;
            }
            let read = self.inner.read(&mut record)?;
            record_no += 1;
            match read {
                Ok(()) => {
                    invalid_run = 0;
                    Some(raw_from_record(&record, record_no))
                }
                Err(HtsError::BcfInvalidRecord) if invalid_run < MAX_CONSECUTIVE_INVALID => {
                    invalid_run += 1;
                    Some(Err(PseudoError::MalformedSvRecord {
                        record: record_no,
                        reason: "htslib could not parse the record".to_string(),
                    }))
                }
                Err(e) => {
                    done = true;
                    Some(Err(PseudoError::VcfFormat {
                        path: self.path.clone(),
                        reason: format!("reading record {record_no}: {e}"),
                    }))
                }
            }
        })
    }
}

/// The first line that is not `##` meta must be the `#CHROM` header.
///
/// htslib hands back an unusable header for such files instead of an error,
/// so this is checked before the file is opened for parsing.
fn check_header(path: &Path) -> Result<()> {
    let mut reader = open_bufread(path)?;
    let mut buf = Vec::new();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| PseudoError::io(e, path))?;
        if n == 0 {
            break;
        }
        line_no += 1;
        if buf.starts_with(b"##") || buf.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        if buf.starts_with(b"#CHROM") {
            return Ok(());
        }
        return Err(PseudoError::VcfFormat {
            path: path.to_path_buf(),
            reason: format!("line {line_no} comes before the #CHROM header"),
        });
    }

    Err(PseudoError::VcfFormat {
        path: path.to_path_buf(),
        reason: "no #CHROM header".to_string(),
    })
}

fn raw_from_record(rec: &bcf::Record, record_no: usize) -> Result<RawSvRecord> {
    let malformed = |reason: String| PseudoError::MalformedSvRecord {
        record: record_no,
        reason,
    };

    let rid = rec.rid().ok_or_else(|| malformed("missing CHROM".to_string()))?;
    let chrom = rec
        .header()
        .rid2name(rid)
        .map_err(|e| malformed(e.to_string()))?;
    let pos = u64::try_from(rec.pos())
        .map_err(|_| malformed(format!("bad POS {}", rec.pos())))?
        + 1;

    let id = rec.id();
    let id = (!id.is_empty() && id != b".").then(|| lossy(&id));

    let alleles = rec.alleles();
    let reference = alleles.first().map(|a| lossy(a)).unwrap_or_default();
    let alts = alleles
        .iter()
        .skip(1)
        .map(|a| lossy(a))
        .filter(|a| !a.is_empty() && a != ".")
        .collect();

    let qual = rec.qual();
    let qual = (!qual.is_missing()).then_some(qual);

    let filters: Vec<String> = rec
        .filters()
        .map(|id| lossy(&rec.header().id_to_name(id)))
        .collect();
    let filter = if filters.is_empty() {
        ".".to_string()
    } else {
        filters.join(";")
    };

    Ok(RawSvRecord {
        record_no,
        chrom: lossy(chrom),
        pos,
        id,
        reference,
        alts,
        qual,
        filter,
        svtype: info_text(rec, b"SVTYPE"),
        end: info_text(rec, b"END"),
        svlen: info_text(rec, b"SVLEN"),
    })
}

/// First value of an INFO field as text.
///
/// Tags missing from the header are typed as String by htslib, so both
/// declared Integer and undeclared values are handled.
fn info_text(rec: &bcf::Record, tag: &[u8]) -> Option<String> {
    if let Ok(Some(values)) = rec.info(tag).integer() {
        return values
            .first()
            .filter(|v| !v.is_missing())
            .map(|v| v.to_string());
    }
    if let Ok(Some(values)) = rec.info(tag).string() {
        return values
            .first()
            .map(|v| lossy(v))
            .filter(|v| !v.is_empty() && v != ".");
    }
    None
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
