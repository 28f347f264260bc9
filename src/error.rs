use std::path::PathBuf;

/// Errors that can occur while finding pseudogene candidates.
///
/// Per-record kinds (`MalformedExonRecord`, `UnsupportedSvType`,
/// `MalformedSvRecord`) are recovered where they happen: the record is
/// skipped and the error is logged. Everything else aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum PseudoError {
    #[error("malformed exon record ({at}): {reason}")]
    MalformedExonRecord { at: String, reason: String },

    #[error("unsupported SV type '{sv_type}' in VCF record {record}")]
    UnsupportedSvType { record: usize, sv_type: String },

    #[error("exon table contains no usable exons")]
    EmptyExonIndex,

    #[error("malformed VCF record {record}: {reason}")]
    MalformedSvRecord { record: usize, reason: String },

    #[error("invalid interval {chrom}:{start}-{end}: {reason}")]
    InvalidInterval {
        chrom: String,
        start: u32,
        end: u32,
        reason: &'static str,
    },

    #[error("I/O error: {source} ({path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("VCF file error in {path}: {reason}")]
    VcfFormat { path: PathBuf, reason: String },

    #[error("CSV output error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, PseudoError>;

/// Exit status for a file I/O error.
pub const EXIT_FILE_IO_ERROR: i32 = 1;
/// Exit status for a command line error (clap uses the same value).
pub const EXIT_COMMAND_LINE_ERROR: i32 = 2;
/// Exit status for an unreadable or structurally broken VCF file.
pub const EXIT_VCF_FILE_ERROR: i32 = 3;

impl PseudoError {
    /// Convenience for wrapping an `io::Error` with a path context.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: path.into(),
        }
    }

    /// Malformed exon line in an input table.
    pub fn exon_at_line(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedExonRecord {
            at: format!("line {line}"),
            reason: reason.into(),
        }
    }

    /// True for errors that only invalidate a single input record.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MalformedExonRecord { .. }
                | Self::UnsupportedSvType { .. }
                | Self::MalformedSvRecord { .. }
        )
    }

    /// Process exit status used when this error terminates the run.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::VcfFormat { .. } | Self::MalformedSvRecord { .. } | Self::UnsupportedSvType { .. } => {
                EXIT_VCF_FILE_ERROR
            }
            _ => EXIT_FILE_IO_ERROR,
        }
    }
}

impl From<std::io::Error> for PseudoError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            source: err,
            path: PathBuf::from("<unknown>"),
        }
    }
}
