//! pseudofinder
//!
//! Find processed pseudogenes in DNA sequencing data using structural variant
//! calls. SV breakpoints (from a VCF) are matched against exon coordinates;
//! an SV that removes or copies whole exons with breakpoints at exon/intron
//! junctions is reported as a candidate retrocopy of that transcript.
//! Coordinates are 0-based, half-open throughout.

pub mod aggregate;
pub mod annotation;
pub mod classify;
pub mod error;
pub mod index;
pub mod matcher;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod types;
pub mod utils;
pub mod variant;

pub use index::ExonIndex;

pub use annotation::ExonIndexBuilder;

pub use error::{PseudoError, Result};
pub use types::{GenomicInterval, Strand};

pub use model::{ClassifyOptions, Exon, PseudogeneCandidate, StructuralVariant, SvType, Transcript};

pub use aggregate::aggregate;
pub use classify::{classify, classify_all};
pub use matcher::{match_sv, TranscriptHits};
pub use pipeline::{run, RunConfig, RunSummary};
pub use variant::{normalize, SvFilter, VcfReader};
