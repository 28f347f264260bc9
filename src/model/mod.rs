pub mod exon;
pub mod transcript;
pub mod types;

pub use exon::Exon;
pub use transcript::Transcript;
pub use types::{
    ClassifyOptions, PseudogeneCandidate, Rejection, StructuralVariant, SvType, TranscriptId,
    DEFAULT_TOLERANCE_BP,
};
