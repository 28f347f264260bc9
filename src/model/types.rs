use std::fmt;
use std::str::FromStr;

use crate::model::exon::Exon;
use crate::types::GenomicInterval;

/// Internal numeric transcript id (index into the index's transcript Vec).
pub type TranscriptId = usize;

/// Structural variant classes understood by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SvType {
    Deletion,
    Duplication,
    Inversion,
    Insertion,
    Other,
}

impl SvType {
    pub const ALL: [SvType; 5] = [
        SvType::Deletion,
        SvType::Duplication,
        SvType::Inversion,
        SvType::Insertion,
        SvType::Other,
    ];

    /// Map a VCF type token (`SVTYPE` value or symbolic ALT) to a class.
    ///
    /// Sub-types after `:` are ignored (`DUP:TANDEM`, `INS:ME:ALU`).
    pub fn from_vcf_token(token: &str) -> Option<Self> {
        let base = token
            .trim()
            .trim_start_matches('<')
            .trim_end_matches('>')
            .split(':')
            .next()
            .unwrap_or("");
        match base.to_ascii_uppercase().as_str() {
            "DEL" => Some(SvType::Deletion),
            "DUP" => Some(SvType::Duplication),
            "INV" => Some(SvType::Inversion),
            "INS" | "MEI" => Some(SvType::Insertion),
            "CNV" | "BND" | "TRA" | "CTX" | "CPX" => Some(SvType::Other),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SvType::Deletion => "deletion",
            SvType::Duplication => "duplication",
            SvType::Inversion => "inversion",
            SvType::Insertion => "insertion",
            SvType::Other => "other",
        }
    }
}

impl fmt::Display for SvType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the lower-case names used in output (`deletion`) as well as VCF
/// tokens (`DEL`).
impl FromStr for SvType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SvType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .or_else(|| SvType::from_vcf_token(s))
            .ok_or_else(|| format!("unknown SV type '{s}'"))
    }
}

/// One normalized SV call.
///
/// `quality` and `id` are not part of the CSV row; they identify the call in
/// the run log and are kept for library callers that trace a candidate back
/// to its VCF record.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralVariant {
    pub interval: GenomicInterval,
    pub sample_id: String,
    pub sv_type: SvType,
    /// VCF QUAL ('.' => None)
    pub quality: Option<f32>,
    /// VCF ID column ('.' => None)
    pub id: Option<String>,
}

/// An SV whose footprint matches the exon structure of one transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct PseudogeneCandidate {
    pub sv: StructuralVariant,
    pub gene_id: String,
    pub transcript_id: String,
    /// Fully contained exons, in genomic order.
    pub matched_exons: Vec<Exon>,
    /// Summed breakpoint distance to the nearest exon/intron junctions (bp).
    /// Lower is better.
    pub classification_score: u32,
}

impl PseudogeneCandidate {
    pub fn matched_exon_indices(&self) -> Vec<u32> {
        self.matched_exons.iter().map(|e| e.exon_index).collect()
    }

    /// Exon coordinates, used to compare candidates across transcripts.
    pub fn exon_spans(&self) -> Vec<(u32, u32)> {
        self.matched_exons.iter().map(|e| (e.start(), e.end())).collect()
    }
}

/// Why a (SV, transcript) pair was not classified as a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The SV type is excluded by `ClassifyOptions::sv_types`.
    SvTypeExcluded,

    /// No exon of the transcript overlaps the SV.
    NoExonOverlap,

    /// The SV cuts into this exon instead of containing it.
    PartialExonOverlap { exon_index: u32 },

    /// A breakpoint lies further than the tolerance from any junction.
    BoundaryMisaligned { left_bp: u32, right_bp: u32 },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::SvTypeExcluded => write!(f, "SV type excluded"),
            Rejection::NoExonOverlap => write!(f, "no exon overlap"),
            Rejection::PartialExonOverlap { exon_index } => {
                write!(f, "partial overlap of exon {exon_index}")
            }
            Rejection::BoundaryMisaligned { left_bp, right_bp } => write!(
                f,
                "breakpoints {left_bp} bp / {right_bp} bp from nearest junctions"
            ),
        }
    }
}

/// Default breakpoint tolerance in bp.
pub const DEFAULT_TOLERANCE_BP: u32 = 10;

/// Options controlling what counts as a processed-pseudogene signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyOptions {
    /// Maximum distance (bp) between each SV breakpoint and its nearest
    /// exon/intron junction.
    pub tolerance: u32,

    /// SV types that are classified at all.
    pub sv_types: Vec<SvType>,
}

impl ClassifyOptions {
    pub fn classifies(&self, sv_type: SvType) -> bool {
        self.sv_types.contains(&sv_type)
    }
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE_BP,
            sv_types: SvType::ALL.to_vec(),
        }
    }
}
