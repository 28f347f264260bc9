use std::io::Write;

use serde::Serialize;

use crate::error::Result;
use crate::model::types::PseudogeneCandidate;

/// One CSV output row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateRow {
    pub sample: String,
    pub chromosome: String,
    pub sv_start: u32,
    pub sv_end: u32,
    pub sv_type: String,
    pub gene_id: String,
    pub transcript_id: String,
    /// `;`-joined, genomic order
    pub matched_exon_indices: String,
    pub classification_score: u32,
}

impl CandidateRow {
    pub const HEADER: [&'static str; 9] = [
        "sample",
        "chromosome",
        "sv_start",
        "sv_end",
        "sv_type",
        "gene_id",
        "transcript_id",
        "matched_exon_indices",
        "classification_score",
    ];
}

impl From<&PseudogeneCandidate> for CandidateRow {
    fn from(c: &PseudogeneCandidate) -> Self {
        Self {
            sample: c.sv.sample_id.clone(),
            chromosome: c.sv.interval.chrom().to_string(),
            sv_start: c.sv.interval.start(),
            sv_end: c.sv.interval.end(),
            sv_type: c.sv.sv_type.to_string(),
            gene_id: c.gene_id.clone(),
            transcript_id: c.transcript_id.clone(),
            matched_exon_indices: c
                .matched_exon_indices()
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(";"),
            classification_score: c.classification_score,
        }
    }
}

/// Write candidates as CSV (header always written, even with no rows).
pub fn write_candidates<W: Write>(writer: W, candidates: &[PseudogeneCandidate]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(CandidateRow::HEADER)?;
    for c in candidates {
        wtr.serialize(CandidateRow::from(c))?;
    }
    wtr.flush()?;
    Ok(())
}
