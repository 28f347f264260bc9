//! Processed-pseudogene rule set.
//!
//! A (SV, transcript) pair is a candidate when
//! - at least one exon of the transcript overlaps the SV,
//! - every overlapping exon lies completely inside the SV (a partial exon
//!   overlap is a generic structural event, not a spliced-junction signature),
//! - both breakpoints sit within `tolerance` bp of an exon/intron junction.
//!
//! The score is the summed breakpoint distance to those junctions.

use log::debug;

use crate::matcher::TranscriptHits;
use crate::model::types::{ClassifyOptions, PseudogeneCandidate, Rejection, StructuralVariant};

/// Apply the rule set to one transcript's hits.
pub fn classify(
    sv: &StructuralVariant,
    hits: &TranscriptHits<'_>,
    opts: &ClassifyOptions,
) -> Result<PseudogeneCandidate, Rejection> {
    if !opts.classifies(sv.sv_type) {
        return Err(Rejection::SvTypeExcluded);
    }

    let (Some(first), Some(last)) = (hits.exons.first(), hits.exons.last()) else {
        return Err(Rejection::NoExonOverlap);
    };

    if let Some(cut) = hits
        .exons
        .iter()
        .find(|e| !sv.interval.contains_coords(e.start(), e.end()))
    {
        return Err(Rejection::PartialExonOverlap {
            exon_index: cut.exon_index,
        });
    }

    let tx = hits.transcript;
    let (Some(first_pos), Some(last_pos)) = (tx.position_of(first), tx.position_of(last)) else {
        // hits always come from the same transcript
        return Err(Rejection::NoExonOverlap);
    };

    let left_bp = tx.left_junction_distance(first_pos, sv.interval.start());
    let right_bp = tx.right_junction_distance(last_pos, sv.interval.end());
    if left_bp > opts.tolerance || right_bp > opts.tolerance {
        return Err(Rejection::BoundaryMisaligned { left_bp, right_bp });
    }

    Ok(PseudogeneCandidate {
        sv: sv.clone(),
        gene_id: tx.gene_id.clone(),
        transcript_id: tx.id.clone(),
        matched_exons: hits.exons.iter().map(|&e| e.clone()).collect(),
        classification_score: left_bp + right_bp,
    })
}

/// Classify an SV against every transcript it touches.
///
/// One SV may yield several candidates (overlapping gene models).
pub fn classify_all(
    sv: &StructuralVariant,
    groups: &[TranscriptHits<'_>],
    opts: &ClassifyOptions,
) -> Vec<PseudogeneCandidate> {
    groups
        .iter()
        .filter_map(|hits| match classify(sv, hits, opts) {
            Ok(c) => Some(c),
            Err(why) => {
                debug!("{} vs {}: {}", sv.interval, hits.transcript.id, why);
                None
            }
        })
        .collect()
}
