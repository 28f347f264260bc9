use std::cmp::Ordering;

use crate::model::types::PseudogeneCandidate;

/// Deduplicate and order candidates for output.
///
/// Candidates of the same SV and gene whose matched-exon coordinate sets are
/// nested (one a subset of the other) describe the same event through
/// different transcript models; only the best one is kept. Best means lowest
/// score, then most matched exons, then smallest transcript id.
///
/// Output is sorted by (chromosome, sv start, gene id) with the remaining
/// fields as tie-breakers, so the result does not depend on input order.
/// Aggregating an aggregated list returns it unchanged.
pub fn aggregate(mut candidates: Vec<PseudogeneCandidate>) -> Vec<PseudogeneCandidate> {
    candidates.sort_by(|a, b| group_key_cmp(a, b).then_with(|| preference_cmp(a, b)));

    let mut kept: Vec<PseudogeneCandidate> = Vec::with_capacity(candidates.len());
    let mut group_start = 0usize;

    for cand in candidates {
        if kept
            .get(group_start)
            .map_or(true, |g| group_key_cmp(g, &cand) != Ordering::Equal)
        {
            group_start = kept.len();
        }

        let spans = cand.exon_spans();
        let nested = kept[group_start..].iter().any(|k| {
            let other = k.exon_spans();
            is_subset(&spans, &other) || is_subset(&other, &spans)
        });
        if !nested {
            kept.push(cand);
        }
    }

    kept.sort_by(output_cmp);
    kept
}

/// Candidates that may be deduplicated against each other.
fn group_key_cmp(a: &PseudogeneCandidate, b: &PseudogeneCandidate) -> Ordering {
    (
        &a.sv.sample_id,
        a.sv.interval.chrom(),
        a.sv.interval.start(),
        a.sv.interval.end(),
        a.sv.sv_type,
        &a.gene_id,
    )
        .cmp(&(
            &b.sv.sample_id,
            b.sv.interval.chrom(),
            b.sv.interval.start(),
            b.sv.interval.end(),
            b.sv.sv_type,
            &b.gene_id,
        ))
}

/// Better candidates first.
fn preference_cmp(a: &PseudogeneCandidate, b: &PseudogeneCandidate) -> Ordering {
    a.classification_score
        .cmp(&b.classification_score)
        .then_with(|| b.matched_exons.len().cmp(&a.matched_exons.len()))
        .then_with(|| a.transcript_id.cmp(&b.transcript_id))
}

fn output_cmp(a: &PseudogeneCandidate, b: &PseudogeneCandidate) -> Ordering {
    (
        a.sv.interval.chrom(),
        a.sv.interval.start(),
        &a.gene_id,
        a.sv.interval.end(),
        a.sv.sv_type,
        &a.transcript_id,
        &a.sv.sample_id,
    )
        .cmp(&(
            b.sv.interval.chrom(),
            b.sv.interval.start(),
            &b.gene_id,
            b.sv.interval.end(),
            b.sv.sv_type,
            &b.transcript_id,
            &b.sv.sample_id,
        ))
}

/// Both slices are sorted by coordinate.
fn is_subset(small: &[(u32, u32)], large: &[(u32, u32)]) -> bool {
    small.len() <= large.len() && small.iter().all(|s| large.binary_search(s).is_ok())
}
