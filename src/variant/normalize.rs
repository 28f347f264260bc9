use crate::error::{PseudoError, Result};
use crate::model::types::{StructuralVariant, SvType};
use crate::types::GenomicInterval;
use crate::variant::io::RawSvRecord;

/// Convert a raw VCF record into a `StructuralVariant`.
///
/// Type: INFO `SVTYPE`, else symbolic ALT (`<DEL>`), else breakend ALT
/// notation, else the REF/ALT length difference of a sequence-resolved call.
///
/// Interval: `POS` is the padding base, so the affected bases are
/// `[POS, END)` in 0-based half-open coordinates. `END` is INFO `END`, else
/// `POS + |SVLEN|`, else `POS + len(REF) - 1`. Insertions (and breakends)
/// without extent occupy the single base `[POS, POS + 1)`.
pub fn normalize(raw: &RawSvRecord, sample_id: &str) -> Result<StructuralVariant> {
    let sv_type = classify_type(raw)?;
    let malformed = |reason: String| PseudoError::MalformedSvRecord {
        record: raw.record_no,
        reason,
    };
    let overflow = || malformed(format!("SV extent overflows at POS {}", raw.pos));

    let start = raw.pos;
    let end = match (raw.end.as_deref(), raw.svlen.as_deref()) {
        (Some(end), _) => end
            .trim()
            .parse::<u64>()
            .map_err(|_| malformed(format!("bad END '{end}'")))?,
        (None, Some(svlen)) => {
            let first = svlen.split(',').next().unwrap_or("").trim();
            let len = first
                .parse::<i64>()
                .map_err(|_| malformed(format!("bad SVLEN '{svlen}'")))?;
            start.checked_add(len.unsigned_abs()).ok_or_else(overflow)?
        }
        (None, None) => start
            .checked_add((raw.reference.len() as u64).saturating_sub(1))
            .ok_or_else(overflow)?,
    };

    let end = if end <= start {
        match sv_type {
            SvType::Insertion | SvType::Other => start.checked_add(1).ok_or_else(overflow)?,
            _ => {
                return Err(malformed(format!(
                    "{sv_type} with END {end} not after POS {start}"
                )))
            }
        }
    } else {
        end
    };

    let start = u32::try_from(start).map_err(|_| malformed(format!("POS {start} out of range")))?;
    let end = u32::try_from(end).map_err(|_| malformed(format!("END {end} out of range")))?;
    let interval =
        GenomicInterval::new(raw.chrom.as_str(), start, end).map_err(|e| malformed(e.to_string()))?;

    Ok(StructuralVariant {
        interval,
        sample_id: sample_id.to_string(),
        sv_type,
        quality: raw.qual,
        id: raw.id.clone(),
    })
}

fn classify_type(raw: &RawSvRecord) -> Result<SvType> {
    let unsupported = |token: &str| PseudoError::UnsupportedSvType {
        record: raw.record_no,
        sv_type: token.to_string(),
    };

    if let Some(token) = raw.svtype.as_deref() {
        return SvType::from_vcf_token(token).ok_or_else(|| unsupported(token));
    }

    let Some(alt) = raw.alts.first() else {
        return Err(unsupported("<no ALT>"));
    };

    if alt.starts_with('<') {
        return SvType::from_vcf_token(alt).ok_or_else(|| unsupported(alt));
    }
    if alt.contains('[') || alt.contains(']') {
        return Ok(SvType::Other);
    }

    let is_sequence = |s: &str| !s.is_empty() && s.bytes().all(|b| b"ACGTNacgtn".contains(&b));
    if is_sequence(&raw.reference) && is_sequence(alt) {
        if raw.reference.len() > alt.len() {
            return Ok(SvType::Deletion);
        }
        if raw.reference.len() < alt.len() {
            return Ok(SvType::Insertion);
        }
    }
    Err(unsupported(alt))
}
