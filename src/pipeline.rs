use std::io::Write;
use std::path::PathBuf;

use log::{debug, info, warn};

use crate::aggregate::aggregate;
use crate::annotation::ExonIndexBuilder;
use crate::classify::classify_all;
use crate::error::Result;
use crate::index::ExonIndex;
use crate::matcher::match_sv;
use crate::model::types::{ClassifyOptions, PseudogeneCandidate};
use crate::output::write_candidates;
use crate::variant::{normalize, SvFilter, VcfReader};

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Exon table (TSV or GTF, optionally gzipped)
    pub exons: PathBuf,
    /// SV calls (VCF, optionally gzipped)
    pub vcf: PathBuf,
    pub sample: String,
    pub classify: ClassifyOptions,
    pub filter: SvFilter,
}

/// Record counts for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub exons_indexed: usize,
    pub exon_records_skipped: usize,
    pub sv_records_read: usize,
    pub sv_records_skipped: usize,
    pub sv_records_filtered: usize,
    pub raw_candidates: usize,
    pub candidates: usize,
}

/// Load the exon table, stream the VCF and write aggregated candidates as CSV.
pub fn run<W: Write>(config: &RunConfig, out: W) -> Result<RunSummary> {
    info!("loading exons from {}", config.exons.display());
    let (index, skipped) = ExonIndexBuilder::new().build_from_path(&config.exons)?;
    info!("{}", index.to_string().trim_end());

    let mut summary = RunSummary {
        exons_indexed: index.len(),
        exon_records_skipped: skipped.len(),
        ..Default::default()
    };

    info!("reading structural variants from {}", config.vcf.display());
    let vcf = VcfReader::from_path(&config.vcf)?;
    let candidates = collect_candidates(vcf, &index, config, &mut summary)?;

    let rows = aggregate(candidates);
    summary.candidates = rows.len();
    write_candidates(out, &rows)?;

    info!(
        "SV records: {} read, {} skipped, {} filtered",
        summary.sv_records_read, summary.sv_records_skipped, summary.sv_records_filtered
    );
    info!(
        "candidates: {} before aggregation, {} reported",
        summary.raw_candidates, summary.candidates
    );
    Ok(summary)
}

/// Stream SV records through normalize -> match -> classify.
///
/// Bad records are logged and counted; fatal reader errors propagate.
pub fn collect_candidates(
    vcf: VcfReader,
    index: &ExonIndex,
    config: &RunConfig,
    summary: &mut RunSummary,
) -> Result<Vec<PseudogeneCandidate>> {
    let mut candidates = Vec::new();

    for rec in vcf.records() {
        let rec = match rec {
            Ok(rec) => rec,
            Err(e) if e.is_recoverable() => {
                warn!("skipping {e}");
                summary.sv_records_skipped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };
        summary.sv_records_read += 1;

        if !config.filter.accepts(&rec) {
            debug!(
                "record {}: filtered (FILTER={}, QUAL={:?})",
                rec.record_no, rec.filter, rec.qual
            );
            summary.sv_records_filtered += 1;
            continue;
        }

        let sv = match normalize(&rec, &config.sample) {
            Ok(sv) => sv,
            Err(e) => {
                warn!("skipping {e}");
                summary.sv_records_skipped += 1;
                continue;
            }
        };

        let groups = match_sv(&sv, index);
        let found = classify_all(&sv, &groups, &config.classify);
        if !found.is_empty() {
            debug!(
                "{} {} (ID={}, QUAL={:?}): {} candidate(s)",
                sv.sv_type,
                sv.interval,
                sv.id.as_deref().unwrap_or("."),
                sv.quality,
                found.len()
            );
        }
        candidates.extend(found);
    }

    summary.raw_candidates = candidates.len();
    Ok(candidates)
}
