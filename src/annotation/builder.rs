use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use log::{debug, warn};

use crate::annotation::io::{ExonRecord, ExonTableReader, TableDialect};
use crate::error::{PseudoError, Result};
use crate::index::ExonIndex;
use crate::model::exon::Exon;
use crate::types::Strand;
use crate::utils::open_bufread;

/// High-level builder for creating an `ExonIndex` from an exon table.
///
/// - parses the whole file (optionally gzipped)
/// - skips and reports malformed exon lines instead of failing
/// - numbers GTF exons that carry no `exon_number`
#[derive(Debug, Clone, Default)]
pub struct ExonIndexBuilder {
    /// Force a dialect instead of guessing from the file name.
    pub dialect: Option<TableDialect>,
}

impl ExonIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dialect(mut self, dialect: TableDialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    /// Build the index from anything implementing `BufRead`.
    ///
    /// Returns the index and every skipped record (each already logged).
    pub fn build_from_reader<R: BufRead>(
        &self,
        reader: R,
    ) -> Result<(ExonIndex, Vec<PseudoError>)> {
        let dialect = self.dialect.unwrap_or(TableDialect::ExonTsv);

        let mut skipped = Vec::new();
        let mut records = Vec::new();
        for rec in ExonTableReader::new(reader, dialect).records() {
            match rec {
                Ok(rec) => records.push(rec),
                Err(e) if e.is_recoverable() => {
                    warn!("skipping {e}");
                    skipped.push(e);
                }
                Err(e) => return Err(e),
            }
        }
        debug!("read {} exon records ({} skipped)", records.len(), skipped.len());

        let (index, rejected) = ExonIndex::build(number_exons(records))?;
        for e in &rejected {
            warn!("skipping {e}");
        }
        skipped.extend(rejected);

        Ok((index, skipped))
    }

    /// Build the index from a file path.
    ///
    /// - If path ends with `.gz`, uses a gzip decoder (BGZF included).
    /// - Otherwise reads as plain text.
    pub fn build_from_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(ExonIndex, Vec<PseudoError>)> {
        let path = path.as_ref();
        let builder = Self {
            dialect: Some(self.dialect.unwrap_or_else(|| TableDialect::from_path(path))),
        };

        let reader = open_bufread(path)?;
        builder.build_from_reader(reader).map_err(|e| match e {
            PseudoError::Io { source, .. } => PseudoError::io(source, path),
            other => other,
        })
    }
}

/// Turn records into exons, numbering unnumbered ones 5' -> 3' within their
/// transcript.
fn number_exons(records: Vec<ExonRecord>) -> Vec<Exon> {
    // transcript -> (start, strand) of its unnumbered exons
    let mut unnumbered: HashMap<&str, Vec<(u32, Strand)>> = HashMap::new();
    for rec in records.iter().filter(|r| r.exon_index.is_none()) {
        unnumbered
            .entry(rec.transcript_id.as_str())
            .or_default()
            .push((rec.interval.start(), rec.strand));
    }

    let mut ranks: HashMap<(String, u32), u32> = HashMap::new();
    for (tx, mut starts) in unnumbered {
        starts.sort_unstable();
        let n = starts.len() as u32;
        for (i, &(start, strand)) in starts.iter().enumerate() {
            let rank = match strand {
                Strand::Plus => i as u32 + 1,
                Strand::Minus => n - i as u32,
            };
            ranks.insert((tx.to_string(), start), rank);
        }
    }

    records
        .into_iter()
        .map(|rec| {
            let exon_index = rec.exon_index.unwrap_or_else(|| {
                ranks
                    .get(&(rec.transcript_id.clone(), rec.interval.start()))
                    .copied()
                    .unwrap_or(1)
            });
            Exon::new(rec.interval, rec.gene_id, rec.transcript_id, exon_index, rec.strand)
        })
        .collect()
}

// -------------------- tests --------------------
