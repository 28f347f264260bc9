use std::collections::HashMap;
use std::fmt;

use log::warn;

use crate::error::{PseudoError, Result};
use crate::model::exon::Exon;
use crate::model::transcript::Transcript;
use crate::model::types::TranscriptId;
use crate::types::GenomicInterval;

/// Position of one exon inside the index: transcript + slot in its exon Vec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ExonSlot {
    start: u32,
    end: u32,
    tx: TranscriptId,
    pos: usize,
}

/// Per-chromosome exons sorted by `(start, end)`.
///
/// `max_end[i]` is the largest `end` among `slots[..=i]`, which lets a query
/// stop scanning backwards as soon as no earlier exon can reach the query.
#[derive(Debug, Clone, Default)]
struct ChromExons {
    slots: Vec<ExonSlot>,
    max_end: Vec<u32>,
}

impl ChromExons {
    fn finalize(&mut self) {
        self.slots.sort_by_key(|s| (s.start, s.end, s.tx, s.pos));
        let mut running = 0u32;
        self.max_end = self
            .slots
            .iter()
            .map(|s| {
                running = running.max(s.end);
                running
            })
            .collect();
    }

    /// Slots overlapping `[start, end)`, ordered by start.
    fn overlapping(&self, start: u32, end: u32) -> Vec<ExonSlot> {
        // every slot before `hi` starts before the query end
        let hi = self.slots.partition_point(|s| s.start < end);

        let mut out = Vec::new();
        for i in (0..hi).rev() {
            if self.max_end[i] <= start {
                break;
            }
            let s = self.slots[i];
            if s.end > start {
                out.push(s);
            }
        }
        out.reverse();
        out
    }
}

/// The owning exon index:
/// - transcripts (each owning its exons, sorted)
/// - chromosome dictionary (chr name -> chr_id)
/// - per-chromosome sorted exon slots for overlap queries
///
/// Read-only once built.
#[derive(Debug, Clone)]
pub struct ExonIndex {
    chr_names: Vec<String>,
    chr_to_id: HashMap<String, usize>,
    chroms: Vec<ChromExons>,

    transcripts: Vec<Transcript>,
    tx_to_id: HashMap<String, TranscriptId>,
}

/// Human-readable summary of the `ExonIndex`, one line per chromosome.
impl fmt::Display for ExonIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "ExonIndex: {} transcripts, {} exons, {} chromosomes",
            self.transcripts.len(),
            self.len(),
            self.chr_names.len()
        )?;

        for (i, chr_name) in self.chr_names.iter().enumerate() {
            let ce = &self.chroms[i];
            let mut txs: Vec<TranscriptId> = ce.slots.iter().map(|s| s.tx).collect();
            txs.sort_unstable();
            txs.dedup();

            let first = ce.slots.first().map(|s| s.start).unwrap_or(0);
            let last = ce.max_end.last().copied().unwrap_or(0);

            writeln!(
                f,
                "  - {}: exons={}, transcripts={}, span={}-{}",
                chr_name,
                ce.slots.len(),
                txs.len(),
                first,
                last
            )?;
        }

        Ok(())
    }
}

impl ExonIndex {
    /// Build the index from exon records.
    ///
    /// Workflow:
    /// 1) group exons into transcripts (first-seen order)
    /// 2) finalize transcripts (sort, drop overlapping exons)
    /// 3) place every kept exon in its chromosome's sorted slot list
    ///
    /// Exons that contradict their transcript are skipped and returned as
    /// `MalformedExonRecord`; the build only fails when nothing is left.
    ///
    /// # Example
    /// ```
    /// use pseudofinder::{Exon, ExonIndex, GenomicInterval, Strand};
    ///
    /// let exons = vec![
    ///     Exon::new(GenomicInterval::new("chr1", 100, 200).unwrap(), "G1", "T1", 1, Strand::Plus),
    ///     Exon::new(GenomicInterval::new("chr1", 300, 400).unwrap(), "G1", "T1", 2, Strand::Plus),
    /// ];
    /// let (idx, skipped) = ExonIndex::build(exons).unwrap();
    /// assert!(skipped.is_empty());
    ///
    /// let q = GenomicInterval::new("chr1", 150, 350).unwrap();
    /// assert_eq!(idx.query(&q).len(), 2);
    /// ```
    pub fn build<I>(exons: I) -> Result<(Self, Vec<PseudoError>)>
    where
        I: IntoIterator<Item = Exon>,
    {
        let mut idx = ExonIndex {
            chr_names: Vec::new(),
            chr_to_id: HashMap::new(),
            chroms: Vec::new(),
            transcripts: Vec::new(),
            tx_to_id: HashMap::new(),
        };
        let mut skipped = Vec::new();

        for exon in exons {
            if let Some(&tid) = idx.tx_to_id.get(&exon.transcript_id) {
                let at = exon_location(&exon);
                if let Err(reason) = idx.transcripts[tid].add_exon(exon) {
                    skipped.push(PseudoError::MalformedExonRecord { at, reason });
                }
            } else {
                let tid = idx.transcripts.len();
                idx.tx_to_id.insert(exon.transcript_id.clone(), tid);
                idx.transcripts.push(Transcript::new(exon));
            }
        }

        for tx in &mut idx.transcripts {
            for (exon, reason) in tx.finalize() {
                skipped.push(PseudoError::MalformedExonRecord {
                    at: exon_location(&exon),
                    reason,
                });
            }
            if !tx.index_order_consistent() {
                warn!(
                    "transcript {}: exon indices do not follow genomic order on strand {}",
                    tx.id, tx.strand
                );
            }
        }

        if idx.transcripts.iter().all(|t| t.exons().is_empty()) {
            return Err(PseudoError::EmptyExonIndex);
        }

        idx.build_slots();
        Ok((idx, skipped))
    }

    /// Exons overlapping `q`, ordered by start (all transcripts).
    pub fn query(&self, q: &GenomicInterval) -> Vec<&Exon> {
        self.query_with_transcripts(q)
            .into_iter()
            .map(|(_, exon)| exon)
            .collect()
    }

    /// Like `query`, but also returns the internal transcript id of each hit.
    pub fn query_with_transcripts(&self, q: &GenomicInterval) -> Vec<(TranscriptId, &Exon)> {
        let Some(chr_id) = self.chrom_id(q.chrom()) else {
            return Vec::new();
        };
        self.chroms[chr_id]
            .overlapping(q.start(), q.end())
            .into_iter()
            .map(|s| (s.tx, &self.transcripts[s.tx].exons()[s.pos]))
            .collect()
    }

    /// Resolve a chromosome name, accepting `chr1` for `1` and vice versa.
    pub fn chrom_id(&self, chrom: &str) -> Option<usize> {
        if let Some(&id) = self.chr_to_id.get(chrom) {
            return Some(id);
        }
        let alt = match chrom.strip_prefix("chr") {
            Some(bare) => bare.to_string(),
            None => format!("chr{chrom}"),
        };
        self.chr_to_id.get(&alt).copied()
    }

    pub fn transcript(&self, id: TranscriptId) -> &Transcript {
        &self.transcripts[id]
    }

    pub fn transcript_by_name(&self, name: &str) -> Option<&Transcript> {
        self.tx_to_id.get(name).map(|&id| &self.transcripts[id])
    }

    pub fn transcripts(&self) -> &[Transcript] {
        &self.transcripts
    }

    pub fn chr_names(&self) -> &[String] {
        &self.chr_names
    }

    /// Number of indexed exons.
    pub fn len(&self) -> usize {
        self.chroms.iter().map(|c| c.slots.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // -----------------------
    // Internal helpers
    // -----------------------

    fn intern_chr(&mut self, chr: &str) -> usize {
        if let Some(&id) = self.chr_to_id.get(chr) {
            return id;
        }
        let id = self.chr_names.len();
        self.chr_names.push(chr.to_string());
        self.chr_to_id.insert(chr.to_string(), id);
        self.chroms.push(ChromExons::default());
        id
    }

    fn build_slots(&mut self) {
        for tx_id in 0..self.transcripts.len() {
            let chrom = self.transcripts[tx_id].chrom.clone();
            let chr_id = self.intern_chr(&chrom);
            let slots: Vec<ExonSlot> = self.transcripts[tx_id]
                .exons()
                .iter()
                .enumerate()
                .map(|(pos, e)| ExonSlot {
                    start: e.start(),
                    end: e.end(),
                    tx: tx_id,
                    pos,
                })
                .collect();
            self.chroms[chr_id].slots.extend(slots);
        }
        for ce in &mut self.chroms {
            ce.finalize();
        }
    }
}

fn exon_location(exon: &Exon) -> String {
    format!(
        "transcript {} exon {} at {}",
        exon.transcript_id, exon.exon_index, exon.interval
    )
}
