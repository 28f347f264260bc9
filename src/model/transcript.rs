use crate::model::exon::Exon;
use crate::types::Strand;

/// Exons sharing one transcript id, kept sorted by genomic start.
///
/// Built by the exon index; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub id: String,
    pub gene_id: String,
    pub chrom: String,
    pub strand: Strand,
    exons: Vec<Exon>,
    finalized: bool,
}

impl Transcript {
    /// Start a transcript from its first seen exon.
    pub fn new(first: Exon) -> Self {
        Self {
            id: first.transcript_id.clone(),
            gene_id: first.gene_id.clone(),
            chrom: first.chrom().to_string(),
            strand: first.strand,
            exons: vec![first],
            finalized: false,
        }
    }

    /// Add an exon. Returns the reason when the exon contradicts what the
    /// transcript already holds.
    pub fn add_exon(&mut self, exon: Exon) -> Result<(), String> {
        if exon.chrom() != self.chrom {
            return Err(format!(
                "transcript {} is on {}, exon is on {}",
                self.id,
                self.chrom,
                exon.chrom()
            ));
        }
        if exon.strand != self.strand {
            return Err(format!(
                "transcript {} is on strand {}, exon is on {}",
                self.id, self.strand, exon.strand
            ));
        }
        if exon.gene_id != self.gene_id {
            return Err(format!(
                "transcript {} belongs to gene {}, exon names gene {}",
                self.id, self.gene_id, exon.gene_id
            ));
        }
        if self.exons.iter().any(|e| e.exon_index == exon.exon_index) {
            return Err(format!(
                "duplicate exon index {} in transcript {}",
                exon.exon_index, self.id
            ));
        }
        self.exons.push(exon);
        self.finalized = false;
        Ok(())
    }

    /// Sort exons by start and drop any exon that overlaps an earlier one.
    ///
    /// Returns the dropped exons with the reason.
    pub fn finalize(&mut self) -> Vec<(Exon, String)> {
        self.exons.sort_by_key(|e| (e.start(), e.end(), e.exon_index));

        let mut kept: Vec<Exon> = Vec::with_capacity(self.exons.len());
        let mut dropped = Vec::new();

        for exon in self.exons.drain(..) {
            match kept.last() {
                Some(prev) if exon.start() < prev.end() => {
                    let reason = format!(
                        "exon {} overlaps exon {} of transcript {}",
                        exon.exon_index, prev.exon_index, self.id
                    );
                    dropped.push((exon, reason));
                }
                _ => kept.push(exon),
            }
        }

        self.exons = kept;
        self.finalized = true;
        dropped
    }

    /// True when exon indices increase 5' -> 3' (ascending on `+`,
    /// descending on `-` in genomic order).
    pub fn index_order_consistent(&self) -> bool {
        self.exons.windows(2).all(|w| match self.strand {
            Strand::Plus => w[0].exon_index < w[1].exon_index,
            Strand::Minus => w[0].exon_index > w[1].exon_index,
        })
    }

    pub fn exons(&self) -> &[Exon] {
        &self.exons
    }

    pub fn span(&self) -> Option<(u32, u32)> {
        Some((self.exons.first()?.start(), self.exons.last()?.end()))
    }

    /// Intron gaps `[a.end, b.start)` between consecutive exons.
    pub fn introns(&self) -> Vec<(u32, u32)> {
        self.exons
            .windows(2)
            .filter(|w| w[0].end() < w[1].start())
            .map(|w| (w[0].end(), w[1].start()))
            .collect()
    }

    /// Position of `exon` in genomic order.
    pub fn position_of(&self, exon: &Exon) -> Option<usize> {
        self.assert_finalized();
        self.exons
            .binary_search_by_key(&(exon.start(), exon.end()), |e| (e.start(), e.end()))
            .ok()
    }

    /// Distance from a left breakpoint to the nearest junction of the intron
    /// that precedes exon `pos`: the exon's own start, or the previous exon's end.
    pub fn left_junction_distance(&self, pos: usize, breakpoint: u32) -> u32 {
        let own = self.exons[pos].start().abs_diff(breakpoint);
        match pos.checked_sub(1) {
            Some(prev) => own.min(self.exons[prev].end().abs_diff(breakpoint)),
            None => own,
        }
    }

    /// Distance from a right breakpoint to the nearest junction of the intron
    /// that follows exon `pos`: the exon's own end, or the next exon's start.
    pub fn right_junction_distance(&self, pos: usize, breakpoint: u32) -> u32 {
        let own = self.exons[pos].end().abs_diff(breakpoint);
        match self.exons.get(pos + 1) {
            Some(next) => own.min(next.start().abs_diff(breakpoint)),
            None => own,
        }
    }

    #[inline]
    fn assert_finalized(&self) {
        debug_assert!(self.finalized, "Transcript must be finalized() before lookups");
    }
}
