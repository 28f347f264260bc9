use crate::types::{GenomicInterval, Strand};

/// One exon of one transcript.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Exon {
    pub interval: GenomicInterval,
    pub gene_id: String,
    pub transcript_id: String,
    /// 1-based ordinal within the transcript, counted 5' -> 3'.
    pub exon_index: u32,
    pub strand: Strand,
}

impl Exon {
    pub fn new(
        interval: GenomicInterval,
        gene_id: impl Into<String>,
        transcript_id: impl Into<String>,
        exon_index: u32,
        strand: Strand,
    ) -> Self {
        Self {
            interval,
            gene_id: gene_id.into(),
            transcript_id: transcript_id.into(),
            exon_index,
            strand,
        }
    }

    #[inline]
    pub fn chrom(&self) -> &str {
        self.interval.chrom()
    }

    #[inline]
    pub fn start(&self) -> u32 {
        self.interval.start()
    }

    #[inline]
    pub fn end(&self) -> u32 {
        self.interval.end()
    }
}
