use std::collections::HashMap;

use crate::index::ExonIndex;
use crate::model::exon::Exon;
use crate::model::transcript::Transcript;
use crate::model::types::{StructuralVariant, TranscriptId};

/// Exons of one transcript that overlap an SV.
///
/// This borrows the transcript and exons from the index (zero-copy).
#[derive(Debug, Clone)]
pub struct TranscriptHits<'a> {
    pub transcript_id: TranscriptId,
    pub transcript: &'a Transcript,
    /// Overlapping exons in genomic order.
    pub exons: Vec<&'a Exon>,
}

/// Query the index once for `sv` and group the overlapping exons by
/// transcript.
///
/// Groups come out in order of their first exon; exon order inside a group
/// follows the query (genomic) order.
pub fn match_sv<'a>(sv: &StructuralVariant, index: &'a ExonIndex) -> Vec<TranscriptHits<'a>> {
    let mut groups: Vec<TranscriptHits<'a>> = Vec::new();
    let mut slot_of: HashMap<TranscriptId, usize> = HashMap::new();

    for (tx_id, exon) in index.query_with_transcripts(&sv.interval) {
        let slot = *slot_of.entry(tx_id).or_insert_with(|| {
            groups.push(TranscriptHits {
                transcript_id: tx_id,
                transcript: index.transcript(tx_id),
                exons: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].exons.push(exon);
    }

    groups
}
