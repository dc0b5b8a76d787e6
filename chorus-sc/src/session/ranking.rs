//! Ranking engine
//!
//! Pure ordering functions for a session's track set. The visible
//! order is `history ++ sorted_queue`: tracks that have been current,
//! in the order they became current, followed by queued tracks sorted
//! by vote score descending with `enqueued_seq` ascending as the
//! tie-break (earlier proposals surface first among equal scores).
//!
//! The sort is deterministic and stable, so every client re-derives
//! the same order from a shared vote-tally snapshot. Recomputed in
//! full after any vote change, track add, or track removal — never
//! cached incrementally, to avoid drift.

use chorus_common::model::{TrackRecord, TrackState};
use std::collections::HashMap;
use uuid::Uuid;

/// Order the `queued` tracks of a session by ranking
///
/// Score `likes - dislikes` descending, ties broken by `enqueued_seq`
/// ascending. O(n log n) per recompute, fine for realistic session
/// sizes (tens to low hundreds of tracks).
pub fn ranked_queue(tracks: &HashMap<Uuid, TrackRecord>) -> Vec<Uuid> {
    let mut queued: Vec<&TrackRecord> = tracks
        .values()
        .filter(|t| t.state == TrackState::Queued)
        .collect();

    queued.sort_by(|a, b| {
        b.score()
            .cmp(&a.score())
            .then(a.enqueued_seq.cmp(&b.enqueued_seq))
    });

    queued.into_iter().map(|t| t.id).collect()
}

/// Full visible ordering: play history, then the ranked queue
///
/// `history` holds every track id in the order it became current;
/// entries whose track has since been removed are skipped (removed
/// tracks are discarded entirely).
pub fn ranked_order(history: &[Uuid], tracks: &HashMap<Uuid, TrackRecord>) -> Vec<Uuid> {
    let mut order: Vec<Uuid> = history
        .iter()
        .filter(|id| {
            tracks
                .get(id)
                .map(|t| t.state != TrackState::Removed)
                .unwrap_or(false)
        })
        .copied()
        .collect();

    order.extend(ranked_queue(tracks));
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queued_track(seq: u64, likes: usize, dislikes: usize) -> TrackRecord {
        TrackRecord {
            id: Uuid::new_v4(),
            source_ref: format!("cat:{}", seq),
            title: format!("Track {}", seq),
            artist: "Tester".to_string(),
            duration_ms: 180_000,
            artwork_url: None,
            added_by: Uuid::new_v4(),
            enqueued_seq: seq,
            likes,
            dislikes,
            state: TrackState::Queued,
        }
    }

    fn track_map(tracks: Vec<TrackRecord>) -> HashMap<Uuid, TrackRecord> {
        tracks.into_iter().map(|t| (t.id, t)).collect()
    }

    #[test]
    fn test_zero_votes_orders_by_enqueue_sequence() {
        let a = queued_track(1, 0, 0);
        let b = queued_track(2, 0, 0);
        let c = queued_track(3, 0, 0);
        let (ida, idb, idc) = (a.id, b.id, c.id);

        let tracks = track_map(vec![c, a, b]);
        assert_eq!(ranked_queue(&tracks), vec![ida, idb, idc]);
    }

    #[test]
    fn test_like_moves_track_to_front() {
        // A(seq=1), B(seq=2), C(seq=3), one like on C -> C,A,B
        let a = queued_track(1, 0, 0);
        let b = queued_track(2, 0, 0);
        let c = queued_track(3, 1, 0);
        let (ida, idb, idc) = (a.id, b.id, c.id);

        let tracks = track_map(vec![a, b, c]);
        assert_eq!(ranked_queue(&tracks), vec![idc, ida, idb]);
    }

    #[test]
    fn test_score_tie_breaks_by_earlier_sequence() {
        // A(seq=1) and C(seq=3) both at score 1 -> A,C,B
        let a = queued_track(1, 1, 0);
        let b = queued_track(2, 0, 0);
        let c = queued_track(3, 1, 0);
        let (ida, idb, idc) = (a.id, b.id, c.id);

        let tracks = track_map(vec![a, b, c]);
        assert_eq!(ranked_queue(&tracks), vec![ida, idc, idb]);
    }

    #[test]
    fn test_dislikes_lower_score() {
        let a = queued_track(1, 1, 3); // score -2
        let b = queued_track(2, 0, 0); // score 0
        let (ida, idb) = (a.id, b.id);

        let tracks = track_map(vec![a, b]);
        assert_eq!(ranked_queue(&tracks), vec![idb, ida]);
    }

    #[test]
    fn test_ranking_is_deterministic() {
        let tracks = track_map(vec![
            queued_track(1, 2, 1),
            queued_track(2, 1, 0),
            queued_track(3, 1, 0),
            queued_track(4, 0, 2),
            queued_track(5, 2, 1),
        ]);

        let first = ranked_queue(&tracks);
        for _ in 0..10 {
            assert_eq!(ranked_queue(&tracks), first);
        }
    }

    #[test]
    fn test_history_prefixes_queue_and_skips_removed() {
        let mut played = queued_track(1, 0, 0);
        played.state = TrackState::Played;
        let mut removed = queued_track(2, 0, 0);
        removed.state = TrackState::Removed;
        let mut current = queued_track(3, 0, 0);
        current.state = TrackState::Current;
        let queued = queued_track(4, 0, 0);

        let history = vec![played.id, removed.id, current.id];
        let expected = vec![played.id, current.id, queued.id];

        let tracks = track_map(vec![played, removed, current, queued]);
        assert_eq!(ranked_order(&history, &tracks), expected);
    }
}
