//! Property-based tests for the ordering policy
//!
//! Uses proptest to verify the next/previous rules across random libraries,
//! positions and shuffle orders.

use proptest::prelude::*;
use simo_core::Track;
use simo_playback::{next_in, previous_in, QueueState, RepeatMode};
use std::collections::HashSet;

// ===== Helpers =====

/// Libraries of unique filenames
fn arbitrary_library() -> impl Strategy<Value = Vec<Track>> {
    prop::collection::hash_set("[0-9]{1,3}_[a-z]{1,8}\\.mp3", 1..40).prop_map(|names| {
        let mut names: Vec<String> = names.into_iter().collect();
        names.sort();
        names.into_iter().map(Track::from_filename).collect()
    })
}

fn library_and_index() -> impl Strategy<Value = (Vec<Track>, usize)> {
    arbitrary_library().prop_flat_map(|library| {
        let len = library.len();
        (Just(library), 0..len)
    })
}

fn filenames(tracks: &[Track]) -> Vec<&str> {
    tracks.iter().map(|t| t.filename.as_str()).collect()
}

// ===== Property Tests =====

proptest! {
    /// Property: with repeat all, len(sequence) nexts return to the start
    #[test]
    fn repeat_all_full_cycle_returns_to_start((library, start) in library_and_index()) {
        let origin = library[start].filename.clone();
        let mut current = origin.clone();

        for _ in 0..library.len() {
            current = next_in(&library, Some(current.as_str()), RepeatMode::All)
                .expect("repeat all always has a next")
                .filename
                .clone();
        }

        prop_assert_eq!(current, origin);
    }

    /// Property: with repeat one, next is always the current track
    #[test]
    fn repeat_one_next_is_current((library, index) in library_and_index()) {
        let current = library[index].filename.as_str();
        let next = next_in(&library, Some(current), RepeatMode::One);
        prop_assert_eq!(next.map(|t| t.filename.as_str()), Some(current));
    }

    /// Property: with repeat none, the last track has no next
    #[test]
    fn repeat_none_last_has_no_next(library in arbitrary_library()) {
        let last = library.last().map(|t| t.filename.clone());
        prop_assert!(next_in(&library, last.as_deref(), RepeatMode::None).is_none());
    }

    /// Property: next then previous (repeat all) gets back to the same track
    #[test]
    fn previous_undoes_next((library, index) in library_and_index()) {
        let current = library[index].filename.as_str();
        let next = next_in(&library, Some(current), RepeatMode::All).unwrap();
        let back = previous_in(&library, Some(next.filename.as_str()), RepeatMode::All).unwrap();
        prop_assert_eq!(back.filename.as_str(), current);
    }

    /// Property: a track missing from the sequence falls back to the first
    #[test]
    fn missing_track_falls_back_to_first(library in arbitrary_library()) {
        for repeat in [RepeatMode::None, RepeatMode::All, RepeatMode::One] {
            let next = next_in(&library, Some("deleted.mp3"), repeat);
            let previous = previous_in(&library, Some("deleted.mp3"), repeat);
            prop_assert_eq!(next.map(|t| &t.filename), Some(&library[0].filename));
            prop_assert_eq!(previous.map(|t| &t.filename), Some(&library[0].filename));
        }
    }

    /// Property: the shuffled order is a permutation of the library
    #[test]
    fn shuffle_is_permutation(library in arbitrary_library()) {
        let mut queue = QueueState::new(RepeatMode::All);
        queue.set_shuffle(true, &library);

        let shuffled = queue.effective_sequence(&library);
        prop_assert_eq!(shuffled.len(), library.len());

        let original: HashSet<&str> = filenames(&library).into_iter().collect();
        let permuted: HashSet<&str> = filenames(shuffled).into_iter().collect();
        prop_assert_eq!(original, permuted);
    }

    /// Property: toggling on/off/on yields two valid permutations and
    /// nothing in between
    #[test]
    fn toggle_shuffle_redraws(library in arbitrary_library()) {
        let mut queue = QueueState::default();

        prop_assert!(queue.toggle_shuffle(&library));
        let first: Vec<String> = queue.shuffled_order().iter().map(|t| t.filename.clone()).collect();

        prop_assert!(!queue.toggle_shuffle(&library));
        prop_assert!(queue.shuffled_order().is_empty());
        prop_assert_eq!(filenames(queue.effective_sequence(&library)), filenames(&library));

        prop_assert!(queue.toggle_shuffle(&library));
        prop_assert_eq!(queue.shuffled_order().len(), first.len());
    }

    /// Property: repeat all over a shuffled order visits every track once
    #[test]
    fn shuffled_cycle_visits_every_track(library in arbitrary_library()) {
        let mut queue = QueueState::new(RepeatMode::All);
        queue.set_shuffle(true, &library);

        let mut seen = HashSet::new();
        let mut current = queue.next(&library, None).unwrap().filename.clone();
        for _ in 0..library.len() {
            seen.insert(current.clone());
            current = queue.next(&library, Some(current.as_str())).unwrap().filename.clone();
        }

        prop_assert_eq!(seen.len(), library.len());
    }
}
