//! Queue ordering policy
//!
//! Next/previous are pure functions of the library, the current track, the
//! shuffle order and the repeat mode:
//!
//! - The effective sequence is the shuffled order when shuffle is on, else
//!   the library order.
//! - `RepeatMode::One` always yields the current track.
//! - `RepeatMode::All` wraps around at both ends.
//! - `RepeatMode::None` yields nothing past either end.
//! - A current track missing from the sequence (deleted, or nothing playing)
//!   falls back to the first element, for both next and previous.

use crate::shuffle::shuffled;
use crate::types::RepeatMode;
use simo_core::Track;
use tracing::debug;

/// Shuffle flag, repeat mode and the shuffled order they apply to.
#[derive(Debug, Clone, Default)]
pub struct QueueState {
    shuffle_enabled: bool,
    repeat_mode: RepeatMode,
    shuffled_order: Vec<Track>,
}

impl QueueState {
    pub fn new(repeat_mode: RepeatMode) -> Self {
        Self {
            repeat_mode,
            ..Self::default()
        }
    }

    pub fn shuffle_enabled(&self) -> bool {
        self.shuffle_enabled
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat_mode
    }

    /// Shuffled order, empty while shuffle is off
    pub fn shuffled_order(&self) -> &[Track] {
        &self.shuffled_order
    }

    /// Turn shuffle on or off.
    ///
    /// Turning it on always draws a new permutation; turning it off discards
    /// the current one.
    pub fn set_shuffle(&mut self, enabled: bool, library: &[Track]) {
        self.shuffle_enabled = enabled;
        if enabled {
            self.shuffled_order = shuffled(library);
        } else {
            self.shuffled_order.clear();
        }
        debug!(enabled, "Shuffle changed");
    }

    /// Flip shuffle. Returns the new state.
    pub fn toggle_shuffle(&mut self, library: &[Track]) -> bool {
        self.set_shuffle(!self.shuffle_enabled, library);
        self.shuffle_enabled
    }

    /// Redraw the permutation after the library changed.
    pub fn library_changed(&mut self, library: &[Track]) {
        if self.shuffle_enabled {
            self.shuffled_order = shuffled(library);
        }
    }

    pub fn set_repeat(&mut self, mode: RepeatMode) {
        self.repeat_mode = mode;
    }

    /// Advance the repeat mode (none, all, one). Returns the new mode.
    pub fn cycle_repeat(&mut self) -> RepeatMode {
        self.repeat_mode = self.repeat_mode.cycle();
        self.repeat_mode
    }

    /// Sequence next/previous walk over
    pub fn effective_sequence<'a>(&'a self, library: &'a [Track]) -> &'a [Track] {
        if self.shuffle_enabled {
            &self.shuffled_order
        } else {
            library
        }
    }

    /// Track after `current`, if any
    pub fn next<'a>(&'a self, library: &'a [Track], current: Option<&str>) -> Option<&'a Track> {
        next_in(self.effective_sequence(library), current, self.repeat_mode)
    }

    /// Track before `current`, if any
    pub fn previous<'a>(
        &'a self,
        library: &'a [Track],
        current: Option<&str>,
    ) -> Option<&'a Track> {
        previous_in(self.effective_sequence(library), current, self.repeat_mode)
    }
}

/// Successor of `current` in `sequence`.
pub fn next_in<'a>(
    sequence: &'a [Track],
    current: Option<&str>,
    repeat: RepeatMode,
) -> Option<&'a Track> {
    let Some(index) = position(sequence, current) else {
        return sequence.first();
    };

    match repeat {
        RepeatMode::One => sequence.get(index),
        RepeatMode::All => sequence.get((index + 1) % sequence.len()),
        RepeatMode::None => sequence.get(index + 1),
    }
}

/// Predecessor of `current` in `sequence`.
///
/// An unknown current track falls back to the first element, not the last.
pub fn previous_in<'a>(
    sequence: &'a [Track],
    current: Option<&str>,
    repeat: RepeatMode,
) -> Option<&'a Track> {
    let Some(index) = position(sequence, current) else {
        return sequence.first();
    };

    match repeat {
        RepeatMode::One => sequence.get(index),
        RepeatMode::All => sequence.get(index.checked_sub(1).unwrap_or(sequence.len() - 1)),
        RepeatMode::None => index.checked_sub(1).and_then(|i| sequence.get(i)),
    }
}

fn position(sequence: &[Track], current: Option<&str>) -> Option<usize> {
    let current = current?;
    sequence.iter().position(|t| t.filename == current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library(names: &[&str]) -> Vec<Track> {
        names.iter().map(|n| Track::from_filename(*n)).collect()
    }

    fn name(track: Option<&Track>) -> Option<&str> {
        track.map(|t| t.filename.as_str())
    }

    #[test]
    fn repeat_none_stops_at_end() {
        let lib = library(&["a", "b", "c"]);
        assert_eq!(name(next_in(&lib, Some("a"), RepeatMode::None)), Some("b"));
        assert_eq!(name(next_in(&lib, Some("c"), RepeatMode::None)), None);
        assert_eq!(name(previous_in(&lib, Some("a"), RepeatMode::None)), None);
        assert_eq!(name(previous_in(&lib, Some("c"), RepeatMode::None)), Some("b"));
    }

    #[test]
    fn repeat_all_wraps_both_ways() {
        let lib = library(&["a", "b", "c"]);
        assert_eq!(name(next_in(&lib, Some("c"), RepeatMode::All)), Some("a"));
        assert_eq!(name(previous_in(&lib, Some("a"), RepeatMode::All)), Some("c"));
    }

    #[test]
    fn repeat_one_returns_current() {
        let lib = library(&["a", "b", "c"]);
        assert_eq!(name(next_in(&lib, Some("b"), RepeatMode::One)), Some("b"));
        assert_eq!(name(previous_in(&lib, Some("b"), RepeatMode::One)), Some("b"));
    }

    #[test]
    fn unknown_current_falls_back_to_first() {
        let lib = library(&["a", "b", "c"]);
        for repeat in [RepeatMode::None, RepeatMode::All, RepeatMode::One] {
            assert_eq!(name(next_in(&lib, Some("gone"), repeat)), Some("a"));
            assert_eq!(name(next_in(&lib, None, repeat)), Some("a"));
        }
    }

    #[test]
    fn previous_of_unknown_is_first_not_last() {
        // Asymmetric on purpose: previous does not fall back to the last track
        let lib = library(&["a", "b", "c"]);
        assert_eq!(
            name(previous_in(&lib, Some("gone"), RepeatMode::All)),
            Some("a")
        );
    }

    #[test]
    fn empty_sequence_has_no_next() {
        assert!(next_in(&[], Some("a"), RepeatMode::All).is_none());
        assert!(previous_in(&[], None, RepeatMode::All).is_none());
    }

    #[test]
    fn shuffle_order_drives_sequence() {
        let lib = library(&["a", "b", "c", "d"]);
        let mut queue = QueueState::new(RepeatMode::All);

        assert!(queue.toggle_shuffle(&lib));
        let order: Vec<String> = queue
            .shuffled_order()
            .iter()
            .map(|t| t.filename.clone())
            .collect();
        assert_eq!(order.len(), 4);

        let expected = &order[(order.iter().position(|f| f == "a").unwrap() + 1) % 4];
        assert_eq!(name(queue.next(&lib, Some("a"))), Some(expected.as_str()));

        assert!(!queue.toggle_shuffle(&lib));
        assert!(queue.shuffled_order().is_empty());
        assert_eq!(name(queue.next(&lib, Some("a"))), Some("b"));
    }

    #[test]
    fn library_change_reshuffles_only_when_on() {
        let mut queue = QueueState::default();
        queue.library_changed(&library(&["a", "b"]));
        assert!(queue.shuffled_order().is_empty());

        queue.set_shuffle(true, &library(&["a", "b"]));
        queue.library_changed(&library(&["a", "b", "c"]));
        assert_eq!(queue.shuffled_order().len(), 3);
    }
}
