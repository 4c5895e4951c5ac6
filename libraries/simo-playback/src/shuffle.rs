//! Shuffle order for the library
//!
//! Pure random (Fisher-Yates) permutation. Each track has equal probability
//! of appearing at any position.

use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};
use simo_core::Track;

/// A fresh random permutation of `tracks`.
pub fn shuffled(tracks: &[Track]) -> Vec<Track> {
    shuffled_with(tracks, &mut thread_rng())
}

/// Same as [`shuffled`] with a caller-supplied RNG.
pub fn shuffled_with<R: Rng + ?Sized>(tracks: &[Track], rng: &mut R) -> Vec<Track> {
    let mut order = tracks.to_vec();
    order.shuffle(rng);
    order
}
