/// Library domain type
use super::Track;

/// The authoritative ordered list of tracks for the current user.
///
/// Order is the server-reported order. The library is never edited in place:
/// every refetch replaces it wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Library {
    tracks: Vec<Track>,
    revision: u64,
}

impl Library {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with a freshly fetched track list.
    ///
    /// Returns `true` when the filenames or their order changed.
    pub fn replace(&mut self, tracks: Vec<Track>) -> bool {
        let changed = self.tracks.len() != tracks.len()
            || self
                .tracks
                .iter()
                .zip(&tracks)
                .any(|(old, new)| old.filename != new.filename);
        self.tracks = tracks;
        self.revision += 1;
        changed
    }

    /// Tracks in server order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Look up a track by filename
    pub fn get(&self, filename: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.filename == filename)
    }

    /// Index of a track by filename
    pub fn position(&self, filename: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t.filename == filename)
    }

    /// Whether the library holds a track with this filename
    pub fn contains(&self, filename: &str) -> bool {
        self.position(filename).is_some()
    }

    /// Number of refetches applied so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
