use serde::{Deserialize, Serialize};

/// Identifier of a track in the library.
///
/// Stable across playlists and across time; the same `SongId` refers to the
/// same underlying track wherever it appears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct SongId(pub String);

impl SongId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl AsRef<str> for SongId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SongId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for SongId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identifier of one placement of a song within one specific playlist.
///
/// Assigned by the server when the entry is inserted. Unique within a single
/// playlist snapshot, but not across playlists; a song appearing twice in one
/// playlist has two distinct entry ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct EntryId(pub String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl AsRef<str> for EntryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// An opaque playlist identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct PlaylistId(pub String);

impl PlaylistId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl AsRef<str> for PlaylistId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlaylistId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for PlaylistId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One element of a playlist: a song plus, once the server has assigned it,
/// the id of this particular placement.
///
/// `entry_id` is `None` for elements the caller appended locally and the
/// server has not seen yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub song_id: SongId,
    pub entry_id: Option<EntryId>,
}

impl PlaylistEntry {
    /// An entry the server already knows about.
    pub fn placed(song_id: impl Into<SongId>, entry_id: impl Into<EntryId>) -> Self {
        Self {
            song_id: song_id.into(),
            entry_id: Some(entry_id.into()),
        }
    }

    /// A caller-appended entry awaiting a server-assigned entry id.
    pub fn unplaced(song_id: impl Into<SongId>) -> Self {
        Self {
            song_id: song_id.into(),
            entry_id: None,
        }
    }
}

/// Minimal playlist metadata.
///
/// Playlist names are not unique server-side; two playlists may share a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: PlaylistId,
    pub name: String,
    pub track_count: Option<u32>,
}

/// Display metadata for a track, used by the plugin menu layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: SongId,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    /// Duration in seconds when known.
    pub duration_seconds: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_constructors() {
        let placed = PlaylistEntry::placed("s1", "e1");
        assert_eq!(placed.song_id.as_ref(), "s1");
        assert_eq!(placed.entry_id.as_ref().map(AsRef::as_ref), Some("e1"));

        let unplaced = PlaylistEntry::unplaced("s2");
        assert!(unplaced.entry_id.is_none());
    }

    #[test]
    fn ids_roundtrip_serde() {
        let id = PlaylistId::new("pl-1");
        let json = serde_json::to_string(&id).expect("serialize");
        let back: PlaylistId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(id, back);
    }
}
