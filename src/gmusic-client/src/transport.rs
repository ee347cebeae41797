use gmusic_core::models::{EntryId, PlaylistId, SongId, Track};
use std::collections::HashMap;
use thiserror::Error;

/// Delimiter of the `"song_id:entry_id"` composite strings returned by the
/// entry-deletion call.
pub const COMPOSITE_DELIMITER: char = ':';

/// Failures surfaced by a [`Transport`] implementation.
///
/// The transport does not distinguish server-side error subtypes; anything
/// that goes wrong on the wire or server side is a [`CallFailure`] naming the
/// endpoint.
///
/// [`CallFailure`]: TransportError::CallFailure
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("call to {endpoint} failed: {message}")]
    CallFailure {
        endpoint: &'static str,
        message: String,
    },
    #[error("playlist not found: {playlist_id:?}")]
    NotFound { playlist_id: PlaylistId },
    #[error("transport configuration error: {message}")]
    Configuration { message: String },
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Authenticated remote calls against the music service.
///
/// All calls are synchronous and blocking. Implementations must apply a
/// bounded timeout to every call and surface a timeout as a
/// [`TransportError::CallFailure`].
pub trait Transport: Send + Sync {
    /// The ordered entries currently stored server-side for a playlist.
    ///
    /// Fails with [`TransportError::NotFound`] for an unknown id; an existing
    /// empty playlist yields `Ok(vec![])`.
    fn fetch_playlist_tracks(&self, playlist_id: &PlaylistId)
        -> TransportResult<Vec<gmusic_core::models::PlaylistEntry>>;

    /// Display metadata for a playlist's songs, for embedders rendering menus.
    fn fetch_playlist_track_info(&self, playlist_id: &PlaylistId) -> TransportResult<Vec<Track>>;

    /// Mapping of playlist names to ids. Names are not unique server-side.
    fn fetch_playlist_name_index(&self) -> TransportResult<HashMap<String, Vec<PlaylistId>>>;

    fn create_playlist(&self, name: &str) -> TransportResult<PlaylistId>;

    /// Returns the deleted id.
    fn delete_playlist(&self, playlist_id: &PlaylistId) -> TransportResult<PlaylistId>;

    fn rename_playlist(&self, playlist_id: &PlaylistId, new_name: &str)
        -> TransportResult<PlaylistId>;

    /// Deletes entries by entry id. Returns `"song_id:entry_id"` composite
    /// strings for the entries actually removed; split them with
    /// [`split_deleted_entry`].
    fn delete_entries(
        &self,
        playlist_id: &PlaylistId,
        entry_ids: &[EntryId],
    ) -> TransportResult<Vec<String>>;

    /// Appends songs to a playlist. Returns one `(song_id, entry_id)` pair per
    /// requested occurrence, duplicates included.
    fn add_tracks(
        &self,
        playlist_id: &PlaylistId,
        song_ids: &[SongId],
    ) -> TransportResult<Vec<(SongId, EntryId)>>;

    /// Sets the explicit entry order. Both slices must be the same length and
    /// **reversed from the desired final display order** (the server applies
    /// order-setting calls back to front). Must never be invoked with empty
    /// slices.
    fn set_order(
        &self,
        playlist_id: &PlaylistId,
        song_ids: &[SongId],
        entry_ids: &[EntryId],
    ) -> TransportResult<()>;

    /// A short-lived streamable URL for a song. Reading the stream is the
    /// embedder's concern.
    fn fetch_stream_url(&self, song_id: &SongId) -> TransportResult<String>;
}

/// Splits a `"song_id:entry_id"` composite returned by [`Transport::delete_entries`].
///
/// Song ids never contain the delimiter, so the split is on the first
/// occurrence; returns `None` for a malformed composite.
pub fn split_deleted_entry(composite: &str) -> Option<(SongId, EntryId)> {
    let (sid, eid) = composite.split_once(COMPOSITE_DELIMITER)?;
    if sid.is_empty() || eid.is_empty() {
        return None;
    }
    Some((SongId::new(sid), EntryId::new(eid)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_well_formed_composite() {
        let (sid, eid) = split_deleted_entry("song-1:entry-9").expect("should split");
        assert_eq!(sid.as_ref(), "song-1");
        assert_eq!(eid.as_ref(), "entry-9");
    }

    #[test]
    fn rejects_malformed_composites() {
        assert!(split_deleted_entry("no-delimiter").is_none());
        assert!(split_deleted_entry(":entry").is_none());
        assert!(split_deleted_entry("song:").is_none());
    }
}
