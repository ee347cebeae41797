//! Client library for a Google Music web library, exposing playlist,
//! library, and streaming operations as ordinary blocking calls.
//!
//! The interesting machinery is playlist reconciliation:
//! [`Webclient::change_playlist`] diffs a desired track list against the
//! server state and applies the minimal delete/add/reorder sequence, with an
//! optional all-or-nothing backup/rollback safety net (see [`change`]).
//!
//! Remote access goes through the [`Transport`] trait; [`WebTransport`] is
//! the HTTP implementation. The split keeps the reconciliation engine
//! testable against an in-memory transport.
//!
//! # Concurrency
//!
//! The server holds no transactional isolation. Embedders must serialize all
//! mutating operations per playlist id; reads of distinct playlists may run
//! in parallel.

pub mod backup;
pub mod change;
pub mod diff;
mod mapping;
pub mod models;
pub mod transport;
pub mod web;

pub use backup::{backup_name, BACKUP_SUFFIX};
pub use change::{ChangeError, ChangeOutcome, MutationFault, MutationStep};
pub use diff::{compute_changes, ChangeSet};
pub use transport::{
    split_deleted_entry, Transport, TransportError, TransportResult, COMPOSITE_DELIMITER,
};
pub use web::{WebTransport, WebTransportConfig};

use gmusic_core::models::{EntryId, PlaylistEntry, PlaylistId, SongId, Track};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Facade over a [`Transport`], mirroring the operations of the music
/// service's own web client.
pub struct Webclient<T: Transport> {
    transport: T,
}

impl<T: Transport> Webclient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The playlist's current entries, with entry ids. `NotFound` for an
    /// unknown id; an existing empty playlist yields an empty list.
    pub fn get_playlist_songs(
        &self,
        playlist_id: &PlaylistId,
    ) -> TransportResult<Vec<PlaylistEntry>> {
        self.transport.fetch_playlist_tracks(playlist_id)
    }

    /// Display metadata for the playlist's songs.
    pub fn get_playlist_track_info(
        &self,
        playlist_id: &PlaylistId,
    ) -> TransportResult<Vec<Track>> {
        self.transport.fetch_playlist_track_info(playlist_id)
    }

    /// All user playlists, keyed by name. Names are not unique, so each name
    /// maps onto a list of ids.
    pub fn get_all_playlist_ids(&self) -> TransportResult<HashMap<String, Vec<PlaylistId>>> {
        self.transport.fetch_playlist_name_index()
    }

    /// Creates a new playlist and returns its id.
    pub fn create_playlist(&self, name: &str) -> TransportResult<PlaylistId> {
        self.transport.create_playlist(name)
    }

    /// Deletes a playlist and returns the deleted id.
    pub fn delete_playlist(&self, playlist_id: &PlaylistId) -> TransportResult<PlaylistId> {
        self.transport.delete_playlist(playlist_id)
    }

    /// Renames a playlist and returns the (unchanged) id.
    pub fn change_playlist_name(
        &self,
        playlist_id: &PlaylistId,
        new_name: &str,
    ) -> TransportResult<PlaylistId> {
        self.transport.rename_playlist(playlist_id, new_name)
    }

    /// Appends songs to a playlist, returning the server-assigned
    /// `(song_id, entry_id)` pair for each appended occurrence. An empty
    /// request short-circuits without a remote call.
    pub fn add_songs_to_playlist(
        &self,
        playlist_id: &PlaylistId,
        song_ids: &[SongId],
    ) -> TransportResult<Vec<(SongId, EntryId)>> {
        if song_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.transport.add_tracks(playlist_id, song_ids)
    }

    /// Removes **all copies** of the given songs from a playlist, returning
    /// the removed `(song_id, entry_id)` pairs.
    ///
    /// Not the inverse of [`Webclient::add_songs_to_playlist`] when a song
    /// appears more than once. For per-entry control, fetch the tracks,
    /// edit the list, and push it with [`Webclient::change_playlist`].
    pub fn remove_songs_from_playlist(
        &self,
        playlist_id: &PlaylistId,
        song_ids: &[SongId],
    ) -> TransportResult<Vec<(SongId, EntryId)>> {
        let tracks = self.transport.fetch_playlist_tracks(playlist_id)?;
        let wanted: HashSet<&str> = song_ids.iter().map(AsRef::as_ref).collect();
        let matching: Vec<EntryId> = tracks
            .iter()
            .filter(|entry| wanted.contains(entry.song_id.as_ref()))
            .filter_map(|entry| entry.entry_id.clone())
            .collect();

        if matching.is_empty() {
            return Ok(Vec::new());
        }

        let composites = self.transport.delete_entries(playlist_id, &matching)?;
        let mut removed = Vec::with_capacity(composites.len());
        for composite in &composites {
            match split_deleted_entry(composite) {
                Some(pair) => removed.push(pair),
                None => warn!(
                    playlist_id = playlist_id.as_ref(),
                    "server reported a malformed deleted entry: {composite:?}"
                ),
            }
        }
        Ok(removed)
    }

    /// Copies a playlist's contents into a new playlist under `copy_name`,
    /// preserving order. Returns the new playlist's id.
    ///
    /// Used by safe-mode [`Webclient::change_playlist`] to back a playlist up
    /// before modifying it.
    pub fn copy_playlist(
        &self,
        playlist_id: &PlaylistId,
        copy_name: &str,
    ) -> TransportResult<PlaylistId> {
        let tracks = self.transport.fetch_playlist_tracks(playlist_id)?;
        let new_id = self.transport.create_playlist(copy_name)?;
        let song_ids: Vec<SongId> = tracks.into_iter().map(|entry| entry.song_id).collect();
        if !song_ids.is_empty() {
            self.transport.add_tracks(&new_id, &song_ids)?;
        }
        Ok(new_id)
    }

    /// A short-lived streamable URL for a song. The URL expires quickly and
    /// carries no metadata; fetching the stream itself is the embedder's
    /// concern.
    pub fn get_stream_url(&self, song_id: &SongId) -> TransportResult<String> {
        self.transport.fetch_stream_url(song_id)
    }
}
