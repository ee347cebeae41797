use crate::models::{WirePlaylist, WireSong};
use crate::transport::{TransportError, TransportResult};
use gmusic_core::models::{EntryId, PlaylistEntry, PlaylistId, SongId, Track};
use std::collections::HashMap;

/// Maps a wire song to a playlist entry, insisting on the entry id.
///
/// Every element of a loaded playlist must carry its placement id; a song
/// without one is a malformed response, caught here at the wire boundary.
pub fn map_entry(song: &WireSong, endpoint: &'static str) -> TransportResult<PlaylistEntry> {
    let entry_id = song
        .playlist_entry_id
        .as_deref()
        .ok_or_else(|| TransportError::CallFailure {
            endpoint,
            message: format!("song {} is missing playlistEntryId", song.id),
        })?;
    Ok(PlaylistEntry::placed(song.id.as_str(), entry_id))
}

pub fn map_track(song: &WireSong) -> Track {
    Track {
        id: SongId::new(song.id.clone()),
        title: song.title.clone().unwrap_or_else(|| song.id.clone()),
        artist: song
            .artist
            .clone()
            .unwrap_or_else(|| "Unknown Artist".into()),
        album: song.album.clone(),
        duration_seconds: song.duration_millis.map(|d| (d / 1000) as u32),
    }
}

pub fn map_new_entry(song_id: &str, entry_id: &str) -> (SongId, EntryId) {
    (SongId::new(song_id), EntryId::new(entry_id))
}

/// Folds the flat playlist listing into the name index. Names are not unique,
/// so each name maps onto every id carrying it, in listing order.
pub fn playlist_index(playlists: &[WirePlaylist]) -> HashMap<String, Vec<PlaylistId>> {
    let mut index: HashMap<String, Vec<PlaylistId>> = HashMap::new();
    for playlist in playlists {
        index
            .entry(playlist.title.clone())
            .or_default()
            .push(PlaylistId::new(playlist.playlist_id.clone()));
    }
    index
}
