//! Wire types for the web endpoints. Field names follow the server's
//! camelCase JSON; everything optional server-side is `Option` here so a
//! protocol drift degrades gracefully instead of failing deserialization.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct LoadPlaylistRequest {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct LoadPlaylistResponse {
    /// The server calls the song list of one playlist "playlist".
    #[serde(default)]
    pub playlist: Vec<WireSong>,
}

#[derive(Debug, Deserialize)]
pub struct LoadAllPlaylistsResponse {
    #[serde(default)]
    pub playlists: Vec<WirePlaylist>,
}

#[derive(Debug, Deserialize)]
pub struct WireSong {
    pub id: String,
    #[serde(rename = "playlistEntryId", default)]
    pub playlist_entry_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(rename = "durationMillis", default)]
    pub duration_millis: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct WirePlaylist {
    #[serde(rename = "playlistId")]
    pub playlist_id: String,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct AddPlaylistRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct AddPlaylistResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct DeletePlaylistRequest {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct DeletePlaylistResponse {
    #[serde(rename = "deleteId")]
    pub delete_id: String,
}

#[derive(Debug, Serialize)]
pub struct ModifyPlaylistRequest {
    #[serde(rename = "playlistId")]
    pub playlist_id: String,
    #[serde(rename = "playlistName")]
    pub playlist_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ModifyPlaylistResponse {}

#[derive(Debug, Serialize)]
pub struct AddToPlaylistRequest {
    #[serde(rename = "playlistId")]
    pub playlist_id: String,
    #[serde(rename = "songIds")]
    pub song_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddToPlaylistResponse {
    #[serde(rename = "songIds")]
    pub song_ids: Vec<WireNewEntry>,
}

#[derive(Debug, Deserialize)]
pub struct WireNewEntry {
    #[serde(rename = "songId")]
    pub song_id: String,
    #[serde(rename = "playlistEntryId")]
    pub playlist_entry_id: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteSongRequest {
    #[serde(rename = "listId")]
    pub list_id: String,
    #[serde(rename = "songIds")]
    pub song_ids: Vec<String>,
    #[serde(rename = "entryIds")]
    pub entry_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteSongResponse {
    #[serde(rename = "deleteIds")]
    pub delete_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ChangeOrderRequest {
    #[serde(rename = "playlistId")]
    pub playlist_id: String,
    #[serde(rename = "movedSongIds")]
    pub moved_song_ids: Vec<String>,
    #[serde(rename = "movedEntryIds")]
    pub moved_entry_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeOrderResponse {}

#[derive(Debug, Deserialize)]
pub struct StreamUrlResponse {
    pub url: String,
}
