//! HTTP implementation of [`Transport`] against the music service's web
//! endpoints.
//!
//! The service speaks JSON over a handful of `services/*` POST endpoints.
//! Session establishment is the embedder's concern; an already-acquired
//! session token is injected via [`WebTransportConfig`] and sent as a bearer
//! credential.

use crate::mapping;
use crate::models::{
    AddPlaylistRequest, AddPlaylistResponse, AddToPlaylistRequest, AddToPlaylistResponse,
    ChangeOrderRequest, ChangeOrderResponse, DeletePlaylistRequest, DeletePlaylistResponse,
    DeleteSongRequest, DeleteSongResponse, LoadAllPlaylistsResponse, LoadPlaylistRequest,
    LoadPlaylistResponse, ModifyPlaylistRequest, ModifyPlaylistResponse, StreamUrlResponse,
    WireSong,
};
use crate::transport::{Transport, TransportError, TransportResult};
use gmusic_core::models::{EntryId, PlaylistEntry, PlaylistId, SongId, Track};
use gmusic_core::Config;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::warn;
use url::Url;

#[derive(Debug, Clone)]
pub struct WebTransportConfig {
    pub base_url: String,
    pub session_token: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl WebTransportConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            session_token: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(20),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.base_url.clone(),
            session_token: config.session_token.clone(),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }
}

/// Blocking HTTP transport. Owns a single-threaded runtime that drives the
/// async `reqwest` client; every call is a bounded-timeout round trip, and a
/// timeout surfaces as an ordinary [`TransportError::CallFailure`].
#[derive(Debug)]
pub struct WebTransport {
    client: Client,
    base_url: Url,
    session_token: RwLock<Option<String>>,
    runtime: Runtime,
}

impl WebTransport {
    pub fn new(config: WebTransportConfig) -> TransportResult<Self> {
        let base_url =
            Url::parse(&config.base_url).map_err(|e| TransportError::Configuration {
                message: format!("invalid base_url: {e}"),
            })?;
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::Configuration {
                message: e.to_string(),
            })?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TransportError::Configuration {
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            base_url,
            session_token: RwLock::new(config.session_token),
            runtime,
        })
    }

    /// Replaces the session token, e.g. after the embedder refreshed it.
    pub fn set_session_token(&self, token: Option<String>) {
        *self
            .session_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token;
    }

    fn session_token(&self) -> Option<String> {
        self.session_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn service_url(&self, endpoint: &'static str) -> TransportResult<Url> {
        self.base_url
            .join(&format!("services/{endpoint}"))
            .map_err(|e| TransportError::CallFailure {
                endpoint,
                message: e.to_string(),
            })
    }

    fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        body: &B,
        playlist: Option<&PlaylistId>,
    ) -> TransportResult<R> {
        let url = self.service_url(endpoint)?;
        let token = self.session_token();
        let response = self
            .runtime
            .block_on(async {
                let mut request = self.client.post(url).json(body);
                if let Some(token) = token.as_deref() {
                    request = request.bearer_auth(token);
                }
                request.send().await
            })
            .map_err(|e| TransportError::CallFailure {
                endpoint,
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            if let Some(playlist_id) = playlist {
                return Err(TransportError::NotFound {
                    playlist_id: playlist_id.clone(),
                });
            }
        }
        if !status.is_success() {
            return Err(TransportError::CallFailure {
                endpoint,
                message: format!("server returned {status}"),
            });
        }

        self.runtime
            .block_on(async { response.json::<R>().await })
            .map_err(|e| TransportError::CallFailure {
                endpoint,
                message: e.to_string(),
            })
    }

    fn load_playlist_songs(&self, playlist_id: &PlaylistId) -> TransportResult<Vec<WireSong>> {
        let response: LoadPlaylistResponse = self.post(
            "loadplaylist",
            &LoadPlaylistRequest {
                id: playlist_id.as_ref().to_owned(),
            },
            Some(playlist_id),
        )?;
        Ok(response.playlist)
    }
}

impl Transport for WebTransport {
    fn fetch_playlist_tracks(
        &self,
        playlist_id: &PlaylistId,
    ) -> TransportResult<Vec<PlaylistEntry>> {
        self.load_playlist_songs(playlist_id)?
            .iter()
            .map(|song| mapping::map_entry(song, "loadplaylist"))
            .collect()
    }

    fn fetch_playlist_track_info(&self, playlist_id: &PlaylistId) -> TransportResult<Vec<Track>> {
        Ok(self
            .load_playlist_songs(playlist_id)?
            .iter()
            .map(mapping::map_track)
            .collect())
    }

    fn fetch_playlist_name_index(&self) -> TransportResult<HashMap<String, Vec<PlaylistId>>> {
        let response: LoadAllPlaylistsResponse = self.post(
            "loadplaylist",
            &LoadPlaylistRequest { id: "all".into() },
            None,
        )?;
        Ok(mapping::playlist_index(&response.playlists))
    }

    fn create_playlist(&self, name: &str) -> TransportResult<PlaylistId> {
        let response: AddPlaylistResponse = self.post(
            "addplaylist",
            &AddPlaylistRequest { title: name.into() },
            None,
        )?;
        Ok(PlaylistId::new(response.id))
    }

    fn delete_playlist(&self, playlist_id: &PlaylistId) -> TransportResult<PlaylistId> {
        let response: DeletePlaylistResponse = self.post(
            "deleteplaylist",
            &DeletePlaylistRequest {
                id: playlist_id.as_ref().to_owned(),
            },
            Some(playlist_id),
        )?;
        Ok(PlaylistId::new(response.delete_id))
    }

    fn rename_playlist(
        &self,
        playlist_id: &PlaylistId,
        new_name: &str,
    ) -> TransportResult<PlaylistId> {
        // The call returns nothing useful; the id is unchanged.
        let _: ModifyPlaylistResponse = self.post(
            "modifyplaylist",
            &ModifyPlaylistRequest {
                playlist_id: playlist_id.as_ref().to_owned(),
                playlist_name: new_name.into(),
            },
            Some(playlist_id),
        )?;
        Ok(playlist_id.clone())
    }

    fn delete_entries(
        &self,
        playlist_id: &PlaylistId,
        entry_ids: &[EntryId],
    ) -> TransportResult<Vec<String>> {
        // The deletion endpoint wants the song ids as well; recover them from
        // the playlist's current contents.
        let tracks = self.fetch_playlist_tracks(playlist_id)?;
        let wanted: HashSet<&str> = entry_ids.iter().map(AsRef::as_ref).collect();
        let pairs: Vec<(&SongId, &EntryId)> = tracks
            .iter()
            .filter_map(|entry| {
                let entry_id = entry.entry_id.as_ref()?;
                wanted
                    .contains(entry_id.as_ref())
                    .then_some((&entry.song_id, entry_id))
            })
            .collect();

        let missing = entry_ids.len().saturating_sub(pairs.len());
        if missing > 0 {
            warn!(
                playlist_id = playlist_id.as_ref(),
                "{missing} entry ids to remove could not be found in the playlist"
            );
        }
        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        let response: DeleteSongResponse = self.post(
            "deletesong",
            &DeleteSongRequest {
                list_id: playlist_id.as_ref().to_owned(),
                song_ids: pairs.iter().map(|(song, _)| song.as_ref().to_owned()).collect(),
                entry_ids: pairs
                    .iter()
                    .map(|(_, entry)| entry.as_ref().to_owned())
                    .collect(),
            },
            Some(playlist_id),
        )?;
        Ok(response.delete_ids)
    }

    fn add_tracks(
        &self,
        playlist_id: &PlaylistId,
        song_ids: &[SongId],
    ) -> TransportResult<Vec<(SongId, EntryId)>> {
        let response: AddToPlaylistResponse = self.post(
            "addtoplaylist",
            &AddToPlaylistRequest {
                playlist_id: playlist_id.as_ref().to_owned(),
                song_ids: song_ids.iter().map(|s| s.as_ref().to_owned()).collect(),
            },
            Some(playlist_id),
        )?;
        Ok(response
            .song_ids
            .iter()
            .map(|entry| mapping::map_new_entry(&entry.song_id, &entry.playlist_entry_id))
            .collect())
    }

    fn set_order(
        &self,
        playlist_id: &PlaylistId,
        song_ids: &[SongId],
        entry_ids: &[EntryId],
    ) -> TransportResult<()> {
        if song_ids.is_empty() || song_ids.len() != entry_ids.len() {
            return Err(TransportError::CallFailure {
                endpoint: "changeplaylistorder",
                message: format!(
                    "invalid order call: {} song ids, {} entry ids",
                    song_ids.len(),
                    entry_ids.len()
                ),
            });
        }
        let _: ChangeOrderResponse = self.post(
            "changeplaylistorder",
            &ChangeOrderRequest {
                playlist_id: playlist_id.as_ref().to_owned(),
                moved_song_ids: song_ids.iter().map(|s| s.as_ref().to_owned()).collect(),
                moved_entry_ids: entry_ids.iter().map(|e| e.as_ref().to_owned()).collect(),
            },
            Some(playlist_id),
        )?;
        Ok(())
    }

    fn fetch_stream_url(&self, song_id: &SongId) -> TransportResult<String> {
        let endpoint = "play";
        let url = self
            .base_url
            .join("play")
            .map_err(|e| TransportError::CallFailure {
                endpoint,
                message: e.to_string(),
            })?;
        let token = self.session_token();
        let response = self
            .runtime
            .block_on(async {
                let mut request = self
                    .client
                    .get(url)
                    .query(&[("songid", song_id.as_ref())]);
                if let Some(token) = token.as_deref() {
                    request = request.bearer_auth(token);
                }
                request.send().await
            })
            .map_err(|e| TransportError::CallFailure {
                endpoint,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::CallFailure {
                endpoint,
                message: format!("server returned {status}"),
            });
        }
        let body: StreamUrlResponse = self
            .runtime
            .block_on(async { response.json().await })
            .map_err(|e| TransportError::CallFailure {
                endpoint,
                message: e.to_string(),
            })?;
        Ok(body.url)
    }
}
