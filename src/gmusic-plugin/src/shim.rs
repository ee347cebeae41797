//! Turns host menu requests into client calls and renderable items.

use crate::protocol::{MenuItem, MenuOp, MenuRequest, MenuResponse, MenuResult, MenuTarget};
use gmusic_client::{Transport, TransportResult, Webclient};
use gmusic_core::models::{PlaylistId, SongId};
use tracing::debug;

/// The plugin shim: presentation glue between the host's menu model and the
/// client. Holds no state beyond the client itself.
pub struct MenuShim<T: Transport> {
    client: Webclient<T>,
}

impl<T: Transport> MenuShim<T> {
    pub fn new(client: Webclient<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Webclient<T> {
        &self.client
    }

    /// Handles one host request. Failures are returned in-band as
    /// [`MenuResult::Error`]; the host decides how to present them.
    pub fn handle(&self, request: &MenuRequest) -> MenuResponse {
        debug!(request_id = request.id, "handling menu request");
        let result = match &request.op {
            MenuOp::ListPlaylists => self.playlist_menu(),
            MenuOp::ListPlaylistTracks { playlist_id } => self.track_menu(playlist_id),
            MenuOp::ResolveStream { song_id } => self.stream(song_id),
        };
        MenuResponse {
            id: request.id,
            result: result.unwrap_or_else(|err| MenuResult::Error(err.into())),
        }
    }

    fn playlist_menu(&self) -> TransportResult<MenuResult> {
        let index = self.client.get_all_playlist_ids()?;
        let mut items: Vec<MenuItem> = index
            .into_iter()
            .flat_map(|(name, ids)| {
                ids.into_iter().map(move |playlist_id| MenuItem {
                    title: name.clone(),
                    subtitle: None,
                    target: MenuTarget::Playlist { playlist_id },
                })
            })
            .collect();
        // The name index comes out of a map; give the host a stable order.
        items.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| {
            let key = |item: &MenuItem| match &item.target {
                MenuTarget::Playlist { playlist_id } => playlist_id.0.clone(),
                MenuTarget::Song { song_id } => song_id.0.clone(),
            };
            key(a).cmp(&key(b))
        }));
        Ok(MenuResult::Menu { items })
    }

    fn track_menu(&self, playlist_id: &PlaylistId) -> TransportResult<MenuResult> {
        let tracks = self.client.get_playlist_track_info(playlist_id)?;
        let items = tracks
            .into_iter()
            .map(|track| MenuItem {
                title: track.title,
                subtitle: Some(match track.album {
                    Some(album) => format!("{} — {}", track.artist, album),
                    None => track.artist,
                }),
                target: MenuTarget::Song { song_id: track.id },
            })
            .collect();
        Ok(MenuResult::Menu { items })
    }

    fn stream(&self, song_id: &SongId) -> TransportResult<MenuResult> {
        let url = self.client.get_stream_url(song_id)?;
        Ok(MenuResult::Stream { url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::MenuErrorKind;
    use gmusic_core::models::{EntryId, PlaylistEntry, Track};
    use gmusic_client::{TransportError, TransportResult};
    use std::collections::HashMap;

    /// Minimal read-only transport for menu tests.
    struct MenuTransport;

    impl Transport for MenuTransport {
        fn fetch_playlist_tracks(
            &self,
            playlist_id: &PlaylistId,
        ) -> TransportResult<Vec<PlaylistEntry>> {
            if playlist_id.as_ref() != "p1" {
                return Err(TransportError::NotFound {
                    playlist_id: playlist_id.clone(),
                });
            }
            Ok(vec![PlaylistEntry::placed("s1", "e1")])
        }

        fn fetch_playlist_track_info(
            &self,
            playlist_id: &PlaylistId,
        ) -> TransportResult<Vec<Track>> {
            if playlist_id.as_ref() != "p1" {
                return Err(TransportError::NotFound {
                    playlist_id: playlist_id.clone(),
                });
            }
            Ok(vec![Track {
                id: SongId::new("s1"),
                title: "Opening".into(),
                artist: "Band".into(),
                album: Some("Album".into()),
                duration_seconds: Some(200),
            }])
        }

        fn fetch_playlist_name_index(
            &self,
        ) -> TransportResult<HashMap<String, Vec<PlaylistId>>> {
            let mut index = HashMap::new();
            index.insert("Mix".to_owned(), vec![PlaylistId::new("p1")]);
            index.insert(
                "Focus".to_owned(),
                vec![PlaylistId::new("p2"), PlaylistId::new("p3")],
            );
            Ok(index)
        }

        fn create_playlist(&self, _name: &str) -> TransportResult<PlaylistId> {
            unimplemented!("not used by the menu shim")
        }

        fn delete_playlist(&self, _playlist_id: &PlaylistId) -> TransportResult<PlaylistId> {
            unimplemented!("not used by the menu shim")
        }

        fn rename_playlist(
            &self,
            _playlist_id: &PlaylistId,
            _new_name: &str,
        ) -> TransportResult<PlaylistId> {
            unimplemented!("not used by the menu shim")
        }

        fn delete_entries(
            &self,
            _playlist_id: &PlaylistId,
            _entry_ids: &[EntryId],
        ) -> TransportResult<Vec<String>> {
            unimplemented!("not used by the menu shim")
        }

        fn add_tracks(
            &self,
            _playlist_id: &PlaylistId,
            _song_ids: &[SongId],
        ) -> TransportResult<Vec<(SongId, EntryId)>> {
            unimplemented!("not used by the menu shim")
        }

        fn set_order(
            &self,
            _playlist_id: &PlaylistId,
            _song_ids: &[SongId],
            _entry_ids: &[EntryId],
        ) -> TransportResult<()> {
            unimplemented!("not used by the menu shim")
        }

        fn fetch_stream_url(&self, song_id: &SongId) -> TransportResult<String> {
            Ok(format!("https://stream.example/{}", song_id.as_ref()))
        }
    }

    fn shim() -> MenuShim<MenuTransport> {
        MenuShim::new(Webclient::new(MenuTransport))
    }

    #[test]
    fn playlist_menu_is_sorted_and_covers_duplicate_names() {
        let response = shim().handle(&MenuRequest {
            id: 1,
            op: MenuOp::ListPlaylists,
        });
        let MenuResult::Menu { items } = response.result else {
            panic!("expected a menu");
        };
        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Focus", "Focus", "Mix"]);
    }

    #[test]
    fn track_menu_renders_artist_and_album() {
        let response = shim().handle(&MenuRequest {
            id: 2,
            op: MenuOp::ListPlaylistTracks {
                playlist_id: PlaylistId::new("p1"),
            },
        });
        let MenuResult::Menu { items } = response.result else {
            panic!("expected a menu");
        };
        assert_eq!(items[0].title, "Opening");
        assert_eq!(items[0].subtitle.as_deref(), Some("Band — Album"));
        assert_eq!(
            items[0].target,
            MenuTarget::Song {
                song_id: SongId::new("s1")
            }
        );
    }

    #[test]
    fn unknown_playlist_is_reported_in_band() {
        let response = shim().handle(&MenuRequest {
            id: 3,
            op: MenuOp::ListPlaylistTracks {
                playlist_id: PlaylistId::new("nope"),
            },
        });
        let MenuResult::Error(err) = response.result else {
            panic!("expected an error result");
        };
        assert_eq!(err.kind, MenuErrorKind::NotFound);
    }

    #[test]
    fn stream_resolution_delegates_to_the_client() {
        let response = shim().handle(&MenuRequest {
            id: 4,
            op: MenuOp::ResolveStream {
                song_id: SongId::new("s1"),
            },
        });
        let MenuResult::Stream { url } = response.result else {
            panic!("expected a stream result");
        };
        assert_eq!(url, "https://stream.example/s1");
    }
}
