//! Menu protocol types for the media-center host.
//!
//! The host drives the shim with JSON [`MenuRequest`] messages and renders
//! the [`MenuItem`]s it gets back; how items are drawn and localized is the
//! host's concern.

use gmusic_core::models::{PlaylistId, SongId};
use serde::{Deserialize, Serialize};

/// Protocol version for compatibility checking.
pub const PROTOCOL_VERSION: u32 = 1;

/// Request sent from the host to the shim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuRequest {
    /// Unique request ID for correlation.
    pub id: u64,
    /// The operation to perform.
    pub op: MenuOp,
}

/// Response from the shim to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuResponse {
    /// Request ID this response correlates to.
    pub id: u64,
    pub result: MenuResult,
}

/// Operations the host can request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "params")]
pub enum MenuOp {
    /// The top-level menu of the user's playlists.
    ListPlaylists,
    /// The tracks of one playlist.
    ListPlaylistTracks { playlist_id: PlaylistId },
    /// A playable URL for one song.
    ResolveStream { song_id: SongId },
}

/// Result of a menu operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum MenuResult {
    Menu { items: Vec<MenuItem> },
    Stream { url: String },
    Error(MenuError),
}

/// One renderable menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    pub target: MenuTarget,
}

/// What selecting a menu item should open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum MenuTarget {
    Playlist { playlist_id: PlaylistId },
    Song { song_id: SongId },
}

/// Error surfaced to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuError {
    pub kind: MenuErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuErrorKind {
    /// Remote call or connectivity failure.
    Call,
    /// The requested playlist does not exist.
    NotFound,
    /// Shim misconfiguration.
    Configuration,
}

impl From<gmusic_client::TransportError> for MenuError {
    fn from(err: gmusic_client::TransportError) -> Self {
        use gmusic_client::TransportError;
        match err {
            TransportError::CallFailure { endpoint, message } => Self {
                kind: MenuErrorKind::Call,
                message: format!("{endpoint}: {message}"),
            },
            TransportError::NotFound { playlist_id } => Self {
                kind: MenuErrorKind::NotFound,
                message: playlist_id.0,
            },
            TransportError::Configuration { message } => Self {
                kind: MenuErrorKind::Configuration,
                message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_roundtrip_as_json() {
        let request = MenuRequest {
            id: 7,
            op: MenuOp::ListPlaylistTracks {
                playlist_id: PlaylistId::new("pl-1"),
            },
        };
        let json = serde_json::to_string(&request).expect("serialize");
        let back: MenuRequest = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.id, 7);
        assert!(matches!(back.op, MenuOp::ListPlaylistTracks { .. }));
    }

    #[test]
    fn op_tag_is_stable() {
        let json = serde_json::to_value(MenuOp::ListPlaylists).expect("serialize");
        assert_eq!(json["type"], "ListPlaylists");
    }

    #[test]
    fn not_found_maps_to_its_own_error_kind() {
        let err: MenuError = gmusic_client::TransportError::NotFound {
            playlist_id: PlaylistId::new("gone"),
        }
        .into();
        assert_eq!(err.kind, MenuErrorKind::NotFound);
        assert_eq!(err.message, "gone");
    }
}
