//! Media-center menu shim over the gmusic client.
//!
//! This crate provides:
//! - A JSON-based menu protocol for a media-center host
//! - A shim that answers menu requests with playlist and track items
//!
//! # Menu Protocol
//!
//! The host drives the shim with JSON messages, one per line:
//! - The host sends [`MenuRequest`] messages naming an operation
//! - The shim answers with [`MenuResponse`] messages carrying either menu
//!   items, a stream URL, or an in-band error
//!
//! # Usage
//!
//! ```rust,ignore
//! use gmusic_client::{Webclient, WebTransport, WebTransportConfig};
//! use gmusic_plugin::{MenuOp, MenuRequest, MenuShim};
//!
//! let transport = WebTransport::new(
//!     WebTransportConfig::new("https://play.google.com/music/")
//!         .with_session_token(token),
//! )?;
//! let shim = MenuShim::new(Webclient::new(transport));
//!
//! let response = shim.handle(&MenuRequest { id: 1, op: MenuOp::ListPlaylists });
//! ```

pub mod protocol;
mod shim;

pub use protocol::{
    MenuError, MenuErrorKind, MenuItem, MenuOp, MenuRequest, MenuResponse, MenuResult,
    MenuTarget, PROTOCOL_VERSION,
};
pub use shim::MenuShim;
