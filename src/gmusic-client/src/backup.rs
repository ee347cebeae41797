//! Server-side backup of a playlist around a risky mutation.
//!
//! The backup is an ordinary playlist created under a derived name before any
//! destructive step runs. On success it is deleted; on failure it is promoted
//! to replace the original identity.

use crate::transport::{Transport, TransportError, TransportResult};
use crate::Webclient;
use gmusic_core::models::PlaylistId;
use tracing::info;

/// Suffix appended to the original name for the backup playlist.
pub const BACKUP_SUFFIX: &str = "_gmusic_backup";

pub fn backup_name(original: &str) -> String {
    format!("{original}{BACKUP_SUFFIX}")
}

/// A live backup playlist and the identity it protects.
#[derive(Debug, Clone)]
pub(crate) struct BackupHandle {
    pub id: PlaylistId,
    pub original_name: String,
}

impl BackupHandle {
    pub fn derived_name(&self) -> String {
        backup_name(&self.original_name)
    }
}

/// Clones the playlist under its derived backup name.
///
/// Resolves the playlist's current name from the name index first; an id
/// absent from the index is reported as not found. Nothing has been mutated
/// when this fails, so the caller can abort outright.
pub(crate) fn snapshot<T: Transport>(
    client: &Webclient<T>,
    playlist_id: &PlaylistId,
) -> TransportResult<BackupHandle> {
    let index = client.get_all_playlist_ids()?;
    let original_name = index
        .iter()
        .find(|(_, ids)| ids.contains(playlist_id))
        .map(|(name, _)| name.clone())
        .ok_or_else(|| TransportError::NotFound {
            playlist_id: playlist_id.clone(),
        })?;

    let id = client.copy_playlist(playlist_id, &backup_name(&original_name))?;
    info!(
        backup_id = id.as_ref(),
        original = playlist_id.as_ref(),
        "created backup playlist '{}'",
        backup_name(&original_name)
    );
    Ok(BackupHandle { id, original_name })
}

/// Promotes the backup: deletes the inconsistent original and renames the
/// backup to the original name.
///
/// On success the backup's id is the playlist's permanent new identity. On
/// failure the backup still exists under its derived name and is the only
/// safe copy; the caller must say so loudly.
pub(crate) fn recover<T: Transport>(
    client: &Webclient<T>,
    original_id: &PlaylistId,
    backup: &BackupHandle,
) -> TransportResult<PlaylistId> {
    info!(
        "attempting to revert changes from backup playlist '{}'",
        backup.derived_name()
    );

    client.transport().delete_playlist(original_id)?;
    client
        .transport()
        .rename_playlist(&backup.id, &backup.original_name)?;

    info!(
        "reverted changes safely; playlist '{}' now has id {}",
        backup.original_name,
        backup.id.as_ref()
    );
    Ok(backup.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_name_appends_fixed_suffix() {
        assert_eq!(backup_name("Morning Mix"), "Morning Mix_gmusic_backup");
    }
}
