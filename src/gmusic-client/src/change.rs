//! The playlist mutation orchestrator.
//!
//! The server offers only three primitive playlist mutations: entry deletion,
//! appending, and an explicit order-setting call. [`Webclient::change_playlist`]
//! sequences them to transform a playlist's server state into a desired state,
//! optionally wrapped in a backup/rollback safety net.
//!
//! Per invocation the flow is `START → SNAPSHOT(safe) → DELETE → ADD →
//! REORDER → CLEANUP(safe) → DONE`, with a side transition into `RECOVER`
//! from any of the three destructive steps when `safe` is on.

use crate::backup::{self, BackupHandle};
use crate::diff::compute_changes;
use crate::transport::{Transport, TransportError};
use crate::Webclient;
use gmusic_core::models::{EntryId, PlaylistEntry, PlaylistId, SongId};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use thiserror::Error;
use tracing::warn;

/// Which remote round trip of the orchestration failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStep {
    /// Reading the current server state. Precedes every destructive step.
    Fetch,
    Delete,
    Add,
    Reorder,
}

impl fmt::Display for MutationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MutationStep::Fetch => "fetch",
            MutationStep::Delete => "delete",
            MutationStep::Add => "add",
            MutationStep::Reorder => "reorder",
        };
        f.write_str(name)
    }
}

/// What stopped a mutation step.
#[derive(Debug, Error)]
pub enum MutationFault {
    #[error(transparent)]
    Call(#[from] TransportError),
    /// Folding server-assigned entry ids back into the desired list left an
    /// element without one. Issuing the reorder call with stale data would
    /// corrupt the playlist, so this escalates like a remote failure instead.
    #[error("entry accounting incomplete: no entry id available for song {song_id:?}")]
    Accounting { song_id: SongId },
}

/// Successful completion of [`Webclient::change_playlist`].
///
/// The contained id may differ from the one passed in: when a failed mutation
/// is rolled back, the backup playlist becomes the playlist's permanent new
/// identity. Callers must always use the returned id.
#[derive(Debug)]
pub enum ChangeOutcome {
    /// Every step succeeded; the id is unchanged.
    Applied { playlist_id: PlaylistId },
    /// A mutation step failed but the backup was promoted successfully. The
    /// id is the backup's id, now the playlist's identity.
    RolledBack {
        playlist_id: PlaylistId,
        cause: MutationFault,
    },
}

impl ChangeOutcome {
    pub fn playlist_id(&self) -> &PlaylistId {
        match self {
            ChangeOutcome::Applied { playlist_id } => playlist_id,
            ChangeOutcome::RolledBack { playlist_id, .. } => playlist_id,
        }
    }
}

#[derive(Debug, Error)]
pub enum ChangeError {
    /// Backup creation failed. Nothing has been mutated.
    #[error("backup snapshot failed, playlist left untouched: {source}")]
    Snapshot {
        #[source]
        source: TransportError,
    },
    /// A step failed with no recovery attempted: either `safe` was off, or
    /// the failure preceded every destructive step (`Fetch`). With `safe`
    /// off the playlist may be partially mutated; the caller must inspect.
    #[error("playlist mutation failed at the {step} step: {source}")]
    Mutation {
        step: MutationStep,
        #[source]
        source: MutationFault,
    },
    /// A mutation step failed and so did the rollback. Both the original and
    /// backup playlists may be inconsistent or duplicated; the backup still
    /// exists under `backup_name` and is the only safe copy. Manual recovery
    /// required.
    #[error(
        "mutation failed at the {step} step ({mutation}) and recovery failed too: {recovery}; \
         backup playlist '{backup_name}' ({backup_id:?}) must be restored manually"
    )]
    Recovery {
        step: MutationStep,
        mutation: MutationFault,
        #[source]
        recovery: TransportError,
        backup_id: PlaylistId,
        backup_name: String,
    },
}

impl<T: Transport> Webclient<T> {
    /// Changes the order and contents of an existing playlist.
    ///
    /// `desired` is the target contents and order, as returned from
    /// [`Webclient::get_playlist_songs`] and modified by the caller; elements
    /// appended locally may lack an entry id. The caller's slice is never
    /// mutated.
    ///
    /// With `safe` on (the recommended default) the playlist is cloned
    /// server-side first, and a failure mid-sequence rolls the playlist back
    /// to the backup, whose id then becomes the playlist's new identity.
    /// With `safe` off a failure leaves the playlist in whatever partial
    /// state the completed steps produced.
    ///
    /// Callers must serialize mutating operations per playlist id; the
    /// client takes no locks, and the server has no transactional isolation.
    /// Overlapping mutations of one playlist can corrupt its contents.
    pub fn change_playlist(
        &self,
        playlist_id: &PlaylistId,
        desired: &[PlaylistEntry],
        safe: bool,
    ) -> Result<ChangeOutcome, ChangeError> {
        let server_tracks = self
            .transport()
            .fetch_playlist_tracks(playlist_id)
            .map_err(|source| ChangeError::Mutation {
                step: MutationStep::Fetch,
                source: source.into(),
            })?;
        let server_pairs =
            placed_pairs(&server_tracks).map_err(|source| ChangeError::Mutation {
                step: MutationStep::Fetch,
                source: source.into(),
            })?;

        let backup = if safe {
            Some(
                backup::snapshot(self, playlist_id)
                    .map_err(|source| ChangeError::Snapshot { source })?,
            )
        } else {
            None
        };

        match self.apply_changes(playlist_id, &server_pairs, desired) {
            Ok(()) => {
                if let Some(backup) = backup {
                    self.cleanup_backup(&backup);
                }
                Ok(ChangeOutcome::Applied {
                    playlist_id: playlist_id.clone(),
                })
            }
            Err((step, cause)) => {
                warn!(
                    playlist_id = playlist_id.as_ref(),
                    %step,
                    "a subcall of change_playlist failed; playlist is in an inconsistent state"
                );
                self.handle_failure(playlist_id, backup, step, cause)
            }
        }
    }

    /// The destructive middle of the state machine: DELETE, ADD, REORDER.
    fn apply_changes(
        &self,
        playlist_id: &PlaylistId,
        server_pairs: &[(SongId, EntryId)],
        desired: &[PlaylistEntry],
    ) -> Result<(), (MutationStep, MutationFault)> {
        let changes = compute_changes(server_pairs, desired);

        if !changes.to_delete.is_empty() {
            let entry_ids: Vec<EntryId> = changes
                .to_delete
                .iter()
                .map(|(_, entry_id)| entry_id.clone())
                .collect();
            self.transport()
                .delete_entries(playlist_id, &entry_ids)
                .map_err(|e| (MutationStep::Delete, e.into()))?;
        }

        let new_pairs = if changes.to_add.is_empty() {
            Vec::new()
        } else {
            self.transport()
                .add_tracks(playlist_id, &changes.to_add)
                .map_err(|e| (MutationStep::Add, e.into()))?
        };

        let resolved = resolve_entries(desired, &changes.to_keep, &new_pairs)
            .map_err(|fault| (MutationStep::Reorder, fault))?;

        // The server applies order-setting calls back to front, so the ids go
        // out in reverse of the desired final order. An empty order call is
        // invalid and the step is skipped for an empty playlist.
        if !resolved.is_empty() {
            let mut song_ids = Vec::with_capacity(resolved.len());
            let mut entry_ids = Vec::with_capacity(resolved.len());
            for (song_id, entry_id) in resolved.iter().rev() {
                song_ids.push(song_id.clone());
                entry_ids.push(entry_id.clone());
            }
            self.transport()
                .set_order(playlist_id, &song_ids, &entry_ids)
                .map_err(|e| (MutationStep::Reorder, e.into()))?;
        }

        Ok(())
    }

    fn handle_failure(
        &self,
        playlist_id: &PlaylistId,
        backup: Option<BackupHandle>,
        step: MutationStep,
        cause: MutationFault,
    ) -> Result<ChangeOutcome, ChangeError> {
        let Some(backup) = backup else {
            return Err(ChangeError::Mutation {
                step,
                source: cause,
            });
        };

        match backup::recover(self, playlist_id, &backup) {
            Ok(new_id) => Ok(ChangeOutcome::RolledBack {
                playlist_id: new_id,
                cause,
            }),
            Err(recovery) => {
                let backup_name = backup.derived_name();
                warn!(
                    backup_id = backup.id.as_ref(),
                    backup_name,
                    "failed to revert failed change_playlist call; \
                     the backup playlist is the only safe copy and must be restored manually"
                );
                Err(ChangeError::Recovery {
                    step,
                    mutation: cause,
                    recovery,
                    backup_id: backup.id,
                    backup_name,
                })
            }
        }
    }

    /// Stale backups are an acceptable cost; inconsistent live playlists are
    /// not. A cleanup failure is logged and swallowed.
    fn cleanup_backup(&self, backup: &BackupHandle) {
        if let Err(err) = self.transport().delete_playlist(&backup.id) {
            warn!(
                backup_id = backup.id.as_ref(),
                "failed to delete backup playlist '{}' after a successful update: {err}",
                backup.derived_name()
            );
        }
    }
}

/// Requires every server entry to carry its placement id.
fn placed_pairs(entries: &[PlaylistEntry]) -> Result<Vec<(SongId, EntryId)>, TransportError> {
    entries
        .iter()
        .map(|entry| {
            let entry_id = entry.entry_id.clone().ok_or_else(|| {
                TransportError::CallFailure {
                    endpoint: "loadplaylist",
                    message: format!(
                        "server entry for song {} is missing its entry id",
                        entry.song_id.as_ref()
                    ),
                }
            })?;
            Ok((entry.song_id.clone(), entry_id))
        })
        .collect()
}

/// Folds kept and server-assigned entry ids back into the desired list,
/// returning a fully placed `(song_id, entry_id)` sequence in desired order.
///
/// An element whose existing pair survived the diff keeps its own entry id;
/// that id is reserved up front so a later duplicate of the same song cannot
/// claim it. Elements without one draw first from the surviving kept ids for
/// their song (first-seen-in-server-list order), then from the freshly
/// assigned ids, one per element.
fn resolve_entries(
    desired: &[PlaylistEntry],
    to_keep: &[(SongId, EntryId)],
    new_pairs: &[(SongId, EntryId)],
) -> Result<Vec<(SongId, EntryId)>, MutationFault> {
    let kept_ids: HashSet<&str> = to_keep
        .iter()
        .map(|(_, entry_id)| entry_id.as_ref())
        .collect();

    // Entry ids claimed exactly by a desired element that already holds them.
    let mut reserved: HashSet<&str> = HashSet::new();
    for entry in desired {
        if let Some(entry_id) = &entry.entry_id {
            if kept_ids.contains(entry_id.as_ref()) {
                reserved.insert(entry_id.as_ref());
            }
        }
    }

    let mut kept_pool: HashMap<&str, VecDeque<&EntryId>> = HashMap::new();
    for (song_id, entry_id) in to_keep {
        if !reserved.contains(entry_id.as_ref()) {
            kept_pool
                .entry(song_id.as_ref())
                .or_default()
                .push_back(entry_id);
        }
    }
    let mut new_pool: HashMap<&str, VecDeque<&EntryId>> = HashMap::new();
    for (song_id, entry_id) in new_pairs {
        new_pool
            .entry(song_id.as_ref())
            .or_default()
            .push_back(entry_id);
    }

    let mut resolved = Vec::with_capacity(desired.len());
    for entry in desired {
        let song = entry.song_id.as_ref();
        if let Some(entry_id) = &entry.entry_id {
            // `take` consumes the reservation, so a duplicated element sharing
            // the same pair falls through to the pools.
            if reserved.take(entry_id.as_ref()).is_some() {
                resolved.push((entry.song_id.clone(), entry_id.clone()));
                continue;
            }
        }
        let assigned = kept_pool
            .get_mut(song)
            .and_then(VecDeque::pop_front)
            .or_else(|| new_pool.get_mut(song).and_then(VecDeque::pop_front));
        match assigned {
            Some(entry_id) => resolved.push((entry.song_id.clone(), entry_id.clone())),
            None => {
                return Err(MutationFault::Accounting {
                    song_id: entry.song_id.clone(),
                })
            }
        }
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(song: &str, entry: &str) -> (SongId, EntryId) {
        (SongId::new(song), EntryId::new(entry))
    }

    #[test]
    fn kept_entries_keep_their_own_ids() {
        let desired = vec![
            PlaylistEntry::placed("a", "e1"),
            PlaylistEntry::placed("b", "e2"),
        ];
        let to_keep = vec![pair("a", "e1"), pair("b", "e2")];
        let resolved = resolve_entries(&desired, &to_keep, &[]).expect("resolves");
        assert_eq!(resolved, vec![pair("a", "e1"), pair("b", "e2")]);
    }

    #[test]
    fn unplaced_elements_draw_kept_ids_before_new_ones() {
        let desired = vec![
            PlaylistEntry::unplaced("a"),
            PlaylistEntry::unplaced("a"),
        ];
        let to_keep = vec![pair("a", "kept")];
        let new_pairs = vec![pair("a", "fresh")];
        let resolved = resolve_entries(&desired, &to_keep, &new_pairs).expect("resolves");
        assert_eq!(resolved, vec![pair("a", "kept"), pair("a", "fresh")]);
    }

    #[test]
    fn duplicate_of_a_kept_pair_cannot_steal_its_id() {
        // The second element carries a kept entry id; a preceding unplaced
        // duplicate of the same song must not consume it.
        let desired = vec![
            PlaylistEntry::unplaced("a"),
            PlaylistEntry::placed("a", "kept"),
        ];
        let to_keep = vec![pair("a", "kept")];
        let new_pairs = vec![pair("a", "fresh")];
        let resolved = resolve_entries(&desired, &to_keep, &new_pairs).expect("resolves");
        assert_eq!(resolved, vec![pair("a", "fresh"), pair("a", "kept")]);
    }

    #[test]
    fn stale_entry_id_falls_back_to_the_pools() {
        // The element's entry id no longer exists server-side (not kept); it
        // is treated like an unplaced element.
        let desired = vec![PlaylistEntry::placed("a", "gone")];
        let new_pairs = vec![pair("a", "fresh")];
        let resolved = resolve_entries(&desired, &[], &new_pairs).expect("resolves");
        assert_eq!(resolved, vec![pair("a", "fresh")]);
    }

    #[test]
    fn uncovered_element_is_an_accounting_fault() {
        let desired = vec![
            PlaylistEntry::unplaced("a"),
            PlaylistEntry::unplaced("a"),
        ];
        let new_pairs = vec![pair("a", "only-one")];
        let err = resolve_entries(&desired, &[], &new_pairs).unwrap_err();
        assert!(matches!(err, MutationFault::Accounting { song_id } if song_id.as_ref() == "a"));
    }

    #[test]
    fn server_entry_without_id_is_rejected_at_the_boundary() {
        let entries = vec![PlaylistEntry::unplaced("a")];
        let err = placed_pairs(&entries).unwrap_err();
        assert!(matches!(err, TransportError::CallFailure { .. }));
    }
}
