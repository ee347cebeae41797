//! Pure diffing of a playlist's server state against a desired state.
//!
//! Both lists are treated as multisets of `(song_id, entry_id)` pairs for
//! membership, with order handled separately by the orchestrator's reorder
//! step. Duplicate songs are matched by count: if the server holds a song
//! twice and the desired list once, exactly one copy is deleted.

use gmusic_core::models::{EntryId, PlaylistEntry, SongId};
use std::collections::HashMap;

/// The three multisets produced by [`compute_changes`].
///
/// `to_delete` and `to_keep` partition the server list; `to_add` and
/// `to_keep` together cover the desired list's song multiset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Server entries with no counterpart in the desired list.
    pub to_delete: Vec<(SongId, EntryId)>,
    /// Desired song occurrences in excess of the server's stock, in desired
    /// order. No entry id yet; the server assigns one on insertion.
    pub to_add: Vec<SongId>,
    /// Server entries that survive; their entry ids are reused rather than
    /// deleted and re-added.
    pub to_keep: Vec<(SongId, EntryId)>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.to_add.is_empty()
    }
}

/// Computes the minimal delete/add/keep partition.
///
/// Deterministic: exact `(song_id, entry_id)` pairs are paired off first in
/// server order; remaining server occurrences of a song are kept
/// first-seen-first up to the desired count, and later duplicates are
/// deleted. No remote calls.
pub fn compute_changes(server: &[(SongId, EntryId)], desired: &[PlaylistEntry]) -> ChangeSet {
    // Desired (song_id, entry_id) pairs available for exact matching.
    let mut desired_pairs: HashMap<(&str, &str), usize> = HashMap::new();
    let mut desired_counts: HashMap<&str, usize> = HashMap::new();
    for entry in desired {
        if let Some(entry_id) = &entry.entry_id {
            *desired_pairs
                .entry((entry.song_id.as_ref(), entry_id.as_ref()))
                .or_insert(0) += 1;
        }
        *desired_counts.entry(entry.song_id.as_ref()).or_insert(0) += 1;
    }

    let mut to_keep: Vec<(SongId, EntryId)> = Vec::new();
    let mut unmatched: Vec<&(SongId, EntryId)> = Vec::new();
    for pair in server {
        let key = (pair.0.as_ref(), pair.1.as_ref());
        match desired_pairs.get_mut(&key) {
            Some(available) if *available > 0 => {
                *available -= 1;
                to_keep.push(pair.clone());
            }
            _ => unmatched.push(pair),
        }
    }

    // Budget per song: desired occurrences not yet satisfied by a pair match.
    let mut keep_budget: HashMap<&str, usize> = desired_counts.clone();
    for (song_id, _) in &to_keep {
        if let Some(budget) = keep_budget.get_mut(song_id.as_ref()) {
            *budget = budget.saturating_sub(1);
        }
    }

    let mut to_delete: Vec<(SongId, EntryId)> = Vec::new();
    for pair in unmatched {
        match keep_budget.get_mut(pair.0.as_ref()) {
            Some(budget) if *budget > 0 => {
                *budget -= 1;
                to_keep.push(pair.clone());
            }
            _ => to_delete.push(pair.clone()),
        }
    }

    // Desired occurrences beyond the server's stock of that song.
    let mut server_counts: HashMap<&str, usize> = HashMap::new();
    for (song_id, _) in server {
        *server_counts.entry(song_id.as_ref()).or_insert(0) += 1;
    }
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut to_add: Vec<SongId> = Vec::new();
    for entry in desired {
        let song = entry.song_id.as_ref();
        let occurrence = seen.entry(song).or_insert(0);
        if *occurrence >= server_counts.get(song).copied().unwrap_or(0) {
            to_add.push(entry.song_id.clone());
        }
        *occurrence += 1;
    }

    ChangeSet {
        to_delete,
        to_add,
        to_keep,
    }
}
