//! Incremental processing state.
//!
//! Tracks which email message IDs have already been processed so reruns can
//! skip them. Two files back this:
//!
//! - the **state file**: append-only union of everything ever processed,
//!   updated only when a batch completes cleanly;
//! - the **checkpoint file**: snapshot of the current run's progress,
//!   overwritten at a configurable cadence and deleted on clean completion.
//!   Its presence on startup signals an interrupted run.
//!
//! Both are plain text, one ID per line, UTF-8, sorted ascending. Writes go
//! through the temp-file-then-rename pattern so a crash mid-write never
//! corrupts the persisted set. State loss is non-fatal: every operation here
//! degrades to an empty set or a no-op with a logged warning, never an error
//! to the caller.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::utils::fs::write_atomic;

/// Checkpoint file name inside the state directory.
const CHECKPOINT_FILE: &str = "checkpoint.txt";

/// Load already processed message IDs from the state file.
///
/// Returns an empty set when the file is absent or unreadable.
pub fn load_processed_ids(state_file: &Path) -> BTreeSet<String> {
    if !state_file.exists() {
        log::info!("No existing state file at {}", state_file.display());
        return BTreeSet::new();
    }

    match fs::read_to_string(state_file) {
        Ok(content) => {
            let ids = parse_id_lines(&content);
            log::info!(
                "Loaded {} processed message IDs from {}",
                ids.len(),
                state_file.display()
            );
            ids
        }
        Err(e) => {
            log::warn!(
                "Failed to load state file {}: {}",
                state_file.display(),
                e
            );
            BTreeSet::new()
        }
    }
}

/// Union new IDs into the persisted set and write it back atomically.
///
/// Persistence failure is logged, not raised: losing state must not abort
/// the batch that produced it.
pub fn save_processed_ids(state_file: &Path, new_ids: &BTreeSet<String>) {
    let mut merged = load_processed_ids(state_file);
    merged.extend(new_ids.iter().cloned());

    match write_atomic(state_file, render_id_lines(&merged).as_bytes()) {
        Ok(()) => log::info!(
            "Saved {} total processed IDs to state ({} new)",
            merged.len(),
            new_ids.len()
        ),
        Err(e) => log::error!(
            "Failed to save state file {}: {}",
            state_file.display(),
            e
        ),
    }
}

/// Path of the checkpoint file for a state directory.
pub fn checkpoint_path(state_dir: &Path) -> PathBuf {
    state_dir.join(CHECKPOINT_FILE)
}

/// Overwrite the checkpoint with exactly the given set.
pub fn save_checkpoint(state_dir: &Path, ids: &BTreeSet<String>) {
    let path = checkpoint_path(state_dir);

    match write_atomic(&path, render_id_lines(ids).as_bytes()) {
        Ok(()) => log::debug!("Checkpoint saved: {} IDs", ids.len()),
        Err(e) => log::warn!("Failed to save checkpoint: {}", e),
    }
}

/// Load the checkpoint from an interrupted run, empty set if none.
pub fn load_checkpoint(state_dir: &Path) -> BTreeSet<String> {
    let path = checkpoint_path(state_dir);
    if !path.exists() {
        return BTreeSet::new();
    }

    match fs::read_to_string(&path) {
        Ok(content) => {
            let ids = parse_id_lines(&content);
            log::info!("Loaded checkpoint: {} IDs", ids.len());
            ids
        }
        Err(e) => {
            log::warn!("Failed to load checkpoint: {}", e);
            BTreeSet::new()
        }
    }
}

/// Delete the checkpoint after a batch completes its full scope.
pub fn clear_checkpoint(state_dir: &Path) {
    let path = checkpoint_path(state_dir);
    if path.exists() {
        match fs::remove_file(&path) {
            Ok(()) => log::debug!("Checkpoint cleared"),
            Err(e) => log::warn!("Failed to clear checkpoint: {}", e),
        }
    }
}

/// Explicit reset: delete both the state file and the checkpoint.
pub fn reset(state_dir: &Path, state_file: &Path) {
    if state_file.exists() {
        match fs::remove_file(state_file) {
            Ok(()) => log::info!("State file removed: {}", state_file.display()),
            Err(e) => log::warn!(
                "Failed to remove state file {}: {}",
                state_file.display(),
                e
            ),
        }
    }
    clear_checkpoint(state_dir);
}

fn parse_id_lines(content: &str) -> BTreeSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

fn render_id_lines(ids: &BTreeSet<String>) -> String {
    // BTreeSet iteration is already sorted ascending
    let mut out = String::new();
    for id in ids {
        out.push_str(id);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn load_missing_file_returns_empty_set() {
        let tmp = TempDir::new().unwrap();
        let ids = load_processed_ids(&tmp.path().join("state.txt"));
        assert!(ids.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.txt");

        save_processed_ids(&path, &set(&["msg-2", "msg-1", "msg-3"]));
        assert_eq!(load_processed_ids(&path), set(&["msg-1", "msg-2", "msg-3"]));
    }

    #[test]
    fn save_unions_with_existing_ids() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.txt");

        save_processed_ids(&path, &set(&["a", "c"]));
        save_processed_ids(&path, &set(&["b"]));

        assert_eq!(load_processed_ids(&path), set(&["a", "b", "c"]));
        // Persisted lines are sorted ascending
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb\nc\n");
    }

    #[test]
    fn save_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.txt");

        save_processed_ids(&path, &set(&["x", "y"]));
        save_processed_ids(&path, &set(&["x", "y"]));

        assert_eq!(load_processed_ids(&path), set(&["x", "y"]));
    }

    #[test]
    fn save_creates_missing_parent_directory() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/state.txt");

        save_processed_ids(&path, &set(&["a"]));
        assert_eq!(load_processed_ids(&path), set(&["a"]));
    }

    #[test]
    fn stray_temp_file_never_corrupts_live_state() {
        // Simulates a crash between temp-write and rename: the leftover
        // .tmp file must not affect what load returns.
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.txt");

        save_processed_ids(&path, &set(&["a", "b"]));
        fs::write(path.with_extension("tmp"), "partial garb").unwrap();

        assert_eq!(load_processed_ids(&path), set(&["a", "b"]));

        // A subsequent save still lands cleanly
        save_processed_ids(&path, &set(&["c"]));
        assert_eq!(load_processed_ids(&path), set(&["a", "b", "c"]));
    }

    #[test]
    fn checkpoint_overwrites_instead_of_unioning() {
        let tmp = TempDir::new().unwrap();

        save_checkpoint(tmp.path(), &set(&["a", "b"]));
        save_checkpoint(tmp.path(), &set(&["c"]));

        assert_eq!(load_checkpoint(tmp.path()), set(&["c"]));
    }

    #[test]
    fn checkpoint_clear_leaves_empty_set() {
        let tmp = TempDir::new().unwrap();

        save_checkpoint(tmp.path(), &set(&["a"]));
        assert!(!load_checkpoint(tmp.path()).is_empty());

        clear_checkpoint(tmp.path());
        assert!(load_checkpoint(tmp.path()).is_empty());
        // Clearing twice is a no-op
        clear_checkpoint(tmp.path());
    }

    #[test]
    fn checkpoint_missing_returns_empty_set() {
        let tmp = TempDir::new().unwrap();
        assert!(load_checkpoint(tmp.path()).is_empty());
    }

    #[test]
    fn reset_removes_state_and_checkpoint() {
        let tmp = TempDir::new().unwrap();
        let state_file = tmp.path().join("state.txt");

        save_processed_ids(&state_file, &set(&["a"]));
        save_checkpoint(tmp.path(), &set(&["a"]));

        reset(tmp.path(), &state_file);
        assert!(load_processed_ids(&state_file).is_empty());
        assert!(load_checkpoint(tmp.path()).is_empty());
    }

    #[test]
    fn blank_lines_are_ignored_on_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.txt");
        fs::write(&path, "a\n\n  \nb\n").unwrap();

        assert_eq!(load_processed_ids(&path), set(&["a", "b"]));
    }
}
