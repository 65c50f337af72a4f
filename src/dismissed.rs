//! Panel-local record of hidden notifications.
//!
//! The [`DismissalTracker`] remembers which notification ids the user has
//! hidden from the hub, independently of the notification daemon's own
//! history, and keeps that set in a small JSON cache file so it survives
//! restarts.
//!
//! The cache is best effort.  Every public operation is total: a missing or
//! corrupt file loads as an empty set, and a failed write leaves the
//! in-memory set authoritative for the rest of the session.
//!
//! # File format
//!
//! A single JSON array of ids, oldest first:
//!
//! ```json
//! [17, 18, 23]
//! ```

use crate::notification::NotificationRecord;
use crate::traits::NotificationDaemon;
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Number of most recently dismissed ids written to the cache file.
pub const PERSIST_CAP: usize = 400;

/// Errors from reading or writing the cache file.
///
/// Never escapes the tracker; see the module docs.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cache content is not a JSON array")]
    NotAnArray,
}

/// Insertion-ordered set of dismissed notification ids, backed by a file.
#[derive(Debug)]
pub struct DismissalTracker {
    path: PathBuf,
    /// Ids in the order they were first dismissed.
    order: Vec<u64>,
    members: HashSet<u64>,
}

impl DismissalTracker {
    /// Create an empty tracker that persists to `path`, without reading it.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            order: Vec::new(),
            members: HashSet::new(),
        }
    }

    /// Load the tracker from the cache file at `path`.
    ///
    /// A missing, unreadable, or undecodable file yields an empty tracker.
    /// Array entries that are not non-negative integers are discarded.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let mut tracker = Self::new(path);
        match read_ids(&tracker.path) {
            Ok(ids) => {
                for id in ids {
                    tracker.insert(id);
                }
                info!(
                    "loaded {} dismissed id(s) from {}",
                    tracker.len(),
                    tracker.path.display()
                );
            }
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no dismissal cache at {}", tracker.path.display());
            }
            Err(e) => {
                warn!(
                    "ignoring dismissal cache {}: {}",
                    tracker.path.display(),
                    e
                );
            }
        }
        tracker
    }

    /// Path of the backing cache file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.members.contains(&id)
    }

    /// Dismissed ids, oldest first.
    pub fn ids(&self) -> &[u64] {
        &self.order
    }

    /// The first `max_visible` records whose id has not been dismissed,
    /// in their original order.
    pub fn filter_visible(
        &self,
        records: &[NotificationRecord],
        max_visible: usize,
    ) -> Vec<NotificationRecord> {
        records
            .iter()
            .filter(|r| !self.contains(r.id))
            .take(max_visible)
            .cloned()
            .collect()
    }

    /// Hide every record in `visible` and persist.
    ///
    /// `visible` is the list the panel is currently showing; notifications
    /// that arrived since are not affected.  The daemon is not contacted.
    pub fn dismiss_all(&mut self, visible: &[NotificationRecord]) {
        let added = visible.iter().filter(|r| self.insert(r.id)).count();
        debug!("dismissed {} of {} visible notification(s)", added, visible.len());
        self.persist();
    }

    /// Dismiss `id` in the daemon and hide it from the panel, then persist.
    ///
    /// The daemon request is fire-and-forget: whether or not it succeeds,
    /// the id is hidden here.
    pub fn dismiss_one<D: NotificationDaemon>(&mut self, id: u64, daemon: &D) {
        if let Err(e) = daemon.dismiss(id) {
            debug!("daemon dismiss of {} failed (ignored): {}", id, e);
        }
        self.insert(id);
        self.persist();
    }

    /// Write the most recent [`PERSIST_CAP`] ids to the cache file.
    ///
    /// Failures are logged and otherwise ignored.
    pub fn persist(&self) {
        if let Err(e) = self.try_persist() {
            warn!(
                "failed to write dismissal cache {}: {}",
                self.path.display(),
                e
            );
        }
    }

    /// Add `id`, returning `true` if it was not already present.
    fn insert(&mut self, id: u64) -> bool {
        if self.members.insert(id) {
            self.order.push(id);
            true
        } else {
            false
        }
    }

    fn try_persist(&self) -> Result<(), StoreError> {
        let start = self.order.len().saturating_sub(PERSIST_CAP);
        let payload = serde_json::to_string(&self.order[start..])?;

        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        // Write next to the target and rename over it so a crash mid-write
        // leaves the previous file intact.
        let tmp = tmp_path(&self.path);
        let result = write_synced(&tmp, payload.as_bytes())
            .and_then(|()| std::fs::rename(&tmp, &self.path));
        if let Err(e) = result {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

/// Write `bytes` to a fresh file at `path` and flush it to disk.
fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "dismissed".into());
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}

fn read_ids(path: &Path) -> Result<Vec<u64>, StoreError> {
    let contents = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&contents)?;
    let Value::Array(items) = value else {
        return Err(StoreError::NotAnArray);
    };
    Ok(items.iter().filter_map(id_from_value).collect())
}

/// Accept unsigned integers and integral non-negative floats (`7.0`).
fn id_from_value(v: &Value) -> Option<u64> {
    if let Some(n) = v.as_u64() {
        return Some(n);
    }
    let f = v.as_f64()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}
