//! File-backed shared store for tabs living in separate processes
//!
//! Each key is one JSON record under the store directory, replaced atomically
//! (write to a temp file, then rename). Subscribers poll their key files and
//! report a change when the record differs from the last one they saw. Several
//! writes between two polls collapse into the latest one.
//!
//! `get_item`, `set_item`, `remove_item` and the baseline read in `changes()`
//! are blocking `std::fs` calls on one small file and complete before they
//! return. The polling loop uses `tokio::fs`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use futures::stream::{self, BoxStream};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::ChannelError;
use super::store::{AreaId, StorageArea, StorageEvent};

/// What is persisted for one key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct FileRecord {
    key: String,
    writer: AreaId,
    #[serde(rename = "written-at")]
    written_at: i64,
    /// `None` marks a removed key
    value: Option<String>,
    previous: Option<String>,
}

/// Directory shared by every area opened on it
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    poll_interval: Duration,
}

impl FileStore {
    /// Open or create a store directory
    pub fn open(dir: impl AsRef<Path>, poll_interval: Duration) -> Result<Self, ChannelError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), ?poll_interval, "FileStore::open: opened");
        Ok(Self { dir, poll_interval })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Open a new area, i.e. a new tab's view of this store
    pub fn area(&self) -> FileArea {
        FileArea {
            id: AreaId::new(),
            store: self.clone(),
        }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", name))
    }

    fn read_record(path: &Path) -> Result<Option<FileRecord>, ChannelError> {
        match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content)
                .map(Some)
                .map_err(|e| ChannelError::Store(format!("corrupt record {}: {}", path.display(), e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_record(&self, key: &str, record: &FileRecord) -> Result<(), ChannelError> {
        let path = self.key_path(key);
        let tmp = self
            .dir
            .join(format!(".{}.{}.tmp", key_file_stem(&path), uuid::Uuid::now_v7()));
        let content = serde_json::to_string(record).map_err(|e| ChannelError::Store(e.to_string()))?;
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn write(&self, writer: &AreaId, key: &str, value: Option<&str>) -> Result<(), ChannelError> {
        let path = self.key_path(key);
        let previous = Self::read_record(&path).ok().flatten().and_then(|r| r.value);
        if previous.as_deref() == value {
            debug!(%key, "FileStore::write: unchanged, skipping");
            return Ok(());
        }

        let record = FileRecord {
            key: key.to_string(),
            writer: writer.clone(),
            written_at: chrono::Utc::now().timestamp_millis(),
            value: value.map(str::to_string),
            previous,
        };
        self.write_record(key, &record)
    }
}

fn key_file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// One tab's view of a [`FileStore`]
///
/// Reads and writes block the caller for one small file operation.
#[derive(Debug, Clone)]
pub struct FileArea {
    id: AreaId,
    store: FileStore,
}

struct PollState {
    dir: PathBuf,
    interval: Duration,
    own: AreaId,
    seen: HashMap<PathBuf, FileRecord>,
    queue: Vec<StorageEvent>,
}

impl PollState {
    /// Compare every key file against the last seen records
    async fn poll(&mut self) {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %self.dir.display(), error = %e, "FileArea::changes: cannot list store");
                return;
            }
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }
            let record = match tokio::fs::read_to_string(&path).await {
                Ok(content) => match serde_json::from_str::<FileRecord>(&content) {
                    Ok(record) => record,
                    Err(e) => {
                        debug!(path = %path.display(), error = %e, "FileArea::changes: skipping unreadable record");
                        continue;
                    }
                },
                Err(_) => continue,
            };

            if self.seen.get(&path) == Some(&record) {
                continue;
            }
            self.seen.insert(path, record.clone());

            if record.writer == self.own {
                continue;
            }
            self.queue.push(StorageEvent {
                key: record.key,
                old_value: record.previous,
                new_value: record.value,
                writer: record.writer,
            });
        }
    }
}

impl StorageArea for FileArea {
    fn area_id(&self) -> &AreaId {
        &self.id
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, ChannelError> {
        let record = FileStore::read_record(&self.store.key_path(key))?;
        Ok(record.and_then(|r| r.value))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), ChannelError> {
        debug!(area_id = %self.id, %key, "FileArea::set_item: called");
        self.store.write(&self.id, key, Some(value))
    }

    fn remove_item(&self, key: &str) -> Result<(), ChannelError> {
        debug!(area_id = %self.id, %key, "FileArea::remove_item: called");
        self.store.write(&self.id, key, None)
    }

    fn changes(&self) -> BoxStream<'static, StorageEvent> {
        // Baseline taken now so only later writes are reported
        let mut seen = HashMap::new();
        if let Ok(entries) = fs::read_dir(&self.store.dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if let Ok(Some(record)) = FileStore::read_record(&path) {
                    seen.insert(path, record);
                }
            }
        }
        debug!(area_id = %self.id, known = seen.len(), "FileArea::changes: subscribed");

        let state = PollState {
            dir: self.store.dir.clone(),
            interval: self.store.poll_interval,
            own: self.id.clone(),
            seen,
            queue: Vec::new(),
        };

        stream::unfold(state, |mut state| async move {
            loop {
                if !state.queue.is_empty() {
                    let event = state.queue.remove(0);
                    return Some((event, state));
                }
                tokio::time::sleep(state.interval).await;
                state.poll().await;
            }
        })
        .boxed()
    }
}
