// ST&L Logistics
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Persisted credential storage
//!
//! Two opaque values are stored under fixed keys. The presence of the access
//! token is the only signal bootstrap looks at.

use crate::error::ClientResult;
use crate::models::TokenPair;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Key-value storage for credentials
pub trait TokenStore: Send + Sync {
    fn load(&self, key: &str) -> ClientResult<Option<String>>;
    fn save(&self, key: &str, value: &str) -> ClientResult<()>;
    fn remove(&self, key: &str) -> ClientResult<()>;

    fn access_token(&self) -> ClientResult<Option<String>> {
        self.load(ACCESS_TOKEN_KEY)
    }

    fn refresh_token(&self) -> ClientResult<Option<String>> {
        self.load(REFRESH_TOKEN_KEY)
    }

    /// Persist a token pair. A pair without a refresh token clears the old one.
    fn save_tokens(&self, tokens: &TokenPair) -> ClientResult<()> {
        self.save(ACCESS_TOKEN_KEY, &tokens.access_token)?;
        match &tokens.refresh_token {
            Some(refresh) => self.save(REFRESH_TOKEN_KEY, refresh),
            None => self.remove(REFRESH_TOKEN_KEY),
        }
    }

    fn clear_tokens(&self) -> ClientResult<()> {
        self.remove(ACCESS_TOKEN_KEY)?;
        self.remove(REFRESH_TOKEN_KEY)
    }
}

/// Process-local store, used by tests and the fixture data source
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> ClientResult<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        self.values.lock().remove(key);
        Ok(())
    }
}

/// JSON file store; the file is deleted once the last key is removed
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store at `<data_dir>/session.json`
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored values and whether the file was unreadable. A corrupt file reads
    /// as empty so the next write replaces it and the next removal deletes it.
    fn read_all(&self) -> ClientResult<(BTreeMap<String, String>, bool)> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok((BTreeMap::new(), false)),
            Ok(content) => match serde_json::from_str(&content) {
                Ok(values) => Ok((values, false)),
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "Ignoring corrupt token file");
                    Ok((BTreeMap::new(), true))
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok((BTreeMap::new(), false)),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> ClientResult<()> {
        if values.is_empty() {
            return remove_if_present(&self.path);
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        remove_if_present(&tmp)?;
        write_owner_only(&tmp, &serde_json::to_vec_pretty(values)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn remove_if_present(path: &Path) -> ClientResult<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}

/// Create a new file readable by the owner only
#[cfg(unix)]
fn write_owner_only(path: &Path, contents: &[u8]) -> ClientResult<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = std::fs::OpenOptions::new().write(true).create_new(true).mode(0o600).open(path)?;
    file.write_all(contents)?;
    file.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn write_owner_only(path: &Path, contents: &[u8]) -> ClientResult<()> {
    std::fs::write(path, contents)?;
    Ok(())
}

impl TokenStore for FileTokenStore {
    fn load(&self, key: &str) -> ClientResult<Option<String>> {
        let _guard = self.lock.lock();
        let (mut values, _) = self.read_all()?;
        Ok(values.remove(key))
    }

    fn save(&self, key: &str, value: &str) -> ClientResult<()> {
        let _guard = self.lock.lock();
        let (mut values, _) = self.read_all()?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        let _guard = self.lock.lock();
        let (mut values, corrupt) = self.read_all()?;
        if values.remove(key).is_none() && !corrupt {
            return Ok(());
        }
        self.write_all(&values)
    }
}
