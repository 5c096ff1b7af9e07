use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

pub fn elo_key(season: i32) -> String {
    format!("elo_{season}")
}

pub fn predictions_key(season: i32) -> String {
    format!("predictions_{season}")
}

pub fn results_key(season: i32) -> String {
    format!("results_{season}")
}

/// Key-value persistence of whole JSON snapshots. Every call is
/// all-or-nothing: a reader never observes a half-written value.
pub trait StateStore {
    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>>;

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()>;

    /// Load (or start from `default`), transform, persist, and return the
    /// stored value.
    fn update<T, F>(&self, key: &str, default: T, transform: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(T) -> T,
    {
        let current = self.load(key)?.unwrap_or(default);
        let next = transform(current);
        self.save(key, &next)?;
        Ok(next)
    }
}

/// One `<key>.json` file per key, written through a temp file and a rename.
/// The previous version is kept as `<key>.json.bak`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(anyhow!("invalid store key `{key}`"));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    fn backup_path(path: &Path) -> PathBuf {
        path.with_extension("json.bak")
    }

    /// Restore the previous version of `key`. Returns `false` when there is
    /// no backup to restore.
    pub fn rollback(&self, key: &str) -> Result<bool> {
        let path = self.path(key)?;
        let backup = Self::backup_path(&path);
        if !backup.exists() {
            return Ok(false);
        }
        fs::rename(&backup, &path).with_context(|| format!("restore backup for {key}"))?;
        Ok(true)
    }

    fn read<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err).with_context(|| format!("read {}", path.display())),
        };
        let value = serde_json::from_str::<T>(&raw)
            .with_context(|| format!("parse {}", path.display()))?;
        Ok(Some(value))
    }
}

impl StateStore for JsonFileStore {
    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.path(key)?;
        let primary_err = match Self::read(&path) {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        warn!(%key, error = %primary_err, "snapshot unreadable, trying backup");
        // Only a readable backup stands in for a corrupt primary; anything
        // else surfaces the primary's error rather than reporting "absent".
        match Self::read(&Self::backup_path(&path)) {
            Ok(Some(value)) => Ok(Some(value)),
            Ok(None) => Err(primary_err.context(format!("load {key} (no backup)"))),
            Err(backup_err) => {
                warn!(%key, error = %backup_err, "backup unreadable too");
                Err(primary_err.context(format!("load {key} (backup unreadable)")))
            }
        }
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let path = self.path(key)?;
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create store dir {}", self.dir.display()))?;
        let json = serde_json::to_string_pretty(value).with_context(|| format!("serialize {key}"))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("write {key}"))?;
        if path.exists() {
            fs::copy(&path, Self::backup_path(&path)).with_context(|| format!("backup {key}"))?;
        }
        fs::rename(&tmp, &path).with_context(|| format!("swap {key}"))?;
        Ok(())
    }
}
