//! LMDB-backed persistent tier.
//!
//! Uses the heed crate (Rust bindings for LMDB) for a memory-mapped,
//! crash-safe key-value file. The environment's map size is the quota: once
//! LMDB reports the map as full, writes fail with
//! [`StorageError::QuotaExceeded`].

use std::path::{Path, PathBuf};

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions, MdbError};
use lifeline_core::StorageError;

use super::KeyValueStore;

/// LMDB environment holding a single unnamed database.
pub struct LmdbKeyValueStore {
    env: Env,
    db: Database<Bytes, Bytes>,
    path: PathBuf,
}

impl LmdbKeyValueStore {
    /// Open (or create) an LMDB environment in `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory where LMDB files will be stored
    /// * `max_size_mb` - Map size in megabytes; writes past it hit the quota
    pub fn open<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&path).map_err(|e| StorageError::Backend {
            reason: format!("failed to create {}: {}", path.as_ref().display(), e),
        })?;

        // SAFETY: the environment is opened once per directory by this process.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(max_size_mb.saturating_mul(1024 * 1024))
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(backend)?;

        let mut wtxn = env.write_txn().map_err(backend)?;
        let db: Database<Bytes, Bytes> = env.create_database(&mut wtxn, None).map_err(backend)?;
        wtxn.commit().map_err(backend)?;

        Ok(Self {
            env,
            db,
            path: path.as_ref().to_path_buf(),
        })
    }
}

fn backend(e: heed::Error) -> StorageError {
    StorageError::Backend {
        reason: e.to_string(),
    }
}

fn write_error(key: &str, e: heed::Error) -> StorageError {
    match e {
        heed::Error::Mdb(MdbError::MapFull) => StorageError::QuotaExceeded {
            key: key.to_string(),
        },
        other => backend(other),
    }
}

impl KeyValueStore for LmdbKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let rtxn = self.env.read_txn().map_err(backend)?;
        let value = self
            .db
            .get(&rtxn, key.as_bytes())
            .map_err(backend)?
            .map(|bytes| bytes.to_vec());
        Ok(value)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let mut wtxn = self.env.write_txn().map_err(backend)?;
        self.db
            .put(&mut wtxn, key.as_bytes(), value)
            .map_err(|e| write_error(key, e))?;
        wtxn.commit().map_err(|e| write_error(key, e))
    }

    fn delete(&self, key: &str) -> Result<bool, StorageError> {
        let mut wtxn = self.env.write_txn().map_err(backend)?;
        let existed = self.db.delete(&mut wtxn, key.as_bytes()).map_err(backend)?;
        wtxn.commit().map_err(backend)?;
        Ok(existed)
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let rtxn = self.env.read_txn().map_err(backend)?;
        let prefix = prefix.as_bytes();

        let mut keys = Vec::new();
        for result in self.db.iter(&rtxn).map_err(backend)? {
            let (key, _) = result.map_err(backend)?;
            if key.starts_with(prefix) {
                if let Ok(key) = std::str::from_utf8(key) {
                    keys.push(key.to_string());
                }
            }
        }
        Ok(keys)
    }
}

impl std::fmt::Debug for LmdbKeyValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LmdbKeyValueStore")
            .field("path", &self.path)
            .finish()
    }
}
