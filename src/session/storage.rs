//! Pluggable persistence for the session snapshot.
//!
//! The store persists through a narrow key/value seam so hosts can back it
//! with whatever their platform offers (browser local storage, a config
//! directory, a test double). Mutations are synchronous by contract, so the
//! file implementation uses blocking filesystem calls.

use crate::error::WalletError;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::warn;

/// Key/value persistence used by the session store. Absence of a key means
/// "no prior session"; implementations must never fabricate content.
pub trait SessionStorage: Send + Sync {
	fn get(&self, key: &str) -> Result<Option<String>, WalletError>;
	fn set(&self, key: &str, value: &str) -> Result<(), WalletError>;
	fn remove(&self, key: &str) -> Result<(), WalletError>;
}

/// In-memory storage, for tests and hosts without persistence.
#[derive(Default)]
pub struct MemoryStorage {
	entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
	pub fn new() -> Self {
		Self::default()
	}
}

impl SessionStorage for MemoryStorage {
	fn get(&self, key: &str) -> Result<Option<String>, WalletError> {
		Ok(self.entries.lock().unwrap().get(key).cloned())
	}

	fn set(&self, key: &str, value: &str) -> Result<(), WalletError> {
		self.entries.lock().unwrap().insert(key.to_string(), value.to_string());
		Ok(())
	}

	fn remove(&self, key: &str) -> Result<(), WalletError> {
		self.entries.lock().unwrap().remove(key);
		Ok(())
	}
}

/// File-backed storage keeping one file per key under a data directory.
pub struct FileStorage {
	data_dir: PathBuf,
}

impl FileStorage {
	pub fn new(data_dir: PathBuf) -> Self {
		Self { data_dir }
	}

	fn path_for(&self, key: &str) -> PathBuf {
		// Keys contain a namespace separator that is not filename-safe.
		self.data_dir.join(format!("{}.json", key.replace(':', "_")))
	}
}

impl SessionStorage for FileStorage {
	fn get(&self, key: &str) -> Result<Option<String>, WalletError> {
		let path = self.path_for(key);
		if !path.exists() {
			return Ok(None);
		}
		match std::fs::read_to_string(&path) {
			Ok(content) => Ok(Some(content)),
			Err(e) => {
				// An unreadable file is treated like an absent one.
				warn!("failed to read session file {:?}: {}", path, e);
				Ok(None)
			}
		}
	}

	fn set(&self, key: &str, value: &str) -> Result<(), WalletError> {
		std::fs::create_dir_all(&self.data_dir)
			.map_err(|e| WalletError::Storage(format!("failed to create data dir: {}", e)))?;
		let path = self.path_for(key);
		std::fs::write(&path, value)
			.map_err(|e| WalletError::Storage(format!("failed to write session file {:?}: {}", path, e)))
	}

	fn remove(&self, key: &str) -> Result<(), WalletError> {
		let path = self.path_for(key);
		if path.exists() {
			std::fs::remove_file(&path)
				.map_err(|e| WalletError::Storage(format!("failed to remove session file {:?}: {}", path, e)))?;
		}
		Ok(())
	}
}
