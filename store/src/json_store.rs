// Copyright 2026 Alpha Developers
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A small, crash-safe on-disk store for state that fits comfortably in
//! memory: the block index snapshot, the address book, and the ban list.
//! Persistence is deliberately simple: the exact on-disk format is left
//! open as long as replacement is atomic, so this is JSON over
//! `alpha_util::file::write_atomic` rather than a RocksDB/LMDB-backed
//! store sized for a transaction/UTXO set this design doesn't have.

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

/// Errors from loading or saving a `JsonStore`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
	#[error("json error: {0}")]
	Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A named on-disk slot for one serializable value, written atomically.
pub struct JsonStore {
	path: PathBuf,
}

impl JsonStore {
	pub fn new<P: Into<PathBuf>>(path: P) -> JsonStore {
		JsonStore { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Loads the stored value, returning `Ok(None)` if no file exists yet
	/// (e.g. first run).
	pub fn load<T: DeserializeOwned>(&self) -> Result<Option<T>> {
		if !self.path.exists() {
			return Ok(None);
		}
		let bytes = std::fs::read(&self.path)?;
		Ok(Some(serde_json::from_slice(&bytes)?))
	}

	/// Serializes and atomically replaces the stored value: written to a
	/// temp file alongside the target, `fsync`'d, then renamed into place
	/// (`alpha_util::file::write_atomic`), so a crash mid-write never leaves
	/// a torn file behind.
	pub fn save<T: Serialize>(&self, value: &T) -> Result<()> {
		let bytes = serde_json::to_vec_pretty(value)?;
		alpha_util::file::write_atomic(&self.path, &bytes)?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde::Deserialize;

	#[derive(Serialize, Deserialize, PartialEq, Debug)]
	struct Sample {
		height: u64,
		label: String,
	}

	#[test]
	fn missing_file_loads_as_none() {
		let dir = tempfile::tempdir().unwrap();
		let store = JsonStore::new(dir.path().join("missing.json"));
		assert_eq!(store.load::<Sample>().unwrap(), None);
	}

	#[test]
	fn save_then_load_round_trips() {
		let dir = tempfile::tempdir().unwrap();
		let store = JsonStore::new(dir.path().join("state.json"));
		let value = Sample { height: 9, label: "tip".into() };
		store.save(&value).unwrap();
		assert_eq!(store.load::<Sample>().unwrap(), Some(value));
	}

	#[test]
	fn save_overwrites_previous_value() {
		let dir = tempfile::tempdir().unwrap();
		let store = JsonStore::new(dir.path().join("state.json"));
		store.save(&Sample { height: 1, label: "a".into() }).unwrap();
		store.save(&Sample { height: 2, label: "b".into() }).unwrap();
		assert_eq!(
			store.load::<Sample>().unwrap(),
			Some(Sample { height: 2, label: "b".into() })
		);
	}
}
