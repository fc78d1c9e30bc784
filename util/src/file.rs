// Copyright 2018 The Grin Developers
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

//! Filesystem helpers, including the atomic-write primitive persisted state
//! (block index, address book, ban list) relies on to survive a crash
//! mid-write.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Writes `bytes` to `path` atomically: write to a sibling temp file, fsync
/// it, then rename over the destination. A crash at any point before the
/// rename leaves the previous `path` (if any) untouched.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
	let tmp_path = tmp_path_for(path);
	{
		let mut f = File::create(&tmp_path)?;
		f.write_all(bytes)?;
		f.sync_all()?;
	}
	fs::rename(&tmp_path, path)?;
	if let Some(dir) = path.parent() {
		// Best-effort: fsync the containing directory so the rename itself is
		// durable, not just the file contents. Not all platforms support
		// fsync-ing a directory handle; ignore failures.
		if let Ok(dir_file) = File::open(dir) {
			let _ = dir_file.sync_all();
		}
	}
	Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
	let mut tmp = path.as_os_str().to_owned();
	tmp.push(".tmp");
	PathBuf::from(tmp)
}

/// Deletes a directory or file, tolerating a path that doesn't exist.
pub fn delete(path_buf: PathBuf) -> io::Result<()> {
	if path_buf.is_dir() {
		fs::remove_dir_all(path_buf)
	} else if path_buf.is_file() {
		fs::remove_file(path_buf)
	} else {
		Ok(())
	}
}

/// Lists every file under `path`, recursively.
pub fn list_files(path: &Path) -> Vec<PathBuf> {
	WalkDir::new(path)
		.into_iter()
		.filter_map(|e| e.ok())
		.filter(|e| e.file_type().is_file())
		.map(|e| e.path().to_path_buf())
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::tempdir;

	#[test]
	fn atomic_write_round_trips() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("state.bin");
		write_atomic(&path, b"hello").unwrap();
		assert_eq!(fs::read(&path).unwrap(), b"hello");

		// overwrite
		write_atomic(&path, b"world!!").unwrap();
		assert_eq!(fs::read(&path).unwrap(), b"world!!");

		// no leftover temp file
		assert!(!tmp_path_for(&path).exists());
	}
}
