// Copyright 2016 The Grin Developers
// Copyright 2026 Alpha Developers
//
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

//! Configuration file loading, defaulting and persistence.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::comments::insert_comments;
use crate::types::{ConfigError, GlobalConfig, NodeConfig};

/// Name of the config file generated in the data directory.
pub const CONFIG_FILE_NAME: &str = "alpha-node.toml";

impl Default for GlobalConfig {
	fn default() -> GlobalConfig {
		GlobalConfig {
			config_file_path: None,
			using_config_file: false,
			members: NodeConfig::default(),
		}
	}
}

impl GlobalConfig {
	/// Looks for a config file at `path`. Returns defaults, untouched, if
	/// nothing exists there yet.
	pub fn new(path: Option<&Path>) -> Result<GlobalConfig, ConfigError> {
		let mut global = GlobalConfig::default();
		if let Some(path) = path {
			if !path.exists() {
				return Ok(global);
			}
			global.read_from_file(path)?;
			global.config_file_path = Some(path.to_path_buf());
			global.using_config_file = true;
		}
		Ok(global)
	}

	fn read_from_file(&mut self, path: &Path) -> Result<(), ConfigError> {
		let mut file =
			File::open(path).map_err(|e| ConfigError::FileIOError(path.to_string_lossy().to_string(), e.to_string()))?;
		let mut contents = String::new();
		file.read_to_string(&mut contents)
			.map_err(|e| ConfigError::FileIOError(path.to_string_lossy().to_string(), e.to_string()))?;
		self.members = toml::from_str(&contents)
			.map_err(|e| ConfigError::ParseError(path.to_string_lossy().to_string(), e.to_string()))?;
		Ok(())
	}

	/// Serializes the current config to TOML, with explanatory comments
	/// injected for a human reading the generated file.
	pub fn ser_config(&self) -> Result<String, ConfigError> {
		let toml_str = toml::to_string(&self.members).map_err(|e| ConfigError::SerializationError(e.to_string()))?;
		Ok(insert_comments(toml_str))
	}

	/// Writes the current config out to `path`, creating parent directories
	/// as needed.
	pub fn write_to_file(&self, path: &Path) -> Result<(), ConfigError> {
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)
				.map_err(|e| ConfigError::FileIOError(parent.to_string_lossy().to_string(), e.to_string()))?;
		}
		let conf_out = self.ser_config()?;
		let mut file =
			File::create(path).map_err(|e| ConfigError::FileIOError(path.to_string_lossy().to_string(), e.to_string()))?;
		file.write_all(conf_out.as_bytes())
			.map_err(|e| ConfigError::FileIOError(path.to_string_lossy().to_string(), e.to_string()))?;
		Ok(())
	}

	/// Default config file location: `<data_dir>/alpha-node.toml`.
	pub fn default_config_path(data_dir: &Path) -> PathBuf {
		data_dir.join(CONFIG_FILE_NAME)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::ChainType;

	#[test]
	fn defaults_round_trip_through_toml() {
		let global = GlobalConfig::default();
		let toml_str = toml::to_string(&global.members).unwrap();
		let reloaded: NodeConfig = toml::from_str(&toml_str).unwrap();
		assert_eq!(reloaded.chain_type, ChainType::Main);
		assert_eq!(reloaded.p2p.max_outbound, global.members.p2p.max_outbound);
	}

	#[test]
	fn missing_file_falls_back_to_defaults() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("does-not-exist.toml");
		let global = GlobalConfig::new(Some(&path)).unwrap();
		assert!(!global.using_config_file);
		assert_eq!(global.members.chain_type, ChainType::Main);
	}

	#[test]
	fn write_then_read_preserves_values() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("alpha-node.toml");
		let mut global = GlobalConfig::default();
		global.members.chain_type = ChainType::Test;
		global.members.p2p.max_outbound = 4;
		global.write_to_file(&path).unwrap();

		let reloaded = GlobalConfig::new(Some(&path)).unwrap();
		assert!(reloaded.using_config_file);
		assert_eq!(reloaded.members.chain_type, ChainType::Test);
		assert_eq!(reloaded.members.p2p.max_outbound, 4);
	}

	#[test]
	fn serialized_config_carries_comments() {
		let global = GlobalConfig::default();
		let s = global.ser_config().unwrap();
		assert!(s.contains("P2P server configuration"));
	}
}
