// Copyright 2017 The Grin Developers
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

//! Public types for config modules.

use std::fmt;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use alpha_core::consensus::Network;
use alpha_util::LoggingConfig;

/// Error type wrapping config errors.
#[derive(Debug)]
pub enum ConfigError {
	/// Error with parsing of config file
	ParseError(String, String),
	/// Error with fileIO while reading config file
	FileIOError(String, String),
	/// No file found
	FileNotFoundError(String),
	/// Error serializing config values
	SerializationError(String),
}

impl fmt::Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			ConfigError::ParseError(ref file_name, ref message) => {
				write!(f, "Error parsing configuration file at {} - {}", file_name, message)
			}
			ConfigError::FileIOError(ref file_name, ref message) => write!(f, "{} {}", message, file_name),
			ConfigError::FileNotFoundError(ref file_name) => write!(f, "Configuration file not found: {}", file_name),
			ConfigError::SerializationError(ref message) => write!(f, "Error serializing configuration: {}", message),
		}
	}
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
	fn from(error: io::Error) -> ConfigError {
		ConfigError::FileIOError(String::new(), format!("Error loading config file: {}", error))
	}
}

/// Which of the three networks a node runs against.
/// A thin, serializable mirror of `alpha_core::consensus::Network`: the
/// core type carries no `serde` impl of its own (it is a pure in-memory
/// enum used by consensus code, not a wire or config type), so config
/// owns the TOML/CLI string mapping.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainType {
	Main,
	Test,
	Regtest,
}

impl ChainType {
	pub fn to_network(self) -> Network {
		match self {
			ChainType::Main => Network::Main,
			ChainType::Test => Network::Test,
			ChainType::Regtest => Network::Regtest,
		}
	}
}

impl std::str::FromStr for ChainType {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"main" | "mainnet" => Ok(ChainType::Main),
			"test" | "testnet" => Ok(ChainType::Test),
			"regtest" => Ok(ChainType::Regtest),
			other => Err(ConfigError::ParseError(
				"chain_type".to_string(),
				format!("unknown chain type '{}'", other),
			)),
		}
	}
}

/// P2P listener and connection-slot configuration. `seeds` are dialed first on an empty Address Manager, ahead of
/// organic `addr` gossip discovery.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct P2pConfig {
	/// Address and port this node listens for inbound connections on.
	pub listen_addr: String,
	/// Outbound connection target.
	pub max_outbound: usize,
	/// Inbound connection cap.
	pub max_inbound: usize,
	/// Fixed seed addresses dialed when the Address Manager has nothing
	/// else to offer.
	pub seeds: Vec<String>,
}

impl Default for P2pConfig {
	fn default() -> P2pConfig {
		P2pConfig {
			listen_addr: "0.0.0.0:8733".to_string(),
			// Mirrors alpha_sync::{DEFAULT_MAX_OUTBOUND, DEFAULT_MAX_INBOUND};
			// config does not depend on alpha_sync to avoid a layering cycle
			// (sync depends on chain, which depends on store/core).
			max_outbound: 8,
			max_inbound: 125,
			seeds: Vec::new(),
		}
	}
}

/// The JSON-RPC control surface listener.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcConfig {
	pub enabled: bool,
	pub listen_addr: String,
}

impl Default for RpcConfig {
	fn default() -> RpcConfig {
		RpcConfig {
			enabled: true,
			listen_addr: "127.0.0.1:8734".to_string(),
		}
	}
}

/// Everything the `node` binary needs to start, flattened into nested
/// sections so the on-disk TOML stays readable section-by-section.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
	pub chain_type: ChainType,
	/// Directory all persisted state (block index, address book, ban list)
	/// lives under.
	pub data_dir: PathBuf,
	pub p2p: P2pConfig,
	pub rpc: RpcConfig,
	#[serde(default)]
	pub logging: LoggingConfig,
}

impl Default for NodeConfig {
	fn default() -> NodeConfig {
		NodeConfig {
			chain_type: ChainType::Main,
			data_dir: default_data_dir(),
			p2p: P2pConfig::default(),
			rpc: RpcConfig::default(),
			logging: LoggingConfig::default(),
		}
	}
}

/// Where a node's state lives absent any `--data-dir` override: `~/.alpha`.
pub fn default_data_dir() -> PathBuf {
	dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".alpha")
}

/// Top-level config container, tracking whether values came from a file on
/// disk or from built-in defaults.
#[derive(Debug)]
pub struct GlobalConfig {
	pub config_file_path: Option<PathBuf>,
	pub using_config_file: bool,
	pub members: NodeConfig,
}
