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

//! Annotates a freshly serialized TOML config with explanatory comments,
//! so a node operator generating a default config file gets documentation
//! inline instead of having to cross-reference source.

use std::collections::HashMap;

fn comments() -> HashMap<String, String> {
	let mut retval = HashMap::new();
	retval.insert(
		"chain_type".to_string(),
		"# Which network to connect to: \"main\", \"test\" or \"regtest\".".to_string(),
	);
	retval.insert(
		"data_dir".to_string(),
		"\n# Directory to store the block index, address book and ban list in.".to_string(),
	);
	retval.insert(
		"[p2p]".to_string(),
		"\n#########################################\n\
		 # P2P server configuration\n\
		 #########################################"
			.to_string(),
	);
	retval.insert(
		"listen_addr".to_string(),
		"# Address and port to listen for inbound peer connections on.".to_string(),
	);
	retval.insert(
		"max_outbound".to_string(),
		"\n# Number of outbound peer connections to maintain.".to_string(),
	);
	retval.insert(
		"max_inbound".to_string(),
		"\n# Maximum number of inbound peer connections to accept.".to_string(),
	);
	retval.insert(
		"seeds".to_string(),
		"\n# Fixed seed addresses, dialed when the address book is empty.".to_string(),
	);
	retval.insert(
		"[rpc]".to_string(),
		"\n#########################################\n\
		 # JSON-RPC server configuration\n\
		 #########################################"
			.to_string(),
	);
	retval.insert("enabled".to_string(), "# Whether to start the JSON-RPC server.".to_string());
	retval.insert(
		"[logging]".to_string(),
		"\n#########################################\n\
		 # Logging configuration\n\
		 #########################################"
			.to_string(),
	);
	retval.insert("log_to_stdout".to_string(), "# Whether to log to stdout.".to_string());
	retval.insert(
		"stdout_log_level".to_string(),
		"# Log level for stdout: Error, Warning, Info, Debug or Trace.".to_string(),
	);
	retval.insert("log_to_file".to_string(), "\n# Whether to log to a file.".to_string());
	retval.insert("file_log_level".to_string(), "# Log level for the log file.".to_string());
	retval.insert(
		"log_file_path".to_string(),
		"# Path of the log file, relative to data_dir unless absolute.".to_string(),
	);
	retval
}

/// Inserts a comment line before each recognized key or table header found
/// in `toml_str`, matching on a trimmed line prefix so indentation and
/// trailing ` = value` don't need to be reproduced in the lookup table.
pub fn insert_comments(toml_str: String) -> String {
	let comments = comments();
	let mut out = String::with_capacity(toml_str.len() * 2);
	for line in toml_str.lines() {
		let trimmed = line.trim();
		let key = if trimmed.starts_with('[') {
			trimmed.to_string()
		} else {
			trimmed.split('=').next().unwrap_or("").trim().to_string()
		};
		if let Some(comment) = comments.get(&key) {
			out.push_str(comment);
			out.push('\n');
		}
		out.push_str(line);
		out.push('\n');
	}
	out
}
