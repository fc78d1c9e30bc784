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

//! Serializable DTOs returned by the JSON-RPC control surface. Kept
//! separate from the core/chain/p2p/sync types they're built from, so a
//! wire-format change on one side doesn't ripple into the other.

use serde::{Deserialize, Serialize};

/// A single header, printed for `get_header`/`submit_header`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HeaderPrintable {
	pub height: u64,
	pub hash: String,
	pub prev_hash: String,
	pub version: u32,
	pub time: u32,
	pub bits: u32,
	pub nonce: u32,
	pub randomx_hash: String,
	pub chain_work: String,
}

/// Chain tip summary for `get_tip`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tip {
	pub height: u64,
	pub hash: String,
	pub chain_work: String,
}

/// Coarse node summary for `get_status`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Status {
	pub network: String,
	pub height: u64,
	pub hash: String,
	pub is_initial_block_download: bool,
	pub connections: usize,
}

/// One connected peer, for `get_connected_peers`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PeerInfo {
	pub id: u64,
	pub address: String,
	pub direction: String,
	pub version: u32,
	pub user_agent: String,
	pub misbehavior_score: u32,
	pub bytes_sent: u64,
	pub bytes_received: u64,
	pub connected_at: i64,
}

/// The address manager's new/tried table sizes, for `get_address_manager_info`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AddressManagerInfo {
	pub new_count: usize,
	pub tried_count: usize,
}
