// Copyright 2019 The Grin Developers
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

//! JSON-RPC stub generation for the node control surface.
//! The endpoint only accepts POST, with the json-rpc request as the body.

use crate::error::RpcError;
use crate::node::Node;
use crate::types::{AddressManagerInfo, HeaderPrintable, PeerInfo, Status, Tip};

#[easy_jsonrpc_mw::rpc]
pub trait NodeRpc: Sync + Send {
	fn get_block_count(&self) -> Result<u64, RpcError>;
	fn get_best_block_hash(&self) -> Result<String, RpcError>;
	fn get_tip(&self) -> Result<Tip, RpcError>;
	fn get_header(&self, hash: String) -> Result<HeaderPrintable, RpcError>;
	fn get_status(&self) -> Result<Status, RpcError>;
	fn get_connection_count(&self) -> Result<usize, RpcError>;
	fn get_connected_peers(&self) -> Result<Vec<PeerInfo>, RpcError>;
	fn set_ban(&self, addr: String, banned: bool) -> Result<(), RpcError>;
	fn list_banned(&self) -> Result<Vec<String>, RpcError>;
	fn clear_banned(&self) -> Result<(), RpcError>;
	fn get_address_manager_info(&self) -> Result<AddressManagerInfo, RpcError>;
	fn submit_header(&self, header_hex: String) -> Result<(), RpcError>;
	fn generate(&self, n: u32) -> Result<Vec<String>, RpcError>;
}

impl NodeRpc for Node {
	fn get_block_count(&self) -> Result<u64, RpcError> {
		Node::get_block_count(self)
	}
	fn get_best_block_hash(&self) -> Result<String, RpcError> {
		Node::get_best_block_hash(self)
	}
	fn get_tip(&self) -> Result<Tip, RpcError> {
		Node::get_tip(self)
	}
	fn get_header(&self, hash: String) -> Result<HeaderPrintable, RpcError> {
		Node::get_header(self, hash)
	}
	fn get_status(&self) -> Result<Status, RpcError> {
		Node::get_status(self)
	}
	fn get_connection_count(&self) -> Result<usize, RpcError> {
		Node::get_connection_count(self)
	}
	fn get_connected_peers(&self) -> Result<Vec<PeerInfo>, RpcError> {
		Node::get_connected_peers(self)
	}
	fn set_ban(&self, addr: String, banned: bool) -> Result<(), RpcError> {
		Node::set_ban(self, addr, banned)
	}
	fn list_banned(&self) -> Result<Vec<String>, RpcError> {
		Node::list_banned(self)
	}
	fn clear_banned(&self) -> Result<(), RpcError> {
		Node::clear_banned(self)
	}
	fn get_address_manager_info(&self) -> Result<AddressManagerInfo, RpcError> {
		Node::get_address_manager_info(self)
	}
	fn submit_header(&self, header_hex: String) -> Result<(), RpcError> {
		Node::submit_header(self, header_hex)
	}
	fn generate(&self, n: u32) -> Result<Vec<String>, RpcError> {
		Node::generate(self, n)
	}
}
