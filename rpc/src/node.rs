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

//! The facade the JSON-RPC trait methods delegate to. Holds `Arc` handles
//! into the same chainstate, peer manager, address manager and ban manager
//! the running node already owns; this crate never constructs them itself.

use std::net::IpAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use alpha_chain::ChainstateManager;
use alpha_core::hash::{Hash, ZERO_HASH};
use alpha_core::header::Header;
use alpha_core::randomx::VmCache;
use alpha_core::validation::{self, PowTier};
use alpha_core::{ser, ConsensusParams, Network};
use alpha_p2p::types::Direction;
use alpha_sync::{AddressManager, BanMan, PeerManager};

use crate::error::RpcError;
use crate::types::{AddressManagerInfo, HeaderPrintable, PeerInfo, Status, Tip};

pub struct Node {
	pub chainstate: Arc<ChainstateManager>,
	pub peer_manager: Arc<PeerManager>,
	pub address_manager: Arc<AddressManager>,
	pub banman: Arc<BanMan>,
}

impl Node {
	pub fn new(
		chainstate: Arc<ChainstateManager>,
		peer_manager: Arc<PeerManager>,
		address_manager: Arc<AddressManager>,
		banman: Arc<BanMan>,
	) -> Node {
		Node {
			chainstate,
			peer_manager,
			address_manager,
			banman,
		}
	}

	fn printable(&self, header: &Header, height: u64) -> HeaderPrintable {
		let chain_work = self
			.chainstate
			.chain_work_of(&header.hash())
			.unwrap_or_else(|| self.chainstate.tip_chain_work());
		HeaderPrintable {
			height,
			hash: header.hash().to_string(),
			prev_hash: header.prev_hash.to_string(),
			version: header.version,
			time: header.time,
			bits: header.bits,
			nonce: header.nonce,
			randomx_hash: header.randomx_hash.to_string(),
			chain_work: chain_work.to_string(),
		}
	}

	pub fn get_block_count(&self) -> Result<u64, RpcError> {
		Ok(self.chainstate.tip_height())
	}

	pub fn get_best_block_hash(&self) -> Result<String, RpcError> {
		Ok(self.chainstate.tip_hash().to_string())
	}

	pub fn get_tip(&self) -> Result<Tip, RpcError> {
		Ok(Tip {
			height: self.chainstate.tip_height(),
			hash: self.chainstate.tip_hash().to_string(),
			chain_work: self.chainstate.tip_chain_work().to_string(),
		})
	}

	pub fn get_header(&self, hash: String) -> Result<HeaderPrintable, RpcError> {
		let bytes = alpha_util::from_hex(&hash).map_err(|e| RpcError::Argument(format!("invalid hash: {}", e)))?;
		if bytes.len() != 32 {
			return Err(RpcError::Argument("hash must be 32 bytes".to_string()));
		}
		let hash = Hash::from_slice(&bytes);
		let header = self.chainstate.header_by_hash(&hash).ok_or(RpcError::NotFound)?;
		let height = self.chainstate.height_of(&hash).ok_or(RpcError::NotFound)?;
		Ok(self.printable(&header, height))
	}

	pub fn get_status(&self) -> Result<Status, RpcError> {
		Ok(Status {
			network: format!("{:?}", self.chainstate.params().network).to_lowercase(),
			height: self.chainstate.tip_height(),
			hash: self.chainstate.tip_hash().to_string(),
			is_initial_block_download: self.chainstate.is_initial_block_download(),
			connections: self.peer_manager.all().len(),
		})
	}

	pub fn get_connection_count(&self) -> Result<usize, RpcError> {
		Ok(self.peer_manager.all().len())
	}

	pub fn get_connected_peers(&self) -> Result<Vec<PeerInfo>, RpcError> {
		Ok(self
			.peer_manager
			.all()
			.iter()
			.map(|p| PeerInfo {
				id: p.id.0,
				address: p.addr.to_string(),
				direction: match p.direction {
					Direction::Inbound => "inbound".to_string(),
					Direction::Outbound => "outbound".to_string(),
				},
				version: p.peer_version.load(Ordering::Relaxed),
				user_agent: p.user_agent(),
				misbehavior_score: p.score.score(),
				bytes_sent: p.stats.bytes_sent.load(Ordering::Relaxed),
				bytes_received: p.stats.bytes_received.load(Ordering::Relaxed),
				connected_at: p.connected_at(),
			})
			.collect())
	}

	pub fn set_ban(&self, addr: String, banned: bool) -> Result<(), RpcError> {
		let ip: IpAddr = addr.parse().map_err(|_| RpcError::Argument(format!("invalid address: {}", addr)))?;
		if banned {
			self.banman.ban(ip);
		} else {
			self.banman.unban(ip);
		}
		self.banman.save()?;
		Ok(())
	}

	pub fn list_banned(&self) -> Result<Vec<String>, RpcError> {
		Ok(self.banman.list_banned().iter().map(|ip| ip.to_string()).collect())
	}

	pub fn clear_banned(&self) -> Result<(), RpcError> {
		for ip in self.banman.list_banned() {
			self.banman.unban(ip);
		}
		self.banman.save()?;
		Ok(())
	}

	pub fn get_address_manager_info(&self) -> Result<AddressManagerInfo, RpcError> {
		Ok(AddressManagerInfo {
			new_count: self.address_manager.new_len(),
			tried_count: self.address_manager.tried_len(),
		})
	}

	pub fn submit_header(&self, header_hex: String) -> Result<(), RpcError> {
		let bytes = alpha_util::from_hex(&header_hex).map_err(|e| RpcError::Argument(format!("invalid header hex: {}", e)))?;
		let header: Header = ser::deserialize_strict(&bytes).map_err(|e| RpcError::Argument(format!("malformed header: {:?}", e)))?;
		let now = crate::now_secs() as u32;
		self.chainstate.accept_header(header, 0, now)?;
		self.chainstate.activate_best_chain(now)?;
		Ok(())
	}

	/// Drives the internal miner to produce `n` headers on top of the
	/// current tip, accepting and activating each before mining the next.
	/// `regtest` only: there is no other
	/// network where conjuring chain work out of an RPC call is sound.
	pub fn generate(&self, n: u32) -> Result<Vec<String>, RpcError> {
		if self.chainstate.params().network != Network::Regtest {
			return Err(RpcError::Argument("generate is only available on regtest".to_string()));
		}
		let mut hashes = Vec::with_capacity(n as usize);
		for _ in 0..n {
			let prev_hash = self.chainstate.tip_hash();
			let prev = self.chainstate.header_by_hash(&prev_hash).ok_or(RpcError::NotFound)?;
			let prev_height = self.chainstate.tip_height();
			let header = mine_one(&prev, prev_height, self.chainstate.params(), self.chainstate.vm_cache());
			let now = crate::now_secs() as u32;
			self.chainstate.accept_header(header, 0, now)?;
			self.chainstate.activate_best_chain(now)?;
			hashes.push(header.hash().to_string());
		}
		Ok(hashes)
	}
}

/// Brute-forces a nonce for a header extending `prev` until the commitment
/// proof-of-work is satisfied, the same
/// approach the chainstate's own test helpers use to produce valid regtest
/// headers.
fn mine_one(prev: &Header, prev_height: u64, params: &ConsensusParams, vm_cache: &VmCache) -> Header {
	let mut nonce = 0u32;
	loop {
		let mut candidate = Header {
			version: 1,
			prev_hash: prev.hash(),
			miner_address: [0u8; 20],
			time: prev.time + 1,
			bits: validation::next_bits_asert(prev_height, prev.time + 1, params),
			nonce,
			randomx_hash: ZERO_HASH,
		};
		candidate.randomx_hash = vm_cache.randomx_output_for(&candidate, params.randomx_epoch_duration, params.genesis.time);
		if validation::check_block_header(&candidate, params, None, PowTier::CommitmentOnly).is_ok() {
			return candidate;
		}
		nonce = nonce.wrapping_add(1);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alpha_core::randomx::TestVmFactory;

	fn node(network: Network) -> (Node, tempfile::TempDir) {
		let dir = tempfile::tempdir().unwrap();
		let params = ConsensusParams::for_network(network);
		let vm_cache = Arc::new(VmCache::new(Arc::new(TestVmFactory), 2));
		let chainstate = Arc::new(ChainstateManager::new(params, dir.path().join("index.json"), vm_cache).unwrap());
		let peer_manager = Arc::new(PeerManager::new(8, 8));
		let address_manager = Arc::new(AddressManager::open(dir.path().join("peers.json")).unwrap());
		let banman = Arc::new(BanMan::open(dir.path().join("bans.json")).unwrap());
		(Node::new(chainstate, peer_manager, address_manager, banman), dir)
	}

	#[test]
	fn generate_mines_n_headers_and_advances_the_tip() {
		let (node, _dir) = node(Network::Regtest);
		let hashes = node.generate(3).unwrap();
		assert_eq!(hashes.len(), 3);
		assert_eq!(node.get_block_count().unwrap(), 3);
		assert_eq!(node.get_best_block_hash().unwrap(), hashes[2]);
	}

	#[test]
	fn generate_is_refused_outside_regtest() {
		let (node, _dir) = node(Network::Main);
		assert!(matches!(node.generate(1), Err(RpcError::Argument(_))));
	}
}
