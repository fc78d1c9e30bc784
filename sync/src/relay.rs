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

//! Block-announcement relay:
//! turns a `block_connected` notification into `inv` gossip, and answers
//! the `inv`/`getheaders` side of that exchange for peers announcing to us.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use alpha_chain::{BlockHandle, ChainNotify, ChainstateManager};
use alpha_core::{Hash, Header, Hashed};
use alpha_p2p::{GetHeadersPayload, InventoryVector, InvPayload, Message, Peer, PeerId};

use crate::header_sync::HeaderSync;
use crate::peer_manager::PeerManager;

/// Announces newly connected tips to ready peers, and answers `inv`/
/// `getheaders` from peers doing the same toward us. Holds only the last
/// hash told to each peer — re-announcing the same tip twice is a no-op,
/// matching Bitcoin Core's per-peer "recently announced" suppression
/// without needing a full history.
pub struct Relay {
	peer_manager: Arc<PeerManager>,
	header_sync: Arc<HeaderSync>,
	announced: Mutex<HashMap<PeerId, Hash>>,
}

impl Relay {
	pub fn new(peer_manager: Arc<PeerManager>, header_sync: Arc<HeaderSync>) -> Relay {
		Relay {
			peer_manager,
			header_sync,
			announced: Mutex::new(HashMap::new()),
		}
	}

	/// On receiving `inv(block)`: if unknown, respond with `getheaders`.
	pub fn on_inv(&self, chainstate: &ChainstateManager, inv: &InvPayload) -> Option<Message> {
		let unknown = inv.items.iter().any(|item| !chainstate.contains(&item.hash));
		if !unknown {
			return None;
		}
		Some(self.header_sync.build_getheaders())
	}

	/// On receiving `getheaders`: headers starting from the fork point found
	/// in the caller's locator, up to `MAX_HEADERS_SIZE` entries or
	/// `hash_stop`.
	pub fn on_getheaders(&self, req: &GetHeadersPayload) -> Message {
		self.header_sync.respond_to_getheaders(req)
	}

	/// Drops this peer's announcement bookkeeping.
	pub fn on_peer_disconnected(&self, id: PeerId) {
		self.announced.lock().remove(&id);
	}
}

impl ChainNotify for Relay {
	/// On `block_connected`: send `inv(block, hash)` to all ready peers that
	/// have not recently been told about this tip.
	fn block_connected(&self, _handle: BlockHandle, header: &Header) {
		let hash = header.hash();
		let msg = Message::Inv(InvPayload {
			items: vec![InventoryVector { hash }],
		});
		let peers: Vec<Arc<Peer>> = self.peer_manager.ready_peers();
		let mut announced = self.announced.lock();
		for peer in peers {
			if announced.get(&peer.id) == Some(&hash) {
				continue;
			}
			peer.send(&msg);
			announced.insert(peer.id, hash);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alpha_core::consensus::Network;
	use alpha_core::hash::ZERO_HASH;
	use alpha_core::randomx::{TestVmFactory, VmCache};
	use alpha_core::ConsensusParams;
	use alpha_p2p::{Direction, MAGIC_REGTEST};
	use std::net::SocketAddr;

	fn chainstate() -> (Arc<ChainstateManager>, tempfile::TempDir) {
		let dir = tempfile::tempdir().unwrap();
		let params = ConsensusParams::for_network(Network::Regtest);
		let vm_cache = Arc::new(VmCache::new(Arc::new(TestVmFactory), 2));
		let mgr = ChainstateManager::new(params, dir.path().join("index.json"), vm_cache).unwrap();
		(Arc::new(mgr), dir)
	}

	fn test_peer(id: u64) -> Arc<Peer> {
		let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
		let addr: SocketAddr = "127.0.0.1:9000".parse().unwrap();
		Arc::new(Peer::new(PeerId(id), addr, Direction::Outbound, MAGIC_REGTEST, tx))
	}

	#[test]
	fn inv_of_unknown_hash_requests_headers() {
		let (chainstate, _dir) = chainstate();
		let pm = Arc::new(PeerManager::new(8, 8));
		let hs = Arc::new(HeaderSync::new(Arc::clone(&chainstate)));
		let relay = Relay::new(pm, hs);

		let inv = InvPayload {
			items: vec![InventoryVector { hash: Hash([0xaa; 32]) }],
		};
		let action = relay.on_inv(&chainstate, &inv);
		assert!(matches!(action, Some(Message::GetHeaders(_))));
	}

	#[test]
	fn inv_of_known_hash_is_ignored() {
		let (chainstate, _dir) = chainstate();
		let pm = Arc::new(PeerManager::new(8, 8));
		let hs = Arc::new(HeaderSync::new(Arc::clone(&chainstate)));
		let relay = Relay::new(pm, hs);

		let inv = InvPayload {
			items: vec![InventoryVector { hash: chainstate.tip_hash() }],
		};
		assert!(relay.on_inv(&chainstate, &inv).is_none());
	}

	#[test]
	fn repeated_announcement_of_same_tip_is_suppressed() {
		let (chainstate, _dir) = chainstate();
		let pm = Arc::new(PeerManager::new(8, 8));
		let hs = Arc::new(HeaderSync::new(Arc::clone(&chainstate)));
		let relay = Relay::new(Arc::clone(&pm), hs);

		let peer = test_peer(1);
		// Drive the handshake to completion so `ready_peers()` picks it up.
		// `local_nonce_for_self_check` only needs to differ from the remote
		// version's nonce below; any fixed value does.
		let our_nonce = 42u64;
		peer.handle_message(
			Message::Version(alpha_p2p::VersionPayload {
				version: alpha_p2p::PROTOCOL_VERSION as i32,
				services: 0,
				timestamp: 0,
				addr_recv: alpha_p2p::NetAddress(peer.addr),
				addr_from: alpha_p2p::NetAddress(peer.addr),
				nonce: our_nonce + 1,
				user_agent: String::new(),
				start_height: 0,
			}),
			our_nonce,
			0,
		);
		peer.handle_message(Message::Verack, our_nonce, 0);
		assert!(peer.is_ready());
		pm.try_add_outbound(Arc::clone(&peer));

		let header = Header {
			version: 1,
			prev_hash: chainstate.tip_hash(),
			miner_address: [0u8; 20],
			time: 0,
			bits: 0,
			nonce: 0,
			randomx_hash: ZERO_HASH,
		};
		let handle = BlockHandle(1);
		relay.block_connected(handle, &header);
		relay.block_connected(handle, &header);
		assert_eq!(relay.announced.lock().len(), 1);
	}
}
