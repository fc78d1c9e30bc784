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

//! The header-sync protocol: request construction via block
//! locators, and the ten-step response pipeline that turns a `headers`
//! batch into accepted chain state while scoring misbehavior along the way.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use alpha_chain::{AcceptOutcome, ChainstateManager};
use alpha_core::hash::ZERO_HASH;
use alpha_core::{Hash, RejectReason};
use alpha_p2p::{GetHeadersPayload, HeadersPayload, Message, Penalty, Peer, PeerId};

/// Buffer, in blocks, subtracted from the tip's chain_work before comparing
/// an incoming batch's work against it.
const ANTI_DOS_BUFFER_BLOCKS: u64 = 144;

/// A sentinel meaning "no peer is currently our header-sync peer".
const NO_SYNC_PEER: u64 = u64::MAX;

/// What the caller should do after feeding a `headers` message through the
/// protocol.
pub enum HeaderSyncAction {
	/// Nothing further to send right now.
	None,
	/// Send this `getheaders` to the same peer (more of this branch, or a
	/// full batch signaling there may be more).
	RequestMore(Message),
	/// The peer's score crossed the threshold or hit an immediate-disconnect
	/// penalty; the caller should tear the connection down.
	Disconnect,
}

/// Tracks the current sync peer and per-peer unconnecting-headers counters,
/// and drives the header-sync protocol against a `ChainstateManager`.
pub struct HeaderSync {
	chainstate: Arc<ChainstateManager>,
	sync_peer_id: AtomicU64,
	unconnecting_counts: Mutex<HashMap<PeerId, u32>>,
}

/// A peer accumulating this many "unconnecting headers" batches is
/// disconnected.
const UNCONNECTING_PENALTY_POINTS: u32 = Penalty::UnconnectingHeaders.points();

impl HeaderSync {
	pub fn new(chainstate: Arc<ChainstateManager>) -> HeaderSync {
		HeaderSync {
			chainstate,
			sync_peer_id: AtomicU64::new(NO_SYNC_PEER),
			unconnecting_counts: Mutex::new(HashMap::new()),
		}
	}

	pub fn sync_peer(&self) -> Option<PeerId> {
		match self.sync_peer_id.load(Ordering::Relaxed) {
			NO_SYNC_PEER => None,
			v => Some(PeerId(v)),
		}
	}

	fn set_sync_peer(&self, id: Option<PeerId>) {
		self.sync_peer_id.store(id.map(|p| p.0).unwrap_or(NO_SYNC_PEER), Ordering::Relaxed);
	}

	/// Builds `getheaders(locator, hash_stop=0)` from the active tip.
	pub fn build_getheaders(&self) -> Message {
		let locator = self.chainstate.build_locator(alpha_p2p::MAX_LOCATOR_SZ);
		Message::GetHeaders(GetHeadersPayload {
			version: alpha_p2p::PROTOCOL_VERSION,
			locator,
			hash_stop: ZERO_HASH,
		})
	}

	/// Picks `peer` as the sync peer (if none is set) and sends it a fresh
	/// `getheaders`.
	pub fn maybe_start_sync(&self, peer: &Arc<Peer>) {
		if self.sync_peer().is_some() {
			return;
		}
		self.set_sync_peer(Some(peer.id));
		peer.send(&self.build_getheaders());
	}

	/// Builds the `headers` response to a `getheaders` request.
	pub fn respond_to_getheaders(&self, req: &GetHeadersPayload) -> Message {
		let headers = self
			.chainstate
			.headers_from_locator(&req.locator, req.hash_stop, alpha_p2p::MAX_HEADERS_SIZE);
		Message::Headers(HeadersPayload { headers })
	}

	/// The ten-step response pipeline. Step 1 (the `MAX_HEADERS_SIZE` cap) is already
	/// enforced at decode time by `alpha_p2p::message::HeadersPayload::read`;
	/// a batch reaching here is always within bound.
	pub fn on_headers(&self, peer: &Arc<Peer>, payload: HeadersPayload, now: u32) -> HeaderSyncAction {
		let headers = payload.headers;

		// Step 2: empty batch means the peer has nothing more to offer.
		if headers.is_empty() {
			if self.sync_peer() == Some(peer.id) {
				self.set_sync_peer(None);
			}
			return HeaderSyncAction::None;
		}

		// Step 3: the batch must connect to something we already know.
		if !self.chainstate.contains(&headers[0].prev_hash) {
			return self.penalize_unconnecting(peer);
		}

		// Step 4: cheap PoW pre-filter on every element.
		if self.chainstate.check_headers_pow(&headers).is_err() {
			return self.penalize(peer, Penalty::InvalidPow);
		}

		// Step 5: continuity.
		if alpha_core::validation::check_headers_are_continuous(&headers).is_err() {
			return self.penalize(peer, Penalty::NonContinuousHeaders);
		}

		// Step 6: anti-DoS work threshold, post-IBD only (the threshold is
		// zero during IBD, so the comparison below is a no-op then).
		if !self.chainstate.is_initial_block_download() {
			let last = headers.last().expect("checked non-empty above");
			let skip_threshold = self.chainstate.contains(&last.hash()) && self.chainstate.chain_work_of(&last.hash()).map(|w| w > alpha_core::ChainWork::zero()).unwrap_or(false);
			if !skip_threshold {
				if let Some(start_work) = self.chainstate.chain_work_of(&headers[0].prev_hash) {
					let batch_work = alpha_core::validation::calculate_headers_work(&headers, self.chainstate.params());
					let threshold = self.chainstate.anti_dos_work_threshold(ANTI_DOS_BUFFER_BLOCKS);
					if start_work + batch_work < threshold {
						if headers.len() < alpha_p2p::MAX_HEADERS_SIZE {
							return HeaderSyncAction::None;
						}
						let locator = vec![last.hash()];
						return HeaderSyncAction::RequestMore(Message::GetHeaders(GetHeadersPayload {
							version: alpha_p2p::PROTOCOL_VERSION,
							locator,
							hash_stop: ZERO_HASH,
						}));
					}
				}
			}
		}

		// Step 7: feed every header through the chainstate manager.
		let batch_len = headers.len();
		for header in headers {
			match self.chainstate.accept_header(header, peer.id.0, now) {
				Ok(AcceptOutcome::Accepted(_)) | Ok(AcceptOutcome::Duplicate) | Ok(AcceptOutcome::Orphan) => {}
				Err(alpha_chain::Error::Rejected(reason)) => {
					if let HeaderSyncAction::Disconnect = self.penalize_reject_reason(peer, &reason) {
						return HeaderSyncAction::Disconnect;
					}
				}
				Err(_) => return HeaderSyncAction::Disconnect,
			}
		}

		// Step 8: activate once per batch, not per header.
		let _ = self.chainstate.activate_best_chain(now);

		// Steps 9-10: request more on a full batch; otherwise clear the sync
		// peer once we're no longer in IBD.
		if batch_len == alpha_p2p::MAX_HEADERS_SIZE && self.sync_peer() == Some(peer.id) {
			return HeaderSyncAction::RequestMore(self.build_getheaders());
		}
		if !self.chainstate.is_initial_block_download() && self.sync_peer() == Some(peer.id) {
			self.set_sync_peer(None);
		}
		HeaderSyncAction::None
	}

	fn penalize(&self, peer: &Arc<Peer>, penalty: Penalty) -> HeaderSyncAction {
		if peer.score.apply(penalty) {
			HeaderSyncAction::Disconnect
		} else {
			HeaderSyncAction::None
		}
	}

	fn penalize_reject_reason(&self, peer: &Arc<Peer>, reason: &RejectReason) -> HeaderSyncAction {
		let points = reason.misbehavior_score();
		if points == 0 {
			return HeaderSyncAction::None;
		}
		if peer.score.apply_points(points) {
			HeaderSyncAction::Disconnect
		} else {
			HeaderSyncAction::None
		}
	}

	/// Accumulates +1 per unconnecting batch, disconnecting once the cumulative score
	/// crosses the ban threshold like any other penalty.
	fn penalize_unconnecting(&self, peer: &Arc<Peer>) -> HeaderSyncAction {
		let mut counts = self.unconnecting_counts.lock();
		*counts.entry(peer.id).or_insert(0) += 1;
		drop(counts);
		if peer.score.apply_points(UNCONNECTING_PENALTY_POINTS) {
			HeaderSyncAction::Disconnect
		} else {
			HeaderSyncAction::None
		}
	}

	/// Drops bookkeeping for a disconnected peer.
	pub fn on_peer_disconnected(&self, id: PeerId) {
		self.unconnecting_counts.lock().remove(&id);
		if self.sync_peer() == Some(id) {
			self.set_sync_peer(None);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alpha_core::consensus::Network;
	use alpha_core::hash::Hashed;
	use alpha_core::randomx::{TestVmFactory, VmCache};
	use alpha_core::validation::{self as core_validation, PowTier};
	use alpha_core::ConsensusParams;
	use alpha_core::Header;
	use std::net::SocketAddr;

	fn chainstate() -> (Arc<ChainstateManager>, tempfile::TempDir) {
		let dir = tempfile::tempdir().unwrap();
		let params = ConsensusParams::for_network(Network::Regtest);
		let vm_cache = Arc::new(VmCache::new(Arc::new(TestVmFactory), 2));
		let mgr = ChainstateManager::new(params, dir.path().join("index.json"), vm_cache).unwrap();
		(Arc::new(mgr), dir)
	}

	fn mine(prev: Header, prev_height: u64, nonce_start: u32) -> Header {
		let params = ConsensusParams::for_network(Network::Regtest);
		let vm_cache = VmCache::new(Arc::new(TestVmFactory), 2);
		let mut nonce = nonce_start;
		loop {
			let mut candidate = Header {
				version: 1,
				prev_hash: prev.hash(),
				miner_address: [0u8; 20],
				time: prev.time + 1,
				bits: core_validation::next_bits_asert(prev_height, prev.time + 1, &params),
				nonce,
				randomx_hash: ZERO_HASH,
			};
			candidate.randomx_hash = vm_cache.randomx_output_for(&candidate, params.randomx_epoch_duration, params.genesis.time);
			if core_validation::check_block_header(&candidate, &params, None, PowTier::CommitmentOnly).is_ok() {
				return candidate;
			}
			nonce += 1;
		}
	}

	fn test_peer(id: u64) -> Arc<Peer> {
		let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
		let addr: SocketAddr = "127.0.0.1:9000".parse().unwrap();
		Arc::new(Peer::new(PeerId(id), addr, alpha_p2p::Direction::Outbound, alpha_p2p::MAGIC_REGTEST, tx))
	}

	#[test]
	fn connecting_batch_extends_the_tip() {
		let (chainstate, _dir) = chainstate();
		let sync = HeaderSync::new(Arc::clone(&chainstate));
		let peer = test_peer(1);

		let genesis = ConsensusParams::for_network(Network::Regtest).genesis;
		let h1 = mine(genesis, 0, 0);
		let h2 = mine(h1, 1, 0);

		let action = sync.on_headers(&peer, HeadersPayload { headers: vec![h1, h2] }, h2.time);
		assert!(matches!(action, HeaderSyncAction::None));
		assert_eq!(chainstate.tip_hash(), h2.hash());
	}

	#[test]
	fn unconnecting_batch_does_not_panic_and_scores_a_small_penalty() {
		let (chainstate, _dir) = chainstate();
		let sync = HeaderSync::new(Arc::clone(&chainstate));
		let peer = test_peer(1);

		let genesis = ConsensusParams::for_network(Network::Regtest).genesis;
		let orphan_parent = mine(genesis, 0, 0);
		let orphan = mine(orphan_parent, 1, 0);

		let action = sync.on_headers(&peer, HeadersPayload { headers: vec![orphan] }, orphan.time);
		assert!(matches!(action, HeaderSyncAction::None));
		assert_eq!(peer.score.score(), UNCONNECTING_PENALTY_POINTS);
	}

	#[test]
	fn empty_batch_clears_the_sync_peer() {
		let (chainstate, _dir) = chainstate();
		let sync = HeaderSync::new(Arc::clone(&chainstate));
		let peer = test_peer(1);
		sync.maybe_start_sync(&peer);
		assert_eq!(sync.sync_peer(), Some(peer.id));

		sync.on_headers(&peer, HeadersPayload { headers: vec![] }, 0);
		assert_eq!(sync.sync_peer(), None);
	}
}
