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

//! The Peer Manager: the set of live peers, split into
//! outbound/inbound counters against configured caps, with Bitcoin Core's
//! inbound eviction priority when an incoming connection arrives at
//! capacity.

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use parking_lot::Mutex;

use alpha_p2p::{Direction, NetAddress, Peer, PeerId};

/// Default outbound connection target.
pub const DEFAULT_MAX_OUTBOUND: usize = 8;
/// Default inbound connection cap.
pub const DEFAULT_MAX_INBOUND: usize = 125;
/// Peers connected more recently than this are protected from eviction.
const PROTECT_RECENT_SECS: i64 = 10;

/// What happened when an inbound connection was offered to a full Peer
/// Manager.
pub enum InboundOutcome {
	/// Room was available; the new peer was added.
	Added,
	/// At capacity, but a worse existing peer was evicted to make room. The
	/// caller (the connection driver) must tear down the returned peer.
	Evicted(Arc<Peer>),
	/// At capacity and every existing inbound peer is protected; the new
	/// connection must be refused.
	Rejected,
}

pub struct PeerManager {
	peers: Mutex<HashMap<PeerId, Arc<Peer>>>,
	max_outbound: usize,
	max_inbound: usize,
}

impl PeerManager {
	pub fn new(max_outbound: usize, max_inbound: usize) -> PeerManager {
		PeerManager {
			peers: Mutex::new(HashMap::new()),
			max_outbound,
			max_inbound,
		}
	}

	pub fn all(&self) -> Vec<Arc<Peer>> {
		self.peers.lock().values().cloned().collect()
	}

	pub fn ready_peers(&self) -> Vec<Arc<Peer>> {
		self.peers.lock().values().filter(|p| p.is_ready()).cloned().collect()
	}

	pub fn get(&self, id: PeerId) -> Option<Arc<Peer>> {
		self.peers.lock().get(&id).cloned()
	}

	fn count(&self, direction: Direction) -> usize {
		self.peers.lock().values().filter(|p| p.direction == direction).count()
	}

	pub fn outbound_count(&self) -> usize {
		self.count(Direction::Outbound)
	}

	pub fn inbound_count(&self) -> usize {
		self.count(Direction::Inbound)
	}

	pub fn remove(&self, id: PeerId) -> Option<Arc<Peer>> {
		self.peers.lock().remove(&id)
	}

	/// Adds an outbound connection, refusing it if `max_outbound` is already
	/// met. Outbound connections are never evicted to make
	/// room for each other — eviction only ever applies to inbound slots.
	pub fn try_add_outbound(&self, peer: Arc<Peer>) -> bool {
		let mut peers = self.peers.lock();
		if peers.values().filter(|p| p.direction == Direction::Outbound).count() >= self.max_outbound {
			return false;
		}
		peers.insert(peer.id, peer);
		true
	}

	/// Adds an inbound connection, applying the eviction priority order when
	/// at capacity.
	pub fn try_add_inbound(&self, peer: Arc<Peer>, now: i64) -> InboundOutcome {
		let mut peers = self.peers.lock();
		let inbound_count = peers.values().filter(|p| p.direction == Direction::Inbound).count();
		if inbound_count < self.max_inbound {
			peers.insert(peer.id, peer);
			return InboundOutcome::Added;
		}

		let candidates: Vec<&Arc<Peer>> = peers
			.values()
			.filter(|p| p.direction == Direction::Inbound)
			.filter(|p| now - p.connected_at() >= PROTECT_RECENT_SECS)
			.collect();
		if candidates.is_empty() {
			return InboundOutcome::Rejected;
		}

		let mut netgroup_counts: HashMap<Vec<u8>, usize> = HashMap::new();
		for p in &candidates {
			*netgroup_counts.entry(NetAddress(p.addr).netgroup()).or_insert(0) += 1;
		}
		let max_count = *netgroup_counts.values().max().unwrap();
		let overrepresented: Vec<&&Arc<Peer>> = candidates
			.iter()
			.filter(|p| netgroup_counts[&NetAddress(p.addr).netgroup()] == max_count)
			.collect();

		let victim_id = overrepresented
			.iter()
			.max_by_key(|p| p.stats.ping_time_ms.load(Ordering::Relaxed))
			.map(|p| p.id)
			.expect("overrepresented is non-empty");

		let victim = peers.remove(&victim_id).expect("victim came from the live peer map");
		peers.insert(peer.id, peer);
		InboundOutcome::Evicted(victim)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::net::SocketAddr;
	use std::sync::atomic::Ordering as O;

	fn peer(id: u64, direction: Direction, port: u16) -> Arc<Peer> {
		let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
		let addr: SocketAddr = format!("10.0.{}.1:{}", id, port).parse().unwrap();
		Arc::new(Peer::new(PeerId(id), addr, direction, alpha_p2p::MAGIC_REGTEST, tx))
	}

	#[test]
	fn outbound_is_refused_once_at_cap() {
		let pm = PeerManager::new(1, 10);
		assert!(pm.try_add_outbound(peer(1, Direction::Outbound, 1)));
		assert!(!pm.try_add_outbound(peer(2, Direction::Outbound, 2)));
	}

	#[test]
	fn inbound_under_cap_is_simply_added() {
		let pm = PeerManager::new(8, 2);
		let outcome = pm.try_add_inbound(peer(1, Direction::Inbound, 1), 1_000_000);
		assert!(matches!(outcome, InboundOutcome::Added));
	}

	#[test]
	fn recently_connected_peers_are_protected_from_eviction() {
		let pm = PeerManager::new(8, 1);
		let p1 = peer(1, Direction::Inbound, 1);
		let now = p1.connected_at();
		pm.peers.lock().insert(p1.id, p1);
		let outcome = pm.try_add_inbound(peer(2, Direction::Inbound, 2), now);
		assert!(matches!(outcome, InboundOutcome::Rejected));
	}

	#[test]
	fn eviction_prefers_worse_ping_in_overrepresented_netgroup() {
		let pm = PeerManager::new(8, 2);
		let p1 = peer(1, Direction::Inbound, 1);
		let p2 = peer(2, Direction::Inbound, 2);
		p1.stats.ping_time_ms.store(500, O::Relaxed);
		p2.stats.ping_time_ms.store(50, O::Relaxed);
		let connected_at = p1.connected_at();
		pm.peers.lock().insert(p1.id, Arc::clone(&p1));
		pm.peers.lock().insert(p2.id, Arc::clone(&p2));

		let incoming = peer(3, Direction::Inbound, 3);
		let now = connected_at + PROTECT_RECENT_SECS + 1;
		let outcome = pm.try_add_inbound(incoming, now);
		match outcome {
			InboundOutcome::Evicted(victim) => assert_eq!(victim.id, p1.id),
			_ => panic!("expected an eviction"),
		}
	}
}
