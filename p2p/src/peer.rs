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

//! The per-connection peer actor and its handshake/liveness state machine.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::mpsc::UnboundedSender;

use log::debug;

use alpha_util::nonce::next_nonce;

use crate::message::{Magic, Message, VersionPayload};
use crate::misbehavior::{MisbehaviorScore, Penalty};
use crate::types::{Direction, NetAddress, PeerId, MAX_TIME_OFFSET_SECS, MIN_PROTOCOL_VERSION, PROTOCOL_VERSION, USER_AGENT};

fn now_secs() -> i64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|d| d.as_secs() as i64)
		.unwrap_or(0)
}

/// Where a peer is in the connection lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PeerState {
	/// Outbound: `version` sent, awaiting peer's. Inbound: awaiting peer's
	/// `version` before we've sent ours.
	Connecting,
	/// Our `version`/peer's `version` exchanged one way; awaiting `verack`.
	AwaitingVerack,
	/// Handshake complete; normal message traffic flows.
	Ready,
	/// Torn down; any further activity is a no-op (idempotent disconnect).
	Disconnected,
}

/// Per-peer statistics, atomic because the I/O callback and the command
/// surface (RPC `get_peer_info`) observe them from different threads.
#[derive(Default)]
pub struct PeerStats {
	pub bytes_sent: AtomicU64,
	pub bytes_received: AtomicU64,
	pub last_send: AtomicI64,
	pub last_recv: AtomicI64,
	pub ping_time_ms: AtomicI64,
}

impl PeerStats {
	pub fn record_sent(&self, n: usize) {
		self.bytes_sent.fetch_add(n as u64, Ordering::Relaxed);
		self.last_send.store(now_secs(), Ordering::Relaxed);
	}

	pub fn record_received(&self, n: usize) {
		self.bytes_received.fetch_add(n as u64, Ordering::Relaxed);
		self.last_recv.store(now_secs(), Ordering::Relaxed);
	}

	pub fn seconds_since_last_traffic(&self) -> i64 {
		let last = self.last_recv.load(Ordering::Relaxed).max(self.last_send.load(Ordering::Relaxed));
		(now_secs() - last).max(0)
	}
}

/// An outstanding ping, tracked so a matching `pong` can compute RTT and a
/// stale one can trip `ping_timeout`.
struct PendingPing {
	nonce: u64,
	sent_at: i64,
}

/// A connected peer: identity, negotiated handshake fields, statistics,
/// misbehavior score and the channel used to queue outbound bytes. Mutating
/// operations are serialized by posting to the I/O executor that owns the
/// socket.
pub struct Peer {
	pub id: PeerId,
	pub addr: SocketAddr,
	pub direction: Direction,
	pub magic: Magic,
	local_nonce: u64,

	state: std::sync::Mutex<PeerState>,
	successfully_connected: AtomicBool,
	version_sent: AtomicBool,

	pub peer_version: AtomicU32,
	pub peer_nonce: AtomicU64,
	peer_user_agent: std::sync::Mutex<String>,
	peer_time_offset: AtomicI64,

	pub stats: PeerStats,
	pub score: MisbehaviorScore,
	connected_at: i64,

	pending_ping: std::sync::Mutex<Option<PendingPing>>,

	outbound: UnboundedSender<Vec<u8>>,
}

/// The outcome of feeding a message through the peer's handshake/liveness
/// state machine: either it was handled here, or it should be forwarded up
/// to the sync coordinator (header/addr/inventory traffic).
pub enum Outcome {
	Handled,
	Penalize(Penalty),
	Disconnect,
	Forward(Message),
}

impl Peer {
	pub fn new(id: PeerId, addr: SocketAddr, direction: Direction, magic: Magic, outbound: UnboundedSender<Vec<u8>>) -> Peer {
		Peer {
			id,
			addr,
			direction,
			magic,
			local_nonce: next_nonce(),
			state: std::sync::Mutex::new(PeerState::Connecting),
			successfully_connected: AtomicBool::new(false),
			version_sent: AtomicBool::new(false),
			peer_version: AtomicU32::new(0),
			peer_nonce: AtomicU64::new(0),
			peer_user_agent: std::sync::Mutex::new(String::new()),
			peer_time_offset: AtomicI64::new(0),
			stats: PeerStats::default(),
			score: MisbehaviorScore::new(),
			connected_at: now_secs(),
			pending_ping: std::sync::Mutex::new(None),
			outbound,
		}
	}

	/// Like `new`, but pins the nonce this peer advertises in its own
	/// `version` message to a caller-supplied value rather than drawing a
	/// fresh one. The sync coordinator uses this to give every connection
	/// the same process-wide nonce, so a loopback connection to our own
	/// listener is recognized by `on_version`'s self-connection check
	/// instead of comparing against an unrelated
	/// per-connection value.
	pub fn new_with_nonce(
		id: PeerId,
		addr: SocketAddr,
		direction: Direction,
		magic: Magic,
		outbound: UnboundedSender<Vec<u8>>,
		local_nonce: u64,
	) -> Peer {
		let mut peer = Peer::new(id, addr, direction, magic, outbound);
		peer.local_nonce = local_nonce;
		peer
	}

	pub fn state(&self) -> PeerState {
		*self.state.lock().unwrap()
	}

	pub fn is_ready(&self) -> bool {
		self.state() == PeerState::Ready
	}

	pub fn connected_at(&self) -> i64 {
		self.connected_at
	}

	/// The `user_agent` string the peer advertised in its `version` message,
	/// empty until then.
	pub fn user_agent(&self) -> String {
		self.peer_user_agent.lock().unwrap().clone()
	}

	/// Queues `msg` for sending, framed with this peer's network magic.
	/// A disconnected peer silently drops sends.
	pub fn send(&self, msg: &Message) {
		if self.state() == PeerState::Disconnected {
			return;
		}
		let bytes = msg.encode(self.magic);
		self.stats.record_sent(bytes.len());
		let _ = self.outbound.send(bytes);
	}

	/// Sends our `version` immediately on outbound connect, or is deferred
	/// until the peer's `version` is seen on inbound.
	pub fn send_version(&self, start_height: i32) {
		if self.version_sent.swap(true, Ordering::SeqCst) {
			return;
		}
		let payload = VersionPayload {
			version: PROTOCOL_VERSION as i32,
			services: 0,
			timestamp: now_secs(),
			addr_recv: NetAddress(self.addr),
			addr_from: NetAddress(self.addr),
			nonce: self.local_nonce,
			user_agent: USER_AGENT.to_string(),
			start_height,
		};
		self.send(&Message::Version(payload));
	}

	/// Feeds one decoded message through the handshake/liveness rules.
	/// Anything not handled here
	/// (`addr`, `getaddr`, `inv`, `getdata`, `notfound`, `getheaders`,
	/// `headers`) is returned as `Outcome::Forward` for the sync coordinator,
	/// but ONLY once the handshake is complete — any other message received
	/// before `successfully_connected` disconnects.
	pub fn handle_message(&self, msg: Message, local_nonce_for_self_check: u64, our_start_height: i32) -> Outcome {
		if self.state() == PeerState::Disconnected {
			return Outcome::Handled;
		}
		match &msg {
			Message::Version(v) => self.on_version(v, local_nonce_for_self_check, our_start_height),
			Message::Verack => self.on_verack(),
			_ if !self.successfully_connected.load(Ordering::Acquire) => Outcome::Disconnect,
			Message::Ping { nonce } => {
				self.send(&Message::Pong { nonce: *nonce });
				Outcome::Handled
			}
			Message::Pong { nonce } => {
				self.on_pong(*nonce);
				Outcome::Handled
			}
			Message::Unknown(_) => Outcome::Handled,
			_ => Outcome::Forward(msg),
		}
	}

	fn on_version(&self, v: &VersionPayload, local_nonce: u64, our_start_height: i32) -> Outcome {
		if self.successfully_connected.load(Ordering::Acquire) {
			// Resistance to version replay.
			return Outcome::Handled;
		}
		if v.nonce == local_nonce {
			return Outcome::Disconnect;
		}
		if (v.version as u32) < MIN_PROTOCOL_VERSION {
			return Outcome::Disconnect;
		}
		self.peer_version.store(v.version as u32, Ordering::Relaxed);
		self.peer_nonce.store(v.nonce, Ordering::Relaxed);
		*self.peer_user_agent.lock().unwrap() = v.user_agent.chars().take(256).collect();

		let offset = (v.timestamp - now_secs()).clamp(-MAX_TIME_OFFSET_SECS, MAX_TIME_OFFSET_SECS);
		self.peer_time_offset.store(offset, Ordering::Relaxed);

		if !self.version_sent.swap(true, Ordering::SeqCst) {
			self.send_version(our_start_height);
		}
		self.send(&Message::Verack);
		*self.state.lock().unwrap() = PeerState::AwaitingVerack;
		Outcome::Handled
	}

	fn on_verack(&self) -> Outcome {
		if self.successfully_connected.load(Ordering::Acquire) {
			return Outcome::Handled;
		}
		if self.peer_version.load(Ordering::Relaxed) == 0 {
			return Outcome::Disconnect;
		}
		self.successfully_connected.store(true, Ordering::Release);
		*self.state.lock().unwrap() = PeerState::Ready;
		Outcome::Handled
	}

	/// Sends a fresh ping if none is currently outstanding.
	pub fn maybe_send_ping(&self) {
		let mut pending = self.pending_ping.lock().unwrap();
		if pending.is_some() {
			return;
		}
		let nonce = next_nonce();
		*pending = Some(PendingPing { nonce, sent_at: now_secs() });
		drop(pending);
		self.send(&Message::Ping { nonce });
	}

	fn on_pong(&self, nonce: u64) {
		let mut pending = self.pending_ping.lock().unwrap();
		if let Some(p) = pending.as_ref() {
			if p.nonce == nonce {
				let rtt = (now_secs() - p.sent_at).max(0) * 1000;
				self.stats.ping_time_ms.store(rtt, Ordering::Relaxed);
				*pending = None;
			}
			// Nonce mismatch is ignored.
		}
	}

	/// Whether the currently outstanding ping (if any) has been waiting
	/// longer than `ping_timeout`.
	pub fn ping_timed_out(&self, timeout_secs: i64) -> bool {
		self.pending_ping
			.lock()
			.unwrap()
			.as_ref()
			.map(|p| now_secs() - p.sent_at > timeout_secs)
			.unwrap_or(false)
	}

	/// Marks this peer disconnected. Idempotent. Actual socket teardown is the
	/// caller's responsibility via `post_disconnect` (see `crate::connection`);
	/// this only flips the state so future sends/handling become no-ops.
	pub fn disconnect(&self) {
		let mut state = self.state.lock().unwrap();
		if *state != PeerState::Disconnected {
			debug!("peer {:?} ({}) disconnected, score {}", self.id, self.addr, self.score.score());
		}
		*state = PeerState::Disconnected;
	}
}

/// Schedules `peer`'s teardown on the given executor, holding a strong
/// reference across the scheduling boundary so a caller whose only
/// reference is about to go out of scope cannot cause a use-after-free.
/// `teardown` is whatever additional action the owner (the
/// sync coordinator's Peer Manager) needs to run once the peer is marked
/// down — e.g. removing it from the live-peer table.
pub fn post_disconnect<F>(peer: Arc<Peer>, teardown: F)
where
	F: FnOnce(Arc<Peer>) + Send + 'static,
{
	tokio::spawn(async move {
		peer.disconnect();
		teardown(peer);
	});
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::message::MAGIC_REGTEST;

	fn peer() -> (Arc<Peer>, tokio::sync::mpsc::UnboundedReceiver<Vec<u8>>) {
		let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
		let addr: SocketAddr = "127.0.0.1:9000".parse().unwrap();
		(Arc::new(Peer::new(PeerId(1), addr, Direction::Outbound, MAGIC_REGTEST, tx)), rx)
	}

	#[test]
	fn self_connection_is_detected_by_matching_nonce() {
		let (p, _rx) = peer();
		let local_nonce = 42;
		let v = VersionPayload {
			version: PROTOCOL_VERSION as i32,
			services: 0,
			timestamp: now_secs(),
			addr_recv: NetAddress(p.addr),
			addr_from: NetAddress(p.addr),
			nonce: local_nonce,
			user_agent: "x".into(),
			start_height: 0,
		};
		let outcome = p.handle_message(Message::Version(v), local_nonce, 0);
		assert!(matches!(outcome, Outcome::Disconnect));
	}

	#[test]
	fn full_handshake_reaches_ready() {
		let (p, _rx) = peer();
		let v = VersionPayload {
			version: PROTOCOL_VERSION as i32,
			services: 0,
			timestamp: now_secs(),
			addr_recv: NetAddress(p.addr),
			addr_from: NetAddress(p.addr),
			nonce: 999,
			user_agent: "x".into(),
			start_height: 0,
		};
		p.handle_message(Message::Version(v), 1, 0);
		assert_eq!(p.state(), PeerState::AwaitingVerack);
		p.handle_message(Message::Verack, 1, 0);
		assert_eq!(p.state(), PeerState::Ready);
	}

	#[test]
	fn duplicate_verack_does_not_regress_state() {
		let (p, _rx) = peer();
		let v = VersionPayload {
			version: PROTOCOL_VERSION as i32,
			services: 0,
			timestamp: now_secs(),
			addr_recv: NetAddress(p.addr),
			addr_from: NetAddress(p.addr),
			nonce: 999,
			user_agent: "x".into(),
			start_height: 0,
		};
		p.handle_message(Message::Version(v), 1, 0);
		p.handle_message(Message::Verack, 1, 0);
		p.handle_message(Message::Verack, 1, 0);
		assert_eq!(p.state(), PeerState::Ready);
	}

	#[test]
	fn non_handshake_message_before_ready_disconnects() {
		let (p, _rx) = peer();
		let outcome = p.handle_message(Message::GetAddr, 1, 0);
		assert!(matches!(outcome, Outcome::Disconnect));
	}
}
