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

//! The running node: owns the chainstate manager and every sync-coordinator
//! component, and drives the inbound listener, outbound dialer and periodic
//! housekeeping that keep them fed.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::UnboundedReceiver;

use alpha_chain::ChainstateManager;
use alpha_config::{ChainType, NodeConfig};
use alpha_core::randomx::{RandomXVmFactory, VmCache};
use alpha_core::ConsensusParams;
use alpha_p2p::{
	self, connection::ReadEvent, post_disconnect, Direction, Magic, Message, NetAddress, Peer, PeerId, MAGIC_MAIN,
	MAGIC_REGTEST, MAGIC_TEST,
};
use alpha_sync::{AddressManager, BanMan, HeaderSync, HeaderSyncAction, InboundOutcome, PeerManager, Relay};
use alpha_util::nonce::next_nonce;
use alpha_util::StopState;

use crate::error::ServerError;

const INDEX_FILE_NAME: &str = "index.json";
const ADDR_FILE_NAME: &str = "peers.json";
const BAN_FILE_NAME: &str = "banlist.json";

/// How often the outbound dialer looks for a new address to try when it's
/// below `max_outbound`.
const DIAL_RETRY_SECS: u64 = 5;

/// Cadence of the housekeeping tick: pings, timeouts, orphan expiry, address
/// book / ban list maintenance.
const HOUSEKEEPING_INTERVAL_SECS: u64 = 30;

fn now_secs() -> i64 {
	SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(0)
}

/// Everything a running node needs: the chainstate authority, the live-peer
/// table, the address book, the ban list, and the header-sync/relay protocol
/// state that reacts to both. A `server::Node`
/// is the thing `alpha_rpc`'s command surface reads from and the thing the
/// `alpha-node` binary drives to completion.
pub struct Node {
	pub config: NodeConfig,
	pub chainstate: Arc<ChainstateManager>,
	pub peer_manager: Arc<PeerManager>,
	pub address_manager: Arc<AddressManager>,
	pub banman: Arc<BanMan>,
	pub header_sync: Arc<HeaderSync>,
	pub relay: Arc<Relay>,
	pub stop_state: StopState,

	/// Advertised in every `version` message this process sends, so a
	/// loopback connection to our own listener is recognized as such.
	local_nonce: u64,
	next_peer_id: AtomicU64,
}

impl Node {
	/// Builds every sync-coordinator component from `config`, opening
	/// whatever state already exists in `config.data_dir`.
	/// `vm_factory` is the RandomX binding the chainstate manager validates
	/// proof-of-work with; production deployments supply a real one, tests
	/// and `regtest` use `alpha_core::randomx::TestVmFactory`.
	pub fn init(config: NodeConfig, vm_factory: Arc<dyn RandomXVmFactory>) -> Result<Arc<Node>, ServerError> {
		std::fs::create_dir_all(&config.data_dir)?;

		let params = ConsensusParams::for_network(config.chain_type.to_network());
		let vm_cache = Arc::new(VmCache::new(vm_factory, params.randomx_cache_size));
		let chainstate = Arc::new(ChainstateManager::new(params, config.data_dir.join(INDEX_FILE_NAME), vm_cache)?);

		let peer_manager = Arc::new(PeerManager::new(config.p2p.max_outbound, config.p2p.max_inbound));
		let address_manager = Arc::new(AddressManager::open(config.data_dir.join(ADDR_FILE_NAME))?);
		let banman = Arc::new(BanMan::open(config.data_dir.join(BAN_FILE_NAME))?);
		let header_sync = Arc::new(HeaderSync::new(Arc::clone(&chainstate)));
		let relay = Arc::new(Relay::new(Arc::clone(&peer_manager), Arc::clone(&header_sync)));
		chainstate.register_notify(Arc::clone(&relay) as Arc<dyn alpha_chain::ChainNotify>);

		let now = now_secs();
		for seed in &config.p2p.seeds {
			match seed.parse::<SocketAddr>() {
				Ok(addr) => address_manager.add(NetAddress(addr), now),
				Err(_) => warn!("ignoring unparseable seed address '{}'", seed),
			}
		}

		Ok(Arc::new(Node {
			config,
			chainstate,
			peer_manager,
			address_manager,
			banman,
			header_sync,
			relay,
			stop_state: StopState::new(),
			local_nonce: next_nonce(),
			next_peer_id: AtomicU64::new(1),
		}))
	}

	fn magic(&self) -> Magic {
		match self.config.chain_type {
			ChainType::Main => MAGIC_MAIN,
			ChainType::Test => MAGIC_TEST,
			ChainType::Regtest => MAGIC_REGTEST,
		}
	}

	fn next_peer_id(&self) -> PeerId {
		PeerId(self.next_peer_id.fetch_add(1, Ordering::Relaxed))
	}

	/// Binds the listener and runs the accept loop, outbound dialer and
	/// housekeeping timer until `stop_state` is tripped, then persists
	/// address book and ban list one last time.
	pub async fn run(self: Arc<Node>) -> Result<(), ServerError> {
		let listen_addr: SocketAddr = self
			.config
			.p2p
			.listen_addr
			.parse()
			.map_err(|_| ServerError::InvalidAddr(self.config.p2p.listen_addr.clone()))?;
		let listener = TcpListener::bind(listen_addr).await?;
		info!("listening for peers on {}", listen_addr);

		let accept_node = Arc::clone(&self);
		tokio::spawn(async move { accept_node.accept_loop(listener).await });

		// Redial the peers we were last talking to before anything else
		//: an eclipse attacker who has
		// fully poisoned our `new`/`tried` tables still can't steer this
		// node's very first outbound connections on restart.
		self.dial_anchors().await;

		let dial_node = Arc::clone(&self);
		tokio::spawn(async move { dial_node.dial_loop().await });

		let housekeeping_node = Arc::clone(&self);
		tokio::spawn(async move { housekeeping_node.housekeeping_loop().await });

		self.stop_state.wait_stop().await;
		info!("shutting down, persisting peer state");
		if let Err(e) = self.address_manager.save() {
			warn!("failed to save address manager: {}", e);
		}
		if let Err(e) = self.banman.save() {
			warn!("failed to save ban list: {}", e);
		}
		Ok(())
	}

	async fn accept_loop(self: Arc<Node>, listener: TcpListener) {
		loop {
			tokio::select! {
				_ = self.stop_state.wait_stop() => return,
				accepted = listener.accept() => {
					match accepted {
						Ok((stream, addr)) => self.handle_inbound(stream, addr),
						Err(e) => warn!("accept failed: {}", e),
					}
				}
			}
		}
	}

	fn handle_inbound(self: &Arc<Node>, stream: TcpStream, addr: SocketAddr) {
		let now = now_secs();
		if self.banman.is_banned(addr.ip(), now) {
			debug!("refusing connection from banned address {}", addr);
			return;
		}

		let id = self.next_peer_id();
		let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
		let peer = Arc::new(Peer::new_with_nonce(id, addr, Direction::Inbound, self.magic(), tx, self.local_nonce));

		match self.peer_manager.try_add_inbound(Arc::clone(&peer), now) {
			InboundOutcome::Added => {}
			InboundOutcome::Evicted(victim) => {
				debug!("evicting inbound peer {:?} to admit {}", victim.id, addr);
				let node = Arc::clone(self);
				post_disconnect(victim, move |p| node.teardown_peer(p.id));
			}
			InboundOutcome::Rejected => {
				debug!("refusing inbound connection from {}, at capacity", addr);
				return;
			}
		}

		self.spawn_connection(stream, peer, rx);
	}

	/// Dials the address manager's remembered anchors, up to
	/// whatever headroom `max_outbound` leaves; best-effort, never blocks
	/// startup on a slow or dead anchor longer than one connect attempt each.
	async fn dial_anchors(self: &Arc<Node>) {
		for addr in self.address_manager.anchors() {
			if self.peer_manager.outbound_count() >= self.config.p2p.max_outbound {
				break;
			}
			debug!("dialing remembered anchor {}", addr.0);
			self.try_dial(addr).await;
		}
	}

	async fn dial_loop(self: Arc<Node>) {
		loop {
			if self.peer_manager.outbound_count() < self.config.p2p.max_outbound {
				if let Some(addr) = self.address_manager.select() {
					self.try_dial(addr).await;
				}
			}
			tokio::select! {
				_ = self.stop_state.wait_stop() => return,
				_ = tokio::time::sleep(Duration::from_secs(DIAL_RETRY_SECS)) => {}
			}
		}
	}

	async fn try_dial(self: &Arc<Node>, addr: NetAddress) {
		let now = now_secs();
		if self.banman.is_banned(addr.0.ip(), now) {
			return;
		}
		if self.peer_manager.all().iter().any(|p| p.addr == addr.0) {
			return;
		}
		self.address_manager.attempt(addr, now);
		match alpha_p2p::dial(addr.0).await {
			Ok(stream) => {
				let id = self.next_peer_id();
				let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
				let peer = Arc::new(Peer::new_with_nonce(id, addr.0, Direction::Outbound, self.magic(), tx, self.local_nonce));
				if !self.peer_manager.try_add_outbound(Arc::clone(&peer)) {
					return;
				}
				peer.send_version(self.chainstate.tip_height() as i32);
				self.spawn_connection(stream, peer, rx);
			}
			Err(e) => {
				debug!("dial {} failed: {}", addr.0, e);
				self.address_manager.failed(addr, now);
			}
		}
	}

	/// Wires the reader/writer tasks for one connection:
	/// every parsed frame is fed through `alpha_p2p::dispatch`, and whatever
	/// it forwards is handled here; whatever it tears down is cleaned up
	/// across `PeerManager`/`HeaderSync`/`Relay` via `teardown_peer`.
	fn spawn_connection(self: &Arc<Node>, stream: TcpStream, peer: Arc<Peer>, rx: UnboundedReceiver<Vec<u8>>) {
		let node = Arc::clone(self);
		let our_start_height = self.chainstate.tip_height() as i32;
		let local_nonce = self.local_nonce;
		let ready_announced = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
		let event_peer = Arc::clone(&peer);

		let on_event = move |event: ReadEvent| {
			let teardown_node = Arc::clone(&node);
			let forwarded = alpha_p2p::dispatch(&event_peer, event, local_nonce, our_start_height, move |p| {
				// Crossing the ban threshold discourages the address, not just
				// this connection — a disconnect over a
				// ping timeout or capacity eviction must not trigger this, so
				// this lives here rather than inside `teardown_peer` itself.
				if p.score.score() >= alpha_p2p::BAN_THRESHOLD {
					teardown_node.banman.discourage(p.addr.ip(), now_secs());
				}
				teardown_node.teardown_peer(p.id);
			});
			if let Some(msg) = forwarded {
				node.handle_forwarded(&event_peer, msg);
			}
			if event_peer.is_ready() && !ready_announced.swap(true, Ordering::SeqCst) {
				node.on_peer_ready(&event_peer);
			}
		};

		alpha_p2p::spawn(stream, peer, rx, on_event);
	}

	/// Runs once a peer's handshake completes:
	/// marks outbound addresses `good` and kicks off header sync if nothing
	/// else is currently driving it.
	fn on_peer_ready(self: &Arc<Node>, peer: &Arc<Peer>) {
		if peer.direction == Direction::Outbound {
			self.address_manager.good(NetAddress(peer.addr), now_secs());
			self.address_manager.record_anchor(NetAddress(peer.addr));
		}
		self.header_sync.maybe_start_sync(peer);
	}

	/// Dispatches whatever `alpha_p2p::dispatch` forwarded: traffic the peer
	/// actor itself doesn't own an opinion on.
	fn handle_forwarded(self: &Arc<Node>, peer: &Arc<Peer>, msg: Message) {
		match msg {
			Message::Addr(payload) => {
				let now = now_secs();
				for entry in payload.addresses {
					self.address_manager.add(entry.addr, now);
				}
			}
			Message::GetAddr => {
				// No address sampling surface yet; nothing to offer beyond
				// what organic `addr` gossip already provides.
			}
			Message::Inv(payload) => {
				if let Some(reply) = self.relay.on_inv(&self.chainstate, &payload) {
					peer.send(&reply);
				}
			}
			Message::GetData(_) | Message::NotFound(_) => {
				// Headers-first node: "block" inventory already is the
				// header, fetched via getheaders/headers, not getdata.
			}
			Message::GetHeaders(payload) => {
				let reply = self.relay.on_getheaders(&payload);
				peer.send(&reply);
			}
			Message::Headers(payload) => {
				let now = now_secs().clamp(0, u32::MAX as i64) as u32;
				match self.header_sync.on_headers(peer, payload, now) {
					HeaderSyncAction::None => {}
					HeaderSyncAction::RequestMore(msg) => peer.send(&msg),
					HeaderSyncAction::Disconnect => {
						let node = Arc::clone(self);
						post_disconnect(Arc::clone(peer), move |p| node.teardown_peer(p.id));
					}
				}
			}
			Message::Version(_) | Message::Verack | Message::Ping { .. } | Message::Pong { .. } | Message::Unknown(_) => {
				// Handled inside Peer::handle_message; never forwarded here.
			}
		}
	}

	/// Idempotent cleanup once a peer is gone, wherever the disconnect
	/// originated.
	fn teardown_peer(self: &Arc<Node>, id: PeerId) {
		self.peer_manager.remove(id);
		self.header_sync.on_peer_disconnected(id);
		self.relay.on_peer_disconnected(id);
	}

	async fn housekeeping_loop(self: Arc<Node>) {
		loop {
			tokio::select! {
				_ = self.stop_state.wait_stop() => return,
				_ = tokio::time::sleep(Duration::from_secs(HOUSEKEEPING_INTERVAL_SECS)) => {}
			}
			self.housekeeping_tick();
		}
	}

	/// One round of periodic maintenance.
	fn housekeeping_tick(self: &Arc<Node>) {
		let now = now_secs();
		for peer in self.peer_manager.all() {
			if peer.ping_timed_out(alpha_p2p::PING_TIMEOUT_SECS as i64)
				|| peer.stats.seconds_since_last_traffic() as u64 > alpha_p2p::INACTIVITY_TIMEOUT_SECS
			{
				debug!("disconnecting unresponsive peer {:?}", peer.id);
				let node = Arc::clone(self);
				post_disconnect(peer, move |p| node.teardown_peer(p.id));
				continue;
			}
			peer.maybe_send_ping();
		}

		let expired = self.chainstate.expire_orphans(now);
		if expired > 0 {
			debug!("expired {} stale orphan headers", expired);
		}

		self.address_manager.remove_stale(now);
		if let Err(e) = self.address_manager.save() {
			warn!("failed to save address manager: {}", e);
		}
		self.banman.clear_expired(now);
		if let Err(e) = self.banman.save() {
			warn!("failed to save ban list: {}", e);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alpha_config::{ChainType, P2pConfig, RpcConfig};
	use alpha_core::randomx::TestVmFactory;
	use alpha_util::LoggingConfig;

	fn config(dir: &std::path::Path) -> NodeConfig {
		NodeConfig {
			chain_type: ChainType::Regtest,
			data_dir: dir.to_path_buf(),
			p2p: P2pConfig {
				listen_addr: "127.0.0.1:0".to_string(),
				max_outbound: 8,
				max_inbound: 125,
				seeds: Vec::new(),
			},
			rpc: RpcConfig {
				enabled: false,
				listen_addr: "127.0.0.1:0".to_string(),
			},
			logging: LoggingConfig::default(),
		}
	}

	#[test]
	fn init_opens_a_fresh_data_dir_at_genesis() {
		let dir = tempfile::tempdir().unwrap();
		let node = Node::init(config(dir.path()), Arc::new(TestVmFactory)).unwrap();
		assert_eq!(node.chainstate.tip_height(), 0);
		assert_eq!(node.peer_manager.outbound_count(), 0);
		assert_eq!(node.address_manager.tried_len(), 0);
	}

	#[test]
	fn seed_addresses_are_loaded_into_the_new_table() {
		let dir = tempfile::tempdir().unwrap();
		let mut cfg = config(dir.path());
		cfg.p2p.seeds = vec!["203.0.113.9:8733".to_string(), "not-an-address".to_string()];
		let node = Node::init(cfg, Arc::new(TestVmFactory)).unwrap();
		assert_eq!(node.address_manager.new_len(), 1);
	}

	#[test]
	fn teardown_peer_is_idempotent() {
		let dir = tempfile::tempdir().unwrap();
		let node = Node::init(config(dir.path()), Arc::new(TestVmFactory)).unwrap();
		let id = PeerId(7);
		node.teardown_peer(id);
		node.teardown_peer(id);
	}

	#[tokio::test]
	async fn dial_anchors_stops_once_outbound_headroom_is_gone() {
		let dir = tempfile::tempdir().unwrap();
		let mut cfg = config(dir.path());
		cfg.p2p.max_outbound = 0;
		let node = Node::init(cfg, Arc::new(TestVmFactory)).unwrap();
		node.address_manager.record_anchor(NetAddress("203.0.113.9:8733".parse().unwrap()));
		// With no outbound headroom this must return without attempting to
		// dial the unreachable anchor, rather than blocking `run()` on a
		// TCP connect that's going to fail anyway.
		node.dial_anchors().await;
		assert_eq!(node.peer_manager.outbound_count(), 0);
	}
}
