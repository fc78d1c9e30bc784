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

//! The Chainstate Manager: the single entry point headers
//! arrive through, from either sync or the RPC control surface. Owns the
//! block index, the orphan pool, the candidate tip set, and the
//! initial-block-download latch, all behind one re-entrant lock.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use alpha_core::consensus::{MEDIAN_TIME_SPAN, SUSPICIOUS_REORG_DEPTH};
use alpha_core::hash::ZERO_HASH;
use alpha_core::validation::{self, PowTier};
use alpha_core::{ChainWork, ConsensusParams, Hash, Header, Hashed, RejectReason};
use parking_lot::ReentrantMutex;

use crate::error::{Error, Result};
use crate::index::BlockIndex;
use crate::orphans::{OrphanPool, PeerId};
use crate::types::{BlockHandle, BlockStatus};

/// The result of submitting one header.
#[derive(Debug, PartialEq, Eq)]
pub enum AcceptOutcome {
	/// Accepted and indexed (the genesis case returns the genesis handle
	/// directly, step 3).
	Accepted(BlockHandle),
	/// Already present in the index; not an error.
	Duplicate,
	/// Parent not yet known; held in the orphan pool.
	Orphan,
}

/// Callbacks the Peer Engine and RPC surface register to learn about state
/// changes. Invoked while
/// `validation_mutex` is held: implementations MUST be
/// non-blocking and must not call back into the `ChainstateManager`.
pub trait ChainNotify: Send + Sync {
	fn block_connected(&self, _handle: BlockHandle, _header: &Header) {}
	fn block_disconnected(&self, _handle: BlockHandle, _header: &Header) {}
	fn tip_updated(&self, _handle: BlockHandle, _header: &Header) {}
}

/// Entry in the candidate tip set: every leaf `ValidTree`-or-better header.
/// Ordered `(chain_work desc, sequence_id asc, handle asc)`
/// so `BTreeSet`'s natural maximum is always the right next tip to
/// consider.
#[derive(Clone, Debug, PartialEq, Eq)]
struct CandidateTip {
	chain_work: ChainWork,
	sequence_id: u64,
	handle: BlockHandle,
}

impl Ord for CandidateTip {
	fn cmp(&self, other: &Self) -> Ordering {
		self.chain_work
			.cmp(&other.chain_work)
			.then_with(|| other.sequence_id.cmp(&self.sequence_id))
			.then_with(|| other.handle.cmp(&self.handle))
	}
}
impl PartialOrd for CandidateTip {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

struct Inner {
	index: BlockIndex,
	orphans: OrphanPool,
	candidates: BTreeSet<CandidateTip>,
}

impl Inner {
	fn candidate_of(&self, handle: BlockHandle) -> CandidateTip {
		let e = self.index.get(handle);
		CandidateTip {
			chain_work: e.chain_work.clone(),
			sequence_id: e.sequence_id,
			handle,
		}
	}
}

/// Owns the block index, orphan pool and candidate tip set behind one
/// re-entrant lock, so a callback invoked while the lock is held (e.g. a
/// notification handler that turns around and queries the tip) can't
/// deadlock against its caller.
pub struct ChainstateManager {
	params: ConsensusParams,
	vm_cache: Arc<alpha_core::randomx::VmCache>,
	inner: ReentrantMutex<RefCell<Inner>>,
	ibd_finished: AtomicBool,
	notify: parking_lot::RwLock<Vec<Arc<dyn ChainNotify>>>,
}

impl ChainstateManager {
	pub fn new(
		params: ConsensusParams,
		index_path: PathBuf,
		vm_cache: Arc<alpha_core::randomx::VmCache>,
	) -> Result<ChainstateManager> {
		let genesis = params.genesis;
		let index = BlockIndex::open(index_path, genesis, &params.pow_limit)?;
		let orphans = OrphanPool::new(
			alpha_core::consensus::MAX_ORPHAN_HEADERS,
			alpha_core::consensus::MAX_ORPHAN_HEADERS_PER_PEER,
			alpha_core::consensus::ORPHAN_EXPIRATION_SECS,
		);
		Ok(ChainstateManager {
			params,
			vm_cache,
			inner: ReentrantMutex::new(RefCell::new(Inner {
				index,
				orphans,
				candidates: BTreeSet::new(),
			})),
			ibd_finished: AtomicBool::new(false),
			notify: parking_lot::RwLock::new(Vec::new()),
		})
	}

	pub fn register_notify(&self, handler: Arc<dyn ChainNotify>) {
		self.notify.write().push(handler);
	}

	pub fn params(&self) -> &ConsensusParams {
		&self.params
	}

	/// The RandomX VM cache backing this chainstate's proof-of-work checks.
	/// Exposed so the `regtest`-only `generate(n)` control-surface call can
	/// mine headers against the exact same cache rather than standing up a
	/// second one with its own epoch VMs.
	pub fn vm_cache(&self) -> &Arc<alpha_core::randomx::VmCache> {
		&self.vm_cache
	}

	/// Whether this node still considers itself in initial block download.
	/// A one-way latch: once finished, never reverts,
	/// using `Release`/`Acquire` so every thread sees the flip promptly
	/// without needing the validation lock.
	pub fn is_initial_block_download(&self) -> bool {
		!self.ibd_finished.load(AtomicOrdering::Acquire)
	}

	/// How far behind "now" a tip timestamp may be and still count this
	/// node as caught up.
	const IBD_RECENCY_WINDOW_SECS: i64 = 24 * 60 * 60;

	fn maybe_finish_ibd(&self, tip_time: u32, now: u32) {
		if self.ibd_finished.load(AtomicOrdering::Acquire) {
			return;
		}
		if (tip_time as i64) >= self.params.genesis.time as i64
			&& now as i64 - tip_time as i64 <= Self::IBD_RECENCY_WINDOW_SECS
		{
			self.ibd_finished.store(true, AtomicOrdering::Release);
		}
	}

	pub fn tip_hash(&self) -> Hash {
		let guard = self.inner.lock();
		let inner = guard.borrow();
		inner.index.tip_entry().hash
	}

	pub fn tip_height(&self) -> u64 {
		let guard = self.inner.lock();
		let inner = guard.borrow();
		inner.index.tip_entry().height
	}

	pub fn tip_chain_work(&self) -> ChainWork {
		let guard = self.inner.lock();
		let inner = guard.borrow();
		inner.index.tip_entry().chain_work.clone()
	}

	pub fn header_by_hash(&self, hash: &Hash) -> Option<Header> {
		let guard = self.inner.lock();
		let inner = guard.borrow();
		inner.index.handle_of(hash).map(|h| inner.index.get(h).header)
	}

	pub fn chain_work_of(&self, hash: &Hash) -> Option<ChainWork> {
		let guard = self.inner.lock();
		let inner = guard.borrow();
		inner.index.handle_of(hash).map(|h| inner.index.get(h).chain_work.clone())
	}

	/// Height of an indexed header, for the RPC control surface's
	/// `get_header` which prints a header alongside its
	/// position in the index rather than just its wire fields.
	pub fn height_of(&self, hash: &Hash) -> Option<u64> {
		let guard = self.inner.lock();
		let inner = guard.borrow();
		inner.index.handle_of(hash).map(|h| inner.index.get(h).height)
	}

	pub fn contains(&self, hash: &Hash) -> bool {
		let guard = self.inner.lock();
		let inner = guard.borrow();
		inner.index.contains(hash)
	}

	/// The anti-DoS work threshold against the *current* tip: zero during IBD (any connecting header is
	/// welcome), otherwise `max(min_chain_work, tip.chain_work -
	/// work_per_block * anti_dos_buffer_blocks)`, clipped at zero.
	pub fn anti_dos_work_threshold(&self, anti_dos_buffer_blocks: u64) -> ChainWork {
		if self.is_initial_block_download() {
			return ChainWork::zero();
		}
		let guard = self.inner.lock();
		let inner = guard.borrow();
		let tip = inner.index.tip_entry();
		// "work_per_block" is approximated as the work of the tip's own
		// difficulty, the best available proxy for recent block work
		// without re-deriving every ancestor's bits.
		let work_per_block = alpha_core::target::work(tip.header.bits, &self.params.pow_limit);
		let buffer = work_per_block.mul_u64(anti_dos_buffer_blocks);
		let discounted = tip
			.chain_work
			.checked_sub(&buffer)
			.unwrap_or_else(ChainWork::zero);
		if discounted > self.params.min_chain_work {
			discounted
		} else {
			self.params.min_chain_work.clone()
		}
	}

	/// Builds a geometric-backoff block locator from the active chain tip
	///: `[tip, tip-1, tip-2, tip-4, tip-8, ..., genesis]`,
	/// capped at `max_len`.
	pub fn build_locator(&self, max_len: usize) -> Vec<Hash> {
		let guard = self.inner.lock();
		let inner = guard.borrow();
		let tip_height = inner.index.tip_entry().height;
		let mut locator = Vec::new();
		let mut step = 1u64;
		let mut height = tip_height;
		loop {
			if let Some(h) = inner.index.active_chain_at(height) {
				locator.push(inner.index.get(h).hash);
			}
			if height == 0 || locator.len() >= max_len {
				break;
			}
			if locator.len() >= 10 {
				step *= 2;
			}
			height = height.saturating_sub(step);
		}
		locator
	}

	/// The full header acceptance pipeline: dedup,
	/// cheap PoW, genesis/parent handling, failed-parent propagation,
	/// indexing, full PoW, contextual checks, and candidate-tip admission.
	/// Does *not* run `activate_best_chain` — callers (the sync protocol,
	/// once per batch; `submit_header`, once per call) decide when to.
	pub fn accept_header(&self, header: Header, from: PeerId, now: u32) -> Result<AcceptOutcome> {
		let guard = self.inner.lock();
		let mut inner = guard.borrow_mut();
		self.accept_header_locked(&mut inner, header, from, now)
	}

	fn accept_header_locked(&self, inner: &mut Inner, header: Header, from: PeerId, now: u32) -> Result<AcceptOutcome> {
		let hash = header.hash();

		// Step 1: duplicate check.
		if let Some(handle) = inner.index.handle_of(&hash) {
			if inner.index.get(handle).status.is_failed() {
				return Err(Error::Rejected(RejectReason::DuplicateHeader));
			}
			return Ok(AcceptOutcome::Duplicate);
		}

		// Step 2: cheap PoW, before any allocation tied to this header.
		validation::check_block_header(&header, &self.params, Some(&self.vm_cache), PowTier::CommitmentOnly)?;

		// Step 3: genesis special-casing.
		if hash == self.params.genesis.hash() {
			let handle = inner.index.handle_of(&hash).expect("genesis is always indexed");
			return Ok(AcceptOutcome::Accepted(handle));
		}
		if header.prev_hash == ZERO_HASH {
			return Err(Error::Rejected(RejectReason::PrevHeaderInvalid));
		}

		// Step 4: parent lookup / orphan routing.
		let parent_handle = match inner.index.handle_of(&header.prev_hash) {
			Some(h) => h,
			None => {
				inner.orphans.insert(header, from, now as i64)?;
				return Ok(AcceptOutcome::Orphan);
			}
		};

		// Step 5: failed-parent propagation.
		if inner.index.get(parent_handle).status.is_failed() {
			inner
				.index
				.insert(header, parent_handle, BlockStatus::FailedChild, &self.params.pow_limit);
			return Err(Error::Rejected(RejectReason::PrevHeaderInvalid));
		}

		// Step 6: indexing, ahead of the expensive checks below.
		let handle = inner
			.index
			.insert(header, parent_handle, BlockStatus::ValidHeader, &self.params.pow_limit);

		// Step 7: full PoW.
		if let Err(reason) = validation::check_block_header(&header, &self.params, Some(&self.vm_cache), PowTier::Full) {
			inner.index.set_status(handle, BlockStatus::FailedValid);
			return Err(Error::Rejected(reason));
		}

		// Step 8: contextual checks (MTP, future-drift, ASERT bits).
		let ancestor_handles = inner.index.ancestors(parent_handle, MEDIAN_TIME_SPAN);
		let ancestor_times: Vec<u32> = ancestor_handles.iter().map(|h| inner.index.get(*h).header.time).collect();
		let parent_height = inner.index.get(parent_handle).height;
		if let Err(reason) = validation::contextual_check_block_header(&header, parent_height, &ancestor_times, &self.params, now) {
			inner.index.set_status(handle, BlockStatus::FailedValid);
			return Err(Error::Rejected(reason));
		}

		// Step 9: mark VALID_TREE, update the candidate tip set.
		inner.index.set_status(handle, BlockStatus::ValidTree);
		if let Some(parent_candidate) = {
			let c = inner.candidate_of(parent_handle);
			if inner.candidates.contains(&c) {
				Some(c)
			} else {
				None
			}
		} {
			inner.candidates.remove(&parent_candidate);
		}
		inner.candidates.insert(inner.candidate_of(handle));

		// Step 10: cascade orphans waiting on this header.
		self.process_orphan_headers(inner, hash, now);

		Ok(AcceptOutcome::Accepted(handle))
	}

	/// Iteratively (not recursively, since a deep orphan chain would blow the
	/// stack) re-attempts every orphan waiting on `parent`,
	/// and every orphan newly unblocked by those, bounding total work so a
	/// crafted orphan chain can't loop forever.
	fn process_orphan_headers(&self, inner: &mut Inner, parent: Hash, now: u32) {
		const MAX_CASCADE_WORK: usize = 100_000;
		let mut queue: Vec<Hash> = vec![parent];
		let mut processed = 0usize;
		while let Some(parent_hash) = queue.pop() {
			let released = inner.orphans.take_children_of(&parent_hash);
			for orphan in released {
				processed += 1;
				if processed > MAX_CASCADE_WORK {
					return;
				}
				let child_hash = orphan.header.hash();
				if self
					.accept_header_locked(inner, orphan.header, orphan.received_from, now)
					.is_ok()
				{
					queue.push(child_hash);
				}
			}
		}
	}

	/// Re-evaluates the candidate tip set against the current active tip
	/// and switches to a better chain if one exists. Applies the reorg-depth safety policy: a
	/// reorg deeper than `SUSPICIOUS_REORG_DEPTH` is refused rather than
	/// activated silently (old tip kept, a notification still fires).
	pub fn activate_best_chain(&self, now: u32) -> Result<bool> {
		let guard = self.inner.lock();
		let mut inner = guard.borrow_mut();

		let current_tip = inner.index.tip();
		let current_work = inner.index.get(current_tip).chain_work.clone();

		let best = match inner.candidates.iter().next_back() {
			Some(c) if c.chain_work > current_work => c.handle,
			_ => return Ok(false),
		};
		if best == current_tip {
			return Ok(false);
		}

		let fork_point = inner.index.find_fork_point(current_tip, best);
		let depth = inner.index.get(current_tip).height - inner.index.get(fork_point).height;
		if depth > SUSPICIOUS_REORG_DEPTH {
			return Err(Error::SuspiciousReorg { depth });
		}

		let fork_height = inner.index.get(fork_point).height;

		let mut new_chain = inner.index.ancestors(best, usize::MAX);
		new_chain.reverse();
		let newly_connected: Vec<BlockHandle> = new_chain.iter().skip(fork_height as usize + 1).copied().collect();
		let disconnected: Vec<BlockHandle> = inner
			.index
			.active_chain()
			.iter()
			.skip(fork_height as usize + 1)
			.rev()
			.copied()
			.collect();

		for h in &disconnected {
			let header = inner.index.get(*h).header;
			for n in self.notify.read().iter() {
				n.block_disconnected(*h, &header);
			}
		}

		inner.index.set_active_chain(new_chain);
		inner.index.save()?;

		for h in &newly_connected {
			let header = inner.index.get(*h).header;
			for n in self.notify.read().iter() {
				n.block_connected(*h, &header);
			}
		}
		let tip_entry = inner.index.tip_entry().clone();
		for n in self.notify.read().iter() {
			n.tip_updated(best, &tip_entry.header);
		}

		self.maybe_finish_ibd(tip_entry.header.time, now);
		Ok(true)
	}

	/// Runs `CheckHeadersPoW`:
	/// COMMITMENT_ONLY on every element, failing fast on the first rejection.
	pub fn check_headers_pow(&self, headers: &[Header]) -> std::result::Result<(), RejectReason> {
		for h in headers {
			validation::check_block_header(h, &self.params, Some(&self.vm_cache), PowTier::CommitmentOnly)?;
		}
		Ok(())
	}

	/// Builds the `headers` response to a peer's `getheaders` locator
	///: finds the most recent
	/// locator entry that is on our active chain, then walks forward from
	/// there, stopping at `max` headers or at `hash_stop`.
	pub fn headers_from_locator(&self, locator: &[Hash], hash_stop: Hash, max: usize) -> Vec<Header> {
		let guard = self.inner.lock();
		let inner = guard.borrow();

		let start_height = locator
			.iter()
			.filter_map(|h| inner.index.handle_of(h))
			.find(|h| inner.index.is_in_active_chain(*h))
			.map(|h| inner.index.get(h).height + 1)
			.unwrap_or(0);

		let mut headers = Vec::new();
		let mut height = start_height;
		while headers.len() < max {
			let handle = match inner.index.active_chain_at(height) {
				Some(h) => h,
				None => break,
			};
			let entry = inner.index.get(handle);
			headers.push(entry.header);
			if entry.hash == hash_stop {
				break;
			}
			height += 1;
		}
		headers
	}

	/// Periodic housekeeping: drops orphans older than the configured
	/// expiry.
	pub fn expire_orphans(&self, now: i64) -> usize {
		let guard = self.inner.lock();
		let mut inner = guard.borrow_mut();
		inner.orphans.expire(now)
	}

	pub fn orphan_count(&self) -> usize {
		let guard = self.inner.lock();
		let inner = guard.borrow();
		inner.orphans.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alpha_core::consensus::Network;
	use alpha_core::randomx::{TestVmFactory, VmCache};

	fn manager() -> (ChainstateManager, tempfile::TempDir) {
		let dir = tempfile::tempdir().unwrap();
		let params = ConsensusParams::for_network(Network::Regtest);
		let vm_cache = Arc::new(VmCache::new(Arc::new(TestVmFactory), 2));
		let mgr = ChainstateManager::new(params, dir.path().join("index.json"), vm_cache).unwrap();
		(mgr, dir)
	}

	/// Mines a header extending `prev` by brute-forcing a nonce until the
	/// commitment (not the raw RandomX output) meets target, matching what
	/// `CommitmentOnly` verification actually checks.
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
				bits: validation::next_bits_asert(prev_height, prev.time + 1, &params),
				nonce,
				randomx_hash: ZERO_HASH,
			};
			candidate.randomx_hash =
				vm_cache.randomx_output_for(&candidate, params.randomx_epoch_duration, params.genesis.time);
			if validation::check_block_header(&candidate, &params, None, PowTier::CommitmentOnly).is_ok() {
				return candidate;
			}
			nonce += 1;
		}
	}

	#[test]
	fn linear_chain_extends_tip_after_activation() {
		let (mgr, _dir) = manager();
		let genesis = ConsensusParams::for_network(Network::Regtest).genesis;
		let h1 = mine(genesis, 0, 0);
		let outcome = mgr.accept_header(h1, 1, h1.time).unwrap();
		assert!(matches!(outcome, AcceptOutcome::Accepted(_)));
		assert!(mgr.activate_best_chain(h1.time).unwrap());
		assert_eq!(mgr.tip_hash(), h1.hash());
	}

	#[test]
	fn duplicate_header_is_not_an_error() {
		let (mgr, _dir) = manager();
		let genesis = ConsensusParams::for_network(Network::Regtest).genesis;
		let h1 = mine(genesis, 0, 0);
		mgr.accept_header(h1, 1, h1.time).unwrap();
		let second = mgr.accept_header(h1, 1, h1.time).unwrap();
		assert_eq!(second, AcceptOutcome::Duplicate);
	}

	#[test]
	fn orphan_cascade_connects_once_parent_arrives() {
		let (mgr, _dir) = manager();
		let genesis = ConsensusParams::for_network(Network::Regtest).genesis;
		let h1 = mine(genesis, 0, 0);
		let h2 = mine(h1, 1, 0);

		let outcome = mgr.accept_header(h2, 1, h2.time).unwrap();
		assert_eq!(outcome, AcceptOutcome::Orphan);
		assert_eq!(mgr.orphan_count(), 1);

		mgr.accept_header(h1, 1, h1.time).unwrap();
		assert_eq!(mgr.orphan_count(), 0);
		assert!(mgr.activate_best_chain(h2.time).unwrap());
		assert_eq!(mgr.tip_hash(), h2.hash());
	}

	#[test]
	fn reorg_to_more_work_fires_disconnect_then_connect() {
		use std::sync::Mutex;

		struct Recorder(Mutex<Vec<String>>);
		impl ChainNotify for Recorder {
			fn block_connected(&self, _h: BlockHandle, header: &Header) {
				self.0.lock().unwrap().push(format!("connect:{}", header.hash()));
			}
			fn block_disconnected(&self, _h: BlockHandle, header: &Header) {
				self.0.lock().unwrap().push(format!("disconnect:{}", header.hash()));
			}
		}

		let (mgr, _dir) = manager();
		let genesis = ConsensusParams::for_network(Network::Regtest).genesis;
		let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
		mgr.register_notify(recorder.clone());

		let a1 = mine(genesis, 0, 0);
		mgr.accept_header(a1, 1, a1.time).unwrap();
		mgr.activate_best_chain(a1.time).unwrap();
		assert_eq!(mgr.tip_hash(), a1.hash());

		// A competing branch from genesis, two blocks long: more chain_work
		// at equal difficulty wins on length alone.
		let b1 = mine(genesis, 0, 10_000);
		let b2 = mine(b1, 1, 0);
		mgr.accept_header(b1, 2, b1.time).unwrap();
		mgr.accept_header(b2, 2, b2.time).unwrap();
		assert!(mgr.activate_best_chain(b2.time).unwrap());
		assert_eq!(mgr.tip_hash(), b2.hash());

		let log = recorder.0.lock().unwrap();
		let disconnect_pos = log.iter().position(|e| e == &format!("disconnect:{}", a1.hash())).unwrap();
		let connect_pos = log.iter().position(|e| e == &format!("connect:{}", b2.hash())).unwrap();
		assert!(disconnect_pos < connect_pos);
	}

	#[test]
	fn headers_from_locator_starts_after_the_fork_point() {
		let (mgr, _dir) = manager();
		let genesis = ConsensusParams::for_network(Network::Regtest).genesis;
		let h1 = mine(genesis, 0, 0);
		let h2 = mine(h1, 1, 0);
		mgr.accept_header(h1, 1, h1.time).unwrap();
		mgr.accept_header(h2, 1, h2.time).unwrap();
		mgr.activate_best_chain(h2.time).unwrap();

		let locator = vec![genesis.hash()];
		let headers = mgr.headers_from_locator(&locator, alpha_core::hash::ZERO_HASH, 2000);
		assert_eq!(headers.len(), 2);
		assert_eq!(headers[0].hash(), h1.hash());
		assert_eq!(headers[1].hash(), h2.hash());
	}
}
