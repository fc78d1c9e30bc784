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

//! The Block Index Store: an arena of every header this
//! node has ever seen pass validation, addressed by `BlockHandle`, with an
//! O(1) `Hash -> BlockHandle` lookup and a persisted snapshot.

use std::collections::HashMap;

use alpha_core::{target, ChainWork, Hash, Header, Hashed};
use alpha_store::JsonStore;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{BlockHandle, BlockIndexEntry, BlockStatus};

#[derive(Serialize, Deserialize)]
struct Snapshot {
	entries: Vec<BlockIndexEntry>,
	active_chain: Vec<BlockHandle>,
}

/// The arena-backed index. `entries[handle.0]` is that handle's entry;
/// handles are never reused, so a `BlockHandle` remains valid for the life
/// of the process once issued.
pub struct BlockIndex {
	entries: Vec<BlockIndexEntry>,
	by_hash: HashMap<Hash, BlockHandle>,
	/// The active chain, genesis-first, updated only by
	/// `ChainstateManager::activate_best_chain`.
	active_chain: Vec<BlockHandle>,
	next_sequence_id: u64,
	store: JsonStore,
}

impl BlockIndex {
	/// Opens (or initializes) the index at `path`, seeding it with
	/// `genesis` if no snapshot exists yet.
	pub fn open(path: std::path::PathBuf, genesis: Header, pow_limit: &BigUint) -> Result<BlockIndex> {
		let store = JsonStore::new(path);
		let mut index = BlockIndex {
			entries: Vec::new(),
			by_hash: HashMap::new(),
			active_chain: Vec::new(),
			next_sequence_id: 0,
			store,
		};
		if let Some(snapshot) = index.store.load::<Snapshot>()? {
			index.entries = snapshot.entries;
			index.active_chain = snapshot.active_chain;
			index.next_sequence_id = index.entries.len() as u64;
			for (i, e) in index.entries.iter().enumerate() {
				index.by_hash.insert(e.hash, BlockHandle(i as u32));
			}
		} else {
			index.insert_genesis(genesis, pow_limit);
			index.save()?;
		}
		Ok(index)
	}

	fn insert_genesis(&mut self, genesis: Header, pow_limit: &BigUint) {
		let hash = genesis.hash();
		let entry = BlockIndexEntry {
			header: genesis,
			hash,
			height: 0,
			parent: None,
			// Genesis carries the work of its own bits, not zero.
			chain_work: target::work(genesis.bits, pow_limit),
			status: BlockStatus::ValidTree,
			sequence_id: 0,
		};
		self.next_sequence_id = 1;
		let handle = BlockHandle(self.entries.len() as u32);
		self.entries.push(entry);
		self.by_hash.insert(hash, handle);
		self.active_chain.push(handle);
	}

	pub fn save(&self) -> Result<()> {
		let snapshot = Snapshot {
			entries: self.entries.clone(),
			active_chain: self.active_chain.clone(),
		};
		self.store.save(&snapshot)?;
		Ok(())
	}

	pub fn get(&self, handle: BlockHandle) -> &BlockIndexEntry {
		&self.entries[handle.0 as usize]
	}

	pub fn get_mut(&mut self, handle: BlockHandle) -> &mut BlockIndexEntry {
		&mut self.entries[handle.0 as usize]
	}

	pub fn handle_of(&self, hash: &Hash) -> Option<BlockHandle> {
		self.by_hash.get(hash).copied()
	}

	pub fn contains(&self, hash: &Hash) -> bool {
		self.by_hash.contains_key(hash)
	}

	/// Allocates a handle and a `sequence_id` for a header already known to
	/// connect to `parent`, without yet deciding its status — callers set
	/// `status` once contextual/PoW checks are complete.
	pub fn insert(&mut self, header: Header, parent: BlockHandle, status: BlockStatus, pow_limit: &BigUint) -> BlockHandle {
		let hash = header.hash();
		let parent_entry = self.get(parent);
		let chain_work = parent_entry.chain_work.clone() + target::work(header.bits, pow_limit);
		let height = parent_entry.height + 1;

		let sequence_id = self.next_sequence_id;
		self.next_sequence_id += 1;

		let entry = BlockIndexEntry {
			header,
			hash,
			height,
			parent: Some(parent),
			chain_work,
			status,
			sequence_id,
		};
		let handle = BlockHandle(self.entries.len() as u32);
		self.entries.push(entry);
		self.by_hash.insert(hash, handle);
		handle
	}

	pub fn set_status(&mut self, handle: BlockHandle, status: BlockStatus) {
		self.get_mut(handle).status = status;
	}

	/// The current active-chain tip.
	pub fn tip(&self) -> BlockHandle {
		*self.active_chain.last().expect("active chain always has at least genesis")
	}

	pub fn tip_entry(&self) -> &BlockIndexEntry {
		self.get(self.tip())
	}

	pub fn active_chain(&self) -> &[BlockHandle] {
		&self.active_chain
	}

	pub fn active_chain_at(&self, height: u64) -> Option<BlockHandle> {
		self.active_chain.get(height as usize).copied()
	}

	/// Whether `handle` is on the active chain. Derived from the active-chain vector, not
	/// a status bit — `set_tip` never mutates status.
	pub fn is_in_active_chain(&self, handle: BlockHandle) -> bool {
		self.active_chain.get(self.get(handle).height as usize) == Some(&handle)
	}

	/// Replaces the active chain wholesale — called by
	/// `ChainstateManager::activate_best_chain` once a reorg decision has
	/// been made. Does not touch `status` on any entry.
	pub fn set_active_chain(&mut self, chain: Vec<BlockHandle>) {
		self.active_chain = chain;
	}

	/// Walks from `handle` back to genesis, collecting ancestor handles
	/// most-recent-first. Used both for median-time-past windows and for
	/// building a reorg's fork point.
	pub fn ancestors(&self, handle: BlockHandle, max: usize) -> Vec<BlockHandle> {
		let mut out = Vec::with_capacity(max.min(self.entries.len() + 1));
		let mut cur = Some(handle);
		while let Some(h) = cur {
			out.push(h);
			if out.len() >= max {
				break;
			}
			cur = self.get(h).parent;
		}
		out
	}

	/// Finds the most recent common ancestor of two handles by walking both
	/// back to matching heights, then walking both back together.
	pub fn find_fork_point(&self, a: BlockHandle, b: BlockHandle) -> BlockHandle {
		let mut a = a;
		let mut b = b;
		while self.get(a).height > self.get(b).height {
			a = self.get(a).parent.expect("height > 0 implies a parent");
		}
		while self.get(b).height > self.get(a).height {
			b = self.get(b).parent.expect("height > 0 implies a parent");
		}
		while a != b {
			a = self.get(a).parent.expect("common ancestor exists at genesis");
			b = self.get(b).parent.expect("common ancestor exists at genesis");
		}
		a
	}
}
