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

//! The orphan pool: headers whose `prev_hash` is not yet
//! known to the block index, held until their parent arrives or they expire.
//! Bounded both globally and per-peer so a single peer cannot exhaust the
//! pool on behalf of the rest of the network.

use std::collections::HashMap;

use alpha_core::{Hash, Header};

use crate::error::{Error, Result};

/// Identifies the peer that handed us a given header. A bare integer here
/// rather than a full `Peer` handle keeps this crate free of any networking
/// dependency; `sync` maps its own peer ids onto this type.
pub type PeerId = u64;

#[derive(Clone, Debug)]
pub struct OrphanEntry {
	pub header: Header,
	pub received_from: PeerId,
	pub received_at: i64,
}

/// Holds headers that don't yet connect to the index, indexed both by their
/// own hash and by the `prev_hash` they're waiting on so a newly accepted
/// header can pull its waiting children in one lookup.
pub struct OrphanPool {
	by_hash: HashMap<Hash, OrphanEntry>,
	waiting_on: HashMap<Hash, Vec<Hash>>,
	per_peer_count: HashMap<PeerId, usize>,
	global_limit: usize,
	per_peer_limit: usize,
	expiration_secs: i64,
}

impl OrphanPool {
	pub fn new(global_limit: usize, per_peer_limit: usize, expiration_secs: i64) -> OrphanPool {
		OrphanPool {
			by_hash: HashMap::new(),
			waiting_on: HashMap::new(),
			per_peer_count: HashMap::new(),
			global_limit,
			per_peer_limit,
			expiration_secs,
		}
	}

	pub fn len(&self) -> usize {
		self.by_hash.len()
	}

	pub fn contains(&self, hash: &Hash) -> bool {
		self.by_hash.contains_key(hash)
	}

	/// Inserts a header that doesn't connect to the index yet. The per-peer bound is enforced by rejection (orphaning is
	/// legal; a peer that hits its own cap is not penalized). The global
	/// bound is enforced by evicting the globally-oldest orphan instead —
	/// a new insertion past the global limit displaces old state rather
	/// than being refused outright.
	pub fn insert(&mut self, header: Header, from: PeerId, now: i64) -> Result<()> {
		let hash = header.hash();
		if self.by_hash.contains_key(&hash) {
			return Ok(());
		}
		let peer_count = self.per_peer_count.entry(from).or_insert(0);
		if *peer_count >= self.per_peer_limit {
			return Err(Error::OrphanPoolFull);
		}
		*peer_count += 1;

		if self.by_hash.len() >= self.global_limit {
			if let Some(oldest) = self
				.by_hash
				.iter()
				.min_by_key(|(_, e)| e.received_at)
				.map(|(h, _)| *h)
			{
				self.remove(&oldest);
				self.waiting_on.retain(|_, v| {
					v.retain(|h| *h != oldest);
					!v.is_empty()
				});
			}
		}

		self.waiting_on.entry(header.prev_hash).or_default().push(hash);
		self.by_hash.insert(
			hash,
			OrphanEntry {
				header,
				received_from: from,
				received_at: now,
			},
		);
		Ok(())
	}

	/// Removes and returns every orphan directly waiting on `parent_hash`,
	/// called once `parent_hash` is accepted into the index so its children
	/// can be retried.
	pub fn take_children_of(&mut self, parent_hash: &Hash) -> Vec<OrphanEntry> {
		let Some(hashes) = self.waiting_on.remove(parent_hash) else {
			return Vec::new();
		};
		hashes
			.into_iter()
			.filter_map(|h| self.remove(&h))
			.collect()
	}

	fn remove(&mut self, hash: &Hash) -> Option<OrphanEntry> {
		let entry = self.by_hash.remove(hash)?;
		if let Some(count) = self.per_peer_count.get_mut(&entry.received_from) {
			*count = count.saturating_sub(1);
		}
		Some(entry)
	}

	/// Evicts every orphan older than `expiration_secs`, returning the
	/// number removed.
	pub fn expire(&mut self, now: i64) -> usize {
		let stale: Vec<Hash> = self
			.by_hash
			.iter()
			.filter(|(_, e)| now - e.received_at > self.expiration_secs)
			.map(|(h, _)| *h)
			.collect();
		let removed = stale.len();
		for hash in &stale {
			self.remove(hash);
			self.waiting_on.retain(|_, v| {
				v.retain(|h| h != hash);
				!v.is_empty()
			});
		}
		removed
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alpha_core::hash::ZERO_HASH;

	fn header_with_prev(prev: Hash, nonce: u32) -> Header {
		Header {
			version: 1,
			prev_hash: prev,
			miner_address: [0u8; 20],
			time: 0,
			bits: 0x207f_ffff,
			nonce,
			randomx_hash: ZERO_HASH,
		}
	}

	#[test]
	fn cascade_releases_waiting_children() {
		let mut pool = OrphanPool::new(100, 100, 600);
		let parent = header_with_prev(ZERO_HASH, 1);
		let child = header_with_prev(parent.hash(), 2);
		pool.insert(child.clone(), 7, 0).unwrap();
		assert_eq!(pool.len(), 1);

		let released = pool.take_children_of(&parent.hash());
		assert_eq!(released.len(), 1);
		assert_eq!(released[0].header.hash(), child.hash());
		assert_eq!(pool.len(), 0);
	}

	#[test]
	fn per_peer_limit_is_enforced() {
		let mut pool = OrphanPool::new(100, 1, 600);
		let h1 = header_with_prev(ZERO_HASH, 1);
		let h2 = header_with_prev(ZERO_HASH, 2);
		pool.insert(h1, 1, 0).unwrap();
		assert!(matches!(pool.insert(h2, 1, 0), Err(Error::OrphanPoolFull)));
	}

	#[test]
	fn expiry_removes_stale_entries_and_their_waiting_edge() {
		let mut pool = OrphanPool::new(100, 100, 10);
		let h1 = header_with_prev(ZERO_HASH, 1);
		pool.insert(h1, 1, 0).unwrap();
		assert_eq!(pool.expire(5), 0);
		assert_eq!(pool.expire(11), 1);
		assert_eq!(pool.len(), 0);
	}
}
