// Copyright 2021 The Grin Developers
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

//! The two-tier proof-of-work boundary. A header's
//! `randomx_hash` commits a RandomX VM output over the zeroed header bytes;
//! checking that commitment is expensive, so full verification is reserved
//! for headers that reach the tip (`FULL` tier) while headers still being
//! walked back through ancestry only get the cheap `COMMITMENT_ONLY`
//! sha256d check against `bits`.
//!
//! This module defines the boundary the rest of the crate validates
//! against (`RandomXVm`, `epoch_seed`) without depending on a concrete
//! RandomX binding; `node` wires in a real one, tests use the in-memory
//! double below.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash as StdHash, Hasher};
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use crate::hash::{sha256d, Hash};
use crate::header::Header;

/// Epoch seed: `sha256d("Alpha/RandomX/Epoch/" || decimal_string(epoch_index))`.
/// Hashing the literal fixes the exact byte layout so every implementation
/// derives the same seed for a given epoch.
pub fn epoch_seed(epoch_index: u64) -> Hash {
	let mut preimage = b"Alpha/RandomX/Epoch/".to_vec();
	preimage.extend_from_slice(epoch_index.to_string().as_bytes());
	sha256d(&preimage)
}

/// Which epoch a header's timestamp falls into, given the network's epoch
/// duration.
pub fn epoch_index(header_time: u32, genesis_time: u32, epoch_duration_secs: i64) -> u64 {
	let elapsed = (header_time as i64 - genesis_time as i64).max(0);
	(elapsed / epoch_duration_secs) as u64
}

/// A RandomX virtual machine keyed to one epoch's seed. Implementations
/// wrap the real RandomX dataset/cache construction; the boundary here only
/// needs a `hash(bytes) -> 32-byte output` operation.
pub trait RandomXVm: Send + Sync {
	/// Computes the RandomX output for the zeroed-header preimage.
	fn hash(&self, preimage: &[u8]) -> Hash;
}

/// Builds a `RandomXVm` for a given epoch seed. Swappable so `node` can
/// plug in a real RandomX binding without this crate depending on it.
pub trait RandomXVmFactory: Send + Sync {
	fn build(&self, seed: &[u8]) -> Arc<dyn RandomXVm>;
}

/// LRU cache of live VM instances keyed by epoch seed.
pub struct VmCache {
	factory: Arc<dyn RandomXVmFactory>,
	cache: Mutex<LruCache<Vec<u8>, Arc<dyn RandomXVm>>>,
}

impl VmCache {
	pub fn new(factory: Arc<dyn RandomXVmFactory>, capacity: usize) -> VmCache {
		let capacity = std::num::NonZeroUsize::new(capacity.max(1)).unwrap();
		VmCache {
			factory,
			cache: Mutex::new(LruCache::new(capacity)),
		}
	}

	/// Returns the VM for `seed`, building and inserting it on a cache miss.
	pub fn get(&self, seed: &[u8]) -> Arc<dyn RandomXVm> {
		let mut cache = self.cache.lock();
		if let Some(vm) = cache.get(seed) {
			return vm.clone();
		}
		let vm = self.factory.build(seed);
		cache.put(seed.to_vec(), vm.clone());
		vm
	}

	/// Computes the commitment a full-tier check must verify against
	/// `header.randomx_hash`.
	pub fn randomx_output_for(&self, header: &Header, epoch_duration_secs: i64, genesis_time: u32) -> Hash {
		let epoch = epoch_index(header.time, genesis_time, epoch_duration_secs);
		let seed = epoch_seed(epoch);
		let vm = self.get(seed.as_bytes());
		let preimage = crate::ser::serialize(&header.with_randomx_hash_zeroed());
		vm.hash(&preimage)
	}
}

/// An in-memory `RandomXVm`/`RandomXVmFactory` double used by tests and by
/// `regtest`, where constructing a real RandomX dataset would be far too
/// slow to be useful. Deterministic but not cryptographically meaningful.
pub struct TestVm {
	seed: Vec<u8>,
}

impl RandomXVm for TestVm {
	fn hash(&self, preimage: &[u8]) -> Hash {
		let mut hasher = DefaultHasher::new();
		self.seed.hash(&mut hasher);
		preimage.hash(&mut hasher);
		let lo = hasher.finish();

		let mut hasher2 = DefaultHasher::new();
		lo.hash(&mut hasher2);
		let hi = hasher2.finish();

		let mut bytes = [0u8; 32];
		bytes[..8].copy_from_slice(&lo.to_le_bytes());
		bytes[8..16].copy_from_slice(&hi.to_le_bytes());
		Hash(bytes)
	}
}

pub struct TestVmFactory;

impl RandomXVmFactory for TestVmFactory {
	fn build(&self, seed: &[u8]) -> Arc<dyn RandomXVm> {
		Arc::new(TestVm { seed: seed.to_vec() })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn epoch_seed_has_the_expected_byte_layout() {
		assert_eq!(epoch_seed(0), sha256d(b"Alpha/RandomX/Epoch/0"));
		assert_eq!(epoch_seed(42), sha256d(b"Alpha/RandomX/Epoch/42"));
		assert_ne!(epoch_seed(0), epoch_seed(42));
	}

	#[test]
	fn epoch_index_advances_with_time() {
		assert_eq!(epoch_index(0, 0, 100), 0);
		assert_eq!(epoch_index(99, 0, 100), 0);
		assert_eq!(epoch_index(100, 0, 100), 1);
	}

	#[test]
	fn vm_cache_reuses_instances_for_same_seed() {
		let cache = VmCache::new(Arc::new(TestVmFactory), 2);
		let a = cache.get(b"seed-a");
		let b = cache.get(b"seed-a");
		assert!(Arc::ptr_eq(&a, &b));
	}

	#[test]
	fn commitment_is_deterministic() {
		let cache = VmCache::new(Arc::new(TestVmFactory), 2);
		let header = crate::genesis::genesis_header(crate::consensus::Network::Regtest);
		let a = cache.randomx_output_for(&header, 600, header.time);
		let b = cache.randomx_output_for(&header, 600, header.time);
		assert_eq!(a, b);
	}
}
