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

//! Core data model for the block index: `BlockIndexEntry`,
//! `BlockStatus`, and the handle type used to refer to entries without
//! repeatedly hashing a `Hash`.

use alpha_core::{ChainWork, Hash, Header};
use serde::{Deserialize, Serialize};

/// An opaque reference into the block index arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockHandle(pub u32);

/// Where a header stands in validation. `ActiveChain` membership is a *derived*
/// property of `BlockIndex::active_chain`, never stored here — `set_tip`
/// must not mutate status bits.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockStatus {
	/// Indexed but not yet checked (never observed at rest in this design;
	/// kept so the status space lines up with the full validation-state
	/// bitfield a header can in principle occupy).
	ValidUnknown,
	/// Commitment and full RandomX PoW both checked; not yet known to
	/// connect contextually (not observed at rest either, since headers are
	/// only indexed once both PoW tiers and the contextual check pass —
	/// kept for the same reason as `ValidUnknown`).
	ValidHeader,
	/// Parent linked, PoW and contextual checks passed: eligible to be (or
	/// to extend) a candidate tip.
	ValidTree,
	/// Failed PoW or a contextual check. Permanent; never reverts.
	FailedValid,
	/// Descends from a `FailedValid` (or another `FailedChild`) header.
	/// Permanent; never reverts. Never a candidate tip.
	FailedChild,
}

impl BlockStatus {
	pub fn is_failed(self) -> bool {
		matches!(self, BlockStatus::FailedValid | BlockStatus::FailedChild)
	}
}

/// One entry in the block index. Indexed by `BlockHandle`,
/// looked up by `hash` via the store's hash map.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockIndexEntry {
	pub header: Header,
	pub hash: Hash,
	pub height: u64,
	pub parent: Option<BlockHandle>,
	pub chain_work: ChainWork,
	pub status: BlockStatus,
	/// Monotonically increasing arrival order, the tie-breaker in the
	/// candidate tip set ordering after `chain_work`.
	pub sequence_id: u64,
}

impl BlockIndexEntry {
	pub fn is_genesis(&self) -> bool {
		self.parent.is_none()
	}
}
