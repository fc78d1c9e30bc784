// Copyright 2016 The Grin Developers
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

//! Consensus-relevant constants and per-network parameter sets, kept
//! separate from the validation algorithms that consume them.

use num_bigint::BigUint;
use num_traits::One;

use crate::header::Header;
use crate::target::{bits_to_target, ChainWork};

/// Median-time-past window size: a header's timestamp must exceed the
/// median of this many immediate ancestors.
pub const MEDIAN_TIME_SPAN: usize = 11;

/// A header's timestamp may not exceed "now" by more than this many seconds.
pub const MAX_FUTURE_BLOCK_TIME: i64 = 2 * 60 * 60;

/// Depth beyond which a chain reorganization is treated as suspicious and
/// requires operator confirmation rather than silent activation.
pub const SUSPICIOUS_REORG_DEPTH: u64 = 100;

/// How long an orphan header may be held in the orphan pool before expiry.
pub const ORPHAN_EXPIRATION_SECS: i64 = 10 * 60;

/// Global cap on the orphan pool across all peers.
pub const MAX_ORPHAN_HEADERS: usize = 1_000;

/// Per-peer cap on orphan headers, preventing one peer from exhausting the
/// global pool.
pub const MAX_ORPHAN_HEADERS_PER_PEER: usize = 50;

/// Which network a node is configured for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Network {
	Main,
	Test,
	Regtest,
}

/// All parameters that can vary between networks.
#[derive(Clone, Debug)]
pub struct ConsensusParams {
	pub network: Network,

	/// Target spacing between headers, in seconds.
	pub pow_target_spacing: i64,

	/// ASERT half-life: the time constant controlling how aggressively
	/// difficulty corrects towards the target spacing.
	pub asert_half_life: i64,

	/// Anchor block the ASERT algorithm measures time/height deltas from.
	/// In this design, the anchor is always the genesis header.
	pub asert_anchor_bits: u32,

	/// Duration of a single RandomX epoch, in seconds.
	pub randomx_epoch_duration: i64,

	/// Number of RandomX VM instances (keyed by epoch seed) kept warm in the
	/// LRU cache at once.
	pub randomx_cache_size: usize,

	/// Ceiling a decoded target may never exceed, regardless of what `bits`
	/// claims.
	pub pow_limit: BigUint,

	/// Chains with less than this cumulative work are rejected outright
	/// before touching the orphan pool or block index.
	pub min_chain_work: ChainWork,

	/// Floor below which a header's `version` is considered obsolete and
	/// rejected with `bad-version`.
	pub min_header_version: u32,

	pub genesis: Header,
}

impl ConsensusParams {
	pub fn for_network(network: Network) -> ConsensusParams {
		match network {
			Network::Main => mainnet_params(),
			Network::Test => testnet_params(),
			Network::Regtest => regtest_params(),
		}
	}

	/// Decodes `bits` against this network's `pow_limit`.
	pub fn target_for_bits(&self, bits: u32) -> Result<BigUint, crate::target::BitsError> {
		bits_to_target(bits, &self.pow_limit)
	}
}

fn max_target() -> BigUint {
	(BigUint::one() << 256u32) - BigUint::one()
}

fn mainnet_params() -> ConsensusParams {
	let pow_limit = &max_target() >> 32u32;
	ConsensusParams {
		network: Network::Main,
		pow_target_spacing: 150,
		asert_half_life: 2 * 24 * 60 * 60,
		asert_anchor_bits: 0x1d00_ffff,
		randomx_epoch_duration: 7 * 24 * 60 * 60,
		randomx_cache_size: 2,
		pow_limit,
		min_chain_work: ChainWork::from_u64(0),
		min_header_version: 1,
		genesis: crate::genesis::genesis_header(Network::Main),
	}
}

fn testnet_params() -> ConsensusParams {
	let pow_limit = &max_target() >> 16u32;
	ConsensusParams {
		network: Network::Test,
		pow_target_spacing: 150,
		asert_half_life: 2 * 24 * 60 * 60,
		asert_anchor_bits: 0x1e00_ffff,
		randomx_epoch_duration: 7 * 24 * 60 * 60,
		randomx_cache_size: 2,
		pow_limit,
		min_chain_work: ChainWork::from_u64(0),
		min_header_version: 1,
		genesis: crate::genesis::genesis_header(Network::Test),
	}
}

fn regtest_params() -> ConsensusParams {
	ConsensusParams {
		network: Network::Regtest,
		pow_target_spacing: 1,
		asert_half_life: 60,
		asert_anchor_bits: 0x207f_ffff,
		randomx_epoch_duration: 600,
		randomx_cache_size: 2,
		pow_limit: max_target(),
		min_chain_work: ChainWork::from_u64(0),
		min_header_version: 1,
		genesis: crate::genesis::genesis_header(Network::Regtest),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn each_network_has_distinct_genesis() {
		let main = ConsensusParams::for_network(Network::Main);
		let test = ConsensusParams::for_network(Network::Test);
		let reg = ConsensusParams::for_network(Network::Regtest);
		assert_ne!(main.genesis.hash(), test.genesis.hash());
		assert_ne!(test.genesis.hash(), reg.genesis.hash());
	}

	#[test]
	fn regtest_pow_limit_is_max_target() {
		let params = ConsensusParams::for_network(Network::Regtest);
		assert_eq!(params.pow_limit, max_target());
	}
}
