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

//! Per-network genesis headers. Each network anchors its chain to a fixed
//! header with no predecessor.

use crate::consensus::Network;
use crate::hash::{Hash, ZERO_HASH};
use crate::header::Header;

/// Genesis header for `network`. `randomx_hash` is left zeroed: genesis is
/// never subjected to `ContextualCheckBlockHeader`, so no VM commitment is
/// ever computed for it.
pub fn genesis_header(network: Network) -> Header {
	match network {
		Network::Main => Header {
			version: 1,
			prev_hash: ZERO_HASH,
			miner_address: [0u8; 20],
			time: 1_735_689_600, // 2025-01-01T00:00:00Z
			bits: 0x1d00_ffff,
			nonce: 0,
			randomx_hash: ZERO_HASH,
		},
		Network::Test => Header {
			version: 1,
			prev_hash: ZERO_HASH,
			miner_address: [0u8; 20],
			time: 1_735_689_600,
			bits: 0x1e00_ffff,
			nonce: 0,
			randomx_hash: ZERO_HASH,
		},
		Network::Regtest => Header {
			version: 1,
			prev_hash: ZERO_HASH,
			miner_address: [0u8; 20],
			time: 1_296_688_602,
			bits: 0x207f_ffff,
			nonce: 0,
			randomx_hash: ZERO_HASH,
		},
	}
}

/// Convenience accessor used by callers that only need the hash, not the
/// full header (e.g. seeding a fresh block index).
pub fn genesis_hash(network: Network) -> Hash {
	genesis_header(network).hash()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn genesis_has_no_predecessor() {
		for net in [Network::Main, Network::Test, Network::Regtest] {
			assert_eq!(genesis_header(net).prev_hash, ZERO_HASH);
		}
	}

	#[test]
	fn genesis_hash_is_stable() {
		let a = genesis_hash(Network::Regtest);
		let b = genesis_hash(Network::Regtest);
		assert_eq!(a, b);
	}
}
