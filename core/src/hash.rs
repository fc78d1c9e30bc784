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

//! The hash function used pervasively to identify headers: double SHA-256.

use std::fmt;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A 32-byte digest, used both as a header identity and as the PoW
/// commitment value.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hash(pub [u8; 32]);

/// The all-zero hash, used as `prev_hash` for the genesis header and as a
/// sentinel `hash_stop` in `getheaders`.
pub const ZERO_HASH: Hash = Hash([0u8; 32]);

impl Hash {
	/// Builds a `Hash` from a 32-byte slice. Panics if `slice.len() != 32`;
	/// callers at a deserialization boundary must length-check first.
	pub fn from_slice(slice: &[u8]) -> Hash {
		let mut buf = [0u8; 32];
		buf.copy_from_slice(slice);
		Hash(buf)
	}

	/// Borrows the hash as a byte slice.
	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}

	/// Whether this is the all-zero sentinel hash.
	pub fn is_zero(&self) -> bool {
		self.0 == [0u8; 32]
	}
}

impl fmt::Display for Hash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for b in self.0.iter() {
			write!(f, "{:02x}", b)?;
		}
		Ok(())
	}
}

impl fmt::Debug for Hash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Hash({})", self)
	}
}

/// Double SHA-256, the identity function for headers on the wire.
pub fn sha256d(data: &[u8]) -> Hash {
	let first = Sha256::digest(data);
	let second = Sha256::digest(first);
	Hash::from_slice(&second)
}

/// Types whose on-wire byte form determines their identity via `sha256d`.
pub trait Hashed {
	/// The exact byte form that gets hashed (the full wire serialization).
	fn bytes_for_hash(&self) -> Vec<u8>;

	/// The double-SHA-256 identity of this value.
	fn hash(&self) -> Hash {
		sha256d(&self.bytes_for_hash())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sha256d_is_stable() {
		let h1 = sha256d(b"alpha");
		let h2 = sha256d(b"alpha");
		assert_eq!(h1, h2);
		assert_ne!(h1, sha256d(b"beta"));
	}

	#[test]
	fn display_is_lowercase_hex() {
		let h = Hash([0xab; 32]);
		assert_eq!(h.to_string(), "ab".repeat(32));
	}
}
