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

//! The 100-byte block header.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::hash::{Hash, Hashed, ZERO_HASH};
use crate::ser::{self, Readable, Result, Writeable};

/// Fixed-width, 100 bytes on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Header {
	pub version: u32,
	pub prev_hash: Hash,
	pub miner_address: [u8; 20],
	pub time: u32,
	pub bits: u32,
	pub nonce: u32,
	pub randomx_hash: Hash,
}

/// Wire size of a `Header`: 4 + 32 + 20 + 4 + 4 + 4 + 32.
pub const HEADER_SIZE: usize = 100;

impl Header {
	/// Returns a copy of this header with `randomx_hash` zeroed, the
	/// pre-image both tiers of PoW verification hash over.
	pub fn with_randomx_hash_zeroed(&self) -> Header {
		Header {
			randomx_hash: ZERO_HASH,
			..*self
		}
	}
}

impl Writeable for Header {
	fn write<W: Write>(&self, w: &mut W) -> Result<()> {
		self.version.write(w)?;
		self.prev_hash.0.write(w)?;
		w.write_all(&self.miner_address)?;
		self.time.write(w)?;
		self.bits.write(w)?;
		self.nonce.write(w)?;
		self.randomx_hash.0.write(w)?;
		Ok(())
	}
}

impl Readable for Header {
	fn read<R: Read>(r: &mut R) -> Result<Self> {
		let version = u32::read(r)?;
		let prev_hash = Hash(<[u8; 32]>::read(r)?);
		let mut miner_address = [0u8; 20];
		r.read_exact(&mut miner_address)
			.map_err(ser::Error::from)?;
		let time = u32::read(r)?;
		let bits = u32::read(r)?;
		let nonce = u32::read(r)?;
		let randomx_hash = Hash(<[u8; 32]>::read(r)?);
		Ok(Header {
			version,
			prev_hash,
			miner_address,
			time,
			bits,
			nonce,
			randomx_hash,
		})
	}
}

impl Hashed for Header {
	fn bytes_for_hash(&self) -> Vec<u8> {
		ser::serialize(self)
	}
}

impl Header {
	/// The header's identity: `sha256d` of its full 100-byte wire form.
	pub fn hash(&self) -> Hash {
		Hashed::hash(self)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> Header {
		Header {
			version: 1,
			prev_hash: Hash([7u8; 32]),
			miner_address: [9u8; 20],
			time: 1_700_000_000,
			bits: 0x207f_ffff,
			nonce: 42,
			randomx_hash: Hash([3u8; 32]),
		}
	}

	#[test]
	fn wire_size_is_100_bytes() {
		let bytes = ser::serialize(&sample());
		assert_eq!(bytes.len(), HEADER_SIZE);
	}

	#[test]
	fn round_trips_through_wire_form() {
		let h = sample();
		let bytes = ser::serialize(&h);
		let back: Header = ser::deserialize_strict(&bytes).unwrap();
		assert_eq!(h, back);
	}

	#[test]
	fn hash_is_deterministic_and_changes_with_content() {
		let h = sample();
		let mut h2 = h;
		h2.nonce += 1;
		assert_eq!(h.hash(), h.hash());
		assert_ne!(h.hash(), h2.hash());
	}

	#[test]
	fn zeroing_randomx_hash_does_not_touch_other_fields() {
		let h = sample();
		let zeroed = h.with_randomx_hash_zeroed();
		assert_eq!(zeroed.randomx_hash, ZERO_HASH);
		assert_eq!(zeroed.version, h.version);
		assert_eq!(zeroed.nonce, h.nonce);
	}
}
