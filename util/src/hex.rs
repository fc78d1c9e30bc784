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

//! Hex encoding, used throughout the workspace to render hashes and headers
//! for logs and the RPC control surface.

use std::fmt::Write;
use std::num::ParseIntError;

/// Encodes the provided bytes into a lowercase hex string.
pub fn to_hex(bytes: &[u8]) -> String {
	let mut s = String::with_capacity(bytes.len() * 2);
	for byte in bytes {
		write!(&mut s, "{:02x}", byte).expect("writing to a String never fails");
	}
	s
}

/// Decodes a hex string (with or without a `0x` prefix) into bytes.
pub fn from_hex(hex_str: &str) -> Result<Vec<u8>, ParseIntError> {
	let trimmed = hex_str.strip_prefix("0x").unwrap_or(hex_str);
	(0..trimmed.len())
		.step_by(2)
		.map(|i| u8::from_str_radix(&trimmed[i..i + 2], 16))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips() {
		let bytes = vec![0u8, 1, 255, 16, 128];
		let hex = to_hex(&bytes);
		assert_eq!(from_hex(&hex).unwrap(), bytes);
		assert_eq!(from_hex(&format!("0x{}", hex)).unwrap(), bytes);
	}
}
