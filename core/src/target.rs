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

//! Compact ("bits") difficulty target encoding and the cumulative
//! `chain_work` accumulator.
//!
//! `bits` packs a 256-bit target the same way Bitcoin's `nBits` does: a
//! one-byte exponent and a three-byte mantissa, `target = mantissa *
//! 256^(exponent - 3)`. `ChainWork` wraps a `num_bigint::BigUint` for its
//! arithmetic, the same representation a 256-bit proof-of-work accumulator
//! needs regardless of what the compact target encoding looks like.

use std::fmt;
use std::ops::Add;

use num_bigint::BigUint;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

use crate::hash::Hash;

/// The largest value a 256-bit target can encode, used to reject overflowing
/// `bits` values.
fn max_target() -> BigUint {
	(BigUint::one() << 256u32) - BigUint::one()
}

/// Cumulative proof-of-work, summed along a parent-chain. Ordered so the candidate tip set can compare chains
/// directly.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChainWork(BigUint);

impl ChainWork {
	pub fn zero() -> ChainWork {
		ChainWork(BigUint::zero())
	}

	pub fn from_u64(v: u64) -> ChainWork {
		ChainWork(BigUint::from(v))
	}

	pub fn as_decimal_string(&self) -> String {
		self.0.to_str_radix(10)
	}

	/// `self - rhs`, or `None` if that would underflow.
	pub fn checked_sub(&self, rhs: &ChainWork) -> Option<ChainWork> {
		if self.0 < rhs.0 {
			None
		} else {
			Some(ChainWork(&self.0 - &rhs.0))
		}
	}

	/// `self * n`, used to scale a single block's work into an
	/// N-block buffer.
	pub fn mul_u64(&self, n: u64) -> ChainWork {
		ChainWork(&self.0 * BigUint::from(n))
	}
}

impl fmt::Display for ChainWork {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl Add for ChainWork {
	type Output = ChainWork;
	fn add(self, rhs: ChainWork) -> ChainWork {
		ChainWork(self.0 + rhs.0)
	}
}

impl<'a> Add<&'a ChainWork> for ChainWork {
	type Output = ChainWork;
	fn add(self, rhs: &'a ChainWork) -> ChainWork {
		ChainWork(self.0 + &rhs.0)
	}
}

/// Errors from decoding a compact `bits` field into a target.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BitsError {
	#[error("target is zero")]
	Zero,
	#[error("target is negative (high bit of mantissa set)")]
	Negative,
	#[error("target overflows 256 bits")]
	Overflow,
	#[error("target exceeds the network's minimum-difficulty ceiling")]
	AboveNetworkLimit,
}

/// Decodes a compact `bits` field into a 256-bit target, validating the
/// three failure modes a compact target encoding can hit (negative, zero,
/// overflow), plus the network-specific ceiling (`pow_limit`).
pub fn bits_to_target(bits: u32, pow_limit: &BigUint) -> Result<BigUint, BitsError> {
	let exponent = (bits >> 24) as u32;
	let mantissa = bits & 0x007f_ffff;

	if bits & 0x0080_0000 != 0 {
		return Err(BitsError::Negative);
	}
	if mantissa == 0 {
		return Err(BitsError::Zero);
	}

	let target = if exponent <= 3 {
		BigUint::from(mantissa) >> (8 * (3 - exponent))
	} else {
		if exponent > 32 {
			return Err(BitsError::Overflow);
		}
		BigUint::from(mantissa) << (8 * (exponent - 3))
	};

	if target > max_target() {
		return Err(BitsError::Overflow);
	}
	if &target > pow_limit {
		return Err(BitsError::AboveNetworkLimit);
	}
	Ok(target)
}

/// Encodes a 256-bit target back into the compact `bits` form. Used by the
/// ASERT algorithm, which computes the next target as a `BigUint` and must
/// store it back into a header's `bits` field.
pub fn target_to_bits(target: &BigUint) -> u32 {
	let bytes = target.to_bytes_be();
	let bytes = if bytes.is_empty() { vec![0u8] } else { bytes };

	let mut size = bytes.len() as u32;
	let mut mantissa: u32 = if bytes.len() >= 3 {
		((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | (bytes[2] as u32)
	} else {
		let mut padded = vec![0u8; 3 - bytes.len()];
		padded.extend_from_slice(&bytes);
		((padded[0] as u32) << 16) | ((padded[1] as u32) << 8) | (padded[2] as u32)
	};

	// If the high bit of the mantissa would be set, the compact encoding
	// would be misread as negative; shift the mantissa right by a byte and
	// bump the exponent to compensate.
	if mantissa & 0x0080_0000 != 0 {
		mantissa >>= 8;
		size += 1;
	}

	(size << 24) | mantissa
}

/// Proof-of-work performed by a single header: `max_target / target`.
/// Summed along a chain this gives `chain_work`.
pub fn work(bits: u32, pow_limit: &BigUint) -> ChainWork {
	match bits_to_target(bits, pow_limit) {
		Ok(target) if !target.is_zero() => {
			let max = max_target();
			ChainWork((max / target) + BigUint::one())
		}
		_ => ChainWork::zero(),
	}
}

/// Whether `hash`, interpreted as a big-endian 256-bit integer, is at or
/// below `target` — the core proof-of-work inequality.
pub fn hash_meets_target(hash: &Hash, target: &BigUint) -> bool {
	BigUint::from_bytes_be(hash.as_bytes()) <= *target
}

#[cfg(test)]
mod tests {
	use super::*;

	fn limit() -> BigUint {
		max_target()
	}

	#[test]
	fn regtest_min_difficulty_round_trips() {
		// 0x207fffff is the customary regtest/min-difficulty bits value.
		let target = bits_to_target(0x207f_ffff, &limit()).unwrap();
		assert_eq!(target_to_bits(&target), 0x207f_ffff);
	}

	#[test]
	fn rejects_negative_and_zero() {
		assert_eq!(bits_to_target(0x0180_0000, &limit()), Err(BitsError::Negative));
		assert_eq!(bits_to_target(0x0300_0000, &limit()), Err(BitsError::Zero));
	}

	#[test]
	fn rejects_overflow() {
		assert_eq!(bits_to_target(0xff12_3456, &limit()), Err(BitsError::Overflow));
	}

	#[test]
	fn lower_target_is_more_work() {
		let easy = work(0x207f_ffff, &limit());
		let hard = work(0x1d00_ffff, &limit());
		assert!(hard > easy);
	}

	#[test]
	fn chain_work_accumulates() {
		let a = work(0x207f_ffff, &limit());
		let b = work(0x207f_ffff, &limit());
		let sum = a.clone() + b.clone();
		assert!(sum > a);
		assert_eq!(sum, a.clone() + &b);
	}
}
