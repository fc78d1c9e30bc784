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

//! The "Misbehaving" penalty framework: every peer carries a
//! score starting at 0; recognized penalties add points; a score at or above
//! the ban threshold disconnects and discourages the peer.

use std::sync::atomic::{AtomicU32, Ordering};

/// Score at which a peer is disconnected and discouraged.
pub const BAN_THRESHOLD: u32 = 100;

/// Named penalties and their point values.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Penalty {
	InvalidPow,
	OversizedMessage,
	NonContinuousHeaders,
	LowWorkHeaders,
	UnconnectingHeaders,
	BadChecksum,
	BadMagic,
}

impl Penalty {
	pub fn points(self) -> u32 {
		match self {
			Penalty::InvalidPow => 100,
			Penalty::OversizedMessage => 20,
			Penalty::NonContinuousHeaders => 20,
			Penalty::LowWorkHeaders => 20,
			Penalty::UnconnectingHeaders => 1,
			Penalty::BadChecksum => 100,
			Penalty::BadMagic => 100,
		}
	}

	/// Whether this penalty disconnects immediately regardless of cumulative
	/// score.
	pub fn is_immediate_disconnect(self) -> bool {
		matches!(self, Penalty::InvalidPow)
	}
}

/// A peer's cumulative misbehavior score. Atomic so the I/O callback can
/// bump it without holding the peer's own mutex.
pub struct MisbehaviorScore(AtomicU32);

impl MisbehaviorScore {
	pub fn new() -> MisbehaviorScore {
		MisbehaviorScore(AtomicU32::new(0))
	}

	/// Applies `penalty`, returning whether the peer should now be
	/// disconnected (either an immediate-disconnect penalty, or the
	/// cumulative score crossing `BAN_THRESHOLD`).
	pub fn apply(&self, penalty: Penalty) -> bool {
		let total = self.0.fetch_add(penalty.points(), Ordering::Relaxed) + penalty.points();
		penalty.is_immediate_disconnect() || total >= BAN_THRESHOLD
	}

	/// Applies a raw point value from a source outside this crate's own
	/// `Penalty` table — namely `alpha_core::RejectReason::misbehavior_score`,
	/// which the header-sync protocol consults when `accept_header` rejects a
	/// peer's header.
	pub fn apply_points(&self, points: u32) -> bool {
		let total = self.0.fetch_add(points, Ordering::Relaxed) + points;
		total >= BAN_THRESHOLD
	}

	pub fn score(&self) -> u32 {
		self.0.load(Ordering::Relaxed)
	}
}

impl Default for MisbehaviorScore {
	fn default() -> Self {
		MisbehaviorScore::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn invalid_pow_disconnects_immediately() {
		let score = MisbehaviorScore::new();
		assert!(score.apply(Penalty::InvalidPow));
	}

	#[test]
	fn accumulating_oversized_messages_reaches_threshold() {
		let score = MisbehaviorScore::new();
		for _ in 0..4 {
			assert!(!score.apply(Penalty::OversizedMessage));
		}
		assert!(score.apply(Penalty::OversizedMessage));
		assert_eq!(score.score(), 100);
	}

	#[test]
	fn unconnecting_headers_is_a_small_cumulative_counter() {
		let score = MisbehaviorScore::new();
		for _ in 0..99 {
			assert!(!score.apply(Penalty::UnconnectingHeaders));
		}
		assert!(score.apply(Penalty::UnconnectingHeaders));
	}
}
