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

//! Header-validation rejection reasons. Kept as a closed,
//! `thiserror`-derived taxonomy so callers can match on the exact failure
//! rather than stringly-typed errors, and so misbehavior scoring can map each variant to a point value.

use crate::target::BitsError;

/// Why `CheckBlockHeader` or `ContextualCheckBlockHeader` rejected a header.
/// Stateless checks precede contextual ones in this
/// enum only for readability; callers must run stateless checks first
/// regardless.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RejectReason {
	#[error("invalid target encoding: {0}")]
	InvalidTarget(#[from] BitsError),

	#[error("commitment-only proof of work check failed")]
	CommitmentPowFailed,

	#[error("full-tier RandomX proof of work check failed")]
	RandomXPowFailed,

	#[error("header timestamp is more than the allowed drift into the future")]
	TimeTooFarInFuture,

	#[error("header timestamp is not greater than the median of its last 11 ancestors")]
	TimeTooOld,

	#[error("bits does not match the value computed by the ASERT difficulty adjustment")]
	BadDifficultyBits,

	#[error("header version is below the network's minimum supported version")]
	BadVersion,

	#[error("previous header is unknown to this node")]
	PrevHeaderUnknown,

	#[error("previous header is known to be invalid")]
	PrevHeaderInvalid,

	#[error("duplicate header, already indexed")]
	DuplicateHeader,

	#[error("headers message is not a continuous chain (header[i].prev_hash != header[i-1].hash())")]
	NonContinuousHeaders,

	#[error("cumulative chain work is below the network's anti-DoS threshold")]
	WorkBelowThreshold,

	#[error("wire deserialization failed: {0}")]
	Malformed(String),
}

impl RejectReason {
	/// Misbehavior points a peer incurs for sending a header that fails this
	/// check. Checks a peer cannot be expected to predict
	/// (e.g. `PrevHeaderUnknown`, routine during IBD) score zero.
	pub fn misbehavior_score(&self) -> u32 {
		match self {
			RejectReason::PrevHeaderUnknown => 0,
			RejectReason::DuplicateHeader => 0,
			RejectReason::WorkBelowThreshold => 0,
			RejectReason::TimeTooFarInFuture => 20,
			RejectReason::TimeTooOld => 20,
			RejectReason::BadDifficultyBits => 50,
			RejectReason::BadVersion => 50,
			RejectReason::NonContinuousHeaders => 20,
			RejectReason::Malformed(_) => 100,
			RejectReason::CommitmentPowFailed => 100,
			RejectReason::RandomXPowFailed => 100,
			RejectReason::PrevHeaderInvalid => 100,
			RejectReason::InvalidTarget(_) => 100,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn routine_ibd_rejections_score_zero() {
		assert_eq!(RejectReason::PrevHeaderUnknown.misbehavior_score(), 0);
		assert_eq!(RejectReason::DuplicateHeader.misbehavior_score(), 0);
	}

	#[test]
	fn forged_pow_is_maximally_punished() {
		assert_eq!(RejectReason::RandomXPowFailed.misbehavior_score(), 100);
	}
}
