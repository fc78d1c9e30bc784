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

//! Errors surfaced by the block index store and chainstate manager.

use alpha_core::RejectReason;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("header rejected: {0}")]
	Rejected(#[from] RejectReason),

	#[error("header is already known to the index")]
	AlreadyKnown,

	#[error("orphan pool is full")]
	OrphanPoolFull,

	#[error("persistence error: {0}")]
	Store(#[from] alpha_store::json_store::Error),

	#[error("the proposed reorg is {depth} blocks deep, past the suspicious-reorg threshold; refusing to activate automatically")]
	SuspiciousReorg { depth: u64 },
}

pub type Result<T> = std::result::Result<T, Error>;
