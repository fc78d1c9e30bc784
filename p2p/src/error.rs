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

//! Resource-exhaustion errors a connection can hit outside the misbehavior
//! scoring path. Unlike `Penalty`, these
//! describe conditions local to this node's own I/O handling rather than
//! something the remote peer sent, and always result in disconnect without
//! touching the peer's misbehavior score.

/// Why a connection was torn down for reasons other than protocol
/// misbehavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
	#[error("receive buffer exceeded its cap")]
	RecvBufferOverflow,
	#[error("write to peer socket failed")]
	SendFailed,
	#[error("version handshake did not complete in time")]
	HandshakeTimeout,
	#[error("no traffic from peer within the inactivity window")]
	InactivityTimeout,
	#[error("outstanding ping was not answered in time")]
	PingTimeout,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn variants_have_distinct_messages() {
		assert_ne!(ConnectionError::RecvBufferOverflow.to_string(), ConnectionError::SendFailed.to_string());
	}
}
