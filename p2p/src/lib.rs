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

//! Wire message framing, the per-peer connection actor, handshake and
//! misbehavior scoring. This crate owns everything below the
//! Sync Coordinator: it knows how to speak the wire protocol to one peer at
//! a time, but nothing about which peers to dial, ban, or prefer — that
//! policy lives in `alpha_sync`.

#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]

#[macro_use]
extern crate log;

pub mod connection;
pub mod error;
pub mod message;
pub mod misbehavior;
pub mod peer;
pub mod recv_buffer;
pub mod types;

pub use connection::{dial, dispatch, drain_frames, spawn, ReadEvent};
pub use error::ConnectionError;
pub use message::{
	AddrPayload, Command, FramingError, GetHeadersPayload, HeadersPayload, Magic, Message, MessageHeader,
	InvPayload, VersionPayload, HEADER_LEN, MAGIC_MAIN, MAGIC_REGTEST, MAGIC_TEST,
};
pub use misbehavior::{MisbehaviorScore, Penalty, BAN_THRESHOLD};
pub use peer::{post_disconnect, Outcome, Peer, PeerState, PeerStats};
pub use recv_buffer::{RecvBuffer, RecvBufferOverflow};
pub use types::{
	Direction, InventoryVector, NetAddress, PeerId, TimestampedAddress, INACTIVITY_TIMEOUT_SECS, MAX_ADDR_SIZE,
	MAX_HEADERS_SIZE, MAX_INV_SIZE, MAX_LOCATOR_SZ, MAX_PROTOCOL_MESSAGE_LENGTH, MIN_PROTOCOL_VERSION,
	PING_INTERVAL_SECS, PING_TIMEOUT_SECS, PROTOCOL_VERSION, USER_AGENT, VERSION_HANDSHAKE_TIMEOUT_SECS,
};
