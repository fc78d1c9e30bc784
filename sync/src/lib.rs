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

//! The Sync Coordinator: the Peer Manager, Address Manager,
//! BanMan, header-sync protocol and block-announcement relay that drive
//! `alpha_p2p` connections toward a synced chain. Nothing in this crate
//! touches a socket directly; it reacts to parsed messages and chainstate
//! notifications and hands back messages for the caller to send.

#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]

#[macro_use]
extern crate log;

pub mod address_manager;
pub mod banman;
pub mod header_sync;
pub mod peer_manager;
pub mod relay;

pub use address_manager::AddressManager;
pub use banman::BanMan;
pub use header_sync::{HeaderSync, HeaderSyncAction};
pub use peer_manager::{InboundOutcome, PeerManager, DEFAULT_MAX_INBOUND, DEFAULT_MAX_OUTBOUND};
pub use relay::Relay;
