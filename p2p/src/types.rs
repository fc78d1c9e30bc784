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

//! Protocol-wide constants and small value types shared by the wire codec
//! and the peer actor.

use std::net::SocketAddr;

use alpha_core::ser::{self, Readable, Result, Writeable};

/// Current protocol version advertised in `version` messages.
pub const PROTOCOL_VERSION: u32 = 1;

/// Peers advertising a version below this are disconnected during handshake.
pub const MIN_PROTOCOL_VERSION: u32 = 1;

/// Advertised in `version.user_agent`.
pub const USER_AGENT: &str = "/alpha:0.1.0/";

/// Hard cap on a single message's payload length.
pub const MAX_PROTOCOL_MESSAGE_LENGTH: u32 = 4_000_000;

/// Hard cap on a peer's bounded receive buffer.
pub const DEFAULT_RECV_FLOOD_SIZE: usize = 5_000_000;

/// Buffer is only compacted once the read offset clears this many bytes, to
/// avoid pathological compaction of tiny reads.
pub const MIN_COMPACTION_BYTES: usize = 256 * 1024;

/// `addr` message cap.
pub const MAX_ADDR_SIZE: usize = 1_000;

/// `inv`/`getdata`/`notfound` cap.
pub const MAX_INV_SIZE: usize = 50_000;

/// `getheaders` locator cap.
pub const MAX_LOCATOR_SZ: usize = 101;

/// `headers` message cap.
pub const MAX_HEADERS_SIZE: usize = 2_000;

/// Handshake must complete within this long.
pub const VERSION_HANDSHAKE_TIMEOUT_SECS: u64 = 60;

/// Liveness ping cadence.
pub const PING_INTERVAL_SECS: u64 = 120;

/// A ping outstanding longer than this disconnects the peer.
pub const PING_TIMEOUT_SECS: u64 = 20 * 60;

/// No traffic at all within this window disconnects the peer.
pub const INACTIVITY_TIMEOUT_SECS: u64 = 20 * 60;

/// Peer-reported time offset is clamped to this many seconds either way
/// before being fed into the network-time median filter.
pub const MAX_TIME_OFFSET_SECS: i64 = 70 * 60;

/// A stable, process-local identifier for a connected peer. Not related to
/// the handshake `nonce`, which is per-connection-attempt and peer-supplied.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct PeerId(pub u64);

/// Whether a connection was dialed by us or accepted from a listener.
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Direction {
	Inbound,
	Outbound,
}

/// A network address and port, the unit `addr`/`getaddr` gossip exchanges
/// and what the Address Manager keys its tables by.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct NetAddress(pub SocketAddr);

impl NetAddress {
	/// The `/16` (IPv4) or `/32` (IPv6) netgroup this address belongs to,
	/// used both for inbound-eviction diversity and tried-table bucketing.
	pub fn netgroup(&self) -> Vec<u8> {
		match self.0.ip() {
			std::net::IpAddr::V4(v4) => v4.octets()[..2].to_vec(),
			std::net::IpAddr::V6(v6) => v6.octets().to_vec(),
		}
	}
}

impl Writeable for NetAddress {
	fn write<W: std::io::Write>(&self, w: &mut W) -> Result<()> {
		match self.0 {
			SocketAddr::V4(v4) => {
				0u8.write(w)?;
				w.write_all(&v4.ip().octets())?;
				v4.port().write(w)?;
			}
			SocketAddr::V6(v6) => {
				1u8.write(w)?;
				w.write_all(&v6.ip().octets())?;
				v6.port().write(w)?;
			}
		}
		Ok(())
	}
}

impl Readable for NetAddress {
	fn read<R: std::io::Read>(r: &mut R) -> Result<Self> {
		let tag = u8::read(r)?;
		let ip = if tag == 0 {
			let octets = <[u8; 4]>::read(r)?;
			std::net::IpAddr::from(octets)
		} else {
			let octets = <[u8; 16]>::read(r)?;
			std::net::IpAddr::from(octets)
		};
		let port = u16::read(r)?;
		Ok(NetAddress(SocketAddr::new(ip, port)))
	}
}

/// `addr` entry: a gossiped address together with the last time it was
/// seen alive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TimestampedAddress {
	pub timestamp: u32,
	pub addr: NetAddress,
}

impl Writeable for TimestampedAddress {
	fn write<W: std::io::Write>(&self, w: &mut W) -> Result<()> {
		self.timestamp.write(w)?;
		self.addr.write(w)
	}
}

impl Readable for TimestampedAddress {
	fn read<R: std::io::Read>(r: &mut R) -> Result<Self> {
		let timestamp = u32::read(r)?;
		let addr = NetAddress::read(r)?;
		Ok(TimestampedAddress { timestamp, addr })
	}
}

/// A 36-byte inventory vector (`inv`/`getdata`/`notfound`).
/// This system has no transactions, so every inventory item identifies a
/// header ("block" and "header" are the same message here).
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InventoryVector {
	pub hash: alpha_core::Hash,
}

impl Writeable for InventoryVector {
	fn write<W: std::io::Write>(&self, w: &mut W) -> Result<()> {
		w.write_all(self.hash.as_bytes()).map_err(ser::Error::from)
	}
}

impl Readable for InventoryVector {
	fn read<R: std::io::Read>(r: &mut R) -> Result<Self> {
		let bytes = <[u8; 32]>::read(r)?;
		Ok(InventoryVector {
			hash: alpha_core::Hash(bytes),
		})
	}
}
