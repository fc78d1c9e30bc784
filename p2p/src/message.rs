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

//! Wire message framing and payload shapes: a 24-byte
//! header (`magic || command || payload_length || checksum`) around a
//! payload whose shape depends on `command`.

use alpha_core::hash::sha256d;
use alpha_core::ser::{self, Readable, Writeable};
use alpha_core::Header;

use crate::types::{InventoryVector, NetAddress, TimestampedAddress, MAX_ADDR_SIZE, MAX_HEADERS_SIZE, MAX_INV_SIZE, MAX_LOCATOR_SZ, MAX_PROTOCOL_MESSAGE_LENGTH};

/// Width of `command`, null-padded ASCII.
const COMMAND_LEN: usize = 12;

/// Width of the framing header: `magic(4) || command(12) || length(4) || checksum(4)`.
pub const HEADER_LEN: usize = 24;

/// Network magic, distinguishing mainnet/testnet/regtest peers from one
/// another at the framing layer.
pub type Magic = [u8; 4];

pub const MAGIC_MAIN: Magic = [0xa1, 0x70, 0x68, 0x61];
pub const MAGIC_TEST: Magic = [0xa1, 0x74, 0x65, 0x73];
pub const MAGIC_REGTEST: Magic = [0xa1, 0x72, 0x65, 0x67];

/// Every command this node understands. `Unknown` carries the raw 12-byte
/// command so an unrecognized message can be logged and ignored rather than
/// rejected outright.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
	Version,
	Verack,
	Ping,
	Pong,
	Addr,
	GetAddr,
	Inv,
	GetData,
	NotFound,
	GetHeaders,
	Headers,
	Unknown([u8; COMMAND_LEN]),
}

impl Command {
	fn as_bytes(&self) -> [u8; COMMAND_LEN] {
		let name: &[u8] = match self {
			Command::Version => b"version",
			Command::Verack => b"verack",
			Command::Ping => b"ping",
			Command::Pong => b"pong",
			Command::Addr => b"addr",
			Command::GetAddr => b"getaddr",
			Command::Inv => b"inv",
			Command::GetData => b"getdata",
			Command::NotFound => b"notfound",
			Command::GetHeaders => b"getheaders",
			Command::Headers => b"headers",
			Command::Unknown(raw) => return *raw,
		};
		let mut buf = [0u8; COMMAND_LEN];
		buf[..name.len()].copy_from_slice(name);
		buf
	}

	fn from_bytes(raw: [u8; COMMAND_LEN]) -> Command {
		let len = raw.iter().position(|&b| b == 0).unwrap_or(COMMAND_LEN);
		match &raw[..len] {
			b"version" => Command::Version,
			b"verack" => Command::Verack,
			b"ping" => Command::Ping,
			b"pong" => Command::Pong,
			b"addr" => Command::Addr,
			b"getaddr" => Command::GetAddr,
			b"inv" => Command::Inv,
			b"getdata" => Command::GetData,
			b"notfound" => Command::NotFound,
			b"getheaders" => Command::GetHeaders,
			b"headers" => Command::Headers,
			_ => Command::Unknown(raw),
		}
	}
}

/// The 24-byte framing header preceding every payload.
pub struct MessageHeader {
	pub magic: Magic,
	pub command: Command,
	pub payload_length: u32,
	pub checksum: [u8; 4],
}

impl MessageHeader {
	pub fn for_payload(magic: Magic, command: Command, payload: &[u8]) -> MessageHeader {
		let digest = sha256d(payload);
		let mut checksum = [0u8; 4];
		checksum.copy_from_slice(&digest.as_bytes()[..4]);
		MessageHeader {
			magic,
			command,
			payload_length: payload.len() as u32,
			checksum,
		}
	}

	/// Verifies the checksum against an already-received payload.
	pub fn verify_checksum(&self, payload: &[u8]) -> bool {
		let digest = sha256d(payload);
		digest.as_bytes()[..4] == self.checksum
	}
}

impl Writeable for MessageHeader {
	fn write<W: std::io::Write>(&self, w: &mut W) -> ser::Result<()> {
		w.write_all(&self.magic)?;
		w.write_all(&self.command.as_bytes())?;
		self.payload_length.write(w)?;
		w.write_all(&self.checksum)?;
		Ok(())
	}
}

impl Readable for MessageHeader {
	fn read<R: std::io::Read>(r: &mut R) -> ser::Result<Self> {
		let magic = <[u8; 4]>::read(r)?;
		let command = Command::from_bytes(<[u8; COMMAND_LEN]>::read(r)?);
		let payload_length = u32::read(r)?;
		let checksum = <[u8; 4]>::read(r)?;
		Ok(MessageHeader {
			magic,
			command,
			payload_length,
			checksum,
		})
	}
}

/// `version` payload.
pub struct VersionPayload {
	pub version: i32,
	pub services: u64,
	pub timestamp: i64,
	pub addr_recv: NetAddress,
	pub addr_from: NetAddress,
	pub nonce: u64,
	pub user_agent: String,
	pub start_height: i32,
}

impl Writeable for VersionPayload {
	fn write<W: std::io::Write>(&self, w: &mut W) -> ser::Result<()> {
		self.version.write(w)?;
		self.services.write(w)?;
		self.timestamp.write(w)?;
		self.addr_recv.write(w)?;
		self.addr_from.write(w)?;
		self.nonce.write(w)?;
		ser::write_vec(w, self.user_agent.as_bytes())?;
		self.start_height.write(w)
	}
}

impl Readable for VersionPayload {
	fn read<R: std::io::Read>(r: &mut R) -> ser::Result<Self> {
		let version = i32::read(r)?;
		let services = u64::read(r)?;
		let timestamp = i64::read(r)?;
		let addr_recv = NetAddress::read(r)?;
		let addr_from = NetAddress::read(r)?;
		let nonce = u64::read(r)?;
		let ua_bytes: Vec<u8> = ser::read_vec(r, 1)?;
		let user_agent = String::from_utf8(ua_bytes)
			.map_err(|e| ser::Error::CorruptedData(e.to_string()))?;
		let start_height = i32::read(r)?;
		Ok(VersionPayload {
			version,
			services,
			timestamp,
			addr_recv,
			addr_from,
			nonce,
			user_agent,
			start_height,
		})
	}
}

/// `getheaders` payload: a block locator plus an optional stop hash.
pub struct GetHeadersPayload {
	pub version: u32,
	pub locator: Vec<alpha_core::Hash>,
	pub hash_stop: alpha_core::Hash,
}

impl Writeable for GetHeadersPayload {
	fn write<W: std::io::Write>(&self, w: &mut W) -> ser::Result<()> {
		self.version.write(w)?;
		ser::write_compact_size(w, self.locator.len() as u64)?;
		for h in &self.locator {
			w.write_all(h.as_bytes())?;
		}
		w.write_all(self.hash_stop.as_bytes())?;
		Ok(())
	}
}

impl Readable for GetHeadersPayload {
	fn read<R: std::io::Read>(r: &mut R) -> ser::Result<Self> {
		let version = u32::read(r)?;
		let count = ser::read_compact_size(r)?;
		if count as usize > MAX_LOCATOR_SZ {
			return Err(ser::Error::OversizedCompactSize(count));
		}
		let mut locator = Vec::with_capacity(count as usize);
		for _ in 0..count {
			locator.push(alpha_core::Hash(<[u8; 32]>::read(r)?));
		}
		let hash_stop = alpha_core::Hash(<[u8; 32]>::read(r)?);
		Ok(GetHeadersPayload {
			version,
			locator,
			hash_stop,
		})
	}
}

/// `headers` payload: a batch of 100-byte headers, no trailing per-header
/// transaction count.
pub struct HeadersPayload {
	pub headers: Vec<Header>,
}

impl Writeable for HeadersPayload {
	fn write<W: std::io::Write>(&self, w: &mut W) -> ser::Result<()> {
		ser::write_vec(w, &self.headers)
	}
}

impl Readable for HeadersPayload {
	fn read<R: std::io::Read>(r: &mut R) -> ser::Result<Self> {
		let count = ser::read_compact_size(r)?;
		if count as usize > MAX_HEADERS_SIZE {
			return Err(ser::Error::OversizedCompactSize(count));
		}
		let mut headers = Vec::with_capacity(count as usize);
		for _ in 0..count {
			headers.push(Header::read(r)?);
		}
		Ok(HeadersPayload { headers })
	}
}

/// `addr` payload.
pub struct AddrPayload {
	pub addresses: Vec<TimestampedAddress>,
}

impl Writeable for AddrPayload {
	fn write<W: std::io::Write>(&self, w: &mut W) -> ser::Result<()> {
		ser::write_vec(w, &self.addresses)
	}
}

impl Readable for AddrPayload {
	fn read<R: std::io::Read>(r: &mut R) -> ser::Result<Self> {
		let count = ser::read_compact_size(r)?;
		if count as usize > MAX_ADDR_SIZE {
			return Err(ser::Error::OversizedCompactSize(count));
		}
		let mut addresses = Vec::with_capacity(count as usize);
		for _ in 0..count {
			addresses.push(TimestampedAddress::read(r)?);
		}
		Ok(AddrPayload { addresses })
	}
}

/// `inv`/`getdata`/`notfound` payload.
pub struct InvPayload {
	pub items: Vec<InventoryVector>,
}

impl Writeable for InvPayload {
	fn write<W: std::io::Write>(&self, w: &mut W) -> ser::Result<()> {
		ser::write_vec(w, &self.items)
	}
}

impl Readable for InvPayload {
	fn read<R: std::io::Read>(r: &mut R) -> ser::Result<Self> {
		let count = ser::read_compact_size(r)?;
		if count as usize > MAX_INV_SIZE {
			return Err(ser::Error::OversizedCompactSize(count));
		}
		let mut items = Vec::with_capacity(count as usize);
		for _ in 0..count {
			items.push(InventoryVector::read(r)?);
		}
		Ok(InvPayload { items })
	}
}

/// A fully decoded message: framing header stripped, payload parsed
/// according to `command`.
pub enum Message {
	Version(VersionPayload),
	Verack,
	Ping { nonce: u64 },
	Pong { nonce: u64 },
	Addr(AddrPayload),
	GetAddr,
	Inv(InvPayload),
	GetData(InvPayload),
	NotFound(InvPayload),
	GetHeaders(GetHeadersPayload),
	Headers(HeadersPayload),
	Unknown([u8; COMMAND_LEN]),
}

impl Message {
	fn command(&self) -> Command {
		match self {
			Message::Version(_) => Command::Version,
			Message::Verack => Command::Verack,
			Message::Ping { .. } => Command::Ping,
			Message::Pong { .. } => Command::Pong,
			Message::Addr(_) => Command::Addr,
			Message::GetAddr => Command::GetAddr,
			Message::Inv(_) => Command::Inv,
			Message::GetData(_) => Command::GetData,
			Message::NotFound(_) => Command::NotFound,
			Message::GetHeaders(_) => Command::GetHeaders,
			Message::Headers(_) => Command::Headers,
			Message::Unknown(raw) => Command::Unknown(*raw),
		}
	}

	fn payload_bytes(&self) -> Vec<u8> {
		match self {
			Message::Version(p) => ser::serialize(p),
			Message::Verack | Message::GetAddr | Message::Unknown(_) => Vec::new(),
			Message::Ping { nonce } | Message::Pong { nonce } => ser::serialize(nonce),
			Message::Addr(p) => ser::serialize(p),
			Message::Inv(p) | Message::GetData(p) | Message::NotFound(p) => ser::serialize(p),
			Message::GetHeaders(p) => ser::serialize(p),
			Message::Headers(p) => ser::serialize(p),
		}
	}

	/// Frames this message with `magic` for sending.
	pub fn encode(&self, magic: Magic) -> Vec<u8> {
		let payload = self.payload_bytes();
		let header = MessageHeader::for_payload(magic, self.command(), &payload);
		let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
		ser::serialize(&header)
			.iter()
			.for_each(|b| out.push(*b));
		out.extend_from_slice(&payload);
		out
	}

	/// Decodes a payload once the framing header has already been validated
	/// (magic checked, length within bound, checksum verified — the caller,
	/// `crate::recv_buffer`, is responsible for those three checks before
	/// reaching here).
	pub fn decode(header: &MessageHeader, payload: &[u8]) -> ser::Result<Message> {
		Ok(match &header.command {
			Command::Version => Message::Version(ser::deserialize_strict(payload)?),
			Command::Verack => {
				if !payload.is_empty() {
					return Err(ser::Error::UnexpectedTrailingBytes);
				}
				Message::Verack
			}
			Command::Ping => Message::Ping {
				nonce: ser::deserialize_lenient(payload)?,
			},
			Command::Pong => Message::Pong {
				nonce: ser::deserialize_lenient(payload)?,
			},
			Command::Addr => Message::Addr(ser::deserialize_strict(payload)?),
			Command::GetAddr => Message::GetAddr,
			Command::Inv => Message::Inv(ser::deserialize_strict(payload)?),
			Command::GetData => Message::GetData(ser::deserialize_strict(payload)?),
			Command::NotFound => Message::NotFound(ser::deserialize_strict(payload)?),
			Command::GetHeaders => Message::GetHeaders(ser::deserialize_strict(payload)?),
			Command::Headers => Message::Headers(ser::deserialize_strict(payload)?),
			Command::Unknown(raw) => Message::Unknown(*raw),
		})
	}
}

/// Validates the framing-level invariants before the payload is even
/// looked at: magic match and length bound. Checksum
/// validation happens once the payload bytes are in hand
/// (`MessageHeader::verify_checksum`).
pub fn validate_header(header: &MessageHeader, expected_magic: Magic) -> Result<(), FramingError> {
	if header.magic != expected_magic {
		return Err(FramingError::BadMagic);
	}
	if header.payload_length > MAX_PROTOCOL_MESSAGE_LENGTH {
		return Err(FramingError::OversizedMessage);
	}
	Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FramingError {
	#[error("bad magic")]
	BadMagic,
	#[error("oversized message")]
	OversizedMessage,
	#[error("bad checksum")]
	BadChecksum,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn header_round_trips() {
		let payload = ser::serialize(&42u64);
		let header = MessageHeader::for_payload(MAGIC_REGTEST, Command::Ping, &payload);
		let bytes = ser::serialize(&header);
		assert_eq!(bytes.len(), HEADER_LEN);
		let back = ser::deserialize_strict::<MessageHeader>(&bytes).unwrap();
		assert_eq!(back.magic, MAGIC_REGTEST);
		assert_eq!(back.command, Command::Ping);
		assert!(back.verify_checksum(&payload));
	}

	#[test]
	fn tampered_payload_fails_checksum() {
		let payload = ser::serialize(&42u64);
		let header = MessageHeader::for_payload(MAGIC_REGTEST, Command::Ping, &payload);
		let tampered = ser::serialize(&43u64);
		assert!(!header.verify_checksum(&tampered));
	}

	#[test]
	fn verack_rejects_nonempty_payload() {
		let header = MessageHeader::for_payload(MAGIC_REGTEST, Command::Verack, b"x");
		assert!(Message::decode(&header, b"x").is_err());
	}

	#[test]
	fn ping_tolerates_trailing_bytes() {
		let mut payload = ser::serialize(&7u64);
		payload.push(0xff);
		let header = MessageHeader::for_payload(MAGIC_REGTEST, Command::Ping, &payload);
		let msg = Message::decode(&header, &payload).unwrap();
		assert!(matches!(msg, Message::Ping { nonce: 7 }));
	}

	#[test]
	fn unknown_command_round_trips_through_encode() {
		let raw = *b"weirdcmd\0\0\0\0";
		let msg = Message::Unknown(raw);
		let bytes = msg.encode(MAGIC_REGTEST);
		let header = ser::deserialize_strict::<MessageHeader>(&bytes[..HEADER_LEN]).unwrap();
		assert_eq!(header.command, Command::Unknown(raw));
	}
}
