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

//! Drives a single peer's socket: a reader task that frames incoming bytes
//! through the bounded receive buffer, and a writer task that
//! drains the peer's outbound queue. Spawned once per accepted/dialed
//! connection by the sync coordinator's I/O executor.

use std::net::SocketAddr;
use std::sync::Arc;

use log::debug;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc::UnboundedReceiver;

use alpha_core::ser;

use crate::message::{validate_header, Message, MessageHeader, HEADER_LEN};
use crate::misbehavior::Penalty;
use crate::peer::{Outcome, Peer};
use crate::recv_buffer::RecvBuffer;

/// What the reader task reports back for each frame it manages to parse,
/// before it is handed to `Peer::handle_message`. Penalties are applied by
/// the caller (which holds the `Arc<Peer>` and can decide whether to
/// disconnect) rather than inside this module, keeping scoring policy in
/// one place (`crate::misbehavior`).
pub enum ReadEvent {
	Message(Message),
	Penalty(Penalty),
	Disconnect,
}

/// Parses as many complete frames as `buf` currently holds, feeding each
/// through `validate_header`/checksum verification.
pub fn drain_frames(buf: &mut RecvBuffer, expected_magic: [u8; 4]) -> Vec<ReadEvent> {
	let mut events = Vec::new();
	loop {
		if buf.len() < HEADER_LEN {
			break;
		}
		let header = match ser::deserialize_strict::<MessageHeader>(&buf.unread()[..HEADER_LEN]) {
			Ok(h) => h,
			Err(_) => {
				events.push(ReadEvent::Penalty(Penalty::BadChecksum));
				events.push(ReadEvent::Disconnect);
				break;
			}
		};
		if let Err(e) = validate_header(&header, expected_magic) {
			let penalty = match e {
				crate::message::FramingError::BadMagic => Penalty::BadMagic,
				crate::message::FramingError::OversizedMessage => Penalty::OversizedMessage,
				crate::message::FramingError::BadChecksum => Penalty::BadChecksum,
			};
			events.push(ReadEvent::Penalty(penalty));
			events.push(ReadEvent::Disconnect);
			break;
		}
		let total = HEADER_LEN + header.payload_length as usize;
		if buf.len() < total {
			break;
		}
		let payload = buf.unread()[HEADER_LEN..total].to_vec();
		if !header.verify_checksum(&payload) {
			buf.consume(total);
			events.push(ReadEvent::Penalty(Penalty::BadChecksum));
			events.push(ReadEvent::Disconnect);
			break;
		}
		match Message::decode(&header, &payload) {
			Ok(msg) => events.push(ReadEvent::Message(msg)),
			Err(_) => {
				events.push(ReadEvent::Disconnect);
				buf.consume(total);
				break;
			}
		}
		buf.consume(total);
	}
	events
}

/// Spawns the reader and writer tasks for a freshly established connection.
/// `on_event` is invoked (on the reader task) for every parsed frame and
/// penalty/disconnect signal; it is the sync coordinator's hook into the
/// handshake/forwarding logic in `Peer::handle_message`.
pub fn spawn<F>(stream: TcpStream, peer: Arc<Peer>, mut outbound_rx: UnboundedReceiver<Vec<u8>>, on_event: F)
where
	F: Fn(ReadEvent) + Send + 'static,
{
	let (mut read_half, mut write_half) = stream.into_split();
	let magic = peer.magic;

	tokio::spawn(async move {
		let mut buf = RecvBuffer::new();
		let mut chunk = [0u8; 64 * 1024];
		loop {
			let n = match read_half.read(&mut chunk).await {
				Ok(0) | Err(_) => {
					debug!("peer {} socket closed", peer.addr);
					on_event(ReadEvent::Disconnect);
					return;
				}
				Ok(n) => n,
			};
			peer.stats.record_received(n);
			if buf.push(&chunk[..n]).is_err() {
				on_event(ReadEvent::Penalty(Penalty::OversizedMessage));
				on_event(ReadEvent::Disconnect);
				return;
			}
			for event in drain_frames(&mut buf, magic) {
				let is_disconnect = matches!(event, ReadEvent::Disconnect);
				on_event(event);
				if is_disconnect {
					return;
				}
			}
		}
	});

	tokio::spawn(async move {
		while let Some(bytes) = outbound_rx.recv().await {
			if write_half.write_all(&bytes).await.is_err() {
				return;
			}
		}
	});
}

/// Dials `addr` and returns the raw stream; the caller wraps it with
/// `Peer::new` and `spawn`.
pub async fn dial(addr: SocketAddr) -> std::io::Result<TcpStream> {
	TcpStream::connect(addr).await
}

/// Delivers a parsed frame through the peer's state machine, turning
/// misbehavior into score updates and disconnects. Returns
/// `Some(Message)` for anything the sync coordinator still needs to act on.
/// `teardown` runs once, on the I/O executor, if-and-only-if this event ends
/// up tearing the peer down — it is the sync coordinator's hook for removing
/// the peer from its live tables (`PeerManager`, `HeaderSync`, `Relay`).
pub fn dispatch<F>(peer: &Arc<Peer>, event: ReadEvent, local_nonce: u64, our_start_height: i32, teardown: F) -> Option<Message>
where
	F: FnOnce(Arc<Peer>) + Send + 'static,
{
	match event {
		ReadEvent::Penalty(p) => {
			if peer.score.apply(p) {
				crate::peer::post_disconnect(Arc::clone(peer), teardown);
			}
			None
		}
		ReadEvent::Disconnect => {
			crate::peer::post_disconnect(Arc::clone(peer), teardown);
			None
		}
		ReadEvent::Message(msg) => match peer.handle_message(msg, local_nonce, our_start_height) {
			Outcome::Handled => None,
			Outcome::Forward(m) => Some(m),
			Outcome::Penalize(p) => {
				if peer.score.apply(p) {
					crate::peer::post_disconnect(Arc::clone(peer), teardown);
				}
				None
			}
			Outcome::Disconnect => {
				crate::peer::post_disconnect(Arc::clone(peer), teardown);
				None
			}
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::message::MAGIC_REGTEST;

	#[test]
	fn drains_exactly_one_complete_frame_and_leaves_remainder() {
		let msg = Message::Ping { nonce: 5 };
		let mut bytes = msg.encode(MAGIC_REGTEST);
		bytes.extend_from_slice(&[1, 2, 3]);
		let mut buf = RecvBuffer::new();
		buf.push(&bytes).unwrap();
		let events = drain_frames(&mut buf, MAGIC_REGTEST);
		assert_eq!(events.len(), 1);
		assert!(matches!(events[0], ReadEvent::Message(Message::Ping { nonce: 5 })));
		assert_eq!(buf.len(), 3);
	}

	#[test]
	fn bad_magic_penalizes_and_disconnects() {
		let msg = Message::Ping { nonce: 1 };
		let bytes = msg.encode(MAGIC_REGTEST);
		let mut buf = RecvBuffer::new();
		buf.push(&bytes).unwrap();
		let events = drain_frames(&mut buf, crate::message::MAGIC_MAIN);
		assert!(matches!(events[0], ReadEvent::Penalty(Penalty::BadMagic)));
		assert!(matches!(events[1], ReadEvent::Disconnect));
	}

	#[test]
	fn waits_for_full_payload_before_parsing() {
		let msg = Message::Ping { nonce: 1 };
		let bytes = msg.encode(MAGIC_REGTEST);
		let mut buf = RecvBuffer::new();
		buf.push(&bytes[..bytes.len() - 1]).unwrap();
		let events = drain_frames(&mut buf, MAGIC_REGTEST);
		assert!(events.is_empty());
		assert_eq!(buf.len(), bytes.len() - 1);
	}
}
