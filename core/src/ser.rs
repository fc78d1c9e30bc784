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

//! Minimal binary serialization layer for the wire protocol.
//! Deliberately not `serde`-based: the wire format is a fixed little-endian
//! byte layout, not something serde's data model maps onto cleanly.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// A batch size used when deserializing a length-prefixed vector: we never
/// trust the claimed count to allocate up front, instead
/// growing the buffer in these increments as elements are actually read.
pub const MAX_VECTOR_ALLOCATE: usize = 5_000_000;

/// The hard ceiling on any CompactSize-encoded length field.
pub const MAX_SIZE: u64 = 32_000_000;

/// Errors arising from (de)serializing a wire value.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("io error: {0}")]
	Io(#[from] io::Error),
	#[error("non-canonical CompactSize encoding")]
	NonCanonicalCompactSize,
	#[error("CompactSize {0} exceeds MAX_SIZE")]
	OversizedCompactSize(u64),
	#[error("unexpected trailing bytes after message payload")]
	UnexpectedTrailingBytes,
	#[error("corrupted data: {0}")]
	CorruptedData(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Types that can write themselves to the wire in the fixed binary format.
pub trait Writeable {
	fn write<W: Write>(&self, writer: &mut W) -> Result<()>;
}

/// Types that can read themselves back from the wire.
pub trait Readable: Sized {
	fn read<R: Read>(reader: &mut R) -> Result<Self>;
}

impl Writeable for u8 {
	fn write<W: Write>(&self, w: &mut W) -> Result<()> {
		w.write_u8(*self).map_err(Error::from)
	}
}
impl Readable for u8 {
	fn read<R: Read>(r: &mut R) -> Result<Self> {
		r.read_u8().map_err(Error::from)
	}
}

macro_rules! impl_int {
	($t:ty, $w:ident, $r:ident) => {
		impl Writeable for $t {
			fn write<W: Write>(&self, w: &mut W) -> Result<()> {
				w.$w::<LittleEndian>(*self).map_err(Error::from)
			}
		}
		impl Readable for $t {
			fn read<R: Read>(r: &mut R) -> Result<Self> {
				r.$r::<LittleEndian>().map_err(Error::from)
			}
		}
	};
}

impl_int!(u16, write_u16, read_u16);
impl_int!(u32, write_u32, read_u32);
impl_int!(u64, write_u64, read_u64);
impl_int!(i32, write_i32, read_i32);
impl_int!(i64, write_i64, read_i64);

impl<const N: usize> Writeable for [u8; N] {
	fn write<W: Write>(&self, w: &mut W) -> Result<()> {
		w.write_all(self).map_err(Error::from)
	}
}
impl<const N: usize> Readable for [u8; N] {
	fn read<R: Read>(r: &mut R) -> Result<Self> {
		let mut buf = [0u8; N];
		r.read_exact(&mut buf)?;
		Ok(buf)
	}
}

/// Writes a CompactSize-encoded length prefix (Bitcoin's `VarInt` scheme).
pub fn write_compact_size<W: Write>(w: &mut W, n: u64) -> Result<()> {
	if n < 0xfd {
		w.write_u8(n as u8)?;
	} else if n <= 0xffff {
		w.write_u8(0xfd)?;
		w.write_u16::<LittleEndian>(n as u16)?;
	} else if n <= 0xffff_ffff {
		w.write_u8(0xfe)?;
		w.write_u32::<LittleEndian>(n as u32)?;
	} else {
		w.write_u8(0xff)?;
		w.write_u64::<LittleEndian>(n)?;
	}
	Ok(())
}

/// Reads a CompactSize length prefix, rejecting non-canonical encodings
/// (a multi-byte form used where the single-byte form would have sufficed)
/// and anything above `MAX_SIZE`.
pub fn read_compact_size<R: Read>(r: &mut R) -> Result<u64> {
	let first = r.read_u8()?;
	let n = match first {
		0xff => {
			let v = r.read_u64::<LittleEndian>()?;
			if v <= 0xffff_ffff {
				return Err(Error::NonCanonicalCompactSize);
			}
			v
		}
		0xfe => {
			let v = r.read_u32::<LittleEndian>()? as u64;
			if v <= 0xffff {
				return Err(Error::NonCanonicalCompactSize);
			}
			v
		}
		0xfd => {
			let v = r.read_u16::<LittleEndian>()? as u64;
			if v < 0xfd {
				return Err(Error::NonCanonicalCompactSize);
			}
			v
		}
		v => v as u64,
	};
	if n > MAX_SIZE {
		return Err(Error::OversizedCompactSize(n));
	}
	Ok(n)
}

/// Reads a length-prefixed vector of `Readable` elements, growing the
/// backing buffer in `MAX_VECTOR_ALLOCATE`-sized steps rather than trusting
/// the claimed count for an upfront allocation.
pub fn read_vec<R: Read, T: Readable>(r: &mut R, elem_size_hint: usize) -> Result<Vec<T>> {
	let count = read_compact_size(r)?;
	let reserve_step = if elem_size_hint == 0 {
		count as usize
	} else {
		(MAX_VECTOR_ALLOCATE / elem_size_hint).max(1)
	};
	let mut out = Vec::with_capacity(reserve_step.min(count as usize));
	for _ in 0..count {
		if out.len() == out.capacity() {
			out.reserve(reserve_step.min((count as usize) - out.len()));
		}
		out.push(T::read(r)?);
	}
	Ok(out)
}

/// Writes a length-prefixed vector of `Writeable` elements.
pub fn write_vec<W: Write, T: Writeable>(w: &mut W, items: &[T]) -> Result<()> {
	write_compact_size(w, items.len() as u64)?;
	for item in items {
		item.write(w)?;
	}
	Ok(())
}

/// Serializes a `Writeable` into an owned byte vector.
pub fn serialize<T: Writeable>(value: &T) -> Vec<u8> {
	let mut buf = Vec::new();
	value.write(&mut buf).expect("writing to a Vec<u8> never fails");
	buf
}

/// Deserializes a `Readable` from a byte slice, requiring that the entire
/// slice is consumed (used for strict payloads such as `verack`).
pub fn deserialize_strict<T: Readable>(bytes: &[u8]) -> Result<T> {
	let mut cursor = io::Cursor::new(bytes);
	let value = T::read(&mut cursor)?;
	if (cursor.position() as usize) != bytes.len() {
		return Err(Error::UnexpectedTrailingBytes);
	}
	Ok(value)
}

/// Deserializes a `Readable`, tolerating trailing bytes (used for lenient
/// payloads such as `ping`/`pong`).
pub fn deserialize_lenient<T: Readable>(bytes: &[u8]) -> Result<T> {
	let mut cursor = io::Cursor::new(bytes);
	T::read(&mut cursor)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn compact_size_round_trip_boundaries() {
		for n in [0u64, 1, 0xfc, 0xfd, 0xffff, 0x1_0000, 0xffff_ffff, 0x1_0000_0000] {
			let mut buf = Vec::new();
			write_compact_size(&mut buf, n).unwrap();
			let mut cur = io::Cursor::new(buf);
			assert_eq!(read_compact_size(&mut cur).unwrap(), n);
		}
	}

	#[test]
	fn rejects_non_canonical_compact_size() {
		// 0xfd prefix followed by a u16 that fits in one byte.
		let buf = vec![0xfd, 0x05, 0x00];
		let mut cur = io::Cursor::new(buf);
		assert!(matches!(
			read_compact_size(&mut cur),
			Err(Error::NonCanonicalCompactSize)
		));
	}

	#[test]
	fn strict_rejects_trailing_bytes() {
		let mut buf = serialize(&7u64);
		buf.push(0xff);
		assert!(deserialize_strict::<u64>(&buf).is_err());
		assert_eq!(deserialize_lenient::<u64>(&buf).unwrap(), 7);
	}
}
