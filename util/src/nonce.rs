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

//! Thread-local randomness for protocol nonces (handshake nonce, ping nonce).
//!
//! The RNG backing these nonces is thread-local rather than a single
//! process-wide generator shared across the I/O executor's worker threads,
//! avoiding lock contention on the hot path of opening a connection.

use rand::rngs::ThreadRng;
use rand::Rng;
use std::cell::RefCell;

thread_local! {
	static RNG: RefCell<ThreadRng> = RefCell::new(rand::thread_rng());
}

/// Draws a random `u64`, suitable for a handshake `nonce` or a `ping` nonce.
pub fn next_nonce() -> u64 {
	RNG.with(|rng| rng.borrow_mut().gen())
}
