// Copyright 2018 The Grin Developers
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

//! Utility to track the rate of data transfers, used by the peer engine's
//! send/receive statistics.

use std::time::{Duration, SystemTime};

/// A rate counter tracks the number of transfers and the amount of data
/// exchanged over the last minute. It does not try to be proactively
/// accurate; it trims lazily on `inc`, so a quiet counter can briefly report
/// a stale rate.
pub struct RateCounter {
	last_min_bytes: Vec<u64>,
	last_min_times: Vec<u64>,
}

impl Default for RateCounter {
	fn default() -> Self {
		RateCounter::new()
	}
}

impl RateCounter {
	/// Instantiates a new, empty rate counter.
	pub fn new() -> RateCounter {
		RateCounter {
			last_min_bytes: vec![],
			last_min_times: vec![],
		}
	}

	/// Records a transfer of `bytes`, trimming entries older than one minute.
	pub fn inc(&mut self, bytes: u64) {
		let now_millis = millis_since_epoch();
		self.last_min_times.push(now_millis);
		self.last_min_bytes.push(bytes);
		while !self.last_min_times.is_empty() && self.last_min_times[0] + 60_000 < now_millis {
			self.last_min_times.remove(0);
			self.last_min_bytes.remove(0);
		}
	}

	/// Bytes transferred in the last minute.
	pub fn bytes_per_min(&self) -> u64 {
		self.last_min_bytes.iter().sum()
	}

	/// Count of transfers in the last minute.
	pub fn count_per_min(&self) -> u64 {
		self.last_min_bytes.len() as u64
	}
}

fn millis_since_epoch() -> u64 {
	let since_epoch = SystemTime::now()
		.duration_since(SystemTime::UNIX_EPOCH)
		.unwrap_or(Duration::new(0, 0));
	since_epoch.as_secs() * 1000 + u64::from(since_epoch.subsec_millis())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn accumulates_within_window() {
		let mut rc = RateCounter::new();
		rc.inc(100);
		rc.inc(50);
		assert_eq!(rc.bytes_per_min(), 150);
		assert_eq!(rc.count_per_min(), 2);
	}
}
