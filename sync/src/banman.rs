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

//! BanMan: manually issued bans and automatic, time-limited
//! discouragement for misbehaving peers, persisted across restarts.

use std::collections::HashMap;
use std::net::IpAddr;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use alpha_store::JsonStore;

/// Default duration an address is discouraged after crossing the
/// misbehavior ban threshold.
pub const DEFAULT_DISCOURAGE_SECS: i64 = 24 * 60 * 60;

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct BanEntry {
	/// Unix timestamp the ban/discouragement lifts, or `i64::MAX` for a
	/// manual ban with no expiry.
	until: i64,
	manual: bool,
}

#[derive(Serialize, Deserialize, Default)]
struct Snapshot {
	entries: Vec<(IpAddr, BanEntry)>,
}

/// Tracks banned and discouraged IPs. Keyed by IP
/// alone, not `SocketAddr` — a ban applies regardless of port, matching
/// Bitcoin Core's `CBanDB` semantics.
pub struct BanMan {
	entries: Mutex<HashMap<IpAddr, BanEntry>>,
	store: JsonStore,
}

impl BanMan {
	pub fn open(path: std::path::PathBuf) -> alpha_store::json_store::Result<BanMan> {
		let store = JsonStore::new(path);
		let snapshot: Snapshot = store.load()?.unwrap_or_default();
		Ok(BanMan {
			entries: Mutex::new(snapshot.entries.into_iter().collect()),
			store,
		})
	}

	/// A manual, long-duration ban with no automatic expiry.
	pub fn ban(&self, ip: IpAddr) {
		self.entries.lock().insert(ip, BanEntry { until: i64::MAX, manual: true });
	}

	/// Automatic discouragement from crossing the misbehavior ban threshold
	///, expiring after `DEFAULT_DISCOURAGE_SECS`.
	pub fn discourage(&self, ip: IpAddr, now: i64) {
		let mut entries = self.entries.lock();
		let until = now + DEFAULT_DISCOURAGE_SECS;
		entries
			.entry(ip)
			.and_modify(|e| {
				if !e.manual {
					e.until = e.until.max(until);
				}
			})
			.or_insert(BanEntry { until, manual: false });
	}

	pub fn unban(&self, ip: IpAddr) {
		self.entries.lock().remove(&ip);
	}

	/// Checked before opening any connection and before accepting any
	/// inbound.
	pub fn is_banned(&self, ip: IpAddr, now: i64) -> bool {
		self.entries.lock().get(&ip).map(|e| e.until > now).unwrap_or(false)
	}

	pub fn list_banned(&self) -> Vec<IpAddr> {
		self.entries.lock().keys().copied().collect()
	}

	pub fn clear_expired(&self, now: i64) {
		self.entries.lock().retain(|_, e| e.until > now);
	}

	pub fn save(&self) -> alpha_store::json_store::Result<()> {
		let entries = self.entries.lock();
		let snapshot = Snapshot {
			entries: entries.iter().map(|(k, v)| (*k, *v)).collect(),
		};
		self.store.save(&snapshot)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ip() -> IpAddr {
		"203.0.113.5".parse().unwrap()
	}

	fn manager() -> (BanMan, tempfile::TempDir) {
		let dir = tempfile::tempdir().unwrap();
		let mgr = BanMan::open(dir.path().join("bans.json")).unwrap();
		(mgr, dir)
	}

	#[test]
	fn discouragement_expires_but_manual_ban_does_not() {
		let (mgr, _dir) = manager();
		mgr.discourage(ip(), 1000);
		assert!(mgr.is_banned(ip(), 1000));
		assert!(!mgr.is_banned(ip(), 1000 + DEFAULT_DISCOURAGE_SECS + 1));

		mgr.ban(ip());
		assert!(mgr.is_banned(ip(), i64::MAX - 1));
	}

	#[test]
	fn manual_ban_is_not_shortened_by_a_later_discourage() {
		let (mgr, _dir) = manager();
		mgr.ban(ip());
		mgr.discourage(ip(), 1000);
		assert!(mgr.is_banned(ip(), 1000 + DEFAULT_DISCOURAGE_SECS + 1));
	}

	#[test]
	fn unban_clears_entry() {
		let (mgr, _dir) = manager();
		mgr.ban(ip());
		mgr.unban(ip());
		assert!(!mgr.is_banned(ip(), 0));
	}
}
