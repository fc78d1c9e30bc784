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

//! The Address Manager: a `new`/`tried` table of known peer
//! addresses, weighted selection biased toward addresses we've successfully
//! connected to before, and persistence across restarts.

use std::collections::HashMap;

use parking_lot::Mutex;
use rand::Rng;
use serde::{Deserialize, Serialize};

use alpha_p2p::NetAddress;
use alpha_store::JsonStore;

/// An address is dropped after this many consecutive connection failures.
pub const MAX_FAILURES: u32 = 10;

/// An address with no successful contact in this long is considered stale
/// and removed outright.
pub const STALE_SECS: i64 = 30 * 24 * 60 * 60;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct AddrRecord {
	addr: NetAddress,
	added: i64,
	last_success: Option<i64>,
	last_attempt: Option<i64>,
	consecutive_failures: u32,
}

impl AddrRecord {
	fn is_terrible(&self) -> bool {
		self.consecutive_failures >= MAX_FAILURES
	}

	fn is_stale(&self, now: i64) -> bool {
		let last = self.last_success.unwrap_or(self.added);
		now - last > STALE_SECS
	}
}

/// How many recent successful outbound peers are kept as anchors.
const MAX_ANCHORS: usize = 2;

#[derive(Serialize, Deserialize, Default)]
struct Snapshot {
	new: Vec<AddrRecord>,
	tried: Vec<AddrRecord>,
	#[serde(default)]
	anchors: Vec<NetAddress>,
}

struct Tables {
	new: HashMap<NetAddress, AddrRecord>,
	tried: HashMap<NetAddress, AddrRecord>,
	anchors: Vec<NetAddress>,
}

/// Known-peer database with `new` (unverified) and `tried` (successfully
/// connected at least once) tables.
pub struct AddressManager {
	tables: Mutex<Tables>,
	store: JsonStore,
}

impl AddressManager {
	pub fn open(path: std::path::PathBuf) -> alpha_store::json_store::Result<AddressManager> {
		let store = JsonStore::new(path);
		let snapshot: Snapshot = store.load()?.unwrap_or_default();
		let new = snapshot.new.into_iter().map(|r| (r.addr, r)).collect();
		let tried = snapshot.tried.into_iter().map(|r| (r.addr, r)).collect();
		Ok(AddressManager {
			tables: Mutex::new(Tables {
				new,
				tried,
				anchors: snapshot.anchors,
			}),
			store,
		})
	}

	/// Adds a freshly gossiped address to `new`. The caller-supplied
	/// timestamp (from the wire `addr` entry) is never trusted directly — the
	/// record is always stamped with our own clock.
	pub fn add(&self, addr: NetAddress, now: i64) {
		let mut tables = self.tables.lock();
		if tables.tried.contains_key(&addr) {
			return;
		}
		tables.new.entry(addr).or_insert_with(|| AddrRecord {
			addr,
			added: now,
			last_success: None,
			last_attempt: None,
			consecutive_failures: 0,
		});
	}

	/// Promotes `addr` from `new` to `tried` after a successful handshake.
	pub fn good(&self, addr: NetAddress, now: i64) {
		let mut tables = self.tables.lock();
		let mut record = tables.new.remove(&addr).or_else(|| tables.tried.remove(&addr)).unwrap_or(AddrRecord {
			addr,
			added: now,
			last_success: None,
			last_attempt: None,
			consecutive_failures: 0,
		});
		record.last_success = Some(now);
		record.consecutive_failures = 0;
		tables.tried.insert(addr, record);
	}

	/// Records a connection attempt, regardless of which table `addr` is in.
	pub fn attempt(&self, addr: NetAddress, now: i64) {
		let mut tables = self.tables.lock();
		if let Some(r) = tables.new.get_mut(&addr).or_else(|| tables.tried.get_mut(&addr)) {
			r.last_attempt = Some(now);
		}
	}

	/// Records a failed connection attempt, counting toward `MAX_FAILURES`.
	pub fn failed(&self, addr: NetAddress, now: i64) {
		let mut tables = self.tables.lock();
		if let Some(r) = tables.new.get_mut(&addr).or_else(|| tables.tried.get_mut(&addr)) {
			r.last_attempt = Some(now);
			r.consecutive_failures += 1;
		}
	}

	/// Weighted-random pick biased toward `tried`, skipping `terrible`
	/// entries. Returns `None` if both tables are
	/// empty of eligible candidates.
	pub fn select(&self) -> Option<NetAddress> {
		let tables = self.tables.lock();
		let tried: Vec<&AddrRecord> = tables.tried.values().filter(|r| !r.is_terrible()).collect();
		let new: Vec<&AddrRecord> = tables.new.values().filter(|r| !r.is_terrible()).collect();
		if tried.is_empty() && new.is_empty() {
			return None;
		}
		let mut rng = rand::thread_rng();
		let prefer_tried = !tried.is_empty() && (new.is_empty() || rng.gen_bool(0.5));
		let pool = if prefer_tried { &tried } else { &new };
		pool.get(rng.gen_range(0..pool.len())).map(|r| r.addr)
	}

	/// Drops entries with no successful contact in over `STALE_SECS`.
	pub fn remove_stale(&self, now: i64) -> usize {
		let mut tables = self.tables.lock();
		let before = tables.new.len() + tables.tried.len();
		tables.new.retain(|_, r| !r.is_stale(now));
		tables.tried.retain(|_, r| !r.is_stale(now));
		before - (tables.new.len() + tables.tried.len())
	}

	/// Records `addr` as the most recently successful outbound connection
	///: kept at the front, deduplicated,
	/// truncated to `MAX_ANCHORS`. Reconnecting to anchors first on restart
	/// is an eclipse-attack mitigation — an attacker who has taken over every
	/// `new`/`tried` entry still has to also control the handful of peers we
	/// were actually talking to right before the process stopped.
	pub fn record_anchor(&self, addr: NetAddress) {
		let mut tables = self.tables.lock();
		tables.anchors.retain(|a| *a != addr);
		tables.anchors.insert(0, addr);
		tables.anchors.truncate(MAX_ANCHORS);
	}

	/// The addresses to dial first on startup, ahead of `select()`.
	pub fn anchors(&self) -> Vec<NetAddress> {
		self.tables.lock().anchors.clone()
	}

	pub fn tried_len(&self) -> usize {
		self.tables.lock().tried.len()
	}

	pub fn new_len(&self) -> usize {
		self.tables.lock().new.len()
	}

	/// Saves the full table state to disk.
	pub fn save(&self) -> alpha_store::json_store::Result<()> {
		let tables = self.tables.lock();
		let snapshot = Snapshot {
			new: tables.new.values().cloned().collect(),
			tried: tables.tried.values().cloned().collect(),
			anchors: tables.anchors.clone(),
		};
		self.store.save(&snapshot)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn addr(port: u16) -> NetAddress {
		NetAddress(format!("127.0.0.1:{}", port).parse().unwrap())
	}

	fn manager() -> (AddressManager, tempfile::TempDir) {
		let dir = tempfile::tempdir().unwrap();
		let mgr = AddressManager::open(dir.path().join("addrs.json")).unwrap();
		(mgr, dir)
	}

	#[test]
	fn good_promotes_from_new_to_tried() {
		let (mgr, _dir) = manager();
		let a = addr(8333);
		mgr.add(a, 1000);
		assert_eq!(mgr.new_len(), 1);
		mgr.good(a, 1001);
		assert_eq!(mgr.new_len(), 0);
		assert_eq!(mgr.tried_len(), 1);
	}

	#[test]
	fn ten_consecutive_failures_marks_terrible_and_unselectable() {
		let (mgr, _dir) = manager();
		let a = addr(8333);
		mgr.add(a, 1000);
		for i in 0..MAX_FAILURES {
			mgr.failed(a, 1000 + i as i64);
		}
		assert!(mgr.select().is_none());
	}

	#[test]
	fn stale_entries_with_no_success_are_removed() {
		let (mgr, _dir) = manager();
		let a = addr(8333);
		mgr.add(a, 0);
		assert_eq!(mgr.remove_stale(STALE_SECS + 1), 1);
		assert_eq!(mgr.new_len(), 0);
	}

	#[test]
	fn anchors_keep_the_two_most_recent_and_survive_reopen() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("addrs.json");
		{
			let mgr = AddressManager::open(path.clone()).unwrap();
			mgr.record_anchor(addr(1));
			mgr.record_anchor(addr(2));
			mgr.record_anchor(addr(3));
			assert_eq!(mgr.anchors(), vec![addr(3), addr(2)]);
			mgr.save().unwrap();
		}
		let reopened = AddressManager::open(path).unwrap();
		assert_eq!(reopened.anchors(), vec![addr(3), addr(2)]);
	}

	#[test]
	fn re_anchoring_an_address_moves_it_to_the_front_without_duplicating() {
		let (mgr, _dir) = manager();
		mgr.record_anchor(addr(1));
		mgr.record_anchor(addr(2));
		mgr.record_anchor(addr(1));
		assert_eq!(mgr.anchors(), vec![addr(1), addr(2)]);
	}

	#[test]
	fn persists_across_reopen() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("addrs.json");
		{
			let mgr = AddressManager::open(path.clone()).unwrap();
			mgr.add(addr(8333), 1000);
			mgr.good(addr(8333), 1001);
			mgr.save().unwrap();
		}
		let reopened = AddressManager::open(path).unwrap();
		assert_eq!(reopened.tried_len(), 1);
	}
}
