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

//! Process-wide shutdown signal, shared by the I/O executor, the outbound
//! connection driver and periodic persistence tasks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// A cooperative shutdown flag. Checked at suspension points; does not
/// forcibly interrupt in-flight work, it only tells loops not to continue.
#[derive(Clone)]
pub struct StopState {
	stop: Arc<AtomicBool>,
	notify: Arc<Notify>,
}

impl Default for StopState {
	fn default() -> Self {
		StopState {
			stop: Arc::new(AtomicBool::new(false)),
			notify: Arc::new(Notify::new()),
		}
	}
}

impl StopState {
	/// Creates a fresh, not-yet-stopped state.
	pub fn new() -> StopState {
		StopState::default()
	}

	/// Whether a shutdown has been requested.
	pub fn is_stopped(&self) -> bool {
		self.stop.load(Ordering::Acquire)
	}

	/// Requests shutdown, waking every task parked on `wait_stop`.
	pub fn stop(&self) {
		self.stop.store(true, Ordering::Release);
		self.notify.notify_waiters();
	}

	/// Resolves once `stop()` has been called. Intended for use in a
	/// `tokio::select!` branch alongside the work a loop is actually doing.
	pub async fn wait_stop(&self) {
		if self.is_stopped() {
			return;
		}
		self.notify.notified().await;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn stop_wakes_waiters() {
		let state = StopState::new();
		assert!(!state.is_stopped());
		let waiter = state.clone();
		let handle = tokio::spawn(async move {
			waiter.wait_stop().await;
		});
		state.stop();
		handle.await.unwrap();
		assert!(state.is_stopped());
	}
}
