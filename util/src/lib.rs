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

//! Logging, shutdown signalling and other low-level utilities shared by
//! every crate in the alpha node workspace.

#[macro_use]
extern crate log;

#[macro_use]
extern crate lazy_static;

pub use parking_lot::Mutex;

pub mod logger;
pub use logger::{init_logger, init_test_logger};

pub mod types;
pub use types::{LogLevel, LoggingConfig};

pub mod file;
pub mod hex;
pub mod nonce;
pub mod rate_counter;
pub mod stop;

pub use hex::{from_hex, to_hex};
pub use rate_counter::RateCounter;
pub use stop::StopState;
