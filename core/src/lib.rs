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

//! Header, consensus parameters, difficulty adjustment, and the two-tier
//! RandomX validation engine shared by every other crate in the node.

#![deny(unused_mut)]
#![warn(missing_docs)]

pub mod consensus;
pub mod error;
pub mod genesis;
pub mod hash;
pub mod header;
pub mod randomx;
pub mod ser;
pub mod target;
pub mod validation;

pub use crate::consensus::{ConsensusParams, Network};
pub use crate::error::RejectReason;
pub use crate::hash::{Hash, Hashed};
pub use crate::header::{Header, HEADER_SIZE};
pub use crate::target::ChainWork;
