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

//! Errors surfaced while standing up or running a node.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
	#[error("chain error: {0}")]
	Chain(#[from] alpha_chain::Error),
	#[error("address/ban store error: {0}")]
	Store(#[from] alpha_store::json_store::Error),
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
	#[error("invalid listen address {0}")]
	InvalidAddr(String),
}
