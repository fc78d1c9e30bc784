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

//! Errors returned by the JSON-RPC control surface. `easy_jsonrpc_mw`
//! serializes these straight into the `error.data` field of a JSON-RPC
//! error response, so the variant needs `Clone` (the trait method
//! signatures clone out of an inner error), `Serialize`/`Deserialize`
//! and a `Display`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, Error, Serialize, Deserialize)]
pub enum RpcError {
	#[error("bad argument: {0}")]
	Argument(String),
	#[error("not found")]
	NotFound,
	#[error("internal error: {0}")]
	Internal(String),
}

impl From<alpha_chain::Error> for RpcError {
	fn from(e: alpha_chain::Error) -> RpcError {
		RpcError::Internal(e.to_string())
	}
}

impl From<alpha_store::json_store::Error> for RpcError {
	fn from(e: alpha_store::json_store::Error) -> RpcError {
		RpcError::Internal(e.to_string())
	}
}
