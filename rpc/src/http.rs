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

//! HTTP front end for the JSON-RPC control surface. The
//! endpoint only answers POST, body is the json-rpc 2.0 request, served
//! with a plain `hyper::service::{make_service_fn, service_fn}` pair.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use easy_jsonrpc_mw::{Handler, MaybeReply};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};

use crate::node::Node;
use crate::node_rpc::NodeRpc;

async fn serve(req: Request<Body>, node: Arc<Node>) -> Result<Response<Body>, Infallible> {
	if req.method() != Method::POST {
		return Ok(Response::builder()
			.status(StatusCode::METHOD_NOT_ALLOWED)
			.body(Body::from("only POST is supported"))
			.expect("building a static response never fails"));
	}

	let body = match hyper::body::to_bytes(req.into_body()).await {
		Ok(b) => b,
		Err(e) => {
			return Ok(Response::builder()
				.status(StatusCode::BAD_REQUEST)
				.body(Body::from(format!("failed to read request body: {}", e)))
				.expect("building a static response never fails"));
		}
	};

	let request: serde_json::Value = match serde_json::from_slice(&body) {
		Ok(v) => v,
		Err(e) => {
			return Ok(Response::builder()
				.status(StatusCode::BAD_REQUEST)
				.body(Body::from(format!("invalid json-rpc request: {}", e)))
				.expect("building a static response never fails"));
		}
	};

	let rpc: &dyn NodeRpc = &*node;
	let reply = match rpc.handle_request(request) {
		MaybeReply::Reply(r) => r,
		// It's HTTP, so something has to go back; json-rpc clients parse
		// this as an empty batch response.
		MaybeReply::DontReply => serde_json::json!([]),
	};

	Ok(Response::builder()
		.status(StatusCode::OK)
		.header(hyper::header::CONTENT_TYPE, "application/json")
		.body(Body::from(serde_json::to_vec(&reply).expect("json-rpc reply always serializes")))
		.expect("building a response from a serialized body never fails"))
}

/// Binds and runs the JSON-RPC HTTP listener until the returned future is
/// dropped or the process is signalled; callers race this against the
/// node's own `StopState` the way `alpha_server::Node::run` races its
/// accept loop.
pub async fn run(addr: SocketAddr, node: Arc<Node>) -> Result<(), hyper::Error> {
	let make_svc = make_service_fn(move |_conn| {
		let node = Arc::clone(&node);
		async move { Ok::<_, Infallible>(service_fn(move |req| serve(req, Arc::clone(&node)))) }
	});
	info!("JSON-RPC control surface listening on {}", addr);
	Server::bind(&addr).serve(make_svc).await
}
