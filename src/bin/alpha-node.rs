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

//! Entry point for the `alpha-node` binary. Loads config, opens the data directory, starts the
//! chainstate/peer/sync machinery (`alpha_server::Node`) and, unless
//! disabled, the JSON-RPC control surface (`alpha_rpc`) alongside it, then
//! waits on Ctrl-C/SIGTERM to trigger a clean shutdown. Collapsed into one
//! file because this binary has no subcommands beyond "run a node" (no
//! wallet, no TUI, no stratum miner).

#[macro_use]
extern crate log;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;

use alpha_config::{Cli, GlobalConfig};
use alpha_core::randomx::TestVmFactory;
use alpha_server::Node as ServerNode;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	let data_dir = cli.data_dir.clone().unwrap_or_else(|| alpha_config::default_data_dir());
	std::fs::create_dir_all(&data_dir)?;

	let config_path: PathBuf = cli
		.config_file
		.clone()
		.unwrap_or_else(|| GlobalConfig::default_config_path(&data_dir));
	let mut global = GlobalConfig::new(Some(&config_path))?;
	// `data_dir` anchors where the config file itself was found, so it
	// always wins over whatever the loaded TOML happened to carry; `cli`
	// may then override it again with an explicit `--data-dir`.
	global.members.data_dir = data_dir;
	cli.apply(&mut global.members)?;

	if !global.using_config_file {
		// First run against this data dir: write the defaults out so the
		// operator has something to edit.
		global.write_to_file(&config_path)?;
	}

	alpha_util::init_logger(Some(global.members.logging.clone()));
	info!("starting alpha-node, chain={:?}, data_dir={}", global.members.chain_type, global.members.data_dir.display());

	// The RandomX primitive is an external collaborator out of this
	// workspace's scope: `TestVmFactory` is the
	// deterministic stand-in every network — including mainnet — runs
	// against until a real RandomX binding is linked in here.
	let vm_factory = Arc::new(TestVmFactory);
	let node = ServerNode::init(global.members.clone(), vm_factory)?;

	let rpc_config = global.members.rpc.clone();
	let rpc_handle = if rpc_config.enabled {
		let rpc_node = Arc::new(alpha_rpc::Node::new(
			Arc::clone(&node.chainstate),
			Arc::clone(&node.peer_manager),
			Arc::clone(&node.address_manager),
			Arc::clone(&node.banman),
		));
		let addr = rpc_config
			.listen_addr
			.parse()
			.map_err(|_| anyhow::anyhow!("invalid rpc_listen_addr '{}'", rpc_config.listen_addr))?;
		let stop = node.stop_state.clone();
		Some(tokio::spawn(async move {
			tokio::select! {
				_ = stop.wait_stop() => {}
				result = alpha_rpc::http::run(addr, rpc_node) => {
					if let Err(e) = result {
						warn!("JSON-RPC server exited: {}", e);
					}
				}
			}
		}))
	} else {
		info!("JSON-RPC control surface disabled (--no-rpc)");
		None
	};

	let shutdown_requested = Arc::new(AtomicBool::new(false));
	let stop_state = node.stop_state.clone();
	let handler_flag = Arc::clone(&shutdown_requested);
	ctrlc::set_handler(move || {
		if !handler_flag.swap(true, Ordering::SeqCst) {
			warn!("received shutdown signal, stopping...");
			stop_state.stop();
		}
	})
	.expect("failed to install SIGINT/SIGTERM handler");

	node.run().await?;
	if let Some(handle) = rpc_handle {
		let _ = handle.await;
	}
	info!("alpha-node stopped");
	Ok(())
}
