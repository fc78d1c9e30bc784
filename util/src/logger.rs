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

//! Logging wrapper to be used throughout all crates in the workspace.

use std::ops::Deref;
use std::panic;

use crate::types::{LogLevel, LoggingConfig};
use crate::Mutex;

use log::{LevelFilter, Record};
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::append::rolling_file::{
	policy::compound::roll::fixed_window::FixedWindowRoller, policy::compound::trigger::size::SizeTrigger,
	policy::compound::CompoundPolicy, RollingFileAppender,
};
use log4rs::append::Append;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::filter::{threshold::ThresholdFilter, Filter, Response};

fn convert_log_level(in_level: &LogLevel) -> LevelFilter {
	match *in_level {
		LogLevel::Info => LevelFilter::Info,
		LogLevel::Warning => LevelFilter::Warn,
		LogLevel::Debug => LevelFilter::Debug,
		LogLevel::Trace => LevelFilter::Trace,
		LogLevel::Error => LevelFilter::Error,
	}
}

lazy_static! {
	/// Flag to observe whether logging was explicitly initialised (don't output otherwise)
	static ref WAS_INIT: Mutex<bool> = Mutex::new(false);
	/// Static logging configuration, should only be set once, before first logging call
	static ref LOGGING_CONFIG: Mutex<LoggingConfig> = Mutex::new(LoggingConfig::default());
}

const LOGGING_PATTERN: &str = "{d(%Y%m%d %H:%M:%S%.3f)} {h({l})} {M} - {m}{n}";

/// Rejects records that don't originate from one of our own crates, to keep
/// the log free of third-party chatter at debug/trace level.
#[derive(Debug)]
struct AlphaFilter;

impl Filter for AlphaFilter {
	fn filter(&self, record: &Record<'_>) -> Response {
		if let Some(module_path) = record.module_path() {
			if module_path.starts_with("alpha") {
				return Response::Neutral;
			}
		}
		Response::Reject
	}
}

/// Initializes the process-wide logger. Safe to call at most once; later
/// calls are no-ops (checked via `WAS_INIT`).
pub fn init_logger(config: Option<LoggingConfig>) {
	let mut was_init_ref = WAS_INIT.lock();
	if *was_init_ref.deref() {
		return;
	}

	let c = config.unwrap_or_default();

	{
		let mut config_ref = LOGGING_CONFIG.lock();
		*config_ref = c.clone();
	}

	let level_stdout = convert_log_level(&c.stdout_log_level);
	let level_file = convert_log_level(&c.file_log_level);
	let level_minimum = level_stdout.max(level_file);

	let stdout = ConsoleAppender::builder()
		.encoder(Box::new(PatternEncoder::new(LOGGING_PATTERN)))
		.build();

	let mut root = Root::builder();
	let mut appenders = vec![];

	if c.log_to_stdout {
		let filter = Box::new(ThresholdFilter::new(level_stdout));
		appenders.push(
			Appender::builder()
				.filter(filter)
				.filter(Box::new(AlphaFilter))
				.build("stdout", Box::new(stdout)),
		);
		root = root.appender("stdout");
	}

	if c.log_to_file {
		let filter = Box::new(ThresholdFilter::new(level_file));
		let file: Box<dyn Append> = if let Some(size) = c.log_max_size {
			let roller = FixedWindowRoller::builder()
				.build(&format!("{}.{{}}.gz", c.log_file_path), 32)
				.expect("valid fixed-window roller pattern");
			let trigger = SizeTrigger::new(size);
			let policy = CompoundPolicy::new(Box::new(trigger), Box::new(roller));
			Box::new(
				RollingFileAppender::builder()
					.append(c.log_file_append)
					.encoder(Box::new(PatternEncoder::new(LOGGING_PATTERN)))
					.build(&c.log_file_path, Box::new(policy))
					.expect("writable log file path"),
			)
		} else {
			Box::new(
				FileAppender::builder()
					.append(c.log_file_append)
					.encoder(Box::new(PatternEncoder::new(LOGGING_PATTERN)))
					.build(&c.log_file_path)
					.expect("writable log file path"),
			)
		};
		appenders.push(
			Appender::builder()
				.filter(filter)
				.filter(Box::new(AlphaFilter))
				.build("file", file),
		);
		root = root.appender("file");
	}

	let config = Config::builder()
		.appenders(appenders)
		.build(root.build(level_minimum))
		.expect("valid log4rs configuration");

	let _ = log4rs::init_config(config);

	info!(
		"log4rs initialized, file level: {:?}, stdout level: {:?}, min. level: {:?}",
		level_file, level_stdout, level_minimum
	);

	send_panic_to_log();
	*was_init_ref = true;
}

/// Initializes a minimal stdout-only logger, for use in unit and integration tests.
pub fn init_test_logger() {
	let mut cfg = LoggingConfig::default();
	cfg.log_to_file = false;
	cfg.stdout_log_level = LogLevel::Debug;
	init_logger(Some(cfg));
}

/// Sends panic messages to the log in addition to stderr, so a crash while
/// running detached still leaves a record of what happened.
fn send_panic_to_log() {
	panic::set_hook(Box::new(|info| {
		let thread = std::thread::current();
		let thread = thread.name().unwrap_or("unnamed");

		let msg = match info.payload().downcast_ref::<&'static str>() {
			Some(s) => *s,
			None => match info.payload().downcast_ref::<String>() {
				Some(s) => s.as_str(),
				None => "Box<Any>",
			},
		};

		match info.location() {
			Some(location) => {
				error!(
					"thread '{}' panicked at '{}': {}:{}",
					thread,
					msg,
					location.file(),
					location.line()
				);
			}
			None => error!("thread '{}' panicked at '{}'", thread, msg),
		}
	}));
}
