// Copyright 2025 Muvon Un Limited
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

// Runtime configuration consumed by the chat core, plus leveled console logging

pub mod application_data;
pub mod store;

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::path::PathBuf;

pub use application_data::{ApplicationData, SafetySetting, SafetyThreshold, ToolSetting};
pub use store::ConfigurationStore;

/// Model used when none is given on the command line.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default terminator for multi-line input.
pub const DEFAULT_LINE_TERMINATOR: &str = "$";

/// Default markdown style name.
pub const DEFAULT_STYLE: &str = "auto";

/// Default word wrap width for rendered responses.
pub const DEFAULT_WORD_WRAP: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum LogLevel {
	#[serde(rename = "none")]
	None,
	#[serde(rename = "info")]
	Info,
	#[serde(rename = "debug")]
	Debug,
}

impl Default for LogLevel {
	fn default() -> Self {
		Self::None
	}
}

impl LogLevel {
	/// Check if info logging is enabled
	pub fn is_info_enabled(&self) -> bool {
		matches!(self, LogLevel::Info | LogLevel::Debug)
	}

	/// Check if debug logging is enabled
	pub fn is_debug_enabled(&self) -> bool {
		matches!(self, LogLevel::Debug)
	}
}

/// Options the outer CLI layer hands to the chat core.
#[derive(Debug, Clone)]
pub struct Config {
	pub user: String,
	pub model: String,
	pub multiline: bool,
	pub line_terminator: String,
	pub style: String,
	pub word_wrap: usize,
	pub config_path: PathBuf,
	pub stream: bool,
	pub log_level: LogLevel,
}

impl Config {
	/// Input mode settings derived from the CLI flags.
	pub fn input_mode(&self) -> InputModeConfig {
		InputModeConfig {
			multiline: self.multiline,
			line_terminator: self.line_terminator.clone(),
		}
	}
}

/// Current input mode; toggled by the `!i` command and read on every terminal read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputModeConfig {
	pub multiline: bool,
	pub line_terminator: String,
}

impl Default for InputModeConfig {
	fn default() -> Self {
		Self {
			multiline: false,
			line_terminator: DEFAULT_LINE_TERMINATOR.to_string(),
		}
	}
}

// Logging macros for different log levels
// These macros check the level installed for the current thread and only print if appropriate

thread_local! {
	static CURRENT_LOG_LEVEL: Cell<LogLevel> = const { Cell::new(LogLevel::None) };
}

/// Set the log level for the thread (to be used by logging macros)
pub fn set_thread_log_level(level: LogLevel) {
	CURRENT_LOG_LEVEL.with(|c| c.set(level));
}

/// Get the log level for the current thread
pub fn thread_log_level() -> LogLevel {
	CURRENT_LOG_LEVEL.with(|c| c.get())
}

/// Info logging macro with automatic cyan coloring
/// Shows info messages when log level is Info OR Debug
#[macro_export]
macro_rules! log_info {
	($fmt:expr) => {
		if $crate::config::thread_log_level().is_info_enabled() {
			use colored::Colorize;
			println!("{}", $fmt.cyan());
		}
	};
	($fmt:expr, $($arg:expr),*) => {
		if $crate::config::thread_log_level().is_info_enabled() {
			use colored::Colorize;
			println!("{}", format!($fmt, $($arg),*).cyan());
		}
	};
}

/// Debug logging macro with automatic bright blue coloring
#[macro_export]
macro_rules! log_debug {
	($fmt:expr) => {
		if $crate::config::thread_log_level().is_debug_enabled() {
			use colored::Colorize;
			println!("{}", $fmt.bright_blue());
		}
	};
	($fmt:expr, $($arg:expr),*) => {
		if $crate::config::thread_log_level().is_debug_enabled() {
			use colored::Colorize;
			println!("{}", format!($fmt, $($arg),*).bright_blue());
		}
	};
}

/// Error logging macro with automatic bright red coloring
/// Always visible regardless of log level (errors should always be shown)
#[macro_export]
macro_rules! log_error {
	($fmt:expr) => {{
		use colored::Colorize;
		eprintln!("{}", $fmt.bright_red());
	}};
	($fmt:expr, $($arg:expr),*) => {{
		use colored::Colorize;
		eprintln!("{}", format!($fmt, $($arg),*).bright_red());
	}};
}
