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

// Directory utilities for cross-platform data directory management

use anyhow::Result;
use std::path::PathBuf;

const APP_DIR_NAME: &str = "gemini-chat";
const CONFIG_FILE_NAME: &str = "gemini_cli_config.json";

/// Get the data directory for gemini-chat
///
/// - macOS / Linux: ~/.local/share/gemini-chat
/// - Windows: %LOCALAPPDATA%/gemini-chat
///
/// The directory is not created here; the configuration store creates it on first write.
pub fn get_data_dir() -> Result<PathBuf> {
	let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?;

	#[cfg(target_os = "windows")]
	let path = match dirs::data_local_dir() {
		Some(dir) => dir.join(APP_DIR_NAME),
		None => home.join("AppData").join("Local").join(APP_DIR_NAME),
	};

	#[cfg(not(target_os = "windows"))]
	let path = home.join(".local").join("share").join(APP_DIR_NAME);

	Ok(path)
}

/// Get the default configuration file path
pub fn get_config_file_path() -> Result<PathBuf> {
	Ok(get_data_dir()?.join(CONFIG_FILE_NAME))
}
