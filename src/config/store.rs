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

// Configuration store: JSON application data with stale-file detection and merge on flush

use super::ApplicationData;
use crate::session::Message;
use crate::{log_debug, log_error};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// On-disk application data plus the modification time observed at the last load or flush.
#[derive(Debug)]
pub struct ConfigurationStore {
	path: PathBuf,
	pub data: ApplicationData,
	last_modified: Option<SystemTime>,
	// Set by clear_history_records until the next successful flush, so that a
	// stale-file merge does not bring deleted records back.
	history_cleared: bool,
}

impl ConfigurationStore {
	/// Load the configuration from `path`.
	///
	/// A missing file is replaced by defaults which are written out immediately.
	/// A file that exists but cannot be decoded is an error: corrupt data is never
	/// silently replaced by defaults.
	pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
		let mut store = Self {
			path: path.into(),
			data: ApplicationData::default(),
			last_modified: None,
			history_cleared: false,
		};

		// Stat before reading: a write racing with the read then shows up as stale later.
		let modified = match fs::metadata(&store.path) {
			Ok(metadata) => metadata.modified().with_context(|| {
				format!("Failed to read modification time of {}", store.path.display())
			})?,
			Err(e) if e.kind() == ErrorKind::NotFound => {
				log_debug!(
					"No configuration at {}, creating defaults",
					store.path.display()
				);
				if let Err(e) = store.flush() {
					log_error!(
						"Failed to write default configuration to {}: {:#}",
						store.path.display(),
						e
					);
				}
				return Ok(store);
			}
			Err(e) => {
				return Err(e)
					.with_context(|| format!("Failed to access {}", store.path.display()));
			}
		};

		store.data = read_application_data(&store.path)?;
		store.last_modified = Some(modified);
		log_debug!(
			"Loaded configuration from {} ({} history records)",
			store.path.display(),
			store.data.history.len()
		);

		Ok(store)
	}

	/// Path of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Modification time recorded at the last successful load or flush.
	pub fn last_modified(&self) -> Option<SystemTime> {
		self.last_modified
	}

	/// Store a snapshot of the session history under `label`.
	pub fn add_history_record(&mut self, label: String, history: Vec<Message>) {
		self.data.add_history_record(label, history);
	}

	/// Remove every stored history record.
	pub fn clear_history_records(&mut self) {
		self.data.history.clear();
		self.history_cleared = true;
	}

	/// Write the in-memory data back to the file.
	///
	/// When the file changed since this process last read or wrote it, the on-disk
	/// copy is merged in first: prompts, safety settings and tools are taken from
	/// disk, history records are combined by label with in-memory records winning.
	/// On failure the in-memory data is left as is so the flush can be retried.
	pub fn flush(&mut self) -> Result<()> {
		self.reload_if_stale()?;
		self.write()?;
		self.history_cleared = false;
		Ok(())
	}

	fn reload_if_stale(&mut self) -> Result<()> {
		let modified = match fs::metadata(&self.path) {
			Ok(metadata) => metadata.modified().with_context(|| {
				format!("Failed to read modification time of {}", self.path.display())
			})?,
			Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
			Err(e) => {
				return Err(e).with_context(|| {
					format!("Failed to stat configuration file {}", self.path.display())
				});
			}
		};

		if let Some(last_modified) = self.last_modified {
			if modified <= last_modified {
				return Ok(());
			}
		}

		log_debug!(
			"Configuration file {} changed externally, merging",
			self.path.display()
		);
		let on_disk = read_application_data(&self.path)
			.context("Failed to reload externally modified configuration")?;
		self.merge(on_disk);

		Ok(())
	}

	fn merge(&mut self, on_disk: ApplicationData) {
		// The running process never edits these directly; the last external writer wins.
		self.data.system_prompts = on_disk.system_prompts;
		self.data.safety_settings = on_disk.safety_settings;
		self.data.tools = on_disk.tools;

		if self.history_cleared {
			return;
		}
		for (label, records) in on_disk.history {
			self.data.history.entry(label).or_insert(records);
		}
	}

	fn write(&mut self) -> Result<()> {
		if let Some(parent) = self.path.parent() {
			if !parent.as_os_str().is_empty() {
				fs::create_dir_all(parent).with_context(|| {
					format!("Failed to create directory {}", parent.display())
				})?;
			}
		}

		let mut encoded =
			serde_json::to_string_pretty(&self.data).context("Failed to encode configuration")?;
		encoded.push('\n');

		let temp_path = temp_path_for(&self.path);
		if let Err(e) = replace_file(&temp_path, &self.path, encoded.as_bytes()) {
			if let Err(cleanup) = fs::remove_file(&temp_path) {
				if cleanup.kind() != ErrorKind::NotFound {
					log_debug!("Failed to remove {}: {}", temp_path.display(), cleanup);
				}
			}
			return Err(e);
		}

		let modified = fs::metadata(&self.path)
			.and_then(|metadata| metadata.modified())
			.with_context(|| format!("Failed to stat {}", self.path.display()))?;
		self.last_modified = Some(modified);
		log_debug!("Configuration written to {}", self.path.display());

		Ok(())
	}
}

fn read_application_data(path: &Path) -> Result<ApplicationData> {
	let contents = fs::read_to_string(path)
		.with_context(|| format!("Failed to read configuration from {}", path.display()))?;
	serde_json::from_str(&contents)
		.with_context(|| format!("Failed to decode configuration file {}", path.display()))
}

// Write to the temp file, sync it, then move it over the target.
fn replace_file(temp_path: &Path, path: &Path, contents: &[u8]) -> Result<()> {
	let mut file = File::create(temp_path)
		.with_context(|| format!("Failed to create {}", temp_path.display()))?;
	file.write_all(contents)
		.with_context(|| format!("Failed to write {}", temp_path.display()))?;
	file.sync_all()
		.with_context(|| format!("Failed to sync {}", temp_path.display()))?;
	drop(file);

	fs::rename(temp_path, path).with_context(|| {
		format!(
			"Failed to replace {} with {}",
			path.display(),
			temp_path.display()
		)
	})
}

fn temp_path_for(path: &Path) -> PathBuf {
	let file_name = path
		.file_name()
		.map(|name| name.to_string_lossy().into_owned())
		.unwrap_or_else(|| "config.json".to_string());
	path.with_file_name(format!(".{}.tmp", file_name))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::{SafetySetting, SafetyThreshold};
	use crate::session::Role;
	use std::time::Duration;

	fn record(text: &str) -> Vec<Message> {
		vec![
			Message::new(Role::User, text),
			Message::new(Role::Model, format!("re: {}", text)),
		]
	}

	// Rewrite the file as another process would and push its mtime past the recorded one.
	fn write_externally(store: &ConfigurationStore, data: &ApplicationData) {
		fs::write(store.path(), serde_json::to_string_pretty(data).unwrap()).unwrap();
		let newer = store.last_modified().unwrap() + Duration::from_secs(10);
		File::options()
			.write(true)
			.open(store.path())
			.unwrap()
			.set_modified(newer)
			.unwrap();
	}

	#[test]
	fn test_load_creates_defaults_when_missing() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("nested").join("config.json");

		let store = ConfigurationStore::load(&path).unwrap();
		assert_eq!(store.data, ApplicationData::default());
		assert!(path.exists());
		assert!(store.last_modified().is_some());

		let on_disk: ApplicationData =
			serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
		assert_eq!(on_disk, ApplicationData::default());
	}

	#[test]
	fn test_load_rejects_malformed_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.json");
		fs::write(&path, "{ not json").unwrap();

		let err = ConfigurationStore::load(&path).unwrap_err();
		assert!(format!("{:#}", err).contains("Failed to decode"));
		// The corrupt file must not be replaced.
		assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
	}

	#[test]
	fn test_round_trip_through_fresh_store() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.json");

		let mut store = ConfigurationStore::load(&path).unwrap();
		store
			.data
			.system_prompts
			.insert("terse".to_string(), "Be brief.".to_string());
		store.data.safety_settings = vec![SafetySetting {
			category: "HARM_CATEGORY_HARASSMENT".to_string(),
			threshold: SafetyThreshold::High,
		}];
		store.data.tools[0].enabled = true;
		store.add_history_record("one".to_string(), record("a"));
		store.flush().unwrap();

		let reloaded = ConfigurationStore::load(&path).unwrap();
		assert_eq!(reloaded.data.system_prompts, store.data.system_prompts);
		assert_eq!(reloaded.data.safety_settings, store.data.safety_settings);
		assert_eq!(reloaded.data.tools, store.data.tools);
		assert_eq!(reloaded.data.history, store.data.history);

		// Encoding is deterministic, so a second flush leaves identical bytes.
		let before = fs::read_to_string(&path).unwrap();
		let mut again = reloaded;
		again.flush().unwrap();
		assert_eq!(fs::read_to_string(&path).unwrap(), before);
	}

	#[test]
	fn test_flush_merges_history_from_stale_file() {
		let dir = tempfile::tempdir().unwrap();
		let mut store = ConfigurationStore::load(dir.path().join("config.json")).unwrap();
		store.add_history_record("B".to_string(), record("b"));

		let mut external = ApplicationData::default();
		external.add_history_record("A".to_string(), record("a"));
		write_externally(&store, &external);

		store.flush().unwrap();

		let on_disk = read_application_data(store.path()).unwrap();
		assert_eq!(on_disk.history_labels(), vec!["A", "B"]);
		assert_eq!(on_disk.history["A"], record("a"));
		assert_eq!(on_disk.history["B"], record("b"));
	}

	#[test]
	fn test_flush_keeps_in_memory_record_on_label_conflict() {
		let dir = tempfile::tempdir().unwrap();
		let mut store = ConfigurationStore::load(dir.path().join("config.json")).unwrap();
		store.add_history_record("A".to_string(), record("mine"));

		let mut external = ApplicationData::default();
		external.add_history_record("A".to_string(), record("theirs"));
		write_externally(&store, &external);

		store.flush().unwrap();

		let on_disk = read_application_data(store.path()).unwrap();
		assert_eq!(on_disk.history["A"], record("mine"));
	}

	#[test]
	fn test_stale_merge_takes_prompts_settings_and_tools_from_disk() {
		let dir = tempfile::tempdir().unwrap();
		let mut store = ConfigurationStore::load(dir.path().join("config.json")).unwrap();
		store
			.data
			.system_prompts
			.insert("local".to_string(), "unsaved".to_string());

		let mut external = ApplicationData::default();
		external
			.system_prompts
			.insert("shared".to_string(), "from disk".to_string());
		external.safety_settings.clear();
		external.tools[1].enabled = true;
		write_externally(&store, &external);

		store.flush().unwrap();

		assert_eq!(store.data.system_prompts, external.system_prompts);
		assert!(store.data.safety_settings.is_empty());
		assert_eq!(store.data.tools, external.tools);
	}

	#[test]
	fn test_fresh_file_is_overwritten_without_merge() {
		let dir = tempfile::tempdir().unwrap();
		let mut store = ConfigurationStore::load(dir.path().join("config.json")).unwrap();

		let mut external = ApplicationData::default();
		external.add_history_record("A".to_string(), record("a"));
		fs::write(store.path(), serde_json::to_string(&external).unwrap()).unwrap();
		// Same modification time as recorded: not considered stale.
		File::options()
			.write(true)
			.open(store.path())
			.unwrap()
			.set_modified(store.last_modified().unwrap())
			.unwrap();

		store.flush().unwrap();

		let on_disk = read_application_data(store.path()).unwrap();
		assert!(on_disk.history.is_empty());
	}

	#[test]
	fn test_flush_writes_when_file_was_removed() {
		let dir = tempfile::tempdir().unwrap();
		let mut store = ConfigurationStore::load(dir.path().join("config.json")).unwrap();
		store.add_history_record("A".to_string(), record("a"));
		fs::remove_file(store.path()).unwrap();

		store.flush().unwrap();

		let on_disk = read_application_data(store.path()).unwrap();
		assert_eq!(on_disk.history_labels(), vec!["A"]);
	}

	#[test]
	fn test_cleared_history_is_not_resurrected_by_merge() {
		let dir = tempfile::tempdir().unwrap();
		let mut store = ConfigurationStore::load(dir.path().join("config.json")).unwrap();
		store.add_history_record("A".to_string(), record("a"));
		store.flush().unwrap();

		let mut external = store.data.clone();
		external.add_history_record("C".to_string(), record("c"));
		write_externally(&store, &external);

		store.clear_history_records();
		store.flush().unwrap();

		let on_disk = read_application_data(store.path()).unwrap();
		assert!(on_disk.history.is_empty());
	}

	#[test]
	fn test_failed_flush_keeps_in_memory_state() {
		let dir = tempfile::tempdir().unwrap();
		let mut store = ConfigurationStore::load(dir.path().join("config.json")).unwrap();
		store.add_history_record("A".to_string(), record("a"));

		// A corrupt, newer file makes the merge step fail.
		fs::write(store.path(), "garbage").unwrap();
		let newer = store.last_modified().unwrap() + Duration::from_secs(10);
		File::options()
			.write(true)
			.open(store.path())
			.unwrap()
			.set_modified(newer)
			.unwrap();

		assert!(store.flush().is_err());
		assert_eq!(store.data.history_labels(), vec!["A"]);
	}

	#[test]
	fn test_failed_replace_removes_temp_file() {
		let dir = tempfile::tempdir().unwrap();
		let mut store = ConfigurationStore::load(dir.path().join("config.json")).unwrap();
		store.add_history_record("A".to_string(), record("a"));

		// A non-empty directory at the target path makes the rename fail.
		fs::remove_file(store.path()).unwrap();
		fs::create_dir(store.path()).unwrap();
		fs::write(store.path().join("blocker"), "x").unwrap();
		store.last_modified = Some(SystemTime::now() + Duration::from_secs(86400));

		assert!(store.flush().is_err());
		assert!(!temp_path_for(store.path()).exists());
		assert_eq!(store.data.history_labels(), vec!["A"]);
	}
}
