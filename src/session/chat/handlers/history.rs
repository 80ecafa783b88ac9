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

// History operations handler: clear, store, load and delete

use super::super::response::Response;
use super::super::Chat;
use super::{choose_operation, EMPTY_ITEM, UNCHANGED};
use crate::log_info;
use anyhow::Result;
use chrono::Local;

const CLEAR: &str = "clear";
const STORE: &str = "store";
const LOAD: &str = "load";
const DELETE: &str = "delete";

pub fn handle_history(chat: &mut Chat, args: &str) -> Result<Response> {
	let Some((operation, argument)) = choose_operation(
		chat,
		"Select history operation",
		&[CLEAR, STORE, LOAD, DELETE],
		args,
	)?
	else {
		return Ok(Response::data(UNCHANGED));
	};

	match operation.as_str() {
		CLEAR => {
			chat.session.clear_history()?;
			chat.store.flush()?;
			Ok(Response::data("Cleared the chat history."))
		}
		STORE => store_history(chat, &argument),
		LOAD => load_history(chat, &argument),
		DELETE => {
			chat.store.clear_history_records();
			chat.store.flush()?;
			log_info!("Removed stored history records from {}", chat.store.path().display());
			Ok(Response::data("History records have been removed from the file."))
		}
		other => Err(anyhow::anyhow!("unknown history operation: \"{}\"", other)),
	}
}

fn store_history(chat: &mut Chat, label: &str) -> Result<Response> {
	let label = if label.is_empty() {
		chat.selector.input("Enter a label for the history record")?
	} else {
		label.to_string()
	};
	if label.is_empty() {
		return Err(anyhow::anyhow!("history record label must not be empty"));
	}

	let record_label = format!("{} - {}", Local::now().format("%Y-%m-%d %H:%M:%S"), label);
	chat.store
		.add_history_record(record_label.clone(), chat.session.history());
	chat.store.flush()?;
	log_info!("Stored history record {}", record_label);

	Ok(Response::data(format!(
		"\"{}\" has been saved to the file.",
		record_label
	)))
}

fn load_history(chat: &mut Chat, label: &str) -> Result<Response> {
	let label = if label.is_empty() {
		let mut items = vec![EMPTY_ITEM.to_string()];
		items.extend(chat.store.data.history_labels());
		match chat.selector.select("Select history record", &items, 0)? {
			Some(index) => items[index].clone(),
			None => return Ok(Response::data(UNCHANGED)),
		}
	} else {
		label.to_string()
	};
	if label == EMPTY_ITEM {
		return Ok(Response::data(UNCHANGED));
	}

	let records = chat
		.store
		.data
		.history
		.get(&label)
		.cloned()
		.ok_or_else(|| anyhow::anyhow!("unknown history record: \"{}\"", label))?;
	chat.session.set_history(records)?;
	chat.store.flush()?;
	log_info!("Loaded history record {}", label);

	Ok(Response::data(format!(
		"\"{}\" has been loaded to the chat history.",
		label
	)))
}

#[cfg(test)]
mod tests {
	use super::super::super::commands::SystemCommand;
	use super::super::super::select::test_support::Choice;
	use super::super::super::test_support::{harness, Script};
	use super::super::handle_system_command;
	use super::*;
	use crate::config::ConfigurationStore;
	use std::fs;

	#[tokio::test]
	async fn test_store_and_load() {
		let mut h = harness(Script::default());
		h.chat.session.send_message("m1").await.unwrap();
		let saved = h.chat.session.history();

		let response = handle_history(&mut h.chat, "store first").unwrap();
		let label = h.chat.store.data.history_labels().pop().unwrap();
		assert!(label.ends_with(" - first"));
		assert_eq!(label.len(), "2025-01-01 00:00:00 - first".len());
		assert_eq!(
			response.text(),
			format!("\"{}\" has been saved to the file.", label)
		);

		let on_disk = ConfigurationStore::load(h.dir.path().join("config.json")).unwrap();
		assert_eq!(on_disk.data.history.get(&label), Some(&saved));

		handle_history(&mut h.chat, "clear").unwrap();
		assert!(h.chat.session.history().is_empty());

		let response = handle_history(&mut h.chat, &format!("load {}", label)).unwrap();
		assert_eq!(
			response.text(),
			format!("\"{}\" has been loaded to the chat history.", label)
		);
		assert_eq!(h.chat.session.history(), saved);
	}

	#[test]
	fn test_interactive_store_and_load() {
		let mut h = harness(Script {
			choices: vec![
				Choice::Item("store"),
				Choice::Item("load"),
				Choice::Item(EMPTY_ITEM),
				Choice::Cancel,
			],
			inputs: vec!["typed"],
			..Default::default()
		});

		handle_history(&mut h.chat, "").unwrap();
		assert_eq!(h.chat.store.data.history.len(), 1);

		let response = handle_history(&mut h.chat, "").unwrap();
		assert_eq!(response.text(), UNCHANGED);

		let response = handle_history(&mut h.chat, "").unwrap();
		assert_eq!(response.text(), UNCHANGED);
	}

	#[test]
	fn test_delete_removes_records_from_file() {
		let mut h = harness(Script::default());
		handle_history(&mut h.chat, "store a").unwrap();
		handle_history(&mut h.chat, "store b").unwrap();

		let response = handle_history(&mut h.chat, "delete").unwrap();
		assert_eq!(
			response.text(),
			"History records have been removed from the file."
		);

		let on_disk = ConfigurationStore::load(h.dir.path().join("config.json")).unwrap();
		assert!(on_disk.data.history.is_empty());
	}

	#[tokio::test]
	async fn test_failed_save_is_reported_and_keeps_state() {
		let mut h = harness(Script::default());
		h.chat.session.send_message("m1").await.unwrap();

		// A directory in place of the config file makes every flush fail.
		let config_path = h.dir.path().join("config.json");
		fs::remove_file(&config_path).unwrap();
		fs::create_dir(&config_path).unwrap();
		fs::write(config_path.join("blocker"), "x").unwrap();

		let (response, quit) =
			handle_system_command(&mut h.chat, SystemCommand::History, "store notes").await;
		assert!(response.is_error());
		assert!(!quit);
		assert_eq!(h.chat.store.data.history.len(), 1);

		let (response, quit) =
			handle_system_command(&mut h.chat, SystemCommand::History, "delete").await;
		assert!(response.is_error());
		assert!(!quit);
		assert!(h.chat.store.data.history.is_empty());
		assert_eq!(h.chat.session.history().len(), 2);
	}

	#[test]
	fn test_errors() {
		let mut h = harness(Script::default());
		assert!(handle_history(&mut h.chat, "load missing").is_err());
		assert!(handle_history(&mut h.chat, "rewind").is_err());
	}
}
