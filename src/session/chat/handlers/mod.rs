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

// System command handlers, one module per command

mod help;
mod history;
mod input_mode;
mod model;
mod prompt;
pub(super) mod query;
mod quit;

use super::commands::SystemCommand;
use super::response::Response;
use super::Chat;

/// Answer when the requested value is already active or a selection was cancelled.
pub const UNCHANGED: &str = "The selection is unchanged.";

/// Answer for a prefixed line whose token is not in the command table.
pub const UNKNOWN_COMMAND: &str = "unknown system command";

/// First entry of selection lists, standing for "none".
pub const EMPTY_ITEM: &str = "Empty";

/// Run a system command; the flag tells the controller to stop reading.
pub async fn handle_system_command(
	chat: &mut Chat,
	command: SystemCommand,
	args: &str,
) -> (Response, bool) {
	match command {
		SystemCommand::Quit => quit::handle_quit(),
		SystemCommand::Help => (help::handle_help(chat), false),
		SystemCommand::SelectPrompt => (prompt::handle_prompt(chat, args).into(), false),
		SystemCommand::InputMode => (input_mode::handle_input_mode(chat, args).into(), false),
		SystemCommand::Model => (model::handle_model(chat, args).await.into(), false),
		SystemCommand::History => (history::handle_history(chat, args).into(), false),
	}
}

// Split "op rest" into the operation name and its trimmed argument.
fn split_operation(args: &str) -> (&str, &str) {
	match args.split_once(' ') {
		Some((operation, rest)) => (operation, rest.trim()),
		None => (args, ""),
	}
}

// Ask for one of `operations` when no operation was given; `None` on cancel.
fn choose_operation(
	chat: &mut Chat,
	prompt: &str,
	operations: &[&str],
	args: &str,
) -> anyhow::Result<Option<(String, String)>> {
	let (operation, rest) = split_operation(args);
	if !operation.is_empty() {
		return Ok(Some((operation.to_string(), rest.to_string())));
	}

	let items: Vec<String> = operations.iter().map(|op| op.to_string()).collect();
	Ok(chat
		.selector
		.select(prompt, &items, 0)?
		.map(|index| (items[index].clone(), String::new())))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_split_operation() {
		assert_eq!(split_operation(""), ("", ""));
		assert_eq!(split_operation("list"), ("list", ""));
		assert_eq!(split_operation("store my  notes "), ("store", "my  notes"));
	}
}
