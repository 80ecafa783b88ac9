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

// System command tokens and input classification

/// Marker that turns an input line into a system command.
pub const SYSTEM_PREFIX: char = '!';

pub const QUIT_COMMAND: &str = "q";
pub const HELP_COMMAND: &str = "help";
pub const PROMPT_COMMAND: &str = "p";
pub const INPUT_MODE_COMMAND: &str = "i";
pub const MODEL_COMMAND: &str = "m";
pub const HISTORY_COMMAND: &str = "h";

/// The closed set of system commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemCommand {
	Quit,
	Help,
	SelectPrompt,
	InputMode,
	Model,
	History,
}

const COMMAND_TABLE: [(&str, SystemCommand); 6] = [
	(QUIT_COMMAND, SystemCommand::Quit),
	(HELP_COMMAND, SystemCommand::Help),
	(PROMPT_COMMAND, SystemCommand::SelectPrompt),
	(INPUT_MODE_COMMAND, SystemCommand::InputMode),
	(MODEL_COMMAND, SystemCommand::Model),
	(HISTORY_COMMAND, SystemCommand::History),
];

impl SystemCommand {
	pub fn all() -> impl Iterator<Item = SystemCommand> {
		COMMAND_TABLE.iter().map(|(_, command)| *command)
	}

	pub fn from_token(token: &str) -> Option<Self> {
		COMMAND_TABLE
			.iter()
			.find(|(name, _)| *name == token)
			.map(|(_, command)| *command)
	}

	pub fn token(&self) -> &'static str {
		match self {
			SystemCommand::Quit => QUIT_COMMAND,
			SystemCommand::Help => HELP_COMMAND,
			SystemCommand::SelectPrompt => PROMPT_COMMAND,
			SystemCommand::InputMode => INPUT_MODE_COMMAND,
			SystemCommand::Model => MODEL_COMMAND,
			SystemCommand::History => HISTORY_COMMAND,
		}
	}

	/// Full command line, prefix included.
	pub fn line(&self) -> String {
		format!("{}{}", SYSTEM_PREFIX, self.token())
	}

	/// Accepted arguments, used by help and completion.
	pub fn arguments(&self) -> &'static [&'static str] {
		match self {
			SystemCommand::Quit | SystemCommand::Help => &[],
			SystemCommand::SelectPrompt => &["<label>", "Empty"],
			SystemCommand::InputMode => &["single-line", "multi-line"],
			SystemCommand::Model => &["list", "select", "info"],
			SystemCommand::History => &["clear", "store", "load", "delete"],
		}
	}

	pub fn description(&self) -> &'static str {
		match self {
			SystemCommand::Quit => "Exit the application.",
			SystemCommand::Help => "Show this help message.",
			SystemCommand::SelectPrompt => "Select the system instruction.",
			SystemCommand::InputMode => "Toggle the input mode between single-line and multi-line.",
			SystemCommand::Model => "Model operations: list available models, select one or show its details.",
			SystemCommand::History => "History operations: clear the chat, store it, load a stored record or delete all records.",
		}
	}
}

/// A classified input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
	/// `!token args`; `command` is `None` for an unknown token.
	System {
		token: &'a str,
		command: Option<SystemCommand>,
		args: &'a str,
	},
	/// Anything else, sent to the model as is.
	Query(&'a str),
}

/// Classify a non-empty line by its first character.
pub fn classify(line: &str) -> Input<'_> {
	let Some(rest) = line.strip_prefix(SYSTEM_PREFIX) else {
		return Input::Query(line);
	};

	let (token, args) = match rest.split_once(' ') {
		Some((token, args)) => (token, args.trim()),
		None => (rest, ""),
	};

	Input::System {
		token,
		command: SystemCommand::from_token(token),
		args,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_queries_are_not_commands() {
		for line in ["hello", " !q", "what is 1 + 1?", "q", "help"] {
			assert_eq!(classify(line), Input::Query(line));
		}
	}

	#[test]
	fn test_known_commands() {
		for command in SystemCommand::all() {
			let line = command.line();
			match classify(&line) {
				Input::System {
					token,
					command: found,
					args,
				} => {
					assert_eq!(token, command.token());
					assert_eq!(found, Some(command));
					assert_eq!(args, "");
				}
				other => panic!("{:?} classified as {:?}", line, other),
			}
		}
	}

	#[test]
	fn test_arguments_follow_first_space() {
		assert_eq!(
			classify("!h store  my label "),
			Input::System {
				token: "h",
				command: Some(SystemCommand::History),
				args: "my label",
			}
		);
	}

	#[test]
	fn test_unknown_token() {
		assert_eq!(
			classify("!x y"),
			Input::System {
				token: "x",
				command: None,
				args: "y",
			}
		);
		assert_eq!(
			classify("!"),
			Input::System {
				token: "",
				command: None,
				args: "",
			}
		);
	}
}
