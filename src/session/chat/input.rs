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

// Terminal input: single-line and multi-line reads over a line editor

use super::animation::SharedWriter;
use super::commands::{SystemCommand, SYSTEM_PREFIX};
use super::prompt::Prompt;
use crate::config::InputModeConfig;
use crate::session::chat_helper::CommandHelper;
use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{
	Cmd, CompletionType, ConditionalEventHandler, Config as RustylineConfig, EditMode, Editor,
	Event, EventContext, EventHandler, KeyEvent, Movement, RepeatCount,
};
use std::io::Write;

/// Source of raw input lines.
pub trait LineReader {
	fn readline(&mut self, prompt: &str) -> rustyline::Result<String>;

	/// Whether entered lines are recorded for recall.
	fn set_history_enabled(&mut self, enabled: bool);
}

/// Line editor with command completion and recall history.
pub struct RustylineReader {
	editor: Editor<CommandHelper, DefaultHistory>,
	history_enabled: bool,
}

impl RustylineReader {
	pub fn new() -> Result<Self> {
		let config = RustylineConfig::builder()
			.completion_type(CompletionType::List)
			.edit_mode(EditMode::Emacs)
			.auto_add_history(false)
			.bell_style(rustyline::config::BellStyle::None)
			.build();

		let mut editor = Editor::with_config(config)?;
		editor.set_helper(Some(CommandHelper::new()));
		editor.bind_sequence(
			KeyEvent::ctrl('C'),
			EventHandler::Conditional(Box::new(InterruptHandler)),
		);

		Ok(Self {
			editor,
			history_enabled: true,
		})
	}
}

/// Ctrl-C discards a partly typed line; only on an empty line does it interrupt the read.
struct InterruptHandler;

impl ConditionalEventHandler for InterruptHandler {
	fn handle(
		&self,
		_evt: &Event,
		_n: RepeatCount,
		_positive: bool,
		ctx: &EventContext,
	) -> Option<Cmd> {
		Some(interrupt_command(ctx.line()))
	}
}

fn interrupt_command(line: &str) -> Cmd {
	if line.is_empty() {
		Cmd::Interrupt
	} else {
		Cmd::Kill(Movement::WholeBuffer)
	}
}

impl LineReader for RustylineReader {
	fn readline(&mut self, prompt: &str) -> rustyline::Result<String> {
		let line = self.editor.readline(prompt)?;
		if self.history_enabled && !line.trim().is_empty() {
			self.editor.add_history_entry(line.as_str())?;
		}
		Ok(line)
	}

	fn set_history_enabled(&mut self, enabled: bool) {
		self.history_enabled = enabled;
	}
}

/// Owns the line reader, the prompts and the current input mode.
pub struct TerminalIo {
	reader: Box<dyn LineReader>,
	writer: SharedWriter,
	user: String,
	prompt: Prompt,
	mode: InputModeConfig,
}

impl TerminalIo {
	pub fn new(
		mut reader: Box<dyn LineReader>,
		writer: SharedWriter,
		user: &str,
		mode: InputModeConfig,
	) -> Self {
		reader.set_history_enabled(!mode.multiline);
		Self {
			reader,
			writer,
			user: user.to_string(),
			prompt: Prompt::new(user, mode.multiline),
			mode,
		}
	}

	pub fn prompt(&self) -> &Prompt {
		&self.prompt
	}

	pub fn input_mode(&self) -> &InputModeConfig {
		&self.mode
	}

	pub fn writer(&self) -> SharedWriter {
		self.writer.clone()
	}

	/// Switch input mode; history recording is on only in single-line mode.
	pub fn set_multiline(&mut self, multiline: bool) {
		self.mode.multiline = multiline;
		self.prompt = Prompt::new(&self.user, multiline);
		self.reader.set_history_enabled(!multiline);
	}

	/// Read one logical input. An empty string means "nothing to do".
	pub fn read(&mut self) -> String {
		if self.mode.multiline {
			self.read_multiline()
		} else {
			match self.reader.readline(&self.prompt.user) {
				Ok(line) => line.trim().to_string(),
				Err(err) => self.read_failed(err, false),
			}
		}
	}

	fn read_multiline(&mut self) -> String {
		let mut lines: Vec<String> = Vec::new();

		loop {
			let prompt = if lines.is_empty() {
				&self.prompt.user
			} else {
				&self.prompt.user_next
			};
			let line = match self.reader.readline(prompt) {
				Ok(line) => line,
				Err(err) => return self.read_failed(err, !lines.is_empty()),
			};

			if line.starts_with(SYSTEM_PREFIX) {
				let command = line.trim();
				let command = command
					.strip_suffix(self.mode.line_terminator.as_str())
					.unwrap_or(command);
				return command.trim_end().to_string();
			}

			let trimmed = line.trim_end();
			if let Some(last) = trimmed.strip_suffix(self.mode.line_terminator.as_str()) {
				lines.push(last.to_string());
				break;
			}
			lines.push(line);
		}

		lines.join("\n").trim().to_string()
	}

	fn read_failed(&self, err: ReadlineError, has_input: bool) -> String {
		match err {
			ReadlineError::Interrupted | ReadlineError::Eof if !has_input => {
				self.write("\n");
				SystemCommand::Quit.line()
			}
			err => {
				self.write(&format!(
					"{}{}\n",
					self.prompt.system,
					err.to_string().red()
				));
				String::new()
			}
		}
	}

	/// Best-effort write to the terminal.
	pub fn write(&self, text: &str) {
		let mut out = self.writer.lock();
		let _ = out.write_all(text.as_bytes());
		let _ = out.flush();
	}
}
