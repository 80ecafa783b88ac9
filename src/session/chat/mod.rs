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

// Interactive chat session controller: read, dispatch, respond

pub mod animation;
pub mod commands;
mod handlers;
pub mod input;
pub mod markdown;
pub mod prompt;
pub mod response;
pub mod select;
pub mod syntax;

use self::animation::Spinner;
use self::commands::{classify, Input};
use self::input::TerminalIo;
use self::markdown::MarkdownRenderer;
use self::response::Response;
use self::select::Selector;
use super::ChatSession;
use crate::config::{Config, ConfigurationStore};
use crate::log_debug;

pub use self::commands::{SystemCommand, SYSTEM_PREFIX};

/// The read-dispatch-respond loop and the state it works on.
pub struct Chat {
	terminal: TerminalIo,
	session: ChatSession,
	store: ConfigurationStore,
	renderer: MarkdownRenderer,
	selector: Box<dyn Selector>,
	spinner: Spinner,
	user: String,
	stream: bool,
	// Label of the active system instruction
	prompt_label: Option<String>,
}

impl Chat {
	pub fn new(
		config: &Config,
		session: ChatSession,
		store: ConfigurationStore,
		terminal: TerminalIo,
		renderer: MarkdownRenderer,
		selector: Box<dyn Selector>,
	) -> Self {
		let spinner = Spinner::new(terminal.writer());
		Self {
			terminal,
			session,
			store,
			renderer,
			selector,
			spinner,
			user: config.user.clone(),
			stream: config.stream,
			prompt_label: None,
		}
	}

	/// Run until the quit command is dispatched.
	pub async fn start(&mut self) {
		log_debug!(
			"Chat started for {} with model {}",
			self.user,
			self.session.model()
		);
		loop {
			let line = self.terminal.read();
			if line.is_empty() {
				continue;
			}
			if self.process(&line).await {
				break;
			}
		}
	}

	/// Handle one input line; `true` means the session should end.
	async fn process(&mut self, line: &str) -> bool {
		match classify(line) {
			Input::Query(text) => {
				let model_prompt = self.terminal.prompt().model.clone();
				self.terminal.write(&model_prompt);
				let response = handlers::query::handle_query(self, text).await;
				response.print(&self.terminal, "");
				false
			}
			Input::System {
				token,
				command,
				args,
			} => {
				let (response, quit) = match command {
					Some(command) => handlers::handle_system_command(self, command, args).await,
					None => {
						log_debug!("Unknown system command token: {}", token);
						(Response::error(handlers::UNKNOWN_COMMAND), false)
					}
				};
				let system_prompt = self.terminal.prompt().system.clone();
				response.print(&self.terminal, &system_prompt);
				quit
			}
		}
	}
}
