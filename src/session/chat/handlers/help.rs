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

// Help command handler

use super::super::commands::SystemCommand;
use super::super::response::Response;
use super::super::Chat;
use crate::log_debug;

pub fn handle_help(chat: &Chat) -> Response {
	let text = help_text();
	match chat.renderer.render(&text) {
		Ok(rendered) => Response::data(rendered),
		Err(err) => {
			log_debug!("Help rendering failed, showing plain text: {:#}", err);
			Response::data(text)
		}
	}
}

fn help_text() -> String {
	let mut text = String::from("Available commands:\n\n");
	for command in SystemCommand::all() {
		let arguments = command.arguments();
		if arguments.is_empty() {
			text.push_str(&format!("* `{}` - {}\n", command.line(), command.description()));
		} else {
			text.push_str(&format!(
				"* `{} [{}]` - {}\n",
				command.line(),
				arguments.join("|"),
				command.description()
			));
		}
	}
	text
}
