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

// Handler results and how they are shown

use super::input::TerminalIo;
use colored::Colorize;

/// Outcome of a command or query, printed by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
	Data(String),
	Error(String),
}

impl Response {
	pub fn data(text: impl Into<String>) -> Self {
		Response::Data(text.into())
	}

	pub fn error(text: impl Into<String>) -> Self {
		Response::Error(text.into())
	}

	/// Error response showing the whole context chain.
	pub fn from_error(err: &anyhow::Error) -> Self {
		Response::Error(format!("{:#}", err))
	}

	pub fn is_error(&self) -> bool {
		matches!(self, Response::Error(_))
	}

	pub fn text(&self) -> &str {
		match self {
			Response::Data(text) | Response::Error(text) => text,
		}
	}

	/// Print after `prompt`, errors in red, always ending with one newline.
	pub fn print(&self, terminal: &TerminalIo, prompt: &str) {
		let text = self.text().trim_end_matches('\n');
		let text = match self {
			Response::Data(_) => text.to_string(),
			Response::Error(_) => text.red().to_string(),
		};
		terminal.write(&format!("{}{}\n", prompt, text));
	}
}

impl From<anyhow::Result<Response>> for Response {
	fn from(result: anyhow::Result<Response>) -> Self {
		result.unwrap_or_else(|err| Response::from_error(&err))
	}
}
