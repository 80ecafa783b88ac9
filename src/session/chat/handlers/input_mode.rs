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

// Input mode toggle handler

use super::super::response::Response;
use super::super::Chat;
use super::UNCHANGED;
use anyhow::Result;

const SINGLE_LINE: &str = "single-line";
const MULTI_LINE: &str = "multi-line";

pub fn handle_input_mode(chat: &mut Chat, args: &str) -> Result<Response> {
	let current = chat.terminal.input_mode().multiline;
	let multiline = match args {
		"" => !current,
		SINGLE_LINE => false,
		MULTI_LINE => true,
		other => {
			return Err(anyhow::anyhow!(
				"unknown input mode: \"{}\" (expected {} or {})",
				other,
				SINGLE_LINE,
				MULTI_LINE
			))
		}
	};

	if multiline == current {
		return Ok(Response::data(UNCHANGED));
	}
	chat.terminal.set_multiline(multiline);

	let name = if multiline { "Multi-line" } else { "Single-line" };
	Ok(Response::data(format!("Switched to \"{}\" input mode.", name)))
}
