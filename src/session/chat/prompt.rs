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

// Prompt strings for the user, model and system roles

use colored::{Color, Colorize};

const MODEL_NAME: &str = "gemini";
const SYSTEM_NAME: &str = "cli";

const PROMPT_CHAR: char = '>';
const MULTILINE_PROMPT_CHAR: char = '#';

/// Role colors, picked by terminal background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
	pub user: Color,
	pub model: Color,
	pub system: Color,
}

impl Palette {
	pub const DARK: Palette = Palette {
		user: Color::Cyan,
		model: Color::Green,
		system: Color::Yellow,
	};

	pub const LIGHT: Palette = Palette {
		user: Color::Blue,
		model: Color::Green,
		system: Color::Magenta,
	};

	/// Palette for the running terminal.
	pub fn detect() -> Self {
		if has_dark_background() {
			Self::DARK
		} else {
			Self::LIGHT
		}
	}
}

/// Background guess from `COLORFGBG`; dark when unset.
pub fn has_dark_background() -> bool {
	std::env::var("COLORFGBG")
		.map(|value| is_dark_background(&value))
		.unwrap_or(true)
}

// COLORFGBG is "fg;bg" (sometimes "fg;default;bg"); backgrounds 0-6 and 8 are dark.
fn is_dark_background(colorfgbg: &str) -> bool {
	match colorfgbg.rsplit(';').next().map(str::parse::<u8>) {
		Some(Ok(bg)) => bg < 7 || bg == 8,
		_ => true,
	}
}

/// Role prompts, rebuilt whenever the username or input mode changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
	pub user: String,
	pub user_next: String,
	pub model: String,
	pub system: String,
}

impl Prompt {
	pub fn new(user: &str, multiline: bool) -> Self {
		Self::with_palette(user, multiline, Palette::detect())
	}

	pub fn with_palette(user: &str, multiline: bool, palette: Palette) -> Self {
		let width = [user, MODEL_NAME, SYSTEM_NAME]
			.iter()
			.map(|name| name.chars().count())
			.max()
			.unwrap_or_default()
			+ 1;

		let user_char = if multiline {
			MULTILINE_PROMPT_CHAR
		} else {
			PROMPT_CHAR
		};
		let blank = " ".repeat(user.chars().count());

		Self {
			user: build(user, user_char, width, palette.user),
			user_next: build(&blank, PROMPT_CHAR, width, palette.user),
			model: build(MODEL_NAME, PROMPT_CHAR, width, palette.model),
			system: build(SYSTEM_NAME, PROMPT_CHAR, width, palette.system),
		}
	}
}

fn build(name: &str, prompt_char: char, width: usize, color: Color) -> String {
	let text = format!("{}{}", name, prompt_char);
	format!("{:<width$}", text, width = width + 1)
		.color(color)
		.to_string()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn plain(user: &str, multiline: bool) -> Prompt {
		colored::control::set_override(false);
		Prompt::with_palette(user, multiline, Palette::DARK)
	}

	#[test]
	fn test_prompts_share_width() {
		let prompt = plain("alice", false);
		assert_eq!(prompt.user, "alice>  ");
		assert_eq!(prompt.model, "gemini> ");
		assert_eq!(prompt.system, "cli>    ");
		assert_eq!(prompt.user_next, "     >  ");
	}

	#[test]
	fn test_short_user_is_padded_to_model_name() {
		let prompt = plain("bo", false);
		assert_eq!(prompt.user, "bo>     ");
		assert_eq!(prompt.user.len(), prompt.model.len());
	}

	#[test]
	fn test_multiline_prompt_char() {
		let prompt = plain("alice", true);
		assert_eq!(prompt.user, "alice#  ");
		assert_eq!(prompt.user_next, "     >  ");
	}

	#[test]
	fn test_background_detection() {
		assert!(is_dark_background("15;0"));
		assert!(is_dark_background("15;default;8"));
		assert!(!is_dark_background("0;15"));
		assert!(!is_dark_background("0;7"));
		assert!(is_dark_background("garbage"));
	}
}
