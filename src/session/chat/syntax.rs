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

// Syntax highlighting for fenced code blocks

use anyhow::{Context, Result};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

pub struct SyntaxHighlighter {
	syntax_set: SyntaxSet,
	theme_set: ThemeSet,
}

impl SyntaxHighlighter {
	pub const DARK_THEME: &'static str = "base16-ocean.dark";
	pub const LIGHT_THEME: &'static str = "InspiredGitHub";

	pub fn new() -> Self {
		Self {
			syntax_set: SyntaxSet::load_defaults_newlines(),
			theme_set: ThemeSet::load_defaults(),
		}
	}

	/// Highlight `code` as `language` (token or file extension), falling back to plain text.
	pub fn highlight_code(&self, code: &str, language: &str, theme: &str) -> Result<String> {
		let syntax = self
			.syntax_set
			.find_syntax_by_token(language)
			.or_else(|| self.syntax_set.find_syntax_by_extension(language))
			.unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());
		let theme = self
			.theme_set
			.themes
			.get(theme)
			.with_context(|| format!("Unknown highlighting theme: {}", theme))?;

		let mut highlighter = HighlightLines::new(syntax, theme);
		let mut highlighted = String::new();

		for line in LinesWithEndings::from(code) {
			let ranges: Vec<(Style, &str)> = highlighter.highlight_line(line, &self.syntax_set)?;
			highlighted.push_str(&as_24_bit_terminal_escaped(&ranges[..], false));
		}

		Ok(highlighted)
	}
}

impl Default for SyntaxHighlighter {
	fn default() -> Self {
		Self::new()
	}
}
