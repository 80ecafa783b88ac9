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

// Markdown rendering for model responses

use super::prompt::has_dark_background;
use super::syntax::SyntaxHighlighter;
use anyhow::Result;
use regex::Regex;
use std::str::FromStr;
use termimad::crossterm::style::{Attribute, Color};
use termimad::MadSkin;

// Fenced code blocks with an optional language tag
const CODE_BLOCK_PATTERN: &str = r"```(\w+)?\n([\s\S]*?)\n```";

/// Named rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkdownStyle {
	Auto,
	Dark,
	Light,
	NoTty,
}

impl FromStr for MarkdownStyle {
	type Err = anyhow::Error;

	fn from_str(name: &str) -> Result<Self> {
		match name.to_lowercase().as_str() {
			"auto" => Ok(Self::Auto),
			"dark" => Ok(Self::Dark),
			"light" => Ok(Self::Light),
			"notty" => Ok(Self::NoTty),
			_ => Err(anyhow::anyhow!(
				"Unknown markdown style: '{}'. Supported styles: auto, dark, light, notty",
				name
			)),
		}
	}
}

impl MarkdownStyle {
	// Auto resolves once, when the renderer is built.
	fn resolve(self) -> Self {
		match self {
			Self::Auto if has_dark_background() => Self::Dark,
			Self::Auto => Self::Light,
			other => other,
		}
	}
}

pub struct MarkdownRenderer {
	skin: MadSkin,
	code_block: Regex,
	style: MarkdownStyle,
	word_wrap: usize,
	syntax_highlighter: SyntaxHighlighter,
}

impl MarkdownRenderer {
	/// `word_wrap` of zero means "use the terminal width".
	pub fn new(style: MarkdownStyle, word_wrap: usize) -> Result<Self> {
		let style = style.resolve();
		Ok(Self {
			skin: skin_for(style),
			code_block: Regex::new(CODE_BLOCK_PATTERN)?,
			style,
			word_wrap,
			syntax_highlighter: SyntaxHighlighter::new(),
		})
	}

	/// Build from a style name given on the command line.
	pub fn from_style_name(name: &str, word_wrap: usize) -> Result<Self> {
		Self::new(name.parse()?, word_wrap)
	}

	fn width(&self) -> usize {
		if self.word_wrap > 0 {
			self.word_wrap
		} else {
			termimad::terminal_size().0 as usize
		}
	}

	pub fn render(&self, markdown: &str) -> Result<String> {
		let width = self.width();
		let mut output = String::new();
		let mut last_end = 0;

		for cap in self.code_block.captures_iter(markdown) {
			let Some(whole) = cap.get(0) else {
				continue;
			};
			self.render_text(&markdown[last_end..whole.start()], width, &mut output);

			let language = cap.get(1).map(|m| m.as_str()).unwrap_or("text");
			let code = cap.get(2).map(|m| m.as_str()).unwrap_or_default();
			self.render_code(code, language, &mut output)?;

			last_end = whole.end();
		}
		self.render_text(&markdown[last_end..], width, &mut output);

		Ok(output)
	}

	fn render_text(&self, text: &str, width: usize, output: &mut String) {
		if !text.trim().is_empty() {
			output.push_str(&self.skin.text(text, Some(width)).to_string());
		}
	}

	fn render_code(&self, code: &str, language: &str, output: &mut String) -> Result<()> {
		output.push_str(&format!("┌─ {} ─\n", language));
		match self.style {
			MarkdownStyle::NoTty => output.push_str(code),
			style => {
				let theme = if style == MarkdownStyle::Light {
					SyntaxHighlighter::LIGHT_THEME
				} else {
					SyntaxHighlighter::DARK_THEME
				};
				output.push_str(&self.syntax_highlighter.highlight_code(code, language, theme)?);
				// Reset colors before the border
				output.push_str("\x1b[0m");
			}
		}
		if !output.ends_with('\n') {
			output.push('\n');
		}
		output.push_str("└─────\n");
		Ok(())
	}
}

fn skin_for(style: MarkdownStyle) -> MadSkin {
	let mut skin = match style {
		MarkdownStyle::NoTty => return MadSkin::no_style(),
		MarkdownStyle::Light => MadSkin::default_light(),
		_ => MadSkin::default_dark(),
	};

	if style == MarkdownStyle::Light {
		skin.headers[0].set_fg(Color::DarkBlue);
		skin.inline_code.set_fg(Color::DarkMagenta);
		skin.bullet.set_fg(Color::DarkGreen);
	} else {
		skin.headers[0].set_fg(Color::Yellow);
		skin.headers[1].set_fg(Color::Blue);
		skin.headers[2].set_fg(Color::Cyan);
		skin.inline_code.set_bg(Color::Rgb { r: 60, g: 60, b: 60 });
		skin.inline_code.set_fg(Color::Yellow);
		skin.italic.set_fg(Color::Cyan);
		skin.quote_mark.set_fg(Color::Blue);
		skin.bullet.set_fg(Color::Green);
	}
	for header in skin.headers.iter_mut().take(3) {
		header.add_attr(Attribute::Bold);
	}

	skin
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_style_names() {
		assert_eq!("auto".parse::<MarkdownStyle>().unwrap(), MarkdownStyle::Auto);
		assert_eq!("NoTTY".parse::<MarkdownStyle>().unwrap(), MarkdownStyle::NoTty);
		assert!("solarized".parse::<MarkdownStyle>().is_err());
		assert!(MarkdownRenderer::from_style_name("nope", 80).is_err());
	}

	#[test]
	fn test_notty_keeps_text() {
		let renderer = MarkdownRenderer::new(MarkdownStyle::NoTty, 80).unwrap();
		let output = renderer.render("Hello **world**").unwrap();
		assert!(output.contains("Hello"));
		assert!(output.contains("world"));
	}

	#[test]
	fn test_code_blocks_are_framed() {
		let renderer = MarkdownRenderer::new(MarkdownStyle::NoTty, 80).unwrap();
		let output = renderer
			.render("Before\n```rust\nfn main() {}\n```\nAfter")
			.unwrap();

		let before = output.find("Before").unwrap();
		let code = output.find("┌─ rust ─\nfn main() {}\n└─────").unwrap();
		let after = output.find("After").unwrap();
		assert!(before < code && code < after);
	}

	#[test]
	fn test_dark_code_blocks_are_highlighted() {
		let renderer = MarkdownRenderer::new(MarkdownStyle::Dark, 80).unwrap();
		let output = renderer.render("```rust\nlet x = 1;\n```").unwrap();
		assert!(output.contains("\x1b["));
		assert!(output.contains("┌─ rust ─"));
	}

	#[test]
	fn test_word_wrap() {
		let renderer = MarkdownRenderer::new(MarkdownStyle::NoTty, 20).unwrap();
		let text = "word ".repeat(20);
		let output = renderer.render(&text).unwrap();
		assert!(output.lines().all(|line| line.chars().count() <= 20));
		assert!(output.lines().count() > 1);
	}
}
