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

// Interactive selection from a list of options

use anyhow::Result;
use dialoguer::{Input, Select};

/// Choosing from a list or typing a value.
pub trait Selector {
	/// Index of the chosen item, or `None` when the user cancels.
	fn select(&mut self, prompt: &str, items: &[String], default: usize) -> Result<Option<usize>>;

	fn input(&mut self, prompt: &str) -> Result<String>;
}

/// Arrow-key selection in the terminal.
#[derive(Default)]
pub struct DialoguerSelector;

impl Selector for DialoguerSelector {
	fn select(&mut self, prompt: &str, items: &[String], default: usize) -> Result<Option<usize>> {
		let selection = Select::new()
			.with_prompt(prompt)
			.items(items)
			.default(default.min(items.len().saturating_sub(1)))
			.interact_opt()?;
		Ok(selection)
	}

	fn input(&mut self, prompt: &str) -> Result<String> {
		let text: String = Input::new().with_prompt(prompt).interact_text()?;
		Ok(text.trim().to_string())
	}
}
