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

// System instruction selection handler

use super::super::response::Response;
use super::super::Chat;
use super::{EMPTY_ITEM, UNCHANGED};
use crate::log_info;
use anyhow::Result;

pub fn handle_prompt(chat: &mut Chat, args: &str) -> Result<Response> {
	let label = if args.is_empty() {
		let mut items = vec![EMPTY_ITEM.to_string()];
		items.extend(chat.store.data.system_prompt_labels());
		let current = chat
			.prompt_label
			.as_ref()
			.and_then(|label| items.iter().position(|item| item == label))
			.unwrap_or(0);

		match chat
			.selector
			.select("Select system instruction", &items, current)?
		{
			Some(index) => items[index].clone(),
			None => return Ok(Response::data(UNCHANGED)),
		}
	} else {
		args.to_string()
	};

	let selected = (label != EMPTY_ITEM).then(|| label.clone());
	if selected == chat.prompt_label {
		return Ok(Response::data(UNCHANGED));
	}

	let instruction = match &selected {
		Some(label) => Some(
			chat.store
				.data
				.system_prompts
				.get(label)
				.cloned()
				.ok_or_else(|| anyhow::anyhow!("unknown system instruction: \"{}\"", label))?,
		),
		None => None,
	};

	chat.session.set_system_instruction(instruction)?;
	log_info!("System instruction set to {}", label);
	chat.prompt_label = selected;

	Ok(Response::data(format!("Selected \"{}\" system instruction.", label)))
}
