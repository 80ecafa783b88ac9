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

// Model operations handler: list, select and info

use super::super::response::Response;
use super::super::Chat;
use super::{choose_operation, UNCHANGED};
use anyhow::Result;

const LIST: &str = "list";
const SELECT: &str = "select";
const INFO: &str = "info";

pub async fn handle_model(chat: &mut Chat, args: &str) -> Result<Response> {
	let Some((operation, argument)) =
		choose_operation(chat, "Select model operation", &[LIST, SELECT, INFO], args)?
	else {
		return Ok(Response::data(UNCHANGED));
	};

	match operation.as_str() {
		LIST => list_models(chat).await,
		SELECT => select_model(chat, &argument).await,
		INFO => {
			chat.spinner.start();
			let info = chat.session.model_info().await;
			chat.spinner.stop().await;
			Ok(Response::data(info?))
		}
		other => Err(anyhow::anyhow!("unknown model operation: \"{}\"", other)),
	}
}

// Catalog lookup under the progress indicator; the first call goes to the network.
async fn fetch_models(chat: &mut Chat) -> Result<Vec<String>> {
	chat.spinner.start();
	let models = chat.session.list_models().await;
	chat.spinner.stop().await;
	models
}

async fn list_models(chat: &mut Chat) -> Result<Response> {
	let active = chat.session.model().to_string();
	let lines: Vec<String> = fetch_models(chat)
		.await?
		.into_iter()
		.map(|model| {
			if model == active {
				format!("* {}", model)
			} else {
				format!("  {}", model)
			}
		})
		.collect();
	Ok(Response::data(lines.join("\n")))
}

async fn select_model(chat: &mut Chat, model: &str) -> Result<Response> {
	let models = fetch_models(chat).await?;
	let model = if model.is_empty() {
		let current = models
			.iter()
			.position(|m| m == chat.session.model())
			.unwrap_or(0);
		match chat
			.selector
			.select("Select generative model", &models, current)?
		{
			Some(index) => models[index].clone(),
			None => return Ok(Response::data(UNCHANGED)),
		}
	} else if models.iter().any(|m| m == model) {
		model.to_string()
	} else {
		return Err(anyhow::anyhow!(
			"unknown generative model: \"{}\" (use \"!m list\" to see the available models)",
			model
		));
	};

	if model == chat.session.model() {
		return Ok(Response::data(UNCHANGED));
	}
	chat.session.set_model(&model)?;

	Ok(Response::data(format!("Selected \"{}\" generative model.", model)))
}
