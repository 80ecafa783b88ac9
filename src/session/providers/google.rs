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

// Google Gemini provider implementation (Generative Language REST API)

use super::{ModelProvider, ProviderChat};
use crate::config::DEFAULT_MODEL;
use crate::log_debug;
use crate::session::{GenerationConfig, Message, Role};
use anyhow::{Context, Result};
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::Client;
use serde::Serialize;
use std::collections::VecDeque;
use std::env;

// Constants
const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
const GEMINI_API_BASE_ENV: &str = "GEMINI_API_BASE";
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Content format for the Gemini API
#[derive(Debug, Clone, Serialize)]
struct GeminiContent {
	role: &'static str,
	parts: Vec<serde_json::Value>,
}

/// Gemini provider implementation
pub struct GeminiProvider {
	client: Client,
	api_base: String,
	api_key: String,
}

impl GeminiProvider {
	pub fn new(api_key: String, api_base: String) -> Self {
		Self {
			client: Client::new(),
			api_base: api_base.trim_end_matches('/').to_string(),
			api_key,
		}
	}

	/// Build the provider from `GEMINI_API_KEY` and the optional `GEMINI_API_BASE`.
	pub fn from_env() -> Result<Self> {
		let api_key = env::var(GEMINI_API_KEY_ENV).map_err(|_| {
			anyhow::anyhow!(
				"Gemini API key not found. Please set the {} environment variable",
				GEMINI_API_KEY_ENV
			)
		})?;
		let api_base = env::var(GEMINI_API_BASE_ENV).unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
		Ok(Self::new(api_key, api_base))
	}

	async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<serde_json::Value> {
		let response = self
			.client
			.get(url)
			.header("x-goog-api-key", &self.api_key)
			.query(query)
			.send()
			.await
			.with_context(|| format!("Request to {} failed", url))?;
		read_json_response(response).await
	}
}

/// Chat bound to one Gemini model
pub struct GeminiChat {
	client: Client,
	api_base: String,
	api_key: String,
	model: String,
	request_template: serde_json::Value,
	history: Vec<Message>,
}

impl GeminiChat {
	fn endpoint(&self, method: &str) -> String {
		format!("{}/{}:{}", self.api_base, self.model, method)
	}

	fn request_body(&self, text: &str) -> serde_json::Value {
		let mut contents = convert_messages(&self.history);
		contents.push(GeminiContent {
			role: "user",
			parts: vec![serde_json::json!({ "text": text })],
		});

		let mut body = self.request_template.clone();
		body["contents"] = serde_json::json!(contents);
		body
	}

	fn record_exchange(&mut self, text: &str, reply: &str) {
		self.history.push(Message::new(Role::User, text));
		self.history.push(Message::new(Role::Model, reply));
	}
}

#[async_trait::async_trait]
impl ProviderChat for GeminiChat {
	async fn send_message(&mut self, text: &str) -> Result<String> {
		let url = self.endpoint("generateContent");
		let body = self.request_body(text);
		log_debug!("POST {}", url);

		let response = self
			.client
			.post(&url)
			.header("x-goog-api-key", &self.api_key)
			.json(&body)
			.send()
			.await
			.with_context(|| format!("Request to {} failed", url))?;
		let response_json = read_json_response(response).await?;

		if let Some(reason) = block_reason(&response_json) {
			return Err(anyhow::anyhow!("Prompt was blocked: {}", reason));
		}
		let content = extract_text(&response_json);
		self.record_exchange(text, &content);

		Ok(content)
	}

	async fn send_message_stream<'a>(
		&'a mut self,
		text: &str,
	) -> Result<BoxStream<'a, Result<String>>> {
		let url = self.endpoint("streamGenerateContent");
		let body = self.request_body(text);
		log_debug!("POST {} (stream)", url);

		let response = self
			.client
			.post(&url)
			.header("x-goog-api-key", &self.api_key)
			.query(&[("alt", "sse")])
			.json(&body)
			.send()
			.await
			.with_context(|| format!("Request to {} failed", url))?;
		if !response.status().is_success() {
			// Reuse the error formatting of the blocking path.
			read_json_response(response).await?;
			return Err(anyhow::anyhow!("Gemini API returned an unexpected response"));
		}

		let state = SseState {
			chat: self,
			bytes: response.bytes_stream().map(|r| r.map(|b| b.to_vec())).boxed(),
			buffer: Vec::new(),
			pending: VecDeque::new(),
			reply: String::new(),
			text: text.to_string(),
			finished: false,
		};

		let stream = stream::unfold(state, |mut state| async move {
			loop {
				if let Some(chunk) = state.pending.pop_front() {
					return Some((chunk, state));
				}
				if state.finished {
					return None;
				}

				match state.bytes.next().await {
					Some(Ok(bytes)) => {
						state.buffer.extend_from_slice(&bytes);
						state.drain_events();
					}
					Some(Err(e)) => {
						state.finished = true;
						state
							.pending
							.push_back(Err(anyhow::anyhow!("Stream interrupted: {}", e)));
					}
					None => {
						state.buffer.push(b'\n');
						state.drain_events();
						state.finished = true;
						if !state.pending.iter().any(|chunk| chunk.is_err()) {
							let reply = std::mem::take(&mut state.reply);
							let text = std::mem::take(&mut state.text);
							state.chat.record_exchange(&text, &reply);
						}
					}
				}
			}
		});

		Ok(stream.boxed())
	}

	fn history(&self) -> Vec<Message> {
		self.history.clone()
	}
}

struct SseState<'a> {
	chat: &'a mut GeminiChat,
	bytes: BoxStream<'static, reqwest::Result<Vec<u8>>>,
	buffer: Vec<u8>,
	pending: VecDeque<Result<String>>,
	reply: String,
	text: String,
	finished: bool,
}

impl SseState<'_> {
	// Move every complete `data:` line from the buffer into the pending queue.
	fn drain_events(&mut self) {
		while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
			let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
			let line = String::from_utf8_lossy(&raw);
			let line = line.trim();
			let Some(data) = line.strip_prefix("data:") else {
				continue;
			};
			match serde_json::from_str::<serde_json::Value>(data.trim()) {
				Ok(event) => {
					if let Some(reason) = block_reason(&event) {
						self.finished = true;
						self.pending
							.push_back(Err(anyhow::anyhow!("Prompt was blocked: {}", reason)));
						return;
					}
					let text = extract_text(&event);
					if !text.is_empty() {
						self.reply.push_str(&text);
						self.pending.push_back(Ok(text));
					}
				}
				Err(e) => {
					self.finished = true;
					self.pending
						.push_back(Err(anyhow::anyhow!("Failed to parse stream event: {}", e)));
					return;
				}
			}
		}
	}
}

#[async_trait::async_trait]
impl ModelProvider for GeminiProvider {
	fn name(&self) -> &str {
		"google"
	}

	fn create_chat(
		&self,
		model: &str,
		config: &GenerationConfig,
		history: Vec<Message>,
	) -> Result<Box<dyn ProviderChat>> {
		Ok(Box::new(GeminiChat {
			client: self.client.clone(),
			api_base: self.api_base.clone(),
			api_key: self.api_key.clone(),
			model: model_resource_name(model)?,
			request_template: request_template(config),
			history,
		}))
	}

	async fn list_models(&self) -> Result<Vec<String>> {
		let url = format!("{}/models", self.api_base);
		let mut models = vec![DEFAULT_MODEL.to_string()];
		let mut page_token: Option<String> = None;

		loop {
			let mut query = vec![("pageSize", "1000")];
			if let Some(token) = page_token.as_deref() {
				query.push(("pageToken", token));
			}
			let page = self.get_json(&url, &query).await?;

			if let Some(entries) = page.get("models").and_then(|m| m.as_array()) {
				for entry in entries {
					let supports_chat = entry
						.get("supportedGenerationMethods")
						.and_then(|m| m.as_array())
						.map(|methods| methods.iter().any(|m| m == "generateContent"))
						.unwrap_or(true);
					if let (true, Some(name)) = (supports_chat, entry.get("name").and_then(|n| n.as_str())) {
						let name = name.trim_start_matches("models/").to_string();
						if !models.contains(&name) {
							models.push(name);
						}
					}
				}
			}

			page_token = page
				.get("nextPageToken")
				.and_then(|t| t.as_str())
				.filter(|t| !t.is_empty())
				.map(|t| t.to_string());
			if page_token.is_none() {
				break;
			}
		}

		Ok(models)
	}

	async fn model_info(&self, model: &str) -> Result<String> {
		let url = format!("{}/{}", self.api_base, model_resource_name(model)?);
		let info = self.get_json(&url, &[]).await?;
		serde_json::to_string_pretty(&info).context("Error encoding model info")
	}
}

/// Resource name used in request paths, e.g. `models/gemini-2.5-flash`.
fn model_resource_name(model: &str) -> Result<String> {
	let model = model.trim();
	if model.is_empty() || model.contains(char::is_whitespace) || model.contains('?') {
		return Err(anyhow::anyhow!("Invalid model name: '{}'", model));
	}
	if model.contains('/') {
		Ok(model.to_string())
	} else {
		Ok(format!("models/{}", model))
	}
}

/// Request fields shared by every call of a chat.
fn request_template(config: &GenerationConfig) -> serde_json::Value {
	let mut body = serde_json::json!({});

	if !config.safety_settings.is_empty() {
		body["safetySettings"] = config
			.safety_settings
			.iter()
			.map(|s| {
				serde_json::json!({
					"category": s.category,
					"threshold": s.threshold.api_name(),
				})
			})
			.collect();
	}

	let tools: Vec<serde_json::Value> = config
		.tools
		.iter()
		.filter(|t| t.enabled)
		.map(|t| {
			let mut tool = serde_json::Map::new();
			tool.insert(t.name.clone(), serde_json::json!({}));
			serde_json::Value::Object(tool)
		})
		.collect();
	if !tools.is_empty() {
		body["tools"] = serde_json::json!(tools);
	}

	if let Some(instruction) = &config.system_instruction {
		body["systemInstruction"] = serde_json::json!({
			"parts": [{ "text": instruction }]
		});
	}

	body
}

// Convert our session messages to Gemini format
fn convert_messages(messages: &[Message]) -> Vec<GeminiContent> {
	messages
		.iter()
		.map(|msg| GeminiContent {
			role: match msg.role {
				Role::User => "user",
				Role::Model => "model",
			},
			parts: msg
				.parts
				.iter()
				.map(|part| serde_json::json!({ "text": part }))
				.collect(),
		})
		.collect()
}

fn extract_text(response_json: &serde_json::Value) -> String {
	let mut content = String::new();
	if let Some(parts) = response_json
		.get("candidates")
		.and_then(|c| c.as_array())
		.and_then(|candidates| candidates.first())
		.and_then(|candidate| candidate.get("content"))
		.and_then(|c| c.get("parts"))
		.and_then(|p| p.as_array())
	{
		for part in parts {
			if let Some(text) = part.get("text").and_then(|t| t.as_str()) {
				content.push_str(text);
			}
		}
	}
	content
}

fn block_reason(response_json: &serde_json::Value) -> Option<String> {
	response_json
		.get("promptFeedback")
		.and_then(|f| f.get("blockReason"))
		.and_then(|r| r.as_str())
		.map(|r| r.to_string())
}

async fn read_json_response(response: reqwest::Response) -> Result<serde_json::Value> {
	let status = response.status();
	let response_text = response.text().await?;

	let response_json: serde_json::Value = match serde_json::from_str(&response_text) {
		Ok(json) => json,
		Err(e) => {
			return Err(anyhow::anyhow!(
				"Failed to parse response JSON: {}. Response: {}",
				e,
				response_text
			));
		}
	};

	// Handle error responses
	if !status.is_success() {
		let mut error_details = vec![format!("HTTP {}", status)];
		if let Some(error_obj) = response_json.get("error") {
			if let Some(msg) = error_obj.get("message").and_then(|m| m.as_str()) {
				error_details.push(format!("Message: {}", msg));
			}
			if let Some(code) = error_obj.get("status").and_then(|c| c.as_str()) {
				error_details.push(format!("Status: {}", code));
			}
		}
		if error_details.len() == 1 {
			error_details.push(format!("Raw response: {}", response_text));
		}
		return Err(anyhow::anyhow!(
			"Gemini API error: {}",
			error_details.join(" | ")
		));
	}

	Ok(response_json)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::{ApplicationData, SafetyThreshold};

	fn chat_with_history(history: Vec<Message>) -> GeminiChat {
		let provider = GeminiProvider::new("key".to_string(), DEFAULT_API_BASE.to_string());
		GeminiChat {
			client: provider.client.clone(),
			api_base: provider.api_base.clone(),
			api_key: provider.api_key.clone(),
			model: "models/gemini-2.5-flash".to_string(),
			request_template: serde_json::json!({}),
			history,
		}
	}

	#[test]
	fn test_model_resource_name() {
		assert_eq!(
			model_resource_name("gemini-2.5-pro").unwrap(),
			"models/gemini-2.5-pro"
		);
		assert_eq!(
			model_resource_name("models/gemini-2.5-pro").unwrap(),
			"models/gemini-2.5-pro"
		);
		assert!(model_resource_name("").is_err());
		assert!(model_resource_name("bad model").is_err());
	}

	#[test]
	fn test_create_chat_rejects_invalid_model() {
		let provider = GeminiProvider::new("key".to_string(), DEFAULT_API_BASE.to_string());
		let result = provider.create_chat("not valid", &GenerationConfig::default(), Vec::new());
		assert!(result.is_err());
	}

	#[test]
	fn test_request_template() {
		let mut data = ApplicationData::default();
		data.tools[0].enabled = true;
		data.safety_settings[0].threshold = SafetyThreshold::Off;
		let mut config = GenerationConfig::from_application_data(&data);
		config.system_instruction = Some("Be brief.".to_string());

		let body = request_template(&config);
		assert_eq!(body["safetySettings"][0]["threshold"], "BLOCK_NONE");
		assert_eq!(body["tools"].as_array().unwrap().len(), 1);
		assert!(body["tools"][0].get("google_search").is_some());
		assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Be brief.");
	}

	#[test]
	fn test_request_body_includes_history() {
		let chat = chat_with_history(vec![
			Message::new(Role::User, "hi"),
			Message::new(Role::Model, "hello"),
		]);
		let body = chat.request_body("next");
		let contents = body["contents"].as_array().unwrap();
		assert_eq!(contents.len(), 3);
		assert_eq!(contents[1]["role"], "model");
		assert_eq!(contents[2]["parts"][0]["text"], "next");
	}

	#[test]
	fn test_extract_text_and_block_reason() {
		let response = serde_json::json!({
			"candidates": [{"content": {"parts": [{"text": "a"}, {"text": "b"}]}}]
		});
		assert_eq!(extract_text(&response), "ab");
		assert_eq!(block_reason(&response), None);

		let blocked = serde_json::json!({"promptFeedback": {"blockReason": "SAFETY"}});
		assert_eq!(block_reason(&blocked).as_deref(), Some("SAFETY"));
	}

	#[test]
	fn test_sse_events_are_split_into_chunks() {
		let mut chat = chat_with_history(Vec::new());
		let mut state = SseState {
			chat: &mut chat,
			bytes: stream::empty().boxed(),
			buffer: Vec::new(),
			pending: VecDeque::new(),
			reply: String::new(),
			text: "q".to_string(),
			finished: false,
		};

		state.buffer.extend_from_slice(
			b"data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Hel\"}]}}]}\r\n\r\ndata: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"lo\"}]}}]}",
		);
		state.drain_events();
		assert_eq!(state.pending.len(), 1);

		state.buffer.push(b'\n');
		state.drain_events();
		let chunks: Vec<String> = state.pending.drain(..).map(|c| c.unwrap()).collect();
		assert_eq!(chunks, vec!["Hel", "lo"]);
		assert_eq!(state.reply, "Hello");
	}
}
