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

// Chat model session: active model, generation settings and conversation history

pub mod chat;
mod chat_helper;
pub mod providers;

use crate::config::{ApplicationData, SafetySetting, ToolSetting};
use crate::{log_debug, log_info};
use anyhow::Result;
use futures::stream::BoxStream;
use providers::{ModelProvider, ProviderChat};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use chat::Chat;

/// Producer of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	User,
	Model,
}

/// A conversation turn as plain text parts, decoupled from any provider wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
	pub role: Role,
	pub parts: Vec<String>,
}

impl Message {
	pub fn new(role: Role, text: impl Into<String>) -> Self {
		Self {
			role,
			parts: vec![text.into()],
		}
	}

	/// All parts joined together.
	pub fn text(&self) -> String {
		self.parts.concat()
	}
}

/// Settings applied to every request of a chat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationConfig {
	pub safety_settings: Vec<SafetySetting>,
	pub tools: Vec<ToolSetting>,
	pub system_instruction: Option<String>,
}

impl GenerationConfig {
	/// Settings taken from the persisted application data, without a system instruction.
	pub fn from_application_data(data: &ApplicationData) -> Self {
		Self {
			safety_settings: data.safety_settings.clone(),
			tools: data.tools.clone(),
			system_instruction: None,
		}
	}
}

/// Wraps the provider's chat object.
///
/// The provider chat owns the history and extends it after each completed
/// exchange; this type only reads it back and carries it across swaps.
pub struct ChatSession {
	provider: Arc<dyn ModelProvider>,
	chat: Box<dyn ProviderChat>,
	model: String,
	config: GenerationConfig,
	models: Option<Vec<String>>,
}

impl ChatSession {
	/// Create a session bound to `model` with an empty history.
	pub fn new(
		provider: Arc<dyn ModelProvider>,
		model: &str,
		config: GenerationConfig,
	) -> Result<Self> {
		let chat = provider.create_chat(model, &config, Vec::new())?;
		log_debug!("Created {} chat session for {}", provider.name(), model);
		Ok(Self {
			provider,
			chat,
			model: model.to_string(),
			config,
			models: None,
		})
	}

	/// Identifier of the active model.
	pub fn model(&self) -> &str {
		&self.model
	}

	pub fn generation_config(&self) -> &GenerationConfig {
		&self.config
	}

	/// Send a message and wait for the full reply.
	pub async fn send_message(&mut self, text: &str) -> Result<String> {
		self.chat.send_message(text).await
	}

	/// Send a message and receive the reply as a sequence of text chunks.
	pub async fn send_message_stream(
		&mut self,
		text: &str,
	) -> Result<BoxStream<'_, Result<String>>> {
		self.chat.send_message_stream(text).await
	}

	/// Switch to another model, keeping history and generation settings.
	/// On failure the current chat stays active untouched.
	pub fn set_model(&mut self, model: &str) -> Result<()> {
		let chat = self
			.provider
			.create_chat(model, &self.config, self.chat.history())?;
		log_info!("Switched model from {} to {}", self.model, model);
		self.chat = chat;
		self.model = model.to_string();
		Ok(())
	}

	/// Replace the system instruction, keeping model and history.
	pub fn set_system_instruction(&mut self, instruction: Option<String>) -> Result<()> {
		let mut config = self.config.clone();
		config.system_instruction = instruction;
		let chat = self
			.provider
			.create_chat(&self.model, &config, self.chat.history())?;
		self.chat = chat;
		self.config = config;
		Ok(())
	}

	pub fn history(&self) -> Vec<Message> {
		self.chat.history()
	}

	/// Replace the conversation history.
	pub fn set_history(&mut self, history: Vec<Message>) -> Result<()> {
		let chat = self.provider.create_chat(&self.model, &self.config, history)?;
		self.chat = chat;
		Ok(())
	}

	pub fn clear_history(&mut self) -> Result<()> {
		self.set_history(Vec::new())
	}

	/// Available model identifiers; fetched once and cached for the session lifetime.
	pub async fn list_models(&mut self) -> Result<Vec<String>> {
		if let Some(models) = &self.models {
			return Ok(models.clone());
		}
		let models = self.provider.list_models().await?;
		log_debug!("Fetched {} models from {}", models.len(), self.provider.name());
		self.models = Some(models.clone());
		Ok(models)
	}

	/// Provider metadata for the active model.
	pub async fn model_info(&self) -> Result<String> {
		self.provider.model_info(&self.model).await
	}
}
