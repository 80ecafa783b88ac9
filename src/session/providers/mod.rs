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

// Provider abstraction for the remote model capability

use super::{GenerationConfig, Message};
use anyhow::Result;
use futures::stream::BoxStream;
use std::sync::Arc;

pub mod google;
#[cfg(test)]
pub mod mock;

pub use google::GeminiProvider;

/// A live conversation with one model.
///
/// Implementations append the user message and the model reply to their own
/// history once an exchange completes; a failed exchange leaves it unchanged.
#[async_trait::async_trait]
pub trait ProviderChat: Send {
	/// Send a message and return the complete reply text.
	async fn send_message(&mut self, text: &str) -> Result<String>;

	/// Send a message and return the reply as it is produced.
	/// The history is extended when the stream has been fully consumed.
	async fn send_message_stream<'a>(
		&'a mut self,
		text: &str,
	) -> Result<BoxStream<'a, Result<String>>>;

	/// Conversation so far, oldest first.
	fn history(&self) -> Vec<Message>;
}

/// Trait that all model providers must implement
#[async_trait::async_trait]
pub trait ModelProvider: Send + Sync {
	/// Get the provider name (e.g., "google")
	fn name(&self) -> &str;

	/// Open a chat bound to `model` that starts from `history`.
	/// Fails without side effects when the model identifier is not usable.
	fn create_chat(
		&self,
		model: &str,
		config: &GenerationConfig,
		history: Vec<Message>,
	) -> Result<Box<dyn ProviderChat>>;

	/// Enumerate the models offered by the provider.
	async fn list_models(&self) -> Result<Vec<String>>;

	/// Provider metadata for `model`, formatted for display.
	async fn model_info(&self, model: &str) -> Result<String>;
}

/// Provider factory to create the appropriate provider by name
pub struct ProviderFactory;

impl ProviderFactory {
	/// Create a provider instance based on the provider name
	pub fn create_provider(provider_name: &str) -> Result<Arc<dyn ModelProvider>> {
		match provider_name.to_lowercase().as_str() {
			"google" | "gemini" => Ok(Arc::new(GeminiProvider::from_env()?)),
			_ => Err(anyhow::anyhow!(
				"Unsupported provider: {}. Supported providers: google",
				provider_name
			)),
		}
	}
}
