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

// In-memory provider used by tests

use super::{ModelProvider, ProviderChat};
use crate::session::{GenerationConfig, Message, Role};
use anyhow::Result;
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Replies with `"<model>: <text>"`; rejects [`MockProvider::INVALID_MODEL`].
pub struct MockProvider {
	list_calls: AtomicUsize,
}

impl MockProvider {
	pub const INVALID_MODEL: &'static str = "no-such-model";
	/// Messages equal to this string fail instead of getting a reply.
	pub const FAILING_MESSAGE: &'static str = "please fail";

	pub fn new() -> Self {
		Self {
			list_calls: AtomicUsize::new(0),
		}
	}

	pub fn list_calls(&self) -> usize {
		self.list_calls.load(Ordering::SeqCst)
	}
}

pub struct MockChat {
	model: String,
	history: Vec<Message>,
}

#[async_trait::async_trait]
impl ProviderChat for MockChat {
	async fn send_message(&mut self, text: &str) -> Result<String> {
		if text == MockProvider::FAILING_MESSAGE {
			return Err(anyhow::anyhow!("request rejected"));
		}
		let reply = format!("{}: {}", self.model, text);
		self.history.push(Message::new(Role::User, text));
		self.history.push(Message::new(Role::Model, reply.clone()));
		Ok(reply)
	}

	async fn send_message_stream<'a>(
		&'a mut self,
		text: &str,
	) -> Result<BoxStream<'a, Result<String>>> {
		if text == MockProvider::FAILING_MESSAGE {
			return Err(anyhow::anyhow!("request rejected"));
		}
		let reply = format!("{}: {}", self.model, text);
		let mut chunks: Vec<String> = reply
			.split_inclusive(' ')
			.map(|chunk| chunk.to_string())
			.collect();
		chunks.reverse();
		let text = text.to_string();

		let stream = stream::unfold(
			(self, chunks, text, reply),
			|(chat, mut chunks, text, reply)| async move {
				match chunks.pop() {
					Some(chunk) => Some((Ok(chunk), (chat, chunks, text, reply))),
					None => {
						chat.history.push(Message::new(Role::User, text));
						chat.history.push(Message::new(Role::Model, reply));
						None
					}
				}
			},
		);
		Ok(stream.boxed())
	}

	fn history(&self) -> Vec<Message> {
		self.history.clone()
	}
}

#[async_trait::async_trait]
impl ModelProvider for MockProvider {
	fn name(&self) -> &str {
		"mock"
	}

	fn create_chat(
		&self,
		model: &str,
		_config: &GenerationConfig,
		history: Vec<Message>,
	) -> Result<Box<dyn ProviderChat>> {
		if model == Self::INVALID_MODEL {
			return Err(anyhow::anyhow!("unknown model: {}", model));
		}
		Ok(Box::new(MockChat {
			model: model.to_string(),
			history,
		}))
	}

	async fn list_models(&self) -> Result<Vec<String>> {
		self.list_calls.fetch_add(1, Ordering::SeqCst);
		Ok(vec!["model-a".to_string(), "model-b".to_string()])
	}

	async fn model_info(&self, model: &str) -> Result<String> {
		Ok(format!("{{\"name\": \"{}\"}}", model))
	}
}
