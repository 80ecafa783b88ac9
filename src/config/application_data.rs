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

// Durable application data: system prompt library, safety/tool defaults and stored history

use crate::session::Message;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Blocking threshold applied to a harm category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SafetyThreshold {
	Low,
	Medium,
	High,
	Off,
}

impl SafetyThreshold {
	/// Name of the threshold in the Gemini REST API.
	pub fn api_name(&self) -> &'static str {
		match self {
			SafetyThreshold::Low => "BLOCK_LOW_AND_ABOVE",
			SafetyThreshold::Medium => "BLOCK_MEDIUM_AND_ABOVE",
			SafetyThreshold::High => "BLOCK_ONLY_HIGH",
			SafetyThreshold::Off => "BLOCK_NONE",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
	pub category: String,
	pub threshold: SafetyThreshold,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSetting {
	pub name: String,
	pub enabled: bool,
}

/// Everything persisted in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationData {
	#[serde(default)]
	pub system_prompts: BTreeMap<String, String>,
	#[serde(default = "default_safety_settings")]
	pub safety_settings: Vec<SafetySetting>,
	#[serde(default = "default_tools")]
	pub tools: Vec<ToolSetting>,
	#[serde(default)]
	pub history: BTreeMap<String, Vec<Message>>,
}

fn default_safety_settings() -> Vec<SafetySetting> {
	[
		"HARM_CATEGORY_HARASSMENT",
		"HARM_CATEGORY_HATE_SPEECH",
		"HARM_CATEGORY_SEXUALLY_EXPLICIT",
		"HARM_CATEGORY_DANGEROUS_CONTENT",
	]
	.iter()
	.map(|category| SafetySetting {
		category: category.to_string(),
		threshold: SafetyThreshold::Low,
	})
	.collect()
}

fn default_tools() -> Vec<ToolSetting> {
	["google_search", "code_execution"]
		.iter()
		.map(|name| ToolSetting {
			name: name.to_string(),
			enabled: false,
		})
		.collect()
}

impl Default for ApplicationData {
	fn default() -> Self {
		Self {
			system_prompts: BTreeMap::new(),
			safety_settings: default_safety_settings(),
			tools: default_tools(),
			history: BTreeMap::new(),
		}
	}
}

impl ApplicationData {
	/// Store a history snapshot under `label`, replacing any previous record with that label.
	pub fn add_history_record(&mut self, label: String, history: Vec<Message>) {
		self.history.insert(label, history);
	}

	/// Labels of the stored history records, in sorted order.
	pub fn history_labels(&self) -> Vec<String> {
		self.history.keys().cloned().collect()
	}

	/// Labels of the system prompt library, in sorted order.
	pub fn system_prompt_labels(&self) -> Vec<String> {
		self.system_prompts.keys().cloned().collect()
	}
}
