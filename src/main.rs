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

use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use std::path::PathBuf;

use gemini_chat::config::{
	self, Config, ConfigurationStore, LogLevel, DEFAULT_LINE_TERMINATOR, DEFAULT_MODEL,
	DEFAULT_STYLE, DEFAULT_WORD_WRAP,
};
use gemini_chat::directories;
use gemini_chat::log_debug;
use gemini_chat::session::chat::animation::stdout_writer;
use gemini_chat::session::chat::input::{RustylineReader, TerminalIo};
use gemini_chat::session::chat::markdown::MarkdownRenderer;
use gemini_chat::session::chat::select::DialoguerSelector;
use gemini_chat::session::providers::ProviderFactory;
use gemini_chat::session::{Chat, ChatSession, GenerationConfig};

#[derive(Parser, Debug)]
#[command(name = "gemini-chat")]
#[command(version)]
#[command(about = "Interactive terminal chat with Google Gemini models")]
struct ChatArgs {
	/// Generative model to start with
	#[arg(long, short, default_value = DEFAULT_MODEL)]
	model: String,

	/// Start in multi-line input mode
	#[arg(long)]
	multiline: bool,

	/// Terminator that ends a multi-line input
	#[arg(long, short, default_value = DEFAULT_LINE_TERMINATOR)]
	term: String,

	/// Markdown style: auto, dark, light or notty
	#[arg(long, short, default_value = DEFAULT_STYLE)]
	style: String,

	/// Word wrap width for rendered responses (0 uses the terminal width)
	#[arg(long, short, default_value_t = DEFAULT_WORD_WRAP)]
	wrap: usize,

	/// Configuration file (defaults to the data directory)
	#[arg(long, short)]
	config: Option<PathBuf>,

	/// Print the response as it is generated instead of rendering it at once
	#[arg(long)]
	stream: bool,

	/// Console log level
	#[arg(long, value_enum, default_value = "none")]
	log_level: LogLevel,

	/// Name shown in the user prompt (defaults to $USER)
	#[arg(long, short)]
	user: Option<String>,
}

impl ChatArgs {
	fn into_config(self) -> Result<Config> {
		let config_path = match self.config {
			Some(path) => path,
			None => directories::get_config_file_path()?,
		};
		let user = self.user.unwrap_or_else(default_user);

		Ok(Config {
			user,
			model: self.model,
			multiline: self.multiline,
			line_terminator: self.term,
			style: self.style,
			word_wrap: self.wrap,
			config_path,
			stream: self.stream,
			log_level: self.log_level,
		})
	}
}

fn default_user() -> String {
	env::var("USER")
		.or_else(|_| env::var("USERNAME"))
		.unwrap_or_else(|_| "user".to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
	let args = ChatArgs::parse();
	config::set_thread_log_level(args.log_level);

	let config = args.into_config()?;
	log_debug!("Starting with {:?}", config);

	let renderer = MarkdownRenderer::from_style_name(&config.style, config.word_wrap)?;
	let store = ConfigurationStore::load(&config.config_path)?;

	let provider = ProviderFactory::create_provider("google")?;
	let session = ChatSession::new(
		provider,
		&config.model,
		GenerationConfig::from_application_data(&store.data),
	)?;

	let reader = RustylineReader::new().context("Failed to initialize the terminal")?;
	let terminal = TerminalIo::new(
		Box::new(reader),
		stdout_writer(),
		&config.user,
		config.input_mode(),
	);

	let mut chat = Chat::new(
		&config,
		session,
		store,
		terminal,
		renderer,
		Box::new(DialoguerSelector),
	);
	chat.start().await;

	Ok(())
}
