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

// Model query handler

use super::super::response::Response;
use super::super::Chat;
use futures::StreamExt;

pub async fn handle_query(chat: &mut Chat, text: &str) -> Response {
	if chat.stream {
		stream_reply(chat, text).await
	} else {
		blocking_reply(chat, text).await
	}
}

async fn blocking_reply(chat: &mut Chat, text: &str) -> Response {
	chat.spinner.start();
	let result = chat.session.send_message(text).await;
	chat.spinner.stop().await;

	match result.and_then(|reply| chat.renderer.render(&reply)) {
		Ok(rendered) => Response::Data(rendered),
		Err(err) => Response::from_error(&err),
	}
}

async fn stream_reply(chat: &mut Chat, text: &str) -> Response {
	chat.spinner.start();
	let opened = chat.session.send_message_stream(text).await;
	chat.spinner.stop().await;

	let mut stream = match opened {
		Ok(stream) => stream,
		Err(err) => return Response::from_error(&err),
	};

	let mut written = false;
	while let Some(chunk) = stream.next().await {
		match chunk {
			Ok(chunk) => {
				chat.terminal.write(&chunk);
				written = true;
			}
			Err(err) => {
				if written {
					chat.terminal.write("\n");
				}
				return Response::from_error(&err);
			}
		}
	}

	Response::data("")
}
