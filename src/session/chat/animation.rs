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

// Progress indicator shown while a model request is outstanding

use crate::log_debug;
use crossterm::{
	cursor,
	queue,
	terminal::{Clear, ClearType},
};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::{self, Instant};

/// Terminal output shared between the foreground loop and the spinner task.
pub type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

pub fn stdout_writer() -> SharedWriter {
	Arc::new(Mutex::new(Box::new(io::stdout())))
}

const GLYPH: char = '.';
const MAX_LENGTH: usize = 5;
const INTERVAL: Duration = Duration::from_secs(1);

struct Running {
	stop_tx: oneshot::Sender<()>,
	ack_rx: oneshot::Receiver<()>,
}

/// Bounded "fill and clear" dot animation.
///
/// Every `start` must be paired with one `stop`; `stop` returns only after the
/// task has erased whatever it wrote, so the caller can write on the same line.
pub struct Spinner {
	writer: SharedWriter,
	glyph: char,
	max_length: usize,
	interval: Duration,
	running: Option<Running>,
}

impl Spinner {
	pub fn new(writer: SharedWriter) -> Self {
		Self::with_timing(writer, GLYPH, MAX_LENGTH, INTERVAL)
	}

	pub fn with_timing(
		writer: SharedWriter,
		glyph: char,
		max_length: usize,
		interval: Duration,
	) -> Self {
		Self {
			writer,
			glyph,
			max_length,
			interval,
			running: None,
		}
	}

	pub fn is_running(&self) -> bool {
		self.running.is_some()
	}

	/// Launch the animation task. Must be called from within a tokio runtime.
	pub fn start(&mut self) {
		if self.running.is_some() {
			log_debug!("Spinner is already running");
			return;
		}

		let (stop_tx, stop_rx) = oneshot::channel();
		let (ack_tx, ack_rx) = oneshot::channel();
		tokio::spawn(animate(
			self.writer.clone(),
			self.glyph,
			self.max_length,
			self.interval,
			stop_rx,
			ack_tx,
		));
		self.running = Some(Running { stop_tx, ack_rx });
	}

	/// Halt the animation and wait until its output has been erased.
	pub async fn stop(&mut self) {
		let Some(running) = self.running.take() else {
			log_debug!("Spinner is not running");
			return;
		};

		// A send error means the task is already gone; the ack channel tells either way.
		let _ = running.stop_tx.send(());
		let _ = running.ack_rx.await;
	}
}

async fn animate(
	writer: SharedWriter,
	glyph: char,
	max_length: usize,
	period: Duration,
	mut stop_rx: oneshot::Receiver<()>,
	ack_tx: oneshot::Sender<()>,
) {
	let mut ticker = time::interval_at(Instant::now() + period, period);
	let mut length = 0;

	loop {
		tokio::select! {
			biased;
			_ = &mut stop_rx => {
				if length > 0 {
					let _ = erase(&writer, length);
				}
				let _ = ack_tx.send(());
				return;
			}
			_ = ticker.tick() => {
				if length >= max_length {
					let _ = erase(&writer, length);
					length = 0;
				} else {
					let _ = write_glyph(&writer, glyph);
					length += 1;
				}
			}
		}
	}
}

fn write_glyph(writer: &SharedWriter, glyph: char) -> io::Result<()> {
	let mut out = writer.lock();
	write!(out, "{}", glyph)?;
	out.flush()
}

// ESC[nD ESC[K: move back over the glyphs and clear to the end of the line.
fn erase(writer: &SharedWriter, length: usize) -> io::Result<()> {
	let mut guard = writer.lock();
	let out = &mut *guard;
	queue!(
		out,
		cursor::MoveLeft(u16::try_from(length).unwrap_or(u16::MAX)),
		Clear(ClearType::UntilNewLine)
	)?;
	out.flush()
}

#[cfg(test)]
pub(crate) mod test_support {
	use super::SharedWriter;
	use parking_lot::Mutex;
	use std::io::{self, Write};
	use std::sync::Arc;

	/// Writer that collects everything into a shared byte buffer.
	#[derive(Clone, Default)]
	pub struct BufferWriter(pub Arc<Mutex<Vec<u8>>>);

	impl BufferWriter {
		pub fn shared(&self) -> SharedWriter {
			Arc::new(Mutex::new(Box::new(self.clone())))
		}

		pub fn contents(&self) -> String {
			String::from_utf8_lossy(&self.0.lock()).into_owned()
		}
	}

	impl Write for BufferWriter {
		fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
			self.0.lock().extend_from_slice(buf);
			Ok(buf.len())
		}

		fn flush(&mut self) -> io::Result<()> {
			Ok(())
		}
	}
}
