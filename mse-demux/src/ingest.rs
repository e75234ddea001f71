use crate::{FrameBatch, FrameProcessor, Timestamp, TimestampOffset};

/// The interval restricting which coded frames from an append are retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendWindow {
	pub start: Timestamp,
	pub end: Timestamp,
}

impl Default for AppendWindow {
	fn default() -> Self {
		Self {
			start: Timestamp::default(),
			end: Timestamp::MAX,
		}
	}
}

/// State scoped to exactly one append call.
///
/// Created by the caller, passed `&mut` through the ingestion chain, and read
/// back afterwards for the (possibly updated) timestamp offset. Never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppendContext {
	pub window: AppendWindow,
	pub offset: TimestampOffset,
}

impl AppendContext {
	pub fn new(window: AppendWindow, offset: TimestampOffset) -> Self {
		Self { window, offset }
	}
}

/// Routes coded-frame batches into the frame validation engine.
pub(crate) struct FrameIngest {
	processor: Box<dyn FrameProcessor>,

	// Reported by the parser at init-done.
	auto_update_offset: bool,
}

impl FrameIngest {
	pub(crate) fn new(processor: Box<dyn FrameProcessor>) -> Self {
		Self {
			processor,
			auto_update_offset: false,
		}
	}

	pub(crate) fn set_auto_update_offset(&mut self, enabled: bool) {
		self.auto_update_offset = enabled;
	}

	pub(crate) fn processor(&mut self) -> &mut dyn FrameProcessor {
		self.processor.as_mut()
	}

	/// Hand one batch to the engine, advancing the offset afterwards when the
	/// parser asked for automatic updates and the engine left it untouched.
	pub(crate) fn ingest(&mut self, batch: &FrameBatch, ctx: &mut AppendContext) -> bool {
		let offset_before = ctx.offset;

		let mut advanced = offset_before;
		if self.auto_update_offset {
			if let Some(min_end) = batch.min_end_timestamp() {
				advanced += min_end;
			}
		}

		if !self.processor.process_frames(batch, ctx) {
			return false;
		}

		if self.auto_update_offset && ctx.offset == offset_before {
			ctx.offset = advanced;
		}

		tracing::trace!(offset = ?ctx.offset, "ingested batch");
		true
	}

	pub(crate) fn reset(&mut self) {
		self.processor.reset();
	}
}
