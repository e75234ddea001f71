use std::sync::Arc;

use crate::{AppendContext, AudioConfig, FrameBatch, TimestampOffset, TrackId, TrackStream};

/// The frame validation and reordering engine contract.
///
/// The engine owns random-access-point and append-window policy; this crate
/// only routes batches to it and keeps its track registrations in sync with
/// the coordinator's index.
pub trait FrameProcessor {
	fn add_track(&mut self, id: TrackId, stream: Arc<dyn TrackStream>) -> bool;

	/// A bytestream renumbered a track between initialization segments.
	fn update_track(&mut self, old_id: TrackId, new_id: TrackId) -> bool;

	/// An audio track's configuration may be about to change; the engine needs
	/// it for preroll trimming decisions.
	fn audio_config_updated(&mut self, config: &AudioConfig);

	fn set_sequence_mode(&mut self, sequence_mode: bool);

	fn set_group_start_timestamp(&mut self, offset: TimestampOffset);

	/// Validate and admit one batch. May adjust the context's offset.
	fn process_frames(&mut self, batch: &FrameBatch, ctx: &mut AppendContext) -> bool;

	/// Require the next admitted frame on every track to be a random access point.
	fn require_random_access_point(&mut self);

	fn reset(&mut self);
}
