use std::sync::Arc;

use crate::{CodedFrame, MediaType, TimeRanges, Timestamp, TrackConfig};

/// The per-track buffered storage contract.
///
/// One stream exists per track and owns that track's coded frames. Methods
/// take `&self` and implementations are `Send + Sync`: buffered-range and
/// highest-timestamp queries may race with append-side mutation, so a stream
/// carries its own synchronization primitive.
pub trait TrackStream: Send + Sync {
	/// Re-validate and adopt a new decoder configuration.
	fn update_config(&self, config: &TrackConfig) -> bool;

	/// Admit validated frames into buffered storage.
	///
	/// Called by the frame validation engine, never by this crate directly.
	fn append(&self, frames: &[CodedFrame]) -> bool;

	fn remove(&self, start: Timestamp, end: Timestamp, duration: Timestamp);

	/// Bytes currently occupied by buffered frames.
	fn buffered_size(&self) -> usize;

	/// Evict frames, preferring those below `media_time`, so that `target_size`
	/// additional bytes fit under the memory limit.
	fn evict_coded_frames(&self, media_time: Timestamp, target_size: usize) -> bool;

	fn buffered_ranges(&self, duration: Timestamp) -> TimeRanges;

	fn highest_timestamp(&self) -> Option<Timestamp>;

	fn buffered_duration(&self) -> Timestamp;

	fn set_memory_limit(&self, limit: usize);

	fn seek(&self, time: Timestamp);

	fn start_returning_data(&self);

	fn abort_reads(&self);

	fn complete_pending_read(&self);

	fn set_duration(&self, duration: Timestamp);

	fn mark_end_of_stream(&self);

	fn unmark_end_of_stream(&self);

	/// Whether a seek is still waiting for data to arrive at its target.
	fn is_seek_pending(&self) -> bool;

	fn shutdown(&self);
}

/// Creates the stream object backing a newly seen track.
pub trait StreamFactory {
	fn create(&mut self, kind: MediaType) -> Option<Arc<dyn TrackStream>>;
}
