use std::collections::{BTreeMap, BTreeSet};

use crate::coordinator::Tracks;
use crate::ingest::FrameIngest;
use crate::state::SegmentState;
use crate::{
	budget, parse_expected_codecs, AppendContext, Error, FrameBatch, FrameProcessor, InitParameters, MediaType,
	ParseEvent, ProposedTrack, Result, State, StreamFactory, StreamParser, TextConfig, TimeRanges, Timestamp,
	TimestampOffset, TrackId, TrackInfo,
};

/// Per-track byte budget override, read once after the first successful
/// initialization segment. Absent or non-positive values keep the default.
pub const AUDIO_MEMORY_LIMIT_ENV: &str = "MSE_AUDIO_BUFFER_SIZE_LIMIT";
pub const VIDEO_MEMORY_LIMIT_ENV: &str = "MSE_VIDEO_BUFFER_SIZE_LIMIT";

// Limits how often we warn about media segments that are missing a block from
// at least one of the audio or video tracks.
const MAX_MISSING_TRACK_LOGS: usize = 10;

/// Notifications for the demuxer-facing layer.
pub trait SourceObserver {
	/// The parser finished initialization; playback metadata is known.
	fn on_initialized(&mut self, params: &InitParameters) {
		let _ = params;
	}

	/// An initialization segment resolved successfully; this is the complete
	/// active track set. Fired exactly once per successful segment.
	fn on_tracks_updated(&mut self, tracks: &[TrackInfo]) {
		let _ = tracks;
	}

	fn on_text_track_added(&mut self, id: TrackId, config: &TextConfig) {
		let _ = (id, config);
	}
}

/// A no-op observer.
impl SourceObserver for () {}

/// The buffering core behind one source of appended media segments.
///
/// Owns the byte-stream parser, the frame-ingest adapter, the track
/// coordinator and the segment state machine; everything runs synchronously
/// on the caller's thread.
pub struct SourceBuffer {
	parser: Box<dyn StreamParser>,
	ingest: FrameIngest,
	factory: Box<dyn StreamFactory>,
	observer: Box<dyn SourceObserver>,

	tracks: Tracks,
	segment: SegmentState,

	// Tracks that produced frames within the current media segment.
	segment_has_data: BTreeSet<TrackId>,
	missing_track_logs: usize,
}

impl SourceBuffer {
	pub fn new(
		parser: Box<dyn StreamParser>,
		processor: Box<dyn FrameProcessor>,
		factory: Box<dyn StreamFactory>,
		observer: Box<dyn SourceObserver>,
	) -> Self {
		Self {
			parser,
			ingest: FrameIngest::new(processor),
			factory,
			observer,
			tracks: Tracks::new(),
			segment: SegmentState::new(),
			segment_has_data: BTreeSet::new(),
			missing_track_logs: 0,
		}
	}

	/// Declare the codecs the bytestream is expected to carry.
	///
	/// Callable once. `expected_codecs` is a comma-separated list; entries are
	/// classified as audio or video, unrecognized ones are skipped.
	pub fn init(&mut self, expected_codecs: &str) {
		self.segment.init();

		let (audio, video) = parse_expected_codecs(expected_codecs);
		tracing::debug!(?audio, ?video, "expected codecs");
		self.tracks.set_expected_codecs(audio, video);
	}

	pub fn state(&self) -> State {
		self.segment.state()
	}

	/// Feed appended bytes through the parser and ingest whatever comes out.
	///
	/// The context carries the append window and the timestamp offset; after a
	/// successful call the offset holds its possibly advanced value. A parse
	/// failure only fails this call.
	pub fn append(&mut self, data: &[u8], ctx: &mut AppendContext) -> Result<()> {
		assert_ne!(self.segment.state(), State::Uninitialized, "append before init");
		self.segment.begin_append();
		let result = self.append_inner(data, ctx);
		self.segment.end_append();

		if let Err(err) = &result {
			tracing::error!(
				%err,
				size = data.len(),
				window_start = ?ctx.window.start,
				window_end = ?ctx.window.end,
				"append failed"
			);
		}

		result
	}

	fn append_inner(&mut self, data: &[u8], ctx: &mut AppendContext) -> Result<()> {
		let events = self.parser.parse(data)?;
		for event in events {
			self.dispatch(event, ctx)?;
		}
		Ok(())
	}

	fn dispatch(&mut self, event: ParseEvent, ctx: &mut AppendContext) -> Result<()> {
		match event {
			ParseEvent::Configs { tracks, text } => self.on_configs(tracks, text),
			ParseEvent::Buffers(batch) => self.on_buffers(&batch, ctx),
			ParseEvent::SegmentStart => {
				self.on_segment_start();
				Ok(())
			}
			ParseEvent::SegmentEnd => {
				self.on_segment_end();
				Ok(())
			}
			ParseEvent::InitDone(params) => {
				self.on_init_done(params);
				Ok(())
			}
		}
	}

	fn on_configs(&mut self, tracks: Vec<ProposedTrack>, text: BTreeMap<TrackId, TextConfig>) -> Result<()> {
		// Track changes are only legal inside an append, never from a flush.
		assert!(self.segment.in_append(), "track configuration outside append");
		assert!(self.segment.state() >= State::PendingConfig, "configs before init");

		tracing::debug!(tracks = tracks.len(), text = text.len(), "new track configuration");

		let first = !self.tracks.first_init_received();
		let update = self
			.tracks
			.update(tracks, text, self.factory.as_mut(), self.ingest.processor())?;

		self.segment.configs_accepted();

		if first {
			self.apply_memory_limit_overrides();
		}

		for (id, config) in &update.new_text_tracks {
			self.observer.on_text_track_added(*id, config);
		}
		self.observer.on_tracks_updated(&update.tracks);

		Ok(())
	}

	fn on_buffers(&mut self, batch: &FrameBatch, ctx: &mut AppendContext) -> Result<()> {
		assert_eq!(self.segment.state(), State::Initialized, "frames before init completed");
		assert!(self.segment.parsing_segment(), "frames outside a media segment");

		for id in batch.tracks() {
			self.segment_has_data.insert(id);
		}

		if !self.ingest.ingest(batch, ctx) {
			return Err(Error::FrameProcessing);
		}

		Ok(())
	}

	fn on_segment_start(&mut self) {
		self.segment.begin_segment();
		self.segment_has_data.clear();
	}

	fn on_segment_end(&mut self) {
		self.segment.end_segment();

		for entry in self.tracks.entries() {
			if entry.kind == MediaType::Text || self.segment_has_data.contains(&entry.id) {
				continue;
			}

			if self.missing_track_logs < MAX_MISSING_TRACK_LOGS {
				self.missing_track_logs += 1;
				tracing::debug!(
					kind = %entry.kind,
					track = entry.id,
					"media segment contained no coded frames for track; discontinuity detection may not be interoperable"
				);
			}
		}
	}

	fn on_init_done(&mut self, params: InitParameters) {
		self.segment.init_done();
		self.ingest.set_auto_update_offset(params.auto_update_timestamp_offset);
		self.observer.on_initialized(&params);
	}

	/// Abort any partially parsed data without touching track configuration.
	///
	/// Allowed in any state after `init`; must not be called mid-append.
	pub fn reset(&mut self) {
		self.segment.reset();
		self.parser.flush();
		self.ingest.reset();
		self.segment_has_data.clear();
	}

	pub fn remove(&mut self, start: Timestamp, end: Timestamp, duration: Timestamp) {
		self.segment.assert_open();
		for entry in self.tracks.entries() {
			entry.stream.remove(start, end, duration);
		}
	}

	/// Make room for `incoming_size` bytes, preferring frames below `media_time`.
	pub fn evict_coded_frames(&mut self, media_time: Timestamp, incoming_size: usize) -> bool {
		self.segment.assert_open();
		budget::evict_proportionally(self.tracks.entries(), media_time, incoming_size)
	}

	/// The jointly-buffered ranges across every active track.
	pub fn buffered_ranges(&self, duration: Timestamp, ended: bool) -> TimeRanges {
		self.tracks.buffered_ranges(duration, ended)
	}

	pub fn highest_timestamp(&self) -> Timestamp {
		self.tracks.highest_timestamp()
	}

	pub fn max_buffered_duration(&self) -> Timestamp {
		self.tracks.max_buffered_duration()
	}

	pub fn seek(&mut self, time: Timestamp) {
		self.segment.assert_open();
		for entry in self.tracks.entries() {
			entry.stream.seek(time);
		}
	}

	pub fn start_returning_data(&mut self) {
		self.segment.assert_open();
		for entry in self.tracks.entries() {
			entry.stream.start_returning_data();
		}
	}

	pub fn abort_reads(&mut self) {
		self.segment.assert_open();
		for entry in self.tracks.entries() {
			entry.stream.abort_reads();
		}
	}

	pub fn complete_pending_read(&mut self) {
		self.segment.assert_open();
		for entry in self.tracks.entries() {
			entry.stream.complete_pending_read();
		}
	}

	pub fn set_duration(&mut self, duration: Timestamp) {
		self.segment.assert_open();
		for entry in self.tracks.entries() {
			entry.stream.set_duration(duration);
		}
	}

	pub fn mark_end_of_stream(&mut self) {
		self.segment.assert_open();
		for entry in self.tracks.entries() {
			entry.stream.mark_end_of_stream();
		}
	}

	pub fn unmark_end_of_stream(&mut self) {
		self.segment.assert_open();
		for entry in self.tracks.entries() {
			entry.stream.unmark_end_of_stream();
		}
	}

	pub fn is_seek_pending(&self) -> bool {
		self.tracks.is_seek_pending()
	}

	pub fn set_memory_limits(&mut self, kind: MediaType, limit: usize) {
		self.segment.assert_open();
		self.tracks.set_memory_limits(kind, limit);
	}

	pub fn set_sequence_mode(&mut self, sequence_mode: bool) {
		self.segment.assert_open();
		assert!(!self.segment.parsing_segment(), "sequence mode change mid-segment");
		self.ingest.processor().set_sequence_mode(sequence_mode);
	}

	pub fn set_group_start_timestamp(&mut self, offset: TimestampOffset) {
		self.segment.assert_open();
		assert!(!self.segment.parsing_segment(), "group start change mid-segment");
		self.ingest.processor().set_group_start_timestamp(offset);
	}

	/// Terminal. Every track shuts down; any further call is a programmer error.
	pub fn shutdown(&mut self) {
		self.segment.shutdown();
		for entry in self.tracks.entries() {
			entry.stream.shutdown();
		}
	}

	fn apply_memory_limit_overrides(&mut self) {
		if let Some(limit) = read_limit(AUDIO_MEMORY_LIMIT_ENV) {
			tracing::info!(limit, "custom audio per-track buffer size limit");
			self.tracks.set_memory_limits(MediaType::Audio, limit);
		}

		if let Some(limit) = read_limit(VIDEO_MEMORY_LIMIT_ENV) {
			tracing::info!(limit, "custom video per-track buffer size limit");
			self.tracks.set_memory_limits(MediaType::Video, limit);
		}
	}
}

fn read_limit(key: &str) -> Option<usize> {
	let value = std::env::var(key).ok()?;
	match value.trim().parse::<usize>() {
		Ok(limit) if limit > 0 => Some(limit),
		_ => None,
	}
}
