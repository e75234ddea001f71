//! Shared fakes for exercising the append pipeline without a real parser,
//! frame processor or storage backend.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use crate::{
	AppendContext, AudioCodec, AudioConfig, CodedFrame, Dimensions, FrameBatch, FrameProcessor, InitParameters,
	MediaType, ParseError, ParseEvent, ProposedTrack, SourceObserver, StreamFactory, StreamParser, TextConfig,
	TextKind, TimeRanges, Timestamp, TimestampOffset, TrackConfig, TrackId, TrackInfo, TrackStream, VideoCodec,
	VideoConfig,
};

pub(crate) fn audio_config() -> AudioConfig {
	AudioConfig {
		codec: AudioCodec::Aac,
		sample_rate: 48_000,
		channel_count: 2,
		description: Some(Bytes::from_static(b"asc")),
	}
}

pub(crate) fn audio_track(id: TrackId) -> ProposedTrack {
	ProposedTrack {
		id,
		config: TrackConfig::Audio(audio_config()),
	}
}

pub(crate) fn video_track(id: TrackId) -> ProposedTrack {
	ProposedTrack {
		id,
		config: TrackConfig::Video(VideoConfig {
			codec: VideoCodec::H264,
			resolution: Dimensions {
				width: 1280,
				height: 720,
			},
			description: None,
		}),
	}
}

pub(crate) fn text_config(label: &str, language: &str) -> TextConfig {
	TextConfig {
		kind: TextKind::Subtitles,
		label: label.to_string(),
		language: language.to_string(),
	}
}

#[derive(Default)]
struct StreamState {
	ranges: TimeRanges,
	buffered_size: usize,
	configs: Vec<TrackConfig>,
	reject_configs: bool,
	evictions: Vec<(Timestamp, usize)>,
	fail_evictions: bool,
	seeks: Vec<Timestamp>,
	memory_limits: Vec<usize>,
	removed: Vec<(Timestamp, Timestamp)>,
	end_of_stream: bool,
	seek_pending: bool,
	shut_down: bool,
}

/// Records every call and serves buffered ranges accumulated via `append`.
#[derive(Default)]
pub(crate) struct FakeStream {
	state: Mutex<StreamState>,
}

impl FakeStream {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	pub(crate) fn set_buffered_size(&self, size: usize) {
		self.state.lock().unwrap().buffered_size = size;
	}

	pub(crate) fn reject_configs(&self, reject: bool) {
		self.state.lock().unwrap().reject_configs = reject;
	}

	pub(crate) fn fail_evictions(&self, fail: bool) {
		self.state.lock().unwrap().fail_evictions = fail;
	}

	pub(crate) fn set_seek_pending(&self, pending: bool) {
		self.state.lock().unwrap().seek_pending = pending;
	}

	pub(crate) fn evictions(&self) -> Vec<(Timestamp, usize)> {
		self.state.lock().unwrap().evictions.clone()
	}

	pub(crate) fn seeks(&self) -> Vec<Timestamp> {
		self.state.lock().unwrap().seeks.clone()
	}

	pub(crate) fn memory_limits(&self) -> Vec<usize> {
		self.state.lock().unwrap().memory_limits.clone()
	}

	pub(crate) fn configs(&self) -> Vec<TrackConfig> {
		self.state.lock().unwrap().configs.clone()
	}

	pub(crate) fn removed(&self) -> Vec<(Timestamp, Timestamp)> {
		self.state.lock().unwrap().removed.clone()
	}

	pub(crate) fn end_of_stream_marked(&self) -> bool {
		self.state.lock().unwrap().end_of_stream
	}

	pub(crate) fn shut_down(&self) -> bool {
		self.state.lock().unwrap().shut_down
	}
}

impl TrackStream for FakeStream {
	fn update_config(&self, config: &TrackConfig) -> bool {
		let mut state = self.state.lock().unwrap();
		if state.reject_configs {
			return false;
		}
		state.configs.push(config.clone());
		true
	}

	fn append(&self, frames: &[CodedFrame]) -> bool {
		let mut state = self.state.lock().unwrap();
		for frame in frames {
			state.ranges.add(frame.timestamp, frame.end_timestamp());
			state.buffered_size += frame.size();
		}
		true
	}

	fn remove(&self, start: Timestamp, end: Timestamp, _duration: Timestamp) {
		self.state.lock().unwrap().removed.push((start, end));
	}

	fn buffered_size(&self) -> usize {
		self.state.lock().unwrap().buffered_size
	}

	fn evict_coded_frames(&self, media_time: Timestamp, target_size: usize) -> bool {
		let mut state = self.state.lock().unwrap();
		state.evictions.push((media_time, target_size));
		!state.fail_evictions
	}

	fn buffered_ranges(&self, _duration: Timestamp) -> TimeRanges {
		self.state.lock().unwrap().ranges.clone()
	}

	fn highest_timestamp(&self) -> Option<Timestamp> {
		self.state.lock().unwrap().ranges.last_end()
	}

	fn buffered_duration(&self) -> Timestamp {
		let state = self.state.lock().unwrap();
		match (state.ranges.first(), state.ranges.last()) {
			(Some((start, _)), Some((_, end))) => end.saturating_sub(start),
			_ => Timestamp::default(),
		}
	}

	fn set_memory_limit(&self, limit: usize) {
		self.state.lock().unwrap().memory_limits.push(limit);
	}

	fn seek(&self, time: Timestamp) {
		self.state.lock().unwrap().seeks.push(time);
	}

	fn start_returning_data(&self) {}

	fn abort_reads(&self) {}

	fn complete_pending_read(&self) {}

	fn set_duration(&self, _duration: Timestamp) {}

	fn mark_end_of_stream(&self) {
		self.state.lock().unwrap().end_of_stream = true;
	}

	fn unmark_end_of_stream(&self) {
		self.state.lock().unwrap().end_of_stream = false;
	}

	fn is_seek_pending(&self) -> bool {
		self.state.lock().unwrap().seek_pending
	}

	fn shutdown(&self) {
		self.state.lock().unwrap().shut_down = true;
	}
}

/// Shared view of every stream a `FakeFactory` created, in creation order.
#[derive(Clone, Default)]
pub(crate) struct FactoryHandle {
	created: Arc<Mutex<Vec<Arc<FakeStream>>>>,
}

impl FactoryHandle {
	pub(crate) fn created(&self) -> Vec<Arc<FakeStream>> {
		self.created.lock().unwrap().clone()
	}
}

#[derive(Default)]
pub(crate) struct FakeFactory {
	handle: FactoryHandle,
	fail: bool,
}

impl FakeFactory {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	pub(crate) fn failing() -> Self {
		Self {
			handle: FactoryHandle::default(),
			fail: true,
		}
	}

	pub(crate) fn handle(&self) -> FactoryHandle {
		self.handle.clone()
	}

	pub(crate) fn created(&self) -> Vec<Arc<FakeStream>> {
		self.handle.created()
	}
}

impl StreamFactory for FakeFactory {
	fn create(&mut self, _kind: MediaType) -> Option<Arc<dyn TrackStream>> {
		if self.fail {
			return None;
		}

		let stream = Arc::new(FakeStream::new());
		self.handle.created.lock().unwrap().push(stream.clone());
		Some(stream)
	}
}

#[derive(Default)]
struct ProcessorState {
	added_tracks: Vec<TrackId>,
	remaps: Vec<(TrackId, TrackId)>,
	audio_configs: Vec<AudioConfig>,
	random_access_point: bool,
	resets: usize,
	sequence_mode: Option<bool>,
	fail_processing: bool,
	offset_override: Option<TimestampOffset>,
}

/// Shared record of everything a `FakeProcessor` was asked to do.
#[derive(Clone, Default)]
pub(crate) struct ProcessorLog {
	state: Arc<Mutex<ProcessorState>>,
}

impl ProcessorLog {
	pub(crate) fn added_tracks(&self) -> Vec<TrackId> {
		self.state.lock().unwrap().added_tracks.clone()
	}

	pub(crate) fn remaps(&self) -> Vec<(TrackId, TrackId)> {
		self.state.lock().unwrap().remaps.clone()
	}

	pub(crate) fn audio_configs(&self) -> Vec<AudioConfig> {
		self.state.lock().unwrap().audio_configs.clone()
	}

	pub(crate) fn random_access_point_required(&self) -> bool {
		self.state.lock().unwrap().random_access_point
	}

	pub(crate) fn resets(&self) -> usize {
		self.state.lock().unwrap().resets
	}

	pub(crate) fn sequence_mode(&self) -> Option<bool> {
		self.state.lock().unwrap().sequence_mode
	}

	pub(crate) fn fail_processing(&self, fail: bool) {
		self.state.lock().unwrap().fail_processing = fail;
	}
}

/// Forwards admitted frames straight to the registered streams.
pub(crate) struct FakeProcessor {
	log: ProcessorLog,
	tracks: BTreeMap<TrackId, Arc<dyn TrackStream>>,
	fail_add_track: bool,
}

impl FakeProcessor {
	pub(crate) fn new(log: ProcessorLog) -> Self {
		Self {
			log,
			tracks: BTreeMap::new(),
			fail_add_track: false,
		}
	}

	pub(crate) fn fail_add_track(&mut self, fail: bool) {
		self.fail_add_track = fail;
	}

	pub(crate) fn set_offset_override(&mut self, offset: TimestampOffset) {
		self.log.state.lock().unwrap().offset_override = Some(offset);
	}
}

impl FrameProcessor for FakeProcessor {
	fn add_track(&mut self, id: TrackId, stream: Arc<dyn TrackStream>) -> bool {
		if self.fail_add_track {
			return false;
		}

		self.log.state.lock().unwrap().added_tracks.push(id);
		self.tracks.insert(id, stream);
		true
	}

	fn update_track(&mut self, old_id: TrackId, new_id: TrackId) -> bool {
		let Some(stream) = self.tracks.remove(&old_id) else {
			return false;
		};

		self.tracks.insert(new_id, stream);
		self.log.state.lock().unwrap().remaps.push((old_id, new_id));
		true
	}

	fn audio_config_updated(&mut self, config: &AudioConfig) {
		self.log.state.lock().unwrap().audio_configs.push(config.clone());
	}

	fn set_sequence_mode(&mut self, sequence_mode: bool) {
		self.log.state.lock().unwrap().sequence_mode = Some(sequence_mode);
	}

	fn set_group_start_timestamp(&mut self, _offset: TimestampOffset) {}

	fn process_frames(&mut self, batch: &FrameBatch, ctx: &mut AppendContext) -> bool {
		let (fail, offset_override) = {
			let state = self.log.state.lock().unwrap();
			(state.fail_processing, state.offset_override)
		};

		if fail {
			return false;
		}

		if let Some(offset) = offset_override {
			ctx.offset = offset;
		}

		for (id, queue) in batch.queues() {
			let Some(stream) = self.tracks.get(&id) else {
				return false;
			};
			if !stream.append(queue) {
				return false;
			}
		}

		true
	}

	fn require_random_access_point(&mut self) {
		self.log.state.lock().unwrap().random_access_point = true;
	}

	fn reset(&mut self) {
		self.log.state.lock().unwrap().resets += 1;
	}
}

/// Returns one scripted batch of events per `parse` call, in order.
///
/// Running past the script models a parser rejecting the bytes.
pub(crate) struct ScriptedParser {
	scripts: VecDeque<Vec<ParseEvent>>,
	flushes: Arc<Mutex<usize>>,
}

impl ScriptedParser {
	pub(crate) fn new(scripts: Vec<Vec<ParseEvent>>) -> Self {
		Self {
			scripts: scripts.into(),
			flushes: Arc::default(),
		}
	}

	pub(crate) fn flush_count(&self) -> Arc<Mutex<usize>> {
		self.flushes.clone()
	}
}

impl StreamParser for ScriptedParser {
	fn parse(&mut self, _data: &[u8]) -> Result<Vec<ParseEvent>, ParseError> {
		self.scripts
			.pop_front()
			.ok_or_else(|| ParseError("unrecognized bytes".to_string()))
	}

	fn flush(&mut self) {
		*self.flushes.lock().unwrap() += 1;
	}
}

#[derive(Default)]
struct ObserverState {
	initialized: Vec<InitParameters>,
	tracks_updated: Vec<Vec<TrackInfo>>,
	text_added: Vec<(TrackId, TextConfig)>,
}

#[derive(Clone, Default)]
pub(crate) struct RecordingObserver {
	state: Arc<Mutex<ObserverState>>,
}

impl RecordingObserver {
	pub(crate) fn initialized(&self) -> usize {
		self.state.lock().unwrap().initialized.len()
	}

	pub(crate) fn tracks_updated(&self) -> usize {
		self.state.lock().unwrap().tracks_updated.len()
	}

	pub(crate) fn text_added(&self) -> Vec<(TrackId, TextConfig)> {
		self.state.lock().unwrap().text_added.clone()
	}
}

impl SourceObserver for RecordingObserver {
	fn on_initialized(&mut self, params: &InitParameters) {
		self.state.lock().unwrap().initialized.push(*params);
	}

	fn on_tracks_updated(&mut self, tracks: &[TrackInfo]) {
		self.state.lock().unwrap().tracks_updated.push(tracks.to_vec());
	}

	fn on_text_track_added(&mut self, id: TrackId, config: &TextConfig) {
		self.state.lock().unwrap().text_added.push((id, config.clone()));
	}
}
