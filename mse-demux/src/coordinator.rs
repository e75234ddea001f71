use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::{
	intersect_ranges, AudioCodec, Error, FrameProcessor, MediaType, ProposedTrack, Result, StreamFactory, TextConfig,
	TimeRanges, Timestamp, TrackConfig, TrackId, TrackStream, VideoCodec,
};

/// One active track: the stable stream handle plus its current bytestream
/// identifier and configuration.
#[derive(Clone)]
pub(crate) struct TrackEntry {
	pub(crate) kind: MediaType,
	pub(crate) id: TrackId,
	pub(crate) config: TrackConfig,
	pub(crate) stream: Arc<dyn TrackStream>,
}

/// The resolved track set, reported to the external consumer after every
/// successful initialization segment.
#[derive(Debug, Clone)]
pub struct TrackInfo {
	pub kind: MediaType,
	pub id: TrackId,
	pub config: TrackConfig,
}

pub(crate) struct TrackUpdates {
	pub(crate) tracks: Vec<TrackInfo>,
	pub(crate) new_text_tracks: Vec<(TrackId, TextConfig)>,
}

/// Owns every active track and resolves initialization segments against them.
///
/// Stream handles are created once and survive identifier renumbering;
/// bytestream identifiers are just the current index into this set.
pub(crate) struct Tracks {
	entries: Vec<TrackEntry>,

	expected_audio: Vec<AudioCodec>,
	expected_video: Vec<VideoCodec>,

	first_init_received: bool,
}

impl Tracks {
	pub(crate) fn new() -> Self {
		Self {
			entries: Vec::new(),
			expected_audio: Vec::new(),
			expected_video: Vec::new(),
			first_init_received: false,
		}
	}

	pub(crate) fn set_expected_codecs(&mut self, audio: Vec<AudioCodec>, video: Vec<VideoCodec>) {
		self.expected_audio = audio;
		self.expected_video = video;
	}

	pub(crate) fn first_init_received(&self) -> bool {
		self.first_init_received
	}

	pub(crate) fn entries(&self) -> &[TrackEntry] {
		&self.entries
	}

	/// Resolve one initialization segment.
	///
	/// Resolution works on a staged copy of the track set; the committed set,
	/// the frame-processor registrations and the identifier remaps only change
	/// when the whole segment validates. On error nothing externally visible
	/// has been committed.
	pub(crate) fn update(
		&mut self,
		tracks: Vec<ProposedTrack>,
		text: BTreeMap<TrackId, TextConfig>,
		factory: &mut dyn StreamFactory,
		processor: &mut dyn FrameProcessor,
	) -> Result<TrackUpdates> {
		self.check_duplicate_ids(&tracks, &text)?;

		let mut staged: Vec<TrackEntry> = self.entries.clone();
		let mut registrations: Vec<(TrackId, Arc<dyn TrackStream>)> = Vec::new();
		let mut remaps: Vec<(TrackId, TrackId)> = Vec::new();
		let mut new_text: Vec<(TrackId, TextConfig)> = Vec::new();

		// Duplicates within one proposal are caught by consuming the match.
		let mut expected_audio = self.expected_audio.clone();
		let mut expected_video = self.expected_video.clone();

		for proposed in &tracks {
			let kind = proposed.config.media_type();

			match &proposed.config {
				TrackConfig::Audio(audio) => {
					let matched = expected_audio
						.iter()
						.position(|codec| *codec == audio.codec)
						.ok_or_else(|| Error::UnexpectedCodec {
							kind,
							codec: audio.codec.to_string(),
						})?;
					expected_audio.remove(matched);
				}
				TrackConfig::Video(video) => {
					let matched = expected_video
						.iter()
						.position(|codec| *codec == video.codec)
						.ok_or_else(|| Error::UnexpectedCodec {
							kind,
							codec: video.codec.to_string(),
						})?;
					expected_video.remove(matched);
				}
				TrackConfig::Text(_) => return Err(Error::UnsupportedTrack(MediaType::Text)),
			}

			let stream = self.resolve_media_track(
				&mut staged,
				&mut registrations,
				&mut remaps,
				kind,
				proposed,
				factory,
			)?;

			if let TrackConfig::Audio(audio) = &proposed.config {
				processor.audio_config_updated(audio);
			}

			if !stream.update_config(&proposed.config) {
				return Err(Error::ConfigRejected(proposed.id));
			}

			tracing::debug!(%kind, track = proposed.id, "resolved track");
		}

		// The expectation list is only required to be complete once; later
		// segments may re-describe a subset.
		if !self.first_init_received {
			if let Some(codec) = expected_audio.first() {
				return Err(Error::MissingExpectedTrack(codec.to_string()));
			}
			if let Some(codec) = expected_video.first() {
				return Err(Error::MissingExpectedTrack(codec.to_string()));
			}
		}

		self.resolve_text_tracks(&mut staged, &mut registrations, &mut remaps, &mut new_text, &text, factory)?;

		if !staged
			.iter()
			.any(|entry| matches!(entry.kind, MediaType::Audio | MediaType::Video))
		{
			return Err(Error::NoSupportedTracks);
		}

		// Commit. A registration or remap failure aborts before the index swap;
		// the processor may keep registrations from the aborted commit but a
		// subsequent correct segment still resolves cleanly.
		for (id, stream) in registrations {
			if !processor.add_track(id, stream) {
				return Err(Error::TrackRegister(id));
			}
		}
		for (old, new) in remaps {
			if !processor.update_track(old, new) {
				return Err(Error::TrackRemap { old, new });
			}
		}

		processor.require_random_access_point();

		self.entries = staged;
		self.first_init_received = true;

		let infos = self
			.entries
			.iter()
			.map(|entry| TrackInfo {
				kind: entry.kind,
				id: entry.id,
				config: entry.config.clone(),
			})
			.collect();

		Ok(TrackUpdates {
			tracks: infos,
			new_text_tracks: new_text,
		})
	}

	fn check_duplicate_ids(&self, tracks: &[ProposedTrack], text: &BTreeMap<TrackId, TextConfig>) -> Result<()> {
		let mut seen = BTreeSet::new();
		for track in tracks {
			if !seen.insert(track.id) {
				return Err(Error::DuplicateTrackId(track.id));
			}
		}
		for id in text.keys() {
			if !seen.insert(*id) {
				return Err(Error::DuplicateTrackId(*id));
			}
		}
		Ok(())
	}

	fn resolve_media_track(
		&self,
		staged: &mut Vec<TrackEntry>,
		registrations: &mut Vec<(TrackId, Arc<dyn TrackStream>)>,
		remaps: &mut Vec<(TrackId, TrackId)>,
		kind: MediaType,
		proposed: &ProposedTrack,
		factory: &mut dyn StreamFactory,
	) -> Result<Arc<dyn TrackStream>> {
		if !self.first_init_received {
			// Every track in the first segment is new.
			let stream = factory.create(kind).ok_or(Error::StreamCreate(kind))?;
			registrations.push((proposed.id, stream.clone()));
			staged.push(TrackEntry {
				kind,
				id: proposed.id,
				config: proposed.config.clone(),
				stream: stream.clone(),
			});
			return Ok(stream);
		}

		let count = staged.iter().filter(|entry| entry.kind == kind).count();
		if count > 1 {
			// Renumbering is ambiguous with several tracks; ids must match.
			let entry = staged
				.iter_mut()
				.find(|entry| entry.kind == kind && entry.id == proposed.id)
				.ok_or(Error::UnknownTrack(proposed.id))?;
			entry.config = proposed.config.clone();
			Ok(entry.stream.clone())
		} else {
			// A lone track may be renumbered between segments: keep the stream,
			// move the index entry.
			let entry = staged
				.iter_mut()
				.find(|entry| entry.kind == kind)
				.ok_or(Error::UnknownTrack(proposed.id))?;
			if entry.id != proposed.id {
				tracing::debug!(%kind, old = entry.id, new = proposed.id, "track renumbered");
				remaps.push((entry.id, proposed.id));
				entry.id = proposed.id;
			}
			entry.config = proposed.config.clone();
			Ok(entry.stream.clone())
		}
	}

	fn resolve_text_tracks(
		&self,
		staged: &mut Vec<TrackEntry>,
		registrations: &mut Vec<(TrackId, Arc<dyn TrackStream>)>,
		remaps: &mut Vec<(TrackId, TrackId)>,
		new_text: &mut Vec<(TrackId, TextConfig)>,
		text: &BTreeMap<TrackId, TextConfig>,
		factory: &mut dyn StreamFactory,
	) -> Result<()> {
		let count = staged.iter().filter(|entry| entry.kind == MediaType::Text).count();

		if count == 0 {
			for (id, config) in text {
				let stream = factory.create(MediaType::Text).ok_or(Error::StreamCreate(MediaType::Text))?;
				let config = TrackConfig::Text(config.clone());
				if !stream.update_config(&config) {
					return Err(Error::ConfigRejected(*id));
				}

				registrations.push((*id, stream.clone()));
				staged.push(TrackEntry {
					kind: MediaType::Text,
					id: *id,
					config: config.clone(),
					stream,
				});

				let TrackConfig::Text(config) = config else { unreachable!() };
				new_text.push((*id, config));
			}

			return Ok(());
		}

		if text.len() != count {
			return Err(Error::TextTrackCount {
				expected: count,
				actual: text.len(),
			});
		}

		if count == 1 {
			let (new_id, proposed) = text.iter().next().expect("count checked above");
			let entry = staged
				.iter_mut()
				.find(|entry| entry.kind == MediaType::Text)
				.expect("count checked above");

			let TrackConfig::Text(existing) = &entry.config else {
				unreachable!("text entry holds a text config")
			};
			if !proposed.matches(existing) {
				return Err(Error::TextTrackMismatch(*new_id));
			}

			// A lone text track may also be re-keyed.
			if entry.id != *new_id {
				remaps.push((entry.id, *new_id));
				entry.id = *new_id;
			}
		} else {
			for (id, proposed) in text {
				let entry = staged
					.iter()
					.find(|entry| entry.kind == MediaType::Text && entry.id == *id)
					.ok_or(Error::TextTrackMismatch(*id))?;

				let TrackConfig::Text(existing) = &entry.config else {
					unreachable!("text entry holds a text config")
				};
				if !proposed.matches(existing) {
					return Err(Error::TextTrackMismatch(*id));
				}
			}
		}

		Ok(())
	}

	pub(crate) fn buffered_ranges(&self, duration: Timestamp, ended: bool) -> TimeRanges {
		let active: Vec<TimeRanges> = self
			.entries
			.iter()
			.map(|entry| entry.stream.buffered_ranges(duration))
			.collect();

		intersect_ranges(&active, ended)
	}

	pub(crate) fn highest_timestamp(&self) -> Timestamp {
		self.entries
			.iter()
			.filter_map(|entry| entry.stream.highest_timestamp())
			.max()
			.unwrap_or_default()
	}

	pub(crate) fn max_buffered_duration(&self) -> Timestamp {
		self.entries
			.iter()
			.map(|entry| entry.stream.buffered_duration())
			.max()
			.unwrap_or_default()
	}

	pub(crate) fn is_seek_pending(&self) -> bool {
		// Text tracks are sparse; missing cues must not stall a seek.
		self.entries
			.iter()
			.filter(|entry| entry.kind != MediaType::Text)
			.any(|entry| entry.stream.is_seek_pending())
	}

	pub(crate) fn set_memory_limits(&self, kind: MediaType, limit: usize) {
		for entry in self.entries.iter().filter(|entry| entry.kind == kind) {
			entry.stream.set_memory_limit(limit);
		}
	}
}
