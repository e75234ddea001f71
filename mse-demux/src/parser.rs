use std::collections::BTreeMap;

use crate::{FrameBatch, TextConfig, Timestamp, TrackConfig, TrackId};

/// A track description from an initialization segment.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposedTrack {
	pub id: TrackId,
	pub config: TrackConfig,
}

/// Parameters the parser reports once initialization completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitParameters {
	/// Stream duration, when the container declares one.
	pub duration: Option<Timestamp>,

	/// Whether the append offset should advance automatically after each
	/// ingested batch (formats without in-band timestamps).
	pub auto_update_timestamp_offset: bool,
}

/// One demultiplexed result from feeding bytes to the parser.
///
/// Events are dispatched strictly in the order the parser returns them.
#[derive(Debug, Clone)]
pub enum ParseEvent {
	/// An initialization segment: the proposed audio/video track set plus the
	/// text-track configuration mapping.
	Configs {
		tracks: Vec<ProposedTrack>,
		text: BTreeMap<TrackId, TextConfig>,
	},

	/// Coded frames from a media segment.
	Buffers(FrameBatch),

	/// A media segment started.
	SegmentStart,

	/// The current media segment ended.
	SegmentEnd,

	/// The parser finished initialization.
	InitDone(InitParameters),
}

#[derive(thiserror::Error, Debug, Clone)]
#[error("{0}")]
pub struct ParseError(pub String);

/// The byte-stream parser contract.
///
/// `parse` either consumes the bytes and returns the demultiplexed events, or
/// rejects the input as a value. Rejection fails the surrounding append but
/// leaves the session usable.
pub trait StreamParser {
	fn parse(&mut self, data: &[u8]) -> Result<Vec<ParseEvent>, ParseError>;

	/// Drop buffered parse state without tearing down track configuration.
	fn flush(&mut self);
}
