use crate::{MediaType, ParseError, TrackId};

#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
	/// The byte-stream parser rejected the appended bytes. The session stays
	/// usable; only this append failed.
	#[error("stream parsing failed: {0}")]
	Parse(#[from] ParseError),

	#[error("duplicate bytestream track id {0}")]
	DuplicateTrackId(TrackId),

	#[error("unsupported {0} track in initialization segment")]
	UnsupportedTrack(MediaType),

	#[error("{kind} codec {codec} does not match the expected codecs")]
	UnexpectedCodec { kind: MediaType, codec: String },

	#[error("initialization segment misses expected {0} track")]
	MissingExpectedTrack(String),

	#[error("failed to create {0} stream")]
	StreamCreate(MediaType),

	#[error("failed to register track {0} with the frame processor")]
	TrackRegister(TrackId),

	#[error("failed to remap track {old} to {new}")]
	TrackRemap { old: TrackId, new: TrackId },

	#[error("unexpected track id {0}")]
	UnknownTrack(TrackId),

	#[error("stream rejected the configuration for track {0}")]
	ConfigRejected(TrackId),

	#[error("text track count changed: expected {expected}, got {actual}")]
	TextTrackCount { expected: usize, actual: usize },

	#[error("text track {0} does not match its previous configuration")]
	TextTrackMismatch(TrackId),

	#[error("initialization segment contains no audio or video track")]
	NoSupportedTracks,

	#[error("frame processing failed")]
	FrameProcessing,
}

pub type Result<T> = std::result::Result<T, Error>;
