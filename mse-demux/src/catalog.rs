use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_with::DisplayFromStr;

/// The identifier a bytestream assigns to a track.
///
/// May be renumbered across initialization segments; never trust it as a
/// stable handle.
pub type TrackId = u32;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
	Audio,
	Video,
	Text,
}

impl fmt::Display for MediaType {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Audio => write!(f, "audio"),
			Self::Video => write!(f, "video"),
			Self::Text => write!(f, "text"),
		}
	}
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
	#[error("invalid codec string")]
	Invalid,

	#[error("unsupported codec: {0}")]
	Unsupported(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCodec {
	Aac,
	Opus,
	Mp3,
	Flac,
	Vorbis,
}

impl FromStr for AudioCodec {
	type Err = CodecError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.starts_with("mp4a.40.") || s == "aac" {
			return Ok(Self::Aac);
		}

		match s {
			"opus" => Ok(Self::Opus),
			"mp3" | "mp4a.69" | "mp4a.6b" => Ok(Self::Mp3),
			"flac" => Ok(Self::Flac),
			"vorbis" => Ok(Self::Vorbis),
			_ => Err(CodecError::Unsupported(s.to_string())),
		}
	}
}

impl fmt::Display for AudioCodec {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Aac => write!(f, "aac"),
			Self::Opus => write!(f, "opus"),
			Self::Mp3 => write!(f, "mp3"),
			Self::Flac => write!(f, "flac"),
			Self::Vorbis => write!(f, "vorbis"),
		}
	}
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoCodec {
	H264,
	H265,
	Vp8,
	Vp9,
	Av1,
}

impl FromStr for VideoCodec {
	type Err = CodecError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let prefix = s.split('.').next().ok_or(CodecError::Invalid)?;
		match prefix {
			"avc1" | "avc3" | "h264" => Ok(Self::H264),
			"hev1" | "hvc1" | "h265" => Ok(Self::H265),
			"vp8" => Ok(Self::Vp8),
			"vp09" | "vp9" => Ok(Self::Vp9),
			"av01" | "av1" => Ok(Self::Av1),
			_ => Err(CodecError::Unsupported(s.to_string())),
		}
	}
}

impl fmt::Display for VideoCodec {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::H264 => write!(f, "h264"),
			Self::H265 => write!(f, "h265"),
			Self::Vp8 => write!(f, "vp8"),
			Self::Vp9 => write!(f, "vp9"),
			Self::Av1 => write!(f, "av1"),
		}
	}
}

/// Split a comma-separated codec list into audio and video expectations.
///
/// Unrecognized entries are logged and skipped rather than failing the call.
pub fn parse_expected_codecs(list: &str) -> (Vec<AudioCodec>, Vec<VideoCodec>) {
	let mut audio = Vec::new();
	let mut video = Vec::new();

	for part in list.split(',').map(str::trim).filter(|part| !part.is_empty()) {
		if let Ok(codec) = part.parse::<AudioCodec>() {
			audio.push(codec);
		} else if let Ok(codec) = part.parse::<VideoCodec>() {
			video.push(codec);
		} else {
			tracing::info!(codec = part, "unrecognized media codec");
		}
	}

	(audio, video)
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimensions {
	pub width: u32,
	pub height: u32,
}

#[serde_with::serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AudioConfig {
	#[serde_as(as = "DisplayFromStr")]
	pub codec: AudioCodec,

	pub sample_rate: u32,
	pub channel_count: u16,

	// Codec-specific initialization blob, passed through opaquely.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<Bytes>,
}

#[serde_with::serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VideoConfig {
	#[serde_as(as = "DisplayFromStr")]
	pub codec: VideoCodec,

	pub resolution: Dimensions,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<Bytes>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TextKind {
	Subtitles,
	Captions,
	Descriptions,
	Metadata,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TextConfig {
	pub kind: TextKind,
	pub label: String,
	pub language: String,
}

impl TextConfig {
	/// Whether two configs describe the same track, identifiers aside.
	pub fn matches(&self, other: &Self) -> bool {
		self.kind == other.kind && self.label == other.label && self.language == other.language
	}
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TrackConfig {
	Audio(AudioConfig),
	Video(VideoConfig),
	Text(TextConfig),
}

impl TrackConfig {
	pub fn media_type(&self) -> MediaType {
		match self {
			Self::Audio(_) => MediaType::Audio,
			Self::Video(_) => MediaType::Video,
			Self::Text(_) => MediaType::Text,
		}
	}
}
