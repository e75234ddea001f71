use std::collections::BTreeMap;

use bytes::Bytes;
use derive_more::Debug;

use crate::{Timestamp, TrackId};

/// A single coded frame as emitted by the byte-stream parser.
#[derive(Clone, Debug)]
pub struct CodedFrame {
	pub timestamp: Timestamp,
	pub duration: Timestamp,
	pub keyframe: bool,

	#[debug("{}", payload.len())]
	pub payload: Bytes,
}

impl CodedFrame {
	pub fn end_timestamp(&self) -> Timestamp {
		self.timestamp + self.duration
	}

	pub fn size(&self) -> usize {
		self.payload.len()
	}
}

/// Coded frames grouped per bytestream track, in decode order.
///
/// Every queue is non-empty. The batch only lives for one ingestion call.
#[derive(Clone, Debug, Default)]
pub struct FrameBatch {
	queues: BTreeMap<TrackId, Vec<CodedFrame>>,
}

impl FrameBatch {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, track: TrackId, frame: CodedFrame) {
		self.queues.entry(track).or_default().push(frame);
	}

	pub fn is_empty(&self) -> bool {
		self.queues.is_empty()
	}

	pub fn tracks(&self) -> impl Iterator<Item = TrackId> + '_ {
		self.queues.keys().copied()
	}

	pub fn queues(&self) -> impl Iterator<Item = (TrackId, &[CodedFrame])> {
		self.queues.iter().map(|(id, queue)| (*id, queue.as_slice()))
	}

	/// The smallest end timestamp across every queue's final frame.
	///
	/// The slowest track governs how far a timestamp offset may auto-advance.
	pub fn min_end_timestamp(&self) -> Option<Timestamp> {
		self.queues
			.values()
			.filter_map(|queue| queue.last())
			.map(CodedFrame::end_timestamp)
			.min()
	}
}
