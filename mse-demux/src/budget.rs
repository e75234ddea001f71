use crate::coordinator::TrackEntry;
use crate::Timestamp;

/// Make room for `incoming_size` bytes by evicting old frames from every track.
///
/// Each track's share of the incoming data is proportional to its share of the
/// total occupancy, which approximates max-min fairness across tracks of very
/// different bitrate without any per-track priority policy. Every track is
/// asked to evict even after one fails; the overall result is the AND of the
/// per-track results.
pub(crate) fn evict_proportionally(entries: &[TrackEntry], media_time: Timestamp, incoming_size: usize) -> bool {
	let total: u64 = entries.iter().map(|entry| entry.stream.buffered_size() as u64).sum();

	tracing::trace!(?media_time, incoming_size, total_buffered = total, "evicting coded frames");

	if total == 0 {
		return true;
	}

	let mut success = true;
	for entry in entries {
		let occupancy = entry.stream.buffered_size() as u64;
		if occupancy == 0 {
			continue;
		}

		let target = incoming_size as u64 * occupancy / total;
		success &= entry.stream.evict_coded_frames(media_time, target as usize);
	}

	tracing::trace!(success, "eviction finished");
	success
}
