use crate::Timestamp;

/// An ordered set of non-overlapping `[start, end)` intervals.
///
/// Intervals are kept sorted ascending and coalesced: two intervals separated
/// by a zero gap are merged into one.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TimeRanges {
	intervals: Vec<(Timestamp, Timestamp)>,
}

impl TimeRanges {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.intervals.len()
	}

	pub fn is_empty(&self) -> bool {
		self.intervals.is_empty()
	}

	/// Add `[start, end)`, merging with any interval it overlaps or touches.
	///
	/// An empty interval is a no-op. Panics if `start > end`.
	pub fn add(&mut self, start: Timestamp, end: Timestamp) {
		assert!(start <= end, "interval start after end");
		if start == end {
			return;
		}

		let mut index = 0;
		while index < self.intervals.len() && self.intervals[index].1 < start {
			index += 1;
		}

		let mut merged = (start, end);
		let mut until = index;
		while until < self.intervals.len() && self.intervals[until].0 <= end {
			merged.0 = merged.0.min(self.intervals[until].0);
			merged.1 = merged.1.max(self.intervals[until].1);
			until += 1;
		}

		self.intervals.splice(index..until, [merged]);
	}

	pub fn iter(&self) -> impl Iterator<Item = (Timestamp, Timestamp)> + '_ {
		self.intervals.iter().copied()
	}

	pub fn first(&self) -> Option<(Timestamp, Timestamp)> {
		self.intervals.first().copied()
	}

	pub fn last(&self) -> Option<(Timestamp, Timestamp)> {
		self.intervals.last().copied()
	}

	pub fn last_end(&self) -> Option<Timestamp> {
		self.last().map(|(_, end)| end)
	}

	pub fn contains(&self, time: Timestamp) -> bool {
		self.intervals.iter().any(|&(start, end)| start <= time && time < end)
	}

	/// The set-intersection of two range sets.
	pub fn intersection(&self, other: &Self) -> Self {
		let mut intervals = Vec::new();
		let (mut a, mut b) = (0, 0);

		while a < self.intervals.len() && b < other.intervals.len() {
			let start = self.intervals[a].0.max(other.intervals[b].0);
			let end = self.intervals[a].1.min(other.intervals[b].1);
			if start < end {
				intervals.push((start, end));
			}

			if self.intervals[a].1 < other.intervals[b].1 {
				a += 1;
			} else {
				b += 1;
			}
		}

		Self { intervals }
	}
}

impl std::fmt::Debug for TimeRanges {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		let mut list = f.debug_list();
		for (start, end) in self.iter() {
			list.entry(&format_args!("[{:?}, {:?})", start, end));
		}
		list.finish()
	}
}

/// The jointly-buffered extent across every active track.
///
/// Seeds `[0, highest_end)` and folds each track's ranges into the running
/// intersection. When `ended` is set, a track's trailing gap does not block
/// playability: its last interval is extended to `highest_end` first.
pub fn intersect_ranges(active: &[TimeRanges], ended: bool) -> TimeRanges {
	if active.is_empty() {
		return TimeRanges::new();
	}

	let mut highest_end = Timestamp::default();
	for ranges in active {
		if let Some(end) = ranges.last_end() {
			highest_end = highest_end.max(end);
		}
	}

	let mut intersection = TimeRanges::new();
	intersection.add(Timestamp::default(), highest_end);

	for ranges in active {
		let mut source = ranges.clone();
		if ended {
			if let Some((start, _)) = source.last() {
				source.add(start, highest_end);
			}
		}

		intersection = intersection.intersection(&source);
	}

	intersection
}
