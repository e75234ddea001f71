use std::fmt;

use derive_more::{Add, AddAssign, Sub, SubAssign};

/// A presentation time, measured in microseconds from the start of the stream.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash, Add, AddAssign, Sub, SubAssign)]
pub struct Timestamp {
	micros: u64,
}

impl Timestamp {
	pub const MAX: Self = Self { micros: u64::MAX };

	pub fn from_micros(micros: u64) -> Self {
		Self { micros }
	}

	pub fn from_millis(millis: u64) -> Self {
		Self { micros: millis * 1_000 }
	}

	pub fn from_seconds(seconds: u64) -> Self {
		Self {
			micros: seconds * 1_000_000,
		}
	}

	pub fn from_units(value: u64, base: u64) -> Self {
		Self {
			micros: (value * 1_000_000) / base,
		}
	}

	pub fn as_micros(&self) -> u64 {
		self.micros
	}

	pub fn as_millis(&self) -> u64 {
		self.micros / 1_000
	}

	pub fn as_seconds(&self) -> u64 {
		self.micros / 1_000_000
	}

	pub fn saturating_sub(self, other: Self) -> Self {
		Self {
			micros: self.micros.saturating_sub(other.micros),
		}
	}
}

impl fmt::Debug for Timestamp {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		if self.micros == u64::MAX {
			return write!(f, "max");
		}

		if self.micros == 0 {
			return write!(f, "0");
		}

		let hours = self.micros / 3_600_000_000;
		let minutes = (self.micros % 3_600_000_000) / 60_000_000;
		let seconds = (self.micros % 60_000_000) / 1_000_000;
		let millis = (self.micros % 1_000_000) / 1_000;
		let micros = self.micros % 1_000;

		let mut parts = Vec::new();
		if hours > 0 {
			parts.push(format!("{}h", hours));
		}
		if minutes > 0 {
			parts.push(format!("{:02}m", minutes));
		}
		if seconds > 0 {
			parts.push(format!("{:02}s", seconds));
		}
		if millis > 0 {
			parts.push(format!("{:03}ms", millis));
		}
		if micros > 0 {
			parts.push(format!("{:03}us", micros));
		}

		write!(f, "{}", parts.join(" "))
	}
}

/// The signed offset applied to incoming presentation timestamps during an append.
///
/// Negative offsets are legal; a bytestream may start later than the position it
/// is appended at.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Add, AddAssign, Sub, SubAssign)]
pub struct TimestampOffset {
	micros: i64,
}

impl TimestampOffset {
	pub fn from_micros(micros: i64) -> Self {
		Self { micros }
	}

	pub fn from_millis(millis: i64) -> Self {
		Self { micros: millis * 1_000 }
	}

	pub fn as_micros(&self) -> i64 {
		self.micros
	}
}

impl std::ops::AddAssign<Timestamp> for TimestampOffset {
	fn add_assign(&mut self, rhs: Timestamp) {
		self.micros += rhs.as_micros() as i64;
	}
}

impl fmt::Debug for TimestampOffset {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}us", self.micros)
	}
}
