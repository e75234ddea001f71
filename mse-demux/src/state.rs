/// Lifecycle of a source relative to its first initialization segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum State {
	Uninitialized,
	PendingConfig,
	PendingInit,
	Initialized,
}

/// Guards the ordering of appends, segment boundaries and shutdown.
///
/// Out-of-order calls are programmer errors and panic; they are never
/// surfaced as recoverable failures.
#[derive(Debug)]
pub(crate) struct SegmentState {
	state: State,
	parsing_segment: bool,
	in_append: bool,
	shut_down: bool,
}

impl SegmentState {
	pub(crate) fn new() -> Self {
		Self {
			state: State::Uninitialized,
			parsing_segment: false,
			in_append: false,
			shut_down: false,
		}
	}

	pub(crate) fn state(&self) -> State {
		self.state
	}

	pub(crate) fn parsing_segment(&self) -> bool {
		self.parsing_segment
	}

	pub(crate) fn in_append(&self) -> bool {
		self.in_append
	}

	pub(crate) fn assert_open(&self) {
		assert!(!self.shut_down, "operation after shutdown");
	}

	pub(crate) fn init(&mut self) {
		self.assert_open();
		assert_eq!(self.state, State::Uninitialized, "init called twice");
		self.state = State::PendingConfig;
	}

	/// A configuration segment passed validation.
	pub(crate) fn configs_accepted(&mut self) {
		self.assert_open();
		assert!(self.state >= State::PendingConfig, "configs before init");
		if self.state == State::PendingConfig {
			self.state = State::PendingInit;
		}
	}

	pub(crate) fn init_done(&mut self) {
		self.assert_open();
		assert_eq!(self.state, State::PendingInit, "init-done out of order");
		self.state = State::Initialized;
	}

	pub(crate) fn begin_segment(&mut self) {
		self.assert_open();
		assert_eq!(self.state, State::Initialized, "media segment before init completed");
		assert!(!self.parsing_segment, "segment start while already in a segment");
		self.parsing_segment = true;
	}

	pub(crate) fn end_segment(&mut self) {
		self.assert_open();
		assert_eq!(self.state, State::Initialized, "segment end before init completed");
		assert!(self.parsing_segment, "segment end outside a segment");
		self.parsing_segment = false;
	}

	pub(crate) fn begin_append(&mut self) {
		self.assert_open();
		assert!(!self.in_append, "re-entrant append");
		self.in_append = true;
	}

	pub(crate) fn end_append(&mut self) {
		assert!(self.in_append, "append end without begin");
		self.in_append = false;
	}

	pub(crate) fn reset(&mut self) {
		self.assert_open();
		assert_ne!(self.state, State::Uninitialized, "reset before init");
		assert!(!self.in_append, "reset during append");
		self.parsing_segment = false;
	}

	/// Terminal; every later call panics.
	pub(crate) fn shutdown(&mut self) {
		self.assert_open();
		self.shut_down = true;
	}
}
