//! Multi-track buffering and coded-frame admission for MSE-style demuxing.
//!
//! A [SourceBuffer] accepts appended encoded media segments, validates and
//! maps them onto per-track buffer streams, keeps memory bounded through
//! proportional eviction, and reports the jointly-buffered time ranges across
//! tracks. The byte-stream parser, the frame validation engine and the
//! per-track storage are external collaborators behind the [StreamParser],
//! [FrameProcessor] and [TrackStream] traits.

mod budget;
mod catalog;
mod coordinator;
mod error;
mod frame;
mod ingest;
mod parser;
mod processor;
mod ranges;
mod source;
mod state;
mod stream;
mod timestamp;

#[cfg(test)]
mod fixture;

pub use catalog::*;
pub use coordinator::*;
pub use error::*;
pub use frame::*;
pub use ingest::*;
pub use parser::*;
pub use processor::*;
pub use ranges::*;
pub use source::*;
pub use state::*;
pub use stream::*;
pub use timestamp::*;
