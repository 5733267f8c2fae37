//! Shared wire protocol between the relay server and the dashboard.
//!
//! Nothing in here performs I/O: the server encodes [`StreamEvent`]s onto its
//! response body, and clients push raw response bytes into a [`Reassembler`]
//! and mirror the growing text into a [`Conversation`].

pub mod conversation;
pub mod errors;
pub mod frame;
pub mod message;
pub mod reassembler;

pub use conversation::Conversation;
pub use errors::{FrameError, StreamError};
pub use frame::{decode_line, StreamEvent, DATA_PREFIX, DONE_SENTINEL};
pub use message::{ChatMessage, Message, Role};
pub use reassembler::{LineBuffer, ReassemblyState, Reassembler};
