//! Streaming client for the relay's event stream.

pub mod stream;
pub mod view;

pub use stream::{CancelHandle, ChatClient, ClientError, Outcome, Reply};
pub use view::{ChatView, TerminalView};
