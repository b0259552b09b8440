pub mod events;
pub mod message;
pub mod model;

pub use events::RelayEvent;
pub use message::{AskRequest, Role, Turn};
pub use model::ModelInfo;
