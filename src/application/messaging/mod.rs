//! Message handling - Input parsing, event dispatch, typing indicators

pub mod dispatcher;
pub mod parser;
pub mod typing;

pub use dispatcher::ChatClient;
pub use parser::{Input, InputParser};
pub use typing::{TypingThrottle, TypingTracker};
