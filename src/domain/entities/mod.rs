//! Domain entities - Core chat objects with no I/O

pub mod event;
pub mod markup;
pub mod message;
pub mod session;
pub mod timeline;

pub use event::{ClientEvent, ServerEvent};
pub use markup::{decode_payload, encode_payload, RenderableMarkup};
pub use message::{ChatMessage, EMOJIS};
pub use session::Session;
pub use timeline::{ConnectionState, PresenceChange, RenderedMessage, TimelineEntry};
