//! Host services, которые strut потребляет, но не владеет ими
//!
//! - preview: anchor preview capability
//! - messages: on-screen сообщения
//! - input: cursor ray + mouse release

pub mod input;
pub mod messages;
pub mod preview;

pub use input::AimInput;
pub use messages::{ScreenMessage, ScreenMessageStyle, MESSAGE_DURATION};
pub use preview::{AnchorPreview, AnchorPreviewSink};
