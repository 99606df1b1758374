pub mod transitions;
pub mod types;

pub use transitions::{allowed_actions, transition, InvalidTransition};
pub use types::*;
