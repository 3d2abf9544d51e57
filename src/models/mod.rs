//! Records exchanged with the clubs backend.
//!
//! The backend speaks camelCase JSON that sometimes omits fields, so every
//! record defaults missing values instead of failing to decode.

mod activity;
mod club;
mod contact;
mod event;
mod user;

pub use activity::*;
pub use club::*;
pub use contact::*;
pub use event::*;
pub use user::*;
