#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::cast_possible_truncation
)]
mod event;
mod face;
mod photo;
mod raw;
mod timeline;

pub use event::*;
pub use face::*;
pub use photo::*;
pub use raw::*;
pub use timeline::*;
