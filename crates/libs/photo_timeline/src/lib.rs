#![deny(clippy::unwrap_used)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::module_name_repetitions
)]

pub mod assembler;
pub mod clock;
pub mod clustering;
pub mod collaborators;
mod error;
pub mod grouping;
pub mod normalizer;
pub mod sorting;

pub use error::*;
