#![warn(clippy::all, clippy::pedantic, clippy::cargo)]
#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::multiple_crate_versions)]

mod error;

pub mod connections;
pub mod coverage;
pub mod matrix;
pub mod model;
pub mod product;
pub mod sort;

pub use error::{Error, Result};
pub use matrix::Matrix;
