#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod assignment;
mod deduplication;
mod error;
mod exercise;
mod name;
mod service;
mod similarity;

pub use assignment::*;
pub use deduplication::*;
pub use error::*;
pub use exercise::*;
pub use name::*;
pub use service::*;
pub use similarity::*;
