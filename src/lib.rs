#![warn(clippy::all, clippy::pedantic)]

pub mod cli;
pub mod constants;
pub mod error;
pub mod package;
pub mod plan;
pub mod utils;
pub mod walk;

mod test_utils;
