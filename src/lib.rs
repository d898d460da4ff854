pub mod cli;
pub mod common;
pub mod handler;
pub mod pipes;
pub mod registry;
pub mod util;

pub use pipes::Pipes;
pub use registry::Registry;
pub use util::{Parsed, PipableCliUtil};
