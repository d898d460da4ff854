pub mod ls;
pub mod mv;
pub mod rm;
pub mod zip;
