pub mod paged;

pub use paged::*;
