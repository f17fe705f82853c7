pub mod card;
pub mod config;
pub mod draft;
pub mod edit;
pub mod error;
pub mod io;
pub mod lenient;
pub mod paths;
pub mod persona;
pub mod rollup;
pub mod types;

pub use card::MemoryCard;
pub use error::{CardError, Result};
pub use rollup::rollup;
