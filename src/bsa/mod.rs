pub mod error;
pub mod parser;
pub mod types;

pub use parser::BsaReader;
pub use types::{BsaEntry, BsaHash};
