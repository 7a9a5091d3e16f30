mod client;
mod parser;

pub use client::{build_subscribe_message, run_connector};
pub use parser::{parse_message, ParsedMessage};
