//! Generic utility primitives with zero domain knowledge.
//!
//! - `command` - Raw process execution helpers
//! - `parser` - Text extraction via regex primitives
//! - `shell` - Shell escaping and quoting

pub mod command;
pub mod parser;
pub mod shell;
