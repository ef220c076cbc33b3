//! CLI commands

pub mod completion;
pub mod parse;
pub mod schema;
pub mod suggest;
pub mod tokens;
pub mod validate;
