//! SQL script handling
//!
//! Only statement splitting lives here; statements are passed on as opaque
//! text.

pub mod splitter;

pub use splitter::{StatementSplitter, parse_statements};
