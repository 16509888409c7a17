//! Schema value objects carried by planning actions

pub mod types;

pub use types::*;
