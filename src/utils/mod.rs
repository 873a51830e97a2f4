//! Small shared utilities.

pub mod cancel;
