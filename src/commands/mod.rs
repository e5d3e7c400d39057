//! Command implementations for the gdeb CLI

pub mod build;
pub mod completions;
pub mod helpers;
pub mod restore;
pub mod tarball;
pub mod version;

pub use helpers::GlobalOptions;
