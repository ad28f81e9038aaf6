//! Support code for the `quill-preview` binary.

pub mod args;
pub mod demo;

pub use args::{ArgsError, PreviewArgs, USAGE};
pub use demo::{DocumentTitle, ReferenceNumber, register_demo_injectors};
