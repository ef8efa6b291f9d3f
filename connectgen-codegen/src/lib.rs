//! Code generation building blocks for connectgen.
//!
//! - [`builder`] - Indentation-aware code building (CodeBuilder, CodeFragment, etc.)
//!
//! Language crates describe their syntax as [`Renderable`] nodes and print
//! them through a [`CodeBuilder`].

pub mod builder;

pub use builder::{CodeBuilder, CodeFragment, Indent, Renderable};
