//! Running `buf generate` for connectgen.
//!
//! [`resolve_template`] picks the generation template, [`Runner`] writes it
//! to a transient file, invokes the compiler and collects the `_pb.ts`
//! files it produced.

mod error;
mod runner;
mod shell;
mod template;

pub use error::CompilerError;
pub use runner::{CompiledFile, DEFAULT_COMPILER, GENERATED_SUFFIX, Run, Runner};
pub use template::{TEMPLATE_NAMES, Template, TemplateSource, default_template, resolve_template};
