//! TypeScript AST builders for imports, types, classes and functions.
//!
//! Each node implements [`Renderable`](connectgen_codegen::Renderable) and
//! is printed through a [`CodeBuilder`](connectgen_codegen::CodeBuilder).

mod class;
mod consts;
mod fns;
mod imports;
mod interface;
mod objects;

pub use class::{Class, ClassField, Method};
pub use consts::Const;
pub use fns::{Fn, Param};
pub use imports::Import;
pub use interface::{Interface, InterfaceField};
pub use objects::JsObject;
