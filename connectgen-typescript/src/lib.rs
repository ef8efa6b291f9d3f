//! TypeScript client registry generation for connectgen.
//!
//! Turns the `_pb.ts` files emitted by `protoc-gen-es` into a `clients.ts`
//! module that lazily builds one Connect client per service:
//!
//! ```ignore
//! use connectgen_core::GeneratedFile;
//! use connectgen_typescript::{ClientsTs, RegistryModule, extract_services};
//!
//! let extraction = extract_services(out_dir, &files);
//! ClientsTs::new(RegistryModule::new(&extraction.services)).write(out_dir)?;
//! ```

mod code_file;
mod extract;
mod format;
mod registry;

pub mod ast;
pub mod files;

pub use code_file::CodeFile;
pub use extract::{
    DeclMismatch, Extraction, ServiceDescriptor, SkipReason, SkippedFile, extract_services,
    parse_service_decl,
};
pub use files::{CLIENTS_FILE, ClientsTs};
pub use format::Formatter;
pub use registry::{
    CLIENTS_INTERFACE, FACTORY_CLASS, GET_FN, REGISTER_FN, RegistryMember, RegistryModule,
    SHARED_MAP_KEY,
};
