//! clients.ts: the per-request RPC client registry.

use std::path::{Path, PathBuf};

use connectgen_core::GeneratedFile;

use super::GENERATED_HEADER;
use crate::{code_file::CodeFile, registry::RegistryModule};

/// File name of the registry module inside the output directory.
pub const CLIENTS_FILE: &str = "clients.ts";

/// The registry module written next to the generated `_pb.ts` files.
pub struct ClientsTs {
    module: RegistryModule,
}

impl ClientsTs {
    pub fn new(module: RegistryModule) -> Self {
        Self { module }
    }

    pub fn module(&self) -> &RegistryModule {
        &self.module
    }
}

impl GeneratedFile for ClientsTs {
    fn path(&self, base: &Path) -> PathBuf {
        base.join(CLIENTS_FILE)
    }

    fn render(&self) -> String {
        let module = &self.module;
        CodeFile::new()
            .header(GENERATED_HEADER)
            .imports(module.imports())
            .add(module.clients_interface())
            .add(module.services_table())
            .add(module.factory())
            .add(module.register_fn())
            .add(module.get_fn())
            .render()
    }
}
