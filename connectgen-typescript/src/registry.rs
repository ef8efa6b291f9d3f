//! In-memory model of the client registry module.
//!
//! [`RegistryModule`] decides *which* imports and members exist; the AST
//! nodes it produces decide how they are printed.

use connectgen_codegen::CodeFragment;
use indexmap::IndexMap;

use crate::{
    ast::{Class, ClassField, Const, Fn, Import, Interface, JsObject, Method, Param},
    extract::ServiceDescriptor,
};

/// Package providing the per-request event type.
pub const CONTEXT_MODULE: &str = "@builder.io/qwik-city";
/// Package providing the RPC client constructor.
pub const CLIENT_MODULE: &str = "@connectrpc/connect";
/// Name of the registry mapping type.
pub const CLIENTS_INTERFACE: &str = "GrpcClients";
/// Name of the lazy client factory class.
pub const FACTORY_CLASS: &str = "ClientFactory";
/// Key under which the factory is stored in `ev.sharedMap`.
pub const SHARED_MAP_KEY: &str = "grpc-clients";
/// Exported function storing a factory for the current request.
pub const REGISTER_FN: &str = "registerGrpcClients";
/// Exported function reading the registry for the current request.
pub const GET_FN: &str = "grpc";

const SERVICES_TABLE: &str = "services";
const GET_OR_CREATE: &str = "getOrCreate";

/// One registry entry: a client key and the descriptor it is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryMember {
    pub key: String,
    pub service_identifier: String,
    pub import_path: String,
}

impl RegistryMember {
    fn client_type(&self) -> String {
        format!("Client<typeof {}>", self.service_identifier)
    }
}

/// The registry module for an ordered list of services.
#[derive(Debug, Clone, Default)]
pub struct RegistryModule {
    members: IndexMap<String, RegistryMember>,
}

impl RegistryModule {
    /// Build the module; members keep the order of `services`.
    ///
    /// Keys are expected to be unique already. A repeated key keeps its first
    /// position and the later service replaces nothing.
    pub fn new<'a>(services: impl IntoIterator<Item = &'a ServiceDescriptor>) -> Self {
        let mut members = IndexMap::new();
        for service in services {
            members
                .entry(service.instance_name.clone())
                .or_insert_with(|| RegistryMember {
                    key: service.instance_name.clone(),
                    service_identifier: service.service_identifier.clone(),
                    import_path: service.import_path.clone(),
                });
        }
        Self { members }
    }

    pub fn members(&self) -> impl Iterator<Item = &RegistryMember> {
        self.members.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Fixed library imports followed by one import per service.
    pub fn imports(&self) -> Vec<Import> {
        let mut imports = vec![
            Import::new(CONTEXT_MODULE).named("RequestEventBase"),
            Import::new(CLIENT_MODULE)
                .named("createClient")
                .named("Transport")
                .named("Client"),
        ];
        imports.extend(
            self.members()
                .map(|m| Import::new(&m.import_path).named(&m.service_identifier)),
        );
        imports
    }

    /// `interface GrpcClients { foo: Client<typeof FooService>; ... }`
    pub fn clients_interface(&self) -> Interface {
        self.members()
            .fold(Interface::new(CLIENTS_INTERFACE), |iface, m| {
                iface.field(&m.key, m.client_type())
            })
    }

    /// Descriptor table consulted by `getOrCreate`.
    pub fn services_table(&self) -> Const {
        let table = self
            .members()
            .fold(JsObject::new(), |obj, m| obj.raw(&m.key, &m.service_identifier));
        Const::object(SERVICES_TABLE, table).private().as_const()
    }

    /// The factory: a transport, a cache of built clients, an explicit
    /// memoizing `getOrCreate(key)` and one getter per service.
    pub fn factory(&self) -> Class {
        let get_or_create = Method::new(GET_OR_CREATE)
            .generics(format!("K extends keyof {}", CLIENTS_INTERFACE))
            .param(Param::new("key", "K"))
            .returns(format!("{}[K]", CLIENTS_INTERFACE))
            .body_line("const cached = this.clients[key];")
            .body_fragment(CodeFragment::braced(
                "if (cached) {",
                vec![CodeFragment::line(format!(
                    "return cached as {}[K];",
                    CLIENTS_INTERFACE
                ))],
            ))
            .body_line(format!(
                "const client = createClient({}[key], this.transport) as unknown as {}[K];",
                SERVICES_TABLE, CLIENTS_INTERFACE
            ))
            .body_line("this.clients[key] = client;")
            .body_line("return client;");

        let class = Class::new(FACTORY_CLASS)
            .private()
            .field(
                ClassField::new("clients", format!("Partial<{}>", CLIENTS_INTERFACE))
                    .private()
                    .init("{}"),
            )
            .field(ClassField::new("transport", "Transport").private())
            .constructor(
                Method::constructor()
                    .param(Param::new("transport", "Transport"))
                    .body_line("this.transport = transport;"),
            )
            .method(get_or_create);

        self.members().fold(class, |class, m| {
            class.method(
                Method::getter(&m.key)
                    .returns(format!("{}[\"{}\"]", CLIENTS_INTERFACE, m.key))
                    .body_line(format!("return this.{}(\"{}\");", GET_OR_CREATE, m.key)),
            )
        })
    }

    /// `registerGrpcClients(transport, ev)`: store a fresh factory for this request.
    pub fn register_fn(&self) -> Fn {
        Fn::new(REGISTER_FN)
            .param(Param::new("transport", "Transport"))
            .param(Param::new("ev", "RequestEventBase"))
            .body_line(format!(
                "ev.sharedMap.set(\"{}\", new {}(transport));",
                SHARED_MAP_KEY, FACTORY_CLASS
            ))
    }

    /// `grpc(ev)`: read the factory back, typed as the registry mapping.
    pub fn get_fn(&self) -> Fn {
        Fn::new(GET_FN)
            .param(Param::new("ev", "RequestEventBase"))
            .returns(CLIENTS_INTERFACE)
            .body_line(format!("return ev.sharedMap.get(\"{}\");", SHARED_MAP_KEY))
    }
}
