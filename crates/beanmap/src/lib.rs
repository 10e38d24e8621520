//! # beanmap
//!
//! Compile-time JSON codec generation for Java bean types.
//!
//! beanmap walks a bean type graph described by declaration metadata and
//! produces, for every reachable type, a serializer and deserializer in the
//! shape of the gwt-jackson runtime:
//! - configured codecs for scalars, collections, maps and common value types
//! - built-in codecs for enums, 1-D and 2-D arrays
//! - generated bean codecs with creator binding, identity, back references
//!   and polymorphic subtype wiring
//!
//! ## Generating a Mapper
//!
//! ```
//! use beanmap::prelude::*;
//! use beanmap::{ClassKind, FieldDescriptor, MapperKind};
//!
//! let types = TypeTable::new()
//!     .with(
//!         ClassDescriptor::new("com.example", "Person")
//!             .with_field(FieldDescriptor::new("name", TypeRef::class("java.lang.String"))),
//!     )
//!     .with(
//!         ClassDescriptor::new("com.example", "PersonWriter")
//!             .with_kind(ClassKind::Interface)
//!             .with_interface(TypeRef::parameterized(
//!                 MapperKind::WRITER_INTERFACE,
//!                 vec![TypeRef::class("com.example.Person")],
//!             )),
//!     );
//! let config = Configuration::with_defaults();
//! let mut sink = MemorySink::new();
//!
//! let reports = generate_mappers(&types, &config, &mut sink, &["com.example.PersonWriter"]);
//!
//! assert!(reports.iter().all(MapperReport::is_ok));
//! let sources: Vec<String> = sink.plans().iter().map(beanmap::render_artifact).collect();
//! assert!(sources.iter().any(|s| s.contains("class PersonBeanJsonSerializerImpl")));
//! ```
//!
//! ## Crate Structure
//!
//! This is a facade crate that re-exports from:
//! - [`beanmap_core`] - Type model, configuration and errors
//! - [`beanmap_codegen`] - Codec resolution, artifact plans and Java rendering

// Re-export core types
pub use beanmap_core::{
    Access, ClassDescriptor, ClassKind, CodecFactory, CodegenError, CodegenResult, Configuration,
    ConstructorDescriptor, Diagnostic, Diagnostics, FieldDescriptor, InstanceCreation, Level,
    MethodDescriptor, ParamDescriptor, ParameterRole, PrimitiveType, PropertyDirectives,
    TypeDirectives, TypeParamDecl, TypeRef, TypeSource, TypeTable,
};

// Re-export the generator
pub use beanmap_codegen::{
    ArtifactName, ArtifactPlan, ArtifactSink, CodecDescriptor, Direction, Generator,
    JavaSourceSink, MapperGenerator, MapperKind, MapperReport, MemorySink, TypeOracle,
    generate_mappers, render_artifact,
};

// Re-export common dependencies that front-ends need
pub use serde_json;
pub use tracing;

/// Prelude module for convenient imports.
///
/// Use `use beanmap::prelude::*;` to import commonly used types.
pub mod prelude {
    pub use crate::{
        ArtifactSink, ClassDescriptor, CodegenError, CodegenResult, Configuration, Diagnostics,
        JavaSourceSink, MapperGenerator, MapperReport, MemorySink, TypeRef, TypeSource, TypeTable,
        generate_mappers,
    };
}
