//! beanmap-codegen - Codec resolution and Java source generation
//!
//! This crate turns declaration metadata into JSON codec sources:
//! - [`MapperGenerator`] for root mapper interfaces
//! - [`Generator`] for resolving codecs of arbitrary types and generating bean codecs
//! - [`TypeOracle`] for the per-run cache of bean metadata
//! - [`ArtifactPlan`] for the description of one generated source unit
//! - [`ArtifactSink`] for collecting or writing the generated units
//!
//! # Example
//!
//! ```
//! use beanmap_codegen::{MapperGenerator, MemorySink};
//! use beanmap_core::{ClassDescriptor, ClassKind, Configuration, FieldDescriptor, TypeRef, TypeTable};
//!
//! let types = TypeTable::new()
//!     .with(
//!         ClassDescriptor::new("com.example", "Person")
//!             .with_field(FieldDescriptor::new("name", TypeRef::class("java.lang.String"))),
//!     )
//!     .with(
//!         ClassDescriptor::new("com.example", "PersonMapper")
//!             .with_kind(ClassKind::Interface)
//!             .with_interface(TypeRef::parameterized(
//!                 "com.github.nmorel.gwtjackson.client.ObjectMapper",
//!                 vec![TypeRef::class("com.example.Person")],
//!             )),
//!     );
//! let config = Configuration::with_defaults();
//! let mut sink = MemorySink::new();
//!
//! let report = MapperGenerator::new(&types, &config, &mut sink).generate("com.example.PersonMapper");
//! assert!(report.is_ok());
//! assert!(sink.mapper("PersonMapperImpl").is_some());
//! ```

pub mod bean;
pub mod codec;
pub mod generator;
pub mod java;
pub mod jvm_types;
pub mod mapper;
pub mod naming;
pub mod oracle;
pub mod plan;
pub mod property;
pub mod sink;
pub mod timezone;

pub use codec::{CodecDescriptor, CodecInstance, Direction};
pub use generator::Generator;
pub use java::render_artifact;
pub use mapper::{MapperGenerator, MapperReport, generate_mappers};
pub use naming::{ArtifactName, RootMapper};
pub use oracle::{BeanId, GeneratedArtifactInfo, TypeOracle};
pub use plan::{ArtifactPlan, DeserializerPlan, MapperKind, MapperPlan, SerializerPlan};
pub use sink::{ArtifactSink, JavaSourceSink, MemorySink};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ArtifactName, ArtifactPlan, ArtifactSink, CodecDescriptor, Direction, Generator,
        JavaSourceSink, MapperGenerator, MapperReport, MemorySink, TypeOracle, generate_mappers,
    };
}
