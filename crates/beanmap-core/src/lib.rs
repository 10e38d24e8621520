//! beanmap-core - Type model, configuration and errors
//!
//! This crate provides the foundational types shared by the generator:
//! - [`TypeRef`] for referencing types as written in declarations
//! - [`ClassDescriptor`] and the [`TypeSource`] trait for declaration metadata
//! - directive types for the annotation layer (renames, formats, identity, polymorphism)
//! - [`Configuration`] for codec registrations, mixins and subtype filters
//! - [`CodegenError`] and [`Diagnostics`] for error handling and reporting

mod config;
mod descriptor;
mod diagnostics;
mod directive;
mod error;
mod types;

pub use config::{CodecFactory, Configuration, InstanceCreation, ParameterRole};
pub use descriptor::{
    ClassDescriptor, ClassKind, ConstructorDescriptor, FieldDescriptor, MethodDescriptor,
    ParamDescriptor, TypeParamDecl, TypeSource, TypeTable,
};
pub use diagnostics::{Diagnostic, Diagnostics, Level};
pub use directive::{
    Access, AutoDetect, CreatorMode, FormatDirective, IdGenerator, IdentityDirective, Include,
    PropertyDirectives, Shape, SubtypeDirective, TypeDirectives, TypeIdKind, TypeInclusion,
    TypeInfoDirective, Visibility,
};
pub use error::{CodegenError, CodegenResult};
pub use types::{ENUM, OBJECT, PrimitiveType, TypeBindings, TypeRef};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ClassDescriptor, CodecFactory, CodegenError, CodegenResult, Configuration, Diagnostics,
        TypeRef, TypeSource, TypeTable,
    };
}
