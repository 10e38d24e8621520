//! Type references
//!
//! A [`TypeRef`] names a type the way it appears in a declaration: a primitive,
//! a (possibly parameterized) class, a raw class, an array, a generic type
//! parameter or a wildcard. Type references are plain values compared
//! structurally; the declarations they point at live in a
//! [`TypeSource`](crate::TypeSource).
//!
//! # JSON shape
//!
//! ```json
//! { "kind": "class", "name": "java.util.Map",
//!   "args": [ { "kind": "class", "name": "java.lang.String" },
//!             { "kind": "type_parameter", "declaring": "com.example.Box", "name": "T" } ] }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualified name of the root of every class hierarchy.
pub const OBJECT: &str = "java.lang.Object";

/// Qualified name of the common supertype of all enums.
pub const ENUM: &str = "java.lang.Enum";

/// Primitive types of the target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
}

impl PrimitiveType {
    /// Source keyword (`int`, `boolean`, ...).
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::Char => "char",
        }
    }

    /// Qualified name of the boxed counterpart.
    pub fn boxed_name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "java.lang.Boolean",
            PrimitiveType::Byte => "java.lang.Byte",
            PrimitiveType::Short => "java.lang.Short",
            PrimitiveType::Int => "java.lang.Integer",
            PrimitiveType::Long => "java.lang.Long",
            PrimitiveType::Float => "java.lang.Float",
            PrimitiveType::Double => "java.lang.Double",
            PrimitiveType::Char => "java.lang.Character",
        }
    }

    /// Zero value literal used to initialise unset slots.
    pub fn default_value(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "false",
            PrimitiveType::Char => "'\\u0000'",
            PrimitiveType::Long => "0l",
            PrimitiveType::Float => "0f",
            PrimitiveType::Double => "0d",
            _ => "0",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "boolean" => PrimitiveType::Boolean,
            "byte" => PrimitiveType::Byte,
            "short" => PrimitiveType::Short,
            "int" => PrimitiveType::Int,
            "long" => PrimitiveType::Long,
            "float" => PrimitiveType::Float,
            "double" => PrimitiveType::Double,
            "char" => PrimitiveType::Char,
            _ => return None,
        })
    }
}

/// A reference to a type as written in a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    /// A primitive such as `int`.
    Primitive { name: PrimitiveType },

    /// A class or interface, parameterized when `args` is non-empty.
    ///
    /// A generic declaration referenced without arguments is its generic form.
    Class {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<TypeRef>,
    },

    /// The raw (erased) form of a generic class.
    Raw { name: String },

    /// An array of `rank` dimensions over a non-array `leaf`.
    Array { leaf: Box<TypeRef>, rank: u8 },

    /// A generic type parameter declared by `declaring`.
    TypeParameter { declaring: String, name: String },

    /// A wildcard `? extends bound`.
    Wildcard { bound: Box<TypeRef> },
}

impl TypeRef {
    pub fn primitive(primitive: PrimitiveType) -> Self {
        TypeRef::Primitive { name: primitive }
    }

    pub fn class(name: impl Into<String>) -> Self {
        TypeRef::Class {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn parameterized(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef::Class {
            name: name.into(),
            args,
        }
    }

    pub fn raw(name: impl Into<String>) -> Self {
        TypeRef::Raw { name: name.into() }
    }

    /// Build an array type, folding nested arrays into a single rank.
    pub fn array(component: TypeRef, rank: u8) -> Self {
        match component {
            TypeRef::Array { leaf, rank: inner } => TypeRef::Array {
                leaf,
                rank: inner.saturating_add(rank),
            },
            leaf => TypeRef::Array {
                leaf: Box::new(leaf),
                rank,
            },
        }
    }

    pub fn type_parameter(declaring: impl Into<String>, name: impl Into<String>) -> Self {
        TypeRef::TypeParameter {
            declaring: declaring.into(),
            name: name.into(),
        }
    }

    pub fn wildcard(bound: TypeRef) -> Self {
        TypeRef::Wildcard {
            bound: Box::new(bound),
        }
    }

    pub fn object() -> Self {
        TypeRef::class(OBJECT)
    }

    /// Qualified name of the referenced class, if this names one.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            TypeRef::Class { name, .. } | TypeRef::Raw { name } => Some(name),
            _ => None,
        }
    }

    /// Type arguments of a parameterized class reference.
    pub fn type_args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Class { args, .. } => args,
            _ => &[],
        }
    }

    pub fn is_parameterized(&self) -> bool {
        !self.type_args().is_empty()
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeRef::Primitive { .. })
    }

    /// Erased name used for registry lookups: `int`, `java.util.List`, `int[][]`.
    pub fn erased_name(&self) -> String {
        match self {
            TypeRef::Primitive { name } => name.name().to_string(),
            TypeRef::Class { name, .. } | TypeRef::Raw { name } => name.clone(),
            TypeRef::Array { leaf, rank } => {
                let mut erased = leaf.erased_name();
                for _ in 0..*rank {
                    erased.push_str("[]");
                }
                erased
            }
            TypeRef::TypeParameter { name, .. } => name.clone(),
            TypeRef::Wildcard { bound } => bound.erased_name(),
        }
    }

    /// Replace wildcards by their bound and raw references by their base class.
    pub fn unwrap_wildcard_and_raw(&self) -> TypeRef {
        match self {
            TypeRef::Wildcard { bound } => bound.unwrap_wildcard_and_raw(),
            TypeRef::Raw { name } => TypeRef::class(name.clone()),
            other => other.clone(),
        }
    }

    /// Strip type arguments, keeping the base declaration.
    pub fn erasure(&self) -> TypeRef {
        match self {
            TypeRef::Class { name, .. } | TypeRef::Raw { name } => TypeRef::class(name.clone()),
            TypeRef::Array { leaf, rank } => TypeRef::Array {
                leaf: Box::new(leaf.erasure()),
                rank: *rank,
            },
            TypeRef::Wildcard { bound } => bound.erasure(),
            other => other.clone(),
        }
    }

    /// Apply `bindings` to every type parameter reachable from this reference.
    pub fn substitute(&self, bindings: &TypeBindings) -> TypeRef {
        if bindings.is_empty() {
            return self.clone();
        }
        match self {
            TypeRef::TypeParameter { declaring, name } => bindings
                .get(declaring, name)
                .cloned()
                .unwrap_or_else(|| self.clone()),
            TypeRef::Class { name, args } => TypeRef::Class {
                name: name.clone(),
                args: args.iter().map(|arg| arg.substitute(bindings)).collect(),
            },
            TypeRef::Array { leaf, rank } => TypeRef::array(leaf.substitute(bindings), *rank),
            TypeRef::Wildcard { bound } => TypeRef::wildcard(bound.substitute(bindings)),
            other => other.clone(),
        }
    }

    /// Boxed form for primitives, identity otherwise.
    pub fn boxed(&self) -> TypeRef {
        match self {
            TypeRef::Primitive { name } => TypeRef::class(name.boxed_name()),
            other => other.clone(),
        }
    }

    /// Literal used to initialise a slot of this type before it is decoded.
    pub fn default_value(&self) -> &'static str {
        match self {
            TypeRef::Primitive { name } => name.default_value(),
            _ => "null",
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive { name } => f.write_str(name.name()),
            TypeRef::Class { name, args } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            TypeRef::Raw { name } => f.write_str(name),
            TypeRef::Array { leaf, rank } => {
                write!(f, "{leaf}")?;
                for _ in 0..*rank {
                    f.write_str("[]")?;
                }
                Ok(())
            }
            TypeRef::TypeParameter { name, .. } => f.write_str(name),
            TypeRef::Wildcard { bound } => write!(f, "? extends {bound}"),
        }
    }
}

/// Bindings of type parameters to actual type arguments.
///
/// Built when walking from a parameterized reference into the declaration it
/// names, e.g. `IntBox extends Box<Integer>` binds `Box.T` to `Integer`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeBindings {
    entries: Vec<(String, String, TypeRef)>,
}

impl TypeBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind each of `params` (declared by `declaring`) to the matching entry of `args`.
    ///
    /// Missing arguments leave the parameter unbound.
    pub fn for_reference<'p>(
        declaring: &str,
        params: impl IntoIterator<Item = &'p str>,
        args: &[TypeRef],
    ) -> Self {
        let entries = params
            .into_iter()
            .zip(args)
            .map(|(param, arg)| (declaring.to_string(), param.to_string(), arg.clone()))
            .collect();
        Self { entries }
    }

    pub fn bind(&mut self, declaring: impl Into<String>, name: impl Into<String>, ty: TypeRef) {
        self.entries.push((declaring.into(), name.into(), ty));
    }

    pub fn get(&self, declaring: &str, name: &str) -> Option<&TypeRef> {
        self.entries
            .iter()
            .find(|(d, n, _)| d == declaring && n == name)
            .map(|(_, _, ty)| ty)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
