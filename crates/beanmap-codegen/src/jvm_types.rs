//! Java source forms of type references.
//!
//! | Reference | [`java_type`] | [`boxed_type`] | [`raw_type`] |
//! |-----------|---------------|----------------|--------------|
//! | `int` | `int` | `java.lang.Integer` | `int` |
//! | `List<String>` | `java.util.List<java.lang.String>` | same | `java.util.List` |
//! | `Outer.Inner[]` | `com.example.Outer.Inner[]` | same | same |
//! | `T` | `T` | `T` | `java.lang.Object` |

use beanmap_core::{TypeParamDecl, TypeRef};

/// Type as written in a declaration.
pub fn java_type(ty: &TypeRef) -> String {
    ty.to_string()
}

/// Type usable as a generic argument: primitives are boxed, wildcards kept.
pub fn boxed_type(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Primitive { name } => name.boxed_name().to_string(),
        TypeRef::Class { name, args } if !args.is_empty() => {
            let args: Vec<String> = args.iter().map(boxed_type).collect();
            format!("{name}<{}>", args.join(", "))
        }
        other => other.to_string(),
    }
}

/// Erased type usable in a class literal or a cast.
pub fn raw_type(ty: &TypeRef) -> String {
    match ty {
        TypeRef::TypeParameter { .. } => beanmap_core::OBJECT.to_string(),
        TypeRef::Wildcard { bound } => raw_type(bound),
        other => other.erasure().to_string(),
    }
}

/// Class literal expression, e.g. `java.util.List.class`.
pub fn class_literal(ty: &TypeRef) -> String {
    format!("{}.class", raw_type(ty))
}

/// Type parameter declaration list, e.g. `<T, U extends java.lang.Number>`.
pub fn type_parameter_declarations(type_params: &[TypeParamDecl]) -> String {
    if type_params.is_empty() {
        return String::new();
    }
    let params: Vec<String> = type_params
        .iter()
        .map(|p| match &p.bound {
            Some(bound) => format!("{} extends {}", p.name, boxed_type(bound)),
            None => p.name.clone(),
        })
        .collect();
    format!("<{}>", params.join(", "))
}

/// Type parameter usage list, e.g. `<T, U>`.
pub fn type_parameter_names(type_params: &[TypeParamDecl]) -> String {
    if type_params.is_empty() {
        return String::new();
    }
    let names: Vec<&str> = type_params.iter().map(|p| p.name.as_str()).collect();
    format!("<{}>", names.join(", "))
}
