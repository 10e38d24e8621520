//! Mapping directives attached to types and members
//!
//! Directives are the annotation layer of the bean model: renames, ignores,
//! formats, identity and polymorphism settings. They are supplied by the
//! metadata front-end alongside each declaration and never interpreted here
//! beyond simple merging.

use crate::types::TypeRef;
use serde::{Deserialize, Serialize};

/// Declared access level of a member or type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    #[default]
    Public,
    Protected,
    Package,
    Private,
}

/// Auto-detection threshold for one member category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Use the category default.
    #[default]
    Default,
    Any,
    NonPrivate,
    ProtectedAndPublic,
    PublicOnly,
    None,
}

impl Visibility {
    /// Whether a member with `access` is auto-detected.
    ///
    /// `Default` is never asked directly; callers resolve it first.
    pub fn allows(self, access: Access) -> bool {
        match self {
            Visibility::Any => true,
            Visibility::NonPrivate => access != Access::Private,
            Visibility::ProtectedAndPublic => {
                matches!(access, Access::Public | Access::Protected)
            }
            Visibility::PublicOnly | Visibility::Default => access == Access::Public,
            Visibility::None => false,
        }
    }

    /// `self` unless it is `Default`, in which case `fallback`.
    pub fn or(self, fallback: Visibility) -> Visibility {
        match self {
            Visibility::Default => fallback,
            other => other,
        }
    }
}

/// Per-category auto-detection settings of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoDetect {
    pub field: Visibility,
    pub getter: Visibility,
    pub is_getter: Visibility,
    pub setter: Visibility,
    pub creator: Visibility,
}

impl AutoDetect {
    pub fn is_default(&self) -> bool {
        *self == AutoDetect::default()
    }
}

/// Output shape requested by a format directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    #[default]
    Any,
    Scalar,
    Array,
    Object,
    Number,
    NumberFloat,
    NumberInt,
    String,
    Boolean,
}

impl Shape {
    /// Constant name in the runtime's shape enum.
    pub fn constant(self) -> &'static str {
        match self {
            Shape::Any => "ANY",
            Shape::Scalar => "SCALAR",
            Shape::Array => "ARRAY",
            Shape::Object => "OBJECT",
            Shape::Number => "NUMBER",
            Shape::NumberFloat => "NUMBER_FLOAT",
            Shape::NumberInt => "NUMBER_INT",
            Shape::String => "STRING",
            Shape::Boolean => "BOOLEAN",
        }
    }
}

/// Date/number formatting hints.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatDirective {
    pub pattern: Option<String>,
    pub shape: Shape,
    pub locale: Option<String>,
    pub timezone: Option<String>,
}

/// Inclusion policy for serialized values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Include {
    Always,
    NonNull,
    NonAbsent,
    NonDefault,
    NonEmpty,
}

impl Include {
    pub fn constant(self) -> &'static str {
        match self {
            Include::Always => "ALWAYS",
            Include::NonNull => "NON_NULL",
            Include::NonAbsent => "NON_ABSENT",
            Include::NonDefault => "NON_DEFAULT",
            Include::NonEmpty => "NON_EMPTY",
        }
    }
}

/// Generator used to produce object ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdGenerator {
    /// The id is an existing property of the bean.
    Property,
    IntSequence,
    Uuid,
    StringId,
    /// A user generator class producing ids of `id_type`.
    Custom { class: String, id_type: TypeRef },
}

impl IdGenerator {
    /// Qualified name of the generator class.
    pub fn class_name(&self) -> &str {
        match self {
            IdGenerator::Property => {
                "com.fasterxml.jackson.annotation.ObjectIdGenerators.PropertyGenerator"
            }
            IdGenerator::IntSequence => {
                "com.fasterxml.jackson.annotation.ObjectIdGenerators.IntSequenceGenerator"
            }
            IdGenerator::Uuid => "com.fasterxml.jackson.annotation.ObjectIdGenerators.UUIDGenerator",
            IdGenerator::StringId => {
                "com.fasterxml.jackson.annotation.ObjectIdGenerators.StringIdGenerator"
            }
            IdGenerator::Custom { class, .. } => class,
        }
    }

    /// Type of the ids produced, `None` for property-backed ids.
    pub fn id_type(&self) -> Option<TypeRef> {
        match self {
            IdGenerator::Property => None,
            IdGenerator::IntSequence => Some(TypeRef::class("java.lang.Integer")),
            IdGenerator::Uuid => Some(TypeRef::class("java.util.UUID")),
            IdGenerator::StringId => Some(TypeRef::class("java.lang.String")),
            IdGenerator::Custom { id_type, .. } => Some(id_type.clone()),
        }
    }
}

fn default_id_property() -> String {
    "@id".to_string()
}

/// Object identity settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityDirective {
    pub generator: IdGenerator,
    #[serde(default = "default_id_property")]
    pub property: String,
    /// Scope type of generated ids, `java.lang.Object` when absent.
    #[serde(default)]
    pub scope: Option<String>,
}

/// How the type id is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeIdKind {
    None,
    Class,
    MinimalClass,
    Name,
    Custom,
}

impl TypeIdKind {
    pub fn default_property(self) -> &'static str {
        match self {
            TypeIdKind::Class => "@class",
            TypeIdKind::MinimalClass => "@c",
            TypeIdKind::Name => "@type",
            TypeIdKind::None | TypeIdKind::Custom => "",
        }
    }
}

/// Where the type id is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeInclusion {
    #[default]
    Property,
    WrapperObject,
    WrapperArray,
    ExternalProperty,
    ExistingProperty,
}

impl TypeInclusion {
    pub fn constant(self) -> &'static str {
        match self {
            TypeInclusion::Property => "PROPERTY",
            TypeInclusion::WrapperObject => "WRAPPER_OBJECT",
            TypeInclusion::WrapperArray => "WRAPPER_ARRAY",
            TypeInclusion::ExternalProperty => "EXTERNAL_PROPERTY",
            TypeInclusion::ExistingProperty => "EXISTING_PROPERTY",
        }
    }
}

/// Polymorphic type information settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfoDirective {
    #[serde(rename = "use")]
    pub id: TypeIdKind,
    #[serde(default)]
    pub include: TypeInclusion,
    #[serde(default)]
    pub property: Option<String>,
}

/// A subtype registration with an optional explicit type name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtypeDirective {
    #[serde(rename = "type")]
    pub class: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Creator designation on a constructor or static factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatorMode {
    /// Delegating when it has one unnamed parameter, properties otherwise.
    #[default]
    Default,
    Delegating,
    Properties,
}

/// Directives declared on a type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeDirectives {
    pub ignore_unknown: bool,
    pub ignored_properties: Vec<String>,
    pub property_order: Vec<String>,
    pub alphabetic: bool,
    pub auto_detect: AutoDetect,
    pub identity: Option<IdentityDirective>,
    pub always_as_id: bool,
    pub type_info: Option<TypeInfoDirective>,
    pub type_name: Option<String>,
    pub subtypes: Vec<SubtypeDirective>,
    pub root_name: Option<String>,
}

/// Directives declared on a field, method or creator parameter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyDirectives {
    /// Explicitly marked as a property, which bypasses visibility rules.
    pub property: bool,
    pub rename: Option<String>,
    pub ignore: bool,
    pub required: bool,
    pub format: Option<FormatDirective>,
    pub include: Option<Include>,
    pub identity: Option<IdentityDirective>,
    pub always_as_id: bool,
    pub type_info: Option<TypeInfoDirective>,
    pub any_getter: bool,
    pub any_setter: bool,
    pub raw_value: bool,
    pub value: bool,
    pub unwrapped: bool,
    pub back_reference: Option<String>,
    pub managed_reference: Option<String>,
    pub ignored_properties: Option<Vec<String>>,
    pub ignore_unknown: Option<bool>,
}

impl PropertyDirectives {
    /// Whether the member is visible regardless of auto-detection.
    pub fn is_explicit(&self) -> bool {
        self.property
            || self.rename.is_some()
            || self.required
            || self.any_getter
            || self.any_setter
            || self.raw_value
            || self.value
            || self.back_reference.is_some()
            || self.managed_reference.is_some()
    }

    /// Overlay `mixin` on top of these directives; set values in `mixin` win.
    pub fn merged_with(&self, mixin: &PropertyDirectives) -> PropertyDirectives {
        PropertyDirectives {
            property: self.property || mixin.property,
            rename: mixin.rename.clone().or_else(|| self.rename.clone()),
            ignore: self.ignore || mixin.ignore,
            required: self.required || mixin.required,
            format: mixin.format.clone().or_else(|| self.format.clone()),
            include: mixin.include.or(self.include),
            identity: mixin.identity.clone().or_else(|| self.identity.clone()),
            always_as_id: self.always_as_id || mixin.always_as_id,
            type_info: mixin.type_info.clone().or_else(|| self.type_info.clone()),
            any_getter: self.any_getter || mixin.any_getter,
            any_setter: self.any_setter || mixin.any_setter,
            raw_value: self.raw_value || mixin.raw_value,
            value: self.value || mixin.value,
            unwrapped: self.unwrapped || mixin.unwrapped,
            back_reference: mixin
                .back_reference
                .clone()
                .or_else(|| self.back_reference.clone()),
            managed_reference: mixin
                .managed_reference
                .clone()
                .or_else(|| self.managed_reference.clone()),
            ignored_properties: mixin
                .ignored_properties
                .clone()
                .or_else(|| self.ignored_properties.clone()),
            ignore_unknown: mixin.ignore_unknown.or(self.ignore_unknown),
        }
    }
}
