//! Artifact plans.
//!
//! A plan is the complete description of one generated source unit, built by
//! the generator and handed whole to an [`ArtifactSink`](crate::sink::ArtifactSink).
//! Plans own their data: nothing in them refers back to generator state.

use crate::bean::{BeanTypeInfo, CreatorKind};
use crate::codec::CodecDescriptor;
use crate::naming::ArtifactName;
use crate::property::Accessor;
use beanmap_core::{
    CodegenError, CodegenResult, IdGenerator, Include, Shape, TypeParamDecl, TypeRef,
};
use serde_json::{Map, Value};

/// One generated source unit.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactPlan {
    Serializer(SerializerPlan),
    Deserializer(DeserializerPlan),
    Mapper(MapperPlan),
}

impl ArtifactPlan {
    pub fn name(&self) -> &ArtifactName {
        match self {
            ArtifactPlan::Serializer(plan) => &plan.name,
            ArtifactPlan::Deserializer(plan) => &plan.name,
            ArtifactPlan::Mapper(plan) => &plan.name,
        }
    }
}

// ============================================================================
// Shared pieces
// ============================================================================

/// Per-property codec settings; only built when at least one is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyParameters {
    pub pattern: Option<String>,
    pub shape: Option<Shape>,
    /// Non-default locale; the runtime ignores it unless a locale-aware codec is configured.
    pub locale: Option<String>,
    /// Minutes to add to a zone time to reach GMT.
    pub timezone_offset_minutes: Option<i64>,
    pub ignored_properties: Vec<String>,
    pub ignore_unknown: Option<bool>,
    pub include: Option<Include>,
    pub identity: Option<IdentityPlan>,
    pub type_info: Option<BeanTypeInfo>,
    pub unwrapped: bool,
}

impl PropertyParameters {
    pub fn is_empty(&self) -> bool {
        *self == PropertyParameters::default()
    }
}

/// Where object ids come from.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentitySource {
    /// The id is a property of the bean, read through `accessor` when serializing.
    Property {
        ty: TypeRef,
        accessor: Option<Accessor>,
        codec: CodecDescriptor,
    },
    /// Ids are produced by a generator scoped per serialization context.
    Generator { id_type: TypeRef, codec: CodecDescriptor },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentityPlan {
    pub property: String,
    pub always_as_id: bool,
    pub generator: IdGenerator,
    pub scope: String,
    pub source: IdentitySource,
}

/// How a polymorphic subtype's codec is wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtypeKind {
    /// Configured or built-in codec.
    Default,
    /// Generated bean codec.
    Bean,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubtypeBinding {
    pub subtype: String,
    pub kind: SubtypeKind,
    pub codec: CodecDescriptor,
}

// ============================================================================
// Serializer
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializerBase {
    Bean,
    /// The bean is written as the bare value of one property.
    ValueBean,
}

/// Override of how a property name is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameEmission {
    /// Write the escaped name.
    Escaped,
    /// Write no name: the value's own properties are inlined.
    Unwrapped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SerializerProperty {
    pub name: String,
    pub escaped_name: String,
    pub ty: TypeRef,
    pub accessor: Accessor,
    pub codec: CodecDescriptor,
    pub name_emission: Option<NameEmission>,
    pub parameters: Option<PropertyParameters>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SerializerPlan {
    pub name: ArtifactName,
    /// Bean type with its own type parameters as arguments.
    pub bean: TypeRef,
    pub type_params: Vec<TypeParamDecl>,
    pub base: SerializerBase,
    pub value: Option<SerializerProperty>,
    pub properties: Vec<SerializerProperty>,
    pub any_getter: Option<SerializerProperty>,
    pub identity: Option<IdentityPlan>,
    pub type_info: Option<BeanTypeInfo>,
    pub subtypes: Vec<SubtypeBinding>,
}

// ============================================================================
// Deserializer
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeserializerBase {
    Bean,
    /// Deserializer of `java.lang.Object` itself.
    Object,
    /// Deserializer of `java.io.Serializable` itself.
    Serializable,
    Delegation,
}

/// Call that instantiates the bean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatorCall {
    pub kind: CreatorKind,
    /// Whether the call goes through a native bridge.
    pub bridged: bool,
}

/// One creator argument slot.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatorArgument {
    pub name: String,
    pub escaped_name: String,
    pub ty: TypeRef,
    /// Java literal the slot starts with.
    pub default_value: &'static str,
    pub codec: CodecDescriptor,
    pub parameters: Option<PropertyParameters>,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InstanceBuilderPlan {
    /// Instantiate at once and set properties on the live instance.
    Default { creator: CreatorCall },
    /// Decode creator arguments first, then instantiate.
    Parameterized {
        creator: CreatorCall,
        arguments: Vec<CreatorArgument>,
    },
    /// Decode the whole input as the single creator argument.
    Delegating {
        creator: CreatorCall,
        delegate: CreatorArgument,
    },
}

/// Result of [`InstanceBuilderPlan::collect_arguments`].
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedArguments {
    /// Creator arguments in declared order; `None` keeps the slot's default value.
    pub arguments: Vec<(String, Option<Value>)>,
    /// Name/value pairs left for ordinary property population.
    pub properties: Map<String, Value>,
}

impl InstanceBuilderPlan {
    pub fn creator(&self) -> &CreatorCall {
        match self {
            InstanceBuilderPlan::Default { creator }
            | InstanceBuilderPlan::Parameterized { creator, .. }
            | InstanceBuilderPlan::Delegating { creator, .. } => creator,
        }
    }

    /// Run the instance builder over already-buffered properties and a
    /// stream of name/value pairs, as the generated code does over JSON.
    ///
    /// Buffered values are consumed first. Streamed pairs are read only while
    /// creator arguments remain; unrelated pairs read meanwhile are buffered.
    /// Fails with every missing required argument, in declared order.
    pub fn collect_arguments(
        &self,
        mut buffered: Map<String, Value>,
        stream: impl IntoIterator<Item = (String, Value)>,
    ) -> CodegenResult<CollectedArguments> {
        let mut stream = stream.into_iter();
        match self {
            InstanceBuilderPlan::Default { .. } => {
                buffered.extend(stream);
                Ok(CollectedArguments {
                    arguments: Vec::new(),
                    properties: buffered,
                })
            }
            InstanceBuilderPlan::Delegating { delegate, .. } => {
                buffered.extend(stream);
                Ok(CollectedArguments {
                    arguments: vec![(delegate.name.clone(), Some(Value::Object(buffered)))],
                    properties: Map::new(),
                })
            }
            InstanceBuilderPlan::Parameterized { arguments, .. } => {
                let mut slots: Vec<Option<Value>> = vec![None; arguments.len()];
                let mut missing: Vec<&str> = arguments
                    .iter()
                    .filter(|a| a.required)
                    .map(|a| a.name.as_str())
                    .collect();
                let mut remaining = arguments.len();

                for (slot, argument) in slots.iter_mut().zip(arguments) {
                    if let Some(value) = buffered.remove(&argument.name) {
                        *slot = Some(value);
                        remaining -= 1;
                        missing.retain(|m| *m != argument.name);
                    }
                }

                while remaining > 0 {
                    let Some((name, value)) = stream.next() else {
                        break;
                    };
                    match arguments.iter().position(|a| a.name == name) {
                        Some(index) => {
                            if slots[index].is_none() {
                                remaining -= 1;
                            }
                            slots[index] = Some(value);
                            missing.retain(|m| *m != name);
                        }
                        None => {
                            buffered.insert(name, value);
                        }
                    }
                }

                if !missing.is_empty() {
                    return Err(CodegenError::MissingRequiredProperties(
                        missing.into_iter().map(str::to_string).collect(),
                    ));
                }

                buffered.extend(stream);
                Ok(CollectedArguments {
                    arguments: arguments
                        .iter()
                        .map(|a| a.name.clone())
                        .zip(slots)
                        .collect(),
                    properties: buffered,
                })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeserializerProperty {
    pub name: String,
    pub escaped_name: String,
    pub ty: TypeRef,
    pub accessor: Accessor,
    pub codec: CodecDescriptor,
    pub parameters: Option<PropertyParameters>,
    /// Back-reference name this property's value points back through.
    pub managed_reference: Option<String>,
}

/// Setter called by a parent codec once the child is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackReferenceBinding {
    pub reference: String,
    pub property: String,
    pub ty: TypeRef,
    pub accessor: Accessor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeserializerPlan {
    pub name: ArtifactName,
    pub bean: TypeRef,
    pub type_params: Vec<TypeParamDecl>,
    pub base: DeserializerBase,
    pub instance_builder: Option<InstanceBuilderPlan>,
    pub properties: Vec<DeserializerProperty>,
    pub back_references: Vec<BackReferenceBinding>,
    pub ignored_properties: Vec<String>,
    pub required_properties: Vec<String>,
    pub any_setter: Option<DeserializerProperty>,
    pub identity: Option<IdentityPlan>,
    pub type_info: Option<BeanTypeInfo>,
    pub subtypes: Vec<SubtypeBinding>,
    pub ignore_unknown: bool,
}

// ============================================================================
// Mapper
// ============================================================================

/// Kind of root mapper interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapperKind {
    Mapper,
    Reader,
    Writer,
}

impl MapperKind {
    pub const MAPPER_INTERFACE: &'static str = "com.github.nmorel.gwtjackson.client.ObjectMapper";
    pub const READER_INTERFACE: &'static str = "com.github.nmorel.gwtjackson.client.ObjectReader";
    pub const WRITER_INTERFACE: &'static str = "com.github.nmorel.gwtjackson.client.ObjectWriter";

    pub fn from_interface(name: &str) -> Option<Self> {
        match name {
            Self::MAPPER_INTERFACE => Some(MapperKind::Mapper),
            Self::READER_INTERFACE => Some(MapperKind::Reader),
            Self::WRITER_INTERFACE => Some(MapperKind::Writer),
            _ => None,
        }
    }

    pub fn reads(self) -> bool {
        matches!(self, MapperKind::Mapper | MapperKind::Reader)
    }

    pub fn writes(self) -> bool {
        matches!(self, MapperKind::Mapper | MapperKind::Writer)
    }

    /// Abstract base class of the generated mapper.
    pub fn base_class(self) -> &'static str {
        match self {
            MapperKind::Mapper => "com.github.nmorel.gwtjackson.client.AbstractObjectMapper",
            MapperKind::Reader => "com.github.nmorel.gwtjackson.client.AbstractObjectReader",
            MapperKind::Writer => "com.github.nmorel.gwtjackson.client.AbstractObjectWriter",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapperPlan {
    pub name: ArtifactName,
    /// Qualified name of the user interface being implemented.
    pub interface: String,
    pub mapped_type: TypeRef,
    pub kind: MapperKind,
    pub root_name: String,
    pub serializer: Option<CodecDescriptor>,
    pub deserializer: Option<CodecDescriptor>,
}
