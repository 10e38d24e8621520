//! Configuration registry
//!
//! Maps types to the codecs that handle them, declares mixins and controls
//! which subtypes take part in polymorphic handling. The registry is built
//! once (built-in defaults plus an optional TOML file) and only read during
//! generation.
//!
//! # TOML format
//!
//! ```toml
//! mapper_specific = ["com.example.Shared"]
//! excluded_subtypes = ["com.example.internal.Hidden"]
//!
//! [serializers."com.example.Money"]
//! codec = "com.example.MoneySerializer"
//! creation = "getInstance"
//!
//! [deserializers."com.example.Pair"]
//! codec = "com.example.PairDeserializer"
//! parameters = ["plain", "plain"]
//!
//! [mixins]
//! "com.example.Person" = "com.example.PersonMixin"
//! ```

use crate::descriptor::{ClassDescriptor, TypeSource};
use crate::directive::Access;
use crate::error::CodegenResult;
use crate::types::TypeRef;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

const SER: &str = "com.github.nmorel.gwtjackson.client.ser";
const DESER: &str = "com.github.nmorel.gwtjackson.client.deser";

/// How a codec instance is obtained.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InstanceCreation {
    /// `new Codec(args)`
    #[default]
    Constructor,
    /// `Codec.method(args)`
    StaticMethod(String),
}

impl From<String> for InstanceCreation {
    fn from(value: String) -> Self {
        if value == "constructor" {
            InstanceCreation::Constructor
        } else {
            InstanceCreation::StaticMethod(value)
        }
    }
}

impl From<InstanceCreation> for String {
    fn from(value: InstanceCreation) -> Self {
        match value {
            InstanceCreation::Constructor => "constructor".to_string(),
            InstanceCreation::StaticMethod(method) => method,
        }
    }
}

/// How a generic argument of a configured type is resolved before being
/// passed to the codec factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterRole {
    /// Resolved as a value codec.
    #[default]
    Plain,
    /// Resolved through the map-key path.
    Key,
}

/// A registered codec and how to instantiate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecFactory {
    /// Qualified name of the codec type.
    pub codec: String,
    #[serde(default)]
    pub creation: InstanceCreation,
    /// One role per generic argument; empty for non-generic factories.
    #[serde(default)]
    pub parameters: Vec<ParameterRole>,
}

impl CodecFactory {
    pub fn constructor(codec: impl Into<String>) -> Self {
        Self {
            codec: codec.into(),
            creation: InstanceCreation::Constructor,
            parameters: Vec::new(),
        }
    }

    pub fn static_method(codec: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            codec: codec.into(),
            creation: InstanceCreation::StaticMethod(method.into()),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameters(mut self, parameters: Vec<ParameterRole>) -> Self {
        self.parameters = parameters;
        self
    }
}

fn default_reserved_prefix() -> String {
    "java.".to_string()
}

fn default_remapped_prefix() -> String {
    "gwtjackson.".to_string()
}

fn default_host_object() -> String {
    "com.google.gwt.core.client.JavaScriptObject".to_string()
}

/// The configuration registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub serializers: BTreeMap<String, CodecFactory>,
    pub deserializers: BTreeMap<String, CodecFactory>,
    pub key_serializers: BTreeMap<String, CodecFactory>,
    pub key_deserializers: BTreeMap<String, CodecFactory>,
    /// Target type to mixin type.
    pub mixins: BTreeMap<String, String>,
    /// Types whose generated codecs must not be shared across root mappers.
    pub mapper_specific: BTreeSet<String>,
    /// Subtypes never registered in polymorphic maps.
    pub excluded_subtypes: BTreeSet<String>,
    /// Packages the target platform refuses to host generated code in.
    pub reserved_package_prefix: String,
    /// Prefix prepended to reserved packages for generated code.
    pub remapped_package_prefix: String,
    /// Opaque host object type handled by a single built-in codec.
    pub host_object_type: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            serializers: BTreeMap::new(),
            deserializers: BTreeMap::new(),
            key_serializers: BTreeMap::new(),
            key_deserializers: BTreeMap::new(),
            mixins: BTreeMap::new(),
            mapper_specific: BTreeSet::new(),
            excluded_subtypes: BTreeSet::new(),
            reserved_package_prefix: default_reserved_prefix(),
            remapped_package_prefix: default_remapped_prefix(),
            host_object_type: default_host_object(),
        }
    }
}

impl Configuration {
    /// An empty registry with the standard namespace settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry with every built-in codec registered.
    pub fn with_defaults() -> Self {
        let mut config = Self::default();
        config.register_builtins();
        config
    }

    /// Parse a TOML file and merge it over the built-in defaults.
    pub fn from_toml_str(toml: &str) -> CodegenResult<Self> {
        let user: Configuration = toml::from_str(toml)?;
        Ok(Self::with_defaults().merge(user))
    }

    /// Overlay `other`: its registrations win and its namespace settings replace ours.
    pub fn merge(mut self, other: Configuration) -> Self {
        if other.host_object_type != self.host_object_type {
            for codecs in [&mut self.serializers, &mut self.deserializers] {
                if let Some(factory) = codecs.remove(&self.host_object_type) {
                    codecs.insert(other.host_object_type.clone(), factory);
                }
            }
        }
        self.serializers.extend(other.serializers);
        self.deserializers.extend(other.deserializers);
        self.key_serializers.extend(other.key_serializers);
        self.key_deserializers.extend(other.key_deserializers);
        self.mixins.extend(other.mixins);
        self.mapper_specific.extend(other.mapper_specific);
        self.excluded_subtypes.extend(other.excluded_subtypes);
        self.reserved_package_prefix = other.reserved_package_prefix;
        self.remapped_package_prefix = other.remapped_package_prefix;
        self.host_object_type = other.host_object_type;
        self
    }

    pub fn with_serializer(mut self, ty: impl Into<String>, factory: CodecFactory) -> Self {
        self.serializers.insert(ty.into(), factory);
        self
    }

    pub fn with_deserializer(mut self, ty: impl Into<String>, factory: CodecFactory) -> Self {
        self.deserializers.insert(ty.into(), factory);
        self
    }

    pub fn with_key_serializer(mut self, ty: impl Into<String>, factory: CodecFactory) -> Self {
        self.key_serializers.insert(ty.into(), factory);
        self
    }

    pub fn with_key_deserializer(mut self, ty: impl Into<String>, factory: CodecFactory) -> Self {
        self.key_deserializers.insert(ty.into(), factory);
        self
    }

    pub fn with_mixin(mut self, target: impl Into<String>, mixin: impl Into<String>) -> Self {
        self.mixins.insert(target.into(), mixin.into());
        self
    }

    pub fn with_mapper_specific(mut self, ty: impl Into<String>) -> Self {
        self.mapper_specific.insert(ty.into());
        self
    }

    pub fn with_excluded_subtype(mut self, ty: impl Into<String>) -> Self {
        self.excluded_subtypes.insert(ty.into());
        self
    }

    pub fn serializer_for(&self, ty: &TypeRef) -> Option<&CodecFactory> {
        self.serializers.get(&ty.erased_name())
    }

    pub fn deserializer_for(&self, ty: &TypeRef) -> Option<&CodecFactory> {
        self.deserializers.get(&ty.erased_name())
    }

    pub fn key_serializer_for(&self, ty: &TypeRef) -> Option<&CodecFactory> {
        self.key_serializers.get(&ty.erased_name())
    }

    pub fn key_deserializer_for(&self, ty: &TypeRef) -> Option<&CodecFactory> {
        self.key_deserializers.get(&ty.erased_name())
    }

    /// Mixin type registered for `ty`.
    pub fn mixin_for(&self, ty: &str) -> Option<&str> {
        self.mixins.get(ty).map(String::as_str)
    }

    /// Whether codecs for `ty` depend on the root mapper being generated.
    ///
    /// Types carrying a mixin always do, since mixins are mapper-level settings.
    pub fn is_specific_to_mapper(&self, ty: &str) -> bool {
        self.mapper_specific.contains(ty) || self.mixins.contains_key(ty)
    }

    /// Subtypes of `ty` eligible for polymorphic serialization.
    pub fn filter_subtypes_for_serialization(
        &self,
        types: &dyn TypeSource,
        ty: &str,
    ) -> Vec<String> {
        self.filter_subtypes(types, ty, |_| true)
    }

    /// Subtypes of `ty` eligible for polymorphic deserialization; only
    /// instantiable ones are kept.
    pub fn filter_subtypes_for_deserialization(
        &self,
        types: &dyn TypeSource,
        ty: &str,
    ) -> Vec<String> {
        self.filter_subtypes(types, ty, |c| c.is_concrete() || c.is_enum())
    }

    fn filter_subtypes(
        &self,
        types: &dyn TypeSource,
        ty: &str,
        keep: impl Fn(&ClassDescriptor) -> bool,
    ) -> Vec<String> {
        types
            .subtypes_of(ty)
            .into_iter()
            .filter(|c| !c.is_annotation() && c.access != Access::Private)
            .filter(|c| !self.excluded_subtypes.contains(&c.name()))
            .filter(|c| keep(c))
            .map(|c| c.name())
            .collect()
    }

    /// Report mixin entries naming types the source does not know.
    pub fn validate(&self, types: &dyn TypeSource) -> Vec<String> {
        let mut problems = Vec::new();
        for (target, mixin) in &self.mixins {
            if types.class(target).is_none() {
                problems.push(format!("Mixin target '{target}' is not a known type"));
            }
            if types.class(mixin).is_none() {
                problems.push(format!("Mixin '{mixin}' for '{target}' is not a known type"));
            }
        }
        problems
    }

    fn register_builtins(&mut self) {
        use ParameterRole::{Key, Plain};

        let singleton_ser = |name: &str| CodecFactory::static_method(format!("{SER}.{name}"), "getInstance");
        let singleton_deser = |name: &str| CodecFactory::static_method(format!("{DESER}.{name}"), "getInstance");
        let generic_ser = |name: &str, roles: Vec<ParameterRole>| {
            CodecFactory::static_method(format!("{SER}.{name}"), "newInstance").with_parameters(roles)
        };
        let generic_deser = |name: &str, roles: Vec<ParameterRole>| {
            CodecFactory::static_method(format!("{DESER}.{name}"), "newInstance").with_parameters(roles)
        };

        let scalars: &[(&[&str], &str, &str)] = &[
            (&["boolean", "java.lang.Boolean"], "BooleanJsonSerializer", "BooleanJsonDeserializer"),
            (&["char", "java.lang.Character"], "CharacterJsonSerializer", "CharacterJsonDeserializer"),
            (&["byte", "java.lang.Byte"], "BaseNumberJsonSerializer.ByteJsonSerializer", "BaseNumberJsonDeserializer.ByteJsonDeserializer"),
            (&["short", "java.lang.Short"], "BaseNumberJsonSerializer.ShortJsonSerializer", "BaseNumberJsonDeserializer.ShortJsonDeserializer"),
            (&["int", "java.lang.Integer"], "BaseNumberJsonSerializer.IntegerJsonSerializer", "BaseNumberJsonDeserializer.IntegerJsonDeserializer"),
            (&["long", "java.lang.Long"], "BaseNumberJsonSerializer.LongJsonSerializer", "BaseNumberJsonDeserializer.LongJsonDeserializer"),
            (&["float", "java.lang.Float"], "BaseNumberJsonSerializer.FloatJsonSerializer", "BaseNumberJsonDeserializer.FloatJsonDeserializer"),
            (&["double", "java.lang.Double"], "BaseNumberJsonSerializer.DoubleJsonSerializer", "BaseNumberJsonDeserializer.DoubleJsonDeserializer"),
            (&["java.math.BigDecimal"], "BaseNumberJsonSerializer.BigDecimalJsonSerializer", "BaseNumberJsonDeserializer.BigDecimalJsonDeserializer"),
            (&["java.math.BigInteger"], "BaseNumberJsonSerializer.BigIntegerJsonSerializer", "BaseNumberJsonDeserializer.BigIntegerJsonDeserializer"),
            (&["java.lang.Number"], "BaseNumberJsonSerializer.NumberJsonSerializer", "BaseNumberJsonDeserializer.NumberJsonDeserializer"),
            (&["java.lang.String"], "StringJsonSerializer", "StringJsonDeserializer"),
            (&["java.lang.Void"], "VoidJsonSerializer", "VoidJsonDeserializer"),
            (&["java.util.UUID"], "UUIDJsonSerializer", "UUIDJsonDeserializer"),
            (&["java.util.Date"], "BaseDateJsonSerializer.DateJsonSerializer", "BaseDateJsonDeserializer.DateJsonDeserializer"),
            (&["java.sql.Date"], "BaseDateJsonSerializer.SqlDateJsonSerializer", "BaseDateJsonDeserializer.SqlDateJsonDeserializer"),
            (&["java.sql.Time"], "BaseDateJsonSerializer.SqlTimeJsonSerializer", "BaseDateJsonDeserializer.SqlTimeJsonDeserializer"),
            (&["java.sql.Timestamp"], "BaseDateJsonSerializer.SqlTimestampJsonSerializer", "BaseDateJsonDeserializer.SqlTimestampJsonDeserializer"),
            (&["java.lang.StringBuilder"], "StringJsonSerializer", "StringBuilderJsonDeserializer"),
            (&["java.lang.StringBuffer"], "StringJsonSerializer", "StringBufferJsonDeserializer"),
        ];
        for (types, ser, deser) in scalars {
            for ty in *types {
                self.serializers.insert(ty.to_string(), singleton_ser(ser));
                self.deserializers.insert(ty.to_string(), singleton_deser(deser));
            }
        }

        let primitive_arrays = [
            ("boolean", "Boolean"),
            ("char", "Char"),
            ("byte", "Byte"),
            ("short", "Short"),
            ("int", "Integer"),
            ("long", "Long"),
            ("float", "Float"),
            ("double", "Double"),
        ];
        for (primitive, label) in primitive_arrays {
            self.serializers.insert(
                format!("{primitive}[]"),
                singleton_ser(&format!("array.Primitive{label}ArrayJsonSerializer")),
            );
            self.deserializers.insert(
                format!("{primitive}[]"),
                singleton_deser(&format!("array.Primitive{label}ArrayJsonDeserializer")),
            );
        }
        self.serializers.insert(
            "byte[][]".into(),
            singleton_ser("array.dd.PrimitiveByteArray2dJsonSerializer"),
        );
        self.deserializers.insert(
            "byte[][]".into(),
            singleton_deser("array.dd.PrimitiveByteArray2dJsonDeserializer"),
        );

        let iterables: &[(&str, &str, &str)] = &[
            ("java.lang.Iterable", "IterableJsonSerializer", "IterableJsonDeserializer"),
            ("java.util.Collection", "CollectionJsonSerializer", "collection.CollectionJsonDeserializer"),
            ("java.util.AbstractCollection", "CollectionJsonSerializer", "collection.AbstractCollectionJsonDeserializer"),
            ("java.util.List", "CollectionJsonSerializer", "collection.ListJsonDeserializer"),
            ("java.util.AbstractList", "CollectionJsonSerializer", "collection.AbstractListJsonDeserializer"),
            ("java.util.ArrayList", "CollectionJsonSerializer", "collection.ArrayListJsonDeserializer"),
            ("java.util.LinkedList", "CollectionJsonSerializer", "collection.LinkedListJsonDeserializer"),
            ("java.util.Set", "CollectionJsonSerializer", "collection.SetJsonDeserializer"),
            ("java.util.AbstractSet", "CollectionJsonSerializer", "collection.AbstractSetJsonDeserializer"),
            ("java.util.HashSet", "CollectionJsonSerializer", "collection.HashSetJsonDeserializer"),
            ("java.util.LinkedHashSet", "CollectionJsonSerializer", "collection.LinkedHashSetJsonDeserializer"),
            ("java.util.SortedSet", "CollectionJsonSerializer", "collection.SortedSetJsonDeserializer"),
            ("java.util.TreeSet", "CollectionJsonSerializer", "collection.TreeSetJsonDeserializer"),
            ("java.util.Queue", "CollectionJsonSerializer", "collection.QueueJsonDeserializer"),
            ("java.util.PriorityQueue", "CollectionJsonSerializer", "collection.PriorityQueueJsonDeserializer"),
            ("java.util.Stack", "CollectionJsonSerializer", "collection.StackJsonDeserializer"),
            ("java.util.Vector", "CollectionJsonSerializer", "collection.VectorJsonDeserializer"),
            ("java.util.EnumSet", "CollectionJsonSerializer", "collection.EnumSetJsonDeserializer"),
        ];
        for (ty, ser, deser) in iterables {
            self.serializers.insert(ty.to_string(), generic_ser(ser, vec![Plain]));
            self.deserializers.insert(ty.to_string(), generic_deser(deser, vec![Plain]));
        }

        let maps: &[(&str, &str)] = &[
            ("java.util.Map", "map.MapJsonDeserializer"),
            ("java.util.AbstractMap", "map.AbstractMapJsonDeserializer"),
            ("java.util.HashMap", "map.HashMapJsonDeserializer"),
            ("java.util.LinkedHashMap", "map.LinkedHashMapJsonDeserializer"),
            ("java.util.SortedMap", "map.SortedMapJsonDeserializer"),
            ("java.util.TreeMap", "map.TreeMapJsonDeserializer"),
            ("java.util.IdentityHashMap", "map.IdentityHashMapJsonDeserializer"),
            ("java.util.EnumMap", "map.EnumMapJsonDeserializer"),
        ];
        for (ty, deser) in maps {
            self.serializers
                .insert(ty.to_string(), generic_ser("map.MapJsonSerializer", vec![Key, Plain]));
            self.deserializers
                .insert(ty.to_string(), generic_deser(deser, vec![Key, Plain]));
        }

        self.serializers.insert(
            self.host_object_type.clone(),
            singleton_ser("JavaScriptObjectJsonSerializer"),
        );
        self.deserializers.insert(
            self.host_object_type.clone(),
            singleton_deser("JavaScriptObjectJsonDeserializer"),
        );

        let keys: &[(&[&str], &str, &str)] = &[
            (&["java.lang.String"], "ToStringKeySerializer", "StringKeyDeserializer"),
            (&["boolean", "java.lang.Boolean"], "ToStringKeySerializer", "BooleanKeyDeserializer"),
            (&["char", "java.lang.Character"], "ToStringKeySerializer", "CharacterKeyDeserializer"),
            (&["byte", "java.lang.Byte"], "ToStringKeySerializer", "BaseNumberKeyDeserializer.ByteKeyDeserializer"),
            (&["short", "java.lang.Short"], "ToStringKeySerializer", "BaseNumberKeyDeserializer.ShortKeyDeserializer"),
            (&["int", "java.lang.Integer"], "ToStringKeySerializer", "BaseNumberKeyDeserializer.IntegerKeyDeserializer"),
            (&["long", "java.lang.Long"], "ToStringKeySerializer", "BaseNumberKeyDeserializer.LongKeyDeserializer"),
            (&["float", "java.lang.Float"], "ToStringKeySerializer", "BaseNumberKeyDeserializer.FloatKeyDeserializer"),
            (&["double", "java.lang.Double"], "ToStringKeySerializer", "BaseNumberKeyDeserializer.DoubleKeyDeserializer"),
            (&["java.math.BigDecimal"], "ToStringKeySerializer", "BaseNumberKeyDeserializer.BigDecimalKeyDeserializer"),
            (&["java.math.BigInteger"], "ToStringKeySerializer", "BaseNumberKeyDeserializer.BigIntegerKeyDeserializer"),
            (&["java.util.UUID"], "ToStringKeySerializer", "UUIDKeyDeserializer"),
            (&["java.util.Date"], "DateKeySerializer", "BaseDateKeyDeserializer.DateKeyDeserializer"),
        ];
        for (types, ser, deser) in keys {
            for ty in *types {
                self.key_serializers
                    .insert(ty.to_string(), singleton_ser(&format!("map.key.{ser}")));
                self.key_deserializers
                    .insert(ty.to_string(), singleton_deser(&format!("map.key.{deser}")));
            }
        }
    }
}

#[cfg(test)]
#[path = "config/config_tests.rs"]
mod config_tests;
