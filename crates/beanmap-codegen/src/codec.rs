//! Codec descriptors.
//!
//! A [`CodecDescriptor`] says how to obtain the codec for one type: which
//! factory or built-in to call, or which generated bean codec to construct,
//! and with which child codecs for its generic arguments. Resolving a
//! `Map<String, List<Person>>` serializer yields a tree:
//!
//! ```text
//! MapJsonSerializer.newInstance(            Factory, bean_mapper = false
//!     ToStringKeySerializer.getInstance(),  Factory (key role)
//!     CollectionJsonSerializer.newInstance( Factory
//!         new PersonBeanJsonSerializerImpl()))  Bean, bean_mapper = true
//! ```

use crate::naming::ArtifactName;
use beanmap_core::{InstanceCreation, ParameterRole, TypeRef};
use std::collections::VecDeque;
use std::fmt;

/// Serialization or deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Serialize,
    Deserialize,
}

impl Direction {
    pub fn label(self) -> &'static str {
        match self {
            Direction::Serialize => "serializer",
            Direction::Deserialize => "deserializer",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How the codec instance is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecInstance {
    /// A registered codec factory.
    Factory {
        codec: String,
        creation: InstanceCreation,
    },
    /// The codec passed to the enclosing artifact for its `ordinal`-th type parameter.
    TypeParameter { ordinal: usize },
    /// Built-in enum codec specialised on `enum_type`.
    Enum { enum_type: String },
    /// Built-in enum key codec specialised on `enum_type`.
    EnumKey { enum_type: String },
    /// Built-in serializer for any enum, used for the bare enum supertype.
    AnyEnum,
    /// Built-in array codec of `rank` 1 or 2 over elements of type `leaf`.
    Array { rank: u8, leaf: TypeRef },
    /// A generated bean codec.
    Bean { artifact: ArtifactName },
    /// Writes the value verbatim without encoding.
    RawValue,
}

/// Resolved codec for one type, with child codecs for its generic arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecDescriptor {
    pub ty: TypeRef,
    pub direction: Direction,
    pub role: ParameterRole,
    pub instance: CodecInstance,
    pub parameters: Vec<CodecDescriptor>,
    /// Whether this node constructs a generated bean codec.
    pub bean_mapper: bool,
}

impl CodecDescriptor {
    pub fn new(ty: TypeRef, direction: Direction, instance: CodecInstance) -> Self {
        let bean_mapper = matches!(instance, CodecInstance::Bean { .. });
        Self {
            ty,
            direction,
            role: ParameterRole::Plain,
            instance,
            parameters: Vec::new(),
            bean_mapper,
        }
    }

    pub fn with_parameters(mut self, parameters: Vec<CodecDescriptor>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn as_key(mut self) -> Self {
        self.role = ParameterRole::Key;
        self
    }

    /// Artifact of a generated bean codec.
    pub fn artifact(&self) -> Option<&ArtifactName> {
        match &self.instance {
            CodecInstance::Bean { artifact } => Some(artifact),
            _ => None,
        }
    }

    /// First bean codec in the tree, breadth-first, starting at this node.
    ///
    /// Per-property parameters attach to this node.
    pub fn first_bean_mapper(&self) -> Option<&CodecDescriptor> {
        let mut queue = VecDeque::from([self]);
        while let Some(node) = queue.pop_front() {
            if node.bean_mapper {
                return Some(node);
            }
            queue.extend(node.parameters.iter());
        }
        None
    }

    /// Every generated artifact referenced by this tree, depth-first.
    pub fn artifacts(&self) -> Vec<&ArtifactName> {
        let mut out = Vec::new();
        self.collect_artifacts(&mut out);
        out
    }

    fn collect_artifacts<'a>(&'a self, out: &mut Vec<&'a ArtifactName>) {
        if let Some(artifact) = self.artifact() {
            out.push(artifact);
        }
        for parameter in &self.parameters {
            parameter.collect_artifacts(out);
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    fn factory(name: &str) -> CodecInstance {
        CodecInstance::Factory {
            codec: name.into(),
            creation: InstanceCreation::StaticMethod("newInstance".into()),
        }
    }

    #[test]
    fn CodecDescriptor___first_bean_mapper___searches_breadth_first() {
        let shallow = CodecDescriptor::new(
            TypeRef::class("a.Shallow"),
            Direction::Serialize,
            CodecInstance::Bean {
                artifact: ArtifactName::new("a", "ShallowBeanJsonSerializerImpl"),
            },
        );
        let deep = CodecDescriptor::new(
            TypeRef::class("a.Deep"),
            Direction::Serialize,
            CodecInstance::Bean {
                artifact: ArtifactName::new("a", "DeepBeanJsonSerializerImpl"),
            },
        );
        let inner_list = CodecDescriptor::new(TypeRef::class("java.util.List"), Direction::Serialize, factory("L"))
            .with_parameters(vec![deep]);
        let root = CodecDescriptor::new(TypeRef::class("java.util.Map"), Direction::Serialize, factory("M"))
            .with_parameters(vec![inner_list, shallow]);

        let found = root.first_bean_mapper().unwrap();

        assert_eq!(found.ty, TypeRef::class("a.Shallow"));
        assert_eq!(root.artifacts().len(), 2);
    }

    #[test]
    fn CodecDescriptor___no_bean_in_tree___finds_nothing() {
        let root = CodecDescriptor::new(TypeRef::class("java.lang.String"), Direction::Deserialize, factory("S"));

        assert!(root.first_bean_mapper().is_none());
        assert!(!root.bean_mapper);
    }
}
