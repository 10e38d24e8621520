//! Per-run cache of bean metadata and artifact identities.
//!
//! Each bean declaration gets a stable [`BeanId`] the first time it is seen.
//! The entry is registered before any codec body is built, so a recursive
//! request for the same declaration finds it and stops.

use crate::bean::BeanInfo;
use crate::codec::Direction;
use crate::naming::ArtifactName;
use crate::property::PropertiesContainer;
use beanmap_core::{OBJECT, TypeSource};
use std::collections::HashMap;
use std::rc::Rc;

/// Index of a bean declaration in a [`TypeOracle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BeanId(usize);

impl BeanId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Identities of the two codecs generated for one bean declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifactInfo {
    /// Qualified name of the bean declaration.
    pub bean_type: String,
    pub package: String,
    /// False when the package was remapped out of a reserved namespace.
    pub same_package: bool,
    pub serializer: ArtifactName,
    pub deserializer: ArtifactName,
}

impl GeneratedArtifactInfo {
    pub fn artifact(&self, direction: Direction) -> &ArtifactName {
        match direction {
            Direction::Serialize => &self.serializer,
            Direction::Deserialize => &self.deserializer,
        }
    }
}

/// Everything computed once for a bean declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapperInfo {
    pub id: BeanId,
    pub artifacts: GeneratedArtifactInfo,
    pub bean: BeanInfo,
    pub properties: PropertiesContainer,
}

/// Memoizing store keyed by qualified declaration name.
#[derive(Debug, Default)]
pub struct TypeOracle {
    ids: HashMap<String, BeanId>,
    infos: Vec<Rc<MapperInfo>>,
}

impl TypeOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_info(&self, bean_type: &str) -> Option<Rc<MapperInfo>> {
        self.ids
            .get(bean_type)
            .and_then(|id| self.infos.get(id.0))
            .cloned()
    }

    /// Register the metadata of a declaration seen for the first time.
    ///
    /// A declaration already present keeps its original entry.
    pub fn put_info(
        &mut self,
        artifacts: GeneratedArtifactInfo,
        bean: BeanInfo,
        properties: PropertiesContainer,
    ) -> Rc<MapperInfo> {
        if let Some(existing) = self.get_info(&artifacts.bean_type) {
            return existing;
        }
        let id = BeanId(self.infos.len());
        self.ids.insert(artifacts.bean_type.clone(), id);
        let info = Rc::new(MapperInfo {
            id,
            artifacts,
            bean,
            properties,
        });
        self.infos.push(Rc::clone(&info));
        info
    }

    pub fn by_id(&self, id: BeanId) -> Option<Rc<MapperInfo>> {
        self.infos.get(id.0).cloned()
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Whether `name` is the opaque host object type or one of its subtypes.
    pub fn is_host_object(types: &dyn TypeSource, host_object_type: &str, name: &str) -> bool {
        host_object_type != OBJECT && types.is_assignable_to(name, host_object_type)
    }
}
