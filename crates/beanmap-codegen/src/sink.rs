//! Artifact sinks.
//!
//! The generator reserves an artifact name before building its plan and
//! commits the finished plan afterwards. A reservation that already exists
//! tells the generator the artifact is done, or in progress further up the
//! recursion.

use crate::java::render_artifact;
use crate::naming::ArtifactName;
use crate::plan::{ArtifactPlan, DeserializerPlan, MapperPlan, SerializerPlan};
use beanmap_core::{CodegenError, CodegenResult};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Receiver of generated artifacts.
pub trait ArtifactSink {
    /// Reserve `name`. Returns false if it was already reserved.
    fn try_create(&mut self, name: &ArtifactName) -> bool;

    /// Drop the reservation of an artifact whose plan could not be built.
    fn release(&mut self, name: &ArtifactName);

    /// Store the finished plan of a reserved artifact.
    fn commit(&mut self, plan: ArtifactPlan) -> CodegenResult<()>;
}

/// Keeps plans in memory, in commit order.
#[derive(Debug, Default)]
pub struct MemorySink {
    reserved: BTreeSet<ArtifactName>,
    plans: Vec<ArtifactPlan>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plans(&self) -> &[ArtifactPlan] {
        &self.plans
    }

    pub fn into_plans(self) -> Vec<ArtifactPlan> {
        self.plans
    }

    pub fn is_reserved(&self, name: &ArtifactName) -> bool {
        self.reserved.contains(name)
    }

    pub fn names(&self) -> Vec<&ArtifactName> {
        self.plans.iter().map(ArtifactPlan::name).collect()
    }

    /// Committed serializer with the given simple name.
    pub fn serializer(&self, simple_name: &str) -> Option<&SerializerPlan> {
        self.plans.iter().find_map(|plan| match plan {
            ArtifactPlan::Serializer(s) if s.name.simple_name == simple_name => Some(s),
            _ => None,
        })
    }

    /// Committed deserializer with the given simple name.
    pub fn deserializer(&self, simple_name: &str) -> Option<&DeserializerPlan> {
        self.plans.iter().find_map(|plan| match plan {
            ArtifactPlan::Deserializer(d) if d.name.simple_name == simple_name => Some(d),
            _ => None,
        })
    }

    /// Committed mapper with the given simple name.
    pub fn mapper(&self, simple_name: &str) -> Option<&MapperPlan> {
        self.plans.iter().find_map(|plan| match plan {
            ArtifactPlan::Mapper(m) if m.name.simple_name == simple_name => Some(m),
            _ => None,
        })
    }
}

impl ArtifactSink for MemorySink {
    fn try_create(&mut self, name: &ArtifactName) -> bool {
        self.reserved.insert(name.clone())
    }

    fn release(&mut self, name: &ArtifactName) {
        self.reserved.remove(name);
    }

    fn commit(&mut self, plan: ArtifactPlan) -> CodegenResult<()> {
        if !self.reserved.contains(plan.name()) {
            return Err(CodegenError::Unexpected(format!(
                "Artifact {} was committed without being reserved",
                plan.name()
            )));
        }
        self.plans.push(plan);
        Ok(())
    }
}

/// Renders plans to Java source files under a root directory.
#[derive(Debug)]
pub struct JavaSourceSink {
    root: PathBuf,
    reserved: BTreeSet<ArtifactName>,
    written: Vec<PathBuf>,
}

impl JavaSourceSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            reserved: BTreeSet::new(),
            written: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files written so far, in commit order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Path of the source file for `name`.
    pub fn path_of(&self, name: &ArtifactName) -> PathBuf {
        let mut path = self.root.clone();
        for segment in name.package.split('.').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        path.push(format!("{}.java", name.simple_name));
        path
    }
}

impl ArtifactSink for JavaSourceSink {
    fn try_create(&mut self, name: &ArtifactName) -> bool {
        self.reserved.insert(name.clone())
    }

    fn release(&mut self, name: &ArtifactName) {
        self.reserved.remove(name);
    }

    fn commit(&mut self, plan: ArtifactPlan) -> CodegenResult<()> {
        let path = self.path_of(plan.name());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let source = render_artifact(&plan);
        fs::write(&path, source)?;
        debug!("Wrote {}", path.display());
        info!("Generated {}", plan.name());
        self.written.push(path);
        Ok(())
    }
}
