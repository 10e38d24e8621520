//! Root mapper generation.
//!
//! A mapper interface names the type it maps through its single mapper
//! super-interface:
//!
//! ```text
//! interface PersonMapper extends ObjectMapper<Person>
//!                                 │            │
//!                   kind (reads and/or writes) mapped type
//! ```
//!
//! The generated `PersonMapperImpl` wires the root serializer and/or
//! deserializer of the mapped type. Each mapper gets its own [`Generator`]
//! and [`TypeOracle`](crate::oracle::TypeOracle); artifacts already in the
//! shared sink are reused across mappers.

use crate::bean::find_type_directive;
use crate::generator::Generator;
use crate::naming::{ArtifactName, MAPPER_SUFFIX, RootMapper, enclosing_chain};
use crate::plan::{ArtifactPlan, MapperKind, MapperPlan};
use crate::sink::ArtifactSink;
use beanmap_core::{
    ClassDescriptor, ClassKind, CodegenError, CodegenResult, Configuration, Diagnostics, TypeRef,
    TypeSource,
};
use tracing::{debug, info, info_span};

const ROOT_FAILURE: &str = "Cannot generate mapper due to previous errors";

/// Outcome of generating one mapper.
#[derive(Debug)]
pub struct MapperReport {
    /// Qualified name of the mapper interface.
    pub interface: String,
    pub result: CodegenResult<ArtifactName>,
    pub diagnostics: Diagnostics,
}

impl MapperReport {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// A validated mapper interface.
#[derive(Debug, Clone)]
struct MapperDeclaration<'t> {
    class: &'t ClassDescriptor,
    kind: MapperKind,
    mapped_type: TypeRef,
}

/// Generates mapper implementations into a shared sink.
pub struct MapperGenerator<'a> {
    types: &'a dyn TypeSource,
    config: &'a Configuration,
    sink: &'a mut dyn ArtifactSink,
}

impl<'a> MapperGenerator<'a> {
    pub fn new(
        types: &'a dyn TypeSource,
        config: &'a Configuration,
        sink: &'a mut dyn ArtifactSink,
    ) -> Self {
        Self { types, config, sink }
    }

    /// Generate the implementation of `interface` and every codec it needs.
    pub fn generate(&mut self, interface: &str) -> MapperReport {
        let _span = info_span!("mapper", %interface).entered();
        let types = self.types;
        let config = self.config;

        let (result, mut diagnostics) = match mapper_declaration(types, interface) {
            Ok(declaration) => {
                let mut generator = Generator::new(types, config, &mut *self.sink)
                    .for_root(RootMapper::new(declaration.class));
                let result = build_mapper(&mut generator, types, config, &declaration);
                (result, generator.into_diagnostics())
            }
            Err(err) => (Err(err), Diagnostics::new()),
        };

        match &result {
            Ok(name) => info!("Generated mapper {name}"),
            Err(err) => diagnostics.error(format!("Cannot generate mapper {interface}: {err}")),
        }
        MapperReport {
            interface: interface.to_string(),
            result,
            diagnostics,
        }
    }
}

/// Generate every mapper in `interfaces`; a failing mapper does not stop the others.
pub fn generate_mappers<S: AsRef<str>>(
    types: &dyn TypeSource,
    config: &Configuration,
    sink: &mut dyn ArtifactSink,
    interfaces: &[S],
) -> Vec<MapperReport> {
    let mut generator = MapperGenerator::new(types, config, sink);
    interfaces
        .iter()
        .map(|interface| generator.generate(interface.as_ref()))
        .collect()
}

fn mapper_declaration<'t>(
    types: &'t dyn TypeSource,
    interface: &str,
) -> CodegenResult<MapperDeclaration<'t>> {
    let class = types.class(interface).ok_or_else(|| {
        CodegenError::Configuration(format!("Unknown mapper interface {interface}"))
    })?;
    if class.kind != ClassKind::Interface {
        return Err(CodegenError::Configuration(format!(
            "{interface} must be an interface"
        )));
    }

    let supers: Vec<(MapperKind, &TypeRef)> = class
        .interfaces
        .iter()
        .filter_map(|ty| {
            ty.class_name()
                .and_then(MapperKind::from_interface)
                .map(|kind| (kind, ty))
        })
        .collect();
    let [(kind, super_type)] = supers.as_slice() else {
        return Err(CodegenError::Configuration(format!(
            "Expected exactly one interface extending {}, {} or {} on {interface}",
            MapperKind::MAPPER_INTERFACE,
            MapperKind::READER_INTERFACE,
            MapperKind::WRITER_INTERFACE
        )));
    };
    let [mapped_type] = super_type.type_args() else {
        return Err(CodegenError::Configuration(format!(
            "Expected exactly one type argument on {super_type} of {interface}"
        )));
    };

    Ok(MapperDeclaration {
        class,
        kind: *kind,
        mapped_type: mapped_type.clone(),
    })
}

/// Root name: the root-name directive on the mapped type's hierarchy, else its simple name.
fn root_name(types: &dyn TypeSource, config: &Configuration, mapped_type: &TypeRef) -> String {
    let erased = mapped_type.erased_name();
    if let Some(name) = find_type_directive(types, config, &erased, |d| d.root_name.clone()) {
        return name;
    }
    match types.class(&erased) {
        Some(class) => class.simple_name.clone(),
        None => erased.rsplit('.').next().unwrap_or(&erased).to_string(),
    }
}

fn build_mapper(
    generator: &mut Generator<'_>,
    types: &dyn TypeSource,
    config: &Configuration,
    declaration: &MapperDeclaration<'_>,
) -> CodegenResult<ArtifactName> {
    let class = declaration.class;
    let mapped_type = &declaration.mapped_type;
    let name = ArtifactName::new(
        class.package.clone(),
        format!("{}{MAPPER_SUFFIX}", enclosing_chain(types, class).join("_")),
    );
    debug!("Creating mapper {name} for {mapped_type}");

    let deserializer = if declaration.kind.reads() {
        let codec = generator
            .resolve_deserializer(mapped_type, false)
            .map_err(|err| err.escalate(ROOT_FAILURE))?;
        Some(codec)
    } else {
        None
    };
    let serializer = if declaration.kind.writes() {
        let codec = generator
            .resolve_serializer(mapped_type, false)
            .map_err(|err| err.escalate(ROOT_FAILURE))?;
        Some(codec)
    } else {
        None
    };

    let plan = MapperPlan {
        name: name.clone(),
        interface: class.name(),
        mapped_type: mapped_type.clone(),
        kind: declaration.kind,
        root_name: root_name(types, config, mapped_type),
        serializer,
        deserializer,
    };
    if !generator.emit(ArtifactPlan::Mapper(plan))? {
        debug!("Mapper {name} already exists");
    }
    Ok(name)
}
