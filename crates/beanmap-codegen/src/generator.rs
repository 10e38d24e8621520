//! Codec resolution and bean codec generation.
//!
//! A [`Generator`] answers "which codec handles this type?" and, when the
//! answer is a generated bean codec, builds that codec's [`ArtifactPlan`] and
//! hands it to the [`ArtifactSink`].
//!
//! # Resolution order
//!
//! ```text
//! TypeRef
//!    ↓ unwrap wildcard / raw
//!    ├─ type parameter ─→ codec argument of the bean being generated, or its bound
//!    ├─ configured     ─→ factory, generic slots resolved recursively (key slots via the key path)
//!    ├─ host object    ─→ configured host codec
//!    ├─ enum           ─→ enum codec
//!    ├─ array          ─→ rank 1 and 2 array codecs, rank 3+ unsupported
//!    ├─ annotation     ─→ unsupported
//!    ├─ class          ─→ generated bean codec, one child codec per type parameter
//!    └─ anything else  ─→ unsupported
//! ```
//!
//! # Recursion
//!
//! A bean codec is reserved in the sink before its plan is built. A property
//! typed as its own bean, or any longer cycle, finds the reservation and
//! refers to the artifact by name instead of descending again.
//!
//! Plans finished while an enclosing bean codec is still being built are held
//! until the outermost one succeeds, then committed together. A failing bean
//! codec releases its own reservation and every reservation made beneath it.
//!
//! # Failures
//!
//! [`CodegenError::UnsupportedType`] raised for a property, a subtype or an
//! identity type drops that unit with a warning. On a creator argument it is
//! escalated and fails the whole bean codec.

use crate::bean::{BeanIdentityInfo, Creator, CreatorStrategy};
use crate::codec::{CodecDescriptor, CodecInstance, Direction};
use crate::naming::{
    ArtifactName, DESERIALIZER_SUFFIX, RootMapper, SERIALIZER_SUFFIX, artifact_base_name,
    artifact_package, escape_java_string,
};
use crate::oracle::{GeneratedArtifactInfo, MapperInfo, TypeOracle};
use crate::plan::{
    ArtifactPlan, BackReferenceBinding, CreatorArgument, CreatorCall, DeserializerBase,
    DeserializerPlan, DeserializerProperty, IdentityPlan, IdentitySource, InstanceBuilderPlan,
    NameEmission, PropertyParameters, SerializerBase, SerializerPlan, SerializerProperty,
    SubtypeBinding, SubtypeKind,
};
use crate::property::{PropertyInfo, find_all_properties, needs_bridge};
use crate::sink::ArtifactSink;
use crate::timezone::zone_offset_minutes;
use crate::{bean, property};
use beanmap_core::{
    ClassDescriptor, ClassKind, CodecFactory, CodegenError, CodegenResult, Configuration,
    Diagnostics, ENUM, OBJECT, ParameterRole, TypeParamDecl, TypeRef, TypeSource,
};
use std::borrow::Cow;
use std::rc::Rc;
use tracing::{debug, debug_span};

/// Qualified name of the serializable marker interface.
pub const SERIALIZABLE: &str = "java.io.Serializable";

/// Locale and timezone value meaning "not set".
const DEFAULT_FORMAT_VALUE: &str = "##default";

/// Context a type is resolved in.
#[derive(Debug, Clone, Copy)]
struct Scope<'s> {
    /// Bean whose codec is being built; its type parameters are codec arguments.
    bean: Option<&'s str>,
    /// Whether the type is a subtype of `bean` being registered for polymorphism.
    subtype: bool,
}

const ROOT_SCOPE: Scope<'static> = Scope {
    bean: None,
    subtype: false,
};

impl<'s> Scope<'s> {
    fn bean(bean: &'s str) -> Self {
        Self {
            bean: Some(bean),
            subtype: false,
        }
    }

    fn subtypes_of(bean: &'s str) -> Self {
        Self {
            bean: Some(bean),
            subtype: true,
        }
    }
}

/// Resolves codecs and generates bean codecs for one root mapper.
pub struct Generator<'a> {
    types: &'a dyn TypeSource,
    config: &'a Configuration,
    root: Option<RootMapper>,
    oracle: TypeOracle,
    sink: &'a mut dyn ArtifactSink,
    diagnostics: Diagnostics,
    /// Beans whose type arguments are being resolved, innermost last.
    resolving: Vec<String>,
    /// Finished plans held back until every enclosing bean codec succeeds, innermost last.
    pending: Vec<Vec<ArtifactPlan>>,
}

impl<'a> Generator<'a> {
    pub fn new(
        types: &'a dyn TypeSource,
        config: &'a Configuration,
        sink: &'a mut dyn ArtifactSink,
    ) -> Self {
        Self {
            types,
            config,
            root: None,
            oracle: TypeOracle::new(),
            sink,
            diagnostics: Diagnostics::new(),
            resolving: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Generate on behalf of `root`: mapper-specific beans get root-prefixed names.
    pub fn for_root(mut self, root: RootMapper) -> Self {
        self.root = Some(root);
        self
    }

    pub fn oracle(&self) -> &TypeOracle {
        &self.oracle
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    pub fn resolve_serializer(
        &mut self,
        ty: &TypeRef,
        subtype: bool,
    ) -> CodegenResult<CodecDescriptor> {
        let scope = Scope {
            subtype,
            ..ROOT_SCOPE
        };
        self.resolve(ty, Direction::Serialize, scope)
    }

    pub fn resolve_deserializer(
        &mut self,
        ty: &TypeRef,
        subtype: bool,
    ) -> CodegenResult<CodecDescriptor> {
        let scope = Scope {
            subtype,
            ..ROOT_SCOPE
        };
        self.resolve(ty, Direction::Deserialize, scope)
    }

    pub fn resolve_key_serializer(&mut self, ty: &TypeRef) -> CodegenResult<CodecDescriptor> {
        self.resolve_key(ty, Direction::Serialize, ROOT_SCOPE)
    }

    pub fn resolve_key_deserializer(&mut self, ty: &TypeRef) -> CodegenResult<CodecDescriptor> {
        self.resolve_key(ty, Direction::Deserialize, ROOT_SCOPE)
    }

    /// Make sure the `direction` codec of bean `bean_type` exists and return its identities.
    pub fn generate(
        &mut self,
        bean_type: &str,
        direction: Direction,
    ) -> CodegenResult<GeneratedArtifactInfo> {
        let class = self
            .declaration(bean_type)
            .ok_or_else(|| CodegenError::unsupported(bean_type, "Type is not supported"))?;
        let info = self.ensure_bean_codec(&class, direction)?;
        Ok(info.artifacts.clone())
    }

    /// Hand a plan built outside the bean generator to the sink.
    ///
    /// Returns false when an artifact with the same name already exists.
    pub fn emit(&mut self, plan: ArtifactPlan) -> CodegenResult<bool> {
        if !self.sink.try_create(plan.name()) {
            return Ok(false);
        }
        self.sink.commit(plan)?;
        Ok(true)
    }

    // ------------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------------

    fn declaration(&self, name: &str) -> Option<Cow<'a, ClassDescriptor>> {
        let types = self.types;
        match types.class(name) {
            Some(class) => Some(Cow::Borrowed(class)),
            None if name == OBJECT => Some(Cow::Owned(ClassDescriptor::new("java.lang", "Object"))),
            None if name == SERIALIZABLE => Some(Cow::Owned(
                ClassDescriptor::new("java.io", "Serializable").with_kind(ClassKind::Interface),
            )),
            None => None,
        }
    }

    fn configured(&self, ty: &TypeRef, direction: Direction) -> Option<CodecFactory> {
        match direction {
            Direction::Serialize => self.config.serializer_for(ty),
            Direction::Deserialize => self.config.deserializer_for(ty),
        }
        .cloned()
    }

    fn resolve(
        &mut self,
        ty: &TypeRef,
        direction: Direction,
        scope: Scope<'_>,
    ) -> CodegenResult<CodecDescriptor> {
        let ty = ty.unwrap_wildcard_and_raw();

        if let TypeRef::TypeParameter { declaring, name } = &ty {
            return self.resolve_type_parameter(&ty, declaring, name, direction, scope);
        }

        if let Some(factory) = self.configured(&ty, direction) {
            return self.resolve_configured(ty, factory, direction, scope);
        }

        if let Some(name) = ty.class_name()
            && TypeOracle::is_host_object(self.types, &self.config.host_object_type, name)
        {
            let host = TypeRef::class(self.config.host_object_type.clone());
            let factory = self.configured(&host, direction).ok_or_else(|| {
                CodegenError::Unexpected(format!(
                    "No {direction} registered for host object type {}",
                    self.config.host_object_type
                ))
            })?;
            return self.resolve_configured(ty, factory, direction, scope);
        }

        if let Some(name) = ty.class_name() {
            if name == ENUM {
                return match direction {
                    Direction::Serialize => {
                        Ok(CodecDescriptor::new(ty.clone(), direction, CodecInstance::AnyEnum))
                    }
                    Direction::Deserialize => Err(CodegenError::unsupported(
                        &ty,
                        "Enum type without a concrete enum class is not supported",
                    )),
                };
            }
            if let Some(class) = self.types.class(name)
                && class.is_enum()
            {
                let instance = CodecInstance::Enum {
                    enum_type: name.to_string(),
                };
                return Ok(CodecDescriptor::new(ty.clone(), direction, instance));
            }
        }

        if let TypeRef::Array { leaf, rank } = &ty {
            if *rank >= 3 {
                return Err(CodegenError::unsupported(
                    &ty,
                    "Arrays with 3 or more dimensions are not supported",
                ));
            }
            let leaf_codec = self.resolve(leaf, direction, scope)?;
            let instance = CodecInstance::Array {
                rank: *rank,
                leaf: (**leaf).clone(),
            };
            return Ok(CodecDescriptor::new(ty.clone(), direction, instance)
                .with_parameters(vec![leaf_codec]));
        }

        if let Some(name) = ty.class_name() {
            if self.types.class(name).is_some_and(ClassDescriptor::is_annotation) {
                return Err(CodegenError::unsupported(&ty, "Annotations are not supported"));
            }
            if let Some(class) = self.declaration(name) {
                return self.resolve_bean(&ty, &class, direction, scope);
            }
        }

        Err(CodegenError::unsupported(&ty, "Type is not supported"))
    }

    fn resolve_type_parameter(
        &mut self,
        ty: &TypeRef,
        declaring: &str,
        name: &str,
        direction: Direction,
        scope: Scope<'_>,
    ) -> CodegenResult<CodecDescriptor> {
        let declaration = self.declaration(declaring);
        let param = declaration.as_deref().and_then(|d| d.type_param(name));

        if scope.bean == Some(declaring) {
            let (ordinal, _) = param.ok_or_else(|| {
                CodegenError::Unexpected(format!("{declaring} declares no type parameter {name}"))
            })?;
            let instance = CodecInstance::TypeParameter { ordinal };
            return Ok(CodecDescriptor::new(ty.clone(), direction, instance));
        }
        if scope.subtype {
            let bound = param
                .map(|(_, p)| p.bound().erasure())
                .unwrap_or_else(TypeRef::object);
            return self.resolve(&bound, direction, scope);
        }
        Err(CodegenError::unsupported(ty, "Unresolved type parameter"))
    }

    fn resolve_configured(
        &mut self,
        ty: TypeRef,
        factory: CodecFactory,
        direction: Direction,
        scope: Scope<'_>,
    ) -> CodegenResult<CodecDescriptor> {
        let mut parameters = Vec::with_capacity(factory.parameters.len());
        if !factory.parameters.is_empty() {
            let args = self.configured_arguments(&ty, factory.parameters.len());
            if args.len() != factory.parameters.len() {
                return Err(CodegenError::Configuration(format!(
                    "{} for {} expects {} type arguments, found {}",
                    factory.codec,
                    ty,
                    factory.parameters.len(),
                    args.len()
                )));
            }
            for (arg, role) in args.iter().zip(&factory.parameters) {
                let child = match role {
                    ParameterRole::Plain => self.resolve(arg, direction, scope)?,
                    ParameterRole::Key => self.resolve_key(arg, direction, scope)?.as_key(),
                };
                parameters.push(child);
            }
        }
        let instance = CodecInstance::Factory {
            codec: factory.codec,
            creation: factory.creation,
        };
        Ok(CodecDescriptor::new(ty, direction, instance).with_parameters(parameters))
    }

    /// Type arguments fed to a generic factory: the actual ones, else the declared bounds.
    fn configured_arguments(&self, ty: &TypeRef, slots: usize) -> Vec<TypeRef> {
        if ty.is_parameterized() {
            return ty.type_args().to_vec();
        }
        match ty.class_name().and_then(|name| self.types.class(name)) {
            Some(class) if class.is_generic() => class
                .type_params
                .iter()
                .map(|p| TypeRef::wildcard(p.bound()))
                .collect(),
            _ => vec![TypeRef::object(); slots],
        }
    }

    fn resolve_key(
        &mut self,
        ty: &TypeRef,
        direction: Direction,
        scope: Scope<'_>,
    ) -> CodegenResult<CodecDescriptor> {
        let ty = ty.unwrap_wildcard_and_raw();

        if let TypeRef::TypeParameter { declaring, name } = &ty
            && scope.subtype
        {
            let bound = self
                .declaration(declaring)
                .and_then(|d| d.type_param(name).map(|(_, p)| p.bound().erasure()))
                .unwrap_or_else(TypeRef::object);
            return self.resolve_key(&bound, direction, scope);
        }

        let configured = match direction {
            Direction::Serialize => self.config.key_serializer_for(&ty),
            Direction::Deserialize => self.config.key_deserializer_for(&ty),
        };
        if let Some(factory) = configured {
            let instance = CodecInstance::Factory {
                codec: factory.codec.clone(),
                creation: factory.creation.clone(),
            };
            return Ok(CodecDescriptor::new(ty, direction, instance).as_key());
        }

        if let Some(name) = ty.class_name() {
            if let Some(class) = self.types.class(name)
                && class.is_enum()
            {
                let instance = CodecInstance::EnumKey {
                    enum_type: name.to_string(),
                };
                return Ok(CodecDescriptor::new(ty.clone(), direction, instance).as_key());
            }
            if name == ENUM && direction == Direction::Serialize {
                return Ok(CodecDescriptor::new(ty.clone(), direction, CodecInstance::AnyEnum).as_key());
            }
        }

        Err(CodegenError::unsupported(&ty, "Not supported as map's key"))
    }

    fn resolve_bean(
        &mut self,
        ty: &TypeRef,
        class: &ClassDescriptor,
        direction: Direction,
        scope: Scope<'_>,
    ) -> CodegenResult<CodecDescriptor> {
        let info = self.ensure_bean_codec(class, direction)?;
        let args = self.bean_type_arguments(ty, class, scope);

        self.resolving.push(info.bean.ty.clone());
        let children: CodegenResult<Vec<CodecDescriptor>> = args
            .iter()
            .map(|arg| self.resolve(arg, direction, scope))
            .collect();
        self.resolving.pop();

        let instance = CodecInstance::Bean {
            artifact: info.artifacts.artifact(direction).clone(),
        };
        Ok(CodecDescriptor::new(ty.clone(), direction, instance).with_parameters(children?))
    }

    /// Actual type arguments of a bean reference, one per declared type parameter.
    ///
    /// A subtype registered for a generic bean maps its own parameters onto the
    /// bean's through its supertype chain; unmatched ones fall back to their bound.
    fn bean_type_arguments(
        &self,
        ty: &TypeRef,
        class: &ClassDescriptor,
        scope: Scope<'_>,
    ) -> Vec<TypeRef> {
        if !class.is_generic() {
            return Vec::new();
        }
        if ty.is_parameterized() {
            return ty.type_args().to_vec();
        }
        let name = class.name();

        if scope.subtype
            && let Some(base) = scope.bean
            && let Some(base_class) = self.declaration(base)
        {
            let mapped = self
                .types
                .flattened_supertypes(&name)
                .into_iter()
                .find(|t| t.class_name() == Some(base));
            return class
                .type_params
                .iter()
                .map(|param| {
                    mapped
                        .as_ref()
                        .and_then(|m| {
                            m.type_args().iter().position(|arg| {
                                matches!(arg, TypeRef::TypeParameter { declaring, name: n }
                                    if *declaring == name && *n == param.name)
                            })
                        })
                        .and_then(|i| base_class.type_params.get(i))
                        .map(|p| TypeRef::type_parameter(base, p.name.clone()))
                        .unwrap_or_else(|| self.bound_argument(param))
                })
                .collect();
        }

        class
            .type_params
            .iter()
            .map(|param| self.bound_argument(param))
            .collect()
    }

    fn bound_argument(&self, param: &TypeParamDecl) -> TypeRef {
        let bound = param.bound().erasure();
        match bound.class_name() {
            Some(name) if self.resolving.iter().any(|r| r == name) => TypeRef::object(),
            _ => bound,
        }
    }

    // ------------------------------------------------------------------------
    // Bean codecs
    // ------------------------------------------------------------------------

    fn mapper_info(&mut self, class: &ClassDescriptor) -> Rc<MapperInfo> {
        let name = class.name();
        if let Some(info) = self.oracle.get_info(&name) {
            return info;
        }

        let (package, same_package) = artifact_package(self.config, &class.package);
        let base = artifact_base_name(self.types, self.config, class, self.root.as_ref());
        let artifacts = GeneratedArtifactInfo {
            bean_type: name,
            serializer: ArtifactName::new(package.clone(), format!("{base}{SERIALIZER_SUFFIX}")),
            deserializer: ArtifactName::new(
                package.clone(),
                format!("{base}{DESERIALIZER_SUFFIX}"),
            ),
            package,
            same_package,
        };

        let info = bean::process_bean(self.types, self.config, class, &mut self.diagnostics);
        let properties = find_all_properties(
            self.types,
            self.config,
            class,
            &info,
            same_package,
            &mut self.diagnostics,
        );
        let info = bean::process_properties(info, &properties, &mut self.diagnostics);
        self.oracle.put_info(artifacts, info, properties)
    }

    fn mapper_info_by_name(&mut self, name: &str) -> CodegenResult<Rc<MapperInfo>> {
        let class = self
            .declaration(name)
            .ok_or_else(|| CodegenError::unsupported(name, "Type is not supported"))?;
        Ok(self.mapper_info(&class))
    }

    fn ensure_bean_codec(
        &mut self,
        class: &ClassDescriptor,
        direction: Direction,
    ) -> CodegenResult<Rc<MapperInfo>> {
        let info = self.mapper_info(class);
        if direction == Direction::Deserialize && !info.bean.is_deserializable() {
            return Err(CodegenError::unsupported(
                &info.bean.ty,
                "No usable constructor or creator, the type cannot be deserialized",
            ));
        }

        let artifact = info.artifacts.artifact(direction).clone();
        if !self.sink.try_create(&artifact) {
            return Ok(info);
        }

        let _span = debug_span!("bean_codec", bean = %info.bean.ty, %direction).entered();
        debug!("Creating {direction} {artifact}");

        self.pending.push(Vec::new());
        let plan = match direction {
            Direction::Serialize => self.serializer_plan(&info).map(ArtifactPlan::Serializer),
            Direction::Deserialize => self.deserializer_plan(&info).map(ArtifactPlan::Deserializer),
        };
        let mut finished = self.pending.pop().unwrap_or_default();
        match plan {
            Ok(plan) => {
                finished.push(plan);
                match self.pending.last_mut() {
                    Some(enclosing) => enclosing.extend(finished),
                    None => {
                        for plan in finished {
                            self.sink.commit(plan)?;
                        }
                    }
                }
            }
            Err(err) => {
                // Nested codecs may reference this artifact.
                for nested in &finished {
                    self.sink.release(nested.name());
                }
                self.sink.release(&artifact);
                return Err(err);
            }
        }
        Ok(info)
    }

    fn bean_generic_type(info: &MapperInfo) -> TypeRef {
        let args = info
            .bean
            .type_params
            .iter()
            .map(|p| TypeRef::type_parameter(info.bean.ty.clone(), p.name.clone()))
            .collect();
        TypeRef::parameterized(info.bean.ty.clone(), args)
    }

    fn serializer_plan(&mut self, info: &MapperInfo) -> CodegenResult<SerializerPlan> {
        let scope = Scope::bean(&info.bean.ty);

        let mut properties = Vec::new();
        for property in info.properties.iter() {
            if property.ignored || property.back_reference.is_some() || property.getter.is_none() {
                continue;
            }
            if let Some(built) = self.warn_unsupported(property, |g| g.serializer_property(property, scope))? {
                properties.push(built);
            }
        }

        let value = match &info.properties.value {
            Some(property) => self.warn_unsupported(property, |g| g.serializer_property(property, scope))?,
            None => None,
        };
        let any_getter = match &info.properties.any_getter {
            Some(property) => self.warn_unsupported(property, |g| g.serializer_property(property, scope))?,
            None => None,
        };

        let identity = match &info.bean.identity {
            Some(identity) => {
                self.identity_or_warn(identity, &info.bean.ty, Direction::Serialize)?
            }
            None => None,
        };

        let subtypes = self.subtype_bindings(&info.bean.ty, Direction::Serialize)?;

        Ok(SerializerPlan {
            name: info.artifacts.serializer.clone(),
            bean: Self::bean_generic_type(info),
            type_params: info.bean.type_params.clone(),
            base: if value.is_some() {
                SerializerBase::ValueBean
            } else {
                SerializerBase::Bean
            },
            value,
            properties,
            any_getter,
            identity,
            type_info: info.bean.serialization_type_info.clone(),
            subtypes,
        })
    }

    fn deserializer_plan(&mut self, info: &MapperInfo) -> CodegenResult<DeserializerPlan> {
        let scope = Scope::bean(&info.bean.ty);
        let same_package = info.artifacts.same_package;

        let base = if info.bean.ty == OBJECT {
            DeserializerBase::Object
        } else if info.bean.ty == SERIALIZABLE {
            DeserializerBase::Serializable
        } else if info.bean.creator.is_delegating() {
            DeserializerBase::Delegation
        } else {
            DeserializerBase::Bean
        };

        let instance_builder = match &info.bean.creator {
            CreatorStrategy::None => None,
            CreatorStrategy::Default(creator) => Some(InstanceBuilderPlan::Default {
                creator: creator_call(creator, same_package),
            }),
            CreatorStrategy::Parameterized(creator) => {
                let mut arguments = Vec::with_capacity(creator.params.len());
                for param in &creator.params {
                    arguments.push(self.creator_argument(info, &param.name, &param.ty, param.required, scope)?);
                }
                Some(InstanceBuilderPlan::Parameterized {
                    creator: creator_call(creator, same_package),
                    arguments,
                })
            }
            CreatorStrategy::Delegating(creator) => {
                let param = creator.params.first().ok_or_else(|| {
                    CodegenError::Unexpected(format!(
                        "Delegating creator of {} has no parameter",
                        info.bean.ty
                    ))
                })?;
                let delegate = self.creator_argument(info, &param.name, &param.ty, param.required, scope)?;
                Some(InstanceBuilderPlan::Delegating {
                    creator: creator_call(creator, same_package),
                    delegate,
                })
            }
        };

        let mut properties = Vec::new();
        let mut back_references = Vec::new();
        let mut ignored_properties = Vec::new();
        let mut required_properties = Vec::new();
        let mut any_setter = None;

        if !info.bean.creator.is_delegating() {
            for property in info.properties.iter() {
                if property.ignored {
                    ignored_properties.push(property.name.clone());
                    continue;
                }
                if info.bean.creator.binds(&property.name) {
                    continue;
                }
                let Some(setter) = property.setter.clone() else {
                    continue;
                };
                if let Some(reference) = &property.back_reference {
                    back_references.push(BackReferenceBinding {
                        reference: reference.clone(),
                        property: property.name.clone(),
                        ty: property.ty.clone(),
                        accessor: setter,
                    });
                    continue;
                }
                match self.warn_unsupported(property, |g| g.deserializer_property(property, setter, scope))? {
                    Some(built) => {
                        if property.required {
                            required_properties.push(property.name.clone());
                        }
                        properties.push(built);
                    }
                    None => ignored_properties.push(property.name.clone()),
                }
            }

            if let Some(property) = &info.properties.any_setter
                && let Some(setter) = property.setter.clone()
            {
                any_setter =
                    self.warn_unsupported(property, |g| g.deserializer_property(property, setter, scope))?;
            }
        }

        let identity = match &info.bean.identity {
            Some(identity) => {
                self.identity_or_warn(identity, &info.bean.ty, Direction::Deserialize)?
            }
            None => None,
        };

        let subtypes = self.subtype_bindings(&info.bean.ty, Direction::Deserialize)?;

        Ok(DeserializerPlan {
            name: info.artifacts.deserializer.clone(),
            bean: Self::bean_generic_type(info),
            type_params: info.bean.type_params.clone(),
            base,
            instance_builder,
            properties,
            back_references,
            ignored_properties,
            required_properties,
            any_setter,
            identity,
            type_info: info.bean.deserialization_type_info.clone(),
            subtypes,
            ignore_unknown: info.bean.ignore_unknown,
        })
    }

    /// Run `build` for `property`, turning a recoverable failure into a warning.
    fn warn_unsupported<T>(
        &mut self,
        property: &PropertyInfo,
        build: impl FnOnce(&mut Self) -> CodegenResult<T>,
    ) -> CodegenResult<Option<T>> {
        match build(self) {
            Ok(built) => Ok(Some(built)),
            Err(err) if err.is_recoverable() => {
                self.diagnostics
                    .warn(format!("Property '{}' is ignored. {err}", property.name));
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn serializer_property(
        &mut self,
        property: &PropertyInfo,
        scope: Scope<'_>,
    ) -> CodegenResult<SerializerProperty> {
        let accessor = property.getter.clone().ok_or_else(|| {
            CodegenError::Unexpected(format!("Property '{}' has no getter", property.name))
        })?;
        let codec = if property.raw_value {
            CodecDescriptor::new(property.ty.clone(), Direction::Serialize, CodecInstance::RawValue)
        } else {
            self.resolve(&property.ty, Direction::Serialize, scope)?
        };
        let parameters = self.property_parameters(property, &codec, Direction::Serialize);
        let escaped_name = escape_java_string(&property.name);
        let name_emission = if property.unwrapped {
            Some(NameEmission::Unwrapped)
        } else if escaped_name != property.name {
            Some(NameEmission::Escaped)
        } else {
            None
        };
        Ok(SerializerProperty {
            name: property.name.clone(),
            escaped_name,
            ty: property.ty.clone(),
            accessor,
            codec,
            name_emission,
            parameters,
        })
    }

    fn deserializer_property(
        &mut self,
        property: &PropertyInfo,
        accessor: property::Accessor,
        scope: Scope<'_>,
    ) -> CodegenResult<DeserializerProperty> {
        let codec = self.resolve(&property.ty, Direction::Deserialize, scope)?;
        let parameters = self.property_parameters(property, &codec, Direction::Deserialize);
        Ok(DeserializerProperty {
            name: property.name.clone(),
            escaped_name: escape_java_string(&property.name),
            ty: property.ty.clone(),
            accessor,
            codec,
            parameters,
            managed_reference: property.managed_reference.clone(),
        })
    }

    fn creator_argument(
        &mut self,
        info: &MapperInfo,
        name: &str,
        ty: &TypeRef,
        required: bool,
        scope: Scope<'_>,
    ) -> CodegenResult<CreatorArgument> {
        let codec = self.resolve(ty, Direction::Deserialize, scope).map_err(|err| {
            err.escalate(format!(
                "Cannot resolve creator argument '{name}' of {}",
                info.bean.ty
            ))
        })?;
        let property = info.properties.get(name);
        let parameters =
            property.and_then(|p| self.property_parameters(p, &codec, Direction::Deserialize));
        Ok(CreatorArgument {
            name: name.to_string(),
            escaped_name: escape_java_string(name),
            ty: ty.clone(),
            default_value: ty.default_value(),
            codec,
            parameters,
            required: property.map_or(required, |p| p.required),
        })
    }

    /// Per-property codec settings, `None` when nothing is set.
    fn property_parameters(
        &mut self,
        property: &PropertyInfo,
        codec: &CodecDescriptor,
        direction: Direction,
    ) -> Option<PropertyParameters> {
        let mut parameters = PropertyParameters::default();

        if let Some(format) = &property.format {
            parameters.pattern = format.pattern.clone().filter(|p| !p.is_empty());
            parameters.shape = Some(format.shape);
            if let Some(locale) = format
                .locale
                .as_ref()
                .filter(|l| !l.is_empty() && *l != DEFAULT_FORMAT_VALUE)
            {
                self.diagnostics.warn(format!(
                    "Locale '{locale}' of property '{}' is not supported by default",
                    property.name
                ));
                parameters.locale = Some(locale.clone());
            }
            if direction == Direction::Serialize
                && let Some(zone) = format
                    .timezone
                    .as_ref()
                    .filter(|z| !z.is_empty() && *z != DEFAULT_FORMAT_VALUE)
            {
                parameters.timezone_offset_minutes =
                    Some(i64::from(zone_offset_minutes(zone, &mut self.diagnostics)));
            }
        }

        if let Some(ignored) = &property.ignored_properties {
            parameters.ignored_properties = ignored.clone();
        }

        let annotated = codec
            .first_bean_mapper()
            .and_then(|c| c.ty.class_name())
            .map(str::to_string);
        if let Some(identity) = &property.identity {
            match annotated.as_deref() {
                Some(bean) => match self.identity_plan(identity, bean, direction) {
                    Ok(plan) => parameters.identity = Some(plan),
                    Err(_) => self
                        .diagnostics
                        .warn("Identity type is not supported. We ignore it."),
                },
                None => self
                    .diagnostics
                    .warn("Identity type is not supported. We ignore it."),
            }
        }

        match direction {
            Direction::Serialize => {
                parameters.include = property.include;
                parameters.type_info = property.serialization_type_info.clone();
                parameters.unwrapped = property.unwrapped;
            }
            Direction::Deserialize => {
                parameters.ignore_unknown = property.ignore_unknown;
                parameters.type_info = property.deserialization_type_info.clone();
            }
        }

        (!parameters.is_empty()).then_some(parameters)
    }

    fn identity_or_warn(
        &mut self,
        identity: &BeanIdentityInfo,
        bean: &str,
        direction: Direction,
    ) -> CodegenResult<Option<IdentityPlan>> {
        match self.identity_plan(identity, bean, direction) {
            Ok(plan) => Ok(Some(plan)),
            Err(err) if err.is_recoverable() => {
                self.diagnostics
                    .warn("Identity type is not supported. We ignore it.");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn identity_plan(
        &mut self,
        identity: &BeanIdentityInfo,
        bean: &str,
        direction: Direction,
    ) -> CodegenResult<IdentityPlan> {
        let source = if identity.is_property_backed() {
            let info = self.mapper_info_by_name(bean)?;
            let property = info.properties.get(&identity.property).ok_or_else(|| {
                CodegenError::unsupported(
                    bean,
                    format!("Identity property '{}' does not exist", identity.property),
                )
            })?;
            let codec = self.resolve(&property.ty, direction, Scope::bean(bean))?;
            IdentitySource::Property {
                ty: property.ty.clone(),
                accessor: match direction {
                    Direction::Serialize => property.getter.clone(),
                    Direction::Deserialize => None,
                },
                codec,
            }
        } else {
            let id_type = identity.id_type.clone().ok_or_else(|| {
                CodegenError::unsupported(identity.generator.class_name(), "Identity type is unknown")
            })?;
            let codec = self.resolve(&id_type, direction, Scope::bean(bean))?;
            IdentitySource::Generator { id_type, codec }
        };
        Ok(IdentityPlan {
            property: identity.property.clone(),
            always_as_id: identity.always_as_id,
            generator: identity.generator.clone(),
            scope: identity.scope.clone(),
            source,
        })
    }

    fn subtype_bindings(
        &mut self,
        bean: &str,
        direction: Direction,
    ) -> CodegenResult<Vec<SubtypeBinding>> {
        let subtypes = match direction {
            Direction::Serialize => self.config.filter_subtypes_for_serialization(self.types, bean),
            Direction::Deserialize => {
                self.config.filter_subtypes_for_deserialization(self.types, bean)
            }
        };

        let mut bindings = Vec::with_capacity(subtypes.len());
        for subtype in subtypes {
            let ty = TypeRef::class(subtype.clone());
            match self.resolve(&ty, direction, Scope::subtypes_of(bean)) {
                Ok(codec) => bindings.push(SubtypeBinding {
                    kind: if codec.bean_mapper {
                        SubtypeKind::Bean
                    } else {
                        SubtypeKind::Default
                    },
                    subtype,
                    codec,
                }),
                Err(err) if err.is_recoverable() => {
                    self.diagnostics
                        .warn(format!("Subtype '{subtype}' is not supported. We ignore it."));
                }
                Err(err) => return Err(err),
            }
        }
        Ok(bindings)
    }
}

fn creator_call(creator: &Creator, same_package: bool) -> CreatorCall {
    CreatorCall {
        kind: creator.kind.clone(),
        bridged: needs_bridge(creator.access, same_package),
    }
}

#[cfg(test)]
#[path = "generator/generator_tests.rs"]
mod generator_tests;
