//! Bean metadata.
//!
//! [`process_bean`] derives a [`BeanInfo`] from a class declaration and its
//! hierarchy: the creator used to instantiate it, polymorphic type info,
//! identity info, visibility rules, ignored names and property ordering.
//! [`process_properties`] finishes it once the properties are known.
//!
//! Type-level directives are looked up on the whole hierarchy, nearest
//! first, and a mixin registered for a type is consulted before the type
//! itself.

use crate::naming::binary_name;
use crate::property::PropertiesContainer;
use beanmap_core::{
    Access, ClassDescriptor, Configuration, ConstructorDescriptor, CreatorMode, Diagnostics,
    IdGenerator, MethodDescriptor, OBJECT, ParamDescriptor, PropertyDirectives, TypeDirectives,
    TypeIdKind, TypeInclusion, TypeInfoDirective, TypeParamDecl, TypeRef, TypeSource, Visibility,
};
use std::collections::BTreeSet;

/// How the creator is invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatorKind {
    Constructor,
    /// Static factory method of the bean type.
    Factory(String),
}

/// A creator parameter bound to a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatorParam {
    pub name: String,
    pub ty: TypeRef,
    pub required: bool,
    pub directives: PropertyDirectives,
}

/// The constructor or factory chosen to instantiate a bean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Creator {
    pub kind: CreatorKind,
    pub access: Access,
    pub params: Vec<CreatorParam>,
}

/// Instantiation strategy of a bean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatorStrategy {
    /// No-argument creator, properties are set afterwards.
    Default(Creator),
    /// Creator taking named properties as arguments.
    Parameterized(Creator),
    /// Creator taking the whole decoded input as its only argument.
    Delegating(Creator),
    /// The bean cannot be instantiated directly.
    None,
}

impl CreatorStrategy {
    pub fn creator(&self) -> Option<&Creator> {
        match self {
            CreatorStrategy::Default(c)
            | CreatorStrategy::Parameterized(c)
            | CreatorStrategy::Delegating(c) => Some(c),
            CreatorStrategy::None => None,
        }
    }

    /// Names of properties bound to creator arguments.
    pub fn parameter_names(&self) -> Vec<&str> {
        match self {
            CreatorStrategy::Parameterized(c) => c.params.iter().map(|p| p.name.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    pub fn binds(&self, property: &str) -> bool {
        self.parameter_names().contains(&property)
    }

    pub fn is_delegating(&self) -> bool {
        matches!(self, CreatorStrategy::Delegating(_))
    }
}

/// Resolved auto-detection thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityRules {
    pub field: Visibility,
    pub getter: Visibility,
    pub is_getter: Visibility,
    pub setter: Visibility,
    pub creator: Visibility,
}

impl Default for VisibilityRules {
    fn default() -> Self {
        Self {
            field: Visibility::PublicOnly,
            getter: Visibility::PublicOnly,
            is_getter: Visibility::PublicOnly,
            setter: Visibility::Any,
            creator: Visibility::Any,
        }
    }
}

/// Polymorphic type information for one direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeanTypeInfo {
    pub inclusion: TypeInclusion,
    pub property: String,
    /// Qualified class name to type tag, in registration order.
    pub tags: Vec<(String, String)>,
}

/// Object identity settings of a bean or property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeanIdentityInfo {
    pub property: String,
    pub generator: IdGenerator,
    pub scope: String,
    pub always_as_id: bool,
    /// Type of the ids; for property-backed ids, the property's type once known.
    pub id_type: Option<TypeRef>,
}

impl BeanIdentityInfo {
    pub fn is_property_backed(&self) -> bool {
        self.generator == IdGenerator::Property
    }
}

/// Derived metadata of one bean declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeanInfo {
    /// Qualified name of the declaration.
    pub ty: String,
    pub type_params: Vec<TypeParamDecl>,
    pub creator: CreatorStrategy,
    pub serialization_type_info: Option<BeanTypeInfo>,
    pub deserialization_type_info: Option<BeanTypeInfo>,
    pub identity: Option<BeanIdentityInfo>,
    pub visibility: VisibilityRules,
    pub ignored_fields: BTreeSet<String>,
    pub property_order: Vec<String>,
    pub alphabetic: bool,
    pub ignore_unknown: bool,
    /// Whether the declaration can be instantiated at all.
    pub concrete: bool,
}

impl BeanInfo {
    /// Whether a deserializer can be generated.
    pub fn is_deserializable(&self) -> bool {
        !(self.concrete && self.creator == CreatorStrategy::None)
    }
}

/// First value produced by `extract` on the hierarchy of `name`, nearest type
/// first; a type's mixin is consulted before the type.
pub fn find_type_directive<T>(
    types: &dyn TypeSource,
    config: &Configuration,
    name: &str,
    extract: impl Fn(&TypeDirectives) -> Option<T>,
) -> Option<T> {
    for ty in types.flattened_supertypes(name) {
        let Some(class_name) = ty.class_name() else {
            continue;
        };
        let mixin = config.mixin_for(class_name).and_then(|m| types.class(m));
        for class in mixin.into_iter().chain(types.class(class_name)) {
            if let Some(found) = extract(&class.directives) {
                return Some(found);
            }
        }
    }
    None
}

/// Derive the bean metadata of `class`.
pub fn process_bean(
    types: &dyn TypeSource,
    config: &Configuration,
    class: &ClassDescriptor,
    diagnostics: &mut Diagnostics,
) -> BeanInfo {
    let name = class.name();
    let visibility = visibility_rules(types, config, &name);
    let creator = find_creator(class, &visibility, diagnostics);

    let ignored_fields = find_type_directive(types, config, &name, |d| {
        (!d.ignored_properties.is_empty()).then(|| d.ignored_properties.clone())
    })
    .unwrap_or_default()
    .into_iter()
    .collect();
    let ignore_unknown =
        find_type_directive(types, config, &name, |d| d.ignore_unknown.then_some(true))
            .unwrap_or(false);
    let property_order = find_type_directive(types, config, &name, |d| {
        (!d.property_order.is_empty()).then(|| d.property_order.clone())
    })
    .unwrap_or_default();
    let alphabetic =
        find_type_directive(types, config, &name, |d| d.alphabetic.then_some(true)).unwrap_or(false);

    let identity = find_type_directive(types, config, &name, |d| d.identity.clone()).map(|d| {
        let always_as_id =
            find_type_directive(types, config, &name, |t| t.always_as_id.then_some(true))
                .unwrap_or(false);
        BeanIdentityInfo {
            property: d.property,
            id_type: d.generator.id_type(),
            generator: d.generator,
            scope: d.scope.unwrap_or_else(|| OBJECT.to_string()),
            always_as_id,
        }
    });

    let (serialization_type_info, deserialization_type_info) =
        match find_type_directive(types, config, &name, |d| d.type_info.clone()) {
            Some(directive) => type_info_for(types, config, &name, &directive, diagnostics),
            None => (None, None),
        };

    BeanInfo {
        ty: name,
        type_params: class.type_params.clone(),
        creator,
        serialization_type_info,
        deserialization_type_info,
        identity,
        visibility,
        ignored_fields,
        property_order,
        alphabetic,
        ignore_unknown,
        concrete: class.is_concrete(),
    }
}

/// Finish the bean metadata once its properties are known: property-backed
/// identity takes the type of the property it names.
pub fn process_properties(
    mut bean: BeanInfo,
    properties: &PropertiesContainer,
    diagnostics: &mut Diagnostics,
) -> BeanInfo {
    let missing = match &mut bean.identity {
        Some(identity) if identity.is_property_backed() => {
            match properties.get(&identity.property) {
                Some(property) => {
                    identity.id_type = Some(property.ty.clone());
                    None
                }
                None => Some(identity.property.clone()),
            }
        }
        _ => None,
    };
    if let Some(property) = missing {
        diagnostics.warn(format!(
            "Property '{property}' used as identity of {} does not exist, identity info is ignored",
            bean.ty
        ));
        bean.identity = None;
    }
    bean
}

fn visibility_rules(types: &dyn TypeSource, config: &Configuration, name: &str) -> VisibilityRules {
    let defaults = VisibilityRules::default();
    let find = |category: fn(&TypeDirectives) -> Visibility, fallback: Visibility| {
        find_type_directive(types, config, name, |d| {
            let v = category(d);
            (v != Visibility::Default).then_some(v)
        })
        .unwrap_or(fallback)
    };
    VisibilityRules {
        field: find(|d| d.auto_detect.field, defaults.field),
        getter: find(|d| d.auto_detect.getter, defaults.getter),
        is_getter: find(|d| d.auto_detect.is_getter, defaults.is_getter),
        setter: find(|d| d.auto_detect.setter, defaults.setter),
        creator: find(|d| d.auto_detect.creator, defaults.creator),
    }
}

fn creator_from(
    kind: CreatorKind,
    access: Access,
    params: &[ParamDescriptor],
) -> Option<Creator> {
    let params = params
        .iter()
        .map(|p| {
            Some(CreatorParam {
                name: p.property_name()?.to_string(),
                ty: p.ty.clone(),
                required: p.directives.required,
                directives: p.directives.clone(),
            })
        })
        .collect::<Option<Vec<_>>>()?;
    Some(Creator {
        kind,
        access,
        params,
    })
}

fn delegating_from(kind: CreatorKind, access: Access, param: &ParamDescriptor) -> Creator {
    Creator {
        kind,
        access,
        params: vec![CreatorParam {
            name: param.name.clone().unwrap_or_else(|| "delegate".to_string()),
            ty: param.ty.clone(),
            required: false,
            directives: param.directives.clone(),
        }],
    }
}

fn designated_strategy(
    class_name: &str,
    kind: CreatorKind,
    access: Access,
    mode: CreatorMode,
    params: &[ParamDescriptor],
    diagnostics: &mut Diagnostics,
) -> Option<CreatorStrategy> {
    let delegating = match (mode, params) {
        (CreatorMode::Delegating, [_]) => true,
        (CreatorMode::Default, [only]) => only.property_name().is_none(),
        _ => false,
    };
    if delegating {
        return Some(CreatorStrategy::Delegating(delegating_from(kind, access, &params[0])));
    }
    if mode == CreatorMode::Delegating {
        diagnostics.warn(format!(
            "Delegating creator of {class_name} must take exactly one parameter"
        ));
        return None;
    }
    match creator_from(kind, access, params) {
        Some(creator) if creator.params.is_empty() => Some(CreatorStrategy::Default(creator)),
        Some(creator) => Some(CreatorStrategy::Parameterized(creator)),
        None => {
            diagnostics.warn(format!(
                "Every parameter of the creator of {class_name} must be named"
            ));
            None
        }
    }
}

fn is_factory_of(method: &MethodDescriptor, class: &ClassDescriptor) -> bool {
    method.is_static
        && method
            .returns
            .as_ref()
            .and_then(TypeRef::class_name)
            .is_some_and(|returned| returned == class.name())
}

/// Pick the creator: a designated constructor or factory first, then the
/// no-argument constructor, then a single visible constructor with named
/// parameters.
fn find_creator(
    class: &ClassDescriptor,
    visibility: &VisibilityRules,
    diagnostics: &mut Diagnostics,
) -> CreatorStrategy {
    let name = class.name();
    let concrete = class.is_concrete();

    let designated_constructor = class
        .constructors
        .iter()
        .filter(|_| concrete)
        .find_map(|c| c.creator.map(|mode| (c, mode)));
    if let Some((constructor, mode)) = designated_constructor {
        if let Some(strategy) = designated_strategy(
            &name,
            CreatorKind::Constructor,
            constructor.access,
            mode,
            &constructor.params,
            diagnostics,
        ) {
            return strategy;
        }
    }

    let designated_factory = class
        .methods
        .iter()
        .filter(|m| is_factory_of(m, class))
        .find_map(|m| m.creator.map(|mode| (m, mode)));
    if let Some((factory, mode)) = designated_factory {
        if let Some(strategy) = designated_strategy(
            &name,
            CreatorKind::Factory(factory.name.clone()),
            factory.access,
            mode,
            &factory.params,
            diagnostics,
        ) {
            return strategy;
        }
    }

    if !concrete {
        return CreatorStrategy::None;
    }

    let implicit_default = ConstructorDescriptor::no_arg();
    let constructors: Vec<&ConstructorDescriptor> = if class.constructors.is_empty() {
        vec![&implicit_default]
    } else {
        class.constructors.iter().collect()
    };

    if let Some(no_arg) = constructors.iter().find(|c| c.params.is_empty()) {
        return CreatorStrategy::Default(Creator {
            kind: CreatorKind::Constructor,
            access: no_arg.access,
            params: Vec::new(),
        });
    }

    let visible: Vec<&&ConstructorDescriptor> = constructors
        .iter()
        .filter(|c| visibility.creator.allows(c.access))
        .collect();
    if let [only] = visible.as_slice()
        && let Some(creator) = creator_from(CreatorKind::Constructor, only.access, &only.params)
    {
        return CreatorStrategy::Parameterized(creator);
    }

    CreatorStrategy::None
}

/// Serialization and deserialization type info of `base`.
pub(crate) fn type_info_for(
    types: &dyn TypeSource,
    config: &Configuration,
    base: &str,
    directive: &TypeInfoDirective,
    diagnostics: &mut Diagnostics,
) -> (Option<BeanTypeInfo>, Option<BeanTypeInfo>) {
    match directive.id {
        TypeIdKind::None => return (None, None),
        TypeIdKind::Custom => {
            diagnostics.warn(format!(
                "Custom type id resolution on {base} is not supported, type info is ignored"
            ));
            return (None, None);
        }
        _ => {}
    }
    let property = directive
        .property
        .clone()
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| directive.id.default_property().to_string());

    let base_class = types.class(base);
    let include_base = base_class.is_some_and(ClassDescriptor::is_concrete);
    let tags = |subtypes: Vec<String>| -> Vec<(String, String)> {
        include_base
            .then(|| base.to_string())
            .into_iter()
            .chain(subtypes)
            .filter_map(|name| {
                let class = types.class(&name)?;
                Some((name, type_tag(types, base_class, class, directive.id)))
            })
            .collect()
    };

    let serialization = BeanTypeInfo {
        inclusion: directive.include,
        property: property.clone(),
        tags: tags(config.filter_subtypes_for_serialization(types, base)),
    };
    let deserialization = BeanTypeInfo {
        inclusion: directive.include,
        property,
        tags: tags(config.filter_subtypes_for_deserialization(types, base)),
    };
    (Some(serialization), Some(deserialization))
}

fn type_tag(
    types: &dyn TypeSource,
    base: Option<&ClassDescriptor>,
    class: &ClassDescriptor,
    id: TypeIdKind,
) -> String {
    let binary = binary_name(types, class);
    match id {
        TypeIdKind::MinimalClass => match base {
            Some(base) if base.package == class.package && !class.package.is_empty() => {
                binary[class.package.len()..].to_string()
            }
            _ => binary,
        },
        TypeIdKind::Name => class
            .directives
            .type_name
            .clone()
            .or_else(|| registered_type_name(types, class))
            .unwrap_or_else(|| {
                binary
                    .rsplit('.')
                    .next()
                    .unwrap_or(&class.simple_name)
                    .to_string()
            }),
        _ => binary,
    }
}

/// Name given to `class` by a subtype registration on one of its supertypes.
fn registered_type_name(types: &dyn TypeSource, class: &ClassDescriptor) -> Option<String> {
    let name = class.name();
    types
        .flattened_supertypes(&name)
        .iter()
        .filter_map(|t| t.class_name().and_then(|n| types.class(n)))
        .flat_map(|c| c.directives.subtypes.iter())
        .find(|s| s.class == name && s.name.is_some())
        .and_then(|s| s.name.clone())
}
