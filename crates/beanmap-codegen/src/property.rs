//! Property discovery.
//!
//! [`find_all_properties`] walks a bean and its supertypes, collects fields,
//! getters, is-getters and setters, applies the visibility rules and merges
//! members sharing an implicit name into one [`PropertyInfo`]. Properties
//! bound to creator parameters lose their setter: they are consumed once at
//! construction time.

use crate::bean::{
    BeanIdentityInfo, BeanInfo, BeanTypeInfo, CreatorParam, CreatorStrategy, type_info_for,
};
use crate::naming::{AccessorKind, property_name_of_accessor};
use beanmap_core::{
    Access, ClassDescriptor, Configuration, Diagnostics, FormatDirective, Include, OBJECT,
    PropertyDirectives, TypeBindings, TypeInclusion, TypeRef, TypeSource,
};
use std::collections::{BTreeMap, VecDeque};

/// Member an accessor reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessorMember {
    Field(String),
    Method(String),
}

/// How generated code reaches a bean member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accessor {
    pub member: AccessorMember,
    /// Qualified name of the declaring type.
    pub declaring: String,
    /// Whether access goes through a synthetic native bridge method.
    pub bridged: bool,
}

impl Accessor {
    pub fn member_name(&self) -> &str {
        match &self.member {
            AccessorMember::Field(name) | AccessorMember::Method(name) => name,
        }
    }
}

/// Whether generated code in the artifact package must bridge to a member with `access`.
pub fn needs_bridge(access: Access, same_package: bool) -> bool {
    match access {
        Access::Public => false,
        Access::Private => true,
        Access::Protected | Access::Package => !same_package,
    }
}

/// One discovered property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyInfo {
    pub name: String,
    pub ty: TypeRef,
    pub getter: Option<Accessor>,
    pub setter: Option<Accessor>,
    pub required: bool,
    pub ignored: bool,
    pub any_getter: bool,
    pub any_setter: bool,
    pub raw_value: bool,
    pub value: bool,
    pub unwrapped: bool,
    pub format: Option<FormatDirective>,
    pub include: Option<Include>,
    pub ignored_properties: Option<Vec<String>>,
    pub ignore_unknown: Option<bool>,
    pub identity: Option<BeanIdentityInfo>,
    pub serialization_type_info: Option<BeanTypeInfo>,
    pub deserialization_type_info: Option<BeanTypeInfo>,
    pub back_reference: Option<String>,
    pub managed_reference: Option<String>,
}

impl PropertyInfo {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            getter: None,
            setter: None,
            required: false,
            ignored: false,
            any_getter: false,
            any_setter: false,
            raw_value: false,
            value: false,
            unwrapped: false,
            format: None,
            include: None,
            ignored_properties: None,
            ignore_unknown: None,
            identity: None,
            serialization_type_info: None,
            deserialization_type_info: None,
            back_reference: None,
            managed_reference: None,
        }
    }

    fn apply(&mut self, directives: &PropertyDirectives) {
        self.required |= directives.required;
        self.ignored |= directives.ignore;
        self.any_getter |= directives.any_getter;
        self.any_setter |= directives.any_setter;
        self.raw_value |= directives.raw_value;
        self.value |= directives.value;
        self.unwrapped |= directives.unwrapped;
        if self.format.is_none() {
            self.format = directives.format.clone();
        }
        if self.include.is_none() {
            self.include = directives.include;
        }
        if self.ignored_properties.is_none() {
            self.ignored_properties = directives.ignored_properties.clone();
        }
        if self.ignore_unknown.is_none() {
            self.ignore_unknown = directives.ignore_unknown;
        }
        if self.back_reference.is_none() {
            self.back_reference = directives.back_reference.clone();
        }
        if self.managed_reference.is_none() {
            self.managed_reference = directives.managed_reference.clone();
        }
    }
}

/// Ordered properties of a bean plus its special members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertiesContainer {
    properties: Vec<PropertyInfo>,
    pub value: Option<PropertyInfo>,
    pub any_getter: Option<PropertyInfo>,
    pub any_setter: Option<PropertyInfo>,
}

impl PropertiesContainer {
    pub fn new(properties: Vec<PropertyInfo>) -> Self {
        Self {
            properties,
            ..Default::default()
        }
    }

    pub fn get(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyInfo> {
        self.properties.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.properties.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[derive(Debug, Clone)]
struct Member {
    name: String,
    declaring: String,
    ty: TypeRef,
    access: Access,
    is_final: bool,
    kind: Option<AccessorKind>,
    directives: PropertyDirectives,
}

#[derive(Debug, Default)]
struct Candidate {
    field: Option<Member>,
    getter: Option<Member>,
    setter: Option<Member>,
}

impl Candidate {
    fn members(&self) -> impl Iterator<Item = &Member> {
        self.getter.iter().chain(self.setter.iter()).chain(self.field.iter())
    }
}

#[derive(Debug, Default)]
struct Candidates {
    order: Vec<String>,
    by_name: BTreeMap<String, Candidate>,
    any_getter: Option<Member>,
    any_setter: Option<Member>,
}

impl Candidates {
    fn entry(&mut self, implicit: &str) -> &mut Candidate {
        if !self.by_name.contains_key(implicit) {
            self.order.push(implicit.to_string());
        }
        self.by_name.entry(implicit.to_string()).or_default()
    }
}

/// Declarations of `class` and its supertypes, root-most first, each with the
/// bindings that map its type parameters to the arguments seen from `class`.
fn hierarchy<'a>(
    types: &'a dyn TypeSource,
    class: &'a ClassDescriptor,
) -> Vec<(&'a ClassDescriptor, TypeBindings)> {
    let mut out: Vec<(&ClassDescriptor, TypeBindings)> = types
        .flattened_supertypes(&class.name())
        .into_iter()
        .skip(1)
        .filter_map(|ty| {
            let name = ty.class_name()?;
            if name == OBJECT {
                return None;
            }
            let decl = types.class(name)?;
            let bindings = TypeBindings::for_reference(
                name,
                decl.type_params.iter().map(|p| p.name.as_str()),
                ty.type_args(),
            );
            Some((decl, bindings))
        })
        .collect();
    out.reverse();
    out.push((class, TypeBindings::new()));
    out
}

fn collect_candidates(
    types: &dyn TypeSource,
    config: &Configuration,
    class: &ClassDescriptor,
) -> Candidates {
    let mut candidates = Candidates::default();
    for (decl, bindings) in hierarchy(types, class) {
        let declaring = decl.name();
        let mixin = config.mixin_for(&declaring).and_then(|m| types.class(m));

        for field in decl.fields.iter().filter(|f| !f.is_static) {
            let mixed = mixin
                .and_then(|m| m.fields.iter().find(|f| f.name == field.name))
                .map(|f| &f.directives);
            let directives = match mixed {
                Some(mixed) => field.directives.merged_with(mixed),
                None => field.directives.clone(),
            };
            if field.is_transient && !directives.is_explicit() {
                continue;
            }
            candidates.entry(&field.name).field = Some(Member {
                name: field.name.clone(),
                declaring: declaring.clone(),
                ty: field.ty.substitute(&bindings),
                access: field.access,
                is_final: field.is_final,
                kind: None,
                directives,
            });
        }

        for method in decl.methods.iter().filter(|m| !m.is_static) {
            let mixed = mixin
                .and_then(|m| {
                    m.methods
                        .iter()
                        .find(|mm| mm.name == method.name && mm.params.len() == method.params.len())
                })
                .map(|mm| &mm.directives);
            let directives = match mixed {
                Some(mixed) => method.directives.merged_with(mixed),
                None => method.directives.clone(),
            };
            let member = |ty: &TypeRef, kind: Option<AccessorKind>| Member {
                name: method.name.clone(),
                declaring: declaring.clone(),
                ty: ty.substitute(&bindings),
                access: method.access,
                is_final: false,
                kind,
                directives: directives.clone(),
            };

            match (method.params.as_slice(), &method.returns) {
                (_, Some(returns)) if directives.any_getter && method.params.is_empty() => {
                    candidates.any_getter = Some(member(returns, None));
                }
                ([_, value], _) if directives.any_setter => {
                    candidates.any_setter = Some(member(&value.ty, None));
                }
                ([], Some(returns)) if method.name != "getClass" => {
                    let implicit = match property_name_of_accessor(&method.name) {
                        Some((name, kind @ AccessorKind::Getter)) => Some((name, kind)),
                        Some((name, kind @ AccessorKind::IsGetter))
                            if returns.erased_name() == "boolean" =>
                        {
                            Some((name, kind))
                        }
                        _ if directives.is_explicit() => {
                            Some((method.name.clone(), AccessorKind::Getter))
                        }
                        _ => None,
                    };
                    if let Some((name, kind)) = implicit {
                        candidates.entry(&name).getter = Some(member(returns, Some(kind)));
                    }
                }
                ([param], _) => {
                    let implicit = match property_name_of_accessor(&method.name) {
                        Some((name, AccessorKind::Setter)) => Some(name),
                        _ if directives.is_explicit() => Some(method.name.clone()),
                        _ => None,
                    };
                    if let Some(name) = implicit {
                        candidates.entry(&name).setter =
                            Some(member(&param.ty, Some(AccessorKind::Setter)));
                    }
                }
                _ => {}
            }
        }
    }
    candidates
}

fn accessor(member: &Member, same_package: bool) -> Accessor {
    Accessor {
        member: match member.kind {
            Some(_) => AccessorMember::Method(member.name.clone()),
            None => AccessorMember::Field(member.name.clone()),
        },
        declaring: member.declaring.clone(),
        bridged: needs_bridge(member.access, same_package),
    }
}

fn method_accessor(member: &Member, same_package: bool) -> Accessor {
    Accessor {
        member: AccessorMember::Method(member.name.clone()),
        declaring: member.declaring.clone(),
        bridged: needs_bridge(member.access, same_package),
    }
}

/// First class reachable from `ty` that the source declares as a class or interface.
pub fn first_bean_class(types: &dyn TypeSource, ty: &TypeRef) -> Option<String> {
    let mut queue = VecDeque::from([ty.unwrap_wildcard_and_raw()]);
    while let Some(current) = queue.pop_front() {
        match &current {
            TypeRef::Array { leaf, .. } => queue.push_back((**leaf).clone()),
            TypeRef::Class { name, args } => {
                if let Some(class) = types.class(name)
                    && !class.is_enum()
                    && !class.is_annotation()
                {
                    return Some(name.clone());
                }
                queue.extend(args.iter().map(TypeRef::unwrap_wildcard_and_raw));
            }
            _ => {}
        }
    }
    None
}

fn identity_of(directives: &PropertyDirectives) -> Option<BeanIdentityInfo> {
    directives.identity.clone().map(|d| BeanIdentityInfo {
        property: d.property,
        id_type: d.generator.id_type(),
        generator: d.generator,
        scope: d.scope.unwrap_or_else(|| OBJECT.to_string()),
        always_as_id: directives.always_as_id,
    })
}

/// Type info declared on a property applies to the first bean class found in its type.
fn property_type_info(
    types: &dyn TypeSource,
    config: &Configuration,
    ty: &TypeRef,
    directives: &PropertyDirectives,
    diagnostics: &mut Diagnostics,
) -> (Option<BeanTypeInfo>, Option<BeanTypeInfo>) {
    let Some(directive) = directives.type_info.as_ref() else {
        return (None, None);
    };
    let Some(base) = first_bean_class(types, ty) else {
        return (None, None);
    };
    let inline = |info: Option<BeanTypeInfo>| {
        info.map(|mut info| {
            if info.inclusion == TypeInclusion::ExternalProperty {
                info.inclusion = TypeInclusion::Property;
            }
            info
        })
    };
    let (serialization, deserialization) =
        type_info_for(types, config, &base, directive, diagnostics);
    (inline(serialization), inline(deserialization))
}

/// Discover the properties of `class`.
///
/// `same_package` tells whether generated code lives in the bean's own
/// package; when it does not, non-public members are bridged.
pub fn find_all_properties(
    types: &dyn TypeSource,
    config: &Configuration,
    class: &ClassDescriptor,
    bean: &BeanInfo,
    same_package: bool,
    diagnostics: &mut Diagnostics,
) -> PropertiesContainer {
    let mut candidates = collect_candidates(types, config, class);
    let rules = bean.visibility;
    let mut properties: Vec<PropertyInfo> = Vec::new();

    for implicit in &candidates.order {
        let Some(candidate) = candidates.by_name.get(implicit) else {
            continue;
        };
        let explicit_name = candidate
            .members()
            .find_map(|m| m.directives.rename.clone());
        let name = explicit_name.unwrap_or_else(|| implicit.clone());

        let getter = candidate.getter.as_ref().filter(|g| {
            let threshold = match g.kind {
                Some(AccessorKind::IsGetter) => rules.is_getter,
                _ => rules.getter,
            };
            g.directives.is_explicit() || threshold.allows(g.access)
        });
        let setter = candidate
            .setter
            .as_ref()
            .filter(|s| s.directives.is_explicit() || rules.setter.allows(s.access));
        let field = candidate
            .field
            .as_ref()
            .filter(|f| f.directives.is_explicit() || rules.field.allows(f.access));

        let Some(ty) = candidate.members().next().map(|m| m.ty.clone()) else {
            continue;
        };
        let mut property = PropertyInfo::new(name.clone(), ty);
        property.getter = getter
            .map(|g| method_accessor(g, same_package))
            .or_else(|| field.map(|f| accessor(f, same_package)));
        property.setter = setter
            .map(|s| method_accessor(s, same_package))
            .or_else(|| field.filter(|f| !f.is_final).map(|f| accessor(f, same_package)));
        for member in candidate.members() {
            property.apply(&member.directives);
        }
        property.ignored |= bean.ignored_fields.contains(&name);
        property.identity = candidate.members().find_map(|m| identity_of(&m.directives));
        if let Some(directives) = candidate
            .members()
            .map(|m| &m.directives)
            .find(|d| d.type_info.is_some())
        {
            let (serialization, deserialization) =
                property_type_info(types, config, &property.ty, directives, diagnostics);
            property.serialization_type_info = serialization;
            property.deserialization_type_info = deserialization;
        }

        if property.getter.is_none() && property.setter.is_none() && !property.ignored {
            continue;
        }
        if properties.iter().any(|p| p.name == property.name) {
            diagnostics.warn(format!(
                "Conflicting definitions of property '{}' in {}, keeping the first one",
                property.name,
                class.name()
            ));
            continue;
        }
        properties.push(property);
    }

    bind_creator_parameters(&bean.creator, &mut properties);

    let mut container = PropertiesContainer::default();
    if let Some(any_getter) = candidates.any_getter.take() {
        let mut property = PropertyInfo::new(any_getter.name.clone(), any_getter.ty.clone());
        property.any_getter = true;
        property.getter = Some(method_accessor(&any_getter, same_package));
        container.any_getter = Some(property);
    }
    if let Some(any_setter) = candidates.any_setter.take() {
        let mut property = PropertyInfo::new(any_setter.name.clone(), any_setter.ty.clone());
        property.any_setter = true;
        property.setter = Some(method_accessor(&any_setter, same_package));
        container.any_setter = Some(property);
    }
    if let Some(index) = properties.iter().position(|p| p.value && p.getter.is_some()) {
        container.value = Some(properties.remove(index));
    }

    container.properties = order(properties, bean);
    container
}

fn bind_creator_parameters(creator: &CreatorStrategy, properties: &mut Vec<PropertyInfo>) {
    let CreatorStrategy::Parameterized(creator) = creator else {
        return;
    };
    for param in &creator.params {
        match properties.iter_mut().find(|p| p.name == param.name) {
            Some(property) => {
                property.setter = None;
                property.apply(&param.directives);
            }
            None => properties.push(creator_property(param)),
        }
    }
}

fn creator_property(param: &CreatorParam) -> PropertyInfo {
    let mut property = PropertyInfo::new(param.name.clone(), param.ty.clone());
    property.apply(&param.directives);
    property
}

fn order(mut properties: Vec<PropertyInfo>, bean: &BeanInfo) -> Vec<PropertyInfo> {
    let mut ordered = Vec::with_capacity(properties.len());
    for name in &bean.property_order {
        if let Some(index) = properties.iter().position(|p| &p.name == name) {
            ordered.push(properties.remove(index));
        }
    }
    if bean.alphabetic {
        properties.sort_by(|a, b| a.name.cmp(&b.name));
    }
    ordered.extend(properties);
    ordered
}
