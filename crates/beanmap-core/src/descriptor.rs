//! Class descriptors and the metadata source
//!
//! The generator never inspects compiled code. Everything it knows about a
//! type comes from a [`TypeSource`], which answers queries for a
//! [`ClassDescriptor`] by qualified name. [`TypeTable`] is the in-memory
//! implementation, loadable from the JSON emitted by a metadata front-end:
//!
//! ```json
//! { "classes": [
//!     { "package": "com.example", "simple_name": "Person",
//!       "fields": [ { "name": "name", "type": { "kind": "class", "name": "java.lang.String" } } ],
//!       "constructors": [ { "params": [] } ] }
//! ] }
//! ```

use crate::directive::{Access, CreatorMode, PropertyDirectives, TypeDirectives};
use crate::error::{CodegenError, CodegenResult};
use crate::types::{OBJECT, TypeBindings, TypeRef};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet, VecDeque};

/// Kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Enum,
    Annotation,
}

/// A generic parameter declaration such as `T extends Number`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParamDecl {
    pub name: String,
    /// Upper bound, `java.lang.Object` when absent.
    #[serde(default)]
    pub bound: Option<TypeRef>,
}

impl TypeParamDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bound: None,
        }
    }

    pub fn bound(&self) -> TypeRef {
        self.bound.clone().unwrap_or_else(TypeRef::object)
    }
}

/// A declared field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub access: Access,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default, rename = "final")]
    pub is_final: bool,
    #[serde(default, rename = "transient")]
    pub is_transient: bool,
    #[serde(default)]
    pub directives: PropertyDirectives,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            access: Access::Public,
            is_static: false,
            is_final: false,
            is_transient: false,
            directives: PropertyDirectives::default(),
        }
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn with_directives(mut self, directives: PropertyDirectives) -> Self {
        self.directives = directives;
        self
    }
}

/// A method, constructor or factory parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub directives: PropertyDirectives,
}

impl ParamDescriptor {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: Some(name.into()),
            ty,
            directives: PropertyDirectives::default(),
        }
    }

    pub fn unnamed(ty: TypeRef) -> Self {
        Self {
            name: None,
            ty,
            directives: PropertyDirectives::default(),
        }
    }

    pub fn with_directives(mut self, directives: PropertyDirectives) -> Self {
        self.directives = directives;
        self
    }

    /// Property name bound to this parameter: the rename directive, else the declared name.
    pub fn property_name(&self) -> Option<&str> {
        self.directives.rename.as_deref().or(self.name.as_deref())
    }
}

/// A declared method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default)]
    pub params: Vec<ParamDescriptor>,
    /// Return type, `None` for `void`.
    #[serde(default)]
    pub returns: Option<TypeRef>,
    #[serde(default)]
    pub access: Access,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    /// Creator designation for static factories.
    #[serde(default)]
    pub creator: Option<CreatorMode>,
    #[serde(default)]
    pub directives: PropertyDirectives,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns: None,
            access: Access::Public,
            is_static: false,
            creator: None,
            directives: PropertyDirectives::default(),
        }
    }

    pub fn getter(name: impl Into<String>, returns: TypeRef) -> Self {
        let mut method = Self::new(name);
        method.returns = Some(returns);
        method
    }

    pub fn setter(name: impl Into<String>, param: TypeRef) -> Self {
        let mut method = Self::new(name);
        method.params.push(ParamDescriptor::unnamed(param));
        method
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn with_params(mut self, params: Vec<ParamDescriptor>) -> Self {
        self.params = params;
        self
    }

    pub fn with_returns(mut self, returns: TypeRef) -> Self {
        self.returns = Some(returns);
        self
    }

    pub fn with_directives(mut self, directives: PropertyDirectives) -> Self {
        self.directives = directives;
        self
    }

    pub fn as_creator(mut self, mode: CreatorMode) -> Self {
        self.is_static = true;
        self.creator = Some(mode);
        self
    }
}

/// A declared constructor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConstructorDescriptor {
    #[serde(default)]
    pub params: Vec<ParamDescriptor>,
    #[serde(default)]
    pub access: Access,
    #[serde(default)]
    pub creator: Option<CreatorMode>,
}

impl ConstructorDescriptor {
    pub fn new(params: Vec<ParamDescriptor>) -> Self {
        Self {
            params,
            access: Access::Public,
            creator: None,
        }
    }

    pub fn no_arg() -> Self {
        Self::new(Vec::new())
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn as_creator(mut self, mode: CreatorMode) -> Self {
        self.creator = Some(mode);
        self
    }
}

/// Everything known about one declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    pub package: String,
    pub simple_name: String,
    /// Qualified name of the enclosing type for nested types.
    #[serde(default)]
    pub enclosing: Option<String>,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(default)]
    pub access: Access,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub type_params: Vec<TypeParamDecl>,
    #[serde(default)]
    pub superclass: Option<TypeRef>,
    #[serde(default)]
    pub interfaces: Vec<TypeRef>,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
    #[serde(default)]
    pub constructors: Vec<ConstructorDescriptor>,
    #[serde(default)]
    pub directives: TypeDirectives,
}

impl ClassDescriptor {
    /// A public top-level class with no members.
    pub fn new(package: impl Into<String>, simple_name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            simple_name: simple_name.into(),
            enclosing: None,
            kind: ClassKind::Class,
            access: Access::Public,
            is_abstract: false,
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            directives: TypeDirectives::default(),
        }
    }

    /// Qualified source name, nested types joined with `.`.
    pub fn name(&self) -> String {
        match &self.enclosing {
            Some(enclosing) => format!("{enclosing}.{}", self.simple_name),
            None if self.package.is_empty() => self.simple_name.clone(),
            None => format!("{}.{}", self.package, self.simple_name),
        }
    }

    /// Reference to this declaration in its generic form.
    pub fn as_type(&self) -> TypeRef {
        TypeRef::class(self.name())
    }

    /// Reference parameterized by the declaration's own type parameters.
    pub fn as_generic_type(&self) -> TypeRef {
        let name = self.name();
        let args = self
            .type_params
            .iter()
            .map(|p| TypeRef::type_parameter(name.clone(), p.name.clone()))
            .collect();
        TypeRef::parameterized(name, args)
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    pub fn is_enum(&self) -> bool {
        self.kind == ClassKind::Enum
    }

    pub fn is_annotation(&self) -> bool {
        self.kind == ClassKind::Annotation
    }

    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }

    /// Whether instances can be created directly.
    pub fn is_concrete(&self) -> bool {
        self.kind == ClassKind::Class && !self.is_abstract
    }

    pub fn type_param(&self, name: &str) -> Option<(usize, &TypeParamDecl)> {
        self.type_params
            .iter()
            .enumerate()
            .find(|(_, p)| p.name == name)
    }

    pub fn nested_in(mut self, enclosing: &ClassDescriptor) -> Self {
        self.package = enclosing.package.clone();
        self.enclosing = Some(enclosing.name());
        self
    }

    pub fn with_kind(mut self, kind: ClassKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn with_type_param(mut self, param: TypeParamDecl) -> Self {
        self.type_params.push(param);
        self
    }

    pub fn with_superclass(mut self, superclass: TypeRef) -> Self {
        self.superclass = Some(superclass);
        self
    }

    pub fn with_interface(mut self, interface: TypeRef) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_constructor(mut self, constructor: ConstructorDescriptor) -> Self {
        self.constructors.push(constructor);
        self
    }

    pub fn with_directives(mut self, directives: TypeDirectives) -> Self {
        self.directives = directives;
        self
    }
}

/// Metadata query capability.
///
/// Implementations may be backed by a static table (see [`TypeTable`]) or by
/// any other front-end able to describe declarations.
pub trait TypeSource {
    /// Look up a declaration by qualified name.
    fn class(&self, name: &str) -> Option<&ClassDescriptor>;

    /// Every known declaration, in a stable order.
    fn classes(&self) -> Vec<&ClassDescriptor>;

    /// Declared supertypes of `name` (superclass first, then interfaces), unsubstituted.
    fn direct_supertypes(&self, name: &str) -> Vec<TypeRef> {
        let Some(class) = self.class(name) else {
            return Vec::new();
        };
        class
            .superclass
            .iter()
            .chain(class.interfaces.iter())
            .cloned()
            .collect()
    }

    /// The type itself followed by every supertype, breadth-first, with type
    /// arguments substituted along the way.
    ///
    /// For `IntBox extends Box<Integer>` this yields `IntBox`, `Box<Integer>`.
    /// Supertypes missing from the source are still listed but not expanded.
    fn flattened_supertypes(&self, name: &str) -> Vec<TypeRef> {
        let start = match self.class(name) {
            Some(class) => class.as_generic_type(),
            None => TypeRef::class(name),
        };
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([start]);
        let mut out = Vec::new();
        while let Some(ty) = queue.pop_front() {
            let Some(class_name) = ty.class_name().map(str::to_string) else {
                continue;
            };
            if !seen.insert(class_name.clone()) {
                continue;
            }
            if let Some(class) = self.class(&class_name) {
                let bindings = TypeBindings::for_reference(
                    &class_name,
                    class.type_params.iter().map(|p| p.name.as_str()),
                    ty.type_args(),
                );
                for parent in self.direct_supertypes(&class_name) {
                    queue.push_back(parent.substitute(&bindings));
                }
            }
            out.push(ty);
        }
        out
    }

    /// Whether `name` is `ancestor` or inherits from it.
    fn is_assignable_to(&self, name: &str, ancestor: &str) -> bool {
        ancestor == OBJECT
            || self
                .flattened_supertypes(name)
                .iter()
                .any(|t| t.class_name() == Some(ancestor))
    }

    /// Every known declaration inheriting from `name`, excluding itself, sorted by name.
    fn subtypes_of(&self, name: &str) -> Vec<&ClassDescriptor> {
        let mut subtypes: Vec<&ClassDescriptor> = self
            .classes()
            .into_iter()
            .filter(|c| c.name() != name && self.is_assignable_to(&c.name(), name))
            .collect();
        subtypes.sort_by_key(|c| c.name());
        subtypes
    }
}

/// In-memory [`TypeSource`] keyed by qualified name.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    classes: BTreeMap<String, ClassDescriptor>,
}

#[derive(Debug, Deserialize, Serialize)]
struct TypeTableFile {
    classes: Vec<ClassDescriptor>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration, returning the one it replaced.
    pub fn insert(&mut self, class: ClassDescriptor) -> Option<ClassDescriptor> {
        self.classes.insert(class.name(), class)
    }

    pub fn with(mut self, class: ClassDescriptor) -> Self {
        self.insert(class);
        self
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Parse the JSON table format.
    ///
    /// Duplicate qualified names are rejected.
    pub fn from_json_str(json: &str) -> CodegenResult<Self> {
        let file: TypeTableFile = serde_json::from_str(json)?;
        let mut table = Self::new();
        for class in file.classes {
            let name = class.name();
            if table.insert(class).is_some() {
                return Err(CodegenError::Configuration(format!(
                    "Type '{name}' is declared more than once"
                )));
            }
        }
        Ok(table)
    }

    pub fn to_json_string(&self) -> CodegenResult<String> {
        let file = TypeTableFile {
            classes: self.classes.values().cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Report structural problems: unknown enclosing types, and supertypes
    /// outside the table or the `java.` namespace.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for (name, class) in &self.classes {
            if let Some(enclosing) = &class.enclosing
                && !self.classes.contains_key(enclosing)
            {
                problems.push(format!(
                    "Type '{name}' is nested in unknown type '{enclosing}'"
                ));
            }
            for parent in class.superclass.iter().chain(class.interfaces.iter()) {
                let Some(parent_name) = parent.class_name() else {
                    problems.push(format!("Type '{name}' has a non-class supertype '{parent}'"));
                    continue;
                };
                if !self.classes.contains_key(parent_name) && !parent_name.starts_with("java.") {
                    problems.push(format!(
                        "Type '{name}' extends unknown type '{parent_name}'"
                    ));
                }
            }
        }
        problems
    }
}

impl TypeSource for TypeTable {
    fn class(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes.get(name)
    }

    fn classes(&self) -> Vec<&ClassDescriptor> {
        self.classes.values().collect()
    }
}
