//! Naming conventions for generated artifacts and bean properties.
//!
//! # Artifact names
//!
//! | Bean | Mapper-specific | Serializer |
//! |------|-----------------|------------|
//! | `com.example.Person` | no | `com.example.PersonBeanJsonSerializerImpl` |
//! | `com.example.Outer.Inner` | no | `com.example.Outer_InnerBeanJsonSerializerImpl` |
//! | `com.example.Person` | yes, root `PersonMapper` | `com.example.PersonMapper_1a2b3c4d_PersonBeanJsonSerializerImpl` |
//! | `java.util.Locale` | no | `gwtjackson.java.util.LocaleBeanJsonSerializerImpl` |
//!
//! # Property names
//!
//! | Accessor | Function | Property |
//! |----------|----------|----------|
//! | `getFirstName` | [`property_name_of_accessor`] | `firstName` |
//! | `isActive` | [`property_name_of_accessor`] | `active` |
//! | `getURL` | [`decapitalize`] | `URL` |

use beanmap_core::{ClassDescriptor, Configuration, TypeSource};
use sha2::{Digest, Sha256};
use std::fmt;

/// Suffix of generated serializers.
pub const SERIALIZER_SUFFIX: &str = "BeanJsonSerializerImpl";

/// Suffix of generated deserializers.
pub const DESERIALIZER_SUFFIX: &str = "BeanJsonDeserializerImpl";

/// Suffix of generated mapper implementations.
pub const MAPPER_SUFFIX: &str = "Impl";

/// Identity of one generated source unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactName {
    pub package: String,
    pub simple_name: String,
}

impl ArtifactName {
    pub fn new(package: impl Into<String>, simple_name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            simple_name: simple_name.into(),
        }
    }

    pub fn qualified(&self) -> String {
        if self.package.is_empty() {
            self.simple_name.clone()
        } else {
            format!("{}.{}", self.package, self.simple_name)
        }
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified())
    }
}

/// The mapper interface a generation run is producing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootMapper {
    pub qualified_name: String,
    pub simple_name: String,
    pub hash: String,
}

impl RootMapper {
    pub fn new(class: &ClassDescriptor) -> Self {
        let qualified_name = class.name();
        Self {
            hash: root_hash(&qualified_name),
            simple_name: class.simple_name.clone(),
            qualified_name,
        }
    }

    /// Prefix applied to artifacts that cannot be shared with other mappers.
    pub fn prefix(&self) -> String {
        format!("{}_{}_", self.simple_name, self.hash)
    }
}

/// Stable short hash of a root mapper's qualified name.
///
/// # Examples
///
/// ```
/// use beanmap_codegen::naming::root_hash;
///
/// assert_eq!(root_hash("com.example.PersonMapper").len(), 8);
/// assert_eq!(root_hash("a.B"), root_hash("a.B"));
/// ```
pub fn root_hash(qualified_name: &str) -> String {
    let digest = Sha256::digest(qualified_name.as_bytes());
    hex::encode(&digest[..4])
}

/// Simple names of `class` and its enclosing types, outermost first.
pub fn enclosing_chain(types: &dyn TypeSource, class: &ClassDescriptor) -> Vec<String> {
    let mut names = vec![class.simple_name.clone()];
    let mut enclosing = class.enclosing.clone();
    while let Some(name) = enclosing {
        match types.class(&name) {
            Some(outer) => {
                names.push(outer.simple_name.clone());
                enclosing = outer.enclosing.clone();
            }
            None => {
                let simple = name.rsplit('.').next().unwrap_or(&name).to_string();
                names.push(simple);
                enclosing = None;
            }
        }
    }
    names.reverse();
    names
}

/// Binary name as reported by the runtime: nested types joined with `$`.
pub fn binary_name(types: &dyn TypeSource, class: &ClassDescriptor) -> String {
    let nested = enclosing_chain(types, class).join("$");
    if class.package.is_empty() {
        nested
    } else {
        format!("{}.{nested}", class.package)
    }
}

/// Package hosting the generated code for `package`, and whether it is unchanged.
pub fn artifact_package(config: &Configuration, package: &str) -> (String, bool) {
    let reserved = &config.reserved_package_prefix;
    let reserved_root = reserved.trim_end_matches('.');
    if !reserved.is_empty() && (package.starts_with(reserved.as_str()) || package == reserved_root)
    {
        (format!("{}{package}", config.remapped_package_prefix), false)
    } else {
        (package.to_string(), true)
    }
}

/// Base artifact name of a bean: enclosing names joined by `_`, prefixed by
/// the root mapper when the type is mapper-specific.
pub fn artifact_base_name(
    types: &dyn TypeSource,
    config: &Configuration,
    class: &ClassDescriptor,
    root: Option<&RootMapper>,
) -> String {
    let base = enclosing_chain(types, class).join("_");
    match root {
        Some(root) if config.is_specific_to_mapper(&class.name()) => {
            format!("{}{base}", root.prefix())
        }
        _ => base,
    }
}

/// Java bean decapitalization: `Name` becomes `name`, `URL` stays `URL`.
pub fn decapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(second)) if first.is_uppercase() && second.is_uppercase() => {
            s.to_string()
        }
        (Some(first), _) => first.to_lowercase().chain(s.chars().skip(1)).collect(),
        (None, _) => String::new(),
    }
}

/// Capitalize the first letter of a string.
///
/// # Examples
///
/// ```
/// use beanmap_codegen::naming::capitalize;
///
/// assert_eq!(capitalize("hello"), "Hello");
/// assert_eq!(capitalize(""), "");
/// ```
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Kind of bean accessor recognized from a method name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorKind {
    Getter,
    IsGetter,
    Setter,
}

/// Implicit property name of a bean accessor method.
///
/// Returns `None` for names that do not follow the bean conventions.
pub fn property_name_of_accessor(method: &str) -> Option<(String, AccessorKind)> {
    let candidates = [
        ("get", AccessorKind::Getter),
        ("is", AccessorKind::IsGetter),
        ("set", AccessorKind::Setter),
    ];
    candidates.into_iter().find_map(|(prefix, kind)| {
        let rest = method.strip_prefix(prefix)?;
        let first = rest.chars().next()?;
        if first.is_uppercase() || first == '_' {
            Some((decapitalize(rest), kind))
        } else {
            None
        }
    })
}

/// Escape `s` for use inside a Java string literal.
pub fn escape_java_string(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\u{8}' => escaped.push_str("\\b"),
            '\u{c}' => escaped.push_str("\\f"),
            c if (c as u32) < 0x20 || (c as u32) > 0x7e => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    escaped.push_str(&format!("\\u{unit:04x}"));
                }
            }
            c => escaped.push(c),
        }
    }
    escaped
}

/// Java identifier safe for use as a generated member name.
pub fn to_identifier(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use beanmap_core::TypeTable;
    use test_case::test_case;

    fn nested_table() -> (TypeTable, ClassDescriptor) {
        let outer = ClassDescriptor::new("com.example", "Outer");
        let middle = ClassDescriptor::new("com.example", "Middle").nested_in(&outer);
        let inner = ClassDescriptor::new("com.example", "Inner").nested_in(&middle);
        let table = TypeTable::new()
            .with(outer)
            .with(middle)
            .with(inner.clone());
        (table, inner)
    }

    #[test_case("getFirstName", Some(("firstName", AccessorKind::Getter)))]
    #[test_case("isActive", Some(("active", AccessorKind::IsGetter)))]
    #[test_case("setURL", Some(("URL", AccessorKind::Setter)))]
    #[test_case("get", None)]
    #[test_case("getter", None)]
    #[test_case("island", None)]
    #[test_case("compute", None)]
    fn property_name_of_accessor___follows_bean_conventions(
        method: &str,
        expected: Option<(&str, AccessorKind)>,
    ) {
        let result = property_name_of_accessor(method);

        assert_eq!(
            result,
            expected.map(|(name, kind)| (name.to_string(), kind))
        );
    }

    #[test]
    fn decapitalize___keeps_acronyms() {
        assert_eq!(decapitalize("Name"), "name");
        assert_eq!(decapitalize("URL"), "URL");
        assert_eq!(decapitalize("X"), "x");
        assert_eq!(decapitalize(""), "");
    }

    #[test]
    fn capitalize___preserves_rest_of_string() {
        assert_eq!(capitalize("helloWorld"), "HelloWorld");
        assert_eq!(capitalize("ALLCAPS"), "ALLCAPS");
    }

    #[test]
    fn enclosing_chain___lists_outermost_first() {
        let (table, inner) = nested_table();

        let chain = enclosing_chain(&table, &inner);

        assert_eq!(chain, vec!["Outer", "Middle", "Inner"]);
    }

    #[test]
    fn binary_name___joins_nested_with_dollar() {
        let (table, inner) = nested_table();

        assert_eq!(binary_name(&table, &inner), "com.example.Outer$Middle$Inner");
    }

    #[test]
    fn artifact_base_name___nested_without_root___joins_with_underscore() {
        let (table, inner) = nested_table();
        let config = Configuration::new();

        let name = artifact_base_name(&table, &config, &inner, None);

        assert_eq!(name, "Outer_Middle_Inner");
    }

    #[test]
    fn artifact_base_name___mapper_specific___prefixed_by_root() {
        let (table, inner) = nested_table();
        let config = Configuration::new().with_mapper_specific(inner.name());
        let root = RootMapper::new(&ClassDescriptor::new("com.example", "InnerMapper"));

        let name = artifact_base_name(&table, &config, &inner, Some(&root));

        assert_eq!(name, format!("InnerMapper_{}_Outer_Middle_Inner", root.hash));
    }

    #[test_case("java.util", "gwtjackson.java.util", false)]
    #[test_case("javax.swing", "javax.swing", true)]
    #[test_case("com.example", "com.example", true)]
    fn artifact_package___remaps_reserved_namespace(package: &str, expected: &str, same: bool) {
        let config = Configuration::new();

        let (remapped, same_package) = artifact_package(&config, package);

        assert_eq!(remapped, expected);
        assert_eq!(same_package, same);
    }

    #[test]
    fn escape_java_string___escapes_quotes_and_controls() {
        assert_eq!(escape_java_string("a\"b"), "a\\\"b");
        assert_eq!(escape_java_string("back\\slash"), "back\\\\slash");
        assert_eq!(escape_java_string("line\nbreak"), "line\\nbreak");
        assert_eq!(escape_java_string("é"), "\\u00e9");
        assert_eq!(escape_java_string("plain"), "plain");
    }

    #[test]
    fn root_hash___is_eight_hex_digits() {
        let hash = root_hash("com.example.PersonMapper");

        assert_eq!(hash.len(), 8);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(hash, root_hash("com.example.OtherMapper"));
    }
}
