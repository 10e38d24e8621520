#![allow(non_snake_case)]

use super::*;
use crate::descriptor::{ClassDescriptor, ClassKind, TypeTable};
use crate::types::PrimitiveType;
use test_case::test_case;

fn animal_table() -> TypeTable {
    let animal = ClassDescriptor::new("com.example", "Animal").with_kind(ClassKind::Interface);
    let mammal = ClassDescriptor::new("com.example", "Mammal")
        .abstract_class()
        .with_interface(TypeRef::class("com.example.Animal"));
    let dog = ClassDescriptor::new("com.example", "Dog").with_superclass(TypeRef::class("com.example.Mammal"));
    let secret = ClassDescriptor::new("com.example", "Secret")
        .with_access(Access::Private)
        .with_interface(TypeRef::class("com.example.Animal"));
    let cat = ClassDescriptor::new("com.example", "Cat").with_interface(TypeRef::class("com.example.Animal"));
    TypeTable::new()
        .with(animal)
        .with(mammal)
        .with(dog)
        .with(secret)
        .with(cat)
}

#[test_case(TypeRef::primitive(PrimitiveType::Int) ; "primitive int")]
#[test_case(TypeRef::class("java.lang.Integer") ; "boxed integer")]
#[test_case(TypeRef::class("java.lang.String") ; "string")]
#[test_case(TypeRef::array(TypeRef::primitive(PrimitiveType::Double), 1) ; "primitive array")]
#[test_case(TypeRef::parameterized("java.util.List", vec![TypeRef::class("java.lang.String")]) ; "parameterized list")]
fn Configuration___defaults___register_both_directions(ty: TypeRef) {
    let config = Configuration::with_defaults();

    assert!(config.serializer_for(&ty).is_some());
    assert!(config.deserializer_for(&ty).is_some());
}

#[test]
fn Configuration___default_map___marks_first_slot_as_key() {
    let config = Configuration::with_defaults();

    let factory = config.deserializer_for(&TypeRef::class("java.util.Map")).unwrap();

    assert_eq!(factory.parameters, vec![ParameterRole::Key, ParameterRole::Plain]);
}

#[test]
fn Configuration___default_key_codecs___cover_strings_but_not_beans() {
    let config = Configuration::with_defaults();

    assert!(config.key_serializer_for(&TypeRef::class("java.lang.String")).is_some());
    assert!(config.key_deserializer_for(&TypeRef::class("java.util.UUID")).is_some());
    assert!(config.key_serializer_for(&TypeRef::class("com.example.Person")).is_none());
}

#[test]
fn Configuration___from_toml_str___merges_over_defaults() {
    let toml = r#"
        mapper_specific = ["com.example.Shared"]

        [serializers."com.example.Money"]
        codec = "com.example.MoneySerializer"
        creation = "getInstance"

        [deserializers."com.example.Pair"]
        codec = "com.example.PairDeserializer"
        parameters = ["plain", "key"]

        [mixins]
        "com.example.Person" = "com.example.PersonMixin"
    "#;

    let config = Configuration::from_toml_str(toml).unwrap();

    let money = config.serializer_for(&TypeRef::class("com.example.Money")).unwrap();
    assert_eq!(money.creation, InstanceCreation::StaticMethod("getInstance".into()));
    let pair = config.deserializer_for(&TypeRef::class("com.example.Pair")).unwrap();
    assert_eq!(pair.creation, InstanceCreation::Constructor);
    assert_eq!(pair.parameters, vec![ParameterRole::Plain, ParameterRole::Key]);
    assert_eq!(config.mixin_for("com.example.Person"), Some("com.example.PersonMixin"));
    assert!(config.serializer_for(&TypeRef::class("java.lang.String")).is_some());
    assert_eq!(config.reserved_package_prefix, "java.");
}

#[test]
fn Configuration___from_toml_str_invalid___is_configuration_error() {
    let result = Configuration::from_toml_str("serializers = 3");

    assert!(matches!(result, Err(crate::CodegenError::Configuration(_))));
}

#[test]
fn Configuration___custom_host_object___moves_builtin_codec() {
    let toml = r#"host_object_type = "com.example.HostObject""#;

    let config = Configuration::from_toml_str(toml).unwrap();

    assert!(config.serializer_for(&TypeRef::class("com.example.HostObject")).is_some());
    assert!(
        config
            .serializer_for(&TypeRef::class("com.google.gwt.core.client.JavaScriptObject"))
            .is_none()
    );
}

#[test]
fn Configuration___mixin_target___is_mapper_specific() {
    let config = Configuration::new()
        .with_mixin("com.example.Person", "com.example.PersonMixin")
        .with_mapper_specific("com.example.Shared");

    assert!(config.is_specific_to_mapper("com.example.Person"));
    assert!(config.is_specific_to_mapper("com.example.Shared"));
    assert!(!config.is_specific_to_mapper("com.example.Other"));
}

#[test]
fn Configuration___serialization_subtypes___keep_abstract_and_drop_private() {
    let config = Configuration::new();
    let table = animal_table();

    let subtypes = config.filter_subtypes_for_serialization(&table, "com.example.Animal");

    assert_eq!(
        subtypes,
        vec!["com.example.Cat", "com.example.Dog", "com.example.Mammal"]
    );
}

#[test]
fn Configuration___deserialization_subtypes___keep_only_concrete() {
    let config = Configuration::new().with_excluded_subtype("com.example.Cat");
    let table = animal_table();

    let subtypes = config.filter_subtypes_for_deserialization(&table, "com.example.Animal");

    assert_eq!(subtypes, vec!["com.example.Dog"]);
}

#[test]
fn Configuration___validate___reports_unknown_mixin() {
    let config = Configuration::new().with_mixin("com.example.Dog", "com.example.Nowhere");
    let table = animal_table();

    let problems = config.validate(&table);

    assert_eq!(problems.len(), 1);
    assert!(problems[0].contains("com.example.Nowhere"));
}
