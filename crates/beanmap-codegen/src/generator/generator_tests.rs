#![allow(non_snake_case)]

use super::*;
use crate::sink::MemorySink;
use beanmap_core::{
    Access, ConstructorDescriptor, FieldDescriptor, ParamDescriptor, PrimitiveType,
    PropertyDirectives, TypeTable,
};

fn string() -> TypeRef {
    TypeRef::class("java.lang.String")
}

fn int() -> TypeRef {
    TypeRef::primitive(PrimitiveType::Int)
}

fn person() -> ClassDescriptor {
    ClassDescriptor::new("a", "Person")
        .with_field(FieldDescriptor::new("name", string()))
        .with_field(FieldDescriptor::new(
            "friends",
            TypeRef::parameterized("java.util.List", vec![TypeRef::class("a.Person")]),
        ))
}

fn table() -> TypeTable {
    TypeTable::new()
        .with(person())
        .with(ClassDescriptor::new("a", "Color").with_kind(ClassKind::Enum))
        .with(
            ClassDescriptor::new("a", "Point").with_constructor(ConstructorDescriptor::new(vec![
                ParamDescriptor::new("x", int()),
                ParamDescriptor::new("y", int()),
            ])),
        )
        .with(
            ClassDescriptor::new("a", "Box")
                .with_type_param(TypeParamDecl::new("T"))
                .with_field(FieldDescriptor::new("value", TypeRef::type_parameter("a.Box", "T"))),
        )
}

fn factory_name(codec: &CodecDescriptor) -> &str {
    match &codec.instance {
        CodecInstance::Factory { codec, .. } => codec,
        _ => "",
    }
}

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn resolve_serializer___configured_scalar___uses_factory() {
    let table = table();
    let config = Configuration::with_defaults();
    let mut sink = MemorySink::new();
    let mut generator = Generator::new(&table, &config, &mut sink);

    let codec = generator.resolve_serializer(&string(), false).unwrap();

    assert!(factory_name(&codec).ends_with(".StringJsonSerializer"));
    assert!(codec.parameters.is_empty());
    assert!(!codec.bean_mapper);
}

#[test]
fn resolve_serializer___list_of_beans___nests_bean_codec() {
    let table = table();
    let config = Configuration::with_defaults();
    let mut sink = MemorySink::new();
    let mut generator = Generator::new(&table, &config, &mut sink);
    let ty = TypeRef::parameterized("java.util.List", vec![TypeRef::class("a.Person")]);

    let codec = generator.resolve_serializer(&ty, false).unwrap();

    assert!(factory_name(&codec).ends_with(".CollectionJsonSerializer"));
    let child = &codec.parameters[0];
    assert_eq!(
        child.artifact(),
        Some(&ArtifactName::new("a", "PersonBeanJsonSerializerImpl"))
    );
    drop(generator);
    assert!(sink.serializer("PersonBeanJsonSerializerImpl").is_some());
}

#[test]
fn resolve_serializer___map___resolves_key_through_key_path() {
    let table = table();
    let config = Configuration::with_defaults();
    let mut sink = MemorySink::new();
    let mut generator = Generator::new(&table, &config, &mut sink);
    let ty = TypeRef::parameterized("java.util.Map", vec![string(), TypeRef::class("java.lang.Integer")]);

    let codec = generator.resolve_serializer(&ty, false).unwrap();

    let key = &codec.parameters[0];
    assert_eq!(key.role, ParameterRole::Key);
    assert!(factory_name(key).ends_with(".ToStringKeySerializer"));
    assert_eq!(codec.parameters[1].role, ParameterRole::Plain);
}

#[test]
fn resolve_key_deserializer___bean_key___is_unsupported() {
    let table = table();
    let config = Configuration::with_defaults();
    let mut sink = MemorySink::new();
    let mut generator = Generator::new(&table, &config, &mut sink);

    let err = generator
        .resolve_key_deserializer(&TypeRef::class("a.Person"))
        .unwrap_err();

    assert!(err.is_recoverable());
    assert_eq!(err.to_string(), "Not supported as map's key: a.Person");
}

#[test]
fn resolve_key_serializer___enum___uses_enum_key_codec() {
    let table = table();
    let config = Configuration::with_defaults();
    let mut sink = MemorySink::new();
    let mut generator = Generator::new(&table, &config, &mut sink);

    let codec = generator.resolve_key_serializer(&TypeRef::class("a.Color")).unwrap();

    assert_eq!(
        codec.instance,
        CodecInstance::EnumKey {
            enum_type: "a.Color".into()
        }
    );
}

#[test]
fn resolve___enum_supertype___serializes_but_does_not_deserialize() {
    let table = table();
    let config = Configuration::with_defaults();
    let mut sink = MemorySink::new();
    let mut generator = Generator::new(&table, &config, &mut sink);
    let ty = TypeRef::class(ENUM);

    let ser = generator.resolve_serializer(&ty, false).unwrap();
    let deser = generator.resolve_deserializer(&ty, false);

    assert_eq!(ser.instance, CodecInstance::AnyEnum);
    assert!(matches!(deser, Err(CodegenError::UnsupportedType { .. })));
}

#[test]
fn resolve___array_rank_three___is_unsupported() {
    let table = table();
    let config = Configuration::with_defaults();
    let mut sink = MemorySink::new();
    let mut generator = Generator::new(&table, &config, &mut sink);

    let two = generator.resolve_serializer(&TypeRef::array(string(), 2), false).unwrap();
    let three = generator.resolve_serializer(&TypeRef::array(string(), 3), false);

    assert_eq!(two.instance, CodecInstance::Array { rank: 2, leaf: string() });
    assert!(factory_name(&two.parameters[0]).ends_with(".StringJsonSerializer"));
    let err = three.unwrap_err();
    assert!(err.to_string().starts_with("Arrays with 3 or more dimensions are not supported"));
}

#[test]
fn resolve___free_type_parameter___is_unresolved() {
    let table = table();
    let config = Configuration::with_defaults();
    let mut sink = MemorySink::new();
    let mut generator = Generator::new(&table, &config, &mut sink);

    let err = generator
        .resolve_serializer(&TypeRef::type_parameter("a.Box", "T"), false)
        .unwrap_err();

    assert_eq!(err.to_string(), "Unresolved type parameter: T");
}

#[test]
fn resolve___unknown_type___is_unsupported() {
    let table = table();
    let config = Configuration::with_defaults();
    let mut sink = MemorySink::new();
    let mut generator = Generator::new(&table, &config, &mut sink);

    let err = generator
        .resolve_serializer(&TypeRef::class("b.Missing"), false)
        .unwrap_err();

    assert_eq!(err.to_string(), "Type is not supported: b.Missing");
}

#[test]
fn resolve___generic_bean___passes_argument_codecs() {
    let table = table();
    let config = Configuration::with_defaults();
    let mut sink = MemorySink::new();
    let mut generator = Generator::new(&table, &config, &mut sink);
    let ty = TypeRef::parameterized("a.Box", vec![string()]);

    let codec = generator.resolve_deserializer(&ty, false).unwrap();

    assert_eq!(codec.parameters.len(), 1);
    assert!(factory_name(&codec.parameters[0]).ends_with(".StringJsonDeserializer"));
    drop(generator);
    let plan = sink.deserializer("BoxBeanJsonDeserializerImpl").unwrap();
    assert_eq!(plan.properties[0].codec.instance, CodecInstance::TypeParameter { ordinal: 0 });
}

// ============================================================================
// Bean codecs
// ============================================================================

#[test]
fn generate___self_reference___terminates_with_one_artifact() {
    let table = table();
    let config = Configuration::with_defaults();
    let mut sink = MemorySink::new();
    let mut generator = Generator::new(&table, &config, &mut sink);

    let info = generator.generate("a.Person", Direction::Serialize).unwrap();

    assert_eq!(info.serializer.simple_name, "PersonBeanJsonSerializerImpl");
    drop(generator);
    assert_eq!(sink.plans().len(), 1);
    let plan = sink.serializer("PersonBeanJsonSerializerImpl").unwrap();
    let friends = plan.properties.iter().find(|p| p.name == "friends").unwrap();
    assert_eq!(friends.codec.artifacts(), vec![&info.serializer]);
}

#[test]
fn generate___twice___reuses_reservation() {
    let table = table();
    let config = Configuration::with_defaults();
    let mut sink = MemorySink::new();
    let mut generator = Generator::new(&table, &config, &mut sink);

    let first = generator.generate("a.Person", Direction::Deserialize).unwrap();
    let second = generator.generate("a.Person", Direction::Deserialize).unwrap();

    assert_eq!(first, second);
    assert_eq!(generator.oracle().len(), 1);
    drop(generator);
    assert_eq!(sink.plans().len(), 1);
}

#[test]
fn generate___named_constructor___builds_parameterized_instance_builder() {
    let table = table();
    let config = Configuration::with_defaults();
    let mut sink = MemorySink::new();
    let mut generator = Generator::new(&table, &config, &mut sink);

    generator.generate("a.Point", Direction::Deserialize).unwrap();

    drop(generator);
    let plan = sink.deserializer("PointBeanJsonDeserializerImpl").unwrap();
    let Some(InstanceBuilderPlan::Parameterized { arguments, creator }) = &plan.instance_builder
    else {
        panic!("expected parameterized builder");
    };
    assert!(!creator.bridged);
    let names: Vec<&str> = arguments.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["x", "y"]);
    assert_eq!(arguments[0].default_value, "0");
    assert_eq!(plan.base, DeserializerBase::Bean);
}

#[test]
fn generate___no_usable_creator___cannot_deserialize() {
    let table = TypeTable::new().with(
        ClassDescriptor::new("a", "Opaque")
            .with_constructor(ConstructorDescriptor::new(vec![ParamDescriptor::unnamed(string())])),
    );
    let config = Configuration::with_defaults();
    let mut sink = MemorySink::new();
    let mut generator = Generator::new(&table, &config, &mut sink);

    let err = generator.generate("a.Opaque", Direction::Deserialize).unwrap_err();

    assert!(err.to_string().starts_with("No usable constructor or creator"));
    assert!(generator.generate("a.Opaque", Direction::Serialize).is_ok());
}

#[test]
fn generate___unsupported_property___is_dropped_with_warning() {
    let table = TypeTable::new()
        .with(ClassDescriptor::new("a", "Key"))
        .with(
            ClassDescriptor::new("a", "Holder")
                .with_field(FieldDescriptor::new("label", string()))
                .with_field(FieldDescriptor::new(
                    "index",
                    TypeRef::parameterized("java.util.Map", vec![TypeRef::class("a.Key"), string()]),
                )),
        );
    let config = Configuration::with_defaults();
    let mut sink = MemorySink::new();
    let mut generator = Generator::new(&table, &config, &mut sink);

    generator.generate("a.Holder", Direction::Deserialize).unwrap();

    assert!(generator.diagnostics().mentions("Property 'index' is ignored."));
    drop(generator);
    let plan = sink.deserializer("HolderBeanJsonDeserializerImpl").unwrap();
    let names: Vec<&str> = plan.properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["label"]);
    assert!(plan.ignored_properties.contains(&"index".to_string()));
}

#[test]
fn generate___required_creator_parameter___is_enforced_by_builder_only() {
    let required = PropertyDirectives {
        required: true,
        ..Default::default()
    };
    let table = TypeTable::new().with(ClassDescriptor::new("a", "Pt").with_constructor(
        ConstructorDescriptor::new(vec![
            ParamDescriptor::new("x", int()).with_directives(required),
            ParamDescriptor::new("y", int()),
        ]),
    ));
    let config = Configuration::with_defaults();
    let mut sink = MemorySink::new();
    let mut generator = Generator::new(&table, &config, &mut sink);

    generator.generate("a.Pt", Direction::Deserialize).unwrap();

    drop(generator);
    let plan = sink.deserializer("PtBeanJsonDeserializerImpl").unwrap();
    let Some(InstanceBuilderPlan::Parameterized { arguments, .. }) = &plan.instance_builder else {
        panic!("expected parameterized builder");
    };
    assert!(arguments[0].required);
    assert!(plan.properties.is_empty());
    assert!(plan.required_properties.is_empty());
}

#[test]
fn generate___required_property_dropped___is_not_required() {
    let required = PropertyDirectives {
        required: true,
        ..Default::default()
    };
    let table = TypeTable::new().with(
        ClassDescriptor::new("a", "Grid")
            .with_field(FieldDescriptor::new("label", string()).with_directives(required.clone()))
            .with_field(FieldDescriptor::new("cells", TypeRef::array(int(), 3)).with_directives(required)),
    );
    let config = Configuration::with_defaults();
    let mut sink = MemorySink::new();
    let mut generator = Generator::new(&table, &config, &mut sink);

    generator.generate("a.Grid", Direction::Deserialize).unwrap();

    drop(generator);
    let plan = sink.deserializer("GridBeanJsonDeserializerImpl").unwrap();
    assert!(plan.ignored_properties.contains(&"cells".to_string()));
    assert_eq!(plan.required_properties, vec!["label".to_string()]);
}

#[test]
fn generate___unsupported_creator_argument___fails_bean() {
    let table = TypeTable::new().with(ClassDescriptor::new("a", "Shape").with_constructor(
        ConstructorDescriptor::new(vec![ParamDescriptor::new(
            "corners",
            TypeRef::array(int(), 3),
        )]),
    ));
    let config = Configuration::with_defaults();
    let mut sink = MemorySink::new();
    let mut generator = Generator::new(&table, &config, &mut sink);

    let err = generator.generate("a.Shape", Direction::Deserialize).unwrap_err();

    assert!(!err.is_recoverable());
    assert!(err.to_string().starts_with("Cannot resolve creator argument 'corners' of a.Shape"));
    drop(generator);
    assert!(!sink.is_reserved(&ArtifactName::new("a", "ShapeBeanJsonDeserializerImpl")));
}

#[test]
fn generate___failed_creator___releases_codecs_built_for_it() {
    let table = TypeTable::new()
        .with(ClassDescriptor::new("a", "Leaf").with_field(FieldDescriptor::new("owner", TypeRef::class("a.Tree"))))
        .with(ClassDescriptor::new("a", "Tree").with_constructor(ConstructorDescriptor::new(vec![
            ParamDescriptor::new("leaf", TypeRef::class("a.Leaf")),
            ParamDescriptor::new("corners", TypeRef::array(int(), 3)),
        ])));
    let config = Configuration::with_defaults();
    let mut sink = MemorySink::new();
    let mut generator = Generator::new(&table, &config, &mut sink);

    let err = generator.generate("a.Tree", Direction::Deserialize).unwrap_err();

    assert!(err.to_string().starts_with("Cannot resolve creator argument 'corners' of a.Tree"));
    drop(generator);
    assert!(sink.plans().is_empty());
    assert!(!sink.is_reserved(&ArtifactName::new("a", "LeafBeanJsonDeserializerImpl")));
    assert!(!sink.is_reserved(&ArtifactName::new("a", "TreeBeanJsonDeserializerImpl")));
}

#[test]
fn generate___explicit_private_field___is_bridged() {
    let explicit = PropertyDirectives {
        property: true,
        ..PropertyDirectives::default()
    };
    let table = TypeTable::new().with(
        ClassDescriptor::new("a", "Secret").with_field(
            FieldDescriptor::new("code", string())
                .with_access(Access::Private)
                .with_directives(explicit),
        ),
    );
    let config = Configuration::with_defaults();
    let mut sink = MemorySink::new();
    let mut generator = Generator::new(&table, &config, &mut sink);

    generator.generate("a.Secret", Direction::Serialize).unwrap();

    drop(generator);
    let plan = sink.serializer("SecretBeanJsonSerializerImpl").unwrap();
    let code = plan.properties.iter().find(|p| p.name == "code").unwrap();
    assert!(code.accessor.bridged);
}

#[test]
fn generate___object___lists_every_known_class_as_subtype() {
    let table = TypeTable::new().with(person());
    let config = Configuration::with_defaults();
    let mut sink = MemorySink::new();
    let mut generator = Generator::new(&table, &config, &mut sink);

    generator.generate(OBJECT, Direction::Deserialize).unwrap();

    drop(generator);
    let plan = sink.deserializer("ObjectBeanJsonDeserializerImpl").unwrap();
    assert_eq!(plan.base, DeserializerBase::Object);
    assert_eq!(plan.subtypes.len(), 1);
    assert_eq!(plan.subtypes[0].subtype, "a.Person");
    assert_eq!(plan.subtypes[0].kind, SubtypeKind::Bean);
    assert!(sink.deserializer("PersonBeanJsonDeserializerImpl").is_some());
}

#[test]
fn emit___existing_name___is_skipped() {
    let table = table();
    let config = Configuration::with_defaults();
    let mut sink = MemorySink::new();
    let mut generator = Generator::new(&table, &config, &mut sink);
    generator.generate("a.Person", Direction::Serialize).unwrap();
    let plan = ArtifactPlan::Mapper(crate::plan::MapperPlan {
        name: ArtifactName::new("a", "PersonMapperImpl"),
        interface: "a.PersonMapper".into(),
        mapped_type: TypeRef::class("a.Person"),
        kind: crate::plan::MapperKind::Writer,
        root_name: "Person".into(),
        serializer: None,
        deserializer: None,
    });

    assert!(generator.emit(plan.clone()).unwrap());
    assert!(!generator.emit(plan).unwrap());
}
