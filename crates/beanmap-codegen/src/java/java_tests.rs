#![allow(non_snake_case)]

use super::*;
use crate::bean::BeanTypeInfo;
use crate::plan::MapperKind;
use beanmap_core::{IdGenerator, PrimitiveType, Shape, TypeInclusion};

fn string() -> TypeRef {
    TypeRef::class("java.lang.String")
}

fn string_codec(direction: Direction) -> CodecDescriptor {
    let codec = match direction {
        Direction::Serialize => "StringJsonSerializer",
        Direction::Deserialize => "StringJsonDeserializer",
    };
    CodecDescriptor::new(
        string(),
        direction,
        CodecInstance::Factory {
            codec: codec.into(),
            creation: InstanceCreation::StaticMethod("getInstance".into()),
        },
    )
}

fn method(name: &str, bridged: bool) -> Accessor {
    Accessor {
        member: AccessorMember::Method(name.into()),
        declaring: "com.example.Person".into(),
        bridged,
    }
}

fn field(name: &str, bridged: bool) -> Accessor {
    Accessor {
        member: AccessorMember::Field(name.into()),
        declaring: "com.example.Person".into(),
        bridged,
    }
}

fn serializer_plan(properties: Vec<SerializerProperty>) -> SerializerPlan {
    SerializerPlan {
        name: ArtifactName::new("com.example", "PersonBeanJsonSerializerImpl"),
        bean: TypeRef::class("com.example.Person"),
        type_params: Vec::new(),
        base: SerializerBase::Bean,
        value: None,
        properties,
        any_getter: None,
        identity: None,
        type_info: None,
        subtypes: Vec::new(),
    }
}

fn name_property(accessor: Accessor) -> SerializerProperty {
    SerializerProperty {
        name: "name".into(),
        escaped_name: "name".into(),
        ty: string(),
        accessor,
        codec: string_codec(Direction::Serialize),
        name_emission: None,
        parameters: None,
    }
}

fn deserializer_plan(builder: InstanceBuilderPlan) -> DeserializerPlan {
    DeserializerPlan {
        name: ArtifactName::new("com.example", "PersonBeanJsonDeserializerImpl"),
        bean: TypeRef::class("com.example.Person"),
        type_params: Vec::new(),
        base: DeserializerBase::Bean,
        instance_builder: Some(builder),
        properties: Vec::new(),
        back_references: Vec::new(),
        ignored_properties: Vec::new(),
        required_properties: Vec::new(),
        any_setter: None,
        identity: None,
        type_info: None,
        subtypes: Vec::new(),
        ignore_unknown: false,
    }
}

fn argument(name: &str, ty: TypeRef, required: bool) -> CreatorArgument {
    CreatorArgument {
        name: name.into(),
        escaped_name: name.into(),
        default_value: ty.default_value(),
        codec: CodecDescriptor::new(
            ty.clone(),
            Direction::Deserialize,
            CodecInstance::Factory {
                codec: "IntegerJsonDeserializer".into(),
                creation: InstanceCreation::StaticMethod("getInstance".into()),
            },
        ),
        ty,
        parameters: None,
        required,
    }
}

fn constructor(bridged: bool) -> CreatorCall {
    CreatorCall {
        kind: CreatorKind::Constructor,
        bridged,
    }
}

// ============================================================================
// Codec expressions
// ============================================================================

#[test]
fn codec_expression___nested_factories___renders_call_tree() {
    let person = CodecDescriptor::new(
        TypeRef::class("com.example.Person"),
        Direction::Serialize,
        CodecInstance::Bean {
            artifact: ArtifactName::new("com.example", "PersonBeanJsonSerializerImpl"),
        },
    );
    let list = CodecDescriptor::new(
        TypeRef::parameterized("java.util.List", vec![TypeRef::class("com.example.Person")]),
        Direction::Serialize,
        CodecInstance::Factory {
            codec: "CollectionJsonSerializer".into(),
            creation: InstanceCreation::StaticMethod("newInstance".into()),
        },
    )
    .with_parameters(vec![person]);

    assert_eq!(
        codec_expression(&list),
        "CollectionJsonSerializer.newInstance(new com.example.PersonBeanJsonSerializerImpl())"
    );
}

#[test]
fn codec_expression___constructor_factory___uses_new() {
    let codec = CodecDescriptor::new(
        string(),
        Direction::Deserialize,
        CodecInstance::Factory {
            codec: "com.example.Custom".into(),
            creation: InstanceCreation::Constructor,
        },
    );

    assert_eq!(codec_expression(&codec), "new com.example.Custom()");
}

#[test]
fn codec_expression___type_parameter___names_constructor_field() {
    let ser = CodecDescriptor::new(
        TypeRef::type_parameter("a.Box", "T"),
        Direction::Serialize,
        CodecInstance::TypeParameter { ordinal: 1 },
    );
    let deser = CodecDescriptor::new(
        TypeRef::type_parameter("a.Box", "T"),
        Direction::Deserialize,
        CodecInstance::TypeParameter { ordinal: 0 },
    );

    assert_eq!(codec_expression(&ser), "serializer1");
    assert_eq!(codec_expression(&deser), "deserializer0");
}

#[test]
fn codec_expression___enum___specialises_on_enum_type() {
    let ser = CodecDescriptor::new(
        TypeRef::class("a.Color"),
        Direction::Serialize,
        CodecInstance::Enum {
            enum_type: "a.Color".into(),
        },
    );
    let deser = CodecDescriptor::new(
        TypeRef::class("a.Color"),
        Direction::Deserialize,
        CodecInstance::Enum {
            enum_type: "a.Color".into(),
        },
    );

    assert!(codec_expression(&ser).ends_with("EnumJsonSerializer.<a.Color>getInstance()"));
    assert!(codec_expression(&deser).ends_with("EnumJsonDeserializer.newInstance(a.Color.class)"));
}

#[test]
fn codec_expression___any_enum_key___uses_key_serializer() {
    let key = CodecDescriptor::new(
        TypeRef::class(beanmap_core::ENUM),
        Direction::Serialize,
        CodecInstance::AnyEnum,
    )
    .as_key();

    assert!(codec_expression(&key).ends_with("EnumKeySerializer.getInstance()"));
}

#[test]
fn codec_expression___array_deserializer___passes_array_creator() {
    let leaf = string_codec(Direction::Deserialize);
    let one = CodecDescriptor::new(
        TypeRef::array(string(), 1),
        Direction::Deserialize,
        CodecInstance::Array {
            rank: 1,
            leaf: string(),
        },
    )
    .with_parameters(vec![leaf.clone()]);
    let two = CodecDescriptor::new(
        TypeRef::array(string(), 2),
        Direction::Deserialize,
        CodecInstance::Array {
            rank: 2,
            leaf: string(),
        },
    )
    .with_parameters(vec![leaf]);

    let one = codec_expression(&one);
    let two = codec_expression(&two);

    assert!(one.contains("ArrayJsonDeserializer.newInstance(StringJsonDeserializer.getInstance(), "));
    assert!(one.contains("new java.lang.String[length]"));
    assert!(two.contains("Array2dJsonDeserializer"));
    assert!(two.contains("new java.lang.String[first][second]"));
}

// ============================================================================
// Serializer
// ============================================================================

#[test]
fn render_artifact___serializer___declares_class_and_property() {
    let plan = serializer_plan(vec![name_property(method("getName", false))]);

    let source = render_artifact(&ArtifactPlan::Serializer(plan));

    assert!(source.starts_with("package com.example;\n\n"));
    assert!(source.contains(
        "public class PersonBeanJsonSerializerImpl extends com.github.nmorel.gwtjackson.client.ser.bean.AbstractBeanJsonSerializer<com.example.Person> {"
    ));
    assert!(source.contains("return com.example.Person.class;"));
    assert!(source.contains("result = new com.github.nmorel.gwtjackson.client.ser.bean.BeanPropertySerializer[1];"));
    assert!(source.contains("BeanPropertySerializer<com.example.Person, java.lang.String>(\"name\")"));
    assert!(source.contains("return StringJsonSerializer.getInstance();"));
    assert!(source.contains("return bean.getName();"));
    assert!(source.trim_end().ends_with('}'));
}

#[test]
fn render_artifact___private_field___reads_through_bridge() {
    let plan = serializer_plan(vec![name_property(field("name", true))]);

    let source = render_artifact(&ArtifactPlan::Serializer(plan));

    assert!(source.contains("return nameBridge(bean);"));
    assert!(source.contains("private native java.lang.String nameBridge(com.example.Person bean) /*-{"));
    assert!(source.contains("return bean.@com.example.Person::name;"));
    assert!(source.contains("}-*/;"));
}

#[test]
fn render_artifact___generic_serializer___receives_parameter_codecs() {
    let mut plan = serializer_plan(Vec::new());
    plan.name = ArtifactName::new("a", "BoxBeanJsonSerializerImpl");
    plan.bean = TypeRef::parameterized("a.Box", vec![TypeRef::type_parameter("a.Box", "T")]);
    plan.type_params = vec![TypeParamDecl::new("T")];

    let source = render_artifact(&ArtifactPlan::Serializer(plan));

    assert!(source.contains("public class BoxBeanJsonSerializerImpl<T> extends"));
    assert!(source.contains("AbstractBeanJsonSerializer<a.Box<T>>"));
    assert!(source.contains("private final com.github.nmorel.gwtjackson.client.JsonSerializer<T> serializer0;"));
    assert!(source.contains("this.serializer0 = serializer0;"));
    assert!(source.contains("return a.Box.class;"));
}

#[test]
fn render_artifact___property_parameters___chains_setters() {
    let mut property = name_property(method("getName", false));
    property.parameters = Some(PropertyParameters {
        pattern: Some("yyyy".into()),
        shape: Some(Shape::String),
        timezone_offset_minutes: Some(-60),
        ignored_properties: vec!["secret".into()],
        unwrapped: true,
        ..PropertyParameters::default()
    });
    property.name_emission = Some(NameEmission::Unwrapped);
    let plan = serializer_plan(vec![property]);

    let source = render_artifact(&ArtifactPlan::Serializer(plan));

    assert!(source.contains("return new com.github.nmorel.gwtjackson.client.JsonSerializerParameters()\n"));
    assert!(source.contains(".setPattern(\"yyyy\")\n"));
    assert!(source.contains(".setShape(com.fasterxml.jackson.annotation.JsonFormat.Shape.STRING)"));
    assert!(source.contains(".setTimezone(com.google.gwt.i18n.client.TimeZone.createTimeZone(-60))"));
    assert!(source.contains(".addIgnoredProperty(\"secret\")"));
    assert!(source.contains(".setUnwrapped(true);"));
    assert!(source.contains("public void serializePropertyName("));
}

#[test]
fn render_artifact___generated_identity___scopes_generator_per_context() {
    let mut plan = serializer_plan(Vec::new());
    plan.identity = Some(IdentityPlan {
        property: "@id".into(),
        always_as_id: false,
        generator: IdGenerator::IntSequence,
        scope: "java.lang.Object".into(),
        source: IdentitySource::Generator {
            id_type: TypeRef::class("java.lang.Integer"),
            codec: CodecDescriptor::new(
                TypeRef::class("java.lang.Integer"),
                Direction::Serialize,
                CodecInstance::Factory {
                    codec: "IntegerJsonSerializer".into(),
                    creation: InstanceCreation::StaticMethod("getInstance".into()),
                },
            ),
        },
    });

    let source = render_artifact(&ArtifactPlan::Serializer(plan));

    assert!(source.contains("AbstractIdentitySerializationInfo<com.example.Person, java.lang.Integer>(false, \"@id\")"));
    assert!(source.contains(
        "new com.fasterxml.jackson.annotation.ObjectIdGenerators.IntSequenceGenerator().forScope(java.lang.Object.class);"
    ));
    assert!(source.contains("ctx.findObjectIdGenerator(generator);"));
    assert!(source.contains("scopedGen = generator.newForSerialization(ctx);"));
    assert!(source.contains("ctx.addGenerator(scopedGen);"));
    assert!(source.contains("(scopedGen.generateId(bean), getSerializer());"));
}

#[test]
fn render_artifact___type_info_and_subtypes___registers_tags() {
    let mut plan = serializer_plan(Vec::new());
    plan.type_info = Some(BeanTypeInfo {
        inclusion: TypeInclusion::Property,
        property: "@type".into(),
        tags: vec![("com.example.Dog".into(), "dog".into())],
    });
    plan.subtypes = vec![SubtypeBinding {
        subtype: "com.example.Dog".into(),
        kind: SubtypeKind::Bean,
        codec: CodecDescriptor::new(
            TypeRef::class("com.example.Dog"),
            Direction::Serialize,
            CodecInstance::Bean {
                artifact: ArtifactName::new("com.example", "DogBeanJsonSerializerImpl"),
            },
        ),
    }];

    let source = render_artifact(&ArtifactPlan::Serializer(plan));

    assert!(source.contains("(com.fasterxml.jackson.annotation.JsonTypeInfo.As.PROPERTY, \"@type\")"));
    assert!(source.contains(".addTypeInfo(com.example.Dog.class, \"dog\")"));
    assert!(source.contains("initMapSubtypeClassToSerializer()"));
    assert!(source.contains("map.put(com.example.Dog.class, new com.github.nmorel.gwtjackson.client.ser.bean.SubtypeSerializer.BeanSubtypeSerializer() {"));
    assert!(source.contains("return new com.example.DogBeanJsonSerializerImpl();"));
}

// ============================================================================
// Deserializer
// ============================================================================

#[test]
fn render_artifact___default_creator___instantiates_at_once() {
    let mut plan = deserializer_plan(InstanceBuilderPlan::Default {
        creator: constructor(false),
    });
    plan.properties = vec![DeserializerProperty {
        name: "name".into(),
        escaped_name: "name".into(),
        ty: string(),
        accessor: method("setName", false),
        codec: string_codec(Direction::Deserialize),
        parameters: None,
        managed_reference: None,
    }];
    plan.ignored_properties = vec!["secret".into()];

    let source = render_artifact(&ArtifactPlan::Deserializer(plan));

    assert!(source.contains("AbstractBeanJsonDeserializer<com.example.Person>"));
    assert!(source.contains("return new com.github.nmorel.gwtjackson.client.deser.bean.Instance<com.example.Person>(create(), bufferedProperties);"));
    assert!(source.contains("private com.example.Person create() {"));
    assert!(source.contains("return new com.example.Person();"));
    assert!(source.contains("map.put(\"name\", new com.github.nmorel.gwtjackson.client.deser.bean.BeanPropertyDeserializer<com.example.Person, java.lang.String>() {"));
    assert!(source.contains("bean.setName(value);"));
    assert!(source.contains("protected java.util.Set<String> initIgnoredProperties() {"));
    assert!(source.contains("col.add(\"secret\");"));
    assert!(!source.contains("initRequiredProperties"));
}

#[test]
fn render_artifact___parameterized_creator___buffers_and_checks_required() {
    let plan = deserializer_plan(InstanceBuilderPlan::Parameterized {
        creator: constructor(false),
        arguments: vec![
            argument("x", TypeRef::primitive(PrimitiveType::Int), true),
            argument("y", TypeRef::primitive(PrimitiveType::Int), false),
        ],
    });

    let source = render_artifact(&ArtifactPlan::Deserializer(plan));

    assert!(source.contains("int nbParamToFind = 2;"));
    assert!(source.contains("requiredProperties.add(\"x\");"));
    assert!(!source.contains("requiredProperties.add(\"y\");"));
    assert!(source.contains("int property_0 = 0;"));
    assert!(source.contains("value = bufferedProperties.remove(\"y\");"));
    assert!(source.contains("IntegerJsonDeserializer.getInstance().deserialize(ctx.newJsonReader(value), ctx);"));
    assert!(source.contains("while (nbParamToFind > 0 && com.github.nmorel.gwtjackson.client.stream.JsonToken.NAME == reader.peek()) {"));
    assert!(source.contains("if (\"x\".equals(name)) {"));
    assert!(source.contains("boolean[] paramFound = new boolean[2];"));
    assert!(source.contains("if (!paramFound[0]) {"));
    assert!(source.contains("bufferedProperties.put(name, reader.nextValue());"));
    assert!(source.contains("\"Required properties are missing : \" + requiredProperties"));
    assert!(source.contains("create(property_0, property_1), bufferedProperties);"));
    assert!(source.contains("private com.example.Person create(int property_0, int property_1) {"));
}

#[test]
fn render_artifact___bridged_factory___uses_native_creator() {
    let plan = deserializer_plan(InstanceBuilderPlan::Parameterized {
        creator: CreatorCall {
            kind: CreatorKind::Factory("of".into()),
            bridged: true,
        },
        arguments: vec![argument("x", TypeRef::primitive(PrimitiveType::Int), false)],
    });

    let source = render_artifact(&ArtifactPlan::Deserializer(plan));

    assert!(source.contains("private native com.example.Person create(int property_0) /*-{"));
    assert!(source.contains("return @com.example.Person::of(*)(property_0);"));
}

#[test]
fn render_artifact___managed_reference___sets_back_reference_on_child() {
    let mut plan = deserializer_plan(InstanceBuilderPlan::Default {
        creator: constructor(false),
    });
    plan.properties = vec![DeserializerProperty {
        name: "child".into(),
        escaped_name: "child".into(),
        ty: TypeRef::class("com.example.Child"),
        accessor: field("child", true),
        codec: CodecDescriptor::new(
            TypeRef::class("com.example.Child"),
            Direction::Deserialize,
            CodecInstance::Bean {
                artifact: ArtifactName::new("com.example", "ChildBeanJsonDeserializerImpl"),
            },
        ),
        parameters: None,
        managed_reference: Some("parent".into()),
    }];
    plan.back_references = vec![BackReferenceBinding {
        reference: "owner".into(),
        property: "owner".into(),
        ty: TypeRef::class("com.example.Owner"),
        accessor: method("setOwner", false),
    }];

    let source = render_artifact(&ArtifactPlan::Deserializer(plan));

    assert!(source.contains("childBridge(bean, value);"));
    assert!(source.contains("bean.@com.example.Person::child = value;"));
    assert!(source.contains("getDeserializer().setBackReference(\"parent\", bean, value, ctx);"));
    assert!(source.contains("initBackReferenceDeserializers()"));
    assert!(source.contains("map.put(\"owner\", new com.github.nmorel.gwtjackson.client.deser.bean.BackReferenceProperty<com.example.Person, com.example.Owner>() {"));
    assert!(source.contains("bean.setOwner(reference);"));
}

#[test]
fn render_artifact___ignore_unknown___overrides_default() {
    let mut plan = deserializer_plan(InstanceBuilderPlan::Default {
        creator: constructor(false),
    });
    plan.ignore_unknown = true;
    plan.required_properties = vec!["id".into()];

    let source = render_artifact(&ArtifactPlan::Deserializer(plan));

    assert!(source.contains("protected boolean isDefaultIgnoreUnknown() {\n        return true;"));
    assert!(source.contains("initRequiredProperties()"));
    assert!(source.contains("col.add(\"id\");"));
}

// ============================================================================
// Mapper
// ============================================================================

#[test]
fn render_artifact___mapper___implements_interface() {
    let plan = MapperPlan {
        name: ArtifactName::new("com.example", "App_PersonMapperImpl"),
        interface: "com.example.App.PersonMapper".into(),
        mapped_type: TypeRef::class("com.example.Person"),
        kind: MapperKind::Mapper,
        root_name: "Person".into(),
        serializer: Some(CodecDescriptor::new(
            TypeRef::class("com.example.Person"),
            Direction::Serialize,
            CodecInstance::Bean {
                artifact: ArtifactName::new("com.example", "PersonBeanJsonSerializerImpl"),
            },
        )),
        deserializer: None,
    };

    let source = render_artifact(&ArtifactPlan::Mapper(plan));

    assert!(source.contains(
        "public class App_PersonMapperImpl extends com.github.nmorel.gwtjackson.client.AbstractObjectMapper<com.example.Person> implements com.example.App.PersonMapper {"
    ));
    assert!(source.contains("super(\"Person\");"));
    assert!(source.contains("return new com.example.PersonBeanJsonSerializerImpl();"));
    assert!(!source.contains("newDeserializer"));
}

#[test]
fn render_artifact___default_package___omits_package_line() {
    let mut plan = serializer_plan(Vec::new());
    plan.name = ArtifactName::new("", "PersonBeanJsonSerializerImpl");

    let source = render_artifact(&ArtifactPlan::Serializer(plan));

    assert!(source.starts_with("public class PersonBeanJsonSerializerImpl"));
}
