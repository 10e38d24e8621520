//! Java source rendering of artifact plans.
//!
//! Every plan becomes one compilation unit. Runtime types are written fully
//! qualified so the output needs no import section:
//!
//! ```text
//! package com.example;
//!
//! public class PersonBeanJsonSerializerImpl
//!         extends ...AbstractBeanJsonSerializer<com.example.Person> {
//!     getSerializedType()         class literal of the bean
//!     initSerializers()           one BeanPropertySerializer per property
//!     initIdentityInfo()          object identity, if any
//!     initTypeInfo()              polymorphic type tags, if any
//!     initMapSubtypeClassTo...()  codec per concrete subtype
//! }
//! ```
//!
//! Members the artifact package cannot reach are accessed through JSNI
//! bridge methods declared next to their single use.

use crate::bean::{BeanTypeInfo, CreatorKind};
use crate::codec::{CodecDescriptor, CodecInstance, Direction};
use crate::jvm_types::{
    boxed_type, class_literal, java_type, raw_type, type_parameter_declarations,
};
use crate::naming::{ArtifactName, escape_java_string};
use crate::plan::{
    ArtifactPlan, BackReferenceBinding, CreatorArgument, CreatorCall, DeserializerBase,
    DeserializerPlan, DeserializerProperty, IdentityPlan, IdentitySource, InstanceBuilderPlan,
    MapperPlan, NameEmission, PropertyParameters, SerializerBase, SerializerPlan,
    SerializerProperty, SubtypeBinding, SubtypeKind,
};
use crate::property::{Accessor, AccessorMember};
use beanmap_core::{InstanceCreation, ParameterRole, TypeParamDecl, TypeRef};

const INDENT: &str = "    ";

const JSON_SERIALIZER: &str = "com.github.nmorel.gwtjackson.client.JsonSerializer";
const JSON_DESERIALIZER: &str = "com.github.nmorel.gwtjackson.client.JsonDeserializer";
const SERIALIZATION_CONTEXT: &str = "com.github.nmorel.gwtjackson.client.JsonSerializationContext";
const DESERIALIZATION_CONTEXT: &str =
    "com.github.nmorel.gwtjackson.client.JsonDeserializationContext";
const SERIALIZER_PARAMETERS: &str = "com.github.nmorel.gwtjackson.client.JsonSerializerParameters";
const DESERIALIZER_PARAMETERS: &str =
    "com.github.nmorel.gwtjackson.client.JsonDeserializerParameters";
const JSON_READER: &str = "com.github.nmorel.gwtjackson.client.stream.JsonReader";
const JSON_WRITER: &str = "com.github.nmorel.gwtjackson.client.stream.JsonWriter";
const JSON_TOKEN: &str = "com.github.nmorel.gwtjackson.client.stream.JsonToken";

const SER_BEAN: &str = "com.github.nmorel.gwtjackson.client.ser.bean";
const DESER_BEAN: &str = "com.github.nmorel.gwtjackson.client.deser.bean";

const ENUM_SERIALIZER: &str = "com.github.nmorel.gwtjackson.client.ser.EnumJsonSerializer";
const ENUM_DESERIALIZER: &str = "com.github.nmorel.gwtjackson.client.deser.EnumJsonDeserializer";
const ENUM_KEY_SERIALIZER: &str = "com.github.nmorel.gwtjackson.client.ser.map.key.EnumKeySerializer";
const ENUM_KEY_DESERIALIZER: &str =
    "com.github.nmorel.gwtjackson.client.deser.map.key.EnumKeyDeserializer";
const ARRAY_SERIALIZER: &str = "com.github.nmorel.gwtjackson.client.ser.array.ArrayJsonSerializer";
const ARRAY_2D_SERIALIZER: &str =
    "com.github.nmorel.gwtjackson.client.ser.array.dd.Array2dJsonSerializer";
const ARRAY_DESERIALIZER: &str =
    "com.github.nmorel.gwtjackson.client.deser.array.ArrayJsonDeserializer";
const ARRAY_2D_DESERIALIZER: &str =
    "com.github.nmorel.gwtjackson.client.deser.array.dd.Array2dJsonDeserializer";
const RAW_VALUE_SERIALIZER: &str = "com.github.nmorel.gwtjackson.client.ser.RawValueJsonSerializer";
const MAP_SERIALIZER: &str = "com.github.nmorel.gwtjackson.client.ser.map.MapJsonSerializer";

const MAP_LIKE: &str = "com.github.nmorel.gwtjackson.client.utils.MapLike";
const STRING_MAP: &str = "com.github.nmorel.gwtjackson.client.utils.SimpleStringMap";

const SHAPE: &str = "com.fasterxml.jackson.annotation.JsonFormat.Shape";
const INCLUDE: &str = "com.fasterxml.jackson.annotation.JsonInclude.Include";
const AS: &str = "com.fasterxml.jackson.annotation.JsonTypeInfo.As";
const TIME_ZONE: &str = "com.google.gwt.i18n.client.TimeZone";

/// Indenting line buffer.
#[derive(Debug, Default)]
struct SourceWriter {
    code: String,
    indent: usize,
}

impl SourceWriter {
    fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.indent {
                self.code.push_str(INDENT);
            }
            self.code.push_str(text);
        }
        self.code.push('\n');
    }

    fn blank(&mut self) {
        self.code.push('\n');
    }

    fn open(&mut self, text: impl AsRef<str>) {
        self.line(text);
        self.indent += 1;
    }

    fn close(&mut self, text: impl AsRef<str>) {
        self.indent = self.indent.saturating_sub(1);
        self.line(text);
    }

    /// `head` followed by one indented line per chained call, ending in `;`.
    fn chain(&mut self, head: &str, calls: &[String]) {
        if calls.is_empty() {
            self.line(format!("{head};"));
            return;
        }
        self.line(head);
        self.indent += 2;
        let last = calls.len() - 1;
        for (i, call) in calls.iter().enumerate() {
            if i == last {
                self.line(format!("{call};"));
            } else {
                self.line(call);
            }
        }
        self.indent -= 2;
    }

    /// An `@Override` method whose body is a single return.
    fn returning(&mut self, signature: &str, expression: &str) {
        self.line("@Override");
        self.open(format!("{signature} {{"));
        self.line(format!("return {expression};"));
        self.close("}");
    }

    fn finish(self) -> String {
        self.code
    }
}

/// Render a plan as a Java compilation unit.
pub fn render_artifact(plan: &ArtifactPlan) -> String {
    match plan {
        ArtifactPlan::Serializer(plan) => render_serializer(plan),
        ArtifactPlan::Deserializer(plan) => render_deserializer(plan),
        ArtifactPlan::Mapper(plan) => render_mapper(plan),
    }
}

/// Expression instantiating the codec described by `codec`.
pub fn codec_expression(codec: &CodecDescriptor) -> String {
    let args: Vec<String> = codec.parameters.iter().map(codec_expression).collect();
    let args = args.join(", ");
    let serialize = codec.direction == Direction::Serialize;

    match &codec.instance {
        CodecInstance::Factory { codec, creation } => match creation {
            InstanceCreation::Constructor => format!("new {codec}({args})"),
            InstanceCreation::StaticMethod(method) => format!("{codec}.{method}({args})"),
        },
        CodecInstance::TypeParameter { ordinal } => type_parameter_field(codec.direction, *ordinal),
        CodecInstance::Enum { enum_type } if serialize => {
            format!("{ENUM_SERIALIZER}.<{enum_type}>getInstance()")
        }
        CodecInstance::Enum { enum_type } => {
            format!("{ENUM_DESERIALIZER}.newInstance({enum_type}.class)")
        }
        CodecInstance::EnumKey { enum_type } if serialize => {
            format!("{ENUM_KEY_SERIALIZER}.<{enum_type}>getInstance()")
        }
        CodecInstance::EnumKey { enum_type } => {
            format!("{ENUM_KEY_DESERIALIZER}.newInstance({enum_type}.class)")
        }
        CodecInstance::AnyEnum if codec.role == ParameterRole::Key => {
            format!("{ENUM_KEY_SERIALIZER}.getInstance()")
        }
        CodecInstance::AnyEnum => format!("{ENUM_SERIALIZER}.getInstance()"),
        CodecInstance::Array { rank, .. } if serialize => {
            let class = if *rank >= 2 { ARRAY_2D_SERIALIZER } else { ARRAY_SERIALIZER };
            format!("{class}.newInstance({args})")
        }
        CodecInstance::Array { rank, leaf } => {
            let boxed = boxed_type(leaf);
            let raw = raw_type(leaf);
            if *rank >= 2 {
                format!(
                    "{ARRAY_2D_DESERIALIZER}.newInstance({args}, new {ARRAY_2D_DESERIALIZER}.Array2dCreator<{boxed}>() {{ \
                     @Override public {boxed}[][] create(int first, int second) {{ \
                     return ({boxed}[][]) new {raw}[first][second]; }} }})"
                )
            } else {
                format!(
                    "{ARRAY_DESERIALIZER}.newInstance({args}, new {ARRAY_DESERIALIZER}.ArrayCreator<{boxed}>() {{ \
                     @Override public {boxed}[] create(int length) {{ \
                     return ({boxed}[]) new {raw}[length]; }} }})"
                )
            }
        }
        CodecInstance::Bean { artifact } => format!("new {}({args})", artifact.qualified()),
        CodecInstance::RawValue => format!("{RAW_VALUE_SERIALIZER}.getInstance()"),
    }
}

fn type_parameter_field(direction: Direction, ordinal: usize) -> String {
    format!("{}{ordinal}", direction.label())
}

fn codec_interface(direction: Direction) -> &'static str {
    match direction {
        Direction::Serialize => JSON_SERIALIZER,
        Direction::Deserialize => JSON_DESERIALIZER,
    }
}

fn context(direction: Direction) -> &'static str {
    match direction {
        Direction::Serialize => SERIALIZATION_CONTEXT,
        Direction::Deserialize => DESERIALIZATION_CONTEXT,
    }
}

fn string_literal(s: &str) -> String {
    format!("\"{}\"", escape_java_string(s))
}

fn write_package(w: &mut SourceWriter, name: &ArtifactName) {
    if !name.package.is_empty() {
        w.line(format!("package {};", name.package));
        w.blank();
    }
}

/// Fields and constructor receiving the codecs of the artifact's type parameters.
fn write_type_parameter_codecs(
    w: &mut SourceWriter,
    simple_name: &str,
    type_params: &[TypeParamDecl],
    direction: Direction,
) {
    if type_params.is_empty() {
        return;
    }
    let interface = codec_interface(direction);
    let params: Vec<(String, &str)> = type_params
        .iter()
        .enumerate()
        .map(|(i, p)| (type_parameter_field(direction, i), p.name.as_str()))
        .collect();

    for (field, name) in &params {
        w.line(format!("private final {interface}<{name}> {field};"));
    }
    w.blank();
    let signature: Vec<String> = params
        .iter()
        .map(|(field, name)| format!("{interface}<{name}> {field}"))
        .collect();
    w.open(format!("public {simple_name}({}) {{", signature.join(", ")));
    for (field, _) in &params {
        w.line(format!("this.{field} = {field};"));
    }
    w.close("}");
}

// ============================================================================
// Accessors
// ============================================================================

fn bridge_name(accessor: &Accessor) -> String {
    format!("{}Bridge", accessor.member_name())
}

fn getter_call(accessor: &Accessor) -> String {
    if accessor.bridged {
        return format!("{}(bean)", bridge_name(accessor));
    }
    match &accessor.member {
        AccessorMember::Field(name) => format!("bean.{name}"),
        AccessorMember::Method(name) => format!("bean.{name}()"),
    }
}

fn write_getter_bridge(w: &mut SourceWriter, accessor: &Accessor, bean: &str, value: &str) {
    if !accessor.bridged {
        return;
    }
    w.blank();
    w.open(format!(
        "private native {value} {}({bean} bean) /*-{{",
        bridge_name(accessor)
    ));
    match &accessor.member {
        AccessorMember::Field(name) => w.line(format!("return bean.@{}::{name};", accessor.declaring)),
        AccessorMember::Method(name) => {
            w.line(format!("return bean.@{}::{name}()();", accessor.declaring))
        }
    }
    w.close("}-*/;");
}

/// Statement storing `args` through a setter, or the value into a field.
fn setter_statement(accessor: &Accessor, args: &[&str]) -> String {
    if accessor.bridged {
        return format!("{}(bean, {});", bridge_name(accessor), args.join(", "));
    }
    match &accessor.member {
        AccessorMember::Field(name) => format!("bean.{name} = {};", args.join(", ")),
        AccessorMember::Method(name) => format!("bean.{name}({});", args.join(", ")),
    }
}

fn write_setter_bridge(w: &mut SourceWriter, accessor: &Accessor, bean: &str, params: &[(&str, String)]) {
    if !accessor.bridged {
        return;
    }
    let signature: Vec<String> = params.iter().map(|(name, ty)| format!("{ty} {name}")).collect();
    let names: Vec<&str> = params.iter().map(|(name, _)| *name).collect();
    w.blank();
    w.open(format!(
        "private native void {}({bean} bean, {}) /*-{{",
        bridge_name(accessor),
        signature.join(", ")
    ));
    match &accessor.member {
        AccessorMember::Field(name) => {
            w.line(format!("bean.@{}::{name} = {};", accessor.declaring, names.join(", ")))
        }
        AccessorMember::Method(name) => w.line(format!(
            "bean.@{}::{name}(*)({});",
            accessor.declaring,
            names.join(", ")
        )),
    }
    w.close("}-*/;");
}

// ============================================================================
// Parameters, identity and type info
// ============================================================================

fn parameters_class(direction: Direction) -> &'static str {
    match direction {
        Direction::Serialize => SERIALIZER_PARAMETERS,
        Direction::Deserialize => DESERIALIZER_PARAMETERS,
    }
}

/// Chained setter calls for `parameters`; identity refers to `identity_method`.
fn parameter_calls(
    parameters: &PropertyParameters,
    annotated: &TypeRef,
    direction: Direction,
    identity_method: &str,
) -> Vec<String> {
    let mut calls = Vec::new();
    if let Some(pattern) = &parameters.pattern {
        calls.push(format!(".setPattern({})", string_literal(pattern)));
    }
    if let Some(shape) = parameters.shape {
        calls.push(format!(".setShape({SHAPE}.{})", shape.constant()));
    }
    if let Some(locale) = &parameters.locale {
        calls.push(format!(".setLocale({})", string_literal(locale)));
    }
    if let Some(offset) = parameters.timezone_offset_minutes {
        calls.push(format!(".setTimezone({TIME_ZONE}.createTimeZone({offset}))"));
    }
    for ignored in &parameters.ignored_properties {
        calls.push(format!(".addIgnoredProperty({})", string_literal(ignored)));
    }
    if let Some(ignore_unknown) = parameters.ignore_unknown {
        calls.push(format!(".setIgnoreUnknown({ignore_unknown})"));
    }
    if let Some(include) = parameters.include {
        calls.push(format!(".setInclude({INCLUDE}.{})", include.constant()));
    }
    if parameters.identity.is_some() {
        calls.push(format!(".setIdentityInfo({identity_method}())"));
    }
    if let Some(type_info) = &parameters.type_info {
        calls.push(format!(
            ".setTypeInfo({})",
            type_info_expression(type_info, annotated, direction)
        ));
    }
    if parameters.unwrapped {
        calls.push(".setUnwrapped(true)".to_string());
    }
    calls
}

/// `newParameters{suffix}()` and, when needed, `newIdentityInfo{suffix}()`.
fn write_parameters_methods(
    w: &mut SourceWriter,
    parameters: &PropertyParameters,
    annotated: &TypeRef,
    direction: Direction,
    suffix: &str,
) {
    let class = parameters_class(direction);
    let identity_method = format!("newIdentityInfo{suffix}");
    let calls = parameter_calls(parameters, annotated, direction, &identity_method);
    let visibility = if suffix.is_empty() {
        w.line("@Override");
        "protected"
    } else {
        "private"
    };
    w.open(format!("{visibility} {class} newParameters{suffix}() {{"));
    w.chain(&format!("return new {class}()"), &calls);
    w.close("}");

    if let Some(identity) = &parameters.identity {
        w.blank();
        w.open(format!(
            "private {} {identity_method}() {{",
            identity_info_interface(direction)
        ));
        write_identity_info(w, "return ", identity, &boxed_type(annotated), direction);
        w.close("}");
    }
}

fn identity_info_interface(direction: Direction) -> String {
    match direction {
        Direction::Serialize => format!("{SER_BEAN}.IdentitySerializationInfo"),
        Direction::Deserialize => format!("{DESER_BEAN}.IdentityDeserializationInfo"),
    }
}

fn write_identity_info(
    w: &mut SourceWriter,
    prefix: &str,
    identity: &IdentityPlan,
    bean: &str,
    direction: Direction,
) {
    let property = string_literal(&identity.property);
    let (id_type, codec, accessor) = match &identity.source {
        IdentitySource::Property { ty, accessor, codec } => (ty, codec, accessor.as_ref()),
        IdentitySource::Generator { id_type, codec } => (id_type, codec, None),
    };
    let id = boxed_type(id_type);
    let property_backed = matches!(identity.source, IdentitySource::Property { .. });

    match direction {
        Direction::Serialize => {
            let class = if property_backed {
                "PropertyIdentitySerializationInfo"
            } else {
                "AbstractIdentitySerializationInfo"
            };
            w.open(format!(
                "{prefix}new {SER_BEAN}.{class}<{bean}, {id}>({}, {property}) {{",
                identity.always_as_id
            ));
            w.returning(
                &format!("protected {JSON_SERIALIZER}<?> newSerializer()"),
                &codec_expression(codec),
            );
            if property_backed {
                if let Some(accessor) = accessor {
                    w.blank();
                    w.returning(
                        &format!("public {id} getValue({bean} bean, {SERIALIZATION_CONTEXT} ctx)"),
                        &getter_call(accessor),
                    );
                    write_getter_bridge(w, accessor, bean, &id);
                }
            } else {
                let generator = identity.generator.class_name();
                let object_id_generator = format!("com.fasterxml.jackson.annotation.ObjectIdGenerator<{id}>");
                w.blank();
                w.line("@Override");
                w.open(format!(
                    "public {SER_BEAN}.ObjectIdSerializer<{id}> getObjectId({bean} bean, {SERIALIZATION_CONTEXT} ctx) {{"
                ));
                w.line(format!(
                    "{object_id_generator} generator = new {generator}().forScope({}.class);",
                    identity.scope
                ));
                w.line(format!(
                    "{object_id_generator} scopedGen = ctx.findObjectIdGenerator(generator);"
                ));
                w.open("if (null == scopedGen) {");
                w.line("scopedGen = generator.newForSerialization(ctx);");
                w.line("ctx.addGenerator(scopedGen);");
                w.close("}");
                w.line(format!(
                    "return new {SER_BEAN}.ObjectIdSerializer<{id}>(scopedGen.generateId(bean), getSerializer());"
                ));
                w.close("}");
            }
            w.close("};");
        }
        Direction::Deserialize => {
            let class = if property_backed {
                "PropertyIdentityDeserializationInfo"
            } else {
                "AbstractIdentityDeserializationInfo"
            };
            w.open(format!(
                "{prefix}new {DESER_BEAN}.{class}<{bean}, {id}>({property}, {}.class, {}.class) {{",
                identity.generator.class_name(),
                identity.scope
            ));
            w.returning(
                &format!("protected {JSON_DESERIALIZER}<?> newDeserializer()"),
                &codec_expression(codec),
            );
            w.close("};");
        }
    }
}

fn type_info_expression(info: &BeanTypeInfo, bean: &TypeRef, direction: Direction) -> String {
    let class = match direction {
        Direction::Serialize => format!("{SER_BEAN}.TypeSerializationInfo"),
        Direction::Deserialize => format!("{DESER_BEAN}.TypeDeserializationInfo"),
    };
    let mut expression = format!(
        "new {class}<{}>({AS}.{}, {})",
        boxed_type(bean),
        info.inclusion.constant(),
        string_literal(&info.property)
    );
    for (ty, tag) in &info.tags {
        expression.push_str(&format!(".addTypeInfo({ty}.class, {})", string_literal(tag)));
    }
    expression
}

fn write_type_info(w: &mut SourceWriter, info: &BeanTypeInfo, bean: &TypeRef, direction: Direction) {
    let class = match direction {
        Direction::Serialize => format!("{SER_BEAN}.TypeSerializationInfo"),
        Direction::Deserialize => format!("{DESER_BEAN}.TypeDeserializationInfo"),
    };
    w.blank();
    w.returning(
        &format!("protected {class}<{}> initTypeInfo()", boxed_type(bean)),
        &type_info_expression(info, bean, direction),
    );
}

fn write_subtypes(w: &mut SourceWriter, subtypes: &[SubtypeBinding], direction: Direction) {
    if subtypes.is_empty() {
        return;
    }
    let (method, holder, factory) = match direction {
        Direction::Serialize => (
            "initMapSubtypeClassToSerializer",
            format!("{SER_BEAN}.SubtypeSerializer"),
            "newSerializer",
        ),
        Direction::Deserialize => (
            "initMapSubtypeClassToDeserializer",
            format!("{DESER_BEAN}.SubtypeDeserializer"),
            "newDeserializer",
        ),
    };
    let map_type = format!("java.util.Map<Class, {holder}>");
    w.blank();
    w.line("@Override");
    w.open(format!("protected {map_type} {method}() {{"));
    w.line(format!(
        "{map_type} map = new java.util.IdentityHashMap<Class, {holder}>({});",
        subtypes.len()
    ));
    for binding in subtypes {
        let kind = match (binding.kind, direction) {
            (SubtypeKind::Bean, Direction::Serialize) => "BeanSubtypeSerializer",
            (SubtypeKind::Default, Direction::Serialize) => "DefaultSubtypeSerializer",
            (SubtypeKind::Bean, Direction::Deserialize) => "BeanSubtypeDeserializer",
            (SubtypeKind::Default, Direction::Deserialize) => "DefaultSubtypeDeserializer",
        };
        w.blank();
        w.open(format!("map.put({}.class, new {holder}.{kind}() {{", binding.subtype));
        w.returning(
            &format!("protected {} {factory}()", codec_interface(direction)),
            &codec_expression(&binding.codec),
        );
        w.close("});");
    }
    w.blank();
    w.line("return map;");
    w.close("}");
}

fn write_name_set(w: &mut SourceWriter, method: &str, names: &[String]) {
    if names.is_empty() {
        return;
    }
    w.blank();
    w.line("@Override");
    w.open(format!("protected java.util.Set<String> {method}() {{"));
    w.line(format!(
        "java.util.Set<String> col = new java.util.HashSet<String>({});",
        names.len()
    ));
    for name in names {
        w.line(format!("col.add({});", string_literal(name)));
    }
    w.line("return col;");
    w.close("}");
}

/// Type the per-property parameters describe: the first bean codec, else the property type.
fn annotated_type<'a>(codec: &'a CodecDescriptor, ty: &'a TypeRef) -> &'a TypeRef {
    codec.first_bean_mapper().map(|c| &c.ty).unwrap_or(ty)
}

// ============================================================================
// Serializer
// ============================================================================

fn render_serializer(plan: &SerializerPlan) -> String {
    let mut w = SourceWriter::default();
    let bean = boxed_type(&plan.bean);
    let base = match plan.base {
        SerializerBase::Bean => "AbstractBeanJsonSerializer",
        SerializerBase::ValueBean => "AbstractValueBeanJsonSerializer",
    };

    write_package(&mut w, &plan.name);
    w.open(format!(
        "public class {}{} extends {SER_BEAN}.{base}<{bean}> {{",
        plan.name.simple_name,
        type_parameter_declarations(&plan.type_params)
    ));
    write_type_parameter_codecs(&mut w, &plan.name.simple_name, &plan.type_params, Direction::Serialize);
    if !plan.type_params.is_empty() {
        w.blank();
    }
    w.returning("public Class getSerializedType()", &class_literal(&plan.bean));

    if let Some(value) = &plan.value {
        w.blank();
        w.line("@Override");
        w.open(format!(
            "protected {SER_BEAN}.BeanPropertySerializer initValueSerializer() {{"
        ));
        write_property_serializer(&mut w, "return ", &bean, value);
        w.close("}");
    }

    if !plan.properties.is_empty() {
        let array = format!("{SER_BEAN}.BeanPropertySerializer");
        w.blank();
        w.line("@Override");
        w.open(format!("protected {array}[] initSerializers() {{"));
        w.line(format!(
            "{array}[] result = new {array}[{}];",
            plan.properties.len()
        ));
        for (i, property) in plan.properties.iter().enumerate() {
            w.blank();
            write_property_serializer(&mut w, &format!("result[{i}] = "), &bean, property);
        }
        w.blank();
        w.line("return result;");
        w.close("}");
    }

    if let Some(any_getter) = &plan.any_getter {
        let value = boxed_type(&any_getter.ty);
        w.blank();
        w.line("@Override");
        w.open(format!(
            "protected {SER_BEAN}.AnyGetterPropertySerializer<{bean}> initAnyGetterPropertySerializer() {{"
        ));
        w.open(format!(
            "return new {SER_BEAN}.AnyGetterPropertySerializer<{bean}>() {{"
        ));
        w.returning(
            &format!("protected {MAP_SERIALIZER} newSerializer()"),
            &format!("({MAP_SERIALIZER}) {}", codec_expression(&any_getter.codec)),
        );
        w.blank();
        w.returning(
            &format!("public {value} getValue({bean} bean, {SERIALIZATION_CONTEXT} ctx)"),
            &getter_call(&any_getter.accessor),
        );
        write_getter_bridge(&mut w, &any_getter.accessor, &bean, &value);
        w.close("};");
        w.close("}");
    }

    if let Some(identity) = &plan.identity {
        w.blank();
        w.line("@Override");
        w.open(format!(
            "protected {} initIdentityInfo() {{",
            identity_info_interface(Direction::Serialize)
        ));
        write_identity_info(&mut w, "return ", identity, &bean, Direction::Serialize);
        w.close("}");
    }

    if let Some(type_info) = &plan.type_info {
        write_type_info(&mut w, type_info, &plan.bean, Direction::Serialize);
    }

    write_subtypes(&mut w, &plan.subtypes, Direction::Serialize);
    w.close("}");
    w.finish()
}

fn write_property_serializer(
    w: &mut SourceWriter,
    prefix: &str,
    bean: &str,
    property: &SerializerProperty,
) {
    let value = boxed_type(&property.ty);
    w.open(format!(
        "{prefix}new {SER_BEAN}.BeanPropertySerializer<{bean}, {value}>(\"{}\") {{",
        property.escaped_name
    ));
    w.returning(
        &format!("protected {JSON_SERIALIZER}<?> newSerializer()"),
        &codec_expression(&property.codec),
    );

    if let Some(parameters) = &property.parameters {
        w.blank();
        let annotated = annotated_type(&property.codec, &property.ty);
        write_parameters_methods(w, parameters, annotated, Direction::Serialize, "");
    }

    if let Some(emission) = property.name_emission {
        w.blank();
        w.line("@Override");
        w.open(format!(
            "public void serializePropertyName({JSON_WRITER} writer, {bean} bean, {SERIALIZATION_CONTEXT} ctx) {{"
        ));
        match emission {
            NameEmission::Escaped => w.line("writer.name(propertyName);"),
            NameEmission::Unwrapped => {}
        }
        w.close("}");
    }

    w.blank();
    w.returning(
        &format!("public {value} getValue({bean} bean, {SERIALIZATION_CONTEXT} ctx)"),
        &getter_call(&property.accessor),
    );
    write_getter_bridge(w, &property.accessor, bean, &value);
    w.close("};");
}

// ============================================================================
// Deserializer
// ============================================================================

fn render_deserializer(plan: &DeserializerPlan) -> String {
    let mut w = SourceWriter::default();
    let bean = boxed_type(&plan.bean);
    let base = match plan.base {
        DeserializerBase::Bean => "AbstractBeanJsonDeserializer",
        DeserializerBase::Object => "AbstractObjectBeanJsonDeserializer",
        DeserializerBase::Serializable => "AbstractSerializableBeanJsonDeserializer",
        DeserializerBase::Delegation => "AbstractDelegationBeanJsonDeserializer",
    };

    write_package(&mut w, &plan.name);
    w.open(format!(
        "public class {}{} extends {DESER_BEAN}.{base}<{bean}> {{",
        plan.name.simple_name,
        type_parameter_declarations(&plan.type_params)
    ));
    write_type_parameter_codecs(&mut w, &plan.name.simple_name, &plan.type_params, Direction::Deserialize);
    if !plan.type_params.is_empty() {
        w.blank();
    }
    w.returning("public Class getDeserializedType()", &class_literal(&plan.bean));

    if plan.ignore_unknown {
        w.blank();
        w.returning("protected boolean isDefaultIgnoreUnknown()", "true");
    }

    if let Some(builder) = &plan.instance_builder {
        w.blank();
        write_instance_builder(&mut w, &plan.bean, builder);
    }

    if !plan.properties.is_empty() {
        let map_type = format!("{MAP_LIKE}<{DESER_BEAN}.BeanPropertyDeserializer<{bean}, ?>>");
        w.blank();
        w.line("@Override");
        w.open(format!("protected {map_type} initDeserializers() {{"));
        w.line(format!("{map_type} map = {STRING_MAP}.createObject().cast();"));
        for property in &plan.properties {
            w.blank();
            write_property_deserializer(&mut w, &bean, property);
        }
        w.blank();
        w.line("return map;");
        w.close("}");
    }

    if !plan.back_references.is_empty() {
        let map_type = format!("{MAP_LIKE}<{DESER_BEAN}.BackReferenceProperty<{bean}, ?>>");
        w.blank();
        w.line("@Override");
        w.open(format!("protected {map_type} initBackReferenceDeserializers() {{"));
        w.line(format!("{map_type} map = {STRING_MAP}.createObject().cast();"));
        for reference in &plan.back_references {
            w.blank();
            write_back_reference(&mut w, &bean, reference);
        }
        w.blank();
        w.line("return map;");
        w.close("}");
    }

    write_name_set(&mut w, "initIgnoredProperties", &plan.ignored_properties);
    write_name_set(&mut w, "initRequiredProperties", &plan.required_properties);

    if let Some(any_setter) = &plan.any_setter {
        let value = boxed_type(&any_setter.ty);
        w.blank();
        w.line("@Override");
        w.open(format!(
            "protected {DESER_BEAN}.AnySetterDeserializer<{bean}, ?> initAnySetterDeserializer() {{"
        ));
        w.open(format!(
            "return new {DESER_BEAN}.AnySetterDeserializer<{bean}, {value}>() {{"
        ));
        w.returning(
            &format!("protected {JSON_DESERIALIZER}<?> newDeserializer()"),
            &codec_expression(&any_setter.codec),
        );
        w.blank();
        w.line("@Override");
        w.open(format!(
            "public void setValue({bean} bean, String propertyName, {value} value, {DESERIALIZATION_CONTEXT} ctx) {{"
        ));
        w.line(setter_statement(&any_setter.accessor, &["propertyName", "value"]));
        w.close("}");
        write_setter_bridge(
            &mut w,
            &any_setter.accessor,
            &bean,
            &[("propertyName", "String".to_string()), ("value", value.clone())],
        );
        w.close("};");
        w.close("}");
    }

    if let Some(identity) = &plan.identity {
        w.blank();
        w.line("@Override");
        w.open(format!(
            "protected {} initIdentityInfo() {{",
            identity_info_interface(Direction::Deserialize)
        ));
        write_identity_info(&mut w, "return ", identity, &bean, Direction::Deserialize);
        w.close("}");
    }

    if let Some(type_info) = &plan.type_info {
        write_type_info(&mut w, type_info, &plan.bean, Direction::Deserialize);
    }

    write_subtypes(&mut w, &plan.subtypes, Direction::Deserialize);
    w.close("}");
    w.finish()
}

fn write_property_deserializer(w: &mut SourceWriter, bean: &str, property: &DeserializerProperty) {
    let value = boxed_type(&property.ty);
    w.open(format!(
        "map.put(\"{}\", new {DESER_BEAN}.BeanPropertyDeserializer<{bean}, {value}>() {{",
        property.escaped_name
    ));
    w.returning(
        &format!("protected {JSON_DESERIALIZER}<?> newDeserializer()"),
        &codec_expression(&property.codec),
    );

    if let Some(parameters) = &property.parameters {
        w.blank();
        let annotated = annotated_type(&property.codec, &property.ty);
        write_parameters_methods(w, parameters, annotated, Direction::Deserialize, "");
    }

    w.blank();
    w.line("@Override");
    w.open(format!(
        "public void setValue({bean} bean, {value} value, {DESERIALIZATION_CONTEXT} ctx) {{"
    ));
    w.line(setter_statement(&property.accessor, &["value"]));
    if let Some(reference) = &property.managed_reference {
        w.line(format!(
            "getDeserializer().setBackReference({}, bean, value, ctx);",
            string_literal(reference)
        ));
    }
    w.close("}");
    write_setter_bridge(w, &property.accessor, bean, &[("value", value.clone())]);
    w.close("});");
}

fn write_back_reference(w: &mut SourceWriter, bean: &str, reference: &BackReferenceBinding) {
    let value = boxed_type(&reference.ty);
    w.open(format!(
        "map.put({}, new {DESER_BEAN}.BackReferenceProperty<{bean}, {value}>() {{",
        string_literal(&reference.reference)
    ));
    w.line("@Override");
    w.open(format!(
        "public void setBackReference({bean} bean, {value} reference, {DESERIALIZATION_CONTEXT} ctx) {{"
    ));
    w.line(setter_statement(&reference.accessor, &["reference"]));
    w.close("}");
    write_setter_bridge(w, &reference.accessor, bean, &[("reference", value.clone())]);
    w.close("});");
}

fn argument_variable(index: usize) -> String {
    format!("property_{index}")
}

/// Decoding call for a creator argument read from `reader`.
fn argument_read(argument: &CreatorArgument, index: usize, reader: &str) -> String {
    let codec = codec_expression(&argument.codec);
    match &argument.parameters {
        Some(_) => format!("{codec}.deserialize({reader}, ctx, newParameters{index}())"),
        None => format!("{codec}.deserialize({reader}, ctx)"),
    }
}

fn write_instance_builder(w: &mut SourceWriter, bean_type: &TypeRef, builder: &InstanceBuilderPlan) {
    let bean = boxed_type(bean_type);
    let instance = format!("{DESER_BEAN}.Instance<{bean}>");
    w.line("@Override");
    w.open(format!(
        "protected {DESER_BEAN}.InstanceBuilder<{bean}> initInstanceBuilder() {{"
    ));
    w.open(format!("return new {DESER_BEAN}.InstanceBuilder<{bean}>() {{"));
    w.line("@Override");
    w.open(format!(
        "public {instance} newInstance({JSON_READER} reader, {DESERIALIZATION_CONTEXT} ctx, \
         {DESERIALIZER_PARAMETERS} params, java.util.Map<String, String> bufferedProperties, \
         java.util.Map<String, Object> bufferedPropertiesValues) {{"
    ));

    let arguments: Vec<&CreatorArgument> = match builder {
        InstanceBuilderPlan::Default { .. } => {
            w.line(format!("return new {instance}(create(), bufferedProperties);"));
            Vec::new()
        }
        InstanceBuilderPlan::Delegating { delegate, .. } => {
            w.line(format!(
                "return new {instance}(create({}), bufferedProperties);",
                argument_read(delegate, 0, "reader")
            ));
            vec![delegate]
        }
        InstanceBuilderPlan::Parameterized { arguments, .. } => {
            write_parameterized_body(w, &instance, arguments);
            arguments.iter().collect()
        }
    };
    w.close("}");

    w.blank();
    write_creator(w, bean_type, builder.creator(), &arguments);

    for (i, argument) in arguments.iter().enumerate() {
        if let Some(parameters) = &argument.parameters {
            w.blank();
            let annotated = annotated_type(&argument.codec, &argument.ty);
            write_parameters_methods(w, parameters, annotated, Direction::Deserialize, &i.to_string());
        }
    }
    w.close("};");
    w.close("}");
}

fn write_parameterized_body(w: &mut SourceWriter, instance: &str, arguments: &[CreatorArgument]) {
    w.line(format!("int nbParamToFind = {};", arguments.len()));
    w.line(format!("boolean[] paramFound = new boolean[{}];", arguments.len()));
    w.line("java.util.Set<String> requiredProperties = new java.util.HashSet<String>();");
    for argument in arguments.iter().filter(|a| a.required) {
        w.line(format!("requiredProperties.add(\"{}\");", argument.escaped_name));
    }
    w.blank();
    for (i, argument) in arguments.iter().enumerate() {
        w.line(format!(
            "{} {} = {};",
            java_type(&argument.ty),
            argument_variable(i),
            argument.default_value
        ));
    }

    w.blank();
    w.open("if (null != bufferedProperties) {");
    w.line("String value;");
    for (i, argument) in arguments.iter().enumerate() {
        w.blank();
        w.line(format!("value = bufferedProperties.remove(\"{}\");", argument.escaped_name));
        w.open("if (null != value) {");
        w.line(format!(
            "{} = {};",
            argument_variable(i),
            argument_read(argument, i, "ctx.newJsonReader(value)")
        ));
        w.line(format!("paramFound[{i}] = true;"));
        w.line("nbParamToFind--;");
        w.line(format!("requiredProperties.remove(\"{}\");", argument.escaped_name));
        w.close("}");
    }
    w.close("}");

    w.blank();
    w.line("String name;");
    w.open(format!(
        "while (nbParamToFind > 0 && {JSON_TOKEN}.NAME == reader.peek()) {{"
    ));
    w.line("name = reader.nextName();");
    for (i, argument) in arguments.iter().enumerate() {
        w.blank();
        w.open(format!("if (\"{}\".equals(name)) {{", argument.escaped_name));
        w.line(format!("{} = {};", argument_variable(i), argument_read(argument, i, "reader")));
        w.open(format!("if (!paramFound[{i}]) {{"));
        w.line(format!("paramFound[{i}] = true;"));
        w.line("nbParamToFind--;");
        w.close("}");
        w.line(format!("requiredProperties.remove(\"{}\");", argument.escaped_name));
        w.line("continue;");
        w.close("}");
    }
    w.blank();
    w.open("if (null == bufferedProperties) {");
    w.line("bufferedProperties = new java.util.HashMap<String, String>();");
    w.close("}");
    w.line("bufferedProperties.put(name, reader.nextValue());");
    w.close("}");

    w.blank();
    w.open("if (!requiredProperties.isEmpty()) {");
    w.line(
        "throw ctx.traceError(\"Required properties are missing : \" + requiredProperties, reader);",
    );
    w.close("}");
    w.blank();
    let variables: Vec<String> = (0..arguments.len()).map(argument_variable).collect();
    w.line(format!(
        "return new {instance}(create({}), bufferedProperties);",
        variables.join(", ")
    ));
}

fn write_creator(
    w: &mut SourceWriter,
    bean_type: &TypeRef,
    creator: &CreatorCall,
    arguments: &[&CreatorArgument],
) {
    let bean = boxed_type(bean_type);
    let raw = raw_type(bean_type);
    let signature: Vec<String> = arguments
        .iter()
        .enumerate()
        .map(|(i, a)| format!("{} {}", java_type(&a.ty), argument_variable(i)))
        .collect();
    let variables: Vec<String> = (0..arguments.len()).map(argument_variable).collect();
    let signature = signature.join(", ");
    let variables = variables.join(", ");

    if creator.bridged {
        w.open(format!("private native {bean} create({signature}) /*-{{"));
        match &creator.kind {
            CreatorKind::Constructor => w.line(format!("return @{raw}::new(*)({variables});")),
            CreatorKind::Factory(method) => {
                w.line(format!("return @{raw}::{method}(*)({variables});"))
            }
        }
        w.close("}-*/;");
    } else {
        w.open(format!("private {bean} create({signature}) {{"));
        match &creator.kind {
            CreatorKind::Constructor => w.line(format!("return new {bean}({variables});")),
            CreatorKind::Factory(method) => w.line(format!("return {raw}.{method}({variables});")),
        }
        w.close("}");
    }
}

// ============================================================================
// Mapper
// ============================================================================

fn render_mapper(plan: &MapperPlan) -> String {
    let mut w = SourceWriter::default();
    let mapped = boxed_type(&plan.mapped_type);

    write_package(&mut w, &plan.name);
    w.open(format!(
        "public class {} extends {}<{mapped}> implements {} {{",
        plan.name.simple_name,
        plan.kind.base_class(),
        plan.interface
    ));
    w.blank();
    w.open(format!("public {}() {{", plan.name.simple_name));
    w.line(format!("super({});", string_literal(&plan.root_name)));
    w.close("}");

    if let Some(deserializer) = &plan.deserializer {
        w.blank();
        w.returning(
            &format!("protected {JSON_DESERIALIZER}<{mapped}> newDeserializer()"),
            &codec_expression(deserializer),
        );
    }
    if let Some(serializer) = &plan.serializer {
        w.blank();
        w.returning(
            &format!("protected {JSON_SERIALIZER}<?> newSerializer()"),
            &codec_expression(serializer),
        );
    }
    w.close("}");
    w.finish()
}

#[cfg(test)]
#[path = "java/java_tests.rs"]
mod java_tests;
