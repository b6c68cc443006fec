//! Structural key shape tests

use deepkey::prelude::*;
use deepkey::{ArrayKind, KeyEnum, KeyNode, Primitive, PrimitiveKind, TypeName};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, KeyEnum)]
enum TimeUnit {
    Days,
}

const HELPER: &str = "app::MethodInvocationHelper";

fn signature() -> MethodSignature {
    MethodSignature::new(HELPER, "testMethod1").param_of::<Value>()
}

fn prefix() -> Vec<KeyNode> {
    vec![
        KeyNode::Type(TypeName::from(HELPER)),
        KeyNode::text("testMethod1"),
        KeyNode::List(vec![KeyNode::Type(TypeName::of::<Value>())]),
    ]
}

fn prim(value: impl Into<Primitive>) -> KeyNode {
    KeyNode::Primitive(value.into())
}

fn array(kind: PrimitiveKind, items: Vec<KeyNode>) -> KeyNode {
    KeyNode::Array(ArrayKind::Primitive(kind), items)
}

fn structural() -> StructuralKeyGenerator {
    StructuralKeyGenerator::new()
}

#[test]
fn test_no_arguments() {
    let key = structural()
        .generate_key(&Invocation::for_method(signature()))
        .unwrap();
    assert_eq!(key.nodes(), prefix().as_slice());

    let bare = StructuralKeyGenerator::with_config(KeyGeneratorConfig::arguments_only())
        .generate_key(&Invocation::new())
        .unwrap();
    assert!(bare.is_empty());
    assert_eq!(bare.hash_code(), 1);
}

#[test]
fn test_enum_key() {
    let key = StructuralKeyGenerator::with_config(KeyGeneratorConfig::arguments_only())
        .generate_key(&Invocation::new().arg(&TimeUnit::Days))
        .unwrap();
    assert_eq!(
        key.nodes(),
        &[KeyNode::Enum(deepkey::EnumValue::new(
            "structural_key_tests::TimeUnit",
            "Days"
        ))]
    );
}

#[test]
fn test_primitive_handling() {
    let key = structural()
        .generate_key(
            &Invocation::for_method(signature()).value(Value::list([
                Value::from(1i8),
                Value::from(2i16),
                Value::from(3i32),
                Value::from(4i64),
                Value::from('a'),
                Value::from(6.8f32),
                Value::from(7.9f64),
                Value::from(true),
            ])),
        )
        .unwrap();

    let mut expected = prefix();
    expected.push(KeyNode::List(vec![
        prim(1i8),
        prim(2i16),
        prim(3i32),
        prim(4i64),
        prim('a'),
        prim(6.8f32),
        prim(7.9f64),
        prim(true),
    ]));
    assert_eq!(key.nodes(), expected.as_slice());
}

#[test]
fn test_primitive_array_handling() {
    let empty_i8: [i8; 0] = [];
    let empty_i16: [i16; 0] = [];
    let empty_i32: [i32; 0] = [];
    let empty_i64: [i64; 0] = [];
    let empty_char: [char; 0] = [];
    let empty_f32: [f32; 0] = [];
    let empty_f64: [f64; 0] = [];
    let empty_bool: [bool; 0] = [];

    let arrays = vec![
        empty_i8.to_value(),
        empty_i16.to_value(),
        empty_i32.to_value(),
        empty_i64.to_value(),
        empty_char.to_value(),
        empty_f32.to_value(),
        empty_f64.to_value(),
        empty_bool.to_value(),
        [1i8, 2, 3].to_value(),
        [7i32, 8, 9].to_value(),
        ['a', 'b', 'c'].to_value(),
        [16.1f32, 17.2, 18.3].to_value(),
        [true, false, false].to_value(),
    ];
    let key = structural()
        .generate_key(&Invocation::for_method(signature()).value(Value::list(arrays)))
        .unwrap();

    let mut expected = prefix();
    expected.push(KeyNode::List(vec![
        array(PrimitiveKind::I8, vec![]),
        array(PrimitiveKind::I16, vec![]),
        array(PrimitiveKind::I32, vec![]),
        array(PrimitiveKind::I64, vec![]),
        array(PrimitiveKind::Char, vec![]),
        array(PrimitiveKind::F32, vec![]),
        array(PrimitiveKind::F64, vec![]),
        array(PrimitiveKind::Bool, vec![]),
        array(PrimitiveKind::I8, vec![prim(1i8), prim(2i8), prim(3i8)]),
        array(PrimitiveKind::I32, vec![prim(7), prim(8), prim(9)]),
        array(PrimitiveKind::Char, vec![prim('a'), prim('b'), prim('c')]),
        array(
            PrimitiveKind::F32,
            vec![prim(16.1f32), prim(17.2f32), prim(18.3f32)],
        ),
        array(PrimitiveKind::Bool, vec![prim(true), prim(false), prim(false)]),
    ]));
    assert_eq!(key.nodes(), expected.as_slice());

    let KeyNode::List(items) = &key.nodes()[3] else {
        panic!("expected the argument list");
    };
    let empties = &items[..8];
    for (i, a) in empties.iter().enumerate() {
        for b in &empties[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn test_collection_handling() {
    let words: BTreeSet<&str> = ["bar", "bop", "foo"].into_iter().collect();
    let mapping = Value::map([
        (Value::text("A"), Value::from(123)),
        (Value::text("B"), Value::list(["hello", "world"])),
    ]);
    let key = structural()
        .generate_key(
            &Invocation::for_method(signature()).value(Value::list([words.to_value(), mapping])),
        )
        .unwrap();

    let mut expected = prefix();
    expected.push(KeyNode::List(vec![
        KeyNode::Set(vec![
            KeyNode::text("bar"),
            KeyNode::text("bop"),
            KeyNode::text("foo"),
        ]),
        KeyNode::Map(vec![
            (KeyNode::text("A"), prim(123)),
            (
                KeyNode::text("B"),
                KeyNode::List(vec![KeyNode::text("hello"), KeyNode::text("world")]),
            ),
        ]),
    ]));
    assert_eq!(key.nodes(), expected.as_slice());
}

#[test]
fn test_keys_work_as_map_keys() {
    let generator = StructuralKeyGenerator::with_config(KeyGeneratorConfig::arguments_only());
    let mut cache: HashMap<StructuralKey, &str> = HashMap::new();

    let first = generator
        .generate_key(&Invocation::new().arg("user").arg(&42))
        .unwrap();
    cache.insert(first, "cached");

    let again = generator
        .generate_key(&Invocation::new().arg("user").arg(&42))
        .unwrap();
    assert_eq!(cache.get(&again), Some(&"cached"));

    let other = generator
        .generate_key(&Invocation::new().arg("user").arg(&43))
        .unwrap();
    assert_eq!(cache.get(&other), None);
}

#[test]
fn test_list_and_set_of_same_items_differ_structurally() {
    let generator = StructuralKeyGenerator::with_config(KeyGeneratorConfig::arguments_only());
    let list = generator.key_for(&[Value::list([1, 2])]).unwrap();
    let set = generator.key_for(&[Value::set([1, 2])]).unwrap();
    assert_ne!(list, set);
    assert_eq!(list.hash_code(), set.hash_code());
}
