use yson_core::{Array, Number, Object, Value, ValueKind, NULL};

fn object(pairs: &[(&str, Value)]) -> Object {
    pairs.iter().cloned().collect()
}

// ============================================================================
// Construction and kinds
// ============================================================================

#[test]
fn default_value_is_null() {
    assert_eq!(Value::default(), Value::Null);
    assert!(Value::default().is_null());
}

#[test]
fn kinds_match_variants() {
    assert_eq!(Value::Null.kind(), ValueKind::Null);
    assert_eq!(Value::from(true).kind(), ValueKind::Bool);
    assert_eq!(Value::from(1).kind(), ValueKind::Number);
    assert_eq!(Value::from("a").kind(), ValueKind::String);
    assert_eq!(Value::blob(vec![1u8]).kind(), ValueKind::Blob);
    assert_eq!(Value::from(Array::new()).kind(), ValueKind::Array);
    assert_eq!(Value::from(Object::new()).kind(), ValueKind::Object);
    assert_eq!(ValueKind::Object.to_string(), "object");
}

#[test]
fn integers_have_no_fraction() {
    let n = Number::from(42u8);
    assert!(!n.has_fraction());
    assert_eq!(n.as_i64(), 42);
}

#[test]
fn float_fraction_follows_value() {
    assert!(Number::from_f64(1.5).unwrap().has_fraction());
    assert!(!Number::from_f64(2.0).unwrap().has_fraction());
}

#[test]
fn non_finite_floats_are_not_numbers() {
    assert!(Number::from_f64(f64::NAN).is_none());
    assert!(Number::from_f64(f64::INFINITY).is_none());
    assert_eq!(Value::from(f64::NEG_INFINITY), Value::Null);
}

#[test]
fn option_converts_to_null() {
    assert_eq!(Value::from(None::<i32>), Value::Null);
    assert_eq!(Value::from(Some("x")), Value::from("x"));
}

#[test]
fn vec_converts_to_array() {
    let v = Value::from(vec![1, 2, 3]);
    let array = v.as_array().unwrap();
    assert_eq!(array.len(), 3);
    assert_eq!(array.get_i64(2), Some(3));
}

// ============================================================================
// Equality
// ============================================================================

#[test]
fn number_equality_ignores_fraction_flag() {
    let whole = Number::with_fraction(1.0, false).unwrap();
    let float = Number::with_fraction(1.0, true).unwrap();
    assert_eq!(whole, float);
    assert_eq!(Value::Number(whole), Value::Number(float));
}

#[test]
fn null_equals_only_null() {
    assert_eq!(Value::Null, NULL);
    assert_ne!(Value::Null, Value::from(false));
    assert_ne!(Value::Null, Value::from(0));
    assert_ne!(Value::Null, Value::from(""));
}

#[test]
fn bool_equality_compares_payload() {
    assert_eq!(Value::from(true), Value::from(true));
    assert_ne!(Value::from(true), Value::from(false));
}

#[test]
fn deep_equality_ignores_insertion_order() {
    let a = object(&[("x", Value::from(1)), ("y", Value::from("two"))]);
    let b = object(&[("y", Value::from("two")), ("x", Value::from(1))]);
    assert_eq!(Value::from(a), Value::from(b));
}

#[test]
fn arrays_compare_in_order() {
    let a: Array = vec![1, 2].into_iter().collect();
    let b: Array = vec![2, 1].into_iter().collect();
    assert_ne!(a, b);
}

// ============================================================================
// Object access
// ============================================================================

#[test]
fn object_missing_key_reads_as_null() {
    let obj = Object::new();
    assert!(obj.get("nope").is_null());
    assert!(!obj.has("nope"));
}

#[test]
fn object_set_replaces_and_returns_previous() {
    let mut obj = Object::new();
    assert_eq!(obj.set("k", 1), None);
    assert_eq!(obj.set("k", 2), Some(Value::from(1)));
    assert_eq!(obj.get_i64("k"), Some(2));
    assert_eq!(obj.len(), 1);
}

#[test]
fn object_has_sees_explicit_null() {
    let mut obj = Object::new();
    obj.set("present", Value::Null);
    assert!(obj.has("present"));
    assert!(obj.get("present").is_null());
}

#[test]
fn object_remove() {
    let mut obj = object(&[("a", Value::from(1))]);
    assert_eq!(obj.remove("a"), Some(Value::from(1)));
    assert!(obj.is_empty());
}

#[test]
fn object_typed_getters() {
    let obj = object(&[
        ("s", Value::from("text")),
        ("i", Value::from(-3)),
        ("f", Value::from(2.5)),
        ("b", Value::from(true)),
        ("one", Value::from(1)),
        ("nested", Value::from(Object::new())),
        ("list", Value::from(Array::new())),
    ]);
    assert_eq!(obj.get_str("s"), Some("text"));
    assert_eq!(obj.get_i64("i"), Some(-3));
    assert_eq!(obj.get_f64("f"), Some(2.5));
    assert_eq!(obj.get_bool("b"), Some(true));
    assert_eq!(obj.get_bool("one"), Some(true));
    assert!(obj.get_object("nested").is_some());
    assert!(obj.get_array("list").is_some());
    // Kind mismatches are None.
    assert_eq!(obj.get_str("i"), None);
    assert_eq!(obj.get_i64("s"), None);
}

#[test]
fn as_i64_truncates_toward_zero() {
    assert_eq!(Value::from(2.9).as_i64(), Some(2));
    assert_eq!(Value::from(-2.9).as_i64(), Some(-2));
    assert_eq!(Value::from(1e30).as_i64(), Some(i64::MAX));
}

#[test]
fn nested_mutation_through_get_mut() {
    let mut root = object(&[("inner", Value::from(Object::new()))]);
    root.get_mut("inner")
        .and_then(Value::as_object_mut)
        .unwrap()
        .set("x", 5);
    assert_eq!(
        root.get_object("inner").and_then(|o| o.get_i64("x")),
        Some(5)
    );
}

// ============================================================================
// Array access
// ============================================================================

#[test]
fn array_out_of_bounds_reads_as_null() {
    let array = Array::new();
    assert!(array.get(7).is_null());
}

#[test]
fn array_set_replaces_appends_or_ignores() {
    let mut array = Array::new();
    array.set(0, "a");
    array.set(0, "b");
    array.set(1, "c");
    array.set(10, "ignored");
    assert_eq!(array.len(), 2);
    assert_eq!(array.get_str(0), Some("b"));
    assert_eq!(array.get_str(1), Some("c"));
}

#[test]
fn array_insert_and_remove() {
    let mut array: Array = vec![1, 3].into_iter().collect();
    array.insert(1, 2);
    array.insert(99, 4);
    assert_eq!(Vec::from(array.clone()), vec![Value::from(1), Value::from(2), Value::from(3), Value::from(4)]);
    assert_eq!(array.remove(0), Some(Value::from(1)));
    assert_eq!(array.remove(10), None);
    assert_eq!(array.len(), 3);
}

#[test]
fn array_preserves_insertion_order() {
    let mut array = Array::new();
    for i in 0..5 {
        array.append(i);
    }
    let collected: Vec<i64> = array.iter().filter_map(Value::as_i64).collect();
    assert_eq!(collected, vec![0, 1, 2, 3, 4]);
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn serialize_scalars() {
    assert_eq!(Value::Null.to_json(), "null");
    assert_eq!(Value::from(true).to_json(), "true");
    assert_eq!(Value::from(false).to_json(), "false");
    assert_eq!(Value::from(42).to_json(), "42");
    assert_eq!(Value::from(-7).to_json(), "-7");
    assert_eq!(Value::from(3.25).to_json(), "3.25");
    assert_eq!(Value::from("hi").to_json(), r#""hi""#);
}

#[test]
fn serialize_keeps_float_intent() {
    let float_one = Value::Number(Number::with_fraction(1.0, true).unwrap());
    assert_eq!(float_one.to_json(), "1.0");
    let int_one = Value::Number(Number::with_fraction(1.0, false).unwrap());
    assert_eq!(int_one.to_json(), "1");
}

#[test]
fn serialize_escapes_quotes_and_backslashes() {
    let v = Value::from(r#"say "hi" \ bye"#);
    assert_eq!(v.to_json(), r#""say \"hi\" \\ bye""#);
}

#[test]
fn serialize_escapes_control_characters() {
    let v = Value::from("a\nb\tc\u{1}");
    assert_eq!(v.to_json(), r#""a\nb\tc\u0001""#);
}

#[test]
fn serialize_blob_as_base64() {
    let v = Value::blob(b"hello".to_vec());
    assert_eq!(v.to_json(), r#""aGVsbG8=""#);
}

#[test]
fn serialize_containers_compact() {
    let array: Array = vec![Value::from(1), Value::Null, Value::from("x")]
        .into_iter()
        .collect();
    assert_eq!(Value::from(array).to_json(), r#"[1,null,"x"]"#);
    let obj = object(&[("k", Value::from(Array::new()))]);
    assert_eq!(Value::from(obj).to_json(), r#"{"k":[]}"#);
}

#[test]
fn display_matches_to_json() {
    let v = Value::from(vec!["a", "b"]);
    assert_eq!(v.to_string(), v.to_json());
    assert_eq!(yson_core::serialize(&v), v.to_json());
}

#[test]
fn serialize_is_idempotent() {
    let v: Value = r#"{"a":[1,2.5,{"b":null}],"c":"d"}"#.parse().unwrap();
    assert_eq!(v.to_json(), v.to_json());
}

// ============================================================================
// serde_json interop
// ============================================================================

#[test]
fn converts_from_serde_json() {
    let json = serde_json::json!({"a": [1, 2.5, null], "b": {"c": true}});
    let value = Value::from(json);
    let obj = value.as_object().unwrap();
    let a = obj.get_array("a").unwrap();
    assert_eq!(a.get_i64(0), Some(1));
    assert!(a.get(1).as_number().unwrap().has_fraction());
    assert!(a.get(2).is_null());
    assert_eq!(obj.get_object("b").unwrap().get_bool("c"), Some(true));
}

#[test]
fn converts_to_serde_json() {
    let value: Value = r#"{"n":1,"f":1.5,"s":"x","l":[true]}"#.parse().unwrap();
    let json = serde_json::Value::from(value);
    assert_eq!(json, serde_json::json!({"n": 1, "f": 1.5, "s": "x", "l": [true]}));
}

#[test]
fn blob_becomes_base64_string_in_serde_json() {
    let json = serde_json::Value::from(Value::blob(vec![0xff, 0x00]));
    assert_eq!(json, serde_json::json!("/wA="));
}

#[test]
fn value_serializes_through_serde_json() {
    let value: Value = r#"{"list":[1,2,3],"name":"n"}"#.parse().unwrap();
    let text = serde_json::to_string(&value).unwrap();
    let back: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(back, value);
}
