use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use yson_core::{
    from_str, parse_value, to_string, BlobStrategy, Bridge, DateStrategy, NonFiniteFloatStrategy,
    Value,
};

/// Assert that encode → decode through `bridge` yields an equal value, and
/// that the same holds after a detour through JSON text.
fn assert_roundtrip_with<T>(bridge: &Bridge, original: &T)
where
    T: Serialize + DeserializeOwned + PartialEq + Debug,
{
    let tree = bridge.encode(original).expect("encode failed");
    let back: T = bridge.decode(&tree).expect("decode failed");
    assert_eq!(&back, original, "tree round trip failed, tree: {tree}");

    let text = tree.to_json();
    let reparsed = parse_value(&text).expect("serialized text must parse");
    let back: T = bridge.decode(&reparsed).expect("decode after reparse failed");
    assert_eq!(&back, original, "text round trip failed, text: {text}");
}

fn assert_roundtrip<T>(original: &T)
where
    T: Serialize + DeserializeOwned + PartialEq + Debug,
{
    assert_roundtrip_with(&Bridge::new(), original);
}

// ============================================================================
// Primitives
// ============================================================================

#[test]
fn roundtrip_scalars() {
    assert_roundtrip(&true);
    assert_roundtrip(&0u8);
    assert_roundtrip(&-12i32);
    assert_roundtrip(&u32::MAX);
    assert_roundtrip(&i64::MIN);
    assert_roundtrip(&1.5f64);
    assert_roundtrip(&-0.25f32);
    assert_roundtrip(&'λ');
    assert_roundtrip(&String::from("line\nbreak \"quoted\""));
    assert_roundtrip(&());
}

#[test]
fn roundtrip_whole_float() {
    assert_roundtrip(&2.0f64);
    // Whole floats print without a fraction and still decode as floats.
    assert_eq!(to_string(&2.0f64).unwrap(), "2");
    assert_eq!(from_str::<f64>("2").unwrap(), 2.0);
}

#[test]
fn roundtrip_options() {
    assert_roundtrip(&Some(3u16));
    assert_roundtrip(&None::<u16>);
    assert_roundtrip(&vec![Some("a".to_string()), None]);
}

// ============================================================================
// Composite types
// ============================================================================

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Order {
    id: u64,
    customer: String,
    lines: Vec<Line>,
    notes: Option<String>,
    metadata: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Line {
    sku: String,
    quantity: u32,
    unit_price: f64,
}

fn sample_order() -> Order {
    Order {
        id: 1001,
        customer: "Grace".into(),
        lines: vec![
            Line {
                sku: "A-1".into(),
                quantity: 2,
                unit_price: 9.5,
            },
            Line {
                sku: "B-7".into(),
                quantity: 1,
                unit_price: 20.25,
            },
        ],
        notes: None,
        metadata: [("channel".to_string(), "web".to_string())].into(),
    }
}

#[test]
fn roundtrip_nested_struct() {
    assert_roundtrip(&sample_order());
}

#[test]
fn roundtrip_tuples_and_tuple_structs() {
    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Rgb(u8, u8, u8);
    assert_roundtrip(&(1u8, "two".to_string(), 3.5f64));
    assert_roundtrip(&Rgb(255, 128, 0));
}

#[test]
fn roundtrip_newtype_and_unit_structs() {
    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Meters(f64);
    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Nothing;
    assert_roundtrip(&Meters(3.25));
    assert_roundtrip(&Nothing);
}

#[test]
fn roundtrip_maps_with_integer_keys() {
    let mut map = HashMap::new();
    map.insert(1u32, "one".to_string());
    map.insert(20u32, "twenty".to_string());
    assert_roundtrip(&map);

    let flags: BTreeMap<bool, u8> = [(true, 1), (false, 0)].into();
    assert_roundtrip(&flags);
}

#[test]
fn roundtrip_enums() {
    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    enum Command {
        Stop,
        Move { x: i32, y: i32 },
        Say(String),
        Pair(u8, u8),
    }
    assert_roundtrip(&vec![
        Command::Stop,
        Command::Move { x: -1, y: 2 },
        Command::Say("hi".into()),
        Command::Pair(1, 2),
    ]);
}

#[test]
fn roundtrip_internally_tagged_enum() {
    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    #[serde(tag = "type", rename_all = "snake_case")]
    enum Message {
        Ping,
        Text { body: String },
    }
    assert_roundtrip(&Message::Ping);
    assert_roundtrip(&Message::Text { body: "b".into() });
}

#[test]
fn roundtrip_renamed_and_skipped_fields() {
    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Profile {
        display_name: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        avatar_url: Option<String>,
    }
    let profile = Profile {
        display_name: "d".into(),
        avatar_url: None,
    };
    let tree = yson_core::to_value(&profile).unwrap();
    assert!(tree.as_object().unwrap().has("displayName"));
    assert!(!tree.as_object().unwrap().has("avatarUrl"));
    assert_roundtrip(&profile);
}

// ============================================================================
// Strategies and special types
// ============================================================================

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Stamped {
    #[serde(with = "yson_core::date")]
    at: DateTime<Utc>,
}

#[test]
fn roundtrip_dates_under_every_strategy() {
    let stamped = Stamped {
        at: Utc.with_ymd_and_hms(2023, 11, 5, 8, 30, 15).unwrap(),
    };
    let strategies = [
        DateStrategy::MillisecondsSince1970,
        DateStrategy::SecondsSince1970,
        DateStrategy::Formatted("%Y-%m-%dT%H:%M:%S%z".into()),
        DateStrategy::DeferredToDate,
        DateStrategy::custom(
            |date| Ok(Some(Value::from(date.timestamp()))),
            |value| {
                value
                    .as_i64()
                    .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
                    .ok_or_else(|| yson_core::CodingError::new(yson_core::ErrorKind::MissingValue))
            },
        ),
    ];
    for strategy in strategies {
        let bridge = Bridge::new().date_strategy(strategy);
        assert_roundtrip_with(&bridge, &stamped);
    }
}

#[test]
fn roundtrip_millisecond_precision() {
    let stamped = Stamped {
        at: Utc.timestamp_millis_opt(1_700_000_000_123).unwrap(),
    };
    assert_roundtrip(&stamped);
}

#[test]
fn roundtrip_non_finite_floats_as_strings() {
    let bridge = Bridge::new().non_finite_float_strategy(NonFiniteFloatStrategy::convert_to_string(
        "+inf", "-inf", "nan",
    ));
    let values = vec![f64::INFINITY, f64::NEG_INFINITY, 0.5];
    assert_roundtrip_with(&bridge, &values);

    let tree = bridge.encode(&f64::NAN).unwrap();
    assert_eq!(tree, Value::from("nan"));
    assert!(bridge.decode::<f64>(&tree).unwrap().is_nan());
}

#[test]
fn roundtrip_blobs_under_both_strategies() {
    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct File {
        name: String,
        #[serde(with = "yson_core::blob")]
        contents: Vec<u8>,
    }
    let file = File {
        name: "f.bin".into(),
        contents: (0u8..=255).collect(),
    };
    assert_roundtrip_with(&Bridge::new(), &file);
    assert_roundtrip_with(&Bridge::new().blob_strategy(BlobStrategy::Base64), &file);
}

#[test]
fn roundtrip_url_and_decimal() {
    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Invoice {
        link: url::Url,
        #[serde(with = "yson_core::decimal")]
        total: Decimal,
    }
    let invoice = Invoice {
        link: url::Url::parse("https://pay.example.com/i/42?x=1").unwrap(),
        total: Decimal::new(123_45, 2),
    };
    assert_roundtrip(&invoice);
}

#[test]
fn roundtrip_dynamic_value_field() {
    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Envelope {
        kind: String,
        payload: Value,
    }
    let envelope = Envelope {
        kind: "event".into(),
        payload: parse_value(r#"{"n": [1, 2.5, null, {"deep": true}]}"#).unwrap(),
    };
    assert_roundtrip(&envelope);
}

#[test]
fn whole_float_in_a_value_keeps_its_fraction_flag() {
    let tree = parse_value(r#"{"flag": 1.0, "count": 1}"#).unwrap();
    let direct: bool = yson_core::from_value(tree.as_object().unwrap().get("flag")).unwrap();
    assert!(direct);

    let encoded = yson_core::to_value(&tree).unwrap();
    let flag = encoded.as_object().unwrap().get("flag");
    assert!(flag.as_number().unwrap().has_fraction());
    assert!(!encoded.as_object().unwrap().get("count").as_number().unwrap().has_fraction());
    let via_bridge: bool = yson_core::from_value(flag).unwrap();
    assert!(via_bridge);
    assert_eq!(flag.to_json(), "1.0");

    // Other formats see a plain float.
    assert_eq!(serde_json::to_string(flag).unwrap(), "1.0");
}

// ============================================================================
// Text entry points
// ============================================================================

#[test]
fn to_string_then_from_str() {
    let order = sample_order();
    let text = to_string(&order).unwrap();
    let back: Order = from_str(&text).unwrap();
    assert_eq!(back, order);
}

#[test]
fn text_agrees_with_serde_json() {
    let order = sample_order();
    let ours: serde_json::Value = serde_json::from_str(&to_string(&order).unwrap()).unwrap();
    let theirs = serde_json::to_value(&order).unwrap();
    assert_eq!(ours, theirs);
}
