//! Typed-record tests: Serde derive round-trips through the document model
//! and the typed mismatch errors.

use serde::{Deserialize, Serialize};
use serde_json5::{from_str, to_string, to_string_with_options, ErrorKind, WriteOptions};
use std::collections::HashMap;

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Material {
    name: String,
    roughness: f64,
    metallic: bool,
    tint: [f64; 3],
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Scene {
    materials: Vec<Material>,
    lookup: HashMap<String, u32>,
    comment: Option<String>,
}

fn sample_scene() -> Scene {
    Scene {
        materials: vec![
            Material {
                name: "steel".to_string(),
                roughness: 0.35,
                metallic: true,
                tint: [0.9, 0.9, 0.95],
            },
            Material {
                name: "wood".to_string(),
                roughness: 0.8,
                metallic: false,
                tint: [0.6, 0.4, 0.2],
            },
        ],
        lookup: [("steel".to_string(), 0), ("wood".to_string(), 1)]
            .into_iter()
            .collect(),
        comment: None,
    }
}

#[test]
fn struct_round_trip() {
    let scene = sample_scene();
    let text = to_string(&scene).unwrap();
    assert_eq!(from_str::<Scene>(&text).unwrap(), scene);
}

#[test]
fn struct_round_trip_compact() {
    let scene = sample_scene();
    let options = WriteOptions::new().with_compact(true);
    let text = to_string_with_options(&scene, &options).unwrap();
    assert!(!text.contains('\n'));
    assert_eq!(from_str::<Scene>(&text).unwrap(), scene);
}

#[test]
fn typed_read_from_lenient_text() {
    let material: Material = from_str(
        r#"{
        // hand-written asset
        name: 'brushed aluminum',
        roughness: .4,
        metallic: true,
        tint: [+0.9, 0.9, 0.9,],
    }"#,
    )
    .unwrap();
    assert_eq!(material.name, "brushed aluminum");
    assert_eq!(material.tint, [0.9, 0.9, 0.9]);
}

#[test]
fn fixed_array_size_is_checked() {
    #[derive(Deserialize, Debug)]
    struct Holder {
        #[allow(dead_code)]
        v: [f64; 3],
    }

    for text in ["{ v: [2, 3] }", "{ v: [2, 3, 4, 5] }"] {
        let err = from_str::<Holder>(text).unwrap_err();
        assert_eq!(err.kind, ErrorKind::WrongArraySize, "input: {text}");
    }

    let ok: Holder = from_str("{ v: [3, 4, 5] }").unwrap();
    assert_eq!(ok.v, [3.0, 4.0, 5.0]);
}

#[test]
fn tuple_struct_round_trip() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Entry(f64, String, [i32; 1], bool);

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Entries {
        items: Vec<Entry>,
    }

    let entries = Entries {
        items: vec![Entry(42.42, "Bar".to_string(), [42], true)],
    };
    let text = to_string(&entries).unwrap();
    assert_eq!(from_str::<Entries>(&text).unwrap(), entries);
}

#[test]
fn enum_round_trip_and_unknown_variant() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    enum Filter {
        Nearest,
        Anisotropic(u32),
        Custom { kernel: Vec<f64> },
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Sampler {
        filter: Filter,
    }

    for filter in [
        Filter::Nearest,
        Filter::Anisotropic(16),
        Filter::Custom {
            kernel: vec![0.25, 0.5, 0.25],
        },
    ] {
        let sampler = Sampler { filter };
        let text = to_string(&sampler).unwrap();
        assert_eq!(from_str::<Sampler>(&text).unwrap(), sampler);
    }

    let err = from_str::<Sampler>("{ filter: 'Trilinear' }").unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidEnum);
}

#[test]
fn optional_fields() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Config {
        #[serde(default)]
        retries: Option<u32>,
        #[serde(default)]
        label: Option<String>,
    }

    let explicit: Config = from_str("{ retries: 5, label: null }").unwrap();
    assert_eq!(explicit.retries, Some(5));
    assert_eq!(explicit.label, None);

    let empty: Config = from_str("{}").unwrap();
    assert_eq!(empty, Config { retries: None, label: None });
}

#[test]
fn nan_survives_typed_round_trip() {
    #[derive(Serialize, Deserialize)]
    struct Stats {
        mean: f64,
        deviation: Option<f64>,
    }

    let stats: Stats = from_str("{ mean: NaN, deviation: NaN }").unwrap();
    assert!(stats.mean.is_nan());
    assert!(stats.deviation.unwrap().is_nan());

    // Default (non-compact) output keeps the NaN token, so it re-parses.
    let text = to_string(&stats).unwrap();
    let again: Stats = from_str(&text).unwrap();
    assert!(again.mean.is_nan());
}

#[test]
fn type_mismatches_use_typed_kinds() {
    #[derive(Deserialize, Debug)]
    struct Typed {
        #[allow(dead_code)]
        n: f64,
    }

    let err = from_str::<Typed>("{ n: 'five' }").unwrap_err();
    assert_eq!(err.kind, ErrorKind::NumberExpected);

    #[derive(Deserialize, Debug)]
    struct Wrapper {
        #[allow(dead_code)]
        inner: Typed,
    }

    let err = from_str::<Wrapper>("{ inner: [1] }").unwrap_err();
    assert_eq!(err.kind, ErrorKind::ObjectExpected);
}

#[test]
fn map_with_exotic_keys_round_trips() {
    let mut map: HashMap<String, i32> = HashMap::new();
    map.insert("plain".to_string(), 1);
    map.insert("needs quoting".to_string(), 2);
    map.insert("123leading".to_string(), 3);

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Keys {
        map: HashMap<String, i32>,
    }

    let keys = Keys { map };
    let text = to_string(&keys).unwrap();
    assert_eq!(from_str::<Keys>(&text).unwrap(), keys);
}
