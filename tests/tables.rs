mod common;

use std::fs;

use common::{assert_close, table};
use rbi_damage_toolbox::error::TableError;
use rbi_damage_toolbox::interpolation::{BoundaryPolicy, Point, RangeFlag};
use rbi_damage_toolbox::tables::{
    nearest_key, parse_boundary_key, range_label_contains, resolve_grid, resolve_series, resolve_value, Key,
    SeriesShape, TableStore,
};
use serde_json::json;

#[test]
fn keyed_map_is_sorted_and_skips_non_numeric_keys() {
    let t = table("t", json!({"root": {"200": 10.0, "100": 5.0, "note": "x"}}));
    let p = resolve_series(&t, &[Key::from("root")], SeriesShape::KeyedMap).unwrap();
    assert_eq!(p, vec![Point::new(100.0, 5.0), Point::new(200.0, 10.0)]);
}

#[test]
fn boundary_keys_parse_to_their_number() {
    assert_eq!(parse_boundary_key("<=450"), Some(450.0));
    assert_eq!(parse_boundary_key(">750"), Some(750.0));
    assert_eq!(parse_boundary_key(" 0.5 "), Some(0.5));
    assert_eq!(parse_boundary_key("High"), None);

    let t = table("t", json!({"<=450": 1.0, "500": 2.0, ">750": 3.0}));
    let r = resolve_value(&t, &[], SeriesShape::BoundaryKeyed, 800.0, BoundaryPolicy::FloorBelowClampAbove)
        .unwrap();
    assert_eq!(r.value, 3.0);
    assert_eq!(r.flag, RangeFlag::ClampedAbove);
}

#[test]
fn row_array_reads_nested_y_path() {
    let t = table(
        "cs",
        json!({"98": [
            {"temperature": 100, "acid_velocity": {"2": 5.0, "4": 8.0}},
            {"temperature": 200, "acid_velocity": {"2": 15.0}}
        ]}),
    );
    let y_path = [Key::from("acid_velocity"), Key::Numeric(2.0)];
    let r = resolve_value(
        &t,
        &[Key::Nearest(97.0)],
        SeriesShape::RowArray {
            x_field: "temperature",
            y_path: &y_path,
        },
        150.0,
        BoundaryPolicy::FloorBelowClampAbove,
    )
    .unwrap();
    assert_close(r.value, 10.0, 1e-12);
}

#[test]
fn nested_by_x_uses_outer_key_as_x() {
    let t = table(
        "hf",
        json!({"temperature_in_f": {
            "80": {"Aerated": {"0.5": 2.0}},
            "120": {"Aerated": {"0.5": 6.0}}
        }}),
    );
    let inner = [Key::from("Aerated"), Key::from("0.5")];
    let r = resolve_value(
        &t,
        &[Key::from("temperature_in_f")],
        SeriesShape::NestedByX { inner_path: &inner },
        100.0,
        BoundaryPolicy::FloorBelowClampAbove,
    )
    .unwrap();
    assert_close(r.value, 4.0, 1e-12);
}

#[test]
fn missing_exact_key_is_a_missing_key_error() {
    let t = table("t", json!({"a": {"100": 1.0}}));
    let err = resolve_series(&t, &[Key::from("b")], SeriesShape::KeyedMap).unwrap_err();
    assert!(matches!(err, TableError::MissingKey { ref key, .. } if key == "b"), "{err}");
}

#[test]
fn numeric_key_matches_formatted_variants() {
    let t = table("t", json!({"0.20": {"100": 1.0}}));
    let p = resolve_series(&t, &[Key::Numeric(0.2)], SeriesShape::KeyedMap).unwrap();
    assert_eq!(p.len(), 1);

    let t = table("t", json!({"<=0.2": {"100": 1.0}, "0.5": {"100": 2.0}, ">4": {"100": 3.0}}));
    let low = resolve_series(&t, &[Key::Numeric(0.2)], SeriesShape::KeyedMap).unwrap();
    assert_eq!(low[0].y, 1.0);
    let high = resolve_series(&t, &[Key::Numeric(4.0)], SeriesShape::KeyedMap).unwrap();
    assert_eq!(high[0].y, 3.0);
    assert!(resolve_series(&t, &[Key::Numeric(1.0)], SeriesShape::KeyedMap).is_err());
}

#[test]
fn plain_numeric_key_wins_over_boundary_key() {
    let t = table("t", json!({"<=5": {"1": 1.0}, "5": {"1": 2.0}}));
    let p = resolve_series(&t, &[Key::Numeric(5.0)], SeriesShape::KeyedMap).unwrap();
    assert_eq!(p[0].y, 2.0);
}

#[test]
fn empty_terminal_is_an_empty_series_error() {
    let t = table("t", json!({"a": {"x": "y"}}));
    let err = resolve_series(&t, &[Key::from("a")], SeriesShape::KeyedMap).unwrap_err();
    assert!(matches!(err, TableError::EmptySeries { .. }));
}

#[test]
fn nearest_key_prefers_lower_on_tie() {
    let t = json!({"100": 0, "200": 0, "label": 0});
    let map = t.as_object().unwrap();
    assert_eq!(nearest_key(map, 150.0), Some("100"));
    assert_eq!(nearest_key(map, 160.0), Some("200"));
    assert_eq!(nearest_key(map, -1e9), Some("100"));
}

#[test]
fn grid_interpolates_inner_then_outer() {
    let t = table(
        "g",
        json!({"temperature_in_f": {
            "100": {"4": 1.0, "6": 3.0},
            "200": {"4": 5.0, "6": 7.0}
        }}),
    );
    let r = resolve_grid(
        &t,
        &[Key::from("temperature_in_f")],
        150.0,
        5.0,
        BoundaryPolicy::ClampBoth,
        BoundaryPolicy::ClampBoth,
    )
    .unwrap();
    assert_close(r.value, 4.0, 1e-12);
}

#[test]
fn store_loads_each_table_once() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("table_a.json"), r#"{"x": {"1": 2.0}}"#).unwrap();
    let mut store = TableStore::new(dir.path());
    assert!(!store.is_loaded("table_a"));
    store.load("table_a").unwrap();
    fs::remove_file(dir.path().join("table_a.json")).unwrap();
    assert_eq!(store.load("table_a").unwrap().number(&[Key::from("x"), Key::from("1")]).unwrap(), 2.0);
    assert!(store.is_loaded("table_a"));
}

#[test]
fn store_distinguishes_load_parse_and_not_loaded() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
    let mut store = TableStore::new(dir.path());
    assert!(matches!(store.load("absent"), Err(TableError::Load { .. })));
    assert!(matches!(store.load("broken"), Err(TableError::Parse { .. })));
    assert!(matches!(store.get("never"), Err(TableError::NotLoaded(_))));
}

#[test]
fn inserted_tables_are_served_without_files() {
    let mut store = TableStore::new("does-not-exist");
    store.insert(table("mem", json!({"v": 1})));
    assert!(store.preload(&["mem"]).is_ok());
    assert_eq!(store.get("mem").unwrap().name(), "mem");
}

#[test]
fn row_key_matches_every_field() {
    let t = table(
        "alloys",
        json!({"temperature in f°": [
            {"alloy": "Alloy 20", "cl_concentration": "0.5", "temperature": {"100": 1.0}},
            {"alloy": "Alloy 20", "cl_concentration": 1.0, "temperature": {"100": 4.0}},
            {"alloy": "Alloy 625", "cl_concentration": 1.0, "temperature": {"100": 9.0}}
        ]}),
    );
    let row = |alloy: &str, cl: f64| {
        Key::Row(vec![
            ("alloy".to_string(), Key::exact(alloy)),
            ("cl_concentration".to_string(), Key::Numeric(cl)),
        ])
    };
    let at = |key: Key| {
        t.number(&[Key::from("temperature in f°"), key, Key::from("temperature"), Key::from("100")])
    };
    assert_eq!(at(row("Alloy 20", 0.5)).unwrap(), 1.0);
    assert_eq!(at(row("alloy 20", 1.0)).unwrap(), 4.0);
    assert_eq!(at(Key::row("alloy", Key::exact("Alloy 625"))).unwrap(), 9.0);
    assert!(matches!(at(row("Alloy 625", 0.5)), Err(TableError::MissingKey { .. })));

    // 배열이 아닌 노드에 행 키를 쓰면 형식 오류
    let err = t.walk(&[row("Alloy 20", 0.5)]).unwrap_err();
    assert!(matches!(err, TableError::Shape { .. }));
}

#[test]
fn parallel_arrays_pair_by_position() {
    let t = table(
        "h2s",
        json!({"temperature_in_f": {
            "temperatures": [425, 475, 525],
            "data": {"0.1": [1.0, 2.0, 4.0], "short": [1.0]}
        }}),
    );
    let x_path = [Key::from("temperatures")];
    let y_path = [Key::from("data"), Key::Numeric(0.1)];
    let r = resolve_value(
        &t,
        &[Key::from("temperature_in_f")],
        SeriesShape::ParallelArrays {
            x_path: &x_path,
            y_path: &y_path,
        },
        500.0,
        BoundaryPolicy::FloorBelowClampAbove,
    )
    .unwrap();
    assert_close(r.value, 3.0, 1e-12);

    let short = [Key::from("data"), Key::from("short")];
    let err = resolve_series(
        &t,
        &[Key::from("temperature_in_f")],
        SeriesShape::ParallelArrays {
            x_path: &x_path,
            y_path: &short,
        },
    )
    .unwrap_err();
    assert!(matches!(err, TableError::Shape { .. }));
}

#[test]
fn range_labels_follow_their_bounds() {
    assert_eq!(range_label_contains("<500", 499.9), Some(true));
    assert_eq!(range_label_contains("<500", 500.0), Some(false));
    assert_eq!(range_label_contains("500 to 1,000", 500.0), Some(true));
    assert_eq!(range_label_contains("500 to 1,000", 1000.0), Some(true));
    assert_eq!(range_label_contains(">10,000", 10_000.0), Some(false));
    assert_eq!(range_label_contains(">10,000", 10_001.0), Some(true));
    assert_eq!(range_label_contains("Unknown", 1.0), None);
}
