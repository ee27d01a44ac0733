#![allow(dead_code)]

use rbi_damage_toolbox::tables::LookupTable;
use serde_json::Value;

pub fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol,
        "actual={actual} expected={expected} tol={tol}"
    );
}

pub fn table(name: &str, root: Value) -> LookupTable {
    LookupTable::new(name, root)
}
