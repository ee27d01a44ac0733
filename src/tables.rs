//! JSON 룩업 테이블 접근 계층.
//!
//! 테이블은 외부에서 한 번 읽어 캐시하고 이후에는 읽기 전용으로만 사용한다.
//! 범주형 키 경로를 따라 내려간 뒤, 명시적인 형식 태그(`SeriesShape`)에 따라
//! 말단 데이터를 오름차순 `Point` 목록으로 바꾼다. 형식은 구조를 탐색해 추측하지 않는다.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::TableError;
use crate::interpolation::{evaluate, sort_points, BoundaryPolicy, InterpolationResult, Point};

/// 이름이 붙은 불변 JSON 테이블.
#[derive(Debug, Clone)]
pub struct LookupTable {
    name: String,
    root: Value,
}

impl LookupTable {
    pub fn new(name: impl Into<String>, root: Value) -> Self {
        Self {
            name: name.into(),
            root,
        }
    }

    pub fn from_json_str(name: &str, text: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(name, serde_json::from_str(text)?))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// 키 경로를 따라 내려간 노드를 반환한다.
    pub fn walk(&self, path: &[Key]) -> Result<&Value, TableError> {
        descend_all(&self.name, &self.root, path)
    }

    /// 키 경로 끝의 숫자 값을 반환한다.
    pub fn number(&self, path: &[Key]) -> Result<f64, TableError> {
        let node = self.walk(path)?;
        value_as_f64(node)
            .ok_or_else(|| TableError::shape(&self.name, format!("숫자가 아님: {}", describe(path))))
    }
}

/// 테이블 경로의 한 단계.
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    /// 문자열 그대로 일치
    Exact(String),
    /// 숫자로 해석한 값이 같은 키 (`"0.20"`과 0.2)
    Numeric(f64),
    /// 숫자로 해석되는 키 중 가장 가까운 것
    Nearest(f64),
    /// 객체 배열에서 모든 필드 조건(`Exact`/`Numeric`)이 맞는 첫 행
    Row(Vec<(String, Key)>),
}

impl Key {
    pub fn exact(key: impl Into<String>) -> Self {
        Key::Exact(key.into())
    }

    /// 필드 하나로 고르는 행 키.
    pub fn row(field: impl Into<String>, matches: Key) -> Self {
        Key::Row(vec![(field.into(), matches)])
    }

    /// 행 필드 값이 조건과 맞는지. 문자열 비교는 대소문자를 가리지 않는다.
    fn matches_field(&self, v: &Value) -> bool {
        match self {
            Key::Exact(k) => v.as_str().is_some_and(|s| s.trim().eq_ignore_ascii_case(k.trim())),
            Key::Numeric(target) => value_as_f64(v) == Some(*target),
            Key::Nearest(_) | Key::Row(_) => false,
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Exact(value.to_string())
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Exact(k) => write!(f, "{k}"),
            Key::Numeric(v) => write!(f, "{v}"),
            Key::Nearest(v) => write!(f, "~{v}"),
            Key::Row(fields) => {
                let parts: Vec<String> = fields.iter().map(|(name, k)| format!("{name}={k}")).collect();
                write!(f, "[{}]", parts.join(","))
            }
        }
    }
}

/// 말단 데이터의 형식.
#[derive(Debug, Clone, Copy)]
pub enum SeriesShape<'a> {
    /// `{"100": 5.0, "200": 10.0}`
    KeyedMap,
    /// `{"<=450": 1.0, "500": 2.0, ">750": 3.0}` 경계 문자열 키
    BoundaryKeyed,
    /// `[{"temperature": 100, "acid_velocity": {"2": 5.0}}, ...]`
    RowArray {
        x_field: &'a str,
        y_path: &'a [Key],
    },
    /// `{"100": {"Aerated": {"0.5": 5.0}}, ...}` x가 바깥 키인 균일 중첩 맵
    NestedByX { inner_path: &'a [Key] },
    /// `{"temperatures": [425, 475], "data": {"0.1": [1.0, 2.0]}}` 같은 위치의 x·y 배열
    ParallelArrays { x_path: &'a [Key], y_path: &'a [Key] },
}

/// 키 경로와 형식 태그로 정렬된 점 목록을 만든다.
pub fn resolve_series(
    table: &LookupTable,
    path: &[Key],
    shape: SeriesShape<'_>,
) -> Result<Vec<Point>, TableError> {
    let name = table.name();
    let node = table.walk(path)?;
    let mut points = Vec::new();
    match shape {
        SeriesShape::KeyedMap | SeriesShape::BoundaryKeyed => {
            let map = as_object(name, node)?;
            for (k, v) in map {
                let x = match shape {
                    SeriesShape::BoundaryKeyed => parse_boundary_key(k),
                    _ => k.trim().parse::<f64>().ok(),
                };
                if let (Some(x), Some(y)) = (x, value_as_f64(v)) {
                    points.push(Point::new(x, y));
                }
            }
        }
        SeriesShape::RowArray { x_field, y_path } => {
            let rows = node
                .as_array()
                .ok_or_else(|| TableError::shape(name, "배열이 아님"))?;
            for row in rows {
                let x = row.get(x_field).and_then(value_as_f64);
                let y = descend_all(name, row, y_path).ok().and_then(value_as_f64);
                if let (Some(x), Some(y)) = (x, y) {
                    points.push(Point::new(x, y));
                }
            }
        }
        SeriesShape::NestedByX { inner_path } => {
            let map = as_object(name, node)?;
            for (k, v) in map {
                let x = parse_boundary_key(k);
                let y = descend_all(name, v, inner_path).ok().and_then(value_as_f64);
                if let (Some(x), Some(y)) = (x, y) {
                    points.push(Point::new(x, y));
                }
            }
        }
        SeriesShape::ParallelArrays { x_path, y_path } => {
            let array_at = |path: &[Key]| -> Result<&Vec<Value>, TableError> {
                descend_all(name, node, path)?
                    .as_array()
                    .ok_or_else(|| TableError::shape(name, format!("배열이 아님: {}", describe(path))))
            };
            let (xs, ys) = (array_at(x_path)?, array_at(y_path)?);
            if xs.len() != ys.len() {
                return Err(TableError::shape(
                    name,
                    format!("x {}개와 y {}개의 길이가 다름", xs.len(), ys.len()),
                ));
            }
            for (x, y) in xs.iter().zip(ys) {
                if let (Some(x), Some(y)) = (value_as_f64(x), value_as_f64(y)) {
                    points.push(Point::new(x, y));
                }
            }
        }
    }
    if points.is_empty() {
        return Err(TableError::EmptySeries {
            table: name.to_string(),
        });
    }
    sort_points(&mut points);
    Ok(points)
}

/// 점 목록을 만들고 경계 정책을 적용해 x 위치의 값을 구한다.
pub fn resolve_value(
    table: &LookupTable,
    path: &[Key],
    shape: SeriesShape<'_>,
    x: f64,
    policy: BoundaryPolicy,
) -> Result<InterpolationResult, TableError> {
    let points = resolve_series(table, path, shape)?;
    let res = evaluate(x, &points, policy).ok_or_else(|| TableError::EmptySeries {
        table: table.name().to_string(),
    })?;
    if !res.flag.is_within() {
        debug!(table = table.name(), x, flag = ?res.flag, value = res.value, "테이블 범위 밖 입력");
    }
    Ok(res)
}

/// `{outer: {inner: value}}` 두 숫자 축 테이블을 보간한다.
///
/// 각 바깥 키 행에서 안쪽 축을 `inner_policy`로 먼저 보간하고,
/// 그 결과를 바깥 축에 대해 `outer_policy`로 보간한다.
pub fn resolve_grid(
    table: &LookupTable,
    path: &[Key],
    outer: f64,
    inner: f64,
    outer_policy: BoundaryPolicy,
    inner_policy: BoundaryPolicy,
) -> Result<InterpolationResult, TableError> {
    let name = table.name();
    let node = table.walk(path)?;
    let mut column = Vec::new();
    for (k, row) in as_object(name, node)? {
        let Some(x) = parse_boundary_key(k) else {
            continue;
        };
        let mut pts: Vec<Point> = as_object(name, row)?
            .iter()
            .filter_map(|(ik, iv)| Some(Point::new(parse_boundary_key(ik)?, value_as_f64(iv)?)))
            .collect();
        sort_points(&mut pts);
        if let Some(r) = evaluate(inner, &pts, inner_policy) {
            column.push(Point::new(x, r.value));
        }
    }
    sort_points(&mut column);
    let res = evaluate(outer, &column, outer_policy).ok_or_else(|| TableError::EmptySeries {
        table: name.to_string(),
    })?;
    if !res.flag.is_within() {
        debug!(table = name, outer, inner, flag = ?res.flag, "테이블 범위 밖 입력");
    }
    Ok(res)
}

/// 숫자로 해석 가능한 키 중 target에 가장 가까운 키. 동률이면 작은 쪽.
pub fn nearest_key(map: &Map<String, Value>, target: f64) -> Option<&str> {
    let mut best: Option<(&str, f64, f64)> = None;
    for k in map.keys() {
        let Some(v) = parse_boundary_key(k) else {
            continue;
        };
        let d = (v - target).abs();
        let better = match best {
            None => true,
            Some((_, bv, bd)) => d < bd || (d == bd && v < bv),
        };
        if better {
            best = Some((k.as_str(), v, d));
        }
    }
    best.map(|(k, _, _)| k)
}

/// `"<=450"`, `">750"`, `"<20"`, `"0.5"` 같은 키에서 경계 숫자를 꺼낸다.
pub fn parse_boundary_key(key: &str) -> Option<f64> {
    let s = key.trim();
    let s = ["<=", ">=", "≤", "≥", "<", ">"]
        .iter()
        .find_map(|p| s.strip_prefix(p))
        .unwrap_or(s);
    s.trim().parse::<f64>().ok()
}

/// `"<500"`, `"500 to 1,000"`, `">10,000"` 형식의 구간 라벨이 x를 포함하는지.
///
/// `<`·`>`는 경계를 포함하지 않고, `a to b`는 양끝을 포함한다. 해석할 수 없는 라벨은 None.
pub fn range_label_contains(label: &str, x: f64) -> Option<bool> {
    let num = |s: &str| s.replace(',', "").trim().parse::<f64>().ok();
    let s = label.trim();
    if let Some((lo, hi)) = s.split_once("to") {
        let (lo, hi) = (num(lo)?, num(hi)?);
        Some(x >= lo && x <= hi)
    } else if let Some(rest) = s.strip_prefix('<') {
        Some(x < num(rest.trim_start_matches('='))?)
    } else if let Some(rest) = s.strip_prefix('>') {
        Some(x > num(rest.trim_start_matches('='))?)
    } else {
        None
    }
}

/// 숫자 또는 숫자 문자열을 f64로.
pub fn value_as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn as_object<'v>(table: &str, node: &'v Value) -> Result<&'v Map<String, Value>, TableError> {
    node.as_object()
        .ok_or_else(|| TableError::shape(table, "객체가 아님"))
}

fn descend<'v>(table: &str, node: &'v Value, key: &Key) -> Result<&'v Value, TableError> {
    if let Key::Row(fields) = key {
        return node
            .as_array()
            .ok_or_else(|| TableError::shape(table, "행 배열이 아님"))?
            .iter()
            .find(|row| {
                fields
                    .iter()
                    .all(|(name, k)| row.get(name).is_some_and(|v| k.matches_field(v)))
            })
            .ok_or_else(|| TableError::missing_key(table, key.to_string()));
    }
    let map = as_object(table, node)?;
    match key {
        Key::Exact(k) => map
            .get(k)
            .ok_or_else(|| TableError::missing_key(table, k.clone())),
        Key::Numeric(target) => map
            .iter()
            .find(|(k, _)| k.trim().parse::<f64>().ok() == Some(*target))
            .or_else(|| map.iter().find(|(k, _)| parse_boundary_key(k) == Some(*target)))
            .map(|(_, v)| v)
            .ok_or_else(|| TableError::missing_key(table, target.to_string())),
        Key::Nearest(target) => {
            let k = nearest_key(map, *target)
                .ok_or_else(|| TableError::missing_key(table, format!("~{target}")))?;
            if parse_boundary_key(k) != Some(*target) {
                debug!(table, wanted = *target, chosen = k, "가장 가까운 범주 키 사용");
            }
            map.get(k)
                .ok_or_else(|| TableError::missing_key(table, k.to_string()))
        }
        Key::Row(_) => Err(TableError::shape(table, "행 키는 배열에만 쓸 수 있음")),
    }
}

fn descend_all<'v>(table: &str, node: &'v Value, path: &[Key]) -> Result<&'v Value, TableError> {
    path.iter().try_fold(node, |cur, key| descend(table, cur, key))
}

fn describe(path: &[Key]) -> String {
    path.iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// 디렉터리의 `<name>.json` 테이블을 한 번씩만 읽어 보관한다.
#[derive(Debug, Default)]
pub struct TableStore {
    dir: PathBuf,
    tables: HashMap<String, LookupTable>,
}

impl TableStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            tables: HashMap::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 메모리에서 만든 테이블을 등록한다. 같은 이름은 교체된다.
    pub fn insert(&mut self, table: LookupTable) {
        self.tables.insert(table.name().to_string(), table);
    }

    /// 캐시에 없으면 파일에서 읽고, 있으면 그대로 반환한다.
    pub fn load(&mut self, name: &str) -> Result<&LookupTable, TableError> {
        if self.tables.contains_key(name) {
            debug!(table = name, "테이블 캐시 사용");
        } else {
            let path = self.dir.join(format!("{name}.json"));
            let text = fs::read_to_string(&path).map_err(|source| TableError::Load {
                path: path.clone(),
                source,
            })?;
            let table = LookupTable::from_json_str(name, &text)
                .map_err(|source| TableError::Parse { path: path.clone(), source })?;
            info!(table = name, path = %path.display(), "테이블 로드");
            self.tables.insert(name.to_string(), table);
        }
        self.get(name)
    }

    /// 여러 테이블을 미리 읽는다.
    pub fn preload(&mut self, names: &[&str]) -> Result<(), TableError> {
        for name in names {
            self.load(name)?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&LookupTable, TableError> {
        self.tables
            .get(name)
            .ok_or_else(|| TableError::NotLoaded(name.to_string()))
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }
}
