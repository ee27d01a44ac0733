//! 토양측 부식률.
//!
//! `CR = CR_B · F_SR · F_T · F_CP · F_CE`. 비저항과 온도 계수는 `"<500"`, `"500 to 1,000"`,
//! `">10,000"` 형식의 구간 라벨로 찾는다.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{require, CalcError, TableError};
use crate::tables::{range_label_contains, value_as_f64, Key, LookupTable, TableStore};
use crate::units::TemperatureScale;

/// 토양 종류별 기본 부식률 (`{"data": [{"soilType", "rate": {"mpy", "mmPerYear"}}]}`)
pub const BASE_RATE_TABLE: &str = "table_2b122";
/// 비저항 구간 계수 (`{"data": [{"resistivity": {"range"}, "multiplyingFactor", "corrosiveness"}]}`)
pub const RESISTIVITY_TABLE: &str = "table_2b123";
/// 온도 구간 계수 (`{"data": [{"temperature": {"fahrenheit", "celsius"}, "multiplyingFactor"}]}`)
pub const TEMPERATURE_TABLE: &str = "table_2b124";
/// 음극방식 관리 수준 계수 (`{"data": [{"practice", "multiplyingFactor"}]}`)
pub const CATHODIC_PROTECTION_TABLE: &str = "table_2b125";
/// 도장 종류별 계수 (`{"data": [{"coatingType", "baseFactorForCoatingType", "multiplyingFactors": {..}}]}`)
pub const COATING_TABLE: &str = "table_2b126";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoatingCondition {
    pub coating_type: String,
    #[serde(default)]
    pub age_over_20_years: bool,
    #[serde(default)]
    pub max_rated_temperature_exceeded: bool,
    #[serde(default)]
    pub maintenance_rare_or_none: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoilSideInput {
    pub scale: TemperatureScale,
    pub soil_type: String,
    /// 토양 비저항(Ω·cm). 없으면 F_SR = 1.
    #[serde(default)]
    pub resistivity_ohm_cm: Option<f64>,
    pub operating_temperature: f64,
    pub cathodic_protection: String,
    /// 없으면 무도장으로 보고 F_CE = 1.
    #[serde(default)]
    pub coating: Option<CoatingCondition>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SoilSideResult {
    pub base_rate: f64,
    pub resistivity_factor: f64,
    pub corrosiveness: Option<String>,
    pub temperature_factor: f64,
    pub cathodic_protection_factor: f64,
    pub coating_factor: f64,
    pub rate: f64,
    pub unit: &'static str,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct SoilSideTables<'a> {
    pub base_rates: &'a LookupTable,
    pub resistivity: &'a LookupTable,
    pub temperature: &'a LookupTable,
    pub cathodic_protection: &'a LookupTable,
    pub coating: &'a LookupTable,
}

impl<'a> SoilSideTables<'a> {
    pub const NAMES: [&'static str; 5] = [
        BASE_RATE_TABLE,
        RESISTIVITY_TABLE,
        TEMPERATURE_TABLE,
        CATHODIC_PROTECTION_TABLE,
        COATING_TABLE,
    ];

    pub fn from_store(store: &'a TableStore) -> Result<Self, TableError> {
        Ok(Self {
            base_rates: store.get(BASE_RATE_TABLE)?,
            resistivity: store.get(RESISTIVITY_TABLE)?,
            temperature: store.get(TEMPERATURE_TABLE)?,
            cathodic_protection: store.get(CATHODIC_PROTECTION_TABLE)?,
            coating: store.get(COATING_TABLE)?,
        })
    }
}

fn rows(table: &LookupTable) -> Result<&Vec<Value>, TableError> {
    table
        .walk(&[Key::from("data")])?
        .as_array()
        .ok_or_else(|| TableError::shape(table.name(), "data가 배열이 아님"))
}

fn row_factor(table: &LookupTable, row: &Value, label: &str) -> Result<f64, TableError> {
    row.get("multiplyingFactor")
        .and_then(value_as_f64)
        .ok_or_else(|| TableError::missing_key(table.name(), format!("{label}.multiplyingFactor")))
}

/// 토양 종류의 기본 부식률 CR_B.
pub fn base_rate(table: &LookupTable, soil_type: &str, scale: TemperatureScale) -> Result<f64, TableError> {
    let field = match scale {
        TemperatureScale::Fahrenheit => "mpy",
        TemperatureScale::Celsius => "mmPerYear",
    };
    rows(table)?
        .iter()
        .find(|row| row.get("soilType").and_then(Value::as_str) == Some(soil_type))
        .and_then(|row| row.get("rate")?.get(field))
        .and_then(value_as_f64)
        .ok_or_else(|| TableError::missing_key(table.name(), soil_type))
}

/// 비저항 구간의 F_SR과 부식성 등급.
pub fn resistivity_factor(table: &LookupTable, resistivity: f64) -> Result<(f64, Option<String>), TableError> {
    for row in rows(table)? {
        let Some(range) = row.pointer("/resistivity/range").and_then(Value::as_str) else {
            continue;
        };
        if range_label_contains(range, resistivity) == Some(true) {
            let corrosiveness = row.get("corrosiveness").and_then(Value::as_str).map(str::to_string);
            return Ok((row_factor(table, row, range)?, corrosiveness));
        }
    }
    Err(TableError::missing_key(table.name(), format!("{resistivity} Ω·cm")))
}

/// 운전 온도 구간의 F_T.
pub fn temperature_factor(table: &LookupTable, temp: f64, scale: TemperatureScale) -> Result<f64, TableError> {
    let field = match scale {
        TemperatureScale::Fahrenheit => "fahrenheit",
        TemperatureScale::Celsius => "celsius",
    };
    for row in rows(table)? {
        let Some(range) = row.get("temperature").and_then(|t| t.get(field)).and_then(Value::as_str) else {
            continue;
        };
        if range_label_contains(range, temp) == Some(true) {
            return row_factor(table, row, range);
        }
    }
    Err(TableError::missing_key(table.name(), format!("{temp}°")))
}

/// 음극방식 관리 수준의 F_CP.
pub fn cathodic_protection_factor(table: &LookupTable, practice: &str) -> Result<f64, TableError> {
    let row = rows(table)?
        .iter()
        .find(|row| row.get("practice").and_then(Value::as_str) == Some(practice))
        .ok_or_else(|| TableError::missing_key(table.name(), practice))?;
    row_factor(table, row, practice)
}

/// 도장 상태의 F_CE. 해당 조건마다 보정계수를 곱하고 소수 둘째 자리로 반올림한다.
pub fn coating_factor(table: &LookupTable, coating: &CoatingCondition) -> Result<f64, TableError> {
    let name = table.name();
    let row = rows(table)?
        .iter()
        .find(|row| row.get("coatingType").and_then(Value::as_str) == Some(coating.coating_type.as_str()))
        .ok_or_else(|| TableError::missing_key(name, coating.coating_type.as_str()))?;
    let number = |pointer: &str| {
        row.pointer(pointer)
            .and_then(value_as_f64)
            .ok_or_else(|| TableError::missing_key(name, format!("{}{pointer}", coating.coating_type)))
    };
    let mut factor = number("/baseFactorForCoatingType")?;
    if coating.age_over_20_years {
        factor *= number("/multiplyingFactors/ageOver20Years")?;
    }
    if coating.max_rated_temperature_exceeded {
        factor *= number("/multiplyingFactors/maxRatedTemperatureOccasionallyExceeded")?;
    }
    if coating.maintenance_rare_or_none {
        factor *= number("/multiplyingFactors/coatingMaintenanceRareOrNone")?;
    }
    Ok((factor * 100.0).round() / 100.0)
}

pub fn compute_soil_side(input: &SoilSideInput, tables: SoilSideTables<'_>) -> Result<SoilSideResult, CalcError> {
    let temp = require(input.operating_temperature, "operating_temperature")?;
    let mut warnings = Vec::new();

    let cr_b = base_rate(tables.base_rates, &input.soil_type, input.scale)?;
    let (f_sr, corrosiveness) = match input.resistivity_ohm_cm {
        Some(r) => resistivity_factor(tables.resistivity, require(r, "resistivity_ohm_cm")?)?,
        None => {
            warnings.push("토양 비저항 없음: F_SR = 1".to_string());
            (1.0, None)
        }
    };
    let f_t = temperature_factor(tables.temperature, temp, input.scale)?;
    let f_cp = cathodic_protection_factor(tables.cathodic_protection, &input.cathodic_protection)?;
    let f_ce = match &input.coating {
        Some(c) => coating_factor(tables.coating, c)?,
        None => 1.0,
    };
    let rate = cr_b * f_sr * f_t * f_cp * f_ce;
    debug!(cr_b, f_sr, f_t, f_cp, f_ce, rate, "토양측 부식률");

    Ok(SoilSideResult {
        base_rate: cr_b,
        resistivity_factor: f_sr,
        corrosiveness,
        temperature_factor: f_t,
        cathodic_protection_factor: f_cp,
        coating_factor: f_ce,
        rate,
        unit: input.scale.rate_unit(),
        warnings,
    })
}
