use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::RateResult;
use crate::error::{require, CalcError, TableError};
use crate::tables::{nearest_key, value_as_f64, Key, LookupTable};
use crate::units::TemperatureScale;

/// 아민 농도별 부식률 배수 (`{"amine_corrosion_rate_multiplier": {"MEA": {"<=20": m, ...}}}`)
pub const MULTIPLIER_TABLE: &str = "table_2b84";
/// 300 계열 스테인리스강 (`{"data": {"<loading>": {"mpy": r, "mm/yr": r}}}`)
pub const STAINLESS_TABLE: &str = "table_2b85";

/// 스테인리스강 경로를 쓸 수 있는 최고 온도 (°F, °C)
pub const SS_MAX_TEMP_F: f64 = 300.0;
pub const SS_MAX_TEMP_C: f64 = 149.0;
/// 스테인리스강 경로의 산성가스 부하 범위 (mol/mol)
pub const SS_LOADING_RANGE: (f64, f64) = (0.1, 0.7);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmineType {
    Mea,
    Dea,
    Mdea,
}

impl AmineType {
    pub fn table_key(self) -> &'static str {
        match self {
            AmineType::Mea => "MEA",
            AmineType::Dea => "DEA",
            AmineType::Mdea => "MDEA",
        }
    }

    /// 탄소강 기본 부식률 테이블. `{"temperature_in_f": {"<부하>": {"<T>": {"<HSAS>": {"<v 구간>": r}}}}}`
    pub fn table_name(self, scale: TemperatureScale) -> &'static str {
        match (self, scale) {
            (AmineType::Mea | AmineType::Dea, TemperatureScale::Fahrenheit) => "table_2b82",
            (AmineType::Mea | AmineType::Dea, TemperatureScale::Celsius) => "table_2b82M",
            (AmineType::Mdea, TemperatureScale::Fahrenheit) => "table_2b83",
            (AmineType::Mdea, TemperatureScale::Celsius) => "table_2b83M",
        }
    }

    /// 농도(wt%)에 해당하는 배수 테이블 키.
    pub fn concentration_band(self, concentration: f64) -> &'static str {
        match self {
            AmineType::Mea if concentration <= 20.0 => "<=20",
            AmineType::Mea if concentration <= 25.0 => "21_to_25",
            AmineType::Mea => ">25",
            AmineType::Dea if concentration <= 30.0 => "<=30",
            AmineType::Dea if concentration <= 40.0 => "31_to_40",
            AmineType::Dea => ">40",
            AmineType::Mdea => "<=50",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmineCarbonSteelInput {
    pub scale: TemperatureScale,
    pub amine: AmineType,
    /// 산성가스 부하 범주 (예: "<0.1", "0.15")
    pub acid_gas_loading: String,
    /// HSAS 농도 범주
    pub hsas: String,
    /// 아민 농도(wt%)
    pub amine_concentration: f64,
    pub velocity: f64,
    pub temperature: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AmineCarbonSteelResult {
    /// 실제로 사용한 온도 키
    pub temperature_key: String,
    pub velocity_band: String,
    pub base_rate: f64,
    pub multiplier: f64,
    pub rate: RateResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmineStainlessInput {
    pub scale: TemperatureScale,
    /// 산성가스 부하(mol/mol). 가장 가까운 테이블 행을 쓴다.
    pub acid_gas_loading: f64,
    pub temperature: f64,
}

/// 유속 구간 키. `"<20"`/`">20"` 열이 있으면 그것을, 없으면 `"<=5"`/`">5"`를, 그마저 없으면 첫 키를 쓴다.
pub fn velocity_band(columns: &Map<String, Value>, velocity: f64) -> Option<&str> {
    let pick = |key: &str| columns.keys().find(|k| k.as_str() == key).map(String::as_str);
    if columns.contains_key("<20") {
        pick(if velocity < 20.0 { "<20" } else { ">20" })
    } else if columns.contains_key("<=5") {
        pick(if velocity <= 5.0 { "<=5" } else { ">5" })
    } else {
        columns.keys().next().map(String::as_str)
    }
}

/// 농도 배수를 읽는다.
pub fn concentration_multiplier(
    table: &LookupTable,
    amine: AmineType,
    concentration: f64,
) -> Result<f64, TableError> {
    let band = amine.concentration_band(concentration);
    table.number(&[
        Key::from("amine_corrosion_rate_multiplier"),
        Key::from(amine.table_key()),
        Key::from(band),
    ])
}

/// 탄소강·저합금강 아민 부식률. 온도는 가장 가까운 키를 쓰며 보간하지 않는다.
pub fn compute_amine_carbon_steel(
    input: &AmineCarbonSteelInput,
    rate_table: &LookupTable,
    multiplier_table: &LookupTable,
) -> Result<AmineCarbonSteelResult, CalcError> {
    let temp = require(input.temperature, "temperature")?;
    let velocity = require(input.velocity, "velocity")?;
    let concentration = require(input.amine_concentration, "amine_concentration")?;
    let name = rate_table.name();

    let by_temp = rate_table
        .walk(&[
            Key::from(input.scale.table_key()),
            Key::exact(input.acid_gas_loading.as_str()),
        ])?
        .as_object()
        .ok_or_else(|| TableError::shape(name, "산성가스 부하 행이 객체가 아님"))?;
    let temp_key = nearest_key(by_temp, temp)
        .ok_or_else(|| TableError::missing_key(name, format!("~{temp}")))?;
    let columns = by_temp
        .get(temp_key)
        .and_then(|v| v.get(input.hsas.as_str()))
        .and_then(Value::as_object)
        .ok_or_else(|| TableError::missing_key(name, format!("{temp_key}/{}", input.hsas)))?;
    let band = velocity_band(columns, velocity)
        .ok_or_else(|| TableError::shape(name, "유속 구간 열이 없음"))?;
    let base = columns
        .get(band)
        .and_then(value_as_f64)
        .ok_or_else(|| TableError::missing_key(name, band))?;

    let multiplier = concentration_multiplier(multiplier_table, input.amine, concentration)?;
    let rate = base * multiplier;
    debug!(temp_key, band, base, multiplier, rate, "아민 탄소강 부식률");

    let mut warnings = Vec::new();
    if parse_f64(temp_key) != Some(temp) {
        warnings.push(format!("온도 {temp}에 가장 가까운 테이블 온도 {temp_key} 사용"));
    }
    Ok(AmineCarbonSteelResult {
        temperature_key: temp_key.to_string(),
        velocity_band: band.to_string(),
        base_rate: base,
        multiplier,
        rate: RateResult {
            rate,
            flag: None,
            unit: input.scale.rate_unit(),
            warnings,
        },
    })
}

/// 300 계열 스테인리스강 아민 부식률. 부하는 가장 가까운 행을 쓴다.
pub fn compute_amine_stainless(
    input: &AmineStainlessInput,
    table: &LookupTable,
) -> Result<RateResult, CalcError> {
    let loading = require(input.acid_gas_loading, "acid_gas_loading")?;
    let temp = require(input.temperature, "temperature")?;
    let mut warnings = Vec::new();

    let max_temp = match input.scale {
        TemperatureScale::Fahrenheit => SS_MAX_TEMP_F,
        TemperatureScale::Celsius => SS_MAX_TEMP_C,
    };
    if temp > max_temp {
        warnings.push(format!("온도 {temp}가 스테인리스강 적용 한계 {max_temp} 초과"));
    }
    let (lo, hi) = SS_LOADING_RANGE;
    if !(lo..=hi).contains(&loading) {
        warnings.push(format!("산성가스 부하 {loading}가 적용 범위 {lo}~{hi} 밖"));
    }

    let row = table.walk(&[Key::from("data"), Key::Nearest(loading)])?;
    let unit_key = match input.scale {
        TemperatureScale::Fahrenheit => "mpy",
        TemperatureScale::Celsius => "mm/yr",
    };
    let rate = row
        .get(unit_key)
        .and_then(value_as_f64)
        .ok_or_else(|| TableError::missing_key(table.name(), unit_key))?;
    Ok(RateResult {
        rate,
        flag: None,
        unit: input.scale.rate_unit(),
        warnings,
    })
}

fn parse_f64(key: &str) -> Option<f64> {
    key.trim().parse().ok()
}
