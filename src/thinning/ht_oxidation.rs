use serde::{Deserialize, Serialize};

use super::{temperature_warning, RateResult};
use crate::error::{require, CalcError};
use crate::interpolation::BoundaryPolicy;
use crate::tables::{resolve_value, Key, LookupTable, SeriesShape};
use crate::units::TemperatureScale;

/// 재질별 온도-부식률 (`{"temperature_in_f": {"CS": {"<T>": rate|null}}}`)
pub const TABLE: &str = "table_2b92";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OxidationMaterial {
    CarbonSteel,
    Cr125,
    Cr225,
    Cr5,
    Cr7,
    Cr9,
    Cr12,
    Ss304,
    Ss309,
    Ss310Hk,
    Alloy800,
}

impl OxidationMaterial {
    pub fn table_key(self) -> &'static str {
        match self {
            OxidationMaterial::CarbonSteel => "CS",
            OxidationMaterial::Cr125 => "1 1/4Cr",
            OxidationMaterial::Cr225 => "2 1/4Cr",
            OxidationMaterial::Cr5 => "5 Cr",
            OxidationMaterial::Cr7 => "7 Cr",
            OxidationMaterial::Cr9 => "9 Cr",
            OxidationMaterial::Cr12 => "12 Cr",
            OxidationMaterial::Ss304 => "304 SS",
            OxidationMaterial::Ss309 => "309 SS",
            OxidationMaterial::Ss310Hk => "310 SS/HK",
            OxidationMaterial::Alloy800 => "800 H/HP",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HtOxidationInput {
    pub scale: TemperatureScale,
    pub material: OxidationMaterial,
    pub max_temperature: f64,
}

/// 고온 산화 부식률. 빈 칸(null)은 건너뛰고 남은 점으로 보간한다.
pub fn compute_ht_oxidation(input: &HtOxidationInput, table: &LookupTable) -> Result<RateResult, CalcError> {
    let temp = require(input.max_temperature, "max_temperature")?;
    let res = resolve_value(
        table,
        &[Key::from(input.scale.table_key()), Key::from(input.material.table_key())],
        SeriesShape::KeyedMap,
        temp,
        BoundaryPolicy::FloorBelowClampAbove,
    )?;
    Ok(RateResult {
        rate: res.value,
        flag: Some(res.flag),
        unit: input.scale.rate_unit(),
        warnings: temperature_warning(&res, temp).into_iter().collect(),
    })
}
