use serde::{Deserialize, Serialize};

use super::{temperature_warning, RateResult};
use crate::error::{require, CalcError};
use crate::interpolation::BoundaryPolicy;
use crate::tables::{resolve_value, Key, LookupTable, SeriesShape};
use crate::units::TemperatureScale;

/// 탄소강: `{"temperature_in_f": {"<T>": {"<HF 범위>": {"<유속>": rate}}}}`
pub const CARBON_STEEL_TABLE: &str = "table_2b62";
/// Alloy 400: `{"temperature_in_f": {"<T>": {"Aerated"|"Non-aerated": {"<HF 농도>": rate}}}}`
pub const ALLOY_400_TABLE: &str = "table_2b63";

/// 재질별로 테이블 중첩 순서가 다르다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HfMaterial {
    CarbonSteel { hf_range: String, velocity: String },
    Alloy400 { aerated: bool, hf_concentration: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HfInput {
    pub scale: TemperatureScale,
    pub temperature: f64,
    pub material: HfMaterial,
}

impl HfMaterial {
    pub fn table_name(&self) -> &'static str {
        match self {
            HfMaterial::CarbonSteel { .. } => CARBON_STEEL_TABLE,
            HfMaterial::Alloy400 { .. } => ALLOY_400_TABLE,
        }
    }

    fn inner_path(&self) -> Vec<Key> {
        match self {
            HfMaterial::CarbonSteel { hf_range, velocity } => {
                vec![Key::exact(hf_range.as_str()), Key::exact(velocity.as_str())]
            }
            HfMaterial::Alloy400 {
                aerated,
                hf_concentration,
            } => {
                let aeration = if *aerated { "Aerated" } else { "Non-aerated" };
                vec![Key::from(aeration), Key::exact(hf_concentration.as_str())]
            }
        }
    }
}

/// 불산 부식률. 온도 축은 아래 외삽(0 하한)·위 고정.
pub fn compute_hf(input: &HfInput, table: &LookupTable) -> Result<RateResult, CalcError> {
    let temp = require(input.temperature, "temperature")?;
    let inner = input.material.inner_path();
    let res = resolve_value(
        table,
        &[Key::from(input.scale.table_key())],
        SeriesShape::NestedByX { inner_path: &inner },
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
