use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{temperature_warning, RateResult};
use crate::error::{require, CalcError};
use crate::interpolation::BoundaryPolicy;
use crate::tables::{resolve_value, Key, LookupTable, SeriesShape};
use crate::units::TemperatureScale;

/// 재질 그룹. 그룹마다 부식률 테이블이 따로 있고 형식은 모두
/// `{"temperature_in_f": {"<S wt%>": {"<TAN>": {"<=450": r, "500": r, ">750": r}}}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NaphthenicMaterial {
    CarbonSteel,
    /// 1Cr-0.2Mo ~ 3Cr-1Mo
    LowCrMo,
    Cr5Mo,
    Cr7Mo,
    Cr9Mo,
    Cr12,
    AusteniticWithoutMo,
    Ss316LowMo,
    /// Mo 2.5% 이상 316, 317
    Ss316HighMo,
}

impl NaphthenicMaterial {
    pub fn table_name(self) -> &'static str {
        match self {
            NaphthenicMaterial::CarbonSteel => "table_2b32",
            NaphthenicMaterial::LowCrMo => "table_2b33",
            NaphthenicMaterial::Cr5Mo => "table_2b34",
            NaphthenicMaterial::Cr7Mo => "table_2b35",
            NaphthenicMaterial::Cr9Mo => "table_2b36",
            NaphthenicMaterial::Cr12 => "table_2b37",
            NaphthenicMaterial::AusteniticWithoutMo => "table_2b38",
            NaphthenicMaterial::Ss316LowMo => "table_2b39",
            NaphthenicMaterial::Ss316HighMo => "table_2b310",
        }
    }
}

/// 고유속 판정 기준 (ft/s, m/s)
pub const HIGH_VELOCITY_FT_S: f64 = 100.0;
pub const HIGH_VELOCITY_M_S: f64 = 30.48;
/// 고유속일 때 부식률 배수
pub const HIGH_VELOCITY_MULTIPLIER: f64 = 5.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NaphthenicInput {
    pub scale: TemperatureScale,
    pub material: NaphthenicMaterial,
    pub max_process_temp: f64,
    /// 황 농도(wt%). 테이블 키와 숫자로 일치해야 한다.
    pub sulfur_concentration: f64,
    pub tan: f64,
    pub velocity: f64,
}

pub fn high_velocity_threshold(scale: TemperatureScale) -> f64 {
    match scale {
        TemperatureScale::Fahrenheit => HIGH_VELOCITY_FT_S,
        TemperatureScale::Celsius => HIGH_VELOCITY_M_S,
    }
}

/// 황 농도·TAN은 숫자 일치 키로 고르고, 온도는 경계 문자열 키를 숫자로 바꿔 보간한다.
pub fn compute_naphthenic(
    input: &NaphthenicInput,
    table: &LookupTable,
) -> Result<RateResult, CalcError> {
    let temp = require(input.max_process_temp, "max_process_temp")?;
    let path = [
        Key::from(input.scale.table_key()),
        Key::Numeric(require(input.sulfur_concentration, "sulfur_concentration")?),
        Key::Numeric(require(input.tan, "tan")?),
    ];
    let res = resolve_value(
        table,
        &path,
        SeriesShape::BoundaryKeyed,
        temp,
        BoundaryPolicy::FloorBelowClampAbove,
    )?;
    let mut warnings: Vec<String> = temperature_warning(&res, temp).into_iter().collect();
    let mut rate = res.value;
    let threshold = high_velocity_threshold(input.scale);
    if require(input.velocity, "velocity")? >= threshold {
        rate *= HIGH_VELOCITY_MULTIPLIER;
        debug!(velocity = input.velocity, threshold, "고유속 배수 적용");
        warnings.push(format!(
            "유속 {} ≥ {threshold}: 부식률에 {HIGH_VELOCITY_MULTIPLIER} 배 적용",
            input.velocity
        ));
    }
    Ok(RateResult {
        rate,
        flag: Some(res.flag),
        unit: input.scale.rate_unit(),
        warnings,
    })
}
