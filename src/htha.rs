//! 고온 수소침식(HTHA) 감수성과 손상계수.
//!
//! Nelson 곡선을 재질별 직선으로 근사한 한계온도와 운전온도의 차이로 감수성을 정하고,
//! 노출 기간 구간표로 DF를 읽는다. 경년 보정은 하지 않는다.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aging::pof_category;
use crate::error::{require, CalcError};
use crate::scc::Susceptibility;
use crate::units::TemperatureScale;

/// 이 온도(°F) 미만은 HTHA 대상 아님
pub const SCREENING_TEMP_F: f64 = 350.0;
/// 이 수소 분압(psia) 미만은 HTHA 대상 아님
pub const SCREENING_PRESSURE_PSIA: f64 = 50.0;
/// 재질을 특정하지 못할 때의 보수적 한계온도(°F)
pub const DEFAULT_LIMIT_F: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HthaMaterial {
    CarbonSteel,
    #[serde(rename = "C-0.5Mo")]
    C05Mo,
    #[serde(rename = "C-0.5Mo Normalized")]
    C05MoNormalized,
    #[serde(rename = "1Cr-0.5Mo")]
    Cr1Mo05,
    #[serde(rename = "1.25Cr-0.5Mo")]
    Cr125Mo05,
    #[serde(rename = "2.25Cr-1Mo")]
    Cr225Mo1,
    #[serde(rename = "3Cr-1Mo")]
    Cr3Mo1,
    #[serde(rename = "5Cr-0.5Mo")]
    Cr5Mo05,
    #[serde(rename = "7Cr-0.5Mo")]
    Cr7Mo05,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HthaInput {
    pub scale: TemperatureScale,
    pub material: HthaMaterial,
    pub temperature: f64,
    /// 수소 분압(psia)
    pub h2_partial_pressure: f64,
    /// 수소 환경 노출 기간(년)
    pub exposure_years: f64,
    #[serde(default)]
    pub damage_observed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HthaResult {
    pub susceptibility: Susceptibility,
    /// 한계온도(°F). 해당 분압에서 곡선이 없으면(면역) None.
    pub limit_temperature_f: Option<f64>,
    /// 운전온도 - 한계온도(°F)
    pub margin_f: Option<f64>,
    pub damage_factor: f64,
    pub pof_category: u8,
    pub notes: Vec<String>,
}

/// 근사 Nelson 곡선 한계온도(°F). None이면 해당 분압에서 면역.
pub fn nelson_limit_f(material: HthaMaterial, pressure_psia: f64) -> Option<f64> {
    let below_curve = pressure_psia < SCREENING_PRESSURE_PSIA;
    match material {
        HthaMaterial::CarbonSteel | HthaMaterial::C05Mo | HthaMaterial::C05MoNormalized => {
            if below_curve {
                None
            } else if pressure_psia > 2500.0 {
                Some(400.0)
            } else {
                Some(600.0 - 0.05 * pressure_psia)
            }
        }
        HthaMaterial::Cr1Mo05 => (!below_curve).then(|| 850.0 - 0.02 * pressure_psia),
        HthaMaterial::Cr125Mo05 => (!below_curve).then(|| 950.0 - 0.02 * pressure_psia),
        HthaMaterial::Cr225Mo1 => Some(1100.0),
        HthaMaterial::Cr3Mo1 | HthaMaterial::Cr5Mo05 | HthaMaterial::Cr7Mo05 => None,
        HthaMaterial::Other => Some(DEFAULT_LIMIT_F),
    }
}

/// 한계온도와의 차이: 0 이상 High, -50 이상 Medium, -100 이상 Low, 그 아래 None.
pub fn margin_susceptibility(margin_f: f64) -> Susceptibility {
    if margin_f >= 0.0 {
        Susceptibility::High
    } else if margin_f >= -50.0 {
        Susceptibility::Medium
    } else if margin_f >= -100.0 {
        Susceptibility::Low
    } else {
        Susceptibility::None
    }
}

/// 감수성 × 노출 기간 구간 DF.
pub fn htha_damage_factor(susceptibility: Susceptibility, years: f64) -> f64 {
    match susceptibility {
        Susceptibility::High | Susceptibility::FfsRequired => {
            if years < 1.0 {
                10.0
            } else if years < 5.0 {
                500.0
            } else {
                5000.0
            }
        }
        Susceptibility::Medium => {
            if years < 5.0 {
                0.0
            } else if years < 10.0 {
                50.0
            } else if years < 20.0 {
                500.0
            } else {
                1000.0
            }
        }
        Susceptibility::Low => {
            if years < 10.0 {
                0.0
            } else if years < 20.0 {
                10.0
            } else {
                100.0
            }
        }
        Susceptibility::None => 0.0,
    }
}

pub fn assess_htha(input: &HthaInput) -> Result<HthaResult, CalcError> {
    let years = require(input.exposure_years, "exposure_years")?;
    let finish = |susceptibility: Susceptibility, limit: Option<f64>, margin: Option<f64>, notes: Vec<String>| {
        let df = htha_damage_factor(susceptibility, years);
        HthaResult {
            susceptibility,
            limit_temperature_f: limit,
            margin_f: margin,
            damage_factor: df,
            pof_category: pof_category(df),
            notes,
        }
    };
    if input.damage_observed {
        return Ok(finish(Susceptibility::High, None, None, vec!["HTHA 손상 관찰됨".into()]));
    }

    let temp_f = input.scale.to_fahrenheit(require(input.temperature, "temperature")?);
    let pressure = require(input.h2_partial_pressure, "h2_partial_pressure")?;
    if temp_f < SCREENING_TEMP_F || pressure < SCREENING_PRESSURE_PSIA {
        return Ok(finish(
            Susceptibility::None,
            None,
            None,
            vec![format!(
                "선별 기준 미만 ({temp_f:.0}°F < {SCREENING_TEMP_F}°F 또는 {pressure} psia < {SCREENING_PRESSURE_PSIA} psia)"
            )],
        ));
    }

    let limit = nelson_limit_f(input.material, pressure);
    let margin = limit.map(|l| temp_f - l);
    debug!(material = ?input.material, temp_f, pressure, ?limit, "HTHA 한계온도");
    let (susceptibility, note) = match margin {
        Some(m) => (margin_susceptibility(m), format!("한계온도 대비 {m:+.0}°F")),
        None => (Susceptibility::None, "해당 분압에서 면역 재질".to_string()),
    };
    Ok(finish(susceptibility, limit, margin, vec![note]))
}
