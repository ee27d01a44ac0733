use serde::{Deserialize, Serialize};

use crate::error::{require, CalcError};
use crate::tables::{Key, LookupTable};
use crate::units::TemperatureScale;

/// NH4HS 농도 × 유속 기본 부식률 (`{"temperature_in_f": {"<NH4HS wt%>": {"<유속>": rate}}}`)
pub const TABLE: &str = "table_2b72";

/// H2S 분압 보정 기준과 기울기 분모. `(기준, 기준 미만, 기준 이상)`
const PRESSURE_ADJUSTMENT_PSIA: (f64, f64, f64) = (50.0, 25.0, 40.0);
const PRESSURE_ADJUSTMENT_KPA: (f64, f64, f64) = (345.0, 173.0, 276.0);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlkalineSourWaterInput {
    pub scale: TemperatureScale,
    pub nh4hs_wt_pct: f64,
    /// 유속 (°F 테이블이면 ft/s, °C 테이블이면 m/s)
    pub velocity: f64,
    /// H2S 분압 (°F 테이블이면 psia, °C 테이블이면 kPa). 없으면 보정하지 않는다.
    #[serde(default)]
    pub h2s_partial_pressure: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlkalineSourWaterResult {
    pub baseline_rate: f64,
    pub rate: f64,
    pub unit: &'static str,
    pub warnings: Vec<String>,
}

/// 기준 분압에서 벗어난 만큼 선형 보정하고 0 하한, 소수 넷째 자리 반올림.
pub fn pressure_adjusted_rate(baseline: f64, p_h2s: f64, scale: TemperatureScale) -> f64 {
    let (pivot, below, above) = match scale {
        TemperatureScale::Fahrenheit => PRESSURE_ADJUSTMENT_PSIA,
        TemperatureScale::Celsius => PRESSURE_ADJUSTMENT_KPA,
    };
    let span = if p_h2s < pivot { below } else { above };
    let adjusted = (baseline / span * (p_h2s - pivot) + baseline).max(0.0);
    (adjusted * 1e4).round() / 1e4
}

/// 알칼리 사워워터 부식률. 농도·유속은 테이블 키와 숫자로 일치해야 한다.
pub fn compute_alkaline_sour_water(
    input: &AlkalineSourWaterInput,
    table: &LookupTable,
) -> Result<AlkalineSourWaterResult, CalcError> {
    let conc = require(input.nh4hs_wt_pct, "nh4hs_wt_pct")?;
    let velocity = require(input.velocity, "velocity")?;
    let baseline = table.number(&[
        Key::from(input.scale.table_key()),
        Key::Numeric(conc),
        Key::Numeric(velocity),
    ])?;
    let (rate, warnings) = match input.h2s_partial_pressure {
        Some(p) => (pressure_adjusted_rate(baseline, require(p, "h2s_partial_pressure")?, input.scale), Vec::new()),
        None => (baseline, vec!["H2S 분압 없음: 기본 부식률 사용".to_string()]),
    };
    Ok(AlkalineSourWaterResult {
        baseline_rate: baseline,
        rate,
        unit: input.scale.rate_unit(),
        warnings,
    })
}
