use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{require, CalcError};
use crate::interpolation::BoundaryPolicy;
use crate::tables::{resolve_grid, Key, LookupTable};
use crate::units::{fahrenheit_to_celsius, psi_to_bar, MPY_PER_MM_Y};

/// f(T, pH) 테이블 (`{"temperature_in_f": {"<T>": {"<pH>": f}}}`)
pub const TEMPERATURE_PH_TABLE: &str = "table_2b132";

/// 글리콜 보정계수 하한
pub const MIN_GLYCOL_FACTOR: f64 = 0.008;

/// CO2 부식 계산 입력. 온도는 °F, 압력은 psia.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Co2Input {
    /// 탄소강/저합금강 여부. 아니면 부식률 0.
    pub carbon_steel: bool,
    pub operating_temp_f: f64,
    pub pressure_psia: f64,
    /// 수분 함량(%). 주어지면 이슬점 판정을 먼저 한다.
    #[serde(default)]
    pub water_percent: Option<f64>,
    pub co2_mol_percent: f64,
    pub ph: f64,
    /// 벽면 전단응력(Pa)
    pub shear_stress_pa: f64,
    #[serde(default)]
    pub glycol_percent: Option<f64>,
    /// 부식억제제 효율(%)
    #[serde(default)]
    pub inhibitor_efficiency: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Co2Result {
    pub dew_point_f: Option<f64>,
    /// 액상 수분이 존재해 부식이 가능한지
    pub liquid_water: bool,
    pub co2_partial_pressure_bar: f64,
    pub fugacity_bar: f64,
    pub f_t_ph: f64,
    pub base_rate_mm_y: f64,
    pub base_rate_mpy: f64,
    pub glycol_factor: f64,
    pub inhibitor_factor: f64,
    /// 최종 부식률(mpy)
    pub corrosion_rate_mpy: f64,
    pub warnings: Vec<String>,
}

/// 이슬점(°F): `log10(Td) = 2.0866 + 0.2088 log10(%W/100) + 0.2242 log10(P)`
pub fn dew_point_f(water_percent: f64, pressure_psia: f64) -> Option<f64> {
    if water_percent <= 0.0 || pressure_psia <= 0.0 {
        return None;
    }
    let log_td = 2.0866 + 0.2088 * (water_percent / 100.0).log10() + 0.2242 * pressure_psia.log10();
    Some(10f64.powf(log_td))
}

/// CO2 분압(bar)과 온도(°C)로 퓨개시티(bar)를 구한다.
pub fn fugacity_bar(p_co2_bar: f64, temp_c: f64) -> f64 {
    let log_a = p_co2_bar.min(250.0) * (0.0031 - 1.4 / (temp_c + 273.0));
    10f64.powf(log_a) * p_co2_bar
}

/// 기본 부식률(mm/y). 전단응력이 0 이하이면 전단 항이 0이 되어 결과도 0.
pub fn base_rate_mm_y(f_t_ph: f64, fugacity_bar: f64, shear_pa: f64) -> f64 {
    let shear_term = if shear_pa > 0.0 {
        (shear_pa / 19.0).powf(0.146)
    } else {
        0.0
    };
    0.0324 * f_t_ph * fugacity_bar.powf(0.62) * shear_term
}

/// `10^(1.6 log10(100 - %glycol) - 3.2)`, [0.008, 1] 범위로 제한.
pub fn glycol_factor(glycol_percent: f64) -> f64 {
    if glycol_percent <= 0.0 {
        return 1.0;
    }
    let water = 100.0 - glycol_percent;
    if water <= 0.0 {
        return MIN_GLYCOL_FACTOR;
    }
    10f64
        .powf(1.6 * water.log10() - 3.2)
        .clamp(MIN_GLYCOL_FACTOR, 1.0)
}

pub fn inhibitor_factor(efficiency_percent: f64) -> f64 {
    if efficiency_percent > 0.0 {
        1.0 - efficiency_percent / 100.0
    } else {
        1.0
    }
}

/// f(T, pH)를 온도·pH 양축 모두 끝값 고정으로 보간한다.
pub fn temperature_ph_factor(table: &LookupTable, temp_f: f64, ph: f64) -> Result<f64, CalcError> {
    let res = resolve_grid(
        table,
        &[Key::from("temperature_in_f")],
        temp_f,
        ph,
        BoundaryPolicy::ClampBoth,
        BoundaryPolicy::ClampBoth,
    )?;
    Ok(res.value)
}

fn zero_result(warnings: Vec<String>, dew_point_f: Option<f64>) -> Co2Result {
    Co2Result {
        dew_point_f,
        liquid_water: false,
        co2_partial_pressure_bar: 0.0,
        fugacity_bar: 0.0,
        f_t_ph: 0.0,
        base_rate_mm_y: 0.0,
        base_rate_mpy: 0.0,
        glycol_factor: 1.0,
        inhibitor_factor: 1.0,
        corrosion_rate_mpy: 0.0,
        warnings,
    }
}

/// CO2 부식률을 계산한다.
pub fn compute_co2(input: &Co2Input, table: &LookupTable) -> Result<Co2Result, CalcError> {
    let mut warnings = Vec::new();
    if !input.carbon_steel {
        warnings.push("탄소강/저합금강이 아니므로 CO2 부식률 0".into());
        return Ok(zero_result(warnings, None));
    }
    let temp_f = require(input.operating_temp_f, "operating_temp_f")?;
    let pressure = require(input.pressure_psia, "pressure_psia")?;

    let dew_point = match input.water_percent {
        Some(w) => {
            let td = dew_point_f(require(w, "water_percent")?, pressure)
                .ok_or(CalcError::MissingInput("water_percent"))?;
            if temp_f >= td {
                warnings.push(format!("운전온도 {temp_f:.1}°F ≥ 이슬점 {td:.1}°F: 액상 수분 없음"));
                return Ok(zero_result(warnings, Some(td)));
            }
            Some(td)
        }
        None => None,
    };

    let p_co2 = require(input.co2_mol_percent, "co2_mol_percent")? / 100.0 * psi_to_bar(pressure);
    let fugacity = fugacity_bar(p_co2, fahrenheit_to_celsius(temp_f));
    let f_t_ph = temperature_ph_factor(table, temp_f, require(input.ph, "ph")?)?;
    let shear = require(input.shear_stress_pa, "shear_stress_pa")?;
    if shear <= 0.0 {
        warnings.push("전단응력 0 이하: 부식률 0".into());
    }
    let base_mm = base_rate_mm_y(f_t_ph, fugacity, shear);
    let base_mpy = base_mm * MPY_PER_MM_Y;

    let f_glycol = glycol_factor(input.glycol_percent.unwrap_or(0.0));
    let f_inhib = inhibitor_factor(input.inhibitor_efficiency.unwrap_or(0.0));
    let rate = base_mpy * f_glycol * f_inhib;
    debug!(p_co2, fugacity, f_t_ph, rate, "CO2 부식률");

    Ok(Co2Result {
        dew_point_f: dew_point,
        liquid_water: true,
        co2_partial_pressure_bar: p_co2,
        fugacity_bar: fugacity,
        f_t_ph,
        base_rate_mm_y: base_mm,
        base_rate_mpy: base_mpy,
        glycol_factor: f_glycol,
        inhibitor_factor: f_inhib,
        corrosion_rate_mpy: rate,
        warnings,
    })
}
