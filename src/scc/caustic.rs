use serde::{Deserialize, Serialize};

use super::{undetermined, CrackHistory, Susceptibility, SusceptibilityAssessment};
use crate::error::{CalcError, TableError};
use crate::interpolation::Point;
use crate::tables::{resolve_series, Key, LookupTable, SeriesShape};
use crate::units::TemperatureScale;

/// Area A 경계 곡선 (`{"area_a_curve_f": [{"c": %, "t": T}], "area_a_curve_c": [...]}`)
pub const CURVE_TABLE: &str = "scc_caustic_chart";

/// Area A 판정을 하는 NaOH 농도 상한(wt%)
pub const AREA_A_MAX_CONCENTRATION: f64 = 50.0;
/// 저농도/고농도 경계(wt%)
pub const LOW_CONCENTRATION: f64 = 5.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CausticInput {
    pub scale: TemperatureScale,
    #[serde(default)]
    pub cracks: CrackHistory,
    #[serde(default)]
    pub stress_relieved: Option<bool>,
    /// NaOH 농도(wt%)
    #[serde(default)]
    pub naoh_concentration: Option<f64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub heat_traced: Option<bool>,
    #[serde(default)]
    pub steamed_out: Option<bool>,
}

/// 단위계에 맞는 Area A 곡선 점 목록.
pub fn area_a_curve(table: &LookupTable, scale: TemperatureScale) -> Result<Vec<Point>, TableError> {
    let key = match scale {
        TemperatureScale::Fahrenheit => "area_a_curve_f",
        TemperatureScale::Celsius => "area_a_curve_c",
    };
    let y_path = [Key::from("t")];
    resolve_series(
        table,
        &[Key::from(key)],
        SeriesShape::RowArray {
            x_field: "c",
            y_path: &y_path,
        },
    )
}

/// 농도·온도가 Area A(곡선 아래)에 있는지.
///
/// 농도가 0~50% 밖이면 Area A가 아니다. 곡선 구간에 들지 않는 농도는 한계 온도를 0으로 본다.
pub fn is_in_area_a(concentration: f64, temperature: f64, curve: &[Point]) -> bool {
    if !(0.0..=AREA_A_MAX_CONCENTRATION).contains(&concentration) {
        return false;
    }
    let max_temp = curve
        .windows(2)
        .find(|w| concentration >= w[0].x && concentration <= w[1].x)
        .map(|w| {
            let (p1, p2) = (w[0], w[1]);
            if p2.x == p1.x {
                p1.y
            } else {
                p1.y + (concentration - p1.x) / (p2.x - p1.x) * (p2.y - p1.y)
            }
        })
        .unwrap_or(0.0);
    temperature <= max_temp
}

/// 가성 균열 감수성 판정 흐름.
pub fn assess_caustic(input: &CausticInput, curve: &[Point]) -> Result<SusceptibilityAssessment, CalcError> {
    const MECH: &str = "caustic";
    if let Some(decided) = SusceptibilityAssessment::from_cracks(&input.cracks, MECH)? {
        return Ok(decided);
    }
    let stress_relieved = input
        .stress_relieved
        .ok_or_else(|| undetermined(MECH, "stress_relieved"))?;
    if stress_relieved {
        return Ok(SusceptibilityAssessment {
            base: Some(Susceptibility::None),
            susceptibility: Susceptibility::None,
            notes: vec!["응력제거 열처리됨".into()],
        });
    }

    let conc = input
        .naoh_concentration
        .filter(|c| c.is_finite())
        .ok_or_else(|| undetermined(MECH, "naoh_concentration"))?;
    let temp = input
        .temperature
        .filter(|t| t.is_finite())
        .ok_or_else(|| undetermined(MECH, "temperature"))?;
    let area_a = is_in_area_a(conc, temp, curve);
    let low_conc = conc < LOW_CONCENTRATION;

    let heat_traced = || input.heat_traced.ok_or_else(|| undetermined(MECH, "heat_traced"));
    let steamed_out = || input.steamed_out.ok_or_else(|| undetermined(MECH, "steamed_out"));

    let result = match (area_a, low_conc) {
        (false, true) => Susceptibility::Medium,
        (true, true) => {
            if heat_traced()? {
                Susceptibility::Medium
            } else if steamed_out()? {
                Susceptibility::Low
            } else {
                Susceptibility::None
            }
        }
        (true, false) => {
            if heat_traced()? {
                Susceptibility::High
            } else if steamed_out()? {
                Susceptibility::Medium
            } else {
                Susceptibility::None
            }
        }
        (false, false) => {
            if heat_traced()? {
                Susceptibility::High
            } else if steamed_out()? {
                Susceptibility::Medium
            } else {
                Susceptibility::High
            }
        }
    };
    let area_note = if area_a { "Area A" } else { "Area A 밖" };
    Ok(SusceptibilityAssessment {
        base: Some(result),
        susceptibility: result,
        notes: vec![format!("NaOH {conc}%, 온도 {temp}: {area_note}")],
    })
}
