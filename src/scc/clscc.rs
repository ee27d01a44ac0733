use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{undetermined, CrackHistory, Susceptibility, SusceptibilityAssessment};
use crate::error::{require, CalcError, TableError};
use crate::tables::{value_as_f64, Key, LookupTable};
use crate::units::TemperatureScale;

/// 온도 행 × pH 열 감수성 격자.
/// `{"ph_columns": [..], "rows_f": [{"min", "max"}], "rows_c": [..], "susceptibility_grid": [[..]]}`
pub const SUSCEPTIBILITY_TABLE: &str = "scc_clscc_susceptibility";

/// 이 pH 미만은 염화물 SCC가 아니라 염산 부식으로 본다.
pub const MIN_PH: f64 = 2.5;
/// 염화물 농도(ppm) 보정 경계
pub const LOW_CHLORIDE_PPM: f64 = 10.0;
pub const HIGH_CHLORIDE_PPM: f64 = 100.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClsccInput {
    pub scale: TemperatureScale,
    pub temperature: f64,
    pub ph: f64,
    pub chloride_ppm: f64,
    #[serde(default)]
    pub cracks: CrackHistory,
}

fn numbers(table: &LookupTable, key: &str) -> Result<Vec<f64>, TableError> {
    table
        .walk(&[Key::from(key)])?
        .as_array()
        .map(|a| a.iter().filter_map(value_as_f64).collect())
        .ok_or_else(|| TableError::shape(table.name(), format!("{key}가 배열이 아님")))
}

/// 가장 가까운 pH 열. 동률이면 앞쪽 열.
pub fn nearest_column(columns: &[f64], ph: f64) -> Option<usize> {
    columns
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, c)| {
            let d = (ph - c).abs();
            match best {
                Some((_, bd)) if bd <= d => best,
                _ => Some((i, d)),
            }
        })
        .map(|(i, _)| i)
}

/// `min < T ≤ max`인 온도 행. 해당 행이 없으면 마지막 행.
pub fn temperature_row(rows: &[Value], temp: f64) -> Option<usize> {
    rows.iter()
        .position(|r| {
            let lo = r.get("min").and_then(value_as_f64);
            let hi = r.get("max").and_then(value_as_f64);
            matches!((lo, hi), (Some(lo), Some(hi)) if temp > lo && temp <= hi)
        })
        .or_else(|| rows.len().checked_sub(1))
}

/// 염화물 농도 보정: 10 ppm 미만 한 단계 낮춤, 100 ppm 초과 한 단계 높임.
pub fn chloride_adjustment(base: Susceptibility, chloride_ppm: f64) -> (Susceptibility, Option<String>) {
    let mut level = i32::from(base.level());
    let note = if chloride_ppm < LOW_CHLORIDE_PPM {
        level -= 1;
        Some(format!("Cl < {LOW_CHLORIDE_PPM} ppm (-1)"))
    } else if chloride_ppm > HIGH_CHLORIDE_PPM {
        level += 1;
        Some(format!("Cl > {HIGH_CHLORIDE_PPM} ppm (+1)"))
    } else {
        None
    };
    (Susceptibility::from_level(level), note)
}

/// 염화물 응력부식균열 감수성.
pub fn assess_clscc(input: &ClsccInput, table: &LookupTable) -> Result<SusceptibilityAssessment, CalcError> {
    const MECH: &str = "clscc";
    if let Some(decided) = SusceptibilityAssessment::from_cracks(&input.cracks, MECH)? {
        return Ok(decided);
    }
    let temp = require(input.temperature, "temperature")?;
    let ph = require(input.ph, "ph")?;
    let chloride = require(input.chloride_ppm, "chloride_ppm")?;

    if ph < MIN_PH {
        return Ok(SusceptibilityAssessment {
            base: Some(Susceptibility::None),
            susceptibility: Susceptibility::None,
            notes: vec![format!("pH {ph} < {MIN_PH}: 염산 부식으로 평가")],
        });
    }

    let name = table.name();
    let columns = numbers(table, "ph_columns")?;
    let col = nearest_column(&columns, ph).ok_or_else(|| TableError::missing_key(name, "ph_columns"))?;
    let rows_key = match input.scale {
        TemperatureScale::Fahrenheit => "rows_f",
        TemperatureScale::Celsius => "rows_c",
    };
    let rows = table
        .walk(&[Key::from(rows_key)])?
        .as_array()
        .ok_or_else(|| TableError::shape(name, format!("{rows_key}가 배열이 아님")))?;
    let row = temperature_row(rows, temp).ok_or_else(|| TableError::missing_key(name, rows_key))?;
    debug!(row, col, "염화물 SCC 격자 위치");

    let base: Susceptibility = table
        .walk(&[Key::from("susceptibility_grid")])?
        .get(row)
        .and_then(|r| r.get(col))
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| undetermined(MECH, "susceptibility_grid"))?;

    let (adjusted, note) = chloride_adjustment(base, chloride);
    Ok(SusceptibilityAssessment {
        base: Some(base),
        susceptibility: adjusted,
        notes: note.into_iter().collect(),
    })
}
