use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{undetermined, CrackHistory, Susceptibility, SusceptibilityAssessment};
use crate::error::{require, CalcError, TableError};
use crate::tables::{value_as_f64, Key, LookupTable};

/// `{"susceptibility_map": {"effective_pwht": "None",
///   "ineffective_pwht": [{"ph_min", "ph_max", "co3_ranges": [{"max", "susc"}]}]}}`
pub const SUSCEPTIBILITY_TABLE: &str = "scc_acscc_susceptibility";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcsccInput {
    pub ph: f64,
    /// CO3 농도(ppmw)
    pub co3_ppmw: f64,
    /// 유효한 PWHT 여부
    pub pwht: bool,
    #[serde(default)]
    pub cracks: CrackHistory,
}

fn band_contains(band: &Value, key_min: &str, key_max: &str, v: f64, open_ended: bool) -> bool {
    let lo = band.get(key_min).and_then(value_as_f64);
    let hi = band.get(key_max).and_then(value_as_f64);
    match (lo, hi) {
        (Some(lo), _) if open_ended => v >= lo,
        (Some(lo), Some(hi)) => v >= lo && v < hi,
        _ => false,
    }
}

/// pH 구간 `[min, max)`(마지막 구간은 위가 열림) → CO3 구간(`co3 < max`, 마지막 구간은 나머지 전부).
pub fn table_susceptibility(table: &LookupTable, ph: f64, co3: f64, pwht: bool) -> Result<Susceptibility, CalcError> {
    let name = table.name();
    let map = table.walk(&[Key::from("susceptibility_map")])?;
    let text = if pwht {
        map.get("effective_pwht").and_then(Value::as_str)
    } else {
        let bands = map
            .get("ineffective_pwht")
            .and_then(Value::as_array)
            .ok_or_else(|| TableError::missing_key(name, "ineffective_pwht"))?;
        let last = bands.len().saturating_sub(1);
        let band = bands
            .iter()
            .enumerate()
            .find(|(i, b)| band_contains(b, "ph_min", "ph_max", ph, *i == last))
            .map(|(_, b)| b)
            .ok_or_else(|| TableError::missing_key(name, format!("pH {ph}")))?;
        let co3_ranges = band
            .get("co3_ranges")
            .and_then(Value::as_array)
            .ok_or_else(|| TableError::missing_key(name, "co3_ranges"))?;
        let last = co3_ranges.len().saturating_sub(1);
        co3_ranges
            .iter()
            .enumerate()
            .find(|(i, r)| {
                *i == last || r.get("max").and_then(value_as_f64).is_some_and(|max| co3 < max)
            })
            .and_then(|(_, r)| r.get("susc"))
            .and_then(Value::as_str)
    };
    text.and_then(|s| s.parse().ok())
        .ok_or_else(|| undetermined("acscc", "susceptibility_map"))
}

/// 알칼리 탄산염 응력부식균열 감수성.
pub fn assess_acscc(input: &AcsccInput, table: &LookupTable) -> Result<SusceptibilityAssessment, CalcError> {
    if let Some(decided) = SusceptibilityAssessment::from_cracks(&input.cracks, "acscc")? {
        return Ok(decided);
    }
    let ph = require(input.ph, "ph")?;
    let co3 = require(input.co3_ppmw, "co3_ppmw")?;
    if ph < 0.0 || co3 < 0.0 {
        return Err(CalcError::MissingInput(if ph < 0.0 { "ph" } else { "co3_ppmw" }));
    }
    let base = table_susceptibility(table, ph, co3, input.pwht)?;
    Ok(SusceptibilityAssessment {
        base: Some(base),
        susceptibility: base,
        notes: Vec::new(),
    })
}
