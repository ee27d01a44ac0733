use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{undetermined, CrackHistory, Susceptibility, SusceptibilityAssessment};
use crate::error::{require, CalcError, TableError};
use crate::tables::{value_as_f64, Key, LookupTable};

/// pH 행 × H2S 열 환경 심각도 (`[{"ph_min", "ph_max", "severity": [5개]}]`)
pub const ENVIRONMENTAL_SEVERITY_TABLE: &str = "scc_ssc_environmental_severity";
/// 환경 심각도 × PWHT별 경도 구간 (`{"<severity>": {"<pwht>": [{"min"?, "max"?, "result"}]}}`)
pub const SUSCEPTIBILITY_TABLE: &str = "scc_ssc_susceptibility";

/// H2S 농도(ppmw) 열 경계. `≤1`, `≤50`, `≤1000`, `≤10000`, 그 이상.
pub const H2S_COLUMN_LIMITS: [f64; 4] = [1.0, 50.0, 1000.0, 10000.0];

/// 용접부 열처리 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PwhtCondition {
    AsWelded,
    Pwht,
}

impl PwhtCondition {
    pub fn table_key(self) -> &'static str {
        match self {
            PwhtCondition::AsWelded => "As-Welded",
            PwhtCondition::Pwht => "PWHT",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SscInput {
    pub ph: f64,
    pub h2s_ppmw: f64,
    /// 최대 브리넬 경도
    pub brinell_hardness: f64,
    pub pwht: PwhtCondition,
    #[serde(default)]
    pub cracks: CrackHistory,
}

#[derive(Debug, Clone, Serialize)]
pub struct SscAssessment {
    pub environmental_severity: String,
    pub assessment: SusceptibilityAssessment,
}

pub fn h2s_column(h2s_ppmw: f64) -> usize {
    H2S_COLUMN_LIMITS
        .iter()
        .position(|limit| h2s_ppmw <= *limit)
        .unwrap_or(H2S_COLUMN_LIMITS.len())
}

/// pH 행과 H2S 열로 환경 심각도 문자열을 찾는다.
pub fn environmental_severity(table: &LookupTable, ph: f64, h2s_ppmw: f64) -> Result<String, TableError> {
    let rows = table
        .root()
        .as_array()
        .ok_or_else(|| TableError::shape(table.name(), "행 배열이 아님"))?;
    let row = rows
        .iter()
        .find(|r| {
            let lo = r.get("ph_min").and_then(value_as_f64);
            let hi = r.get("ph_max").and_then(value_as_f64);
            matches!((lo, hi), (Some(lo), Some(hi)) if ph >= lo && ph <= hi)
        })
        .ok_or_else(|| TableError::missing_key(table.name(), format!("pH {ph}")))?;
    let col = h2s_column(h2s_ppmw);
    row.get("severity")
        .and_then(|s| s.get(col))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| TableError::missing_key(table.name(), format!("severity[{col}]")))
}

/// 경도 구간 행이 경도 값을 포함하는지. min만 있으면 초과, max만 있으면 이하, 둘 다면 닫힌 구간.
fn hardness_matches(row: &Value, hardness: f64) -> bool {
    let min = row.get("min").and_then(value_as_f64);
    let max = row.get("max").and_then(value_as_f64);
    match (min, max) {
        (None, Some(max)) => hardness <= max,
        (Some(min), None) => hardness > min,
        (Some(min), Some(max)) => hardness >= min && hardness <= max,
        (None, None) => false,
    }
}

/// 황화물 응력균열 감수성.
pub fn assess_ssc(
    input: &SscInput,
    severity_table: &LookupTable,
    susceptibility_table: &LookupTable,
) -> Result<SscAssessment, CalcError> {
    const MECH: &str = "ssc";
    let ph = require(input.ph, "ph")?;
    let h2s = require(input.h2s_ppmw, "h2s_ppmw")?;
    let hardness = require(input.brinell_hardness, "brinell_hardness")?;

    let severity = environmental_severity(severity_table, ph, h2s)?;
    let ranges = susceptibility_table
        .walk(&[Key::exact(severity.as_str()), Key::from(input.pwht.table_key())])?
        .as_array()
        .ok_or_else(|| TableError::shape(susceptibility_table.name(), "경도 구간이 배열이 아님"))?;
    let base: Susceptibility = ranges
        .iter()
        .find(|r| hardness_matches(r, hardness))
        .and_then(|r| r.get("result"))
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| undetermined(MECH, "brinell_hardness"))?;

    let mut assessment = SusceptibilityAssessment::decided(base, &input.cracks, MECH)?;
    assessment
        .notes
        .insert(0, format!("환경 심각도 {severity}, 경도 {hardness} HB"));
    Ok(SscAssessment {
        environmental_severity: severity,
        assessment,
    })
}
