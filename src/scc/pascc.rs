use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{undetermined, CrackHistory, Susceptibility, SusceptibilityAssessment};
use crate::error::{require, required, CalcError};
use crate::tables::{Key, LookupTable};
use crate::units::TemperatureScale;

/// 온도 구간별 재질 행.
/// `{"temperature_ranges": {"below_800F": {"materials": [{"material": .., "solution_annealed": "High", ..}]}}}`
pub const SUSCEPTIBILITY_TABLE: &str = "scc_pascc_susceptibility";

/// 이 온도(°F) 미만은 `below_800F` 구간
pub const RANGE_SPLIT_F: f64 = 800.0;

/// 열이력. 테이블 열 이름과 같다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThermalHistory {
    SolutionAnnealed,
    StabilizedBeforeWelding,
    StabilizedAfterWelding,
}

impl ThermalHistory {
    pub fn table_key(self) -> &'static str {
        match self {
            ThermalHistory::SolutionAnnealed => "solution_annealed",
            ThermalHistory::StabilizedBeforeWelding => "stabilized_before_welding",
            ThermalHistory::StabilizedAfterWelding => "stabilized_after_welding",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasccInput {
    pub scale: TemperatureScale,
    #[serde(default)]
    pub cracks: CrackHistory,
    /// 운전 중 황화물·수분·산소 노출
    #[serde(default)]
    pub exposed_in_operation: Option<bool>,
    /// 정지 중 노출
    #[serde(default)]
    pub exposed_in_shutdown: Option<bool>,
    #[serde(default)]
    pub max_temperature: Option<f64>,
    /// 테이블 `material` 값
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub thermal_history: Option<ThermalHistory>,
    /// 정지 중 보호 조치(NACE SP0170 등)
    #[serde(default)]
    pub downtime_protection: bool,
}

/// 정지 중 보호 조치로 한 단계 낮춘다. None은 그대로.
pub fn downtime_reduction(s: Susceptibility) -> Susceptibility {
    Susceptibility::from_level(i32::from(s.level()) - 1)
}

/// 온도 구간·재질·열이력으로 테이블 감수성을 읽는다. 해당 칸이 null이면 적용 불가.
pub fn table_susceptibility(
    table: &LookupTable,
    temp_f: f64,
    material: &str,
    history: ThermalHistory,
) -> Result<Susceptibility, CalcError> {
    let range = if temp_f < RANGE_SPLIT_F { "below_800F" } else { "above_800F" };
    let row = table.walk(&[
        Key::from("temperature_ranges"),
        Key::from(range),
        Key::from("materials"),
        Key::row("material", Key::exact(material)),
    ])?;
    row.get(history.table_key())
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| undetermined("pascc", "thermal_history"))
}

/// 폴리티온산 응력부식균열 감수성. 최종 DF에는 경년 보정을 하지 않는다.
pub fn assess_pascc(input: &PasccInput, table: &LookupTable) -> Result<SusceptibilityAssessment, CalcError> {
    const MECH: &str = "pascc";
    if let Some(decided) = SusceptibilityAssessment::from_cracks(&input.cracks, MECH)? {
        return Ok(decided);
    }
    let in_operation = input
        .exposed_in_operation
        .ok_or_else(|| undetermined(MECH, "exposed_in_operation"))?;
    if !in_operation && !input.exposed_in_shutdown.ok_or_else(|| undetermined(MECH, "exposed_in_shutdown"))? {
        return Ok(SusceptibilityAssessment::settled(
            Susceptibility::None,
            "운전·정지 중 황화물/수분/산소 노출 없음",
        ));
    }

    let temp_f = input
        .scale
        .to_fahrenheit(require(required(input.max_temperature, "max_temperature")?, "max_temperature")?);
    if input.material.trim().is_empty() {
        return Err(CalcError::MissingInput("material"));
    }
    let history = input
        .thermal_history
        .ok_or_else(|| undetermined(MECH, "thermal_history"))?;
    let base = table_susceptibility(table, temp_f, &input.material, history)?;

    let mut notes = vec![format!("{}, {}, {temp_f:.0}°F", input.material, history.table_key())];
    let susceptibility = if input.downtime_protection {
        let reduced = downtime_reduction(base);
        notes.push(format!("정지 중 보호 조치로 {base} → {reduced}"));
        reduced
    } else {
        base
    };
    Ok(SusceptibilityAssessment {
        base: Some(base),
        susceptibility,
        notes,
    })
}
