use serde::{Deserialize, Serialize};

use super::{undetermined, CrackHistory, Susceptibility, SusceptibilityAssessment};
use crate::error::CalcError;
use crate::units::TemperatureScale;

/// MEA/DIPA: 이 온도(°F) 초과는 High
pub const MEA_HIGH_TEMP_F: f64 = 180.0;
/// DEA·기타 아민: 이 온도(°F) 초과 구간
pub const DEA_UPPER_TEMP_F: f64 = 180.0;
/// DEA·기타 아민: 이 온도(°F) 미만 구간
pub const DEA_LOWER_TEMP_F: f64 = 140.0;

/// 아민 응력부식균열 판정 입력. 필요한 항목만 순서대로 묻는다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmineSccInput {
    pub scale: TemperatureScale,
    #[serde(default)]
    pub cracks: CrackHistory,
    #[serde(default)]
    pub stress_relieved: Option<bool>,
    /// 희박(lean) 아민 노출 여부
    #[serde(default)]
    pub lean_amine: Option<bool>,
    /// MEA 또는 DIPA 여부
    #[serde(default)]
    pub mea_dipa: Option<bool>,
    /// MEA/DIPA가 아닐 때 DEA 여부
    #[serde(default)]
    pub dea: Option<bool>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub heat_traced: Option<bool>,
    #[serde(default)]
    pub steamed_out: Option<bool>,
}

/// 아민 응력부식균열 감수성.
///
/// 온도 경계는 °F 기준이며 섭씨 입력은 먼저 환산한다.
/// DEA가 아닌 아민의 140°F 미만 구간은 Not Susceptible로 본다.
pub fn assess_amine_scc(input: &AmineSccInput) -> Result<SusceptibilityAssessment, CalcError> {
    const MECH: &str = "amine_scc";
    if let Some(decided) = SusceptibilityAssessment::from_cracks(&input.cracks, MECH)? {
        return Ok(decided);
    }
    if input.stress_relieved.ok_or_else(|| undetermined(MECH, "stress_relieved"))? {
        return Ok(SusceptibilityAssessment::settled(Susceptibility::None, "응력제거 열처리됨"));
    }
    if !input.lean_amine.ok_or_else(|| undetermined(MECH, "lean_amine"))? {
        return Ok(SusceptibilityAssessment::settled(Susceptibility::None, "희박 아민 노출 없음"));
    }

    let mea_dipa = input.mea_dipa.ok_or_else(|| undetermined(MECH, "mea_dipa"))?;
    let dea = if mea_dipa {
        false
    } else {
        input.dea.ok_or_else(|| undetermined(MECH, "dea"))?
    };
    let temp = input
        .temperature
        .filter(|t| t.is_finite())
        .ok_or_else(|| undetermined(MECH, "temperature"))?;
    let temp_f = input.scale.to_fahrenheit(temp);

    let heat_traced = || input.heat_traced.ok_or_else(|| undetermined(MECH, "heat_traced"));
    let steamed_out = || input.steamed_out.ok_or_else(|| undetermined(MECH, "steamed_out"));
    // 보온 추적 또는 스팀 아웃이 있으면 `hot`, 둘 다 없으면 `cold`
    let traced_or_steamed = |hot: Susceptibility, cold: Susceptibility| -> Result<Susceptibility, CalcError> {
        if heat_traced()? || steamed_out()? {
            Ok(hot)
        } else {
            Ok(cold)
        }
    };

    let (result, amine) = if mea_dipa {
        let s = if temp_f > MEA_HIGH_TEMP_F {
            Susceptibility::High
        } else {
            traced_or_steamed(Susceptibility::Medium, Susceptibility::Low)?
        };
        (s, "MEA/DIPA")
    } else {
        let s = match (dea, temp_f) {
            (true, t) if t > DEA_UPPER_TEMP_F => Susceptibility::Medium,
            (false, t) if t > DEA_UPPER_TEMP_F => Susceptibility::Low,
            (true, t) if t >= DEA_LOWER_TEMP_F => Susceptibility::Low,
            (false, t) if t >= DEA_LOWER_TEMP_F => traced_or_steamed(Susceptibility::Low, Susceptibility::None)?,
            (true, _) => traced_or_steamed(Susceptibility::Low, Susceptibility::None)?,
            (false, _) => Susceptibility::None,
        };
        (s, if dea { "DEA" } else { "기타 아민" })
    };
    Ok(SusceptibilityAssessment::settled(
        result,
        format!("{amine}, {temp_f:.1}°F"),
    ))
}
