use serde::{Deserialize, Serialize};

use super::{undetermined, CrackHistory, Susceptibility, SusceptibilityAssessment};
use crate::error::CalcError;

/// 이 경도(HB) 이하는 PWHT와 무관하게 Low. 초과부터 238 미만까지는 PWHT가 없으면 Medium.
pub const LOW_HARDNESS_HB: f64 = 200.0;
/// 이 경도(HB) 이상은 PWHT와 무관하게 High
pub const HIGH_HARDNESS_HB: f64 = 238.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HscHfInput {
    #[serde(default)]
    pub cracks: CrackHistory,
    pub hf_present: bool,
    pub carbon_steel: bool,
    #[serde(default)]
    pub brinell_hardness: Option<f64>,
    #[serde(default)]
    pub pwht: bool,
}

/// 경도와 PWHT로 정하는 감수성.
pub fn hardness_susceptibility(hardness: f64, pwht: bool) -> Susceptibility {
    if hardness >= HIGH_HARDNESS_HB {
        Susceptibility::High
    } else if hardness > LOW_HARDNESS_HB && !pwht {
        Susceptibility::Medium
    } else {
        Susceptibility::Low
    }
}

/// 불산 환경의 수소응력균열 감수성.
pub fn assess_hsc_hf(input: &HscHfInput) -> Result<SusceptibilityAssessment, CalcError> {
    const MECH: &str = "hsc_hf";
    if let Some(decided) = SusceptibilityAssessment::from_cracks(&input.cracks, MECH)? {
        return Ok(decided);
    }
    let (result, note) = if !input.hf_present {
        (Susceptibility::None, "HF 없음".to_string())
    } else if !input.carbon_steel {
        (Susceptibility::None, "탄소강이 아님".to_string())
    } else {
        let hb = input
            .brinell_hardness
            .filter(|h| h.is_finite())
            .ok_or_else(|| undetermined(MECH, "brinell_hardness"))?;
        (
            hardness_susceptibility(hb, input.pwht),
            format!("브리넬 경도 {hb}, PWHT {}", if input.pwht { "있음" } else { "없음" }),
        )
    };
    Ok(SusceptibilityAssessment {
        base: Some(result),
        susceptibility: result,
        notes: vec![note],
    })
}
