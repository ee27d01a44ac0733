use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{undetermined, CrackHistory, Susceptibility, SusceptibilityAssessment};
use crate::error::{require, required, CalcError};
use crate::tables::{value_as_f64, Key, LookupTable};

/// 압연·용접 판재 감수성.
/// `{"sulfur_threshold": 0.01, "data": {"PWHT"|"No_PWHT": {"High_Sulfur": .., "Low_Sulfur": ..}}}`
pub const SUSCEPTIBILITY_TABLE: &str = "scc_hic_sohic_hf_susceptibility";
/// 온라인 모니터링 계수 (`{"factors": {"<방식>": F_OM}}`)
pub const MONITORING_TABLE: &str = "scc_hic_sohic_hf_online_monitoring";

/// 테이블에 기준값이 없을 때의 황 함량 경계(wt%)
pub const DEFAULT_SULFUR_THRESHOLD: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductForm {
    /// 이음매 없는(압출) 배관. 항상 Low.
    SeamlessPipe,
    /// 압연·용접 판재
    Plate,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HicHfInput {
    #[serde(default)]
    pub cracks: CrackHistory,
    pub hf_present: bool,
    pub carbon_steel: bool,
    #[serde(default)]
    pub product_form: Option<ProductForm>,
    #[serde(default)]
    pub pwht: bool,
    /// 황 함량(wt%). 판재일 때만 쓴다.
    #[serde(default)]
    pub sulfur_wt_pct: Option<f64>,
}

/// HF 환경 HIC/SOHIC 감수성.
pub fn assess_hic_hf(input: &HicHfInput, table: &LookupTable) -> Result<SusceptibilityAssessment, CalcError> {
    const MECH: &str = "hic_sohic_hf";
    if let Some(decided) = SusceptibilityAssessment::from_cracks(&input.cracks, MECH)? {
        return Ok(decided);
    }
    if !input.hf_present {
        return Ok(SusceptibilityAssessment::settled(Susceptibility::None, "HF 없음"));
    }
    if !input.carbon_steel {
        return Ok(SusceptibilityAssessment::settled(Susceptibility::None, "탄소강이 아님"));
    }
    match input.product_form.ok_or_else(|| undetermined(MECH, "product_form"))? {
        ProductForm::SeamlessPipe => Ok(SusceptibilityAssessment::settled(
            Susceptibility::Low,
            "이음매 없는 배관",
        )),
        ProductForm::Other => Ok(SusceptibilityAssessment::settled(
            Susceptibility::None,
            "판재·이음매 없는 배관이 아닌 제품 형태",
        )),
        ProductForm::Plate => {
            let sulfur = require(required(input.sulfur_wt_pct, "sulfur_wt_pct")?, "sulfur_wt_pct")?;
            let threshold = table
                .walk(&[Key::from("sulfur_threshold")])
                .ok()
                .and_then(value_as_f64)
                .unwrap_or(DEFAULT_SULFUR_THRESHOLD);
            let sulfur_key = if sulfur > threshold { "High_Sulfur" } else { "Low_Sulfur" };
            let pwht_key = if input.pwht { "PWHT" } else { "No_PWHT" };
            let result: Susceptibility = table
                .walk(&[Key::from("data"), Key::from(pwht_key), Key::from(sulfur_key)])?
                .as_str()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| undetermined(MECH, "susceptibility"))?;
            Ok(SusceptibilityAssessment::settled(
                result,
                format!("판재, {pwht_key}, 황 {sulfur}% ({sulfur_key})"),
            ))
        }
    }
}

/// 모니터링 방식별 F_OM. 방식이 없거나 표에 없으면 1.
pub fn monitoring_factor(table: &LookupTable, method: Option<&str>) -> Result<f64, CalcError> {
    let Some(method) = method else {
        return Ok(1.0);
    };
    let factors = table.walk(&[Key::from("factors")])?;
    match factors.get(method).and_then(value_as_f64) {
        Some(f) => Ok(f),
        None => {
            debug!(method, "모니터링 계수 없음: 1 사용");
            Ok(1.0)
        }
    }
}
