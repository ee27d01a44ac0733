use serde::{Deserialize, Serialize};
use tracing::info;

use super::severity::base_damage_factor;
use super::Susceptibility;
use crate::aging::{final_df_with, pof_category, MechanismDf, AGING_EXPONENT, MAX_DAMAGE_FACTOR};
use crate::error::{require, CalcError};
use crate::inspection::{promote, InspectionCounts, InspectionEffectiveness};
use crate::tables::LookupTable;

/// FFS 대상 감수성 처리 방식.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FfsPolicy {
    /// 파이프라인을 멈추고 DF를 내지 않는다.
    #[default]
    Halt,
    /// High로 보고 계속한다 (염화물 SCC).
    TreatAsHigh,
}

/// 경년 보정 상수와 FFS 처리 방식.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SccSettings {
    pub aging_exponent: f64,
    pub max_damage_factor: f64,
    pub ffs_policy: FfsPolicy,
    /// false면 기본 DF에 상한만 적용한다 (PASCC).
    pub escalate_with_age: bool,
    /// 온라인 모니터링 계수 F_OM. 경년 보정 후 DF를 이 값으로 나눈다.
    pub monitoring_factor: f64,
}

impl Default for SccSettings {
    fn default() -> Self {
        Self {
            aging_exponent: AGING_EXPONENT,
            max_damage_factor: MAX_DAMAGE_FACTOR,
            ffs_policy: FfsPolicy::Halt,
            escalate_with_age: true,
            monitoring_factor: 1.0,
        }
    }
}

impl SccSettings {
    pub fn with_ffs_policy(self, ffs_policy: FfsPolicy) -> Self {
        Self { ffs_policy, ..self }
    }

    pub fn without_aging(self) -> Self {
        Self {
            escalate_with_age: false,
            ..self
        }
    }

    pub fn with_monitoring_factor(self, monitoring_factor: f64) -> Self {
        Self {
            monitoring_factor,
            ..self
        }
    }

    /// 기본 DF → 최종 DF. `min(base * max(age, 1)^n / F_OM, 상한)`
    pub fn final_df(&self, base_df: f64, age_years: f64) -> Result<f64, CalcError> {
        let f_om = require(self.monitoring_factor, "monitoring_factor")?;
        if f_om <= 0.0 {
            return Err(CalcError::Undetermined("monitoring_factor"));
        }
        let aged = if self.escalate_with_age {
            final_df_with(base_df, age_years, self.aging_exponent, f64::INFINITY)
        } else {
            base_df
        };
        Ok((aged / f_om).min(self.max_damage_factor))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SccDamage {
    pub susceptibility: Susceptibility,
    /// FFS로 중단되면 None
    pub severity_index: Option<u32>,
    pub inspection: InspectionEffectiveness,
    pub base_df: Option<f64>,
    pub final_df: Option<f64>,
    pub pof_category: Option<u8>,
    pub ffs_required: bool,
}

/// 감수성 → SVI → 검사 유효도 → 기본 DF → 경년 보정.
pub fn assess_scc(
    susceptibility: Susceptibility,
    counts: InspectionCounts,
    age_years: f64,
    base_df_table: &LookupTable,
    settings: &SccSettings,
) -> Result<SccDamage, CalcError> {
    let inspection = promote(counts);
    let effective = match (susceptibility, settings.ffs_policy) {
        (Susceptibility::FfsRequired, FfsPolicy::TreatAsHigh) => Susceptibility::High,
        (s, _) => s,
    };
    let Some(svi) = effective.severity_index() else {
        info!("FFS 평가 대상: 손상계수 계산 중단");
        return Ok(SccDamage {
            susceptibility,
            severity_index: None,
            inspection,
            base_df: None,
            final_df: None,
            pof_category: None,
            ffs_required: true,
        });
    };

    let base = base_damage_factor(base_df_table, svi, inspection)?;
    let df = settings.final_df(base, age_years)?;
    Ok(SccDamage {
        susceptibility,
        severity_index: Some(svi),
        inspection,
        base_df: Some(base),
        final_df: Some(df),
        pof_category: Some(pof_category(df)),
        ffs_required: susceptibility == Susceptibility::FfsRequired,
    })
}

/// 활성 SCC 메커니즘 중 가장 큰 최종 DF. 활성 메커니즘이 없으면 0.
#[derive(Debug, Clone, Serialize)]
pub struct SccGoverning {
    /// 지배 메커니즘. 모두 0이거나 없으면 None.
    pub mechanism: Option<String>,
    pub final_df: f64,
    pub pof_category: u8,
}

pub fn governing_scc_df(mechanisms: &[MechanismDf]) -> SccGoverning {
    let best = mechanisms
        .iter()
        .filter(|m| m.df.is_finite() && m.df > 0.0)
        .fold(None::<&MechanismDf>, |best, m| match best {
            Some(b) if b.df >= m.df => Some(b),
            _ => Some(m),
        });
    let final_df = best.map_or(0.0, |m| m.df);
    SccGoverning {
        mechanism: best.map(|m| m.id.clone()),
        final_df,
        pof_category: pof_category(final_df),
    }
}
