//! 응력부식균열(SCC) 손상계수 계산 모듈.
//! 메커니즘별 감수성 판정(가성, 아민, SSC, 알칼리 탄산염, 폴리티온산, 염화물,
//! HF 수소응력균열, HF 환경 HIC/SOHIC)과
//! 감수성 → SVI → 기본 DF → 경년 보정 파이프라인으로 구성한다.

pub mod acscc;
pub mod amine;
pub mod caustic;
pub mod clscc;
pub mod hic_hf;
pub mod hsc_hf;
pub mod pascc;
pub mod pipeline;
pub mod severity;
pub mod ssc;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CalcError;

/// 감수성 등급.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Susceptibility {
    None,
    Low,
    Medium,
    High,
    /// 균열이 남아 있어 FFS 평가가 필요함
    FfsRequired,
}

impl Susceptibility {
    pub fn table_key(self) -> &'static str {
        match self {
            Susceptibility::None => "None",
            Susceptibility::Low => "Low",
            Susceptibility::Medium => "Medium",
            Susceptibility::High => "High",
            Susceptibility::FfsRequired => "FFS Required",
        }
    }

    /// 심각도 지수(SVI). FFS 대상은 None.
    pub fn severity_index(self) -> Option<u32> {
        match self {
            Susceptibility::None => Some(0),
            Susceptibility::Low => Some(50),
            Susceptibility::Medium => Some(500),
            Susceptibility::High => Some(5000),
            Susceptibility::FfsRequired => None,
        }
    }

    /// None/Low/Medium/High를 0..=3 단계로. FFS는 High와 같은 단계.
    pub(crate) fn level(self) -> u8 {
        match self {
            Susceptibility::None => 0,
            Susceptibility::Low => 1,
            Susceptibility::Medium => 2,
            Susceptibility::High | Susceptibility::FfsRequired => 3,
        }
    }

    pub(crate) fn from_level(level: i32) -> Self {
        match level {
            i32::MIN..=0 => Susceptibility::None,
            1 => Susceptibility::Low,
            2 => Susceptibility::Medium,
            _ => Susceptibility::High,
        }
    }
}

impl fmt::Display for Susceptibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_key())
    }
}

impl FromStr for Susceptibility {
    type Err = String;

    /// 테이블 결과 문자열을 해석한다. `"Not Susceptible"`은 None, `"Moderate"`는 Medium.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        let lower = t.to_ascii_lowercase();
        if lower.starts_with("ffs") {
            Ok(Susceptibility::FfsRequired)
        } else if lower.starts_with("high") {
            Ok(Susceptibility::High)
        } else if lower.starts_with("medium") || lower.starts_with("moderate") {
            Ok(Susceptibility::Medium)
        } else if lower.starts_with("low") {
            Ok(Susceptibility::Low)
        } else if lower.starts_with("none") || lower.starts_with("not") {
            Ok(Susceptibility::None)
        } else {
            Err(format!("알 수 없는 감수성: {t}"))
        }
    }
}

/// 균열 관찰 이력. 균열이 있으면 테이블 판정보다 우선한다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrackHistory {
    #[serde(default)]
    pub present: bool,
    /// 발견된 균열을 제거했는지. 균열이 있을 때만 의미가 있다.
    #[serde(default)]
    pub removed: Option<bool>,
}

impl CrackHistory {
    pub const fn none() -> Self {
        Self {
            present: false,
            removed: None,
        }
    }

    /// 균열이 있으면 제거 여부에 따라 High 또는 FFS. 균열이 없으면 `Ok(None)`.
    pub fn override_susceptibility(&self, mechanism: &'static str) -> Result<Option<Susceptibility>, CalcError> {
        if !self.present {
            return Ok(None);
        }
        match self.removed {
            Some(true) => Ok(Some(Susceptibility::High)),
            Some(false) => Ok(Some(Susceptibility::FfsRequired)),
            None => Err(undetermined(mechanism, "cracks_removed")),
        }
    }
}

/// 감수성 판정 결과. 테이블 판정과 균열 보정 후 최종값을 함께 보관한다.
#[derive(Debug, Clone, Serialize)]
pub struct SusceptibilityAssessment {
    /// 균열 보정 전 판정. 균열 경로로 바로 결정된 경우 None.
    pub base: Option<Susceptibility>,
    pub susceptibility: Susceptibility,
    pub notes: Vec<String>,
}

impl SusceptibilityAssessment {
    /// 균열 이력만으로 결정되면 그 판정. 다른 입력은 보지 않는다.
    pub(crate) fn from_cracks(cracks: &CrackHistory, mechanism: &'static str) -> Result<Option<Self>, CalcError> {
        Ok(cracks.override_susceptibility(mechanism)?.map(|s| Self {
            base: None,
            susceptibility: s,
            notes: vec!["균열 이력으로 판정".into()],
        }))
    }

    pub(crate) fn settled(result: Susceptibility, note: impl Into<String>) -> Self {
        Self {
            base: Some(result),
            susceptibility: result,
            notes: vec![note.into()],
        }
    }

    pub(crate) fn decided(base: Susceptibility, cracks: &CrackHistory, mechanism: &'static str) -> Result<Self, CalcError> {
        let mut notes = Vec::new();
        let susceptibility = match cracks.override_susceptibility(mechanism)? {
            Some(s) => {
                notes.push(format!("균열 이력으로 {base} → {s}"));
                s
            }
            None => base,
        };
        Ok(Self {
            base: Some(base),
            susceptibility,
            notes,
        })
    }
}

/// 판정에 필요한 입력이 없어 결론을 낼 수 없을 때.
pub(crate) fn undetermined(mechanism: &'static str, missing: &'static str) -> CalcError {
    warn!(mechanism, missing, "감수성 판정 불가");
    CalcError::Undetermined(missing)
}
