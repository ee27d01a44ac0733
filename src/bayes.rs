//! 베이즈 사후확률과 구조 신뢰도 기반 손상계수.
//!
//! 세 가지 손상 상태(1: 예상 수준, 2: 2배, 4: 4배)에 대해 사전확률과
//! 검사 범주별 조건부확률로 사후확률을 구하고, 신뢰도 지수 β와
//! 표준정규 누적분포 근사식으로 확률가중 손상계수를 계산한다.

use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::inspection::InspectionCounts;
use crate::tables::{Key, LookupTable};

/// 두께 손실 변동계수
pub const COV_DT: f64 = 0.20;
/// 유동응력 변동계수
pub const COV_SF: f64 = 0.20;
/// 압력 변동계수
pub const COV_P: f64 = 0.05;
/// 손상 상태 배수 Ds
pub const DAMAGE_STATES: [f64; 3] = [1.0, 2.0, 4.0];
/// 기준 파손확률
pub const BASELINE_POF: f64 = 1.56e-4;

/// 부식률 데이터 신뢰 수준.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    pub fn table_key(self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "Low",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::High => "High",
        }
    }
}

/// 검사 범주 A~D의 손상 상태별 조건부확률.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Conditionals {
    pub a: [f64; 3],
    pub b: [f64; 3],
    pub c: [f64; 3],
    pub d: [f64; 3],
}

/// 가중 우도 I와 정규화된 사후확률 po.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Posteriors {
    pub likelihood: [f64; 3],
    pub posterior: [f64; 3],
}

/// `I_k = prior_k * Π cond_X_k^n_X`, `po_k = I_k / ΣI`.
/// ΣI가 0이면 사후확률은 모두 0이다.
pub fn posteriors(counts: InspectionCounts, priors: [f64; 3], cond: &Conditionals) -> Posteriors {
    let n = counts.as_array();
    let rows = [cond.a, cond.b, cond.c, cond.d];
    let mut likelihood = [0.0; 3];
    for (k, item) in likelihood.iter_mut().enumerate() {
        *item = rows
            .iter()
            .zip(n)
            .fold(priors[k], |acc, (row, cnt)| acc * row[k].powi(cnt as i32));
    }
    let sum: f64 = likelihood.iter().sum();
    let posterior = if sum > 0.0 {
        likelihood.map(|i| i / sum)
    } else {
        [0.0; 3]
    };
    Posteriors {
        likelihood,
        posterior,
    }
}

/// `{p1, p2, p3}` 객체를 읽는다.
fn read_probs(table: &LookupTable, key: &str) -> Result<[f64; 3], TableError> {
    let mut out = [0.0; 3];
    for (i, field) in ["p1", "p2", "p3"].into_iter().enumerate() {
        out[i] = table.number(&[Key::from(key), Key::from(field)])?;
    }
    Ok(out)
}

/// 사전확률 테이블(`{"Low": {p1,p2,p3}, ...}`)에서 신뢰 수준의 값을 읽는다.
pub fn read_priors(table: &LookupTable, confidence: ConfidenceLevel) -> Result<[f64; 3], TableError> {
    read_probs(table, confidence.table_key())
}

/// 조건부확률 테이블(`{"A": {p1,p2,p3}, ... "D": ...}`)을 읽는다.
pub fn read_conditionals(table: &LookupTable) -> Result<Conditionals, TableError> {
    Ok(Conditionals {
        a: read_probs(table, "A")?,
        b: read_probs(table, "B")?,
        c: read_probs(table, "C")?,
        d: read_probs(table, "D")?,
    })
}

/// 신뢰도 지수 β. 분모가 0이면 0.
pub fn reliability_index(ds: f64, art: f64, srp: f64) -> f64 {
    let loss = ds * art;
    let num = 1.0 - loss - srp;
    let den = (loss.powi(2) * COV_DT.powi(2)
        + (1.0 - loss).powi(2) * COV_SF.powi(2)
        + srp.powi(2) * COV_P.powi(2))
    .sqrt();
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// 세 손상 상태의 β.
pub fn reliability_indices(art: f64, srp: f64) -> [f64; 3] {
    DAMAGE_STATES.map(|ds| reliability_index(ds, art, srp))
}

/// 표준정규 누적분포 Φ(x)의 다항 근사 (Zelen & Severo).
pub fn std_norm_cdf(x: f64) -> f64 {
    if x == 0.0 {
        return 0.5;
    }
    let t = 1.0 / (1.0 + 0.2316419 * x.abs());
    let d = 0.3989423 * (-x * x / 2.0).exp();
    let prob = d
        * t
        * (0.3193815 + t * (-0.3565638 + t * (1.781478 + t * (-1.821256 + t * 1.330274))));
    if x > 0.0 {
        1.0 - prob
    } else {
        prob
    }
}

/// `Df = Σ po_k Φ(-β_k) / 1.56e-4`
pub fn structural_damage_factor(posterior: [f64; 3], betas: [f64; 3]) -> f64 {
    let pof: f64 = posterior
        .iter()
        .zip(betas)
        .map(|(po, beta)| po * std_norm_cdf(-beta))
        .sum();
    pof / BASELINE_POF
}
