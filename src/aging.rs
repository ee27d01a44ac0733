//! 손상계수 시효(aging) 보정과 메커니즘 간 지배 손상계수 결정.

use serde::{Deserialize, Serialize};

/// 모든 메커니즘에 공통인 시효 지수
pub const AGING_EXPONENT: f64 = 1.1;
/// 손상계수 상한
pub const MAX_DAMAGE_FACTOR: f64 = 5000.0;

/// `min(base * max(age, 1)^1.1, 5000)`
pub fn final_df(base_df: f64, age_years: f64) -> f64 {
    final_df_with(base_df, age_years, AGING_EXPONENT, MAX_DAMAGE_FACTOR)
}

/// 지수와 상한을 지정하는 시효 보정. 사용 연수는 1년 미만이면 1년으로 본다.
pub fn final_df_with(base_df: f64, age_years: f64, exponent: f64, cap: f64) -> f64 {
    let age = if age_years.is_finite() { age_years.max(1.0) } else { 1.0 };
    (base_df * age.powf(exponent)).min(cap)
}

/// 한 메커니즘의 식별자와 손상계수.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MechanismDf {
    pub id: String,
    pub df: f64,
}

impl MechanismDf {
    pub fn new(id: impl Into<String>, df: f64) -> Self {
        Self { id: id.into(), df }
    }
}

/// 합산 후 최대값 비교에 들어가는 메커니즘 쌍.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditivePair {
    pub first: String,
    pub second: String,
}

impl AdditivePair {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    fn contains(&self, id: &str) -> bool {
        self.first == id || self.second == id
    }
}

/// 기본 합산 쌍: 취성파괴 + 템퍼취화
pub fn default_additive_pairs() -> Vec<AdditivePair> {
    vec![AdditivePair::new("brittle_fracture", "temper_embrittlement")]
}

/// 지배 손상계수.
///
/// 합산 쌍의 두 메커니즘은 더한 값으로 최대값 비교에 참여하고,
/// 나머지 메커니즘은 각자 값으로 참여한다. 활성 메커니즘이 없으면 0.
pub fn governing_df(mechanisms: &[MechanismDf], pairs: &[AdditivePair]) -> f64 {
    let df_of = |id: &str| mechanisms.iter().find(|m| m.id == id).map(|m| m.df);

    let paired = pairs.iter().filter_map(|p| {
        match (df_of(&p.first), df_of(&p.second)) {
            (None, None) => None,
            (a, b) => Some(a.unwrap_or(0.0) + b.unwrap_or(0.0)),
        }
    });
    let single = mechanisms
        .iter()
        .filter(|m| !pairs.iter().any(|p| p.contains(&m.id)))
        .map(|m| m.df);

    paired.chain(single).fold(0.0, f64::max)
}

/// 손상계수에 따른 파손확률 범주(0~4). 보고용.
pub fn pof_category(df: f64) -> u8 {
    if df <= 0.0 {
        0
    } else if df < 10.0 {
        1
    } else if df < 100.0 {
        2
    } else if df < 1000.0 {
        3
    } else {
        4
    }
}
