//! 검사 유효도 범주와 검사 횟수.

use serde::{Deserialize, Serialize};

/// 검사 유효도 범주. A가 가장 높고 E는 유효 검사 없음.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EffectivenessCategory {
    A,
    B,
    C,
    D,
    E,
}

impl EffectivenessCategory {
    pub fn table_key(self) -> &'static str {
        match self {
            EffectivenessCategory::A => "A",
            EffectivenessCategory::B => "B",
            EffectivenessCategory::C => "C",
            EffectivenessCategory::D => "D",
            EffectivenessCategory::E => "E",
        }
    }
}

/// 범주별 검사 횟수.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionCounts {
    #[serde(default)]
    pub a: u32,
    #[serde(default)]
    pub b: u32,
    #[serde(default)]
    pub c: u32,
    #[serde(default)]
    pub d: u32,
}

impl InspectionCounts {
    pub const fn new(a: u32, b: u32, c: u32, d: u32) -> Self {
        Self { a, b, c, d }
    }

    /// A, B, C, D 순서의 배열
    pub fn as_array(&self) -> [u32; 4] {
        [self.a, self.b, self.c, self.d]
    }
}

/// 승격 후 최종 검사 유효도.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionEffectiveness {
    pub category: EffectivenessCategory,
    pub count: u32,
}

/// 하위 범주 검사 2회를 상위 범주 1회로 승격한다 (D→C→B→A).
///
/// 승격 후 0이 아닌 가장 높은 범주와 그 횟수를 반환하고, 모두 0이면 (E, 0).
pub fn promote(counts: InspectionCounts) -> InspectionEffectiveness {
    let InspectionCounts {
        mut a,
        mut b,
        mut c,
        d,
    } = counts;
    c += d / 2;
    b += c / 2;
    c %= 2;
    a += b / 2;
    b %= 2;

    let tiers = [
        (EffectivenessCategory::A, a),
        (EffectivenessCategory::B, b),
        (EffectivenessCategory::C, c),
        (EffectivenessCategory::D, d % 2),
    ];
    tiers
        .into_iter()
        .find(|(_, n)| *n > 0)
        .map(|(category, count)| InspectionEffectiveness { category, count })
        .unwrap_or(InspectionEffectiveness {
            category: EffectivenessCategory::E,
            count: 0,
        })
}
