//! 감육(thinning) 메커니즘별 부식률 계산 모듈을 모아둔다.
//! 외부부식(CUI), CO2, 산성·알칼리 사워워터, 불산, 염산, 고온 황화/나프텐산, 고온 H2S/H2,
//! 고온 산화, 황산, 아민, 토양측 부식으로 구성한다.

pub mod alkaline_sour_water;
pub mod amine;
pub mod co2;
pub mod external_ferritic;
pub mod hcl;
pub mod ht_h2s_h2;
pub mod ht_oxidation;
pub mod hydrofluoric;
pub mod naphthenic;
pub mod soil_side;
pub mod sour_water;
pub mod sulfuric;

use serde::Serialize;

use crate::interpolation::{InterpolationResult, RangeFlag};

/// 단일 테이블 조회형 메커니즘의 공통 결과.
#[derive(Debug, Clone, Serialize)]
pub struct RateResult {
    pub rate: f64,
    /// 테이블 보간 범위 판정. 범주 조회만 한 경우 None.
    pub flag: Option<RangeFlag>,
    pub unit: &'static str,
    pub warnings: Vec<String>,
}

/// 온도 축 보간 결과에 대한 경고 문구.
pub(crate) fn temperature_warning(res: &InterpolationResult, temp: f64) -> Option<String> {
    match res.flag {
        RangeFlag::ExtrapolatedBelow => Some(format!(
            "온도 {temp}가 테이블 최저값 {} 미만: 외삽 결과이며 0 하한 적용",
            res.lower.x
        )),
        RangeFlag::ClampedAbove => Some(format!(
            "온도 {temp}가 테이블 최고값 {} 초과: 최고값의 부식률 사용",
            res.upper.x
        )),
        _ => None,
    }
}
