use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::aging::pof_category;
use crate::bayes::{
    self, reliability_indices, structural_damage_factor, ConfidenceLevel, Posteriors,
};
use crate::error::{require, CalcError, TableError};
use crate::inspection::InspectionCounts;
use crate::interpolation::{BoundaryPolicy, RangeFlag};
use crate::tables::{resolve_value, Key, LookupTable, SeriesShape, TableStore};
use crate::units::TemperatureScale;

/// 기본 부식률 테이블 (`{"imperial"|"metric": {"data": [{temp, <driver>}]}}`)
pub const BASE_RATE_TABLE: &str = "table_2d_3_2";
/// 보온재 종류별 보정계수 테이블 (`{"data": [{type, factor}]}`)
pub const INSULATION_TABLE: &str = "table_2d_3_3";
/// 신뢰 수준별 사전확률
pub const PRIOR_TABLE: &str = "table_4_5";
/// 검사 범주별 조건부확률
pub const CONDITIONAL_TABLE: &str = "table_4_6";

/// 보온재 보정계수 F_INS 입력 방식.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InsulationFactor {
    /// 보온재 종류명으로 테이블 조회
    Type(String),
    /// 값을 직접 지정
    Factor(f64),
}

/// 도장 품질. 품질별 도장 유효 연수(Cage)를 가진다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CoatingQuality {
    None,
    Poor,
    Medium,
    High,
    Custom(f64),
}

impl CoatingQuality {
    pub fn effective_years(self) -> f64 {
        match self {
            CoatingQuality::None | CoatingQuality::Poor => 0.0,
            CoatingQuality::Medium => 5.0,
            CoatingQuality::High => 15.0,
            CoatingQuality::Custom(y) if y.is_finite() => y.max(0.0),
            CoatingQuality::Custom(_) => 0.0,
        }
    }
}

/// 도장 이력.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coating {
    pub quality: CoatingQuality,
    /// 도장 후 경과 연수 (age_coat)
    pub age_years: f64,
    /// 마지막 검사 시점에 이미 도장이 손상되었는지
    #[serde(default)]
    pub failed_at_inspection: bool,
}

/// 마지막 두께 검사 정보.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LastInspection {
    /// 측정된 금속 손실 (le)
    pub metal_loss: f64,
    /// 검사 후 경과 연수. 날짜 미상이면 None.
    #[serde(default)]
    pub years_since: Option<f64>,
}

/// 강재 외부부식(CUI 포함) 계산 입력.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalFerriticInput {
    pub scale: TemperatureScale,
    /// 부식 환경 구분(예: "marine", "temperate", "arid", "severe")
    pub driver: String,
    pub operating_temp: f64,
    /// 이미 산출된 감육 부식률이 있으면 테이블 조회를 생략한다.
    #[serde(default)]
    pub thinning_rate: Option<f64>,
    pub insulation: InsulationFactor,
    /// F_CM 복잡도
    pub complexity_factor: f64,
    /// F_IC 보온 상태
    pub insulation_condition_factor: f64,
    /// F_EQ 설비 설계
    pub equipment_design_factor: f64,
    /// F_IF 계면
    pub interface_factor: f64,
    /// 공칭 두께 t
    pub furnished_thickness: f64,
    /// 설치 후 전체 사용 연수
    pub service_age_years: f64,
    #[serde(default)]
    pub last_inspection: Option<LastInspection>,
    #[serde(default)]
    pub coating: Option<Coating>,
    pub yield_strength: f64,
    pub tensile_strength: f64,
    pub allowable_stress: f64,
    pub weld_joint_efficiency: f64,
    pub min_thickness: f64,
    #[serde(default)]
    pub inspections: InspectionCounts,
    pub confidence: ConfidenceLevel,
}

/// 단계별 중간값과 최종 손상계수.
#[derive(Debug, Clone, Serialize)]
pub struct ExternalFerriticResult {
    pub base_rate: f64,
    /// 테이블 조회를 했을 때의 범위 판정
    pub base_rate_flag: Option<RangeFlag>,
    pub insulation_factor: f64,
    pub corrosion_rate: f64,
    pub trde: f64,
    pub age_tke: f64,
    pub coating_years: f64,
    pub coating_adjustment: f64,
    pub age: f64,
    pub art: f64,
    pub flow_stress: f64,
    pub strength_ratio: f64,
    pub posteriors: Posteriors,
    pub betas: [f64; 3],
    pub damage_factor: f64,
    pub pof_category: u8,
    pub warnings: Vec<String>,
}

/// 계산에 필요한 테이블 묶음.
#[derive(Debug, Clone, Copy)]
pub struct ExternalFerriticTables<'a> {
    pub base_rates: &'a LookupTable,
    pub insulation: &'a LookupTable,
    pub priors: &'a LookupTable,
    pub conditionals: &'a LookupTable,
}

impl<'a> ExternalFerriticTables<'a> {
    pub const NAMES: [&'static str; 4] =
        [BASE_RATE_TABLE, INSULATION_TABLE, PRIOR_TABLE, CONDITIONAL_TABLE];

    /// 이미 로드된 저장소에서 테이블을 꺼낸다.
    pub fn from_store(store: &'a TableStore) -> Result<Self, TableError> {
        Ok(Self {
            base_rates: store.get(BASE_RATE_TABLE)?,
            insulation: store.get(INSULATION_TABLE)?,
            priors: store.get(PRIOR_TABLE)?,
            conditionals: store.get(CONDITIONAL_TABLE)?,
        })
    }
}

/// 온도와 부식 환경으로 기본 부식률 CrB를 구한다.
/// 최저 온도 아래는 외삽 후 0 하한, 최고 온도 위는 마지막 값으로 고정한다.
pub fn base_corrosion_rate(
    table: &LookupTable,
    scale: TemperatureScale,
    driver: &str,
    temp: f64,
) -> Result<(f64, RangeFlag), CalcError> {
    let y_path = [Key::exact(driver)];
    let shape = SeriesShape::RowArray {
        x_field: "temp",
        y_path: &y_path,
    };
    let path = [Key::from(scale.dataset_key()), Key::from("data")];
    let res = resolve_value(table, &path, shape, temp, BoundaryPolicy::FloorBelowClampAbove)?;
    Ok((res.value, res.flag))
}

/// 보온재 종류명으로 F_INS를 찾는다.
pub fn insulation_factor(table: &LookupTable, insulation_type: &str) -> Result<f64, TableError> {
    let rows = table
        .walk(&[Key::from("data")])?
        .as_array()
        .ok_or_else(|| TableError::shape(table.name(), "data가 배열이 아님"))?;
    rows.iter()
        .find(|row| row.get("type").and_then(Value::as_str) == Some(insulation_type))
        .and_then(|row| row.get("factor"))
        .and_then(crate::tables::value_as_f64)
        .ok_or_else(|| TableError::missing_key(table.name(), insulation_type))
}

/// `finalCr = crB * fIns * fCm * fIc * max(fEq, fIf)`
pub fn final_corrosion_rate(cr_b: f64, f_ins: f64, f_cm: f64, f_ic: f64, f_eq: f64, f_if: f64) -> f64 {
    cr_b * f_ins * f_cm * f_ic * f_eq.max(f_if)
}

/// 마지막 검사 기준 두께. 검사가 없으면 공칭 두께.
pub fn thickness_reading(furnished: f64, inspection: Option<&LastInspection>) -> f64 {
    match inspection {
        Some(insp) => furnished - insp.metal_loss,
        None => furnished,
    }
}

/// 마지막 두께 측정 이후 연수. 검사가 없으면 전체 사용 연수.
pub fn age_since_reading(service_age: f64, inspection: Option<&LastInspection>) -> f64 {
    match inspection {
        Some(LastInspection {
            years_since: Some(y),
            ..
        }) => y.max(0.0),
        Some(_) => 0.0,
        None => service_age,
    }
}

/// 도장 보정 연수.
///
/// 검사가 도장 이전이면 `min(Cage, age_coat)`, 검사 시 이미 도장이 손상되었으면 0,
/// 그 외에는 `min(Cage, age_coat) - min(Cage, age_coat - age_tke)`.
pub fn coating_adjustment(age_tke: f64, age_coat: f64, cage: f64, coating_failed: bool) -> f64 {
    if age_tke >= age_coat {
        cage.min(age_coat)
    } else if coating_failed {
        0.0
    } else {
        cage.min(age_coat) - cage.min(age_coat - age_tke)
    }
}

/// `Art = cr * age / trde`, trde가 0이면 0.
pub fn metal_loss_ratio(cr: f64, age: f64, trde: f64) -> f64 {
    if trde == 0.0 {
        return 0.0;
    }
    (cr * age / trde).max(0.0)
}

/// `FS = ((YS + TS) / 2) * E * 1.1`, 0 이하이면 0.0001.
pub fn flow_stress(ys: f64, ts: f64, e: f64) -> f64 {
    let fs = (ys + ts) / 2.0 * e * 1.1;
    if fs <= 0.0 {
        0.0001
    } else {
        fs
    }
}

/// `SRp = (S * E / FS) * (tmin / trde)`
pub fn strength_ratio(s: f64, e: f64, fs: f64, tmin: f64, trde: f64) -> f64 {
    if fs == 0.0 || trde == 0.0 {
        return 0.0;
    }
    (s * e / fs * (tmin / trde)).max(0.0)
}

/// 외부부식 손상계수 18단계 계산.
pub fn calculate_external_ferritic_chain(
    input: &ExternalFerriticInput,
    tables: ExternalFerriticTables<'_>,
) -> Result<ExternalFerriticResult, CalcError> {
    let mut warnings = Vec::new();

    // 1~2단계: 기본 부식률
    let (base_rate, base_rate_flag) = match input.thinning_rate {
        Some(cr) => (require(cr, "thinning_rate")?, None),
        None => {
            let temp = require(input.operating_temp, "operating_temp")?;
            if input.driver.trim().is_empty() {
                return Err(CalcError::MissingInput("driver"));
            }
            let (rate, flag) =
                base_corrosion_rate(tables.base_rates, input.scale, &input.driver, temp)?;
            match flag {
                RangeFlag::ExtrapolatedBelow => {
                    warnings.push("운전온도가 테이블 최저값 미만: 외삽 후 0 하한 적용".into())
                }
                RangeFlag::ClampedAbove => {
                    warnings.push("운전온도가 테이블 최고값 초과: 마지막 값 사용".into())
                }
                _ => {}
            }
            (rate, Some(flag))
        }
    };

    // 3~4단계: 보정계수와 최종 부식률
    let f_ins = match &input.insulation {
        InsulationFactor::Type(name) => insulation_factor(tables.insulation, name)?,
        InsulationFactor::Factor(f) => require(*f, "insulation_factor")?,
    };
    let corrosion_rate = final_corrosion_rate(
        base_rate,
        f_ins,
        require(input.complexity_factor, "complexity_factor")?,
        require(input.insulation_condition_factor, "insulation_condition_factor")?,
        require(input.equipment_design_factor, "equipment_design_factor")?,
        require(input.interface_factor, "interface_factor")?,
    );

    // 5~6단계: 두께 기준과 경과 연수
    let inspection = input.last_inspection.as_ref();
    let trde = thickness_reading(require(input.furnished_thickness, "furnished_thickness")?, inspection);
    let age_tke = age_since_reading(require(input.service_age_years, "service_age_years")?, inspection);
    if trde <= 0.0 {
        warn!(trde, "두께 기준값이 0 이하: 손상계수를 정할 수 없음");
        return Err(CalcError::Undetermined("trde"));
    }

    // 7~9단계: 도장 보정
    let (coating_years, coating_adjustment) = match input.coating {
        Some(c) => {
            let cage = c.quality.effective_years();
            let age_coat = require(c.age_years, "coating.age_years")?;
            (cage, coating_adjustment(age_tke, age_coat, cage, c.failed_at_inspection))
        }
        None => (0.0, 0.0),
    };
    let age = (age_tke - coating_adjustment).max(0.0);

    // 10~12단계: 손실 비율, 유동응력, 강도비
    let art = metal_loss_ratio(corrosion_rate, age, trde);
    let e = require(input.weld_joint_efficiency, "weld_joint_efficiency")?;
    let fs = flow_stress(
        require(input.yield_strength, "yield_strength")?,
        require(input.tensile_strength, "tensile_strength")?,
        e,
    );
    let srp = strength_ratio(
        require(input.allowable_stress, "allowable_stress")?,
        e,
        fs,
        require(input.min_thickness, "min_thickness")?,
        trde,
    );

    // 13~16단계: 사후확률, β, 손상계수
    let priors = bayes::read_priors(tables.priors, input.confidence)?;
    let conditionals = bayes::read_conditionals(tables.conditionals)?;
    let posteriors = bayes::posteriors(input.inspections, priors, &conditionals);
    if posteriors.posterior.iter().all(|p| *p == 0.0) {
        warnings.push("가중 우도 합이 0: 사후확률을 0으로 처리".into());
    }
    let betas = reliability_indices(art, srp);
    let damage_factor = structural_damage_factor(posteriors.posterior, betas).max(0.0);
    debug!(art, srp, damage_factor, "외부부식 손상계수 계산");

    Ok(ExternalFerriticResult {
        base_rate,
        base_rate_flag,
        insulation_factor: f_ins,
        corrosion_rate,
        trde,
        age_tke,
        coating_years,
        coating_adjustment,
        age,
        art,
        flow_stress: fs,
        strength_ratio: srp,
        posteriors,
        betas,
        damage_factor,
        pof_category: pof_category(damage_factor),
        warnings,
    })
}
