use serde::{Deserialize, Serialize};

use crate::error::{require, CalcError, TableError};
use crate::interpolation::{BoundaryPolicy, RangeFlag};
use crate::tables::{resolve_grid, value_as_f64, Key, LookupTable};
use crate::units::TemperatureScale;

/// 온도·pH별 기본 부식률 (`{"temperature_in_f": {"<T>": {"<pH>": rate}}}`)
pub const BASE_RATE_TABLE: &str = "table_2b102";
/// 산소 보정계수 (`{"adjustment_factor": [<50ppb, >=50ppb]}`)
pub const OXYGEN_TABLE: &str = "table_2b103";

/// 탄소강이 아닌 재질에 적용하는 기본 부식률
pub const DEFAULT_NON_CARBON_RATE: f64 = 2.0;
/// 산소 보정이 "유의"로 바뀌는 농도(ppb)
pub const OXYGEN_THRESHOLD_PPB: f64 = 50.0;

/// 산성 사워워터 부식 입력.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourWaterInput {
    pub scale: TemperatureScale,
    pub carbon_steel: bool,
    /// 클래딩이 있으면 클래딩 재질이 탄소강인지
    #[serde(default)]
    pub cladding_carbon_steel: Option<bool>,
    pub ph: f64,
    pub temperature: f64,
    pub oxygen_ppb: f64,
    /// 유속 (°F 테이블이면 ft/s, °C 테이블이면 m/s)
    pub velocity: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourWaterResult {
    pub base_rate: f64,
    pub base_rate_flag: RangeFlag,
    pub oxygen_factor: f64,
    pub velocity_factor: f64,
    pub base_metal_rate: f64,
    pub cladding_rate: Option<f64>,
    pub unit: &'static str,
    pub warnings: Vec<String>,
}

/// 유속 보정계수 Fv.
pub fn velocity_factor(scale: TemperatureScale, velocity: f64) -> f64 {
    let (low, high, slope) = match scale {
        TemperatureScale::Fahrenheit => (6.0, 20.0, 0.25),
        TemperatureScale::Celsius => (1.83, 6.10, 0.82),
    };
    if velocity < low {
        1.0
    } else if velocity <= high {
        slope * velocity - 0.5
    } else {
        5.0
    }
}

/// 산소 보정계수 Fo.
pub fn oxygen_factor(table: &LookupTable, oxygen_ppb: f64) -> Result<f64, TableError> {
    let idx = usize::from(oxygen_ppb >= OXYGEN_THRESHOLD_PPB);
    table
        .walk(&[Key::from("adjustment_factor")])?
        .get(idx)
        .and_then(value_as_f64)
        .ok_or_else(|| TableError::missing_key(table.name(), format!("adjustment_factor[{idx}]")))
}

/// 온도별로 pH 보간(양방향 외삽, 0 하한) 후 온도 축은 아래 외삽·위 고정으로 보간한다.
pub fn base_rate(
    table: &LookupTable,
    scale: TemperatureScale,
    ph: f64,
    temperature: f64,
) -> Result<(f64, RangeFlag), TableError> {
    let res = resolve_grid(
        table,
        &[Key::from(scale.table_key())],
        temperature,
        ph,
        BoundaryPolicy::FloorBelowClampAbove,
        BoundaryPolicy::FloorAtZero,
    )?;
    Ok((res.value, res.flag))
}

pub fn compute_sour_water(
    input: &SourWaterInput,
    base_table: &LookupTable,
    oxygen_table: &LookupTable,
) -> Result<SourWaterResult, CalcError> {
    let mut warnings = Vec::new();
    let (base, flag) = base_rate(
        base_table,
        input.scale,
        require(input.ph, "ph")?,
        require(input.temperature, "temperature")?,
    )?;
    match flag {
        RangeFlag::ExtrapolatedBelow => warnings.push("온도가 테이블 최저값 미만: 외삽".into()),
        RangeFlag::ClampedAbove => warnings.push("온도가 테이블 최고값 초과: 마지막 값 사용".into()),
        _ => {}
    }
    let fo = oxygen_factor(oxygen_table, require(input.oxygen_ppb, "oxygen_ppb")?)?;
    let fv = velocity_factor(input.scale, require(input.velocity, "velocity")?);
    let calculated = base * fo * fv;

    let rate_for = |carbon: bool| if carbon { calculated } else { DEFAULT_NON_CARBON_RATE };
    Ok(SourWaterResult {
        base_rate: base,
        base_rate_flag: flag,
        oxygen_factor: fo,
        velocity_factor: fv,
        base_metal_rate: rate_for(input.carbon_steel),
        cladding_rate: input.cladding_carbon_steel.map(rate_for),
        unit: input.scale.rate_unit(),
        warnings,
    })
}
