//! 염산(HCl) 부식률.
//!
//! 탄소강·300 계열은 pH 행, 합금은 염화물 농도(wt%) 행에서 온도 축을 보간한다.
//! pH와 염화물 농도는 변환표로 서로 바꿀 수 있다.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{temperature_warning, RateResult};
use crate::error::{require, CalcError, TableError};
use crate::interpolation::BoundaryPolicy;
use crate::tables::{nearest_key, resolve_value, value_as_f64, Key, LookupTable, SeriesShape};
use crate::units::TemperatureScale;

/// 염화물 농도 구간과 pH (`{"ci_concentration": [[lo, hi], ..], "ph": [..]}`)
pub const CHLORIDE_PH_TABLE: &str = "table_2b22";
/// 탄소강 (`{"temperature in f°": {"<pH>": {"<T>": rate}}}`)
pub const CARBON_STEEL_TABLE: &str = "table_2b23";
/// 300 계열 스테인리스강, 탄소강과 같은 형식
pub const SERIES_300_TABLE: &str = "table_2b24";
/// 합금 (`{"temperature in f°": [{"alloy", "cl_concentration", "temperature": {"<T>": rate}}]}`)
pub const ALLOY_TABLE: &str = "table_2b25";
/// 니켈 합금 (`{"temperature in f°": [{"alloy", "temperature": {"<T>": {"oxygen", "no_oxygen"}}}]}`)
pub const NICKEL_ALLOY_TABLE: &str = "table_2b26";

/// 염화물 농도로 pH를 구할 수 있는 범위(ppm)
pub const CHLORIDE_PPM_RANGE: (f64, f64) = (1.0, 12_000.0);
/// pH로 염화물 농도를 구할 수 있는 범위
pub const PH_RANGE: (f64, f64) = (0.5, 5.0);
/// 합금 테이블의 염화물 농도 행(wt%)
pub const ALLOY_CHLORIDE_ROWS: [f64; 3] = [0.5, 0.75, 1.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HclMaterial {
    CarbonSteel,
    Series300,
    Alloy { alloy: String },
    NickelAlloy { alloy: String, oxidants_present: bool },
}

impl HclMaterial {
    pub fn table_name(&self) -> &'static str {
        match self {
            HclMaterial::CarbonSteel => CARBON_STEEL_TABLE,
            HclMaterial::Series300 => SERIES_300_TABLE,
            HclMaterial::Alloy { .. } => ALLOY_TABLE,
            HclMaterial::NickelAlloy { .. } => NICKEL_ALLOY_TABLE,
        }
    }
}

/// 탄소강·300 계열은 pH, 합금은 염화물 농도를 쓰고, 없으면 다른 쪽에서 환산한다.
/// 니켈 합금은 둘 다 필요 없다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HclInput {
    pub scale: TemperatureScale,
    pub material: HclMaterial,
    pub temperature: f64,
    #[serde(default)]
    pub ph: Option<f64>,
    #[serde(default)]
    pub chloride_ppm: Option<f64>,
}

fn unit_key(scale: TemperatureScale) -> &'static str {
    match scale {
        TemperatureScale::Fahrenheit => "temperature in f°",
        TemperatureScale::Celsius => "temperature in c°",
    }
}

/// `[(lo, hi)]` 염화물 구간과 pH 목록.
fn chloride_rows(table: &LookupTable) -> Result<Vec<((f64, f64), f64)>, TableError> {
    let name = table.name();
    let array = |key: &str| -> Result<&Vec<Value>, TableError> {
        table
            .walk(&[Key::from(key)])?
            .as_array()
            .ok_or_else(|| TableError::shape(name, format!("{key}가 배열이 아님")))
    };
    let ranges = array("ci_concentration")?;
    let phs = array("ph")?;
    Ok(ranges
        .iter()
        .zip(phs)
        .filter_map(|(r, ph)| {
            let lo = r.get(0).and_then(value_as_f64)?;
            let hi = r.get(1).and_then(value_as_f64)?;
            Some(((lo, hi), value_as_f64(ph)?))
        })
        .collect())
}

/// 염화물 농도(ppm)가 들어가는 구간의 pH.
pub fn ph_from_chloride(table: &LookupTable, chloride_ppm: f64) -> Result<f64, CalcError> {
    let (min, max) = CHLORIDE_PPM_RANGE;
    if !(min..=max).contains(&chloride_ppm) {
        return Err(CalcError::Undetermined("chloride_ppm"));
    }
    chloride_rows(table)?
        .into_iter()
        .find(|((lo, hi), _)| chloride_ppm >= *lo && chloride_ppm <= *hi)
        .map(|(_, ph)| ph)
        .ok_or_else(|| TableError::missing_key(table.name(), format!("Cl {chloride_ppm} ppm")).into())
}

/// pH에 해당하는 염화물 농도(ppm). 표의 pH 사이는 구간 중앙값을 선형 보간한다.
pub fn chloride_from_ph(table: &LookupTable, ph: f64) -> Result<f64, CalcError> {
    let (min, max) = PH_RANGE;
    if !(min..=max).contains(&ph) {
        return Err(CalcError::Undetermined("ph"));
    }
    let rows = chloride_rows(table)?;
    let mid = |(lo, hi): (f64, f64)| (lo + hi) / 2.0;
    for (i, (range, row_ph)) in rows.iter().enumerate() {
        if ph == *row_ph {
            return Ok(mid(*range));
        }
        if let Some((next_range, next_ph)) = rows.get(i + 1) {
            // pH 열은 오름차순·내림차순 어느 쪽이든 된다
            if (ph - row_ph) * (next_ph - ph) > 0.0 {
                let t = (ph - row_ph) / (next_ph - row_ph);
                return Ok(mid(*range) + t * (mid(*next_range) - mid(*range)));
            }
        }
    }
    Err(TableError::missing_key(table.name(), format!("pH {ph}")).into())
}

/// 합금 테이블 행에 맞춰 가장 가까운 염화물 농도(wt%).
pub fn alloy_chloride_row(chloride_ppm: f64) -> f64 {
    let wt = chloride_ppm / 10_000.0;
    ALLOY_CHLORIDE_ROWS
        .iter()
        .copied()
        .fold(ALLOY_CHLORIDE_ROWS[0], |best, row| {
            if (row - wt).abs() < (best - wt).abs() {
                row
            } else {
                best
            }
        })
}

/// 염산 부식률.
pub fn compute_hcl(
    input: &HclInput,
    chloride_table: &LookupTable,
    rate_table: &LookupTable,
) -> Result<RateResult, CalcError> {
    let temp = require(input.temperature, "temperature")?;
    let unit = Key::from(unit_key(input.scale));
    let mut warnings = Vec::new();

    let res = match &input.material {
        HclMaterial::CarbonSteel | HclMaterial::Series300 => {
            let ph = match (input.ph, input.chloride_ppm) {
                (Some(ph), _) => require(ph, "ph")?,
                (None, Some(cl)) => {
                    let ph = ph_from_chloride(chloride_table, require(cl, "chloride_ppm")?)?;
                    warnings.push(format!("Cl {cl} ppm → pH {ph}"));
                    ph
                }
                (None, None) => return Err(CalcError::MissingInput("ph")),
            };
            let by_ph = rate_table.walk(&[unit.clone()])?;
            let row = by_ph
                .as_object()
                .and_then(|m| nearest_key(m, ph))
                .ok_or_else(|| TableError::missing_key(rate_table.name(), format!("~pH {ph}")))?
                .to_string();
            debug!(ph, row = %row, "염산 pH 행");
            resolve_value(
                rate_table,
                &[unit, Key::exact(row)],
                SeriesShape::KeyedMap,
                temp,
                BoundaryPolicy::FloorBelowClampAbove,
            )?
        }
        HclMaterial::Alloy { alloy } => {
            let chloride = match (input.chloride_ppm, input.ph) {
                (Some(cl), _) => require(cl, "chloride_ppm")?,
                (None, Some(ph)) => {
                    let cl = chloride_from_ph(chloride_table, require(ph, "ph")?)?;
                    warnings.push(format!("pH {ph} → Cl {cl:.0} ppm"));
                    cl
                }
                (None, None) => return Err(CalcError::MissingInput("chloride_ppm")),
            };
            let row = alloy_chloride_row(chloride);
            if (row * 10_000.0 - chloride).abs() > f64::EPSILON {
                warnings.push(format!("Cl {chloride:.0} ppm → 가장 가까운 {row} wt% 행 사용"));
            }
            let criteria = Key::Row(vec![
                ("alloy".to_string(), Key::exact(alloy.as_str())),
                ("cl_concentration".to_string(), Key::Numeric(row)),
            ]);
            resolve_value(
                rate_table,
                &[unit, criteria, Key::from("temperature")],
                SeriesShape::KeyedMap,
                temp,
                BoundaryPolicy::FloorBelowClampAbove,
            )?
        }
        HclMaterial::NickelAlloy { alloy, oxidants_present } => {
            let oxygen = [Key::from(if *oxidants_present { "oxygen" } else { "no_oxygen" })];
            resolve_value(
                rate_table,
                &[unit, Key::row("alloy", Key::exact(alloy.as_str())), Key::from("temperature")],
                SeriesShape::NestedByX { inner_path: &oxygen },
                temp,
                BoundaryPolicy::FloorBelowClampAbove,
            )?
        }
    };

    warnings.extend(temperature_warning(&res, temp));
    Ok(RateResult {
        rate: res.value,
        flag: Some(res.flag),
        unit: input.scale.rate_unit(),
        warnings,
    })
}
