use serde::{Deserialize, Serialize};

use super::{temperature_warning, RateResult};
use crate::error::{require, required, CalcError};
use crate::interpolation::BoundaryPolicy;
use crate::tables::{resolve_value, Key, LookupTable, SeriesShape};
use crate::units::TemperatureScale;

/// 황산 부식 대상 재질.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SulfuricMaterial {
    CarbonSteel,
    Ss304,
    Ss316,
    Alloy20,
    AlloyC276,
    AlloyB2,
}

impl SulfuricMaterial {
    /// 탄소강은 단위계별로 테이블이 나뉘고, 나머지는 한 테이블에 두 단위계가 들어 있다.
    pub fn table_name(self, scale: TemperatureScale) -> &'static str {
        match (self, scale) {
            (SulfuricMaterial::CarbonSteel, TemperatureScale::Fahrenheit) => "table_2b52",
            (SulfuricMaterial::CarbonSteel, TemperatureScale::Celsius) => "table_2b52M",
            (SulfuricMaterial::Ss304, _) => "table_2b53",
            (SulfuricMaterial::Ss316, _) => "table_2b54",
            (SulfuricMaterial::Alloy20, _) => "table_2b55",
            (SulfuricMaterial::AlloyC276, _) => "table_2b56",
            (SulfuricMaterial::AlloyB2, _) => "table_2b57",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SulfuricInput {
    pub scale: TemperatureScale,
    pub material: SulfuricMaterial,
    /// 산 농도(wt%). 테이블에 없는 농도면 가장 가까운 농도 행을 쓴다.
    pub acid_concentration: f64,
    pub max_temperature: f64,
    /// 산 유속. 테이블 열 키와 숫자로 일치해야 한다.
    pub velocity: f64,
    /// 산소 존재 여부
    #[serde(default)]
    pub oxygen_present: bool,
    /// Alloy B-2에 산소가 있을 때 전문가가 정한 부식률
    #[serde(default)]
    pub specialist_rate: Option<f64>,
}

/// 재질별 테이블 형식에 맞춰 온도 축 점 목록을 고르고 보간한다.
///
/// - 탄소강: `{"<농도>": [{"temperature": T, "acid_velocity": {"<v>": rate}}]}`
/// - 그 외: `{"temperature_in_f": {"<농도>": {"<T>": {"<v>": rate}}}}`
pub fn compute_sulfuric(input: &SulfuricInput, table: &LookupTable) -> Result<RateResult, CalcError> {
    if input.material == SulfuricMaterial::AlloyB2 && input.oxygen_present {
        let rate = require(required(input.specialist_rate, "specialist_rate")?, "specialist_rate")?;
        return Ok(RateResult {
            rate,
            flag: None,
            unit: input.scale.rate_unit(),
            warnings: vec!["Alloy B-2 + 산소: 전문가 지정 부식률 사용".into()],
        });
    }

    let temp = require(input.max_temperature, "max_temperature")?;
    let conc = Key::Nearest(require(input.acid_concentration, "acid_concentration")?);
    let velocity = [Key::Numeric(require(input.velocity, "velocity")?)];

    let res = match input.material {
        SulfuricMaterial::CarbonSteel => {
            let y_path = [Key::from("acid_velocity"), velocity[0].clone()];
            resolve_value(
                table,
                &[conc],
                SeriesShape::RowArray {
                    x_field: "temperature",
                    y_path: &y_path,
                },
                temp,
                BoundaryPolicy::FloorBelowClampAbove,
            )?
        }
        _ => resolve_value(
            table,
            &[Key::from(input.scale.table_key()), conc],
            SeriesShape::NestedByX {
                inner_path: &velocity,
            },
            temp,
            BoundaryPolicy::FloorBelowClampAbove,
        )?,
    };

    Ok(RateResult {
        rate: res.value,
        flag: Some(res.flag),
        unit: input.scale.rate_unit(),
        warnings: temperature_warning(&res, temp).into_iter().collect(),
    })
}
