use serde::{Deserialize, Serialize};

use super::{temperature_warning, RateResult};
use crate::error::{require, CalcError};
use crate::interpolation::BoundaryPolicy;
use crate::tables::{resolve_value, Key, LookupTable, SeriesShape};
use crate::units::TemperatureScale;

/// 고온 H2S/H2 부식 대상 재질군. 재질군마다 테이블이 하나씩 있다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum H2sH2Material {
    /// 탄소강 ~ 3Cr-1Mo
    LowAlloy,
    Cr5Mo,
    Cr7,
    Cr9Mo,
    Cr12,
    /// 300 계열 스테인리스강
    Stainless,
}

impl H2sH2Material {
    /// `{"temperature_in_f": {"temperatures": [..], "data": {"<H2S mol%>": [..] | {"Naphtha": [..], "Gas oil": [..]}}}}`
    pub fn table_name(self) -> &'static str {
        match self {
            H2sH2Material::LowAlloy => "table_2b42",
            H2sH2Material::Cr5Mo => "table_2b43",
            H2sH2Material::Cr7 => "table_2b44",
            H2sH2Material::Cr9Mo => "table_2b45",
            H2sH2Material::Cr12 => "table_2b46",
            H2sH2Material::Stainless => "table_2b47",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hydrocarbon {
    Naphtha,
    GasOil,
}

impl Hydrocarbon {
    pub fn table_key(self) -> &'static str {
        match self {
            Hydrocarbon::Naphtha => "Naphtha",
            Hydrocarbon::GasOil => "Gas oil",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct H2sH2Input {
    pub scale: TemperatureScale,
    pub material: H2sH2Material,
    pub max_temperature: f64,
    /// H2S 농도(mol%). 테이블 키와 숫자로 일치해야 한다.
    pub h2s_mol_pct: f64,
    /// 탄화수소 종류. 테이블이 종류별로 나뉜 재질군에만 필요하다.
    #[serde(default)]
    pub hydrocarbon: Option<Hydrocarbon>,
}

/// 고온 H2S/H2 부식률. 온도 배열과 부식률 배열을 같은 위치끼리 묶어 보간한다.
pub fn compute_h2s_h2(input: &H2sH2Input, table: &LookupTable) -> Result<RateResult, CalcError> {
    let temp = require(input.max_temperature, "max_temperature")?;
    let h2s = Key::Numeric(require(input.h2s_mol_pct, "h2s_mol_pct")?);
    let unit = Key::from(input.scale.table_key());

    let mut y_path = vec![Key::from("data"), h2s];
    let split = table
        .walk(&[unit.clone(), y_path[0].clone(), y_path[1].clone()])?
        .is_object();
    if split {
        let hc = input.hydrocarbon.ok_or(CalcError::MissingInput("hydrocarbon"))?;
        y_path.push(Key::from(hc.table_key()));
    }

    let x_path = [Key::from("temperatures")];
    let res = resolve_value(
        table,
        &[unit],
        SeriesShape::ParallelArrays {
            x_path: &x_path,
            y_path: &y_path,
        },
        temp,
        BoundaryPolicy::FloorBelowClampAbove,
    )?;
    Ok(RateResult {
        rate: res.value,
        flag: Some(res.flag),
        unit: input.scale.rate_unit(),
        warnings: temperature_warning(&res, temp).into_iter().collect(),
    })
}
