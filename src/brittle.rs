//! 취성파괴 계열 손상계수.
//!
//! 탄소강 취성파괴, 템퍼취화, 885°F 취화, 시그마상 취화를 계산하고
//! `max(취성 + 템퍼, 885, 시그마)` 규칙으로 지배 손상계수를 정한다.
//! 두께 × ΔT 기본 DF 표와 885/시그마 표는 내림차순으로 저장되어 있고 양끝에서 고정한다.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::aging::{governing_df, AdditivePair, MechanismDf};
use crate::error::{require, required, CalcError, TableError};
use crate::interpolation::{bilinear, interpolate_descending_clamped, BoundaryPolicy};
use crate::tables::{resolve_series, resolve_value, value_as_f64, Key, LookupTable, SeriesShape, TableStore};
use crate::units::TemperatureScale;

pub const BRITTLE_FRACTURE: &str = "brittle_fracture";
pub const TEMPER_EMBRITTLEMENT: &str = "temper_embrittlement";
pub const EMBRITTLEMENT_885: &str = "embrittlement_885";
pub const SIGMA_PHASE: &str = "sigma_phase";

/// 885°F 취화 DF 표 (`[{"temp_diff_f", "df"}]`, 내림차순)
pub const EMBRITTLEMENT_885_TABLE: &str = "brit885_damage_factor";
/// 시그마상 DF 표 (`[{"temp_f", "df_low", "df_medium", "df_high"}]`, 내림차순)
pub const SIGMA_TABLE: &str = "sigma_damage_factor";

/// 885°F 취화 기본 기준온도(°F)
pub const DEFAULT_885_TREF_F: f64 = 80.0;
/// 885°F 표 적용 범위 ±100°F 밖의 값
pub const EMBRITTLEMENT_885_ABOVE: f64 = 0.0;
pub const EMBRITTLEMENT_885_BELOW: f64 = 1381.0;
const EMBRITTLEMENT_885_SPAN: f64 = 100.0;

/// 면제곡선 기준온도 표 이름.
/// `{"carbon_steels"|"low_alloy_steels": [{"min_yield_strength", "curve_a".."curve_d"}]}`
pub fn reference_table_name(scale: TemperatureScale) -> &'static str {
    match scale {
        TemperatureScale::Fahrenheit => "table_2_e_3_3",
        TemperatureScale::Celsius => "table_2_e_3_3m",
    }
}

/// 두께 × ΔT 기본 DF 표 이름 (`{"thicknesses": [..], "rows": [{"delta_t", "values": [..]}]}`)
pub fn base_df_table_name(pwht: bool, scale: TemperatureScale) -> &'static str {
    match (pwht, scale) {
        (false, TemperatureScale::Fahrenheit) => "table_2_e_3_4",
        (false, TemperatureScale::Celsius) => "table_2_e_3_4m",
        (true, TemperatureScale::Fahrenheit) => "table_2_e_3_5",
        (true, TemperatureScale::Celsius) => "table_2_e_3_5m",
    }
}

/// ΔFATT 산정 방법.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DeltaFattMethod {
    /// 사용 연수와 SCE
    ServiceLife { sce: f64, service_years: f64 },
    /// J-factor 조성식
    JFactor { si: f64, mn: f64, p: f64, sn: f64 },
    /// X-bar 조성식
    XBar { p: f64, sb: f64, sn: f64, r#as: f64 },
    /// 제작 연도
    FabricationYear { year: i32 },
    /// 직접 입력
    Known { delta_fatt: f64 },
}

/// `0.67 (log10(years × 8760) - 0.91) SCE`
pub fn delta_fatt_service_life(sce: f64, service_years: f64) -> Result<f64, CalcError> {
    if !(service_years > 0.0) {
        return Err(CalcError::MissingInput("service_years"));
    }
    Ok(0.67 * ((service_years * 8760.0).log10() - 0.91) * sce)
}

/// `J = (Si + Mn)(P + Sn) × 10⁴`
pub fn j_factor(si: f64, mn: f64, p: f64, sn: f64) -> f64 {
    (si + mn) * (p + sn) * 10_000.0
}

pub fn delta_fatt_j_factor(si: f64, mn: f64, p: f64, sn: f64) -> f64 {
    let j = j_factor(si, mn, p, sn);
    -77.321 + 0.57570 * j - 0.00055147 * j * j
}

/// `X̄ = (10P + 5Sb + 4Sn + As) × 100`
pub fn x_bar(p: f64, sb: f64, sn: f64, as_: f64) -> f64 {
    (10.0 * p + 5.0 * sb + 4.0 * sn + as_) * 100.0
}

pub fn delta_fatt_x_bar(p: f64, sb: f64, sn: f64, as_: f64) -> f64 {
    let x = x_bar(p, sb, sn, as_);
    -87.335 + 11.437 * x - 0.1472 * x * x
}

pub fn delta_fatt_fabrication_year(year: i32) -> f64 {
    if year > 1988 {
        150.0
    } else if year >= 1981 {
        250.0
    } else if year >= 1973 {
        300.0
    } else {
        350.0
    }
}

impl DeltaFattMethod {
    pub fn delta_fatt(self) -> Result<f64, CalcError> {
        match self {
            DeltaFattMethod::ServiceLife { sce, service_years } => {
                delta_fatt_service_life(require(sce, "sce")?, require(service_years, "service_years")?)
            }
            DeltaFattMethod::JFactor { si, mn, p, sn } => Ok(delta_fatt_j_factor(si, mn, p, sn)),
            DeltaFattMethod::XBar { p, sb, sn, r#as } => Ok(delta_fatt_x_bar(p, sb, sn, r#as)),
            DeltaFattMethod::FabricationYear { year } => Ok(delta_fatt_fabrication_year(year)),
            DeltaFattMethod::Known { delta_fatt } => require(delta_fatt, "delta_fatt"),
        }
    }
}

/// 최소 가압 온도 `MPT = Tref + ΔFATT`
pub fn minimum_pressurization_temp(tref: f64, delta_fatt: f64) -> f64 {
    tref + delta_fatt
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SteelFamily {
    CarbonSteel,
    LowAlloySteel,
}

impl SteelFamily {
    pub fn table_key(self) -> &'static str {
        match self {
            SteelFamily::CarbonSteel => "carbon_steels",
            SteelFamily::LowAlloySteel => "low_alloy_steels",
        }
    }
}

/// ASME 면제곡선.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExemptionCurve {
    A,
    B,
    C,
    D,
}

impl ExemptionCurve {
    pub fn table_key(self) -> &'static str {
        match self {
            ExemptionCurve::A => "curve_a",
            ExemptionCurve::B => "curve_b",
            ExemptionCurve::C => "curve_c",
            ExemptionCurve::D => "curve_d",
        }
    }
}

/// 항복강도와 면제곡선으로 기준온도 Tref를 구한다. 표 범위 밖은 끝값.
pub fn reference_temperature(
    table: &LookupTable,
    family: SteelFamily,
    curve: ExemptionCurve,
    yield_strength: f64,
) -> Result<f64, CalcError> {
    let y_path = [Key::from(curve.table_key())];
    let res = resolve_value(
        table,
        &[Key::from(family.table_key())],
        SeriesShape::RowArray {
            x_field: "min_yield_strength",
            y_path: &y_path,
        },
        require(yield_strength, "yield_strength")?,
        BoundaryPolicy::ClampBoth,
    )?;
    Ok(res.value)
}

/// 두께 열 × ΔT 행 격자.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseDfGrid {
    pub thicknesses: Vec<f64>,
    pub delta_ts: Vec<f64>,
    pub values: Vec<Vec<f64>>,
}

impl BaseDfGrid {
    pub fn from_table(table: &LookupTable) -> Result<Self, TableError> {
        let name = table.name();
        let thicknesses: Vec<f64> = table
            .walk(&[Key::from("thicknesses")])?
            .as_array()
            .ok_or_else(|| TableError::shape(name, "thicknesses가 배열이 아님"))?
            .iter()
            .map(|v| value_as_f64(v).ok_or_else(|| TableError::shape(name, "두께가 숫자가 아님")))
            .collect::<Result<_, _>>()?;
        let rows = table
            .walk(&[Key::from("rows")])?
            .as_array()
            .ok_or_else(|| TableError::shape(name, "rows가 배열이 아님"))?;

        let mut delta_ts = Vec::with_capacity(rows.len());
        let mut values = Vec::with_capacity(rows.len());
        for row in rows {
            let dt = row
                .get("delta_t")
                .and_then(value_as_f64)
                .ok_or_else(|| TableError::shape(name, "delta_t 없음"))?;
            let vals: Vec<f64> = row
                .get("values")
                .and_then(Value::as_array)
                .map(|a| a.iter().filter_map(value_as_f64).collect())
                .unwrap_or_default();
            if vals.len() != thicknesses.len() {
                return Err(TableError::shape(
                    name,
                    format!("ΔT {dt} 행의 값 개수 {}가 두께 열 {}개와 다름", vals.len(), thicknesses.len()),
                ));
            }
            delta_ts.push(dt);
            values.push(vals);
        }
        if delta_ts.is_empty() || thicknesses.is_empty() {
            return Err(TableError::EmptySeries {
                table: name.to_string(),
            });
        }
        Ok(Self {
            thicknesses,
            delta_ts,
            values,
        })
    }

    /// ΔT와 두께로 쌍선형 보간. 양축 모두 끝값 고정.
    pub fn base_df(&self, delta_t: f64, thickness: f64) -> Option<f64> {
        bilinear(
            delta_t,
            thickness,
            &self.delta_ts,
            &self.thicknesses,
            &self.values,
            BoundaryPolicy::ClampBoth,
        )
    }
}

pub fn base_damage_factor(table: &LookupTable, delta_t: f64, thickness: f64) -> Result<f64, CalcError> {
    let grid = BaseDfGrid::from_table(table)?;
    let df = grid
        .base_df(require(delta_t, "delta_t")?, require(thickness, "thickness")?)
        .ok_or_else(|| TableError::shape(table.name(), "격자 보간 실패"))?;
    debug!(table = table.name(), delta_t, thickness, df, "취성파괴 기본 DF");
    Ok(df)
}

/// 운전 최저온도 결정 방식. 관리 통제가 있으면 최소 운전온도, 없으면 별도로 정한 값.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CriticalTemperature {
    AdministrativeControls { min_operating_temp: f64 },
    Determined { temperature: f64 },
}

impl CriticalTemperature {
    pub fn value(self) -> Result<f64, CalcError> {
        match self {
            CriticalTemperature::AdministrativeControls { min_operating_temp } => {
                require(min_operating_temp, "min_operating_temp")
            }
            CriticalTemperature::Determined { temperature } => require(temperature, "temperature"),
        }
    }
}

/// 탄소강·저합금강 취성파괴 입력.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarbonSteelBrittleInput {
    /// CET
    pub critical_exposure: CriticalTemperature,
    pub family: SteelFamily,
    pub curve: ExemptionCurve,
    pub yield_strength: f64,
    pub thickness: f64,
    pub pwht: bool,
    /// F_SE
    pub fse: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CarbonSteelBrittleResult {
    pub cet: f64,
    pub tref: f64,
    pub delta_t: f64,
    pub base_df: f64,
    pub damage_factor: f64,
}

pub fn compute_carbon_steel_brittle(
    input: &CarbonSteelBrittleInput,
    reference_table: &LookupTable,
    base_df_table: &LookupTable,
) -> Result<CarbonSteelBrittleResult, CalcError> {
    let cet = input.critical_exposure.value()?;
    let tref = reference_temperature(reference_table, input.family, input.curve, input.yield_strength)?;
    let delta_t = cet - tref;
    let base_df = base_damage_factor(base_df_table, delta_t, input.thickness)?;
    Ok(CarbonSteelBrittleResult {
        cet,
        tref,
        delta_t,
        base_df,
        damage_factor: base_df * require(input.fse, "fse")?,
    })
}

/// 템퍼취화 입력.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemperEmbrittlementInput {
    pub min_operating_temp: f64,
    pub admin_controls: bool,
    /// 관리 통제가 없을 때: 설계 최저 금속온도
    #[serde(default)]
    pub tmdt: Option<f64>,
    /// 관리 통제가 없을 때: 공정상 최소 가압 온도
    #[serde(default)]
    pub process_mpt: Option<f64>,
    pub family: SteelFamily,
    pub curve: ExemptionCurve,
    pub yield_strength: f64,
    pub delta_fatt: DeltaFattMethod,
    pub thickness: f64,
    pub pwht: bool,
    pub fse: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemperEmbrittlementResult {
    /// 관리 통제 유무에 따른 임계 노출온도
    pub cet: f64,
    pub tref: f64,
    pub delta_fatt: f64,
    pub mpt: f64,
    pub delta_t: f64,
    pub base_df: f64,
    pub damage_factor: f64,
}

pub fn compute_temper_embrittlement(
    input: &TemperEmbrittlementInput,
    reference_table: &LookupTable,
    base_df_table: &LookupTable,
) -> Result<TemperEmbrittlementResult, CalcError> {
    let min_op = require(input.min_operating_temp, "min_operating_temp")?;
    let cet = if input.admin_controls {
        min_op
    } else {
        let tmdt = require(required(input.tmdt, "tmdt")?, "tmdt")?;
        let process = require(required(input.process_mpt, "process_mpt")?, "process_mpt")?;
        tmdt.min(process)
    };
    let tref = reference_temperature(reference_table, input.family, input.curve, input.yield_strength)?;
    let delta_fatt = input.delta_fatt.delta_fatt()?;
    let mpt = minimum_pressurization_temp(tref, delta_fatt);
    let delta_t = min_op - mpt;
    let base_df = base_damage_factor(base_df_table, delta_t, input.thickness)?;
    Ok(TemperEmbrittlementResult {
        cet,
        tref,
        delta_fatt,
        mpt,
        delta_t,
        base_df,
        damage_factor: base_df * require(input.fse, "fse")?,
    })
}

/// 885°F 취화 입력. 표는 °F 기준이다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embrittlement885Input {
    pub admin_controls: bool,
    #[serde(default)]
    pub min_operating_temp: Option<f64>,
    #[serde(default)]
    pub design_min_temp: Option<f64>,
    #[serde(default)]
    pub upset_temp: Option<f64>,
    /// 기준온도. 없으면 80°F.
    #[serde(default)]
    pub tref: Option<f64>,
}

impl Embrittlement885Input {
    /// 온도 입력을 °F로 바꾼 사본.
    pub fn in_fahrenheit(&self, scale: TemperatureScale) -> Self {
        let f = |t: Option<f64>| t.map(|v| scale.to_fahrenheit(v));
        Self {
            admin_controls: self.admin_controls,
            min_operating_temp: f(self.min_operating_temp),
            design_min_temp: f(self.design_min_temp),
            upset_temp: f(self.upset_temp),
            tref: f(self.tref),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Embrittlement885Result {
    pub t_min: f64,
    pub tref: f64,
    pub temp_diff: f64,
    pub damage_factor: f64,
}

/// `Tmin - Tref` 차이로 885°F 취화 DF를 구한다. ±100°F 밖은 고정값, 안은 보간 후 정수 반올림.
pub fn embrittlement_885_df(table: &LookupTable, temp_diff: f64) -> Result<f64, CalcError> {
    if temp_diff > EMBRITTLEMENT_885_SPAN {
        return Ok(EMBRITTLEMENT_885_ABOVE);
    }
    if temp_diff < -EMBRITTLEMENT_885_SPAN {
        return Ok(EMBRITTLEMENT_885_BELOW);
    }
    let y_path = [Key::from("df")];
    let points = resolve_series(
        table,
        &[],
        SeriesShape::RowArray {
            x_field: "temp_diff_f",
            y_path: &y_path,
        },
    )?;
    let res = interpolate_descending_clamped(temp_diff, &points).ok_or_else(|| TableError::EmptySeries {
        table: table.name().to_string(),
    })?;
    Ok(res.value.round())
}

pub fn compute_embrittlement_885(
    input: &Embrittlement885Input,
    table: &LookupTable,
) -> Result<Embrittlement885Result, CalcError> {
    let t_min = if input.admin_controls {
        require(required(input.min_operating_temp, "min_operating_temp")?, "min_operating_temp")?
    } else {
        let design = require(required(input.design_min_temp, "design_min_temp")?, "design_min_temp")?;
        let upset = require(required(input.upset_temp, "upset_temp")?, "upset_temp")?;
        design.min(upset)
    };
    let tref = require(input.tref.unwrap_or(DEFAULT_885_TREF_F), "tref")?;
    let temp_diff = t_min - tref;
    Ok(Embrittlement885Result {
        t_min,
        tref,
        temp_diff,
        damage_factor: embrittlement_885_df(table, temp_diff)?,
    })
}

/// 시그마상 함량 구분.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SigmaContent {
    Low,
    Medium,
    High,
}

impl SigmaContent {
    pub fn table_key(self) -> &'static str {
        match self {
            SigmaContent::Low => "df_low",
            SigmaContent::Medium => "df_medium",
            SigmaContent::High => "df_high",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigmaPhaseInput {
    /// 최저 운전온도. 계열 입력의 단위계를 따른다.
    pub min_operating_temp: f64,
    pub content: SigmaContent,
}

/// 시그마상 취화 DF. 표 범위(-50~1200°F) 밖은 끝값, 소수 둘째 자리 반올림.
pub fn sigma_phase_df(table: &LookupTable, t_min: f64, content: SigmaContent) -> Result<f64, CalcError> {
    let y_path = [Key::from(content.table_key())];
    let points = resolve_series(
        table,
        &[],
        SeriesShape::RowArray {
            x_field: "temp_f",
            y_path: &y_path,
        },
    )?;
    let res = interpolate_descending_clamped(require(t_min, "min_operating_temp")?, &points).ok_or_else(|| {
        TableError::EmptySeries {
            table: table.name().to_string(),
        }
    })?;
    Ok((res.value * 100.0).round() / 100.0)
}

/// 취성파괴 계열 전체 입력. 활성 메커니즘만 채운다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrittleFamilyInput {
    #[serde(default)]
    pub scale: TemperatureScale,
    #[serde(default)]
    pub carbon_steel: Option<CarbonSteelBrittleInput>,
    #[serde(default)]
    pub temper_embrittlement: Option<TemperEmbrittlementInput>,
    #[serde(default)]
    pub embrittlement_885: Option<Embrittlement885Input>,
    #[serde(default)]
    pub sigma_phase: Option<SigmaPhaseInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BrittleFamilyResult {
    pub carbon_steel: Option<CarbonSteelBrittleResult>,
    pub temper_embrittlement: Option<TemperEmbrittlementResult>,
    pub embrittlement_885: Option<Embrittlement885Result>,
    pub sigma_phase_df: Option<f64>,
    pub governing_df: f64,
}

impl BrittleFamilyInput {
    /// 활성 메커니즘 계산에 필요한 테이블 이름.
    pub fn required_tables(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if let Some(cs) = &self.carbon_steel {
            names.push(reference_table_name(self.scale));
            names.push(base_df_table_name(cs.pwht, self.scale));
        }
        if let Some(te) = &self.temper_embrittlement {
            names.push(reference_table_name(self.scale));
            names.push(base_df_table_name(te.pwht, self.scale));
        }
        if self.embrittlement_885.is_some() {
            names.push(EMBRITTLEMENT_885_TABLE);
        }
        if self.sigma_phase.is_some() {
            names.push(SIGMA_TABLE);
        }
        names.sort_unstable();
        names.dedup();
        names
    }
}

/// 활성 메커니즘을 모두 계산하고 합산 쌍 규칙으로 지배 DF를 정한다.
///
/// 885°F·시그마상 표는 °F 전용이라 섭씨 입력은 먼저 °F로 바꾼다.
pub fn compute_brittle_family(
    input: &BrittleFamilyInput,
    store: &TableStore,
    pairs: &[AdditivePair],
) -> Result<BrittleFamilyResult, CalcError> {
    let scale = input.scale;
    let carbon_steel = input
        .carbon_steel
        .as_ref()
        .map(|cs| {
            compute_carbon_steel_brittle(
                cs,
                store.get(reference_table_name(scale))?,
                store.get(base_df_table_name(cs.pwht, scale))?,
            )
        })
        .transpose()?;
    let temper = input
        .temper_embrittlement
        .as_ref()
        .map(|te| {
            compute_temper_embrittlement(
                te,
                store.get(reference_table_name(scale))?,
                store.get(base_df_table_name(te.pwht, scale))?,
            )
        })
        .transpose()?;
    let e885 = input
        .embrittlement_885
        .as_ref()
        .map(|e| compute_embrittlement_885(&e.in_fahrenheit(scale), store.get(EMBRITTLEMENT_885_TABLE)?))
        .transpose()?;
    let sigma = input
        .sigma_phase
        .as_ref()
        .map(|s| {
            sigma_phase_df(
                store.get(SIGMA_TABLE)?,
                scale.to_fahrenheit(s.min_operating_temp),
                s.content,
            )
        })
        .transpose()?;

    let mut mechanisms = Vec::new();
    if let Some(r) = &carbon_steel {
        mechanisms.push(MechanismDf::new(BRITTLE_FRACTURE, r.damage_factor));
    }
    if let Some(r) = &temper {
        mechanisms.push(MechanismDf::new(TEMPER_EMBRITTLEMENT, r.damage_factor));
    }
    if let Some(r) = &e885 {
        mechanisms.push(MechanismDf::new(EMBRITTLEMENT_885, r.damage_factor));
    }
    if let Some(df) = sigma {
        mechanisms.push(MechanismDf::new(SIGMA_PHASE, df));
    }

    Ok(BrittleFamilyResult {
        carbon_steel,
        temper_embrittlement: temper,
        embrittlement_885: e885,
        sigma_phase_df: sigma,
        governing_df: governing_df(&mechanisms, pairs),
    })
}
