//! 명령 실행. 설정을 읽고, 필요한 테이블을 불러와 계산한 결과를 JSON으로 낸다.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::aging::{governing_df, pof_category, AdditivePair, MechanismDf};
use crate::brittle::{compute_brittle_family, BrittleFamilyInput};
use crate::cli::{AmineCommand, Cli, Command, InputArgs};
use crate::config::{self, Config, ConfigError, ConfigSource};
use crate::error::{CalcError, TableError};
use crate::inspection::InspectionCounts;
use crate::logging::init_logging;
use crate::htha::{assess_htha, HthaInput};
use crate::scc::pipeline::{assess_scc, governing_scc_df, FfsPolicy, SccDamage, SccSettings};
use crate::scc::{
    acscc, amine as amine_scc, caustic, clscc, hic_hf, hsc_hf, pascc, severity, ssc, SusceptibilityAssessment,
};
use crate::tables::TableStore;
use crate::thinning::external_ferritic::{
    calculate_external_ferritic_chain, ExternalFerriticInput, ExternalFerriticTables,
};
use crate::thinning::soil_side::{compute_soil_side, SoilSideInput, SoilSideTables};
use crate::thinning::{
    alkaline_sour_water, amine, co2, hcl, ht_h2s_h2, ht_oxidation, hydrofluoric, naphthenic, sour_water, sulfuric,
};
use crate::units::TemperatureScale;

/// 애플리케이션 실행 중 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("설정 오류: {0}")]
    Config(#[from] ConfigError),
    #[error("계산 오류: {0}")]
    Calc(#[from] CalcError),
    #[error("테이블 오류: {0}")]
    Table(#[from] TableError),
    #[error("입력 파일을 읽을 수 없음 ({path}): {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON 오류: {0}")]
    Json(#[from] serde_json::Error),
}

/// SCC 명령 입력. `damage`가 있으면 감수성에서 최종 DF까지 이어서 계산한다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SccRequest<T> {
    pub input: T,
    #[serde(default)]
    pub damage: Option<SccDamageRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SccDamageRequest {
    #[serde(default)]
    pub inspections: InspectionCounts,
    pub age_years: f64,
    /// 온라인 모니터링 방식 (HIC/SOHIC-HF만 사용)
    #[serde(default)]
    pub online_monitoring: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SccReport<A> {
    pub assessment: A,
    pub damage: Option<SccDamage>,
}

/// 지배 DF 명령 입력. 합산 쌍이 없으면 설정값을 쓴다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoverningRequest {
    pub mechanisms: Vec<MechanismDf>,
    #[serde(default)]
    pub additive_pairs: Option<Vec<AdditivePair>>,
}

/// SCC 지배 DF 명령 입력. `df`는 메커니즘별 최종 DF.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SccGoverningRequest {
    pub mechanisms: Vec<MechanismDf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoverningReport {
    pub governing_df: f64,
    pub pof_category: u8,
}

/// 설정 로드 → CLI 값 덮어쓰기 → 로깅 설치 → 명령 실행 → stdout 출력.
pub fn run(cli: &Cli) -> Result<(), AppError> {
    let (cfg, source) = load_config(cli)?;
    init_logging(&cfg.log);
    if source == ConfigSource::Created {
        info!(path = %cli.config.display(), "기본 설정 파일 생성");
    }
    info!(config = %cli.config.display(), table_dir = %cfg.table_dir.display(), "설정 적용");

    if let Command::Config = cli.command {
        print!("{}", toml::to_string_pretty(&cfg).map_err(ConfigError::from)?);
        return Ok(());
    }

    let mut store = TableStore::new(cfg.table_dir.clone());
    let output = execute(&cli.command, &cfg, &mut store)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// 설정 파일을 읽고 CLI 값을 덮어쓴다. 로깅 설치 전에 불리므로 여기서는 기록하지 않는다.
pub fn load_config(cli: &Cli) -> Result<(Config, ConfigSource), AppError> {
    let (mut cfg, source) = config::load_or_default(&cli.config)?;
    apply_overrides(&mut cfg, cli);
    Ok((cfg, source))
}

/// CLI 인자가 설정값보다 우선한다.
pub fn apply_overrides(cfg: &mut Config, cli: &Cli) {
    if let Some(dir) = &cli.table_dir {
        cfg.table_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        cfg.log.level = level.clone();
    }
    if let Some(format) = cli.log_format {
        cfg.log.format = format;
    }
    if let Some(unit) = cli.unit {
        cfg.unit_scale = unit;
    }
}

/// 명령 하나를 실행하고 결과를 JSON 값으로 돌려준다.
pub fn execute(command: &Command, cfg: &Config, store: &mut TableStore) -> Result<Value, AppError> {
    let scale = cfg.unit_scale;
    let value = match command {
        Command::ExternalFerritic(args) => {
            let input: ExternalFerriticInput = read_input(args, scale)?;
            store.preload(&ExternalFerriticTables::NAMES)?;
            let tables = ExternalFerriticTables::from_store(store)?;
            serde_json::to_value(calculate_external_ferritic_chain(&input, tables)?)?
        }
        Command::Co2(args) => {
            let input: co2::Co2Input = read_input(args, scale)?;
            let table = store.load(co2::TEMPERATURE_PH_TABLE)?;
            serde_json::to_value(co2::compute_co2(&input, table)?)?
        }
        Command::SourWater(args) => {
            let input: sour_water::SourWaterInput = read_input(args, scale)?;
            store.preload(&[sour_water::BASE_RATE_TABLE, sour_water::OXYGEN_TABLE])?;
            serde_json::to_value(sour_water::compute_sour_water(
                &input,
                store.get(sour_water::BASE_RATE_TABLE)?,
                store.get(sour_water::OXYGEN_TABLE)?,
            )?)?
        }
        Command::Hf(args) => {
            let input: hydrofluoric::HfInput = read_input(args, scale)?;
            let table = store.load(input.material.table_name())?;
            serde_json::to_value(hydrofluoric::compute_hf(&input, table)?)?
        }
        Command::Naphthenic(args) => {
            let input: naphthenic::NaphthenicInput = read_input(args, scale)?;
            let table = store.load(input.material.table_name())?;
            serde_json::to_value(naphthenic::compute_naphthenic(&input, table)?)?
        }
        Command::Sulfuric(args) => {
            let input: sulfuric::SulfuricInput = read_input(args, scale)?;
            let table = store.load(input.material.table_name(input.scale))?;
            serde_json::to_value(sulfuric::compute_sulfuric(&input, table)?)?
        }
        Command::Hcl(args) => {
            let input: hcl::HclInput = read_input(args, scale)?;
            let rate_name = input.material.table_name();
            store.preload(&[hcl::CHLORIDE_PH_TABLE, rate_name])?;
            serde_json::to_value(hcl::compute_hcl(
                &input,
                store.get(hcl::CHLORIDE_PH_TABLE)?,
                store.get(rate_name)?,
            )?)?
        }
        Command::AlkalineSourWater(args) => {
            let input: alkaline_sour_water::AlkalineSourWaterInput = read_input(args, scale)?;
            let table = store.load(alkaline_sour_water::TABLE)?;
            serde_json::to_value(alkaline_sour_water::compute_alkaline_sour_water(&input, table)?)?
        }
        Command::HtH2sH2(args) => {
            let input: ht_h2s_h2::H2sH2Input = read_input(args, scale)?;
            let table = store.load(input.material.table_name())?;
            serde_json::to_value(ht_h2s_h2::compute_h2s_h2(&input, table)?)?
        }
        Command::HtOxidation(args) => {
            let input: ht_oxidation::HtOxidationInput = read_input(args, scale)?;
            let table = store.load(ht_oxidation::TABLE)?;
            serde_json::to_value(ht_oxidation::compute_ht_oxidation(&input, table)?)?
        }
        Command::SoilSide(args) => {
            let input: SoilSideInput = read_input(args, scale)?;
            store.preload(&SoilSideTables::NAMES)?;
            serde_json::to_value(compute_soil_side(&input, SoilSideTables::from_store(store)?)?)?
        }
        Command::Amine { material } => match material {
            AmineCommand::Cs(args) => {
                let input: amine::AmineCarbonSteelInput = read_input(args, scale)?;
                let rate_name = input.amine.table_name(input.scale);
                store.preload(&[rate_name, amine::MULTIPLIER_TABLE])?;
                serde_json::to_value(amine::compute_amine_carbon_steel(
                    &input,
                    store.get(rate_name)?,
                    store.get(amine::MULTIPLIER_TABLE)?,
                )?)?
            }
            AmineCommand::Ss(args) => {
                let input: amine::AmineStainlessInput = read_input(args, scale)?;
                let table = store.load(amine::STAINLESS_TABLE)?;
                serde_json::to_value(amine::compute_amine_stainless(&input, table)?)?
            }
        },
        Command::SccCaustic(args) => {
            let req: SccRequest<caustic::CausticInput> = read_input(args, scale)?;
            let curve = caustic::area_a_curve(store.load(caustic::CURVE_TABLE)?, req.input.scale)?;
            let assessment = caustic::assess_caustic(&req.input, &curve)?;
            scc_report(assessment.clone(), &assessment, req.damage, cfg.scc_settings(), store)?
        }
        Command::SccSsc(args) => {
            let req: SccRequest<ssc::SscInput> = read_input(args, scale)?;
            store.preload(&[ssc::ENVIRONMENTAL_SEVERITY_TABLE, ssc::SUSCEPTIBILITY_TABLE])?;
            let result = ssc::assess_ssc(
                &req.input,
                store.get(ssc::ENVIRONMENTAL_SEVERITY_TABLE)?,
                store.get(ssc::SUSCEPTIBILITY_TABLE)?,
            )?;
            let assessment = result.assessment.clone();
            scc_report(result, &assessment, req.damage, cfg.scc_settings(), store)?
        }
        Command::SccAcscc(args) => {
            let req: SccRequest<acscc::AcsccInput> = read_input(args, scale)?;
            let assessment = acscc::assess_acscc(&req.input, store.load(acscc::SUSCEPTIBILITY_TABLE)?)?;
            scc_report(assessment.clone(), &assessment, req.damage, cfg.scc_settings(), store)?
        }
        Command::SccClscc(args) => {
            let req: SccRequest<clscc::ClsccInput> = read_input(args, scale)?;
            let assessment = clscc::assess_clscc(&req.input, store.load(clscc::SUSCEPTIBILITY_TABLE)?)?;
            let settings = cfg.scc_settings().with_ffs_policy(FfsPolicy::TreatAsHigh);
            scc_report(assessment.clone(), &assessment, req.damage, settings, store)?
        }
        Command::SccHscHf(args) => {
            let req: SccRequest<hsc_hf::HscHfInput> = read_input(args, scale)?;
            let assessment = hsc_hf::assess_hsc_hf(&req.input)?;
            scc_report(assessment.clone(), &assessment, req.damage, cfg.scc_settings(), store)?
        }
        Command::SccAmine(args) => {
            let req: SccRequest<amine_scc::AmineSccInput> = read_input(args, scale)?;
            let assessment = amine_scc::assess_amine_scc(&req.input)?;
            scc_report(assessment.clone(), &assessment, req.damage, cfg.scc_settings(), store)?
        }
        Command::SccPascc(args) => {
            let req: SccRequest<pascc::PasccInput> = read_input(args, scale)?;
            let assessment = pascc::assess_pascc(&req.input, store.load(pascc::SUSCEPTIBILITY_TABLE)?)?;
            let settings = cfg.scc_settings().without_aging();
            scc_report(assessment.clone(), &assessment, req.damage, settings, store)?
        }
        Command::SccHicHf(args) => {
            let req: SccRequest<hic_hf::HicHfInput> = read_input(args, scale)?;
            let assessment = hic_hf::assess_hic_hf(&req.input, store.load(hic_hf::SUSCEPTIBILITY_TABLE)?)?;
            let method = req.damage.as_ref().and_then(|d| d.online_monitoring.as_deref());
            let settings = match method {
                Some(m) => {
                    let f_om = hic_hf::monitoring_factor(store.load(hic_hf::MONITORING_TABLE)?, Some(m))?;
                    cfg.scc_settings().with_monitoring_factor(f_om)
                }
                None => cfg.scc_settings(),
            };
            scc_report(assessment.clone(), &assessment, req.damage, settings, store)?
        }
        Command::SccGoverning(args) => {
            let req: SccGoverningRequest = read_input(args, scale)?;
            serde_json::to_value(governing_scc_df(&req.mechanisms))?
        }
        Command::Htha(args) => {
            let input: HthaInput = read_input(args, scale)?;
            serde_json::to_value(assess_htha(&input)?)?
        }
        Command::Brittle(args) => {
            let input: BrittleFamilyInput = read_input(args, scale)?;
            store.preload(&input.required_tables())?;
            serde_json::to_value(compute_brittle_family(&input, store, &cfg.additive_pairs)?)?
        }
        Command::Governing(args) => {
            let req: GoverningRequest = read_input(args, scale)?;
            let pairs = req.additive_pairs.as_deref().unwrap_or(&cfg.additive_pairs);
            let df = governing_df(&req.mechanisms, pairs);
            serde_json::to_value(GoverningReport {
                governing_df: df,
                pof_category: pof_category(df),
            })?
        }
        Command::Config => serde_json::to_value(cfg)?,
    };
    Ok(value)
}

fn scc_report<A: Serialize>(
    report: A,
    assessment: &SusceptibilityAssessment,
    damage: Option<SccDamageRequest>,
    settings: SccSettings,
    store: &mut TableStore,
) -> Result<Value, AppError> {
    let damage = match damage {
        Some(req) => Some(assess_scc(
            assessment.susceptibility,
            req.inspections,
            req.age_years,
            store.load(severity::BASE_DF_TABLE)?,
            &settings,
        )?),
        None => None,
    };
    Ok(serde_json::to_value(SccReport {
        assessment: report,
        damage,
    })?)
}

fn read_input<T: DeserializeOwned>(args: &InputArgs, scale: TemperatureScale) -> Result<T, AppError> {
    let text = read_text(&args.input)?;
    let value: Value = serde_json::from_str(&text)?;
    Ok(serde_json::from_value(with_default_scale(value, scale))?)
}

fn read_text(path: &Path) -> Result<String, AppError> {
    let io_err = |source| AppError::Io {
        path: path.to_path_buf(),
        source,
    };
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).map_err(io_err)?;
        Ok(text)
    } else {
        fs::read_to_string(path).map_err(io_err)
    }
}

/// 최상위 객체(와 SCC 요청의 `input`)에 `scale`이 없으면 설정 단위계를 넣는다.
pub fn with_default_scale(mut value: Value, scale: TemperatureScale) -> Value {
    fn fill(obj: &mut Value, scale: TemperatureScale) {
        if let Some(map) = obj.as_object_mut() {
            if !map.contains_key("scale") {
                debug!(?scale, "입력에 단위계가 없어 기본값 사용");
                map.insert("scale".into(), serde_json::json!(scale));
            }
        }
    }
    fill(&mut value, scale);
    if let Some(inner) = value.get_mut("input") {
        fill(inner, scale);
    }
    value
}
