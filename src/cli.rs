//! 명령행 인자 정의. 각 하위 명령은 입력 JSON 파일 하나를 받는다.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;
use crate::logging::LogFormat;
use crate::units::TemperatureScale;

#[derive(Debug, Parser)]
#[command(name = "rbi_damage_toolbox", version, about = "RBI 손상계수 계산 도구")]
pub struct Cli {
    /// 설정 파일 경로
    #[arg(long, global = true, env = "RBI_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
    /// 테이블 디렉터리 (설정값보다 우선)
    #[arg(long, global = true, env = "RBI_TABLE_DIR")]
    pub table_dir: Option<PathBuf>,
    /// 로그 필터 (예: info, debug)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
    /// human | json
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,
    /// 입력에 단위계가 없을 때 쓸 기본값 (F | C)
    #[arg(long, global = true)]
    pub unit: Option<TemperatureScale>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// 입력 JSON 파일. "-"이면 표준입력.
    #[arg(long, short)]
    pub input: PathBuf,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// 강재 외부부식(CUI) 18단계 계산
    ExternalFerritic(InputArgs),
    /// CO2 부식률
    Co2(InputArgs),
    /// 산성 사워워터 부식률
    SourWater(InputArgs),
    /// 불산 부식률
    Hf(InputArgs),
    /// 고온 황화/나프텐산 부식률
    Naphthenic(InputArgs),
    /// 황산 부식률
    Sulfuric(InputArgs),
    /// 염산 부식률
    Hcl(InputArgs),
    /// 알칼리 사워워터 부식률
    AlkalineSourWater(InputArgs),
    /// 고온 H2S/H2 부식률
    HtH2sH2(InputArgs),
    /// 고온 산화 부식률
    HtOxidation(InputArgs),
    /// 토양측 부식률
    SoilSide(InputArgs),
    /// 아민 부식률
    Amine {
        #[command(subcommand)]
        material: AmineCommand,
    },
    /// 가성 균열 감수성(및 선택적 DF)
    SccCaustic(InputArgs),
    /// 황화물 응력균열
    SccSsc(InputArgs),
    /// 알칼리 탄산염 SCC
    SccAcscc(InputArgs),
    /// 염화물 SCC
    SccClscc(InputArgs),
    /// 불산 환경 수소응력균열
    SccHscHf(InputArgs),
    /// 아민 응력균열
    SccAmine(InputArgs),
    /// 폴리티온산 SCC (경년 보정 없음)
    SccPascc(InputArgs),
    /// 불산 환경 HIC/SOHIC (온라인 모니터링 계수 적용)
    SccHicHf(InputArgs),
    /// SCC 메커니즘별 최종 DF 중 지배값
    SccGoverning(InputArgs),
    /// 고온 수소침식
    Htha(InputArgs),
    /// 취성파괴 계열 손상계수
    Brittle(InputArgs),
    /// 메커니즘별 DF로 지배 DF 결정
    Governing(InputArgs),
    /// 적용 중인 설정 출력
    Config,
}

#[derive(Debug, Clone, Subcommand)]
pub enum AmineCommand {
    /// 탄소강·저합금강
    Cs(InputArgs),
    /// 300 계열 스테인리스강
    Ss(InputArgs),
}
