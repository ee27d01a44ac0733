use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::aging::{default_additive_pairs, AdditivePair, AGING_EXPONENT, MAX_DAMAGE_FACTOR};
use crate::logging::LogSettings;
use crate::scc::pipeline::SccSettings;
use crate::units::TemperatureScale;

/// 기본 설정 파일 경로
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 애플리케이션 설정을 표현한다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 테이블 세트 단위계
    pub unit_scale: TemperatureScale,
    /// `<name>.json` 테이블이 있는 디렉터리
    pub table_dir: PathBuf,
    pub max_damage_factor: f64,
    pub aging_exponent: f64,
    /// 지배 DF 계산에서 합산할 메커니즘 쌍
    pub additive_pairs: Vec<AdditivePair>,
    pub log: LogSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            unit_scale: TemperatureScale::Fahrenheit,
            table_dir: PathBuf::from("tables"),
            max_damage_factor: MAX_DAMAGE_FACTOR,
            aging_exponent: AGING_EXPONENT,
            additive_pairs: default_additive_pairs(),
            log: LogSettings::default(),
        }
    }
}

/// 설정 로드/저장 시 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 파일 입출력 오류
    #[error("설정 파일 입출력 오류 ({path}): {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// TOML 역직렬화 오류
    #[error("설정 파싱 오류: {0}")]
    Serde(#[from] toml::de::Error),
    /// TOML 직렬화 오류
    #[error("설정 직렬화 오류: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("설정값이 올바르지 않음: {0}")]
    Invalid(String),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ConfigError + '_ {
    move |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// 설정을 어디서 얻었는지. 로깅 설치 전에 읽으므로 호출자가 나중에 기록한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Loaded,
    Created,
}

/// 설정 파일을 로드하거나 없으면 기본 설정을 생성한다.
pub fn load_or_default(path: &Path) -> Result<(Config, ConfigSource), ConfigError> {
    if path.exists() {
        Ok((load_from(path)?, ConfigSource::Loaded))
    } else {
        let cfg = Config::default();
        cfg.save(path)?;
        Ok((cfg, ConfigSource::Created))
    }
}

/// 설정 파일을 읽는다. 파일이 없으면 오류.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(io_error(path))?;
    let cfg: Config = toml::from_str(&content)?;
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    /// 설정을 지정한 경로에 저장한다.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(io_error(path))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_damage_factor.is_finite() && self.max_damage_factor > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "max_damage_factor는 양수여야 함: {}",
                self.max_damage_factor
            )));
        }
        if !self.aging_exponent.is_finite() {
            return Err(ConfigError::Invalid("aging_exponent가 숫자가 아님".into()));
        }
        Ok(())
    }

    pub fn scc_settings(&self) -> SccSettings {
        SccSettings {
            aging_exponent: self.aging_exponent,
            max_damage_factor: self.max_damage_factor,
            ..SccSettings::default()
        }
    }
}
