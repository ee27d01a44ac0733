use serde::{Deserialize, Serialize};

/// 테이블 세트를 고르는 온도 단위계.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TemperatureScale {
    /// 화씨 테이블(부식률 mpy)
    #[default]
    Fahrenheit,
    /// 섭씨 테이블(부식률 mm/y)
    Celsius,
}

impl TemperatureScale {
    /// `temperature_in_f` / `temperature_in_c` 형식의 테이블 최상위 키.
    pub fn table_key(self) -> &'static str {
        match self {
            TemperatureScale::Fahrenheit => "temperature_in_f",
            TemperatureScale::Celsius => "temperature_in_c",
        }
    }

    /// 외부부식 기본 부식률 테이블의 `imperial` / `metric` 키.
    pub fn dataset_key(self) -> &'static str {
        match self {
            TemperatureScale::Fahrenheit => "imperial",
            TemperatureScale::Celsius => "metric",
        }
    }

    /// 이 단위계의 온도를 °F로.
    pub fn to_fahrenheit(self, t: f64) -> f64 {
        match self {
            TemperatureScale::Fahrenheit => t,
            TemperatureScale::Celsius => celsius_to_fahrenheit(t),
        }
    }

    pub fn rate_unit(self) -> &'static str {
        match self {
            TemperatureScale::Fahrenheit => "mpy",
            TemperatureScale::Celsius => "mm/y",
        }
    }
}

impl std::str::FromStr for TemperatureScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "f" | "fahrenheit" => Ok(TemperatureScale::Fahrenheit),
            "c" | "celsius" => Ok(TemperatureScale::Celsius),
            other => Err(format!("알 수 없는 온도 단위: {other}")),
        }
    }
}

pub fn fahrenheit_to_celsius(t_f: f64) -> f64 {
    (t_f - 32.0) * 5.0 / 9.0
}

pub fn celsius_to_fahrenheit(t_c: f64) -> f64 {
    t_c * 9.0 / 5.0 + 32.0
}

/// 1 psi = 0.0689476 bar
pub fn psi_to_bar(p_psi: f64) -> f64 {
    p_psi * 0.0689476
}

/// mm/y → mpy 환산 계수(관행값 39.4)
pub const MPY_PER_MM_Y: f64 = 39.4;
