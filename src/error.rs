//! 계산 코어의 오류 유형.
//!
//! 입력 누락(`MissingInput`)과 데이터 부재(`TableError`)를 구분한다.
//! 테이블 범위 밖 입력은 오류가 아니라 결과의 `RangeFlag`로 전달된다.

use std::path::PathBuf;

use thiserror::Error;

/// 테이블을 얻지 못했거나, 요청한 키 조합에 해당하는 데이터가 없을 때의 오류.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("테이블 파일을 읽을 수 없음 ({path}): {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("테이블 JSON 파싱 실패 ({path}): {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("테이블이 로드되지 않음: {0}")]
    NotLoaded(String),
    #[error("테이블 {table}에 키가 없음: {key}")]
    MissingKey { table: String, key: String },
    #[error("테이블 {table} 형식 불일치: {detail}")]
    Shape { table: String, detail: String },
    #[error("테이블 {table}에서 추출한 점 목록이 비어 있음")]
    EmptySeries { table: String },
}

impl TableError {
    pub(crate) fn missing_key(table: &str, key: impl Into<String>) -> Self {
        TableError::MissingKey {
            table: table.to_string(),
            key: key.into(),
        }
    }

    pub(crate) fn shape(table: &str, detail: impl Into<String>) -> Self {
        TableError::Shape {
            table: table.to_string(),
            detail: detail.into(),
        }
    }
}

/// 메커니즘 계산 오류.
#[derive(Debug, Error)]
pub enum CalcError {
    /// 필수 입력이 없거나 숫자가 아님
    #[error("필수 입력 누락: {0}")]
    MissingInput(&'static str),
    /// 데이터로부터 값을 결정할 수 없음
    #[error("데이터로부터 값을 결정할 수 없음: {0}")]
    Table(#[from] TableError),
    /// 판정 흐름이 결론에 도달하지 못함
    #[error("판정 불가: {0}")]
    Undetermined(&'static str),
}

/// 유한한 숫자인지 확인하고 아니면 `MissingInput`을 돌려준다.
pub fn require(value: f64, name: &'static str) -> Result<f64, CalcError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::MissingInput(name))
    }
}

/// `Option` 입력을 필수 값으로 바꾼다.
pub fn required<T>(value: Option<T>, name: &'static str) -> Result<T, CalcError> {
    value.ok_or(CalcError::MissingInput(name))
}
