//! API 581 위험기반검사(RBI) 손상계수 계산 코어.
//!
//! 계산 로직은 라이브러리에 두고, 바이너리는 JSON 입력을 받아 결과를 출력하는 얇은 껍데기다.

pub mod aging;
pub mod app;
pub mod bayes;
pub mod brittle;
pub mod cli;
pub mod config;
pub mod error;
pub mod htha;
pub mod inspection;
pub mod interpolation;
pub mod logging;
pub mod scc;
pub mod tables;
pub mod thinning;
pub mod units;
