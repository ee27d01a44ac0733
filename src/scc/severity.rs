use tracing::debug;

use crate::error::TableError;
use crate::inspection::{EffectivenessCategory, InspectionEffectiveness};
use crate::tables::{value_as_f64, Key, LookupTable};

/// SVI·검사 유효성별 기본 손상계수 (`{"data": {"<svi>": {"E": df, "<n>": {"A": df, ...}}}}`)
pub const BASE_DF_TABLE: &str = "scc_base_damage_factor";

/// 테이블에 있는 최대 검사 횟수 열
pub const MAX_INSPECTION_COUNT: u32 = 6;

/// SVI 행에서 검사 유효성에 해당하는 기본 DF를 읽는다.
///
/// 범주 E 또는 횟수 0이면 `E` 값을 쓰고, 횟수는 6으로 상한을 둔다.
/// 횟수/범주 칸이 비어 있으면 `E` 값으로 대신한다. SVI 행이 없으면 오류.
pub fn base_damage_factor(
    table: &LookupTable,
    svi: u32,
    effectiveness: InspectionEffectiveness,
) -> Result<f64, TableError> {
    let svi_key = svi.to_string();
    let row = table.walk(&[Key::from("data"), Key::exact(svi_key.as_str())])?;
    let e_value = row
        .get("E")
        .and_then(value_as_f64)
        .ok_or_else(|| TableError::missing_key(table.name(), format!("{svi_key}/E")))?;

    if effectiveness.category == EffectivenessCategory::E || effectiveness.count == 0 {
        return Ok(e_value);
    }
    let count_key = effectiveness.count.min(MAX_INSPECTION_COUNT).to_string();
    let cat_key = effectiveness.category.table_key();
    match row
        .get(count_key.as_str())
        .and_then(|by_cat| by_cat.get(cat_key))
        .and_then(value_as_f64)
    {
        Some(df) => Ok(df),
        None => {
            debug!(svi, count = %count_key, category = cat_key, "검사 칸 없음: E 값 사용");
            Ok(e_value)
        }
    }
}
