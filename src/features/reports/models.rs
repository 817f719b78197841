use crate::features::spendings::models::SpendingRecord;
use serde::{Deserialize, Serialize};

/// 日別グループ
///
/// 同じ暦日の支出をまとめたもの。グループ内の順序は入力順のまま。
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DayGroup {
    pub date: String,
    pub records: Vec<SpendingRecord>,
}

/// 月別合計（チャート用）
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthlyTotal {
    /// YYYY-MM形式の月キー
    pub month: String,
    pub total: f64,
}

/// 日別グループの並び順
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// 日付の昇順（古い日が先頭）
    Ascending,
    /// 日付の降順（新しい日が先頭）
    Descending,
}
