use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 支出データモデル
///
/// 金額は数値に変換可能なテキストとして保持する（永続化データの形式に合わせる）。
/// 日付はYYYY-MM-DD形式の暦日で、時刻の意味は持たない。
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SpendingRecord {
    pub id: String,
    pub amount: String,
    pub category: String,
    pub description: String,
    pub date: String,
}

/// 支出作成用DTO
///
/// 日付を省略した場合は当日の日付が補われる。
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSpendingDto {
    pub amount: String,
    pub category: String,
    pub description: String,
    pub date: Option<String>,
}

/// 支出更新用DTO
///
/// 更新はID以外の全フィールドを置き換えるため、すべて必須。
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSpendingDto {
    pub amount: String,
    pub category: String,
    pub description: String,
    pub date: String,
}

/// 固定カテゴリ一覧（厳密カテゴリモードで使用）
pub const CATEGORIES: [&str; 7] = [
    "Food",
    "Transport",
    "Entertainment",
    "Bills",
    "Shopping",
    "Health",
    "Other",
];

/// 固定カテゴリの検索用セット
static CATEGORY_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| CATEGORIES.iter().copied().collect());

/// カテゴリが固定カテゴリ一覧に含まれるかどうかを判定する
///
/// # 引数
/// * `category` - 判定するカテゴリ名
///
/// # 戻り値
/// 固定カテゴリ一覧に含まれる場合はtrue
pub fn is_known_category(category: &str) -> bool {
    CATEGORY_SET.contains(category)
}
