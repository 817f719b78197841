/// レポート機能モジュール
///
/// このモジュールは支出リストからの派生ビュー計算を提供します：
/// - 検索語による絞り込み（説明・カテゴリの部分一致）
/// - 暦日ごとのグループ化
/// - 日別グループの昇順・降順ソート
/// - 今月合計、今月カテゴリ別合計、全期間の月別合計の集計
///
/// すべて支出リストのスナップショットに対する純粋関数であり、
/// 隠れた状態は持ちません。
// サブモジュールの宣言
pub mod models;
pub mod service;

// 公開インターフェース：外部から使用可能な型と関数をエクスポート

// モデル
pub use models::{DayGroup, MonthlyTotal, SortOrder};

// サービス（派生ビュー計算）
pub use service::{
    current_month_category_totals, current_month_total, filter_spendings, group_by_day,
    monthly_series, sort_day_groups,
};
