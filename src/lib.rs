pub mod features;
pub mod shared;

// 公開インターフェース：プレゼンテーション層が使用する型と関数

// 支出ストア
pub use features::spendings::{
    CreateSpendingDto, JsonFileStorage, MemoryStorage, RepositoryOptions, SpendingRecord,
    SpendingRepository, SpendingStorage, UpdateSpendingDto, CATEGORIES,
};

// 派生ビュー
pub use features::reports::{
    current_month_category_totals, current_month_total, filter_spendings, group_by_day,
    monthly_series, sort_day_groups, DayGroup, MonthlyTotal, SortOrder,
};

// 初期化とエラー型
pub use shared::config::{initialize_logging_system, initialize_repository};
pub use shared::errors::{AppError, AppResult, ErrorSeverity};
