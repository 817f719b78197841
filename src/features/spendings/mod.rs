/// 支出機能モジュール
///
/// このモジュールは支出管理に関連するすべての機能を提供します：
/// - 支出の作成、読み取り、更新、削除（CRUD操作）
/// - 支出データのバリデーション
/// - 支出リストの永続化（読み込み・書き込み・全削除）
// サブモジュールの宣言
pub mod models;
pub mod repository;
pub mod storage;


// 公開インターフェース：外部から使用可能な型と関数をエクスポート

// モデル
pub use models::{is_known_category, CreateSpendingDto, SpendingRecord, UpdateSpendingDto, CATEGORIES};

// リポジトリ（ストア操作）
pub use repository::{RepositoryOptions, SpendingRepository};

// ストレージ（永続化コラボレーター）
pub use storage::{JsonFileStorage, MemoryStorage, SpendingStorage};
