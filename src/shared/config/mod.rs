/// 環境判定と環境別設定
pub mod environment;

/// アプリケーション初期化
pub mod initialization;

// 便利な再エクスポート
pub use environment::{get_environment, get_store_filename, Environment};
pub use initialization::{
    initialize_application, initialize_logging_system, initialize_repository,
    load_environment_variables, log_initialization_complete, InitializationResult,
};
