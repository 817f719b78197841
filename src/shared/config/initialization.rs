use crate::features::spendings::repository::{RepositoryOptions, SpendingRepository};
use crate::features::spendings::storage::JsonFileStorage;
use crate::shared::config::{get_environment, get_store_filename, Environment};
use crate::shared::errors::{AppError, AppResult};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// アプリケーション初期化の結果を表す構造体
#[derive(Debug)]
pub struct InitializationResult {
    /// 初回起動かどうか
    pub is_first_run: bool,
    /// アプリケーションデータディレクトリのパス
    pub app_data_dir: PathBuf,
    /// 支出ストアファイルのパス
    pub store_path: PathBuf,
    /// 実行環境
    pub environment: Environment,
}

/// アプリケーションの初期化を実行する
///
/// # 戻り値
/// 初期化結果、または失敗時はエラー
///
/// # 処理内容
/// 1. アプリケーションデータディレクトリの作成
/// 2. 初回起動の判定
/// 3. 環境に応じたストアファイルパスの決定
pub fn initialize_application() -> AppResult<InitializationResult> {
    // 現在の実行環境を取得
    let environment = get_environment();

    // アプリケーションデータディレクトリを取得・作成
    let app_data_dir = ensure_app_data_directory()?;

    // ストアファイルパスを構築
    let store_path = resolve_store_path(&app_data_dir, environment.clone());

    // 初回起動かどうかを判定（ストアファイルの存在で判定）
    let is_first_run = !store_path.exists();

    // 初回起動の場合、初期化ログを出力
    if is_first_run {
        log_first_run_initialization(&environment, &app_data_dir, &store_path);
    }

    Ok(InitializationResult {
        is_first_run,
        app_data_dir,
        store_path,
        environment,
    })
}

/// 支出リポジトリを初期化する
///
/// # 戻り値
/// 永続化済みデータを読み込んだ支出リポジトリ、または失敗時はエラー
///
/// # 処理内容
/// 1. アプリケーション全体の初期化を実行
/// 2. ストアファイルを読み込んでリポジトリを構築
/// 3. 初期化完了ログを出力
pub fn initialize_repository() -> AppResult<SpendingRepository> {
    // 環境変数を読み込み（.envファイルがある場合）
    load_environment_variables();

    // アプリケーション全体の初期化を実行
    let init_result = initialize_application()?;

    // ストアファイルを読み込んでリポジトリを構築
    let storage = JsonFileStorage::new(init_result.store_path.clone());
    let repository =
        SpendingRepository::load_with_options(Box::new(storage), RepositoryOptions::default());

    // 初期化完了ログを出力
    log_initialization_complete(&init_result);

    Ok(repository)
}

/// アプリケーションデータディレクトリを確実に作成する
///
/// # 戻り値
/// アプリケーションデータディレクトリのパス、または失敗時はエラー
fn ensure_app_data_directory() -> AppResult<PathBuf> {
    let base_dir = dirs::data_dir().ok_or_else(|| {
        AppError::configuration("アプリデータディレクトリの取得に失敗しました")
    })?;

    let app_data_dir = base_dir.join("shishutsu-memo");

    // ディレクトリが存在しない場合は作成
    if !app_data_dir.exists() {
        fs::create_dir_all(&app_data_dir)?;

        println!(
            "アプリケーションデータディレクトリを作成しました: {:?}",
            app_data_dir
        );
    }

    Ok(app_data_dir)
}

/// 環境に応じたストアファイルパスを構築する
///
/// # 引数
/// * `app_data_dir` - アプリケーションデータディレクトリ
/// * `env` - 実行環境
///
/// # 戻り値
/// ストアファイルのパス
fn resolve_store_path(app_data_dir: &Path, env: Environment) -> PathBuf {
    app_data_dir.join(get_store_filename(env))
}

/// 環境変数を読み込む（.envファイルがある場合）
pub fn load_environment_variables() {
    if dotenv::dotenv().is_err() {
        // .envファイルがない場合は無視（本番環境では環境変数が直接設定される）
        warn!(".envファイルが見つかりません。環境変数が直接設定されていることを確認してください。");
    } else {
        info!(".envファイルを読み込みました");
    }
}

/// ログシステムを初期化する
///
/// # 動作
/// LOG_LEVEL環境変数（error/warn/info/debug/trace、既定はinfo）から
/// ログレベルを決定し、env_loggerを初期化する。
pub fn initialize_logging_system() {
    // ログレベルを設定
    let log_level_var = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_level = match log_level_var.to_lowercase().as_str() {
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        _ => log::LevelFilter::Info,
    };

    // env_loggerを初期化
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp_secs()
        .format_module_path(false)
        .format_target(false)
        .init();

    info!("ログシステムを初期化しました: level={log_level_var}");
}

/// 初回起動時の初期化ログを出力する
///
/// # 引数
/// * `environment` - 実行環境
/// * `app_data_dir` - アプリケーションデータディレクトリ
/// * `store_path` - ストアファイルパス
fn log_first_run_initialization(
    environment: &Environment,
    app_data_dir: &Path,
    store_path: &Path,
) {
    println!("=== アプリケーション初回起動 ===");
    println!("実行環境: {:?}", environment);
    println!("アプリデータディレクトリ: {:?}", app_data_dir);
    println!("ストアファイル: {:?}", store_path);
    println!("初期化を開始します...");
}

/// 初期化完了ログを出力する
///
/// # 引数
/// * `result` - 初期化結果
pub fn log_initialization_complete(result: &InitializationResult) {
    if result.is_first_run {
        println!("=== 初期化完了 ===");
        println!("初回起動の初期化が正常に完了しました");
    } else {
        println!("アプリケーション起動完了（既存ストアファイルを使用）");
    }
    println!("環境: {:?}", result.environment);
    println!("ストア: {:?}", result.store_path);
}
