use crate::features::spendings::models::{
    is_known_category, CreateSpendingDto, SpendingRecord, UpdateSpendingDto,
};
use crate::features::spendings::storage::SpendingStorage;
use crate::shared::errors::{AppError, AppResult};
use chrono::Utc;
use chrono_tz::Asia::Tokyo;
use log::{error, warn};

/// リポジトリの動作設定
#[derive(Debug, Clone, Default)]
pub struct RepositoryOptions {
    /// trueの場合、カテゴリを固定カテゴリ一覧に制限する
    pub strict_categories: bool,
}

/// 支出リポジトリ
///
/// 支出リストの唯一の正本を保持し、変更が成功するたびに永続化
/// コラボレーターへ書き込む。保持順は挿入順のままで、表示順は
/// 常に派生ビュー側のソートで決まる。
pub struct SpendingRepository {
    records: Vec<SpendingRecord>,
    storage: Box<dyn SpendingStorage>,
    options: RepositoryOptions,
    next_seq: u64,
}

impl SpendingRepository {
    /// 永続化データを読み込んでリポジトリを構築する
    ///
    /// # 引数
    /// * `storage` - 永続化コラボレーター
    ///
    /// # 戻り値
    /// 構築されたリポジトリ。キーが存在しない場合や解析に失敗した場合は
    /// 空のストアで開始する（失敗はユーザーに露出しない）
    pub fn load(storage: Box<dyn SpendingStorage>) -> Self {
        Self::load_with_options(storage, RepositoryOptions::default())
    }

    /// 動作設定を指定してリポジトリを構築する
    ///
    /// # 引数
    /// * `storage` - 永続化コラボレーター
    /// * `options` - リポジトリの動作設定
    ///
    /// # 戻り値
    /// 構築されたリポジトリ
    pub fn load_with_options(storage: Box<dyn SpendingStorage>, options: RepositoryOptions) -> Self {
        let records = match storage.read() {
            Ok(Some(payload)) => match serde_json::from_str::<Vec<SpendingRecord>>(&payload) {
                Ok(records) => records,
                Err(e) => {
                    warn!("永続化データの解析に失敗したため、空のストアで開始します: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(
                    "永続化データの読み込みに失敗したため、空のストアで開始します: {}",
                    e.details()
                );
                Vec::new()
            }
        };

        Self {
            records,
            storage,
            options,
            next_seq: 0,
        }
    }

    /// 支出一覧を取得する（挿入順のスナップショット）
    pub fn find_all(&self) -> &[SpendingRecord] {
        &self.records
    }

    /// IDで支出を取得する
    ///
    /// # 引数
    /// * `id` - 支出ID
    ///
    /// # 戻り値
    /// 支出（存在しない場合はNone）
    pub fn find_by_id(&self, id: &str) -> Option<&SpendingRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// 支出を作成する
    ///
    /// # 引数
    /// * `dto` - 支出作成用DTO
    ///
    /// # 戻り値
    /// 作成された支出、または失敗時はエラー
    pub fn create(&mut self, dto: CreateSpendingDto) -> AppResult<SpendingRecord> {
        validate_create_dto(&dto, &self.options)?;

        // 日付を省略した場合は当日の日付を補う
        let date = dto.date.unwrap_or_else(today_jst);

        let record = SpendingRecord {
            id: self.assign_id(),
            amount: dto.amount,
            category: dto.category,
            description: dto.description,
            date,
        };

        self.records.push(record.clone());
        self.persist();

        Ok(record)
    }

    /// 支出を更新する
    ///
    /// # 引数
    /// * `id` - 支出ID
    /// * `dto` - 支出更新用DTO
    ///
    /// # 戻り値
    /// 更新された支出、または失敗時はエラー
    pub fn update(&mut self, id: &str, dto: UpdateSpendingDto) -> AppResult<SpendingRecord> {
        validate_update_dto(&dto, &self.options)?;

        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::not_found("支出"))?;

        // ID以外の全フィールドを置き換える
        record.amount = dto.amount;
        record.category = dto.category;
        record.description = dto.description;
        record.date = dto.date;

        let updated = record.clone();
        self.persist();

        Ok(updated)
    }

    /// 支出を削除する
    ///
    /// # 引数
    /// * `id` - 支出ID
    ///
    /// # 戻り値
    /// 成功時はOk(())、存在しないIDの場合はエラー
    pub fn delete(&mut self, id: &str) -> AppResult<()> {
        let position = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| AppError::not_found("支出"))?;

        self.records.remove(position);
        self.persist();

        Ok(())
    }

    /// すべての支出を削除する
    ///
    /// 破壊的で取り消せない操作。呼び出し側がユーザー確認を取る前提。
    /// 永続化キーは空配列を書き込むのではなく、キーごと削除される。
    pub fn clear_all(&mut self) {
        self.records.clear();

        if let Err(e) = self.storage.clear() {
            error!("永続化データの削除に失敗しました: {}", e.details());
        }
    }

    /// 現在の支出リストを永続化する
    ///
    /// 失敗してもメモリ上の状態は維持し、エラーはログに記録して吸収する。
    fn persist(&self) {
        // 空のリストは空配列として書き込まず、キーごと削除する
        if self.records.is_empty() {
            if let Err(e) = self.storage.clear() {
                error!("永続化データの削除に失敗しました: {}", e.details());
            }
            return;
        }

        match serde_json::to_string(&self.records) {
            Ok(payload) => {
                if let Err(e) = self.storage.write(&payload) {
                    error!("支出リストの保存に失敗しました: {}", e.details());
                }
            }
            Err(e) => error!("支出リストのシリアライズに失敗しました: {e}"),
        }
    }

    /// 新しい支出IDを採番する
    ///
    /// 同一ミリ秒内の連続作成でも衝突しないよう、タイムスタンプに
    /// 単調増加の連番を付加する。読み込んだ既存IDとの衝突も再確認する。
    fn assign_id(&mut self) -> String {
        let millis = Utc::now().timestamp_millis();
        loop {
            let id = format!("{}-{}", millis, self.next_seq);
            self.next_seq += 1;
            if !self.records.iter().any(|r| r.id == id) {
                return id;
            }
        }
    }
}

/// JSTで今日の日付をYYYY-MM-DD形式で取得する
fn today_jst() -> String {
    Utc::now()
        .with_timezone(&Tokyo)
        .date_naive()
        .format("%Y-%m-%d")
        .to_string()
}

/// 支出作成DTOのバリデーション
///
/// # 引数
/// * `dto` - 支出作成用DTO
/// * `options` - リポジトリの動作設定
///
/// # 戻り値
/// バリデーション成功時はOk(())、失敗時はエラー
fn validate_create_dto(dto: &CreateSpendingDto, options: &RepositoryOptions) -> AppResult<()> {
    validate_fields(
        &dto.amount,
        &dto.category,
        &dto.description,
        dto.date.as_deref(),
        options,
    )
}

/// 支出更新DTOのバリデーション
///
/// # 引数
/// * `dto` - 支出更新用DTO
/// * `options` - リポジトリの動作設定
///
/// # 戻り値
/// バリデーション成功時はOk(())、失敗時はエラー
fn validate_update_dto(dto: &UpdateSpendingDto, options: &RepositoryOptions) -> AppResult<()> {
    validate_fields(
        &dto.amount,
        &dto.category,
        &dto.description,
        Some(&dto.date),
        options,
    )
}

/// 支出フィールドの共通バリデーション
fn validate_fields(
    amount: &str,
    category: &str,
    description: &str,
    date: Option<&str>,
    options: &RepositoryOptions,
) -> AppResult<()> {
    // バリデーション: 金額は必須で、0以上の有限な数値
    if amount.is_empty() {
        return Err(AppError::validation("金額を入力してください"));
    }
    let parsed: f64 = amount
        .parse()
        .map_err(|_| AppError::validation("金額は数値で入力してください"))?;
    if !parsed.is_finite() {
        return Err(AppError::validation("金額は数値で入力してください"));
    }
    if parsed < 0.0 {
        return Err(AppError::validation(
            "金額は0以上の数値である必要があります",
        ));
    }
    if parsed > 9_999_999_999.0 {
        return Err(AppError::validation("金額は10桁以内で入力してください"));
    }

    // バリデーション: カテゴリは必須
    if category.is_empty() {
        return Err(AppError::validation("カテゴリを入力してください"));
    }
    if options.strict_categories && !is_known_category(category) {
        return Err(AppError::validation(format!(
            "未対応のカテゴリです: {category}"
        )));
    }

    // バリデーション: 説明は必須で500文字以内
    if description.is_empty() {
        return Err(AppError::validation("説明を入力してください"));
    }
    if description.len() > 500 {
        return Err(AppError::validation("説明は500文字以内で入力してください"));
    }

    // バリデーション: 日付が指定されている場合はYYYY-MM-DD形式
    if let Some(date) = date {
        chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
            AppError::validation(
                "日付の形式が正しくありません（YYYY-MM-DD形式で入力してください）",
            )
        })?;
    }

    Ok(())
}
