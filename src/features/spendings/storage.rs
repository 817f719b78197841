use crate::shared::errors::AppResult;
use std::cell::RefCell;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// 支出リストの永続化コラボレーター
///
/// 固定キーの下にシリアライズ済みの支出リストを1件だけ保持する。
/// キーが存在しない状態と空配列を保持する状態は、読み込み側で同一視される。
pub trait SpendingStorage {
    /// 永続化された値を読み込む
    ///
    /// # 戻り値
    /// 永続化された値（キーが存在しない場合はNone）、または失敗時はエラー
    fn read(&self) -> AppResult<Option<String>>;

    /// 値を書き込む
    ///
    /// # 引数
    /// * `payload` - シリアライズ済みの支出リスト
    ///
    /// # 戻り値
    /// 成功時はOk(())、失敗時はエラー
    fn write(&self, payload: &str) -> AppResult<()>;

    /// キーごと削除する
    ///
    /// # 戻り値
    /// 成功時はOk(())、失敗時はエラー。キーが存在しない場合もOk(())
    fn clear(&self) -> AppResult<()>;
}

/// JSONファイルによる永続化
///
/// ファイル1つが永続化キー1つに対応する。ファイルが存在しないことが
/// 「キーが存在しない」状態を表す。
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// 新しいJSONファイルストレージを作成する
    ///
    /// # 引数
    /// * `path` - ストアファイルのパス
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// ストアファイルのパスを取得する
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SpendingStorage for JsonFileStorage {
    fn read(&self) -> AppResult<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let payload = fs::read_to_string(&self.path)?;
        Ok(Some(payload))
    }

    fn write(&self, payload: &str) -> AppResult<()> {
        fs::write(&self.path, payload)?;
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// メモリ上の永続化（テスト用フェイク）
///
/// クローンはバッファを共有するため、リポジトリに渡した後も
/// 手元のクローンから永続化状態を観察できる。
#[derive(Clone, Default)]
pub struct MemoryStorage {
    payload: Rc<RefCell<Option<String>>>,
}

impl MemoryStorage {
    /// 新しいメモリストレージを作成する
    pub fn new() -> Self {
        Self::default()
    }

    /// 現在の永続化状態のスナップショットを取得する
    ///
    /// # 戻り値
    /// 永続化された値（キーが存在しない場合はNone）
    pub fn snapshot(&self) -> Option<String> {
        self.payload.borrow().clone()
    }
}

impl SpendingStorage for MemoryStorage {
    fn read(&self) -> AppResult<Option<String>> {
        Ok(self.payload.borrow().clone())
    }

    fn write(&self, payload: &str) -> AppResult<()> {
        *self.payload.borrow_mut() = Some(payload.to_string());
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        *self.payload.borrow_mut() = None;
        Ok(())
    }
}
