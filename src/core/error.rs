// ベンチマーク専用のカスタムエラー型定義
// セットアップ時・計測時・ハーネス実行時の三層に分かれる

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// セットアップ時のエラー（致命的、ランを即座に中断する）
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetupError {
    #[error("メソッドが見つかりません: {type_name}::{method}")]
    MethodNotFound { type_name: String, method: String },

    #[error("シグネチャ不一致: {type_name}::{method} - 期待 {expected}, 実際 {actual}")]
    WrongMethodType {
        type_name: String,
        method: String,
        expected: String,
        actual: String,
    },

    #[error("アダプタ生成エラー: {adapter} -> {method} - {reason}")]
    AdapterSynthesis {
        adapter: String,
        method: String,
        reason: String,
    },
}

impl SetupError {
    /// メソッド未検出エラーの作成
    pub fn method_not_found(type_name: impl Into<String>, method: impl Into<String>) -> Self {
        Self::MethodNotFound {
            type_name: type_name.into(),
            method: method.into(),
        }
    }

    /// シグネチャ不一致エラーの作成
    pub fn wrong_method_type(
        type_name: impl Into<String>,
        method: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::WrongMethodType {
            type_name: type_name.into(),
            method: method.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// アダプタ生成エラーの作成
    pub fn adapter_synthesis(
        adapter: impl Into<String>,
        method: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::AdapterSynthesis {
            adapter: adapter.into(),
            method: method.into(),
            reason: reason.into(),
        }
    }
}

/// 計測対象の呼び出し中に発生するエラー
///
/// リフレクション経由の呼び出しのみがこの型を返す。
/// メソッドハンドル経由ではパニックがそのまま伝播する。
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvocationError {
    #[error("呼び出し先で例外が発生しました: {method} - {message}")]
    InvocationTarget { method: String, message: String },

    #[error("アクセスが拒否されました: {method}")]
    IllegalAccess { method: String },

    #[error("不正な引数: {method} - {reason}")]
    IllegalArgument { method: String, reason: String },
}

impl InvocationError {
    pub fn invocation_target(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvocationTarget {
            method: method.into(),
            message: message.into(),
        }
    }

    pub fn illegal_access(method: impl Into<String>) -> Self {
        Self::IllegalAccess {
            method: method.into(),
        }
    }

    pub fn illegal_argument(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::IllegalArgument {
            method: method.into(),
            reason: reason.into(),
        }
    }
}

/// ハーネス全体のエラー型
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("セットアップエラー: {source}")]
    Setup {
        #[from]
        source: SetupError,
    },

    #[error("ベンチマーク失敗: {benchmark} - {source}")]
    Benchmark {
        benchmark: String,
        #[source]
        source: InvocationError,
    },

    #[error("設定エラー: {source}")]
    Options {
        #[from]
        source: ValidationError,
    },

    #[error("フォークエラー: {benchmark} - {message}")]
    Fork { benchmark: String, message: String },

    #[error("入出力エラー: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("JSONエラー: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl HarnessError {
    /// ベンチマーク失敗エラーの作成
    pub fn benchmark(benchmark: impl Into<String>, source: InvocationError) -> Self {
        Self::Benchmark {
            benchmark: benchmark.into(),
            source,
        }
    }

    /// フォークエラーの作成
    pub fn fork(benchmark: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fork {
            benchmark: benchmark.into(),
            message: message.into(),
        }
    }

    /// ラン全体を中断すべきエラーかどうか
    ///
    /// `Benchmark` だけは fail-on-error 設定次第で継続できる
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Benchmark { .. })
    }

    /// エラーコンテキストを取得
    pub fn context(&self) -> ErrorContext {
        match self {
            Self::Setup { source } => {
                let context = ErrorContext::new("setup");
                match source {
                    SetupError::MethodNotFound { method, .. } => context
                        .with_resource(method.clone())
                        .with_suggestion("対象の型にメソッドが登録されているか確認してください"),
                    SetupError::WrongMethodType { method, .. } => context
                        .with_resource(method.clone())
                        .with_suggestion("要求したMethodTypeと戻り値の型を確認してください"),
                    SetupError::AdapterSynthesis { adapter, .. } => context
                        .with_resource(adapter.clone())
                        .with_suggestion("アダプタの対象メソッドとハンドルが一致しているか確認してください"),
                }
            }
            Self::Benchmark { benchmark, .. } => ErrorContext::new("measurement")
                .with_resource(benchmark.clone()),
            Self::Options { source } => ErrorContext::new("configuration")
                .with_resource(source.field.clone())
                .with_suggestion(format!("設定を確認してください: {}", source.reason)),
            Self::Fork { benchmark, .. } => ErrorContext::new("fork")
                .with_resource(benchmark.clone())
                .with_suggestion("--in-process で再実行するとフォークなしで計測できます"),
            _ => ErrorContext::new("unknown"),
        }
    }
}

/// エラーコンテキスト情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// 実行していた操作
    pub operation: String,
    /// 関連するリソース（メソッド名、ベンチマーク名等）
    pub resource: Option<String>,
    /// エラー解決のための提案
    pub suggestion: Option<String>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            resource: None,
            suggestion: None,
        }
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// バリデーション専用エラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("バリデーションエラー: {field} - {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// セットアップの結果型
pub type SetupResult<T> = std::result::Result<T, SetupError>;

/// ハーネスの結果型
pub type HarnessResult<T> = std::result::Result<T, HarnessError>;

/// 検証結果
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;
