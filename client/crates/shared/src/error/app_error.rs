//! Application Error - Unified error type for the client
//!
//! Defines [`AppError`] and [`AppResult<T>`]. This is what UI layers
//! render: a message for the user, an optional action hint, and the
//! [`Recovery`] the kind implies.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;

use super::kind::{ErrorKind, Recovery};

type BoxedSource = Box<dyn Error + Send + Sync + 'static>;

/// クライアント統一エラー型
///
/// ## Examples
/// ```rust
/// use kernel::error::app_error::AppError;
/// use kernel::error::kind::Recovery;
///
/// let err = AppError::network("Could not reach the server")
///     .with_action("Check your connection and retry");
/// assert_eq!(err.recovery(), Recovery::Retry);
/// ```
pub struct AppError {
    kind: ErrorKind,
    message: Cow<'static, str>,
    /// 画面に表示する対処方法
    action: Option<Cow<'static, str>>,
    /// デバッグ用の元エラー
    source: Option<BoxedSource>,
}

/// アプリケーション結果型エイリアス
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            action: None,
            source: None,
        }
    }

    /// リモート API が返したステータスから作成
    pub fn from_status(status: u16, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::from_status(status), message)
    }

    pub fn unauthorized(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// 応答が得られなかった
    pub fn network(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InternalServerError, message)
    }

    pub fn with_action(self, action: impl Into<Cow<'static, str>>) -> Self {
        Self {
            action: Some(action.into()),
            ..self
        }
    }

    pub fn with_source<E>(self, source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            source: Some(Box::new(source)),
            ..self
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn recovery(&self) -> Recovery {
        self.kind.recovery()
    }

    /// 再試行で回復しうるか
    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("action", &self.action)
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.action {
            Some(action) => write!(f, "{}: {} ({})", self.kind, self.message, action),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn Error + 'static))
    }
}

/// `Result<T, E>` を `AppResult<T>` に変換する拡張トレイト
pub trait ResultExt<T, E> {
    /// エラーを元エラー付きの `AppError` に包む
    fn map_app_err(self, kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> AppResult<T>
    where
        E: Error + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn map_app_err(self, kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> AppResult<T>
    where
        E: Error + Send + Sync + 'static,
    {
        self.map_err(|e| AppError::new(kind, message).with_source(e))
    }
}

/// `Option<T>` を `AppResult<T>` に変換する拡張トレイト
pub trait OptionExt<T> {
    fn ok_or_app_err(self, kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> AppResult<T>;

    /// `None` を 401 として扱う
    fn ok_or_unauthorized(self, message: impl Into<Cow<'static, str>>) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_app_err(self, kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> AppResult<T> {
        self.ok_or_else(|| AppError::new(kind, message))
    }

    fn ok_or_unauthorized(self, message: impl Into<Cow<'static, str>>) -> AppResult<T> {
        self.ok_or_app_err(ErrorKind::Unauthorized, message)
    }
}
