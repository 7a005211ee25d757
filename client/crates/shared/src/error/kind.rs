//! Error Kind - Classification of errors
//!
//! A client receives status codes rather than choosing them, so the
//! classification runs both ways: a kind knows its status, and any status
//! from the remote API can be bucketed into a kind.

use serde::Serialize;

/// エラー種別
///
/// リモート API の応答（または応答の欠如）を分類します。
/// UI はこの分類から「再ログイン」「再試行」「何もしない」を選びます。
///
/// ## Examples
/// ```rust
/// use kernel::error::kind::{ErrorKind, Recovery};
///
/// let kind = ErrorKind::from_status(401);
/// assert_eq!(kind, ErrorKind::Unauthorized);
/// assert_eq!(kind.recovery(), Recovery::SignIn);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// 400 および個別に扱わない 4xx
    BadRequest,
    /// 401 - 資格情報が拒否された
    Unauthorized,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 408
    RequestTimeout,
    /// 409
    Conflict,
    /// 429 - レート制限
    TooManyRequests,
    /// 500 および個別に扱わない 5xx
    InternalServerError,
    /// 502 - 応答本文が想定外の場合もこれに分類
    BadGateway,
    /// 503
    ServiceUnavailable,
    /// 504
    GatewayTimeout,
    /// 応答なし（DNS、接続、TLS）
    Network,
}

/// エラー発生後に UI が取るべき対応
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// 資格情報が無効。サインイン画面へ
    SignIn,
    /// 一時的な障害。同じ操作を再試行できる
    Retry,
    /// 再試行しても結果は変わらない
    None,
}

impl ErrorKind {
    /// 対応する HTTP ステータスコード（`Network` は `0`）
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::RequestTimeout => 408,
            Self::Conflict => 409,
            Self::TooManyRequests => 429,
            Self::InternalServerError => 500,
            Self::BadGateway => 502,
            Self::ServiceUnavailable => 503,
            Self::GatewayTimeout => 504,
            Self::Network => 0,
        }
    }

    /// 受信したステータスコードを分類
    ///
    /// 成功系を含め、個別に扱わないコードは 4xx 側に丸めます。
    ///
    /// ```rust
    /// use kernel::error::kind::ErrorKind;
    /// assert_eq!(ErrorKind::from_status(418), ErrorKind::BadRequest);
    /// assert_eq!(ErrorKind::from_status(599), ErrorKind::InternalServerError);
    /// ```
    pub const fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            408 => Self::RequestTimeout,
            409 => Self::Conflict,
            429 => Self::TooManyRequests,
            502 => Self::BadGateway,
            503 => Self::ServiceUnavailable,
            504 => Self::GatewayTimeout,
            500..=599 => Self::InternalServerError,
            _ => Self::BadRequest,
        }
    }

    /// 表示用ラベル
    pub const fn label(&self) -> &'static str {
        match self {
            Self::BadRequest => "Bad Request",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not Found",
            Self::RequestTimeout => "Request Timeout",
            Self::Conflict => "Conflict",
            Self::TooManyRequests => "Too Many Requests",
            Self::InternalServerError => "Server Error",
            Self::BadGateway => "Bad Gateway",
            Self::ServiceUnavailable => "Service Unavailable",
            Self::GatewayTimeout => "Gateway Timeout",
            Self::Network => "Network Error",
        }
    }

    /// 一時的な障害かどうか
    ///
    /// `true` の場合、セッションを破棄してはいけません。
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network | Self::RequestTimeout | Self::TooManyRequests
        ) || self.status_code() >= 500
    }

    pub const fn recovery(&self) -> Recovery {
        match self {
            Self::Unauthorized => Recovery::SignIn,
            kind if kind.is_transient() => Recovery::Retry,
            _ => Recovery::None,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
