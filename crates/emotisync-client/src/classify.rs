//! Transport-failure classification.
//!
//! An explicit ordered rule list over the raw transport message; the first
//! match wins, so "timeout" dominates any other substring that happens to
//! be present. Kept as a pure function instead of scattering string checks
//! through the request path.

use thiserror::Error;

/// Terminal classification of a failed request. The display text is the
/// user-facing notice for that kind.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestError {
    #[error("请求超时，请检查网络连接或稍后重试")]
    Timeout,
    #[error("网络连接失败，请检查服务器状态")]
    Network,
    #[error("服务接口不存在")]
    NotFound,
    #[error("服务器内部错误")]
    Server,
    #[error("表情识别失败")]
    Unknown,
}

/// (substring, classified kind), evaluated in priority order.
const RULES: &[(&str, RequestError)] = &[
    ("timeout", RequestError::Timeout),
    ("request:fail", RequestError::Network),
    ("404", RequestError::NotFound),
    ("500", RequestError::Server),
];

/// Classify a raw transport message into a terminal request error.
pub fn classify_failure(message: &str) -> RequestError {
    for &(needle, kind) in RULES {
        if message.contains(needle) {
            tracing::debug!(needle, ?kind, message, "transport failure classified");
            return kind;
        }
    }
    tracing::debug!(message, "transport failure did not match any rule");
    RequestError::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_rule() {
        assert_eq!(classify_failure("request:fail timeout"), RequestError::Timeout);
    }

    #[test]
    fn test_timeout_dominates_other_substrings() {
        // Priority order, not match position, decides the kind.
        assert_eq!(
            classify_failure("request:fail 500 timeout 404"),
            RequestError::Timeout
        );
    }

    #[test]
    fn test_network_rule() {
        assert_eq!(
            classify_failure("request:fail connection refused"),
            RequestError::Network
        );
    }

    #[test]
    fn test_not_found_rule() {
        assert_eq!(
            classify_failure("unexpected status 404 Not Found"),
            RequestError::NotFound
        );
    }

    #[test]
    fn test_server_rule() {
        assert_eq!(
            classify_failure("unexpected status 500 Internal Server Error"),
            RequestError::Server
        );
    }

    #[test]
    fn test_unmatched_message_is_unknown() {
        assert_eq!(classify_failure("something odd happened"), RequestError::Unknown);
    }

    #[test]
    fn test_user_messages_are_distinct() {
        let kinds = [
            RequestError::Timeout,
            RequestError::Network,
            RequestError::NotFound,
            RequestError::Server,
            RequestError::Unknown,
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(a.to_string(), b.to_string());
            }
        }
    }
}
