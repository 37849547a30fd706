use crate::domain::parity::Parity;
use crate::utils::error::ConfigError;
use regex::Regex;
use std::sync::LazyLock;

/// 預設的佔位字串
pub const DEFAULT_PLACEHOLDER_MARKERS: &[&str] = &["PUT YOUR"];

// 配置載入後仍未替換的 ${VAR}
static UNRESOLVED_ENV_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{[^}]+\}").expect("env reference pattern is a valid regex"));

/// 判斷查詢字串是否仍是空值或佔位內容
pub fn is_placeholder<S: AsRef<str>>(query: &str, markers: &[S]) -> bool {
    query.trim().is_empty()
        || markers.iter().any(|marker| {
            let marker: &str = marker.as_ref();
            !marker.is_empty() && query.contains(marker)
        })
        || UNRESOLVED_ENV_REF.is_match(query)
}

/// 依奇偶選出最終查詢，使用預設佔位字串
pub fn select_query(
    is_odd: bool,
    odd_query: &str,
    even_query: &str,
) -> Result<String, ConfigError> {
    select_query_with_markers(is_odd, odd_query, even_query, DEFAULT_PLACEHOLDER_MARKERS)
}

pub fn select_query_with_markers<S: AsRef<str>>(
    is_odd: bool,
    odd_query: &str,
    even_query: &str,
    markers: &[S],
) -> Result<String, ConfigError> {
    let selected = if is_odd { odd_query } else { even_query };

    if is_placeholder(selected, markers) {
        return Err(ConfigError::Unset {
            parity: Parity::from(is_odd),
        });
    }

    Ok(selected.to_string())
}
