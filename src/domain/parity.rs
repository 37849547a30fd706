use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static DIGIT_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("digit pattern is a valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    Odd,
    Even,
}

impl Parity {
    pub fn is_odd(self) -> bool {
        matches!(self, Parity::Odd)
    }
}

impl From<bool> for Parity {
    fn from(is_odd: bool) -> Self {
        if is_odd {
            Parity::Odd
        } else {
            Parity::Even
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parity::Odd => f.write_str("odd"),
            Parity::Even => f.write_str("even"),
        }
    }
}

/// 依識別碼中數字的最後兩位判斷奇偶，奇數回傳 `true`。
///
/// 所有數字片段會依出現順序串接；完全沒有數字時視為奇數。
pub fn resolve_parity(identifier: &str) -> bool {
    let digits: String = DIGIT_RUNS
        .find_iter(identifier)
        .map(|m| m.as_str())
        .collect();

    if digits.is_empty() {
        return true;
    }

    // 只含 ASCII 數字，可以直接以位元組切片
    let suffix = &digits[digits.len().saturating_sub(2)..];

    suffix
        .parse::<u32>()
        .map(|value| value % 2 == 1)
        .unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_suffix() {
        assert!(!resolve_parity("REG1234"));
    }

    #[test]
    fn test_odd_suffix() {
        assert!(resolve_parity("REG12345"));
    }

    #[test]
    fn test_no_digits_falls_back_to_odd() {
        assert!(resolve_parity("ABC"));
        assert!(resolve_parity(""));
        assert!(resolve_parity("reg-no/none"));
    }

    #[test]
    fn test_single_digit() {
        assert!(resolve_parity("A7"));
        assert!(!resolve_parity("A8"));
        assert!(!resolve_parity("0"));
    }

    #[test]
    fn test_digit_runs_are_concatenated() {
        // "12" + "3" -> "123" -> "23"
        assert!(resolve_parity("A12B3"));
        // "1" + "0" -> "10"
        assert!(!resolve_parity("X1Y0Z"));
    }

    #[test]
    fn test_only_digit_content_matters() {
        let pairs = [
            ("REG-2024-0042", "20240042"),
            ("0xFF15", "015"),
            ("a1b2c3d4", "1234"),
        ];
        for (decorated, plain) in pairs {
            assert_eq!(resolve_parity(decorated), resolve_parity(plain), "{decorated}");
        }
    }

    #[test]
    fn test_non_ascii_digits_are_ignored() {
        // 阿拉伯-印度數字不列入計算
        assert!(!resolve_parity("REG٣4"));
        assert!(resolve_parity("٣٤"));
    }

    #[test]
    fn test_leading_zero_suffix() {
        assert!(resolve_parity("REG1201"));
        assert!(!resolve_parity("REG1200"));
    }

    #[test]
    fn test_parity_conversions() {
        assert_eq!(Parity::from(true), Parity::Odd);
        assert_eq!(Parity::from(false), Parity::Even);
        assert!(Parity::Odd.is_odd());
        assert_eq!(Parity::Even.to_string(), "even");
    }
}
