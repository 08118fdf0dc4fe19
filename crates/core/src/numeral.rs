use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumeralStyle {
    Decimal,
    HexLower,
    HexUpper,
    AlphaLower,
    AlphaUpper,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum NumeralError {
    #[error("番号が負です: {0}")]
    InvalidIndex(i64),
}

/// 番号を指定スタイルの文字列にする。widthが0のときはパディングなし。
/// 自然長がwidthを超える場合は切り詰めない。
pub fn format_number(
    number: i64,
    style: NumeralStyle,
    width: usize,
) -> Result<String, NumeralError> {
    if number < 0 {
        return Err(NumeralError::InvalidIndex(number));
    }
    let n = number as u64;

    Ok(match style {
        NumeralStyle::Decimal => format!("{n:0width$}"),
        NumeralStyle::HexLower => format!("{n:0width$x}"),
        NumeralStyle::HexUpper => format!("{n:0width$X}"),
        NumeralStyle::AlphaLower => pad_alpha(alpha_lower(n), 'a', width),
        NumeralStyle::AlphaUpper => pad_alpha(alpha_lower(n).to_ascii_uppercase(), 'A', width),
    })
}

// 全単射26進表記。ゼロの桁が存在しないため "z" の次は "aa" になる。
// 0 -> "a", 25 -> "z", 26 -> "aa", 701 -> "zz", 702 -> "aaa"
fn alpha_lower(mut n: u64) -> String {
    let mut reversed = String::new();
    loop {
        reversed.push(char::from(b'a' + (n % 26) as u8));
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    reversed.chars().rev().collect()
}

// 英字スタイルにはゼロの桁がないため、パディングは先頭文字('a'/'A')で行う。
fn pad_alpha(value: String, pad: char, width: usize) -> String {
    if value.chars().count() >= width {
        return value;
    }
    let mut out = String::with_capacity(width);
    for _ in 0..width - value.chars().count() {
        out.push(pad);
    }
    out.push_str(&value);
    out
}
