use crate::numeral::{format_number, NumeralError, NumeralStyle};
use crate::source::SourceFile;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplatePart {
    Literal(String),
    Number { style: NumeralStyle, width: usize },
    FileName(FileToken),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileToken {
    Name,
    Stem,
    Suffix,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("テンプレートが空です")]
    Empty,
    #[error("番号ディレクティブが1つも含まれていません")]
    MissingNumber,
    #[error("末尾の % が閉じられていません")]
    TrailingPercent,
    #[error("未対応ディレクティブです: %{0}")]
    UnknownDirective(char),
    #[error("このディレクティブに幅指定は使えません: %{0}")]
    WidthNotAllowed(String),
    #[error("幅指定が不正です: {0}")]
    InvalidWidth(String),
}

pub fn validate_template(input: &str) -> Result<(), TemplateError> {
    compile_template(input).map(|_| ())
}

pub fn compile_template(input: &str) -> Result<Vec<TemplatePart>, TemplateError> {
    if input.is_empty() {
        return Err(TemplateError::Empty);
    }

    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut has_number = false;
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            literal.push(ch);
            continue;
        }

        let mut width_digits = String::new();
        while let Some(&next) = chars.peek() {
            if next.is_ascii_digit() {
                width_digits.push(next);
                chars.next();
            } else {
                break;
            }
        }

        let Some(directive) = chars.next() else {
            return Err(TemplateError::TrailingPercent);
        };

        // bf/xf は2文字で1ディレクティブ。%x との曖昧さは長い方を優先して解消する。
        let style = match directive {
            'd' => Some(NumeralStyle::Decimal),
            'x' if chars.peek() != Some(&'f') => Some(NumeralStyle::HexLower),
            'X' => Some(NumeralStyle::HexUpper),
            'a' => Some(NumeralStyle::AlphaLower),
            'A' => Some(NumeralStyle::AlphaUpper),
            _ => None,
        };

        if let Some(style) = style {
            let width = parse_width(&width_digits)?;
            flush_literal(&mut literal, &mut parts);
            parts.push(TemplatePart::Number { style, width });
            has_number = true;
            continue;
        }

        let token = match directive {
            'f' => Some((FileToken::Name, "f")),
            'b' if chars.peek() == Some(&'f') => {
                chars.next();
                Some((FileToken::Stem, "bf"))
            }
            'x' if chars.peek() == Some(&'f') => {
                chars.next();
                Some((FileToken::Suffix, "xf"))
            }
            _ => None,
        };

        if let Some((token, name)) = token {
            if !width_digits.is_empty() {
                return Err(TemplateError::WidthNotAllowed(name.to_string()));
            }
            flush_literal(&mut literal, &mut parts);
            parts.push(TemplatePart::FileName(token));
            continue;
        }

        if directive == '%' {
            if !width_digits.is_empty() {
                return Err(TemplateError::WidthNotAllowed("%".to_string()));
            }
            literal.push('%');
            continue;
        }

        return Err(TemplateError::UnknownDirective(directive));
    }

    flush_literal(&mut literal, &mut parts);

    if !has_number {
        return Err(TemplateError::MissingNumber);
    }

    Ok(parts)
}

pub fn render_template(
    parts: &[TemplatePart],
    number: i64,
    source: &SourceFile,
) -> Result<String, NumeralError> {
    let mut output = String::new();
    for part in parts {
        match part {
            TemplatePart::Literal(text) => output.push_str(text),
            TemplatePart::Number { style, width } => {
                output.push_str(&format_number(number, *style, *width)?);
            }
            TemplatePart::FileName(token) => output.push_str(match token {
                FileToken::Name => &source.name,
                FileToken::Stem => &source.stem,
                FileToken::Suffix => &source.suffix,
            }),
        }
    }
    Ok(output)
}

fn flush_literal(literal: &mut String, parts: &mut Vec<TemplatePart>) {
    if !literal.is_empty() {
        parts.push(TemplatePart::Literal(std::mem::take(literal)));
    }
}

fn parse_width(digits: &str) -> Result<usize, TemplateError> {
    if digits.is_empty() {
        return Ok(0);
    }
    digits
        .parse::<usize>()
        .map_err(|_| TemplateError::InvalidWidth(digits.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn source() -> SourceFile {
        SourceFile::from_path(Path::new("photos/IMG_0001.JPG"))
    }

    #[test]
    fn compile_template_ok() {
        let parts = compile_template("set_%3d%xf").expect("must compile");
        assert_eq!(
            parts,
            vec![
                TemplatePart::Literal("set_".to_string()),
                TemplatePart::Number {
                    style: NumeralStyle::Decimal,
                    width: 3
                },
                TemplatePart::FileName(FileToken::Suffix),
            ]
        );
    }

    #[test]
    fn compile_requires_number_directive() {
        let err = compile_template("abc").expect_err("must fail");
        assert_eq!(err, TemplateError::MissingNumber);
        let err = compile_template("%f_%bf").expect_err("must fail");
        assert_eq!(err, TemplateError::MissingNumber);
    }

    #[test]
    fn compile_rejects_empty_input() {
        assert_eq!(compile_template(""), Err(TemplateError::Empty));
    }

    #[test]
    fn compile_rejects_unknown_directive() {
        let err = compile_template("abc%q").expect_err("must fail");
        assert_eq!(err, TemplateError::UnknownDirective('q'));
    }

    #[test]
    fn compile_rejects_trailing_percent() {
        assert_eq!(compile_template("abc%"), Err(TemplateError::TrailingPercent));
        assert_eq!(compile_template("%3"), Err(TemplateError::TrailingPercent));
    }

    #[test]
    fn compile_rejects_width_on_string_directives() {
        assert_eq!(
            compile_template("%2f%d"),
            Err(TemplateError::WidthNotAllowed("f".to_string()))
        );
        assert_eq!(
            compile_template("%2bf%d"),
            Err(TemplateError::WidthNotAllowed("bf".to_string()))
        );
        assert_eq!(
            compile_template("%2xf%d"),
            Err(TemplateError::WidthNotAllowed("xf".to_string()))
        );
        assert_eq!(
            compile_template("%2%%d"),
            Err(TemplateError::WidthNotAllowed("%".to_string()))
        );
    }

    #[test]
    fn escaped_percent_coalesces_into_literal() {
        let parts = compile_template("100%%_%d").expect("must compile");
        assert_eq!(
            parts,
            vec![
                TemplatePart::Literal("100%_".to_string()),
                TemplatePart::Number {
                    style: NumeralStyle::Decimal,
                    width: 0
                },
            ]
        );
    }

    #[test]
    fn xf_wins_over_hex_followed_by_literal() {
        let parts = compile_template("%d%xf").expect("must compile");
        assert_eq!(parts[1], TemplatePart::FileName(FileToken::Suffix));

        // fが続かない %x は16進ディレクティブのまま
        let parts = compile_template("%d%xg").expect("must compile");
        assert_eq!(
            parts[1],
            TemplatePart::Number {
                style: NumeralStyle::HexLower,
                width: 0
            }
        );
        assert_eq!(parts[2], TemplatePart::Literal("g".to_string()));
    }

    #[test]
    fn leading_zero_width_is_plain_integer() {
        let parts = compile_template("%03d").expect("must compile");
        assert_eq!(
            parts,
            vec![TemplatePart::Number {
                style: NumeralStyle::Decimal,
                width: 3
            }]
        );
    }

    #[test]
    fn render_expands_file_tokens_from_source() {
        let parts = compile_template("%bf_%2d%xf").expect("must compile");
        let rendered = render_template(&parts, 7, &source()).expect("must render");
        assert_eq!(rendered, "IMG_0001_07.JPG");
    }

    #[test]
    fn render_full_name_token() {
        let parts = compile_template("%d_%f").expect("must compile");
        let rendered = render_template(&parts, 1, &source()).expect("must render");
        assert_eq!(rendered, "1_IMG_0001.JPG");
    }

    #[test]
    fn rendered_indices_are_distinct_and_increasing() {
        let parts = compile_template("set_%3d.jpg").expect("must compile");
        let mut previous = String::new();
        for number in 1..=999 {
            let rendered = render_template(&parts, number, &source()).expect("must render");
            assert_eq!(rendered.len(), "set_".len() + 3 + ".jpg".len());
            assert!(rendered > previous, "{rendered} must sort after {previous}");
            previous = rendered;
        }
    }

    #[test]
    fn render_propagates_negative_number_error() {
        let parts = compile_template("%d").expect("must compile");
        let err = render_template(&parts, -5, &source()).expect_err("must fail");
        assert_eq!(err, NumeralError::InvalidIndex(-5));
    }
}
