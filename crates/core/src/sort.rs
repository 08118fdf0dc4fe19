use crate::source::SourceFile;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CaseMode {
    #[default]
    Caseless,
    Caseful,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderMode {
    #[default]
    Natural,
    Lexicographic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortPolicy {
    pub case: CaseMode,
    pub order: OrderMode,
}

/// 安定ソート。同値は入力順を保つ。降順はソート後に全体を反転する。
pub fn sort_files(files: &mut [SourceFile], policy: &SortPolicy, descending: bool) {
    files.sort_by(|a, b| compare_names(&a.name, &b.name, policy));
    if descending {
        files.reverse();
    }
}

pub fn compare_names(a: &str, b: &str, policy: &SortPolicy) -> Ordering {
    match policy.order {
        OrderMode::Lexicographic => compare_chars(a, b, policy.case),
        OrderMode::Natural => compare_natural(a, b, policy.case),
    }
}

fn compare_natural(a: &str, b: &str, case: CaseMode) -> Ordering {
    let mut a_rest = a;
    let mut b_rest = b;

    while !a_rest.is_empty() && !b_rest.is_empty() {
        let (a_run, a_is_digits, a_tail) = next_run(a_rest);
        let (b_run, b_is_digits, b_tail) = next_run(b_rest);

        let ordering = match (a_is_digits, b_is_digits) {
            (true, true) => compare_digit_runs(a_run, b_run),
            (false, false) => compare_chars(a_run, b_run, case),
            // 同じ位置で種類が異なる場合、数字の連なりが先に並ぶ
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }

        a_rest = a_tail;
        b_rest = b_tail;
    }

    // 一方が他方の前方一致なら短い方が先
    (!a_rest.is_empty()).cmp(&!b_rest.is_empty())
}

// 先頭から、数字の連なりまたは数字以外の連なりを1つ切り出す
fn next_run(s: &str) -> (&str, bool, &str) {
    let is_digits = s.chars().next().is_some_and(|c| c.is_ascii_digit());
    let end = s
        .char_indices()
        .find(|(_, c)| c.is_ascii_digit() != is_digits)
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    (&s[..end], is_digits, &s[end..])
}

// 先頭ゼロを除いた桁数→桁の並びで比較する。整数に変換しないため桁あふれしない。
// 値が等しければ先頭ゼロの数が違っても同値とし、最終的な順序は安定ソートに委ねる。
fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn compare_chars(a: &str, b: &str, case: CaseMode) -> Ordering {
    match case {
        CaseMode::Caseful => a.chars().cmp(b.chars()),
        CaseMode::Caseless => a
            .chars()
            .map(|c| c.to_ascii_lowercase())
            .cmp(b.chars().map(|c| c.to_ascii_lowercase())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn sorted(names: &[&str], policy: SortPolicy, descending: bool) -> Vec<String> {
        let mut files: Vec<SourceFile> = names
            .iter()
            .map(|n| SourceFile::from_path(Path::new(n)))
            .collect();
        sort_files(&mut files, &policy, descending);
        files.into_iter().map(|f| f.name).collect()
    }

    #[test]
    fn natural_orders_digit_runs_numerically() {
        let policy = SortPolicy::default();
        assert_eq!(
            compare_names("file2.jpg", "file10.jpg", &policy),
            Ordering::Less
        );
        assert_eq!(
            sorted(&["file10.jpg", "file1.jpg", "file2.jpg"], policy, false),
            ["file1.jpg", "file2.jpg", "file10.jpg"]
        );
    }

    #[test]
    fn lexicographic_orders_digits_as_characters() {
        let policy = SortPolicy {
            order: OrderMode::Lexicographic,
            ..SortPolicy::default()
        };
        assert_eq!(
            compare_names("file2.jpg", "file10.jpg", &policy),
            Ordering::Greater
        );
    }

    #[test]
    fn caseless_folds_ascii_before_comparing() {
        let policy = SortPolicy::default();
        assert_eq!(compare_names("ABC", "abc", &policy), Ordering::Equal);
        assert_eq!(
            sorted(&["b.txt", "A.txt"], policy, false),
            ["A.txt", "b.txt"]
        );
    }

    #[test]
    fn caseful_distinguishes_case() {
        let policy = SortPolicy {
            case: CaseMode::Caseful,
            ..SortPolicy::default()
        };
        assert_eq!(compare_names("ABC", "abc", &policy), Ordering::Less);
    }

    #[test]
    fn equal_value_with_leading_zeros_keeps_input_order() {
        // 値が同じ数字の連なりは同値。安定ソートが入力順を保つ。
        let policy = SortPolicy::default();
        assert_eq!(compare_names("a01.txt", "a1.txt", &policy), Ordering::Equal);
        assert_eq!(
            sorted(&["a01.txt", "a1.txt"], policy, false),
            ["a01.txt", "a1.txt"]
        );
        assert_eq!(
            sorted(&["a1.txt", "a01.txt"], policy, false),
            ["a1.txt", "a01.txt"]
        );
    }

    #[test]
    fn digit_run_sorts_before_text_run() {
        let policy = SortPolicy::default();
        assert_eq!(compare_names("a1", "ab", &policy), Ordering::Less);
    }

    #[test]
    fn prefix_sorts_first() {
        let policy = SortPolicy::default();
        assert_eq!(compare_names("file", "file2", &policy), Ordering::Less);
        assert_eq!(compare_names("file2", "file2a", &policy), Ordering::Less);
    }

    #[test]
    fn huge_digit_runs_do_not_overflow() {
        let policy = SortPolicy::default();
        assert_eq!(
            compare_names(
                "a184467440737095516151.txt",
                "a184467440737095516160.txt",
                &policy
            ),
            Ordering::Less
        );
    }

    #[test]
    fn descending_reverses_after_sorting() {
        let policy = SortPolicy::default();
        assert_eq!(
            sorted(&["b.jpg", "c.jpg", "a.jpg"], policy, true),
            ["c.jpg", "b.jpg", "a.jpg"]
        );
    }
}
