use crate::numeral::NumeralError;
use crate::sort::{sort_files, CaseMode, OrderMode, SortPolicy};
use crate::source::SourceFile;
use crate::template::{compile_template, render_template, TemplateError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct PlanOptions {
    pub template: String,
    pub start: i64,
    pub case: CaseMode,
    pub order: OrderMode,
    pub descending: bool,
    pub no_sort: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            template: String::new(),
            start: 1,
            case: CaseMode::Caseless,
            order: OrderMode::Natural,
            descending: false,
            no_sort: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenameCandidate {
    pub source: SourceFile,
    pub number: i64,
    pub target_name: String,
    pub target_path: PathBuf,
    pub changed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct RenameStats {
    pub planned: usize,
    pub unchanged: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenamePlan {
    pub template: String,
    pub candidates: Vec<RenameCandidate>,
    pub stats: RenameStats,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Numeral(#[from] NumeralError),
    #[error("リネーム先が重複しています: {0}")]
    DuplicateTarget(String),
}

/// 計画はファイルシステムに触れない。既存ファイルとの衝突検出と実行はapply側が行う。
pub fn generate_plan(paths: &[PathBuf], options: &PlanOptions) -> Result<RenamePlan, PlanError> {
    let parts = compile_template(&options.template)?;

    let mut files: Vec<SourceFile> = paths.iter().map(|p| SourceFile::from_path(p)).collect();
    if !options.no_sort {
        let policy = SortPolicy {
            case: options.case,
            order: options.order,
        };
        sort_files(&mut files, &policy, options.descending);
    }

    let mut stats = RenameStats::default();
    let mut candidates = Vec::with_capacity(files.len());
    let mut planned_paths = HashSet::<PathBuf>::new();

    for (i, source) in files.into_iter().enumerate() {
        let number = options.start + i as i64;
        let target_name = render_template(&parts, number, &source)?;
        let target_path = resolve_target(&source.path, &target_name);

        if !planned_paths.insert(target_path.clone()) {
            return Err(PlanError::DuplicateTarget(target_name));
        }

        let changed = target_path != source.path;
        if !changed {
            stats.unchanged += 1;
        }
        stats.planned += 1;

        candidates.push(RenameCandidate {
            source,
            number,
            target_name,
            target_path,
            changed,
        });
    }

    Ok(RenamePlan {
        template: options.template.clone(),
        candidates,
        stats,
    })
}

// 元パスのディレクトリ内で名前だけ置き換える
fn resolve_target(original: &Path, target_name: &str) -> PathBuf {
    original.with_file_name(target_name)
}
