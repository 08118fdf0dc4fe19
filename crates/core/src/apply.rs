use crate::planner::RenamePlan;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct ExecuteOptions {
    pub overwrite: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Outcome {
    Renamed,
    SkippedConflict,
    SkippedDryRun,
    FailedOs(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileOutcome {
    pub source_path: PathBuf,
    pub target_path: PathBuf,
    pub outcome: Outcome,
}

/// 計画を実行し、計画と同じ順序で1ファイル1件の結果を返す。
/// 実行中のエラーはそのエントリに閉じ、残りの処理は必ず継続する。
pub fn execute_plan(plan: &RenamePlan, options: &ExecuteOptions) -> Vec<FileOutcome> {
    let mut outcomes: Vec<Option<Outcome>> = vec![None; plan.candidates.len()];

    // 自分自身へのリネームはシステムコールなしで成立する
    for (i, candidate) in plan.candidates.iter().enumerate() {
        if !candidate.changed {
            outcomes[i] = Some(if options.dry_run {
                Outcome::SkippedDryRun
            } else {
                Outcome::Renamed
            });
        }
    }

    let mut pending: Vec<usize> = plan
        .candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| c.changed)
        .map(|(i, _)| i)
        .collect();

    detect_conflicts(plan, options.overwrite, &mut pending, &mut outcomes);

    if options.dry_run {
        for &i in &pending {
            outcomes[i] = Some(Outcome::SkippedDryRun);
        }
    } else {
        run_renames(plan, pending, &mut outcomes);
    }

    plan.candidates
        .iter()
        .zip(outcomes)
        .map(|(candidate, outcome)| FileOutcome {
            source_path: candidate.source.path.clone(),
            target_path: candidate.target_path.clone(),
            outcome: outcome
                .unwrap_or_else(|| Outcome::FailedOs("結果が解決されませんでした".to_string())),
        })
        .collect()
}

// 集合の外にある既存ファイルとの衝突を検出する。スキップしたエントリは
// 元の名前を塞いだままになるため、新たな衝突が出なくなるまで繰り返す。
fn detect_conflicts(
    plan: &RenamePlan,
    overwrite: bool,
    pending: &mut Vec<usize>,
    outcomes: &mut [Option<Outcome>],
) {
    if overwrite {
        return;
    }

    loop {
        let moving: HashSet<&Path> = pending
            .iter()
            .map(|&i| plan.candidates[i].source.path.as_path())
            .collect();

        let mut skipped = Vec::new();
        for &i in pending.iter() {
            let target = plan.candidates[i].target_path.as_path();
            if target.exists() && !moving.contains(target) {
                skipped.push(i);
            }
        }
        if skipped.is_empty() {
            return;
        }

        for i in skipped {
            outcomes[i] = Some(Outcome::SkippedConflict);
            pending.retain(|&j| j != i);
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Holder {
    index: usize,
    // 移動に失敗またはスキップし、現在の名前を塞いだままのエントリ
    stuck: bool,
}

// ターゲット名を塞いでいる集合内メンバーが移動するまで各エントリを待たせる。
// 全員が互いを待つ真の循環だけ、1件を一時名に退避して解く。
fn run_renames(plan: &RenamePlan, pending: Vec<usize>, outcomes: &mut [Option<Outcome>]) {
    let mut location: HashMap<usize, PathBuf> = pending
        .iter()
        .map(|&i| (i, plan.candidates[i].source.path.clone()))
        .collect();
    let mut holders: HashMap<PathBuf, Holder> = pending
        .iter()
        .map(|&i| {
            (
                plan.candidates[i].source.path.clone(),
                Holder {
                    index: i,
                    stuck: false,
                },
            )
        })
        .collect();

    let mut queue = pending;
    let mut temp_seq = 0usize;

    while !queue.is_empty() {
        let mut blocked = Vec::new();
        let mut progressed = false;

        for &i in &queue {
            let target = plan.candidates[i].target_path.as_path();

            if let Some(holder) = holders.get(target).copied().filter(|h| h.index != i) {
                if holder.stuck {
                    outcomes[i] = Some(Outcome::SkippedConflict);
                    mark_stuck(&mut holders, location.get(&i));
                    progressed = true;
                } else {
                    blocked.push(i);
                }
                continue;
            }

            let Some(from) = location.get(&i).cloned() else {
                continue;
            };
            match fs::rename(&from, target) {
                Ok(()) => {
                    holders.remove(&from);
                    outcomes[i] = Some(Outcome::Renamed);
                    progressed = true;
                }
                Err(err) => {
                    outcomes[i] = Some(Outcome::FailedOs(err.to_string()));
                    mark_stuck(&mut holders, Some(&from));
                    progressed = true;
                }
            }
        }

        if !progressed && !blocked.is_empty() {
            let i = blocked[0];
            if let Some(from) = location.get(&i).cloned() {
                let temp = temp_path_for(&from, temp_seq);
                temp_seq += 1;
                match fs::rename(&from, &temp) {
                    Ok(()) => {
                        holders.remove(&from);
                        location.insert(i, temp);
                    }
                    Err(err) => {
                        outcomes[i] = Some(Outcome::FailedOs(err.to_string()));
                        mark_stuck(&mut holders, Some(&from));
                        blocked.remove(0);
                    }
                }
            } else {
                blocked.remove(0);
            }
        }

        queue = blocked;
    }
}

fn mark_stuck(holders: &mut HashMap<PathBuf, Holder>, path: Option<&PathBuf>) {
    if let Some(path) = path {
        if let Some(holder) = holders.get_mut(path) {
            holder.stuck = true;
        }
    }
}

fn temp_path_for(original: &Path, seq: usize) -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let parent = original.parent().unwrap_or_else(|| Path::new("."));
    let file_name = original
        .file_name()
        .map(|v| v.to_string_lossy().to_string())
        .unwrap_or_else(|| "file".to_string());
    parent.join(format!(".renban_tmp_{}_{}_{}", now, seq, file_name))
}
