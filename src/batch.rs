//! Batch planning and execution.
//!
//! [`plan_batch`] turns user input into the list of archives to convert:
//!
//! * no inputs → discover archives recursively under the working directory;
//! * a directory input → discover under it (so a lone directory argument
//!   "drills down" into that directory);
//! * a file input → kept if its name classifies as an archive.
//!
//! Archives whose `.pdf` already exists are skipped, which makes re-running
//! over the same directory cheap and idempotent. The rest are converted one
//! by one in ascending path order by [`run_batch`].

use crate::config::ConversionConfig;
use crate::convert::{convert_archive, ConversionOutcome};
use crate::pipeline::classify::{archive_kind, output_path_for};
use crate::pipeline::walk::collect_archives;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// What [`plan_batch`] decided.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    /// Archives to convert, sorted and de-duplicated.
    pub pending: Vec<PathBuf>,
    /// Archives whose PDF already exists.
    pub skipped_existing: Vec<PathBuf>,
    /// Explicit inputs that are neither directories nor archives.
    pub ignored: Vec<PathBuf>,
}

/// One archive's entry in a [`BatchReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveReport {
    pub archive: PathBuf,
    pub outcome: ConversionOutcome,
}

/// Summary of a whole batch run.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// One entry per attempted archive, in processing order.
    pub results: Vec<ArchiveReport>,
    pub skipped_existing: Vec<PathBuf>,
    pub ignored: Vec<PathBuf>,
    pub total_duration_ms: u64,
}

impl BatchReport {
    pub fn converted(&self) -> usize {
        self.count(|o| matches!(o, ConversionOutcome::Converted { .. }))
    }

    pub fn below_threshold(&self) -> usize {
        self.count(|o| matches!(o, ConversionOutcome::BelowThreshold { .. }))
    }

    /// Extraction, assembly and classification failures.
    pub fn failed(&self) -> usize {
        self.results.len() - self.converted() - self.below_threshold()
    }

    /// Every PDF written by this run.
    pub fn outputs(&self) -> Vec<&Path> {
        self.results.iter().filter_map(|r| r.outcome.output()).collect()
    }

    fn count(&self, pred: impl Fn(&ConversionOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }
}

fn resolve(input: &Path, cwd: &Path) -> PathBuf {
    if input.is_absolute() {
        input.to_path_buf()
    } else {
        cwd.join(input)
    }
}

/// Decide which archives to convert.
pub fn plan_batch(inputs: &[PathBuf], cwd: &Path) -> BatchPlan {
    let mut plan = BatchPlan::default();
    let mut candidates = Vec::new();

    if inputs.is_empty() {
        candidates = collect_archives(cwd);
    } else {
        for input in inputs {
            let path = resolve(input, cwd);
            if path.is_dir() {
                candidates.extend(collect_archives(&path));
            } else if archive_kind(&path).is_some() {
                candidates.push(path);
            } else {
                plan.ignored.push(path);
            }
        }
    }

    // Plain string order, not `Path`'s component order.
    candidates.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    candidates.dedup();

    for archive in candidates {
        if output_path_for(&archive).exists() {
            plan.skipped_existing.push(archive);
        } else {
            plan.pending.push(archive);
        }
    }
    plan
}

/// Plan and run a batch. Never stops early on a failed archive.
pub fn run_batch(inputs: &[PathBuf], cwd: &Path, config: &ConversionConfig) -> BatchReport {
    let start = Instant::now();
    let plan = plan_batch(inputs, cwd);
    let total = plan.pending.len();
    info!(
        "{} archives to convert, {} already converted",
        total,
        plan.skipped_existing.len()
    );

    let cb = config.progress_callback.as_ref();
    if let Some(cb) = cb {
        cb.on_batch_start(total);
    }

    let mut results = Vec::with_capacity(total);
    for (i, archive) in plan.pending.into_iter().enumerate() {
        if let Some(cb) = cb {
            cb.on_archive_start(i + 1, total, &archive);
        }
        let outcome = convert_archive(&archive, config);
        if let Some(cb) = cb {
            cb.on_archive_complete(i + 1, total, &archive, &outcome);
        }
        results.push(ArchiveReport { archive, outcome });
    }

    let report = BatchReport {
        results,
        skipped_existing: plan.skipped_existing,
        ignored: plan.ignored,
        total_duration_ms: start.elapsed().as_millis() as u64,
    };
    if let Some(cb) = cb {
        cb.on_batch_complete(&report);
    }
    report
}
