//! The canonical two-round job: count URL occurrences, then globally rank
//! the top 10.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::mapreduce::{Job, KeyValue, MapFn, ReduceFn, RoundArgs};
use crate::topn::top_n;

/// Builds the two-round URL-top-10 job over `input_files`, using
/// `n_workers` reduce partitions for Round 1 (the count round).
///
/// Round 2 always uses a single reduce partition: its map emits every
/// `KeyValue` with `key=""`, so every entry lands in the same partition
/// regardless of `n_reduce` — per the Design Notes, behavior for any other
/// `n_reduce` value in round 2 is undefined, so we don't expose it as a
/// parameter.
pub fn url_top10_job(job_name: impl Into<String>, data_dir: impl Into<PathBuf>, input_files: Vec<PathBuf>, n_workers: usize) -> Job {
    Job {
        job_name: job_name.into(),
        data_dir: data_dir.into(),
        input_files,
        rounds: vec![count_round(n_workers), top10_round()],
    }
}

fn count_round(n_reduce: usize) -> RoundArgs {
    let map_f: MapFn = Arc::new(|_filename, contents| {
        contents
            .lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .map(|line| KeyValue::new(line, ""))
            .collect()
    });

    let reduce_f: ReduceFn = Arc::new(|key, values| format!("{key} {}\n", values.len()));

    RoundArgs::new(map_f, reduce_f, n_reduce)
}

fn top10_round() -> RoundArgs {
    let map_f: MapFn = Arc::new(|_filename, contents| {
        let counts = parse_url_counts(contents);
        top_n(&counts, 10)
            .into_iter()
            .map(|uc| KeyValue::new("", format!("{} {}", uc.url, uc.cnt)))
            .collect()
    });

    let reduce_f: ReduceFn = Arc::new(|_key, values| {
        let counts = parse_url_count_lines(values);
        top_n(&counts, 10)
            .into_iter()
            .map(|uc| format!("{}: {}\n", uc.url, uc.cnt))
            .collect()
    });

    RoundArgs::new(map_f, reduce_f, 1)
}

fn parse_url_counts(contents: &str) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for line in contents.lines() {
        if let Some((url, count)) = parse_url_count_line(line) {
            counts.insert(url, count);
        }
    }
    counts
}

fn parse_url_count_lines(values: &[String]) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for value in values {
        if let Some((url, count)) = parse_url_count_line(value) {
            counts.insert(url, count);
        }
    }
    counts
}

fn parse_url_count_line(line: &str) -> Option<(String, u64)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let idx = line.rfind(' ')?;
    let (url, count) = line.split_at(idx);
    let count: u64 = count[1..].parse().ok()?;
    Some((url.to_string(), count))
}
