//! Shuffle I/O: map/reduce task execution, the FNV-1a partition hash, and
//! the `mrtmp.<job>-<m>-<r>` file naming scheme.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use memmap::Mmap;
use regex::Regex;

use super::task::{Phase, Task};

/// Matches `mrtmp.<job>-<m>-<r>` and `mrtmp.<job>-res-<r>`, capturing the
/// job name and the two middle components. Compiled fresh per call: this
/// is only used by data-directory cleanup tooling, never on the hot path.
fn shuffle_filename_pattern() -> Regex {
    Regex::new(r"^mrtmp\.(.+)-([^-]+)-(\d+)$").expect("static shuffle filename pattern is valid")
}

/// Separator between key and value in a shuffle record. See §6.
pub const SEP: &str = "+";

/// Name of the intermediate file written by map task `m` for partition `r`.
pub fn map_output_name(job_name: &str, m: usize, r: usize) -> String {
    format!("mrtmp.{job_name}-{m}-{r}")
}

/// Name of the final output file written by reduce task `r`.
pub fn reduce_output_name(job_name: &str, r: usize) -> String {
    format!("mrtmp.{job_name}-res-{r}")
}

/// FNV-1a over the key's UTF-8 bytes, 32-bit.
///
/// Must stay bit-identical to any other implementation sharing these
/// shuffle files — this is the one piece of the engine whose exact
/// arithmetic is part of the external contract (§6).
pub fn fnv1a32(key: &str) -> u32 {
    const FNV_OFFSET_BASIS: u32 = 0x811c9dc5;
    const FNV_PRIME: u32 = 0x0100_0193;
    let mut hash = FNV_OFFSET_BASIS;
    for byte in key.as_bytes() {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// The partition a key is routed to: `fnv1a32(key) & 0x7FFFFFFF mod n_reduce`.
pub fn partition_of(key: &str, n_reduce: usize) -> usize {
    debug_assert!(n_reduce > 0);
    ((fnv1a32(key) & 0x7FFF_FFFF) as usize) % n_reduce
}

/// Runs a task to completion: a map task partitions its input across
/// `n_reduce` shuffle files; a reduce task groups its `n_map` input files
/// by key and writes one result file.
pub fn execute_task(task: &Task) {
    match task.phase {
        Phase::Map => execute_map_task(task),
        Phase::Reduce => execute_reduce_task(task),
    }
}

fn execute_map_task(task: &Task) {
    let map_file = task
        .map_file
        .as_ref()
        .expect("map task constructed without an input file");

    let contents = read_input_file(map_file);
    let pairs = (task.map_f)(map_file.to_string_lossy().as_ref(), &contents);

    let mut writers: Vec<BufWriter<File>> = (0..task.n_reduce)
        .map(|r| {
            let path = task
                .data_dir
                .join(map_output_name(&task.job_name, task.task_number, r));
            let file = File::create(&path)
                .unwrap_or_else(|e| panic!("creating shuffle file {}: {e}", path.display()));
            BufWriter::new(file)
        })
        .collect();

    for kv in &pairs {
        let p = partition_of(&kv.key, task.n_reduce);
        let writer = &mut writers[p];
        writer
            .write_all(kv.key.as_bytes())
            .and_then(|_| writer.write_all(SEP.as_bytes()))
            .and_then(|_| writer.write_all(kv.value.as_bytes()))
            .and_then(|_| writer.write_all(b"\n"))
            .expect("writing shuffle record");
    }

    for mut writer in writers {
        writer.flush().expect("flushing shuffle file");
    }
}

fn execute_reduce_task(task: &Task) {
    let mut grouped: HashMap<String, Vec<String>> = HashMap::new();

    for m in 0..task.n_map {
        let path = task
            .data_dir
            .join(map_output_name(&task.job_name, m, task.task_number));
        let file = File::open(&path)
            .unwrap_or_else(|e| panic!("opening shuffle file {}: {e}", path.display()));
        for line in BufReader::new(file).lines() {
            let line = line.expect("reading shuffle line");
            if let Some((key, value)) = split_record(&line) {
                grouped.entry(key.to_string()).or_default().push(value.to_string());
            }
        }
    }

    let mut out = String::new();
    for (key, values) in &grouped {
        out.push_str(&(task.reduce_f)(key, values));
    }

    let out_path = task
        .data_dir
        .join(reduce_output_name(&task.job_name, task.task_number));
    let mut writer = BufWriter::new(
        File::create(&out_path)
            .unwrap_or_else(|e| panic!("creating result file {}: {e}", out_path.display())),
    );
    writer
        .write_all(out.as_bytes())
        .expect("writing result file");
    writer.flush().expect("flushing result file");
}

/// Splits a shuffle record on the first `SEP`, skipping malformed lines per
/// §6: empty lines, a bare separator, or fewer than two pieces after the
/// split.
fn split_record(line: &str) -> Option<(&str, &str)> {
    if line.is_empty() || line == SEP {
        return None;
    }
    let idx = line.find(SEP)?;
    let (key, rest) = line.split_at(idx);
    let value = &rest[SEP.len()..];
    Some((key, value))
}

/// Reads `path` into a `String` via a zero-copy `mmap` view.
///
/// The Rust-native replacement for the original engine's
/// `unsafe.Pointer`-based byte-to-string aliasing: `Mmap` gives us a
/// `&[u8]` directly backed by the file, and `str::from_utf8` validates it
/// without copying. The mapping is dropped (and the view with it) as soon
/// as this function returns its owned `String`, so nothing outlives the
/// buffer it borrows from.
fn read_input_file(path: &Path) -> String {
    let file = File::open(path).unwrap_or_else(|e| panic!("opening input file {}: {e}", path.display()));
    let metadata = file.metadata().unwrap_or_else(|e| panic!("statting input file {}: {e}", path.display()));
    if metadata.len() == 0 {
        return String::new();
    }
    let mmap = unsafe {
        Mmap::map(&file).unwrap_or_else(|e| panic!("mmapping input file {}: {e}", path.display()))
    };
    std::str::from_utf8(&mmap)
        .unwrap_or_else(|e| panic!("input file {} is not valid UTF-8: {e}", path.display()))
        .to_owned()
}

/// Ensures `data_dir` exists, creating it (and any parents) if not.
pub fn ensure_data_dir(data_dir: &Path) {
    fs::create_dir_all(data_dir)
        .unwrap_or_else(|e| panic!("creating data directory {}: {e}", data_dir.display()));
}

/// Validates that `name` matches the `mrtmp.<job>-<m>-<r>` or
/// `mrtmp.<job>-res-<r>` shuffle naming scheme. Used by cleanup tooling
/// that lists a data directory and needs to tell shuffle files apart from
/// anything else a caller may have dropped in there.
pub fn is_shuffle_filename(name: &str) -> bool {
    shuffle_filename_pattern().is_match(name)
}

/// Parses a `mrtmp.<job>-<m>-<r>` map-output filename back into its
/// `(job_name, m, r)` parts, if it matches.
pub fn parse_map_output_name(name: &str) -> Option<(String, usize, usize)> {
    let caps = shuffle_filename_pattern().captures(name)?;
    let job_name = caps.get(1)?.as_str().to_string();
    let middle = caps.get(2)?.as_str();
    if middle == "res" {
        return None;
    }
    let m: usize = middle.parse().ok()?;
    let r: usize = caps.get(3)?.as_str().parse().ok()?;
    Some((job_name, m, r))
}

/// Removes every map-output shuffle file belonging to `round_name` in
/// `data_dir`, leaving its reduce-output (result) files alone.
///
/// Called by the dispatcher once a round's reduce phase has consumed its map
/// outputs, so a long multi-round job doesn't accumulate one shuffle file per
/// map/reduce pair for every round it has already finished with. Lists the
/// directory rather than recomputing the `n_map * n_reduce` names directly,
/// so it tolerates a round whose map phase failed partway through.
pub fn clean_intermediate_files(data_dir: &Path, round_name: &str) -> std::io::Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(data_dir)? {
        let entry = entry?;
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(_) => continue,
        };
        if !is_shuffle_filename(&name) {
            continue;
        }
        match parse_map_output_name(&name) {
            Some((job_name, _m, _r)) if job_name == round_name => {
                fs::remove_file(entry.path())?;
                removed += 1;
            }
            _ => {}
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv1a32_known_vectors() {
        // Standard FNV-1a 32-bit test vectors for the empty string and "a".
        assert_eq!(fnv1a32(""), 0x811c9dc5);
        assert_eq!(fnv1a32("a"), 0xe40c292c);
    }

    #[test]
    fn partition_hash_is_deterministic() {
        let a = partition_of("https://example.com/page", 7);
        let b = partition_of("https://example.com/page", 7);
        assert_eq!(a, b);
        assert!(a < 7);
    }

    #[test]
    fn split_record_skips_malformed_lines() {
        assert_eq!(split_record(""), None);
        assert_eq!(split_record("+"), None);
        assert_eq!(split_record("key+"), Some(("key", "")));
        assert_eq!(split_record("key+value"), Some(("key", "value")));
        assert_eq!(split_record("key+value+with+plus"), Some(("key", "value+with+plus")));
        assert_eq!(split_record("noseparator"), None);
    }

    #[test]
    fn filenames_round_trip() {
        let name = map_output_name("wc", 3, 5);
        assert_eq!(name, "mrtmp.wc-3-5");
        assert!(is_shuffle_filename(&name));
        assert_eq!(parse_map_output_name(&name), Some(("wc".to_string(), 3, 5)));

        let res_name = reduce_output_name("wc", 5);
        assert_eq!(res_name, "mrtmp.wc-res-5");
        assert!(is_shuffle_filename(&res_name));
        assert_eq!(parse_map_output_name(&res_name), None);
    }

    #[test]
    fn clean_intermediate_files_removes_map_outputs_but_keeps_results_and_other_jobs() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in [
            map_output_name("wc", 0, 0),
            map_output_name("wc", 0, 1),
            map_output_name("wc", 1, 0),
            map_output_name("wc", 1, 1),
        ] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let wc_result = reduce_output_name("wc", 0);
        fs::write(dir.path().join(&wc_result), "").unwrap();
        let other_job_map_output = map_output_name("other", 0, 0);
        fs::write(dir.path().join(&other_job_map_output), "").unwrap();
        fs::write(dir.path().join("not-a-shuffle-file.txt"), "").unwrap();

        let removed = clean_intermediate_files(dir.path(), "wc").expect("cleanup");
        assert_eq!(removed, 4);

        assert!(dir.path().join(&wc_result).exists());
        assert!(dir.path().join(&other_job_map_output).exists());
        assert!(dir.path().join("not-a-shuffle-file.txt").exists());
        assert!(!dir.path().join(map_output_name("wc", 0, 0)).exists());
        assert!(!dir.path().join(map_output_name("wc", 1, 1)).exists());
    }
}
