//! In-process MapReduce engine: a fixed worker pool executes map/reduce
//! tasks whose intermediate results are shuffled through the filesystem
//! and partitioned by [`shuffle::fnv1a32`].

pub mod dispatcher;
pub mod pool;
pub mod shuffle;
pub mod task;

pub use dispatcher::{run_rounds, run_rounds_while, submit, Job, RoundArgs};
pub use pool::WorkerPool;
pub use shuffle::{fnv1a32, SEP};
pub use task::{KeyValue, MapFn, Phase, ReduceFn, Task};

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn word_count_job(data_dir: PathBuf, input_files: Vec<PathBuf>, n_reduce: usize) -> Job {
        let map_f: MapFn = Arc::new(|_filename, contents| {
            contents
                .lines()
                .map(|line| line.trim())
                .filter(|line| !line.is_empty())
                .map(|line| KeyValue::new(line, ""))
                .collect()
        });
        let reduce_f: ReduceFn = Arc::new(|key, values| format!("{key} {}\n", values.len()));

        Job {
            job_name: "wc".to_string(),
            data_dir,
            input_files,
            rounds: vec![RoundArgs::new(map_f, reduce_f, n_reduce)],
        }
    }

    #[test]
    fn single_round_job_produces_one_result_per_partition() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input_path = dir.path().join("input.txt");
        std::fs::write(&input_path, "a\na\nb\n").unwrap();

        let pool = WorkerPool::new(2);
        let job = word_count_job(dir.path().to_path_buf(), vec![input_path], 2);
        let results = run_rounds(&pool, &job);
        pool.shutdown();

        assert_eq!(results.len(), 2);
        let total_lines: usize = results
            .iter()
            .map(|p| std::fs::read_to_string(p).unwrap().lines().count())
            .sum();
        assert_eq!(total_lines, 2); // keys "a" and "b"

        let mut counts = std::collections::HashMap::new();
        for path in &results {
            for line in std::fs::read_to_string(path).unwrap().lines() {
                let mut parts = line.rsplitn(2, ' ');
                let count: usize = parts.next().unwrap().parse().unwrap();
                let key = parts.next().unwrap().to_string();
                counts.insert(key, count);
            }
        }
        assert_eq!(counts.get("a"), Some(&2));
        assert_eq!(counts.get("b"), Some(&1));
    }

    #[test]
    fn empty_map_output_yields_empty_but_existing_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input_path = dir.path().join("empty.txt");
        std::fs::write(&input_path, "").unwrap();

        let pool = WorkerPool::new(1);
        let job = word_count_job(dir.path().to_path_buf(), vec![input_path], 1);
        let results = run_rounds(&pool, &job);
        pool.shutdown();

        assert_eq!(results.len(), 1);
        assert!(results[0].exists());
        assert_eq!(std::fs::read_to_string(&results[0]).unwrap(), "");
    }

    #[test]
    fn s6_two_round_chaining() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input_path = dir.path().join("input.txt");
        std::fs::write(&input_path, "x\nx\ny\n").unwrap();

        let n_workers = 3;
        let round1_map: MapFn = Arc::new(|_f, contents| {
            contents
                .lines()
                .filter(|l| !l.is_empty())
                .map(|l| KeyValue::new(l, ""))
                .collect()
        });
        let round1_reduce: ReduceFn = Arc::new(|key, values| format!("{key} {}\n", values.len()));

        let round2_map: MapFn = Arc::new(|_f, _contents| vec![]);
        let round2_reduce: ReduceFn = Arc::new(|_key, _values| String::new());

        let job = Job {
            job_name: "chain".to_string(),
            data_dir: dir.path().to_path_buf(),
            input_files: vec![input_path],
            rounds: vec![
                RoundArgs::new(round1_map, round1_reduce, n_workers),
                RoundArgs::new(round2_map, round2_reduce, 1),
            ],
        };

        let pool = WorkerPool::new(2);
        let results = run_rounds(&pool, &job);
        pool.shutdown();

        assert_eq!(results.len(), 1);
    }
}
