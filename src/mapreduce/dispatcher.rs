//! Turns a [`Job`] into per-round task batches, fans them out to the
//! [`WorkerPool`], and barriers between the map and reduce phases (and
//! between rounds).

use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::thread;

use super::pool::WorkerPool;
use super::shuffle;
use super::task::{MapFn, Phase, ReduceFn, Task};

/// One round's configuration: the map and reduce functions and how many
/// reduce partitions to shuffle into.
#[derive(Clone)]
pub struct RoundArgs {
    pub map_f: MapFn,
    pub reduce_f: ReduceFn,
    pub n_reduce: usize,
}

impl RoundArgs {
    pub fn new(map_f: MapFn, reduce_f: ReduceFn, n_reduce: usize) -> Self {
        RoundArgs {
            map_f,
            reduce_f,
            n_reduce,
        }
    }
}

/// A full job: a name, a data directory, the Round 1 input files, and an
/// ordered, non-empty list of rounds. Round *i*'s output filenames become
/// round *i+1*'s input filenames.
pub struct Job {
    pub job_name: String,
    pub data_dir: PathBuf,
    pub input_files: Vec<PathBuf>,
    pub rounds: Vec<RoundArgs>,
}

/// Runs every round of `job` against `pool` in order, returning the final
/// round's result filenames (in task-number / partition order).
///
/// This is the multi-round form named in §6; [`submit`] is the
/// single-round convenience wrapper over it.
pub fn run_rounds(pool: &WorkerPool, job: &Job) -> Vec<PathBuf> {
    run_rounds_while(pool, job, || true)
}

/// Same as [`run_rounds`], but checks `should_continue` before each round
/// and stops early (returning whatever the most recently completed round
/// produced) the first time it returns `false`.
///
/// The engine itself exposes only a terminal shutdown (§5: no mid-task
/// cancellation) — this is how a caller plugs a polite "finish the current
/// round, then stop" signal (e.g. a `Ctrl-C` handler) into that contract
/// without the engine having to know about signals at all.
pub fn run_rounds_while(pool: &WorkerPool, job: &Job, should_continue: impl Fn() -> bool) -> Vec<PathBuf> {
    assert!(!job.rounds.is_empty(), "a job must have at least one round");
    shuffle::ensure_data_dir(&job.data_dir);

    let mut inputs = job.input_files.clone();
    for (round_index, round) in job.rounds.iter().enumerate() {
        if !should_continue() {
            log::info!("job {}: stopping before round {round_index}", job.job_name);
            break;
        }
        log::info!(
            "job {}: starting round {round_index} ({} map inputs, {} reduce partitions)",
            job.job_name,
            inputs.len(),
            round.n_reduce
        );
        inputs = run_round(pool, job, round, round_index, &inputs);
    }
    inputs
}

/// Convenience wrapper running a single-round job, matching the `submit`
/// signature named in §6.
pub fn submit(
    job_name: impl Into<String>,
    data_dir: impl Into<PathBuf>,
    map_f: MapFn,
    reduce_f: ReduceFn,
    input_files: Vec<PathBuf>,
    n_reduce: usize,
    pool: &WorkerPool,
) -> Vec<PathBuf> {
    let job = Job {
        job_name: job_name.into(),
        data_dir: data_dir.into(),
        input_files,
        rounds: vec![RoundArgs::new(map_f, reduce_f, n_reduce)],
    };
    run_rounds(pool, &job)
}

fn run_round(
    pool: &WorkerPool,
    job: &Job,
    round: &RoundArgs,
    round_index: usize,
    inputs: &[PathBuf],
) -> Vec<PathBuf> {
    let n_map = inputs.len();
    let n_reduce = round.n_reduce;
    let round_name = map_round_name(&job.job_name, round_index);

    let (map_tasks, map_receivers): (Vec<Task>, Vec<Receiver<()>>) = inputs
        .iter()
        .enumerate()
        .map(|(m, input)| {
            Task::new(
                job.data_dir.clone(),
                round_name.clone(),
                Phase::Map,
                m,
                n_map,
                n_reduce,
                Some(input.clone()),
                round.map_f.clone(),
                round.reduce_f.clone(),
            )
        })
        .unzip();

    enqueue_concurrently(pool, map_tasks);

    for done in map_receivers {
        done.recv().expect("map task dropped its completion signal");
    }
    log::debug!("job {}: round {round_index} map phase complete", job.job_name);

    let (reduce_tasks, reduce_receivers): (Vec<Task>, Vec<Receiver<()>>) = (0..n_reduce)
        .map(|r| {
            Task::new(
                job.data_dir.clone(),
                round_name.clone(),
                Phase::Reduce,
                r,
                n_map,
                n_reduce,
                None,
                round.map_f.clone(),
                round.reduce_f.clone(),
            )
        })
        .unzip();

    enqueue_concurrently(pool, reduce_tasks);

    for done in reduce_receivers {
        done.recv().expect("reduce task dropped its completion signal");
    }
    log::debug!("job {}: round {round_index} reduce phase complete", job.job_name);

    match shuffle::clean_intermediate_files(&job.data_dir, &round_name) {
        Ok(removed) => log::debug!(
            "job {}: round {round_index} removed {removed} intermediate shuffle files",
            job.job_name
        ),
        Err(e) => log::warn!(
            "job {}: round {round_index} failed to clean intermediate shuffle files: {e}",
            job.job_name
        ),
    }

    (0..n_reduce)
        .map(|r| job.data_dir.join(shuffle::reduce_output_name(&round_name, r)))
        .collect()
}

/// Rounds share a data directory, so each round gets its own job-name
/// namespace to keep its shuffle files from colliding with the next
/// round's.
fn map_round_name(job_name: &str, round_index: usize) -> String {
    format!("{job_name}-r{round_index}")
}

/// Submits `tasks` to `pool` concurrently — one lightweight producer
/// thread per task — so a single slow `submit` (waiting for a free
/// worker) never blocks the rest of the batch from becoming visible to
/// the pool. Matches the Design Notes' "all tasks become enqueuable
/// without head-of-line blocking" contract.
fn enqueue_concurrently<I: IntoIterator<Item = Task>>(pool: &WorkerPool, tasks: I) {
    thread::scope(|scope| {
        for task in tasks {
            scope.spawn(move || pool.submit(task));
        }
    });
}
