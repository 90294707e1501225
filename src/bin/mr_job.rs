//! `mr-job [OPTIONS] FILE...`: run the URL-top-10 MapReduce job over one or
//! more input files.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::{App, Arg};

use mrsort::jobs::url_top10_job;
use mrsort::mapreduce::{run_rounds_while, WorkerPool};

const USAGE: &str = "Run the URL-top-10 MapReduce job";

fn main() {
    env_logger::init();

    let matches = App::new("mr-job")
        .about(USAGE)
        .arg(
            Arg::with_name("data-dir")
                .long("data-dir")
                .value_name("DIR")
                .help("directory for intermediate shuffle files")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("workers")
                .long("workers")
                .value_name("N")
                .help("worker pool size (default: available parallelism)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("FILE")
                .help("input files")
                .multiple(true)
                .required(true)
                .index(1),
        )
        .get_matches();

    let data_dir: PathBuf = matches
        .value_of("data-dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("mrsort-urltop10"));

    let n_workers: usize = matches
        .value_of("workers")
        .and_then(|n| n.parse().ok())
        .unwrap_or_else(num_cpus::get);

    let input_files: Vec<PathBuf> = matches
        .values_of("FILE")
        .expect("FILE is required")
        .map(PathBuf::from)
        .collect();

    let shutdown_requested = Arc::new(AtomicBool::new(false));
    {
        let shutdown_requested = shutdown_requested.clone();
        ctrlc::set_handler(move || {
            log::warn!("received interrupt, finishing the current round then stopping");
            shutdown_requested.store(true, Ordering::SeqCst);
        })
        .expect("failed to install Ctrl-C handler");
    }

    let pool = WorkerPool::new(n_workers);
    let job = url_top10_job("urltop10", data_dir, input_files, n_workers);
    let results = run_rounds_while(&pool, &job, || !shutdown_requested.load(Ordering::SeqCst));
    pool.shutdown();

    for path in &results {
        println!("{}", path.display());
    }
}
