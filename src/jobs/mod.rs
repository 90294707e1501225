//! Ready-made MapReduce jobs built on top of [`crate::mapreduce`].

pub mod url_top10;

pub use url_top10::url_top10_job;
