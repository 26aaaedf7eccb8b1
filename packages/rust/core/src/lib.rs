//! Session orchestration for qaforge.
//!
//! This crate ties together document loading, question generation, answer
//! collection, and dataset export into one interactive run (`run_session`).

pub mod answers;
pub mod pipeline;
