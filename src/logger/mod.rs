//! Activity logging: JSONL file sink, console mirror, and the `Reporter` seam the
//! engine writes through.

pub mod dual;
pub mod jsonl;
pub mod reporter;
