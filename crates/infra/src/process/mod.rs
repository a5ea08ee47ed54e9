//! External process execution.

mod prober;

pub use prober::CommandProber;
