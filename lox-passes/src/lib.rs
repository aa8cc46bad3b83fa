//! Static analysis passes that run between parsing and evaluation.

pub mod resolve;
