//! Command implementations.

mod generate;
mod run;
mod validate;

pub use generate::run_generate;
pub use run::run_batch;
pub use validate::run_validate;
