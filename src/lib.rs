pub mod isa;
pub mod error;
pub mod interpreter;
pub mod emitter;
pub mod arith;
pub mod assembler;
pub mod harness;
pub mod metrics;

pub use assembler::generate;
pub use error::{Error, Result};
pub use interpreter::execute;
