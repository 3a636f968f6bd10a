pub mod scanner;
pub mod semantics;
