pub mod lexeme_def;
pub mod nfa;
pub mod regex;
pub mod simulate;

#[cfg(test)]
mod fa_tests;

pub type AsciiChar = u8;

pub use nfa::{Nfa, StateIdx};
pub use regex::{RegexConfig, RegexError, Regnode};
pub use simulate::Simulation;
