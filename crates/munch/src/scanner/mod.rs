use std::io;

use munch_re::{RegexConfig, RegexError};
use thiserror::Error;

use crate::semantics::symtab::DEFAULT_CAPACITY;

pub mod lexeme_sets;
pub mod lexemes;
mod nfa_scanner;
mod stream;


pub use lexemes::{
    classifier_fn, Classification, Classifier, ClassifyError, LexemeSet, TextClassifier, Token,
    TokenValue,
};
pub use nfa_scanner::{Lexer, Tokens};
pub use stream::ByteStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexerConfig {
    pub regex: RegexConfig,
    pub symtab_capacity: usize,
}

impl Default for LexerConfig {
    fn default() -> Self {
        Self {
            regex: RegexConfig::default(),
            symtab_capacity: DEFAULT_CAPACITY,
        }
    }
}

// problems with the rules themselves, found while building the lexer
#[derive(Debug, Error)]
pub enum LexerError {
    #[error("rule {index} (`{pattern}`): {source}")]
    Regex {
        index: usize,
        pattern: String,
        source: RegexError,
    },
    #[error("rule `{0}` has status 0, statuses must be positive")]
    InvalidStatus(String),
    #[error("status {0} is used by more than one rule")]
    DuplicateStatus(u16),
    #[error("a lexer needs at least one rule")]
    NoRules,
}

// problems with the input, found while scanning
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("no rule matches input at offset {position} (byte {byte:#04x})")]
    NoMatch { position: usize, byte: u8 },
    #[error(transparent)]
    Classify(#[from] ClassifyError),
    #[error(transparent)]
    Io(#[from] io::Error),
}
