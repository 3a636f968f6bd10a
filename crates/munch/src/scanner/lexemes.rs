// Expected usage: implement LexemeSet for an enum whose variants encode all tokens
// one expects to see given a language's microsyntax, and a Classifier that turns
// the text each variant matched into a Token

use std::fmt::Debug;
use std::hash::Hash;

use thiserror::Error;

use crate::semantics::symtab::{SymbolIdx, SymbolTable, SymtabError};

// 3 representations for each lexeme: enum variant, string name, and status code.
// the status code doubles as the lexeme's priority: when two lexemes match the
// same text, the higher status wins. statuses start at 1, 0 means "no match"
pub trait LexemeSet: Clone + Copy + Debug + Eq + Hash {
    fn from_name(name: &str) -> Option<Self>;
    fn from_status(status: u16) -> Option<Self>;
    fn to_name(self) -> &'static str;
    fn to_status(self) -> u16;

    fn next(self) -> Option<Self>;
    fn iter() -> LexemeIterator<Self> {
        LexemeIterator {
            state: Self::from_status(1),
        }
    }

    fn pattern(self) -> &'static str;
    fn size() -> u16;
}

pub struct LexemeIterator<T: LexemeSet> {
    state: Option<T>,
}

impl<T: LexemeSet> Iterator for LexemeIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let tmp = self.state;
        self.state = match self.state {
            Some(s) => s.next(),
            None => None,
        };
        tmp
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenValue {
    Text(String),
    Integer(i64),
    Symbol(SymbolIdx),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    // status of the rule that matched
    pub code: u16,
    pub value: TokenValue,
}

impl Token {
    pub fn text(code: u16, text: &str) -> Self {
        Self {
            code,
            value: TokenValue::Text(text.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Token(Token),
    // matched, but not worth reporting (whitespace, comments)
    Discard,
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error(transparent)]
    Symtab(#[from] SymtabError),
    #[error("invalid literal `{text}`: {reason}")]
    InvalidLiteral { text: String, reason: String },
    #[error("no lexeme has status {0}")]
    UnknownStatus(u16),
}

pub trait Classifier {
    fn classify(
        &mut self,
        status: u16,
        text: &str,
        symtab: &mut SymbolTable,
    ) -> Result<Classification, ClassifyError>;
}

impl<F> Classifier for F
where
    F: FnMut(u16, &str, &mut SymbolTable) -> Result<Classification, ClassifyError>,
{
    fn classify(
        &mut self,
        status: u16,
        text: &str,
        symtab: &mut SymbolTable,
    ) -> Result<Classification, ClassifyError> {
        self(status, text, symtab)
    }
}

// pins a closure's signature so it can be handed to a Lexer without annotations
pub fn classifier_fn<F>(f: F) -> F
where
    F: FnMut(u16, &str, &mut SymbolTable) -> Result<Classification, ClassifyError>,
{
    f
}

// every match becomes a text token, except statuses listed in `discard`
#[derive(Debug, Clone, Default)]
pub struct TextClassifier {
    discard: Vec<u16>,
}

impl TextClassifier {
    pub fn new(discard: Vec<u16>) -> Self {
        Self { discard }
    }
}

impl Classifier for TextClassifier {
    fn classify(
        &mut self,
        status: u16,
        text: &str,
        _symtab: &mut SymbolTable,
    ) -> Result<Classification, ClassifyError> {
        if self.discard.contains(&status) {
            Ok(Classification::Discard)
        } else {
            Ok(Classification::Token(Token::text(status, text)))
        }
    }
}
