// rule set definition files, one lexeme per line:
//
//   Name: pattern     named rule, the pattern is everything after ": " verbatim,
//                     surrounding spaces included
//   word              bare word, its own pattern, named after its Pascal case form
//   # comment
//
// statuses are handed out 1, 2, 3, ... in file order, so when two rules accept the
// same text the one further down the file wins

use convert_case::{Case, Casing};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub name: String,
    pub pattern: String,
    pub status: u16,
}

#[derive(Debug)]
pub struct LexemeSetDef {
    pub name: String,
    pub pascal_case_name: String,
    pub lexemes: Vec<Lexeme>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexemeDefError {
    #[error("line {line}: lexeme has an empty name")]
    EmptyName { line: usize },
    #[error("line {line}: lexeme `{name}` has an empty pattern")]
    EmptyPattern { line: usize, name: String },
    #[error("line {line}: lexeme `{name}` is already defined")]
    DuplicateName { line: usize, name: String },
    #[error("more than {max} lexemes")]
    TooMany { max: usize },
}

pub fn parse_lexeme_def(def_name: String, def_string: &str) -> Result<LexemeSetDef, LexemeDefError> {
    let pascal_case_name = def_name.to_case(Case::Pascal);
    let mut lexemes: Vec<Lexeme> = Vec::new();

    for (i, line) in def_string.lines().enumerate() {
        let line_number = i + 1;
        let line = line.strip_suffix('\r').unwrap_or(line);
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (name, pattern) = match line.split_once(':') {
            Some((name, pattern)) => (
                name.trim().to_string(),
                pattern.strip_prefix(' ').unwrap_or(pattern),
            ),
            None => (trimmed.to_case(Case::Pascal), trimmed),
        };

        if name.is_empty() {
            return Err(LexemeDefError::EmptyName { line: line_number });
        }
        if pattern.is_empty() {
            return Err(LexemeDefError::EmptyPattern {
                line: line_number,
                name,
            });
        }
        if lexemes.iter().any(|x| x.name == name) {
            return Err(LexemeDefError::DuplicateName {
                line: line_number,
                name,
            });
        }

        let status = u16::try_from(lexemes.len() + 1).map_err(|_| LexemeDefError::TooMany {
            max: u16::MAX as usize,
        })?;
        lexemes.push(Lexeme {
            name,
            pattern: pattern.to_string(),
            status,
        });
    }

    Ok(LexemeSetDef {
        name: def_name,
        pascal_case_name,
        lexemes,
    })
}

impl LexemeSetDef {
    pub fn rules(&self) -> Vec<(&str, u16)> {
        self.lexemes
            .iter()
            .map(|x| (x.pattern.as_str(), x.status))
            .collect()
    }

    pub fn by_name(&self, name: &str) -> Option<&Lexeme> {
        self.lexemes.iter().find(|x| x.name == name)
    }

    pub fn by_status(&self, status: u16) -> Option<&Lexeme> {
        // statuses are dense and start at 1
        self.lexemes.get((status as usize).checked_sub(1)?)
    }
}
