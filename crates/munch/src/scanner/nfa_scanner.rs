use std::io::{self, Read};

use munch_re::{lexeme_def::LexemeSetDef, Nfa, Regnode, Simulation};
use tracing::{debug, warn};

use super::{
    lexemes::{Classification, Classifier, LexemeSet, Token},
    stream::ByteStream,
    LexerConfig, LexerError, ScanError,
};
use crate::semantics::symtab::SymbolTable;

pub(crate) enum ScannerResult {
    EndOfInput,
    Failed { position: usize, byte: u8 },
    Ok { text: String, status: u16 },
}

// runs every rule at once over one combined NFA and hands each longest match to
// the classifier
pub struct Lexer<C: Classifier> {
    nfa: Nfa,
    classifier: C,
    symtab: SymbolTable,
}

impl<C: Classifier> Lexer<C> {
    pub fn new(rules: &[(&str, u16)], classifier: C, config: &LexerConfig) -> Result<Self, LexerError> {
        if rules.is_empty() {
            return Err(LexerError::NoRules);
        }

        let mut compiled: Vec<(Regnode, u16)> = Vec::with_capacity(rules.len());
        for (index, (pattern, status)) in rules.iter().enumerate() {
            if *status == 0 {
                return Err(LexerError::InvalidStatus(pattern.to_string()));
            }
            if compiled.iter().any(|(_, x)| x == status) {
                return Err(LexerError::DuplicateStatus(*status));
            }

            let re = Regnode::from_str_with_config(pattern, &config.regex).map_err(|source| {
                LexerError::Regex {
                    index,
                    pattern: pattern.to_string(),
                    source,
                }
            })?;
            compiled.push((re, *status));
        }

        Ok(Self {
            nfa: Nfa::combine(&compiled),
            classifier,
            symtab: SymbolTable::with_capacity(config.symtab_capacity),
        })
    }

    // compile every lexeme of T into one scanner
    pub fn from_lexeme_set<T: LexemeSet>(classifier: C, config: &LexerConfig) -> Result<Self, LexerError> {
        let rules: Vec<(&str, u16)> = T::iter().map(|x| (x.pattern(), x.to_status())).collect();
        Self::new(&rules, classifier, config)
    }

    pub fn from_lexeme_def(def: &LexemeSetDef, classifier: C, config: &LexerConfig) -> Result<Self, LexerError> {
        Self::new(&def.rules(), classifier, config)
    }

    pub fn nfa(&self) -> &Nfa {
        &self.nfa
    }

    pub fn symtab(&self) -> &SymbolTable {
        &self.symtab
    }

    // lets callers seed the table, e.g. with names that must get fixed slots
    pub fn symtab_mut(&mut self) -> &mut SymbolTable {
        &mut self.symtab
    }

    // implements "maximal munch" lexing - always try to "eat" as many characters as possible
    // to form next token. keeps feeding the automaton until it dies, then backs up to the last
    // point where some rule accepted
    fn next_word<R: Read>(nfa: &Nfa, stream: &mut ByteStream<R>) -> io::Result<ScannerResult> {
        let start = stream.position();
        let mut simulation = Simulation::new(nfa);
        simulation.init();

        let mut lexeme: Vec<u8> = Vec::new();
        // (length, status) of the longest accepted prefix so far
        let mut last_accept: Option<(usize, u16)> = None;

        loop {
            let c = match stream.next_byte() {
                Ok(Some(c)) => c,
                Ok(None) => break,
                Err(e) => {
                    // leave the stream where this word started, so a retry rereads it whole
                    stream.unread(&lexeme);
                    return Err(e);
                }
            };
            lexeme.push(c);
            simulation.step(c);
            if simulation.is_dead() {
                break;
            }
            if simulation.final_status() != 0 {
                last_accept = Some((lexeme.len(), simulation.final_status()));
            }
        }

        if lexeme.is_empty() {
            return Ok(ScannerResult::EndOfInput);
        }

        match last_accept {
            Some((len, status)) => {
                stream.unread(&lexeme[len..]);
                // only ASCII can get through the automaton, so this is lossless
                let text: String = lexeme[..len].iter().map(|&b| b as char).collect();
                Ok(ScannerResult::Ok { text, status })
            }
            None => {
                // give back all but the offending byte so the next call makes progress
                stream.unread(&lexeme[1..]);
                Ok(ScannerResult::Failed {
                    position: start,
                    byte: lexeme[0],
                })
            }
        }
    }

    // next token that isn't discarded, None at end of input. after a NoMatch error the
    // stream has moved one byte forward, so calling again resumes right after it
    pub fn next_token<R: Read>(&mut self, stream: &mut ByteStream<R>) -> Result<Option<Token>, ScanError> {
        loop {
            match Self::next_word(&self.nfa, stream)? {
                ScannerResult::EndOfInput => return Ok(None),
                ScannerResult::Failed { position, byte } => {
                    warn!(position, byte, "no rule matches");
                    return Err(ScanError::NoMatch { position, byte });
                }
                ScannerResult::Ok { text, status } => {
                    match self.classifier.classify(status, &text, &mut self.symtab)? {
                        Classification::Token(token) => {
                            debug!(status, text = text.as_str(), "token");
                            return Ok(Some(token));
                        }
                        Classification::Discard => continue,
                    }
                }
            }
        }
    }

    // scan entire input at once, stopping at the first error
    pub fn tokenize(&mut self, input: &[u8]) -> Result<Vec<Token>, ScanError> {
        let mut stream = ByteStream::new(input);
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token(&mut stream)? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    pub fn tokens<R: Read>(&mut self, stream: ByteStream<R>) -> Tokens<'_, C, R> {
        Tokens {
            lexer: self,
            stream,
            done: false,
        }
    }
}

// yields lexical errors and keeps going; stops for good at end of input or on an I/O error
pub struct Tokens<'lexer, C: Classifier, R: Read> {
    lexer: &'lexer mut Lexer<C>,
    stream: ByteStream<R>,
    done: bool,
}

impl<C: Classifier, R: Read> Iterator for Tokens<'_, C, R> {
    type Item = Result<Token, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.lexer.next_token(&mut self.stream) {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                if matches!(e, ScanError::Io(_)) {
                    self.done = true;
                }
                Some(Err(e))
            }
        }
    }
}
