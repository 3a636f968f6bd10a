// operator-precedence regex parser for a small ASCII mini-language
//
// <c>          any byte that isn't an operator matches itself ('.' included)
// '(' ')'      grouping
// '|'          alternation
// '*' '+' '?'  postfix repetition, binds tightest
// adjacency    concatenation, binds tighter than '|'
//
// escapes:
// \e  empty string      \n  newline
// \d  [0-9]             \A  [A-Z]
// \a  [a-z]             \z  [A-Za-z]
// \w  space, newline or tab
// \x  literal x for any other x
//
// NUL is not allowed anywhere in a pattern, byte 0 is the epsilon label

use std::fmt;

use thiserror::Error;
use tracing::trace;

use crate::AsciiChar;

pub const DEFAULT_MAX_LEN: usize = 1000;
pub const DEFAULT_MAX_NODES: usize = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegexConfig {
    // longer patterns are rejected outright instead of being truncated
    pub max_len: usize,
    // cap on the size of the parsed tree. `x+` copies x, so stacked '+' doubles the
    // tree each time and a short pattern can blow up; the NFA has at most two states
    // per node
    pub max_nodes: usize,
}

impl Default for RegexConfig {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_MAX_LEN,
            max_nodes: DEFAULT_MAX_NODES,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Regnode {
    Char(AsciiChar),
    Class(CharClass),
    Empty,
    Kleene(Box<Regnode>),
    Concatenation(Box<Regnode>, Box<Regnode>),
    Alternation(Box<Regnode>, Box<Regnode>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharClass {
    Digit,
    Upper,
    Lower,
    Alpha,
    // space, newline and tab only
    Whitespace,
}

impl CharClass {
    pub fn symbols(self) -> Vec<AsciiChar> {
        match self {
            CharClass::Digit => (b'0'..=b'9').collect(),
            CharClass::Upper => (b'A'..=b'Z').collect(),
            CharClass::Lower => (b'a'..=b'z').collect(),
            CharClass::Alpha => (b'A'..=b'Z').chain(b'a'..=b'z').collect(),
            CharClass::Whitespace => vec![b' ', b'\n', b'\t'],
        }
    }

    fn escape_code(self) -> char {
        match self {
            CharClass::Digit => 'd',
            CharClass::Upper => 'A',
            CharClass::Lower => 'a',
            CharClass::Alpha => 'z',
            CharClass::Whitespace => 'w',
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegexError {
    #[error("regex is {len} bytes long, the maximum is {max}")]
    TooLong { len: usize, max: usize },
    #[error("Regex over non-ASCII characters is not supported")]
    NotAscii,
    #[error("NUL byte at offset {0}")]
    Nul(usize),
    #[error("empty regex")]
    Empty,
    #[error("regex ends with a dangling '\\'")]
    DanglingEscape,
    #[error("unbalanced parenthesis at offset {0}")]
    UnbalancedParen(usize),
    #[error("operator at offset {0} is missing an operand")]
    MissingOperand(usize),
    #[error("regex expands to {nodes} nodes, the maximum is {max}")]
    TooComplex { nodes: usize, max: usize },
}

// postfix operators never reach the stack, they are reduced as soon as they're seen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    LeftParen,
    Concat,
    Union,
}

// operators are stored with the offset they came from so errors can point at them
struct StackMachine {
    operators: Vec<(Operator, usize)>,
    nodes: Vec<Regnode>,
    max_nodes: usize,
}

impl StackMachine {
    fn new(max_nodes: usize) -> Self {
        Self {
            operators: Vec::new(),
            nodes: Vec::new(),
            max_nodes,
        }
    }

    fn pop_node(&mut self, offset: usize) -> Result<Regnode, RegexError> {
        self.nodes.pop().ok_or(RegexError::MissingOperand(offset))
    }

    fn reduce(&mut self, operator: Operator, offset: usize) -> Result<(), RegexError> {
        let right = Box::new(self.pop_node(offset)?);
        let left = Box::new(self.pop_node(offset)?);
        let node = match operator {
            Operator::Concat => Regnode::Concatenation(left, right),
            Operator::Union => Regnode::Alternation(left, right),
            Operator::LeftParen => return Err(RegexError::UnbalancedParen(offset)),
        };
        trace!(?operator, offset, "reduced");
        self.nodes.push(node);
        Ok(())
    }

    fn apply_postfix(&mut self, op: AsciiChar, offset: usize) -> Result<(), RegexError> {
        let node = self.pop_node(offset)?;
        let node = match op {
            b'*' => Regnode::Kleene(Box::new(node)),
            // x+ == xx*, the copy keeps the AST a tree
            b'+' => {
                let nodes = 2 * node.size() + 2;
                if nodes > self.max_nodes {
                    return Err(RegexError::TooComplex {
                        nodes,
                        max: self.max_nodes,
                    });
                }
                Regnode::Concatenation(
                    Box::new(node.clone()),
                    Box::new(Regnode::Kleene(Box::new(node))),
                )
            }
            b'?' => Regnode::Alternation(Box::new(Regnode::Empty), Box::new(node)),
            _ => unreachable!("not a postfix operator"),
        };
        self.nodes.push(node);
        Ok(())
    }

    // concatenation binds tighter than alternation, so everything pending in the
    // current group gets reduced before the '|' is pushed
    fn reduce_alternative(&mut self) -> Result<(), RegexError> {
        while let Some(&(operator, offset)) = self.operators.last() {
            if operator == Operator::LeftParen {
                break;
            }
            self.operators.pop();
            self.reduce(operator, offset)?;
        }
        Ok(())
    }

    fn reduce_group(&mut self, close_offset: usize) -> Result<(), RegexError> {
        loop {
            match self.operators.pop() {
                Some((Operator::LeftParen, _)) => return Ok(()),
                Some((operator, offset)) => self.reduce(operator, offset)?,
                None => return Err(RegexError::UnbalancedParen(close_offset)),
            }
        }
    }

    fn finish(mut self) -> Result<Regnode, RegexError> {
        while let Some((operator, offset)) = self.operators.pop() {
            if operator == Operator::LeftParen {
                return Err(RegexError::UnbalancedParen(offset));
            }
            self.reduce(operator, offset)?;
        }

        let root = self.pop_node(0)?;
        if !self.nodes.is_empty() {
            return Err(RegexError::MissingOperand(0));
        }
        Ok(root)
    }
}

impl Regnode {
    fn escape(code: AsciiChar) -> Regnode {
        match code {
            b'e' => Regnode::Empty,
            b'n' => Regnode::Char(b'\n'),
            b'd' => Regnode::Class(CharClass::Digit),
            b'A' => Regnode::Class(CharClass::Upper),
            b'a' => Regnode::Class(CharClass::Lower),
            b'z' => Regnode::Class(CharClass::Alpha),
            b'w' => Regnode::Class(CharClass::Whitespace),
            x => Regnode::Char(x),
        }
    }

    // number of nodes in the tree
    pub fn size(&self) -> usize {
        match self {
            Regnode::Char(_) | Regnode::Class(_) | Regnode::Empty => 1,
            Regnode::Kleene(inner) => 1 + inner.size(),
            Regnode::Concatenation(left, right) | Regnode::Alternation(left, right) => {
                1 + left.size() + right.size()
            }
        }
    }

    pub fn from_str(re_str: &str) -> Result<Regnode, RegexError> {
        Self::from_str_with_config(re_str, &RegexConfig::default())
    }

    pub fn from_str_with_config(re_str: &str, config: &RegexConfig) -> Result<Regnode, RegexError> {
        if re_str.len() > config.max_len {
            return Err(RegexError::TooLong {
                len: re_str.len(),
                max: config.max_len,
            });
        }
        if !re_str.is_ascii() {
            return Err(RegexError::NotAscii);
        }
        if let Some(offset) = re_str.bytes().position(|b| b == 0) {
            return Err(RegexError::Nul(offset));
        }
        if re_str.is_empty() {
            return Err(RegexError::Empty);
        }

        let bytes = re_str.as_bytes();
        let mut machine = StackMachine::new(config.max_nodes);

        // a term is anything that can be the left half of a concatenation:
        // a literal, an escape, ')' or a postfix operator
        let mut prev_term = false;
        let mut i = 0;
        while i < bytes.len() {
            let c = bytes[i];
            if prev_term && !b")*?+|".contains(&c) {
                machine.operators.push((Operator::Concat, i));
            }

            match c {
                b'(' => {
                    machine.operators.push((Operator::LeftParen, i));
                    prev_term = false;
                }
                b')' => {
                    if !prev_term {
                        return Err(RegexError::MissingOperand(i));
                    }
                    machine.reduce_group(i)?;
                }
                b'*' | b'+' | b'?' => {
                    if !prev_term {
                        return Err(RegexError::MissingOperand(i));
                    }
                    machine.apply_postfix(c, i)?;
                }
                b'|' => {
                    if !prev_term {
                        return Err(RegexError::MissingOperand(i));
                    }
                    machine.reduce_alternative()?;
                    machine.operators.push((Operator::Union, i));
                    prev_term = false;
                }
                b'\\' => {
                    i += 1;
                    let code = *bytes.get(i).ok_or(RegexError::DanglingEscape)?;
                    machine.nodes.push(Self::escape(code));
                    prev_term = true;
                }
                x => {
                    machine.nodes.push(Regnode::Char(x));
                    prev_term = true;
                }
            }

            i += 1;
        }

        if !prev_term {
            // trailing '|' or an unclosed '('
            return Err(match machine.operators.last() {
                Some(&(Operator::LeftParen, offset)) => RegexError::UnbalancedParen(offset),
                Some(&(_, offset)) => RegexError::MissingOperand(offset),
                None => RegexError::MissingOperand(bytes.len() - 1),
            });
        }

        machine.finish()
    }

    fn fmt_grouped(&self, f: &mut fmt::Formatter<'_>, group: bool) -> fmt::Result {
        if group {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

// prints back in the same mini-language; parsing the output yields an equal tree
impl fmt::Display for Regnode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Regnode::Char(b'\n') => write!(f, "\\n"),
            Regnode::Char(c) if b"()|*+?\\".contains(c) => write!(f, "\\{}", *c as char),
            Regnode::Char(c) => write!(f, "{}", *c as char),
            Regnode::Class(class) => write!(f, "\\{}", class.escape_code()),
            Regnode::Empty => write!(f, "\\e"),
            Regnode::Kleene(inner) => {
                let group = matches!(
                    inner.as_ref(),
                    Regnode::Concatenation(..) | Regnode::Alternation(..)
                );
                inner.fmt_grouped(f, group)?;
                write!(f, "*")
            }
            Regnode::Concatenation(left, right) => {
                let group = matches!(
                    left.as_ref(),
                    Regnode::Concatenation(..) | Regnode::Alternation(..)
                );
                left.fmt_grouped(f, group)?;
                right.fmt_grouped(f, matches!(right.as_ref(), Regnode::Alternation(..)))
            }
            Regnode::Alternation(left, right) => {
                left.fmt_grouped(f, false)?;
                write!(f, "|")?;
                right.fmt_grouped(f, matches!(right.as_ref(), Regnode::Alternation(..)))
            }
        }
    }
}
