use crate::scanner::lexemes::{Classification, Classifier, ClassifyError, LexemeSet, Token, TokenValue};
use crate::semantics::symtab::{SymbolClass, SymbolTable};

// a small C-flavoured microsyntax. keywords sit above identifiers so `int` is a
// keyword, while maximal munch still makes `integer` an identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u16)]
pub enum CLike {
    Whitespace = 1,
    Identifier = 2,
    Number = 3,
    Keyword = 4,
    Operator = 5,
    Punctuator = 6,
}

impl LexemeSet for CLike {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "Whitespace" => Some(CLike::Whitespace),
            "Identifier" => Some(CLike::Identifier),
            "Number" => Some(CLike::Number),
            "Keyword" => Some(CLike::Keyword),
            "Operator" => Some(CLike::Operator),
            "Punctuator" => Some(CLike::Punctuator),
            _ => None,
        }
    }

    fn from_status(status: u16) -> Option<Self> {
        match status {
            1 => Some(CLike::Whitespace),
            2 => Some(CLike::Identifier),
            3 => Some(CLike::Number),
            4 => Some(CLike::Keyword),
            5 => Some(CLike::Operator),
            6 => Some(CLike::Punctuator),
            _ => None,
        }
    }

    fn to_name(self) -> &'static str {
        match self {
            CLike::Whitespace => "Whitespace",
            CLike::Identifier => "Identifier",
            CLike::Number => "Number",
            CLike::Keyword => "Keyword",
            CLike::Operator => "Operator",
            CLike::Punctuator => "Punctuator",
        }
    }

    fn to_status(self) -> u16 {
        self as u16
    }

    fn pattern(self) -> &'static str {
        match self {
            CLike::Whitespace => r"\w+",
            CLike::Identifier => r"(\z|_)(\z|_|\d)*",
            CLike::Number => r"\d+",
            CLike::Keyword => {
                "auto|break|case|char|const|continue|default|do|double|else|enum|extern|\
                 float|for|goto|if|int|long|register|return|short|signed|sizeof|static|\
                 struct|switch|typedef|union|unsigned|void|volatile|while"
            }
            CLike::Operator => {
                r"\+|-|\*|/|%|=|==|!=|<|>|<=|>=|!|&&|\|\||&|\||^|~|<<|>>|\+\+|--|\+=|-=|\*=|/=|->|."
            }
            CLike::Punctuator => r";|,|\(|\)|{|}|[|]|:",
        }
    }

    fn next(self) -> Option<Self> {
        if self.to_status() >= Self::size() {
            None
        } else {
            Self::from_status(self.to_status() + 1)
        }
    }

    fn size() -> u16 {
        6
    }
}

// whitespace is dropped, identifiers are interned, numbers are parsed,
// everything else keeps its text
#[derive(Debug, Clone, Copy, Default)]
pub struct CLikeClassifier;

impl Classifier for CLikeClassifier {
    fn classify(
        &mut self,
        status: u16,
        text: &str,
        symtab: &mut SymbolTable,
    ) -> Result<Classification, ClassifyError> {
        let lexeme = CLike::from_status(status).ok_or(ClassifyError::UnknownStatus(status))?;
        let value = match lexeme {
            CLike::Whitespace => return Ok(Classification::Discard),
            CLike::Identifier => {
                TokenValue::Symbol(symtab.intern(SymbolClass::Identifier, text)?)
            }
            CLike::Number => {
                let value = text.parse::<i64>().map_err(|e| ClassifyError::InvalidLiteral {
                    text: text.to_string(),
                    reason: e.to_string(),
                })?;
                TokenValue::Integer(value)
            }
            CLike::Keyword | CLike::Operator | CLike::Punctuator => {
                TokenValue::Text(text.to_string())
            }
        };

        Ok(Classification::Token(Token {
            code: status,
            value,
        }))
    }
}
