use munch::scanner::{
    lexeme_sets::c_like::{CLike, CLikeClassifier},
    ByteStream, LexemeSet, Lexer, LexerConfig, TextClassifier, Token, TokenValue,
};
use munch::semantics::symtab::SymbolClass;
use munch_re::lexeme_def::parse_lexeme_def;

const C_LIKE_DEF: &str = include_str!("../../../data/lexeme_sets/c_like.def");

const SNIPPET: &str = "int main(void) {
    int total = 0;
    for (int i = 0; i < 10; i++) {
        total += i * 2;
    }
    return total;
}
";

#[test]
fn c_snippet() {
    let mut lexer = Lexer::from_lexeme_set::<CLike>(CLikeClassifier, &LexerConfig::default())
        .expect("built-in rules should compile");
    let tokens = lexer.tokenize(SNIPPET.as_bytes()).expect("snippet should scan");

    let kinds: Vec<CLike> = tokens
        .iter()
        .map(|x| CLike::from_status(x.code).expect("unknown token code"))
        .collect();
    use CLike::*;
    assert_eq!(
        kinds,
        vec![
            Keyword, Identifier, Punctuator, Keyword, Punctuator, Punctuator,
            Keyword, Identifier, Operator, Number, Punctuator,
            Keyword, Punctuator, Keyword, Identifier, Operator, Number, Punctuator,
            Identifier, Operator, Number, Punctuator, Identifier, Operator, Punctuator, Punctuator,
            Identifier, Operator, Identifier, Operator, Number, Punctuator,
            Punctuator,
            Keyword, Identifier, Punctuator,
            Punctuator,
        ]
    );

    // main, total, i
    assert_eq!(lexer.symtab().len(), 3);
    let total = lexer
        .symtab()
        .lookup(SymbolClass::Identifier, "total")
        .expect("total should be interned");
    let uses = tokens
        .iter()
        .filter(|x| x.value == TokenValue::Symbol(total))
        .count();
    assert_eq!(uses, 3);

    assert!(tokens.contains(&Token::text(CLike::Operator.to_status(), "+=")));
    assert!(tokens.contains(&Token::text(CLike::Operator.to_status(), "++")));
}

#[test]
fn def_file_matches_built_in_set() {
    let def = parse_lexeme_def("c_like".to_string(), C_LIKE_DEF).expect("def should parse");
    assert_eq!(def.pascal_case_name, "CLike");
    assert_eq!(def.lexemes.len(), CLike::size() as usize);

    for lexeme in CLike::iter() {
        let entry = def
            .by_name(lexeme.to_name())
            .unwrap_or_else(|| panic!("{} missing from def file", lexeme.to_name()));
        assert_eq!(entry.status, lexeme.to_status());
        assert_eq!(entry.pattern, lexeme.pattern());
    }
}

#[test]
fn def_file_lexer() {
    let def = parse_lexeme_def("c_like".to_string(), C_LIKE_DEF).expect("def should parse");
    let whitespace = def.by_name("Whitespace").expect("whitespace rule").status;
    let mut lexer = Lexer::from_lexeme_def(
        &def,
        TextClassifier::new(vec![whitespace]),
        &LexerConfig::default(),
    )
    .expect("def rules should compile");

    let tokens: Vec<(String, String)> = lexer
        .tokens(ByteStream::new("while (n >= 10) n = n / 10;".as_bytes()))
        .map(|x| {
            let token = x.expect("should scan");
            let name = def.by_status(token.code).expect("known status").name.clone();
            match token.value {
                TokenValue::Text(text) => (name, text),
                other => panic!("unexpected token value {:?}", other),
            }
        })
        .collect();

    let expected: Vec<(String, String)> = [
        ("Keyword", "while"),
        ("Punctuator", "("),
        ("Identifier", "n"),
        ("Operator", ">="),
        ("Number", "10"),
        ("Punctuator", ")"),
        ("Identifier", "n"),
        ("Operator", "="),
        ("Identifier", "n"),
        ("Operator", "/"),
        ("Number", "10"),
        ("Punctuator", ";"),
    ]
    .iter()
    .map(|(a, b)| (a.to_string(), b.to_string()))
    .collect();
    assert_eq!(tokens, expected);
    assert!(lexer.symtab().is_empty());
}
