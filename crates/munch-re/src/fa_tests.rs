use crate::nfa::{Nfa, EPSILON};
use crate::regex::{RegexConfig, RegexError, Regnode};
use crate::simulate::Simulation;
use crate::StateIdx;

fn compile_regex(re_str: &str, quiet: bool) -> Nfa {
    let regex = Regnode::from_str(re_str).expect("failed to parse regex");
    if !quiet {
        println!("regex = {}", regex);
    }

    let nfa = Nfa::from_regnode(&regex, 1);
    if !quiet {
        println!("nfa = {}", nfa);
    }

    nfa
}

fn run_vectors(tests: &[(&str, bool)], nfa: &Nfa, re_str: &str) {
    for (test, expected_result) in tests {
        let result = nfa.accepts(test.as_bytes());
        assert_eq!(
            result, *expected_result,
            "'{}' failed on input '{}', expect match: {}, actual match: {}",
            re_str, test, expected_result, result
        );
    }
}

fn run_vectors_multi_status(tests: &[(&str, u16)], nfa: &Nfa, re_strs: &[(&str, u16)]) {
    for (test, expected_status) in tests {
        let status = nfa.match_status(test.as_bytes());
        assert_eq!(
            status, *expected_status,
            "'{:?}' failed on input '{}', expected status: {}, actual status: {}",
            re_strs, test, expected_status, status
        );
    }
}

#[test]
fn basic() {
    let re_str = r"a(b|c)*";
    let nfa = compile_regex(re_str, false);

    let test_vectors = [
        ("a", true),
        ("b", false),
        ("x", false),
        ("ab", true),
        ("ac", true),
        ("abcbc", true),
        ("acbcb", true),
        ("bcbc", false),
        ("abbbbbbbbbb", true),
    ];

    run_vectors(&test_vectors, &nfa, re_str)
}

#[test]
fn exponent_regex() {
    let re_str = r"\d*E-?\d*";
    let nfa = compile_regex(re_str, false);

    let test_vectors = [
        ("123", false),
        ("123E5", true),
        ("123E-102", true),
        ("123ER10", false),
        ("E", true),
        ("E-", true),
        ("-E", false),
        ("", false),
    ];

    run_vectors(&test_vectors, &nfa, re_str)
}

#[test]
fn ends_in_abb() {
    let re_str = r"(a|b)*abb";
    let nfa = compile_regex(re_str, false);

    let test_vectors = [
        ("aabbabb", true),
        ("abb", true),
        ("ab", false),
        ("abba", false),
        ("", false),
        ("babb", true),
    ];

    run_vectors(&test_vectors, &nfa, re_str)
}

#[test]
fn character_classes() {
    let re_str = r"\A\a*\d?";
    let nfa = compile_regex(re_str, true);

    let test_vectors = [
        ("Hello", true),
        ("Hello7", true),
        ("hello", false),
        ("H", true),
        ("HeLlo", false),
        ("Hello77", false),
    ];
    run_vectors(&test_vectors, &nfa, re_str);

    let re_str = r"\z+";
    let nfa = compile_regex(re_str, true);
    run_vectors(&[("aZ", true), ("Zz", true), ("a1", false), ("_", false)], &nfa, re_str);

    // \w is only space, newline and tab
    let re_str = r"\w+";
    let nfa = compile_regex(re_str, true);
    run_vectors(
        &[(" ", true), ("\n\t ", true), ("\r", false), ("\x0b", false)],
        &nfa,
        re_str,
    );
}

#[test]
fn escapes_and_literals() {
    // '.' is just a character here
    let re_str = r"a.b";
    let nfa = compile_regex(re_str, true);
    run_vectors(&[("a.b", true), ("axb", false)], &nfa, re_str);

    let re_str = r"\e|ab";
    let nfa = compile_regex(re_str, true);
    run_vectors(&[("", true), ("ab", true), ("a", false)], &nfa, re_str);

    let re_str = r"\(\*\)\n\q";
    let nfa = compile_regex(re_str, true);
    run_vectors(&[("(*)\nq", true), ("(*)nq", false)], &nfa, re_str);
}

#[test]
fn precedence() {
    let re_str = r"ab|cd";
    let nfa = compile_regex(re_str, false);
    run_vectors(
        &[("ab", true), ("cd", true), ("abd", false), ("acd", false), ("b", false)],
        &nfa,
        re_str,
    );

    let re_str = r"a|bc";
    let nfa = compile_regex(re_str, false);
    run_vectors(&[("a", true), ("bc", true), ("ac", false)], &nfa, re_str);

    let re_str = r"x(ab|c|de)y";
    let nfa = compile_regex(re_str, false);
    run_vectors(
        &[("xaby", true), ("xcy", true), ("xdey", true), ("xy", false), ("xabcy", false)],
        &nfa,
        re_str,
    );

    let re_str = r"ab*";
    let nfa = compile_regex(re_str, true);
    run_vectors(&[("a", true), ("abbb", true), ("abab", false)], &nfa, re_str);
}

#[test]
fn nested_repetition_is_kleene_star() {
    let inputs = ["", "a", "aa", "aaaaa", "b", "ab", "ba"];
    let star = compile_regex("a*", true);

    for re_str in [r"(a*)*", r"(a+)+", r"a**", r"(a?)*", r"(a*)+"] {
        let nfa = compile_regex(re_str, true);
        for input in inputs {
            assert_eq!(
                nfa.accepts(input.as_bytes()),
                star.accepts(input.as_bytes()),
                "'{}' and 'a*' disagree on '{}'",
                re_str,
                input
            );
        }
    }
}

#[test]
fn plus_and_optional() {
    let re_str = r"(ab)+c?";
    let nfa = compile_regex(re_str, false);
    run_vectors(
        &[("ab", true), ("ababc", true), ("c", false), ("abcc", false), ("", false)],
        &nfa,
        re_str,
    );
}

#[test]
fn epsilon_closure_is_idempotent() {
    let nfa = compile_regex(r"(a|b)*abb", true);
    let mut simulation = Simulation::new(&nfa);
    simulation.init();

    for c in b"aab" {
        simulation.step(*c);

        let before: Vec<StateIdx> = simulation.active_states().collect();
        let (count, status) = (simulation.active_count(), simulation.final_status());
        simulation.epsilon_closure();
        let after: Vec<StateIdx> = simulation.active_states().collect();

        assert_eq!(before, after);
        assert_eq!(count, simulation.active_count());
        assert_eq!(status, simulation.final_status());
    }
}

#[test]
fn simulation_dies_on_unknown_symbol() {
    let nfa = compile_regex(r"a*", true);
    let mut simulation = Simulation::new(&nfa);
    simulation.init();
    assert!(!simulation.is_dead());
    assert!(simulation.final_count() > 0);
    assert!(simulation.is_active(nfa.start()));

    simulation.step(b'a');
    assert_eq!(simulation.final_status(), 1);

    simulation.step(0x80);
    assert!(simulation.is_dead());
    assert_eq!(simulation.final_status(), 0);

    // epsilon is never a real input symbol
    simulation.init();
    simulation.step(EPSILON);
    assert!(simulation.is_dead());
}

#[test]
fn multiple_regex_priority() {
    let re_strs = [(r"ab+", 1), (r"cd+", 2), (r"(cdd)|(ef)", 3)];
    let rules: Vec<(Regnode, u16)> = re_strs
        .iter()
        .map(|(re_str, status)| (Regnode::from_str(re_str).expect("failed to parse regex"), *status))
        .collect();
    let nfa = Nfa::combine(&rules);

    let test_vectors = [
        ("xx", 0),
        ("abbbbb", 1),
        ("cdd", 3),
        ("cddd", 2),
        ("cd", 2),
        ("ef", 3),
        ("bad", 0),
        ("", 0),
    ];

    run_vectors_multi_status(&test_vectors, &nfa, &re_strs);
}

#[test]
fn automaton_invariants() {
    for re_str in [r"(a|b)*abb", r"\e*", r"(\e|a)*b+", r"\z(\z|\d)*", r"((a*)*|b?)+"] {
        let nfa = compile_regex(re_str, true);
        for (_, state) in nfa.states() {
            for (_, targets) in state.transitions() {
                for (i, target) in targets.iter().enumerate() {
                    assert!(target.index() < nfa.len(), "'{}' has a dangling edge", re_str);
                    assert!(
                        !targets[..i].contains(target),
                        "'{}' stores an edge twice",
                        re_str
                    );
                }
            }
        }
    }
}

#[test]
fn thompson_shapes() {
    // literal: entry --c--> accepting end
    let nfa = compile_regex("x", true);
    assert_eq!(nfa.len(), 2);
    let entry = nfa.state(nfa.start());
    assert!(!entry.is_accepting());
    assert_eq!(entry.targets(b'x').len(), 1);
    assert!(nfa.state(entry.targets(b'x')[0]).is_accepting());

    // empty: a single accepting state
    let nfa = compile_regex(r"\e", true);
    assert_eq!(nfa.len(), 1);
    assert_eq!(nfa.state(nfa.start()).final_status(), 1);

    // star adds a fresh entry and a fresh accepting exit
    let nfa = compile_regex("x*", true);
    assert_eq!(nfa.len(), 4);
    let accepting: Vec<_> = nfa.states().filter(|(_, s)| s.is_accepting()).collect();
    assert_eq!(accepting.len(), 1);
    assert_eq!(nfa.state(nfa.start()).targets(EPSILON).len(), 2);
}

#[test]
fn final_status_comes_from_caller() {
    let re = Regnode::from_str(r"a|b*").expect("failed to parse regex");
    let nfa = Nfa::from_regnode(&re, 7);
    assert_eq!(nfa.match_status(b"a"), 7);
    assert_eq!(nfa.match_status(b"bbb"), 7);
    assert_eq!(nfa.match_status(b""), 7);
    assert_eq!(nfa.match_status(b"ab"), 0);
}

#[test]
fn malformed_regexes() {
    let cases = [
        ("", RegexError::Empty),
        ("(ab", RegexError::UnbalancedParen(0)),
        ("ab)", RegexError::UnbalancedParen(2)),
        ("a(b", RegexError::UnbalancedParen(1)),
        ("*a", RegexError::MissingOperand(0)),
        ("a|", RegexError::MissingOperand(1)),
        ("|a", RegexError::MissingOperand(0)),
        ("a||b", RegexError::MissingOperand(2)),
        ("()", RegexError::MissingOperand(1)),
        ("a(*b)", RegexError::MissingOperand(2)),
        ("ab\\", RegexError::DanglingEscape),
        ("a\u{e9}", RegexError::NotAscii),
        ("\0", RegexError::Nul(0)),
        ("a\0b", RegexError::Nul(1)),
        ("a\\\0", RegexError::Nul(2)),
    ];

    for (re_str, expected) in cases {
        assert_eq!(
            Regnode::from_str(re_str),
            Err(expected),
            "'{}' should have been rejected",
            re_str
        );
    }
}

#[test]
fn nul_is_never_a_literal() {
    // byte 0 labels epsilon edges, a NUL literal would match the empty string
    let config = RegexConfig::default();
    assert_eq!(Nfa::from_regex_str("\0", &config), Err(RegexError::Nul(0)));
    assert_eq!(Nfa::from_regex_str("a\0b", &config), Err(RegexError::Nul(1)));
}

#[test]
fn stacked_plus_is_capped() {
    let config = RegexConfig {
        max_nodes: 10,
        ..RegexConfig::default()
    };

    let re = Regnode::from_str_with_config("a++", &config).expect("10 nodes fit");
    assert_eq!(re.size(), 10);
    assert_eq!(
        Regnode::from_str_with_config("a+++", &config),
        Err(RegexError::TooComplex { nodes: 22, max: 10 })
    );

    // every '+' doubles the tree, the default cap stops this well before memory runs out
    assert!(matches!(
        Regnode::from_str("a++++++++++++++++++"),
        Err(RegexError::TooComplex { .. })
    ));

    let nfa = compile_regex("a+++", true);
    run_vectors(&[("", false), ("a", true), ("aaa", true)], &nfa, "a+++");
}

#[test]
fn length_cap() {
    let config = RegexConfig {
        max_len: 4,
        ..RegexConfig::default()
    };
    assert!(Regnode::from_str_with_config("abcd", &config).is_ok());
    assert_eq!(
        Regnode::from_str_with_config("abcde", &config),
        Err(RegexError::TooLong { len: 5, max: 4 })
    );
    assert!(Nfa::from_regex_str("abcde", &config).is_err());

    let long = "a".repeat(RegexConfig::default().max_len + 1);
    assert!(matches!(
        Regnode::from_str(&long),
        Err(RegexError::TooLong { .. })
    ));
}

#[test]
fn display_reparses_to_same_tree() {
    for re_str in [
        r"a(b|c)*",
        r"\d*E-?\d*",
        r"(ab)c",
        r"a|b|c",
        r"a|(b|c)",
        r"\(\|\)\\x",
        r"\e*\w\n",
        r"(a+)+",
    ] {
        let re = Regnode::from_str(re_str).expect("failed to parse regex");
        let printed = re.to_string();
        let reparsed = Regnode::from_str(&printed).expect("printed regex should parse");
        assert_eq!(re, reparsed, "'{}' printed as '{}'", re_str, printed);
    }
}

#[test]
fn diagnostics() {
    let nfa = compile_regex(r"a*", true);

    let table = nfa.to_string();
    assert!(table.starts_with(&format!("start: {}\n", nfa.start())));
    assert!(table.contains("[1]"));

    let dot = nfa.to_dot();
    assert!(dot.contains("digraph"));
    assert!(dot.contains("ε"));
    assert_eq!(nfa.to_graph().node_count(), nfa.len());
}
