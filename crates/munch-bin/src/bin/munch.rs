use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{ArgAction, Parser, Subcommand};
use munch::scanner::{
    lexeme_sets::c_like::{CLike, CLikeClassifier},
    ByteStream, Classifier, LexemeSet, Lexer, LexerConfig, ScanError, TextClassifier, TokenValue,
};
use munch::semantics::symtab::DEFAULT_CAPACITY;
use munch_re::{
    lexeme_def::{parse_lexeme_def, LexemeSetDef},
    nfa::DEFAULT_FINAL_STATUS,
    regex::{DEFAULT_MAX_LEN, DEFAULT_MAX_NODES},
    Nfa, RegexConfig, Regnode,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "munch", version, about = "Regex NFAs and a maximal munch lexer")]
struct Cli {
    /// Longest pattern accepted, in bytes
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_LEN)]
    max_pattern_len: usize,

    /// Largest parsed pattern, in tree nodes
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_NODES)]
    max_pattern_nodes: usize,

    /// Number of slots in the symbol table
    #[arg(long, global = true, default_value_t = DEFAULT_CAPACITY)]
    symtab_capacity: usize,

    /// More logging (-v for debug, -vv for trace). RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a pattern over whole inputs and report ACCEPT or REJECT for each
    Match {
        pattern: String,
        #[arg(required = true)]
        inputs: Vec<String>,
    },
    /// Print the automaton built for a pattern
    Nfa {
        pattern: String,
        /// Emit Graphviz instead of a transition table
        #[arg(long)]
        dot: bool,
    },
    /// Tokenize a file, or stdin when no file is given
    Lex {
        file: Option<PathBuf>,
        /// Rule set definition file; the built-in C-like rules are used otherwise
        #[arg(long)]
        rules: Option<PathBuf>,
        /// Rule names whose matches are dropped (only with --rules)
        #[arg(long)]
        skip: Vec<String>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = LexerConfig {
        regex: RegexConfig {
            max_len: cli.max_pattern_len,
            max_nodes: cli.max_pattern_nodes,
        },
        symtab_capacity: cli.symtab_capacity,
    };

    match cli.command {
        Command::Match { pattern, inputs } => run_match(&pattern, &inputs, &config.regex),
        Command::Nfa { pattern, dot } => run_nfa(&pattern, dot, &config.regex),
        Command::Lex { file, rules, skip } => run_lex(file, rules, &skip, &config),
    }
}

fn run_match(pattern: &str, inputs: &[String], config: &RegexConfig) -> anyhow::Result<()> {
    let nfa = Nfa::from_regex_str(pattern, config)
        .with_context(|| format!("invalid pattern `{}`", pattern))?;
    info!(states = nfa.len(), "built automaton");

    for input in inputs {
        match nfa.match_status(input.as_bytes()) {
            0 => println!("REJECT {}", input),
            status => println!("ACCEPT {} {}", status, input),
        }
    }
    Ok(())
}

fn run_nfa(pattern: &str, dot: bool, config: &RegexConfig) -> anyhow::Result<()> {
    let re = Regnode::from_str_with_config(pattern, config)
        .with_context(|| format!("invalid pattern `{}`", pattern))?;
    let nfa = Nfa::from_regnode(&re, DEFAULT_FINAL_STATUS);

    if dot {
        println!("{}", nfa.to_dot());
    } else {
        println!("regex: {}", re);
        print!("{}", nfa);
    }
    Ok(())
}

fn open_input(file: Option<PathBuf>) -> anyhow::Result<ByteStream<Box<dyn Read>>> {
    let reader: Box<dyn Read> = match file {
        Some(path) => {
            let file = File::open(&path).with_context(|| format!("failed to open {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(io::stdin())),
    };
    Ok(ByteStream::new(reader))
}

fn load_rules(path: &Path) -> anyhow::Result<LexemeSetDef> {
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let name = path
        .file_stem()
        .map(|x| x.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_lexeme_def(name, &text).with_context(|| format!("bad rule set {}", path.display()))
}

fn run_lex(
    file: Option<PathBuf>,
    rules: Option<PathBuf>,
    skip: &[String],
    config: &LexerConfig,
) -> anyhow::Result<()> {
    let mut stream = open_input(file)?;

    let errors = match rules {
        Some(path) => {
            let def = load_rules(&path)?;
            let mut discard = Vec::new();
            for name in skip {
                match def.by_name(name) {
                    Some(lexeme) => discard.push(lexeme.status),
                    None => bail!("--skip {}: no such rule in {}", name, path.display()),
                }
            }

            let mut lexer = Lexer::from_lexeme_def(&def, TextClassifier::new(discard), config)
                .context("failed to build lexer")?;
            print_tokens(&mut lexer, &mut stream, |status| {
                def.by_status(status).map(|x| x.name.clone())
            })?
        }
        None => {
            if !skip.is_empty() {
                bail!("--skip needs --rules");
            }
            let mut lexer = Lexer::from_lexeme_set::<CLike>(CLikeClassifier, config)
                .context("failed to build lexer")?;
            print_tokens(&mut lexer, &mut stream, |status| {
                CLike::from_status(status).map(|x| x.to_name().to_string())
            })?
        }
    };

    if errors > 0 {
        bail!("{} lexical error(s)", errors);
    }
    Ok(())
}

// prints one token per line, reports lexical errors and keeps going. returns how
// many lexical errors there were
fn print_tokens<C, R, F>(lexer: &mut Lexer<C>, stream: &mut ByteStream<R>, name_of: F) -> anyhow::Result<usize>
where
    C: Classifier,
    R: Read,
    F: Fn(u16) -> Option<String>,
{
    let mut errors = 0;
    loop {
        let token = match lexer.next_token(stream) {
            Ok(Some(token)) => token,
            Ok(None) => break,
            Err(e @ ScanError::NoMatch { .. }) => {
                eprintln!("error: {}", e);
                errors += 1;
                continue;
            }
            Err(e) => return Err(e).context("scanning failed"),
        };

        let name = name_of(token.code).unwrap_or_else(|| token.code.to_string());
        match token.value {
            TokenValue::Text(text) => println!("{}\t{}", name, text),
            TokenValue::Integer(value) => println!("{}\t{}", name, value),
            TokenValue::Symbol(idx) => {
                let text = lexer.symtab().text(idx).unwrap_or("?");
                println!("{}\t{}\t#{}", name, text, idx);
            }
        }
    }

    info!(symbols = lexer.symtab().len(), "done");
    Ok(errors)
}
