//! Evaluate an arithmetic expression with a parser compiled at startup.
//!
//! ```text
//! lrkit "2 * (3 + 4)"
//! lrkit --algorithm slr --dot "1 - 2 - 3"
//! ```

use std::io;

use anyhow::{bail, Result};
use clap::{Parser as ClapParser, ValueEnum};
use lrkit::*;
use thiserror::Error;

#[derive(ClapParser, Debug)]
#[command(name = "lrkit", about = "Evaluate an arithmetic expression")]
struct Args {
    /// Table construction algorithm.
    #[arg(short, long, value_enum, default_value_t = Algorithm::Lr1)]
    algorithm: Algorithm,

    /// Print the automaton in graphviz format before evaluating.
    #[arg(long)]
    dot: bool,

    /// The expression to evaluate.
    expr: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    Slr,
    Lr1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Lexeme {
    kind: &'static str,
    value: i64,
}

impl Token for Lexeme {
    type Terminal = &'static str;

    fn terminal(&self) -> &&'static str {
        &self.kind
    }
}

impl From<Lexeme> for i64 {
    fn from(l: Lexeme) -> i64 {
        l.value
    }
}

#[derive(Debug, Error)]
#[error("unexpected character {ch:?} at offset {offset}")]
struct LexError {
    ch: char,
    offset: usize,
}

fn lex(input: &str) -> impl Iterator<Item = Result<Lexeme, LexError>> + '_ {
    let mut chars = input.char_indices().peekable();
    std::iter::from_fn(move || loop {
        let (offset, ch) = chars.next()?;
        let kind = match ch {
            c if c.is_whitespace() => continue,
            '+' => "+",
            '-' => "-",
            '*' => "*",
            '/' => "/",
            '(' => "(",
            ')' => ")",
            c if c.is_ascii_digit() => {
                let mut value = i64::from(c as u8 - b'0');
                while let Some(&(_, d)) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    value = value * 10 + i64::from(d as u8 - b'0');
                    chars.next();
                }
                return Some(Ok(Lexeme { kind: "num", value }));
            }
            ch => return Some(Err(LexError { ch, offset })),
        };
        return Some(Ok(Lexeme { kind, value: 0 }));
    })
}

fn grammar() -> Grammar<&'static str, &'static str, Reduction<i64>> {
    let mut g: Grammar<&'static str, &'static str, Reduction<i64>> = Grammar::new();
    g.rule("S").alt(vec![Nonterminal("E")], Box::new(|v| v[0]));
    g.rule("E")
        .alt(
            vec![Nonterminal("E"), Terminal("+"), Nonterminal("E")],
            Box::new(|v| v[0] + v[2]),
        )
        .alt(
            vec![Nonterminal("E"), Terminal("-"), Nonterminal("E")],
            Box::new(|v| v[0] - v[2]),
        )
        .alt(
            vec![Nonterminal("E"), Terminal("*"), Nonterminal("E")],
            Box::new(|v| v[0] * v[2]),
        )
        .alt(
            vec![Nonterminal("E"), Terminal("/"), Nonterminal("E")],
            Box::new(|v| if v[2] == 0 { 0 } else { v[0] / v[2] }),
        )
        .alt(
            vec![Terminal("("), Nonterminal("E"), Terminal(")")],
            Box::new(|v| v[1]),
        )
        .alt(vec![Terminal("num")], Box::new(|v| v[0]));
    g.left(["+", "-"]).left(["*", "/"]);
    g
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let g = grammar();
    let config = DefaultConfig::new();
    let table = match args.algorithm {
        Algorithm::Slr => g.slr(&"S", &config),
        Algorithm::Lr1 => g.lr1(&"S", &config),
    }?;

    if args.dot {
        let mut stdout = io::stdout();
        match args.algorithm {
            Algorithm::Slr => g.lr0_state_machine(&"S")?.write_dot(&g, &mut stdout)?,
            Algorithm::Lr1 => g.lr1_state_machine(&"S")?.write_dot(&g, &mut stdout)?,
        }
    }

    let mut parser = Parser::new(&g, &table);
    match parser.parse(lex(&args.expr)) {
        Ok(value) => println!("{}", value),
        Err(ParseError::Lex(e)) => bail!("{}", e),
        Err(ParseError::Syntax(e)) => bail!(
            "{} (expected one of {:?})",
            e.message,
            e.expected
                .iter()
                .map(|t| t.unwrap_or("end of input"))
                .collect::<Vec<_>>()
        ),
    }
    log::debug!("{:?}", parser.stats());
    Ok(())
}
