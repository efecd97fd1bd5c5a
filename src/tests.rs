use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;

use super::*;
use crate::automaton::ItemSet;
use crate::lr1::Lr1Item;
use crate::sets::{FirstSets, FollowSets};
use crate::slr::Lr0Item;

macro_rules! map {
    ($($l: expr => $r: expr),*) => ({
        let mut r = BTreeMap::new();
        $(r.insert($l, $r);)*
        r
    });
}

macro_rules! coll {
    ($($x: expr),*) => (vec!($($x),*).into_iter().collect());
    () => (None.into_iter().collect());
}

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Tok(&'static str, &'static str);

impl Token for Tok {
    type Terminal = &'static str;

    fn terminal(&self) -> &&'static str {
        &self.0
    }
}

impl From<Tok> for String {
    fn from(t: Tok) -> String {
        t.1.to_string()
    }
}

impl From<Tok> for i64 {
    fn from(t: Tok) -> i64 {
        t.1.parse().unwrap_or(0)
    }
}

fn lex(input: &'static str) -> impl Iterator<Item = Result<Tok, Infallible>> {
    input.split_whitespace().map(|w| {
        let kind = if w.bytes().all(|b| b.is_ascii_digit()) {
            "num"
        } else {
            w
        };
        Ok(Tok(kind, w))
    })
}

type TestGrammar<V> = Grammar<&'static str, &'static str, Reduction<V>>;
type TestTable = ParseTable<&'static str, &'static str>;

fn run<V: From<Tok>>(
    g: &TestGrammar<V>,
    table: &TestTable,
    input: &'static str,
) -> Result<V, ParseError<&'static str, Tok, V, Infallible>> {
    Parser::new(g, table).parse(lex(input))
}

/// Both compiled tables of `g`, SLR first.
fn tables<A>(g: &Grammar<&'static str, &'static str, A>) -> [TestTable; 2] {
    let config = DefaultConfig::new();
    [g.slr(&"S", &config).unwrap(), g.lr1(&"S", &config).unwrap()]
}

fn first_value<V: 'static>() -> Reduction<V> {
    Box::new(|mut v: Vec<V>| v.remove(0))
}

// S -> N, N -> V = E | E, E -> V, V -> x | * E
fn grammar() -> Grammar<&'static str, &'static str, ()> {
    let mut g = Grammar::new();
    g.rule("S").alt(vec![Nonterminal("N")], ());
    g.rule("N")
        .alt(vec![Nonterminal("V"), Terminal("="), Nonterminal("E")], ())
        .alt(vec![Nonterminal("E")], ());
    g.rule("E").alt(vec![Nonterminal("V")], ());
    g.rule("V")
        .alt(vec![Terminal("x")], ())
        .alt(vec![Terminal("*"), Nonterminal("E")], ());
    g
}

static S: &&str = &"S";
static N: &&str = &"N";
static E: &&str = &"E";
static V: &&str = &"V";
static X: &&str = &"x";
static STAR: &&str = &"*";
static EQ: &&str = &"=";

#[test]
fn first_sets() {
    let g = grammar();
    let first = FirstSets::new(&g);
    assert_eq!(
        first.sets(),
        &map! {
            S => (coll![X, STAR], false),
            N => (coll![X, STAR], false),
            E => (coll![X, STAR], false),
            V => (coll![X, STAR], false)
        }
    );
}

#[test]
fn follow_sets() {
    let g = grammar();
    let first = FirstSets::new(&g);
    let follow = FollowSets::new(&g, &first, &"S");
    assert_eq!(
        follow.sets(),
        &map! {
            S => (coll![], true),
            N => (coll![], true),
            E => (coll![EQ], true),
            V => (coll![EQ], true)
        }
    );
    assert_eq!(follow.lookaheads(&"V"), vec![Some(EQ), None]);
}

// S -> ListOpt, ListOpt -> Items | ε, Items -> Num ItemsList,
// ItemsList -> ItemsList , Num | ε, Num -> num
fn list_grammar() -> TestGrammar<i64> {
    let mut g: TestGrammar<i64> = Grammar::new();
    g.rule("S").alt(vec![Nonterminal("ListOpt")], first_value());
    g.rule("ListOpt")
        .alt(vec![Nonterminal("Items")], first_value())
        .alt(vec![], Box::new(|_| 0));
    g.rule("Items").alt(
        vec![Nonterminal("Num"), Nonterminal("ItemsList")],
        Box::new(|v| v[0] + v[1]),
    );
    g.rule("ItemsList")
        .alt(
            vec![Nonterminal("ItemsList"), Terminal(","), Nonterminal("Num")],
            Box::new(|v| v[0] + v[2]),
        )
        .alt(vec![], Box::new(|_| 0));
    g.rule("Num").alt(vec![Terminal("num")], first_value());
    g
}

#[test]
fn nullable_sets() {
    let g = list_grammar();
    let first = FirstSets::new(&g);
    let num: &&str = &"num";
    let comma: &&str = &",";
    assert_eq!(
        first.sets(),
        &map! {
            &"S" => (coll![num], true),
            &"ListOpt" => (coll![num], true),
            &"Items" => (coll![num], false),
            &"ItemsList" => (coll![comma], true),
            &"Num" => (coll![num], false)
        }
    );

    let follow = FollowSets::new(&g, &first, &"S");
    assert_eq!(follow.follow(&"Items"), Some(&(coll![], true)));
    assert_eq!(follow.follow(&"Num"), Some(&(coll![comma], true)));

    // Items -> Num . ItemsList: the suffix can vanish, so the lookahead comes through
    let suffix = &g.productions()[3].rhs()[1..];
    let expected: BTreeSet<Option<&&str>> = coll![Some(comma), None];
    assert_eq!(first.first_of_sequence(suffix, None), expected);
    // ItemsList -> ItemsList . , Num
    let suffix = &g.productions()[4].rhs()[1..];
    let expected: BTreeSet<Option<&&str>> = coll![Some(comma)];
    assert_eq!(first.first_of_sequence(suffix, None), expected);
}

fn check_follow_covers_suffixes<A>(g: &Grammar<&'static str, &'static str, A>) {
    let first = FirstSets::new(g);
    let follow = FollowSets::new(g, &first, &"S");
    for p in g.productions() {
        for (i, sym) in p.rhs().iter().enumerate() {
            let n = match sym.nonterminal() {
                Some(n) => n,
                None => continue,
            };
            let (terminals, eof) = follow.follow(n).unwrap();
            let (lhs_terminals, lhs_eof) = follow.follow(p.lhs()).unwrap();
            for la in first.first_of_sequence(&p.rhs()[i + 1..], None) {
                match la {
                    Some(t) => assert!(terminals.contains(t), "{:?} not in FOLLOW({:?})", t, n),
                    None => {
                        assert!(lhs_terminals.is_subset(terminals));
                        assert!(!lhs_eof || *eof);
                    }
                }
            }
        }
    }
}

#[test]
fn follow_covers_first_of_suffixes() {
    check_follow_covers_suffixes(&grammar());
    check_follow_covers_suffixes(&list_grammar());
    check_follow_covers_suffixes(&calc());
}

fn sizes<T: Ord, N: Ord, A>(g: &Grammar<T, N, A>) -> (usize, usize, usize) {
    let first = FirstSets::new(g);
    (g.productions().len(), g.nonterminals().len(), first.sets().len())
}

#[test]
fn queries_need_only_ord() {
    assert_eq!(sizes(&calc()), (5, 2, 2));
    assert_eq!(sizes(&grammar()), (6, 4, 4));
}

#[test]
fn lr0_closure_and_goto() {
    let g = grammar();
    let i0 = slr::closure(&g, &ItemSet::new([Lr0Item { prod: 0, dot: 0 }]));
    // S -> .N, N -> .V=E, N -> .E, E -> .V, V -> .x, V -> .*E
    assert_eq!(i0.items.len(), 6);
    assert_eq!(
        slr::goto(&g, &i0, &Nonterminal("V")),
        ItemSet::new([Lr0Item { prod: 1, dot: 1 }, Lr0Item { prod: 3, dot: 1 }])
    );
    assert!(slr::goto(&g, &i0, &Terminal("=")).is_empty());
}

#[test]
fn lr1_closure_and_goto() {
    let g = grammar();
    let first = FirstSets::new(&g);
    let i0 = lr1::closure(
        &g,
        &first,
        &ItemSet::new([Lr1Item {
            prod: 0,
            dot: 0,
            lookahead: None,
        }]),
    );
    assert_eq!(i0.items.len(), 8);
    assert!(i0.items.contains(&Lr1Item {
        prod: 4,
        dot: 0,
        lookahead: Some(EQ),
    }));
    assert!(i0.items.contains(&Lr1Item {
        prod: 4,
        dot: 0,
        lookahead: None,
    }));
    assert_eq!(
        lr1::goto(&g, &first, &i0, &Nonterminal("V")),
        ItemSet::new([
            Lr1Item {
                prod: 1,
                dot: 1,
                lookahead: None
            },
            Lr1Item {
                prod: 3,
                dot: 1,
                lookahead: None
            },
        ])
    );
}

struct Strict;

impl<T, N, A> Config<T, N, A> for Strict {
    fn shift_on_undeclared_precedence(&self) -> bool {
        false
    }
}

#[test]
fn slr_conflict_that_lr1_avoids() {
    init();
    let g = grammar();
    let slr = g.slr(&"S", &DefaultConfig::new()).unwrap();
    assert_eq!(slr.states.len(), 10);
    assert_eq!(slr.conflicts.len(), 1);
    assert_eq!(slr.conflicts[0].lookahead, "=");
    assert_eq!(slr.conflicts[0].reduce, 3);

    let lr1 = g.lr1(&"S", &DefaultConfig::new()).unwrap();
    assert_eq!(lr1.states.len(), 14);
    assert!(!lr1.has_conflicts());

    assert_eq!(
        g.slr(&"S", &Strict),
        Err(CompileError::Grammar(GrammarError::UndeclaredPrecedence("=")))
    );
    assert!(g.lr1(&"S", &Strict).is_ok());
}

// S -> E, E -> E + E | E * E | ( E ) | num
fn calc() -> TestGrammar<i64> {
    let mut g: TestGrammar<i64> = Grammar::new();
    g.rule("S").alt(vec![Nonterminal("E")], first_value());
    g.rule("E")
        .alt(
            vec![Nonterminal("E"), Terminal("+"), Nonterminal("E")],
            Box::new(|v| v[0] + v[2]),
        )
        .alt(
            vec![Nonterminal("E"), Terminal("*"), Nonterminal("E")],
            Box::new(|v| v[0] * v[2]),
        )
        .alt(
            vec![Terminal("("), Nonterminal("E"), Terminal(")")],
            Box::new(|v| v[1]),
        )
        .alt(vec![Terminal("num")], first_value());
    g.left(["+"]).left(["*"]);
    g
}

#[test]
fn calc_evaluates() {
    init();
    let g = calc();
    let [slr, lr1] = tables(&g);
    assert_eq!(slr.states.len(), 10);
    assert_eq!(lr1.states.len(), 18);
    for table in [slr, lr1] {
        assert!(!table.has_conflicts());
        assert_eq!(run(&g, &table, "2 + 2 * 2").unwrap(), 6);
        assert_eq!(run(&g, &table, "( 2 + 2 ) * 2").unwrap(), 8);

        let mut parser = Parser::new(&g, &table);
        assert_eq!(parser.parse(lex("2 * ( 3 + 4 )")).unwrap(), 14);
        assert_eq!(
            parser.stats(),
            ParserStats {
                tokens: 7,
                shifts: 7,
                reductions: 6,
            }
        );
    }
}

#[test]
fn error_at_end_of_input() {
    let g = calc();
    for table in tables(&g) {
        match run(&g, &table, "2 * ( 3 +") {
            Err(ParseError::Syntax(e)) => {
                assert_eq!(e.message, "unexpected end of input");
                assert_eq!(e.token, None);
                assert_eq!(e.expected, vec![Some("("), Some("num")]);
                // bottom, E, *, (, E, +
                assert_eq!(e.stack.len(), 6);
                assert_eq!(e.stack[0].value, None);
                assert_eq!(e.stack[1].value, Some(2));
                assert_eq!(e.stack[4].value, Some(3));
            }
            other => panic!("expected a syntax error, got {:?}", other),
        }
    }
}

#[test]
fn unexpected_tokens() {
    let g = calc();
    for table in tables(&g) {
        match run(&g, &table, "2 3") {
            Err(ParseError::Syntax(e)) => {
                assert_eq!(e.message, "unexpected token");
                assert_eq!(e.token, Some(Tok("num", "3")));
                assert!(e.expected.contains(&None));
                assert!(e.expected.contains(&Some("+")));
            }
            other => panic!("expected a syntax error, got {:?}", other),
        }
        // not a terminal of the grammar at all
        match run(&g, &table, "2 ?") {
            Err(ParseError::Syntax(e)) => assert_eq!(e.token, Some(Tok("?", "?"))),
            other => panic!("expected a syntax error, got {:?}", other),
        }
    }
}

#[derive(Debug, PartialEq)]
struct Stop;

#[test]
fn lexer_errors_end_the_parse() {
    let g = calc();
    let table = g.lr1(&"S", &DefaultConfig::new()).unwrap();
    let tokens = vec![Ok(Tok("num", "2")), Ok(Tok("*", "*")), Err(Stop)];
    let mut parser = Parser::new(&g, &table);
    match parser.parse(tokens) {
        Err(ParseError::Lex(Stop)) => {}
        other => panic!("expected a lexical error, got {:?}", other),
    }
    assert_eq!(parser.stats().tokens, 2);
}

#[test]
fn start_action_runs_on_accept() {
    let mut g: TestGrammar<i64> = Grammar::new();
    g.rule("S").alt(vec![Nonterminal("E")], Box::new(|v| v[0] * 100));
    g.rule("E").alt(vec![Terminal("num")], first_value());
    for table in tables(&g) {
        assert_eq!(run(&g, &table, "7").unwrap(), 700);
    }
}

#[test]
fn start_production_with_terminator() {
    // S -> E ;
    let mut g: TestGrammar<String> = Grammar::new();
    g.rule("S").alt(
        vec![Nonterminal("E"), Terminal(";")],
        Box::new(|v| format!("{}{}", v[0], v[1])),
    );
    g.rule("E").alt(vec![Terminal("num")], first_value());
    for table in tables(&g) {
        assert_eq!(run(&g, &table, "7 ;").unwrap(), "7;");
        match run(&g, &table, "7") {
            Err(ParseError::Syntax(e)) => assert_eq!(e.message, "unexpected end of input"),
            other => panic!("expected a syntax error, got {:?}", other),
        }
    }
}

#[test]
fn empty_start_production() {
    // S -> ε
    let mut g: TestGrammar<i64> = Grammar::new();
    g.rule("S").alt(vec![], Box::new(|v| v.len() as i64 + 42));
    for table in tables(&g) {
        assert_eq!(table.states.len(), 1);
        let mut parser = Parser::new(&g, &table);
        assert_eq!(parser.parse(lex("")).unwrap(), 42);
        assert_eq!(parser.stats().reductions, 0);
        match run(&g, &table, "x") {
            Err(ParseError::Syntax(e)) => assert_eq!(e.token, Some(Tok("x", "x"))),
            other => panic!("expected a syntax error, got {:?}", other),
        }
    }
}

#[test]
fn empty_productions() {
    let g = list_grammar();
    for table in tables(&g) {
        assert_eq!(table.states.len(), 8);
        assert!(!table.has_conflicts());
        assert_eq!(run(&g, &table, "1 , 2 , 3").unwrap(), 6);
        assert_eq!(run(&g, &table, "").unwrap(), 0);
        assert!(run(&g, &table, "1 , , 2").is_err());
    }
}

// S -> E, E -> E op E | num for each op
fn operators(ops: &[&'static str]) -> TestGrammar<String> {
    let mut g: TestGrammar<String> = Grammar::new();
    g.rule("S").alt(vec![Nonterminal("E")], first_value());
    let mut e = g.rule("E");
    for &op in ops {
        e = e.alt(
            vec![Nonterminal("E"), Terminal(op), Nonterminal("E")],
            Box::new(|v: Vec<String>| format!("({} {} {})", v[0], v[1], v[2])),
        );
    }
    e.alt(vec![Terminal("num")], first_value());
    g
}

#[test]
fn precedence_levels() {
    let mut g = operators(&["+", "*"]);
    g.left(["+"]).left(["*"]);
    for table in tables(&g) {
        assert!(!table.has_conflicts());
        assert_eq!(run(&g, &table, "1 + 2 * 3").unwrap(), "(1 + (2 * 3))");
        assert_eq!(run(&g, &table, "1 * 2 + 3").unwrap(), "((1 * 2) + 3)");
    }

    // declared the other way round
    let mut g = operators(&["+", "*"]);
    g.left(["*"]).left(["+"]);
    for table in tables(&g) {
        assert_eq!(run(&g, &table, "1 + 2 * 3").unwrap(), "((1 + 2) * 3)");
    }
}

#[test]
fn associativity() {
    let mut g = operators(&["-"]);
    g.left(["-"]);
    for table in tables(&g) {
        assert_eq!(run(&g, &table, "1 - 2 - 3").unwrap(), "((1 - 2) - 3)");
    }

    let mut g = operators(&["-"]);
    g.right(["-"]);
    for table in tables(&g) {
        assert_eq!(run(&g, &table, "1 - 2 - 3").unwrap(), "(1 - (2 - 3))");
    }
}

#[test]
fn nonassoc_is_a_syntax_error() {
    let mut g = operators(&["="]);
    g.nonassoc(["="]);
    for table in tables(&g) {
        assert!(!table.has_conflicts());
        assert!(table.states.iter().any(|s| matches!(
            s.lookahead.get(&"="),
            Some(Action::Error { conflicts, .. }) if conflicts.len() == 2
        )));
        assert_eq!(run(&g, &table, "1 = 2").unwrap(), "(1 = 2)");
        match run(&g, &table, "1 = 2 = 3") {
            Err(ParseError::Syntax(e)) => {
                assert_eq!(e.message, "non-associative operator used associatively");
                assert_eq!(e.token, Some(Tok("=", "=")));
            }
            other => panic!("expected a syntax error, got {:?}", other),
        }
    }
}

#[test]
fn unary_minus() {
    let mut g: TestGrammar<String> = Grammar::new();
    g.rule("S").alt(vec![Nonterminal("E")], first_value());
    g.rule("E")
        .alt(
            vec![Nonterminal("E"), Terminal("-"), Nonterminal("E")],
            Box::new(|v| format!("({} - {})", v[0], v[2])),
        )
        .alt(
            vec![Nonterminal("E"), Terminal("*"), Nonterminal("E")],
            Box::new(|v| format!("({} * {})", v[0], v[2])),
        )
        .alt_prec(
            vec![Terminal("-"), Nonterminal("E")],
            "NEG",
            Box::new(|v| format!("(-{})", v[1])),
        )
        .alt(vec![Terminal("num")], first_value());
    g.left(["-"]).left(["*"]).right(["NEG"]);

    assert_eq!(
        g.rule_precedence(3),
        Ok(Precedence {
            level: 2,
            assoc: Assoc::Right,
        })
    );
    for table in tables(&g) {
        assert!(!table.has_conflicts());
        assert_eq!(run(&g, &table, "- 1 * 2").unwrap(), "((-1) * 2)");
        assert_eq!(run(&g, &table, "1 - - 2 - 3").unwrap(), "((1 - (-2)) - 3)");
    }
}

// S -> X, X -> A | B, A -> x, B -> x, with the alternatives of X in `order`
fn letters(order: [&'static str; 2]) -> TestGrammar<String> {
    let mut g: TestGrammar<String> = Grammar::new();
    g.rule("S").alt(vec![Nonterminal("X")], first_value());
    let mut x = g.rule("X");
    for n in order {
        x = x.alt(vec![Nonterminal(n)], first_value());
    }
    for n in order {
        g.rule(n)
            .alt(vec![Terminal("x")], Box::new(move |_| n.to_string()));
    }
    g
}

#[test]
fn reduce_reduce_prefers_earliest_production() {
    init();
    let g = letters(["A", "B"]);
    for table in tables(&g) {
        assert_eq!(run(&g, &table, "x").unwrap(), "A");
    }
    let g = letters(["B", "A"]);
    for table in tables(&g) {
        assert_eq!(run(&g, &table, "x").unwrap(), "B");
    }
}

// P -> St, St -> if c St | if c St else St | s
fn if_else() -> Grammar<&'static str, &'static str, Reduction<String>> {
    let mut g: TestGrammar<String> = Grammar::new();
    g.rule("S").alt(vec![Nonterminal("St")], first_value());
    g.rule("St")
        .alt(
            vec![Terminal("if"), Terminal("c"), Nonterminal("St")],
            Box::new(|v| format!("if({})", v[2])),
        )
        .alt(
            vec![
                Terminal("if"),
                Terminal("c"),
                Nonterminal("St"),
                Terminal("else"),
                Nonterminal("St"),
            ],
            Box::new(|v| format!("if({},{})", v[2], v[4])),
        )
        .alt(vec![Terminal("s")], first_value());
    g
}

struct Recording {
    conflicts: RefCell<Vec<Conflict<&'static str>>>,
}

impl<N, A> Config<&'static str, N, A> for Recording {
    fn on_defaulted_conflict(&self, conflict: &Conflict<&'static str>) {
        self.conflicts.borrow_mut().push(conflict.clone());
    }
}

#[test]
fn dangling_else_shifts() {
    init();
    let g = if_else();
    let config = Recording {
        conflicts: RefCell::new(vec![]),
    };
    let slr = g.slr(&"S", &config).unwrap();
    let lr1 = g.lr1(&"S", &config).unwrap();
    assert_eq!(config.conflicts.borrow().len(), 2);
    for table in [slr, lr1] {
        assert_eq!(table.conflicts.len(), 1);
        assert_eq!(table.conflicts[0].lookahead, "else");
        assert_eq!(table.conflicts[0].reduce, 1);
        assert!(config.conflicts.borrow().contains(&table.conflicts[0]));
        let state = table.conflicts[0].state;
        assert_eq!(
            table.action(state, Some(&"else")),
            Some(&Action::Shift(table.conflicts[0].shift))
        );
        assert_eq!(run(&g, &table, "if c if c s else s").unwrap(), "if(if(s,s))");
    }
}

struct ElseBindsInner;

impl<A> Config<&'static str, &'static str, A> for ElseBindsInner {
    fn reduce_on(
        &self,
        production: &Production<&'static str, &'static str, A>,
        lookahead: Option<&&'static str>,
    ) -> bool {
        !(production.lhs() == &"St" && production.rhs().len() == 3 && lookahead == Some(&"else"))
    }
}

#[test]
fn vetoed_reduction_leaves_no_conflict() {
    let g = if_else();
    for table in [
        g.slr(&"S", &ElseBindsInner).unwrap(),
        g.lr1(&"S", &ElseBindsInner).unwrap(),
    ] {
        assert!(!table.has_conflicts());
        assert_eq!(run(&g, &table, "if c if c s else s").unwrap(), "if(if(s,s))");
        assert_eq!(run(&g, &table, "if c s").unwrap(), "if(s)");
    }
}

#[test]
fn accept_conflict_is_fatal() {
    // S -> X, X -> X Y | x, Y -> ε
    let mut g: Grammar<&str, &str, ()> = Grammar::new();
    g.rule("S").alt(vec![Nonterminal("X")], ());
    g.rule("X")
        .alt(vec![Nonterminal("X"), Nonterminal("Y")], ())
        .alt(vec![Terminal("x")], ());
    g.rule("Y").alt(vec![], ());
    let config = DefaultConfig::new();
    for result in [g.slr(&"S", &config), g.lr1(&"S", &config)] {
        match result {
            Err(CompileError::Conflict {
                lookahead: None,
                existing: Action::Accept,
                incoming: Action::Reduce(3),
                ..
            }) => {}
            other => panic!("expected an accept conflict, got {:?}", other),
        }
    }
}

#[test]
fn grammar_errors() {
    let mut g: Grammar<&str, &str, ()> = Grammar::new();
    g.rule("S").alt(vec![Nonterminal("A")], ());
    g.rule("A").alt(vec![Nonterminal("B"), Terminal("x")], ());
    assert_eq!(g.validate(&"Q"), Err(GrammarError::UnknownStart("Q")));
    assert_eq!(g.validate(&"S"), Err(GrammarError::EmptyNonterminal("B")));
    assert_eq!(
        g.slr(&"S", &DefaultConfig::new()),
        Err(CompileError::Grammar(GrammarError::EmptyNonterminal("B")))
    );

    let mut g: Grammar<&str, &str, ()> = Grammar::new();
    g.rule("S");
    g.rule("E").alt(vec![Terminal("x")], ());
    assert_eq!(g.validate(&"S"), Err(GrammarError::NoStartProduction("S")));
    // S is not reachable from E
    assert_eq!(g.validate(&"E"), Ok(0));

    let mut g: Grammar<&str, &str, ()> = Grammar::new();
    g.rule("S")
        .alt(vec![Terminal("x")], ())
        .alt(vec![Terminal("y")], ());
    assert_eq!(
        g.validate(&"S"),
        Err(GrammarError::MultipleStartProductions {
            start: "S",
            count: 2,
        })
    );

    let mut g: Grammar<&str, &str, ()> = Grammar::new();
    g.rule("S").alt(vec![Nonterminal("E")], ());
    g.rule("E")
        .alt(vec![Terminal("x")], ())
        .alt(vec![Terminal("("), Nonterminal("S"), Terminal(")")], ());
    assert_eq!(g.validate(&"S"), Err(GrammarError::StartReferenced("S")));

    let mut g = operators(&["+"]);
    g.left(["+"]).right(["+"]);
    assert_eq!(
        g.lr1(&"S", &DefaultConfig::new()).map(|_| ()),
        Err(CompileError::Grammar(GrammarError::DuplicatePrecedence("+")))
    );
}

#[test]
fn compile_errors_keep_their_type_in_anyhow() {
    let mut g = operators(&["+"]);
    g.left(["+"]).right(["+"]);
    let e: anyhow::Error = g.lr1(&"S", &DefaultConfig::new()).unwrap_err().into();
    assert_eq!(
        e.downcast_ref::<CompileError<&'static str, &'static str>>(),
        Some(&CompileError::Grammar(GrammarError::DuplicatePrecedence("+")))
    );
    let e: anyhow::Error = g.lr0_state_machine(&"S").unwrap_err().into();
    assert!(e.downcast_ref::<GrammarError<&'static str, &'static str>>().is_some());
}

#[test]
fn precedence_lookups() {
    let g = calc();
    assert_eq!(
        g.precedence_table().groups(),
        &[(Assoc::Left, vec!["+"]), (Assoc::Left, vec!["*"])]
    );
    assert_eq!(g.precedence_table().lookup(&"+").map(|p| p.level), Some(0));
    assert_eq!(g.precedence_table().duplicate(), None);
    assert_eq!(
        g.terminal_precedence(&"*"),
        Ok(Precedence {
            level: 1,
            assoc: Assoc::Left,
        })
    );
    assert_eq!(
        g.terminal_precedence(&"("),
        Err(GrammarError::UndeclaredPrecedence("("))
    );
    // E -> E * E
    assert_eq!(g.rule_precedence(2).map(|p| p.level), Ok(1));
    // E -> ( E ): the rightmost terminal is undeclared
    assert_eq!(
        g.rule_precedence(3),
        Err(GrammarError::UndeclaredPrecedence(")"))
    );
    // S -> E
    assert_eq!(
        g.rule_precedence(0),
        Err(GrammarError::NoRulePrecedence {
            lhs: "S",
            production: 0,
        })
    );
}

#[test]
fn builder_bookkeeping() {
    let mut g: Grammar<&str, &str, ()> = Grammar::new();
    let rule = g.rule("S");
    assert_eq!(rule.next_generation(), 0);
    let rule = rule.alt(vec![Nonterminal("E")], ());
    assert_eq!(rule.next_generation(), 1);
    assert_eq!(g.add_production("E", vec![Terminal("x")], None, ()), 1);
    assert_eq!(g.add_production("E", vec![Terminal("y"), Nonterminal("F")], None, ()), 2);

    assert_eq!(g.get_or_create("E"), 1);
    let names: Vec<_> = g.nonterminals().iter().map(|n| *n.name()).collect();
    assert_eq!(names, vec!["S", "E", "F"]);
    assert_eq!(g.alternatives(&"E"), &[1, 2]);
    assert!(g.alternatives(&"F").is_empty());
    assert!(g.alternatives(&"nope").is_empty());
    assert_eq!(g.productions()[2].generation(), 2);
    assert_eq!(g.terminals(), coll![&"x", &"y"]);
    assert_eq!(g.reachable(&"E"), coll![&"E", &"F"]);
}

#[test]
fn tables_are_total() {
    let g = calc();
    for table in tables(&g) {
        for state in 0..table.states.len() {
            assert!(table.action(state, None).is_some());
            for t in g.terminals() {
                assert!(table.action(state, Some(t)).is_some());
            }
        }
        assert_eq!(table.action(0, Some(&"?")), None);
        assert_eq!(table.action(table.states.len(), None), None);
        assert_eq!(table.expected(table.start), vec![Some(&"("), Some(&"num")]);
    }
}

#[test]
fn compilation_is_deterministic() {
    let g = if_else();
    let config = DefaultConfig::new();
    assert_eq!(g.slr(&"S", &config), g.slr(&"S", &config));
    assert_eq!(g.lr1(&"S", &config), g.lr1(&"S", &config));
    assert_eq!(
        g.lr1_state_machine(&"S").unwrap().states,
        g.lr1_state_machine(&"S").unwrap().states
    );
}

#[test]
fn tables_serialize() {
    let g = calc();
    let table = g.lr1(&"S", &DefaultConfig::new()).unwrap();
    let json = serde_json::to_string(&table).unwrap();
    let back: ParseTable<String, String> = serde_json::from_str(&json).unwrap();
    assert_eq!(back.states.len(), table.states.len());
    assert_eq!(back.productions[1].lhs, "E");
    assert_eq!(back.productions[1].len, 3);
    assert_eq!(serde_json::to_string(&back).unwrap(), json);
}

#[test]
fn dot_output() {
    let g = calc();
    let mut out = Vec::new();
    g.lr0_state_machine(&"S")
        .unwrap()
        .write_dot(&g, &mut out)
        .unwrap();
    let dot = String::from_utf8(out).unwrap();
    assert!(dot.starts_with("digraph G {"));
    assert!(dot.contains("s0 -> s"));
    assert!(!dot.contains(", $"));

    let mut out = Vec::new();
    g.lr1_state_machine(&"S")
        .unwrap()
        .write_dot(&g, &mut out)
        .unwrap();
    let dot = String::from_utf8(out).unwrap();
    assert!(dot.contains(", $"));
    assert!(dot.trim_end().ends_with('}'));
}
