//! Rust backend: renders [`Tables`] as a module of `'static` constants.
//!
//! The output has no dependencies beyond `lrkit` and is meant to be pulled in
//! with `include!` from a build script's `OUT_DIR`. Rows appear in state
//! order, lexer ranges in code point order, and ACTION/GOTO cells in name
//! order, so identical tables always produce identical source.

use lrkit::{Action, EOF, ERROR, HintView, ParentView, Production, RangeTransition, Tables};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt::{self, Write};

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)[A-Za-z0-9_]+|.").unwrap());

/// Spelled-out names for punctuation in token type constants.
const SYM_NAMES: &[(char, &str)] = &[
    ('!', "BANG"),
    ('"', "QUOTE"),
    ('#', "HASH"),
    ('$', "DOLLAR"),
    ('%', "PERCENT"),
    ('&', "AMP"),
    ('\'', "APOSTROPHE"),
    ('(', "LEFT_PAREN"),
    (')', "RIGHT_PAREN"),
    ('*', "STAR"),
    ('+', "PLUS"),
    (',', "COMMA"),
    ('-', "MINUS"),
    ('.', "DOT"),
    ('/', "SLASH"),
    (':', "COLON"),
    (';', "SEMICOLON"),
    ('<', "LESS"),
    ('=', "EQUAL"),
    ('>', "GREATER"),
    ('?', "QUESTION"),
    ('@', "AT"),
    ('[', "LEFT_BRACKET"),
    ('\\', "BACKSLASH"),
    (']', "RIGHT_BRACKET"),
    ('^', "CARET"),
    ('`', "BACKTICK"),
    ('{', "LEFT_BRACE"),
    ('|', "PIPE"),
    ('}', "RIGHT_BRACE"),
    ('~', "TILDE"),
    (' ', "SPACE"),
];

/// A constant name for a token type: `+` → `PLUS`, `**` → `STAR_STAR`,
/// `!ws` → `BANG_WS`, `int` → `INT`.
pub fn const_name(token_type: &str) -> String {
    let parts: Vec<String> = WORD_RE
        .find_iter(token_type)
        .map(|m| {
            let s = m.as_str();
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if !(c.is_ascii_alphanumeric() || c == '_') => {
                    match SYM_NAMES.iter().find(|(sym, _)| *sym == c) {
                        Some((_, name)) => name.to_string(),
                        None => format!("U{:04X}", c as u32),
                    }
                }
                _ => s.to_ascii_uppercase(),
            }
        })
        .collect();
    let name = parts.join("_");
    match name.chars().next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => name,
        _ => format!("T_{}", name),
    }
}

/// Renders `tables` as Rust source.
pub fn emit_rust(tables: &Tables) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_rust(&mut out, tables)?;
    Ok(out)
}

fn write_rust<W: Write>(out: &mut W, tables: &Tables) -> fmt::Result {
    let n_lexer_states = tables.lexer.state_count();
    let n_parser_states = tables.state_count();
    let n_prods = tables.productions.len();

    writeln!(out, "/*")?;
    writeln!(out, "Produced by parser generator LRKIT")?;
    for (key, value) in &tables.meta {
        writeln!(out, "{}: {}", key, comment_safe(value))?;
    }
    writeln!(out)?;
    for (i, p) in tables.productions.iter().enumerate() {
        writeln!(out, "P,{},{}", i, comment_safe(&p.to_string()))?;
    }
    writeln!(out, "*/\n")?;

    writeln!(out, "#[allow(unused_imports)]")?;
    writeln!(
        out,
        "use lrkit::{{Action, Ast, AstMode, HintView, ParentView, ParseError, Parser, ProductionView, RangeTransition, StaticLexerData, StaticParserData, TableLexer}};\n"
    )?;

    writeln!(out, "pub const START_SYMBOL: &str = {:?};", tables.start_symbol)?;
    writeln!(out, "pub const N_LEXER_STATES: usize = {};", n_lexer_states)?;
    writeln!(out, "pub const N_PARSER_STATES: usize = {};", n_parser_states)?;
    writeln!(out, "pub const N_PRODUCTIONS: usize = {};", n_prods)?;
    writeln!(out)?;

    writeln!(
        out,
        "pub static LEXER_TRANSITIONS: [&[RangeTransition]; N_LEXER_STATES] = ["
    )?;
    for state in 0..n_lexer_states {
        match tables.lexer.transitions.get(&state) {
            Some(ranges) if !ranges.is_empty() => {
                writeln!(out, "    /* {} */ &[", state)?;
                for r in ranges {
                    writeln!(
                        out,
                        "        RangeTransition::new({}, {}, {}), // {}",
                        r.from,
                        r.to,
                        r.next,
                        range_comment(r)
                    )?;
                }
                writeln!(out, "    ],")?;
            }
            _ => writeln!(out, "    /* {} */ &[],", state)?,
        }
    }
    writeln!(out, "];\n")?;

    writeln!(
        out,
        "pub static LEXER_ACCEPTS: [Option<&str>; N_LEXER_STATES] = ["
    )?;
    for state in 0..n_lexer_states {
        match tables.lexer.actions.get(&state) {
            Some(t) => writeln!(out, "    /* {} */ Some({:?}),", state, t)?,
            None => writeln!(out, "    /* {} */ None,", state)?,
        }
    }
    writeln!(out, "];\n")?;

    writeln!(
        out,
        "pub static PARSER_ACTIONS: [&[(&str, Action)]; N_PARSER_STATES] = ["
    )?;
    for state in 0..n_parser_states {
        match tables.actions.get(&state) {
            Some(row) if !row.is_empty() => {
                writeln!(out, "    /* {} */ &[", state)?;
                for (terminal, action) in row {
                    writeln!(out, "        ({:?}, {}),", terminal, action_expr(action))?;
                }
                writeln!(out, "    ],")?;
            }
            _ => writeln!(out, "    /* {} */ &[],", state)?,
        }
    }
    writeln!(out, "];\n")?;

    writeln!(
        out,
        "pub static PARSER_GOTOS: [&[(&str, usize)]; N_PARSER_STATES] = ["
    )?;
    for state in 0..n_parser_states {
        match tables.gotos.get(&state) {
            Some(row) if !row.is_empty() => {
                let cells: Vec<String> = row
                    .iter()
                    .map(|(n, target)| format!("({:?}, {})", n, target))
                    .collect();
                writeln!(out, "    /* {} */ &[{}],", state, cells.join(", "))?;
            }
            _ => writeln!(out, "    /* {} */ &[],", state)?,
        }
    }
    writeln!(out, "];\n")?;

    writeln!(
        out,
        "pub static PRODUCTIONS: [ProductionView<'static>; N_PRODUCTIONS] = ["
    )?;
    for (i, p) in tables.productions.iter().enumerate() {
        writeln!(out, "    // {}: {}", i, comment_safe(&p.to_string()))?;
        writeln!(out, "    {},", production_expr(p))?;
    }
    writeln!(out, "];\n")?;

    writeln!(
        out,
        "pub static LEXER_DATA: StaticLexerData = StaticLexerData {{\n    start_state: {},\n    transitions: &LEXER_TRANSITIONS,\n    accepts: &LEXER_ACCEPTS,\n}};\n",
        tables.lexer.start_state
    )?;
    writeln!(
        out,
        "pub static PARSER_DATA: StaticParserData = StaticParserData {{\n    actions: &PARSER_ACTIONS,\n    gotos: &PARSER_GOTOS,\n    productions: &PRODUCTIONS,\n}};\n"
    )?;

    write_token_types(out, tables)?;

    writeln!(
        out,
        "/// A lexer over `input`.\npub fn lexer(input: &str) -> TableLexer<&'static StaticLexerData> {{\n    TableLexer::new(&LEXER_DATA, input)\n}}\n"
    )?;
    writeln!(
        out,
        "/// Parses `input` with hints applied.\npub fn parse(input: &str) -> Result<Ast, ParseError> {{\n    parse_with_mode(input, AstMode::Hinted)\n}}\n"
    )?;
    writeln!(
        out,
        "pub fn parse_with_mode(input: &str, mode: AstMode) -> Result<Ast, ParseError> {{\n    Parser::new(lexer(input), &PARSER_DATA).with_mode(mode).parse()\n}}"
    )?;
    Ok(())
}

fn write_token_types<W: Write>(out: &mut W, tables: &Tables) -> fmt::Result {
    writeln!(out, "/// Token type names.")?;
    writeln!(out, "pub mod token_types {{")?;
    let mut used = BTreeSet::new();
    let all = tables
        .lexer
        .rules
        .iter()
        .map(String::as_str)
        .chain([EOF, ERROR]);
    for token_type in all {
        let base = const_name(token_type);
        let mut name = base.clone();
        let mut n = 1;
        while !used.insert(name.clone()) {
            name = format!("{}_{}", base, n);
            n += 1;
        }
        writeln!(out, "    pub const {}: &str = {:?};", name, token_type)?;
    }
    writeln!(out, "}}\n")
}

/// Escapes control characters and comment delimiters.
fn comment_safe(s: &str) -> String {
    let mut out = String::new();
    for c in s.chars() {
        if c.is_control() {
            out.extend(c.escape_default());
        } else {
            out.push(c);
        }
    }
    out.replace("*/", "* /").replace("/*", "/ *")
}

fn range_comment(r: &RangeTransition) -> String {
    let show = |c: u32| match char::from_u32(c) {
        Some(ch) if !ch.is_control() && !ch.is_whitespace() => format!("{:?}", ch),
        _ => format!("U+{:04X}", c),
    };
    if r.from == r.to {
        show(r.from)
    } else {
        format!("{}..={}", show(r.from), show(r.to))
    }
}

fn action_expr(action: &Action) -> String {
    match action {
        Action::Shift { target } => format!("Action::Shift {{ target: {} }}", target),
        Action::Reduce { target } => format!("Action::Reduce {{ target: {} }}", target),
        Action::Accept => "Action::Accept".to_string(),
    }
}

fn parent_expr(parent: ParentView<'_>) -> String {
    match parent {
        ParentView::Index(i) => format!("ParentView::Index({})", i),
        ParentView::Literal(s) => format!("ParentView::Literal({:?})", s),
    }
}

fn list_expr(list: &[usize]) -> String {
    let items: Vec<String> = list.iter().map(usize::to_string).collect();
    format!("&[{}]", items.join(", "))
}

fn type_expr(node_type: Option<&str>) -> String {
    match node_type {
        Some(t) => format!("Some({:?})", t),
        None => "None".to_string(),
    }
}

fn hint_expr(hint: HintView<'_>) -> String {
    match hint {
        HintView::Passthrough { index } => format!("HintView::Passthrough {{ index: {} }}", index),
        HintView::ParentPick {
            parent,
            children,
            node_type,
        } => format!(
            "HintView::ParentPick {{ parent: {}, children: {}, node_type: {} }}",
            parent,
            list_expr(children),
            type_expr(node_type)
        ),
        HintView::ParentLiteral {
            literal,
            children,
            node_type,
        } => format!(
            "HintView::ParentLiteral {{ literal: {:?}, children: {}, node_type: {:?} }}",
            literal,
            list_expr(children),
            node_type
        ),
        HintView::WithAppendedChildren {
            parent,
            children,
            node_type,
        } => format!(
            "HintView::WithAppendedChildren {{ parent: {}, children: {}, node_type: {} }}",
            parent_expr(parent),
            list_expr(children),
            type_expr(node_type)
        ),
        HintView::WithPrependedChildren {
            parent,
            children,
            node_type,
        } => format!(
            "HintView::WithPrependedChildren {{ parent: {}, children: {}, node_type: {} }}",
            parent_expr(parent),
            list_expr(children),
            type_expr(node_type)
        ),
        HintView::WithAdoptedGrandchildren {
            parent,
            children,
            adopt,
            node_type,
        } => format!(
            "HintView::WithAdoptedGrandchildren {{ parent: {}, children: {}, adopt: {}, node_type: {} }}",
            parent_expr(parent),
            list_expr(children),
            list_expr(adopt),
            type_expr(node_type)
        ),
    }
}

fn production_expr(p: &Production) -> String {
    let hint = match &p.hint {
        Some(h) => format!("Some({})", hint_expr(h.view())),
        None => "None".to_string(),
    };
    format!(
        "ProductionView {{ lhs: {:?}, rhs_count: {}, hint: {} }}",
        p.lhs, p.rhs_count, hint
    )
}
