//! The generator pipeline: grammar source → [`Tables`] → files.

use crate::classify;
use crate::emit::emit_rust;
use crate::grammar::{self, Grammar};
use crate::lexgen;
use crate::lr1::Lr1;
use crate::normalize::{self, Bnf};
use crate::GenError;
use anyhow::{Context, Result};
use lrkit::{Production, Tables};
use std::collections::BTreeMap;
use std::path::Path;

/// Generator knobs.
#[derive(Debug, Clone)]
pub struct GenOptions {
    /// Upper bound on LR(1) states, and separately on lexer DFA states.
    pub max_states: usize,
    /// Recorded as `meta.source` when set.
    pub source_name: Option<String>,
}

impl Default for GenOptions {
    fn default() -> Self {
        Self {
            max_states: 100_000,
            source_name: None,
        }
    }
}

fn productions(bnf: &Bnf) -> Vec<Production> {
    bnf.productions
        .iter()
        .map(|p| Production {
            lhs: p.lhs.clone(),
            rhs_count: p.rhs.len(),
            rhs: p.rhs.iter().map(|s| s.name().to_string()).collect(),
            hint: p.hint.clone(),
        })
        .collect()
}

fn build(grammar: &Grammar, options: &GenOptions) -> Result<(Tables, Lr1), GenError> {
    let classified = classify::classify(grammar)?;
    let bnf = normalize::normalize(&classified)?;
    let lexer = lexgen::build_lexer(&classified, &bnf.literals, options.max_states)?;
    let lr = Lr1::build(&bnf, options.max_states)?;
    let parse_tables = lr.tables(&bnf)?;

    let mut meta = BTreeMap::new();
    meta.insert("generator".to_string(), env!("CARGO_PKG_NAME").to_string());
    meta.insert("version".to_string(), env!("CARGO_PKG_VERSION").to_string());
    if let Some(source) = &options.source_name {
        meta.insert("source".to_string(), source.clone());
    }

    let tables = Tables {
        start_symbol: bnf.start.clone(),
        productions: productions(&bnf),
        actions: parse_tables.actions,
        gotos: parse_tables.gotos,
        lexer,
        meta,
    };
    log::debug!(
        "tables: {} parser states, {} lexer states, {} productions",
        tables.state_count(),
        tables.lexer.state_count(),
        tables.productions.len()
    );
    Ok((tables, lr))
}

/// Runs every phase on a parsed grammar.
pub fn generate_tables(grammar: &Grammar, options: &GenOptions) -> Result<Tables, GenError> {
    build(grammar, options).map(|(tables, _)| tables)
}

/// Parses `source` and runs every phase.
pub fn generate_tables_from_str(source: &str, options: &GenOptions) -> Result<Tables, GenError> {
    let grammar = grammar::parse(source)?;
    generate_tables(&grammar, options)
}

/// Generates tables and Rust code from a grammar file.
///
/// Writes `<name>.json` and `<name>.rs` into `out_dir`, plus
/// `<name>.debug.txt` with productions, FIRST sets and item sets when
/// `debug` is set. Suitable for `build.rs`.
pub fn generate<P: AsRef<Path>, Q: AsRef<Path>, N: AsRef<str>>(
    grammar_path: P,
    out_dir: Q,
    name: N,
    debug: bool,
) -> Result<()> {
    let grammar_path = grammar_path.as_ref();
    let out_dir = out_dir.as_ref();
    let name = name.as_ref();

    let source = std::fs::read_to_string(grammar_path)
        .with_context(|| format!("failed to read grammar {}", grammar_path.display()))?;
    let options = GenOptions {
        source_name: grammar_path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned()),
        ..Default::default()
    };
    let grammar = grammar::parse(&source)
        .with_context(|| format!("failed to parse {}", grammar_path.display()))?;
    let (tables, lr) = build(&grammar, &options)
        .with_context(|| format!("failed to generate tables for {}", grammar_path.display()))?;

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let json_path = out_dir.join(format!("{}.json", name));
    std::fs::write(&json_path, tables.to_json()?)
        .with_context(|| format!("failed to write {}", json_path.display()))?;
    log::debug!("wrote {}", json_path.display());

    let rs_path = out_dir.join(format!("{}.rs", name));
    let source = emit_rust(&tables).context("failed to render Rust tables")?;
    std::fs::write(&rs_path, source)
        .with_context(|| format!("failed to write {}", rs_path.display()))?;
    log::debug!("wrote {}", rs_path.display());

    if debug {
        let debug_path = out_dir.join(format!("{}.debug.txt", name));
        let mut out = Vec::new();
        lr.write_debug(&mut out)?;
        std::fs::write(&debug_path, out)
            .with_context(|| format!("failed to write {}", debug_path.display()))?;
        log::debug!("wrote {}", debug_path.display());
    }
    Ok(())
}
