//! Command-line interface for `lrkit-calc`.
//!
//! Evaluates calculator programs from files or standard input, or prints the
//! AST the generated parser builds for them.

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use lrkit::AstMode;
use lrkit_calc::{Calc, pemdas};
use std::io::Read;
use std::path::PathBuf;

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Command
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluates a program and prints its value
    Eval {
        /// Input file with calculator statements (stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Prints the AST of a program
    Ast {
        /// Input file with calculator statements (stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// AST construction mode: hinted, condensed or full
        #[arg(long, default_value = "hinted")]
        mode: AstMode,
    },
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("can't open {:?}", path)),
        None => {
            let mut s = String::new();
            std::io::stdin().read_to_string(&mut s)?;
            Ok(s)
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Eval { input } => {
            let source = read_input(input.as_ref())?;
            let mut calc = Calc::new();
            println!("{}", calc.eval_str(&source)?);
            for (name, value) in calc.symtab().iter() {
                log::info!("{} = {}", name, value);
            }
        }
        Commands::Ast { input, mode } => {
            let source = read_input(input.as_ref())?;
            let ast = pemdas::parse_with_mode(&source, mode)?;
            print!("{}", ast);
        }
    }
    Ok(())
}
