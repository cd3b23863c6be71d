//! Command-line interface for the `lrkit` generator.
//!
//! Compiles grammars to the JSON table IR, renders tables as Rust, and
//! interprets tables directly for quick experiments with `lex` and `parse`.

#[cfg(feature = "cli")]
mod real {
    use anyhow::{Context, Result};
    use clap::{Parser, Subcommand};
    use lrkit::{AstMode, Lexer, Tables};
    use lrkit_gen::{GenOptions, emit_rust, generate, generate_tables_from_str};
    use std::io::Read;
    use std::path::{Path, PathBuf};

    #[derive(Parser)]
    #[command(about = "LR(1) lexer and parser generator")]
    struct Args {
        #[command(subcommand)]
        command: Command,
    }

    #[derive(Subcommand)]
    enum Command {
        /// Compile a grammar into JSON tables
        Tables {
            /// Path to the input grammar file
            #[arg(short = 'g', long)]
            grammar: PathBuf,

            /// Output file (stdout if omitted)
            #[arg(short = 'o', long)]
            output: Option<PathBuf>,

            /// Upper bound on LR(1) and lexer DFA states
            #[arg(long, default_value_t = 100_000)]
            max_states: usize,
        },

        /// Render JSON tables as Rust source
        Emit {
            /// Path to the JSON tables
            #[arg(short = 't', long)]
            tables: PathBuf,

            /// Output file (stdout if omitted)
            #[arg(short = 'o', long)]
            output: Option<PathBuf>,
        },

        /// Write `<name>.json`, `<name>.rs` and optionally `<name>.debug.txt`
        Generate {
            /// Path to the input grammar file
            #[arg(short = 'g', long)]
            grammar: PathBuf,

            /// Path to the output directory.
            #[arg(short = 'o', long)]
            output_dir: PathBuf,

            /// Prefix used to construct output file names
            #[arg(short = 'n', long)]
            name: String,

            /// Also write a dump of productions, FIRST sets and item sets
            #[arg(short = 'd', long)]
            debug: bool,
        },

        /// Print the token stream of an input
        Lex {
            /// Path to the JSON tables
            #[arg(short = 't', long)]
            tables: PathBuf,

            /// Input file (stdin if omitted)
            #[arg(short = 'i', long)]
            input: Option<PathBuf>,
        },

        /// Print the AST of an input
        Parse {
            /// Path to the JSON tables
            #[arg(short = 't', long)]
            tables: PathBuf,

            /// Input file (stdin if omitted)
            #[arg(short = 'i', long)]
            input: Option<PathBuf>,

            /// AST construction mode: hinted, condensed or full
            #[arg(long, default_value = "hinted")]
            mode: AstMode,
        },
    }

    fn read_input(path: Option<&Path>) -> Result<String> {
        match path {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display())),
            None => {
                let mut s = String::new();
                std::io::stdin()
                    .read_to_string(&mut s)
                    .context("failed to read stdin")?;
                Ok(s)
            }
        }
    }

    fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
        match path {
            Some(path) => std::fs::write(path, text)
                .with_context(|| format!("failed to write {}", path.display())),
            None => {
                print!("{}", text);
                Ok(())
            }
        }
    }

    fn load_tables(path: &Path) -> Result<Tables> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Tables::from_json(&json).with_context(|| format!("invalid tables in {}", path.display()))
    }

    pub fn main() -> Result<()> {
        env_logger::init();
        let args = Args::parse();
        match args.command {
            Command::Tables {
                grammar,
                output,
                max_states,
            } => {
                let source = read_input(Some(&grammar))?;
                let options = GenOptions {
                    max_states,
                    source_name: grammar
                        .file_name()
                        .map(|s| s.to_string_lossy().into_owned()),
                };
                let tables = generate_tables_from_str(&source, &options)
                    .with_context(|| format!("failed to compile {}", grammar.display()))?;
                write_output(output.as_deref(), &tables.to_json()?)
            }
            Command::Emit { tables, output } => {
                let tables = load_tables(&tables)?;
                write_output(output.as_deref(), &emit_rust(&tables)?)
            }
            Command::Generate {
                grammar,
                output_dir,
                name,
                debug,
            } => generate(grammar, output_dir, name, debug),
            Command::Lex { tables, input } => {
                let tables = load_tables(&tables)?;
                let input = read_input(input.as_deref())?;
                let mut lexer = tables.lexer(&input);
                loop {
                    let token = lexer.scan();
                    println!("{}", token);
                    if token.is_eof() || token.is_error() {
                        break;
                    }
                }
                let stats = lexer.stats();
                log::debug!(
                    "{} chars, {} tokens, {} ignored",
                    stats.chars,
                    stats.tokens,
                    stats.ignored
                );
                Ok(())
            }
            Command::Parse {
                tables,
                input,
                mode,
            } => {
                let tables = load_tables(&tables)?;
                let input = read_input(input.as_deref())?;
                let ast = tables.parse_str(&input, mode)?;
                print!("{}", ast);
                Ok(())
            }
        }
    }
}

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    real::main()
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("lrkit disabled (compiled without `cli` feature)");
}
