use lrkit::Location;
use std::fmt;
use thiserror::Error;

/// Generator-time errors.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("syntax error at {location}: {message}")]
    Syntax { message: String, location: Location },

    #[error("rule {name:?} at {location} is already defined at {previous}")]
    DuplicateRule {
        name: String,
        location: Location,
        previous: Location,
    },

    #[error("undefined identifier {name:?} at {location}")]
    UndefinedIdentifier { name: String, location: Location },

    #[error("fragment {name:?} at {location} cannot be used outside lexer rules")]
    FragmentReference { name: String, location: Location },

    #[error("ignored token {name:?} at {location} never reaches the parser")]
    IgnoredReference { name: String, location: Location },

    #[error("literal {name:?} at {location} has the name of a {kind} rule")]
    LiteralCollision {
        name: String,
        kind: &'static str,
        location: Location,
    },

    #[error("lexer rule {rule:?} refers to parser rule {name:?} at {location}")]
    LexerRefersToParser {
        rule: String,
        name: String,
        location: Location,
    },

    #[error("lexer rule {name:?} is recursive (via {path})")]
    RecursiveLexerRule { name: String, path: String },

    #[error("bad literal {text} at {location}: {reason}")]
    BadLiteral {
        text: String,
        location: Location,
        reason: String,
    },

    #[error("lexer rule {name:?} matches the empty string")]
    EmptyMatch { name: String },

    #[error("bad range at {location}: {reason}")]
    BadRange { location: Location, reason: String },

    #[error("{name:?} at {location} is reserved")]
    ReservedName { name: String, location: Location },

    #[error("{what} at {location} is not allowed in parser rules")]
    LexerOnly { what: &'static str, location: Location },

    #[error("grammar has no parser rules")]
    NoParserRules,

    #[error("rule {name:?} does not derive any terminal string")]
    UnproductiveRule { name: String },

    #[error("invalid hint at {location}: {reason}")]
    Hint { location: Location, reason: String },

    #[error("{}", format_conflicts(.0))]
    Conflicts(Vec<Conflict>),

    #[error("too many {what} states (limit {limit})")]
    Capacity { what: &'static str, limit: usize },
}

/// One ACTION cell that would receive two different actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub state: usize,
    pub lookahead: String,
    pub existing: String,
    pub new: String,
    /// The items of the conflicting state, one per line.
    pub items: Vec<String>,
    /// Suggestions about the likely cause.
    pub notes: Vec<String>,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Action conflict")?;
        writeln!(f, "  State: {}", self.state)?;
        writeln!(f, "  Lookahead: {:?}", self.lookahead)?;
        writeln!(f, "  Existing action: {}", self.existing)?;
        writeln!(f, "  New action: {}", self.new)?;
        write!(f, "  Items in state:")?;
        for item in &self.items {
            write!(f, "\n    {}", item)?;
        }
        if !self.notes.is_empty() {
            write!(f, "\n  Hint:")?;
            for note in &self.notes {
                write!(f, "\n    - {}", note)?;
            }
        }
        Ok(())
    }
}

fn format_conflicts(conflicts: &[Conflict]) -> String {
    let mut s = format!("{} LR(1) conflict(s)", conflicts.len());
    for c in conflicts {
        s.push('\n');
        s.push_str(&c.to_string());
    }
    s
}
