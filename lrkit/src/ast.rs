//! Abstract syntax trees produced by the parser driver.
//!
//! Trees are strictly owned: each [`AstNode`] owns its children and the
//! [`Ast`] owns the root. Terminal leaves carry their [`Token`]; internal
//! nodes carry the lhs of the production that built them unless a hint said
//! otherwise.

use crate::Token;
use smartstring::alias::String;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstNode {
    pub token: Option<Token>,
    pub node_type: String,
    pub children: Vec<AstNode>,
}

impl AstNode {
    /// A terminal leaf; its type is the token type.
    pub fn leaf(token: Token) -> Self {
        Self {
            node_type: token.token_type.clone(),
            token: Some(token),
            children: Vec::new(),
        }
    }

    /// An internal node without a token.
    pub fn branch(node_type: &str, children: Vec<AstNode>) -> Self {
        Self {
            token: None,
            node_type: node_type.into(),
            children,
        }
    }

    /// The token lexeme if the node has a token, otherwise its type.
    pub fn label(&self) -> &str {
        match &self.token {
            Some(t) => &t.lexeme,
            None => &self.node_type,
        }
    }

    /// One-line rendering such as `+(1, *(2, 3))`.
    pub fn compact(&self) -> std::string::String {
        let mut out = std::string::String::new();
        self.write_compact(&mut out);
        out
    }

    fn write_compact(&self, out: &mut std::string::String) {
        out.push_str(self.label());
        if !self.children.is_empty() {
            out.push('(');
            for (i, child) in self.children.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                child.write_compact(out);
            }
            out.push(')');
        }
    }

    /// Every token in the tree, ordered by source offset.
    pub fn leaves(&self) -> Vec<&Token> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.extend(node.token.as_ref());
            stack.extend(node.children.iter().rev());
        }
        out.sort_by_key(|t| t.location.offset);
        out
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{:indent$}{}", "", self.node_type, indent = depth * 2)?;
        if let Some(t) = &self.token {
            write!(f, " {:?} @{}:{}", t.lexeme.as_str(), t.location.line, t.location.column)?;
        }
        writeln!(f)?;
        for child in &self.children {
            child.fmt_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

/// A complete parse result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ast {
    root: AstNode,
}

impl Ast {
    pub fn new(root: AstNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &AstNode {
        &self.root
    }

    pub fn into_root(self) -> AstNode {
        self.root
    }

    /// Same as [`AstNode::compact`] on the root.
    pub fn compact(&self) -> std::string::String {
        self.root.compact()
    }
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Location;

    fn leaf(ty: &str, lexeme: &str, offset: usize) -> AstNode {
        AstNode::leaf(Token::new(ty, lexeme, Location::new(1, offset + 1, offset)))
    }

    fn sample() -> AstNode {
        let mul = AstNode {
            token: Some(Token::new("*", "*", Location::new(1, 4, 3))),
            node_type: "Root".into(),
            children: vec![leaf("int", "2", 2), leaf("int", "3", 4)],
        };
        AstNode {
            token: Some(Token::new("+", "+", Location::new(1, 2, 1))),
            node_type: "Root".into(),
            children: vec![leaf("int", "1", 0), mul],
        }
    }

    #[test]
    fn compact_rendering() {
        assert_eq!(sample().compact(), "+(1, *(2, 3))");
        assert_eq!(AstNode::branch("Empty", vec![]).compact(), "Empty");
    }

    #[test]
    fn leaves_follow_source_order() {
        let tree = sample();
        let lexemes: Vec<&str> = tree.leaves().iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, ["1", "+", "2", "*", "3"]);
    }

    #[test]
    fn indented_display() {
        let text = Ast::new(sample()).to_string();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Root \"+\" @1:2"));
        assert_eq!(lines.next(), Some("  int \"1\" @1:1"));
        assert_eq!(lines.next(), Some("  Root \"*\" @1:4"));
    }
}
