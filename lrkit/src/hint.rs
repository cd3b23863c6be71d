//! AST-shaping hints.
//!
//! A hint rewrites how a reduce builds its node from the right-hand-side slots.
//! [`Hint`] is the owned, serializable form stored in the table IR;
//! [`HintView`] is the borrowed form the parser driver works with, so that
//! emitted `'static` tables can carry hints without allocation.
//!
//! | mode | result |
//! |---|---|
//! | `passthrough` | the RHS node at `index` unchanged |
//! | `parent_pick` | token of slot `parent`, type = override or lhs, listed children |
//! | `parent_literal` | no token, type = `type` (defaults to the literal), listed children |
//! | `with_appended_children` | parent node with listed slots appended to its children |
//! | `with_prepended_children` | parent node with listed slots prepended to its children |
//! | `with_adopted_grandchildren` | listed children, with `adopt` slots replaced by their own children |

use crate::{AstNode, ParseError, Token};
use serde::{Deserialize, Serialize};
use smartstring::alias::String;

/// Parent of an appended, prepended, or adopted node: an RHS slot or a literal label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Parent {
    Index(usize),
    Literal(std::string::String),
}

/// A per-production AST construction directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Hint {
    Passthrough {
        index: usize,
    },
    ParentPick {
        parent: usize,
        children: Vec<usize>,
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        node_type: Option<std::string::String>,
    },
    ParentLiteral {
        literal: std::string::String,
        children: Vec<usize>,
        #[serde(rename = "type")]
        node_type: std::string::String,
    },
    WithAppendedChildren {
        parent: Parent,
        children: Vec<usize>,
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        node_type: Option<std::string::String>,
    },
    WithPrependedChildren {
        parent: Parent,
        children: Vec<usize>,
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        node_type: Option<std::string::String>,
    },
    WithAdoptedGrandchildren {
        parent: Parent,
        children: Vec<usize>,
        adopt: Vec<usize>,
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        node_type: Option<std::string::String>,
    },
}

impl Hint {
    pub fn view(&self) -> HintView<'_> {
        match self {
            Hint::Passthrough { index } => HintView::Passthrough { index: *index },
            Hint::ParentPick {
                parent,
                children,
                node_type,
            } => HintView::ParentPick {
                parent: *parent,
                children,
                node_type: node_type.as_deref(),
            },
            Hint::ParentLiteral {
                literal,
                children,
                node_type,
            } => HintView::ParentLiteral {
                literal,
                children,
                node_type,
            },
            Hint::WithAppendedChildren {
                parent,
                children,
                node_type,
            } => HintView::WithAppendedChildren {
                parent: parent.view(),
                children,
                node_type: node_type.as_deref(),
            },
            Hint::WithPrependedChildren {
                parent,
                children,
                node_type,
            } => HintView::WithPrependedChildren {
                parent: parent.view(),
                children,
                node_type: node_type.as_deref(),
            },
            Hint::WithAdoptedGrandchildren {
                parent,
                children,
                adopt,
                node_type,
            } => HintView::WithAdoptedGrandchildren {
                parent: parent.view(),
                children,
                adopt,
                node_type: node_type.as_deref(),
            },
        }
    }
}

impl Parent {
    pub fn view(&self) -> ParentView<'_> {
        match self {
            Parent::Index(i) => ParentView::Index(*i),
            Parent::Literal(s) => ParentView::Literal(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentView<'a> {
    Index(usize),
    Literal(&'a str),
}

/// Borrowed form of [`Hint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintView<'a> {
    Passthrough {
        index: usize,
    },
    ParentPick {
        parent: usize,
        children: &'a [usize],
        node_type: Option<&'a str>,
    },
    ParentLiteral {
        literal: &'a str,
        children: &'a [usize],
        node_type: &'a str,
    },
    WithAppendedChildren {
        parent: ParentView<'a>,
        children: &'a [usize],
        node_type: Option<&'a str>,
    },
    WithPrependedChildren {
        parent: ParentView<'a>,
        children: &'a [usize],
        node_type: Option<&'a str>,
    },
    WithAdoptedGrandchildren {
        parent: ParentView<'a>,
        children: &'a [usize],
        adopt: &'a [usize],
        node_type: Option<&'a str>,
    },
}

/// The RHS nodes of one reduce; each slot may be consumed once.
struct Slots {
    production: usize,
    nodes: Vec<Option<AstNode>>,
}

impl Slots {
    fn bad(&self, index: usize) -> ParseError {
        ParseError::BadHint {
            production: self.production,
            index,
        }
    }

    fn peek(&self, index: usize) -> Result<&AstNode, ParseError> {
        self.nodes
            .get(index)
            .and_then(Option::as_ref)
            .ok_or_else(|| self.bad(index))
    }

    fn take(&mut self, index: usize) -> Result<AstNode, ParseError> {
        match self.nodes.get_mut(index).and_then(Option::take) {
            Some(node) => Ok(node),
            None => Err(self.bad(index)),
        }
    }

    fn take_all(&mut self, indices: &[usize]) -> Result<Vec<AstNode>, ParseError> {
        indices.iter().map(|&i| self.take(i)).collect()
    }

    /// Token and type of the parent; a literal parent has no token.
    fn parent_head(&self, parent: ParentView<'_>) -> Result<(Option<Token>, String), ParseError> {
        match parent {
            ParentView::Index(i) => {
                let node = self.peek(i)?;
                Ok((node.token.clone(), node.node_type.clone()))
            }
            ParentView::Literal(lit) => Ok((None, lit.into())),
        }
    }

    /// Takes the parent node itself, or an empty node for a literal parent.
    fn take_parent(&mut self, parent: ParentView<'_>) -> Result<AstNode, ParseError> {
        match parent {
            ParentView::Index(i) => self.take(i),
            ParentView::Literal(lit) => Ok(AstNode::branch(lit, Vec::new())),
        }
    }
}

impl HintView<'_> {
    /// Builds the node for a reduce of production `production` with lhs `lhs`.
    pub fn apply(
        &self,
        lhs: &str,
        production: usize,
        rhs: Vec<AstNode>,
    ) -> Result<AstNode, ParseError> {
        let mut slots = Slots {
            production,
            nodes: rhs.into_iter().map(Some).collect(),
        };
        match *self {
            HintView::Passthrough { index } => slots.take(index),
            HintView::ParentPick {
                parent,
                children,
                node_type,
            } => {
                let token = slots.peek(parent)?.token.clone();
                Ok(AstNode {
                    token,
                    node_type: node_type.unwrap_or(lhs).into(),
                    children: slots.take_all(children)?,
                })
            }
            HintView::ParentLiteral {
                children,
                node_type,
                ..
            } => Ok(AstNode::branch(node_type, slots.take_all(children)?)),
            HintView::WithAppendedChildren {
                parent,
                children,
                node_type,
            } => {
                let mut node = slots.take_parent(parent)?;
                node.children.extend(slots.take_all(children)?);
                if let Some(t) = node_type {
                    node.node_type = t.into();
                }
                Ok(node)
            }
            HintView::WithPrependedChildren {
                parent,
                children,
                node_type,
            } => {
                let mut node = slots.take_parent(parent)?;
                let mut front = slots.take_all(children)?;
                front.append(&mut node.children);
                node.children = front;
                if let Some(t) = node_type {
                    node.node_type = t.into();
                }
                Ok(node)
            }
            HintView::WithAdoptedGrandchildren {
                parent,
                children,
                adopt,
                node_type,
            } => {
                let (token, parent_type) = slots.parent_head(parent)?;
                let mut kids = Vec::new();
                for &c in children {
                    let node = slots.take(c)?;
                    if adopt.contains(&c) {
                        kids.extend(node.children);
                    } else {
                        kids.push(node);
                    }
                }
                for &a in adopt.iter().filter(|a| !children.contains(a)) {
                    kids.extend(slots.take(a)?.children);
                }
                Ok(AstNode {
                    token,
                    node_type: node_type.map(String::from).unwrap_or(parent_type),
                    children: kids,
                })
            }
        }
    }

    /// Every RHS index the hint refers to, for bounds checking.
    pub fn indices(&self) -> Vec<usize> {
        let parent_index = |p: ParentView<'_>| match p {
            ParentView::Index(i) => Some(i),
            ParentView::Literal(_) => None,
        };
        match *self {
            HintView::Passthrough { index } => vec![index],
            HintView::ParentPick {
                parent, children, ..
            } => std::iter::once(parent).chain(children.iter().copied()).collect(),
            HintView::ParentLiteral { children, .. } => children.to_vec(),
            HintView::WithAppendedChildren {
                parent, children, ..
            }
            | HintView::WithPrependedChildren {
                parent, children, ..
            } => parent_index(parent)
                .into_iter()
                .chain(children.iter().copied())
                .collect(),
            HintView::WithAdoptedGrandchildren {
                parent,
                children,
                adopt,
                ..
            } => parent_index(parent)
                .into_iter()
                .chain(children.iter().copied())
                .chain(adopt.iter().copied())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Location;

    fn leaf(ty: &str, lexeme: &str) -> AstNode {
        AstNode::leaf(Token::new(ty, lexeme, Location::default()))
    }

    #[test]
    fn parent_pick_takes_token_of_operator() {
        let rhs = vec![leaf("int", "1"), leaf("+", "+"), leaf("int", "2")];
        let hint = HintView::ParentPick {
            parent: 1,
            children: &[0, 2],
            node_type: None,
        };
        let node = hint.apply("Sum", 3, rhs).unwrap();
        assert_eq!(node.node_type, "Sum");
        assert_eq!(node.compact(), "+(1, 2)");
    }

    #[test]
    fn passthrough_discards_siblings() {
        let rhs = vec![leaf("(", "("), leaf("int", "7"), leaf(")", ")")];
        let node = HintView::Passthrough { index: 1 }
            .apply("Atom", 0, rhs)
            .unwrap();
        assert_eq!(node.compact(), "7");
    }

    #[test]
    fn prepended_extends_parent_children() {
        let list = AstNode::branch("elements", vec![leaf("int", "2"), leaf("int", "3")]);
        let rhs = vec![leaf("int", "1"), leaf(",", ","), list];
        let hint = HintView::WithPrependedChildren {
            parent: ParentView::Index(2),
            children: &[0],
            node_type: None,
        };
        let node = hint.apply("Elements", 0, rhs).unwrap();
        assert_eq!(node.compact(), "elements(1, 2, 3)");
    }

    #[test]
    fn adopted_grandchildren_with_type_override() {
        let list = AstNode::branch("elements", vec![leaf("int", "1"), leaf("null", "null")]);
        let rhs = vec![leaf("[", "["), list, leaf("]", "]")];
        let hint = HintView::WithAdoptedGrandchildren {
            parent: ParentView::Index(0),
            children: &[],
            adopt: &[1],
            node_type: Some("array"),
        };
        let node = hint.apply("Array", 0, rhs).unwrap();
        assert_eq!(node.node_type, "array");
        assert_eq!(node.token.as_ref().map(|t| t.lexeme.as_str()), Some("["));
        let types: Vec<&str> = node.children.iter().map(|c| c.node_type.as_str()).collect();
        assert_eq!(types, ["int", "null"]);
    }

    #[test]
    fn adopted_in_place_keeps_order() {
        let inner = AstNode::branch("pair", vec![leaf("a", "a"), leaf("b", "b")]);
        let rhs = vec![leaf("x", "x"), inner, leaf("y", "y")];
        let hint = HintView::WithAdoptedGrandchildren {
            parent: ParentView::Literal("group"),
            children: &[0, 1, 2],
            adopt: &[1],
            node_type: None,
        };
        let node = hint.apply("G", 0, rhs).unwrap();
        assert_eq!(node.compact(), "group(x, a, b, y)");
    }

    #[test]
    fn slot_used_twice_is_an_error() {
        let rhs = vec![leaf("int", "1"), leaf("int", "2")];
        let hint = HintView::WithAppendedChildren {
            parent: ParentView::Index(0),
            children: &[0],
            node_type: None,
        };
        assert_eq!(
            hint.apply("X", 5, rhs),
            Err(ParseError::BadHint {
                production: 5,
                index: 0
            })
        );
    }

    #[test]
    fn hint_json_shape() {
        let hint = Hint::WithAdoptedGrandchildren {
            parent: Parent::Index(0),
            children: vec![],
            adopt: vec![1],
            node_type: Some("array".into()),
        };
        let json = serde_json::to_string(&hint).unwrap();
        assert_eq!(
            json,
            r#"{"mode":"with_adopted_grandchildren","parent":0,"children":[],"adopt":[1],"type":"array"}"#
        );
        let back: Hint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hint);

        let lit: Hint =
            serde_json::from_str(r#"{"mode":"parent_literal","literal":"[]","children":[],"type":"array"}"#)
                .unwrap();
        assert_eq!(lit.view().indices(), Vec::<usize>::new());
    }
}
