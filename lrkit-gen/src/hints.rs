//! Resolution of surface hints into [`lrkit::Hint`]s.
//!
//! A surface hint is a small JSON-like object attached to an alternative:
//!
//! ```text
//! Sum   ::= Product '+' Sum   -> { "parent": 1, "children": [0, 2] }
//! Paren ::= '(' Sum ')'       -> { "passthrough": 1 }
//! Array ::= '[' Elements ']'  -> { "parent": 0, "with_adopted_grandchildren": [1], "type": "array" }
//! Elems ::= Value ',' Elems   -> { "parent": 2, "with_prepended_children": [0] }
//! Empty ::= '[' ']'           -> { "parent_literal": "[]", "children": [], "type": "array" }
//! ```
//!
//! The same hint is resolved once per production the alternative expands to,
//! and validated against that production's right-hand side.

use crate::GenError;
use crate::grammar::{HintSpec, HintValue};
use crate::literal;
use lrkit::{Hint, Location, Parent, ParentView};
use std::collections::BTreeMap;

const KEYS: &[&str] = &[
    "passthrough",
    "parent",
    "parent_literal",
    "children",
    "with_appended_children",
    "with_prepended_children",
    "with_adopted_grandchildren",
    "type",
];

struct Fields<'a> {
    location: Location,
    map: BTreeMap<String, &'a HintValue>,
}

impl<'a> Fields<'a> {
    fn error(&self, reason: impl Into<String>) -> GenError {
        GenError::Hint {
            location: self.location,
            reason: reason.into(),
        }
    }

    fn has(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    fn int(&self, key: &str) -> Result<Option<usize>, GenError> {
        match self.map.get(key) {
            None => Ok(None),
            Some(HintValue::Int(n)) => Ok(Some(*n)),
            Some(_) => Err(self.error(format!("{:?} must be an integer", key))),
        }
    }

    fn string(&self, key: &str) -> Result<Option<String>, GenError> {
        match self.map.get(key) {
            None => Ok(None),
            Some(HintValue::Str(lit)) => literal::unquote(lit).map(Some),
            Some(_) => Err(self.error(format!("{:?} must be a string", key))),
        }
    }

    fn list(&self, key: &str) -> Result<Option<Vec<usize>>, GenError> {
        match self.map.get(key) {
            None => Ok(None),
            Some(HintValue::List(v)) => Ok(Some(v.clone())),
            Some(_) => Err(self.error(format!("{:?} must be an array of integers", key))),
        }
    }

    fn parent(&self) -> Result<Parent, GenError> {
        match (self.int("parent")?, self.string("parent_literal")?) {
            (Some(i), None) => Ok(Parent::Index(i)),
            (None, Some(lit)) => Ok(Parent::Literal(lit)),
            (Some(_), Some(_)) => Err(self.error("both \"parent\" and \"parent_literal\" given")),
            (None, None) => Err(self.error("missing \"parent\" or \"parent_literal\"")),
        }
    }
}

/// Converts the surface form of a hint into a [`Hint`], without bounds checks.
pub fn resolve(spec: &HintSpec) -> Result<Hint, GenError> {
    let mut fields = Fields {
        location: spec.location,
        map: BTreeMap::new(),
    };
    for (key, value) in &spec.fields {
        let mut name = literal::unquote(key)?;
        if name == "pass-through" {
            name = "passthrough".into();
        }
        if !KEYS.contains(&name.as_str()) {
            return Err(fields.error(format!("unknown key {:?}", name)));
        }
        if fields.map.insert(name.clone(), value).is_some() {
            return Err(fields.error(format!("duplicate key {:?}", name)));
        }
    }

    let node_type = fields.string("type")?;
    let combinators: Vec<&str> = [
        "with_appended_children",
        "with_prepended_children",
        "with_adopted_grandchildren",
    ]
    .into_iter()
    .filter(|k| fields.has(k))
    .collect();
    if combinators.len() > 1 {
        return Err(fields.error(format!("conflicting keys {}", combinators.join(", "))));
    }

    if let Some(index) = fields.int("passthrough")? {
        if fields.map.len() > 1 {
            return Err(fields.error("\"passthrough\" cannot be combined with other keys"));
        }
        return Ok(Hint::Passthrough { index });
    }

    match combinators.first().copied() {
        Some(key @ ("with_appended_children" | "with_prepended_children")) => {
            if fields.has("children") {
                return Err(fields.error(format!("\"children\" cannot be combined with {:?}", key)));
            }
            let parent = fields.parent()?;
            let children = fields.list(key)?.unwrap_or_default();
            Ok(if key == "with_appended_children" {
                Hint::WithAppendedChildren {
                    parent,
                    children,
                    node_type,
                }
            } else {
                Hint::WithPrependedChildren {
                    parent,
                    children,
                    node_type,
                }
            })
        }
        Some(key) => Ok(Hint::WithAdoptedGrandchildren {
            parent: fields.parent()?,
            children: fields.list("children")?.unwrap_or_default(),
            adopt: fields.list(key)?.unwrap_or_default(),
            node_type,
        }),
        None => match fields.parent()? {
            Parent::Index(parent) => Ok(Hint::ParentPick {
                parent,
                children: fields
                    .list("children")?
                    .ok_or_else(|| fields.error("missing \"children\""))?,
                node_type,
            }),
            Parent::Literal(literal) => Ok(Hint::ParentLiteral {
                children: fields.list("children")?.unwrap_or_default(),
                node_type: node_type.unwrap_or_else(|| literal.clone()),
                literal,
            }),
        },
    }
}

/// Checks that every index of `hint` addresses one of `rhs_count` slots.
pub fn validate(hint: &Hint, rhs_count: usize) -> Result<(), String> {
    let view = hint.view();
    if let Some(i) = view.indices().into_iter().find(|&i| i >= rhs_count) {
        return Err(format!(
            "index {} is out of bounds for {} right-hand-side symbol(s)",
            i, rhs_count
        ));
    }

    let no_duplicates = |name: &str, list: &[usize]| -> Result<(), String> {
        for (k, i) in list.iter().enumerate() {
            if list[..k].contains(i) {
                return Err(format!("index {} appears twice in {:?}", i, name));
            }
        }
        Ok(())
    };
    let no_parent = |name: &str, parent: ParentView<'_>, list: &[usize]| -> Result<(), String> {
        match parent {
            ParentView::Index(p) if list.contains(&p) => {
                Err(format!("parent index {} cannot appear in {:?}", p, name))
            }
            _ => Ok(()),
        }
    };

    match hint {
        Hint::Passthrough { .. } => Ok(()),
        Hint::ParentPick { children, .. } | Hint::ParentLiteral { children, .. } => {
            no_duplicates("children", children)
        }
        Hint::WithAppendedChildren { parent, children, .. } => {
            no_duplicates("with_appended_children", children)?;
            no_parent("with_appended_children", parent.view(), children)
        }
        Hint::WithPrependedChildren { parent, children, .. } => {
            no_duplicates("with_prepended_children", children)?;
            no_parent("with_prepended_children", parent.view(), children)
        }
        Hint::WithAdoptedGrandchildren {
            parent,
            children,
            adopt,
            ..
        } => {
            no_duplicates("children", children)?;
            no_duplicates("with_adopted_grandchildren", adopt)?;
            no_parent("with_adopted_grandchildren", parent.view(), adopt)
        }
    }
}
