//! Unquoting of grammar literals.

use crate::GenError;
use crate::grammar::Literal;

/// Returns the text of a quoted literal with escapes resolved.
pub fn unquote(lit: &Literal) -> Result<String, GenError> {
    let bad = |reason: String| GenError::BadLiteral {
        text: lit.text.clone(),
        location: lit.location,
        reason,
    };

    let mut chars = lit.text.chars();
    let quote = match chars.next() {
        Some(q @ ('\'' | '"')) => q,
        _ => return Err(bad("expected opening quote".into())),
    };
    if lit.text.len() < 2 || !lit.text.ends_with(quote) {
        return Err(bad("unterminated literal".into()));
    }
    let body = &lit.text[1..lit.text.len() - 1];

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = match chars.next() {
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('0') => '\0',
            Some('\\') => '\\',
            Some('\'') => '\'',
            Some('"') => '"',
            Some('u') => {
                if chars.next() != Some('{') {
                    return Err(bad("expected `{` after \\u".into()));
                }
                let mut hex = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(h) if h.is_ascii_hexdigit() && hex.len() < 6 => hex.push(h),
                        _ => return Err(bad("malformed \\u{...} escape".into())),
                    }
                }
                u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| bad(format!("invalid code point \\u{{{}}}", hex)))?
            }
            Some(other) => return Err(bad(format!("unknown escape \\{}", other))),
            None => return Err(bad("dangling backslash".into())),
        };
        out.push(escaped);
    }
    Ok(out)
}

/// Returns the single code point of a range bound.
pub fn single_char(lit: &Literal) -> Result<char, GenError> {
    let text = unquote(lit)?;
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(GenError::BadRange {
            location: lit.location,
            reason: format!("bound {} is not a single code point", lit.text),
        }),
    }
}
