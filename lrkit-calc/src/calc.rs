/// The lexer and parser tables generated from `pemdas.ebnf` by `build.rs`.
pub mod pemdas {
    include!(concat!(env!("OUT_DIR"), "/pemdas.rs"));
}

use crate::{CalcError, SymTab};
use lrkit::{AstMode, AstNode};

/// Evaluates calculator programs, keeping variables between calls.
#[derive(Debug, Default)]
pub struct Calc {
    symtab: SymTab,
}

impl Calc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn symtab(&self) -> &SymTab {
        &self.symtab
    }

    /// Parses `input` and returns the value of its last statement.
    ///
    /// ```rust
    /// # use lrkit_calc::Calc;
    /// let mut calc = Calc::new();
    /// assert_eq!(calc.eval_str("a = 1 + 2 * 3").unwrap(), 7);
    /// assert_eq!(calc.eval_str("a * 2; a - 10").unwrap(), -3);
    /// ```
    pub fn eval_str(&mut self, input: &str) -> Result<i64, CalcError> {
        let ast = pemdas::parse_with_mode(input, AstMode::Hinted)?;
        log::debug!("AST: {}", ast.compact());
        self.eval(ast.root())
    }

    pub fn eval(&mut self, node: &AstNode) -> Result<i64, CalcError> {
        match node.node_type.as_str() {
            "program" => {
                let mut last = 0;
                for stat in &node.children {
                    last = self.eval(stat)?;
                }
                Ok(last)
            }
            "assign" => {
                let [name, expr] = node.children.as_slice() else {
                    return Err(unexpected(node));
                };
                let value = self.eval(expr)?;
                self.symtab.assign(name.label(), value);
                Ok(value)
            }
            "neg" => {
                let [operand] = node.children.as_slice() else {
                    return Err(unexpected(node));
                };
                let v = self.eval(operand)?;
                v.checked_neg()
                    .ok_or_else(|| CalcError::Overflow(format!("-{}", v)))
            }
            pemdas::token_types::INT if node.children.is_empty() => {
                Ok(node.label().parse::<i64>()?)
            }
            pemdas::token_types::IDENT if node.children.is_empty() => {
                Ok(self.symtab.lookup(node.label())?)
            }
            _ => match (node.token.as_ref(), node.children.as_slice()) {
                (Some(op), [lhs, rhs]) => {
                    let a = self.eval(lhs)?;
                    let b = self.eval(rhs)?;
                    binary(op.lexeme.as_str(), a, b)
                }
                _ => Err(unexpected(node)),
            },
        }
    }
}

fn unexpected(node: &AstNode) -> CalcError {
    CalcError::UnexpectedNode(node.compact())
}

fn binary(op: &str, a: i64, b: i64) -> Result<i64, CalcError> {
    let overflow = || CalcError::Overflow(format!("{} {} {}", a, op, b));
    match op {
        "+" => a.checked_add(b).ok_or_else(overflow),
        "-" => a.checked_sub(b).ok_or_else(overflow),
        "*" => a.checked_mul(b).ok_or_else(overflow),
        "/" | "%" if b == 0 => Err(CalcError::DivisionByZero),
        "/" => a.checked_div(b).ok_or_else(overflow),
        "%" => a.checked_rem(b).ok_or_else(overflow),
        "**" => {
            if b < 0 {
                return Err(CalcError::NegativeExponent(b));
            }
            let exp = u32::try_from(b).map_err(|_| overflow())?;
            a.checked_pow(exp).ok_or_else(overflow)
        }
        other => Err(CalcError::UnexpectedNode(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn eval(input: &str) -> Result<i64, CalcError> {
        init_logger();
        Calc::new().eval_str(input)
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(eval("1+2*3").unwrap(), 7);
        assert_eq!(eval("(1+2)*3").unwrap(), 9);
        assert_eq!(eval("2**3**2").unwrap(), 512);
        assert_eq!(eval("10-4-3").unwrap(), 3);
        assert_eq!(eval("17 % 5 * 2").unwrap(), 4);
        assert_eq!(eval("-2**2").unwrap(), -4);
        assert_eq!(eval("- -3").unwrap(), 3);
    }

    #[test]
    fn variables_persist() {
        let mut calc = Calc::new();
        assert_eq!(calc.eval_str("x = 6; y = x * 7;").unwrap(), 42);
        assert_eq!(calc.eval_str("y - x # comment").unwrap(), 36);
        assert_eq!(calc.symtab().lookup("y").unwrap(), 42);
    }

    #[test]
    fn arithmetic_faults() {
        assert!(matches!(eval("1/0"), Err(CalcError::DivisionByZero)));
        assert!(matches!(eval("1%0"), Err(CalcError::DivisionByZero)));
        assert!(matches!(eval("2**(0-1)"), Err(CalcError::NegativeExponent(-1))));
        assert!(matches!(eval("2**64"), Err(CalcError::Overflow(_))));
        assert!(matches!(eval("nope + 1"), Err(CalcError::SymTab(_))));
    }

    #[test]
    fn parse_errors_surface() {
        assert!(matches!(eval("1 +"), Err(CalcError::Parse(_))));
        assert!(matches!(eval("2**-1"), Err(CalcError::Parse(_))));
        assert!(matches!(eval("1 $ 2"), Err(CalcError::Parse(_))));
    }

    #[test]
    fn token_type_constants() {
        assert_eq!(pemdas::token_types::PLUS, "+");
        assert_eq!(pemdas::token_types::STAR_STAR, "**");
        assert_eq!(pemdas::token_types::LEFT_PAREN, "(");
        assert_eq!(pemdas::START_SYMBOL, "Program");
    }
}
