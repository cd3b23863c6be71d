use super::lexer::Token;
use super::{Expr, Grammar, HintSpec, HintValue, Ident, Literal, Rule};
use chumsky::prelude::*;

type Extra<'a> = extra::Err<Rich<'a, Token>>;

pub fn parser<'a>() -> impl Parser<'a, &'a [Token], Grammar, Extra<'a>> {
    let literal = select! {
        Token::Literal(text, location) => Literal { text, location },
    }
    .labelled("literal");

    let int = select! { Token::Int(n) => n }.labelled("integer");

    let int_list = int
        .separated_by(just(Token::Comma))
        .allow_trailing()
        .collect::<Vec<_>>()
        .delimited_by(just(Token::LBrack), just(Token::RBrack));

    let hint_value = choice((
        int.map(HintValue::Int),
        literal.clone().map(HintValue::Str),
        int_list.map(HintValue::List),
    ));

    let hint_fields = literal
        .clone()
        .then_ignore(just(Token::Colon))
        .then(hint_value)
        .separated_by(just(Token::Comma))
        .allow_trailing()
        .collect::<Vec<_>>()
        .delimited_by(just(Token::LBrace), just(Token::RBrace));

    let hint = select! { Token::Arrow(location) => location }
        .then(hint_fields)
        .map(|(location, fields)| HintSpec { fields, location })
        .labelled("hint");

    let expr = recursive(|expr| {
        let ident = select! {
            Token::Ident(name, location) => Expr::Identifier(Ident { name, location }),
        }
        .labelled("identifier");

        let literal_or_range = literal
            .clone()
            .then(just(Token::Dash).ignore_then(literal.clone()).or_not())
            .map(|(from, to)| match to {
                Some(to) => Expr::Range(from, to),
                None => Expr::Literal(from),
            });

        let wildcard = select! { Token::Dot(location) => Expr::Wildcard(location) };

        let group = expr
            .clone()
            .delimited_by(just(Token::LParen), just(Token::RParen));

        let optional = expr
            .clone()
            .delimited_by(just(Token::LBrack), just(Token::RBrack))
            .map(|e| Expr::Optional(Box::new(e)));

        let repeat = expr
            .delimited_by(just(Token::LBrace), just(Token::RBrace))
            .map(|e| Expr::Repeat(Box::new(e)));

        let term = choice((ident, literal_or_range, wildcard, group, optional, repeat));

        let sequence = term
            .repeated()
            .at_least(1)
            .collect::<Vec<_>>()
            .map(|mut terms| {
                if terms.len() == 1 {
                    terms.remove(0)
                } else {
                    Expr::Sequence(terms)
                }
            })
            .then(hint.or_not())
            .map(|(e, hint)| match hint {
                Some(hint) => Expr::Hinted(Box::new(e), hint),
                None => e,
            });

        sequence
            .separated_by(just(Token::Pipe))
            .at_least(1)
            .collect::<Vec<_>>()
            .map(|mut alts| {
                if alts.len() == 1 {
                    alts.remove(0)
                } else {
                    Expr::Alternates(alts)
                }
            })
    });

    let rule = select! {
        Token::RuleName(name, location) => Ident { name, location },
    }
    .labelled("rule name")
    .then_ignore(just(Token::Assign))
    .then(expr)
    .then_ignore(just(Token::Semi).or_not())
    .map(|(name, body)| Rule { name, body });

    rule.repeated()
        .collect::<Vec<_>>()
        .then_ignore(end())
        .map(|rules| Grammar { rules })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lrkit::Location;

    fn loc() -> Location {
        Location::default()
    }

    fn ident(name: &str) -> Token {
        Token::Ident(name.into(), loc())
    }

    fn lit(text: &str) -> Token {
        Token::Literal(text.into(), loc())
    }

    #[test]
    fn single_rule() {
        let tokens = vec![
            Token::RuleName("Root".into(), loc()),
            Token::Assign,
            ident("int"),
            lit("'+'"),
            ident("Root"),
            Token::Semi,
        ];
        let g = parser().parse(&tokens).unwrap();
        assert_eq!(g.rules.len(), 1);
        let Expr::Sequence(terms) = &g.rules[0].body else {
            panic!("expected a sequence");
        };
        assert_eq!(terms.len(), 3);
        assert!(matches!(&terms[1], Expr::Literal(l) if l.text == "'+'"));
    }

    #[test]
    fn alternates_optional_repeat_and_range() {
        let tokens = vec![
            Token::RuleName("num".into(), loc()),
            Token::Assign,
            Token::LBrack,
            lit("'-'"),
            Token::RBrack,
            lit("'0'"),
            Token::Dash,
            lit("'9'"),
            Token::LBrace,
            Token::Dot(loc()),
            Token::RBrace,
            Token::Pipe,
            ident("x"),
        ];
        let g = parser().parse(&tokens).unwrap();
        let Expr::Alternates(alts) = &g.rules[0].body else {
            panic!("expected alternates");
        };
        let Expr::Sequence(terms) = &alts[0] else {
            panic!("expected a sequence");
        };
        assert!(matches!(&terms[0], Expr::Optional(_)));
        assert!(matches!(&terms[1], Expr::Range(a, b) if a.text == "'0'" && b.text == "'9'"));
        assert!(matches!(&terms[2], Expr::Repeat(inner) if matches!(**inner, Expr::Wildcard(_))));
        assert!(matches!(&alts[1], Expr::Identifier(id) if id.name == "x"));
    }

    #[test]
    fn hinted_alternative() {
        let tokens = vec![
            Token::RuleName("A".into(), loc()),
            Token::Assign,
            ident("b"),
            ident("c"),
            Token::Arrow(loc()),
            Token::LBrace,
            lit("\"parent\""),
            Token::Colon,
            Token::Int(1),
            Token::Comma,
            lit("\"children\""),
            Token::Colon,
            Token::LBrack,
            Token::Int(0),
            Token::RBrack,
            Token::RBrace,
            Token::Pipe,
            ident("d"),
        ];
        let g = parser().parse(&tokens).unwrap();
        let Expr::Alternates(alts) = &g.rules[0].body else {
            panic!("expected alternates");
        };
        let Expr::Hinted(_, hint) = &alts[0] else {
            panic!("expected a hint");
        };
        assert_eq!(hint.fields.len(), 2);
        assert_eq!(hint.fields[0].1, HintValue::Int(1));
        assert_eq!(hint.fields[1].1, HintValue::List(vec![0]));
    }

    #[test]
    fn consecutive_rules() {
        let tokens = vec![
            Token::RuleName("A".into(), loc()),
            Token::Assign,
            ident("b"),
            Token::RuleName("b".into(), loc()),
            Token::Assign,
            lit("'b'"),
        ];
        let g = parser().parse(&tokens).unwrap();
        assert_eq!(g.rules.len(), 2);
    }

    #[test]
    fn missing_body_is_rejected() {
        let tokens = vec![Token::RuleName("A".into(), loc()), Token::Assign];
        assert!(parser().parse(&tokens).has_errors());
    }
}
