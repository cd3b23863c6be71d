use lrkit::{AstMode, ParseError, Tables, Token};
use lrkit_gen::{GenError, GenOptions, emit_rust, generate_tables_from_str};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

const ARITH: &str = r#"
# equal precedence, right associative
Root ::= int '+' Root -> { "parent": 1, "children": [0, 2] }
       | int '*' Root -> { "parent": 1, "children": [0, 2] }
       | int -> { "passthrough": 0 }
int ::= _digit { _digit }
_digit ::= '0'-'9'
!whitespace ::= ' ' | '\t' | '\n' | '\r'
"#;

const PEMDAS: &str = r#"
Root ::= Sum -> { "passthrough": 0 }

Sum ::= Sum '+' Product -> { "parent": 1, "children": [0, 2] }
      | Sum '-' Product -> { "parent": 1, "children": [0, 2] }
      | Product -> { "passthrough": 0 }

Product ::= Product '*' Power -> { "parent": 1, "children": [0, 2] }
          | Product '/' Power -> { "parent": 1, "children": [0, 2] }
          | Power -> { "passthrough": 0 }

Power ::= Atom '**' Power -> { "parent": 1, "children": [0, 2] }
        | Atom -> { "passthrough": 0 }

Atom ::= int -> { "passthrough": 0 }
       | '(' Sum ')' -> { "passthrough": 1 }

int ::= '0'-'9' { '0'-'9' }
!whitespace ::= ' ' | '\t' | '\n' | '\r'
"#;

const JSON: &str = r#"
Value ::= string -> { "passthrough": 0 }
        | number -> { "passthrough": 0 }
        | 'true' -> { "passthrough": 0 }
        | 'false' -> { "passthrough": 0 }
        | 'null' -> { "passthrough": 0 }
        | Array -> { "passthrough": 0 }
        | Object -> { "passthrough": 0 }

Array ::= '[' Elements ']' -> { "parent_literal": "[]", "with_adopted_grandchildren": [1], "type": "array" }
        | '[' ']' -> { "parent_literal": "[]", "type": "array" }
Elements ::= Value ',' Elements -> { "parent": 2, "with_prepended_children": [0] }
           | Value -> { "parent_literal": "elements", "children": [0] }

Object ::= '{' Members '}' -> { "parent_literal": "{}", "with_adopted_grandchildren": [1], "type": "object" }
         | '{' '}' -> { "parent_literal": "{}", "type": "object" }
Members ::= Member ',' Members -> { "parent": 2, "with_prepended_children": [0] }
          | Member -> { "parent_literal": "members", "children": [0] }
Member ::= string ':' Value -> { "parent": 1, "children": [0, 2] }

string ::= '"' { _char } '"'
_char ::= ' '-'!' | '#'-'[' | ']'-'\u{10FFFF}' | '\\' .
number ::= [ '-' ] _digit { _digit }
_digit ::= '0'-'9'
!whitespace ::= ' ' | '\t' | '\n' | '\r'
"#;

fn tables(grammar: &str) -> Tables {
    init_logger();
    generate_tables_from_str(grammar, &GenOptions::default()).unwrap()
}

fn compact(tables: &Tables, input: &str) -> String {
    tables.parse_str(input, AstMode::Hinted).unwrap().compact()
}

fn token_types(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(|t| t.token_type.as_str()).collect()
}

#[test]
fn e1_equal_precedence_is_right_associative() {
    let t = tables(ARITH);
    assert_eq!(compact(&t, "1+2*3"), "+(1, *(2, 3))");
    assert_eq!(compact(&t, "1*2+3"), "*(1, +(2, 3))");
}

#[test]
fn e2_multiplication_binds_tighter() {
    let t = tables(PEMDAS);
    assert_eq!(compact(&t, "1+2*3"), "+(1, *(2, 3))");
    assert_eq!(compact(&t, "1-2-3"), "-(-(1, 2), 3)");
}

#[test]
fn e3_parentheses_group() {
    let t = tables(PEMDAS);
    assert_eq!(compact(&t, "(1+2)*3"), "*(+(1, 2), 3)");
}

#[test]
fn e4_exponent_is_right_associative() {
    let t = tables(PEMDAS);
    assert_eq!(compact(&t, "2**3**4"), "**(2, **(3, 4))");
    assert_eq!(compact(&t, "2*3**4"), "*(2, **(3, 4))");
}

#[test]
fn e5_ignored_tokens_are_skipped() {
    let t = tables(ARITH);
    let tokens = t.lexer(" 1 + 2 ").tokenize();
    assert_eq!(token_types(&tokens), ["int", "+", "int", "EOF"]);
    let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
    assert_eq!(lexemes, ["1", "+", "2", ""]);
    assert_eq!(tokens[1].location.column, 4);
    assert_eq!(compact(&t, " 1 + 2 "), "+(1, 2)");
}

#[test]
fn e6_json_array_adopts_elements() {
    let t = tables(JSON);
    let ast = t.parse_str(r#"[1,"a",null]"#, AstMode::Hinted).unwrap();
    let root = ast.root();
    assert_eq!(root.node_type.as_str(), "array");
    let types: Vec<&str> = root.children.iter().map(|c| c.node_type.as_str()).collect();
    assert_eq!(types, ["number", "string", "null"]);
    assert!(root.children.iter().all(|c| c.token.is_some() && c.children.is_empty()));
    assert_eq!(ast.compact(), r#"array(1, "a", null)"#);
}

#[test]
fn json_objects_and_nesting() {
    let t = tables(JSON);
    assert_eq!(compact(&t, "[]"), "array");
    assert_eq!(
        compact(&t, r#"{"k": [true, -2], "e": {}}"#),
        r#"object(:("k", array(true, -2)), :("e", object))"#
    );
}

#[test]
fn leaves_follow_input_order() {
    let t = tables(PEMDAS);
    let input = "(1 + 2) * 3";
    let mut expected = t.lexer(input).tokenize();
    expected.pop();
    let ast = t.parse_str(input, AstMode::Full).unwrap();
    let leaves: Vec<&Token> = ast.root().leaves();
    assert_eq!(leaves.len(), expected.len());
    for (leaf, tok) in leaves.iter().zip(&expected) {
        assert_eq!(*leaf, tok);
    }

    let hinted = t.parse_str("1+2*3", AstMode::Hinted).unwrap();
    let lexemes: Vec<&str> = hinted.root().leaves().into_iter().map(|t| t.lexeme.as_str()).collect();
    assert_eq!(lexemes, ["1", "+", "2", "*", "3"]);
}

#[test]
fn repeated_parses_agree() {
    let t = tables(PEMDAS);
    let first = t.parse_str("1+2*(3-4)**5", AstMode::Hinted).unwrap();
    for _ in 0..3 {
        assert_eq!(t.parse_str("1+2*(3-4)**5", AstMode::Hinted).unwrap(), first);
    }
}

#[test]
fn ast_modes() {
    let t = tables(ARITH);
    let full = t.parse_str("1+2", AstMode::Full).unwrap();
    assert_eq!(full.compact(), "Root(1, +, Root(2))");
    let condensed = t.parse_str("1+2", AstMode::Condensed).unwrap();
    assert_eq!(condensed.compact(), "+(1, 2)");
}

#[test]
fn generation_is_deterministic() {
    for grammar in [ARITH, PEMDAS, JSON] {
        let one = tables(grammar);
        let two = tables(grammar);
        assert_eq!(one.to_json().unwrap(), two.to_json().unwrap());
        assert_eq!(emit_rust(&one).unwrap(), emit_rust(&two).unwrap());
    }
}

#[test]
fn json_round_trip() {
    let t = tables(JSON);
    let json = t.to_json().unwrap();
    let back = Tables::from_json(&json).unwrap();
    assert_eq!(back, t);
    assert_eq!(back.to_json().unwrap(), json);
    assert_eq!(emit_rust(&back).unwrap(), emit_rust(&t).unwrap());
    assert_eq!(compact(&back, "[1]"), "array(1)");
}

#[test]
fn single_accept_after_start_symbol() {
    let t = tables(PEMDAS);
    let accepts: Vec<(usize, &String)> = t
        .actions
        .iter()
        .flat_map(|(s, row)| {
            row.iter()
                .filter(|(_, a)| **a == lrkit::Action::Accept)
                .map(move |(term, _)| (*s, term))
        })
        .collect();
    assert_eq!(accepts.len(), 1);
    assert_eq!(accepts[0].1, "EOF");
    assert_eq!(t.gotos[&0]["Root"], accepts[0].0);
}

#[test]
fn literals_scan_as_themselves() {
    let t = tables(PEMDAS);
    for lit in ["+", "-", "*", "/", "**", "(", ")"] {
        let tokens = t.lexer(lit).tokenize();
        assert_eq!(tokens.len(), 2, "{lit}");
        assert_eq!(tokens[0].token_type.as_str(), lit);
        assert_eq!(tokens[0].lexeme.as_str(), lit);
    }
}

#[test]
fn runtime_errors() {
    let t = tables(PEMDAS);
    match t.parse_str("1+", AstMode::Hinted) {
        Err(ParseError::Unexpected {
            token_type,
            expected,
            ..
        }) => {
            assert_eq!(token_type, "EOF");
            assert_eq!(expected, ["(", "int"]);
        }
        other => panic!("unexpected result {other:?}"),
    }
    match t.parse_str("1 $ 2", AstMode::Hinted) {
        Err(ParseError::Lex { rune, location }) => {
            assert_eq!(rune, '$');
            assert_eq!(location.column, 3);
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn ambiguous_grammar_reports_conflict() {
    init_logger();
    let err = generate_tables_from_str("E ::= E '+' E | int\nint ::= '0'-'9'", &GenOptions::default())
        .unwrap_err();
    let GenError::Conflicts(conflicts) = &err else {
        panic!("expected conflicts, got {err}");
    };
    assert!(conflicts.iter().all(|c| c.lookahead == "+"));
    let text = err.to_string();
    assert!(text.contains("Lookahead: \"+\""), "{text}");
    assert!(text.contains("shift to state"), "{text}");
    assert!(text.contains("reduce by production 1: E ::= E + E"), "{text}");
    assert!(text.contains("[E ::= E + E ., +]"), "{text}");
}

#[test]
fn grammar_errors() {
    init_logger();
    let gen_err = |src: &str| generate_tables_from_str(src, &GenOptions::default()).unwrap_err();

    assert!(matches!(
        gen_err("Root ::= Missing"),
        GenError::UndefinedIdentifier { ref name, .. } if name == "Missing"
    ));
    assert!(matches!(
        gen_err("Root ::= a\na ::= 'x'\na ::= 'y'"),
        GenError::DuplicateRule { ref name, .. } if name == "a"
    ));
    assert!(matches!(
        gen_err("Root ::= a\na ::= 'x' a"),
        GenError::RecursiveLexerRule { .. }
    ));
    assert!(matches!(
        gen_err("Root ::= _frag\n_frag ::= 'x'"),
        GenError::FragmentReference { .. }
    ));
    assert!(matches!(
        gen_err("Root ::= a\na ::= [ 'x' ]"),
        GenError::EmptyMatch { ref name } if name == "a"
    ));
    assert!(matches!(
        gen_err("Root ::= 'a'-'z'"),
        GenError::LexerOnly { .. }
    ));
    assert!(matches!(gen_err("a ::= 'x'"), GenError::NoParserRules));
    assert!(matches!(
        gen_err("Root ::= 'a' Root"),
        GenError::UnproductiveRule { .. }
    ));
    assert!(matches!(
        gen_err(r#"Root ::= 'a' -> { "passthrough": 3 }"#),
        GenError::Hint { .. }
    ));

    match gen_err("Root ::= 'a' !ws 'b'\n!ws ::= ' ' { ' ' }") {
        GenError::IgnoredReference { name, location } => {
            assert_eq!(name, "!ws");
            assert_eq!((location.line, location.column), (1, 14));
        }
        other => panic!("expected IgnoredReference, got {other}"),
    }
    match gen_err("Root ::= int '_d'\nint ::= _d { _d }\n_d ::= '0'-'9'") {
        GenError::LiteralCollision { name, kind, location } => {
            assert_eq!(name, "_d");
            assert_eq!(kind, "fragment");
            assert_eq!((location.line, location.column), (1, 14));
        }
        other => panic!("expected LiteralCollision, got {other}"),
    }
    match gen_err("Root ::= 'a' '!c'\n!c ::= '#' { 'a'-'z' }") {
        GenError::LiteralCollision { name, kind, location } => {
            assert_eq!(name, "!c");
            assert_eq!(kind, "ignored");
            assert_eq!((location.line, location.column), (1, 14));
        }
        other => panic!("expected LiteralCollision, got {other}"),
    }

    let syntax = gen_err("Root ::= 'a'\n  | | 'b'");
    assert!(matches!(syntax, GenError::Syntax { .. }));
    assert!(syntax.to_string().starts_with("syntax error at line 2, column "), "{syntax}");
}
