use ember::lexer::Lexer;
use ember::parser::ast::{BinaryOp, Expr, Program, TypeKind, UnaryOp};
use ember::parser::Parser;

fn parse(source: &str) -> Program {
    let tokens = Lexer::new(source, "test.em").tokenize();
    let mut parser = Parser::new(tokens);
    let program = parser.parse();
    assert!(
        !parser.has_errors(),
        "unexpected parse errors: {:?}",
        parser.errors()
    );
    program
}

fn parse_with_errors(source: &str) -> (Program, Vec<String>) {
    let tokens = Lexer::new(source, "test.em").tokenize();
    let mut parser = Parser::new(tokens);
    let program = parser.parse();
    let errors = parser.errors().iter().map(|e| e.to_string()).collect();
    (program, errors)
}

fn body(source: &str) -> Expr {
    let mut program = parse(source);
    assert_eq!(program.functions.len(), 1);
    program.functions.remove(0).body
}

#[test]
fn parses_function_definition() {
    let program = parse("let add: int = (a: int, b: int) -> a + b");
    let func = &program.functions[0];
    assert_eq!(func.name, "add");
    assert_eq!(func.return_type.kind, TypeKind::Int);
    assert_eq!(func.parameters.len(), 2);
    assert_eq!(func.parameters[0].name, "a");
    assert_eq!(func.parameters[1].ty.kind, TypeKind::Int);
    assert!(matches!(
        func.body,
        Expr::Binary {
            op: BinaryOp::Add,
            ..
        }
    ));
}

#[test]
fn parses_empty_parameter_list() {
    let program = parse("let zero: int = () -> 0");
    assert!(program.functions[0].parameters.is_empty());
}

#[test]
fn one_function_per_let_form() {
    let program = parse(
        "let one: int = () -> 1\n# comment between\nlet two: int = () -> 2\nlet three: int = () -> 3",
    );
    let names: Vec<&str> = program.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["one", "two", "three"]);
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    // a + b * c: MUL is the right child of ADD
    match body("let f: int = (a: int, b: int, c: int) -> a + b * c") {
        Expr::Binary {
            op: BinaryOp::Add,
            left,
            right,
            ..
        } => {
            assert!(matches!(*left, Expr::Identifier { .. }));
            assert!(matches!(
                *right,
                Expr::Binary {
                    op: BinaryOp::Multiply,
                    ..
                }
            ));
        }
        other => panic!("expected addition at the root, got {:?}", other),
    }

    // a * b + c: ADD is the root, MUL its left child
    match body("let f: int = (a: int, b: int, c: int) -> a * b + c") {
        Expr::Binary {
            op: BinaryOp::Add,
            left,
            ..
        } => {
            assert!(matches!(
                *left,
                Expr::Binary {
                    op: BinaryOp::Multiply,
                    ..
                }
            ));
        }
        other => panic!("expected addition at the root, got {:?}", other),
    }
}

#[test]
fn binary_operators_are_left_associative() {
    match body("let f: int = (a: int, b: int, c: int) -> a - b - c") {
        Expr::Binary {
            op: BinaryOp::Subtract,
            left,
            right,
            ..
        } => {
            assert!(matches!(
                *left,
                Expr::Binary {
                    op: BinaryOp::Subtract,
                    ..
                }
            ));
            assert!(matches!(*right, Expr::Identifier { .. }));
        }
        other => panic!("expected subtraction at the root, got {:?}", other),
    }
}

#[test]
fn unary_minus_binds_tighter_than_binary_operators() {
    match body("let f: int = (a: int, b: int) -> -a * b") {
        Expr::Binary {
            op: BinaryOp::Multiply,
            left,
            ..
        } => {
            assert!(matches!(
                *left,
                Expr::Unary {
                    op: UnaryOp::Negate,
                    ..
                }
            ));
        }
        other => panic!("expected multiplication at the root, got {:?}", other),
    }
}

#[test]
fn unary_minus_chains_right_associatively() {
    match body("let f: int = (a: int) -> --a") {
        Expr::Unary { operand, .. } => {
            assert!(matches!(*operand, Expr::Unary { .. }));
        }
        other => panic!("expected nested negation, got {:?}", other),
    }
}

#[test]
fn comparison_has_lowest_precedence() {
    match body("let f: int = (a: int, b: int) -> a + 1 < b * 2") {
        Expr::Binary {
            op: BinaryOp::Less,
            left,
            right,
            ..
        } => {
            assert!(matches!(
                *left,
                Expr::Binary {
                    op: BinaryOp::Add,
                    ..
                }
            ));
            assert!(matches!(
                *right,
                Expr::Binary {
                    op: BinaryOp::Multiply,
                    ..
                }
            ));
        }
        other => panic!("expected comparison at the root, got {:?}", other),
    }
}

#[test]
fn conditionals_nest_through_the_then_branch() {
    // if c1 then if c2 then x else y else z
    match body("let f: int = (c1: int, c2: int, x: int, y: int, z: int) -> if c1 then if c2 then x else y else z")
    {
        Expr::Conditional {
            then_expr,
            else_expr,
            ..
        } => {
            assert!(matches!(*then_expr, Expr::Conditional { .. }));
            assert!(matches!(*else_expr, Expr::Identifier { .. }));
        }
        other => panic!("expected a conditional, got {:?}", other),
    }
}

#[test]
fn parses_calls_and_nested_arguments() {
    match body("let f: int = (x: int) -> g(x + 1, h(), \"s\")") {
        Expr::Call { callee, args, .. } => {
            assert_eq!(callee, "g");
            assert_eq!(args.len(), 3);
            assert!(matches!(args[0], Expr::Binary { .. }));
            assert!(matches!(args[1], Expr::Call { ref args, .. } if args.is_empty()));
            assert!(matches!(args[2], Expr::StringLiteral { .. }));
        }
        other => panic!("expected a call, got {:?}", other),
    }
}

#[test]
fn call_requires_adjacent_paren() {
    match body("let f: int = (g: func) -> g") {
        Expr::Identifier { name, .. } => assert_eq!(name, "g"),
        other => panic!("expected a bare identifier, got {:?}", other),
    }
}

#[test]
fn parenthesized_expressions_regroup() {
    match body("let f: int = (a: int, b: int, c: int) -> (a + b) * c") {
        Expr::Binary {
            op: BinaryOp::Multiply,
            left,
            ..
        } => {
            assert!(matches!(
                *left,
                Expr::Binary {
                    op: BinaryOp::Add,
                    ..
                }
            ));
        }
        other => panic!("expected multiplication at the root, got {:?}", other),
    }
}

#[test]
fn literal_values_are_decoded() {
    match body("let f: float = () -> 3.5") {
        Expr::FloatLiteral { value, .. } => assert_eq!(value, 3.5),
        other => panic!("expected a float literal, got {:?}", other),
    }
    match body("let f: int = () -> -12") {
        Expr::Unary { operand, .. } => {
            assert!(matches!(*operand, Expr::IntLiteral { value: 12, .. }));
        }
        other => panic!("expected negation of a literal, got {:?}", other),
    }
}

#[test]
fn missing_arrow_is_reported_with_location() {
    let (program, errors) = parse_with_errors("let f: int = (x: int) x + 1");
    assert!(program.functions.is_empty());
    assert_eq!(errors.len(), 1);
    assert!(
        errors[0].contains("Expected '->' after parameters"),
        "got: {}",
        errors[0]
    );
    assert!(errors[0].contains("at 1:23"), "got: {}", errors[0]);
}

#[test]
fn recovers_at_the_next_let_definition() {
    let (program, errors) = parse_with_errors(
        "let broken: int = (x: int x + 1\nlet fine: int = (x: int) -> x",
    );
    assert_eq!(errors.len(), 1);
    assert_eq!(program.functions.len(), 1);
    assert_eq!(program.functions[0].name, "fine");
}

#[test]
fn collects_multiple_errors() {
    let (program, errors) =
        parse_with_errors("let a: int = )\nlet b: int = )\nlet c: int = () -> 1");
    assert_eq!(errors.len(), 2);
    assert_eq!(program.functions.len(), 1);
    assert_eq!(program.functions[0].name, "c");
}

#[test]
fn lexer_error_tokens_become_syntax_errors() {
    let (program, errors) = parse_with_errors("let f: int = () -> !");
    assert!(program.functions.is_empty());
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Error at test.em:1:20"), "got: {}", errors[0]);
    assert!(errors[0].contains("Expected expression"), "got: {}", errors[0]);
}

#[test]
fn error_at_end_of_file_is_labelled() {
    let (_, errors) = parse_with_errors("let f: int = () ->");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0], "Error at end of file: Expected expression");
}

#[test]
fn missing_type_keyword_is_an_error() {
    let (_, errors) = parse_with_errors("let f: wibble = () -> 1");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Expected type identifier"), "got: {}", errors[0]);
}

#[test]
fn duplicate_parameter_names_are_tolerated() {
    let program = parse("let f: int = (x: int, x: int) -> x");
    assert_eq!(program.functions[0].parameters.len(), 2);
}

#[test]
fn func_type_is_accepted_without_payload() {
    let program = parse("let apply: int = (f: func, x: int) -> f(x)");
    let param = &program.functions[0].parameters[0];
    assert_eq!(param.ty.kind, TypeKind::Func);
    assert!(param.ty.param_types.is_empty());
    assert!(param.ty.return_type.is_none());
}

#[test]
fn int_literal_overflow_is_a_parse_error() {
    let (_, errors) = parse_with_errors("let f: int = () -> 99999999999");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Invalid integer literal"), "got: {}", errors[0]);
}

#[test]
fn dump_renders_the_tree_shape() {
    let program = parse("let sign: int = (x: int) -> if x < 0 then -1 else 1");
    let dump = program.dump();
    assert!(dump.starts_with("Program:\n  FunctionDef: sign\n"));
    assert!(dump.contains("    ReturnType:\n"));
    assert!(dump.contains("      Type: int\n"));
    assert!(dump.contains("    Parameters:\n"));
    assert!(dump.contains("      x: Type: int\n"));
    assert!(dump.contains("    Body:\n"));
    assert!(dump.contains("      ConditionalExpression:\n"));
    assert!(dump.contains("       Condition:\n"));
    assert!(dump.contains("          BinaryOp: <\n"));
    assert!(dump.contains("UnaryOp: -\n"));
    assert!(dump.contains("IntLiteral: 1\n"));
}
