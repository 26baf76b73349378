use std::env;
use std::fs;
use std::process;

use ember::codegen::CodeGenerator;
use ember::errors::pretty;
use ember::lexer::token::Token;
use ember::lexer::Lexer;
use ember::parser::Parser;

struct Cli {
    input_file: String,
    dump_tokens: bool,
    dump_ast: bool,
}

fn main() {
    let args = env::args().skip(1).collect::<Vec<_>>();

    match parse_cli(args) {
        Ok(cli) => {
            if let Err(code) = run(&cli) {
                process::exit(code);
            }
        }
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    }
}

fn parse_cli(args: Vec<String>) -> Result<Cli, String> {
    let mut input_file: Option<String> = None;
    let mut dump_tokens = false;
    let mut dump_ast = false;

    for arg in args {
        match arg.as_str() {
            "--dump-tokens" => dump_tokens = true,
            "--dump-ast" => dump_ast = true,
            _ if arg.starts_with("--") => {
                return Err(format!(
                    "unknown option '{}'; supported: --dump-tokens, --dump-ast",
                    arg
                ));
            }
            _ => {
                if input_file.is_none() {
                    input_file = Some(arg);
                } else {
                    return Err(usage());
                }
            }
        }
    }

    let Some(input_file) = input_file else {
        return Err(usage());
    };

    Ok(Cli {
        input_file,
        dump_tokens,
        dump_ast,
    })
}

fn usage() -> String {
    "usage: ember <file> [--dump-tokens] [--dump-ast]".to_string()
}

fn run(cli: &Cli) -> Result<(), i32> {
    let source = match fs::read_to_string(&cli.input_file) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("failed to read '{}': {}", cli.input_file, err);
            return Err(1);
        }
    };

    let tokens = Lexer::new(&source, &cli.input_file).tokenize();

    if cli.dump_tokens {
        println!("Tokens: ");
        dump_tokens(&tokens, &cli.input_file);
        println!("END Tokens");
    }

    let mut parser = Parser::new(tokens);
    let program = parser.parse();

    if parser.has_errors() {
        eprintln!("Parse errors occurred:");
        for err in parser.errors() {
            eprintln!("{}", pretty::format_parse_error(&cli.input_file, &source, err));
        }
        return Err(1);
    }

    if cli.dump_ast {
        println!("AST: ");
        print!("{}", program.dump());
        println!("END AST");
    }

    let mut codegen = CodeGenerator::new("ember", &cli.input_file);
    codegen.generate(&program);
    print!("{}", codegen.module());

    Ok(())
}

fn dump_tokens(tokens: &[Token], filename: &str) {
    println!("Tokens for file: {}", filename);
    println!("=====================================");
    for token in tokens {
        println!(
            "Line {}, Col {}: {} '{}'",
            token.location.line, token.location.column, token.kind, token.value
        );
    }
    println!("=====================================");
    println!("Total tokens: {}", tokens.len());
}
