//! ember - a compiler for a small expression-oriented functional language.
//!
//! The pipeline is strictly forward: [`lexer`] turns a source buffer into
//! tokens, [`parser`] builds the AST and collects syntax errors, and
//! [`codegen`] lowers the AST through the [`ir`] toolkit into a module that
//! prints as textual LLVM IR. The generated code links against the
//! `ember-runtime` crate for string handling and I/O.

pub mod codegen;
pub mod errors;
pub mod ir;
pub mod lexer;
pub mod parser;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compilation errors surfaced by [`compile_source`].
#[derive(Debug)]
pub enum CompileError {
    /// One or more syntax errors; code generation was not attempted.
    Parse(Vec<parser::ParseError>),
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Parse(errors) => {
                write!(f, "parsing failed with {} error(s)", errors.len())?;
                for err in errors {
                    write!(f, "\n{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for CompileError {}

/// Compiles source text into an IR module. Code generation errors are
/// reported on stderr and erase the offending functions; they do not fail
/// the compilation.
pub fn compile_source(source: &str, filename: &str) -> Result<ir::Module, CompileError> {
    let tokens = lexer::Lexer::new(source, filename).tokenize();

    let mut parser = parser::Parser::new(tokens);
    let program = parser.parse();
    if parser.has_errors() {
        return Err(CompileError::Parse(parser.take_errors()));
    }

    let mut codegen = codegen::CodeGenerator::new("ember", filename);
    codegen.generate(&program);
    Ok(codegen.finish())
}
