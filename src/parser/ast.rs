use std::fmt;

use crate::lexer::token::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Int,
    Float,
    Char,
    Str,
    Func,
}

/// A surface type annotation. `param_types`/`return_type` exist only for
/// `func` and are never populated by the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    pub kind: TypeKind,
    pub param_types: Vec<Type>,
    pub return_type: Option<Box<Type>>,
    pub location: Location,
}

impl Type {
    pub fn new(kind: TypeKind, location: Location) -> Self {
        Self {
            kind,
            param_types: Vec::new(),
            return_type: None,
            location,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TypeKind::Int => f.write_str("int"),
            TypeKind::Float => f.write_str("float"),
            TypeKind::Char => f.write_str("char"),
            TypeKind::Str => f.write_str("str"),
            TypeKind::Func => {
                f.write_str("(")?;
                for (i, param) in self.param_types.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                f.write_str(") -> ")?;
                match &self.return_type {
                    Some(ret) => write!(f, "{}", ret),
                    None => f.write_str("void"),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Negate => f.write_str("-"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
        };
        f.write_str(symbol)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    StringLiteral {
        value: String,
        location: Location,
    },
    IntLiteral {
        value: i32,
        location: Location,
    },
    FloatLiteral {
        value: f32,
        location: Location,
    },
    Identifier {
        name: String,
        location: Location,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        location: Location,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        location: Location,
    },
    Call {
        callee: String,
        args: Vec<Expr>,
        location: Location,
    },
    Conditional {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
        location: Location,
    },
}

impl Expr {
    pub fn location(&self) -> &Location {
        match self {
            Expr::StringLiteral { location, .. }
            | Expr::IntLiteral { location, .. }
            | Expr::FloatLiteral { location, .. }
            | Expr::Identifier { location, .. }
            | Expr::Unary { location, .. }
            | Expr::Binary { location, .. }
            | Expr::Call { location, .. }
            | Expr::Conditional { location, .. } => location,
        }
    }

    fn dump_into(&self, indent: usize, out: &mut String) {
        let pad = "  ".repeat(indent);
        match self {
            Expr::StringLiteral { value, .. } => {
                out.push_str(&format!("{}StringLiteral: \"{}\"\n", pad, value));
            }
            Expr::IntLiteral { value, .. } => {
                out.push_str(&format!("{}IntLiteral: {}\n", pad, value));
            }
            Expr::FloatLiteral { value, .. } => {
                out.push_str(&format!("{}FloatLiteral: {}\n", pad, value));
            }
            Expr::Identifier { name, .. } => {
                out.push_str(&format!("{}Identifier: {}\n", pad, name));
            }
            Expr::Unary { op, operand, .. } => {
                out.push_str(&format!("{}UnaryOp: {}\n", pad, op));
                operand.dump_into(indent + 1, out);
            }
            Expr::Binary {
                op, left, right, ..
            } => {
                out.push_str(&format!("{}BinaryOp: {}\n", pad, op));
                left.dump_into(indent + 1, out);
                right.dump_into(indent + 1, out);
            }
            Expr::Call { callee, args, .. } => {
                out.push_str(&format!("{}FunctionCall: {}\n", pad, callee));
                for arg in args {
                    arg.dump_into(indent + 1, out);
                }
            }
            Expr::Conditional {
                condition,
                then_expr,
                else_expr,
                ..
            } => {
                out.push_str(&format!("{}ConditionalExpression:\n", pad));
                out.push_str(&format!("{} Condition:\n", pad));
                condition.dump_into(indent + 2, out);
                out.push_str(&format!("{} Then:\n", pad));
                then_expr.dump_into(indent + 2, out);
                out.push_str(&format!("{} Else:\n", pad));
                else_expr.dump_into(indent + 2, out);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: Type,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub return_type: Type,
    pub parameters: Vec<Parameter>,
    pub body: Expr,
    pub location: Location,
}

impl FunctionDef {
    fn dump_into(&self, indent: usize, out: &mut String) {
        let pad = "  ".repeat(indent);
        out.push_str(&format!("{}FunctionDef: {}\n", pad, self.name));

        out.push_str(&format!("{}  ReturnType:\n", pad));
        out.push_str(&format!(
            "{}Type: {}\n",
            "  ".repeat(indent + 2),
            self.return_type
        ));

        if !self.parameters.is_empty() {
            out.push_str(&format!("{}  Parameters:\n", pad));
            for param in &self.parameters {
                out.push_str(&format!("{}    {}: Type: {}\n", pad, param.name, param.ty));
            }
        }

        out.push_str(&format!("{}  Body:\n", pad));
        self.body.dump_into(indent + 2, out);
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub functions: Vec<FunctionDef>,
}

impl Program {
    /// Indented tree rendering used by `--dump-ast`.
    pub fn dump(&self) -> String {
        let mut out = String::from("Program:\n");
        for func in &self.functions {
            func.dump_into(1, &mut out);
        }
        out
    }
}
