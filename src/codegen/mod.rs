//! AST to IR translation.
//!
//! One IR function is emitted per source definition, after the eleven
//! runtime builtins have been declared. Expression translation is a single
//! recursive visitor returning `Option<Value>`: an error prints to stderr,
//! yields `None`, and causes the enclosing function to be dropped from the
//! module while compilation of the remaining functions continues.

use std::collections::HashMap;

use crate::ir::builder::FunctionBuilder;
use crate::ir::{self, verify, BinOp, FloatPredicate, IntPredicate, Value};
use crate::lexer::token::Location;
use crate::parser::ast::{BinaryOp, Expr, FunctionDef, Program, Type, TypeKind, UnaryOp};

/// Signature of a source-defined function, keyed by source name in the
/// generator's function table.
#[derive(Debug, Clone)]
struct FunctionInfo {
    symbol: String,
    fn_type: ir::Type,
}

impl FunctionInfo {
    fn param_types(&self) -> &[ir::Type] {
        match &self.fn_type {
            ir::Type::Func { params, .. } => params,
            _ => &[],
        }
    }

    fn return_type(&self) -> ir::Type {
        match &self.fn_type {
            ir::Type::Func { ret, .. } => (**ret).clone(),
            other => other.clone(),
        }
    }

    fn value(&self) -> Value {
        Value::Function {
            name: self.symbol.clone(),
            ty: self.fn_type.clone(),
        }
    }
}

pub struct CodeGenerator {
    module: ir::Module,
    /// Source-defined functions that generated successfully. Duplicate
    /// source names overwrite earlier entries.
    functions: HashMap<String, FunctionInfo>,
    /// The function currently being generated, visible to calls (direct
    /// recursion) but not to plain identifier references.
    current: Option<(String, FunctionInfo)>,
}

impl CodeGenerator {
    pub fn new(module_name: &str, source_filename: &str) -> Self {
        let mut generator = Self {
            module: ir::Module::new(module_name, source_filename),
            functions: HashMap::new(),
            current: None,
        };
        generator.declare_builtins();
        generator
    }

    pub fn generate(&mut self, program: &Program) {
        for func in &program.functions {
            self.generate_function(func);
        }

        let diagnostics = verify::verify_module(&self.module);
        if !diagnostics.is_empty() {
            eprintln!("Module verification failed: {}", diagnostics.join("; "));
        }
    }

    pub fn module(&self) -> &ir::Module {
        &self.module
    }

    pub fn finish(self) -> ir::Module {
        self.module
    }

    fn generate_function(&mut self, func: &FunctionDef) {
        let return_type = ir_type(&func.return_type);
        let params: Vec<ir::Parameter> = func
            .parameters
            .iter()
            .map(|param| ir::Parameter {
                name: param.name.clone(),
                ty: ir_type(&param.ty),
            })
            .collect();

        // The first definition of a name keeps it; later ones are renamed.
        let symbol = self.module.symbol_name(&func.name);
        let info = FunctionInfo {
            symbol,
            fn_type: ir::Type::Func {
                params: params.iter().map(|p| p.ty.clone()).collect(),
                ret: Box::new(return_type.clone()),
            },
        };

        let mut builder = FunctionBuilder::new(info.symbol.clone(), params, return_type);

        // Parameters are the only names in scope; duplicates overwrite.
        let mut locals = HashMap::new();
        for (param, value) in func.parameters.iter().zip(builder.param_values()) {
            locals.insert(param.name.clone(), value);
        }

        self.current = Some((func.name.clone(), info.clone()));
        let body = self.generate_expression(&func.body, &mut builder, &locals);
        self.current = None;

        match body {
            Some(value) => {
                builder.ret(value);
                let function = builder.build();

                let diagnostics = verify::verify_function(&function);
                if !diagnostics.is_empty() {
                    eprintln!(
                        "Function verification failed for {}: {}",
                        func.name,
                        diagnostics.join("; ")
                    );
                }

                self.module.add_function(function);
                self.functions.insert(func.name.clone(), info);
            }
            // An error was already reported; the partially built function
            // is discarded instead of reaching the module.
            None => {}
        }
    }

    fn generate_expression(
        &mut self,
        expr: &Expr,
        builder: &mut FunctionBuilder,
        locals: &HashMap<String, Value>,
    ) -> Option<Value> {
        match expr {
            Expr::IntLiteral { value, .. } => Some(Value::ConstInt {
                ty: ir::Type::I32,
                value: i64::from(*value),
            }),

            Expr::FloatLiteral { value, .. } => Some(Value::ConstFloat { value: *value }),

            Expr::StringLiteral { value, .. } => Some(self.module.add_string(value)),

            Expr::Identifier { name, location } => {
                if let Some(value) = locals.get(name) {
                    return Some(value.clone());
                }

                // A bare function name becomes an untyped pointer.
                if let Some(info) = self.functions.get(name) {
                    let value = info.value();
                    return Some(builder.bitcast(value, ir::Type::ptr_to(ir::Type::I8), "fptmp"));
                }

                self.report_error(&format!("Undefined variable: {}", name), location);
                None
            }

            Expr::Unary {
                op: UnaryOp::Negate,
                operand,
                ..
            } => {
                let operand = self.generate_expression(operand, builder, locals)?;
                let ty = operand.ty();
                if ty.is_integer() {
                    let zero = Value::ConstInt { ty, value: 0 };
                    Some(builder.binop(BinOp::Sub, zero, operand, "negtmp"))
                } else if ty.is_float() {
                    Some(builder.fneg(operand, "fnegtmp"))
                } else {
                    // Negating a pointer value does nothing.
                    Some(operand)
                }
            }

            Expr::Binary {
                op,
                left,
                right,
                location,
            } => {
                let left = self.generate_expression(left, builder, locals)?;
                let right = self.generate_expression(right, builder, locals)?;
                self.generate_binary(*op, left, right, location, builder)
            }

            Expr::Call {
                callee,
                args,
                location,
            } => self.generate_call(callee, args, location, builder, locals),

            Expr::Conditional {
                condition,
                then_expr,
                else_expr,
                location,
            } => self.generate_conditional(condition, then_expr, else_expr, location, builder, locals),
        }
    }

    fn generate_binary(
        &mut self,
        op: BinaryOp,
        left: Value,
        right: Value,
        location: &Location,
        builder: &mut FunctionBuilder,
    ) -> Option<Value> {
        let both_int = left.ty().is_integer() && right.ty().is_integer();
        let both_float = left.ty().is_float() && right.ty().is_float();

        let result = match op {
            BinaryOp::Add if both_int => builder.binop(BinOp::Add, left, right, "addtmp"),
            BinaryOp::Add if both_float => builder.binop(BinOp::FAdd, left, right, "faddtmp"),
            BinaryOp::Subtract if both_int => builder.binop(BinOp::Sub, left, right, "subtmp"),
            BinaryOp::Subtract if both_float => builder.binop(BinOp::FSub, left, right, "fsubtmp"),
            BinaryOp::Multiply if both_int => builder.binop(BinOp::Mul, left, right, "multmp"),
            BinaryOp::Multiply if both_float => builder.binop(BinOp::FMul, left, right, "fmultmp"),
            BinaryOp::Divide if both_int => builder.binop(BinOp::SDiv, left, right, "divtmp"),
            BinaryOp::Divide if both_float => builder.binop(BinOp::FDiv, left, right, "fdivtmp"),
            BinaryOp::Less if both_int => builder.icmp(IntPredicate::Slt, left, right, "cmptmp"),
            BinaryOp::Less if both_float => builder.fcmp(FloatPredicate::Olt, left, right, "cmptmp"),
            BinaryOp::Greater if both_int => builder.icmp(IntPredicate::Sgt, left, right, "cmptmp"),
            BinaryOp::Greater if both_float => {
                builder.fcmp(FloatPredicate::Ogt, left, right, "cmptmp")
            }
            BinaryOp::LessEqual if both_int => builder.icmp(IntPredicate::Sle, left, right, "cmptmp"),
            BinaryOp::LessEqual if both_float => {
                builder.fcmp(FloatPredicate::Ole, left, right, "cmptmp")
            }
            BinaryOp::GreaterEqual if both_int => {
                builder.icmp(IntPredicate::Sge, left, right, "cmptmp")
            }
            BinaryOp::GreaterEqual if both_float => {
                builder.fcmp(FloatPredicate::Oge, left, right, "cmptmp")
            }
            BinaryOp::Equal if both_int => builder.icmp(IntPredicate::Eq, left, right, "cmptmp"),
            BinaryOp::Equal if both_float => builder.fcmp(FloatPredicate::Oeq, left, right, "cmptmp"),
            BinaryOp::NotEqual if both_int => builder.icmp(IntPredicate::Ne, left, right, "cmptmp"),
            BinaryOp::NotEqual if both_float => {
                builder.fcmp(FloatPredicate::One, left, right, "cmptmp")
            }
            _ => {
                self.report_error("Unsupported binary operation", location);
                return None;
            }
        };

        Some(result)
    }

    fn generate_call(
        &mut self,
        callee: &str,
        args: &[Expr],
        location: &Location,
        builder: &mut FunctionBuilder,
        locals: &HashMap<String, Value>,
    ) -> Option<Value> {
        // A parameter used in call position is a function pointer: build a
        // signature from the argument types and call through it. The return
        // type is assumed to be a 32-bit integer.
        if let Some(pointer) = locals.get(callee).cloned() {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(self.generate_expression(arg, builder, locals)?);
            }

            let fn_type = ir::Type::Func {
                params: values.iter().map(Value::ty).collect(),
                ret: Box::new(ir::Type::I32),
            };
            let casted = builder.bitcast(pointer, ir::Type::ptr_to(fn_type), "casttmp");
            return Some(builder.call(casted, ir::Type::I32, values, "calltmp"));
        }

        // Direct call: completed functions, the function being generated
        // (direct recursion), then runtime builtins.
        let info = self
            .functions
            .get(callee)
            .cloned()
            .or_else(|| {
                self.current
                    .as_ref()
                    .filter(|(name, _)| name == callee)
                    .map(|(_, info)| info.clone())
            })
            .or_else(|| {
                self.module.declaration(callee).map(|decl| FunctionInfo {
                    symbol: decl.name.clone(),
                    fn_type: decl.fn_type(),
                })
            });

        let Some(info) = info else {
            self.report_error(&format!("Undefined function: {}", callee), location);
            return None;
        };

        if info.param_types().len() != args.len() {
            self.report_error(
                &format!("Incorrect number of arguments for function: {}", callee),
                location,
            );
            return None;
        }

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.generate_expression(arg, builder, locals)?);
        }

        Some(builder.call(info.value(), info.return_type(), values, "calltmp"))
    }

    fn generate_conditional(
        &mut self,
        condition: &Expr,
        then_expr: &Expr,
        else_expr: &Expr,
        location: &Location,
        builder: &mut FunctionBuilder,
        locals: &HashMap<String, Value>,
    ) -> Option<Value> {
        let condition = self.generate_expression(condition, builder, locals)?;

        let cond_bool = {
            let ty = condition.ty();
            if ty.is_integer() {
                let zero = Value::ConstInt { ty, value: 0 };
                builder.icmp(IntPredicate::Ne, condition, zero, "ifcond")
            } else if ty.is_float() {
                let zero = Value::ConstFloat { value: 0.0 };
                builder.fcmp(FloatPredicate::One, condition, zero, "ifcond")
            } else {
                self.report_error("Invalid condition type for if expression", location);
                return None;
            }
        };

        let then_block = builder.create_block("then");
        let else_block = builder.create_block("else");
        let merge_block = builder.create_block("ifcont");

        builder.cond_br(cond_bool, then_block, else_block);

        builder.position_at_end(then_block);
        let then_value = self.generate_expression(then_expr, builder, locals)?;
        builder.br(merge_block);
        // Nested conditionals move the insertion point; the phi edge must
        // come from wherever the branch actually ended.
        let then_end = builder.block_label(builder.current_block()).to_string();

        builder.position_at_end(else_block);
        let else_value = self.generate_expression(else_expr, builder, locals)?;
        builder.br(merge_block);
        let else_end = builder.block_label(builder.current_block()).to_string();

        builder.position_at_end(merge_block);
        let ty = then_value.ty();
        Some(builder.phi(
            ty,
            vec![(then_value, then_end), (else_value, else_end)],
            "iftmp",
        ))
    }

    fn declare_builtins(&mut self) {
        let string = ir::Type::ptr_to(ir::Type::I8);

        self.module
            .declare("str_print", vec![string.clone()], ir::Type::I32);
        self.module
            .declare("str_read", vec![ir::Type::I32], string.clone());
        self.module
            .declare("str_len", vec![string.clone()], ir::Type::I32);
        self.module.declare(
            "str_at",
            vec![string.clone(), ir::Type::I32],
            ir::Type::I8,
        );
        self.module.declare(
            "str_sub",
            vec![string.clone(), ir::Type::I32, ir::Type::I32],
            string.clone(),
        );
        self.module.declare(
            "str_find",
            vec![string.clone(), string.clone()],
            ir::Type::I32,
        );
        self.module
            .declare("int_to_str", vec![ir::Type::I32], string.clone());
        self.module
            .declare("str_to_int", vec![string.clone()], ir::Type::I32);
        self.module
            .declare("float_to_str", vec![ir::Type::F32], string.clone());
        self.module
            .declare("str_to_float", vec![string.clone()], ir::Type::F32);
        self.module
            .declare("str_cmp", vec![string.clone(), string], ir::Type::I32);
    }

    fn report_error(&self, message: &str, location: &Location) {
        eprintln!(
            "Code generation error at {}:{}:{}: {}",
            location.filename, location.line, location.column, message
        );
    }
}

/// Surface type to IR type. Function values travel as untyped `i8*`.
fn ir_type(ty: &Type) -> ir::Type {
    match ty.kind {
        TypeKind::Int => ir::Type::I32,
        TypeKind::Float => ir::Type::F32,
        TypeKind::Char => ir::Type::I8,
        TypeKind::Str => ir::Type::ptr_to(ir::Type::I8),
        TypeKind::Func => ir::Type::ptr_to(ir::Type::I8),
    }
}
