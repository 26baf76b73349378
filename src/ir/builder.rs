//! Function construction.
//!
//! `FunctionBuilder` keeps one implicit current insertion block, hands out
//! deterministically uniquified value names and block labels, and folds
//! constant operands so that trivial arithmetic never reaches the printed
//! module. Callers position the builder, push instructions, and `build` the
//! finished function.

use std::collections::{HashMap, HashSet};

use super::{
    BasicBlock, BinOp, FloatPredicate, Function, Instruction, IntPredicate, Parameter, Terminator,
    Type, Value,
};

/// Handle to a block inside the function being built.
pub type BlockId = usize;

pub struct FunctionBuilder {
    function: Function,
    current_block: BlockId,
    taken_names: HashSet<String>,
    name_counters: HashMap<String, usize>,
    taken_labels: HashSet<String>,
    label_counters: HashMap<String, usize>,
}

impl FunctionBuilder {
    /// Creates a function with an `entry` block and positions the builder
    /// there. Parameter names are uniquified up front so temporaries never
    /// collide with them.
    pub fn new(name: String, params: Vec<Parameter>, return_type: Type) -> Self {
        let mut builder = Self {
            function: Function::new(name, Vec::new(), return_type),
            current_block: 0,
            taken_names: HashSet::new(),
            name_counters: HashMap::new(),
            taken_labels: HashSet::new(),
            label_counters: HashMap::new(),
        };

        for param in params {
            let unique = builder.fresh_name(&param.name);
            builder.function.params.push(Parameter {
                name: unique,
                ty: param.ty,
            });
        }

        let entry = builder.create_block("entry");
        builder.position_at_end(entry);
        builder
    }

    /// Appends a block with a uniquified label and returns its handle.
    pub fn create_block(&mut self, label: &str) -> BlockId {
        let counter = self.label_counters.entry(label.to_string()).or_insert(0);
        let unique = loop {
            let candidate = if *counter == 0 {
                label.to_string()
            } else {
                format!("{}{}", label, *counter)
            };
            *counter += 1;
            if self.taken_labels.insert(candidate.clone()) {
                break candidate;
            }
        };

        self.function.blocks.push(BasicBlock::new(unique));
        self.function.blocks.len() - 1
    }

    pub fn position_at_end(&mut self, block: BlockId) {
        self.current_block = block;
    }

    pub fn current_block(&self) -> BlockId {
        self.current_block
    }

    pub fn block_label(&self, block: BlockId) -> &str {
        &self.function.blocks[block].label
    }

    /// Parameter SSA values, in declaration order.
    pub fn param_values(&self) -> Vec<Value> {
        self.function
            .params
            .iter()
            .map(|param| Value::Local {
                name: param.name.clone(),
                ty: param.ty.clone(),
            })
            .collect()
    }

    pub fn binop(&mut self, op: BinOp, left: Value, right: Value, base: &str) -> Value {
        if let Some(folded) = fold_binop(op, &left, &right) {
            return folded;
        }

        let ty = left.ty();
        let dest = self.fresh_name(base);
        self.push(Instruction::BinOp {
            dest: dest.clone(),
            op,
            ty: ty.clone(),
            left,
            right,
        });
        Value::Local { name: dest, ty }
    }

    pub fn fneg(&mut self, operand: Value, base: &str) -> Value {
        if let Value::ConstFloat { value } = operand {
            return Value::ConstFloat { value: -value };
        }

        let dest = self.fresh_name(base);
        self.push(Instruction::FNeg {
            dest: dest.clone(),
            operand,
        });
        Value::Local {
            name: dest,
            ty: Type::F32,
        }
    }

    pub fn icmp(&mut self, pred: IntPredicate, left: Value, right: Value, base: &str) -> Value {
        if let (Value::ConstInt { value: l, .. }, Value::ConstInt { value: r, .. }) =
            (&left, &right)
        {
            let result = match pred {
                IntPredicate::Slt => l < r,
                IntPredicate::Sgt => l > r,
                IntPredicate::Sle => l <= r,
                IntPredicate::Sge => l >= r,
                IntPredicate::Eq => l == r,
                IntPredicate::Ne => l != r,
            };
            return Value::ConstInt {
                ty: Type::I1,
                value: result as i64,
            };
        }

        let dest = self.fresh_name(base);
        self.push(Instruction::ICmp {
            dest: dest.clone(),
            pred,
            left,
            right,
        });
        Value::Local {
            name: dest,
            ty: Type::I1,
        }
    }

    pub fn fcmp(&mut self, pred: FloatPredicate, left: Value, right: Value, base: &str) -> Value {
        if let (Value::ConstFloat { value: l }, Value::ConstFloat { value: r }) = (&left, &right) {
            // Ordered predicates are false on NaN, which `<`-family
            // comparisons already give us.
            let result = match pred {
                FloatPredicate::Olt => l < r,
                FloatPredicate::Ogt => l > r,
                FloatPredicate::Ole => l <= r,
                FloatPredicate::Oge => l >= r,
                FloatPredicate::Oeq => l == r,
                FloatPredicate::One => l != r && !l.is_nan() && !r.is_nan(),
            };
            return Value::ConstInt {
                ty: Type::I1,
                value: result as i64,
            };
        }

        let dest = self.fresh_name(base);
        self.push(Instruction::FCmp {
            dest: dest.clone(),
            pred,
            left,
            right,
        });
        Value::Local {
            name: dest,
            ty: Type::I1,
        }
    }

    /// Bitcasts of global symbols fold to constant expressions; only
    /// locally-computed pointers produce an instruction.
    pub fn bitcast(&mut self, value: Value, target: Type, base: &str) -> Value {
        if value.ty() == target {
            return value;
        }
        if value.is_constant() {
            return Value::ConstBitcast {
                value: Box::new(value),
                target,
            };
        }

        let dest = self.fresh_name(base);
        self.push(Instruction::Bitcast {
            dest: dest.clone(),
            value,
            target: target.clone(),
        });
        Value::Local {
            name: dest,
            ty: target,
        }
    }

    pub fn call(&mut self, callee: Value, ret: Type, args: Vec<Value>, base: &str) -> Value {
        let dest = self.fresh_name(base);
        self.push(Instruction::Call {
            dest: dest.clone(),
            ret: ret.clone(),
            callee,
            args,
        });
        Value::Local {
            name: dest,
            ty: ret,
        }
    }

    pub fn phi(&mut self, ty: Type, incoming: Vec<(Value, String)>, base: &str) -> Value {
        let dest = self.fresh_name(base);
        self.push(Instruction::Phi {
            dest: dest.clone(),
            ty: ty.clone(),
            incoming,
        });
        Value::Local { name: dest, ty }
    }

    pub fn ret(&mut self, value: Value) {
        self.terminate(Terminator::Ret(value));
    }

    pub fn br(&mut self, target: BlockId) {
        let target = self.block_label(target).to_string();
        self.terminate(Terminator::Br { target });
    }

    pub fn cond_br(&mut self, cond: Value, then_block: BlockId, else_block: BlockId) {
        let then_block = self.block_label(then_block).to_string();
        let else_block = self.block_label(else_block).to_string();
        self.terminate(Terminator::CondBr {
            cond,
            then_block,
            else_block,
        });
    }

    pub fn build(self) -> Function {
        self.function
    }

    fn push(&mut self, inst: Instruction) {
        self.function.blocks[self.current_block].instructions.push(inst);
    }

    fn terminate(&mut self, term: Terminator) {
        self.function.blocks[self.current_block].terminator = term;
    }

    fn fresh_name(&mut self, base: &str) -> String {
        let counter = self.name_counters.entry(base.to_string()).or_insert(0);
        loop {
            let candidate = if *counter == 0 {
                base.to_string()
            } else {
                format!("{}{}", base, *counter)
            };
            *counter += 1;
            if self.taken_names.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

fn fold_binop(op: BinOp, left: &Value, right: &Value) -> Option<Value> {
    match (left, right) {
        (
            Value::ConstInt { ty, value: l },
            Value::ConstInt { value: r, .. },
        ) => {
            let (l, r) = (*l as i32, *r as i32);
            let value = match op {
                BinOp::Add => l.wrapping_add(r),
                BinOp::Sub => l.wrapping_sub(r),
                BinOp::Mul => l.wrapping_mul(r),
                // Division by zero stays an instruction.
                BinOp::SDiv if r != 0 => l.wrapping_div(r),
                _ => return None,
            };
            Some(Value::ConstInt {
                ty: ty.clone(),
                value: value as i64,
            })
        }
        (Value::ConstFloat { value: l }, Value::ConstFloat { value: r }) => {
            let value = match op {
                BinOp::FAdd => l + r,
                BinOp::FSub => l - r,
                BinOp::FMul => l * r,
                BinOp::FDiv => l / r,
                _ => return None,
            };
            Some(Value::ConstFloat { value })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(value: i64) -> Value {
        Value::ConstInt {
            ty: Type::I32,
            value,
        }
    }

    #[test]
    fn uniquifies_value_names() {
        let mut builder = FunctionBuilder::new(
            "f".to_string(),
            vec![Parameter {
                name: "a".to_string(),
                ty: Type::I32,
            }],
            Type::I32,
        );
        let a = builder.param_values()[0].clone();

        let first = builder.binop(BinOp::Add, a.clone(), int(1), "addtmp");
        let second = builder.binop(BinOp::Add, first.clone(), int(2), "addtmp");

        assert_eq!(
            first,
            Value::Local {
                name: "addtmp".to_string(),
                ty: Type::I32
            }
        );
        assert_eq!(
            second,
            Value::Local {
                name: "addtmp1".to_string(),
                ty: Type::I32
            }
        );
    }

    #[test]
    fn uniquifies_block_labels() {
        let mut builder = FunctionBuilder::new("f".to_string(), vec![], Type::I32);
        let first = builder.create_block("then");
        let second = builder.create_block("then");
        assert_eq!(builder.block_label(first), "then");
        assert_eq!(builder.block_label(second), "then1");
    }

    #[test]
    fn folds_integer_arithmetic() {
        let mut builder = FunctionBuilder::new("f".to_string(), vec![], Type::I32);
        let folded = builder.binop(BinOp::Sub, int(0), int(1), "negtmp");
        assert_eq!(
            folded,
            Value::ConstInt {
                ty: Type::I32,
                value: -1
            }
        );

        let division = builder.binop(BinOp::SDiv, int(1), int(0), "divtmp");
        assert!(matches!(division, Value::Local { .. }));
    }

    #[test]
    fn duplicate_parameter_names_are_renamed() {
        let builder = FunctionBuilder::new(
            "f".to_string(),
            vec![
                Parameter {
                    name: "x".to_string(),
                    ty: Type::I32,
                },
                Parameter {
                    name: "x".to_string(),
                    ty: Type::I32,
                },
            ],
            Type::I32,
        );
        let values = builder.param_values();
        assert_eq!(
            values[0],
            Value::Local {
                name: "x".to_string(),
                ty: Type::I32
            }
        );
        assert_eq!(
            values[1],
            Value::Local {
                name: "x1".to_string(),
                ty: Type::I32
            }
        );
    }
}
