//! Structural verification.
//!
//! Re-creation of the verifier capability the code generator depends on:
//! every diagnostic is returned as a string for the caller to log, and
//! verification never aborts anything by itself.

use std::collections::HashSet;

use super::{Function, Instruction, Module, Terminator, Type, Value};

/// Checks one function. Returns an empty vector when it is well-formed.
pub fn verify_function(function: &Function) -> Vec<String> {
    let mut diagnostics = Vec::new();

    if function.blocks.is_empty() {
        diagnostics.push(format!("function '{}' has no blocks", function.name));
        return diagnostics;
    }

    let labels: HashSet<&str> = function
        .blocks
        .iter()
        .map(|block| block.label.as_str())
        .collect();

    for block in &function.blocks {
        let mut seen_non_phi = false;
        for inst in &block.instructions {
            match inst {
                Instruction::Phi { dest, ty, incoming } => {
                    if seen_non_phi {
                        diagnostics.push(format!(
                            "phi '%{}' is not at the head of block '{}'",
                            dest, block.label
                        ));
                    }
                    if incoming.len() < 2 {
                        diagnostics.push(format!(
                            "phi '%{}' has fewer than two incoming values",
                            dest
                        ));
                    }
                    for (value, pred) in incoming {
                        if !labels.contains(pred.as_str()) {
                            diagnostics.push(format!(
                                "phi '%{}' names unknown predecessor '{}'",
                                dest, pred
                            ));
                        }
                        if &value.ty() != ty {
                            diagnostics.push(format!(
                                "phi '%{}' mixes {} and {} operands",
                                dest,
                                ty,
                                value.ty()
                            ));
                        }
                    }
                }
                Instruction::BinOp {
                    dest,
                    ty,
                    left,
                    right,
                    ..
                } => {
                    seen_non_phi = true;
                    if &left.ty() != ty || &right.ty() != ty {
                        diagnostics.push(format!(
                            "binary op '%{}' operand types do not match {}",
                            dest, ty
                        ));
                    }
                }
                Instruction::ICmp {
                    dest, left, right, ..
                } => {
                    seen_non_phi = true;
                    if !left.ty().is_integer() || left.ty() != right.ty() {
                        diagnostics.push(format!(
                            "integer comparison '%{}' on mismatched operands",
                            dest
                        ));
                    }
                }
                Instruction::FCmp {
                    dest, left, right, ..
                } => {
                    seen_non_phi = true;
                    if !left.ty().is_float() || left.ty() != right.ty() {
                        diagnostics.push(format!(
                            "float comparison '%{}' on mismatched operands",
                            dest
                        ));
                    }
                }
                Instruction::FNeg { dest, operand } => {
                    seen_non_phi = true;
                    if !operand.ty().is_float() {
                        diagnostics.push(format!("fneg '%{}' on a non-float operand", dest));
                    }
                }
                Instruction::Bitcast { .. } | Instruction::Call { .. } => {
                    seen_non_phi = true;
                }
            }
        }

        match &block.terminator {
            Terminator::Unreachable => {
                diagnostics.push(format!("block '{}' has no terminator", block.label));
            }
            Terminator::Ret(value) => {
                if value.ty() != function.return_type {
                    diagnostics.push(format!(
                        "return type mismatch in '{}': expected {}, found {}",
                        function.name,
                        function.return_type,
                        value.ty()
                    ));
                }
            }
            Terminator::Br { target } => {
                if !labels.contains(target.as_str()) {
                    diagnostics.push(format!(
                        "branch in block '{}' targets unknown block '{}'",
                        block.label, target
                    ));
                }
            }
            Terminator::CondBr {
                cond,
                then_block,
                else_block,
            } => {
                if cond.ty() != Type::I1 {
                    diagnostics.push(format!(
                        "conditional branch in block '{}' on a non-i1 value",
                        block.label
                    ));
                }
                for target in [then_block, else_block] {
                    if !labels.contains(target.as_str()) {
                        diagnostics.push(format!(
                            "branch in block '{}' targets unknown block '{}'",
                            block.label, target
                        ));
                    }
                }
            }
        }
    }

    diagnostics
}

/// Checks the whole module: per-function structure, unique symbols, and
/// direct-call targets.
pub fn verify_module(module: &Module) -> Vec<String> {
    let mut diagnostics = Vec::new();

    let mut symbols = HashSet::new();
    for decl in &module.declarations {
        if !symbols.insert(decl.name.as_str()) {
            diagnostics.push(format!("duplicate symbol '@{}'", decl.name));
        }
    }
    for function in &module.functions {
        if !symbols.insert(function.name.as_str()) {
            diagnostics.push(format!("duplicate symbol '@{}'", function.name));
        }
    }

    for function in &module.functions {
        diagnostics.extend(verify_function(function));

        for block in &function.blocks {
            for inst in &block.instructions {
                if let Instruction::Call { dest, callee, args, .. } = inst {
                    if let Value::Function { name, ty } = callee {
                        if !symbols.contains(name.as_str()) {
                            diagnostics.push(format!(
                                "call '%{}' targets undefined symbol '@{}'",
                                dest, name
                            ));
                        }
                        if let Type::Func { params, .. } = ty {
                            if params.len() != args.len() {
                                diagnostics.push(format!(
                                    "call '%{}' passes {} arguments to '@{}' which takes {}",
                                    dest,
                                    args.len(),
                                    name,
                                    params.len()
                                ));
                            }
                        }
                    }
                }
            }
        }
    }

    diagnostics
}
