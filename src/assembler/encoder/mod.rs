/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

pub mod constants;
pub mod expr;
mod instruction_encoders;
pub mod operand_kinds;

use std::collections::HashMap;

use crate::assembler::definitions::Definitions;
use crate::assembler::symbol_table::Labels;
use crate::errors::AssemblyError;
use operand_kinds::{recognize, OperandKind, RecognizeCtx, Rejection};

pub use expr::EvalCtx;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    One,
    Two,
}

pub struct EncodeCtx<'a> {
    /// The byte offset of the instruction immediately following this one;
    /// only the relative-branch encoders (`JR`) consult it.
    pub next_address: u32,
    pub file: &'a str,
    pub line: usize,
}

pub type EncodeFn = Box<dyn Fn(&[u32], &EncodeCtx) -> Result<Vec<u8>, AssemblyError> + Send + Sync>;

/// One encodable shape of a mnemonic (or, reused by the directive engine,
/// of `.DB`). `wildcard` repeats `signature[0]` across however many
/// operands were written, for `.DB`'s variable arity.
pub struct Variant {
    pub signature: &'static [OperandKind],
    pub size: usize,
    pub wildcard: bool,
    pub macro_forbidden: bool,
    pub labels_before_only: bool,
    pub skip_first_pass: bool,
    pub encode: EncodeFn,
}

pub type InstructionTable = HashMap<&'static str, Vec<Variant>>;

pub fn build_instruction_table() -> InstructionTable {
    let mut table = InstructionTable::new();
    instruction_encoders::misc::register(&mut table);
    instruction_encoders::load_store::register(&mut table);
    instruction_encoders::arithmetic::register(&mut table);
    instruction_encoders::bitwise::register(&mut table);
    instruction_encoders::control_flow::register(&mut table);
    instruction_encoders::stack::register(&mut table);
    table
}

pub struct VariantSelectInput<'a> {
    pub full_labels: Option<&'a Labels>,
    pub before_only_labels: Option<&'a Labels>,
    pub defs: &'a Definitions,
    pub last_absolute_label: &'a str,
    pub file: &'a str,
    pub line: usize,
    pub is_inside_macro: bool,
    pub pass: Pass,
}

/// Implements the variant-selection algorithm shared by the instruction
/// table and the directive engine's own wildcard variant lists: skip
/// variants forbidden by context, then try each remaining variant's
/// recognizers in order, returning the first whose operands all match.
/// A recognizer's `Fatal` rejection (malformed, not merely differently
/// shaped) aborts the search immediately instead of trying further
/// variants.
pub fn select_variant<'a>(
    variants: &'a [Variant],
    mnemonic: &str,
    operand_strs: &[String],
    input: &VariantSelectInput,
) -> Result<(&'a Variant, Vec<u32>), AssemblyError> {
    let mut reasons = Vec::new();

    'variant: for variant in variants {
        if variant.macro_forbidden && input.is_inside_macro {
            reasons.push("not allowed inside a macro body".to_string());
            continue;
        }
        if variant.skip_first_pass && input.pass == Pass::One {
            reasons.push("skipped on pass 1".to_string());
            continue;
        }

        let arity_ok = if variant.wildcard {
            !operand_strs.is_empty()
        } else {
            variant.signature.len() == operand_strs.len()
        };
        if !arity_ok {
            reasons.push(format!(
                "expected {} operand(s), got {}",
                if variant.wildcard {
                    1
                } else {
                    variant.signature.len()
                },
                operand_strs.len()
            ));
            continue;
        }

        let labels = if variant.labels_before_only {
            input.before_only_labels
        } else {
            input.full_labels
        };
        let ctx = RecognizeCtx {
            eval: EvalCtx {
                labels,
                defs: input.defs,
                last_absolute_label: input.last_absolute_label,
            },
            file: input.file,
            line: input.line,
        };

        let mut resolved = Vec::with_capacity(operand_strs.len());
        for (i, operand) in operand_strs.iter().enumerate() {
            let kind = if variant.wildcard {
                variant.signature[0]
            } else {
                variant.signature[i]
            };
            match recognize(kind, &ctx, operand) {
                Ok(v) => resolved.push(v),
                Err(Rejection::Fatal(e)) => return Err(e),
                Err(Rejection::Mismatch(reason)) => {
                    reasons.push(format!("operand {} (\"{}\"): {}", i + 1, operand, reason));
                    continue 'variant;
                }
            }
        }
        return Ok((variant, resolved));
    }

    Err(AssemblyError::OperandMismatch {
        file: input.file.to_string(),
        line: input.line,
        mnemonic: mnemonic.to_string(),
        reasons,
    })
}
