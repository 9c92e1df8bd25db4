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

//! The non-instruction directive engine: `.DEFINE`, `.DB`, `.PADTO`.
//! `.MACRODEF`/`.END` are consumed earlier, during macro collection, and
//! `.INCLUDE` is consumed earlier still, during parsing, so none of the
//! three appear here.

use crate::assembler::definitions::Definition;
use crate::assembler::encoder::expr::{self, DefKind, EvalCtx};
use crate::assembler::encoder::operand_kinds::{self, OperandKind, RecognizeCtx, Rejection};
use crate::assembler::symbol_table::BANK_SIZE;
use crate::errors::AssemblyError;
use crate::parser::ast_builder::tokenize_operands;

/// Outcome of assembling one directive: how many bytes it contributes, and
/// the bytes themselves when pass 2 is asking for them.
pub struct DirectiveEffect {
    pub size: usize,
    pub bytes: Option<Vec<u8>>,
}

fn misuse(file: &str, line: usize, reason: impl Into<String>) -> AssemblyError {
    AssemblyError::DirectiveMisuse {
        file: file.to_string(),
        line,
        reason: reason.into(),
    }
}

/// `.DEFINE name expr`. Always inserts or overwrites; there is no
/// redefinition error the way `.MACRODEF` has one. Tries the operand
/// against `Raw8Indirect`, `Raw16Indirect`, `Raw8`, then `Raw16` in turn, so
/// `(0x80)` is recorded as an indirect form distinct from the bare `0x80`
/// it would otherwise also match.
pub fn define(ctx: &RecognizeCtx, file: &str, line: usize, args: &str) -> Result<Definition, AssemblyError> {
    let tokens = tokenize_operands(args);
    if tokens.len() != 2 {
        return Err(misuse(file, line, ".DEFINE expects a name and a value"));
    }
    let value_text = &tokens[1];

    match operand_kinds::recognize(OperandKind::Raw8Indirect, ctx, value_text) {
        Ok(v) => return Ok(Definition::Indirect8(v as u8)),
        Err(Rejection::Fatal(e)) => return Err(e),
        Err(Rejection::Mismatch(_)) => {}
    }
    match operand_kinds::recognize(OperandKind::Raw16Indirect, ctx, value_text) {
        Ok(v) => return Ok(Definition::Indirect16(v as u16)),
        Err(Rejection::Fatal(e)) => return Err(e),
        Err(Rejection::Mismatch(_)) => {}
    }
    match operand_kinds::recognize(OperandKind::Raw8, ctx, value_text) {
        Ok(v) => return Ok(Definition::Raw8(v as u8)),
        Err(Rejection::Fatal(e)) => return Err(e),
        Err(Rejection::Mismatch(_)) => {}
    }
    match operand_kinds::recognize(OperandKind::Raw16, ctx, value_text) {
        Ok(v) => Ok(Definition::Raw16(v as u16)),
        Err(Rejection::Fatal(e)) => Err(e),
        Err(Rejection::Mismatch(reason)) => Err(misuse(file, line, reason)),
    }
}

/// Tries to recognize every one of `tokens` as `kind`, aborting at the first
/// `Fatal` or `Mismatch` rejection (so a mixed-width operand list falls
/// through to the next variant as a whole, not operand-by-operand).
fn recognize_all(ctx: &RecognizeCtx, tokens: &[String], kind: OperandKind) -> Result<Vec<u32>, Rejection> {
    tokens.iter().map(|token| operand_kinds::recognize(kind, ctx, token)).collect()
}

/// `.DB expr, expr, ...`: two wildcard variants, first-match-wins same as an
/// instruction's. Every operand is evaluated once as a `Raw`-kind value; if
/// all of them fit a byte, each is emitted as one byte. Otherwise the whole
/// list is re-recognized as `Raw16` (picking up bank-aware windowing, and
/// able to raise its own `Fatal` on a genuine 16-bit overflow) and each
/// value is emitted as a big-endian word.
///
/// The width check can't simply delegate to `operand_kinds::raw8` the way
/// `Raw8`-signature instruction variants do: that recognizer raises `Fatal`
/// on overflow, on the premise that no other variant would make an
/// overflowing immediate valid — true for an instruction's fixed operand
/// kind, but not here, where a second variant genuinely does accept the
/// wider value. So the byte-width probe is done locally instead.
pub fn db(ctx: &RecognizeCtx, file: &str, line: usize, args: &str) -> Result<DirectiveEffect, AssemblyError> {
    let tokens = tokenize_operands(args);
    if tokens.is_empty() {
        return Err(misuse(file, line, ".DB expects at least one operand"));
    }

    let mut raws = Vec::with_capacity(tokens.len());
    for token in &tokens {
        match expr::evaluate_expecting_typed(&ctx.eval, token, Some(DefKind::Raw)) {
            Ok(v) => raws.push(v.raw),
            Err(expr::EvalError::CrossBank(reason)) => {
                return Err(AssemblyError::CrossBankArithmetic {
                    file: file.to_string(),
                    line,
                    reason,
                })
            }
            Err(expr::EvalError::Message(reason)) => return Err(misuse(file, line, reason)),
        }
    }

    if raws.iter().all(|&v| (-128..=255).contains(&v)) {
        let bytes: Vec<u8> = raws.into_iter().map(|v| (v & 0xFF) as u8).collect();
        return Ok(DirectiveEffect {
            size: bytes.len(),
            bytes: Some(bytes),
        });
    }

    match recognize_all(ctx, &tokens, OperandKind::Raw16) {
        Ok(values) => {
            let mut bytes = Vec::with_capacity(values.len() * 2);
            for v in values {
                bytes.extend((v as u16).to_be_bytes());
            }
            Ok(DirectiveEffect {
                size: bytes.len(),
                bytes: Some(bytes),
            })
        }
        Err(Rejection::Fatal(e)) => Err(e),
        Err(Rejection::Mismatch(reason)) => Err(misuse(file, line, reason)),
    }
}

/// Resolves a `.PADTO` target to a flat ROM-image byte offset. Unlike the
/// instruction operand recognizers this does not window the result through
/// `cpu_visible`: padding operates on the flat byte stream being built, not
/// on a value the CPU will see baked into an opcode.
fn padto_target(eval_ctx: &EvalCtx, file: &str, line: usize, text: &str) -> Result<u32, AssemblyError> {
    if let Some(name) = text.strip_prefix("=$") {
        let key = format!("${}", name.to_uppercase());
        return match eval_ctx.labels {
            None => Ok(0),
            Some(labels) => labels.get(&key).copied().ok_or_else(|| AssemblyError::UndefinedSymbol {
                file: file.to_string(),
                line,
                name: key,
            }),
        };
    }
    if let Some((bank_str, addr_str)) = text.split_once(':') {
        let bank = u32::from_str_radix(bank_str, 16)
            .map_err(|_| misuse(file, line, format!("\"{}\" is not a bank number", bank_str)))?;
        let addr_in_bank = u32::from_str_radix(addr_str, 16)
            .map_err(|_| misuse(file, line, format!("\"{}\" is not an in-bank address", addr_str)))?;
        return Ok(bank * BANK_SIZE + addr_in_bank);
    }
    expr::evaluate(eval_ctx, text)
        .map(|v| v.raw as u32)
        .map_err(|reason| misuse(file, line, reason))
}

/// `.PADTO target`: zero-fills the ROM image from the current address up
/// to (but not including) `target`.
pub fn padto(
    eval_ctx: &EvalCtx,
    file: &str,
    line: usize,
    args: &str,
    current_address: u32,
) -> Result<DirectiveEffect, AssemblyError> {
    let tokens = tokenize_operands(args);
    if tokens.len() != 1 {
        return Err(misuse(file, line, ".PADTO expects exactly one target address"));
    }
    let target = padto_target(eval_ctx, file, line, &tokens[0])?;
    if target < current_address {
        return Err(misuse(
            file,
            line,
            format!(
                ".PADTO target 0x{:04x} is behind the current address 0x{:04x}",
                target, current_address
            ),
        ));
    }
    let pad = (target - current_address) as usize;
    Ok(DirectiveEffect {
        size: pad,
        bytes: Some(vec![0u8; pad]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::definitions::Definitions;
    use crate::assembler::symbol_table::Labels;

    fn ctx<'a>(labels: Option<&'a Labels>, defs: &'a Definitions) -> RecognizeCtx<'a> {
        RecognizeCtx {
            eval: EvalCtx {
                labels,
                defs,
                last_absolute_label: "MAIN",
            },
            file: "f.asm",
            line: 1,
        }
    }

    #[test]
    fn define_picks_the_indirect_form_for_a_parenthesized_operand() {
        let defs = Definitions::new();
        let c = ctx(None, &defs);
        let result = define(&c, "f.asm", 1, "HW_REG (0x80)").unwrap();
        assert_eq!(result, Definition::Indirect8(0x80));
    }

    #[test]
    fn define_falls_back_to_raw16_for_a_wide_bare_number() {
        let defs = Definitions::new();
        let c = ctx(None, &defs);
        let result = define(&c, "f.asm", 1, "ADDR 0x1234").unwrap();
        assert_eq!(result, Definition::Raw16(0x1234));
    }

    #[test]
    fn db_emits_one_byte_per_operand() {
        let defs = Definitions::new();
        let c = ctx(None, &defs);
        let result = db(&c, "f.asm", 1, "1, 2, 0xFF").unwrap();
        assert_eq!(result.bytes.unwrap(), vec![1, 2, 0xFF]);
    }

    #[test]
    fn db_falls_back_to_big_endian_words_when_an_operand_does_not_fit_a_byte() {
        let defs = Definitions::new();
        let c = ctx(None, &defs);
        let result = db(&c, "f.asm", 1, "0x1234, 0x5678").unwrap();
        assert_eq!(result.bytes.unwrap(), vec![0x12, 0x34, 0x56, 0x78]);
    }

    #[test]
    fn db_mixed_widths_all_fall_back_together() {
        let defs = Definitions::new();
        let c = ctx(None, &defs);
        let result = db(&c, "f.asm", 1, "1, 0x1234").unwrap();
        assert_eq!(result.bytes.unwrap(), vec![0x00, 0x01, 0x12, 0x34]);
    }

    #[test]
    fn padto_zero_fills_up_to_the_target() {
        let defs = Definitions::new();
        let eval_ctx = EvalCtx {
            labels: None,
            defs: &defs,
            last_absolute_label: "MAIN",
        };
        let result = padto(&eval_ctx, "f.asm", 1, "0x0010", 0x0008).unwrap();
        assert_eq!(result.size, 8);
        assert_eq!(result.bytes.unwrap(), vec![0u8; 8]);
    }

    #[test]
    fn padto_behind_the_current_address_is_rejected() {
        let defs = Definitions::new();
        let eval_ctx = EvalCtx {
            labels: None,
            defs: &defs,
            last_absolute_label: "MAIN",
        };
        assert!(padto(&eval_ctx, "f.asm", 1, "0x0008", 0x0010).is_err());
    }
}
