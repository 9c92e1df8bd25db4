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

//! Operand-kind recognizers. Each one looks at a single already-tokenized
//! operand string and either resolves it to a `u32` payload or rejects it
//! with a reason, so the caller can try the next instruction variant.
//! Recognizers that successfully identify what the user *meant* but find
//! it malformed (an overflowing immediate, an undefined symbol, illegal
//! cross-bank arithmetic) raise a `Fatal` instead of a soft rejection:
//! there is no other variant that would make the line valid, so falling
//! through to "no encoding accepts these operands" would only obscure the
//! real problem.

use crate::assembler::encoder::expr::{self, DefKind, EvalCtx};
use crate::assembler::symbol_table;
use crate::errors::AssemblyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    Reg8,
    A,
    Hl,
    Sp,
    IndirectHl,
    IndirectC,
    SpRelative8,
    Reg16Sp,
    Reg16Af,
    Reg16Indirect,
    Condition,
    BitOrdinal,
    RstTarget,
    Raw8,
    Raw16,
    Raw8Indirect,
    Raw16Indirect,
    RomAddress,
    MacroLocalLabelRef,
}

pub enum Rejection {
    Mismatch(String),
    Fatal(AssemblyError),
}

pub type RecognizeResult = Result<u32, Rejection>;

fn mismatch<T>(reason: impl Into<String>) -> Result<T, Rejection> {
    Err(Rejection::Mismatch(reason.into()))
}

pub struct RecognizeCtx<'a> {
    pub eval: EvalCtx<'a>,
    pub file: &'a str,
    pub line: usize,
}

pub fn recognize(kind: OperandKind, ctx: &RecognizeCtx, text: &str) -> RecognizeResult {
    match kind {
        OperandKind::Reg8 => reg8(text),
        OperandKind::A => literal(text, "A", 0),
        OperandKind::Hl => literal(text, "HL", 0),
        OperandKind::Sp => literal(text, "SP", 0),
        OperandKind::IndirectHl => literal(text, "(HL)", 0),
        OperandKind::IndirectC => literal(text, "(C)", 0),
        OperandKind::SpRelative8 => sp_relative8(ctx, text),
        OperandKind::Reg16Sp => reg16(text, "SP"),
        OperandKind::Reg16Af => reg16(text, "AF"),
        OperandKind::Reg16Indirect => reg16_indirect(text),
        OperandKind::Condition => condition(text),
        OperandKind::BitOrdinal => bit_ordinal(text),
        OperandKind::RstTarget => rst_target(text),
        OperandKind::Raw8 => raw8(ctx, text),
        OperandKind::Raw16 => raw16(ctx, text),
        OperandKind::Raw8Indirect => raw8_indirect(ctx, text),
        OperandKind::Raw16Indirect => raw16_indirect(ctx, text),
        OperandKind::RomAddress => rom_address(ctx, text),
        OperandKind::MacroLocalLabelRef => macro_local_label_ref(ctx, text),
    }
}

fn literal(text: &str, expected: &str, value: u32) -> RecognizeResult {
    let upper = text.to_uppercase();
    if upper == expected {
        Ok(value)
    } else {
        mismatch(format!("expected \"{}\", got \"{}\"", expected, text))
    }
}

fn reg8(text: &str) -> RecognizeResult {
    match text.to_uppercase().as_str() {
        "B" => Ok(0),
        "C" => Ok(1),
        "D" => Ok(2),
        "E" => Ok(3),
        "H" => Ok(4),
        "L" => Ok(5),
        "(HL)" => Ok(6),
        "A" => Ok(7),
        _ => mismatch(format!("\"{}\" is not an 8-bit register", text)),
    }
}

/// `pair_top` names the register the top slot (index 3) denotes: `"AF"` for
/// `PUSH`/`POP` contexts, `"SP"` for everywhere else. The bit pattern for
/// `BC`/`DE`/`HL` is identical in both; only the ambiguous top slot differs.
fn reg16(text: &str, pair_top: &str) -> RecognizeResult {
    match text.to_uppercase().as_str() {
        "BC" => Ok(0),
        "DE" => Ok(1),
        "HL" => Ok(2),
        other if other == pair_top => Ok(3),
        _ => mismatch(format!("\"{}\" is not a 16-bit register pair", text)),
    }
}

fn reg16_indirect(text: &str) -> RecognizeResult {
    match text.to_uppercase().as_str() {
        "(BC)" => Ok(0),
        "(DE)" => Ok(1),
        "(HL+)" | "(HLI)" => Ok(2),
        "(HL-)" | "(HLD)" => Ok(3),
        _ => mismatch(format!("\"{}\" is not an indirect 16-bit register", text)),
    }
}

fn condition(text: &str) -> RecognizeResult {
    match text.to_uppercase().as_str() {
        "NZ" => Ok(0),
        "Z" => Ok(1),
        "NC" => Ok(2),
        "C" => Ok(3),
        _ => mismatch(format!("\"{}\" is not a condition code", text)),
    }
}

fn bit_ordinal(text: &str) -> RecognizeResult {
    let value: u32 = text
        .parse()
        .map_err(|_| Rejection::Mismatch(format!("\"{}\" is not a bit ordinal", text)))?;
    if value <= 7 {
        Ok(value)
    } else {
        mismatch(format!("bit ordinal {} is out of range 0-7", value))
    }
}

fn rst_target(text: &str) -> RecognizeResult {
    let normalized = text.trim_start_matches("0x").trim_start_matches("0X");
    let value = u32::from_str_radix(normalized, 16)
        .map_err(|_| Rejection::Mismatch(format!("\"{}\" is not an RST target", text)))?;
    match value {
        0x00 | 0x08 | 0x10 | 0x18 | 0x20 | 0x28 | 0x30 | 0x38 => Ok(value / 8),
        _ => mismatch(format!("{:#04x} is not a valid RST target", value)),
    }
}

fn to_rejection(ctx: &RecognizeCtx, err: expr::EvalError) -> Rejection {
    match err {
        expr::EvalError::CrossBank(reason) => Rejection::Fatal(AssemblyError::CrossBankArithmetic {
            file: ctx.file.to_string(),
            line: ctx.line,
            reason,
        }),
        expr::EvalError::Message(reason) => Rejection::Mismatch(reason),
    }
}

fn eval(ctx: &RecognizeCtx, text: &str) -> Result<expr::EvalValue, Rejection> {
    expr::evaluate_expecting_typed(&ctx.eval, text, None).map_err(|e| to_rejection(ctx, e))
}

fn eval_expecting(
    ctx: &RecognizeCtx,
    text: &str,
    expected: DefKind,
) -> Result<expr::EvalValue, Rejection> {
    expr::evaluate_expecting_typed(&ctx.eval, text, Some(expected)).map_err(|e| to_rejection(ctx, e))
}

fn width_error(ctx: &RecognizeCtx, value: i64, width: &'static str) -> Rejection {
    Rejection::Fatal(AssemblyError::WidthOverflow {
        file: ctx.file.to_string(),
        line: ctx.line,
        value,
        width,
    })
}

/// Converts a bank-tagged value to the 16-bit address the CPU would
/// actually see; untagged (plain numeric/defined) values pass through.
fn bank_aware(value: expr::EvalValue) -> i64 {
    match value.bank {
        Some(_) if value.raw >= 0 => symbol_table::cpu_visible(value.raw as u32) as i64,
        _ => value.raw,
    }
}

/// `SP+e8` / `SP-e8`, the addressing mode behind `LD HL, SP+e8`. The sign
/// is part of the token (no internal whitespace survives tokenizing), so
/// it is folded into the trailing expression rather than handled via the
/// generic `+`/`-` combinator.
fn sp_relative8(ctx: &RecognizeCtx, text: &str) -> RecognizeResult {
    let upper = text.to_uppercase();
    let rest = upper
        .strip_prefix("SP")
        .ok_or_else(|| Rejection::Mismatch(format!("\"{}\" does not start with SP", text)))?;
    let signed = match rest.strip_prefix('+') {
        Some(digits) => digits,
        None if rest.starts_with('-') => rest,
        None => return mismatch(format!("\"{}\" is not an SP-relative offset", text)),
    };
    raw8(ctx, signed)
}

fn raw8(ctx: &RecognizeCtx, text: &str) -> RecognizeResult {
    let value = eval_expecting(ctx, text, DefKind::Raw)?;
    let raw = value.raw;
    if !(-128..=255).contains(&raw) {
        return Err(width_error(ctx, raw, "8-bit"));
    }
    Ok((raw as i64 & 0xFF) as u32)
}

fn raw16(ctx: &RecognizeCtx, text: &str) -> RecognizeResult {
    if let Some(inner) = text.strip_prefix('&') {
        let value = eval(ctx, inner)?;
        return indirect16_from_value(ctx, value);
    }
    let value = eval_expecting(ctx, text, DefKind::Raw)?;
    let converted = bank_aware(value);
    if !(-32768..=65535).contains(&converted) {
        return Err(width_error(ctx, converted, "16-bit"));
    }
    Ok((converted & 0xFFFF) as u32)
}

fn strip_parens(text: &str) -> Result<&str, Rejection> {
    let trimmed = text.trim();
    trimmed
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| Rejection::Mismatch(format!("\"{}\" is not parenthesized", text)))
}

/// `(expr)` or a bare `$NAME` naming a definition that was itself `.DEFINE`d
/// as an indirect variant (a named constant standing in for `(addr)`).
fn raw8_indirect(ctx: &RecognizeCtx, text: &str) -> RecognizeResult {
    let value = match strip_parens(text) {
        Ok(inner) => eval(ctx, inner)?,
        Err(_) if text.trim().starts_with('$') => eval_expecting(ctx, text.trim(), DefKind::Indirect)?,
        Err(e) => return Err(e),
    };
    let raw = bank_aware(value);
    let offset = if (0..=0xFF).contains(&raw) {
        raw
    } else if (0xFF00..=0xFFFF).contains(&raw) {
        raw - 0xFF00
    } else {
        return Err(width_error(ctx, raw, "high-RAM offset"));
    };
    Ok(offset as u32)
}

fn raw16_indirect(ctx: &RecognizeCtx, text: &str) -> RecognizeResult {
    let value = match strip_parens(text) {
        Ok(inner) => eval(ctx, inner)?,
        Err(_) if text.trim().starts_with('$') => eval_expecting(ctx, text.trim(), DefKind::Indirect)?,
        Err(e) => return Err(e),
    };
    indirect16_from_value(ctx, value)
}

fn indirect16_from_value(ctx: &RecognizeCtx, value: expr::EvalValue) -> RecognizeResult {
    let converted = bank_aware(value);
    if !(0..=0xFFFF).contains(&converted) {
        return Err(width_error(ctx, converted, "16-bit"));
    }
    Ok(converted as u32)
}

/// Parses an explicit `BB:HHHH` bank-and-address literal, falling back to
/// the ordinary (possibly label-derived) 16-bit expression grammar.
fn rom_address(ctx: &RecognizeCtx, text: &str) -> RecognizeResult {
    if let Some((bank_str, addr_str)) = text.split_once(':') {
        let bank = u32::from_str_radix(bank_str, 16)
            .map_err(|_| Rejection::Mismatch(format!("\"{}\" is not a bank number", bank_str)))?;
        let addr_in_bank = u32::from_str_radix(addr_str, 16).map_err(|_| {
            Rejection::Mismatch(format!("\"{}\" is not an in-bank address", addr_str))
        })?;
        if addr_in_bank >= symbol_table::BANK_SIZE {
            return Err(width_error(ctx, addr_in_bank as i64, "in-bank address"));
        }
        let flat = bank * symbol_table::BANK_SIZE + addr_in_bank;
        return Ok(symbol_table::cpu_visible(flat) as u32);
    }
    raw16(ctx, text)
}

fn macro_local_label_ref(ctx: &RecognizeCtx, text: &str) -> RecognizeResult {
    let name = text
        .strip_prefix("=$")
        .ok_or_else(|| Rejection::Mismatch(format!("\"{}\" is not a macro-local label", text)))?
        .to_uppercase();
    match ctx.eval.labels {
        None => Ok(0),
        Some(labels) => match labels.get(&format!("${}", name)) {
            Some(&addr) => Ok(symbol_table::cpu_visible(addr) as u32),
            None => Err(Rejection::Fatal(AssemblyError::UndefinedSymbol {
                file: ctx.file.to_string(),
                line: ctx.line,
                name: format!("${}", name),
            })),
        },
    }
}
