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

//! The operand expression language: numeric literals, `$name[+offset]`
//! definition lookups, `=label[.sub][+offset]` label references, `+`/`-`
//! arithmetic between them, and the `high()`/`low()`/`inv()`/`bank()`/
//! `ptr()` helper functions. Every recognizer in `operand_kinds` that
//! accepts a computed value goes through here.

use crate::assembler::definitions::Definitions;
use crate::assembler::symbol_table::{self, Labels};

/// A value produced while walking an expression. `bank`, when set, traces
/// the value back to the ROM bank a label address was defined in; plain
/// numbers and `.DEFINE`d constants carry no bank.
#[derive(Debug, Clone, Copy)]
pub struct EvalValue {
    pub raw: i64,
    pub bank: Option<u32>,
}

impl EvalValue {
    fn plain(raw: i64) -> Self {
        EvalValue { raw, bank: None }
    }
}

/// Bundles everything an expression evaluation may need to consult.
/// `labels` is `None` during pass 1 for ordinary forward-tolerant
/// resolution (every label reference evaluates to 0); it is `Some` in
/// pass 2, and also in pass 1 for variants flagged `labels_before_only`
/// (a partial, append-only view of the map built so far).
pub struct EvalCtx<'a> {
    pub labels: Option<&'a Labels>,
    pub defs: &'a Definitions,
    pub last_absolute_label: &'a str,
}

/// Which family of `.DEFINE`d value a recognizer will accept through a bare
/// `$name` reference: `Raw` for `Raw8`/`Raw16` contexts, `Indirect` for
/// `Raw8Indirect`/`Raw16Indirect`. A definition whose own tag (fixed at
/// `.DEFINE` time, see `Definition`) falls in the other family is rejected
/// so e.g. an address meant for `($HW_REG)`-style indirection can't also be
/// read as a plain numeric operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefKind {
    Raw,
    Indirect,
}

/// An evaluation failure. `CrossBank` is split out from the catch-all
/// `Message` because it is never "try a different operand kind" material —
/// there is no other variant that would make crossing a bank boundary
/// valid, so callers that care (the `Raw8`/`Raw16` recognizers) escalate it
/// straight to `AssemblyError::CrossBankArithmetic` instead of treating it
/// as an ordinary operand-shape mismatch.
#[derive(Debug, Clone)]
pub enum EvalError {
    Message(String),
    CrossBank(String),
}

impl EvalError {
    pub fn message(&self) -> &str {
        match self {
            EvalError::Message(m) | EvalError::CrossBank(m) => m,
        }
    }
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

fn msg(text: impl Into<String>) -> EvalError {
    EvalError::Message(text.into())
}

/// Evaluates `text`, collapsing the `CrossBank`/`Message` distinction into a
/// plain string. Used by callers (`.PADTO`'s target resolver, macro argument
/// binding) that have no Fatal/Mismatch split of their own to route through.
pub fn evaluate(ctx: &EvalCtx, text: &str) -> Result<EvalValue, String> {
    evaluate_expecting(ctx, text, None)
}

/// Like `evaluate`, but additionally requires that any top-level `$name`
/// definition reference carry a tag compatible with `expected`.
pub fn evaluate_expecting(
    ctx: &EvalCtx,
    text: &str,
    expected: Option<DefKind>,
) -> Result<EvalValue, String> {
    evaluate_expecting_typed(ctx, text, expected).map_err(|e| e.message().to_string())
}

/// Like `evaluate_expecting`, but keeps the `CrossBank` error distinguished
/// from an ordinary mismatch, for callers (the `Raw8`/`Raw16` recognizers)
/// that escalate it to a hard failure instead of trying the next variant.
pub fn evaluate_expecting_typed(
    ctx: &EvalCtx,
    text: &str,
    expected: Option<DefKind>,
) -> Result<EvalValue, EvalError> {
    let mut p = Parser {
        ctx,
        bytes: text.as_bytes(),
        pos: 0,
        expected,
    };
    p.skip_ws();
    let v = p.parse_expr()?;
    p.skip_ws();
    if p.pos != p.bytes.len() {
        return Err(msg(format!("unexpected trailing input: \"{}\"", &text[p.pos..])));
    }
    Ok(v)
}

struct Parser<'a, 'b> {
    ctx: &'a EvalCtx<'b>,
    bytes: &'a [u8],
    pos: usize,
    expected: Option<DefKind>,
}

impl<'a, 'b> Parser<'a, 'b> {
    fn skip_ws(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos] == b' ' {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn parse_expr(&mut self) -> Result<EvalValue, EvalError> {
        self.skip_ws();
        let negate = if self.peek() == Some(b'-') {
            self.pos += 1;
            true
        } else {
            false
        };
        let mut acc = self.parse_term()?;
        if negate {
            acc = EvalValue::plain(-acc.raw);
        }
        loop {
            self.skip_ws();
            match self.peek() {
                Some(b'+') => {
                    self.pos += 1;
                    let rhs = self.parse_term()?;
                    acc = combine(acc, rhs, true)?;
                }
                Some(b'-') => {
                    self.pos += 1;
                    let rhs = self.parse_term()?;
                    acc = combine(acc, rhs, false)?;
                }
                _ => break,
            }
        }
        Ok(acc)
    }

    fn parse_term(&mut self) -> Result<EvalValue, EvalError> {
        self.skip_ws();
        match self.peek() {
            Some(b'$') => self.parse_define_ref(),
            Some(b'=') => self.parse_label_ref(),
            Some(b'(') => {
                self.pos += 1;
                let v = self.parse_expr()?;
                self.skip_ws();
                self.expect(b')')?;
                Ok(v)
            }
            Some(c) if c.is_ascii_digit() => self.parse_numeric_literal(),
            Some(c) if c.is_ascii_alphabetic() => self.parse_function_call(),
            _ => Err(msg("expected a value")),
        }
    }

    fn expect(&mut self, c: u8) -> Result<(), EvalError> {
        if self.peek() == Some(c) {
            self.pos += 1;
            Ok(())
        } else {
            Err(msg(format!("expected \"{}\"", c as char)))
        }
    }

    fn take_ident(&mut self) -> &'a str {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_' || c == b'.')
        {
            self.pos += 1;
        }
        std::str::from_utf8(&self.bytes[start..self.pos]).unwrap()
    }

    fn parse_numeric_literal(&mut self) -> Result<EvalValue, EvalError> {
        let start = self.pos;
        if self.bytes[self.pos..].starts_with(b"0x") || self.bytes[self.pos..].starts_with(b"0X") {
            self.pos += 2;
            let digit_start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.pos += 1;
            }
            let text = std::str::from_utf8(&self.bytes[digit_start..self.pos]).unwrap();
            if text.is_empty() {
                return Err(msg("empty hex literal"));
            }
            let value = i64::from_str_radix(text, 16).map_err(|e| msg(e.to_string()))?;
            return Ok(EvalValue::plain(value));
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos]).unwrap();
        let value: i64 = text.parse().map_err(|_| msg(format!("bad numeric literal \"{}\"", text)))?;
        Ok(EvalValue::plain(value))
    }

    /// `$NAME[+offset]`. `NAME` is looked up in the definitions table; if
    /// absent and it parses entirely as hex digits, it is treated as a hex
    /// literal instead (so `$FF` works whether or not `FF` was ever
    /// `.DEFINE`d).
    fn parse_define_ref(&mut self) -> Result<EvalValue, EvalError> {
        self.pos += 1; // '$'
        let name = self.take_ident().to_uppercase();
        if name.is_empty() {
            return Err(msg("expected a name after \"$\""));
        }
        let base = match self.ctx.defs.get(&name) {
            Some(def) => {
                if let Some(expected) = self.expected {
                    let actual = def.kind();
                    if actual != expected {
                        return Err(msg(format!(
                            "\"${}\" is a {:?}-kind definition, not usable here",
                            name, actual
                        )));
                    }
                }
                def.as_u32() as i64
            }
            None if !name.is_empty() && name.chars().all(|c| c.is_ascii_hexdigit()) => {
                i64::from_str_radix(&name, 16).map_err(|e| msg(e.to_string()))?
            }
            None => return Err(msg(format!("undefined name \"${}\"", name))),
        };
        Ok(EvalValue::plain(base + self.parse_optional_offset()?))
    }

    /// `=label[.sub][+offset]`.
    fn parse_label_ref(&mut self) -> Result<EvalValue, EvalError> {
        self.pos += 1; // '='
        let raw = self.take_ident();
        if raw.is_empty() {
            return Err(msg("expected a label name after \"=\""));
        }
        let canonical = symbol_table::resolve_label_ref(raw, self.ctx.last_absolute_label);
        let offset = self.parse_optional_offset()?;
        match self.ctx.labels {
            None => Ok(EvalValue::plain(0)),
            Some(labels) => match labels.get(&canonical) {
                Some(&addr) => Ok(EvalValue {
                    raw: addr as i64 + offset,
                    bank: Some(symbol_table::bank_of(addr)),
                }),
                None => Err(msg(format!("undefined symbol \"{}\"", canonical))),
            },
        }
    }

    fn parse_optional_offset(&mut self) -> Result<i64, EvalError> {
        self.skip_ws();
        match self.peek() {
            Some(b'+') => {
                self.pos += 1;
                Ok(self.parse_numeric_literal()?.raw)
            }
            Some(b'-') => {
                self.pos += 1;
                Ok(-self.parse_numeric_literal()?.raw)
            }
            _ => Ok(0),
        }
    }

    fn parse_function_call(&mut self) -> Result<EvalValue, EvalError> {
        let name = self.take_ident().to_lowercase();
        self.skip_ws();
        self.expect(b'(')?;
        let inner = self.parse_expr()?;
        self.skip_ws();
        self.expect(b')')?;
        match name.as_str() {
            "high" => Ok(EvalValue::plain((inner.raw >> 8) & 0xFF)),
            "low" => Ok(EvalValue::plain(inner.raw & 0xFF)),
            "inv" => {
                if inner.raw == 0 {
                    return Err(msg("inv(0) divides by zero"));
                }
                Ok(EvalValue::plain((256 / inner.raw) & 0xFF))
            }
            "bank" => match inner.bank {
                Some(b) => Ok(EvalValue::plain(b as i64)),
                None => Err(msg("bank() requires a label operand")),
            },
            "ptr" => Ok(EvalValue::plain(
                symbol_table::cpu_visible(inner.raw as u32) as i64,
            )),
            other => Err(msg(format!("unknown function \"{}\"", other))),
        }
    }
}

fn combine(lhs: EvalValue, rhs: EvalValue, add: bool) -> Result<EvalValue, EvalError> {
    let raw = if add { lhs.raw + rhs.raw } else { lhs.raw - rhs.raw };
    let bank = match (lhs.bank, rhs.bank) {
        (Some(a), Some(b)) if a != b => {
            return Err(EvalError::CrossBank(format!(
                "cross-bank arithmetic between bank {} and bank {}",
                a, b
            )));
        }
        (Some(a), _) => Some(a),
        (None, b) => b,
    };
    if let Some(b) = bank {
        if raw >= 0 && symbol_table::bank_of(raw as u32) != b {
            return Err(EvalError::CrossBank(format!(
                "offset carries address out of bank {} into a different bank",
                b
            )));
        }
    }
    Ok(EvalValue { raw, bank })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::definitions::Definition;

    fn ctx<'a>(labels: Option<&'a Labels>, defs: &'a Definitions) -> EvalCtx<'a> {
        EvalCtx {
            labels,
            defs,
            last_absolute_label: "MAIN",
        }
    }

    #[test]
    fn decimal_and_hex_literals() {
        let defs = Definitions::new();
        let c = ctx(None, &defs);
        assert_eq!(evaluate(&c, "42").unwrap().raw, 42);
        assert_eq!(evaluate(&c, "0x2A").unwrap().raw, 42);
    }

    #[test]
    fn define_lookup_and_hex_fallback() {
        let mut defs = Definitions::new();
        defs.insert("VAL".to_string(), Definition::Raw8(5));
        let c = ctx(None, &defs);
        assert_eq!(evaluate(&c, "$VAL+2").unwrap().raw, 7);
        assert_eq!(evaluate(&c, "$FF").unwrap().raw, 0xFF);
    }

    #[test]
    fn label_reference_is_tentative_without_a_label_map() {
        let defs = Definitions::new();
        let c = ctx(None, &defs);
        assert_eq!(evaluate(&c, "=LOOP").unwrap().raw, 0);
    }

    #[test]
    fn label_reference_resolves_against_a_populated_map() {
        let mut labels = Labels::new();
        labels.insert("MAIN.LOOP".to_string(), 0x150);
        let defs = Definitions::new();
        let c = ctx(Some(&labels), &defs);
        assert_eq!(evaluate(&c, "=.loop+1").unwrap().raw, 0x151);
    }

    #[test]
    fn high_and_low_split_a_16_bit_value() {
        let defs = Definitions::new();
        let c = ctx(None, &defs);
        assert_eq!(evaluate(&c, "high(0x1234)").unwrap().raw, 0x12);
        assert_eq!(evaluate(&c, "low(0x1234)").unwrap().raw, 0x34);
    }

    #[test]
    fn inv_divides_rather_than_complementing() {
        let defs = Definitions::new();
        let c = ctx(None, &defs);
        assert_eq!(evaluate(&c, "inv(0x02)").unwrap().raw, 128);
        assert_eq!(evaluate(&c, "inv(0x100)").unwrap().raw, 1);
    }

    #[test]
    fn cross_bank_addition_is_rejected() {
        let mut labels = Labels::new();
        labels.insert("A".to_string(), 0x4000);
        labels.insert("B".to_string(), 0x8000);
        let defs = Definitions::new();
        let c = ctx(Some(&labels), &defs);
        let a = evaluate(&c, "=A").unwrap();
        let b = evaluate(&c, "=B").unwrap();
        assert!(combine(a, b, true).is_err());
    }

    #[test]
    fn cross_bank_addition_is_reported_as_the_dedicated_error_kind() {
        let mut labels = Labels::new();
        labels.insert("A".to_string(), 0x4000);
        labels.insert("B".to_string(), 0x8000);
        let defs = Definitions::new();
        let c = ctx(Some(&labels), &defs);
        let a = evaluate(&c, "=A").unwrap();
        let b = evaluate(&c, "=B").unwrap();
        assert!(matches!(combine(a, b, true), Err(EvalError::CrossBank(_))));
    }
}
