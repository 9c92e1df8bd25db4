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

use super::one;
use crate::assembler::encoder::constants::*;
use crate::assembler::encoder::operand_kinds::OperandKind::*;
use crate::assembler::encoder::{EncodeCtx, InstructionTable, Variant};
use crate::errors::AssemblyError;

/// `JR`'s target is resolved to an absolute address at recognize time, then
/// turned into a signed displacement against the address of the
/// instruction that follows it, here, at encode time, since that is the
/// earliest point both addresses are known.
fn relative_delta(target: u32, ctx: &EncodeCtx) -> Result<u8, AssemblyError> {
    let delta = target as i64 - ctx.next_address as i64;
    if !(-128..=127).contains(&delta) {
        return Err(AssemblyError::RelativeJumpOutOfRange {
            file: ctx.file.to_string(),
            line: ctx.line,
            offset: delta as i32,
        });
    }
    Ok((delta as i8) as u8)
}

pub fn register(table: &mut InstructionTable) {
    one(
        table,
        "JR",
        Variant {
            signature: &[RomAddress],
            size: 2,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, ctx| Ok(vec![JR_OPCODE, relative_delta(ops[0], ctx)?])),
        },
    );
    one(
        table,
        "JR",
        Variant {
            signature: &[Condition, RomAddress],
            size: 2,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, ctx| {
                Ok(vec![
                    JR_COND_BASE + (ops[0] as u8) * 8,
                    relative_delta(ops[1], ctx)?,
                ])
            }),
        },
    );

    one(
        table,
        "JP",
        Variant {
            signature: &[RomAddress],
            size: 3,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, _| {
                let [low, high] = (ops[0] as u16).to_le_bytes();
                Ok(vec![JP_OPCODE, low, high])
            }),
        },
    );
    one(
        table,
        "JP",
        Variant {
            signature: &[Condition, RomAddress],
            size: 3,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, _| {
                let [low, high] = (ops[1] as u16).to_le_bytes();
                Ok(vec![JP_COND_BASE + (ops[0] as u8) * 8, low, high])
            }),
        },
    );
    one(
        table,
        "JP",
        Variant {
            signature: &[IndirectHl],
            size: 1,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|_, _| Ok(vec![JP_HL_OPCODE])),
        },
    );

    one(
        table,
        "CALL",
        Variant {
            signature: &[RomAddress],
            size: 3,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, _| {
                let [low, high] = (ops[0] as u16).to_le_bytes();
                Ok(vec![CALL_OPCODE, low, high])
            }),
        },
    );
    one(
        table,
        "CALL",
        Variant {
            signature: &[Condition, RomAddress],
            size: 3,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, _| {
                let [low, high] = (ops[1] as u16).to_le_bytes();
                Ok(vec![CALL_COND_BASE + (ops[0] as u8) * 8, low, high])
            }),
        },
    );

    one(
        table,
        "RET",
        Variant {
            signature: &[],
            size: 1,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|_, _| Ok(vec![RET_OPCODE])),
        },
    );
    one(
        table,
        "RET",
        Variant {
            signature: &[Condition],
            size: 1,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, _| Ok(vec![RET_COND_BASE + (ops[0] as u8) * 8])),
        },
    );
    one(
        table,
        "RETI",
        Variant {
            signature: &[],
            size: 1,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|_, _| Ok(vec![RETI_OPCODE])),
        },
    );

    one(
        table,
        "RST",
        Variant {
            signature: &[RstTarget],
            size: 1,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, _| Ok(vec![RST_BASE | (ops[0] as u8) << 3])),
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(next_address: u32) -> EncodeCtx<'static> {
        EncodeCtx {
            next_address,
            file: "f.asm",
            line: 1,
        }
    }

    #[test]
    fn jr_encodes_a_forward_displacement() {
        let mut table = InstructionTable::new();
        register(&mut table);
        // instruction at 0x100, JR's own length is 2 bytes, target at 0x110
        assert_eq!(
            (table["JR"][0].encode)(&[0x110], &ctx(0x102)).unwrap(),
            vec![JR_OPCODE, 0x0E]
        );
    }

    #[test]
    fn jr_encodes_a_backward_displacement() {
        let mut table = InstructionTable::new();
        register(&mut table);
        let bytes = (table["JR"][0].encode)(&[0x100], &ctx(0x110)).unwrap();
        assert_eq!(bytes[0], JR_OPCODE);
        assert_eq!(bytes[1] as i8, -0x10);
    }

    #[test]
    fn jr_out_of_range_is_rejected() {
        let mut table = InstructionTable::new();
        register(&mut table);
        assert!((table["JR"][0].encode)(&[0x300], &ctx(0x100)).is_err());
    }

    #[test]
    fn jp_hl_is_a_single_fixed_byte() {
        let mut table = InstructionTable::new();
        register(&mut table);
        assert_eq!(
            (table["JP"][2].encode)(&[], &ctx(0)).unwrap(),
            vec![JP_HL_OPCODE]
        );
    }

    #[test]
    fn rst_packs_the_target_index_into_the_base() {
        let mut table = InstructionTable::new();
        register(&mut table);
        assert_eq!((table["RST"][0].encode)(&[4], &ctx(0)).unwrap(), vec![0xE7]); // RST 0x20
    }
}
