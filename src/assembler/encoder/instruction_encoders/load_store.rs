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
use crate::assembler::encoder::{InstructionTable, Variant};
use crate::errors::AssemblyError;

pub fn register(table: &mut InstructionTable) {
    one(
        table,
        "LD",
        Variant {
            signature: &[Reg8, Reg8],
            size: 1,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, ctx| {
                let (rd, rs) = (ops[0], ops[1]);
                if rd == 6 && rs == 6 {
                    return Err(AssemblyError::OperandMismatch {
                        file: ctx.file.to_string(),
                        line: ctx.line,
                        mnemonic: "LD".to_string(),
                        reasons: vec![
                            "(HL),(HL) is not an encodable load; that opcode is HALT".to_string(),
                        ],
                    });
                }
                Ok(vec![LD_R_R_BASE | (rd as u8) << 3 | rs as u8])
            }),
        },
    );

    one(
        table,
        "LD",
        Variant {
            signature: &[Reg8, Raw8],
            size: 2,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, _| {
                Ok(vec![LD_R_D8_BASE + (ops[0] as u8) * 8, ops[1] as u8])
            }),
        },
    );

    one(
        table,
        "LD",
        Variant {
            signature: &[Reg16Sp, Raw16],
            size: 3,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, _| {
                let [low, high] = (ops[1] as u16).to_le_bytes();
                Ok(vec![LD_RR_D16_BASE + (ops[0] as u8) * 16, low, high])
            }),
        },
    );

    one(
        table,
        "LD",
        Variant {
            signature: &[Reg16Indirect, A],
            size: 1,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, _| Ok(vec![ST_INDIRECT_BASE + (ops[0] as u8) * 16])),
        },
    );

    one(
        table,
        "LD",
        Variant {
            signature: &[A, Reg16Indirect],
            size: 1,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, _| Ok(vec![LD_INDIRECT_BASE + (ops[1] as u8) * 16])),
        },
    );

    one(
        table,
        "LD",
        Variant {
            signature: &[Raw16Indirect, A],
            size: 3,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, _| {
                let [low, high] = (ops[0] as u16).to_le_bytes();
                Ok(vec![ST_A_ABS_OPCODE, low, high])
            }),
        },
    );

    one(
        table,
        "LD",
        Variant {
            signature: &[A, Raw16Indirect],
            size: 3,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, _| {
                let [low, high] = (ops[1] as u16).to_le_bytes();
                Ok(vec![LD_A_ABS_OPCODE, low, high])
            }),
        },
    );

    one(
        table,
        "LD",
        Variant {
            signature: &[Raw8Indirect, A],
            size: 2,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, _| Ok(vec![LDH_N_A_OPCODE, ops[0] as u8])),
        },
    );

    one(
        table,
        "LD",
        Variant {
            signature: &[A, Raw8Indirect],
            size: 2,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, _| Ok(vec![LDH_A_N_OPCODE, ops[1] as u8])),
        },
    );

    one(
        table,
        "LD",
        Variant {
            signature: &[IndirectC, A],
            size: 1,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|_, _| Ok(vec![LDH_C_A_OPCODE])),
        },
    );

    one(
        table,
        "LD",
        Variant {
            signature: &[A, IndirectC],
            size: 1,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|_, _| Ok(vec![LDH_A_C_OPCODE])),
        },
    );

    one(
        table,
        "LD",
        Variant {
            signature: &[Sp, Hl],
            size: 1,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|_, _| Ok(vec![LD_SP_HL_OPCODE])),
        },
    );

    one(
        table,
        "LD",
        Variant {
            signature: &[Hl, SpRelative8],
            size: 2,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, _| Ok(vec![LD_HL_SP_E8_OPCODE, ops[1] as u8])),
        },
    );

    one(
        table,
        "LD",
        Variant {
            signature: &[Raw16Indirect, Sp],
            size: 3,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, _| {
                let [low, high] = (ops[0] as u16).to_le_bytes();
                Ok(vec![LD_ABS_SP_OPCODE, low, high])
            }),
        },
    );

    one(
        table,
        "LDH",
        Variant {
            signature: &[Raw8Indirect, A],
            size: 2,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, _| Ok(vec![LDH_N_A_OPCODE, ops[0] as u8])),
        },
    );

    one(
        table,
        "LDH",
        Variant {
            signature: &[A, Raw8Indirect],
            size: 2,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, _| Ok(vec![LDH_A_N_OPCODE, ops[1] as u8])),
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::encoder::EncodeCtx;

    fn ctx() -> EncodeCtx<'static> {
        EncodeCtx {
            next_address: 0,
            file: "f.asm",
            line: 1,
        }
    }

    #[test]
    fn ld_reg_reg_packs_dest_and_source_into_one_byte() {
        let mut table = InstructionTable::new();
        register(&mut table);
        let variant = &table["LD"][0];
        assert_eq!((variant.encode)(&[7, 0], &ctx()).unwrap(), vec![0x78]); // LD A, B
    }

    #[test]
    fn ld_hl_hl_is_rejected_because_that_opcode_is_halt() {
        let mut table = InstructionTable::new();
        register(&mut table);
        let variant = &table["LD"][0];
        assert!((variant.encode)(&[6, 6], &ctx()).is_err());
    }

    #[test]
    fn ld_immediate_16_bit_uses_little_endian_bytes() {
        let mut table = InstructionTable::new();
        register(&mut table);
        let variant = &table["LD"][2];
        assert_eq!(
            (variant.encode)(&[2, 0x1234], &ctx()).unwrap(),
            vec![0x21, 0x34, 0x12]
        );
    }
}
