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

/// The eight ALU ops that share the `op A, r8` / `op A, d8` shapes: each
/// also has an implicit-accumulator form (`op r8`, `op d8`) the real
/// assembler syntax allows.
fn alu_family(table: &mut InstructionTable, mnemonic: &'static str, r_base: u8, d8_opcode: u8) {
    one(
        table,
        mnemonic,
        Variant {
            signature: &[A, Reg8],
            size: 1,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(move |ops, _| Ok(vec![r_base | ops[1] as u8])),
        },
    );
    one(
        table,
        mnemonic,
        Variant {
            signature: &[Reg8],
            size: 1,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(move |ops, _| Ok(vec![r_base | ops[0] as u8])),
        },
    );
    one(
        table,
        mnemonic,
        Variant {
            signature: &[A, Raw8],
            size: 2,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(move |ops, _| Ok(vec![d8_opcode, ops[1] as u8])),
        },
    );
    one(
        table,
        mnemonic,
        Variant {
            signature: &[Raw8],
            size: 2,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(move |ops, _| Ok(vec![d8_opcode, ops[0] as u8])),
        },
    );
}

pub fn register(table: &mut InstructionTable) {
    alu_family(table, "ADD", ADD_A_R_BASE, ADD_A_D8_OPCODE);
    alu_family(table, "ADC", ADC_A_R_BASE, ADC_A_D8_OPCODE);
    alu_family(table, "SUB", SUB_A_R_BASE, SUB_A_D8_OPCODE);
    alu_family(table, "SBC", SBC_A_R_BASE, SBC_A_D8_OPCODE);
    alu_family(table, "AND", AND_A_R_BASE, AND_A_D8_OPCODE);
    alu_family(table, "XOR", XOR_A_R_BASE, XOR_A_D8_OPCODE);
    alu_family(table, "OR", OR_A_R_BASE, OR_A_D8_OPCODE);
    alu_family(table, "CP", CP_A_R_BASE, CP_A_D8_OPCODE);

    one(
        table,
        "ADD",
        Variant {
            signature: &[Hl, Reg16Sp],
            size: 1,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, _| Ok(vec![ADD_HL_RR_BASE + (ops[1] as u8) * 16])),
        },
    );

    one(
        table,
        "ADD",
        Variant {
            signature: &[Sp, Raw8],
            size: 2,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, _| Ok(vec![ADD_SP_E8_OPCODE, ops[1] as u8])),
        },
    );

    one(
        table,
        "INC",
        Variant {
            signature: &[Reg8],
            size: 1,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, _| Ok(vec![INC_R_BASE + (ops[0] as u8) * 8])),
        },
    );
    one(
        table,
        "DEC",
        Variant {
            signature: &[Reg8],
            size: 1,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, _| Ok(vec![DEC_R_BASE + (ops[0] as u8) * 8])),
        },
    );

    one(
        table,
        "INC",
        Variant {
            signature: &[Reg16Sp],
            size: 1,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, _| Ok(vec![INC_RR_BASE + (ops[0] as u8) * 16])),
        },
    );
    one(
        table,
        "DEC",
        Variant {
            signature: &[Reg16Sp],
            size: 1,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, _| Ok(vec![DEC_RR_BASE + (ops[0] as u8) * 16])),
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
    fn add_a_r8_and_implicit_accumulator_form_agree() {
        let mut table = InstructionTable::new();
        register(&mut table);
        let c = ctx();
        assert_eq!((table["ADD"][0].encode)(&[0, 2], &c).unwrap(), vec![0x82]); // ADD A, D
        assert_eq!((table["ADD"][1].encode)(&[2], &c).unwrap(), vec![0x82]); // ADD D
    }

    #[test]
    fn cp_a_d8_uses_its_fixed_opcode() {
        let mut table = InstructionTable::new();
        register(&mut table);
        let c = ctx();
        assert_eq!(
            (table["CP"][2].encode)(&[0, 0x10], &c).unwrap(),
            vec![0xFE, 0x10]
        );
    }

    #[test]
    fn inc_dec_r16_pack_the_pair_index_into_the_base() {
        let mut table = InstructionTable::new();
        register(&mut table);
        let c = ctx();
        assert_eq!((table["INC"][1].encode)(&[2], &c).unwrap(), vec![0x23]); // INC HL
        assert_eq!((table["DEC"][1].encode)(&[3], &c).unwrap(), vec![0x3B]); // DEC SP
    }
}
