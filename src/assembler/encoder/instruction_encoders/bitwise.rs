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

//! The `0xCB`-prefixed rotate/shift/bit-test/bit-set family. Every one of
//! these instructions is two bytes: the `CB` prefix followed by a byte built
//! from a base plus the operand register code(s).

use super::one;
use crate::assembler::encoder::constants::*;
use crate::assembler::encoder::operand_kinds::OperandKind::*;
use crate::assembler::encoder::{InstructionTable, Variant};

fn rotate_shift(table: &mut InstructionTable, mnemonic: &'static str, base: u8) {
    one(
        table,
        mnemonic,
        Variant {
            signature: &[Reg8],
            size: 2,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(move |ops, _| Ok(vec![CB_PREFIX, base | ops[0] as u8])),
        },
    );
}

pub fn register(table: &mut InstructionTable) {
    rotate_shift(table, "RLC", RLC_R_BASE);
    rotate_shift(table, "RRC", RRC_R_BASE);
    rotate_shift(table, "RL", RL_R_BASE);
    rotate_shift(table, "RR", RR_R_BASE);
    rotate_shift(table, "SLA", SLA_R_BASE);
    rotate_shift(table, "SRA", SRA_R_BASE);
    rotate_shift(table, "SWAP", SWAP_R_BASE);
    rotate_shift(table, "SRL", SRL_R_BASE);

    one(
        table,
        "BIT",
        Variant {
            signature: &[BitOrdinal, Reg8],
            size: 2,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, _| {
                Ok(vec![CB_PREFIX, BIT_R_BASE | (ops[0] as u8) << 3 | ops[1] as u8])
            }),
        },
    );
    one(
        table,
        "RES",
        Variant {
            signature: &[BitOrdinal, Reg8],
            size: 2,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, _| {
                Ok(vec![CB_PREFIX, RES_R_BASE | (ops[0] as u8) << 3 | ops[1] as u8])
            }),
        },
    );
    one(
        table,
        "SET",
        Variant {
            signature: &[BitOrdinal, Reg8],
            size: 2,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, _| {
                Ok(vec![CB_PREFIX, SET_R_BASE | (ops[0] as u8) << 3 | ops[1] as u8])
            }),
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
    fn swap_is_cb_prefixed_with_the_register_code_in_the_low_bits() {
        let mut table = InstructionTable::new();
        register(&mut table);
        assert_eq!(
            (table["SWAP"][0].encode)(&[7], &ctx()).unwrap(),
            vec![0xCB, 0x37]
        ); // SWAP A
    }

    #[test]
    fn bit_packs_the_ordinal_and_register_into_the_second_byte() {
        let mut table = InstructionTable::new();
        register(&mut table);
        assert_eq!(
            (table["BIT"][0].encode)(&[3, 6], &ctx()).unwrap(),
            vec![0xCB, 0x5E]
        ); // BIT 3, (HL)
    }

    #[test]
    fn set_and_res_diverge_only_in_their_base() {
        let mut table = InstructionTable::new();
        register(&mut table);
        assert_eq!(
            (table["SET"][0].encode)(&[0, 0], &ctx()).unwrap(),
            vec![0xCB, 0xC0]
        );
        assert_eq!(
            (table["RES"][0].encode)(&[0, 0], &ctx()).unwrap(),
            vec![0xCB, 0x80]
        );
    }
}
