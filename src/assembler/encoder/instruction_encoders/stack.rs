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

pub fn register(table: &mut InstructionTable) {
    one(
        table,
        "PUSH",
        Variant {
            signature: &[Reg16Af],
            size: 1,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, _| Ok(vec![PUSH_BASE + (ops[0] as u8) * 16])),
        },
    );
    one(
        table,
        "POP",
        Variant {
            signature: &[Reg16Af],
            size: 1,
            wildcard: false,
            macro_forbidden: false,
            labels_before_only: false,
            skip_first_pass: false,
            encode: Box::new(|ops, _| Ok(vec![POP_BASE + (ops[0] as u8) * 16])),
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
    fn push_and_pop_pack_the_pair_index_into_the_base() {
        let mut table = InstructionTable::new();
        register(&mut table);
        let c = ctx();
        assert_eq!((table["PUSH"][0].encode)(&[3], &c).unwrap(), vec![0xF5]); // PUSH AF
        assert_eq!((table["POP"][0].encode)(&[2], &c).unwrap(), vec![0xE1]); // POP HL
    }
}
