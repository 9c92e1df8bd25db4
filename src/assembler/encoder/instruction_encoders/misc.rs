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
use crate::assembler::encoder::{InstructionTable, Variant};

fn no_operand(opcode: u8) -> Variant {
    Variant {
        signature: &[],
        size: 1,
        wildcard: false,
        macro_forbidden: false,
        labels_before_only: false,
        skip_first_pass: false,
        encode: Box::new(move |_, _| Ok(vec![opcode])),
    }
}

fn stop() -> Variant {
    Variant {
        signature: &[],
        size: 2,
        wildcard: false,
        macro_forbidden: false,
        labels_before_only: false,
        skip_first_pass: false,
        encode: Box::new(|_, _| Ok(vec![STOP_OPCODE, 0x00])),
    }
}

pub fn register(table: &mut InstructionTable) {
    one(table, "NOP", no_operand(NOP_OPCODE));
    one(table, "HALT", no_operand(HALT_OPCODE));
    one(table, "STOP", stop());
    one(table, "DI", no_operand(DI_OPCODE));
    one(table, "EI", no_operand(EI_OPCODE));
    one(table, "DBG", no_operand(DBG_OPCODE));
    one(table, "RLCA", no_operand(RLCA_OPCODE));
    one(table, "RRCA", no_operand(RRCA_OPCODE));
    one(table, "RLA", no_operand(RLA_OPCODE));
    one(table, "RRA", no_operand(RRA_OPCODE));
    one(table, "DAA", no_operand(DAA_OPCODE));
    one(table, "CPL", no_operand(CPL_OPCODE));
    one(table, "SCF", no_operand(SCF_OPCODE));
    one(table, "CCF", no_operand(CCF_OPCODE));
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
    fn nop_and_halt_are_single_fixed_bytes() {
        let mut table = InstructionTable::new();
        register(&mut table);
        let c = ctx();
        assert_eq!((table["NOP"][0].encode)(&[], &c).unwrap(), vec![0x00]);
        assert_eq!((table["HALT"][0].encode)(&[], &c).unwrap(), vec![0x76]);
        assert_eq!((table["DBG"][0].encode)(&[], &c).unwrap(), vec![0xD3]);
    }

    #[test]
    fn stop_is_followed_by_a_padding_byte() {
        let mut table = InstructionTable::new();
        register(&mut table);
        let c = ctx();
        assert_eq!((table["STOP"][0].encode)(&[], &c).unwrap(), vec![0x10, 0x00]);
        assert_eq!(table["STOP"][0].size, 2);
    }
}
