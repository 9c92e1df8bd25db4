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

//! Sharp LR35902 opcode constants. Bit-packed families (register-to-register
//! loads, ALU-to-accumulator ops, the whole `0xCB`-prefixed rotate/shift/bit
//! table) are expressed as a base opcode plus the recognizer's register
//! code, not individually enumerated.

pub const NOP_OPCODE: u8 = 0x00;
pub const STOP_OPCODE: u8 = 0x10;
pub const HALT_OPCODE: u8 = 0x76;
pub const DI_OPCODE: u8 = 0xF3;
pub const EI_OPCODE: u8 = 0xFB;
/// Implementation-defined trap opcode: unused in the real ISA, reserved here
/// as a debugger breakpoint trap.
pub const DBG_OPCODE: u8 = 0xD3;

pub const RLCA_OPCODE: u8 = 0x07;
pub const RRCA_OPCODE: u8 = 0x0F;
pub const RLA_OPCODE: u8 = 0x17;
pub const RRA_OPCODE: u8 = 0x1F;
pub const DAA_OPCODE: u8 = 0x27;
pub const CPL_OPCODE: u8 = 0x2F;
pub const SCF_OPCODE: u8 = 0x37;
pub const CCF_OPCODE: u8 = 0x3F;

pub const RET_OPCODE: u8 = 0xC9;
pub const RETI_OPCODE: u8 = 0xD9;
pub const JP_HL_OPCODE: u8 = 0xE9;
pub const LD_SP_HL_OPCODE: u8 = 0xF9;

/// `LD r8, r8'`: `01 ddd sss`.
pub const LD_R_R_BASE: u8 = 0x40;
/// `LD r8, d8`: `00 ddd 110`.
pub const LD_R_D8_BASE: u8 = 0x06;
/// `LD r16, d16`: `00 dd0 001`.
pub const LD_RR_D16_BASE: u8 = 0x01;
/// `INC r16` / `DEC r16`: `00 dd0 011` / `00 dd1 011`.
pub const INC_RR_BASE: u8 = 0x03;
pub const DEC_RR_BASE: u8 = 0x0B;
/// `ADD HL, r16`: `00 ss1 001`.
pub const ADD_HL_RR_BASE: u8 = 0x09;
/// `INC r8` / `DEC r8`: `00 ddd 100` / `00 ddd 101`.
pub const INC_R_BASE: u8 = 0x04;
pub const DEC_R_BASE: u8 = 0x05;
/// `LD (r16), A` / `LD A, (r16)` for BC/DE/HL+/HL-: `00 rr0 010` / `00 rr1 010`.
pub const ST_INDIRECT_BASE: u8 = 0x02;
pub const LD_INDIRECT_BASE: u8 = 0x0A;
/// `PUSH r16` / `POP r16`: `11 qq0 101` / `11 qq0 001`.
pub const PUSH_BASE: u8 = 0xC5;
pub const POP_BASE: u8 = 0xC1;
/// `JR cc, e8`: `001 cc 000`.
pub const JR_COND_BASE: u8 = 0x20;
pub const JR_OPCODE: u8 = 0x18;
/// `RET cc`: `110 cc 000`.
pub const RET_COND_BASE: u8 = 0xC0;
/// `JP cc, a16`: `110 cc 010`.
pub const JP_COND_BASE: u8 = 0xC2;
pub const JP_OPCODE: u8 = 0xC3;
/// `CALL cc, a16`: `110 cc 100`.
pub const CALL_COND_BASE: u8 = 0xC4;
pub const CALL_OPCODE: u8 = 0xCD;
/// `RST n`: `11 nnn 111`.
pub const RST_BASE: u8 = 0xC7;

/// ALU-with-accumulator family `op A, r8`: `10 ooo sss`, one base per `ooo`.
pub const ADD_A_R_BASE: u8 = 0x80;
pub const ADC_A_R_BASE: u8 = 0x88;
pub const SUB_A_R_BASE: u8 = 0x90;
pub const SBC_A_R_BASE: u8 = 0x98;
pub const AND_A_R_BASE: u8 = 0xA0;
pub const XOR_A_R_BASE: u8 = 0xA8;
pub const OR_A_R_BASE: u8 = 0xB0;
pub const CP_A_R_BASE: u8 = 0xB8;

/// ALU-with-immediate family `op A, d8`: one fixed opcode per operation.
pub const ADD_A_D8_OPCODE: u8 = 0xC6;
pub const ADC_A_D8_OPCODE: u8 = 0xCE;
pub const SUB_A_D8_OPCODE: u8 = 0xD6;
pub const SBC_A_D8_OPCODE: u8 = 0xDE;
pub const AND_A_D8_OPCODE: u8 = 0xE6;
pub const XOR_A_D8_OPCODE: u8 = 0xEE;
pub const OR_A_D8_OPCODE: u8 = 0xF6;
pub const CP_A_D8_OPCODE: u8 = 0xFE;

pub const ADD_SP_E8_OPCODE: u8 = 0xE8;
pub const LD_HL_SP_E8_OPCODE: u8 = 0xF8;

pub const LD_A_ABS_OPCODE: u8 = 0xFA;
pub const ST_A_ABS_OPCODE: u8 = 0xEA;
pub const LDH_A_C_OPCODE: u8 = 0xF2;
pub const LDH_C_A_OPCODE: u8 = 0xE2;
pub const LDH_A_N_OPCODE: u8 = 0xF0;
pub const LDH_N_A_OPCODE: u8 = 0xE0;
pub const LD_ABS_SP_OPCODE: u8 = 0x08;

pub const CB_PREFIX: u8 = 0xCB;
/// `CB`-prefixed family `op r8`: `00 ooo sss`, one base per rotate/shift op.
pub const RLC_R_BASE: u8 = 0x00;
pub const RRC_R_BASE: u8 = 0x08;
pub const RL_R_BASE: u8 = 0x10;
pub const RR_R_BASE: u8 = 0x18;
pub const SLA_R_BASE: u8 = 0x20;
pub const SRA_R_BASE: u8 = 0x28;
pub const SWAP_R_BASE: u8 = 0x30;
pub const SRL_R_BASE: u8 = 0x38;
/// `CB`-prefixed `BIT`/`RES`/`SET b, r8`: `01 bbb sss` / `10 bbb sss` / `11 bbb sss`.
pub const BIT_R_BASE: u8 = 0x40;
pub const RES_R_BASE: u8 = 0x80;
pub const SET_R_BASE: u8 = 0xC0;
