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

pub mod arithmetic;
pub mod bitwise;
pub mod control_flow;
pub mod load_store;
pub mod misc;
pub mod stack;

use crate::assembler::encoder::{InstructionTable, Variant};

/// Registers one fixed-signature variant under `mnemonic`.
fn one(table: &mut InstructionTable, mnemonic: &'static str, variant: Variant) {
    table.entry(mnemonic).or_default().push(variant);
}

pub(super) use one;
