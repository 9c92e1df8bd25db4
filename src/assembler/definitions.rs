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

use std::collections::HashMap;

use crate::assembler::encoder::expr::DefKind;

/// A `.DEFINE`d name's value, tagged with the operand kind that matched when
/// it was defined. The tag is fixed at definition time and never
/// re-evaluated against a later use site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Definition {
    Raw8(u8),
    Raw16(u16),
    Indirect8(u8),
    Indirect16(u16),
}

impl Definition {
    pub fn as_u32(&self) -> u32 {
        match *self {
            Definition::Raw8(v) => v as u32,
            Definition::Raw16(v) => v as u32,
            Definition::Indirect8(v) => v as u32,
            Definition::Indirect16(v) => v as u32,
        }
    }

    /// Which family a bare `$name` reference to this definition belongs to,
    /// for `expr`'s use-site compatibility check.
    pub fn kind(&self) -> DefKind {
        match *self {
            Definition::Raw8(_) | Definition::Raw16(_) => DefKind::Raw,
            Definition::Indirect8(_) | Definition::Indirect16(_) => DefKind::Indirect,
        }
    }
}

pub type Definitions = HashMap<String, Definition>;
