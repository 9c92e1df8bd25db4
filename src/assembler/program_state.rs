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

use crate::assembler::definitions::Definitions;
use crate::assembler::symbol_table::Labels;

/// Everything that changes as the two passes walk the flattened line list.
/// The driver owns one mutable instance through pass 1; pass 2 runs over a
/// clone seeded with pass 1's finished label map (definitions are
/// recomputed from scratch in pass 2 since they can reference labels whose
/// addresses are only final by then). A macro expansion forks its own
/// child `ProgramState` and discards it on return.
#[derive(Clone, Default)]
pub struct ProgramState {
    pub labels: Labels,
    pub definitions: Definitions,
    pub is_inside_macro: bool,
    /// Most recently defined absolute (non-relative, non-macro-local) label,
    /// used to expand `.sub`-style relative label references.
    pub last_absolute_label: String,
}

impl ProgramState {
    pub fn new() -> Self {
        Self::default()
    }
}
