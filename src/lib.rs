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

pub mod assembler;
pub mod ast;
pub mod errors;
pub mod file_reader;
pub mod parser;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use file_reader::FileReader;

extern crate pest;
extern crate pest_derive;

/// Assembles `source_path` (and anything it `.INCLUDE`s) into a flat ROM
/// image plus the final label table, for a caller that wants symbol
/// information alongside the bytes (e.g. a `.sym` dump).
pub fn assemble_with_labels<F: FileReader>(
    source_path: &Path,
    reader: &F,
) -> Result<assembler::AssembleOutput> {
    let mut include_stack: HashSet<PathBuf> = HashSet::new();
    let lines = parser::parse_source_recursive(source_path, &mut include_stack, reader)
        .context("failed during parsing")?;

    let output = assembler::assemble(&lines).context("failed during assembly")?;

    Ok(output)
}

/// Assembles `source_path` into a flat ROM image.
pub fn assemble<F: FileReader>(source_path: &Path, reader: &F) -> Result<Vec<u8>> {
    Ok(assemble_with_labels(source_path, reader)?.rom)
}
