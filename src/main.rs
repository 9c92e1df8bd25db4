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

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use lr35902asm::assemble_with_labels;
use lr35902asm::file_reader::AsmFileReader;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(ClapParser)]
#[clap(version = "0.1.0", author = "Connor Nolan")]
struct Opts {
    /// Source file to assemble. `.INCLUDE`d files are resolved relative to
    /// whichever file names them.
    #[clap(short, long)]
    input: PathBuf,
    /// Where to write the assembled ROM image.
    #[clap(short, long)]
    output: PathBuf,
    /// Also write a `.sym` file next to `output` mapping every label to its
    /// flat ROM offset, sorted by address.
    #[clap(short, long)]
    symbols: bool,
}

fn main() -> Result<()> {
    let opts: Opts = Opts::parse();
    let reader = AsmFileReader;
    let input_path: &Path = Path::new(&opts.input);

    let result = assemble_with_labels(input_path, &reader)?;

    fs::write(&opts.output, &result.rom)
        .with_context(|| format!("failed to write {}", opts.output.display()))?;

    if opts.symbols {
        let sym_path = opts.output.with_extension("sym");
        let by_address: BTreeMap<u32, String> = result
            .labels
            .into_iter()
            .map(|(name, addr)| (addr, name))
            .collect();
        let json = serde_json::to_string_pretty(&by_address)
            .context("failed to serialize the symbol table")?;
        fs::write(&sym_path, json).with_context(|| format!("failed to write {}", sym_path.display()))?;
    }

    println!(
        "Assembled {} to {} ({} bytes)",
        opts.input.display(),
        opts.output.display(),
        result.rom.len()
    );

    Ok(())
}
