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

use crate::errors::AssemblyError;

/// 16 KiB ROM window size. Bank 0 sits at CPU `0x0000-0x3FFF`; every other
/// bank is paged into CPU `0x4000-0x7FFF`.
pub const BANK_SIZE: u32 = 0x4000;

/// Label name (already upper-cased, already rewritten for `.`-relative
/// labels) to absolute byte offset within the flat ROM image.
pub type Labels = HashMap<String, u32>;

pub fn bank_of(addr: u32) -> u32 {
    addr / BANK_SIZE
}

pub fn addr_in_bank(addr: u32) -> u32 {
    addr % BANK_SIZE
}

/// The 16-bit value the CPU bus actually sees for a ROM address once its
/// bank is paged in.
pub fn cpu_visible(addr: u32) -> u16 {
    if bank_of(addr) == 0 {
        addr as u16
    } else {
        (addr_in_bank(addr) + BANK_SIZE) as u16
    }
}

/// The outcome of resolving a raw label token written on a `label:` def.
pub struct ResolvedDef {
    /// Fully-qualified name to store in the labels map.
    pub canonical: String,
    /// Whether this def also becomes the new `last_absolute_label`.
    pub is_absolute: bool,
}

/// Canonicalizes a label token exactly as it appeared before the `:`,
/// rewriting `.sub` relative labels against `last_absolute` and rejecting
/// `$`-prefixed macro-local labels outside a macro body.
pub fn resolve_label_def(
    raw: &str,
    last_absolute: &str,
    is_inside_macro: bool,
    file: &str,
    line: usize,
) -> Result<ResolvedDef, AssemblyError> {
    let upper = raw.to_uppercase();

    if let Some(rest) = upper.strip_prefix('$') {
        if !is_inside_macro {
            return Err(AssemblyError::MacroScopeViolation {
                file: file.to_string(),
                line,
                reason: format!(
                    "macro-local label \"{}\" is only valid inside a macro body",
                    raw
                ),
            });
        }
        if rest.is_empty() {
            return Err(AssemblyError::MalformedLabel {
                file: file.to_string(),
                line,
                name: raw.to_string(),
                reason: "macro-local label has no name".to_string(),
            });
        }
        return Ok(ResolvedDef {
            canonical: upper,
            is_absolute: false,
        });
    }

    if is_inside_macro {
        return Err(AssemblyError::MacroScopeViolation {
            file: file.to_string(),
            line,
            reason: format!("label \"{}\" must be macro-local (\"$\"-prefixed) inside a macro body", raw),
        });
    }

    if let Some(rest) = upper.strip_prefix('.') {
        if last_absolute.is_empty() {
            return Err(AssemblyError::MalformedLabel {
                file: file.to_string(),
                line,
                name: raw.to_string(),
                reason: "relative label has no enclosing absolute label".to_string(),
            });
        }
        if rest.is_empty() {
            return Err(AssemblyError::MalformedLabel {
                file: file.to_string(),
                line,
                name: raw.to_string(),
                reason: "relative label has no name".to_string(),
            });
        }
        return Ok(ResolvedDef {
            canonical: format!("{}.{}", last_absolute, rest),
            is_absolute: false,
        });
    }

    if !upper.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_') {
        return Err(AssemblyError::MalformedLabel {
            file: file.to_string(),
            line,
            name: raw.to_string(),
            reason: "absolute labels must start with a letter or underscore".to_string(),
        });
    }

    Ok(ResolvedDef {
        canonical: upper,
        is_absolute: true,
    })
}

/// Canonicalizes a label *reference* (the right-hand side of `=label`) the
/// same way `resolve_label_def` does, but without mutating any scope state.
pub fn resolve_label_ref(raw: &str, last_absolute: &str) -> String {
    let upper = raw.to_uppercase();
    match upper.strip_prefix('.') {
        Some(rest) if !last_absolute.is_empty() => format!("{}.{}", last_absolute, rest),
        _ => upper,
    }
}
