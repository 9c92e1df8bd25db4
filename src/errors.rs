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

use thiserror::Error;

/// The error taxonomy for the assembler core. Every variant (other than the
/// syntax-level `PestError`) carries the file and line it was raised on so
/// the caller can render a `file:line: message` diagnostic.
#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("{0}")]
    PestError(#[from] Box<pest::error::Error<crate::parser::Rule>>),

    #[error("{file}:{line}: unknown mnemonic or directive \"{name}\"")]
    UnknownMnemonic {
        file: String,
        line: usize,
        name: String,
    },

    #[error("{file}:{line}: no encoding of \"{mnemonic}\" accepts the given operands ({})", .reasons.join("; "))]
    OperandMismatch {
        file: String,
        line: usize,
        mnemonic: String,
        reasons: Vec<String>,
    },

    #[error("{file}:{line}: undefined symbol \"{name}\"")]
    UndefinedSymbol {
        file: String,
        line: usize,
        name: String,
    },

    #[error("{file}:{line}: duplicate label definition \"{name}\"")]
    DuplicateLabel {
        file: String,
        line: usize,
        name: String,
    },

    #[error("{file}:{line}: malformed label \"{name}\": {reason}")]
    MalformedLabel {
        file: String,
        line: usize,
        name: String,
        reason: String,
    },

    #[error("{file}:{line}: relative jump out of range ({offset} bytes)")]
    RelativeJumpOutOfRange {
        file: String,
        line: usize,
        offset: i32,
    },

    #[error("{file}:{line}: value 0x{value:x} does not fit in {width}")]
    WidthOverflow {
        file: String,
        line: usize,
        value: i64,
        width: &'static str,
    },

    #[error("{file}:{line}: cross-bank arithmetic: {reason}")]
    CrossBankArithmetic {
        file: String,
        line: usize,
        reason: String,
    },

    #[error("{file}:{line}: {reason}")]
    MacroScopeViolation {
        file: String,
        line: usize,
        reason: String,
    },

    #[error("{file}:{line}: macro \"{name}\" is already defined")]
    MacroRedefinition {
        file: String,
        line: usize,
        name: String,
    },

    #[error("{file}:{line}: {reason}")]
    DirectiveMisuse {
        file: String,
        line: usize,
        reason: String,
    },

    #[error("{file}:{line}: failed to include \"{path}\": {reason}")]
    IncludeIOError {
        file: String,
        line: usize,
        path: String,
        reason: String,
    },

    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}

impl AssemblyError {
    pub fn file(&self) -> Option<&str> {
        match self {
            AssemblyError::PestError(_) | AssemblyError::InternalInvariant(_) => None,
            AssemblyError::UnknownMnemonic { file, .. }
            | AssemblyError::OperandMismatch { file, .. }
            | AssemblyError::UndefinedSymbol { file, .. }
            | AssemblyError::DuplicateLabel { file, .. }
            | AssemblyError::MalformedLabel { file, .. }
            | AssemblyError::RelativeJumpOutOfRange { file, .. }
            | AssemblyError::WidthOverflow { file, .. }
            | AssemblyError::CrossBankArithmetic { file, .. }
            | AssemblyError::MacroScopeViolation { file, .. }
            | AssemblyError::MacroRedefinition { file, .. }
            | AssemblyError::DirectiveMisuse { file, .. }
            | AssemblyError::IncludeIOError { file, .. } => Some(file),
        }
    }
}
