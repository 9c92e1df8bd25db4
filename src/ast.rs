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

use std::rc::Rc;

/// One line of source, after comment-stripping and label/body separation but
/// before any semantic interpretation. Operand text is kept verbatim; the
/// encoder is responsible for recognizing it.
#[derive(Debug, Clone)]
pub struct SourceLine {
    pub file: Rc<str>,
    pub line_number: usize,
    /// Labels chained with `:` on this line, left to right, exactly as written.
    pub labels: Vec<String>,
    pub content: LineContent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LineContent {
    Empty,
    Instruction {
        mnemonic: String,
        operands: Vec<String>,
    },
    Directive {
        /// Upper-cased directive/macro name, without the leading `.`.
        name: String,
        /// Raw, untokenized remainder of the line after the name.
        args: String,
    },
}
