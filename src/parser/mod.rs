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

pub mod ast_builder;

use crate::ast::{LineContent, SourceLine};
use crate::errors::AssemblyError;
use crate::file_reader::FileReader;
use pest_derive::Parser;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

// Derive the parser from our grammar file. One `line` rule covers a single
// physical source line; the whole-file walk (comment stripping, `.INCLUDE`
// splicing, macro-body recognition) lives in `parse_source_recursive` below,
// since it needs state (the include stack) the grammar can't carry.
#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct AsmParser;

/// Reads `path`, splices in any `.INCLUDE`d files at their point of
/// reference, and returns the flattened, per-line-parsed source. Detects
/// include cycles via `include_stack`.
pub fn parse_source_recursive<F: FileReader>(
    path: &Path,
    include_stack: &mut HashSet<PathBuf>,
    reader: &F,
) -> Result<Vec<SourceLine>, AssemblyError> {
    if !include_stack.insert(path.to_path_buf()) {
        return Err(AssemblyError::IncludeIOError {
            file: path.display().to_string(),
            line: 0,
            path: path.display().to_string(),
            reason: "include cycle detected".to_string(),
        });
    }

    let source = reader
        .read_to_string(path)
        .map_err(|e| AssemblyError::IncludeIOError {
            file: path.display().to_string(),
            line: 0,
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    let file: Rc<str> = Rc::from(path.display().to_string());
    let mut out = Vec::new();
    let mut in_macro_body = false;

    for (idx, raw_line) in source.lines().enumerate() {
        let line_number = idx + 1;
        let stripped = strip_comment(raw_line);
        let (labels, content) = ast_builder::parse_line_body(&file, stripped)?;
        let parsed = SourceLine {
            file: file.clone(),
            line_number,
            labels,
            content,
        };

        if in_macro_body {
            if let LineContent::Directive { name, .. } = &parsed.content {
                if name == "INCLUDE" {
                    return Err(AssemblyError::DirectiveMisuse {
                        file: file.to_string(),
                        line: line_number,
                        reason: ".INCLUDE is not allowed inside a macro body".to_string(),
                    });
                }
                if name == "END" {
                    in_macro_body = false;
                }
            }
            out.push(parsed);
            continue;
        }

        if let LineContent::Directive { name, .. } = &parsed.content {
            if name == "MACRODEF" {
                in_macro_body = true;
                out.push(parsed);
                continue;
            }
        }

        if let LineContent::Directive { name, args } = &parsed.content {
            if name == "INCLUDE" {
                let include_rel = parse_quoted_path(args).ok_or_else(|| {
                    AssemblyError::DirectiveMisuse {
                        file: file.to_string(),
                        line: line_number,
                        reason: ".INCLUDE expects a double-quoted path".to_string(),
                    }
                })?;
                let resolved = resolve_include_path(path, &include_rel);
                let nested = parse_source_recursive(&resolved, include_stack, reader).map_err(
                    |e| match e {
                        AssemblyError::IncludeIOError { path, reason, .. } => {
                            AssemblyError::IncludeIOError {
                                file: file.to_string(),
                                line: line_number,
                                path,
                                reason,
                            }
                        }
                        other => other,
                    },
                )?;
                out.extend(nested);
                continue;
            }
        }

        out.push(parsed);
    }

    include_stack.remove(path);
    Ok(out)
}

/// Strips a `;` end-of-line comment. `;` has no quoting mechanism in this
/// source language, so the first occurrence always wins.
fn strip_comment(line: &str) -> &str {
    match line.find(';') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn parse_quoted_path(args: &str) -> Option<String> {
    let trimmed = args.trim();
    let inner = trimmed.strip_prefix('"')?.strip_suffix('"')?;
    Some(inner.to_string())
}

fn resolve_include_path(including_file: &Path, include_path: &str) -> PathBuf {
    let candidate = PathBuf::from(include_path);
    if candidate.is_absolute() {
        return candidate;
    }
    match including_file.parent() {
        Some(dir) => dir.join(candidate),
        None => candidate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_reader::MockFileReader;

    #[test]
    fn splits_chained_labels_from_an_instruction() {
        let mut reader = MockFileReader::default();
        reader.add_file("main.asm", "foo: bar: LD A, 1\n");
        let mut stack = HashSet::new();
        let lines = parse_source_recursive(Path::new("main.asm"), &mut stack, &reader).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].labels, vec!["foo", "bar"]);
        assert_eq!(
            lines[0].content,
            LineContent::Instruction {
                mnemonic: "LD".to_string(),
                operands: vec!["A".to_string(), "1".to_string()],
            }
        );
    }

    #[test]
    fn strips_comments_before_parsing() {
        let mut reader = MockFileReader::default();
        reader.add_file("main.asm", "NOP ; a trailing comment\n");
        let mut stack = HashSet::new();
        let lines = parse_source_recursive(Path::new("main.asm"), &mut stack, &reader).unwrap();
        assert_eq!(
            lines[0].content,
            LineContent::Instruction {
                mnemonic: "NOP".to_string(),
                operands: vec![],
            }
        );
    }

    #[test]
    fn splices_includes_in_place() {
        let mut reader = MockFileReader::default();
        reader.add_file("main.asm", "NOP\n.INCLUDE \"child.asm\"\nHALT\n");
        reader.add_file("child.asm", "STOP\n");
        let mut stack = HashSet::new();
        let lines = parse_source_recursive(Path::new("main.asm"), &mut stack, &reader).unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1].content,
            LineContent::Instruction {
                mnemonic: "STOP".to_string(),
                operands: vec![],
            }
        );
    }

    #[test]
    fn detects_include_cycles() {
        let mut reader = MockFileReader::default();
        reader.add_file("a.asm", ".INCLUDE \"b.asm\"\n");
        reader.add_file("b.asm", ".INCLUDE \"a.asm\"\n");
        let mut stack = HashSet::new();
        let result = parse_source_recursive(Path::new("a.asm"), &mut stack, &reader);
        assert!(matches!(result, Err(AssemblyError::IncludeIOError { .. })));
    }

    #[test]
    fn captures_macro_body_between_macrodef_and_end() {
        let mut reader = MockFileReader::default();
        reader.add_file(
            "main.asm",
            ".MACRODEF PUSH_ZERO\nLD A, 0\n.END\n.PUSH_ZERO\n",
        );
        let mut stack = HashSet::new();
        let lines = parse_source_recursive(Path::new("main.asm"), &mut stack, &reader).unwrap();
        assert_eq!(lines.len(), 4);
        assert!(matches!(
            &lines[0].content,
            LineContent::Directive { name, .. } if name == "MACRODEF"
        ));
        assert!(matches!(
            &lines[2].content,
            LineContent::Directive { name, .. } if name == "END"
        ));
    }
}
