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

pub mod definitions;
mod directives;
pub mod encoder;
pub mod macro_table;
pub mod program_state;
pub mod symbol_table;

use crate::ast::{LineContent, SourceLine};
use crate::errors::AssemblyError;
use crate::parser::ast_builder::tokenize_operands;
use definitions::Definitions;
use encoder::expr::EvalCtx;
use encoder::operand_kinds::RecognizeCtx;
use encoder::{EncodeCtx, InstructionTable, Pass, VariantSelectInput};
use macro_table::{parse_macro_params, MacroDef, MacroParam, MacroTable};
use program_state::ProgramState;
use symbol_table::Labels;

pub struct AssembleOutput {
    pub rom: Vec<u8>,
    pub labels: Labels,
}

/// Runs both passes over `lines` and returns the finished ROM image plus
/// its final label table (handy for a symbol-file dump).
pub fn assemble(lines: &[SourceLine]) -> Result<AssembleOutput, AssemblyError> {
    let table = encoder::build_instruction_table();
    let mut macros = MacroTable::new();
    let executable = extract_macros(lines, &mut macros)?;

    let mut pass1 = ProgramState::new();
    run_pass(Pass::One, &executable, &table, &macros, &mut pass1, &mut None, 0)?;

    let mut pass2 = ProgramState {
        labels: pass1.labels.clone(),
        definitions: Definitions::new(),
        is_inside_macro: false,
        last_absolute_label: String::new(),
    };
    let mut rom = Vec::new();
    run_pass(Pass::Two, &executable, &table, &macros, &mut pass2, &mut Some(&mut rom), 0)?;

    Ok(AssembleOutput {
        rom,
        labels: pass1.labels,
    })
}

/// Pulls every `.MACRODEF ... .END` range out of `lines`, registering each
/// as a `MacroDef` and leaving a flat executable line list behind with no
/// trace of the definitions (their bodies are only ever assembled at an
/// invocation site, under `expand_macro`).
fn extract_macros(lines: &[SourceLine], macros: &mut MacroTable) -> Result<Vec<SourceLine>, AssemblyError> {
    let mut executable = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        if let LineContent::Directive { name, args } = &lines[i].content {
            if name == "MACRODEF" {
                let tokens = tokenize_operands(args);
                let macro_name = tokens.first().ok_or_else(|| AssemblyError::DirectiveMisuse {
                    file: lines[i].file.to_string(),
                    line: lines[i].line_number,
                    reason: ".MACRODEF requires a name".to_string(),
                })?;
                let macro_name = macro_name.to_uppercase();
                if macros.contains_key(&macro_name) {
                    return Err(AssemblyError::MacroRedefinition {
                        file: lines[i].file.to_string(),
                        line: lines[i].line_number,
                        name: macro_name,
                    });
                }
                let params = parse_macro_params(&tokens[1..]);

                let body_start = i + 1;
                let mut end = body_start;
                while end < lines.len() {
                    if let LineContent::Directive { name, .. } = &lines[end].content {
                        if name == "END" {
                            break;
                        }
                    }
                    end += 1;
                }
                if end == lines.len() {
                    return Err(AssemblyError::DirectiveMisuse {
                        file: lines[i].file.to_string(),
                        line: lines[i].line_number,
                        reason: ".MACRODEF has no matching .END".to_string(),
                    });
                }

                macros.insert(
                    macro_name.clone(),
                    MacroDef {
                        name: macro_name,
                        params,
                        body: lines[body_start..end].to_vec(),
                    },
                );
                i = end + 1;
                continue;
            }
        }
        executable.push(lines[i].clone());
        i += 1;
    }
    Ok(executable)
}

/// Walks `lines` once, advancing `address` by every instruction's or
/// directive's size. `rom` is `None` during pass 1 (sizes only, no bytes
/// yet) and `Some` during pass 2, when bytes are actually appended.
/// Walks `lines` once, starting its address counter at `start_address`, and
/// returns the address just past the last line. A macro's probe and emit
/// sub-assemblies both start at the call site's address rather than 0, so
/// that a macro-local label lands at the same call-site-absolute offset in
/// both stages.
fn run_pass(
    pass: Pass,
    lines: &[SourceLine],
    table: &InstructionTable,
    macros: &MacroTable,
    state: &mut ProgramState,
    rom: &mut Option<&mut Vec<u8>>,
    start_address: u32,
) -> Result<u32, AssemblyError> {
    let mut address = start_address;
    for line in lines {
        handle_labels(pass, line, state, address)?;
        address += dispatch_content(pass, line, table, macros, state, rom, address)?;
    }
    Ok(address)
}

fn handle_labels(
    pass: Pass,
    line: &SourceLine,
    state: &mut ProgramState,
    address: u32,
) -> Result<(), AssemblyError> {
    for raw in &line.labels {
        let resolved = symbol_table::resolve_label_def(
            raw,
            &state.last_absolute_label,
            state.is_inside_macro,
            &line.file,
            line.line_number,
        )?;
        if pass == Pass::One {
            if state.labels.contains_key(&resolved.canonical) {
                return Err(AssemblyError::DuplicateLabel {
                    file: line.file.to_string(),
                    line: line.line_number,
                    name: resolved.canonical,
                });
            }
            state.labels.insert(resolved.canonical.clone(), address);
        }
        if resolved.is_absolute {
            state.last_absolute_label = resolved.canonical;
        }
    }
    Ok(())
}

fn dispatch_content(
    pass: Pass,
    line: &SourceLine,
    table: &InstructionTable,
    macros: &MacroTable,
    state: &mut ProgramState,
    rom: &mut Option<&mut Vec<u8>>,
    address: u32,
) -> Result<u32, AssemblyError> {
    match &line.content {
        LineContent::Empty => Ok(0),
        LineContent::Instruction { mnemonic, operands } => {
            dispatch_instruction(pass, line, mnemonic, operands, table, state, rom, address)
        }
        LineContent::Directive { name, args } => {
            dispatch_directive(pass, line, name, args, table, macros, state, rom, address)
        }
    }
}

fn dispatch_instruction(
    pass: Pass,
    line: &SourceLine,
    mnemonic: &str,
    operands: &[String],
    table: &InstructionTable,
    state: &mut ProgramState,
    rom: &mut Option<&mut Vec<u8>>,
    address: u32,
) -> Result<u32, AssemblyError> {
    let variants = table.get(mnemonic).ok_or_else(|| AssemblyError::UnknownMnemonic {
        file: line.file.to_string(),
        line: line.line_number,
        name: mnemonic.to_string(),
    })?;

    let full_labels = if pass == Pass::Two { Some(&state.labels) } else { None };
    let input = VariantSelectInput {
        full_labels,
        before_only_labels: Some(&state.labels),
        defs: &state.definitions,
        last_absolute_label: &state.last_absolute_label,
        file: &line.file,
        line: line.line_number,
        is_inside_macro: state.is_inside_macro,
        pass,
    };
    let (variant, resolved) = encoder::select_variant(variants, mnemonic, operands, &input)?;

    if let Some(bytes_out) = rom {
        let ctx = EncodeCtx {
            next_address: address + variant.size as u32,
            file: &line.file,
            line: line.line_number,
        };
        let bytes = (variant.encode)(&resolved, &ctx)?;
        bytes_out.extend(bytes);
    }
    Ok(variant.size as u32)
}

fn dispatch_directive(
    pass: Pass,
    line: &SourceLine,
    name: &str,
    args: &str,
    table: &InstructionTable,
    macros: &MacroTable,
    state: &mut ProgramState,
    rom: &mut Option<&mut Vec<u8>>,
    address: u32,
) -> Result<u32, AssemblyError> {
    let recognize_ctx = RecognizeCtx {
        eval: EvalCtx {
            labels: Some(&state.labels),
            defs: &state.definitions,
            last_absolute_label: &state.last_absolute_label,
        },
        file: &line.file,
        line: line.line_number,
    };

    match name {
        "DEFINE" => {
            if state.is_inside_macro {
                return Err(AssemblyError::DirectiveMisuse {
                    file: line.file.to_string(),
                    line: line.line_number,
                    reason: ".DEFINE is not allowed inside a macro body".to_string(),
                });
            }
            let def = directives::define(&recognize_ctx, &line.file, line.line_number, args)?;
            let define_name = tokenize_operands(args)
                .first()
                .cloned()
                .unwrap_or_default()
                .to_uppercase();
            state.definitions.insert(define_name, def);
            Ok(0)
        }
        "DB" => {
            let effect = directives::db(&recognize_ctx, &line.file, line.line_number, args)?;
            if let Some(bytes_out) = rom {
                bytes_out.extend(effect.bytes.unwrap_or_default());
            }
            Ok(effect.size as u32)
        }
        "PADTO" => {
            let target_text = tokenize_operands(args).into_iter().next().unwrap_or_default();
            let is_macro_local = target_text.starts_with("=$");
            if !is_macro_local && state.is_inside_macro {
                return Err(AssemblyError::DirectiveMisuse {
                    file: line.file.to_string(),
                    line: line.line_number,
                    reason: ".PADTO is only allowed inside a macro body with a macro-local (=$label) target"
                        .to_string(),
                });
            }
            let effect = directives::padto(&recognize_ctx.eval, &line.file, line.line_number, args, address)?;
            if let Some(bytes_out) = rom {
                bytes_out.extend(effect.bytes.unwrap_or_default());
            }
            Ok(effect.size as u32)
        }
        _ => {
            let macro_def = macros.get(name).ok_or_else(|| AssemblyError::UnknownMnemonic {
                file: line.file.to_string(),
                line: line.line_number,
                name: name.to_string(),
            })?;
            expand_macro(pass, line, macro_def, args, table, macros, state, rom, address)
        }
    }
}

/// Expands a macro invocation. A pass-1-shaped sub-assembly always runs
/// first, over the captured body, seeded with the call-site argument
/// bindings, so this invocation's macro-local labels are sized and placed
/// at this address; when the outer pass is `Pass::Two`, a second,
/// pass-2-shaped sub-assembly then runs to actually emit bytes, now that
/// those macro-local labels are known.
fn expand_macro(
    pass: Pass,
    line: &SourceLine,
    macro_def: &MacroDef,
    args: &str,
    table: &InstructionTable,
    macros: &MacroTable,
    state: &mut ProgramState,
    rom: &mut Option<&mut Vec<u8>>,
    address: u32,
) -> Result<u32, AssemblyError> {
    let call_args = tokenize_operands(args);
    if call_args.len() != macro_def.params.len() {
        return Err(AssemblyError::MacroScopeViolation {
            file: line.file.to_string(),
            line: line.line_number,
            reason: format!(
                "macro \"{}\" expects {} argument(s), got {}",
                macro_def.name,
                macro_def.params.len(),
                call_args.len()
            ),
        });
    }

    let mut probe_state = ProgramState {
        labels: Labels::new(),
        definitions: Definitions::new(),
        is_inside_macro: true,
        last_absolute_label: state.last_absolute_label.clone(),
    };
    bind_macro_args(&recognize_ctx_for(&*state, &line.file, line.line_number), macro_def, &call_args, &mut probe_state, line)?;
    let probe_end = {
        let mut none: Option<&mut Vec<u8>> = None;
        run_pass(Pass::One, &macro_def.body, table, macros, &mut probe_state, &mut none, address)?
    };
    let probe_size = probe_end - address;

    if pass == Pass::One {
        return Ok(probe_size);
    }

    let mut emit_state = ProgramState {
        labels: probe_state.labels,
        definitions: Definitions::new(),
        is_inside_macro: true,
        last_absolute_label: state.last_absolute_label.clone(),
    };
    bind_macro_args(&recognize_ctx_for(&*state, &line.file, line.line_number), macro_def, &call_args, &mut emit_state, line)?;

    let mut local_rom = Vec::new();
    let mut local_rom_slot = Some(&mut local_rom);
    let emit_end = run_pass(
        Pass::Two,
        &macro_def.body,
        table,
        macros,
        &mut emit_state,
        &mut local_rom_slot,
        address,
    )?;
    let emitted = emit_end - address;
    if let Some(bytes_out) = rom {
        bytes_out.extend(local_rom);
    }
    Ok(emitted)
}

fn recognize_ctx_for<'a>(state: &'a ProgramState, file: &'a str, line: usize) -> RecognizeCtx<'a> {
    RecognizeCtx {
        eval: EvalCtx {
            labels: Some(&state.labels),
            defs: &state.definitions,
            last_absolute_label: &state.last_absolute_label,
        },
        file,
        line,
    }
}

/// Binds the call-site argument expressions into the macro's own scope:
/// `Label` parameters become entries in its label map, `Value` parameters
/// become `Raw16` definitions. Argument values never affect the body's
/// instruction sizes, only their own resolved operand values, so it is
/// safe to resolve them the same way regardless of which outer pass called.
fn bind_macro_args(
    ctx: &RecognizeCtx,
    macro_def: &MacroDef,
    call_args: &[String],
    target: &mut ProgramState,
    line: &SourceLine,
) -> Result<(), AssemblyError> {
    use crate::assembler::encoder::expr;
    use crate::assembler::encoder::operand_kinds::{self, OperandKind, Rejection};

    for (param, arg_text) in macro_def.params.iter().zip(call_args) {
        match param {
            MacroParam::Label(name) => {
                let value = expr::evaluate(&ctx.eval, arg_text).map_err(|reason| AssemblyError::MacroScopeViolation {
                    file: line.file.to_string(),
                    line: line.line_number,
                    reason,
                })?;
                target.labels.insert(name.clone(), value.raw as u32);
            }
            MacroParam::Value(name) => {
                match operand_kinds::recognize(OperandKind::Raw16, ctx, arg_text) {
                    Ok(v) => {
                        target.definitions.insert(name.clone(), definitions::Definition::Raw16(v as u16));
                    }
                    Err(Rejection::Fatal(e)) => return Err(e),
                    Err(Rejection::Mismatch(reason)) => {
                        return Err(AssemblyError::MacroScopeViolation {
                            file: line.file.to_string(),
                            line: line.line_number,
                            reason,
                        })
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SourceLine;
    use std::rc::Rc;

    fn line(file: &Rc<str>, n: usize, labels: Vec<&str>, content: LineContent) -> SourceLine {
        SourceLine {
            file: file.clone(),
            line_number: n,
            labels: labels.into_iter().map(str::to_string).collect(),
            content,
        }
    }

    #[test]
    fn assembles_a_couple_of_plain_instructions() {
        let file: Rc<str> = Rc::from("f.asm");
        let lines = vec![
            line(
                &file,
                1,
                vec![],
                LineContent::Instruction {
                    mnemonic: "NOP".to_string(),
                    operands: vec![],
                },
            ),
            line(
                &file,
                2,
                vec![],
                LineContent::Instruction {
                    mnemonic: "HALT".to_string(),
                    operands: vec![],
                },
            ),
        ];
        let output = assemble(&lines).unwrap();
        assert_eq!(output.rom, vec![0x00, 0x76]);
    }

    #[test]
    fn a_forward_jump_resolves_once_the_label_is_known() {
        let file: Rc<str> = Rc::from("f.asm");
        let lines = vec![
            line(
                &file,
                1,
                vec![],
                LineContent::Instruction {
                    mnemonic: "JP".to_string(),
                    operands: vec!["=TARGET".to_string()],
                },
            ),
            line(
                &file,
                2,
                vec![],
                LineContent::Instruction {
                    mnemonic: "NOP".to_string(),
                    operands: vec![],
                },
            ),
            line(
                &file,
                3,
                vec!["TARGET"],
                LineContent::Instruction {
                    mnemonic: "HALT".to_string(),
                    operands: vec![],
                },
            ),
        ];
        let output = assemble(&lines).unwrap();
        assert_eq!(output.rom, vec![0xC3, 0x04, 0x00, 0x00, 0x76]);
        assert_eq!(output.labels["TARGET"], 4);
    }

    #[test]
    fn duplicate_labels_are_rejected() {
        let file: Rc<str> = Rc::from("f.asm");
        let lines = vec![
            line(&file, 1, vec!["LOOP"], LineContent::Empty),
            line(&file, 2, vec!["LOOP"], LineContent::Empty),
        ];
        assert!(matches!(assemble(&lines), Err(AssemblyError::DuplicateLabel { .. })));
    }

    #[test]
    fn define_is_rejected_inside_a_macro_body() {
        let file: Rc<str> = Rc::from("f.asm");
        let lines = vec![
            line(
                &file,
                1,
                vec![],
                LineContent::Directive {
                    name: "MACRODEF".to_string(),
                    args: "BAD".to_string(),
                },
            ),
            line(
                &file,
                2,
                vec![],
                LineContent::Directive {
                    name: "DEFINE".to_string(),
                    args: "X 1".to_string(),
                },
            ),
            line(&file, 3, vec![], LineContent::Directive { name: "END".to_string(), args: String::new() }),
            line(
                &file,
                4,
                vec![],
                LineContent::Directive {
                    name: "BAD".to_string(),
                    args: String::new(),
                },
            ),
        ];
        assert!(matches!(assemble(&lines), Err(AssemblyError::DirectiveMisuse { .. })));
    }

    #[test]
    fn plain_padto_is_rejected_inside_a_macro_body() {
        let file: Rc<str> = Rc::from("f.asm");
        let lines = vec![
            line(
                &file,
                1,
                vec![],
                LineContent::Directive {
                    name: "MACRODEF".to_string(),
                    args: "BAD".to_string(),
                },
            ),
            line(
                &file,
                2,
                vec![],
                LineContent::Directive {
                    name: "PADTO".to_string(),
                    args: "0x10".to_string(),
                },
            ),
            line(&file, 3, vec![], LineContent::Directive { name: "END".to_string(), args: String::new() }),
            line(
                &file,
                4,
                vec![],
                LineContent::Directive {
                    name: "BAD".to_string(),
                    args: String::new(),
                },
            ),
        ];
        assert!(matches!(assemble(&lines), Err(AssemblyError::DirectiveMisuse { .. })));
    }

    #[test]
    fn define_directive_value_is_usable_by_later_instructions() {
        let file: Rc<str> = Rc::from("f.asm");
        let lines = vec![
            line(
                &file,
                1,
                vec![],
                LineContent::Directive {
                    name: "DEFINE".to_string(),
                    args: "COUNT 5".to_string(),
                },
            ),
            line(
                &file,
                2,
                vec![],
                LineContent::Instruction {
                    mnemonic: "LD".to_string(),
                    operands: vec!["A".to_string(), "$COUNT".to_string()],
                },
            ),
        ];
        let output = assemble(&lines).unwrap();
        assert_eq!(output.rom, vec![0x3E, 0x05]);
    }
}
