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

use lr35902asm::assemble;
use lr35902asm::assemble_with_labels;
use lr35902asm::file_reader::MockFileReader;
use std::path::Path;

#[test]
fn ld_a_immediate() {
    let mut reader = MockFileReader::default();
    reader.add_file("test.asm", "LD A, 0x42\n");
    let rom = assemble(Path::new("test.asm"), &reader).unwrap();
    assert_eq!(rom, vec![0x3E, 0x42]);
}

#[test]
fn nop_halt_stop() {
    let mut reader = MockFileReader::default();
    reader.add_file("test.asm", "NOP\nHALT\nSTOP\n");
    let rom = assemble(Path::new("test.asm"), &reader).unwrap();
    assert_eq!(rom, vec![0x00, 0x76, 0x10, 0x00]);
}

#[test]
fn self_referencing_jr_encodes_a_backward_branch() {
    let mut reader = MockFileReader::default();
    reader.add_file("test.asm", "start: JR =start\n");
    let rom = assemble(Path::new("test.asm"), &reader).unwrap();
    assert_eq!(rom, vec![0x18, 0xFE]);
}

#[test]
fn define_then_reference_by_name() {
    let mut reader = MockFileReader::default();
    reader.add_file("test.asm", ".DEFINE VAL 0x10\nLD A, $VAL\n");
    let rom = assemble(Path::new("test.asm"), &reader).unwrap();
    assert_eq!(rom, vec![0x3E, 0x10]);
}

#[test]
fn forward_label_reference_resolves_on_pass_two() {
    let mut reader = MockFileReader::default();
    reader.add_file("test.asm", "main: LD B, 1\n      JP =main\n");
    let rom = assemble(Path::new("test.asm"), &reader).unwrap();
    assert_eq!(rom, vec![0x06, 0x01, 0xC3, 0x00, 0x00]);
}

#[test]
fn padto_zero_fills_then_resumes_emission() {
    let mut reader = MockFileReader::default();
    reader.add_file("test.asm", ".PADTO 0x08\nNOP\n");
    let rom = assemble(Path::new("test.asm"), &reader).unwrap();
    assert_eq!(rom, vec![0u8, 0, 0, 0, 0, 0, 0, 0, 0x00]);
}

#[test]
fn db_falls_back_to_big_endian_words_when_an_operand_overflows_a_byte() {
    let mut reader = MockFileReader::default();
    reader.add_file("test.asm", ".DB 1, 2, 0xFF\n.DB 0x1234\n");
    let rom = assemble(Path::new("test.asm"), &reader).unwrap();
    assert_eq!(rom, vec![0x01, 0x02, 0xFF, 0x12, 0x34]);
}

#[test]
fn include_splices_a_child_file_in_place() {
    let mut reader = MockFileReader::default();
    reader.add_file("main.asm", "NOP\n.INCLUDE \"child.asm\"\nHALT\n");
    reader.add_file("child.asm", "DI\n");
    let rom = assemble(Path::new("main.asm"), &reader).unwrap();
    assert_eq!(rom, vec![0x00, 0xF3, 0x76]);
}

#[test]
fn macrodef_expands_with_a_value_argument_at_each_call_site() {
    let mut reader = MockFileReader::default();
    reader.add_file(
        "test.asm",
        ".MACRODEF LOAD_CONST val\nLD A, $val\n.END\n.LOAD_CONST 1\n.LOAD_CONST 2\n",
    );
    let rom = assemble(Path::new("test.asm"), &reader).unwrap();
    assert_eq!(rom, vec![0x3E, 0x01, 0x3E, 0x02]);
}

#[test]
fn macrodef_with_a_label_argument_binds_the_callers_address() {
    let mut reader = MockFileReader::default();
    reader.add_file(
        "test.asm",
        "loop: NOP\n.MACRODEF GOTO =target\nJP =target\n.END\n.GOTO =loop\n",
    );
    let rom = assemble(Path::new("test.asm"), &reader).unwrap();
    assert_eq!(rom, vec![0x00, 0xC3, 0x00, 0x00]);
}

#[test]
fn relative_labels_nest_under_the_enclosing_absolute_label() {
    let mut reader = MockFileReader::default();
    reader.add_file(
        "test.asm",
        "main:\n.loop: NOP\nJR =.loop\n",
    );
    let rom = assemble(Path::new("test.asm"), &reader).unwrap();
    assert_eq!(rom, vec![0x00, 0x18, 0xFD]);
}

#[test]
fn assemble_with_labels_surfaces_the_final_symbol_table() {
    let mut reader = MockFileReader::default();
    reader.add_file("test.asm", "entry: NOP\n       HALT\n");
    let output = assemble_with_labels(Path::new("test.asm"), &reader).unwrap();
    assert_eq!(output.rom, vec![0x00, 0x76]);
    assert_eq!(output.labels.get("ENTRY"), Some(&0));
}

#[test]
fn duplicate_label_definition_is_rejected() {
    let mut reader = MockFileReader::default();
    reader.add_file("test.asm", "foo: NOP\nfoo: HALT\n");
    let result = assemble(Path::new("test.asm"), &reader);
    assert!(result.is_err());
}

#[test]
fn unknown_mnemonic_is_rejected() {
    let mut reader = MockFileReader::default();
    reader.add_file("test.asm", "FROB A, B\n");
    let result = assemble(Path::new("test.asm"), &reader);
    assert!(result.is_err());
}

#[test]
fn relative_jump_out_of_range_is_rejected() {
    let mut reader = MockFileReader::default();
    let mut src = String::new();
    src.push_str("start: NOP\n");
    for _ in 0..200 {
        src.push_str("NOP\n");
    }
    src.push_str("JR =start\n");
    reader.add_file("test.asm", &src);
    let result = assemble(Path::new("test.asm"), &reader);
    assert!(result.is_err());
}

#[test]
fn push_pop_and_alu_immediate_round_out_a_small_routine() {
    let mut reader = MockFileReader::default();
    reader.add_file(
        "test.asm",
        "PUSH BC\nLD A, 0x05\nADD A, 0x03\nPOP BC\nRET\n",
    );
    let rom = assemble(Path::new("test.asm"), &reader).unwrap();
    assert_eq!(rom, vec![0xC5, 0x3E, 0x05, 0xC6, 0x03, 0xC1, 0xC9]);
}

#[test]
fn macro_local_padto_is_accepted_inside_a_macro_body() {
    let mut reader = MockFileReader::default();
    reader.add_file(
        "test.asm",
        ".MACRODEF FILLER\n$mark: .PADTO =$mark\nNOP\n.END\n.FILLER\nHALT\n",
    );
    let rom = assemble(Path::new("test.asm"), &reader).unwrap();
    assert_eq!(rom, vec![0x00, 0x76]);
}

#[test]
fn macro_local_labels_are_placed_at_the_call_sites_absolute_address() {
    let mut reader = MockFileReader::default();
    reader.add_file(
        "test.asm",
        "NOP\n.MACRODEF FILLER\n$mark: .PADTO =$mark\nNOP\n.END\n.FILLER\nHALT\n",
    );
    let rom = assemble(Path::new("test.asm"), &reader).unwrap();
    assert_eq!(rom, vec![0x00, 0x00, 0x76]);
}

#[test]
fn bit_instructions_are_cb_prefixed() {
    let mut reader = MockFileReader::default();
    reader.add_file("test.asm", "BIT 7, A\nSET 0, B\nRES 3, (HL)\n");
    let rom = assemble(Path::new("test.asm"), &reader).unwrap();
    assert_eq!(rom, vec![0xCB, 0x7F, 0xCB, 0xC0, 0xCB, 0x9E]);
}
