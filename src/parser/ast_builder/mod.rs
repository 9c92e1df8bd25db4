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

use crate::ast::LineContent;
use crate::errors::AssemblyError;
use crate::parser::{AsmParser, Rule};
use pest::Parser;

/// Parses one already comment-stripped physical line into its chained label
/// definitions and its body (directive or instruction). Operand and
/// directive-argument text is returned untokenized; later stages (the
/// directive engine, the instruction encoder) tokenize it for their own
/// purpose.
pub fn parse_line_body(
    file: &str,
    text: &str,
) -> Result<(Vec<String>, LineContent), AssemblyError> {
    let mut pairs = AsmParser::parse(Rule::line, text)
        .map_err(|e| AssemblyError::PestError(Box::new(e.with_path(file))))?;
    let line_pair = pairs.next().expect("the `line` rule always yields a pair");

    let mut labels = Vec::new();
    let mut content = LineContent::Empty;

    for inner in line_pair.into_inner() {
        match inner.as_rule() {
            Rule::label_def => {
                let name = inner
                    .into_inner()
                    .next()
                    .expect("label_def always wraps a label_name")
                    .as_str()
                    .to_string();
                labels.push(name);
            }
            Rule::body => {
                content = build_body(inner)?;
            }
            Rule::EOI => {}
            _ => unreachable!("unexpected top-level rule in line"),
        }
    }

    Ok((labels, content))
}

fn build_body(body_pair: pest::iterators::Pair<Rule>) -> Result<LineContent, AssemblyError> {
    let inner = body_pair
        .into_inner()
        .next()
        .expect("body always wraps directive_body or instruction_body");

    match inner.as_rule() {
        Rule::directive_body => {
            let rest = inner
                .into_inner()
                .next()
                .expect("directive_body always wraps rest")
                .as_str()
                .trim();
            let (name, args) = split_first_token(rest);
            Ok(LineContent::Directive {
                name: name.to_uppercase(),
                args: args.to_string(),
            })
        }
        Rule::instruction_body => {
            let rest = inner
                .into_inner()
                .next()
                .expect("instruction_body always wraps rest")
                .as_str()
                .trim();
            let mut tokens = tokenize_operands(rest);
            if tokens.is_empty() {
                Ok(LineContent::Empty)
            } else {
                let mnemonic = tokens.remove(0).to_uppercase();
                Ok(LineContent::Instruction {
                    mnemonic,
                    operands: tokens,
                })
            }
        }
        _ => unreachable!("unexpected body alternative"),
    }
}

fn split_first_token(s: &str) -> (&str, &str) {
    match s.find(char::is_whitespace) {
        Some(idx) => (&s[..idx], s[idx..].trim_start()),
        None => (s, ""),
    }
}

/// Splits on whitespace and/or commas, collapsing runs of either, as the
/// line assembler's instruction tokenizer does.
pub fn tokenize_operands(s: &str) -> Vec<String> {
    s.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
