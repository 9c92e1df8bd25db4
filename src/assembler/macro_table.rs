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

use crate::ast::SourceLine;

/// A formal macro parameter, named by its entry in the `.MACRODEF` line.
/// `Label` parameters (written `=NAME` in the def) are bound into the
/// expansion's label map; `Value` parameters are bound into its
/// definitions map as `Raw16`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacroParam {
    Label(String),
    Value(String),
}

#[derive(Clone)]
pub struct MacroDef {
    pub name: String,
    pub params: Vec<MacroParam>,
    pub body: Vec<SourceLine>,
}

pub type MacroTable = HashMap<String, MacroDef>;

pub fn parse_macro_params(tokens: &[String]) -> Vec<MacroParam> {
    tokens
        .iter()
        .map(|t| match t.strip_prefix('=') {
            Some(name) => MacroParam::Label(name.to_uppercase()),
            None => MacroParam::Value(t.to_uppercase()),
        })
        .collect()
}
