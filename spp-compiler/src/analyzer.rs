// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use codespan_reporting::diagnostic::Diagnostic;
use codespan_reporting::files;
use codespan_reporting::term;
use codespan_reporting::term::termcolor;
use heck::ToSnakeCase;
use std::collections::HashMap;
use std::fmt;

use crate::ast::*;

/// List of unique warnings reported as analyzer diagnostics.
#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WarningCode {
    DuplicateStructIdentifier = 1,
    DuplicateParameterIdentifier = 2,
    UndeclaredStructIdentifier = 3,
    ArgumentCountMismatch = 4,
    IgnoredDefaultValue = 5,
    InvalidPassthroughCode = 6,
    RoutineNameCollision = 7,
}

impl fmt::Display for WarningCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "W{}", *self as u16)
    }
}

impl From<WarningCode> for String {
    fn from(code: WarningCode) -> Self {
        format!("{}", code)
    }
}

/// Aggregate analyzer diagnostics.
#[derive(Debug, Default)]
pub struct Diagnostics {
    pub diagnostics: Vec<Diagnostic<FileId>>,
}

/// Struct declarations indexed by name.
///
/// When several structs share a name the last declaration wins,
/// which mirrors redefinition in the generated module.
#[derive(Debug)]
pub struct Registry<'d> {
    pub structs: HashMap<&'d str, &'d Struct>,
}

/// Result of the validation pass.
#[derive(Debug)]
pub struct Analysis<'d> {
    pub registry: Registry<'d>,
    pub diagnostics: Diagnostics,
}

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    fn push(&mut self, diagnostic: Diagnostic<FileId>) {
        self.diagnostics.push(diagnostic)
    }

    pub fn emit(
        &self,
        sources: &SourceDatabase,
        writer: &mut dyn termcolor::WriteColor,
    ) -> Result<(), files::Error> {
        let config = term::Config::default();
        for d in self.diagnostics.iter() {
            term::emit_to_write_style(writer, &config, sources, d)?;
        }
        Ok(())
    }
}

impl<'d> Registry<'d> {
    pub fn new(file: &'d File) -> Registry<'d> {
        Registry { structs: file.structs().map(|decl| (decl.id.as_str(), decl)).collect() }
    }

    /// Return the effective declaration of the struct `id`.
    pub fn get(&self, id: &str) -> Option<&'d Struct> {
        self.structs.get(id).copied()
    }

    /// Return the ordered parameter names of the struct `id`.
    pub fn params(&self, id: &str) -> Option<Vec<&'d str>> {
        self.get(id).map(|decl| decl.param_names().collect())
    }

    /// Name of the parse routine generated for the struct `id`.
    ///
    /// Routines are named after the snake case form of the struct
    /// identifier, unless another struct has the same snake case form:
    /// the identifier is then used as written.
    pub fn routine_name(&self, id: &str) -> String {
        let snake = id.to_snake_case();
        let collides =
            self.structs.keys().any(|other| *other != id && other.to_snake_case() == snake);
        if collides {
            format!("parse_{id}")
        } else {
            format!("parse_{snake}")
        }
    }

    /// Check whether `decl` is the effective declaration for its
    /// name, i.e. it is not shadowed by a later struct.
    pub fn is_effective(&self, decl: &Struct) -> bool {
        self.get(&decl.id).is_some_and(|effective| std::ptr::eq(effective, decl))
    }
}

fn check_struct_identifiers(file: &File, diagnostics: &mut Diagnostics) {
    let mut seen: HashMap<&str, &Struct> = HashMap::new();
    for decl in file.structs() {
        if let Some(prev) = seen.insert(&decl.id, decl) {
            diagnostics.push(
                Diagnostic::warning()
                    .with_code(WarningCode::DuplicateStructIdentifier)
                    .with_message(format!("redeclaration of struct identifier `{}`", decl.id))
                    .with_labels(vec![
                        decl.loc.primary(),
                        prev.loc
                            .secondary()
                            .with_message(format!("`{}` is first declared here", decl.id)),
                    ])
                    .with_notes(vec!["note: the last declaration is used".to_owned()]),
            )
        }
    }
}

fn check_parameter_identifiers(file: &File, diagnostics: &mut Diagnostics) {
    for decl in file.structs() {
        let mut seen: HashMap<&str, &Identifier> = HashMap::new();
        for param in &decl.params {
            if let Some(prev) = seen.insert(&param.name, param) {
                diagnostics.push(
                    Diagnostic::warning()
                        .with_code(WarningCode::DuplicateParameterIdentifier)
                        .with_message(format!(
                            "redeclaration of parameter `{}` in struct `{}`",
                            param.name, decl.id
                        ))
                        .with_labels(vec![
                            param.loc.primary(),
                            prev.loc
                                .secondary()
                                .with_message(format!("`{}` is first declared here", param.name)),
                        ]),
                )
            }
        }
    }
}

fn check_routine_names(file: &File, registry: &Registry, diagnostics: &mut Diagnostics) {
    let mut seen: HashMap<String, &Struct> = HashMap::new();
    for decl in file.structs().filter(|decl| registry.is_effective(decl)) {
        if let Some(prev) = seen.insert(decl.id.to_snake_case(), decl) {
            diagnostics.push(
                Diagnostic::warning()
                    .with_code(WarningCode::RoutineNameCollision)
                    .with_message(format!(
                        "struct identifiers `{}` and `{}` have the same snake case form",
                        prev.id, decl.id
                    ))
                    .with_labels(vec![
                        decl.loc.primary(),
                        prev.loc.secondary().with_message(format!("`{}` is declared here", prev.id)),
                    ])
                    .with_notes(vec![format!(
                        "note: the parse routines are named `{}` and `{}`",
                        registry.routine_name(&prev.id),
                        registry.routine_name(&decl.id)
                    )]),
            )
        }
    }
}

fn check_passthrough_code(file: &File, diagnostics: &mut Diagnostics) {
    for decl in file.structs() {
        if let StructBody::Passthrough { loc, code } = &decl.body {
            if let Err(err) = syn::parse_str::<syn::File>(code) {
                diagnostics.push(
                    Diagnostic::warning()
                        .with_code(WarningCode::InvalidPassthroughCode)
                        .with_message(format!(
                            "passthrough code of struct `{}` is not a list of Rust items",
                            decl.id
                        ))
                        .with_labels(vec![loc.primary().with_message(err.to_string())]),
                )
            }
        }
    }
}

fn check_declare(
    type_: &FieldType,
    default: Option<&Expr>,
    registry: &Registry,
    diagnostics: &mut Diagnostics,
) {
    let callee = match type_ {
        FieldType::Struct { loc, name } => match registry.get(name) {
            Some(callee) => Some(callee),
            None => {
                diagnostics.push(
                    Diagnostic::warning()
                        .with_code(WarningCode::UndeclaredStructIdentifier)
                        .with_message(format!("undeclared struct identifier `{name}`"))
                        .with_labels(vec![loc.primary()])
                        .with_notes(vec!["note: decoding this field always fails".to_owned()]),
                );
                return;
            }
        },
        FieldType::Size { .. } | FieldType::Regular { .. } => None,
    };

    match default {
        Some(Expr::Call { loc, callee: name, args }) => {
            let expected = callee.map_or(0, |callee| callee.params.len());
            if args.len() != expected {
                diagnostics.push(
                    Diagnostic::warning()
                        .with_code(WarningCode::ArgumentCountMismatch)
                        .with_message(format!(
                            "`{name}` expects {expected} argument(s), {} given",
                            args.len()
                        ))
                        .with_labels(vec![loc.primary()]),
                )
            }
        }
        Some(expr) => diagnostics.push(
            Diagnostic::warning()
                .with_code(WarningCode::IgnoredDefaultValue)
                .with_message("default value is ignored when decoding")
                .with_labels(vec![expr.loc().primary()]),
        ),
        None => (),
    }
}

fn check_statements(statements: &[Stmt], registry: &Registry, diagnostics: &mut Diagnostics) {
    for stmt in statements {
        match stmt {
            Stmt::Declare { type_, default, .. } => {
                check_declare(type_, default.as_ref(), registry, diagnostics)
            }
            Stmt::IfThenElse { if_, elif, else_, .. } => {
                check_statements(&if_.statements, registry, diagnostics);
                for block in elif {
                    check_statements(&block.statements, registry, diagnostics);
                }
                if let Some(block) = else_ {
                    check_statements(&block.statements, registry, diagnostics);
                }
            }
            Stmt::SpecialLocal { .. } | Stmt::Raise { .. } => (),
        }
    }
}

fn check_field_types(file: &File, registry: &Registry, diagnostics: &mut Diagnostics) {
    for decl in file.structs() {
        if let StructBody::Block(block) = &decl.body {
            check_statements(&block.statements, registry, diagnostics);
        }
    }
}

/// Build the struct registry and validate the file.
///
/// All findings are warnings: generation proceeds for any file that
/// parses, and the issues reported here surface as runtime decode
/// errors in the generated routines.
pub fn analyze(file: &File) -> Analysis<'_> {
    let registry = Registry::new(file);
    let mut diagnostics = Diagnostics::default();
    check_struct_identifiers(file, &mut diagnostics);
    check_parameter_identifiers(file, &mut diagnostics);
    check_field_types(file, &registry, &mut diagnostics);
    check_passthrough_code(file, &mut diagnostics);
    check_routine_names(file, &registry, &mut diagnostics);
    Analysis { registry, diagnostics }
}
