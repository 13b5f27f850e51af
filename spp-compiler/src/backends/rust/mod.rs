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

//! Rust compiler backend.
//!
//! Every struct declaration becomes a routine
//!
//! ```ignore
//! pub fn parse_<name>(buf: &[u8], offset: usize, args: &Record)
//!     -> Result<(Record, usize), DecodeError>
//! ```
//!
//! decoding the struct fields at `offset` and returning the decoded
//! record together with the offset following the struct.

use crate::{analyzer, ast};
use quote::{format_ident, quote};
use std::collections::HashSet;
use std::path::Path;

mod decoder;
mod expr;
mod preamble;

/// Name of the routine generated for the struct `id`.
pub fn routine_ident(registry: &analyzer::Registry, id: &str) -> proc_macro2::Ident {
    format_ident!("{}", registry.routine_name(id))
}

/// Code generation state for one parse routine.
struct Routine<'a> {
    registry: &'a analyzer::Registry<'a>,
    /// Parameter names of the struct, in declaration order.
    params: Vec<&'a str>,
    /// Byte order applied to the fixed width fields.
    byte_order: proc_macro2::TokenStream,
    /// Fields bound unconditionally so far at the top level of the
    /// routine body.
    bound: HashSet<String>,
}

impl<'a> Routine<'a> {
    fn new(
        registry: &'a analyzer::Registry<'a>,
        params: Vec<&'a str>,
        byte_order: proc_macro2::TokenStream,
    ) -> Routine<'a> {
        Routine { registry, params, byte_order, bound: HashSet::new() }
    }
}

fn byte_order(endianness: ast::EndiannessValue) -> proc_macro2::TokenStream {
    match endianness {
        ast::EndiannessValue::LittleEndian => quote!(ByteOrder::Little),
        ast::EndiannessValue::BigEndian => quote!(ByteOrder::Big),
    }
}

/// Collect the `LOCAL` annotations of special statements, including
/// those nested in conditional blocks.
fn local_annotations(statements: &[ast::Stmt], docs: &mut Vec<String>) {
    for stmt in statements {
        match stmt {
            ast::Stmt::SpecialLocal { name, arg, .. } => docs.push(match arg {
                Some(arg) => format!(" LOCAL: {name} {arg}"),
                None => format!(" LOCAL: {name}"),
            }),
            ast::Stmt::IfThenElse { if_, elif, else_, .. } => {
                local_annotations(&if_.statements, docs);
                for block in elif {
                    local_annotations(&block.statements, docs);
                }
                if let Some(block) = else_ {
                    local_annotations(&block.statements, docs);
                }
            }
            ast::Stmt::Declare { .. } | ast::Stmt::Raise { .. } => (),
        }
    }
}

fn generate_routine(
    registry: &analyzer::Registry,
    decl: &ast::Struct,
    block: &ast::Block,
    endianness: ast::EndiannessValue,
) -> proc_macro2::TokenStream {
    tracing::debug!(name = %decl.id, "generating parse routine");
    let name = routine_ident(registry, &decl.id);
    let mut docs = vec![format!(" Parse the `{}` structure.", decl.id)];
    local_annotations(&block.statements, &mut docs);

    let params: Vec<_> = decl.param_names().collect();
    let checks = params.iter().map(|param| quote!(args.require(#param)?;));
    let mut routine = Routine::new(registry, params.clone(), byte_order(endianness));
    let body = routine.statements(&block.statements, true);

    quote! {
        #(#[doc = #docs])*
        #[allow(non_snake_case, unused_mut, unused_variables, unreachable_code, clippy::all)]
        pub fn #name(
            buf: &[u8],
            mut offset: usize,
            args: &Record,
        ) -> std::result::Result<(Record, usize), DecodeError> {
            #(#checks)*
            let mut ctx = Record::new();
            #body
            Ok((ctx, offset))
        }
    }
}

/// Generate the items of a passthrough struct. Text that does not
/// parse as Rust items is replaced by a compile error.
fn generate_passthrough(decl: &ast::Struct, code: &str) -> proc_macro2::TokenStream {
    match syn::parse_str::<syn::File>(code) {
        Ok(file) => {
            let items = file.items;
            quote!(#(#items)*)
        }
        Err(err) => {
            let message = format!("invalid passthrough code for struct `{}`: {err}", decl.id);
            quote!(compile_error!(#message);)
        }
    }
}

fn generate_item(
    registry: &analyzer::Registry,
    item: &ast::Item,
    endianness: ast::EndiannessValue,
) -> proc_macro2::TokenStream {
    match item {
        ast::Item::Struct(decl) if !registry.is_effective(decl) => {
            tracing::warn!(name = %decl.id, "skipping struct redefined later in the file");
            quote!()
        }
        ast::Item::Struct(decl) => match &decl.body {
            ast::StructBody::Block(block) => generate_routine(registry, decl, block, endianness),
            ast::StructBody::Passthrough { code, .. } => generate_passthrough(decl, code),
        },
        ast::Item::Preprocessor { name, args, .. } => {
            let doc = std::iter::once(name.as_str())
                .chain(args.iter().map(String::as_str))
                .fold(String::from(" PRE:"), |doc, word| doc + " " + word);
            quote! {
                #[doc = #doc]
                #[allow(unused_doc_comments)]
                const _: () = ();
            }
        }
        ast::Item::SpecialGlobal { name, arg, .. } => {
            let doc = match arg {
                Some(arg) => format!(" GLOBAL: {name} {arg}"),
                None => format!(" GLOBAL: {name}"),
            };
            quote! {
                #[doc = #doc]
                #[allow(unused_doc_comments)]
                const _: () = ();
            }
        }
    }
}

/// Generate Rust parsers for all declarations of a file.
///
/// Structs are resolved through `registry`; when several structs
/// share a name only the last one is emitted.
pub fn generate_tokens(
    sources: &ast::SourceDatabase,
    file: &ast::File,
    registry: &analyzer::Registry,
    endianness: ast::EndiannessValue,
) -> proc_macro2::TokenStream {
    let name = sources.get(file.file).map(|source| source.name().clone()).unwrap_or_default();
    let preamble = preamble::generate(Path::new(&name));
    let items = file.items.iter().map(|item| generate_item(registry, item, endianness));
    quote! {
        #preamble

        #(#items)*
    }
}

/// Generate formatted Rust code from an AST.
pub fn generate(
    sources: &ast::SourceDatabase,
    file: &ast::File,
    registry: &analyzer::Registry,
    endianness: ast::EndiannessValue,
) -> Result<String, String> {
    let syntax_tree = syn::parse2(generate_tokens(sources, file, registry, endianness))
        .map_err(|err| format!("could not parse generated code: {err}"))?;
    Ok(prettyplease::unparse(&syntax_tree))
}
