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

//! Attribute macros compiling SPP format descriptions into parse
//! routines at build time.

use codespan_reporting::diagnostic::Diagnostic;
use codespan_reporting::term;
use proc_macro2::TokenStream;
use quote::quote;
use spp_compiler::ast;
use std::env;
use std::path::Path;
use syn::parse::{Parse, ParseStream};
use syn::parse_macro_input;

/// Attribute arguments: the source literal, optionally followed by
/// the byte order `little_endian` or `big_endian`.
struct Args {
    source: syn::LitStr,
    endianness: ast::EndiannessValue,
}

impl Parse for Args {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let source = input.parse()?;
        let mut endianness = ast::EndiannessValue::LittleEndian;
        if input.parse::<Option<syn::Token![,]>>()?.is_some() && !input.is_empty() {
            let ident: syn::Ident = input.parse()?;
            endianness = match ident.to_string().as_str() {
                "little_endian" => ast::EndiannessValue::LittleEndian,
                "big_endian" => ast::EndiannessValue::BigEndian,
                _ => {
                    return Err(syn::Error::new(
                        ident.span(),
                        "expected `little_endian` or `big_endian`",
                    ))
                }
            };
            input.parse::<Option<syn::Token![,]>>()?;
        }
        Ok(Args { source, endianness })
    }
}

fn render(sources: &ast::SourceDatabase, diagnostic: &Diagnostic<ast::FileId>) -> String {
    let mut buffer = termcolor::Buffer::no_color();
    if let Err(err) = term::emit(&mut buffer, &term::Config::default(), sources, diagnostic) {
        return format!("error: {}\n(could not render diagnostic: {err})", diagnostic.message);
    }
    String::from_utf8_lossy(buffer.as_slice()).into_owned()
}

/// Generate the module for a parsed file.
fn generate_module(
    sources: &ast::SourceDatabase,
    file: &ast::File,
    endianness: ast::EndiannessValue,
    dependency: Option<&str>,
    input: syn::ItemMod,
) -> TokenStream {
    // Warnings are not reported: generation proceeds for any file
    // that parses.
    let analysis = spp_compiler::analyzer::analyze(file);
    let parser =
        spp_compiler::backends::rust::generate_tokens(sources, file, &analysis.registry, endianness);
    // Generate an include_bytes! statement to force a dependency
    // on the source file.
    let dependency = dependency.map(|path| quote!(const _: &[u8] = include_bytes!(#path);));
    let mod_ident = input.ident;
    let mod_attrs = input.attrs;
    let mod_vis = input.vis;
    let mod_items = input.content.map(|(_, items)| items).unwrap_or_default();

    quote! {
        #(#mod_attrs)*
        #mod_vis mod #mod_ident {
            #dependency
            #parser
            #(#mod_items)*
        }
    }
}

fn spp_proc_macro(args: Args, input: syn::ItemMod) -> TokenStream {
    let Args { source: path, endianness } = args;

    // Locate the source file.
    let root = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into());
    let Some(relative_path) =
        [Path::new(&root).join(path.value()), Path::new(&root).join("src").join(path.value())]
            .into_iter()
            .find(|path| path.exists())
    else {
        return syn::Error::new(path.span(), "error: unable to find file").to_compile_error();
    };
    let Some(relative_path) = relative_path.to_str().map(str::to_owned) else {
        return syn::Error::new(path.span(), "error: file path is not valid UTF-8")
            .to_compile_error();
    };

    let mut sources = ast::SourceDatabase::new();
    match spp_compiler::parser::parse_file(&mut sources, &relative_path) {
        Ok(file) => generate_module(&sources, &file, endianness, Some(&relative_path), input),
        Err(err) => syn::Error::new(path.span(), render(&sources, &err)).to_compile_error(),
    }
}

fn spp_inline_proc_macro(args: Args, input: syn::ItemMod) -> TokenStream {
    let Args { source, endianness } = args;
    let mut sources = ast::SourceDatabase::new();
    match spp_compiler::parser::parse_inline(&mut sources, "<inline>", source.value()) {
        Ok(file) => generate_module(&sources, &file, endianness, None, input),
        Err(err) => syn::Error::new(source.span(), render(&sources, &err)).to_compile_error(),
    }
}

/// Generate the parse routines of an SPP file into a module.
///
/// ```ignore
/// #[spp("formats/bitmap.spp", little_endian)]
/// mod bitmap {}
/// ```
///
/// The path is resolved relative to the crate root, then relative to
/// its `src` directory.
#[proc_macro_attribute]
pub fn spp(
    attr: proc_macro::TokenStream,
    input: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as syn::ItemMod);
    match syn::parse::<Args>(attr) {
        Ok(args) => spp_proc_macro(args, input).into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Generate the parse routines of inline SPP source into a module.
#[proc_macro_attribute]
pub fn spp_inline(
    attr: proc_macro::TokenStream,
    input: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as syn::ItemMod);
    match syn::parse::<Args>(attr) {
        Ok(args) => spp_inline_proc_macro(args, input).into(),
        Err(err) => err.to_compile_error().into(),
    }
}
