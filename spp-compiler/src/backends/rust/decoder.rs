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

use super::{routine_ident, Routine};
use crate::ast;
use crate::parser::unquote;
use quote::{format_ident, quote};

fn fixed_width(name: &str) -> Option<proc_macro2::Ident> {
    let width = match name {
        "uint8" => "U8",
        "uint16" => "U16",
        "uint32" => "U32",
        "uint64" => "U64",
        "int8" => "I8",
        "int16" => "I16",
        "int32" => "I32",
        "int64" => "I64",
        "float" => "F32",
        "double" => "F64",
        _ => return None,
    };
    Some(format_ident!("{}", width))
}

/// Element decoder of a declared field: setup statements evaluated
/// once, and an expression of type `(Value, usize)` decoding one
/// element at `offset`.
struct Element {
    setup: proc_macro2::TokenStream,
    decode: proc_macro2::TokenStream,
}

impl Routine<'_> {
    pub(super) fn statements(
        &mut self,
        statements: &[ast::Stmt],
        top_level: bool,
    ) -> proc_macro2::TokenStream {
        let statements: Vec<_> =
            statements.iter().map(|stmt| self.statement(stmt, top_level)).collect();
        quote!(#(#statements)*)
    }

    fn statement(&mut self, stmt: &ast::Stmt, top_level: bool) -> proc_macro2::TokenStream {
        match stmt {
            ast::Stmt::Declare { id, type_, array_size, default, .. } => {
                let code = self.declare(id, type_, array_size.as_ref(), default.as_ref());
                if top_level {
                    self.bound.insert(id.clone());
                }
                code
            }
            ast::Stmt::IfThenElse { if_, elif, else_, .. } => {
                let condition = self.value(&if_.condition);
                let body = self.statements(&if_.statements, false);
                let elif = elif
                    .iter()
                    .map(|block| {
                        let condition = self.value(&block.condition);
                        let body = self.statements(&block.statements, false);
                        quote!(else if Value::is_truthy(#condition) { #body })
                    })
                    .collect::<Vec<_>>();
                let else_ = else_.as_ref().map(|block| {
                    let body = self.statements(&block.statements, false);
                    quote!(else { #body })
                });
                quote! {
                    if Value::is_truthy(#condition) { #body }
                    #(#elif)*
                    #else_
                }
            }
            ast::Stmt::Raise { message, .. } => {
                let message = unquote(message);
                quote!(return Err(DecodeError::Raised { message: #message });)
            }
            // Recorded in the routine documentation.
            ast::Stmt::SpecialLocal { .. } => quote!(),
        }
    }

    fn element(
        &self,
        type_: &ast::FieldType,
        default: Option<&ast::Expr>,
    ) -> Result<Element, proc_macro2::TokenStream> {
        let byte_order = &self.byte_order;
        match type_ {
            ast::FieldType::Size { bytes, .. } => Ok(Element {
                setup: quote!(),
                decode: quote!(spp_runtime::raw_bytes(buf, offset, #bytes)?),
            }),
            ast::FieldType::Regular { name, .. } => match fixed_width(name) {
                Some(width) => Ok(Element {
                    setup: quote!(),
                    decode: quote! {
                        spp_runtime::decode_fixed(FixedWidth::#width, #byte_order, buf, offset)?
                    },
                }),
                None => {
                    let message = format!("unknown primitive type `{name}`");
                    Err(quote!(compile_error!(#message);))
                }
            },
            ast::FieldType::Struct { name, .. } => {
                let Some(callee) = self.registry.get(name) else {
                    return Err(quote!(return Err(DecodeError::UndefinedStruct { name: #name });));
                };
                let args: &[ast::Expr] = match default {
                    Some(ast::Expr::Call { args, .. }) => args.as_slice(),
                    _ => &[],
                };
                // Extra arguments are dropped, missing ones are
                // reported by the entry checks of the callee.
                let bindings: Vec<_> = callee
                    .param_names()
                    .zip(args)
                    .map(|(param, arg)| {
                        let value = self.value(arg);
                        quote!((#param, Value::clone(#value)))
                    })
                    .collect();
                let setup = if bindings.is_empty() {
                    quote!(let sub_args = Record::new();)
                } else {
                    quote!(let sub_args = Record::from([#(#bindings),*]);)
                };
                let routine = routine_ident(self.registry, name);
                Ok(Element {
                    setup,
                    decode: quote! {{
                        let (record, offset) = #routine(buf, offset, &sub_args)?;
                        (Value::Record(record), offset)
                    }},
                })
            }
        }
    }

    fn declare(
        &self,
        id: &str,
        type_: &ast::FieldType,
        array_size: Option<&ast::Expr>,
        default: Option<&ast::Expr>,
    ) -> proc_macro2::TokenStream {
        let Element { setup, decode } = match self.element(type_, default) {
            Ok(element) => element,
            Err(code) => return code,
        };
        match array_size {
            None => quote! {
                {
                    #setup
                    let (value, next) = #decode;
                    ctx.insert(#id, value);
                    offset = next;
                }
            },
            Some(size) => {
                let size = self.value(size);
                quote! {
                    {
                        #setup
                        let count = spp_runtime::array_count(#size)?;
                        let mut items = Vec::new();
                        for _ in 0..count {
                            let (item, next) = #decode;
                            spp_runtime::check_element(offset, next, count)?;
                            items.push(item);
                            offset = next;
                        }
                        ctx.insert(#id, Value::Array(items));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::analyzer;
    use crate::ast;
    use crate::backends::rust::generate_item;
    use crate::parser::parse_inline;
    use quote::quote;

    fn generate_struct(code: &str, name: &str) -> String {
        let mut db = ast::SourceDatabase::new();
        let file = parse_inline(&mut db, "test", code.to_owned()).expect("could not parse");
        let registry = analyzer::Registry::new(&file);
        let item = file
            .items
            .iter()
            .find(|item| item.id() == Some(name))
            .expect("struct not found");
        generate_item(&registry, item, ast::EndiannessValue::LittleEndian).to_string()
    }

    #[test]
    fn nested_struct_arguments() {
        let code = generate_struct(
            r#"
            Row(width, bpp) { pixels: uint8[width * bpp]; }
            Image { width: uint32; row: Row(width, 3, 4); }
            "#,
            "Image",
        );
        let expected = quote! {
            {
                let sub_args = Record::from([
                    ("width", Value::clone(&ctx["width"])),
                    ("bpp", Value::clone(&Value::Int(3)))
                ]);
                let (value, next) = {
                    let (record, offset) = parse_row(buf, offset, &sub_args)?;
                    (Value::Record(record), offset)
                };
                ctx.insert("row", value);
                offset = next;
            }
        };
        assert!(code.contains(&expected.to_string()), "{code}");
    }

    #[test]
    fn struct_without_arguments() {
        let code = generate_struct("Pixel { b: uint8; }\nImage { p: Pixel[2]; }", "Image");
        let expected = quote! {
            {
                let sub_args = Record::new();
                let count = spp_runtime::array_count(&Value::Int(2))?;
                let mut items = Vec::new();
                for _ in 0..count {
                    let (item, next) = {
                        let (record, offset) = parse_pixel(buf, offset, &sub_args)?;
                        (Value::Record(record), offset)
                    };
                    spp_runtime::check_element(offset, next, count)?;
                    items.push(item);
                    offset = next;
                }
                ctx.insert("p", Value::Array(items));
            }
        };
        assert!(code.contains(&expected.to_string()), "{code}");
    }

    #[test]
    fn undefined_struct() {
        let code = generate_struct("Image { p: Pixel; }", "Image");
        let expected = quote!(return Err(DecodeError::UndefinedStruct { name: "Pixel" }););
        assert!(code.contains(&expected.to_string()), "{code}");
    }

    #[test]
    fn branch_fields_are_read_defensively() {
        let code = generate_struct(
            r#"
            A {
                kind: uint8;
                if (kind == 1) { extra: uint8; n: uint8[extra]; }
                elif (kind == 2) { raise "unsupported"; }
                else { }
                tail: uint8[extra];
            }
            "#,
            "A",
        );
        let condition = quote! {
            if Value::is_truthy(&spp_runtime::ops::eq(&ctx["kind"], &Value::Int(1))?)
        };
        assert!(code.contains(&condition.to_string()), "{code}");
        let raise = quote! {
            else if Value::is_truthy(&spp_runtime::ops::eq(&ctx["kind"], &Value::Int(2))?) {
                return Err(DecodeError::Raised { message: "unsupported" });
            } else { }
        };
        assert!(code.contains(&raise.to_string()), "{code}");
        let defensive = quote!(spp_runtime::array_count(spp_runtime::or_absent(ctx.get("extra")))?);
        assert_eq!(code.matches(&defensive.to_string()).count(), 2, "{code}");
    }

    #[test]
    fn fields_are_bound_after_their_declaration() {
        let code = generate_struct("A { n: uint8[n]; m: uint8[n]; }", "A");
        let first = quote!(spp_runtime::array_count(spp_runtime::or_absent(ctx.get("n")))?);
        let second = quote!(spp_runtime::array_count(&ctx["n"])?);
        assert!(code.contains(&first.to_string()), "{code}");
        assert!(code.contains(&second.to_string()), "{code}");
    }
}
