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

//! SPP compiler driver.

use argh::FromArgs;
use codespan_reporting::term::{self, termcolor};
use tracing_subscriber::EnvFilter;

use spp_compiler::{analyzer, ast, backends, parser};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    Json,
    Rust,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "rust" => Ok(Self::Rust),
            _ => Err(format!("could not parse {input:?}, valid options are 'json', 'rust'.")),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct ByteOrder(ast::EndiannessValue);

impl std::str::FromStr for ByteOrder {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_lowercase().as_str() {
            "little" => Ok(Self(ast::EndiannessValue::LittleEndian)),
            "big" => Ok(Self(ast::EndiannessValue::BigEndian)),
            _ => Err(format!("could not parse {input:?}, valid options are 'little', 'big'.")),
        }
    }
}

#[derive(FromArgs, Debug)]
/// SPP analyzer and parser generator.
struct Opt {
    #[argh(switch)]
    /// print tool version and exit.
    version: bool,

    #[argh(option, default = "OutputFormat::Rust")]
    /// generate output in this format ("rust", "json").
    /// The output will be printed on stdout in all cases.
    output_format: OutputFormat,

    #[argh(option, default = "ByteOrder(ast::EndiannessValue::LittleEndian)")]
    /// byte order of the fixed width fields ("little", "big").
    byte_order: ByteOrder,

    #[argh(positional)]
    /// input file.
    input_file: Option<String>,

    #[argh(option)]
    /// exclude declarations from the generated output.
    exclude_declaration: Vec<String>,

    #[argh(switch)]
    /// treat analyzer warnings as errors.
    werror: bool,
}

/// Remove declarations listed in the input filter.
fn filter_declarations(file: ast::File, exclude_declarations: &[String]) -> ast::File {
    ast::File {
        items: file
            .items
            .into_iter()
            .filter(|item| {
                item.id().map(|id| !exclude_declarations.iter().any(|e| e == id)).unwrap_or(true)
            })
            .collect(),
        ..file
    }
}

fn stderr() -> termcolor::StandardStream {
    termcolor::StandardStream::stderr(termcolor::ColorChoice::Auto)
}

fn generate_backend(opt: &Opt, input_file: &str) -> Result<(), String> {
    let mut sources = ast::SourceDatabase::new();
    let file = match parser::parse_file(&mut sources, input_file) {
        Ok(file) => filter_declarations(file, &opt.exclude_declaration),
        Err(err) => {
            let config = term::Config::default();
            term::emit_to_write_style(&mut stderr().lock(), &config, &sources, &err)
                .map_err(|err| format!("could not print error: {err}"))?;
            return Err(String::from("Error while parsing input"));
        }
    };

    let analysis = analyzer::analyze(&file);
    if !analysis.diagnostics.is_empty() {
        analysis
            .diagnostics
            .emit(&sources, &mut stderr().lock())
            .map_err(|err| format!("could not print analyzer diagnostics: {err}"))?;
        if opt.werror {
            return Err(format!("Analysis failed with {} warning(s)", analysis.diagnostics.len()));
        }
    }

    let output = match opt.output_format {
        OutputFormat::Json => backends::json::generate(&file)?,
        OutputFormat::Rust => {
            backends::rust::generate(&sources, &file, &analysis.registry, opt.byte_order.0)?
        }
    };
    println!("{output}");
    Ok(())
}

fn main() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opt: Opt = argh::from_env();

    if opt.version {
        println!("sppc {}\nCopyright (C) 2026 Google LLC", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let Some(input_file) = opt.input_file.as_ref() else {
        return Err("No input file is specified".to_owned());
    };

    tracing::debug!(%input_file, format = ?opt.output_format, "compiling");
    generate_backend(&opt, input_file)
}
