#![no_main]

use libfuzzer_sys::fuzz_target;
use spp_compiler::{analyzer, ast, backends, parser};

// Fuzz spp_compiler::backends::rust::generate.
// Any file that parses must generate syntactically valid Rust.
fuzz_target!(|source: String| {
    let mut sources = ast::SourceDatabase::new();
    let Ok(file) = parser::parse_inline(&mut sources, "input.spp", source) else {
        return;
    };
    let analysis = analyzer::analyze(&file);
    let generated = backends::rust::generate(
        &sources,
        &file,
        &analysis.registry,
        ast::EndiannessValue::LittleEndian,
    );
    assert!(generated.is_ok(), "{generated:?}");
});
