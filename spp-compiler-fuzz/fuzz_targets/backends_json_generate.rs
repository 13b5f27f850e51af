#![no_main]

use libfuzzer_sys::fuzz_target;
use spp_compiler::{ast, backends, parser};

// Fuzz spp_compiler::backends::json::generate.
fuzz_target!(|source: String| {
    let mut sources = ast::SourceDatabase::new();
    let Ok(file) = parser::parse_inline(&mut sources, "input.spp", source) else {
        return;
    };
    let _ = backends::json::generate(&file);
});
