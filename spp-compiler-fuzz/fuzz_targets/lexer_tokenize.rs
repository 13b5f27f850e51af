#![no_main]

use libfuzzer_sys::fuzz_target;
use spp_compiler::lexer;

// Fuzz spp_compiler::lexer::tokenize.
fuzz_target!(|source: String| {
    let Ok(tokens) = lexer::tokenize(0, &source) else {
        return;
    };
    for token in tokens {
        assert!(token.loc.start.offset <= token.loc.end.offset);
        assert!(token.loc.end.offset <= source.len());
    }
});
