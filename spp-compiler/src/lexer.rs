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

//! Tokenizer for SPP source files.

use crate::ast;
use codespan_reporting::diagnostic::Diagnostic;
use codespan_reporting::files;
use pest::iterators::Pair;
use pest::Parser;
use std::fmt;

// Token level grammar. Alternatives are tried in order, so floats
// win over integers and operators over punctuation. The `error` rule
// captures the offending input when no token matches.
#[derive(pest_derive::Parser)]
#[grammar_inline = r##"
WHITESPACE = _{ " " | "\n" | "\r" | "\t" }
COMMENT = _{ block_comment | line_comment }

block_comment = _{ "/*" ~ (!"*/" ~ ANY)* ~ "*/" }
line_comment = _{ "//" ~ (!"\n" ~ ANY)* }

dec_digits = _{ ASCII_DIGIT ~ (ASCII_DIGIT | "_")* }
exponent = _{ ("e" | "E") ~ ("+" | "-")? ~ ASCII_DIGIT+ }

float = @{
    dec_digits ~ "." ~ dec_digits ~ exponent?
  | dec_digits ~ "." ~ exponent?
  | "." ~ dec_digits ~ exponent?
  | dec_digits ~ exponent
}
integer = @{
    ("0b" | "0B") ~ "_"* ~ ASCII_BIN_DIGIT ~ (ASCII_BIN_DIGIT | "_")*
  | ("0o" | "0O") ~ "_"* ~ ASCII_OCT_DIGIT ~ (ASCII_OCT_DIGIT | "_")*
  | ("0x" | "0X") ~ "_"* ~ ASCII_HEX_DIGIT ~ (ASCII_HEX_DIGIT | "_")*
  | dec_digits
}
string = @{ "\"" ~ ("\\" ~ ANY | !("\"" | "\\") ~ ANY)* ~ "\"" }
identifier = @{ (ASCII_ALPHA | "_") ~ (ASCII_ALPHANUMERIC | "_")* }
operator = @{
    "||" | "&&" | "<=" | ">=" | "==" | "!="
  | "+" | "-" | "*" | !"/*" ~ "/" | "%"
  | "&" | "|" | "^" | "~" | "!" | "<" | ">" | "."
}
punctuation = @{ "(" | ")" | "{" | "}" | "[" | "]" | "," | ":" | ";" | "=" | "#" | "@" }

unterminated_string = { "\"" ~ ANY* }
unterminated_comment = { "/*" ~ ANY* }
unexpected_character = { ANY }
error = ${ unterminated_string | unterminated_comment | unexpected_character }

token = _{ float | integer | string | identifier | operator | punctuation }
tokens = { SOI ~ token* ~ (EOI | error) }
"##]
struct SppLexer;

const KEYWORDS: &[&str] = &[
    "struct",
    "if",
    "elif",
    "else",
    "raise",
    "reserve",
    "noreserve",
    "endian",
    "front",
    "behind",
    "big",
    "little",
];

const REGULAR_SIZES: &[&str] =
    &["uint8", "uint16", "uint32", "uint64", "int8", "int16", "int32", "int64", "float", "double"];

const PREPROCESSOR_KEYWORDS: &[&str] = &["define", "undef", "ifdef", "ifndef", "endif"];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Integer,
    Float,
    /// Integer immediately followed by `B` or `b`, e.g. `2B`.
    Size,
    String,
    Keyword,
    RegularSize,
    Preprocessor,
    Operator,
    ParenLeft,
    ParenRight,
    BraceLeft,
    BraceRight,
    BracketLeft,
    BracketRight,
    Comma,
    Colon,
    Semicolon,
    Equal,
    Hash,
    At,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token. Digit separators are removed
    /// from numeric lexemes.
    pub lexeme: String,
    pub loc: ast::SourceRange,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("unterminated string literal")]
    UnterminatedString { loc: ast::SourceRange },
    #[error("unterminated block comment")]
    UnterminatedComment { loc: ast::SourceRange },
    #[error("unexpected character `{character}`")]
    UnexpectedCharacter { character: char, loc: ast::SourceRange },
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Integer => "integer",
            TokenKind::Float => "float",
            TokenKind::Size => "size",
            TokenKind::String => "string",
            TokenKind::Keyword => "keyword",
            TokenKind::RegularSize => "primitive type",
            TokenKind::Preprocessor => "preprocessor keyword",
            TokenKind::Operator => "operator",
            TokenKind::ParenLeft => "`(`",
            TokenKind::ParenRight => "`)`",
            TokenKind::BraceLeft => "`{`",
            TokenKind::BraceRight => "`}`",
            TokenKind::BracketLeft => "`[`",
            TokenKind::BracketRight => "`]`",
            TokenKind::Comma => "`,`",
            TokenKind::Colon => "`:`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Equal => "`=`",
            TokenKind::Hash => "`#`",
            TokenKind::At => "`@`",
        })
    }
}

impl Token {
    /// Check the token kind and lexeme at once, used for keywords
    /// and operators.
    pub fn is(&self, kind: TokenKind, lexeme: &str) -> bool {
        self.kind == kind && self.lexeme == lexeme
    }
}

impl LexError {
    pub fn loc(&self) -> &ast::SourceRange {
        match self {
            LexError::UnterminatedString { loc }
            | LexError::UnterminatedComment { loc }
            | LexError::UnexpectedCharacter { loc, .. } => loc,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic<ast::FileId> {
        Diagnostic::error()
            .with_message(self.to_string())
            .with_labels(vec![self.loc().primary()])
    }
}

struct Context<'a> {
    file: ast::FileId,
    line_starts: &'a [usize],
}

impl Context<'_> {
    fn loc(&self, pair: &Pair<'_, Rule>) -> ast::SourceRange {
        let span = pair.as_span();
        ast::SourceRange {
            file: self.file,
            start: ast::SourceLocation::new(span.start(), self.line_starts),
            end: ast::SourceLocation::new(span.end(), self.line_starts),
        }
    }
}

fn classify_word(word: &str) -> TokenKind {
    if KEYWORDS.contains(&word) {
        TokenKind::Keyword
    } else if REGULAR_SIZES.contains(&word) {
        TokenKind::RegularSize
    } else if PREPROCESSOR_KEYWORDS.contains(&word) {
        TokenKind::Preprocessor
    } else {
        TokenKind::Identifier
    }
}

fn punctuation_kind(lexeme: &str) -> TokenKind {
    match lexeme {
        "(" => TokenKind::ParenLeft,
        ")" => TokenKind::ParenRight,
        "{" => TokenKind::BraceLeft,
        "}" => TokenKind::BraceRight,
        "[" => TokenKind::BracketLeft,
        "]" => TokenKind::BracketRight,
        "," => TokenKind::Comma,
        ":" => TokenKind::Colon,
        ";" => TokenKind::Semicolon,
        "=" => TokenKind::Equal,
        "#" => TokenKind::Hash,
        _ => TokenKind::At,
    }
}

fn lex_error(pair: Pair<'_, Rule>, context: &Context) -> LexError {
    let inner = pair.into_inner().next();
    let Some(inner) = inner else {
        return LexError::UnexpectedCharacter { character: '\0', loc: ast::SourceRange::default() };
    };
    let loc = context.loc(&inner);
    match inner.as_rule() {
        Rule::unterminated_string => LexError::UnterminatedString { loc },
        Rule::unterminated_comment => LexError::UnterminatedComment { loc },
        _ => LexError::UnexpectedCharacter {
            character: inner.as_str().chars().next().unwrap_or_default(),
            loc,
        },
    }
}

/// Split the source text into tokens.
///
/// Keywords, primitive type names and preprocessor keywords are
/// recognized among identifiers, and an integer directly followed by
/// the identifier `B` or `b` is merged into a single size token.
pub fn tokenize(file: ast::FileId, source: &str) -> Result<Vec<Token>, LexError> {
    let line_starts: Vec<_> = files::line_starts(source).collect();
    let context = Context { file, line_starts: &line_starts };
    let root = SppLexer::parse(Rule::tokens, source)
        .map_err(|err| {
            let offset = match err.location {
                pest::error::InputLocation::Pos(pos) => pos,
                pest::error::InputLocation::Span((start, _)) => start,
            };
            let location = ast::SourceLocation::new(offset, &line_starts);
            LexError::UnexpectedCharacter {
                character: source[offset..].chars().next().unwrap_or_default(),
                loc: ast::SourceRange { file, start: location, end: location },
            }
        })?
        .next();

    let mut tokens: Vec<Token> = vec![];
    for pair in root.into_iter().flat_map(|root| root.into_inner()) {
        let loc = context.loc(&pair);
        let kind = match pair.as_rule() {
            Rule::EOI => break,
            Rule::error => return Err(lex_error(pair, &context)),
            Rule::float => TokenKind::Float,
            Rule::integer => TokenKind::Integer,
            Rule::string => TokenKind::String,
            Rule::operator => TokenKind::Operator,
            Rule::punctuation => punctuation_kind(pair.as_str()),
            Rule::identifier => {
                let word = pair.as_str();
                if word == "B" || word == "b" {
                    if let Some(integer) =
                        tokens.last_mut().filter(|last| last.kind == TokenKind::Integer)
                    {
                        integer.kind = TokenKind::Size;
                        integer.lexeme.push_str(word);
                        integer.loc = integer.loc + loc;
                        continue;
                    }
                }
                classify_word(word)
            }
            _ => continue,
        };
        let lexeme = match kind {
            TokenKind::Integer | TokenKind::Float => pair.as_str().replace('_', ""),
            _ => pair.as_str().to_owned(),
        };
        tokens.push(Token { kind, lexeme, loc });
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<(TokenKind, String)> {
        tokenize(0, source)
            .unwrap()
            .into_iter()
            .map(|token| (token.kind, token.lexeme))
            .collect()
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).into_iter().map(|(kind, _)| kind).collect()
    }

    #[test]
    fn empty_source() {
        assert_eq!(lex(""), vec![]);
        assert_eq!(lex("  // only a comment\n /* and another */ "), vec![]);
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            lex("struct Pixel uint8 ifdef structure"),
            vec![
                (TokenKind::Keyword, "struct".to_owned()),
                (TokenKind::Identifier, "Pixel".to_owned()),
                (TokenKind::RegularSize, "uint8".to_owned()),
                (TokenKind::Preprocessor, "ifdef".to_owned()),
                (TokenKind::Identifier, "structure".to_owned()),
            ]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            lex("1_000 0x1F 0b1010 0o17 1.5 .5 2. 1e3 2.5e-3"),
            vec![
                (TokenKind::Integer, "1000".to_owned()),
                (TokenKind::Integer, "0x1F".to_owned()),
                (TokenKind::Integer, "0b1010".to_owned()),
                (TokenKind::Integer, "0o17".to_owned()),
                (TokenKind::Float, "1.5".to_owned()),
                (TokenKind::Float, ".5".to_owned()),
                (TokenKind::Float, "2.".to_owned()),
                (TokenKind::Float, "1e3".to_owned()),
                (TokenKind::Float, "2.5e-3".to_owned()),
            ]
        );
    }

    #[test]
    fn size_merge() {
        assert_eq!(lex("2B"), vec![(TokenKind::Size, "2B".to_owned())]);
        assert_eq!(lex("4 b"), vec![(TokenKind::Size, "4b".to_owned())]);
        assert_eq!(
            lex("22 Bx"),
            vec![
                (TokenKind::Integer, "22".to_owned()),
                (TokenKind::Identifier, "Bx".to_owned()),
            ]
        );
        assert_eq!(
            lex("x B"),
            vec![
                (TokenKind::Identifier, "x".to_owned()),
                (TokenKind::Identifier, "B".to_owned()),
            ]
        );
    }

    #[test]
    fn operators_and_punctuation() {
        assert_eq!(
            kinds("a==b!=c<=d>=e&&f||g = h; x.y"),
            vec![
                TokenKind::Identifier,
                TokenKind::Operator,
                TokenKind::Identifier,
                TokenKind::Operator,
                TokenKind::Identifier,
                TokenKind::Operator,
                TokenKind::Identifier,
                TokenKind::Operator,
                TokenKind::Identifier,
                TokenKind::Operator,
                TokenKind::Identifier,
                TokenKind::Operator,
                TokenKind::Identifier,
                TokenKind::Equal,
                TokenKind::Identifier,
                TokenKind::Semicolon,
                TokenKind::Identifier,
                TokenKind::Operator,
                TokenKind::Identifier,
            ]
        );
        assert_eq!(
            kinds("#@(){}[],:"),
            vec![
                TokenKind::Hash,
                TokenKind::At,
                TokenKind::ParenLeft,
                TokenKind::ParenRight,
                TokenKind::BraceLeft,
                TokenKind::BraceRight,
                TokenKind::BracketLeft,
                TokenKind::BracketRight,
                TokenKind::Comma,
                TokenKind::Colon,
            ]
        );
    }

    #[test]
    fn strings_keep_quotes_and_escapes() {
        assert_eq!(
            lex(r#""bad \"magic\"""#),
            vec![(TokenKind::String, r#""bad \"magic\"""#.to_owned())]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("a /* b \n c */ d // e\n f"),
            vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Identifier]
        );
    }

    #[test]
    fn token_locations() {
        let tokens = tokenize(0, "struct\n  Pixel").unwrap();
        assert_eq!(tokens[1].loc.start, ast::SourceLocation { offset: 9, line: 1, column: 2 });
        assert_eq!(tokens[1].loc.end, ast::SourceLocation { offset: 14, line: 1, column: 7 });
    }

    #[test]
    fn unterminated_string() {
        assert!(matches!(tokenize(0, "a \"abc"), Err(LexError::UnterminatedString { .. })));
    }

    #[test]
    fn unterminated_comment() {
        assert!(matches!(tokenize(0, "a /* abc"), Err(LexError::UnterminatedComment { .. })));
    }

    #[test]
    fn unexpected_character() {
        let err = tokenize(0, "a: uint8 $").unwrap_err();
        assert!(matches!(err, LexError::UnexpectedCharacter { character: '$', .. }));
        assert_eq!(err.loc().start.offset, 9);
    }
}
