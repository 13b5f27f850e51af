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

use crate::ast;
use crate::lexer::{self, LexError, Token, TokenKind};
use codespan_reporting::diagnostic::Diagnostic;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("expected {expected}, found `{found}`")]
    UnexpectedToken { expected: String, found: String, loc: ast::SourceRange },
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEndOfInput { expected: String, loc: ast::SourceRange },
    #[error("invalid size literal `{lexeme}`")]
    InvalidSize { lexeme: String, loc: ast::SourceRange },
}

impl Error {
    pub fn loc(&self) -> &ast::SourceRange {
        match self {
            Error::Lex(err) => err.loc(),
            Error::UnexpectedToken { loc, .. }
            | Error::UnexpectedEndOfInput { loc, .. }
            | Error::InvalidSize { loc, .. } => loc,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic<ast::FileId> {
        Diagnostic::error()
            .with_message(self.to_string())
            .with_labels(vec![self.loc().primary()])
    }
}

struct Parser<'t> {
    tokens: &'t [Token],
    index: usize,
    /// Location reported for errors at the end of input.
    eof: ast::SourceRange,
}

impl<'t> Parser<'t> {
    fn new(file: ast::FileId, tokens: &'t [Token]) -> Parser<'t> {
        let eof = match tokens.last() {
            Some(token) => ast::SourceRange { file, start: token.loc.end, end: token.loc.end },
            None => ast::SourceRange { file, ..Default::default() },
        };
        Parser { tokens, index: 0, eof }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.index)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|token| token.kind == kind)
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.peek().is_some_and(|token| token.is(TokenKind::Keyword, keyword))
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.index)?;
        self.index += 1;
        Some(token)
    }

    fn eat(&mut self, kind: TokenKind) -> Option<&'t Token> {
        if self.at(kind) {
            self.advance()
        } else {
            None
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> Option<&'t Token> {
        if self.at_keyword(keyword) {
            self.advance()
        } else {
            None
        }
    }

    fn error<T>(&self, expected: impl Into<String>) -> Result<T, Error> {
        let expected = expected.into();
        Err(match self.peek() {
            Some(token) => {
                Error::UnexpectedToken { expected, found: token.lexeme.clone(), loc: token.loc }
            }
            None => Error::UnexpectedEndOfInput { expected, loc: self.eof },
        })
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&'t Token, Error> {
        match self.eat(kind) {
            Some(token) => Ok(token),
            None => self.error(kind.to_string()),
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<&'t Token, Error> {
        match self.eat_keyword(keyword) {
            Some(token) => Ok(token),
            None => self.error(format!("`{keyword}`")),
        }
    }

    fn parse_file(&mut self, file: ast::FileId) -> Result<ast::File, Error> {
        let mut items = vec![];
        while let Some(token) = self.peek() {
            items.push(match token.kind {
                TokenKind::Hash => self.parse_preprocessor()?,
                TokenKind::At => self.parse_special_global()?,
                TokenKind::Identifier => ast::Item::Struct(self.parse_struct()?),
                _ => return self.error("struct declaration or directive"),
            });
        }
        Ok(ast::File { file, items })
    }

    /// `# KEYWORD args...`, the arguments are the words and integers
    /// found on the line of the `#`.
    fn parse_preprocessor(&mut self) -> Result<ast::Item, Error> {
        let hash = self.expect(TokenKind::Hash)?;
        let name = self.expect(TokenKind::Preprocessor)?;
        let mut loc = hash.loc + name.loc;
        let mut args = vec![];
        while let Some(token) = self.peek() {
            let is_argument = matches!(
                token.kind,
                TokenKind::Identifier
                    | TokenKind::Keyword
                    | TokenKind::RegularSize
                    | TokenKind::Integer
            );
            if !is_argument || token.loc.start.line != hash.loc.start.line {
                break;
            }
            self.advance();
            loc = loc + token.loc;
            args.push(token.lexeme.clone());
        }
        Ok(ast::Item::Preprocessor { loc, name: name.lexeme.clone(), args })
    }

    fn parse_special_global(&mut self) -> Result<ast::Item, Error> {
        let at = self.expect(TokenKind::At)?;
        let name = self.expect(TokenKind::Keyword)?;
        let arg = self.eat(TokenKind::Keyword);
        let loc = at.loc + arg.map_or(name.loc, |arg| arg.loc);
        Ok(ast::Item::SpecialGlobal {
            loc,
            name: name.lexeme.clone(),
            arg: arg.map(|arg| arg.lexeme.clone()),
        })
    }

    fn parse_struct(&mut self) -> Result<ast::Struct, Error> {
        let id = self.expect(TokenKind::Identifier)?;
        let mut params = vec![];
        if self.eat(TokenKind::ParenLeft).is_some() && self.eat(TokenKind::ParenRight).is_none() {
            loop {
                let param = self.expect(TokenKind::Identifier)?;
                params.push(ast::Identifier { loc: param.loc, name: param.lexeme.clone() });
                if self.eat(TokenKind::Comma).is_none() {
                    self.expect(TokenKind::ParenRight)?;
                    break;
                }
            }
        }
        let body = match self.eat(TokenKind::String) {
            Some(code) => ast::StructBody::Passthrough {
                loc: code.loc,
                code: unquote(&code.lexeme).to_owned(),
            },
            None => ast::StructBody::Block(self.parse_block()?),
        };
        let end = match &body {
            ast::StructBody::Block(block) => block.loc,
            ast::StructBody::Passthrough { loc, .. } => *loc,
        };
        Ok(ast::Struct { loc: id.loc + end, id: id.lexeme.clone(), params, body })
    }

    fn parse_block(&mut self) -> Result<ast::Block, Error> {
        let open = self.expect(TokenKind::BraceLeft)?;
        let mut statements = vec![];
        while self.peek().is_some() && !self.at(TokenKind::BraceRight) {
            statements.push(self.parse_statement()?);
        }
        let close = self.expect(TokenKind::BraceRight)?;
        Ok(ast::Block { loc: open.loc + close.loc, statements })
    }

    fn parse_statement(&mut self) -> Result<ast::Stmt, Error> {
        let Some(token) = self.peek() else {
            return self.error("statement");
        };
        match (token.kind, token.lexeme.as_str()) {
            (TokenKind::Identifier, _) => self.parse_declare(),
            (TokenKind::Keyword, "if") => self.parse_if(),
            (TokenKind::Keyword, "raise") => self.parse_raise(),
            (TokenKind::Keyword, "reserve" | "noreserve" | "endian") => self.parse_special_local(),
            _ => self.error("statement"),
        }
    }

    fn parse_declare(&mut self) -> Result<ast::Stmt, Error> {
        let id = self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::Colon)?;
        let type_ = self.parse_field_type()?;
        let mut default = None;
        if let Some(open) = self.eat(TokenKind::ParenLeft) {
            let mut args = vec![self.parse_expr()?];
            while self.eat(TokenKind::Comma).is_some() {
                args.push(self.parse_expr()?);
            }
            let close = self.expect(TokenKind::ParenRight)?;
            let callee = match &type_ {
                ast::FieldType::Size { raw, .. } => raw.clone(),
                ast::FieldType::Regular { name, .. } | ast::FieldType::Struct { name, .. } => {
                    name.clone()
                }
            };
            default = Some(ast::Expr::Call { loc: *type_.loc() + open.loc + close.loc, callee, args });
        }
        let array_size = match self.eat(TokenKind::BracketLeft) {
            Some(_) => {
                let size = self.parse_expr()?;
                self.expect(TokenKind::BracketRight)?;
                Some(size)
            }
            None => None,
        };
        if default.is_none() && self.eat(TokenKind::Equal).is_some() {
            default = Some(self.parse_expr()?);
        }
        let semi = self.expect(TokenKind::Semicolon)?;
        Ok(ast::Stmt::Declare {
            loc: id.loc + semi.loc,
            id: id.lexeme.clone(),
            type_,
            array_size,
            default,
        })
    }

    fn parse_field_type(&mut self) -> Result<ast::FieldType, Error> {
        let Some(token) = self.peek() else {
            return self.error("type");
        };
        let type_ = match token.kind {
            TokenKind::Size => ast::FieldType::Size {
                loc: token.loc,
                raw: token.lexeme.clone(),
                bytes: size_bytes(token)?,
            },
            TokenKind::RegularSize => {
                ast::FieldType::Regular { loc: token.loc, name: token.lexeme.clone() }
            }
            TokenKind::Identifier => {
                ast::FieldType::Struct { loc: token.loc, name: token.lexeme.clone() }
            }
            _ => return self.error("type"),
        };
        self.advance();
        Ok(type_)
    }

    fn parse_if(&mut self) -> Result<ast::Stmt, Error> {
        let start = self.expect_keyword("if")?;
        let if_ = self.parse_conditional_block()?;
        let mut loc = start.loc + if_.loc;
        let mut elif = vec![];
        while self.eat_keyword("elif").is_some() {
            let block = self.parse_conditional_block()?;
            loc = loc + block.loc;
            elif.push(block);
        }
        let else_ = match self.eat_keyword("else") {
            Some(_) => {
                let block = self.parse_block()?;
                loc = loc + block.loc;
                Some(block)
            }
            None => None,
        };
        Ok(ast::Stmt::IfThenElse { loc, if_, elif, else_ })
    }

    /// `( Expr ) Block`
    fn parse_conditional_block(&mut self) -> Result<ast::ConditionalBlock, Error> {
        let open = self.expect(TokenKind::ParenLeft)?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::ParenRight)?;
        let block = self.parse_block()?;
        Ok(ast::ConditionalBlock {
            loc: open.loc + block.loc,
            condition,
            statements: block.statements,
        })
    }

    fn parse_raise(&mut self) -> Result<ast::Stmt, Error> {
        let start = self.expect_keyword("raise")?;
        let message = self.expect(TokenKind::String)?;
        let semi = self.expect(TokenKind::Semicolon)?;
        Ok(ast::Stmt::Raise { loc: start.loc + semi.loc, message: message.lexeme.clone() })
    }

    fn parse_special_local(&mut self) -> Result<ast::Stmt, Error> {
        let name = self.expect(TokenKind::Keyword)?;
        let arg = self.eat(TokenKind::Keyword);
        let semi = self.expect(TokenKind::Semicolon)?;
        Ok(ast::Stmt::SpecialLocal {
            loc: name.loc + semi.loc,
            name: name.lexeme.clone(),
            arg: arg.map(|arg| arg.lexeme.clone()),
        })
    }

    fn parse_expr(&mut self) -> Result<ast::Expr, Error> {
        self.parse_binary(1)
    }

    /// Precedence climbing over the binary operators.
    fn parse_binary(&mut self, min_precedence: u8) -> Result<ast::Expr, Error> {
        let mut left = self.parse_unary()?;
        while let Some(op) = self.peek_binary_op() {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.advance();
            let right = self.parse_binary(precedence + 1)?;
            left = ast::Expr::Binary {
                loc: *left.loc() + *right.loc(),
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn peek_binary_op(&self) -> Option<ast::BinaryOp> {
        self.peek()
            .filter(|token| token.kind == TokenKind::Operator)
            .and_then(|token| ast::BinaryOp::from_lexeme(&token.lexeme))
    }

    fn parse_unary(&mut self) -> Result<ast::Expr, Error> {
        let op = self
            .peek()
            .filter(|token| token.kind == TokenKind::Operator)
            .and_then(|token| Some((token.loc, ast::UnaryOp::from_lexeme(&token.lexeme)?)));
        match op {
            Some((loc, op)) => {
                self.advance();
                let operand = self.parse_unary()?;
                Ok(ast::Expr::Unary { loc: loc + *operand.loc(), op, operand: Box::new(operand) })
            }
            None => self.parse_postfix(),
        }
    }

    /// `Atom ("." IDENT)*`
    fn parse_postfix(&mut self) -> Result<ast::Expr, Error> {
        let mut expr = self.parse_atom()?;
        while self.peek().is_some_and(|token| token.is(TokenKind::Operator, ".")) {
            self.advance();
            let field = self.expect(TokenKind::Identifier)?;
            expr = ast::Expr::FieldAccess {
                loc: *expr.loc() + field.loc,
                target: Box::new(expr),
                field: field.lexeme.clone(),
            };
        }
        Ok(expr)
    }

    fn parse_atom(&mut self) -> Result<ast::Expr, Error> {
        let Some(token) = self.peek() else {
            return self.error("expression");
        };
        let number = |number_kind| ast::Expr::Number {
            loc: token.loc,
            raw: token.lexeme.clone(),
            number_kind,
        };
        let expr = match token.kind {
            TokenKind::Identifier => {
                ast::Expr::Identifier { loc: token.loc, name: token.lexeme.clone() }
            }
            TokenKind::Integer => number(ast::NumberKind::Integer),
            TokenKind::Float => number(ast::NumberKind::Float),
            TokenKind::Size => {
                size_bytes(token)?;
                number(ast::NumberKind::Size)
            }
            TokenKind::String => ast::Expr::String { loc: token.loc, raw: token.lexeme.clone() },
            TokenKind::ParenLeft => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::ParenRight)?;
                return Ok(expr);
            }
            _ => return self.error("expression"),
        };
        self.advance();
        Ok(expr)
    }
}

fn size_bytes(token: &Token) -> Result<usize, Error> {
    ast::parse_size(&token.lexeme)
        .ok_or_else(|| Error::InvalidSize { lexeme: token.lexeme.clone(), loc: token.loc })
}

/// Strip the surrounding quotes of a string lexeme.
pub fn unquote(lexeme: &str) -> &str {
    lexeme
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(lexeme)
}

/// Parse a token sequence produced by [`lexer::tokenize`].
pub fn parse_tokens(file: ast::FileId, tokens: &[Token]) -> Result<ast::File, Error> {
    Parser::new(file, tokens).parse_file(file)
}

/// Parse SPP source code from a string.
///
/// The file is added to the compilation database under the provided
/// name.
pub fn parse_inline(
    sources: &mut ast::SourceDatabase,
    name: &str,
    source: String,
) -> Result<ast::File, Diagnostic<ast::FileId>> {
    let file = sources.add(name.to_owned(), source.clone());
    lexer::tokenize(file, &source)
        .map_err(Error::from)
        .and_then(|tokens| parse_tokens(file, &tokens))
        .map_err(|err| err.to_diagnostic())
}

/// Parse a new source file.
///
/// The source file is fully read and added to the compilation
/// database. Returns the constructed AST, or a descriptive error
/// message in case of syntax error.
pub fn parse_file(
    sources: &mut ast::SourceDatabase,
    name: &str,
) -> Result<ast::File, Diagnostic<ast::FileId>> {
    let source = std::fs::read_to_string(name).map_err(|e| {
        Diagnostic::error().with_message(format!("failed to read input file '{}': {}", name, e))
    })?;
    parse_inline(sources, name, source)
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(source: &str) -> Result<ast::File, Error> {
        let tokens = lexer::tokenize(0, source)?;
        parse_tokens(0, &tokens)
    }

    fn parse_expr(source: &str) -> String {
        let tokens = lexer::tokenize(0, source).unwrap();
        let mut parser = Parser::new(0, &tokens);
        let expr = parser.parse_expr().unwrap();
        assert_eq!(parser.peek(), None, "trailing tokens in {source}");
        expr.to_string()
    }

    fn structs(file: &ast::File) -> Vec<&ast::Struct> {
        file.structs().collect()
    }

    fn statements(decl: &ast::Struct) -> &[ast::Stmt] {
        match &decl.body {
            ast::StructBody::Block(block) => &block.statements,
            ast::StructBody::Passthrough { .. } => panic!("unexpected passthrough body"),
        }
    }

    #[test]
    fn precedence() {
        assert_eq!(parse_expr("a + b * c"), "(a + (b * c))");
        assert_eq!(parse_expr("a * b + c"), "((a * b) + c)");
        assert_eq!(parse_expr("a || b && c"), "(a || (b && c))");
        assert_eq!(parse_expr("a | b ^ c & d"), "(a | (b ^ (c & d)))");
        assert_eq!(parse_expr("a == b < c"), "(a == (b < c))");
        assert_eq!(parse_expr("a < b + 1"), "(a < (b + 1))");
    }

    #[test]
    fn left_associativity() {
        assert_eq!(parse_expr("a - b - c"), "((a - b) - c)");
        assert_eq!(parse_expr("a / b % c"), "((a / b) % c)");
        assert_eq!(parse_expr("a == b != c"), "((a == b) != c)");
    }

    #[test]
    fn unary_and_grouping() {
        assert_eq!(parse_expr("-a * b"), "((-a) * b)");
        assert_eq!(parse_expr("!(a || b)"), "(!(a || b))");
        assert_eq!(parse_expr("~-x"), "(~(-x))");
        assert_eq!(parse_expr("(a + b) * c"), "((a + b) * c)");
    }

    #[test]
    fn field_access_chains() {
        assert_eq!(parse_expr("hdr.info.width * 3"), "(hdr.info.width * 3)");
        assert_eq!(parse_expr("-hdr.width"), "(-hdr.width)");
        let tokens = lexer::tokenize(0, "a.b.c").unwrap();
        let expr = Parser::new(0, &tokens).parse_expr().unwrap();
        assert!(matches!(
            expr,
            ast::Expr::FieldAccess { ref field, ref target, .. }
                if field == "c" && matches!(**target, ast::Expr::FieldAccess { .. })
        ));
    }

    #[test]
    fn literals() {
        assert_eq!(parse_expr("(4 - (w * 3) % 4) % 4"), "((4 - ((w * 3) % 4)) % 4)");
        assert_eq!(parse_expr("2B + 1.5"), "(2B + 1.5)");
        assert_eq!(parse_expr(r#"magic == "BM""#), r#"(magic == "BM")"#);
    }

    #[test]
    fn pixel_struct() {
        let file = parse("Pixel { blue: uint8; green: uint8; red: uint8; }").unwrap();
        let decls = structs(&file);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].id, "Pixel");
        assert!(decls[0].params.is_empty());
        let ids: Vec<_> = statements(decls[0])
            .iter()
            .map(|stmt| match stmt {
                ast::Stmt::Declare { id, .. } => id.as_str(),
                _ => panic!("unexpected statement"),
            })
            .collect();
        assert_eq!(ids, vec!["blue", "green", "red"]);
    }

    #[test]
    fn struct_parameters_and_arrays() {
        let file = parse(
            r#"
            PixelRow(width, bpp) {
                pixels: Pixel[width];
                padding: uint8[(4 - (width * (bpp / 8)) % 4) % 4];
            }
            "#,
        )
        .unwrap();
        let decl = structs(&file)[0];
        assert_eq!(decl.param_names().collect::<Vec<_>>(), vec!["width", "bpp"]);
        match &statements(decl)[0] {
            ast::Stmt::Declare { type_: ast::FieldType::Struct { name, .. }, array_size, .. } => {
                assert_eq!(name, "Pixel");
                assert_eq!(array_size.as_ref().map(|size| size.to_string()).as_deref(), Some("width"));
            }
            stmt => panic!("unexpected statement {stmt:?}"),
        }
    }

    #[test]
    fn constructor_arguments() {
        let file = parse("A { data: PixelArray(hdr.width, 24)[2]; }").unwrap();
        match &statements(structs(&file)[0])[0] {
            ast::Stmt::Declare { default: Some(ast::Expr::Call { callee, args, .. }), .. } => {
                assert_eq!(callee, "PixelArray");
                assert_eq!(args.len(), 2);
                assert_eq!(args[0].to_string(), "hdr.width");
            }
            stmt => panic!("unexpected statement {stmt:?}"),
        }
    }

    #[test]
    fn constructor_and_default_are_exclusive() {
        assert!(matches!(
            parse("A { x: B(1) = 2; }"),
            Err(Error::UnexpectedToken { ref found, .. }) if found == "="
        ));
    }

    #[test]
    fn plain_default() {
        let file = parse("A { x: uint8 = 7; }").unwrap();
        match &statements(structs(&file)[0])[0] {
            ast::Stmt::Declare { default: Some(expr), .. } => assert_eq!(expr.to_string(), "7"),
            stmt => panic!("unexpected statement {stmt:?}"),
        }
    }

    #[test]
    fn size_types() {
        let file = parse("A { magic: 2B; }").unwrap();
        assert!(matches!(
            &statements(structs(&file)[0])[0],
            ast::Stmt::Declare { type_: ast::FieldType::Size { bytes: 2, .. }, .. }
        ));
    }

    #[test]
    fn conditionals() {
        let file = parse(
            r#"
            A {
                kind: uint8;
                if (kind == 1) { a: uint8; }
                elif (kind == 2) { b: uint16; }
                elif (kind == 3) { }
                else { raise "bad kind"; }
            }
            "#,
        )
        .unwrap();
        match &statements(structs(&file)[0])[1] {
            ast::Stmt::IfThenElse { if_, elif, else_: Some(else_), .. } => {
                assert_eq!(if_.condition.to_string(), "(kind == 1)");
                assert_eq!(elif.len(), 2);
                assert!(elif[1].statements.is_empty());
                assert!(matches!(
                    &else_.statements[..],
                    [ast::Stmt::Raise { message, .. }] if message == "\"bad kind\""
                ));
            }
            stmt => panic!("unexpected statement {stmt:?}"),
        }
    }

    #[test]
    fn directives() {
        let file = parse(
            r#"
            #define FOO 1
            #ifdef FOO
            @endian little
            A { endian big; reserve; x: uint8; }
            #endif
            "#,
        )
        .unwrap();
        let expected = vec![
            ast::Item::Preprocessor {
                loc: Default::default(),
                name: "define".to_owned(),
                args: vec!["FOO".to_owned(), "1".to_owned()],
            },
            ast::Item::Preprocessor {
                loc: Default::default(),
                name: "ifdef".to_owned(),
                args: vec!["FOO".to_owned()],
            },
            ast::Item::SpecialGlobal {
                loc: Default::default(),
                name: "endian".to_owned(),
                arg: Some("little".to_owned()),
            },
        ];
        assert_eq!(file.items[..3], expected[..]);
        assert!(matches!(
            &statements(structs(&file)[0])[..2],
            [
                ast::Stmt::SpecialLocal { name: endian, arg: Some(big), .. },
                ast::Stmt::SpecialLocal { name: reserve, arg: None, .. },
            ] if endian == "endian" && big == "big" && reserve == "reserve"
        ));
        assert!(matches!(
            file.items.last(),
            Some(ast::Item::Preprocessor { name, args, .. }) if name == "endif" && args.is_empty()
        ));
    }

    #[test]
    fn passthrough_body() {
        let file = parse(r#"Custom "pub fn parse_custom() {}""#).unwrap();
        assert_eq!(
            structs(&file)[0].body,
            ast::StructBody::Passthrough {
                loc: Default::default(),
                code: "pub fn parse_custom() {}".to_owned()
            }
        );
    }

    #[test]
    fn empty_file() {
        assert_eq!(parse("").unwrap().items, vec![]);
    }

    #[test]
    fn missing_semicolon() {
        assert!(matches!(
            parse("A { x: uint8 }"),
            Err(Error::UnexpectedToken { ref expected, ref found, .. })
                if expected == "`;`" && found == "}"
        ));
    }

    #[test]
    fn unexpected_end_of_input() {
        assert!(matches!(parse("A { x: uint8;"), Err(Error::UnexpectedEndOfInput { .. })));
        assert!(matches!(parse("A { x: uint8[n"), Err(Error::UnexpectedEndOfInput { .. })));
    }

    #[test]
    fn invalid_statement() {
        assert!(matches!(parse("A { 3; }"), Err(Error::UnexpectedToken { .. })));
        assert!(matches!(parse("A { x: 3; }"), Err(Error::UnexpectedToken { .. })));
        assert!(matches!(parse("struct A {}"), Err(Error::UnexpectedToken { .. })));
    }

    #[test]
    fn lexer_errors_are_forwarded() {
        assert!(matches!(parse("A { x: \"abc"), Err(Error::Lex(LexError::UnterminatedString { .. }))));
    }

    #[test]
    fn parse_inline_reports_diagnostic() {
        let mut db = ast::SourceDatabase::new();
        let diagnostic =
            parse_inline(&mut db, "stdin", String::from("A { x: uint8 }")).unwrap_err();
        assert_eq!(diagnostic.message, "expected `;`, found `}`");
        assert_eq!(diagnostic.labels.len(), 1);
    }
}
