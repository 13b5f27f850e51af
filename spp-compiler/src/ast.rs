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

use codespan_reporting::diagnostic;
use codespan_reporting::files;
use serde::Serialize;
use std::fmt;
use std::ops;

/// File identifier.
/// References a source file in the source database.
pub type FileId = usize;

/// Source database.
/// Stores the source file contents for reference.
pub type SourceDatabase = files::SimpleFiles<String, String>;

#[derive(Debug, Default, Copy, Clone, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceLocation {
    /// Byte offset into the file (counted from zero).
    pub offset: usize,
    /// Line number (counted from zero).
    pub line: usize,
    /// Column number (counted from zero)
    pub column: usize,
}

#[derive(Default, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRange {
    pub file: FileId,
    pub start: SourceLocation,
    pub end: SourceLocation,
}

/// Byte order selected for the fixed width primitives when
/// generating parsers.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndiannessValue {
    #[default]
    LittleEndian,
    BigEndian,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    #[serde(rename = "||")]
    Or,
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "|")]
    BitOr,
    #[serde(rename = "^")]
    BitXor,
    #[serde(rename = "&")]
    BitAnd,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "%")]
    Rem,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "!")]
    Not,
    #[serde(rename = "~")]
    BitNot,
}

/// Lexical class of a numeric literal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberKind {
    Integer,
    Float,
    /// Byte count literal such as `2B`.
    Size,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum Expr {
    #[serde(rename = "identifier")]
    Identifier { loc: SourceRange, name: String },
    #[serde(rename = "field_access")]
    FieldAccess { loc: SourceRange, target: Box<Expr>, field: String },
    #[serde(rename = "call_expression")]
    Call { loc: SourceRange, callee: String, args: Vec<Expr> },
    /// Numeric literal; `raw` is the lexeme with digit separators
    /// removed.
    #[serde(rename = "number_literal")]
    Number { loc: SourceRange, raw: String, number_kind: NumberKind },
    /// String literal; `raw` is the lexeme including the quotes.
    #[serde(rename = "string_literal")]
    String { loc: SourceRange, raw: String },
    #[serde(rename = "binary_expression")]
    Binary { loc: SourceRange, left: Box<Expr>, op: BinaryOp, right: Box<Expr> },
    #[serde(rename = "unary_expression")]
    Unary { loc: SourceRange, op: UnaryOp, operand: Box<Expr> },
}

/// Type of a declared field.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum FieldType {
    /// Raw byte span, e.g. `2B`.
    #[serde(rename = "size_type")]
    Size { loc: SourceRange, raw: String, bytes: usize },
    /// Fixed width primitive, e.g. `uint32`.
    #[serde(rename = "regular_type")]
    Regular { loc: SourceRange, name: String },
    /// Reference to a struct declaration.
    #[serde(rename = "struct_type")]
    Struct { loc: SourceRange, name: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct Block {
    pub loc: SourceRange,
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename = "conditional_block")]
pub struct ConditionalBlock {
    pub loc: SourceRange,
    pub condition: Expr,
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum Stmt {
    /// Field declaration `id: type(args)[size] = default;`.
    /// Constructor arguments are stored as a `Call` default.
    #[serde(rename = "declare_statement")]
    Declare {
        loc: SourceRange,
        id: String,
        #[serde(rename = "type")]
        type_: FieldType,
        array_size: Option<Expr>,
        default: Option<Expr>,
    },
    #[serde(rename = "special_local")]
    SpecialLocal { loc: SourceRange, name: String, arg: Option<String> },
    #[serde(rename = "if_then_else")]
    IfThenElse {
        loc: SourceRange,
        #[serde(rename = "if")]
        if_: ConditionalBlock,
        elif: Vec<ConditionalBlock>,
        #[serde(rename = "else")]
        else_: Option<Block>,
    },
    /// `raise "message";`, the message is the raw string lexeme.
    #[serde(rename = "raise_statement")]
    Raise { loc: SourceRange, message: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename = "identifier")]
pub struct Identifier {
    pub loc: SourceRange,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum StructBody {
    #[serde(rename = "block")]
    Block(Block),
    /// Code in the target language, emitted verbatim.
    #[serde(rename = "passthrough")]
    Passthrough { loc: SourceRange, code: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct Struct {
    pub loc: SourceRange,
    pub id: String,
    pub params: Vec<Identifier>,
    pub body: StructBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum Item {
    #[serde(rename = "struct_declaration")]
    Struct(Struct),
    #[serde(rename = "preprocessor_directive")]
    Preprocessor { loc: SourceRange, name: String, args: Vec<String> },
    #[serde(rename = "special_global")]
    SpecialGlobal { loc: SourceRange, name: String, arg: Option<String> },
}

#[derive(Debug, Serialize, Clone)]
pub struct File {
    pub file: FileId,
    pub items: Vec<Item>,
}

impl SourceLocation {
    /// Construct a new source location.
    ///
    /// The `line_starts` indicates the byte offsets where new lines
    /// start in the file. The first element should thus be `0` since
    /// every file has at least one line starting at offset `0`.
    pub fn new(offset: usize, line_starts: &[usize]) -> SourceLocation {
        let line = line_starts.partition_point(|start| *start <= offset).saturating_sub(1);
        let column = offset - line_starts.get(line).copied().filter(|s| *s <= offset).unwrap_or(0);
        SourceLocation { offset, line, column }
    }
}

impl SourceRange {
    pub fn primary(&self) -> diagnostic::Label<FileId> {
        diagnostic::Label::primary(self.file, self.start.offset..self.end.offset)
    }
    pub fn secondary(&self) -> diagnostic::Label<FileId> {
        diagnostic::Label::secondary(self.file, self.start.offset..self.end.offset)
    }
}

impl fmt::Display for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(f, "{}:{}-{}", self.start.line, self.start.column, self.end.column)
        } else {
            write!(
                f,
                "{}:{}-{}:{}",
                self.start.line, self.start.column, self.end.line, self.end.column
            )
        }
    }
}

impl fmt::Debug for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceRange").finish_non_exhaustive()
    }
}

impl ops::Add<SourceRange> for SourceRange {
    type Output = SourceRange;

    fn add(self, rhs: SourceRange) -> SourceRange {
        SourceRange {
            file: self.file,
            start: self.start.min(rhs.start),
            end: self.end.max(rhs.end),
        }
    }
}

impl BinaryOp {
    /// Binding strength, higher binds tighter. All binary
    /// operators are left associative.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::BitOr => 3,
            BinaryOp::BitXor => 4,
            BinaryOp::BitAnd => 5,
            BinaryOp::Eq | BinaryOp::Ne => 6,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 7,
            BinaryOp::Add | BinaryOp::Sub => 8,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 9,
        }
    }

    pub fn from_lexeme(lexeme: &str) -> Option<BinaryOp> {
        Some(match lexeme {
            "||" => BinaryOp::Or,
            "&&" => BinaryOp::And,
            "|" => BinaryOp::BitOr,
            "^" => BinaryOp::BitXor,
            "&" => BinaryOp::BitAnd,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "<" => BinaryOp::Lt,
            "<=" => BinaryOp::Le,
            ">" => BinaryOp::Gt,
            ">=" => BinaryOp::Ge,
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Rem,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::BitAnd => "&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        }
    }
}

impl UnaryOp {
    pub fn from_lexeme(lexeme: &str) -> Option<UnaryOp> {
        Some(match lexeme {
            "+" => UnaryOp::Plus,
            "-" => UnaryOp::Minus,
            "!" => UnaryOp::Not,
            "~" => UnaryOp::BitNot,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
        }
    }
}

/// Parse the digits of an integer lexeme, honoring the `0x`, `0o`
/// and `0b` radix prefixes. Digit separators must already be removed.
pub fn parse_integer(raw: &str) -> Option<u128> {
    let (digits, radix) = match raw.get(..2).map(|prefix| prefix.to_ascii_lowercase()) {
        Some(prefix) if prefix == "0x" => (&raw[2..], 16),
        Some(prefix) if prefix == "0o" => (&raw[2..], 8),
        Some(prefix) if prefix == "0b" => (&raw[2..], 2),
        _ => (raw, 10),
    };
    u128::from_str_radix(digits, radix).ok()
}

/// Byte count of a size lexeme such as `2B` or `0x10b`.
pub fn parse_size(raw: &str) -> Option<usize> {
    let digits = raw.strip_suffix(['B', 'b'])?;
    parse_integer(digits).and_then(|bytes| usize::try_from(bytes).ok())
}

impl Expr {
    pub fn loc(&self) -> &SourceRange {
        match self {
            Expr::Identifier { loc, .. }
            | Expr::FieldAccess { loc, .. }
            | Expr::Call { loc, .. }
            | Expr::Number { loc, .. }
            | Expr::String { loc, .. }
            | Expr::Binary { loc, .. }
            | Expr::Unary { loc, .. } => loc,
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Expr::Identifier { .. } => "identifier",
            Expr::FieldAccess { .. } => "field access",
            Expr::Call { .. } => "call",
            Expr::Number { .. } => "number",
            Expr::String { .. } => "string",
            Expr::Binary { .. } => "binary expression",
            Expr::Unary { .. } => "unary expression",
        }
    }
}

impl Eq for Expr {}
impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        // Implement structural equality, leave out loc.
        match (self, other) {
            (Expr::Identifier { name: a, .. }, Expr::Identifier { name: b, .. }) => a == b,
            (
                Expr::FieldAccess { target: ta, field: fa, .. },
                Expr::FieldAccess { target: tb, field: fb, .. },
            ) => ta == tb && fa == fb,
            (Expr::Call { callee: ca, args: aa, .. }, Expr::Call { callee: cb, args: ab, .. }) => {
                ca == cb && aa == ab
            }
            (
                Expr::Number { raw: ra, number_kind: ka, .. },
                Expr::Number { raw: rb, number_kind: kb, .. },
            ) => ra == rb && ka == kb,
            (Expr::String { raw: a, .. }, Expr::String { raw: b, .. }) => a == b,
            (
                Expr::Binary { left: la, op: oa, right: ra, .. },
                Expr::Binary { left: lb, op: ob, right: rb, .. },
            ) => oa == ob && la == lb && ra == rb,
            (
                Expr::Unary { op: oa, operand: ea, .. },
                Expr::Unary { op: ob, operand: eb, .. },
            ) => oa == ob && ea == eb,
            _ => false,
        }
    }
}

/// Fully parenthesized rendering, used in diagnostics and tests.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Identifier { name, .. } => write!(f, "{name}"),
            Expr::FieldAccess { target, field, .. } => write!(f, "{target}.{field}"),
            Expr::Call { callee, args, .. } => {
                write!(f, "{callee}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Expr::Number { raw, .. } | Expr::String { raw, .. } => write!(f, "{raw}"),
            Expr::Binary { left, op, right, .. } => {
                write!(f, "({left} {} {right})", op.as_str())
            }
            Expr::Unary { op, operand, .. } => write!(f, "({}{operand})", op.as_str()),
        }
    }
}

impl FieldType {
    pub fn loc(&self) -> &SourceRange {
        match self {
            FieldType::Size { loc, .. }
            | FieldType::Regular { loc, .. }
            | FieldType::Struct { loc, .. } => loc,
        }
    }
}

impl Eq for FieldType {}
impl PartialEq for FieldType {
    fn eq(&self, other: &Self) -> bool {
        // Implement structural equality, leave out loc.
        match (self, other) {
            (FieldType::Size { bytes: a, .. }, FieldType::Size { bytes: b, .. }) => a == b,
            (FieldType::Regular { name: a, .. }, FieldType::Regular { name: b, .. })
            | (FieldType::Struct { name: a, .. }, FieldType::Struct { name: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Eq for Block {}
impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        // Implement structural equality, leave out loc.
        self.statements == other.statements
    }
}

impl Eq for ConditionalBlock {}
impl PartialEq for ConditionalBlock {
    fn eq(&self, other: &Self) -> bool {
        // Implement structural equality, leave out loc.
        self.condition == other.condition && self.statements == other.statements
    }
}

impl Stmt {
    pub fn loc(&self) -> &SourceRange {
        match self {
            Stmt::Declare { loc, .. }
            | Stmt::SpecialLocal { loc, .. }
            | Stmt::IfThenElse { loc, .. }
            | Stmt::Raise { loc, .. } => loc,
        }
    }
}

impl Eq for Stmt {}
impl PartialEq for Stmt {
    fn eq(&self, other: &Self) -> bool {
        // Implement structural equality, leave out loc.
        match (self, other) {
            (
                Stmt::Declare { id: ia, type_: ta, array_size: sa, default: da, .. },
                Stmt::Declare { id: ib, type_: tb, array_size: sb, default: db, .. },
            ) => ia == ib && ta == tb && sa == sb && da == db,
            (
                Stmt::SpecialLocal { name: na, arg: aa, .. },
                Stmt::SpecialLocal { name: nb, arg: ab, .. },
            ) => na == nb && aa == ab,
            (
                Stmt::IfThenElse { if_: ia, elif: ea, else_: la, .. },
                Stmt::IfThenElse { if_: ib, elif: eb, else_: lb, .. },
            ) => ia == ib && ea == eb && la == lb,
            (Stmt::Raise { message: a, .. }, Stmt::Raise { message: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Eq for Identifier {}
impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        // Implement structural equality, leave out loc.
        self.name == other.name
    }
}

impl Eq for StructBody {}
impl PartialEq for StructBody {
    fn eq(&self, other: &Self) -> bool {
        // Implement structural equality, leave out loc.
        match (self, other) {
            (StructBody::Block(a), StructBody::Block(b)) => a == b,
            (StructBody::Passthrough { code: a, .. }, StructBody::Passthrough { code: b, .. }) => {
                a == b
            }
            _ => false,
        }
    }
}

impl Eq for Struct {}
impl PartialEq for Struct {
    fn eq(&self, other: &Self) -> bool {
        // Implement structural equality, leave out loc.
        self.id == other.id && self.params == other.params && self.body == other.body
    }
}

impl Struct {
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|param| param.name.as_str())
    }
}

impl Eq for Item {}
impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        // Implement structural equality, leave out loc.
        match (self, other) {
            (Item::Struct(a), Item::Struct(b)) => a == b,
            (
                Item::Preprocessor { name: na, args: aa, .. },
                Item::Preprocessor { name: nb, args: ab, .. },
            ) => na == nb && aa == ab,
            (
                Item::SpecialGlobal { name: na, arg: aa, .. },
                Item::SpecialGlobal { name: nb, arg: ab, .. },
            ) => na == nb && aa == ab,
            _ => false,
        }
    }
}

impl Item {
    pub fn loc(&self) -> &SourceRange {
        match self {
            Item::Struct(Struct { loc, .. })
            | Item::Preprocessor { loc, .. }
            | Item::SpecialGlobal { loc, .. } => loc,
        }
    }

    /// Identifier of struct declarations, `None` for directives.
    pub fn id(&self) -> Option<&str> {
        match self {
            Item::Struct(decl) => Some(&decl.id),
            Item::Preprocessor { .. } | Item::SpecialGlobal { .. } => None,
        }
    }
}

impl Eq for File {}
impl PartialEq for File {
    fn eq(&self, other: &Self) -> bool {
        // Implement structural equality, leave out the file id.
        self.items == other.items
    }
}

impl File {
    pub fn new(file: FileId) -> File {
        File { file, items: vec![] }
    }

    /// Iterate over the struct declarations in source order.
    pub fn structs(&self) -> impl Iterator<Item = &Struct> {
        self.items.iter().filter_map(|item| match item {
            Item::Struct(decl) => Some(decl),
            _ => None,
        })
    }
}
