/**
 * Copyright 2022 - Jahred Love
 *
 * Redistribution and use in source and binary forms, with or without modification,
 * are permitted provided that the following conditions are met:
 *
 * 1. Redistributions of source code must retain the above copyright notice, this
 * list of conditions and the following disclaimer.
 *
 * 2. Redistributions in binary form must reproduce the above copyright notice, this
 * list of conditions and the following disclaimer in the documentation and/or other
 * materials provided with the distribution.
 *
 * 3. Neither the name of the copyright holder nor the names of its contributors may
 * be used to endorse or promote products derived from this software without specific
 * prior written permission.
 *
 * THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS “AS IS” AND
 * ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE IMPLIED
 * WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE DISCLAIMED.
 * IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT,
 * INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT
 * NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR
 * PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
 * WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE)
 * ARISING IN ANY WAY OUT OF THE USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE
 * POSSIBILITY OF SUCH DAMAGE.
 */

// Typed facts consumed from the Ivy front end.
//
// The front end owns parsing, type resolution and symbol binding; lowering
// never re-derives any of that. Each node below arrives fully typed, each
// identifier arrives classified, and compile-time constant values arrive
// pre-evaluated. An absent fact is a `MissingFact` error, never a fallback.

/// Byte range in the original source, for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub lo: usize,
    pub hi: usize,
}

impl Span {
    pub fn new(lo: usize, hi: usize) -> Self {
        Self { lo, hi }
    }

    pub fn point(at: usize) -> Self {
        Self { lo: at, hi: at }
    }
}

/// Static type of an Ivy expression, as resolved by the front end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ty {
    Bool,
    /// Machine-word signed integer.
    Int,
    /// Narrow unsigned integer; stores into byte arrays are width-coerced.
    Uint8,
    Float,
    Str,
    Symbol,
    Array(Box<Ty>, usize),
    Slice(Box<Ty>),
    Map(Box<Ty>, Box<Ty>),
    Struct(StructTy),
    Ptr(Box<Ty>),
    /// Multi-value call result; only appears as a call expression type.
    Tuple(Vec<Ty>),
    Func { params: Vec<Ty>, results: Vec<Ty> },
}

impl Ty {
    pub fn is_string(&self) -> bool {
        matches!(self, Ty::Str)
    }

    /// The struct type reached through at most one pointer indirection,
    /// if there is one.
    pub fn struct_ty(&self) -> Option<&StructTy> {
        match self {
            Ty::Struct(st) => Some(st),
            Ty::Ptr(inner) => match inner.as_ref() {
                Ty::Struct(st) => Some(st),
                _ => None,
            },
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructTy {
    pub name: String,
    pub fields: Vec<(String, Ty)>,
}

impl StructTy {
    /// Positional index of a named field (front-end fact).
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|(f, _)| f == name)
    }
}

/// Compile-time constant value of an expression, when the front end can
/// prove one.
#[derive(Clone, Debug, PartialEq)]
pub enum Const {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// Identifier classification supplied by the front end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdentClass {
    /// The conventional "ignore" placeholder (`_`).
    Blank,
    /// First definition of a local.
    NewDef,
    /// Use of an already-bound local.
    Local,
    /// Package-level variable.
    Global { pkg: String },
    /// Import qualifier; only legal as a selector base.
    Pkg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Quo,
    Gt,
    Lt,
    Eq,
    And,
    Or,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CallTarget {
    /// Function defined in an Ivy package.
    Func { pkg: String, name: String },
    /// Call into the host-runtime magic namespace.
    Intrin { name: String },
    /// Call through a function-typed expression.
    Dyn { callee: Box<Expr> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub node: ExprKind,
    pub ty: Ty,
    /// Constant value, when one exists.
    pub const_val: Option<Const>,
    pub span: Span,
}

impl Expr {
    pub fn new(node: ExprKind, ty: Ty) -> Self {
        Self {
            node,
            ty,
            const_val: None,
            span: Span::default(),
        }
    }

    pub fn with_const(mut self, cv: Const) -> Self {
        self.const_val = Some(cv);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    BoolLit(bool),
    IntLit(i64),
    FloatLit(f64),
    StrLit(String),
    Ident { name: String, class: IdentClass },
    Index { base: Box<Expr>, index: Box<Expr> },
    Selector { base: Box<Expr>, field: String },
    Binary { op: BinOp, x: Box<Expr>, y: Box<Expr> },
    Call { target: CallTarget, args: Vec<Expr> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Quo,
}

/// An assignment statement, already typed. Compound ops always have a
/// single target; plain assignment may have several.
#[derive(Clone, Debug, PartialEq)]
pub struct AssignStmt {
    pub op: AssignOp,
    pub lhs: Vec<Expr>,
    pub rhs: Vec<Expr>,
    pub span: Span,
}
