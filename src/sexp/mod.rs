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

// Symbolic intermediate representation.
//
// A `Form` tree is exclusively owned: children live in `Box`/`Vec`, never
// behind shared pointers, so `Clone` produces a structurally deep, fully
// disjoint copy. Passes may mutate a cloned tree freely without aliasing
// the original. Ordinary construction transfers ownership; cloning is an
// explicit operation reserved for the few sites that must duplicate a form
// into two independent positions.

mod rewrite;

pub use rewrite::{rewrite, Visit};

use crate::ast::{StructTy, Ty};
use crate::bytecode::instr::Op;

/// One node of the IR tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Form {
    // Atoms.
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Symbol(String),
    /// Named (package-level) variable reference; the name is already the
    /// mangled host storage name.
    Var { name: String, ty: Ty },
    /// Local binding reference.
    Local { name: String, ty: Ty },

    // Aggregate literals.
    ArrayLit { vals: Vec<Form>, ty: Ty },
    /// Non-contiguous array initialization: `indexes[i]` is the slot that
    /// receives `vals[i]`, applied to the array produced by `ctor`.
    SparseArrayLit {
        ctor: Box<Form>,
        vals: Vec<Form>,
        indexes: Vec<usize>,
        ty: Ty,
    },
    SliceLit { vals: Vec<Form>, ty: Ty },
    StructLit { vals: Vec<Form>, ty: StructTy },

    // Updates.
    ArrayUpdate {
        array: Box<Form>,
        index: Box<Form>,
        expr: Box<Form>,
    },
    SliceUpdate {
        slice: Box<Form>,
        index: Box<Form>,
        expr: Box<Form>,
    },
    StructUpdate {
        strct: Box<Form>,
        index: usize,
        expr: Box<Form>,
        ty: StructTy,
    },
    /// First definition of a local.
    Bind { name: String, init: Box<Form> },
    /// Rebinding of an existing local.
    Rebind { name: String, expr: Box<Form> },
    /// Update of a package-level variable (mangled host name).
    VarUpdate { name: String, expr: Box<Form> },

    // Control.
    FormList(Vec<Form>),
    Block(Vec<Form>),
    If {
        cond: Box<Form>,
        then: Vec<Form>,
        els: Option<Box<Form>>,
    },
    Switch {
        expr: Box<Form>,
        clauses: Vec<CaseClause>,
        default_body: Vec<Form>,
    },
    SwitchTrue {
        clauses: Vec<CaseClause>,
        default_body: Vec<Form>,
    },
    Return { results: Vec<Form> },
    ExprStmt(Box<Form>),
    Goto(String),
    Label(String),
    /// Bounded repetition with a static count.
    Repeat { n: i64, body: Vec<Form> },
    /// Counted iteration with a dynamic bound.
    DoTimes {
        n: Box<Form>,
        iter: String,
        step: Box<Form>,
        body: Vec<Form>,
    },
    Loop {
        init: Box<Form>,
        post: Box<Form>,
        body: Vec<Form>,
    },
    /// Pre-test loop with init and post forms.
    While {
        init: Box<Form>,
        cond: Box<Form>,
        post: Box<Form>,
        body: Vec<Form>,
    },

    // Reads.
    ArrayIndex { array: Box<Form>, index: Box<Form> },
    SliceIndex { slice: Box<Form>, index: Box<Form> },
    StructIndex {
        strct: Box<Form>,
        index: usize,
        ty: StructTy,
    },
    ArraySlice {
        array: Box<Form>,
        ty: Ty,
        bounds: Bounds,
    },
    SliceSlice { slice: Box<Form>, bounds: Bounds },

    TypeAssert { expr: Box<Form>, ty: Ty },
    TypeCast { expr: Box<Form>, ty: Ty },

    // Calls.
    /// Direct call to a compiled Ivy function (mangled host name).
    Call { fn_name: String, args: Vec<Form> },
    /// Call into the host Lisp namespace.
    LispCall { fn_sym: String, args: Vec<Form> },
    /// Call through a function-typed value.
    DynCall {
        callable: Box<Form>,
        args: Vec<Form>,
        ty: Ty,
    },
    /// Raw instruction call, resolved through the instruction-spec table.
    InstrCall { op: Op, args: Vec<Form> },

    // Short-circuit combinators.
    And { x: Box<Form>, y: Box<Form> },
    Or { x: Box<Form>, y: Box<Form> },

    /// Scoped bindings yielding either an expression or a statement.
    Let {
        bindings: Vec<Binding>,
        body: LetBody,
    },

    /// The empty statement/expression.
    Empty,
}

/// Optional low/high sub-forms of a slicing expression.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bounds {
    pub low: Option<Box<Form>>,
    pub high: Option<Box<Form>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CaseClause {
    pub expr: Form,
    pub body: Vec<Form>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    pub name: String,
    pub init: Form,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LetBody {
    Expr(Box<Form>),
    Stmt(Box<Form>),
}

impl Form {
    /// True if the form is guaranteed to end control flow in its enclosing
    /// sequence. Computed structurally, never from flags set elsewhere.
    pub fn is_returning(&self) -> bool {
        match self {
            Form::Return { .. } | Form::Goto(_) => true,
            Form::Block(forms) | Form::FormList(forms) => {
                forms.last().is_some_and(|f| f.is_returning())
            }
            _ => false,
        }
    }
}

fn instr_call2(op: Op, x: Form, y: Form) -> Form {
    Form::InstrCall {
        op,
        args: vec![x, y],
    }
}

pub fn new_add(x: Form, y: Form) -> Form {
    instr_call2(Op::NumAdd, x, y)
}

pub fn new_sub(x: Form, y: Form) -> Form {
    instr_call2(Op::NumSub, x, y)
}

pub fn new_mul(x: Form, y: Form) -> Form {
    instr_call2(Op::NumMul, x, y)
}

pub fn new_quo(x: Form, y: Form) -> Form {
    instr_call2(Op::NumQuo, x, y)
}

pub fn new_num_gt(x: Form, y: Form) -> Form {
    instr_call2(Op::NumGt, x, y)
}

pub fn new_num_lt(x: Form, y: Form) -> Form {
    instr_call2(Op::NumLt, x, y)
}

pub fn new_num_eq(x: Form, y: Form) -> Form {
    instr_call2(Op::NumEq, x, y)
}

pub fn new_concat(x: Form, y: Form) -> Form {
    instr_call2(Op::Concat, x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Ty;

    fn sample_tree() -> Form {
        Form::If {
            cond: Box::new(new_num_gt(
                Form::Local {
                    name: "x".into(),
                    ty: Ty::Int,
                },
                Form::Int(0),
            )),
            then: vec![Form::Return {
                results: vec![Form::Str("pos".into())],
            }],
            els: Some(Box::new(Form::Block(vec![Form::Return {
                results: vec![Form::Str("neg".into())],
            }]))),
        }
    }

    #[test]
    fn clone_is_structurally_equal() {
        let tree = sample_tree();
        assert_eq!(tree.clone(), tree);
    }

    #[test]
    fn clone_shares_no_substructure() {
        let tree = sample_tree();
        let mut copy = tree.clone();
        if let Form::If { then, .. } = &mut copy {
            then.clear();
        } else {
            panic!("sample tree is not an If");
        }
        // The original keeps its then-branch.
        match &tree {
            Form::If { then, .. } => assert_eq!(then.len(), 1),
            _ => panic!("sample tree is not an If"),
        }
        assert_ne!(copy, tree);
    }

    #[test]
    fn returning_is_structural() {
        assert!(Form::Return { results: vec![] }.is_returning());
        assert!(Form::Goto("done".into()).is_returning());
        assert!(Form::Block(vec![Form::Empty, Form::Goto("l".into())]).is_returning());
        assert!(!Form::Block(vec![Form::Goto("l".into()), Form::Empty]).is_returning());
        assert!(!Form::Empty.is_returning());
        assert!(!Form::Block(vec![]).is_returning());
        // Transitive through nested sequences.
        assert!(Form::FormList(vec![Form::Block(vec![Form::Return { results: vec![] }])])
            .is_returning());
    }
}
