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

// Generic structural rewrite, the single traversal entry point for every
// pass. A `Replace` result is final for that subtree: the driver does not
// descend into the replacement. A `Recurse` result hands the form back to
// the driver, which rewrites the structural children and rebuilds the node.
//
// The match below must cover exactly the children `Clone` copies; a child
// reachable by one but not the other would make patches silently invisible
// to the other operation.

use super::{Binding, Bounds, CaseClause, Form, LetBody};

/// Visitor verdict for one node.
pub enum Visit {
    /// Use this form in place of the visited one; do not descend further.
    Replace(Form),
    /// No replacement; recurse into the structural children.
    Recurse(Form),
}

/// Rewrite `form` under `visit`, consuming the input tree. The visitor
/// sees each node before its children.
pub fn rewrite<F>(form: Form, visit: &mut F) -> Form
where
    F: FnMut(Form) -> Visit,
{
    match visit(form) {
        Visit::Replace(replacement) => replacement,
        Visit::Recurse(form) => rewrite_children(form, visit),
    }
}

fn walk<F>(form: Box<Form>, visit: &mut F) -> Box<Form>
where
    F: FnMut(Form) -> Visit,
{
    Box::new(rewrite(*form, visit))
}

fn walk_opt<F>(form: Option<Box<Form>>, visit: &mut F) -> Option<Box<Form>>
where
    F: FnMut(Form) -> Visit,
{
    form.map(|f| walk(f, visit))
}

fn walk_list<F>(forms: Vec<Form>, visit: &mut F) -> Vec<Form>
where
    F: FnMut(Form) -> Visit,
{
    forms.into_iter().map(|f| rewrite(f, visit)).collect()
}

fn walk_bounds<F>(bounds: Bounds, visit: &mut F) -> Bounds
where
    F: FnMut(Form) -> Visit,
{
    Bounds {
        low: walk_opt(bounds.low, visit),
        high: walk_opt(bounds.high, visit),
    }
}

fn walk_clauses<F>(clauses: Vec<CaseClause>, visit: &mut F) -> Vec<CaseClause>
where
    F: FnMut(Form) -> Visit,
{
    clauses
        .into_iter()
        .map(|cc| CaseClause {
            expr: rewrite(cc.expr, visit),
            body: walk_list(cc.body, visit),
        })
        .collect()
}

fn walk_bindings<F>(bindings: Vec<Binding>, visit: &mut F) -> Vec<Binding>
where
    F: FnMut(Form) -> Visit,
{
    bindings
        .into_iter()
        .map(|b| Binding {
            name: b.name,
            init: rewrite(b.init, visit),
        })
        .collect()
}

fn rewrite_children<F>(form: Form, visit: &mut F) -> Form
where
    F: FnMut(Form) -> Visit,
{
    match form {
        // Leaves the visitor declined are returned unchanged.
        Form::Bool(_)
        | Form::Int(_)
        | Form::Float(_)
        | Form::Str(_)
        | Form::Symbol(_)
        | Form::Var { .. }
        | Form::Local { .. }
        | Form::Goto(_)
        | Form::Label(_)
        | Form::Empty => form,

        Form::ArrayLit { vals, ty } => Form::ArrayLit {
            vals: walk_list(vals, visit),
            ty,
        },
        Form::SparseArrayLit {
            ctor,
            vals,
            indexes,
            ty,
        } => Form::SparseArrayLit {
            ctor: walk(ctor, visit),
            vals: walk_list(vals, visit),
            indexes,
            ty,
        },
        Form::SliceLit { vals, ty } => Form::SliceLit {
            vals: walk_list(vals, visit),
            ty,
        },
        Form::StructLit { vals, ty } => Form::StructLit {
            vals: walk_list(vals, visit),
            ty,
        },

        Form::ArrayUpdate { array, index, expr } => Form::ArrayUpdate {
            array: walk(array, visit),
            index: walk(index, visit),
            expr: walk(expr, visit),
        },
        Form::SliceUpdate { slice, index, expr } => Form::SliceUpdate {
            slice: walk(slice, visit),
            index: walk(index, visit),
            expr: walk(expr, visit),
        },
        Form::StructUpdate {
            strct,
            index,
            expr,
            ty,
        } => Form::StructUpdate {
            strct: walk(strct, visit),
            index,
            expr: walk(expr, visit),
            ty,
        },
        Form::Bind { name, init } => Form::Bind {
            name,
            init: walk(init, visit),
        },
        Form::Rebind { name, expr } => Form::Rebind {
            name,
            expr: walk(expr, visit),
        },
        Form::VarUpdate { name, expr } => Form::VarUpdate {
            name,
            expr: walk(expr, visit),
        },

        Form::FormList(forms) => Form::FormList(walk_list(forms, visit)),
        Form::Block(forms) => Form::Block(walk_list(forms, visit)),
        Form::If { cond, then, els } => Form::If {
            cond: walk(cond, visit),
            then: walk_list(then, visit),
            els: walk_opt(els, visit),
        },
        Form::Switch {
            expr,
            clauses,
            default_body,
        } => Form::Switch {
            expr: walk(expr, visit),
            clauses: walk_clauses(clauses, visit),
            default_body: walk_list(default_body, visit),
        },
        Form::SwitchTrue {
            clauses,
            default_body,
        } => Form::SwitchTrue {
            clauses: walk_clauses(clauses, visit),
            default_body: walk_list(default_body, visit),
        },
        Form::Return { results } => Form::Return {
            results: walk_list(results, visit),
        },
        Form::ExprStmt(expr) => Form::ExprStmt(walk(expr, visit)),
        Form::Repeat { n, body } => Form::Repeat {
            n,
            body: walk_list(body, visit),
        },
        Form::DoTimes {
            n,
            iter,
            step,
            body,
        } => Form::DoTimes {
            n: walk(n, visit),
            iter,
            step: walk(step, visit),
            body: walk_list(body, visit),
        },
        Form::Loop { init, post, body } => Form::Loop {
            init: walk(init, visit),
            post: walk(post, visit),
            body: walk_list(body, visit),
        },
        Form::While {
            init,
            cond,
            post,
            body,
        } => Form::While {
            init: walk(init, visit),
            cond: walk(cond, visit),
            post: walk(post, visit),
            body: walk_list(body, visit),
        },

        Form::ArrayIndex { array, index } => Form::ArrayIndex {
            array: walk(array, visit),
            index: walk(index, visit),
        },
        Form::SliceIndex { slice, index } => Form::SliceIndex {
            slice: walk(slice, visit),
            index: walk(index, visit),
        },
        Form::StructIndex { strct, index, ty } => Form::StructIndex {
            strct: walk(strct, visit),
            index,
            ty,
        },
        Form::ArraySlice { array, ty, bounds } => Form::ArraySlice {
            array: walk(array, visit),
            ty,
            bounds: walk_bounds(bounds, visit),
        },
        Form::SliceSlice { slice, bounds } => Form::SliceSlice {
            slice: walk(slice, visit),
            bounds: walk_bounds(bounds, visit),
        },

        Form::TypeAssert { expr, ty } => Form::TypeAssert {
            expr: walk(expr, visit),
            ty,
        },
        Form::TypeCast { expr, ty } => Form::TypeCast {
            expr: walk(expr, visit),
            ty,
        },

        Form::Call { fn_name, args } => Form::Call {
            fn_name,
            args: walk_list(args, visit),
        },
        Form::LispCall { fn_sym, args } => Form::LispCall {
            fn_sym,
            args: walk_list(args, visit),
        },
        Form::DynCall {
            callable,
            args,
            ty,
        } => Form::DynCall {
            callable: walk(callable, visit),
            args: walk_list(args, visit),
            ty,
        },
        Form::InstrCall { op, args } => Form::InstrCall {
            op,
            args: walk_list(args, visit),
        },

        Form::And { x, y } => Form::And {
            x: walk(x, visit),
            y: walk(y, visit),
        },
        Form::Or { x, y } => Form::Or {
            x: walk(x, visit),
            y: walk(y, visit),
        },
        Form::Let { bindings, body } => Form::Let {
            bindings: walk_bindings(bindings, visit),
            body: match body {
                LetBody::Expr(e) => LetBody::Expr(walk(e, visit)),
                LetBody::Stmt(s) => LetBody::Stmt(walk(s, visit)),
            },
        },
    }
}
