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

// Assignment lowering.
//
// Five shapes: compound arithmetic assignment, equal-arity assignment,
// single-source multi-target assignment, assignment to the ignore
// placeholder, and the destination-kind dispatch shared by all of them.

use crate::ast::{AssignOp, AssignStmt, Expr, ExprKind, IdentClass, Ty};
use crate::error::CompileError;
use crate::names;
use crate::rt;
use crate::sexp::{self, Form};

use super::{copy_value, lower_expr, LowerCtx};

/// Lower one assignment statement to a form.
pub fn lower_assign(ctx: &mut LowerCtx, node: &AssignStmt) -> Result<Form, CompileError> {
    match node.op {
        AssignOp::Add => add_assign(ctx, &node.lhs[0], &node.rhs[0]),
        AssignOp::Sub => arith_assign(ctx, &node.lhs[0], &node.rhs[0], sexp::new_sub),
        AssignOp::Mul => arith_assign(ctx, &node.lhs[0], &node.rhs[0], sexp::new_mul),
        AssignOp::Quo => arith_assign(ctx, &node.lhs[0], &node.rhs[0], sexp::new_quo),
        AssignOp::Assign => gen_assign(ctx, &node.lhs, &node.rhs),
    }
}

/// `+=` special-cases a string left-hand side: it concatenates.
fn add_assign(ctx: &mut LowerCtx, lhs: &Expr, rhs: &Expr) -> Result<Form, CompileError> {
    if rhs.ty.is_string() {
        return arith_assign(ctx, lhs, rhs, sexp::new_concat);
    }
    arith_assign(ctx, lhs, rhs, sexp::new_add)
}

fn arith_assign(
    ctx: &mut LowerCtx,
    lhs: &Expr,
    rhs: &Expr,
    combine: fn(Form, Form) -> Form,
) -> Result<Form, CompileError> {
    let x = lower_expr(ctx, lhs)?;
    let y = lower_expr(ctx, rhs)?;
    assign(ctx, lhs, combine(x, y))
}

fn gen_assign(ctx: &mut LowerCtx, lhs: &[Expr], rhs: &[Expr]) -> Result<Form, CompileError> {
    if lhs.len() == rhs.len() {
        return single_value_assign(ctx, lhs, rhs);
    }
    multi_value_assign(ctx, lhs, &rhs[0])
}

/// Equal arity on both sides: a flat list of independent assignments, in
/// source left-to-right order. Later targets may read earlier-assigned
/// locals, so the order is load-bearing.
fn single_value_assign(ctx: &mut LowerCtx, lhs: &[Expr], rhs: &[Expr]) -> Result<Form, CompileError> {
    let mut forms = Vec::with_capacity(lhs.len());
    for i in 0..lhs.len() {
        ctx.ctx_ty = Some(lhs[i].ty.clone());
        let expr = lower_expr(ctx, &rhs[i])?;
        forms.push(assign(ctx, &lhs[i], expr)?);
    }
    ctx.ctx_ty = None;
    Ok(Form::FormList(forms))
}

/// One call yielding several results. The first result is the call
/// expression itself; the rest read the reserved auxiliary slots, one per
/// result position.
fn rhs_multi_values(ctx: &mut LowerCtx, rhs: &Expr) -> Result<Vec<Form>, CompileError> {
    let tys = match &rhs.ty {
        Ty::Tuple(tys) => tys.clone(),
        other => {
            return Err(CompileError::missing_fact(
                rhs.span,
                format!("multi-value source has non-tuple type {:?}", other),
            ))
        }
    };
    // The first result rides the stack, so a tuple may have one more
    // position than there are reserved slots.
    if tys.len() > rt::RET_VARS.len() {
        return Err(CompileError::unsupported(
            rhs.span,
            format!("call yields {} results; too many", tys.len()),
        ));
    }

    let mut forms = Vec::with_capacity(tys.len());
    forms.push(lower_expr(ctx, rhs)?);
    for (i, ty) in tys.iter().enumerate().skip(1) {
        forms.push(Form::Var {
            name: rt::RET_VARS[i].to_owned(),
            ty: ty.clone(),
        });
    }
    Ok(forms)
}

fn multi_value_assign(ctx: &mut LowerCtx, lhs: &[Expr], rhs: &Expr) -> Result<Form, CompileError> {
    let sources = rhs_multi_values(ctx, rhs)?;
    if sources.len() != lhs.len() {
        return Err(CompileError::missing_fact(
            rhs.span,
            format!(
                "tuple arity {} does not match {} targets",
                sources.len(),
                lhs.len()
            ),
        ));
    }
    let mut forms = Vec::with_capacity(lhs.len());
    for (target, source) in lhs.iter().zip(sources) {
        forms.push(assign(ctx, target, source)?);
    }
    Ok(Form::FormList(forms))
}

/// Destination kind dispatch. Anything outside the enumerated set is a
/// compilation fault.
fn assign(ctx: &mut LowerCtx, lhs: &Expr, expr: Form) -> Result<Form, CompileError> {
    let expr = copy_value(expr, &lhs.ty);
    match &lhs.node {
        ExprKind::Ident { name, class } => match class {
            IdentClass::Blank => Ok(ignored_expr(expr)),
            IdentClass::NewDef => Ok(Form::Bind {
                name: name.clone(),
                init: Box::new(expr),
            }),
            IdentClass::Local => Ok(Form::Rebind {
                name: name.clone(),
                expr: Box::new(expr),
            }),
            IdentClass::Global { pkg } => Ok(Form::VarUpdate {
                name: names::var_name(pkg, name),
                expr: Box::new(expr),
            }),
            IdentClass::Pkg => Err(CompileError::unsupported(
                lhs.span,
                "cannot assign to a package name",
            )),
        },

        ExprKind::Index { base, index } => match &base.ty {
            // Map writes are never a primitive store.
            Ty::Map(..) => Ok(Form::ExprStmt(Box::new(Form::LispCall {
                fn_sym: rt::FN_MAP_INSERT.to_owned(),
                args: vec![lower_expr(ctx, index)?, expr, lower_expr(ctx, base)?],
            }))),
            Ty::Array(elem, _) => Ok(Form::ArrayUpdate {
                array: Box::new(lower_expr(ctx, base)?),
                index: Box::new(lower_expr(ctx, index)?),
                expr: Box::new(uint_elem(expr, elem)),
            }),
            Ty::Slice(_) => Ok(Form::ExprStmt(Box::new(Form::LispCall {
                fn_sym: rt::FN_SLICE_SET.to_owned(),
                args: vec![lower_expr(ctx, base)?, lower_expr(ctx, index)?, expr],
            }))),
            other => Err(CompileError::unsupported(
                lhs.span,
                format!("cannot assign through an index of type {:?}", other),
            )),
        },

        ExprKind::Selector { base, field } => {
            if let Some(st) = base.ty.struct_ty() {
                let index = st.field_index(field).ok_or_else(|| {
                    CompileError::missing_fact(
                        lhs.span,
                        format!("no field index for {}.{}", st.name, field),
                    )
                })?;
                let ty = st.clone();
                return Ok(Form::StructUpdate {
                    strct: Box::new(lower_expr(ctx, base)?),
                    index,
                    expr: Box::new(expr),
                    ty,
                });
            }
            // The selector resolves to no field: a package-qualified global.
            if let ExprKind::Ident {
                name,
                class: IdentClass::Pkg,
            } = &base.node
            {
                return Ok(Form::VarUpdate {
                    name: names::var_name(name, field),
                    expr: Box::new(expr),
                });
            }
            Err(CompileError::unsupported(
                lhs.span,
                format!("cannot assign to selector of type {:?}", base.ty),
            ))
        }

        _ => Err(CompileError::unsupported(
            lhs.span,
            "cannot assign to this expression",
        )),
    }
}

/// A discarded call is preserved for its effects; any other discarded
/// expression is dropped entirely.
fn ignored_expr(expr: Form) -> Form {
    match expr {
        Form::Call { .. }
        | Form::LispCall { .. }
        | Form::DynCall { .. }
        | Form::InstrCall { .. } => Form::ExprStmt(Box::new(expr)),
        _ => Form::Empty,
    }
}

/// Element-width coercion for stores into arrays of sub-word elements.
fn uint_elem(expr: Form, elem: &Ty) -> Form {
    match elem {
        Ty::Uint8 => Form::LispCall {
            fn_sym: "logand".to_owned(),
            args: vec![expr, Form::Int(0xff)],
        },
        _ => expr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Span;
    use crate::bytecode::instr::Op;

    fn ident(name: &str, class: IdentClass, ty: Ty) -> Expr {
        Expr::new(
            ExprKind::Ident {
                name: name.into(),
                class,
            },
            ty,
        )
    }

    fn int_lit(v: i64) -> Expr {
        Expr::new(ExprKind::IntLit(v), Ty::Int)
    }

    fn call(pkg: &str, name: &str, ty: Ty) -> Expr {
        Expr::new(
            ExprKind::Call {
                target: crate::ast::CallTarget::Func {
                    pkg: pkg.into(),
                    name: name.into(),
                },
                args: vec![],
            },
            ty,
        )
    }

    fn assign_stmt(op: AssignOp, lhs: Vec<Expr>, rhs: Vec<Expr>) -> AssignStmt {
        AssignStmt {
            op,
            lhs,
            rhs,
            span: Span::default(),
        }
    }

    #[test]
    fn string_add_assign_concatenates() {
        let mut ctx = LowerCtx::new();
        let node = assign_stmt(
            AssignOp::Add,
            vec![ident("s", IdentClass::Local, Ty::Str)],
            vec![ident("t", IdentClass::Local, Ty::Str)],
        );
        let form = lower_assign(&mut ctx, &node).unwrap();
        match form {
            Form::Rebind { name, expr } => {
                assert_eq!(name, "s");
                match *expr {
                    Form::InstrCall { op, .. } => assert_eq!(op, Op::Concat),
                    other => panic!("expected Concat, got {:?}", other),
                }
            }
            other => panic!("expected Rebind, got {:?}", other),
        }
    }

    #[test]
    fn numeric_add_assign_adds() {
        let mut ctx = LowerCtx::new();
        let node = assign_stmt(
            AssignOp::Add,
            vec![ident("n", IdentClass::Local, Ty::Int)],
            vec![int_lit(1)],
        );
        match lower_assign(&mut ctx, &node).unwrap() {
            Form::Rebind { expr, .. } => match *expr {
                Form::InstrCall { op, .. } => assert_eq!(op, Op::NumAdd),
                other => panic!("expected NumAdd, got {:?}", other),
            },
            other => panic!("expected Rebind, got {:?}", other),
        }
    }

    #[test]
    fn equal_arity_assign_is_a_flat_ordered_list() {
        let mut ctx = LowerCtx::new();
        let node = assign_stmt(
            AssignOp::Assign,
            vec![
                ident("a", IdentClass::NewDef, Ty::Int),
                ident("b", IdentClass::NewDef, Ty::Int),
            ],
            vec![call("p", "f", Ty::Int), call("p", "g", Ty::Int)],
        );
        match lower_assign(&mut ctx, &node).unwrap() {
            Form::FormList(forms) => {
                assert_eq!(forms.len(), 2);
                match (&forms[0], &forms[1]) {
                    (Form::Bind { name: a, .. }, Form::Bind { name: b, .. }) => {
                        assert_eq!(a, "a");
                        assert_eq!(b, "b");
                    }
                    other => panic!("expected two Binds, got {:?}", other),
                }
            }
            other => panic!("expected FormList, got {:?}", other),
        }
    }

    #[test]
    fn multi_value_assign_uses_auxiliary_slots() {
        let mut ctx = LowerCtx::new();
        let node = assign_stmt(
            AssignOp::Assign,
            vec![
                ident("a", IdentClass::NewDef, Ty::Int),
                ident("b", IdentClass::NewDef, Ty::Str),
            ],
            vec![call("p", "f", Ty::Tuple(vec![Ty::Int, Ty::Str]))],
        );
        match lower_assign(&mut ctx, &node).unwrap() {
            Form::FormList(forms) => {
                assert_eq!(forms.len(), 2);
                // First target takes the call itself.
                match &forms[0] {
                    Form::Bind { name, init } => {
                        assert_eq!(name, "a");
                        assert!(matches!(**init, Form::Call { .. }));
                    }
                    other => panic!("expected Bind of call, got {:?}", other),
                }
                // Second target reads the reserved slot for position 1.
                match &forms[1] {
                    Form::Bind { name, init } => {
                        assert_eq!(name, "b");
                        match &**init {
                            Form::Var { name, .. } => assert_eq!(name, rt::RET_VARS[1]),
                            other => panic!("expected Var, got {:?}", other),
                        }
                    }
                    other => panic!("expected Bind, got {:?}", other),
                }
            }
            other => panic!("expected FormList, got {:?}", other),
        }
    }

    #[test]
    fn nine_result_call_reads_the_last_reserved_slot() {
        let mut ctx = LowerCtx::new();
        let lhs: Vec<Expr> = (0..9)
            .map(|i| ident(&format!("v{}", i), IdentClass::NewDef, Ty::Int))
            .collect();
        let rhs = call("p", "f", Ty::Tuple(vec![Ty::Int; 9]));
        let node = assign_stmt(AssignOp::Assign, lhs, vec![rhs]);
        match lower_assign(&mut ctx, &node).unwrap() {
            Form::FormList(forms) => match &forms[8] {
                Form::Bind { init, .. } => match &**init {
                    Form::Var { name, .. } => assert_eq!(name, rt::RET_VARS[8]),
                    other => panic!("expected Var, got {:?}", other),
                },
                other => panic!("expected Bind, got {:?}", other),
            },
            other => panic!("expected FormList, got {:?}", other),
        }
    }

    #[test]
    fn ten_result_call_is_rejected() {
        let mut ctx = LowerCtx::new();
        let lhs: Vec<Expr> = (0..10)
            .map(|i| ident(&format!("v{}", i), IdentClass::NewDef, Ty::Int))
            .collect();
        let rhs = call("p", "f", Ty::Tuple(vec![Ty::Int; 10]));
        let node = assign_stmt(AssignOp::Assign, lhs, vec![rhs]);
        let err = lower_assign(&mut ctx, &node).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Unsupported);
    }

    #[test]
    fn discarded_call_is_kept_as_statement() {
        let mut ctx = LowerCtx::new();
        let node = assign_stmt(
            AssignOp::Assign,
            vec![ident("_", IdentClass::Blank, Ty::Int)],
            vec![call("p", "f", Ty::Int)],
        );
        match lower_assign(&mut ctx, &node).unwrap() {
            Form::FormList(forms) => {
                assert!(matches!(&forms[0], Form::ExprStmt(e) if matches!(**e, Form::Call { .. })))
            }
            other => panic!("expected FormList, got {:?}", other),
        }
    }

    #[test]
    fn discarded_non_call_is_dropped() {
        let mut ctx = LowerCtx::new();
        let node = assign_stmt(
            AssignOp::Assign,
            vec![ident("_", IdentClass::Blank, Ty::Int)],
            vec![int_lit(5)],
        );
        match lower_assign(&mut ctx, &node).unwrap() {
            Form::FormList(forms) => assert_eq!(forms[0], Form::Empty),
            other => panic!("expected FormList, got {:?}", other),
        }
    }

    #[test]
    fn global_target_updates_mangled_storage() {
        let mut ctx = LowerCtx::new();
        let node = assign_stmt(
            AssignOp::Assign,
            vec![ident(
                "X",
                IdentClass::Global { pkg: "pkg".into() },
                Ty::Int,
            )],
            vec![int_lit(1)],
        );
        match lower_assign(&mut ctx, &node).unwrap() {
            Form::FormList(forms) => match &forms[0] {
                Form::VarUpdate { name, .. } => assert_eq!(name, "Ivy-pkg.X"),
                other => panic!("expected VarUpdate, got {:?}", other),
            },
            other => panic!("expected FormList, got {:?}", other),
        }
    }

    #[test]
    fn map_write_lowers_to_insert_call() {
        let mut ctx = LowerCtx::new();
        let map_ty = Ty::Map(Box::new(Ty::Str), Box::new(Ty::Int));
        let lhs = Expr::new(
            ExprKind::Index {
                base: Box::new(ident("m", IdentClass::Local, map_ty)),
                index: Box::new(Expr::new(ExprKind::StrLit("k".into()), Ty::Str)),
            },
            Ty::Int,
        );
        let node = assign_stmt(AssignOp::Assign, vec![lhs], vec![int_lit(1)]);
        match lower_assign(&mut ctx, &node).unwrap() {
            Form::FormList(forms) => match &forms[0] {
                Form::ExprStmt(e) => match &**e {
                    Form::LispCall { fn_sym, args } => {
                        assert_eq!(fn_sym, rt::FN_MAP_INSERT);
                        assert_eq!(args.len(), 3);
                    }
                    other => panic!("expected LispCall, got {:?}", other),
                },
                other => panic!("expected ExprStmt, got {:?}", other),
            },
            other => panic!("expected FormList, got {:?}", other),
        }
    }

    #[test]
    fn byte_array_store_masks_element_width() {
        let mut ctx = LowerCtx::new();
        let arr_ty = Ty::Array(Box::new(Ty::Uint8), 4);
        let lhs = Expr::new(
            ExprKind::Index {
                base: Box::new(ident("a", IdentClass::Local, arr_ty)),
                index: Box::new(int_lit(0)),
            },
            Ty::Uint8,
        );
        let node = assign_stmt(AssignOp::Assign, vec![lhs], vec![int_lit(300)]);
        match lower_assign(&mut ctx, &node).unwrap() {
            Form::FormList(forms) => match &forms[0] {
                Form::ArrayUpdate { expr, .. } => match &**expr {
                    Form::LispCall { fn_sym, .. } => assert_eq!(fn_sym, "logand"),
                    other => panic!("expected width mask, got {:?}", other),
                },
                other => panic!("expected ArrayUpdate, got {:?}", other),
            },
            other => panic!("expected FormList, got {:?}", other),
        }
    }

    #[test]
    fn struct_field_target_updates_by_index() {
        let mut ctx = LowerCtx::new();
        let st = crate::ast::StructTy {
            name: "pt".into(),
            fields: vec![("x".into(), Ty::Int), ("y".into(), Ty::Int)],
        };
        let lhs = Expr::new(
            ExprKind::Selector {
                base: Box::new(ident("p", IdentClass::Local, Ty::Struct(st))),
                field: "y".into(),
            },
            Ty::Int,
        );
        let node = assign_stmt(AssignOp::Assign, vec![lhs], vec![int_lit(2)]);
        match lower_assign(&mut ctx, &node).unwrap() {
            Form::FormList(forms) => match &forms[0] {
                Form::StructUpdate { index, .. } => assert_eq!(*index, 1),
                other => panic!("expected StructUpdate, got {:?}", other),
            },
            other => panic!("expected FormList, got {:?}", other),
        }
    }

    #[test]
    fn pointer_to_struct_field_follows_one_indirection() {
        let mut ctx = LowerCtx::new();
        let st = crate::ast::StructTy {
            name: "pt".into(),
            fields: vec![("x".into(), Ty::Int)],
        };
        let ptr_ty = Ty::Ptr(Box::new(Ty::Struct(st)));
        let lhs = Expr::new(
            ExprKind::Selector {
                base: Box::new(ident("p", IdentClass::Local, ptr_ty)),
                field: "x".into(),
            },
            Ty::Int,
        );
        let node = assign_stmt(AssignOp::Assign, vec![lhs], vec![int_lit(2)]);
        match lower_assign(&mut ctx, &node).unwrap() {
            Form::FormList(forms) => {
                assert!(matches!(&forms[0], Form::StructUpdate { index: 0, .. }))
            }
            other => panic!("expected FormList, got {:?}", other),
        }
    }

    #[test]
    fn unknown_destination_kind_is_a_fault() {
        let mut ctx = LowerCtx::new();
        let node = assign_stmt(AssignOp::Assign, vec![int_lit(1)], vec![int_lit(2)]);
        let err = lower_assign(&mut ctx, &node).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Unsupported);
    }
}
