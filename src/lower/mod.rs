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

// Lowering from typed Ivy constructs to symbolic IR forms.
//
// One construct at a time, driven entirely by front-end facts carried on
// the AST nodes. Lowering never infers types and never recovers from a
// missing fact.

mod assign;
mod intrinsics;

pub use assign::lower_assign;
pub(crate) use intrinsics::intrin_func_call;

use crate::ast::{BinOp, CallTarget, Const, Expr, ExprKind, IdentClass, Ty};
use crate::error::CompileError;
use crate::names;
use crate::rt;
use crate::sexp::{self, Form};

/// Per-unit lowering context.
pub struct LowerCtx {
    /// Expected type of the expression being lowered, when the enclosing
    /// construct imposes one (eg the target of an assignment).
    pub(crate) ctx_ty: Option<Ty>,
}

impl LowerCtx {
    pub fn new() -> Self {
        Self { ctx_ty: None }
    }
}

impl Default for LowerCtx {
    fn default() -> Self {
        Self::new()
    }
}

/// Lower one typed expression to a form.
pub fn lower_expr(ctx: &mut LowerCtx, node: &Expr) -> Result<Form, CompileError> {
    if let Some(cv) = &node.const_val {
        return Ok(const_form(ctx, cv, &node.ty));
    }
    match &node.node {
        ExprKind::BoolLit(b) => Ok(Form::Bool(*b)),
        ExprKind::IntLit(v) => Ok(int_form(ctx, *v, &node.ty)),
        ExprKind::FloatLit(v) => Ok(Form::Float(*v)),
        ExprKind::StrLit(s) => Ok(Form::Str(s.clone())),
        ExprKind::Ident { name, class } => lower_ident(node, name, class),
        ExprKind::Index { base, index } => lower_index(ctx, node, base, index),
        ExprKind::Selector { base, field } => lower_selector(ctx, node, base, field),
        ExprKind::Binary { op, x, y } => lower_binary(ctx, *op, x, y),
        ExprKind::Call { target, args } => lower_call(ctx, node, target, args),
    }
}

pub(crate) fn lower_expr_list(
    ctx: &mut LowerCtx,
    nodes: &[Expr],
) -> Result<Vec<Form>, CompileError> {
    nodes.iter().map(|n| lower_expr(ctx, n)).collect()
}

/// Lower a return statement; results beyond the first travel through the
/// auxiliary result slots at emission time.
pub fn lower_return(ctx: &mut LowerCtx, results: &[Expr]) -> Result<Form, CompileError> {
    Ok(Form::Return {
        results: lower_expr_list(ctx, results)?,
    })
}

/// Lower an expression used for effect only.
pub fn lower_expr_stmt(ctx: &mut LowerCtx, node: &Expr) -> Result<Form, CompileError> {
    Ok(Form::ExprStmt(Box::new(lower_expr(ctx, node)?)))
}

/// Untyped integer constants take the type the context expects.
fn int_form(ctx: &LowerCtx, v: i64, ty: &Ty) -> Form {
    if *ty == Ty::Float || ctx.ctx_ty == Some(Ty::Float) {
        Form::Float(v as f64)
    } else {
        Form::Int(v)
    }
}

fn const_form(ctx: &LowerCtx, cv: &Const, ty: &Ty) -> Form {
    match cv {
        Const::Bool(b) => Form::Bool(*b),
        Const::Int(v) => int_form(ctx, *v, ty),
        Const::Float(v) => Form::Float(*v),
        Const::Str(s) => Form::Str(s.clone()),
    }
}

fn lower_ident(node: &Expr, name: &str, class: &IdentClass) -> Result<Form, CompileError> {
    match class {
        IdentClass::Local | IdentClass::NewDef => Ok(Form::Local {
            name: name.to_owned(),
            ty: node.ty.clone(),
        }),
        IdentClass::Global { pkg } => Ok(Form::Var {
            name: names::var_name(pkg, name),
            ty: node.ty.clone(),
        }),
        IdentClass::Blank => Err(CompileError::unsupported(
            node.span,
            "blank identifier in expression position",
        )),
        IdentClass::Pkg => Err(CompileError::unsupported(
            node.span,
            "package name in expression position",
        )),
    }
}

fn lower_index(
    ctx: &mut LowerCtx,
    node: &Expr,
    base: &Expr,
    index: &Expr,
) -> Result<Form, CompileError> {
    match &base.ty {
        Ty::Array(..) | Ty::Str => Ok(Form::ArrayIndex {
            array: Box::new(lower_expr(ctx, base)?),
            index: Box::new(lower_expr(ctx, index)?),
        }),
        Ty::Slice(_) => Ok(Form::SliceIndex {
            slice: Box::new(lower_expr(ctx, base)?),
            index: Box::new(lower_expr(ctx, index)?),
        }),
        Ty::Map(..) => Ok(Form::LispCall {
            fn_sym: rt::FN_MAP_GET.to_owned(),
            args: vec![lower_expr(ctx, index)?, lower_expr(ctx, base)?],
        }),
        _ => Err(CompileError::unsupported(
            node.span,
            format!("cannot index a value of type {:?}", base.ty),
        )),
    }
}

fn lower_selector(
    ctx: &mut LowerCtx,
    node: &Expr,
    base: &Expr,
    field: &str,
) -> Result<Form, CompileError> {
    if let Some(st) = base.ty.struct_ty() {
        let index = st.field_index(field).ok_or_else(|| {
            CompileError::missing_fact(
                node.span,
                format!("no field index for {}.{}", st.name, field),
            )
        })?;
        let ty = st.clone();
        return Ok(Form::StructIndex {
            strct: Box::new(lower_expr(ctx, base)?),
            index,
            ty,
        });
    }
    // Not a field access: a package-qualified global.
    if let ExprKind::Ident {
        name,
        class: IdentClass::Pkg,
    } = &base.node
    {
        return Ok(Form::Var {
            name: names::var_name(name, field),
            ty: node.ty.clone(),
        });
    }
    Err(CompileError::unsupported(
        node.span,
        format!("cannot select {} from a value of type {:?}", field, base.ty),
    ))
}

fn lower_binary(
    ctx: &mut LowerCtx,
    op: BinOp,
    x: &Expr,
    y: &Expr,
) -> Result<Form, CompileError> {
    if op == BinOp::And || op == BinOp::Or {
        let a = Box::new(lower_expr(ctx, x)?);
        let b = Box::new(lower_expr(ctx, y)?);
        return Ok(match op {
            BinOp::And => Form::And { x: a, y: b },
            _ => Form::Or { x: a, y: b },
        });
    }

    let string_operands = x.ty.is_string();
    let a = lower_expr(ctx, x)?;
    let b = lower_expr(ctx, y)?;
    Ok(match op {
        BinOp::Add if string_operands => sexp::new_concat(a, b),
        BinOp::Add => sexp::new_add(a, b),
        BinOp::Sub => sexp::new_sub(a, b),
        BinOp::Mul => sexp::new_mul(a, b),
        BinOp::Quo => sexp::new_quo(a, b),
        BinOp::Gt => sexp::new_num_gt(a, b),
        BinOp::Lt => sexp::new_num_lt(a, b),
        BinOp::Eq if string_operands => Form::LispCall {
            fn_sym: "string=".to_owned(),
            args: vec![a, b],
        },
        BinOp::Eq => sexp::new_num_eq(a, b),
        BinOp::And | BinOp::Or => unreachable!("handled above"),
    })
}

fn lower_call(
    ctx: &mut LowerCtx,
    node: &Expr,
    target: &CallTarget,
    args: &[Expr],
) -> Result<Form, CompileError> {
    match target {
        CallTarget::Func { pkg, name } => Ok(Form::Call {
            fn_name: names::func_name(pkg, name),
            args: lower_expr_list(ctx, args)?,
        }),
        CallTarget::Intrin { name } => intrin_func_call(ctx, node, name, args),
        CallTarget::Dyn { callee } => Ok(Form::DynCall {
            callable: Box::new(lower_expr(ctx, callee)?),
            args: lower_expr_list(ctx, args)?,
            ty: node.ty.clone(),
        }),
    }
}

/// Aggregates have value semantics in Ivy but reference semantics in the
/// host, so storing one emits a runtime value copy.
pub(crate) fn copy_value(form: Form, ty: &Ty) -> Form {
    match ty {
        Ty::Array(..) | Ty::Struct(_) => Form::LispCall {
            fn_sym: rt::FN_VALUE_COPY.to_owned(),
            args: vec![form],
        },
        _ => form,
    }
}
