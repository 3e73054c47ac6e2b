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

// Calls into the host-runtime magic namespace.
//
// Three families: type relabels that compile to nothing, tagged host calls
// whose first argument names the host function, and named bridges resolved
// through the FFI table.

use crate::ast::{Const, Expr};
use crate::error::CompileError;
use crate::rt;
use crate::sexp::Form;

use super::{copy_value, lower_expr, LowerCtx};

pub(crate) fn intrin_func_call(
    ctx: &mut LowerCtx,
    node: &Expr,
    name: &str,
    args: &[Expr],
) -> Result<Form, CompileError> {
    match name {
        // Host values are untagged, so a checked relabel has no runtime
        // representation at all.
        "Bool" | "Int" | "Float" | "Str" | "Symbol" => lower_expr(ctx, &args[0]),

        "Call" | "CallBool" | "CallInt" | "CallFloat" | "CallStr" | "CallSymbol" => {
            intrin_tagged_call(ctx, node, args)
        }

        "Intern" => intrin_intern(ctx, &args[0]),

        other => {
            let fn_sym = rt::ffi(other).ok_or_else(|| {
                CompileError::missing_fact(
                    node.span,
                    format!("no host binding for intrinsic {}", other),
                )
            })?;
            Ok(Form::LispCall {
                fn_sym: fn_sym.to_owned(),
                args: host_args(ctx, args)?,
            })
        }
    }
}

/// A tagged host call names its target as a constant string; the tag suffix
/// only describes the result for the type checker.
fn intrin_tagged_call(
    ctx: &mut LowerCtx,
    node: &Expr,
    args: &[Expr],
) -> Result<Form, CompileError> {
    let fn_sym = match &args[0].const_val {
        Some(Const::Str(s)) => s.clone(),
        _ => {
            return Err(CompileError::unsupported(
                node.span,
                "tagged host call with non-constant callee",
            ))
        }
    };
    Ok(Form::LispCall {
        fn_sym,
        args: host_args(ctx, &args[1..])?,
    })
}

/// Interning a constant string is free; the empty name maps to the host's
/// empty-symbol sentinel.
fn intrin_intern(ctx: &mut LowerCtx, arg: &Expr) -> Result<Form, CompileError> {
    match &arg.const_val {
        Some(Const::Str(s)) if s.is_empty() => Ok(Form::Symbol(rt::EMPTY_SYM.to_owned())),
        Some(Const::Str(s)) => Ok(Form::Symbol(s.clone())),
        _ => Ok(Form::LispCall {
            fn_sym: rt::FN_INTERN.to_owned(),
            args: vec![lower_expr(ctx, arg)?],
        }),
    }
}

/// Arguments crossing into the host keep value semantics.
fn host_args(ctx: &mut LowerCtx, args: &[Expr]) -> Result<Vec<Form>, CompileError> {
    args.iter()
        .map(|a| Ok(copy_value(lower_expr(ctx, a)?, &a.ty)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{CallTarget, ExprKind, IdentClass, StructTy, Ty};
    use crate::error::ErrorKind;

    fn str_const(s: &str) -> Expr {
        Expr::new(ExprKind::StrLit(s.into()), Ty::Str).with_const(Const::Str(s.into()))
    }

    fn intrin(name: &str, args: Vec<Expr>) -> Expr {
        Expr::new(
            ExprKind::Call {
                target: CallTarget::Intrin { name: name.into() },
                args,
            },
            Ty::Int,
        )
    }

    fn lower_intrin(name: &str, args: Vec<Expr>) -> Result<Form, CompileError> {
        let mut ctx = LowerCtx::new();
        let node = intrin(name, args);
        let args = match &node.node {
            ExprKind::Call { args, .. } => args.clone(),
            _ => unreachable!(),
        };
        intrin_func_call(&mut ctx, &node, name, &args)
    }

    #[test]
    fn relabel_compiles_to_its_argument() {
        let arg = Expr::new(
            ExprKind::Ident {
                name: "x".into(),
                class: IdentClass::Local,
            },
            Ty::Int,
        );
        let form = lower_intrin("Int", vec![arg]).unwrap();
        assert!(matches!(form, Form::Local { ref name, .. } if name == "x"));
    }

    #[test]
    fn tagged_call_takes_constant_callee() {
        let form = lower_intrin(
            "CallInt",
            vec![str_const("string-width"), str_const("abc")],
        )
        .unwrap();
        match form {
            Form::LispCall { fn_sym, args } => {
                assert_eq!(fn_sym, "string-width");
                assert_eq!(args, vec![Form::Str("abc".into())]);
            }
            other => panic!("expected LispCall, got {:?}", other),
        }
    }

    #[test]
    fn tagged_call_rejects_computed_callee() {
        let callee = Expr::new(
            ExprKind::Ident {
                name: "f".into(),
                class: IdentClass::Local,
            },
            Ty::Str,
        );
        let err = lower_intrin("Call", vec![callee]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unsupported);
    }

    #[test]
    fn tagged_call_copies_aggregate_arguments() {
        let st = StructTy {
            name: "pt".into(),
            fields: vec![("x".into(), Ty::Int)],
        };
        let arg = Expr::new(
            ExprKind::Ident {
                name: "p".into(),
                class: IdentClass::Local,
            },
            Ty::Struct(st),
        );
        match lower_intrin("Call", vec![str_const("store"), arg]).unwrap() {
            Form::LispCall { args, .. } => match &args[0] {
                Form::LispCall { fn_sym, .. } => assert_eq!(fn_sym, rt::FN_VALUE_COPY),
                other => panic!("expected value copy, got {:?}", other),
            },
            other => panic!("expected LispCall, got {:?}", other),
        }
    }

    #[test]
    fn intern_of_constant_name_is_a_symbol_literal() {
        let form = lower_intrin("Intern", vec![str_const("marker")]).unwrap();
        assert_eq!(form, Form::Symbol("marker".into()));
    }

    #[test]
    fn intern_of_empty_name_uses_the_sentinel() {
        let form = lower_intrin("Intern", vec![str_const("")]).unwrap();
        assert_eq!(form, Form::Symbol(rt::EMPTY_SYM.into()));
    }

    #[test]
    fn intern_of_computed_name_calls_the_host() {
        let arg = Expr::new(
            ExprKind::Ident {
                name: "s".into(),
                class: IdentClass::Local,
            },
            Ty::Str,
        );
        match lower_intrin("Intern", vec![arg]).unwrap() {
            Form::LispCall { fn_sym, .. } => assert_eq!(fn_sym, rt::FN_INTERN),
            other => panic!("expected LispCall, got {:?}", other),
        }
    }

    #[test]
    fn named_bridge_resolves_through_the_ffi_table() {
        let arg = str_const("hi");
        match lower_intrin("Println", vec![arg]).unwrap() {
            Form::LispCall { fn_sym, .. } => assert_eq!(fn_sym, rt::FN_PRINTLN),
            other => panic!("expected LispCall, got {:?}", other),
        }
    }

    #[test]
    fn unknown_intrinsic_is_a_missing_fact() {
        let err = lower_intrin("NoSuchThing", vec![]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingFact);
    }
}
