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

// Bytecode emission from optimized IR forms.
//
// One `Compiler` per routine. The compiler is a strict state machine
// (empty, emitting, sealed); a wrong-state operation is an internal fault,
// as is any form reaching emission that lowering should never produce in
// that position. Stack depth is tracked through the locals list: a bound
// value *is* its stack slot.

use std::collections::HashMap;

use crate::bytecode::cvec::{Const, ConstVec};
use crate::bytecode::instr::{self, Instr, Op};
use crate::error::CompileError;
use crate::rt;
use crate::sexp::{Form, LetBody};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Empty,
    Emitting,
    Sealed,
}

/// Finished routine: name, instruction stream, constant pool.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledUnit {
    pub name: String,
    pub code: Vec<Instr>,
    pub consts: Vec<Const>,
}

pub struct Compiler {
    state: State,
    name: String,
    code: Vec<Instr>,
    cvec: ConstVec,
    /// Bound locals, bottom of frame first. The empty name marks an
    /// anonymous scratch slot.
    locals: Vec<String>,
    labels: HashMap<String, u16>,
    next_label: u16,
}

impl Compiler {
    pub fn new(name: &str) -> Self {
        Self {
            state: State::Empty,
            name: name.to_owned(),
            code: Vec::new(),
            cvec: ConstVec::new(),
            locals: Vec::new(),
            labels: HashMap::new(),
            next_label: 0,
        }
    }

    /// Open the unit for emission.
    pub fn begin(&mut self) -> Result<(), CompileError> {
        if self.state != State::Empty {
            return Err(CompileError::internal(format!(
                "begin on a unit in state {:?}",
                self.state
            )));
        }
        self.state = State::Emitting;
        Ok(())
    }

    /// Close the unit and take its instruction stream and pool.
    pub fn seal(mut self) -> Result<CompiledUnit, CompileError> {
        if self.state != State::Emitting {
            return Err(CompileError::internal(format!(
                "seal on a unit in state {:?}",
                self.state
            )));
        }
        self.state = State::Sealed;
        Ok(CompiledUnit {
            name: self.name,
            code: std::mem::take(&mut self.code),
            consts: self.cvec.into_vec(),
        })
    }

    fn emit(&mut self, instr: Instr) -> Result<(), CompileError> {
        if self.state != State::Emitting {
            return Err(CompileError::internal(format!(
                "emit on a unit in state {:?}",
                self.state
            )));
        }
        self.code.push(instr);
        Ok(())
    }

    fn emit_n(&mut self, instr: Instr, n: usize) -> Result<(), CompileError> {
        for _ in 0..n {
            self.emit(instr)?;
        }
        Ok(())
    }

    fn new_label(&mut self) -> u16 {
        let id = self.next_label;
        self.next_label += 1;
        id
    }

    fn label_for(&mut self, name: &str) -> u16 {
        if let Some(&id) = self.labels.get(name) {
            return id;
        }
        let id = self.new_label();
        self.labels.insert(name.to_owned(), id);
        id
    }

    fn local_slot(&self, name: &str) -> Result<u16, CompileError> {
        let slot = self
            .locals
            .iter()
            .rposition(|l| l == name)
            .ok_or_else(|| CompileError::internal(format!("unbound local {}", name)))?;
        frame_slot(slot)
    }

    /// Push the callee symbol; arguments follow, then `end_call`.
    fn begin_call(&mut self, fn_sym: &str) -> Result<(), CompileError> {
        let idx = self.cvec.insert_sym(fn_sym)?;
        self.emit(Instr::ConstRef(idx))
    }

    fn end_call(&mut self, argc: usize) -> Result<(), CompileError> {
        self.emit(Instr::Call(argc as u16))
    }

    /// Emit a statement form. Anything not in the statement set is an
    /// internal fault: lowering produced a form emission has no rule for.
    pub fn compile_stmt(&mut self, form: Form) -> Result<(), CompileError> {
        match form {
            Form::Empty => Ok(()),

            Form::Return { results } => self.compile_return(results),

            Form::If { cond, then, els } => self.compile_if(*cond, then, els),

            Form::Block(forms) => self.compile_block(forms),

            Form::FormList(forms) => {
                for f in forms {
                    self.compile_stmt(f)?;
                }
                Ok(())
            }

            // The bound value stays on the stack; its position is the slot.
            Form::Bind { name, init } => {
                self.compile_expr(*init)?;
                self.locals.push(name);
                Ok(())
            }

            Form::Rebind { name, expr } => {
                self.compile_expr(*expr)?;
                let slot = self.local_slot(&name)?;
                self.emit(Instr::StackSet(slot))
            }

            Form::VarUpdate { name, expr } => {
                self.compile_expr(*expr)?;
                let idx = self.cvec.insert_sym(&name)?;
                self.emit(Instr::VarSet(idx))
            }

            Form::ExprStmt(expr) => {
                self.compile_expr(*expr)?;
                self.emit(Instr::Discard)
            }

            Form::Repeat { n, body } => {
                for _ in 0..n {
                    self.compile_block(body.clone())?;
                }
                Ok(())
            }

            Form::While {
                init,
                cond,
                post,
                body,
            } => self.compile_while(*init, *cond, *post, body),

            Form::ArrayUpdate { array, index, expr } => {
                self.begin_call("aset")?;
                self.compile_expr(*array)?;
                self.compile_expr(*index)?;
                self.compile_expr(*expr)?;
                self.end_call(3)?;
                self.emit(Instr::Discard)
            }

            Form::StructUpdate {
                strct, index, expr, ..
            } => {
                self.begin_call("aset")?;
                self.compile_expr(*strct)?;
                let idx = self.cvec.insert_int(index as i64)?;
                self.emit(Instr::ConstRef(idx))?;
                self.compile_expr(*expr)?;
                self.end_call(3)?;
                self.emit(Instr::Discard)
            }

            Form::SliceUpdate { slice, index, expr } => {
                self.begin_call(rt::FN_SLICE_SET)?;
                self.compile_expr(*slice)?;
                self.compile_expr(*index)?;
                self.compile_expr(*expr)?;
                self.end_call(3)?;
                self.emit(Instr::Discard)
            }

            Form::Goto(name) => {
                let id = self.label_for(&name);
                self.emit(Instr::Jmp(id))
            }

            Form::Label(name) => {
                let id = self.label_for(&name);
                self.emit(Instr::Label(id))
            }

            Form::Let { bindings, body } => {
                let body = match body {
                    LetBody::Stmt(b) => b,
                    LetBody::Expr(_) => {
                        return Err(CompileError::internal(
                            "let expression in statement position",
                        ))
                    }
                };
                let n = bindings.len();
                for b in bindings {
                    self.compile_expr(b.init)?;
                    self.locals.push(b.name);
                }
                self.compile_stmt(*body)?;
                self.locals.truncate(self.locals.len() - n);
                self.emit_n(Instr::Discard, n)
            }

            other => Err(CompileError::internal(format!(
                "unexpected statement form {:?}",
                other
            ))),
        }
    }

    fn compile_return(&mut self, results: Vec<Form>) -> Result<(), CompileError> {
        // One result on the stack, the rest in the reserved slots.
        if results.len() > rt::RET_VARS.len() {
            return Err(CompileError::internal(format!(
                "return yields {} results; the reserved slots cover {}",
                results.len(),
                rt::RET_VARS.len()
            )));
        }
        let mut results = results.into_iter();
        match results.next() {
            None => {
                let idx = self.cvec.insert_sym("nil")?;
                self.emit(Instr::ConstRef(idx))?;
            }
            Some(first) => {
                // The first result travels on the stack; the rest go to the
                // reserved slots in source order.
                self.compile_expr(first)?;
                for (i, r) in results.enumerate() {
                    self.compile_expr(r)?;
                    let idx = self.cvec.insert_sym(rt::RET_VARS[i + 1])?;
                    self.emit(Instr::VarSet(idx))?;
                }
            }
        }
        self.emit(Instr::Return)
    }

    fn compile_if(
        &mut self,
        cond: Form,
        then: Vec<Form>,
        els: Option<Box<Form>>,
    ) -> Result<(), CompileError> {
        self.compile_expr(cond)?;
        let else_label = self.new_label();
        self.emit(Instr::JmpNil(else_label))?;
        self.compile_block(then)?;
        match els {
            None => self.emit(Instr::Label(else_label)),
            Some(els) => {
                let end_label = self.new_label();
                self.emit(Instr::Jmp(end_label))?;
                self.emit(Instr::Label(else_label))?;
                self.compile_stmt(*els)?;
                self.emit(Instr::Label(end_label))
            }
        }
    }

    /// A block scopes its bindings: slots bound inside are discarded at the
    /// end, unless the block ends control flow and never falls through.
    fn compile_block(&mut self, forms: Vec<Form>) -> Result<(), CompileError> {
        let falls_through = !forms.last().is_some_and(|f| f.is_returning());
        let base = self.locals.len();
        for f in forms {
            self.compile_stmt(f)?;
        }
        let bound = self.locals.len() - base;
        self.locals.truncate(base);
        if falls_through {
            self.emit_n(Instr::Discard, bound)?;
        }
        Ok(())
    }

    fn compile_while(
        &mut self,
        init: Form,
        cond: Form,
        post: Form,
        body: Vec<Form>,
    ) -> Result<(), CompileError> {
        self.compile_stmt(init)?;
        let start = self.new_label();
        let end = self.new_label();
        self.emit(Instr::Label(start))?;
        self.compile_expr(cond)?;
        self.emit(Instr::JmpNil(end))?;
        self.compile_block(body)?;
        self.compile_stmt(post)?;
        self.emit(Instr::Jmp(start))?;
        self.emit(Instr::Label(end))
    }

    /// Emit an expression form, leaving exactly one value on the stack.
    pub fn compile_expr(&mut self, form: Form) -> Result<(), CompileError> {
        match form {
            Form::Bool(b) => {
                let idx = self.cvec.insert_sym(if b { "t" } else { "nil" })?;
                self.emit(Instr::ConstRef(idx))
            }
            Form::Int(v) => {
                let idx = self.cvec.insert_int(v)?;
                self.emit(Instr::ConstRef(idx))
            }
            Form::Float(v) => {
                let idx = self.cvec.insert_float(v)?;
                self.emit(Instr::ConstRef(idx))
            }
            Form::Str(s) => {
                let idx = self.cvec.insert_str(&s)?;
                self.emit(Instr::ConstRef(idx))
            }
            Form::Symbol(s) => {
                let idx = self.cvec.insert_sym(&s)?;
                self.emit(Instr::ConstRef(idx))
            }

            Form::Var { name, .. } => {
                let idx = self.cvec.insert_sym(&name)?;
                self.emit(Instr::VarRef(idx))
            }
            Form::Local { name, .. } => {
                let slot = self.local_slot(&name)?;
                self.emit(Instr::StackRef(slot))
            }

            Form::ArrayLit { vals, .. } | Form::StructLit { vals, .. } => {
                self.compile_vector(vals)
            }

            Form::SliceLit { vals, .. } => {
                self.begin_call(rt::FN_ARRAY_TO_SLICE)?;
                self.compile_vector(vals)?;
                self.end_call(1)
            }

            Form::SparseArrayLit {
                ctor,
                vals,
                indexes,
                ..
            } => self.compile_sparse_array(*ctor, vals, indexes),

            Form::ArrayIndex { array, index } => {
                self.begin_call("aref")?;
                self.compile_expr(*array)?;
                self.compile_expr(*index)?;
                self.end_call(2)
            }

            Form::StructIndex { strct, index, .. } => {
                self.begin_call("aref")?;
                self.compile_expr(*strct)?;
                let idx = self.cvec.insert_int(index as i64)?;
                self.emit(Instr::ConstRef(idx))?;
                self.end_call(2)
            }

            Form::SliceIndex { slice, index } => {
                self.begin_call(rt::FN_SLICE_GET)?;
                self.compile_expr(*slice)?;
                self.compile_expr(*index)?;
                self.end_call(2)
            }

            Form::Call { fn_name, args } | Form::LispCall { fn_sym: fn_name, args } => {
                self.begin_call(&fn_name)?;
                let argc = args.len();
                for a in args {
                    self.compile_expr(a)?;
                }
                self.end_call(argc)
            }

            Form::DynCall { callable, args, .. } => {
                self.begin_call(rt::FN_FUNCALL)?;
                self.compile_expr(*callable)?;
                let argc = args.len();
                for a in args {
                    self.compile_expr(a)?;
                }
                self.end_call(argc + 1)
            }

            Form::InstrCall { op, args } => self.compile_instr_call(op, args),

            Form::And { x, y } => {
                self.compile_expr(*x)?;
                let out = self.new_label();
                self.emit(Instr::JmpNilElsePop(out))?;
                self.compile_expr(*y)?;
                self.emit(Instr::Label(out))
            }
            Form::Or { x, y } => {
                self.compile_expr(*x)?;
                let out = self.new_label();
                self.emit(Instr::JmpNotNilElsePop(out))?;
                self.compile_expr(*y)?;
                self.emit(Instr::Label(out))
            }

            Form::Let { bindings, body } => {
                let body = match body {
                    LetBody::Expr(b) => b,
                    LetBody::Stmt(_) => {
                        return Err(CompileError::internal(
                            "let statement in expression position",
                        ))
                    }
                };
                self.compile_let_expr(bindings, *body)
            }

            // A checked relabel is representation-free.
            Form::TypeCast { expr, .. } => self.compile_expr(*expr),

            Form::Empty => {
                let idx = self.cvec.insert_sym("nil")?;
                self.emit(Instr::ConstRef(idx))
            }

            other => Err(CompileError::internal(format!(
                "unexpected expression form {:?}",
                other
            ))),
        }
    }

    fn compile_vector(&mut self, vals: Vec<Form>) -> Result<(), CompileError> {
        self.begin_call("vector")?;
        let argc = vals.len();
        for v in vals {
            self.compile_expr(v)?;
        }
        self.end_call(argc)
    }

    /// The constructed array is held in an anonymous scratch slot while the
    /// sparse positions are filled, then left behind as the result.
    fn compile_sparse_array(
        &mut self,
        ctor: Form,
        vals: Vec<Form>,
        indexes: Vec<usize>,
    ) -> Result<(), CompileError> {
        self.compile_expr(ctor)?;
        self.locals.push(String::new());
        let slot = frame_slot(self.locals.len() - 1)?;
        for (val, index) in vals.into_iter().zip(indexes) {
            self.begin_call("aset")?;
            self.emit(Instr::StackRef(slot))?;
            let idx = self.cvec.insert_int(index as i64)?;
            self.emit(Instr::ConstRef(idx))?;
            self.compile_expr(val)?;
            self.end_call(3)?;
            self.emit(Instr::Discard)?;
        }
        self.locals.pop();
        Ok(())
    }

    fn compile_instr_call(&mut self, op: Op, args: Vec<Form>) -> Result<(), CompileError> {
        let spec = instr::spec(op);
        if args.len() != spec.argc {
            return Err(CompileError::internal(format!(
                "operation {:?} takes {} arguments, got {}",
                op,
                spec.argc,
                args.len()
            )));
        }
        let fn_sym = spec.fn_sym.ok_or_else(|| {
            CompileError::internal(format!("operation {:?} has no host binding", op))
        })?;
        self.begin_call(fn_sym)?;
        let argc = args.len();
        for a in args {
            self.compile_expr(a)?;
        }
        self.end_call(argc)
    }

    /// The result value is moved down into the first binding's slot, then
    /// the remaining binding slots are discarded above it.
    fn compile_let_expr(
        &mut self,
        bindings: Vec<crate::sexp::Binding>,
        body: Form,
    ) -> Result<(), CompileError> {
        let n = bindings.len();
        let base = self.locals.len();
        for b in bindings {
            self.compile_expr(b.init)?;
            self.locals.push(b.name);
        }
        self.compile_expr(body)?;
        self.locals.truncate(base);
        if n > 0 {
            let slot = frame_slot(base)?;
            self.emit(Instr::StackSet(slot))?;
            self.emit_n(Instr::Discard, n - 1)?;
        }
        Ok(())
    }
}

/// Frame indices ride in a fixed-width operand; past that is a fault, not
/// a wrapped slot.
fn frame_slot(index: usize) -> Result<u16, CompileError> {
    u16::try_from(index)
        .map_err(|_| CompileError::internal("local frame exceeds the operand range"))
}
