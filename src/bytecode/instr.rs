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

// Instruction set of the host stack VM, plus the static description table
// for the operations reachable from `Form::InstrCall`.

/// Operation named by a raw instruction call in the IR.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    StackSet,
    Return,
    NumAdd,
    NumSub,
    NumMul,
    NumQuo,
    NumGt,
    NumLt,
    NumEq,
    Concat,
}

/// Static facts about one operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstrSpec {
    /// Stack values consumed.
    pub argc: usize,
    /// Whether a value is pushed back.
    pub output: bool,
    /// Host function the operation maps to, for operations that compile to
    /// a host call rather than a dedicated instruction.
    pub fn_sym: Option<&'static str>,
}

const fn op(argc: usize, output: bool, fn_sym: Option<&'static str>) -> InstrSpec {
    InstrSpec {
        argc,
        output,
        fn_sym,
    }
}

/// Description of `op`. Total over `Op`; the table is the single source of
/// arity and result facts during emission.
pub fn spec(op_: Op) -> InstrSpec {
    match op_ {
        Op::StackSet => op(1, false, None),
        Op::Return => op(1, false, None),
        Op::NumAdd => op(2, true, Some("+")),
        Op::NumSub => op(2, true, Some("-")),
        Op::NumMul => op(2, true, Some("*")),
        Op::NumQuo => op(2, true, Some("/")),
        Op::NumGt => op(2, true, Some(">")),
        Op::NumLt => op(2, true, Some("<")),
        Op::NumEq => op(2, true, Some("=")),
        Op::Concat => op(2, true, Some("concat")),
    }
}

/// One emitted instruction. Operands index either the constant pool
/// (`ConstRef`, `VarRef`, `VarSet`), the local stack frame (`StackRef`,
/// `StackSet`), or the label space of the unit (jumps and `Label`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instr {
    ConstRef(u16),
    StackRef(u16),
    StackSet(u16),
    VarRef(u16),
    VarSet(u16),
    /// Call with N arguments; the callee sits below them on the stack.
    Call(u16),
    Return,
    Jmp(u16),
    JmpNil(u16),
    /// Jump if top is nil, keeping it; pop it otherwise.
    JmpNilElsePop(u16),
    /// Jump if top is non-nil, keeping it; pop it otherwise.
    JmpNotNilElsePop(u16),
    Label(u16),
    Discard,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_ops_consume_two_and_produce_one() {
        for o in [
            Op::NumAdd,
            Op::NumSub,
            Op::NumMul,
            Op::NumQuo,
            Op::NumGt,
            Op::NumLt,
            Op::NumEq,
            Op::Concat,
        ] {
            let s = spec(o);
            assert_eq!(s.argc, 2);
            assert!(s.output);
            assert!(s.fn_sym.is_some());
        }
    }

    #[test]
    fn stack_ops_have_no_host_binding() {
        assert_eq!(spec(Op::StackSet).fn_sym, None);
        assert_eq!(spec(Op::Return).fn_sym, None);
    }
}
