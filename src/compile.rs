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

// Per-routine pipeline: optimize the lowered body, then emit bytecode.

use crate::bytecode::{CompiledUnit, Compiler};
use crate::error::CompileError;
use crate::opt;
use crate::sexp::Form;

/// Compile one routine body (already lowered) into a sealed unit.
pub fn compile_routine(name: &str, body: Vec<Form>) -> Result<CompiledUnit, CompileError> {
    log::debug!("compiling routine {} ({} forms)", name, body.len());
    let body = opt::remove_dead_code(Form::Block(body));
    log::trace!("optimized body of {}: {:?}", name, body);

    let mut cl = Compiler::new(name);
    cl.begin()?;
    cl.compile_stmt(body)?;
    cl.seal()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::Instr;

    #[test]
    fn dead_branches_never_reach_emission() {
        let body = vec![
            Form::If {
                cond: Box::new(Form::Bool(false)),
                // Would fault at emission: DoTimes has no statement rule.
                then: vec![Form::DoTimes {
                    n: Box::new(Form::Int(3)),
                    iter: "i".into(),
                    step: Box::new(Form::Int(1)),
                    body: vec![],
                }],
                els: None,
            },
            Form::Return { results: vec![] },
        ];
        let u = compile_routine("Ivy-main.f", body).unwrap();
        assert_eq!(u.code, vec![Instr::ConstRef(0), Instr::Return]);
    }

    #[test]
    fn unit_carries_its_routine_name() {
        let u = compile_routine("Ivy-main.init", vec![Form::Return { results: vec![] }]).unwrap();
        assert_eq!(u.name, "Ivy-main.init");
    }
}
