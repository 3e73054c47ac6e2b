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

// Dead code elimination on the symbolic IR.
//
// Two rules: a conditional or pre-test loop with a statically false
// condition collapses to the empty statement, and a statement sequence is
// truncated after its first terminating form. The pass is idempotent.

use crate::sexp::{rewrite, Form, Visit};

/// Remove unreachable statements and expressions from the given form.
pub fn remove_dead_code(form: Form) -> Form {
    rewrite(form, &mut walk_form)
}

fn walk_form(form: Form) -> Visit {
    match form {
        Form::If { cond, then, els } => {
            if matches!(*cond, Form::Bool(false)) {
                return Visit::Replace(Form::Empty);
            }
            Visit::Replace(Form::If {
                cond,
                then: walk_body(then),
                els: els.map(|e| Box::new(remove_dead_code(*e))),
            })
        }

        Form::Block(forms) => Visit::Replace(Form::Block(walk_body(forms))),
        Form::FormList(forms) => Visit::Replace(Form::FormList(walk_body(forms))),

        Form::While {
            init,
            cond,
            post,
            body,
        } => {
            if matches!(*cond, Form::Bool(false)) {
                return Visit::Replace(Form::Empty);
            }
            Visit::Replace(Form::While {
                init,
                cond,
                post,
                body: walk_body(body),
            })
        }

        other => Visit::Recurse(other),
    }
}

/// Truncate a statement sequence after its first terminating form; later
/// statements are unreachable.
fn walk_body(forms: Vec<Form>) -> Vec<Form> {
    let mut out = Vec::with_capacity(forms.len());
    for form in forms {
        let form = remove_dead_code(form);
        let terminates = form.is_returning();
        out.push(form);
        if terminates {
            break;
        }
    }
    out
}
