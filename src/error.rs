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

// Every fault is compilation-fatal: the enclosing unit is aborted and the
// error is reported to the caller. There is no warning-and-continue mode.

use std::fmt;

use thiserror::Error;

use crate::ast::Span;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A source construct outside the supported set (eg an assignment
    /// destination of an unknown kind, a non-constant tagged-call callee).
    Unsupported,
    /// A fact requested from the front end is absent or inconsistent.
    /// Precondition violation of the core's contract; still fatal.
    MissingFact,
    /// Internal-consistency fault (unexpected form during emission,
    /// emitting after seal, instruction arity mismatch).
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Unsupported => "unsupported construct",
            ErrorKind::MissingFact => "missing front-end fact",
            ErrorKind::Internal => "internal error",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, Error)]
#[error("{kind}: {message}")]
pub struct CompileError {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
}

impl CompileError {
    pub fn new(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
        }
    }

    pub fn unsupported(span: Span, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unsupported, span, message)
    }

    pub fn missing_fact(span: Span, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingFact, span, message)
    }

    /// Internal faults have no useful source position.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, Span::default(), message)
    }

    pub fn render(&self, path: Option<&str>) -> String {
        match path {
            Some(p) => format!("{}:{}: {}", p, self.span.lo, self),
            None => format!("{}", self),
        }
    }
}
