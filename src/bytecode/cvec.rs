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

// Per-unit constant pool.
//
// Insertion order is the pool layout; re-inserting an equal constant
// returns the original index. Floats dedup on bit pattern, so 5 and 5.0
// occupy distinct slots and NaN payloads are preserved.

use indexmap::IndexSet;

use crate::error::CompileError;

/// One pool entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Const {
    Int(i64),
    /// Bit pattern of an f64.
    Float(u64),
    Str(String),
    Sym(String),
}

impl Const {
    pub fn float(v: f64) -> Self {
        Const::Float(v.to_bits())
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Const::Float(bits) => Some(f64::from_bits(*bits)),
            _ => None,
        }
    }
}

/// Deduplicating constant vector.
#[derive(Debug, Default)]
pub struct ConstVec {
    entries: IndexSet<Const>,
}

impl ConstVec {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, c: Const) -> Result<u16, CompileError> {
        let (index, _) = self.entries.insert_full(c);
        u16::try_from(index)
            .map_err(|_| CompileError::internal("constant pool exceeds the operand range"))
    }

    pub fn insert_int(&mut self, v: i64) -> Result<u16, CompileError> {
        self.insert(Const::Int(v))
    }

    pub fn insert_float(&mut self, v: f64) -> Result<u16, CompileError> {
        self.insert(Const::float(v))
    }

    pub fn insert_str(&mut self, s: &str) -> Result<u16, CompileError> {
        self.insert(Const::Str(s.to_owned()))
    }

    pub fn insert_sym(&mut self, s: &str) -> Result<u16, CompileError> {
        self.insert(Const::Sym(s.to_owned()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Const> {
        self.entries.into_iter().collect()
    }
}
