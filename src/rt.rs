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

// Capability interface of the primitive runtime library.
//
// The core only knows these exist as fixed-arity, named entry points in the
// host namespace; it never implements or verifies their behavior.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Boolean coercion of an arbitrary host value.
pub const FN_COERCE_BOOL: &str = "Ivy--coerce-bool";
/// Space-free concatenating print.
pub const FN_PRINT: &str = "Ivy--print";
/// Print with separators and a trailing newline.
pub const FN_PRINTLN: &str = "Ivy--println";
/// Run-time panic.
pub const FN_PANIC: &str = "Ivy--panic";
pub const FN_BYTES_TO_STR: &str = "Ivy--bytes-to-str";
pub const FN_STR_TO_BYTES: &str = "Ivy--str-to-bytes";
/// Map writes are never a primitive store; they go through this call.
pub const FN_MAP_INSERT: &str = "Ivy--map-insert";
pub const FN_MAP_GET: &str = "gethash";
pub const FN_SLICE_GET: &str = "Ivy--slice-get";
pub const FN_SLICE_SET: &str = "Ivy--slice-set";
pub const FN_ARRAY_TO_SLICE: &str = "Ivy--array-to-slice";
/// Value copy for aggregates with value semantics.
pub const FN_VALUE_COPY: &str = "copy-sequence";
pub const FN_INTERN: &str = "intern";
pub const FN_FUNCALL: &str = "funcall";

/// Canonical symbol for the empty string intern.
pub const EMPTY_SYM: &str = "##";

/// Reserved storage for the 2nd..Nth results of a multi-value call.
/// Slot `i` holds result position `i`; slot 0 is never used because the
/// first result travels on the evaluation stack. The names are an external
/// convention shared with the runtime loader.
pub const RET_VARS: [&str; 9] = [
    "",
    "Ivy--ret-1",
    "Ivy--ret-2",
    "Ivy--ret-3",
    "Ivy--ret-4",
    "Ivy--ret-5",
    "Ivy--ret-6",
    "Ivy--ret-7",
    "Ivy--ret-8",
];

static FFI: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Print", FN_PRINT),
        ("Println", FN_PRINTLN),
        ("Panic", FN_PANIC),
        ("BytesToStr", FN_BYTES_TO_STR),
        ("StrToBytes", FN_STR_TO_BYTES),
        ("CoerceBool", FN_COERCE_BOOL),
        ("Message", "message"),
        ("Concat", "concat"),
    ])
});

/// Host symbol for a recognized foreign function name, if any.
pub fn ffi(name: &str) -> Option<&'static str> {
    FFI.get(name).copied()
}
