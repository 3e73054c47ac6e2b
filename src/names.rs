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

// Host-visible symbol naming.
//
// The host loader binds persistent storage by name, so generated names must
// be reproducible across compilations of the same input and unique per
// (package, name) pair.

const SYM_PREFIX: &str = "Ivy-";

/// Host storage name for a package-level variable.
pub fn var_name(pkg: &str, name: &str) -> String {
    mangle(pkg, name)
}

/// Host function name for a package-level function.
pub fn func_name(pkg: &str, name: &str) -> String {
    mangle(pkg, name)
}

fn mangle(pkg: &str, name: &str) -> String {
    let mut out = String::with_capacity(SYM_PREFIX.len() + pkg.len() + 1 + name.len());
    out.push_str(SYM_PREFIX);
    out.push_str(pkg);
    out.push('.');
    out.push_str(name);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_name_is_deterministic() {
        assert_eq!(var_name("pkg", "X"), var_name("pkg", "X"));
        assert_eq!(var_name("pkg", "X"), "Ivy-pkg.X");
    }

    #[test]
    fn var_name_is_unique_per_pair() {
        assert_ne!(var_name("pkg", "X"), var_name("pkg", "Y"));
        assert_ne!(var_name("p1", "v"), var_name("p2", "v"));
    }

    #[test]
    fn func_name_uses_same_scheme() {
        assert_eq!(func_name("main", "init"), "Ivy-main.init");
    }
}
