// src/frontend/intern.rs

use crate::frontend::ast::Symbol;
use rustc_hash::FxHashMap;

/// Interns strings to unique Symbol IDs
#[derive(Debug, Default)]
pub struct Interner {
    map: FxHashMap<String, Symbol>,
    strings: Vec<String>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, s: &str) -> Symbol {
        if let Some(&sym) = self.map.get(s) {
            return sym;
        }

        let sym = Symbol::new(self.strings.len() as u32);
        self.strings.push(s.to_string());
        self.map.insert(s.to_string(), sym);
        sym
    }

    /// Look up a string without interning it.
    pub fn lookup(&self, s: &str) -> Option<Symbol> {
        self.map.get(s).copied()
    }

    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.strings[sym.index() as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_returns_same_symbol() {
        let mut interner = Interner::new();
        let s1 = interner.intern("Shape");
        let s2 = interner.intern("Shape");
        let s3 = interner.intern("Square");

        assert_eq!(s1, s2);
        assert_ne!(s1, s3);
    }

    #[test]
    fn resolve_returns_original_string() {
        let mut interner = Interner::new();
        let sym = interner.intern("area");
        assert_eq!(interner.resolve(sym), "area");
        assert_eq!(interner.lookup("area"), Some(sym));
        assert_eq!(interner.lookup("missing"), None);
    }
}
