//! An abstract boolean/integer term-construction surface: `fresh_bool, fresh_int, and, or, not,
//! implies, iff, eq, lt, le, if_then_else, sum, abs`. Everything downstream (`lattice`,
//! `constraints`, `kpi`) only calls through [`Smt`]; it never
//! touches the `z3` crate directly. That keeps the core solver-portable — a different SMT or
//! CP-SAT backend could be substituted here without touching the constraint/KPI encodings.

use z3::ast::{Ast, Bool, Int};
use z3::Context;

/// A handle to a single division's worth of fresh-variable allocation and term construction,
/// all scoped to one [`z3::Context`].
pub struct Smt<'ctx> {
    ctx: &'ctx Context,
}

impl<'ctx> Smt<'ctx> {
    pub fn new(ctx: &'ctx Context) -> Self {
        Self { ctx }
    }

    pub fn ctx(&self) -> &'ctx Context {
        self.ctx
    }

    pub fn fresh_bool(&self, name: &str) -> Bool<'ctx> {
        Bool::new_const(self.ctx, name)
    }

    pub fn fresh_int(&self, name: &str) -> Int<'ctx> {
        Int::new_const(self.ctx, name)
    }

    pub fn bool_const(&self, value: bool) -> Bool<'ctx> {
        Bool::from_bool(self.ctx, value)
    }

    pub fn int_const(&self, value: i64) -> Int<'ctx> {
        Int::from_i64(self.ctx, value)
    }

    pub fn and(&self, terms: &[Bool<'ctx>]) -> Bool<'ctx> {
        if terms.is_empty() {
            return self.bool_const(true);
        }
        let refs: Vec<&Bool<'ctx>> = terms.iter().collect();
        Bool::and(self.ctx, &refs)
    }

    pub fn or(&self, terms: &[Bool<'ctx>]) -> Bool<'ctx> {
        if terms.is_empty() {
            return self.bool_const(false);
        }
        let refs: Vec<&Bool<'ctx>> = terms.iter().collect();
        Bool::or(self.ctx, &refs)
    }

    pub fn not(&self, term: &Bool<'ctx>) -> Bool<'ctx> {
        term.not()
    }

    pub fn implies(&self, a: &Bool<'ctx>, b: &Bool<'ctx>) -> Bool<'ctx> {
        a.implies(b)
    }

    pub fn iff(&self, a: &Bool<'ctx>, b: &Bool<'ctx>) -> Bool<'ctx> {
        a.iff(b)
    }

    pub fn int_eq(&self, a: &Int<'ctx>, b: &Int<'ctx>) -> Bool<'ctx> {
        a._eq(b)
    }

    pub fn lt(&self, a: &Int<'ctx>, b: &Int<'ctx>) -> Bool<'ctx> {
        a.lt(b)
    }

    pub fn le(&self, a: &Int<'ctx>, b: &Int<'ctx>) -> Bool<'ctx> {
        a.le(b)
    }

    pub fn ite_int(&self, cond: &Bool<'ctx>, then: &Int<'ctx>, otherwise: &Int<'ctx>) -> Int<'ctx> {
        cond.ite(then, otherwise)
    }

    pub fn sum(&self, terms: &[Int<'ctx>]) -> Int<'ctx> {
        if terms.is_empty() {
            return self.int_const(0);
        }
        let refs: Vec<&Int<'ctx>> = terms.iter().collect();
        Int::add(self.ctx, &refs)
    }

    pub fn sub(&self, a: &Int<'ctx>, b: &Int<'ctx>) -> Int<'ctx> {
        Int::sub(self.ctx, &[a, b])
    }

    /// `|a|`, built from `ite` and negation rather than assumed to be a primitive (z3's integer
    /// sort has no built-in absolute value).
    pub fn abs(&self, a: &Int<'ctx>) -> Int<'ctx> {
        let zero = self.int_const(0);
        let negated = self.sub(&zero, a);
        self.ite_int(&self.le(&zero, a), a, &negated)
    }

    /// 1 if `cond` holds, else 0 — the usual way to turn a boolean predicate into a KPI counter
    /// term.
    pub fn indicator(&self, cond: &Bool<'ctx>) -> Int<'ctx> {
        self.ite_int(cond, &self.int_const(1), &self.int_const(0))
    }
}
