//! Constant-folding interpreter.
//!
//! Evaluates expressions over the constants known at analysis time: the
//! system's constant valuation, optionally extended with an instance's
//! parameter mapping. Anything that reaches beyond that world (runtime
//! variables, clocks, function calls) fails with [`NotComputable`], and
//! the caller picks a fallback. Failure is a value here, never unwinding.

use indexmap::IndexMap;
use thiserror::Error;

use sablier_model::expr::{ExprKind, Expression};
use sablier_model::symbol::SymbolId;
use sablier_model::types::{Range, RangeDecl};

/// The expression depends on state unavailable at analysis time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expression is not computable at analysis time")]
pub struct NotComputable;

pub type EvalResult<T> = Result<T, NotComputable>;

/// Evaluates expressions against layered symbol valuations.
pub struct Interpreter<'a> {
    layers: Vec<&'a IndexMap<SymbolId, Expression>>,
}

impl<'a> Interpreter<'a> {
    pub fn new(constants: &'a IndexMap<SymbolId, Expression>) -> Self {
        Self {
            layers: vec![constants],
        }
    }

    /// Extend the valuation, e.g. with an instance parameter mapping.
    /// Later layers shadow earlier ones.
    pub fn push_valuation(&mut self, valuation: &'a IndexMap<SymbolId, Expression>) {
        self.layers.push(valuation);
    }

    fn lookup(&self, symbol: SymbolId) -> Option<&'a Expression> {
        self.layers.iter().rev().find_map(|layer| layer.get(&symbol))
    }

    /// Follow identifier bindings down to the defining expression.
    fn resolve<'e>(&'e self, mut expr: &'e Expression) -> &'e Expression {
        while expr.kind == ExprKind::Identifier {
            match expr.symbol.and_then(|symbol| self.lookup(symbol)) {
                Some(bound) => expr = bound,
                None => break,
            }
        }
        expr
    }

    pub fn evaluate(&self, expr: &Expression) -> EvalResult<i32> {
        match &expr.kind {
            ExprKind::Constant(value) => Ok(*value),
            ExprKind::Identifier => {
                let bound = expr
                    .symbol
                    .and_then(|symbol| self.lookup(symbol))
                    .ok_or(NotComputable)?;
                self.evaluate(bound)
            }
            ExprKind::Plus => self.arithmetic(expr, i32::checked_add),
            ExprKind::Minus => self.arithmetic(expr, i32::checked_sub),
            ExprKind::Mult => self.arithmetic(expr, i32::checked_mul),
            ExprKind::Div => self.arithmetic(expr, |a, b| a.checked_div(b)),
            ExprKind::Mod => self.arithmetic(expr, |a, b| a.checked_rem(b)),
            ExprKind::BitAnd => self.arithmetic(expr, |a, b| Some(a & b)),
            ExprKind::BitOr => self.arithmetic(expr, |a, b| Some(a | b)),
            ExprKind::BitXor => self.arithmetic(expr, |a, b| Some(a ^ b)),
            ExprKind::ShiftLeft => self.shift(expr, i32::checked_shl),
            ExprKind::ShiftRight => self.shift(expr, i32::checked_shr),
            ExprKind::And => self.arithmetic(expr, |a, b| Some((a != 0 && b != 0) as i32)),
            ExprKind::Or => self.arithmetic(expr, |a, b| Some((a != 0 || b != 0) as i32)),
            ExprKind::Min => self.arithmetic(expr, |a, b| Some(a.min(b))),
            ExprKind::Max => self.arithmetic(expr, |a, b| Some(a.max(b))),
            ExprKind::Lt => self.arithmetic(expr, |a, b| Some((a < b) as i32)),
            ExprKind::Le => self.arithmetic(expr, |a, b| Some((a <= b) as i32)),
            ExprKind::Ge => self.arithmetic(expr, |a, b| Some((a >= b) as i32)),
            ExprKind::Gt => self.arithmetic(expr, |a, b| Some((a > b) as i32)),
            ExprKind::Eq => self.arithmetic(expr, |a, b| Some((a == b) as i32)),
            ExprKind::Neq => self.arithmetic(expr, |a, b| Some((a != b) as i32)),
            ExprKind::Not => Ok((self.evaluate(&expr.children[0])? == 0) as i32),
            ExprKind::UnaryMinus => self
                .evaluate(&expr.children[0])?
                .checked_neg()
                .ok_or(NotComputable),
            ExprKind::InlineIf => {
                if self.evaluate(&expr.children[0])? != 0 {
                    self.evaluate(&expr.children[1])
                } else {
                    self.evaluate(&expr.children[2])
                }
            }
            ExprKind::Comma => self.evaluate(&expr.children[1]),
            ExprKind::Index => {
                let position = self.evaluate(&expr.children[1])?;
                let base = self.resolve(&expr.children[0]);
                if let ExprKind::List { .. } = base.kind {
                    let element = usize::try_from(position)
                        .ok()
                        .and_then(|i| base.children.get(i))
                        .ok_or(NotComputable)?;
                    self.evaluate(element)
                } else {
                    Err(NotComputable)
                }
            }
            _ => Err(NotComputable),
        }
    }

    /// Evaluate an expression that may denote an aggregate, appending every
    /// scalar it contains.
    pub fn evaluate_values(&self, expr: &Expression, out: &mut Vec<i32>) -> EvalResult<()> {
        let resolved = self.resolve(expr);
        if let ExprKind::List { .. } = resolved.kind {
            for element in &resolved.children {
                self.evaluate_values(element, out)?;
            }
            Ok(())
        } else {
            out.push(self.evaluate(resolved)?);
            Ok(())
        }
    }

    pub fn evaluate_range(&self, decl: &RangeDecl) -> EvalResult<Range> {
        Ok(Range::new(
            self.evaluate(&decl.lo)?,
            self.evaluate(&decl.hi)?,
        ))
    }

    fn arithmetic(
        &self,
        expr: &Expression,
        op: impl FnOnce(i32, i32) -> Option<i32>,
    ) -> EvalResult<i32> {
        let left = self.evaluate(&expr.children[0])?;
        let right = self.evaluate(&expr.children[1])?;
        op(left, right).ok_or(NotComputable)
    }

    fn shift(
        &self,
        expr: &Expression,
        op: impl FnOnce(i32, u32) -> Option<i32>,
    ) -> EvalResult<i32> {
        let left = self.evaluate(&expr.children[0])?;
        let right = self.evaluate(&expr.children[1])?;
        let amount = u32::try_from(right).map_err(|_| NotComputable)?;
        op(left, amount).ok_or(NotComputable)
    }
}
