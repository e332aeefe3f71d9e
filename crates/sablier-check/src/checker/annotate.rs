//! Bottom-up type annotation.
//!
//! The annotator recurses into children first and then derives the node's
//! type from its kind and the child types. Reference and literal nodes
//! arrive with builder-assigned types and are left untouched. When an
//! operator receives operands outside its domain the error is reported and
//! a recovery type is assigned so checks further up still say something
//! useful.

use sablier_model::expr::{ExprKind, Expression};
use sablier_model::types::{BaseKind, Type, TypeBase};

use super::predicates::{
    are_assignment_compatible, are_inline_if_compatible, base_of, is_clock, is_constraint,
    is_diff, is_guard, is_integer, is_invariant, is_lhs_value, is_record,
};
use super::TypeChecker;
use crate::interp::Interpreter;

impl TypeChecker<'_> {
    /// Type-check and annotate the expression.
    ///
    /// Assigns a type to every operator node, checks that only left-hand
    /// side values are updated, that operators see compatible operands and
    /// that calls match their signature. Integer ranges are not checked
    /// here.
    pub(crate) fn annotate(&mut self, expr: &mut Expression) {
        for child in &mut expr.children {
            self.annotate(child);
        }

        let ty = match &expr.kind {
            ExprKind::Eq | ExprKind::Neq => {
                let (left, right) = (&expr.children[0], &expr.children[1]);
                if is_integer(left) && is_integer(right) {
                    Type::int()
                } else if same_record_frames(left, right) {
                    Type::int()
                } else {
                    match type_of_binary_non_int(left, &expr.kind, right) {
                        Some(ty) => ty,
                        None => {
                            self.sink
                                .error(expr.span, "Invalid operands to binary operator");
                            Type::constraint()
                        }
                    }
                }
            }

            ExprKind::Plus
            | ExprKind::Minus
            | ExprKind::Mult
            | ExprKind::Div
            | ExprKind::Mod
            | ExprKind::BitAnd
            | ExprKind::BitOr
            | ExprKind::BitXor
            | ExprKind::ShiftLeft
            | ExprKind::ShiftRight
            | ExprKind::And
            | ExprKind::Or
            | ExprKind::Min
            | ExprKind::Max
            | ExprKind::Lt
            | ExprKind::Le
            | ExprKind::Ge
            | ExprKind::Gt => {
                let (left, right) = (&expr.children[0], &expr.children[1]);
                if is_integer(left) && is_integer(right) {
                    Type::int()
                } else {
                    match type_of_binary_non_int(left, &expr.kind, right) {
                        Some(ty) => ty,
                        None => {
                            self.sink
                                .error(expr.span, "Invalid operands to binary operator");
                            Type::constraint()
                        }
                    }
                }
            }

            ExprKind::Not => {
                let operand = &expr.children[0];
                if is_integer(operand) {
                    Type::int()
                } else if is_constraint(operand) {
                    Type::constraint()
                } else {
                    self.sink.error(expr.span, "Invalid operation for type");
                    Type::int()
                }
            }

            ExprKind::UnaryMinus => {
                if !is_integer(&expr.children[0]) {
                    self.sink.error(expr.span, "Invalid operation for type");
                }
                Type::int()
            }

            ExprKind::Assign => {
                let compatible = match (&expr.children[0].ty, &expr.children[1].ty) {
                    (Some(lhs), Some(rhs)) => are_assignment_compatible(lhs, rhs),
                    _ => false,
                };
                if !compatible {
                    self.sink.error(expr.span, "Incompatible types");
                } else if !is_lhs_value(self.symbols, &expr.children[0]) {
                    self.sink
                        .error(expr.children[0].span, "Left hand side value expected");
                }
                expr.children[0].ty.clone().unwrap_or_else(Type::int)
            }

            kind if kind.is_assignment() => {
                if !is_integer(&expr.children[0]) || !is_integer(&expr.children[1]) {
                    self.sink.error(
                        expr.span,
                        "Non-integer types must use regular assignment operator.",
                    );
                } else if !is_lhs_value(self.symbols, &expr.children[0]) {
                    self.sink
                        .error(expr.children[0].span, "Left hand side value expected");
                }
                expr.children[0].ty.clone().unwrap_or_else(Type::int)
            }

            kind if kind.is_increment_or_decrement() => {
                if base_of(&expr.children[0]) != Some(BaseKind::Int) {
                    self.sink
                        .error(expr.span, "Argument must be an integer value");
                } else if !is_lhs_value(self.symbols, &expr.children[0]) {
                    self.sink
                        .error(expr.children[0].span, "Left hand side value expected");
                }
                Type::int()
            }

            ExprKind::InlineIf => {
                if !is_integer(&expr.children[0]) {
                    self.sink
                        .error(expr.span, "First argument of inline if must be an integer");
                }
                let compatible = match (&expr.children[1].ty, &expr.children[2].ty) {
                    (Some(then_ty), Some(else_ty)) => {
                        are_inline_if_compatible(then_ty, else_ty)
                    }
                    _ => false,
                };
                if !compatible {
                    self.sink
                        .error(expr.span, "Incompatible arguments to inline if");
                }
                expr.children[1].ty.clone().unwrap_or_else(Type::int)
            }

            ExprKind::Comma => {
                let admissible =
                    |expr: &Expression| is_integer(expr) || is_clock(expr) || is_record(expr);
                if !admissible(&expr.children[0]) || !admissible(&expr.children[1]) {
                    self.sink.error(
                        expr.span,
                        "Arguments must be of integer, clock or record type",
                    );
                }
                expr.children[1].ty.clone().unwrap_or_else(Type::int)
            }

            ExprKind::Call => {
                if base_of(&expr.children[0]) != Some(BaseKind::Function) {
                    self.sink
                        .error(expr.children[0].span, "A function name was expected here");
                } else {
                    self.check_call_arguments(expr);
                }
                // The node keeps its builder-assigned return type.
                return;
            }

            _ => return,
        };
        expr.ty = Some(ty);
    }

    fn check_call_arguments(&mut self, expr: &Expression) {
        let Some(TypeBase::Function { parameters, .. }) =
            expr.children[0].ty.as_ref().map(|ty| &ty.base)
        else {
            return;
        };
        let formals: Vec<Type> = self
            .symbols
            .frame(*parameters)
            .symbols()
            .iter()
            .map(|&symbol| self.symbols.type_of(symbol).clone())
            .collect();

        let argument_count = expr.children.len() - 1;
        if formals.len() > argument_count {
            self.sink.error(expr.span, "Too few arguments");
        } else if formals.len() < argument_count {
            for argument in &expr.children[formals.len() + 1..] {
                self.sink.error(argument.span, "Too many arguments");
            }
        } else {
            let interpreter = Interpreter::new(self.valuation);
            for (formal, argument) in formals.iter().zip(&expr.children[1..]) {
                self.check_parameter_compatible(&interpreter, formal, argument);
            }
        }
    }
}

fn same_record_frames(left: &Expression, right: &Expression) -> bool {
    match (&left.ty, &right.ty) {
        (Some(lty), Some(rty)) => match (lty.record_fields(), rty.record_fields()) {
            (Some(lfields), Some(rfields)) => lfields == rfields,
            _ => false,
        },
        _ => false,
    }
}

/// Result type of a binary operator whose operands are not both integer.
///
/// Clock arithmetic closes over {clock, diff, int}; comparisons land in the
/// constraint lattice. Note the asymmetry between the strict orders: a
/// clock upper bound is invariant-admissible while a clock lower bound is
/// guard-only.
fn type_of_binary_non_int(
    left: &Expression,
    op: &ExprKind,
    right: &Expression,
) -> Option<Type> {
    match op {
        ExprKind::Plus => {
            if (is_integer(left) && is_clock(right)) || (is_clock(left) && is_integer(right)) {
                Some(Type::clock())
            } else if (is_diff(left) && is_integer(right))
                || (is_integer(left) && is_diff(right))
            {
                Some(Type::diff())
            } else {
                None
            }
        }
        ExprKind::Minus => {
            if is_clock(left) && is_integer(right) {
                Some(Type::clock())
            } else if (is_diff(left) && is_integer(right))
                || (is_integer(left) && is_diff(right))
                || (is_clock(left) && is_clock(right))
            {
                Some(Type::diff())
            } else {
                None
            }
        }
        ExprKind::And => {
            if is_invariant(left) && is_invariant(right) {
                Some(Type::invariant())
            } else if is_guard(left) && is_guard(right) {
                Some(Type::guard())
            } else if is_constraint(left) && is_constraint(right) {
                Some(Type::constraint())
            } else {
                None
            }
        }
        ExprKind::Or => {
            if is_constraint(left) && is_constraint(right) {
                Some(Type::constraint())
            } else {
                None
            }
        }
        ExprKind::Lt | ExprKind::Le => {
            if (is_clock(left) && is_clock(right))
                || (is_clock(left) && is_integer(right))
                || (is_diff(left) && is_integer(right))
                || (is_integer(left) && is_diff(right))
            {
                Some(Type::invariant())
            } else if is_integer(left) && is_clock(right) {
                Some(Type::guard())
            } else {
                None
            }
        }
        ExprKind::Eq => clock_comparison(left, right).then(Type::guard),
        ExprKind::Neq => clock_comparison(left, right).then(Type::constraint),
        ExprKind::Ge | ExprKind::Gt => {
            if (is_clock(left) && is_clock(right))
                || (is_integer(left) && is_clock(right))
                || (is_diff(left) && is_integer(right))
                || (is_integer(left) && is_diff(right))
            {
                Some(Type::invariant())
            } else if is_clock(left) && is_guard(right) {
                Some(Type::guard())
            } else {
                None
            }
        }
        _ => None,
    }
}

fn clock_comparison(left: &Expression, right: &Expression) -> bool {
    (is_clock(left) && is_clock(right))
        || (is_clock(left) && is_integer(right))
        || (is_integer(left) && is_clock(right))
        || (is_diff(left) && is_integer(right))
        || (is_integer(left) && is_diff(right))
}
