//! Classification predicates over annotated expressions and types.
//!
//! The lattice predicates are cumulative: integers are valid invariants,
//! invariants are valid guards, guards are valid constraints. An expression
//! without a type satisfies none of them.

use sablier_model::expr::{ExprKind, Expression};
use sablier_model::symbol::SymbolTable;
use sablier_model::types::{BaseKind, Prefix, RangeDecl, Type, TypeBase};

pub(crate) fn base_of(expr: &Expression) -> Option<BaseKind> {
    expr.ty.as_ref().map(Type::kind)
}

/// True for expressions of integer or boolean type.
pub fn is_integer(expr: &Expression) -> bool {
    matches!(base_of(expr), Some(BaseKind::Int | BaseKind::Bool))
}

pub fn is_clock(expr: &Expression) -> bool {
    base_of(expr) == Some(BaseKind::Clock)
}

pub fn is_diff(expr: &Expression) -> bool {
    base_of(expr) == Some(BaseKind::Diff)
}

pub fn is_record(expr: &Expression) -> bool {
    base_of(expr) == Some(BaseKind::Record)
}

/// A valid invariant is an invariant expression or an integer expression.
pub fn is_invariant(expr: &Expression) -> bool {
    base_of(expr) == Some(BaseKind::Invariant) || is_integer(expr)
}

/// A valid guard is a guard expression or a valid invariant.
pub fn is_guard(expr: &Expression) -> bool {
    base_of(expr) == Some(BaseKind::Guard) || is_invariant(expr)
}

/// A valid constraint is a constraint expression or a valid guard.
pub fn is_constraint(expr: &Expression) -> bool {
    base_of(expr) == Some(BaseKind::Constraint) || is_guard(expr)
}

/// Whether the expression denotes an assignable location.
///
/// An inline-if over integers is only assignable when both branches declare
/// the same range: the two locations must agree on what values fit.
pub fn is_lhs_value(symbols: &SymbolTable, expr: &Expression) -> bool {
    match &expr.kind {
        ExprKind::Identifier => expr
            .symbol
            .is_some_and(|symbol| !symbols.type_of(symbol).has_prefix(Prefix::Constant)),
        ExprKind::Dot | ExprKind::Index => is_lhs_value(symbols, &expr.children[0]),
        ExprKind::InlineIf => {
            if !is_lhs_value(symbols, &expr.children[1])
                || !is_lhs_value(symbols, &expr.children[2])
            {
                return false;
            }
            let then_ty = declared_type(symbols, &expr.children[1]);
            let else_ty = declared_type(symbols, &expr.children[2]);
            match (then_ty, else_ty) {
                (Some(then_ty), Some(else_ty)) => {
                    let then_ty = strip_arrays(then_ty);
                    let else_ty = strip_arrays(else_ty);
                    then_ty.kind() != BaseKind::Int
                        || same_range_declarations(then_ty.int_range(), else_ty.int_range())
                }
                _ => false,
            }
        }
        ExprKind::Comma => is_lhs_value(symbols, &expr.children[1]),
        kind if kind.is_assignment() => is_lhs_value(symbols, &expr.children[0]),
        ExprKind::PreIncrement | ExprKind::PreDecrement => {
            is_lhs_value(symbols, &expr.children[0])
        }
        // Calls cannot return references, and a post-increment value is a
        // temporary.
        _ => false,
    }
}

/// The declared type behind a left-hand-side path: the bound symbol's type
/// where one exists, the annotation otherwise.
fn declared_type<'t>(symbols: &'t SymbolTable, expr: &'t Expression) -> Option<&'t Type> {
    match expr.bound_symbol() {
        Some(symbol) => Some(symbols.type_of(symbol)),
        None => expr.ty.as_ref(),
    }
}

fn strip_arrays(mut ty: &Type) -> &Type {
    while let TypeBase::Array { elem, .. } = &ty.base {
        ty = elem;
    }
    ty
}

fn same_range_declarations(a: Option<&RangeDecl>, b: Option<&RangeDecl>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.same_endpoints(b),
        _ => false,
    }
}

/// Whether a value of type `rvalue` may be assigned to a location of type
/// `lvalue`. Integer ranges are not consulted here.
pub fn are_assignment_compatible(lvalue: &Type, rvalue: &Type) -> bool {
    match &lvalue.base {
        TypeBase::Clock | TypeBase::Int { .. } | TypeBase::Bool => {
            matches!(rvalue.kind(), BaseKind::Int | BaseKind::Bool)
        }
        TypeBase::Record { fields } => {
            matches!(&rvalue.base, TypeBase::Record { fields: rfields } if rfields == fields)
        }
        _ => false,
    }
}

/// Whether two types may appear as the branches of an inline-if.
///
/// Integers and booleans mix; clocks only pair with clocks; channels must
/// agree on urgency and broadcast; arrays match size-wise and recursively;
/// records nominally.
pub fn are_inline_if_compatible(then_ty: &Type, else_ty: &Type) -> bool {
    match &then_ty.base {
        TypeBase::Int { .. } | TypeBase::Bool => {
            matches!(else_ty.kind(), BaseKind::Int | BaseKind::Bool)
        }
        TypeBase::Clock => else_ty.kind() == BaseKind::Clock,
        TypeBase::Channel => {
            else_ty.kind() == BaseKind::Channel
                && then_ty.has_prefix(Prefix::Urgent) == else_ty.has_prefix(Prefix::Urgent)
                && then_ty.has_prefix(Prefix::Broadcast) == else_ty.has_prefix(Prefix::Broadcast)
        }
        TypeBase::Array { size, elem } => match &else_ty.base {
            TypeBase::Array {
                size: else_size,
                elem: else_elem,
            } => size.syntactically_equal(else_size) && are_inline_if_compatible(elem, else_elem),
            _ => false,
        },
        TypeBase::Record { fields } => {
            matches!(&else_ty.base, TypeBase::Record { fields: efields } if efields == fields)
        }
        _ => false,
    }
}

/// Synchronization capability of a channel type: urgent channels rank
/// lowest, broadcast channels next, plain channels highest. An argument
/// must offer at least the capability its parameter demands.
pub fn channel_capability(ty: &Type) -> u8 {
    if ty.has_prefix(Prefix::Urgent) {
        0
    } else if ty.has_prefix(Prefix::Broadcast) {
        1
    } else {
        2
    }
}
