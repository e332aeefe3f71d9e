//! Property-based invariants of the annotator and the range algebra.

mod common;

use common::*;
use proptest::prelude::*;

use sablier_check::checker::is_lhs_value;
use sablier_model::expr::{ExprKind, Expression};
use sablier_model::symbol::{SymbolId, SymbolTable};
use sablier_model::types::{BaseKind, Prefix, Range, Type};

fn integer_kind() -> impl Strategy<Value = ExprKind> {
    prop_oneof![
        Just(ExprKind::Plus),
        Just(ExprKind::Minus),
        Just(ExprKind::Mult),
        Just(ExprKind::BitAnd),
        Just(ExprKind::Min),
        Just(ExprKind::Max),
        Just(ExprKind::Lt),
        Just(ExprKind::Eq),
        Just(ExprKind::And),
    ]
}

fn integer_expr() -> impl Strategy<Value = Expression> {
    let leaf = any::<i16>().prop_map(|value| constant(value as i32));
    leaf.prop_recursive(3, 24, 2, |inner| {
        (integer_kind(), inner.clone(), inner)
            .prop_map(|(kind, left, right)| binary(kind, left, right))
    })
}

fn all_subexpressions_typed(expr: &Expression) -> bool {
    expr.ty.is_some() && expr.children.iter().all(all_subexpressions_typed)
}

/// Lattice levels: 0 = integer, 1 = invariant, 2 = guard, 3 = constraint.
fn level_expr(builder: &ModelBuilder, clock: SymbolId, level: u8) -> Expression {
    match level {
        0 => constant(1),
        1 => binary(ExprKind::Lt, builder.ident(clock), constant(5)),
        2 => binary(ExprKind::Lt, constant(5), builder.ident(clock)),
        _ => binary(ExprKind::Neq, builder.ident(clock), constant(5)),
    }
}

fn kind_for_level(level: u8) -> BaseKind {
    match level {
        0 => BaseKind::Int,
        1 => BaseKind::Invariant,
        2 => BaseKind::Guard,
        _ => BaseKind::Constraint,
    }
}

proptest! {
    #[test]
    fn integer_operator_trees_annotate_totally(expr in integer_expr()) {
        let mut builder = ModelBuilder::new();
        builder.system.add_property(expr);

        let sink = builder.check();
        prop_assert!(!sink.has_errors(), "diagnostics: {:?}", messages(&sink));
        prop_assert!(all_subexpressions_typed(&builder.system.properties[0]));
    }

    #[test]
    fn conjunction_lands_on_the_highest_operand_level(a in 0u8..4, b in 0u8..4) {
        let mut builder = ModelBuilder::new();
        let clock = builder.global("x", Type::clock(), None);
        let conjunction = binary(
            ExprKind::And,
            level_expr(&builder, clock, a),
            level_expr(&builder, clock, b),
        );
        builder.system.add_property(conjunction);

        let sink = builder.check();
        prop_assert!(!sink.has_errors(), "diagnostics: {:?}", messages(&sink));
        let ty = builder.system.properties[0].ty.as_ref().unwrap();
        prop_assert_eq!(ty.kind(), kind_for_level(a.max(b)));
    }

    #[test]
    fn disjunction_is_constraint_level_unless_integer(a in 0u8..4, b in 0u8..4) {
        let mut builder = ModelBuilder::new();
        let clock = builder.global("x", Type::clock(), None);
        let disjunction = binary(
            ExprKind::Or,
            level_expr(&builder, clock, a),
            level_expr(&builder, clock, b),
        );
        builder.system.add_property(disjunction);

        let sink = builder.check();
        prop_assert!(!sink.has_errors(), "diagnostics: {:?}", messages(&sink));
        let ty = builder.system.properties[0].ty.as_ref().unwrap();
        let expected = if a.max(b) == 0 {
            BaseKind::Int
        } else {
            BaseKind::Constraint
        };
        prop_assert_eq!(ty.kind(), expected);
    }

    #[test]
    fn expressions_outside_the_lvalue_grammar_are_never_assignable(
        expr in prop_oneof![
            any::<i16>().prop_map(|value| constant(value as i32)),
            (any::<i16>(), any::<i16>()).prop_map(|(a, b)| binary(
                ExprKind::Plus,
                constant(a as i32),
                constant(b as i32),
            )),
            (any::<i16>(), any::<i16>()).prop_map(|(a, b)| binary(
                ExprKind::Eq,
                constant(a as i32),
                constant(b as i32),
            )),
            any::<i16>().prop_map(|value| unary(ExprKind::Not, constant(value as i32))),
            any::<i16>().prop_map(|value| unary(ExprKind::UnaryMinus, constant(value as i32))),
            any::<i16>().prop_map(|value| unary(
                ExprKind::PostIncrement,
                constant(value as i32),
            )),
            Just(Expression::list(span(), vec![(None, constant(1))])),
        ]
    ) {
        let symbols = SymbolTable::new();
        prop_assert!(!is_lhs_value(&symbols, &expr));
    }

    #[test]
    fn integer_initialisers_are_accepted_exactly_when_in_range(
        lo in -50i32..50,
        extent in 0i32..50,
        value in -120i32..120,
    ) {
        let hi = lo + extent;
        let mut builder = ModelBuilder::new();
        builder.global(
            "n",
            Type::ranged_int(constant(lo), constant(hi)).with_prefix(Prefix::Constant),
            Some(constant(value)),
        );

        let sink = builder.check();
        let in_range = lo <= value && value <= hi;
        prop_assert_eq!(!sink.has_errors(), in_range);
        if !in_range {
            prop_assert!(has_error(&sink, "Initialiser is out of range"));
        }
    }

    #[test]
    fn range_join_covers_and_intersect_narrows(
        a_lo in -50i32..50, a_extent in 0i32..30,
        b_lo in -50i32..50, b_extent in 0i32..30,
    ) {
        let a = Range::new(a_lo, a_lo + a_extent);
        let b = Range::new(b_lo, b_lo + b_extent);

        let joined = a.join(b);
        prop_assert!(joined.contains(a));
        prop_assert!(joined.contains(b));

        let met = a.intersect(b);
        if !met.is_empty() {
            prop_assert!(a.contains(met));
            prop_assert!(b.contains(met));
        }
        prop_assert!(a.contains(a.intersect(a)));
    }
}
