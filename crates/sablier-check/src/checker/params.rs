//! Argument/parameter compatibility.
//!
//! Shared by instantiation checking and function-call checking. The
//! interesting case is integer parameters, where compatibility is a range
//! question: reference parameters alias the argument's storage, so their
//! ranges must line up exactly (or contain one another for constant
//! references), while value parameters only need the argument's possible
//! values to fit. Whenever the interpreter cannot decide, the check falls
//! back to syntactic comparison or defers to runtime.

use sablier_model::expr::Expression;
use sablier_model::span::Span;
use sablier_model::types::{BaseKind, Prefix, Range, RangeDecl, Type, TypeBase};

use super::predicates::{channel_capability, is_lhs_value};
use super::TypeChecker;
use crate::interp::Interpreter;

impl TypeChecker<'_> {
    /// Check that an argument expression fits a formal parameter type.
    pub(crate) fn check_parameter_compatible(
        &mut self,
        interpreter: &Interpreter<'_>,
        formal: &Type,
        argument: &Expression,
    ) {
        let by_ref = formal.has_prefix(Prefix::Reference);
        let constant = formal.has_prefix(Prefix::Constant);
        let mut lhs = is_lhs_value(self.symbols, argument);

        let Some(argument_ty) = argument.ty.clone() else {
            self.sink.error(argument.span, "Incompatible argument");
            return;
        };
        let mut argument_ty = argument_ty;
        let mut formal_ty = formal.clone();

        if !by_ref {
            // Value parameters admit implicit conversion between booleans
            // and integers; the converted value is a temporary.
            if formal_ty.kind() == BaseKind::Int && argument_ty.kind() == BaseKind::Bool {
                argument_ty = Type::ranged_int(
                    Expression::constant(Span::default(), 0),
                    Expression::constant(Span::default(), 1),
                );
                lhs = false;
            }
            if formal_ty.kind() == BaseKind::Bool && argument_ty.kind() == BaseKind::Int {
                argument_ty = Type::bool();
                lhs = false;
            }
        }

        if by_ref && !constant && !lhs {
            self.sink
                .error(argument.span, "Reference parameter requires left value argument");
            return;
        }

        // Peel matching array layers, comparing sizes along the way.
        loop {
            let next = match (&formal_ty.base, &argument_ty.base) {
                (
                    TypeBase::Array {
                        size: formal_size,
                        elem: formal_elem,
                    },
                    TypeBase::Array {
                        size: argument_size,
                        elem: argument_elem,
                    },
                ) => {
                    let sizes_match = match (
                        interpreter.evaluate(formal_size),
                        interpreter.evaluate(argument_size),
                    ) {
                        (Ok(formal), Ok(argument)) => formal == argument,
                        _ => formal_size.syntactically_equal(argument_size),
                    };
                    if !sizes_match {
                        self.sink.error(
                            argument.span,
                            "Parameter array size does not match argument array size",
                        );
                    }
                    Some(((**formal_elem).clone(), (**argument_elem).clone()))
                }
                (TypeBase::Array { .. }, _) => {
                    self.sink
                        .error(argument.span, "Incompatible argument to array parameter");
                    return;
                }
                _ => None,
            };
            match next {
                Some((formal_next, argument_next)) => {
                    formal_ty = formal_next;
                    argument_ty = argument_next;
                }
                None => break,
            }
        }

        if formal_ty.kind() != argument_ty.kind() {
            self.sink.error(argument.span, "Incompatible argument");
            return;
        }

        match &formal_ty.base {
            TypeBase::Clock | TypeBase::Bool => {}
            TypeBase::Channel => {
                if channel_capability(&argument_ty) < channel_capability(&formal_ty) {
                    self.sink.error(argument.span, "Incompatible channel type");
                }
            }
            TypeBase::Record { fields } => {
                if argument_ty.record_fields() != Some(*fields) {
                    self.sink
                        .error(argument.span, "Argument has incompatible type");
                }
            }
            TypeBase::Int { range } => {
                // A formal without a range accepts anything.
                if let Some(formal_range) = range {
                    self.check_argument_range(
                        interpreter,
                        by_ref,
                        constant,
                        lhs,
                        formal_range,
                        &argument_ty,
                        argument,
                    );
                }
            }
            _ => {}
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn check_argument_range(
        &mut self,
        interpreter: &Interpreter<'_>,
        by_ref: bool,
        constant: bool,
        lhs: bool,
        formal_range: &RangeDecl,
        argument_ty: &Type,
        argument: &Expression,
    ) {
        let argument_range = argument_ty.int_range();
        if lhs {
            // The argument denotes storage; its exact value is unknowable,
            // so reason over the declared ranges.
            let evaluated = (
                interpreter.evaluate_range(formal_range),
                argument_range.map(|range| interpreter.evaluate_range(range)),
            );
            match evaluated {
                (Ok(formal_bounds), Some(Ok(argument_bounds))) => {
                    if by_ref && !constant && argument_bounds != formal_bounds {
                        self.sink.error(
                            argument.span,
                            "Range of argument does not match range of formal parameter",
                        );
                        return;
                    }
                    if by_ref && constant && !formal_bounds.contains(argument_bounds) {
                        self.sink.error(
                            argument.span,
                            "Range of argument is outside of the range of the formal parameter",
                        );
                        return;
                    }
                    if formal_bounds.intersect(argument_bounds).is_empty() {
                        self.sink.error(
                            argument.span,
                            "Range of argument is outside of the range of the formal parameter",
                        );
                    }
                }
                _ => {
                    // Not decidable here. References still demand textually
                    // identical range declarations; value parameters defer
                    // to runtime.
                    if by_ref {
                        let identical = argument_range
                            .is_some_and(|range| range.same_endpoints(formal_range));
                        if !identical {
                            self.sink.error(
                                argument.span,
                                "Range of argument does not match range of formal parameter",
                            );
                        }
                    }
                }
            }
        } else {
            // A computed argument: bound the values it can take.
            let Ok(formal_bounds) = interpreter.evaluate_range(formal_range) else {
                return;
            };
            let mut values = Vec::new();
            if interpreter.evaluate_values(argument, &mut values).is_err() {
                return;
            }
            let mut argument_bounds = Range::EMPTY;
            for value in values {
                argument_bounds = argument_bounds.join(Range::singleton(value));
            }
            if !formal_bounds.contains(argument_bounds) {
                self.sink.error(
                    argument.span,
                    "Range of argument is outside of the range of the formal parameter",
                );
            }
        }
    }
}
