//! Type-driven initializer checking.
//!
//! A variable's initializer is checked against its declared type. The
//! check stops at the first failure for that variable: the error travels
//! up as a value and is reported once. Recoverable problems inside a
//! record initializer list (duplicate or misplaced elements) go straight
//! to the sink so several can be reported.

use thiserror::Error;

use sablier_model::expr::{ExprKind, Expression};
use sablier_model::span::Span;
use sablier_model::symbol::{FrameId, SymbolId};
use sablier_model::types::{Type, TypeBase};

use super::predicates::is_integer;
use super::TypeChecker;
use crate::interp::Interpreter;

/// Aborts the check of a single variable's initializer.
#[derive(Debug, Error)]
#[error("{message}")]
pub(crate) struct InitialiserError {
    pub(crate) span: Span,
    pub(crate) message: &'static str,
}

fn reject(span: Span, message: &'static str) -> Result<(), InitialiserError> {
    Err(InitialiserError { span, message })
}

impl TypeChecker<'_> {
    pub(crate) fn check_initialiser(
        &mut self,
        ty: &Type,
        init: &Expression,
    ) -> Result<(), InitialiserError> {
        match &ty.base {
            TypeBase::Array { size, elem } => {
                let ExprKind::List { names } = &init.kind else {
                    return reject(init.span, "Invalid array initialiser");
                };
                let interpreter = Interpreter::new(self.valuation);
                let Ok(dimension) = interpreter.evaluate(size) else {
                    return reject(
                        init.span,
                        "Arrays with parameterized size cannot have an initialiser",
                    );
                };
                let dimension = usize::try_from(dimension).unwrap_or(0);
                if init.children.len() > dimension {
                    return reject(init.span, "Excess elements in array initialiser");
                }
                for (name, element) in names.iter().zip(&init.children) {
                    if name.is_some() {
                        return reject(element.span, "Unknown field specified in initialiser");
                    }
                    self.check_initialiser(elem, element)?;
                }
                if init.children.len() < dimension {
                    return reject(init.span, "Missing fields in initialiser");
                }
                Ok(())
            }

            TypeBase::Bool => {
                if is_integer(init) {
                    Ok(())
                } else {
                    reject(init.span, "Invalid initialiser")
                }
            }

            TypeBase::Int { range } => {
                if !is_integer(init) {
                    return reject(init.span, "Invalid initialiser");
                }
                // Constants may be declared without a range; nothing more
                // to check then.
                let Some(range) = range else {
                    return Ok(());
                };
                let interpreter = Interpreter::new(self.valuation);
                match (interpreter.evaluate(init), interpreter.evaluate_range(range)) {
                    (Ok(value), Ok(bounds)) if !bounds.contains_value(value) => {
                        reject(init.span, "Initialiser is out of range")
                    }
                    // If either side is not computable the check moves to
                    // runtime.
                    _ => Ok(()),
                }
            }

            TypeBase::Record { fields } => self.check_record_initialiser(*fields, init),

            _ => Ok(()),
        }
    }

    fn check_record_initialiser(
        &mut self,
        fields: FrameId,
        init: &Expression,
    ) -> Result<(), InitialiserError> {
        // Fast path: an expression that already has this record type.
        if let Some(init_ty) = &init.ty {
            if init_ty.record_fields() == Some(fields) {
                return Ok(());
            }
        }
        let ExprKind::List { names } = &init.kind else {
            return reject(init.span, "Invalid initialiser for struct");
        };

        let field_symbols: Vec<SymbolId> = self.symbols.frame(fields).symbols().to_vec();
        let mut covered = vec![false; field_symbols.len()];
        let mut current = 0usize;

        for (name, element) in names.iter().zip(&init.children) {
            if let Some(name) = name {
                match self.symbols.index_of(fields, name) {
                    Some(index) => current = index,
                    None => {
                        self.sink.error(element.span, "Unknown field");
                        break;
                    }
                }
            }
            if current >= field_symbols.len() {
                self.sink.error(element.span, "Excess elements in initialiser");
                break;
            }
            if covered[current] {
                self.sink
                    .error(element.span, "Multiple initialisers for field");
                current += 1;
                continue;
            }
            covered[current] = true;
            let field_ty = self.symbols.type_of(field_symbols[current]).clone();
            self.check_initialiser(&field_ty, element)?;
            current += 1;
        }

        if covered.iter().all(|initialized| *initialized) {
            Ok(())
        } else {
            reject(init.span, "Incomplete initialiser")
        }
    }
}
