//! The semantic analyzer.
//!
//! [`check_system`] walks a parsed model in a fixed order (global
//! variables, global functions, template declarations, states, transitions,
//! instances, properties), annotating every expression and reporting rule
//! violations to the sink. The walk never aborts early; recovery types keep
//! parent checks meaningful after a child fails.

mod annotate;
mod initialiser;
mod params;
mod predicates;

pub use predicates::{
    are_assignment_compatible, are_inline_if_compatible, channel_capability, is_clock,
    is_constraint, is_diff, is_guard, is_integer, is_invariant, is_lhs_value, is_record,
};

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use sablier_model::diagnostics::DiagnosticSink;
use sablier_model::expr::{ExprKind, Expression, SyncDirection};
use sablier_model::symbol::{SymbolId, SymbolTable};
use sablier_model::system::{
    Function, Instance, State, Statement, TimedAutomataSystem, Transition, Variable,
};
use sablier_model::types::{BaseKind, Prefix, Type, TypeBase};

use crate::interp::Interpreter;
use crate::persistent::persistent_variables;

/// Shared context for one checking pass over a system.
pub(crate) struct TypeChecker<'a> {
    pub(crate) symbols: &'a mut SymbolTable,
    pub(crate) sink: &'a mut DiagnosticSink,
    pub(crate) persistent: &'a IndexSet<SymbolId>,
    pub(crate) valuation: &'a IndexMap<SymbolId, Expression>,
}

/// Type-check and annotate a parsed system.
///
/// Annotations are written into the expressions of the given system; the
/// return value tells whether the sink recorded no errors (warnings do not
/// count). Re-running on an already-annotated system reports the same
/// diagnostics again.
pub fn check_system(system: &mut TimedAutomataSystem, sink: &mut DiagnosticSink) -> bool {
    let persistent = persistent_variables(system);
    let valuation = system.constant_valuation();
    debug!(
        templates = system.templates.len(),
        instances = system.instances.len(),
        properties = system.properties.len(),
        persistent = persistent.len(),
        "checking system"
    );

    let TimedAutomataSystem {
        symbols,
        globals,
        templates,
        instances,
        properties,
    } = system;
    let mut checker = TypeChecker {
        symbols,
        sink,
        persistent: &persistent,
        valuation: &valuation,
    };

    for variable in &mut globals.variables {
        checker.check_variable(variable);
    }
    for function in &mut globals.functions {
        checker.check_function(function);
    }
    for template in templates.iter_mut() {
        for variable in &mut template.declarations.variables {
            checker.check_variable(variable);
        }
        for function in &mut template.declarations.functions {
            checker.check_function(function);
        }
        for state in &mut template.states {
            checker.check_state(state);
        }
        for transition in &mut template.transitions {
            checker.check_transition(transition);
        }
    }
    for instance in instances.iter_mut() {
        checker.check_instance(instance);
    }
    for property in properties.iter_mut() {
        checker.check_property(property);
    }

    !sink.has_errors()
}

impl TypeChecker<'_> {
    /// The expression updates no persistent variable.
    pub(crate) fn is_side_effect_free(&self, expr: &Expression) -> bool {
        !expr.changes_any(self.persistent)
    }

    /// Like [`is_lhs_value`] but stricter: the referenced location must be
    /// statically unique. A subscript whose index depends on persistent
    /// variables names a different cell per run, and an inline-if target
    /// cannot be pinned down at all.
    pub(crate) fn is_unique_reference(&self, expr: &Expression) -> bool {
        match &expr.kind {
            ExprKind::Identifier => {
                let ty = match (&expr.ty, expr.symbol) {
                    (Some(ty), _) => ty,
                    (None, Some(symbol)) => self.symbols.type_of(symbol),
                    (None, None) => return false,
                };
                !ty.has_prefix(Prefix::Constant)
            }
            ExprKind::Dot => self.is_unique_reference(&expr.children[0]),
            ExprKind::Index => {
                self.is_unique_reference(&expr.children[0])
                    && !expr.children[1].depends_on(self.persistent)
            }
            ExprKind::InlineIf => false,
            ExprKind::Comma => self.is_unique_reference(&expr.children[1]),
            kind if kind.is_assignment() || kind.is_increment_or_decrement() => {
                self.is_unique_reference(&expr.children[0])
            }
            _ => false,
        }
    }

    // ----- declarations -----

    fn check_variable(&mut self, variable: &mut Variable) {
        let mut ty = self.symbols.type_of(variable.symbol).clone();
        self.check_type(&mut ty);
        self.symbols.set_type(variable.symbol, ty);
        self.check_variable_init(variable);
    }

    /// Validate the expressions embedded in a declared type: integer range
    /// endpoints and array sizes must be constant integers.
    fn check_type(&mut self, ty: &mut Type) {
        match &mut ty.base {
            TypeBase::Int { range: Some(range) } => {
                self.expect_constant_integer(&mut range.lo);
                self.expect_constant_integer(&mut range.hi);
            }
            TypeBase::Array { size, elem } => {
                self.expect_constant_integer(size);
                self.check_type(elem);
            }
            // TODO: validate the field types of record declarations
            _ => {}
        }
    }

    fn expect_constant_integer(&mut self, expr: &mut Expression) {
        self.annotate(expr);
        if !is_integer(expr) {
            self.sink.error(expr.span, "Integer expression expected");
        } else if expr.depends_on(self.persistent) {
            self.sink.error(expr.span, "Constant expression expected");
        }
    }

    fn check_variable_init(&mut self, variable: &mut Variable) {
        let Some(init) = &mut variable.init else {
            return;
        };
        self.annotate(init);
        if init.depends_on(self.persistent) {
            self.sink.error(init.span, "Constant expression expected");
        } else if !self.is_side_effect_free(init) {
            self.sink
                .error(init.span, "Initialiser must not have side effects");
        } else {
            let ty = self.symbols.type_of(variable.symbol).clone();
            if let Err(failure) = self.check_initialiser(&ty, init) {
                self.sink.error(failure.span, failure.message);
            }
        }
    }

    // ----- functions -----

    fn check_function(&mut self, function: &mut Function) {
        for statement in &mut function.body {
            self.check_statement(statement);
        }
        // TODO: require the body to end in a return statement
    }

    fn check_statement(&mut self, statement: &mut Statement) {
        match statement {
            Statement::Empty | Statement::Break | Statement::Continue => {}
            Statement::Expr(expr) => {
                self.annotate(expr);
                self.check_effect_expression(expr);
            }
            Statement::Block(statements) => {
                for statement in statements {
                    self.check_statement(statement);
                }
            }
            Statement::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.annotate(cond);
                self.check_condition(cond);
                self.check_statement(then_branch);
                if let Some(else_branch) = else_branch {
                    self.check_statement(else_branch);
                }
            }
            Statement::While { cond, body } | Statement::DoWhile { cond, body } => {
                self.annotate(cond);
                self.check_condition(cond);
                self.check_statement(body);
            }
            Statement::For {
                init,
                cond,
                step,
                body,
            } => {
                self.annotate(init);
                self.annotate(cond);
                self.annotate(step);
                self.check_effect_expression(init);
                self.check_condition(cond);
                self.check_effect_expression(step);
                self.check_statement(body);
            }
            Statement::Switch { cond, cases } => {
                self.annotate(cond);
                // TODO: match case label types against the switch condition
                for case in cases {
                    if let Some(label) = &mut case.label {
                        self.annotate(label);
                    }
                    for statement in &mut case.body {
                        self.check_statement(statement);
                    }
                }
            }
            Statement::Return(value) => {
                if let Some(value) = value {
                    self.annotate(value);
                }
            }
        }
    }

    fn check_effect_expression(&mut self, expr: &Expression) {
        if !is_integer(expr) && !is_clock(expr) && !is_record(expr) {
            self.sink.error(expr.span, "Invalid expression in function");
        }
    }

    fn check_condition(&mut self, expr: &Expression) {
        if !is_integer(expr) {
            self.sink.error(expr.span, "Boolean expected here");
        }
    }

    // ----- automata -----

    fn check_state(&mut self, state: &mut State) {
        let Some(invariant) = &mut state.invariant else {
            return;
        };
        self.annotate(invariant);
        if !is_invariant(invariant) {
            self.sink
                .error(invariant.span, "Invalid invariant expression");
        }
        if !self.is_side_effect_free(invariant) {
            self.sink
                .error(invariant.span, "Invariant must be side effect free");
        }
    }

    fn check_transition(&mut self, transition: &mut Transition) {
        if let Some(guard) = &mut transition.guard {
            self.annotate(guard);
            if !is_guard(guard) {
                self.sink.error(guard.span, "Invalid guard");
            } else if !self.is_side_effect_free(guard) {
                self.sink.error(guard.span, "Guard must be side effect free");
            }
        }

        if let Some(sync) = &mut transition.sync {
            self.annotate(sync);
            if !self.is_side_effect_free(sync) {
                self.sink
                    .error(sync.span, "Synchronisation must be side effect free");
            }

            let direction = match sync.kind {
                ExprKind::Sync(direction) => Some(direction),
                _ => None,
            };
            let channel = sync.children.first().and_then(|child| child.ty.as_ref());
            match (direction, channel) {
                (Some(direction), Some(channel)) if channel.kind() == BaseKind::Channel => {
                    // A guard above integer level constrains clocks.
                    let has_clock_guard = transition
                        .guard
                        .as_ref()
                        .is_some_and(|guard| !is_integer(guard));
                    if channel.has_prefix(Prefix::Urgent) && has_clock_guard {
                        self.sink.error(
                            sync.span,
                            "Clock guards are not allowed on urgent transitions.",
                        );
                    }
                    let receives_broadcast = channel.has_prefix(Prefix::Broadcast)
                        && direction == SyncDirection::Receive;
                    if receives_broadcast && has_clock_guard {
                        self.sink.error(
                            sync.span,
                            "Clock guards are not allowed on broadcast receivers.",
                        );
                    }
                }
                _ => self.sink.error(sync.span, "Invalid synchronisation"),
            }
        }

        if let Some(assign) = &mut transition.assign {
            self.annotate(assign);
            if !is_integer(assign) && !is_clock(assign) && !is_record(assign) {
                self.sink
                    .error(assign.span, "Invalid assignment expression");
            }
            // The literal 1 is the conventional no-op label.
            let noop = matches!(assign.kind, ExprKind::Constant(1));
            if !noop && self.is_side_effect_free(assign) {
                self.sink
                    .warning(assign.span, "Expression does not have any effect");
            }
        }
    }

    // ----- instances -----

    fn check_instance(&mut self, instance: &mut Instance) {
        let mapping = instance.mapping.clone();
        let mut interpreter = Interpreter::new(self.valuation);
        interpreter.push_valuation(&mapping);

        for (formal, argument) in instance.mapping.iter_mut() {
            let formal_ty = self.symbols.type_of(*formal).clone();
            self.annotate(argument);

            if !self.is_side_effect_free(argument) {
                self.sink
                    .error(argument.span, "Argument must be side effect free");
                continue;
            }

            // Three admissible shapes: a constant reference bound to a
            // computable expression, a reference bound to a unique variable
            // reference, or a value parameter bound to a computable
            // expression.
            let by_ref = formal_ty.has_prefix(Prefix::Reference);
            let constant = formal_ty.has_prefix(Prefix::Constant);
            let computable = !argument.depends_on(self.persistent);
            let accepted = (by_ref && constant && computable)
                || (by_ref && !constant && self.is_unique_reference(argument))
                || (!by_ref && computable);
            if !accepted {
                self.sink.error(argument.span, "Incompatible argument");
                continue;
            }

            self.check_parameter_compatible(&interpreter, &formal_ty, argument);
        }
    }

    // ----- properties -----

    fn check_property(&mut self, property: &mut Expression) {
        self.annotate(property);
        debug!(property = %property, "checking property");
        if !self.is_side_effect_free(property) {
            self.sink
                .error(property.span, "Property must be side effect free");
        }
        let constrained = if property.kind == ExprKind::LeadsTo {
            property.children.len() == 2
                && is_constraint(&property.children[0])
                && is_constraint(&property.children[1])
        } else {
            is_constraint(property)
        };
        if !constrained {
            self.sink
                .error(property.span, "Property must be a constraint");
        }
    }
}
