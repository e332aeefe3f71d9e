#![allow(dead_code)]

//! Shared model-building helpers for the checker tests.
//!
//! Tests construct systems the way a frontend would: symbols first, then
//! expressions carrying their declared types, then the containers.

use indexmap::IndexMap;

use sablier_check::check_system;
use sablier_model::diagnostics::{DiagnosticSink, Severity};
use sablier_model::expr::{ExprKind, Expression};
use sablier_model::span::Span;
use sablier_model::symbol::SymbolId;
use sablier_model::system::{
    Declarations, Function, Instance, State, Statement, Template, TimedAutomataSystem,
    Transition, Variable,
};
use sablier_model::types::Type;

pub fn span() -> Span {
    Span::new(0, 1)
}

pub fn constant(value: i32) -> Expression {
    Expression::constant(span(), value)
}

pub fn binary(kind: ExprKind, left: Expression, right: Expression) -> Expression {
    Expression::binary(kind, span(), left, right)
}

pub fn unary(kind: ExprKind, operand: Expression) -> Expression {
    Expression::unary(kind, span(), operand)
}

pub struct ModelBuilder {
    pub system: TimedAutomataSystem,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self {
            system: TimedAutomataSystem::new(),
        }
    }

    /// Declare a global variable or constant.
    pub fn global(&mut self, name: &str, ty: Type, init: Option<Expression>) -> SymbolId {
        let symbol = self.system.symbols.add_symbol(name, ty);
        self.system.add_global_variable(Variable { symbol, init });
        symbol
    }

    /// Reference a declared symbol, carrying its declared type the way a
    /// frontend would.
    pub fn ident(&self, symbol: SymbolId) -> Expression {
        Expression::identifier(span(), symbol, self.system.symbols.type_of(symbol).clone())
    }

    /// Declare a template with the given parameters and no states.
    pub fn template(&mut self, name: &str, parameters: Vec<(&str, Type)>) -> (usize, Vec<SymbolId>) {
        let parameter_symbols: Vec<SymbolId> = parameters
            .into_iter()
            .map(|(parameter, ty)| self.system.symbols.add_symbol(parameter, ty))
            .collect();
        let frame = self.system.symbols.add_frame(parameter_symbols.clone());
        let symbol = self.system.symbols.add_symbol(name, Type::void());
        let index = self.system.add_template(Template {
            symbol,
            parameters: frame,
            declarations: Declarations::default(),
            states: Vec::new(),
            transitions: Vec::new(),
        });
        (index, parameter_symbols)
    }

    /// Template with two states and one transition between them.
    pub fn transition_template(
        &mut self,
        guard: Option<Expression>,
        sync: Option<Expression>,
        assign: Option<Expression>,
    ) -> usize {
        let (index, _) = self.template("Edge", Vec::new());
        let from = self.system.symbols.add_symbol("s0", Type::void());
        let to = self.system.symbols.add_symbol("s1", Type::void());
        let template = &mut self.system.templates[index];
        template.states.push(State {
            symbol: from,
            invariant: None,
        });
        template.states.push(State {
            symbol: to,
            invariant: None,
        });
        template.transitions.push(Transition {
            from,
            to,
            guard,
            sync,
            assign,
            span: span(),
        });
        index
    }

    /// Template with a single state carrying an invariant.
    pub fn invariant_template(&mut self, invariant: Expression) -> usize {
        let (index, _) = self.template("Hold", Vec::new());
        let symbol = self.system.symbols.add_symbol("s0", Type::void());
        self.system.templates[index].states.push(State {
            symbol,
            invariant: Some(invariant),
        });
        index
    }

    /// Instantiate a template with the given argument mapping.
    pub fn instance(&mut self, template: usize, arguments: Vec<(SymbolId, Expression)>) {
        let symbol = self.system.symbols.add_symbol("proc", Type::void());
        let mapping: IndexMap<SymbolId, Expression> = arguments.into_iter().collect();
        self.system.add_instance(Instance {
            symbol,
            template,
            mapping,
            span: span(),
        });
    }

    /// Declare a global function; returns the function symbol and its
    /// parameter symbols.
    pub fn function(
        &mut self,
        name: &str,
        parameters: Vec<(&str, Type)>,
        result: Type,
        body: Vec<Statement>,
    ) -> (SymbolId, Vec<SymbolId>) {
        let parameter_symbols: Vec<SymbolId> = parameters
            .into_iter()
            .map(|(parameter, ty)| self.system.symbols.add_symbol(parameter, ty))
            .collect();
        let frame = self.system.symbols.add_frame(parameter_symbols.clone());
        let symbol = self
            .system
            .symbols
            .add_symbol(name, Type::function(frame, result));
        self.system.add_global_function(Function { symbol, body });
        (symbol, parameter_symbols)
    }

    pub fn check(&mut self) -> DiagnosticSink {
        let mut sink = DiagnosticSink::new();
        check_system(&mut self.system, &mut sink);
        sink
    }
}

pub fn messages(sink: &DiagnosticSink) -> Vec<&str> {
    sink.diagnostics()
        .iter()
        .map(|diagnostic| diagnostic.message.as_str())
        .collect()
}

pub fn has_error(sink: &DiagnosticSink, message: &str) -> bool {
    sink.diagnostics()
        .iter()
        .any(|diagnostic| diagnostic.severity == Severity::Error && diagnostic.message == message)
}

pub fn has_warning(sink: &DiagnosticSink, message: &str) -> bool {
    sink.diagnostics()
        .iter()
        .any(|diagnostic| diagnostic.severity == Severity::Warning && diagnostic.message == message)
}
