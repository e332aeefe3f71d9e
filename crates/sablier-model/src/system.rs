//! The model container a frontend populates and the checker annotates.
//!
//! A system is a tree of global declarations, templates (parameterized
//! automata), instances of those templates, and verification properties.
//! All symbols live in the system's [`SymbolTable`]; the declarations hold
//! the initializer and body expressions the checker walks.

use indexmap::IndexMap;

use crate::expr::Expression;
use crate::span::Span;
use crate::symbol::{FrameId, SymbolId, SymbolTable};
use crate::types::Prefix;

/// A declared variable or constant with its optional initializer.
#[derive(Debug, Clone)]
pub struct Variable {
    pub symbol: SymbolId,
    pub init: Option<Expression>,
}

/// A user-defined function with its body.
#[derive(Debug, Clone)]
pub struct Function {
    pub symbol: SymbolId,
    pub body: Vec<Statement>,
}

/// Statement forms inside function bodies.
#[derive(Debug, Clone)]
pub enum Statement {
    Empty,
    Expr(Expression),
    Block(Vec<Statement>),
    If {
        cond: Expression,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
    },
    While {
        cond: Expression,
        body: Box<Statement>,
    },
    DoWhile {
        body: Box<Statement>,
        cond: Expression,
    },
    For {
        init: Expression,
        cond: Expression,
        step: Expression,
        body: Box<Statement>,
    },
    Switch {
        cond: Expression,
        cases: Vec<SwitchCase>,
    },
    Break,
    Continue,
    Return(Option<Expression>),
}

/// One arm of a switch statement; a `None` label is the default arm.
#[derive(Debug, Clone)]
pub struct SwitchCase {
    pub label: Option<Expression>,
    pub body: Vec<Statement>,
}

/// A location of an automaton with its optional invariant.
#[derive(Debug, Clone)]
pub struct State {
    pub symbol: SymbolId,
    pub invariant: Option<Expression>,
}

/// An edge between two locations.
///
/// The sync slot, when present, is a [`ExprKind::Sync`](crate::expr::ExprKind)
/// node whose single child references the channel. A missing assignment is
/// the no-op.
#[derive(Debug, Clone)]
pub struct Transition {
    pub from: SymbolId,
    pub to: SymbolId,
    pub guard: Option<Expression>,
    pub sync: Option<Expression>,
    pub assign: Option<Expression>,
    pub span: Span,
}

/// Declarations scoped to the global level or to a template.
#[derive(Debug, Clone, Default)]
pub struct Declarations {
    pub variables: Vec<Variable>,
    pub functions: Vec<Function>,
}

/// A parameterized automaton.
#[derive(Debug, Clone)]
pub struct Template {
    pub symbol: SymbolId,
    pub parameters: FrameId,
    pub declarations: Declarations,
    pub states: Vec<State>,
    pub transitions: Vec<Transition>,
}

/// An instantiation of a template, mapping each formal parameter symbol to
/// an argument expression.
#[derive(Debug, Clone)]
pub struct Instance {
    pub symbol: SymbolId,
    pub template: usize,
    pub mapping: IndexMap<SymbolId, Expression>,
    pub span: Span,
}

/// A parsed network of timed automata.
#[derive(Debug, Clone, Default)]
pub struct TimedAutomataSystem {
    pub symbols: SymbolTable,
    pub globals: Declarations,
    pub templates: Vec<Template>,
    pub instances: Vec<Instance>,
    pub properties: Vec<Expression>,
}

impl TimedAutomataSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_global_variable(&mut self, variable: Variable) {
        self.globals.variables.push(variable);
    }

    pub fn add_global_function(&mut self, function: Function) {
        self.globals.functions.push(function);
    }

    pub fn add_template(&mut self, template: Template) -> usize {
        let id = self.templates.len();
        self.templates.push(template);
        id
    }

    pub fn add_instance(&mut self, instance: Instance) {
        self.instances.push(instance);
    }

    pub fn add_property(&mut self, property: Expression) {
        self.properties.push(property);
    }

    pub fn find_template_by_name(&self, name: &str) -> Option<usize> {
        self.templates
            .iter()
            .position(|template| self.symbols.name_of(template.symbol) == name)
    }

    /// The initializer of every constant in the system, keyed by symbol.
    ///
    /// This is the base valuation of the constant interpreter; instance
    /// checking extends it with the argument mapping.
    pub fn constant_valuation(&self) -> IndexMap<SymbolId, Expression> {
        let mut valuation = IndexMap::new();
        let mut collect = |declarations: &Declarations| {
            for variable in &declarations.variables {
                if self
                    .symbols
                    .type_of(variable.symbol)
                    .has_prefix(Prefix::Constant)
                {
                    if let Some(init) = &variable.init {
                        valuation.insert(variable.symbol, init.clone());
                    }
                }
            }
        };
        collect(&self.globals);
        for template in &self.templates {
            collect(&template.declarations);
        }
        valuation
    }
}
