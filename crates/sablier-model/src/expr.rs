//! Expression trees.
//!
//! Expressions are uniform nodes: a kind, a vector of children, a source
//! span, an optionally bound symbol (for identifiers and field accesses)
//! and a type slot. The builder assigns types to reference and literal
//! nodes at construction time; the annotator fills in the rest during
//! checking. The slot is the only mutable part of a model once built.

use std::fmt;

use indexmap::IndexSet;

use crate::span::Span;
use crate::symbol::SymbolId;
use crate::types::Type;

/// Direction of a channel synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDirection {
    /// Emit on the channel (`c!`).
    Send,
    /// Receive on the channel (`c?`).
    Receive,
}

/// Node kind of an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Integer or boolean literal.
    Constant(i32),
    /// Reference to a declared symbol.
    Identifier,
    /// Record field access; the field symbol is bound on the node.
    Dot,
    /// Array subscript: `children = [array, index]`.
    Index,
    /// Aggregate initializer; element names are optional and positional
    /// entries carry `None`.
    List { names: Vec<Option<String>> },
    Plus,
    Minus,
    Mult,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
    And,
    Or,
    Min,
    Max,
    Lt,
    Le,
    Ge,
    Gt,
    Eq,
    Neq,
    Not,
    UnaryMinus,
    Assign,
    AssignPlus,
    AssignMinus,
    AssignMult,
    AssignDiv,
    AssignMod,
    AssignAnd,
    AssignOr,
    AssignXor,
    AssignShiftLeft,
    AssignShiftRight,
    PreIncrement,
    PostIncrement,
    PreDecrement,
    PostDecrement,
    /// `children = [condition, then, else]`.
    InlineIf,
    /// Sequencing; the value is the right operand.
    Comma,
    /// Function call: `children = [callee, arguments...]`.
    Call,
    /// Channel synchronization; the single child is the channel reference.
    Sync(SyncDirection),
    /// Leads-to property: `children = [premise, consequence]`.
    LeadsTo,
}

impl ExprKind {
    /// Assignment operators, simple and compound.
    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            ExprKind::Assign
                | ExprKind::AssignPlus
                | ExprKind::AssignMinus
                | ExprKind::AssignMult
                | ExprKind::AssignDiv
                | ExprKind::AssignMod
                | ExprKind::AssignAnd
                | ExprKind::AssignOr
                | ExprKind::AssignXor
                | ExprKind::AssignShiftLeft
                | ExprKind::AssignShiftRight
        )
    }

    pub fn is_increment_or_decrement(&self) -> bool {
        matches!(
            self,
            ExprKind::PreIncrement
                | ExprKind::PostIncrement
                | ExprKind::PreDecrement
                | ExprKind::PostDecrement
        )
    }
}

/// An expression node.
#[derive(Debug, Clone)]
pub struct Expression {
    pub kind: ExprKind,
    pub children: Vec<Expression>,
    pub span: Span,
    /// Bound symbol for identifiers and field accesses.
    pub symbol: Option<SymbolId>,
    /// Type slot written by the builder or the annotator.
    pub ty: Option<Type>,
}

impl Expression {
    pub fn new(kind: ExprKind, children: Vec<Expression>, span: Span) -> Self {
        Self {
            kind,
            children,
            span,
            symbol: None,
            ty: None,
        }
    }

    /// Integer literal; typed by construction.
    pub fn constant(span: Span, value: i32) -> Self {
        Self {
            kind: ExprKind::Constant(value),
            children: Vec::new(),
            span,
            symbol: None,
            ty: Some(Type::int()),
        }
    }

    /// Reference to a declared symbol, carrying its declared type.
    pub fn identifier(span: Span, symbol: SymbolId, ty: Type) -> Self {
        Self {
            kind: ExprKind::Identifier,
            children: Vec::new(),
            span,
            symbol: Some(symbol),
            ty: Some(ty),
        }
    }

    /// Field access on a record expression; the builder resolves the field
    /// symbol and its type.
    pub fn dot(span: Span, record: Expression, field: SymbolId, field_ty: Type) -> Self {
        Self {
            kind: ExprKind::Dot,
            children: vec![record],
            span,
            symbol: Some(field),
            ty: Some(field_ty),
        }
    }

    /// Array subscript; the builder supplies the element type.
    pub fn index(span: Span, array: Expression, index: Expression, elem_ty: Type) -> Self {
        Self {
            kind: ExprKind::Index,
            children: vec![array, index],
            span,
            symbol: None,
            ty: Some(elem_ty),
        }
    }

    /// Aggregate initializer from named or positional elements.
    pub fn list(span: Span, elements: Vec<(Option<String>, Expression)>) -> Self {
        let (names, children): (Vec<Option<String>>, Vec<Expression>) =
            elements.into_iter().unzip();
        Self {
            kind: ExprKind::List { names },
            children,
            span,
            symbol: None,
            ty: None,
        }
    }

    pub fn binary(kind: ExprKind, span: Span, left: Expression, right: Expression) -> Self {
        Self::new(kind, vec![left, right], span)
    }

    pub fn unary(kind: ExprKind, span: Span, operand: Expression) -> Self {
        Self::new(kind, vec![operand], span)
    }

    pub fn inline_if(
        span: Span,
        condition: Expression,
        then_branch: Expression,
        else_branch: Expression,
    ) -> Self {
        Self::new(
            ExprKind::InlineIf,
            vec![condition, then_branch, else_branch],
            span,
        )
    }

    /// Function call; the builder supplies the declared return type.
    pub fn call(
        span: Span,
        callee: Expression,
        arguments: Vec<Expression>,
        return_ty: Type,
    ) -> Self {
        let mut children = vec![callee];
        children.extend(arguments);
        Self {
            kind: ExprKind::Call,
            children,
            span,
            symbol: None,
            ty: Some(return_ty),
        }
    }

    /// Channel synchronization over a channel reference.
    pub fn sync(span: Span, channel: Expression, direction: SyncDirection) -> Self {
        Self::new(ExprKind::Sync(direction), vec![channel], span)
    }

    pub fn leads_to(span: Span, premise: Expression, consequence: Expression) -> Self {
        Self::new(ExprKind::LeadsTo, vec![premise, consequence], span)
    }

    /// Whether the expression references any symbol in the set.
    ///
    /// Expressions that depend on runtime-mutable state are not computable
    /// at analysis time.
    pub fn depends_on(&self, symbols: &IndexSet<SymbolId>) -> bool {
        if let Some(symbol) = self.symbol {
            if symbols.contains(&symbol) {
                return true;
            }
        }
        self.children.iter().any(|child| child.depends_on(symbols))
    }

    /// Whether evaluating the expression may update any symbol in the set.
    ///
    /// Assignments and increments are traced to the symbols their target
    /// path can resolve to. Function calls are treated as effectful; their
    /// bodies are not analyzed.
    pub fn changes_any(&self, symbols: &IndexSet<SymbolId>) -> bool {
        if self.kind.is_assignment() || self.kind.is_increment_or_decrement() {
            let mut roots = Vec::new();
            self.children[0].lvalue_roots(&mut roots);
            if roots.iter().any(|root| symbols.contains(root)) {
                return true;
            }
        } else if self.kind == ExprKind::Call {
            return true;
        }
        self.children.iter().any(|child| child.changes_any(symbols))
    }

    /// Symbols an assignment to this expression could target.
    fn lvalue_roots(&self, out: &mut Vec<SymbolId>) {
        match &self.kind {
            ExprKind::Identifier => {
                if let Some(symbol) = self.symbol {
                    out.push(symbol);
                }
            }
            ExprKind::Dot | ExprKind::Index => self.children[0].lvalue_roots(out),
            ExprKind::InlineIf => {
                self.children[1].lvalue_roots(out);
                self.children[2].lvalue_roots(out);
            }
            ExprKind::Comma => self.children[1].lvalue_roots(out),
            kind if kind.is_assignment() || kind.is_increment_or_decrement() => {
                self.children[0].lvalue_roots(out)
            }
            _ => {}
        }
    }

    /// The declared symbol a left-hand-side path resolves to, if statically
    /// known.
    pub fn bound_symbol(&self) -> Option<SymbolId> {
        if self.symbol.is_some() {
            return self.symbol;
        }
        match &self.kind {
            ExprKind::Index => self.children[0].bound_symbol(),
            ExprKind::Comma => self.children[1].bound_symbol(),
            ExprKind::InlineIf => self.children[1].bound_symbol(),
            kind if kind.is_assignment() || kind.is_increment_or_decrement() => {
                self.children[0].bound_symbol()
            }
            _ => None,
        }
    }

    /// Structural equality of kind, bound symbols and children, ignoring
    /// spans and type annotations.
    pub fn syntactically_equal(&self, other: &Expression) -> bool {
        self.kind == other.kind
            && self.symbol == other.symbol
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.syntactically_equal(b))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Constant(value) => write!(f, "{value}"),
            ExprKind::Identifier => match self.symbol {
                Some(symbol) => write!(f, "v{}", symbol.0),
                None => write!(f, "<unbound>"),
            },
            ExprKind::Dot => match self.symbol {
                Some(symbol) => write!(f, "{}.v{}", self.children[0], symbol.0),
                None => write!(f, "{}.<unbound>", self.children[0]),
            },
            ExprKind::Index => write!(f, "{}[{}]", self.children[0], self.children[1]),
            ExprKind::List { names } => {
                write!(f, "{{ ")?;
                for (i, child) in self.children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    if let Some(Some(name)) = names.get(i) {
                        write!(f, "{name}: ")?;
                    }
                    write!(f, "{child}")?;
                }
                write!(f, " }}")
            }
            ExprKind::Not => write!(f, "!{}", self.children[0]),
            ExprKind::UnaryMinus => write!(f, "-{}", self.children[0]),
            ExprKind::PreIncrement => write!(f, "++{}", self.children[0]),
            ExprKind::PostIncrement => write!(f, "{}++", self.children[0]),
            ExprKind::PreDecrement => write!(f, "--{}", self.children[0]),
            ExprKind::PostDecrement => write!(f, "{}--", self.children[0]),
            ExprKind::InlineIf => write!(
                f,
                "({} ? {} : {})",
                self.children[0], self.children[1], self.children[2]
            ),
            ExprKind::Comma => write!(f, "({}, {})", self.children[0], self.children[1]),
            ExprKind::Call => {
                write!(f, "{}(", self.children[0])?;
                for (i, argument) in self.children[1..].iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{argument}")?;
                }
                write!(f, ")")
            }
            ExprKind::Sync(SyncDirection::Send) => write!(f, "{}!", self.children[0]),
            ExprKind::Sync(SyncDirection::Receive) => write!(f, "{}?", self.children[0]),
            ExprKind::LeadsTo => {
                write!(f, "({} --> {})", self.children[0], self.children[1])
            }
            ExprKind::Min => write!(f, "min({}, {})", self.children[0], self.children[1]),
            ExprKind::Max => write!(f, "max({}, {})", self.children[0], self.children[1]),
            kind => {
                let op = match kind {
                    ExprKind::Plus => "+",
                    ExprKind::Minus => "-",
                    ExprKind::Mult => "*",
                    ExprKind::Div => "/",
                    ExprKind::Mod => "%",
                    ExprKind::BitAnd => "&",
                    ExprKind::BitOr => "|",
                    ExprKind::BitXor => "^",
                    ExprKind::ShiftLeft => "<<",
                    ExprKind::ShiftRight => ">>",
                    ExprKind::And => "&&",
                    ExprKind::Or => "||",
                    ExprKind::Lt => "<",
                    ExprKind::Le => "<=",
                    ExprKind::Ge => ">=",
                    ExprKind::Gt => ">",
                    ExprKind::Eq => "==",
                    ExprKind::Neq => "!=",
                    ExprKind::Assign => ":=",
                    ExprKind::AssignPlus => "+=",
                    ExprKind::AssignMinus => "-=",
                    ExprKind::AssignMult => "*=",
                    ExprKind::AssignDiv => "/=",
                    ExprKind::AssignMod => "%=",
                    ExprKind::AssignAnd => "&=",
                    ExprKind::AssignOr => "|=",
                    ExprKind::AssignXor => "^=",
                    ExprKind::AssignShiftLeft => "<<=",
                    ExprKind::AssignShiftRight => ">>=",
                    _ => "?",
                };
                write!(f, "({} {} {})", self.children[0], op, self.children[1])
            }
        }
    }
}
