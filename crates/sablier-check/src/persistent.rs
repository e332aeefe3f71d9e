//! Persistent-variable pre-pass.
//!
//! Runs before any annotation and collects the symbols that denote
//! runtime-mutable state: every declared non-constant variable (global or
//! template-local) plus every template parameter that is passed by
//! reference or is non-constant. An expression that depends on a symbol in
//! this set is not computable at analysis time.

use indexmap::IndexSet;

use sablier_model::symbol::SymbolId;
use sablier_model::system::{Declarations, TimedAutomataSystem};
use sablier_model::types::Prefix;

pub fn persistent_variables(system: &TimedAutomataSystem) -> IndexSet<SymbolId> {
    let mut set = IndexSet::new();
    collect_variables(system, &system.globals, &mut set);
    for template in &system.templates {
        collect_variables(system, &template.declarations, &mut set);
        for &parameter in system.symbols.frame(template.parameters).symbols() {
            let ty = system.symbols.type_of(parameter);
            if ty.has_prefix(Prefix::Reference) || !ty.has_prefix(Prefix::Constant) {
                set.insert(parameter);
            }
        }
    }
    set
}

fn collect_variables(
    system: &TimedAutomataSystem,
    declarations: &Declarations,
    set: &mut IndexSet<SymbolId>,
) {
    for variable in &declarations.variables {
        if !system
            .symbols
            .type_of(variable.symbol)
            .has_prefix(Prefix::Constant)
        {
            set.insert(variable.symbol);
        }
    }
}
