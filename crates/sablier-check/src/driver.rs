//! Parse-and-check entry points.
//!
//! Each driver hands the input to the [`Frontend`], which populates the
//! system through the model construction API and reports syntax errors to
//! the sink, then runs the checker over the result. The annotated model is
//! left in the provided system; the return value only tells whether any
//! error was recorded.

use std::path::Path;

use tracing::debug;

use sablier_model::diagnostics::DiagnosticSink;
use sablier_model::system::TimedAutomataSystem;

use crate::checker::check_system;

/// Parser frontend the drivers delegate to.
///
/// The `new_syntax` flag selects the newer textual dialect where the
/// grammar differs.
pub trait Frontend {
    fn parse_xta_file(
        &mut self,
        path: &Path,
        system: &mut TimedAutomataSystem,
        sink: &mut DiagnosticSink,
        new_syntax: bool,
    );

    fn parse_xta_buffer(
        &mut self,
        buffer: &str,
        system: &mut TimedAutomataSystem,
        sink: &mut DiagnosticSink,
        new_syntax: bool,
    );

    fn parse_xml_file(
        &mut self,
        path: &Path,
        system: &mut TimedAutomataSystem,
        sink: &mut DiagnosticSink,
        new_syntax: bool,
    );

    fn parse_xml_buffer(
        &mut self,
        buffer: &str,
        system: &mut TimedAutomataSystem,
        sink: &mut DiagnosticSink,
        new_syntax: bool,
    );
}

/// Parse a textual model from a file and check it.
pub fn check_xta_file(
    frontend: &mut dyn Frontend,
    path: &Path,
    system: &mut TimedAutomataSystem,
    sink: &mut DiagnosticSink,
    new_syntax: bool,
) -> bool {
    debug!(path = %path.display(), new_syntax, "parsing XTA file");
    frontend.parse_xta_file(path, system, sink, new_syntax);
    check_system(system, sink)
}

/// Parse a textual model from an in-memory buffer and check it.
pub fn check_xta_buffer(
    frontend: &mut dyn Frontend,
    buffer: &str,
    system: &mut TimedAutomataSystem,
    sink: &mut DiagnosticSink,
    new_syntax: bool,
) -> bool {
    debug!(bytes = buffer.len(), new_syntax, "parsing XTA buffer");
    frontend.parse_xta_buffer(buffer, system, sink, new_syntax);
    check_system(system, sink)
}

/// Parse an XML model from a file and check it.
pub fn check_xml_file(
    frontend: &mut dyn Frontend,
    path: &Path,
    system: &mut TimedAutomataSystem,
    sink: &mut DiagnosticSink,
    new_syntax: bool,
) -> bool {
    debug!(path = %path.display(), new_syntax, "parsing XML file");
    frontend.parse_xml_file(path, system, sink, new_syntax);
    check_system(system, sink)
}

/// Parse an XML model from an in-memory buffer and check it.
pub fn check_xml_buffer(
    frontend: &mut dyn Frontend,
    buffer: &str,
    system: &mut TimedAutomataSystem,
    sink: &mut DiagnosticSink,
    new_syntax: bool,
) -> bool {
    debug!(bytes = buffer.len(), new_syntax, "parsing XML buffer");
    frontend.parse_xml_buffer(buffer, system, sink, new_syntax);
    check_system(system, sink)
}
