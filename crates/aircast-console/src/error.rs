//! Error type for console startup and operation.

use thiserror::Error;

/// Errors surfaced by the console façade.
///
/// Everything here is a propagated failure from a lower layer: template
/// reading/parsing, graph construction, or a settings coercion. Resource
/// misses (absent elements, channels, sections) never surface as errors —
/// they are absorbed as no-ops by design.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Template could not be read or parsed.
    #[error(transparent)]
    Template(#[from] aircast_pipeline::TemplateError),

    /// The engine rejected the cleaned template.
    #[error(transparent)]
    Engine(#[from] aircast_core::EngineError),

    /// A stored setting failed its declared coercion.
    #[error(transparent)]
    Settings(#[from] aircast_config::SettingsError),
}
