/// Shader trait and the named shader library interface

use std::sync::Arc;

/// Shader stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Compute,
}

/// Shader module trait
///
/// A shader handle may exist before its source has finished compiling.
/// Passes treat an uncompiled shader as "skip this pass", never a fault.
pub trait Shader: Send + Sync {
    /// Name the shader was registered under
    fn name(&self) -> &str;

    /// Whether the shader has finished compiling and can be bound
    fn is_compiled(&self) -> bool;
}

/// Named shader lookup, provided by the asset system.
///
/// Returns `None` for unknown names. A returned shader may still report
/// `is_compiled() == false`; callers skip the pass in both cases.
pub trait ShaderLibrary: Send + Sync {
    /// Look up a shader by name
    fn shader(&self, name: &str) -> Option<Arc<dyn Shader>>;
}
