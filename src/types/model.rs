use serde::Serialize;

/// Descriptor for one selectable upstream model.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
}
