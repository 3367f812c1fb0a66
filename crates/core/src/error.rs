use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// A node or edge id that is not part of the timeline graph.
    #[error("{entity} '{id}' not found in timeline graph")]
    GraphMemberNotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// An edge or node points at something that does not exist.
    #[error("Referential violation: {0}")]
    ReferentialViolation(String),
}
