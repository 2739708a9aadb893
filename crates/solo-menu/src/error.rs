use solo_dom::{DomError, NodeId};

/// Menu state engine errors.
///
/// These never leave the public operation API; they are logged and turned
/// into outcome values at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MenuError {
    #[error("{0} is not a live element")]
    NotAnElement(NodeId),

    #[error("{0} is not attached to the document")]
    Detached(NodeId),

    #[error(transparent)]
    Dom(#[from] DomError),
}

/// Check that a handle refers to a live, connected element
pub(crate) fn check_element(doc: &solo_dom::Document, id: NodeId) -> Result<(), MenuError> {
    if !doc.tree().is_element(id) {
        return Err(MenuError::NotAnElement(id));
    }
    if !doc.tree().is_connected(id) {
        return Err(MenuError::Detached(id));
    }
    Ok(())
}

/// Log a direct DOM write that failed, returns whether it succeeded
pub(crate) fn log_dom_write<T>(result: Result<T, DomError>, action: &str) -> bool {
    match result.map_err(MenuError::from) {
        Ok(_) => true,
        Err(err) => {
            tracing::warn!("Could not {}: {}", action, err);
            false
        }
    }
}
