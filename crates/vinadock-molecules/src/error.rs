use thiserror::Error;
use vinadock_datastore::DatastoreError;

/// Everything that can stop a docking job.
#[derive(Debug, Error)]
pub enum DockingError {
    #[error("Datastore not set")]
    Configuration,

    #[error("Protein and/or ligand input is required.")]
    InputValidation,

    #[error("No docking poses or scores generated")]
    NoPoses,

    #[error("No valid docking results generated")]
    NoValidModes,

    #[error("Failed to upload docking results to datastore")]
    Upload,

    #[error(transparent)]
    Storage(#[from] DatastoreError),

    #[error("{0:#}")]
    Engine(anyhow::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// The single error `generate_pose` reports. The message embeds the
/// original failure; `source()` returns it.
#[derive(Debug, Error)]
#[error("VINA docking failed: {source}")]
pub struct DockingFailure {
    #[from]
    source: DockingError,
}

impl DockingFailure {
    pub fn cause(&self) -> &DockingError {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message_is_prefixed() {
        let failure = DockingFailure::from(DockingError::NoValidModes);
        assert_eq!(
            failure.to_string(),
            "VINA docking failed: No valid docking results generated"
        );
        assert!(std::error::Error::source(&failure).is_some());
    }

    #[test]
    fn test_engine_error_keeps_context_chain() {
        let err = anyhow::anyhow!("exit status 1").context("AutoDock Vina failed");
        let failure = DockingFailure::from(DockingError::Engine(err));
        assert_eq!(
            failure.to_string(),
            "VINA docking failed: AutoDock Vina failed: exit status 1"
        );
    }

    #[test]
    fn test_storage_error_is_transparent() {
        let err = DockingError::from(DatastoreError::NotFound("vinadock://a/b/c".into()));
        assert_eq!(
            DockingFailure::from(err).to_string(),
            "VINA docking failed: Object not found: vinadock://a/b/c"
        );
    }
}
