use crate::{ArtifactError, ArtifactResolver, ContractArtifact};
use std::collections::HashMap;

/// An [`ArtifactResolver`] backed by a map of artifacts.
#[derive(Debug, Clone, Default)]
pub struct InMemoryArtifacts {
    artifacts: HashMap<String, ContractArtifact>,
}

impl InMemoryArtifacts {
    /// Returns an empty [`InMemoryArtifacts`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an artifact, keyed by its contract name.
    pub fn with_artifact(mut self, artifact: ContractArtifact) -> Self {
        self.insert(artifact);
        self
    }

    /// Adds an artifact, keyed by its contract name.
    pub fn insert(&mut self, artifact: ContractArtifact) {
        self.artifacts.insert(artifact.name.clone(), artifact);
    }
}

impl ArtifactResolver for InMemoryArtifacts {
    fn resolve(&self, name: &str) -> Result<ContractArtifact, ArtifactError> {
        let artifact =
            self.artifacts.get(name).ok_or_else(|| ArtifactError::NotFound(name.to_string()))?;
        if artifact.creation_code.is_empty() {
            return Err(ArtifactError::EmptyCreationCode(name.to_string()));
        }
        Ok(artifact.clone())
    }
}
