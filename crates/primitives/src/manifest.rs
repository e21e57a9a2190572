use crate::DeploymentResult;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write},
    path::Path,
};

/// The set of contracts already deployed, keyed by contract name.
///
/// The manifest is both the input of a deployment run (contracts present in it are skipped)
/// and its output. It is persisted as JSON so a failed run can be resumed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentManifest {
    contracts: BTreeMap<String, DeploymentResult>,
}

impl DeploymentManifest {
    /// Loads the manifest at `path`. A missing file is an empty manifest.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(target: "rollup_deployer::manifest", path = %path.display(), "No manifest found, starting empty");
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Writes the manifest to `path`, replacing any previous content atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ManifestError> {
        let path = path.as_ref();
        let tmp = path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            serde_json::to_writer_pretty(&mut file, self)?;
            file.write_all(b"\n")?;
            file.sync_all()?;
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Returns the deployment result for the contract, if any.
    pub fn get(&self, name: &str) -> Option<&DeploymentResult> {
        self.contracts.get(name)
    }

    /// Returns true if the contract has a deployment result.
    pub fn contains(&self, name: &str) -> bool {
        self.contracts.contains_key(name)
    }

    /// Inserts a deployment result, returning the previous result for the same contract.
    pub fn insert(&mut self, result: DeploymentResult) -> Option<DeploymentResult> {
        self.contracts.insert(result.contract_name.clone(), result)
    }

    /// Returns the number of deployed contracts.
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    /// Returns true if no contract is deployed.
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Returns an iterator over the deployment results, ordered by contract name.
    pub fn iter(&self) -> impl Iterator<Item = &DeploymentResult> {
        self.contracts.values()
    }
}

impl FromIterator<DeploymentResult> for DeploymentManifest {
    fn from_iter<T: IntoIterator<Item = DeploymentResult>>(iter: T) -> Self {
        let mut manifest = Self::default();
        for result in iter {
            manifest.insert(result);
        }
        manifest
    }
}

/// An error while reading or writing a [`DeploymentManifest`].
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// IO error.
    #[error("manifest io error: {0}")]
    Io(#[from] io::Error),
    /// Serialization error.
    #[error("manifest serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
