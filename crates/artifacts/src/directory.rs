use crate::{ArtifactError, ArtifactResolver, ContractArtifact, SourceBundle};
use alloy_json_abi::JsonAbi;
use alloy_primitives::{hex, Bytes};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// The name of the directory holding compiler inputs, skipped while searching for artifacts.
const BUILD_INFO_DIR: &str = "build-info";

/// An [`ArtifactResolver`] reading the build output of Hardhat or Foundry from a directory.
///
/// The directory is searched recursively for `<Name>.json`. Hardhat artifacts carry the
/// creation code as a hex string under `bytecode`; Foundry artifacts nest it under
/// `bytecode.object`. For Hardhat, the `<Name>.dbg.json` sidecar links to the build info which
/// provides the [`SourceBundle`] used for source verification.
#[derive(Debug, Clone)]
pub struct DirectoryArtifacts {
    root: PathBuf,
}

impl DirectoryArtifacts {
    /// Returns a new [`DirectoryArtifacts`] rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root of the artifacts directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn find(&self, name: &str) -> Result<PathBuf, ArtifactError> {
        let file_name = format!("{name}.json");
        let mut matches = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            };
            for entry in entries {
                let entry = entry?;
                let path = entry.path();
                if entry.file_type()?.is_dir() {
                    if entry.file_name() != BUILD_INFO_DIR {
                        pending.push(path);
                    }
                } else if entry.file_name().to_str() == Some(file_name.as_str()) {
                    matches.push(path);
                }
            }
        }

        matches.sort();
        match matches.len() {
            0 => Err(ArtifactError::NotFound(name.to_string())),
            1 => Ok(matches.remove(0)),
            _ => Err(ArtifactError::Ambiguous { name: name.to_string(), paths: matches }),
        }
    }

    fn load_source(&self, artifact_path: &Path, source_name: &str) -> Option<SourceBundle> {
        let dbg_path = artifact_path.with_extension("dbg.json");
        let dbg: HardhatDebugFile = read_json(&dbg_path).ok()?;
        let build_info_path = dbg_path.parent()?.join(dbg.build_info);
        match read_json::<HardhatBuildInfo>(&build_info_path) {
            Ok(build_info) => Some(SourceBundle {
                source_name: source_name.to_string(),
                compiler_version: build_info.solc_long_version,
                standard_json_input: build_info.input,
            }),
            Err(err) => {
                tracing::warn!(target: "rollup_deployer::artifacts", path = %build_info_path.display(), %err, "Failed to read build info");
                None
            }
        }
    }
}

impl ArtifactResolver for DirectoryArtifacts {
    fn resolve(&self, name: &str) -> Result<ContractArtifact, ArtifactError> {
        let path = self.find(name)?;
        tracing::debug!(target: "rollup_deployer::artifacts", contract = name, path = %path.display(), "Resolved artifact");

        let file: ArtifactFile = read_json(&path)?;
        let abi = file.abi.ok_or(ArtifactError::Malformed { path: path.clone(), reason: "missing abi" })?;
        let code = match &file.bytecode {
            Some(Bytecode::Hex(code)) => code.as_str(),
            Some(Bytecode::Object { object }) => object.as_str(),
            None => {
                return Err(ArtifactError::Malformed { path, reason: "missing bytecode" });
            }
        };
        let creation_code: Bytes = hex::decode(code)
            .map_err(|err| ArtifactError::InvalidBytecode { path: path.clone(), reason: err.to_string() })?
            .into();
        if creation_code.is_empty() {
            return Err(ArtifactError::EmptyCreationCode(name.to_string()));
        }

        let source = file.source_name.as_deref().and_then(|source| self.load_source(&path, source));

        Ok(ContractArtifact { name: name.to_string(), creation_code, abi, source })
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ArtifactError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactFile {
    abi: Option<JsonAbi>,
    bytecode: Option<Bytecode>,
    source_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Bytecode {
    Hex(String),
    Object { object: String },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HardhatDebugFile {
    build_info: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HardhatBuildInfo {
    solc_long_version: String,
    input: serde_json::Value,
}
