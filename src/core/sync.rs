//! Remote synchronisation of BOM collections
//!
//! The remote side is abstracted behind [`SyncGateway`]. Local state is
//! always updated first and stays authoritative for display: a failed
//! persist is reported to the caller but never rolled back, and nothing is
//! retried.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

use crate::core::store::{BomStore, Scope, StoreError};
use crate::entities::part::Part;

/// File name of a team's BOM document inside a [`DirectoryGateway`] root
pub const TEAM_BOM_FILE: &str = "bom.json";

/// Acknowledgement of a successful remote write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ack {
    pub scope: Scope,
    pub parts: usize,
    pub persisted_at: DateTime<Utc>,
}

/// Errors that can occur while talking to the remote
#[derive(Debug, Error, Diagnostic)]
pub enum SyncError {
    #[error("Network error for {scope}: {message}")]
    #[diagnostic(
        code(rbt::sync::network),
        help("the local copy is kept as it is; run `rbt push` to send it again")
    )]
    Network { scope: Scope, message: String },

    #[error("No BOM for {scope} on the remote")]
    #[diagnostic(code(rbt::sync::missing))]
    RemoteMissing { scope: Scope },

    #[error("Team '{team}' cannot be used as a remote directory name")]
    #[diagnostic(
        code(rbt::sync::team_name),
        help("a team must be a single path segment, without '/', '..' or a drive prefix")
    )]
    InvalidTeam { team: String },

    #[error("Remote BOM for {scope} is malformed: {message}")]
    Malformed { scope: Scope, message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

/// Remote read/write of part collections
#[async_trait]
pub trait SyncGateway: Send + Sync {
    /// Read a scope's collection from the remote
    async fn fetch_bom(&self, scope: &Scope) -> Result<Vec<Part>, SyncError>;

    /// Overwrite a scope's collection on the remote
    async fn persist_bom(&self, scope: &Scope, parts: &[Part]) -> Result<Ack, SyncError>;
}

/// `robot -> system -> parts` for one team
type TeamBom = BTreeMap<String, BTreeMap<String, Vec<Part>>>;

/// Gateway backed by a directory tree, one `<team>/bom.json` per team
///
/// Suitable for a shared network drive or a synced folder.
#[derive(Debug, Clone)]
pub struct DirectoryGateway {
    root: PathBuf,
}

impl DirectoryGateway {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<team>/bom.json`; the team must be one plain path segment
    fn team_file(&self, team: &str) -> Result<PathBuf, SyncError> {
        let mut components = Path::new(team).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(segment)), None) if segment == team => {
                Ok(self.root.join(segment).join(TEAM_BOM_FILE))
            }
            _ => Err(SyncError::InvalidTeam {
                team: team.to_string(),
            }),
        }
    }

    async fn read_team(&self, scope: &Scope) -> Result<Option<TeamBom>, SyncError> {
        let path = self.team_file(&scope.team)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(SyncError::Network {
                    scope: scope.clone(),
                    message: format!("{}: {}", path.display(), e),
                })
            }
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| SyncError::Malformed {
                scope: scope.clone(),
                message: e.to_string(),
            })
    }

    /// Every scope present on the remote
    pub fn scopes(&self) -> Vec<Scope> {
        let mut scopes = Vec::new();
        for entry in walkdir::WalkDir::new(&self.root)
            .min_depth(2)
            .max_depth(2)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && e.file_name() == TEAM_BOM_FILE)
        {
            let Some(team) = entry
                .path()
                .parent()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().to_string())
            else {
                continue;
            };
            let team_bom: TeamBom = match std::fs::read_to_string(entry.path())
                .ok()
                .and_then(|c| serde_json::from_str(&c).ok())
            {
                Some(bom) => bom,
                None => {
                    tracing::warn!(path = %entry.path().display(), "skipping unreadable team BOM");
                    continue;
                }
            };
            for (robot, systems) in team_bom {
                for system in systems.into_keys() {
                    scopes.push(Scope::new(team.clone(), robot.clone(), system));
                }
            }
        }
        scopes.sort();
        scopes
    }
}

#[async_trait]
impl SyncGateway for DirectoryGateway {
    async fn fetch_bom(&self, scope: &Scope) -> Result<Vec<Part>, SyncError> {
        let team_bom = self.read_team(scope).await?;
        team_bom
            .and_then(|mut robots| robots.remove(&scope.robot))
            .and_then(|mut systems| systems.remove(&scope.system))
            .ok_or_else(|| SyncError::RemoteMissing {
                scope: scope.clone(),
            })
    }

    async fn persist_bom(&self, scope: &Scope, parts: &[Part]) -> Result<Ack, SyncError> {
        let network = |e: std::io::Error| SyncError::Network {
            scope: scope.clone(),
            message: e.to_string(),
        };

        let path = self.team_file(&scope.team)?;
        let mut team_bom = self.read_team(scope).await?.unwrap_or_default();
        team_bom
            .entry(scope.robot.clone())
            .or_default()
            .insert(scope.system.clone(), parts.to_vec());

        let json = serde_json::to_string_pretty(&team_bom).map_err(|e| SyncError::Malformed {
            scope: scope.clone(),
            message: e.to_string(),
        })?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(network)?;
        }
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(network)?;
        tokio::fs::rename(&tmp, &path).await.map_err(network)?;

        Ok(Ack {
            scope: scope.clone(),
            parts: parts.len(),
            persisted_at: Utc::now(),
        })
    }
}

/// Fetch a scope from the remote and replace the local copy
///
/// Returns the number of parts received. If the gateway fails the local copy
/// is left as it was; a failure to save happens after the replace.
pub async fn pull(
    store: &mut BomStore,
    gateway: &dyn SyncGateway,
    scope: &Scope,
) -> Result<usize, SyncError> {
    let parts = gateway.fetch_bom(scope).await?;
    let count = parts.len();
    store.replace(scope, parts);
    store.save()?;
    tracing::info!(scope = %scope, parts = count, "pulled BOM");
    Ok(count)
}

/// Send the local copy of a scope to the remote
pub async fn push(
    store: &BomStore,
    gateway: &dyn SyncGateway,
    scope: &Scope,
) -> Result<Ack, SyncError> {
    let ack = gateway.persist_bom(scope, store.load(scope)).await?;
    tracing::info!(scope = %scope, parts = ack.parts, "pushed BOM");
    Ok(ack)
}

/// Apply a single-part edit locally, save it, then persist the scope
///
/// The edit is visible to `load` before the remote call starts. If the part
/// does not exist nothing is changed and the remote is not contacted; if the
/// remote write fails the local edit stays in place.
pub async fn update_and_persist(
    store: &mut BomStore,
    gateway: &dyn SyncGateway,
    scope: &Scope,
    part: Part,
) -> Result<Ack, SyncError> {
    store.update_part(scope, part)?;
    store.save()?;
    push(store, gateway, scope).await
}
