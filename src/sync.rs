//! Replication of local mutations to a peer service.
//!
//! Each operation makes a single request to the peer; nothing is retried
//! or queued. Creates and updates are kept locally whatever the peer says.
//! Deletes are only applied locally once the peer has accepted them, unless
//! the caller forces a local-only delete.
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};

use crate::{IslandCollection, IslandError, IslandPatch, IslandStore, Result};

/// The peer side of the mutation surface
#[async_trait]
pub trait PeerClient: Send + Sync {
    /// Creates an island on the peer and returns the id the peer assigned
    async fn create_island(&self, name: &str) -> Result<String>;

    async fn update_island(&self, id: &str, patch: &IslandPatch) -> Result<()>;

    async fn delete_island(&self, id: &str) -> Result<()>;

    /// Overwrites the peer's whole collection
    async fn replace_all(&self, islands: &IslandCollection) -> Result<()>;
}

#[derive(Serialize)]
struct CreateIslandRequest<'a> {
    name: &'a str,
}

#[derive(Deserialize)]
struct CreateIslandResponse {
    id: String,
}

/// Talks to a peer over HTTP with JSON bodies.
///
/// Routes, relative to the base address:
/// `POST /api/islands`, `PATCH /api/islands/{id}`,
/// `DELETE /api/islands/{id}`, `PUT /api/islands`.
pub struct HttpPeer {
    client: Client,
    base: Url,
}

impl HttpPeer {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url).map_err(|e| IslandError::ConfigError {
            message: format!("invalid peer url '{}': {}", base_url, e),
        })?;
        if base.cannot_be_a_base() {
            return Err(IslandError::ConfigError {
                message: format!("peer url '{}' cannot be used as a base", base_url),
            });
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IslandError::ConfigError {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client, base })
    }

    /// `{base}/api/islands[/{id}]`, with the id percent-encoded
    pub fn endpoint(&self, id: Option<&str>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("api").push("islands");
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }

    async fn check(response: std::result::Result<Response, reqwest::Error>) -> Result<Response> {
        let response = response.map_err(|e| IslandError::remote(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(IslandError::remote(format!(
            "peer answered {}: {}",
            status,
            body.trim()
        )))
    }
}

#[async_trait]
impl PeerClient for HttpPeer {
    async fn create_island(&self, name: &str) -> Result<String> {
        let url = self.endpoint(None);
        debug!("POST {}", url);
        let response = Self::check(
            self.client
                .post(url)
                .json(&CreateIslandRequest { name })
                .send()
                .await,
        )
        .await?;

        let created: CreateIslandResponse = response
            .json()
            .await
            .map_err(|e| IslandError::remote(format!("unreadable create response: {}", e)))?;
        Ok(created.id)
    }

    async fn update_island(&self, id: &str, patch: &IslandPatch) -> Result<()> {
        let url = self.endpoint(Some(id));
        debug!("PATCH {}", url);
        Self::check(self.client.patch(url).json(patch).send().await).await?;
        Ok(())
    }

    async fn delete_island(&self, id: &str) -> Result<()> {
        let url = self.endpoint(Some(id));
        debug!("DELETE {}", url);
        Self::check(self.client.delete(url).send().await).await?;
        Ok(())
    }

    async fn replace_all(&self, islands: &IslandCollection) -> Result<()> {
        let url = self.endpoint(None);
        debug!("PUT {} ({} islands)", url, islands.len());
        Self::check(self.client.put(url).json(islands).send().await).await?;
        Ok(())
    }
}

/// What happened on the peer side of a mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOutcome {
    /// The peer applied the change
    Synced,
    /// The peer was not reached or refused; the message says why
    Failed(String),
    /// No peer is configured
    Skipped,
}

/// Result of a replicated mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Id of the affected island as it is now held locally
    pub id: String,
    pub remote: RemoteOutcome,
}

impl SyncReport {
    pub fn is_synced(&self) -> bool {
        self.remote == RemoteOutcome::Synced
    }
}

/// How a delete behaves when the peer fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Keep the island locally and return the peer error
    RequirePeer,
    /// Delete locally anyway
    ForceLocal,
}

/// Applies mutations to a local store and forwards them to a peer
pub struct SyncCoordinator<P> {
    peer: P,
}

impl<P: PeerClient> SyncCoordinator<P> {
    pub fn new(peer: P) -> Self {
        Self { peer }
    }

    pub fn peer(&self) -> &P {
        &self.peer
    }

    /// Creates locally, then on the peer.
    ///
    /// On success the local island takes the id the peer assigned. On
    /// failure it keeps its local id.
    pub async fn create(&self, store: &mut IslandStore, name: &str) -> Result<SyncReport> {
        let local_id = store.create_island(name)?;
        let name = store.get(&local_id)?.name.clone();

        match self.peer.create_island(&name).await {
            Ok(remote_id) => {
                if let Err(e) = store.rekey(&local_id, &remote_id) {
                    warn!(
                        "Peer created island {} as {} but the local id could not follow: {}",
                        local_id, remote_id, e
                    );
                    return Ok(SyncReport {
                        id: local_id,
                        remote: RemoteOutcome::Failed(format!(
                            "peer holds it as {}, local id kept: {}",
                            remote_id, e
                        )),
                    });
                }
                info!("Island '{}' created on peer as {}", name, remote_id);
                Ok(SyncReport {
                    id: remote_id,
                    remote: RemoteOutcome::Synced,
                })
            }
            Err(e) => {
                warn!("Peer create failed for island {}: {}", local_id, e);
                Ok(SyncReport {
                    id: local_id,
                    remote: RemoteOutcome::Failed(e.to_string()),
                })
            }
        }
    }

    /// Updates locally, then sends the changed fields to the peer.
    ///
    /// Both sides receive the same normalized patch. The local update
    /// stands even if the peer fails.
    pub async fn update(
        &self,
        store: &mut IslandStore,
        id: &str,
        patch: &IslandPatch,
    ) -> Result<SyncReport> {
        let patch = &patch.normalized();
        store.update_island(id, patch)?;
        if patch.is_empty() {
            return Ok(SyncReport {
                id: id.to_string(),
                remote: RemoteOutcome::Skipped,
            });
        }

        let remote = match self.peer.update_island(id, patch).await {
            Ok(()) => RemoteOutcome::Synced,
            Err(e) => {
                warn!("Peer update failed for island {}: {}", id, e);
                RemoteOutcome::Failed(e.to_string())
            }
        };
        Ok(SyncReport {
            id: id.to_string(),
            remote,
        })
    }

    /// Deletes on the peer first, then locally.
    ///
    /// With [`DeleteMode::RequirePeer`] a peer failure leaves the island in
    /// place and is returned as the error.
    pub async fn delete(
        &self,
        store: &mut IslandStore,
        id: &str,
        mode: DeleteMode,
    ) -> Result<SyncReport> {
        store.get(id)?;

        let remote = match self.peer.delete_island(id).await {
            Ok(()) => RemoteOutcome::Synced,
            Err(e) if mode == DeleteMode::ForceLocal => {
                warn!("Peer delete failed for island {}, deleting locally only: {}", id, e);
                RemoteOutcome::Failed(e.to_string())
            }
            Err(e) => {
                warn!("Peer delete failed for island {}, keeping it: {}", id, e);
                return Err(e);
            }
        };

        store.delete_island(id)?;
        Ok(SyncReport {
            id: id.to_string(),
            remote,
        })
    }

    /// Overwrites the peer's collection with the local one
    pub async fn full_sync(&self, store: &IslandStore) -> Result<()> {
        warn!(
            "Replacing peer collection with {} local islands",
            store.islands().len()
        );
        self.peer.replace_all(store.islands()).await?;
        info!("Full sync complete");
        Ok(())
    }
}
