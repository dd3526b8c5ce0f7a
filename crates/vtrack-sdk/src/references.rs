//! Reference edges between versions.
//!
//! Edges are stored on the referencing version. Every check runs against a
//! [`ReferenceGraph`] loaded from the store just before the write, so a
//! rejected edge is never persisted.

use tracing::{debug, info, warn};

use vtrack_graph::{GraphError, ReferenceGraph};
use vtrack_model::Version;
use vtrack_store::{VersionFilter, VersionStore};
use vtrack_types::VersionId;

use crate::error::{TrackerError, TrackerResult};
use crate::tracker::Tracker;

impl<S: VersionStore> Tracker<S> {
    /// Adjacency view of every stored edge.
    pub fn reference_graph(&self) -> TrackerResult<ReferenceGraph> {
        let versions = self.store.query_versions(&VersionFilter::new())?;
        Ok(ReferenceGraph::from_edges(
            versions
                .iter()
                .map(|v| (v.id, v.references().iter().copied().collect::<Vec<_>>())),
        ))
    }

    /// Record that `referencer` uses `reference`.
    ///
    /// Fails with [`TrackerError::SelfReference`] for a self loop and
    /// [`TrackerError::CircularDependency`] when `referencer` is already
    /// reachable from `reference`. Adding an existing edge is a no-op.
    pub fn add_reference(
        &self,
        referencer: VersionId,
        reference: VersionId,
    ) -> TrackerResult<Version> {
        let mut source = self.store.require_version(referencer)?;
        let target = self.store.require_version(reference)?;

        let graph = self.reference_graph()?;
        let edge = match graph.check_edge(&referencer, &reference) {
            Ok(edge) => edge,
            Err(err) => {
                warn!(
                    referencer = %referencer,
                    reference = %reference,
                    error = %err,
                    "rejected reference"
                );
                return Err(match err {
                    GraphError::SelfReference(_) => TrackerError::SelfReference {
                        version: source.summary(),
                    },
                    GraphError::CircularDependency { .. } => TrackerError::CircularDependency {
                        referencer: source.summary(),
                        reference: target.summary(),
                    },
                });
            }
        };

        if source.link_reference(edge)? {
            self.store.save_version(&source)?;
            info!(
                referencer = %source.filename(),
                reference = %target.filename(),
                "added reference"
            );
        } else {
            debug!(referencer = %referencer, reference = %reference, "reference already present");
        }
        Ok(source)
    }

    /// Drop an edge. Returns the referencer; a missing edge is not an error.
    pub fn remove_reference(
        &self,
        referencer: VersionId,
        reference: VersionId,
    ) -> TrackerResult<Version> {
        let mut source = self.store.require_version(referencer)?;
        if source.unlink_reference(&reference) {
            self.store.save_version(&source)?;
            info!(referencer = %referencer, reference = %reference, "removed reference");
        }
        Ok(source)
    }

    /// Versions directly referenced by `id`, in id order.
    pub fn references_of(&self, id: VersionId) -> TrackerResult<Vec<Version>> {
        let version = self.store.require_version(id)?;
        version
            .references()
            .iter()
            .map(|target| self.store.require_version(*target).map_err(TrackerError::from))
            .collect()
    }

    /// Versions with a direct edge to `id`.
    pub fn referenced_by(&self, id: VersionId) -> TrackerResult<Vec<Version>> {
        self.store.require_version(id)?;
        Ok(self.store.referrers(id)?)
    }

    /// Every version reachable from `id`, depth-first, each once.
    pub fn walk_references(&self, id: VersionId) -> TrackerResult<Vec<Version>> {
        self.store.require_version(id)?;
        let graph = self.reference_graph()?;
        graph
            .walk_references(&id)
            .into_iter()
            .map(|target| self.store.require_version(target).map_err(TrackerError::from))
            .collect()
    }

    /// Direct references that have a newer published sibling.
    ///
    /// Only direct references are inspected; a stale reference two hops away
    /// is reported when its direct referrer is checked.
    pub fn dependency_update_list(&self, id: VersionId) -> TrackerResult<Vec<Version>> {
        let mut outdated = Vec::new();
        for reference in self.references_of(id)? {
            let Some(published) = self.latest_published(&reference.sibling_key())? else {
                continue;
            };
            if published.version_number() > reference.version_number() {
                debug!(
                    reference = %reference.filename(),
                    newer = %published.filename(),
                    "reference has a newer published version"
                );
                outdated.push(reference);
            }
        }
        Ok(outdated)
    }
}
