//! The identifier translator — a transient map from client-local node ids
//! to server-assigned node ids.
//!
//! Scoped to one ingestion call: populated as each node row is created,
//! consulted when link endpoints are resolved, discarded afterwards. It is
//! never persisted and never reused across requests.

use std::collections::HashMap;

use crate::{Error, Result, graph::NodeId};

/// Client-local id → server node id, valid for one submission only.
#[derive(Debug, Default)]
pub struct LocalIdMap {
  inner: HashMap<i64, NodeId>,
}

impl LocalIdMap {
  pub fn new() -> Self {
    Self::default()
  }

  /// Record the server id assigned to a just-created node. A second binding
  /// of the same local id means the submission declared it twice.
  pub fn bind(&mut self, local_id: i64, node_id: NodeId) -> Result<()> {
    if self.inner.insert(local_id, node_id).is_some() {
      return Err(Error::DuplicateLocalId(local_id));
    }
    Ok(())
  }

  /// Resolve a link endpoint. A miss is fatal for the whole ingestion: the
  /// link referenced an alter never declared as a node in this submission.
  pub fn resolve(&self, local_id: i64) -> Result<NodeId> {
    self
      .inner
      .get(&local_id)
      .copied()
      .ok_or(Error::UnresolvedReference(local_id))
  }

  pub fn len(&self) -> usize {
    self.inner.len()
  }

  pub fn is_empty(&self) -> bool {
    self.inner.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bind_then_resolve() {
    let mut map = LocalIdMap::new();
    map.bind(1, 101).unwrap();
    map.bind(2, 102).unwrap();
    assert_eq!(map.resolve(1).unwrap(), 101);
    assert_eq!(map.resolve(2).unwrap(), 102);
  }

  #[test]
  fn miss_is_unresolved_reference() {
    let map = LocalIdMap::new();
    assert!(matches!(map.resolve(9), Err(Error::UnresolvedReference(9))));
  }

  #[test]
  fn rebinding_is_rejected() {
    let mut map = LocalIdMap::new();
    map.bind(1, 101).unwrap();
    assert!(matches!(map.bind(1, 102), Err(Error::DuplicateLocalId(1))));
  }
}
