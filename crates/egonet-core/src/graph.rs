//! The survey graph — what one participant submits and what the store
//! reconstructs on read.
//!
//! A submission expresses nodes and links with *client-local* identifiers
//! (`local_id`), unique only within that one payload. They are translated to
//! server-assigned ids during ingestion and never used as storage keys.

use serde::{Deserialize, Serialize};

use crate::{Result, translate::LocalIdMap};

/// Server-assigned surrogate key for one survey-completion event.
pub type CompletionId = i64;
/// Server-assigned surrogate key for a stored alter node.
pub type NodeId = i64;
/// Server-assigned surrogate key for a stored group.
pub type GroupId = i64;
/// Server-assigned surrogate key for a stored link.
pub type LinkId = i64;

// ─── Submission (client-local ids) ───────────────────────────────────────────

/// A named cluster the participant assigns alters to. Groups are scoped to
/// one completion; names may repeat across completions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSpec {
  pub name:  String,
  pub color: String,
}

/// One alter as submitted by the client. Serde names follow the wire format
/// the survey clients already speak (`id_app`, `first_name`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
  /// Client-local identifier, unique within this submission only.
  #[serde(rename = "id_app")]
  pub local_id:   i64,
  #[serde(rename = "first_name")]
  pub name:       String,
  pub age:        i64,
  pub sex:        i64,
  pub job:        String,
  pub dial:       i64,
  pub circle:     i64,
  pub position_x: i64,
  pub position_y: i64,
  /// Name of the group this alter belongs to, if any.
  pub group_name: String,
}

/// An undirected edge between two alters, expressed with client-local ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSpec {
  #[serde(rename = "id_1")]
  pub source: i64,
  #[serde(rename = "id_2")]
  pub target: i64,
}

/// One complete submitted graph. Empty collections are a valid degenerate
/// completion — a participant who names zero alters still completed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Submission {
  pub groups: Vec<GroupSpec>,
  pub nodes:  Vec<NodeSpec>,
  pub links:  Vec<LinkSpec>,
}

impl Submission {
  /// Validate internal consistency before any write is issued: every
  /// client-local id is unique, and every link endpoint resolves to a
  /// declared node.
  pub fn check_references(&self) -> Result<()> {
    let mut map = LocalIdMap::new();
    for node in &self.nodes {
      // Placeholder server id; only key uniqueness matters here.
      map.bind(node.local_id, 0)?;
    }
    for link in &self.links {
      map.resolve(link.source)?;
      map.resolve(link.target)?;
    }
    Ok(())
  }
}

// ─── Stored graph (server ids) ───────────────────────────────────────────────

/// A group row read back from the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredGroup {
  pub group_id: GroupId,
  pub name:     String,
  pub color:    String,
}

/// An alter row read back from the store, with its server id alongside the
/// original client-local id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredNode {
  pub node_id:    NodeId,
  pub local_id:   i64,
  pub name:       String,
  pub age:        i64,
  pub sex:        i64,
  pub job:        String,
  pub dial:       i64,
  pub circle:     i64,
  pub position_x: i64,
  pub position_y: i64,
  pub group_name: String,
}

/// A link row with both endpoints resolved to server node ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredLink {
  pub link_id: LinkId,
  pub source:  NodeId,
  pub target:  NodeId,
}

/// The reconstructed graph of one completion. All three collections may be
/// empty; "no such completion" is expressed as the absence of this value,
/// never as an empty instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionGraph {
  pub completion_id: CompletionId,
  pub groups:        Vec<StoredGroup>,
  pub nodes:         Vec<StoredNode>,
  pub links:         Vec<StoredLink>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Error;

  fn node(local_id: i64) -> NodeSpec {
    NodeSpec {
      local_id,
      name: format!("alter-{local_id}"),
      age: 30,
      sex: 1,
      job: "teacher".into(),
      dial: 2,
      circle: 1,
      position_x: 0,
      position_y: 0,
      group_name: "family".into(),
    }
  }

  #[test]
  fn empty_submission_is_valid() {
    assert!(Submission::default().check_references().is_ok());
  }

  #[test]
  fn links_over_declared_nodes_pass() {
    let sub = Submission {
      groups: vec![],
      nodes:  vec![node(1), node(2)],
      links:  vec![LinkSpec { source: 1, target: 2 }],
    };
    assert!(sub.check_references().is_ok());
  }

  #[test]
  fn undeclared_endpoint_is_rejected() {
    let sub = Submission {
      groups: vec![],
      nodes:  vec![node(1)],
      links:  vec![LinkSpec { source: 1, target: 7 }],
    };
    assert!(matches!(
      sub.check_references(),
      Err(Error::UnresolvedReference(7))
    ));
  }

  #[test]
  fn duplicate_local_id_is_rejected() {
    let sub = Submission {
      groups: vec![],
      nodes:  vec![node(3), node(3)],
      links:  vec![],
    };
    assert!(matches!(
      sub.check_references(),
      Err(Error::DuplicateLocalId(3))
    ));
  }
}
