use crate::model::SymbolInfo;
use serde::{Deserialize, Serialize};

/// A runtime dispatch suggested by the model. Nothing about it has been
/// checked against the source tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredConnection {
    #[serde(rename = "type")]
    pub connection_type: String,
    pub target_hint: String,
    pub reason: String,
}

/// Target located by a verifier, not yet tied to the symbol the connection
/// was discovered in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedTarget {
    connection: DiscoveredConnection,
    target_symbol: SymbolInfo,
    target_file_path: String,
}

impl VerifiedTarget {
    pub(super) fn new(
        connection: DiscoveredConnection,
        target_symbol: SymbolInfo,
        target_file_path: String,
    ) -> Self {
        Self {
            connection,
            target_symbol,
            target_file_path,
        }
    }

    pub fn connection(&self) -> &DiscoveredConnection {
        &self.connection
    }

    pub fn target_symbol(&self) -> &SymbolInfo {
        &self.target_symbol
    }

    pub fn target_file_path(&self) -> &str {
        &self.target_file_path
    }

    pub fn attach_source(self, source_symbol: SymbolInfo) -> VerifiedConnection {
        VerifiedConnection {
            source_symbol,
            connection: self.connection,
            target_symbol: self.target_symbol,
            target_file_path: self.target_file_path,
        }
    }
}

/// A runtime connection whose target was found in the source tree.
///
/// Only a verifier can produce one (through [`VerifiedTarget`]); it has no
/// public constructor and cannot be deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedConnection {
    source_symbol: SymbolInfo,
    connection: DiscoveredConnection,
    target_symbol: SymbolInfo,
    target_file_path: String,
}

impl VerifiedConnection {
    pub fn source_symbol(&self) -> &SymbolInfo {
        &self.source_symbol
    }

    pub fn connection(&self) -> &DiscoveredConnection {
        &self.connection
    }

    pub fn target_symbol(&self) -> &SymbolInfo {
        &self.target_symbol
    }

    pub fn target_file_path(&self) -> &str {
        &self.target_file_path
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Verified(VerifiedTarget),
    Rejected {
        connection: DiscoveredConnection,
        reason: String,
    },
}

impl Verification {
    pub fn is_verified(&self) -> bool {
        matches!(self, Verification::Verified(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Verification::Verified(_) => None,
            Verification::Rejected { reason, .. } => Some(reason),
        }
    }

    pub fn connection(&self) -> &DiscoveredConnection {
        match self {
            Verification::Verified(target) => target.connection(),
            Verification::Rejected { connection, .. } => connection,
        }
    }
}
