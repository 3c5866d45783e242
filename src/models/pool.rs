// Sysbus Gateway - Pool Model
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Storage pool JSON representation.

use serde::{Deserialize, Serialize};

/// A storage pool. Pools are value objects identified by name only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolResponse {
    pub name: String,
}
