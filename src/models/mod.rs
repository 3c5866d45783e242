// Sysbus Gateway - Models
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! JSON boundary models for zones, rules and pools.

mod pool;
mod port;
mod rule;
mod zone;

pub use pool::PoolResponse;
pub use port::PortPair;
pub use rule::{Rule, RuleError, RuleRequest, RuleResponse, RuleType};
pub use zone::{ZoneCreateRequest, ZoneResponse};
