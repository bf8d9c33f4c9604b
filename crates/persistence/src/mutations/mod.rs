// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! ## Module Organization
//!
//! - `catalog` — Seeding inserts for properties, rooms, reservations, restrictions
//! - `cells` — Availability cell writes and sync state transitions
//! - `channels` — Channel configurations and room mappings
//! - `sync_logs` — Sync attempt history
//!
//! Multi-row writes run inside a single transaction; the `last_insert_rowid`
//! helper comes from the `backend` module.

pub mod catalog;
pub mod cells;
pub mod channels;
pub mod sync_logs;
