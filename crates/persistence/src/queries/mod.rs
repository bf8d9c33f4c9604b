// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! ## Module Organization
//!
//! - `catalog` — Properties, room types, and rooms
//! - `cells` — Availability cells and sync selection
//! - `reservations` — Occupying reservations and restrictions
//! - `channels` — Channel configurations and room mappings
//! - `sync_logs` — Sync attempt history
//!
//! Every query filters by tenant except the scheduler-facing ones that
//! explicitly span tenants.

pub mod catalog;
pub mod cells;
pub mod channels;
pub mod reservations;
pub mod sync_logs;
