// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Error rate (percent) above which health is critical.
pub const CRITICAL_ERROR_RATE: f64 = 10.0;
/// Error rate (percent) above which health is a warning.
pub const WARNING_ERROR_RATE: f64 = 5.0;
/// Pending rate (percent) above which health is a warning.
pub const WARNING_PENDING_RATE: f64 = 20.0;
/// Sync rate (percent) above which health is healthy.
pub const HEALTHY_SYNC_RATE: f64 = 95.0;

/// Cell counts over the health window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncCounts {
    /// Active cells in the window.
    pub total: u64,
    /// Cells with `synced = true`.
    pub synced: u64,
    /// Cells carrying a sync error.
    pub errored: u64,
    /// Cells awaiting push.
    pub pending: u64,
}

/// Overall sync health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Sync rate above the healthy threshold.
    Healthy,
    /// No threshold breached.
    Ok,
    /// Elevated errors or backlog.
    Warning,
    /// High error rate.
    Critical,
}

impl HealthStatus {
    /// Returns the wire name of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

/// Classified sync health with rates in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncHealth {
    /// The classification.
    pub status: HealthStatus,
    /// Percent of cells synced.
    pub sync_rate: f64,
    /// Percent of cells in error.
    pub error_rate: f64,
    /// Percent of cells pending.
    pub pending_rate: f64,
    /// The raw counts.
    pub counts: SyncCounts,
    /// One entry per breached threshold.
    pub recommendations: Vec<String>,
}

fn percent(part: u64, total: u64) -> f64 {
    let part: f64 = part.to_f64().unwrap_or_default();
    let total: f64 = total.to_f64().unwrap_or_default();
    part * 100.0 / total
}

/// Classifies sync health from cell counts.
///
/// An empty window is healthy: there is nothing to sync.
#[must_use]
pub fn classify_sync_health(counts: SyncCounts) -> SyncHealth {
    if counts.total == 0 {
        return SyncHealth {
            status: HealthStatus::Healthy,
            sync_rate: 0.0,
            error_rate: 0.0,
            pending_rate: 0.0,
            counts,
            recommendations: vec![String::from(
                "No availability records in the window; nothing to sync",
            )],
        };
    }

    let sync_rate: f64 = percent(counts.synced, counts.total);
    let error_rate: f64 = percent(counts.errored, counts.total);
    let pending_rate: f64 = percent(counts.pending, counts.total);

    let mut recommendations: Vec<String> = Vec::new();
    if error_rate > CRITICAL_ERROR_RATE {
        recommendations.push(format!(
            "Error rate is {error_rate:.1}%: verify channel credentials and provider status, then run error recovery"
        ));
    } else if error_rate > WARNING_ERROR_RATE {
        recommendations.push(format!(
            "Error rate is {error_rate:.1}%: review recent sync errors"
        ));
    }
    if pending_rate > WARNING_PENDING_RATE {
        recommendations.push(format!(
            "{pending_rate:.1}% of cells are pending: run a manual sync or shorten the incremental interval"
        ));
    }
    if sync_rate <= HEALTHY_SYNC_RATE {
        recommendations.push(format!(
            "Sync rate is {sync_rate:.1}%: schedule a full sync"
        ));
    }

    let status: HealthStatus = if error_rate > CRITICAL_ERROR_RATE {
        HealthStatus::Critical
    } else if error_rate > WARNING_ERROR_RATE || pending_rate > WARNING_PENDING_RATE {
        HealthStatus::Warning
    } else if sync_rate > HEALTHY_SYNC_RATE {
        HealthStatus::Healthy
    } else {
        HealthStatus::Ok
    };

    SyncHealth {
        status,
        sync_rate,
        error_rate,
        pending_rate,
        counts,
        recommendations,
    }
}
