/*!
 * Scheduler Limits and Constants
 *
 * Centralized location for tier boundaries, time slices, and aging parameters.
 */

use super::types::{Priority, Tick};

// =============================================================================
// PRIORITY BANDS
// =============================================================================

/// Lowest valid priority (inclusive)
pub const MIN_PRIORITY: Priority = 0;

/// Upper bound of the valid priority range (exclusive)
pub const PRIORITY_LIMIT: Priority = 150;

/// Highest valid priority
pub const MAX_PRIORITY: Priority = PRIORITY_LIMIT - 1;

/// First priority of the middle tier (priority-ordered band)
pub const TIER2_FLOOR: Priority = 50;

/// First priority of the top tier (shortest-remaining-time band)
pub const TIER1_FLOOR: Priority = 100;

// =============================================================================
// TIME SLICES
// =============================================================================

/// Round-robin time slice for the lowest tier, in ticks
pub const DEFAULT_QUANTUM: Tick = 100;

// =============================================================================
// AGING
// =============================================================================

/// Ticks a task must wait in a ready queue to earn one aging step
pub const DEFAULT_AGING_INTERVAL: Tick = 1500;

/// Priority gained per aging interval
pub const DEFAULT_AGING_STEP: Priority = 10;

// =============================================================================
// BURST ESTIMATION
// =============================================================================

/// Weight of the most recent burst in the exponential average `t_i = a*T + (1-a)*t_{i-1}`
pub const BURST_SMOOTHING: f64 = 0.5;
