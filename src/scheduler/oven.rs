//! Greedy oven-slot allocator.
//!
//! # Algorithm
//!
//! 1. Start every slot as available at the simulation origin.
//! 2. Walk tasks in the order given (the prioritizer already sorted them).
//! 3. For each unit, pick the slot with the earliest availability
//!    (lowest index on ties) and load it at
//!    `entry = max(slot_available, task.earliest_start)`.
//! 4. The slot is free for the next unit at `entry + interval`; the unit
//!    finishes at `entry + bake`. A task finishes with its last unit.
//!
//! For a fixed processing order this never idles a slot that an eligible
//! unit could use, so each task's completion is as early as possible.
//!
//! # Complexity
//! O(u * k) where u=total units, k=oven slots.

use tracing::debug;

use crate::config::KitchenConfig;
use crate::time::{minutes_to_ms, ms_to_minutes};

/// One task's bake requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BakeTask {
    /// Pizza units to bake.
    pub units: u32,
    /// Earliest oven entry for any unit (ms offset).
    pub earliest_start_ms: i64,
}

impl BakeTask {
    /// Creates a bake task.
    pub fn new(units: u32, earliest_start_ms: i64) -> Self {
        Self {
            units,
            earliest_start_ms,
        }
    }
}

/// Where and when one unit entered an oven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitPlacement {
    /// Index of the owning task in the input slice.
    pub task_index: usize,
    /// Oven slot index.
    pub slot: usize,
    /// Entry time (ms offset).
    pub entry_ms: i64,
}

/// Result of packing a task queue onto the ovens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OvenPlan {
    /// Finish time of each task's last unit, parallel to the input.
    pub finish_ms: Vec<i64>,
    /// Every unit placement in processing order.
    pub placements: Vec<UnitPlacement>,
    /// Slot availability after the last unit.
    pub slot_available_ms: Vec<i64>,
}

impl OvenPlan {
    /// Latest finish over all tasks, or `None` for an empty plan.
    pub fn makespan_ms(&self) -> Option<i64> {
        self.finish_ms.iter().copied().max()
    }

    /// Placements belonging to one task.
    pub fn placements_for(&self, task_index: usize) -> impl Iterator<Item = &UnitPlacement> {
        self.placements
            .iter()
            .filter(move |p| p.task_index == task_index)
    }
}

/// Fixed set of identical oven slots.
///
/// # Example
///
/// ```
/// use pizza_eta::scheduler::{BakeTask, OvenAllocator};
///
/// // 2 ovens, 1 minute loading interval, 6.5 minute bake (in ms)
/// let ovens = OvenAllocator::new(2, 60_000, 390_000);
/// let plan = ovens.allocate(&[BakeTask::new(3, 0)], 0);
///
/// // Third unit waits for slot 0 to accept again at t=1min
/// assert_eq!(plan.finish_ms, vec![60_000 + 390_000]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OvenAllocator {
    slots: usize,
    interval_ms: i64,
    bake_ms: i64,
}

impl OvenAllocator {
    /// Creates an allocator. A slot count of 0 is raised to 1.
    pub fn new(slots: usize, interval_ms: i64, bake_ms: i64) -> Self {
        Self {
            slots: slots.max(1),
            interval_ms: interval_ms.max(0),
            bake_ms: bake_ms.max(0),
        }
    }

    /// Creates an allocator from kitchen settings.
    pub fn from_config(kitchen: &KitchenConfig) -> Self {
        Self::new(
            kitchen.effective_ovens(),
            minutes_to_ms(kitchen.oven_interval_minutes),
            minutes_to_ms(kitchen.bake_minutes),
        )
    }

    /// Number of oven slots.
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Packs tasks onto the ovens in the given order.
    ///
    /// All slots start available at `origin_ms`. A task with zero units
    /// touches no slot and finishes at `origin_ms`.
    pub fn allocate(&self, tasks: &[BakeTask], origin_ms: i64) -> OvenPlan {
        let mut available = vec![origin_ms; self.slots];
        let mut finish_ms = Vec::with_capacity(tasks.len());
        let mut placements = Vec::new();

        for (task_index, task) in tasks.iter().enumerate() {
            let mut task_finish = origin_ms;

            for _ in 0..task.units {
                let (slot, slot_available) = available
                    .iter()
                    .copied()
                    .enumerate()
                    .min_by_key(|&(i, at)| (at, i))
                    .unwrap_or((0, origin_ms));

                let entry = slot_available.max(task.earliest_start_ms);
                available[slot] = entry.saturating_add(self.interval_ms);
                task_finish = task_finish.max(entry.saturating_add(self.bake_ms));

                placements.push(UnitPlacement {
                    task_index,
                    slot,
                    entry_ms: entry,
                });
            }

            finish_ms.push(task_finish);
        }

        let span_ms = finish_ms
            .iter()
            .copied()
            .max()
            .unwrap_or(origin_ms)
            .saturating_sub(origin_ms);
        debug!(
            tasks = tasks.len(),
            units = placements.len(),
            slots = self.slots,
            span_minutes = ms_to_minutes(span_ms),
            "packed bake queue"
        );

        OvenPlan {
            finish_ms,
            placements,
            slot_available_ms: available,
        }
    }
}
