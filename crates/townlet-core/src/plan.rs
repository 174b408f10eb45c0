//! Daily plans: coarse time blocks an agent intends to follow.
//!
//! Plans come from the gateway when it cooperates and from a deterministic
//! keyword fallback when it does not. A plan is advisory; the action decision
//! each tick is free to ignore it.

use contracts::{DailyPlanWire, SimTime};

use crate::world::Place;

/// Upper bound on stored blocks per plan.
pub const MAX_BLOCKS: usize = 10;

/// How many upcoming blocks feed the decision prompt.
const SNIPPET_BLOCKS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct TimeBlock {
    /// Minutes into the day.
    pub start_min: u64,
    pub end_min: u64,
    pub location: String,
    pub activity: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyPlan {
    pub date: String,
    pub blocks: Vec<TimeBlock>,
}

fn parse_hhmm(raw: &str) -> Option<u64> {
    let (hours, minutes) = raw.trim().split_once(':')?;
    let hours: u64 = hours.parse().ok()?;
    let minutes: u64 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Converts a wire plan into a validated plan. Any malformed block time
/// invalidates the whole payload; blocks beyond [`MAX_BLOCKS`] are dropped.
pub fn parse_wire(wire: &DailyPlanWire) -> Option<DailyPlan> {
    if wire.blocks.is_empty() {
        return None;
    }
    let mut blocks = Vec::with_capacity(wire.blocks.len().min(MAX_BLOCKS));
    for block in wire.blocks.iter().take(MAX_BLOCKS) {
        let start_min = parse_hhmm(&block.start)?;
        let end_min = parse_hhmm(&block.end)?;
        blocks.push(TimeBlock {
            start_min,
            end_min,
            location: block.location.clone(),
            activity: block.activity.clone(),
        });
    }
    Some(DailyPlan {
        date: wire.date.clone(),
        blocks,
    })
}

/// Deterministic plan used when the gateway yields nothing. Slots are filled
/// by keyword-matching the registered place names; anything unmatched falls
/// back to the agent's home, then to the first registered place.
pub fn fallback_plan(home_place: &str, places: &[Place], date: &str) -> DailyPlan {
    let find = |keyword: &str| -> Option<String> {
        places
            .iter()
            .find(|p| p.name.to_lowercase().contains(keyword))
            .map(|p| p.id.clone())
    };
    let home = places
        .iter()
        .find(|p| p.id == home_place)
        .map(|p| p.id.clone())
        .or_else(|| places.first().map(|p| p.id.clone()))
        .unwrap_or_default();
    let slot = |keyword: &str| find(keyword).unwrap_or_else(|| home.clone());

    DailyPlan {
        date: date.to_string(),
        blocks: vec![
            TimeBlock {
                start_min: 7 * 60,
                end_min: 9 * 60,
                location: home.clone(),
                activity: "morning routine".to_string(),
            },
            TimeBlock {
                start_min: 9 * 60,
                end_min: 11 * 60,
                location: slot("cafe"),
                activity: "coffee and conversation".to_string(),
            },
            TimeBlock {
                start_min: 11 * 60,
                end_min: 13 * 60,
                location: slot("market"),
                activity: "errands".to_string(),
            },
            TimeBlock {
                start_min: 13 * 60,
                end_min: 16 * 60,
                location: slot("library"),
                activity: "quiet work".to_string(),
            },
            TimeBlock {
                start_min: 16 * 60,
                end_min: 17 * 60,
                location: slot("pharmacy"),
                activity: "errands and appointments".to_string(),
            },
            TimeBlock {
                start_min: 17 * 60,
                end_min: 19 * 60,
                location: slot("park"),
                activity: "a walk outside".to_string(),
            },
            TimeBlock {
                start_min: 19 * 60,
                end_min: 22 * 60,
                location: home,
                activity: "dinner and rest".to_string(),
            },
        ],
    }
}

/// Up to three blocks whose end is at or after `now`'s time of day, in
/// stored order. Empty late at night when every block has passed.
pub fn snippet_for(plan: &DailyPlan, now: SimTime) -> Vec<&TimeBlock> {
    let tod = now.time_of_day();
    plan.blocks
        .iter()
        .filter(|block| block.end_min >= tod)
        .take(SNIPPET_BLOCKS)
        .collect()
}

fn render_min(minutes: u64) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Human-readable rendering for snapshots and prompts.
pub fn plan_text(plan: &DailyPlan) -> String {
    plan.blocks
        .iter()
        .map(|block| {
            format!(
                "{}-{} {} @ {}",
                render_min(block.start_min),
                render_min(block.end_min),
                block.activity,
                block.location
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}
