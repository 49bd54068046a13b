//! Per-set stat records.
//!
//! A [`StatRecord`] holds one player's tallies for one set: six typed
//! categories with fixed counters. A [`StatKey`] addresses exactly one
//! counter cell.

use serde::{Deserialize, Serialize};

use crate::core::role::Category;

/// Common view over a category's counters.
pub trait Tally {
    /// Counter names and values, in display order.
    fn counters(&self) -> Vec<(&'static str, u32)>;

    /// The counter reported as a percentage of the category total.
    fn lead(&self) -> u32;

    /// Sum of all counters.
    fn total(&self) -> u32 {
        self.counters()
            .iter()
            .fold(0u32, |acc, (_, value)| acc.saturating_add(*value))
    }
}

/// Service outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceStats {
    pub ace: u32,
    pub difficult: u32,
    pub passed: u32,
    pub missed: u32,
}

impl Tally for ServiceStats {
    fn counters(&self) -> Vec<(&'static str, u32)> {
        vec![
            ("ace", self.ace),
            ("difficult", self.difficult),
            ("passed", self.passed),
            ("missed", self.missed),
        ]
    }

    fn lead(&self) -> u32 {
        self.ace
    }
}

/// Attack outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackStats {
    pub scored: u32,
    pub placed: u32,
    pub missed: u32,
}

impl Tally for AttackStats {
    fn counters(&self) -> Vec<(&'static str, u32)> {
        vec![
            ("scored", self.scored),
            ("placed", self.placed),
            ("missed", self.missed),
        ]
    }

    fn lead(&self) -> u32 {
        self.scored
    }
}

/// Good / medium / bad grading, shared by pass and defense.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeStats {
    pub good: u32,
    pub medium: u32,
    pub bad: u32,
}

impl Tally for GradeStats {
    fn counters(&self) -> Vec<(&'static str, u32)> {
        vec![
            ("good", self.good),
            ("medium", self.medium),
            ("bad", self.bad),
        ]
    }

    fn lead(&self) -> u32 {
        self.good
    }
}

/// Reception quality: on the setter, at three meters, or bad.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceptionStats {
    pub setter: u32,
    #[serde(rename = "threeMeter")]
    pub three_meter: u32,
    pub bad: u32,
}

impl Tally for ReceptionStats {
    fn counters(&self) -> Vec<(&'static str, u32)> {
        vec![
            ("setter", self.setter),
            ("threeMeter", self.three_meter),
            ("bad", self.bad),
        ]
    }

    fn lead(&self) -> u32 {
        self.setter
    }
}

/// Explicit faults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaultStats {
    pub direct: u32,
}

impl Tally for FaultStats {
    fn counters(&self) -> Vec<(&'static str, u32)> {
        vec![("direct", self.direct)]
    }

    fn lead(&self) -> u32 {
        self.direct
    }
}

/// One player's statistics for one set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatRecord {
    pub service: ServiceStats,
    pub attack: AttackStats,
    pub pass: GradeStats,
    pub reception: ReceptionStats,
    pub defense: GradeStats,
    pub faults: FaultStats,
}

/// Service counter names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceCounter {
    Ace,
    Difficult,
    Passed,
    Missed,
}

/// Attack counter names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttackCounter {
    Scored,
    Placed,
    Missed,
}

/// Grade counter names (pass, defense).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GradeCounter {
    Good,
    Medium,
    Bad,
}

/// Reception counter names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReceptionCounter {
    Setter,
    ThreeMeter,
    Bad,
}

/// Address of a single counter cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKey {
    Service(ServiceCounter),
    Attack(AttackCounter),
    Pass(GradeCounter),
    Reception(ReceptionCounter),
    Defense(GradeCounter),
    FaultDirect,
}

impl StatKey {
    /// Category this counter belongs to.
    pub fn category(&self) -> Category {
        match self {
            StatKey::Service(_) => Category::Service,
            StatKey::Attack(_) => Category::Attack,
            StatKey::Pass(_) => Category::Pass,
            StatKey::Reception(_) => Category::Reception,
            StatKey::Defense(_) => Category::Defense,
            StatKey::FaultDirect => Category::Faults,
        }
    }

    /// Counter name as stored in records.
    pub fn counter_name(&self) -> &'static str {
        match self {
            StatKey::Service(ServiceCounter::Ace) => "ace",
            StatKey::Service(ServiceCounter::Difficult) => "difficult",
            StatKey::Service(ServiceCounter::Passed) => "passed",
            StatKey::Service(ServiceCounter::Missed) => "missed",
            StatKey::Attack(AttackCounter::Scored) => "scored",
            StatKey::Attack(AttackCounter::Placed) => "placed",
            StatKey::Attack(AttackCounter::Missed) => "missed",
            StatKey::Pass(grade) | StatKey::Defense(grade) => match grade {
                GradeCounter::Good => "good",
                GradeCounter::Medium => "medium",
                GradeCounter::Bad => "bad",
            },
            StatKey::Reception(ReceptionCounter::Setter) => "setter",
            StatKey::Reception(ReceptionCounter::ThreeMeter) => "threeMeter",
            StatKey::Reception(ReceptionCounter::Bad) => "bad",
            StatKey::FaultDirect => "direct",
        }
    }

    /// Resolve a counter name within a category.
    ///
    /// Returns `None` when the counter does not exist in that category.
    pub fn parse(category: Category, counter: &str) -> Option<Self> {
        let counter = counter.trim().to_lowercase();
        let counter = counter.as_str();
        match category {
            Category::Service => match counter {
                "ace" => Some(StatKey::Service(ServiceCounter::Ace)),
                "difficult" | "diff" => Some(StatKey::Service(ServiceCounter::Difficult)),
                "passed" => Some(StatKey::Service(ServiceCounter::Passed)),
                "missed" => Some(StatKey::Service(ServiceCounter::Missed)),
                _ => None,
            },
            Category::Attack => match counter {
                "scored" => Some(StatKey::Attack(AttackCounter::Scored)),
                "placed" => Some(StatKey::Attack(AttackCounter::Placed)),
                "missed" => Some(StatKey::Attack(AttackCounter::Missed)),
                _ => None,
            },
            Category::Pass => parse_grade(counter).map(StatKey::Pass),
            Category::Reception => match counter {
                "setter" => Some(StatKey::Reception(ReceptionCounter::Setter)),
                "threemeter" | "three-meter" | "three_meter" | "3m" => {
                    Some(StatKey::Reception(ReceptionCounter::ThreeMeter))
                }
                "bad" => Some(StatKey::Reception(ReceptionCounter::Bad)),
                _ => None,
            },
            Category::Defense => parse_grade(counter).map(StatKey::Defense),
            Category::Faults => match counter {
                "direct" => Some(StatKey::FaultDirect),
                _ => None,
            },
        }
    }
}

fn parse_grade(counter: &str) -> Option<GradeCounter> {
    match counter {
        "good" => Some(GradeCounter::Good),
        "medium" => Some(GradeCounter::Medium),
        "bad" => Some(GradeCounter::Bad),
        _ => None,
    }
}

impl StatRecord {
    /// All-zero record.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Read one counter.
    pub fn get(&self, key: StatKey) -> u32 {
        match key {
            StatKey::Service(c) => match c {
                ServiceCounter::Ace => self.service.ace,
                ServiceCounter::Difficult => self.service.difficult,
                ServiceCounter::Passed => self.service.passed,
                ServiceCounter::Missed => self.service.missed,
            },
            StatKey::Attack(c) => match c {
                AttackCounter::Scored => self.attack.scored,
                AttackCounter::Placed => self.attack.placed,
                AttackCounter::Missed => self.attack.missed,
            },
            StatKey::Pass(c) => grade_value(&self.pass, c),
            StatKey::Reception(c) => match c {
                ReceptionCounter::Setter => self.reception.setter,
                ReceptionCounter::ThreeMeter => self.reception.three_meter,
                ReceptionCounter::Bad => self.reception.bad,
            },
            StatKey::Defense(c) => grade_value(&self.defense, c),
            StatKey::FaultDirect => self.faults.direct,
        }
    }

    fn slot_mut(&mut self, key: StatKey) -> &mut u32 {
        match key {
            StatKey::Service(c) => match c {
                ServiceCounter::Ace => &mut self.service.ace,
                ServiceCounter::Difficult => &mut self.service.difficult,
                ServiceCounter::Passed => &mut self.service.passed,
                ServiceCounter::Missed => &mut self.service.missed,
            },
            StatKey::Attack(c) => match c {
                AttackCounter::Scored => &mut self.attack.scored,
                AttackCounter::Placed => &mut self.attack.placed,
                AttackCounter::Missed => &mut self.attack.missed,
            },
            StatKey::Pass(c) => grade_slot(&mut self.pass, c),
            StatKey::Reception(c) => match c {
                ReceptionCounter::Setter => &mut self.reception.setter,
                ReceptionCounter::ThreeMeter => &mut self.reception.three_meter,
                ReceptionCounter::Bad => &mut self.reception.bad,
            },
            StatKey::Defense(c) => grade_slot(&mut self.defense, c),
            StatKey::FaultDirect => &mut self.faults.direct,
        }
    }

    /// Apply a delta to one counter in place, flooring at zero.
    ///
    /// Returns the new value.
    pub fn apply(&mut self, key: StatKey, delta: i64) -> u32 {
        let slot = self.slot_mut(key);
        *slot = clamp_add(*slot, delta);
        *slot
    }

    /// Category view as a [`Tally`].
    pub fn tally(&self, category: Category) -> &dyn Tally {
        match category {
            Category::Service => &self.service,
            Category::Attack => &self.attack,
            Category::Pass => &self.pass,
            Category::Reception => &self.reception,
            Category::Defense => &self.defense,
            Category::Faults => &self.faults,
        }
    }

    /// Counter-wise sum of two records.
    pub fn merged(&self, other: &StatRecord) -> StatRecord {
        let mut out = *self;
        for key in ALL_KEYS {
            let slot = out.slot_mut(key);
            *slot = slot.saturating_add(other.get(key));
        }
        out
    }

    /// Whether every counter is zero.
    pub fn is_zero(&self) -> bool {
        ALL_KEYS.iter().all(|key| self.get(*key) == 0)
    }
}

/// Every counter cell, in export column order.
pub const ALL_KEYS: [StatKey; 17] = [
    StatKey::Service(ServiceCounter::Ace),
    StatKey::Service(ServiceCounter::Difficult),
    StatKey::Service(ServiceCounter::Passed),
    StatKey::Service(ServiceCounter::Missed),
    StatKey::Attack(AttackCounter::Scored),
    StatKey::Attack(AttackCounter::Placed),
    StatKey::Attack(AttackCounter::Missed),
    StatKey::Pass(GradeCounter::Good),
    StatKey::Pass(GradeCounter::Medium),
    StatKey::Pass(GradeCounter::Bad),
    StatKey::Reception(ReceptionCounter::Setter),
    StatKey::Reception(ReceptionCounter::ThreeMeter),
    StatKey::Reception(ReceptionCounter::Bad),
    StatKey::Defense(GradeCounter::Good),
    StatKey::Defense(GradeCounter::Medium),
    StatKey::Defense(GradeCounter::Bad),
    StatKey::FaultDirect,
];

fn grade_value(stats: &GradeStats, counter: GradeCounter) -> u32 {
    match counter {
        GradeCounter::Good => stats.good,
        GradeCounter::Medium => stats.medium,
        GradeCounter::Bad => stats.bad,
    }
}

fn grade_slot(stats: &mut GradeStats, counter: GradeCounter) -> &mut u32 {
    match counter {
        GradeCounter::Good => &mut stats.good,
        GradeCounter::Medium => &mut stats.medium,
        GradeCounter::Bad => &mut stats.bad,
    }
}

/// `max(0, value + delta)`, saturating at `u32::MAX`.
fn clamp_add(value: u32, delta: i64) -> u32 {
    let next = i64::from(value).saturating_add(delta).max(0);
    u32::try_from(next).unwrap_or(u32::MAX)
}

/// Return a copy of `record` with one counter moved by `delta`.
///
/// The new value is `max(0, old + delta)`; no other cell changes.
pub fn update_counter(record: &StatRecord, key: StatKey, delta: i64) -> StatRecord {
    let mut next = *record;
    next.apply(key, delta);
    next
}
