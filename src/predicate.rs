//! Conjunctive predicates over [`EntityFact`]s.
//!
//! A [`Predicate`] is a record of independently optional constraints. It is
//! satisfied when every present constraint is; absent constraints impose
//! nothing, so the empty predicate matches every fact.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::fact::{Award, EntityFact, Stat, PLAYOFF_EVENT};
use crate::normalize::{group_key, normalize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Predicate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups_all: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teammate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teammates_all: Option<Vec<String>>,
    /// Best single-period rate thresholds ("at least").
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub season_rate: BTreeMap<Stat, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_points: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub periods_at_least: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_overall_eq: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_overall_at_most: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_round_eq: Option<u32>,
    #[serde(skip_serializing_if = "is_false")]
    pub undrafted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_period: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drafted_by: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub playoffs: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub one_group: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups_at_least: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub career_points_rate_at_least: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub championships_at_least: Option<u32>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub awards: BTreeSet<Award>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub never: BTreeSet<Award>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Name of one present constraint. The set of present fields, together with
/// the prompt category, is a prompt's archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Field {
    Group,
    GroupsAll,
    Teammate,
    TeammatesAll,
    SeasonRate(Stat),
    PeakPoints,
    PeriodsAtLeast,
    DraftOverallEq,
    DraftOverallAtMost,
    DraftRoundEq,
    Undrafted,
    DraftPeriod,
    DraftedBy,
    Playoffs,
    OneGroup,
    GroupsAtLeast,
    CareerPointsRate,
    ChampionshipsAtLeast,
    Award(Award),
    Never(Award),
}

impl Predicate {
    pub fn fields(&self) -> BTreeSet<Field> {
        let mut out = BTreeSet::new();
        let mut flag = |present: bool, field: Field| {
            if present {
                out.insert(field);
            }
        };
        flag(self.group.is_some(), Field::Group);
        flag(self.groups_all.is_some(), Field::GroupsAll);
        flag(self.teammate.is_some(), Field::Teammate);
        flag(self.teammates_all.is_some(), Field::TeammatesAll);
        flag(self.peak_points.is_some(), Field::PeakPoints);
        flag(self.periods_at_least.is_some(), Field::PeriodsAtLeast);
        flag(self.draft_overall_eq.is_some(), Field::DraftOverallEq);
        flag(self.draft_overall_at_most.is_some(), Field::DraftOverallAtMost);
        flag(self.draft_round_eq.is_some(), Field::DraftRoundEq);
        flag(self.undrafted, Field::Undrafted);
        flag(self.draft_period.is_some(), Field::DraftPeriod);
        flag(self.drafted_by.is_some(), Field::DraftedBy);
        flag(self.playoffs, Field::Playoffs);
        flag(self.one_group, Field::OneGroup);
        flag(self.groups_at_least.is_some(), Field::GroupsAtLeast);
        flag(self.career_points_rate_at_least.is_some(), Field::CareerPointsRate);
        flag(self.championships_at_least.is_some(), Field::ChampionshipsAtLeast);
        out.extend(self.season_rate.keys().map(|&s| Field::SeasonRate(s)));
        out.extend(self.awards.iter().map(|&a| Field::Award(a)));
        out.extend(self.never.iter().map(|&a| Field::Never(a)));
        out
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Copy of this predicate with one constraint removed.
    pub fn without(&self, field: Field) -> Predicate {
        let mut p = self.clone();
        match field {
            Field::Group => p.group = None,
            Field::GroupsAll => p.groups_all = None,
            Field::Teammate => p.teammate = None,
            Field::TeammatesAll => p.teammates_all = None,
            Field::SeasonRate(s) => {
                p.season_rate.remove(&s);
            }
            Field::PeakPoints => p.peak_points = None,
            Field::PeriodsAtLeast => p.periods_at_least = None,
            Field::DraftOverallEq => p.draft_overall_eq = None,
            Field::DraftOverallAtMost => p.draft_overall_at_most = None,
            Field::DraftRoundEq => p.draft_round_eq = None,
            Field::Undrafted => p.undrafted = false,
            Field::DraftPeriod => p.draft_period = None,
            Field::DraftedBy => p.drafted_by = None,
            Field::Playoffs => p.playoffs = false,
            Field::OneGroup => p.one_group = false,
            Field::GroupsAtLeast => p.groups_at_least = None,
            Field::CareerPointsRate => p.career_points_rate_at_least = None,
            Field::ChampionshipsAtLeast => p.championships_at_least = None,
            Field::Award(a) => {
                p.awards.remove(&a);
            }
            Field::Never(a) => {
                p.never.remove(&a);
            }
        }
        p
    }
}

/// Metrics derived from a fact's per-period totals. Recomputed on every
/// evaluation; an entity without periods scores 0 everywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DerivedMetrics {
    pub best_points: f64,
    pub best_assists: f64,
    pub best_rebounds: f64,
    pub best_three_pct: f64,
    pub career_points_rate: f64,
}

impl DerivedMetrics {
    pub fn of(fact: &EntityFact) -> Self {
        let mut m = DerivedMetrics::default();
        let (mut games, mut points) = (0u64, 0.0);
        for totals in fact.period_totals.values() {
            m.best_points = m.best_points.max(totals.rate(Stat::Points));
            m.best_assists = m.best_assists.max(totals.rate(Stat::Assists));
            m.best_rebounds = m.best_rebounds.max(totals.rate(Stat::Rebounds));
            m.best_three_pct = m.best_three_pct.max(totals.rate(Stat::ThreePointPct));
            games += u64::from(totals.games);
            points += totals.points;
        }
        if games > 0 {
            m.career_points_rate = points / games as f64;
        }
        m
    }

    pub fn best(&self, stat: Stat) -> f64 {
        match stat {
            Stat::Points => self.best_points,
            Stat::Assists => self.best_assists,
            Stat::Rebounds => self.best_rebounds,
            Stat::ThreePointPct => self.best_three_pct,
        }
    }
}

pub fn matches(fact: &EntityFact, p: &Predicate) -> bool {
    if let Some(group) = &p.group {
        if !fact.groups.contains(&group_key(group)) {
            return false;
        }
    }
    if let Some(groups) = &p.groups_all {
        if !groups.iter().all(|g| fact.groups.contains(&group_key(g))) {
            return false;
        }
    }
    if let Some(mate) = &p.teammate {
        if !fact.teammates.contains(&normalize(mate)) {
            return false;
        }
    }
    if let Some(mates) = &p.teammates_all {
        if !mates.iter().all(|m| fact.teammates.contains(&normalize(m))) {
            return false;
        }
    }

    let needs_metrics = !p.season_rate.is_empty() || p.career_points_rate_at_least.is_some();
    let metrics = if needs_metrics { DerivedMetrics::of(fact) } else { DerivedMetrics::default() };
    if p.season_rate.iter().any(|(&stat, &min)| metrics.best(stat) < min) {
        return false;
    }
    if let Some(min) = p.career_points_rate_at_least {
        if metrics.career_points_rate < min {
            return false;
        }
    }
    if let Some(min) = p.peak_points {
        if fact.peak_event_points < min {
            return false;
        }
    }
    if let Some(min) = p.periods_at_least {
        if fact.periods.len() < min as usize {
            return false;
        }
    }

    // an overall pick of 0 is treated as "not drafted"
    let overall = fact.draft_overall().filter(|&n| n > 0);
    let draft = fact.draft.as_ref();
    if let Some(eq) = p.draft_overall_eq {
        if overall != Some(eq) {
            return false;
        }
    }
    if let Some(max) = p.draft_overall_at_most {
        if !overall.is_some_and(|n| n <= max) {
            return false;
        }
    }
    if let Some(round) = p.draft_round_eq {
        if draft.and_then(|d| d.round) != Some(round) {
            return false;
        }
    }
    if p.undrafted && overall.is_some() {
        return false;
    }
    if let Some(period) = p.draft_period {
        if draft.and_then(|d| d.period) != Some(period) {
            return false;
        }
    }
    if let Some(by) = &p.drafted_by {
        if draft.and_then(|d| d.group.as_deref()) != Some(group_key(by).as_str()) {
            return false;
        }
    }

    if p.playoffs && !fact.event_types.contains(PLAYOFF_EVENT) {
        return false;
    }
    if p.one_group && fact.groups.len() != 1 {
        return false;
    }
    if let Some(min) = p.groups_at_least {
        if fact.groups.len() < min as usize {
            return false;
        }
    }
    if let Some(min) = p.championships_at_least {
        if fact.achievements.championships < min {
            return false;
        }
    }
    if !p.awards.iter().all(|&a| fact.achievements.has(a)) {
        return false;
    }
    if p.never.iter().any(|&a| fact.achievements.has(a)) {
        return false;
    }
    true
}
