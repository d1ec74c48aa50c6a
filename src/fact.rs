use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::normalize::{canonical_person_key, group_key, normalize};

/// Event type that marks a postseason appearance.
pub const PLAYOFF_EVENT: &str = "playoffs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Award {
    Champion,
    Mvp,
    Roty,
    AllStar,
    FinalsMvp,
    Dpoy,
    SixthMan,
    Mip,
    AllNba,
    OlympicGold,
    Hof,
    ScoringChampion,
    AssistLeader,
    ReboundLeader,
}

/// Per-period statistics that have a best-season rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Points,
    Assists,
    Rebounds,
    ThreePointPct,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodTotals {
    pub games: u32,
    pub points: f64,
    pub assists: f64,
    pub rebounds: f64,
    pub three_made: f64,
    pub three_attempted: f64,
}

impl PeriodTotals {
    pub fn add(&mut self, other: &PeriodTotals) {
        self.games += other.games;
        self.points += other.points;
        self.assists += other.assists;
        self.rebounds += other.rebounds;
        self.three_made += other.three_made;
        self.three_attempted += other.three_attempted;
    }

    /// Per-game rate for counting stats, made/attempted for three-point rate.
    pub fn rate(&self, stat: Stat) -> f64 {
        let games = f64::from(self.games.max(1));
        match stat {
            Stat::Points => self.points / games,
            Stat::Assists => self.assists / games,
            Stat::Rebounds => self.rebounds / games,
            Stat::ThreePointPct => {
                if self.three_attempted > 0.0 {
                    self.three_made / self.three_attempted
                } else {
                    0.0
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftInfo {
    pub period: Option<i32>,
    pub round: Option<u32>,
    pub overall: Option<u32>,
    /// Normalized group code of the drafting franchise.
    pub group: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Achievements {
    pub awards: BTreeSet<Award>,
    pub championships: u32,
}

impl Achievements {
    pub fn with(awards: &[Award], championships: u32) -> Self {
        Achievements {
            awards: awards.iter().copied().collect(),
            championships,
        }
    }

    pub fn has(&self, award: Award) -> bool {
        self.awards.contains(&award)
    }

    pub fn merge(&mut self, other: &Achievements) {
        self.awards.extend(other.awards.iter().copied());
        self.championships = self.championships.max(other.championships);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityFact {
    pub key: String,
    pub name: String,
    pub image_id: Option<String>,
    pub groups: BTreeSet<String>,
    pub group_names: BTreeSet<String>,
    pub periods: BTreeSet<i32>,
    pub event_types: BTreeSet<String>,
    pub teammates: BTreeSet<String>,
    pub group_periods: BTreeSet<(String, i32)>,
    pub period_totals: BTreeMap<i32, PeriodTotals>,
    pub peak_event_points: f64,
    pub draft: Option<DraftInfo>,
    pub achievements: Achievements,
}

impl EntityFact {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        EntityFact {
            key: key.into(),
            name: name.into(),
            ..EntityFact::default()
        }
    }

    pub fn draft_overall(&self) -> Option<u32> {
        self.draft.as_ref().and_then(|d| d.overall)
    }

    pub fn latest_period(&self) -> Option<i32> {
        self.periods.iter().next_back().copied()
    }

    /// Puts keys, group codes, teammates and event types in the form
    /// predicates compare against. Already canonical facts are unchanged.
    pub fn canonicalized(mut self) -> Self {
        fn keys(set: BTreeSet<String>, f: fn(&str) -> String) -> BTreeSet<String> {
            set.iter().map(|v| f(v)).filter(|v| !v.is_empty()).collect()
        }
        self.key = canonical_person_key(&self.key);
        self.name = self.name.trim().to_string();
        self.groups = keys(self.groups, group_key);
        self.teammates = keys(self.teammates, normalize);
        self.event_types = keys(self.event_types, normalize);
        self.group_periods = self
            .group_periods
            .into_iter()
            .map(|(group, period)| (group_key(&group), period))
            .filter(|(group, _)| !group.is_empty())
            .collect();
        if let Some(draft) = self.draft.as_mut() {
            draft.group = draft.group.take().map(|g| group_key(&g)).filter(|g| !g.is_empty());
        }
        self
    }
}

/// Read-only fact store. Entity positions are stable (sorted by key) and are
/// what candidate masks index into.
#[derive(Debug, Clone, Default)]
pub struct FactStore {
    facts: Vec<EntityFact>,
    by_key: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl FactStore {
    /// Canonicalizes every fact, then keeps the first fact per key.
    pub fn from_facts(facts: Vec<EntityFact>) -> Self {
        let mut facts: Vec<EntityFact> = facts.into_iter().map(EntityFact::canonicalized).collect();
        facts.sort_by(|a, b| a.key.cmp(&b.key));
        facts.dedup_by(|later, earlier| later.key == earlier.key);
        let mut by_key = HashMap::with_capacity(facts.len());
        let mut by_name = HashMap::with_capacity(facts.len());
        for (pos, fact) in facts.iter().enumerate() {
            by_key.insert(fact.key.clone(), pos);
            let name_key = normalize(&fact.name);
            if !name_key.is_empty() {
                by_name.insert(name_key, pos);
            }
        }
        FactStore {
            facts,
            by_key,
            by_name,
        }
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn get(&self, pos: usize) -> Option<&EntityFact> {
        self.facts.get(pos)
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.by_key.get(key).copied()
    }

    pub fn by_key(&self, key: &str) -> Option<&EntityFact> {
        self.position(key).map(|pos| &self.facts[pos])
    }

    /// Exact lookup by normalized display name.
    pub fn by_name(&self, name: &str) -> Option<&EntityFact> {
        self.by_name.get(&normalize(name)).map(|&pos| &self.facts[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityFact> {
        self.facts.iter()
    }

    pub fn facts(&self) -> &[EntityFact] {
        &self.facts
    }

    pub fn latest_period(&self) -> Option<i32> {
        self.facts.iter().filter_map(EntityFact::latest_period).max()
    }
}

/// Incremental, merge-on-insert construction of a [`FactStore`].
#[derive(Debug, Default)]
pub struct FactStoreBuilder {
    facts: BTreeMap<String, EntityFact>,
}

impl FactStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Get or create the entity for `key`. The name is only filled in when the
    /// entity has none yet.
    pub fn entity(&mut self, key: &str, fallback_name: &str) -> &mut EntityFact {
        let key = canonical_person_key(key);
        let fact = self
            .facts
            .entry(key.clone())
            .or_insert_with(|| EntityFact::new(key, ""));
        if fact.name.is_empty() && !fallback_name.trim().is_empty() {
            fact.name = fallback_name.trim().to_string();
        }
        fact
    }

    /// Adds `totals` into the period's aggregate; never replaces it.
    pub fn record_period(&mut self, key: &str, period: i32, totals: &PeriodTotals) {
        let fact = self.entity(key, "");
        fact.periods.insert(period);
        fact.period_totals.entry(period).or_default().add(totals);
    }

    pub fn record_group_period(
        &mut self,
        key: &str,
        group_code: &str,
        group_name: Option<&str>,
        period: i32,
    ) {
        let group = group_key(group_code);
        if group.is_empty() {
            return;
        }
        let fact = self.entity(key, "");
        fact.groups.insert(group.clone());
        fact.periods.insert(period);
        fact.group_periods.insert((group, period));
        if let Some(name) = group_name.map(str::trim).filter(|n| !n.is_empty()) {
            fact.group_names.insert(name.to_string());
        }
    }

    pub fn record_event_type(&mut self, key: &str, event_type: &str) {
        let event = normalize(event_type);
        if !event.is_empty() {
            self.entity(key, "").event_types.insert(event);
        }
    }

    pub fn record_peak(&mut self, key: &str, value: f64) {
        let fact = self.entity(key, "");
        if value > fact.peak_event_points {
            fact.peak_event_points = value;
        }
    }

    pub fn set_draft(&mut self, key: &str, mut draft: DraftInfo) {
        draft.group = draft
            .group
            .map(|g| group_key(&g))
            .filter(|g| !g.is_empty());
        self.entity(key, "").draft = Some(draft);
    }

    pub fn set_image_id(&mut self, key: &str, image_id: &str) {
        let id = image_id.trim();
        if !id.is_empty() {
            self.entity(key, "").image_id = Some(id.to_string());
        }
    }

    pub fn merge_achievements(&mut self, key: &str, achievements: &Achievements) {
        self.entity(key, "").achievements.merge(achievements);
    }

    /// Merge curated achievements into every entity whose normalized name
    /// matches a key of `curated`.
    pub fn attach_curated(&mut self, curated: &HashMap<String, Achievements>) -> usize {
        let mut attached = 0;
        for fact in self.facts.values_mut() {
            if let Some(extra) = curated.get(&normalize(&fact.name)) {
                fact.achievements.merge(extra);
                attached += 1;
            }
        }
        attached
    }

    /// Entities sharing a `(group, period)` pair become each other's teammates.
    pub fn link_teammates(&mut self) {
        let mut buckets: HashMap<(String, i32), Vec<String>> = HashMap::new();
        for fact in self.facts.values() {
            for pair in &fact.group_periods {
                buckets.entry(pair.clone()).or_default().push(fact.key.clone());
            }
        }
        let names: HashMap<String, String> = self
            .facts
            .values()
            .map(|f| (f.key.clone(), normalize(&f.name)))
            .collect();
        for members in buckets.values() {
            for a in members {
                let Some(fact) = self.facts.get_mut(a) else { continue };
                for b in members {
                    if a == b {
                        continue;
                    }
                    if let Some(name) = names.get(b).filter(|n| !n.is_empty()) {
                        fact.teammates.insert(name.clone());
                    }
                }
            }
        }
    }

    pub fn build(self) -> FactStore {
        FactStore::from_facts(self.facts.into_values().collect())
    }
}
