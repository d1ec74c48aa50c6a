use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::fact::{Award, Stat};
use crate::predicate::{Field, Predicate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    GroupMembership,
    Achievement,
    Draft,
    Statistical,
    Compound,
    ExpertCompound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub fn weight(self) -> u32 {
        match self {
            Difficulty::Easy => 5,
            Difficulty::Medium => 3,
            Difficulty::Hard => 2,
            Difficulty::Expert => 1,
        }
    }
}

/// Shape of a prompt: its category plus the set of constraint fields it uses.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Archetype {
    pub category: Category,
    pub fields: BTreeSet<Field>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptDefinition {
    pub id: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub weight: u32,
    pub text: String,
    pub predicate: Predicate,
}

impl PromptDefinition {
    pub fn new(
        id: &str,
        category: Category,
        difficulty: Difficulty,
        text: &str,
        predicate: Predicate,
    ) -> Self {
        PromptDefinition {
            id: id.to_string(),
            category,
            difficulty,
            weight: difficulty.weight(),
            text: text.to_string(),
            predicate,
        }
    }

    pub fn archetype(&self) -> Archetype {
        Archetype {
            category: self.category,
            fields: self.predicate.fields(),
        }
    }

    /// Pure "belongs to group X" prompts may share an archetype within a grid.
    pub fn is_duplicable(&self) -> bool {
        if self.category != Category::GroupMembership {
            return false;
        }
        let fields = self.predicate.fields();
        fields.len() == 1 && fields.contains(&Field::Group)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    prompts: Vec<PromptDefinition>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(prompts: Vec<PromptDefinition>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(prompts.len());
        for (pos, prompt) in prompts.iter().enumerate() {
            if prompt.id.trim().is_empty() {
                return Err(EngineError::malformed("prompt with empty id"));
            }
            if by_id.insert(prompt.id.clone(), pos).is_some() {
                let message = format!("duplicate prompt id \"{}\"", prompt.id);
                return Err(EngineError::malformed(message));
            }
        }
        Ok(Catalog { prompts, by_id })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let prompts: Vec<PromptDefinition> = serde_json::from_str(json)?;
        Catalog::new(prompts)
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&PromptDefinition> {
        self.by_id.get(id).map(|&pos| &self.prompts[pos])
    }

    pub fn prompts(&self) -> &[PromptDefinition] {
        &self.prompts
    }

    pub fn into_prompts(self) -> Vec<PromptDefinition> {
        self.prompts
    }

    /// The built-in basketball catalog.
    pub fn default_catalog() -> Self {
        let prompts = default_prompts()
            .into_iter()
            .filter(|p| p.predicate.groups_all.as_ref().map_or(true, |g| g.is_empty()))
            .collect();
        Catalog::first_of_each_id(prompts)
    }

    /// Keeps the first prompt per id, logging the rest.
    fn first_of_each_id(prompts: Vec<PromptDefinition>) -> Self {
        let mut by_id = HashMap::with_capacity(prompts.len());
        let mut kept = Vec::with_capacity(prompts.len());
        for prompt in prompts {
            if by_id.contains_key(&prompt.id) {
                tracing::error!(id = %prompt.id, "duplicate built-in prompt id, keeping the first");
                continue;
            }
            by_id.insert(prompt.id.clone(), kept.len());
            kept.push(prompt);
        }
        Catalog { prompts: kept, by_id }
    }
}

const FRANCHISES: &[(&str, &str)] = &[
    ("LAL", "Los Angeles Lakers"),
    ("BOS", "Boston Celtics"),
    ("CHI", "Chicago Bulls"),
    ("GSW", "Golden State Warriors"),
    ("MIA", "Miami Heat"),
    ("SAS", "San Antonio Spurs"),
    ("DAL", "Dallas Mavericks"),
    ("PHX", "Phoenix Suns"),
    ("NYK", "New York Knicks"),
    ("TOR", "Toronto Raptors"),
    ("BKN", "Brooklyn Nets"),
    ("DEN", "Denver Nuggets"),
    ("OKC", "Oklahoma City Thunder"),
    ("LAC", "Los Angeles Clippers"),
    ("HOU", "Houston Rockets"),
    ("SAC", "Sacramento Kings"),
    ("DET", "Detroit Pistons"),
    ("IND", "Indiana Pacers"),
    ("ATL", "Atlanta Hawks"),
    ("ORL", "Orlando Magic"),
    ("MIN", "Minnesota Timberwolves"),
    ("POR", "Portland Trail Blazers"),
    ("UTA", "Utah Jazz"),
    ("CHA", "Charlotte Hornets"),
    ("NOP", "New Orleans Pelicans"),
    ("WAS", "Washington Wizards"),
    ("MEM", "Memphis Grizzlies"),
    ("CLE", "Cleveland Cavaliers"),
    ("PHI", "Philadelphia 76ers"),
    ("MIL", "Milwaukee Bucks"),
];

fn team(code: &str) -> Predicate {
    Predicate { group: Some(code.to_string()), ..Predicate::default() }
}

fn award(a: Award) -> Predicate {
    Predicate { awards: [a].into(), ..Predicate::default() }
}

fn never(a: Award) -> Predicate {
    Predicate { never: [a].into(), ..Predicate::default() }
}

fn rate(stat: Stat, min: f64) -> Predicate {
    Predicate { season_rate: [(stat, min)].into(), ..Predicate::default() }
}

fn peak(min: f64) -> Predicate {
    Predicate { peak_points: Some(min), ..Predicate::default() }
}

fn seasons(min: u32) -> Predicate {
    Predicate { periods_at_least: Some(min), ..Predicate::default() }
}

fn pick(n: u32) -> Predicate {
    Predicate { draft_overall_eq: Some(n), ..Predicate::default() }
}

fn pick_at_most(n: u32) -> Predicate {
    Predicate { draft_overall_at_most: Some(n), ..Predicate::default() }
}

fn drafted_by(code: &str) -> Predicate {
    Predicate { drafted_by: Some(code.to_string()), ..Predicate::default() }
}

fn one_team() -> Predicate {
    Predicate { one_group: true, ..Predicate::default() }
}

fn teams_at_least(n: u32) -> Predicate {
    Predicate { groups_at_least: Some(n), ..Predicate::default() }
}

fn playoffs() -> Predicate {
    Predicate { playoffs: true, ..Predicate::default() }
}

fn career_points(min: f64) -> Predicate {
    Predicate { career_points_rate_at_least: Some(min), ..Predicate::default() }
}

fn undrafted() -> Predicate {
    Predicate { undrafted: true, ..Predicate::default() }
}

/// Conjunction of two predicates; on a conflicting scalar field `a` wins.
fn both(a: Predicate, b: Predicate) -> Predicate {
    let mut season_rate = b.season_rate;
    season_rate.extend(a.season_rate);
    let mut awards = a.awards;
    awards.extend(b.awards);
    let mut never = a.never;
    never.extend(b.never);
    Predicate {
        group: a.group.or(b.group),
        groups_all: a.groups_all.or(b.groups_all),
        teammate: a.teammate.or(b.teammate),
        teammates_all: a.teammates_all.or(b.teammates_all),
        season_rate,
        peak_points: a.peak_points.or(b.peak_points),
        periods_at_least: a.periods_at_least.or(b.periods_at_least),
        draft_overall_eq: a.draft_overall_eq.or(b.draft_overall_eq),
        draft_overall_at_most: a.draft_overall_at_most.or(b.draft_overall_at_most),
        draft_round_eq: a.draft_round_eq.or(b.draft_round_eq),
        undrafted: a.undrafted || b.undrafted,
        draft_period: a.draft_period.or(b.draft_period),
        drafted_by: a.drafted_by.or(b.drafted_by),
        playoffs: a.playoffs || b.playoffs,
        one_group: a.one_group || b.one_group,
        groups_at_least: a.groups_at_least.or(b.groups_at_least),
        career_points_rate_at_least: a
            .career_points_rate_at_least
            .or(b.career_points_rate_at_least),
        championships_at_least: a.championships_at_least.or(b.championships_at_least),
        awards,
        never,
    }
}

fn default_prompts() -> Vec<PromptDefinition> {
    use Award::*;
    use Category::*;
    use Difficulty::*;
    use Stat::*;

    let mut out = Vec::new();
    let mut push = |id: &str, category, difficulty, text: &str, predicate| {
        out.push(PromptDefinition::new(id, category, difficulty, text, predicate));
    };

    for (code, name) in FRANCHISES {
        let id = format!("team_{}", code.to_lowercase());
        push(&id, GroupMembership, Easy, &format!("Played for the {name}"), team(code));
    }

    for (id, text, a) in [
        ("award_champion", "NBA Champion", Champion),
        ("award_mvp", "League MVP", Mvp),
        ("award_roty", "Rookie of the Year", Roty),
        ("award_all_star", "All-Star", AllStar),
        ("award_finals_mvp", "Finals MVP", FinalsMvp),
        ("award_dpoy", "Defensive Player of the Year", Dpoy),
        ("award_sixth_man", "Sixth Man of the Year", SixthMan),
        ("award_mip", "Most Improved Player", Mip),
        ("award_all_nba", "All-NBA selection", AllNba),
        ("award_olympic_gold", "Olympic Gold Medalist", OlympicGold),
        ("award_hof", "Hall of Famer", Hof),
        ("award_scoring", "Scoring Champion", ScoringChampion),
        ("award_assist_lead", "Assist Leader", AssistLeader),
        ("award_rebound_lead", "Rebound Leader", ReboundLeader),
    ] {
        push(id, Achievement, Easy, text, award(a));
    }

    for (id, text, min) in [
        ("stat_50_game", "50+ point game", 50.0),
        ("stat_40_game", "40+ point game", 40.0),
        ("stat_30_game", "30+ point game", 30.0),
    ] {
        push(id, Statistical, Easy, text, peak(min));
    }
    for (id, text, stat, min, difficulty) in [
        ("stat_20_ppg", "20+ PPG season", Points, 20.0, Easy),
        ("stat_15_ppg", "15+ PPG season", Points, 15.0, Easy),
        ("stat_10_rpg", "10+ RPG season", Rebounds, 10.0, Easy),
        ("stat_8_rpg", "8+ RPG season", Rebounds, 8.0, Easy),
        ("stat_8_apg", "8+ APG season", Assists, 8.0, Easy),
        ("stat_6_apg", "6+ APG season", Assists, 6.0, Easy),
        ("stat_35_3pt", "35%+ 3PT season", ThreePointPct, 0.35, Easy),
        ("stat_38_3pt", "38%+ 3PT season", ThreePointPct, 0.38, Easy),
        ("stat_25_ppg", "25+ PPG season", Points, 25.0, Medium),
        ("stat_22_ppg", "22+ PPG season", Points, 22.0, Medium),
        ("stat_27_ppg", "27+ PPG season", Points, 27.0, Medium),
        ("stat_10_apg", "10+ APG season", Assists, 10.0, Medium),
        ("stat_9_apg", "9+ APG season", Assists, 9.0, Medium),
        ("stat_12_rpg", "12+ RPG season", Rebounds, 12.0, Medium),
        ("stat_11_rpg", "11+ RPG season", Rebounds, 11.0, Medium),
        ("stat_40_3pt", "40%+ 3PT season", ThreePointPct, 0.40, Medium),
        ("stat_45_3pt", "45%+ 3PT season", ThreePointPct, 0.45, Medium),
    ] {
        push(id, Statistical, difficulty, text, rate(stat, min));
    }
    for (id, text, a, b) in [
        (
            "stat_triple_double_style",
            "10+ APG and 10+ RPG season",
            (Assists, 10.0), (Rebounds, 10.0),
        ),
        (
            "stat_double_double_style",
            "20+ PPG and 10+ RPG season",
            (Points, 20.0), (Rebounds, 10.0),
        ),
        ("stat_guard_star_style", "25+ PPG and 8+ APG season", (Points, 25.0), (Assists, 8.0)),
        ("stat_wing_star_style", "27+ PPG and 8+ RPG season", (Points, 27.0), (Rebounds, 8.0)),
    ] {
        push(id, Statistical, Medium, text, both(rate(a.0, a.1), rate(b.0, b.1)));
    }

    push("career_10_seasons", Statistical, Easy, "Played 10+ seasons", seasons(10));
    for (id, text, min) in [
        ("career_15_seasons", "Played 15+ seasons", 15),
        ("career_8_seasons", "Played 8+ seasons", 8),
        ("career_12_seasons", "Played 12+ seasons", 12),
    ] {
        push(id, Statistical, Medium, text, seasons(min));
    }
    push("career_one_team", Statistical, Medium, "Played only for one team", one_team());
    push("career_five_teams", Statistical, Medium, "Played for 5+ teams", teams_at_least(5));
    push("career_three_teams", Statistical, Medium, "Played for 3+ teams", teams_at_least(3));
    push("career_finals", Statistical, Medium, "Played in NBA Finals", playoffs());

    push("draft_1_pick", Draft, Medium, "#1 Overall Pick", pick(1));
    push("draft_top5", Draft, Medium, "Top 5 Pick", pick_at_most(5));
    push("draft_lottery", Draft, Medium, "Lottery Pick", pick_at_most(14));
    let second_round = Predicate { draft_round_eq: Some(2), ..Predicate::default() };
    push("draft_second_round", Draft, Medium, "Second Round Pick", second_round);
    push("draft_undrafted", Draft, Medium, "Undrafted Player", undrafted());
    for year in [2003, 2009, 2012, 2015, 2018, 2020] {
        let predicate = Predicate { draft_period: Some(year), ..Predicate::default() };
        push(&format!("draft_{year}"), Draft, Medium, &format!("Drafted in {year}"), predicate);
    }
    for (slug, code, name) in [
        ("lakers", "LAL", "Lakers"),
        ("cavs", "CLE", "Cavaliers"),
        ("bulls", "CHI", "Bulls"),
        ("celtics", "BOS", "Celtics"),
        ("warriors", "GSW", "Warriors"),
        ("knicks", "NYK", "Knicks"),
        ("spurs", "SAS", "Spurs"),
        ("heat", "MIA", "Heat"),
    ] {
        let text = format!("Drafted by the {name}");
        push(&format!("draft_by_{slug}"), Draft, Medium, &text, drafted_by(code));
    }

    let combos: Vec<(&str, &str, Predicate)> = vec![
        ("combo_champ_spurs", "Champion with the Spurs", both(team("SAS"), award(Champion))),
        ("combo_champ_lakers", "Champion with the Lakers", both(team("LAL"), award(Champion))),
        ("combo_champ_heat", "Champion with the Heat", both(team("MIA"), award(Champion))),
        ("combo_mvp_thunder", "MVP with the Thunder", both(team("OKC"), award(Mvp))),
        ("combo_mvp_bucks", "MVP with the Bucks", both(team("MIL"), award(Mvp))),
        ("combo_allstar_celtics", "All-Star with the Celtics", both(team("BOS"), award(AllStar))),
        ("combo_allstar_lakers", "All-Star with the Lakers", both(team("LAL"), award(AllStar))),
        ("combo_allstar_knicks", "All-Star with the Knicks", both(team("NYK"), award(AllStar))),
        ("combo_25ppg_suns", "25+ PPG with the Suns", both(team("PHX"), rate(Points, 25.0))),
        ("combo_22ppg_celtics", "22+ PPG with the Celtics", both(team("BOS"), rate(Points, 22.0))),
        ("combo_22ppg_rockets", "22+ PPG with the Rockets", both(team("HOU"), rate(Points, 22.0))),
        ("combo_10apg_hawks", "10+ APG with the Hawks", both(team("ATL"), rate(Assists, 10.0))),
        ("combo_8apg_clippers", "8+ APG with the Clippers", both(team("LAC"), rate(Assists, 8.0))),
        (
            "combo_40pt3_warriors",
            "40%+ 3PT with the Warriors",
            both(team("GSW"), rate(ThreePointPct, 0.40)),
        ),
        (
            "combo_35pt3_heat",
            "35%+ 3PT with the Heat",
            both(team("MIA"), rate(ThreePointPct, 0.35)),
        ),
        ("combo_50pt_knicks", "50+ point game with the Knicks", both(team("NYK"), peak(50.0))),
        ("combo_pick1_cavs", "#1 Pick drafted by Cavaliers", both(pick(1), drafted_by("CLE"))),
        (
            "combo_draft_lottery_mavs",
            "Lottery pick drafted by Mavericks",
            both(pick_at_most(14), drafted_by("DAL")),
        ),
        ("combo_champion_allstar", "Champion and All-Star", both(award(Champion), award(AllStar))),
        ("combo_champion_allnba", "Champion and All-NBA", both(award(Champion), award(AllNba))),
        ("combo_mvp_allnba", "MVP and All-NBA", both(award(Mvp), award(AllNba))),
        ("combo_mvp_scoring", "MVP and Scoring Champion", both(award(Mvp), award(ScoringChampion))),
        ("combo_dpoy_allstar", "DPOY and All-Star", both(award(Dpoy), award(AllStar))),
        (
            "combo_champion_finals_mvp",
            "Champion and Finals MVP",
            both(award(Champion), award(FinalsMvp)),
        ),
        ("combo_champion_dpoy", "Champion and DPOY", both(award(Champion), award(Dpoy))),
        ("combo_lakers_30_game", "30+ point game with the Lakers", both(team("LAL"), peak(30.0))),
        ("combo_bulls_40_game", "40+ point game with the Bulls", both(team("CHI"), peak(40.0))),
        (
            "combo_warriors_30_game",
            "30+ point game with the Warriors",
            both(team("GSW"), peak(30.0)),
        ),
        ("combo_knicks_allnba", "All-NBA with the Knicks", both(team("NYK"), award(AllNba))),
        ("combo_celtics_allnba", "All-NBA with the Celtics", both(team("BOS"), award(AllNba))),
        ("combo_heat_allnba", "All-NBA with the Heat", both(team("MIA"), award(AllNba))),
        ("combo_cavs_allstar", "All-Star with the Cavaliers", both(team("CLE"), award(AllStar))),
        ("combo_suns_allstar", "All-Star with the Suns", both(team("PHX"), award(AllStar))),
    ];
    for (id, text, predicate) in combos {
        push(id, Compound, Hard, text, predicate);
    }

    let experts: Vec<(&str, &str, Predicate)> = vec![
        (
            "expert_27_no_mvp",
            "Averaged 27+ PPG but never MVP",
            both(rate(Points, 27.0), never(Mvp)),
        ),
        (
            "expert_champ_no_allstar",
            "Champion but never All-Star",
            both(award(Champion), never(AllStar)),
        ),
        ("expert_pick1_no_allstar", "#1 Pick but never All-Star", both(pick(1), never(AllStar))),
        (
            "expert_allstar_no_champ",
            "All-Star but never Champion",
            both(award(AllStar), never(Champion)),
        ),
        (
            "expert_hof_no_ring",
            "Hall of Famer without championship",
            both(award(Hof), never(Champion)),
        ),
        (
            "expert_20_no_allnba",
            "20+ PPG career but never All-NBA",
            both(career_points(20.0), never(AllNba)),
        ),
        (
            "expert_15_one_team",
            "Played 15+ seasons with one team",
            both(seasons(15), one_team()),
        ),
        (
            "expert_two_team_champ",
            "Won championship with two different teams",
            Predicate { championships_at_least: Some(2), ..Predicate::default() },
        ),
        (
            "expert_30_ppg_never_mvp",
            "30+ PPG season but never MVP",
            both(rate(Points, 30.0), never(Mvp)),
        ),
        (
            "expert_allstar_no_allnba",
            "All-Star but never All-NBA",
            both(award(AllStar), never(AllNba)),
        ),
        (
            "expert_scoring_no_ring",
            "Scoring Champion without a title",
            both(award(ScoringChampion), never(Champion)),
        ),
        ("expert_undrafted_allstar", "Undrafted and All-Star", both(undrafted(), award(AllStar))),
        ("expert_undrafted_champion", "Undrafted and Champion", both(undrafted(), award(Champion))),
        ("expert_pick1_champion", "#1 Pick and Champion", both(pick(1), award(Champion))),
        ("expert_pick1_mvp", "#1 Pick and MVP", both(pick(1), award(Mvp))),
        (
            "expert_allnba_no_ring",
            "All-NBA but never Champion",
            both(award(AllNba), never(Champion)),
        ),
        ("expert_allstar_no_mvp", "All-Star but never MVP", both(award(AllStar), never(Mvp))),
        (
            "expert_25_10_star",
            "25+ PPG and 10+ APG season",
            both(rate(Points, 25.0), rate(Assists, 10.0)),
        ),
        (
            "expert_30_8_star",
            "30+ PPG and 8+ RPG season",
            both(rate(Points, 30.0), rate(Rebounds, 8.0)),
        ),
        (
            "expert_20_10_10_style",
            "20+ PPG, 10+ APG and 10+ RPG season",
            both(rate(Points, 20.0), both(rate(Assists, 10.0), rate(Rebounds, 10.0))),
        ),
    ];
    for (id, text, predicate) in experts {
        push(id, ExpertCompound, Expert, text, predicate);
    }

    out
}
