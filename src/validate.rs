use std::collections::HashSet;

use rand::Rng;
use serde::Serialize;

use crate::fact::{EntityFact, FactStore};
use crate::index::CandidateIndex;
use crate::normalize::{is_numeric_id, normalize};
use crate::predicate::matches;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub key: String,
    pub name: String,
    pub image_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub key: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    EmptyInput,
    UnknownName,
    AlreadyUsed,
    Unsatisfied { prompt_id: String, text: String },
}

impl Rejection {
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::EmptyInput => "empty_input",
            Rejection::UnknownName => "unknown_name",
            Rejection::AlreadyUsed => "already_used",
            Rejection::Unsatisfied { .. } => "unsatisfied",
        }
    }

    pub fn reason(&self) -> String {
        match self {
            Rejection::EmptyInput => "Enter a player name.".to_string(),
            Rejection::UnknownName => "Player not found in dataset.".to_string(),
            Rejection::AlreadyUsed => "Player already used this match.".to_string(),
            Rejection::Unsatisfied { text, .. } => format!("Answer does not satisfy: {text}"),
        }
    }
}

/// Outcome of checking one typed answer. Rejections are ordinary values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted(Answer),
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted(_))
    }
}

/// Image reference for `fact`, falling back to its key when no image id was
/// recorded. Only purely numeric identifiers produce a reference.
pub fn image_ref(fact: &EntityFact, template: &str) -> Option<String> {
    let id = fact.image_id.as_deref().unwrap_or(&fact.key).trim();
    is_numeric_id(id).then(|| template.replace("{id}", id))
}

/// Read-only answer queries over a built store and index.
pub struct Answers<'a> {
    pub store: &'a FactStore,
    pub index: &'a CandidateIndex,
    pub image_url_template: &'a str,
}

impl Answers<'_> {
    fn answer(&self, fact: &EntityFact) -> Answer {
        Answer {
            key: fact.key.clone(),
            name: fact.name.clone(),
            image_ref: image_ref(fact, self.image_url_template),
        }
    }

    /// Checks `name` against every prompt in `prompts`, rejecting on the
    /// first one it fails.
    pub fn validate(&self, name: &str, prompts: &[usize], excluded: &HashSet<String>) -> Verdict {
        if name.trim().is_empty() {
            return Verdict::Rejected(Rejection::EmptyInput);
        }
        let Some(fact) = self.store.by_name(name) else {
            return Verdict::Rejected(Rejection::UnknownName);
        };
        if excluded.contains(&fact.key) {
            return Verdict::Rejected(Rejection::AlreadyUsed);
        }
        for &ix in prompts {
            let prompt = self.index.prompt(ix);
            if !matches(fact, &prompt.predicate) {
                return Verdict::Rejected(Rejection::Unsatisfied {
                    prompt_id: prompt.id.clone(),
                    text: prompt.text.clone(),
                });
            }
        }
        Verdict::Accepted(self.answer(fact))
    }

    fn available(&self, prompts: &[usize], excluded: &HashSet<String>) -> Vec<&EntityFact> {
        self.index
            .shared_candidates(prompts)
            .ones()
            .filter_map(|pos| self.store.get(pos))
            .filter(|fact| !excluded.contains(&fact.key))
            .collect()
    }

    /// A uniformly random unused entity satisfying every prompt.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        prompts: &[usize],
        excluded: &HashSet<String>,
        rng: &mut R,
    ) -> Option<Answer> {
        let available = self.available(prompts, excluded);
        if available.is_empty() {
            return None;
        }
        let fact = available[rng.gen_range(0..available.len())];
        Some(self.answer(fact))
    }

    pub fn possible(
        &self,
        prompts: &[usize],
        excluded: &HashSet<String>,
        limit: usize,
    ) -> Vec<Answer> {
        let mut available = self.available(prompts, excluded);
        available.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.key.cmp(&b.key)));
        available.into_iter().take(limit.max(1)).map(|f| self.answer(f)).collect()
    }

    /// Prefix matches score 3 and substring matches 1, over normalized names.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        let q = normalize(query);
        if q.is_empty() {
            return Vec::new();
        }
        let mut scored: Vec<(u32, &EntityFact)> = self
            .store
            .iter()
            .filter_map(|fact| {
                let n = normalize(&fact.name);
                let mut score = 0;
                if n.starts_with(&q) {
                    score += 3;
                }
                if n.contains(&q) {
                    score += 1;
                }
                (score > 0).then_some((score, fact))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.name.cmp(&b.1.name)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, fact)| SearchHit { key: fact.key.clone(), name: fact.name.clone() })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Category, Difficulty, PromptDefinition};
    use crate::config::EngineConfig;
    use crate::fact::{Achievements, Award, FactStoreBuilder};
    use crate::predicate::Predicate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const TEMPLATE: &str = "https://img.test/{id}.png";

    fn fixture() -> (FactStore, CandidateIndex) {
        let mut b = FactStoreBuilder::new();
        for (key, name, groups) in [
            ("2544", "LeBron James", &["LAL", "MIA", "CLE"][..]),
            ("201939", "Stephen Curry", &["GSW"][..]),
            ("203507", "Giannis Antetokounmpo", &["MIL"][..]),
            ("1628983", "Shai Gilgeous-Alexander", &["LAC", "OKC"][..]),
            ("curry-seth", "Seth Curry", &["LAL", "GSW", "BKN"][..]),
            ("2", "Luka Dončić", &["DAL", "LAL"][..]),
        ] {
            b.entity(key, name);
            for g in groups {
                b.record_group_period(key, g, None, 2024);
            }
        }
        b.merge_achievements("2544", &Achievements::with(&[Award::Champion, Award::Mvp], 4));
        b.merge_achievements("201939", &Achievements::with(&[Award::Champion, Award::Mvp], 4));
        b.set_image_id("201939", "201939");
        let store = b.build();

        let team = |code: &str| Predicate { group: Some(code.into()), ..Predicate::default() };
        let champion = Predicate { awards: [Award::Champion].into(), ..Predicate::default() };
        let prompt = |id: &str, text: &str, predicate: Predicate| {
            PromptDefinition::new(id, Category::GroupMembership, Difficulty::Easy, text, predicate)
        };
        let catalog = Catalog::new(vec![
            prompt("lal", "Played for the Lakers", team("LAL")),
            prompt("bos", "Played for the Celtics", team("BOS")),
            prompt("champ", "NBA Champion", champion),
        ])
        .unwrap();
        let config = EngineConfig { min_candidates_per_prompt: 0, ..EngineConfig::default() };
        let index = CandidateIndex::build(&store, &catalog, &config);
        (store, index)
    }

    fn answers<'a>(store: &'a FactStore, index: &'a CandidateIndex) -> Answers<'a> {
        Answers { store, index, image_url_template: TEMPLATE }
    }

    #[test]
    fn accepts_and_then_rejects_once_used() {
        let (store, index) = fixture();
        let a = answers(&store, &index);
        let prompts = [index.position("lal").unwrap(), index.position("champ").unwrap()];
        let mut used = HashSet::new();

        let answer = match a.validate("lebron  JAMES!", &prompts, &used) {
            Verdict::Accepted(answer) => answer,
            other => panic!("expected acceptance, got {other:?}"),
        };
        assert_eq!(answer.name, "LeBron James");
        assert_eq!(answer.image_ref.as_deref(), Some("https://img.test/2544.png"));

        used.insert(answer.key);
        let again = a.validate("LeBron James", &prompts, &used);
        assert_eq!(again, Verdict::Rejected(Rejection::AlreadyUsed));
        assert_eq!(Rejection::AlreadyUsed.reason(), "Player already used this match.");
    }

    #[test]
    fn rejection_names_the_failing_prompt() {
        let (store, index) = fixture();
        let a = answers(&store, &index);
        let bos = index.position("bos").unwrap();
        let none = HashSet::new();
        let Verdict::Rejected(rejection) = a.validate("LeBron James", &[bos], &none) else {
            panic!("expected rejection");
        };
        assert_eq!(rejection.code(), "unsatisfied");
        assert_eq!(rejection.reason(), "Answer does not satisfy: Played for the Celtics");
        assert_eq!(a.validate("   ", &[bos], &none), Verdict::Rejected(Rejection::EmptyInput));
        assert_eq!(a.validate("Nobody", &[bos], &none), Verdict::Rejected(Rejection::UnknownName));
    }

    #[test]
    fn diacritics_do_not_matter() {
        let (store, index) = fixture();
        let a = answers(&store, &index);
        let lal = index.position("lal").unwrap();
        assert!(a.validate("Luka Doncic", &[lal], &HashSet::new()).is_accepted());
    }

    #[test]
    fn image_refs_need_numeric_ids() {
        let (store, _) = fixture();
        let seth = store.by_key("curry-seth").unwrap();
        assert_eq!(image_ref(seth, TEMPLATE), None);
        let steph = store.by_key("201939").unwrap();
        assert_eq!(image_ref(steph, TEMPLATE).as_deref(), Some("https://img.test/201939.png"));
    }

    #[test]
    fn sample_and_possible_use_the_intersection() {
        let (store, index) = fixture();
        let a = answers(&store, &index);
        let prompts = [index.position("lal").unwrap(), index.position("champ").unwrap()];
        let mut rng = StdRng::seed_from_u64(9);
        assert_eq!(a.sample(&prompts, &HashSet::new(), &mut rng).unwrap().name, "LeBron James");
        let used: HashSet<String> = ["2544".to_string()].into();
        assert_eq!(a.sample(&prompts, &used, &mut rng), None);

        let lal = [index.position("lal").unwrap()];
        let names: Vec<String> =
            a.possible(&lal, &HashSet::new(), 10).into_iter().map(|x| x.name).collect();
        assert_eq!(names, vec!["LeBron James", "Luka Dončić", "Seth Curry"]);
        assert_eq!(a.possible(&lal, &HashSet::new(), 0).len(), 1);
    }

    #[test]
    fn search_ranks_prefix_matches_first() {
        let (store, index) = fixture();
        let a = answers(&store, &index);
        let hits: Vec<String> = a.search("curry", 5).into_iter().map(|h| h.name).collect();
        assert_eq!(hits, vec!["Seth Curry", "Stephen Curry"]);
        let hits: Vec<String> = a.search("Steph", 5).into_iter().map(|h| h.name).collect();
        assert_eq!(hits, vec!["Stephen Curry"]);
        assert!(a.search("!!", 5).is_empty());
    }
}
