use serde::{Deserialize, Serialize};

const HEADSHOT_URL: &str = "https://cdn.nba.com/headshots/nba/latest/260x190/{id}.png";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Prompts with fewer relevant candidates are pruned from the catalog.
    pub min_candidates_per_prompt: usize,
    /// Minimum relevant-candidate intersection for every grid cell.
    pub min_intersection_per_cell: usize,
    pub recent_window_periods: i32,
    /// Period the relevance window trails from. Defaults to the latest
    /// period present in the fact store.
    pub anchor_period: Option<i32>,
    pub recent_boards_capacity: usize,
    pub recent_prompts_capacity: usize,
    /// `{id}` is replaced by the entity's numeric image identifier.
    pub image_url_template: String,
    pub grid: GridBudget,
    pub board: BoardRules,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            min_candidates_per_prompt: 5,
            min_intersection_per_cell: 5,
            recent_window_periods: 5,
            anchor_period: None,
            recent_boards_capacity: 5,
            recent_prompts_capacity: 20 * 9,
            image_url_template: HEADSHOT_URL.to_string(),
            grid: GridBudget::default(),
            board: BoardRules::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridBudget {
    pub max_backtrack_solutions: usize,
    /// Search nodes visited before backtracking gives up.
    pub max_backtrack_nodes: usize,
    pub priority_jitter: f64,
    pub weighted_attempts: usize,
    pub greedy_attempts: usize,
    pub exhaustive_pool_3: usize,
    pub exhaustive_pool_4: usize,
    pub final_attempts: usize,
}

impl Default for GridBudget {
    fn default() -> Self {
        GridBudget {
            max_backtrack_solutions: 12,
            max_backtrack_nodes: 200_000,
            priority_jitter: 6.0,
            weighted_attempts: 1000,
            greedy_attempts: 300,
            exhaustive_pool_3: 60,
            exhaustive_pool_4: 40,
            final_attempts: 500,
        }
    }
}

impl GridBudget {
    pub fn exhaustive_pool(&self, size: usize) -> usize {
        if size <= 3 {
            self.exhaustive_pool_3
        } else {
            self.exhaustive_pool_4
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardRules {
    pub attempts: usize,
    pub max_per_category: usize,
    pub max_group_membership: usize,
    pub min_statistical: usize,
    pub max_category_per_line: usize,
}

impl Default for BoardRules {
    fn default() -> Self {
        BoardRules {
            attempts: 500,
            max_per_category: 3,
            max_group_membership: 2,
            min_statistical: 2,
            max_category_per_line: 2,
        }
    }
}
