use std::collections::{HashSet, VecDeque};

/// Bounded memory of recently served boards and prompt ids.
///
/// Only used to bias pool selection; solvers fall back to the full pool when
/// avoiding recent prompts would leave too few to choose from.
#[derive(Debug, Clone)]
pub struct RecencyHistory {
    boards: VecDeque<Vec<String>>,
    prompts: VecDeque<String>,
    board_capacity: usize,
    prompt_capacity: usize,
}

impl RecencyHistory {
    pub fn new(board_capacity: usize, prompt_capacity: usize) -> Self {
        RecencyHistory {
            boards: VecDeque::with_capacity(board_capacity),
            prompts: VecDeque::with_capacity(prompt_capacity),
            board_capacity,
            prompt_capacity,
        }
    }

    /// Newest board first; the newest board's ids lead the prompt FIFO.
    pub fn record(&mut self, prompt_ids: &[String]) {
        self.boards.push_front(prompt_ids.to_vec());
        self.boards.truncate(self.board_capacity);
        for id in prompt_ids.iter().rev() {
            self.prompts.push_front(id.clone());
        }
        self.prompts.truncate(self.prompt_capacity);
    }

    pub fn boards(&self) -> impl Iterator<Item = &[String]> {
        self.boards.iter().map(Vec::as_slice)
    }

    pub fn recent_prompts(&self) -> impl Iterator<Item = &str> {
        self.prompts.iter().map(String::as_str)
    }

    pub fn board_ids(&self) -> HashSet<&str> {
        self.boards.iter().flatten().map(String::as_str).collect()
    }

    pub fn prompt_ids(&self) -> HashSet<&str> {
        self.recent_prompts().collect()
    }

    pub fn clear(&mut self) {
        self.boards.clear();
        self.prompts.clear();
    }
}

impl Default for RecencyHistory {
    fn default() -> Self {
        RecencyHistory::new(5, 180)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(range: std::ops::Range<usize>) -> Vec<String> {
        range.map(|i| format!("p{i}")).collect()
    }

    #[test]
    fn keeps_last_boards_newest_first() {
        let mut h = RecencyHistory::new(2, 100);
        h.record(&ids(0..3));
        h.record(&ids(3..6));
        h.record(&ids(6..9));
        let boards: Vec<&[String]> = h.boards().collect();
        assert_eq!(boards.len(), 2);
        assert_eq!(boards[0][0], "p6");
        assert_eq!(boards[1][0], "p3");
        assert!(!h.board_ids().contains("p0"));
        assert!(h.prompt_ids().contains("p0"));
    }

    #[test]
    fn prompt_fifo_is_bounded_and_ordered() {
        let mut h = RecencyHistory::new(5, 4);
        h.record(&ids(0..3));
        h.record(&ids(3..6));
        let recent: Vec<&str> = h.recent_prompts().collect();
        assert_eq!(recent, vec!["p3", "p4", "p5", "p0"]);
        h.clear();
        assert_eq!(h.recent_prompts().count(), 0);
    }
}
