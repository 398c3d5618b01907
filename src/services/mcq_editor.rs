use crate::error::{Error, Result};
use crate::models::mcq::{AnswerType, Mcq, QuestionDifficulty};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const MIN_OPTIONS: usize = 2;

/// The question a vendor is composing before it is committed to the test.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct McqDraft {
    pub mcq: Mcq,
}

impl McqDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_question(&mut self, text: impl Into<String>) {
        self.mcq.question = text.into();
    }

    pub fn add_option(&mut self) {
        self.mcq.options.push(String::new());
    }

    pub fn set_option(&mut self, index: usize, text: impl Into<String>) -> Result<()> {
        let len = self.mcq.options.len();
        let slot = self
            .mcq
            .options
            .get_mut(index)
            .ok_or_else(|| Error::BadRequest(format!("Option {} out of range (0..{})", index, len)))?;
        *slot = text.into();
        Ok(())
    }

    /// Switching to single keeps only the lowest marked option so the
    /// single-answer invariant holds immediately.
    pub fn set_answer_type(&mut self, answer_type: AnswerType) {
        self.mcq.answer_type = answer_type;
        if answer_type == AnswerType::Single {
            if let Some(first) = self.mcq.correct_options.first().copied() {
                self.mcq.correct_options = BTreeSet::from([first]);
            }
        }
    }

    pub fn toggle_correct(&mut self, index: usize) -> Result<()> {
        if index >= self.mcq.options.len() {
            return Err(Error::BadRequest(format!(
                "Option {} out of range (0..{})",
                index,
                self.mcq.options.len()
            )));
        }
        match self.mcq.answer_type {
            AnswerType::Single => {
                self.mcq.correct_options = BTreeSet::from([index]);
            }
            AnswerType::Multiple => {
                if !self.mcq.correct_options.remove(&index) {
                    self.mcq.correct_options.insert(index);
                }
            }
        }
        Ok(())
    }

    /// Returns `false` without touching the draft when the option count is
    /// already at the minimum.
    pub fn remove_option(&mut self, index: usize) -> Result<bool> {
        if index >= self.mcq.options.len() {
            return Err(Error::BadRequest(format!(
                "Option {} out of range (0..{})",
                index,
                self.mcq.options.len()
            )));
        }
        if self.mcq.options.len() <= MIN_OPTIONS {
            return Ok(false);
        }

        self.mcq.options.remove(index);
        self.mcq.correct_options = self
            .mcq
            .correct_options
            .iter()
            .filter(|&&i| i != index)
            .map(|&i| if i > index { i - 1 } else { i })
            .collect();
        Ok(true)
    }

    pub fn set_marks(&mut self, marks: u32) -> Result<()> {
        if marks == 0 {
            return Err(Error::BadRequest("Marks must be positive".to_string()));
        }
        self.mcq.marks = marks;
        Ok(())
    }

    pub fn set_difficulty(&mut self, difficulty: QuestionDifficulty) {
        self.mcq.difficulty = difficulty;
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        self.mcq.tags.push(tag.into());
    }

    pub fn remove_tag(&mut self, index: usize) -> Result<()> {
        if index >= self.mcq.tags.len() {
            return Err(Error::BadRequest(format!("Tag {} out of range", index)));
        }
        self.mcq.tags.remove(index);
        Ok(())
    }

    /// Advisory only; the draft's own difficulty is never changed.
    pub fn estimate_difficulty(&self) -> QuestionDifficulty {
        estimate_difficulty(
            self.mcq.question.chars().count(),
            self.mcq.options.len(),
            self.mcq.correct_options.len(),
        )
    }

    /// Hands back the finished question and leaves an empty draft behind.
    /// The caller assigns the id.
    pub fn take_for_commit(&mut self) -> Result<Mcq> {
        if self.mcq.question.trim().is_empty() {
            return Err(Error::BadRequest("Question text is required".to_string()));
        }
        Ok(std::mem::take(&mut self.mcq))
    }
}

pub fn estimate_difficulty(
    question_len: usize,
    option_count: usize,
    correct_count: usize,
) -> QuestionDifficulty {
    let mut score = 0;
    score += if question_len > 100 { 2 } else { 1 };
    score += if option_count > 4 { 2 } else { 1 };
    score += if correct_count > 1 { 2 } else { 0 };

    if score > 4 {
        QuestionDifficulty::Hard
    } else if score > 2 {
        QuestionDifficulty::Medium
    } else {
        QuestionDifficulty::Easy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_with_options(n: usize) -> McqDraft {
        let mut draft = McqDraft::new();
        draft.mcq.options.clear();
        for i in 0..n {
            draft.add_option();
            draft.set_option(i, format!("opt {}", i)).unwrap();
        }
        draft
    }

    #[test]
    fn new_draft_has_two_blank_options() {
        let draft = McqDraft::new();
        assert_eq!(draft.mcq.options, vec![String::new(), String::new()]);
        assert!(draft.mcq.correct_options.is_empty());
    }

    #[test]
    fn set_option_rejects_out_of_bounds() {
        let mut draft = McqDraft::new();
        assert!(draft.set_option(2, "x").is_err());
        assert!(draft.set_option(1, "x").is_ok());
        assert_eq!(draft.mcq.options[1], "x");
    }

    #[test]
    fn remove_option_keeps_minimum_of_two() {
        let mut draft = draft_with_options(2);
        assert!(!draft.remove_option(0).unwrap());
        assert_eq!(draft.mcq.options.len(), 2);
    }

    #[test]
    fn remove_option_shifts_and_purges_correct_indices() {
        let mut draft = draft_with_options(5);
        draft.set_answer_type(AnswerType::Multiple);
        for i in [0, 2, 4] {
            draft.toggle_correct(i).unwrap();
        }

        assert!(draft.remove_option(2).unwrap());
        assert_eq!(draft.mcq.options, vec!["opt 0", "opt 1", "opt 3", "opt 4"]);
        assert_eq!(draft.mcq.correct_options, BTreeSet::from([0, 3]));

        assert!(draft.remove_option(1).unwrap());
        assert_eq!(draft.mcq.correct_options, BTreeSet::from([0, 2]));
        assert_eq!(draft.mcq.options[2], "opt 4");
    }

    #[test]
    fn single_answer_toggle_replaces_selection() {
        let mut draft = draft_with_options(4);
        draft.set_answer_type(AnswerType::Multiple);
        draft.toggle_correct(0).unwrap();
        draft.toggle_correct(1).unwrap();
        assert_eq!(draft.mcq.correct_options.len(), 2);

        draft.set_answer_type(AnswerType::Single);
        assert_eq!(draft.mcq.correct_options, BTreeSet::from([0]));
        draft.toggle_correct(3).unwrap();
        assert_eq!(draft.mcq.correct_options, BTreeSet::from([3]));
        draft.toggle_correct(1).unwrap();
        assert_eq!(draft.mcq.correct_options, BTreeSet::from([1]));
    }

    #[test]
    fn multiple_answer_toggle_flips_membership() {
        let mut draft = draft_with_options(3);
        draft.set_answer_type(AnswerType::Multiple);
        draft.toggle_correct(1).unwrap();
        draft.toggle_correct(2).unwrap();
        draft.toggle_correct(1).unwrap();
        assert_eq!(draft.mcq.correct_options, BTreeSet::from([2]));
    }

    #[test]
    fn switching_to_single_collapses_selection() {
        let mut draft = draft_with_options(3);
        draft.set_answer_type(AnswerType::Multiple);
        draft.toggle_correct(2).unwrap();
        draft.toggle_correct(1).unwrap();
        draft.set_answer_type(AnswerType::Single);
        assert_eq!(draft.mcq.correct_options, BTreeSet::from([1]));
    }

    #[test]
    fn difficulty_heuristic_buckets() {
        assert_eq!(estimate_difficulty(150, 5, 2), QuestionDifficulty::Hard);
        assert_eq!(estimate_difficulty(50, 3, 1), QuestionDifficulty::Easy);
        assert_eq!(estimate_difficulty(150, 3, 1), QuestionDifficulty::Medium);
        assert_eq!(estimate_difficulty(50, 5, 2), QuestionDifficulty::Hard);
        assert_eq!(estimate_difficulty(100, 4, 0), QuestionDifficulty::Easy);
    }

    #[test]
    fn estimate_does_not_touch_draft_difficulty() {
        let mut draft = draft_with_options(5);
        draft.set_question("q".repeat(150));
        draft.set_difficulty(QuestionDifficulty::Easy);
        assert_eq!(draft.estimate_difficulty(), QuestionDifficulty::Medium);
        assert_eq!(draft.mcq.difficulty, QuestionDifficulty::Easy);
    }

    #[test]
    fn tags_allow_duplicates() {
        let mut draft = McqDraft::new();
        draft.add_tag("rust");
        draft.add_tag("rust");
        draft.add_tag("async");
        draft.remove_tag(0).unwrap();
        assert_eq!(draft.mcq.tags, vec!["rust", "async"]);
        assert!(draft.remove_tag(5).is_err());
    }

    #[test]
    fn commit_requires_question_text_and_resets() {
        let mut draft = draft_with_options(3);
        draft.set_question("  ");
        assert!(draft.take_for_commit().is_err());
        assert_eq!(draft.mcq.options.len(), 3);

        draft.set_question("What is ownership?");
        let mcq = draft.take_for_commit().unwrap();
        assert_eq!(mcq.question, "What is ownership?");
        assert_eq!(mcq.options.len(), 3);
        assert_eq!(draft, McqDraft::new());
    }

    #[test]
    fn zero_marks_rejected() {
        let mut draft = McqDraft::new();
        assert!(draft.set_marks(0).is_err());
        draft.set_marks(4).unwrap();
        assert_eq!(draft.mcq.marks, 4);
    }
}
