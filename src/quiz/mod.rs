pub mod generate;
pub mod session;

pub use generate::generate_questions;
pub use session::{QuizSession, Score};

pub const MIN_QUESTIONS: u32 = 1;
pub const MAX_QUESTIONS: u32 = 50;

/// Option letters in display order
pub const LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

pub fn clamp_question_count(n: u32) -> u32 {
    n.clamp(MIN_QUESTIONS, MAX_QUESTIONS)
}

/// A normalized multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub question: String,
    /// Exactly four options, A to D
    pub options: Vec<String>,
    /// Sorted, deduplicated letters of the correct options
    pub answer: Vec<char>,
    /// Short excerpt of the source text used to find the explanation
    pub explanation_cue: String,
}

impl Question {
    pub fn correct_indices(&self) -> Vec<usize> {
        self.answer
            .iter()
            .filter_map(|l| LETTERS.iter().position(|c| c == l))
            .collect()
    }

    /// Texts of the correct options, sorted
    pub fn correct_texts(&self) -> Vec<String> {
        let mut texts: Vec<String> = self
            .correct_indices()
            .into_iter()
            .filter_map(|i| self.options.get(i).cloned())
            .collect();
        texts.sort();
        texts
    }

    /// "Select 1 correct answer." / "Select 2 correct answers."
    pub fn instruction(&self) -> String {
        let n = self.answer.len();
        format!(
            "Select {} correct answer{}.",
            n,
            if n > 1 { "s" } else { "" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(answer: &[char]) -> Question {
        Question {
            question: "Which are relational stores?".to_string(),
            options: vec![
                "SQL Database".to_string(),
                "Blob Storage".to_string(),
                "Cosmos DB".to_string(),
                "PostgreSQL".to_string(),
            ],
            answer: answer.to_vec(),
            explanation_cue: String::new(),
        }
    }

    #[test]
    fn test_correct_texts_sorted() {
        let q = question(&['A', 'D']);
        assert_eq!(q.correct_indices(), vec![0, 3]);
        assert_eq!(q.correct_texts(), vec!["PostgreSQL", "SQL Database"]);
    }

    #[test]
    fn test_instruction_pluralization() {
        assert_eq!(question(&['C']).instruction(), "Select 1 correct answer.");
        assert_eq!(
            question(&['A', 'B']).instruction(),
            "Select 2 correct answers."
        );
    }

    #[test]
    fn test_clamp_question_count() {
        assert_eq!(clamp_question_count(0), 1);
        assert_eq!(clamp_question_count(10), 10);
        assert_eq!(clamp_question_count(99), 50);
    }
}
