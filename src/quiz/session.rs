use super::Question;

pub const EXPLANATION_NOT_FOUND: &str = "Context not found in the original text.";

/// Outcome of one answered question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub question: String,
    /// Selected option texts, sorted
    pub selected: Vec<String>,
    /// Correct option texts, sorted
    pub correct: Vec<String>,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub wrong: usize,
    pub total: usize,
}

impl Score {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64 * 100.0
        }
    }
}

/// A quiz in progress: walks the questions in order and collects answers
#[derive(Debug)]
pub struct QuizSession {
    /// Label recorded in the results, a file name or a whole-chapter label
    pub source: String,
    /// The text the questions were generated from
    pub content: String,
    questions: Vec<Question>,
    index: usize,
    answers: Vec<AnswerRecord>,
}

impl QuizSession {
    pub fn new(source: impl Into<String>, content: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
            questions,
            index: 0,
            answers: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.index)
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    /// Whether the current question has already been answered
    pub fn is_answered(&self) -> bool {
        self.answers.len() > self.index
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.questions.len()
    }

    pub fn is_finished(&self) -> bool {
        self.answers.len() >= self.questions.len()
    }

    /// Record the answer to the current question. `selected` holds option
    /// indices; the answer is correct when the chosen texts match the
    /// correct texts exactly. Returns `None` once the quiz is over or if the
    /// current question was already answered.
    pub fn submit(&mut self, selected: &[usize]) -> Option<&AnswerRecord> {
        if self.is_answered() {
            return None;
        }
        let q = self.questions.get(self.index)?;

        let mut chosen: Vec<String> = selected
            .iter()
            .filter_map(|&i| q.options.get(i).cloned())
            .collect();
        chosen.sort();
        chosen.dedup();

        let correct = q.correct_texts();
        let is_correct = chosen == correct;

        self.answers.push(AnswerRecord {
            question: q.question.clone(),
            selected: chosen,
            correct,
            is_correct,
        });
        self.answers.last()
    }

    /// Move to the next question; false when there is none or the current
    /// one has not been answered yet
    pub fn advance(&mut self) -> bool {
        if self.is_last() || !self.is_answered() {
            return false;
        }
        self.index += 1;
        true
    }

    /// Wrong answers count every question not answered correctly
    pub fn score(&self) -> Score {
        let correct = self.answers.iter().filter(|a| a.is_correct).count();
        let total = self.questions.len();
        Score {
            correct,
            wrong: total - correct,
            total,
        }
    }

    pub fn explanation_for_current(&self) -> String {
        self.current()
            .map(|q| find_explanation(&self.content, &q.explanation_cue))
            .unwrap_or_else(|| EXPLANATION_NOT_FOUND.to_string())
    }
}

/// First blank-line separated paragraph containing `cue`
pub fn find_explanation(full_text: &str, cue: &str) -> String {
    full_text
        .split("\n\n")
        .find(|p| p.contains(cue))
        .map(|p| p.trim().to_string())
        .unwrap_or_else(|| EXPLANATION_NOT_FOUND.to_string())
}
