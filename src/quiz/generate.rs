//! Question generation: prompt construction and normalization of the
//! model's JSON output into [`Question`]s.

use anyhow::Result;
use serde_json::Value;
use thiserror::Error;

use super::{LETTERS, Question};
use crate::llm::{ChatClient, Message};

pub const SYSTEM_PROMPT: &str =
    "You are a test generator. Output EXCLUSIVELY valid JSON (an array).";

const REQUIRED_KEYS: [&str; 4] = ["question", "options", "answer", "explanation_cue"];

#[derive(Debug, Error)]
pub enum QuestionError {
    #[error("could not find a JSON array in the API response")]
    NoArray,
    #[error("the API response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("the API response is not a JSON array")]
    NotArray,
    #[error("the API returned no questions")]
    Empty,
    #[error("item {index}: expected an object")]
    NotObject { index: usize },
    #[error("item {index}: missing key '{key}'")]
    MissingKey { index: usize, key: &'static str },
    #[error("item {index}: 'question' must be a string")]
    QuestionText { index: usize },
    #[error("item {index}: 'options' must have 4 items")]
    Options { index: usize },
    #[error("item {index}: 'answer' must be an array of letters")]
    AnswerShape { index: usize },
    #[error("item {index}: invalid answer value: {value:?}")]
    AnswerValue { index: usize, value: String },
}

/// Build the user prompt asking for exactly `n` questions about `content`
pub fn build_prompt(content: &str, n: u32) -> String {
    format!(
        r#"Reply ONLY with a JSON array (no text outside the array). The array must contain exactly {n} objects.
Each object has the keys:
- "question": string
- "options": array of 4 strings, in order A, B, C, D
- "answer": array of correct letters, each one of ["A","B","C","D"] (e.g. ["C"] or ["A","D"])
- "explanation_cue": short string copied verbatim from the original text

Do NOT write anything before or after the array. Do NOT use single quotes.
Write the questions in the same language as the content.
--- CONTENT TO ANALYSE ---
{content}
"#
    )
}

/// Greedy span from the first `[` to the last `]`
pub fn extract_json_array(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    (end > start).then(|| &raw[start..=end])
}

/// Extract, parse and normalize a raw model reply
pub fn parse_questions(raw: &str) -> Result<Vec<Question>, QuestionError> {
    let array = extract_json_array(raw.trim()).ok_or(QuestionError::NoArray)?;
    let value: Value = serde_json::from_str(array)?;
    let questions = normalize_questions(&value)?;
    if questions.is_empty() {
        return Err(QuestionError::Empty);
    }
    Ok(questions)
}

pub fn normalize_questions(value: &Value) -> Result<Vec<Question>, QuestionError> {
    let items = value.as_array().ok_or(QuestionError::NotArray)?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| normalize_question(i + 1, item))
        .collect()
}

fn normalize_question(index: usize, item: &Value) -> Result<Question, QuestionError> {
    let obj = item
        .as_object()
        .ok_or(QuestionError::NotObject { index })?;

    for key in REQUIRED_KEYS {
        if !obj.contains_key(key) {
            return Err(QuestionError::MissingKey { index, key });
        }
    }

    let question = obj["question"]
        .as_str()
        .ok_or(QuestionError::QuestionText { index })?
        .trim()
        .to_string();

    let options: Vec<String> = obj["options"]
        .as_array()
        .filter(|opts| opts.len() == LETTERS.len())
        .and_then(|opts| {
            opts.iter()
                .map(|o| o.as_str().map(|s| s.trim().to_string()))
                .collect::<Option<Vec<_>>>()
        })
        .ok_or(QuestionError::Options { index })?;

    let raw_answers: Vec<&str> = match &obj["answer"] {
        Value::String(s) => vec![s.as_str()],
        Value::Array(values) => values
            .iter()
            .map(Value::as_str)
            .collect::<Option<Vec<_>>>()
            .ok_or(QuestionError::AnswerShape { index })?,
        _ => return Err(QuestionError::AnswerShape { index }),
    };
    if raw_answers.is_empty() {
        return Err(QuestionError::AnswerShape { index });
    }

    let mut answer = raw_answers
        .into_iter()
        .map(|raw| answer_letter(raw, &options).ok_or_else(|| QuestionError::AnswerValue {
            index,
            value: raw.to_string(),
        }))
        .collect::<Result<Vec<char>, _>>()?;
    answer.sort_unstable();
    answer.dedup();

    let explanation_cue = match &obj["explanation_cue"] {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    };

    Ok(Question {
        question,
        options,
        answer,
        explanation_cue,
    })
}

/// Map one answer entry to its letter: a letter, an index 0-3, or the text
/// of one of the options
fn answer_letter(raw: &str, options: &[String]) -> Option<char> {
    let trimmed = raw.trim();
    let upper = trimmed.to_uppercase();

    if let Some(letter) = LETTERS.iter().find(|l| upper.len() == 1 && upper.starts_with(**l)) {
        return Some(*letter);
    }

    if let Ok(i) = trimmed.parse::<usize>()
        && let Some(letter) = LETTERS.get(i)
    {
        return Some(*letter);
    }

    options
        .iter()
        .position(|o| o == trimmed)
        .or_else(|| options.iter().position(|o| o.to_uppercase() == upper))
        .map(|i| LETTERS[i])
}

/// Ask the model for `n` questions about `content`
pub async fn generate_questions(
    client: &ChatClient,
    content: &str,
    n: u32,
) -> Result<Vec<Question>> {
    let n = super::clamp_question_count(n);
    let messages = vec![
        Message {
            role: "system".to_string(),
            content: SYSTEM_PROMPT.to_string(),
        },
        Message {
            role: "user".to_string(),
            content: build_prompt(content, n),
        },
    ];

    tracing::info!(
        "Requesting {} questions from {} ({} chars of content)",
        n,
        client.model,
        content.len()
    );
    let raw = client.chat(&messages).await?;
    tracing::debug!("Raw reply: {}", raw);

    let questions = parse_questions(&raw)?;
    if questions.len() != n as usize {
        tracing::warn!("Asked for {} questions, got {}", n, questions.len());
    }
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_json_array_is_greedy() {
        let raw = "Sure! Here you go:\n[{\"a\": [1]}, {\"b\": 2}]\nHope it helps [really].";
        assert_eq!(
            extract_json_array(raw),
            Some("[{\"a\": [1]}, {\"b\": 2}]\nHope it helps [really]")
        );
        assert_eq!(extract_json_array("no array here"), None);
        assert_eq!(extract_json_array("] backwards ["), None);
    }

    #[test]
    fn test_parse_questions_from_fenced_reply() {
        let raw = r#"```json
[
  {"question": "What is OLTP?", "options": ["Batch", "Transactional", "Stream", "Archive"],
   "answer": ["b"], "explanation_cue": "OLTP systems"}
]
```"#;
        let questions = parse_questions(raw).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].answer, vec!['B']);
        assert_eq!(questions[0].explanation_cue, "OLTP systems");
    }

    #[test]
    fn test_answer_string_is_wrapped_and_sorted() {
        let value = json!([
            {"question": "Q", "options": ["w", "x", "y", "z"], "answer": "C", "explanation_cue": "c"},
            {"question": "Q2", "options": ["w", "x", "y", "z"], "answer": ["D", " a ", "D"], "explanation_cue": "c"}
        ]);
        let questions = normalize_questions(&value).unwrap();
        assert_eq!(questions[0].answer, vec!['C']);
        assert_eq!(questions[1].answer, vec!['A', 'D']);
    }

    #[test]
    fn test_answer_indices_and_option_texts() {
        let value = json!([
            {"question": "Q", "options": ["Red", "Green", "Blue", "Cyan"], "answer": ["0", "3"], "explanation_cue": ""},
            {"question": "Q", "options": ["Red", "Green", "Blue", "Cyan"], "answer": ["Blue"], "explanation_cue": ""},
            {"question": "Q", "options": ["Red", "Green", "Blue", "Cyan"], "answer": "green", "explanation_cue": ""}
        ]);
        let questions = normalize_questions(&value).unwrap();
        assert_eq!(questions[0].answer, vec!['A', 'D']);
        assert_eq!(questions[1].answer, vec!['C']);
        assert_eq!(questions[2].answer, vec!['B']);
    }

    #[test]
    fn test_out_of_range_number_matches_option_text() {
        let value = json!([
            {"question": "2+2?", "options": ["3", "4", "5", "6"], "answer": "4", "explanation_cue": ""},
            {"question": "2+3?", "options": ["3", "4", "5", "6"], "answer": ["5", "1"], "explanation_cue": ""}
        ]);
        let questions = normalize_questions(&value).unwrap();
        assert_eq!(questions[0].answer, vec!['B']);
        // "1" is an index, "5" is an option text
        assert_eq!(questions[1].answer, vec!['B', 'C']);

        let unknown = json!([{"question": "Q", "options": ["3", "4", "5", "6"], "answer": "7", "explanation_cue": ""}]);
        assert!(matches!(
            normalize_questions(&unknown),
            Err(QuestionError::AnswerValue { index: 1, .. })
        ));
    }

    #[test]
    fn test_missing_key_reports_position() {
        let value = json!([
            {"question": "Q", "options": ["a", "b", "c", "d"], "answer": ["A"], "explanation_cue": ""},
            {"question": "Q", "options": ["a", "b", "c", "d"], "answer": ["A"]}
        ]);
        let err = normalize_questions(&value).unwrap_err();
        assert_eq!(err.to_string(), "item 2: missing key 'explanation_cue'");
    }

    #[test]
    fn test_invalid_shapes_are_rejected() {
        let three_options = json!([{"question": "Q", "options": ["a", "b", "c"], "answer": ["A"], "explanation_cue": ""}]);
        assert!(matches!(
            normalize_questions(&three_options),
            Err(QuestionError::Options { index: 1 })
        ));

        let numeric = json!([{"question": "Q", "options": ["a", "b", "c", "d"], "answer": [1], "explanation_cue": ""}]);
        assert!(matches!(
            normalize_questions(&numeric),
            Err(QuestionError::AnswerShape { index: 1 })
        ));

        let unknown = json!([{"question": "Q", "options": ["a", "b", "c", "d"], "answer": ["E"], "explanation_cue": ""}]);
        match normalize_questions(&unknown) {
            Err(QuestionError::AnswerValue { index, value }) => {
                assert_eq!(index, 1);
                assert_eq!(value, "E");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let out_of_range = json!([{"question": "Q", "options": ["a", "b", "c", "d"], "answer": ["4"], "explanation_cue": ""}]);
        assert!(normalize_questions(&out_of_range).is_err());
    }

    #[test]
    fn test_empty_and_non_array_replies() {
        assert!(matches!(parse_questions("[]"), Err(QuestionError::Empty)));
        assert!(matches!(parse_questions("nothing"), Err(QuestionError::NoArray)));
        assert!(matches!(parse_questions("[not json]"), Err(QuestionError::Json(_))));
    }

    #[test]
    fn test_prompt_mentions_count_and_content() {
        let prompt = build_prompt("Tables have rows.", 7);
        assert!(prompt.contains("exactly 7 objects"));
        assert!(prompt.ends_with("Tables have rows.\n"));
    }
}
