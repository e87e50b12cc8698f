use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use cookie::time::Duration;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{config::AppConfig, validation::ValidationError};

/// Name of the cookie recording that the assessment was finished.
pub const FLAG_COOKIE: &str = "testCompleted";
/// The only value that counts as "completed".
pub const FLAG_VALUE: &str = "true";
/// Lifetime of the flag cookie, independent of the session. 400 days is the longest
/// `Max-Age` browsers honour.
pub const FLAG_MAX_AGE_DAYS: i64 = 400;

/// Items of the initial anxiety questionnaire, in the order they are asked.
const ITEMS: [&str; 21] = [
    "Numbness or tingling",
    "Feeling hot",
    "Wobbliness in legs",
    "Unable to relax",
    "Fear of the worst happening",
    "Dizzy or lightheaded",
    "Heart pounding or racing",
    "Unsteady",
    "Terrified or afraid",
    "Nervous",
    "Feeling of choking",
    "Hands trembling",
    "Shaky or insecure",
    "Fear of losing control",
    "Difficulty breathing",
    "Fear of dying",
    "Scared",
    "Indigestion",
    "Faint or lightheaded",
    "Face flushed",
    "Hot or cold sweats",
];

pub const QUESTION_COUNT: usize = ITEMS.len();
pub const MAX_ANSWER: u8 = 3;

const OPTION_LABELS: [&str; 4] = ["Not at all", "Mildly", "Moderately", "Severely"];

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AnswerOption {
    pub text: String,
    pub value: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Question {
    pub id: u8,
    pub text: String,
    pub options: Vec<AnswerOption>,
}

/// questions
///
/// The full questionnaire. Every item shares the same four-point scale.
pub fn questions() -> Vec<Question> {
    ITEMS
        .iter()
        .zip(1u8..)
        .map(|(text, id)| Question {
            id,
            text: text.to_string(),
            options: OPTION_LABELS
                .iter()
                .zip(0u8..)
                .map(|(label, value)| AnswerOption {
                    text: label.to_string(),
                    value,
                })
                .collect(),
        })
        .collect()
}

/// AnxietyLevel
///
/// Severity band derived from the summed score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum AnxietyLevel {
    Minimal,
    Mild,
    Moderate,
    Severe,
}

impl AnxietyLevel {
    pub fn from_score(total: u32) -> Self {
        match total {
            0..=4 => AnxietyLevel::Minimal,
            5..=8 => AnxietyLevel::Mild,
            9..=15 => AnxietyLevel::Moderate,
            _ => AnxietyLevel::Severe,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AnxietyLevel::Minimal => "Minimal anxiety",
            AnxietyLevel::Mild => "Mild anxiety",
            AnxietyLevel::Moderate => "Moderate anxiety",
            AnxietyLevel::Severe => "Severe anxiety",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            AnxietyLevel::Minimal => "Indicates a very low level of anxiety symptoms.",
            AnxietyLevel::Mild => "Shows mild anxiety symptoms that are generally manageable.",
            AnxietyLevel::Moderate => {
                "Shows anxiety symptoms that may call for professional attention."
            }
            AnxietyLevel::Severe => {
                "Indicates a high level of anxiety symptoms that calls for a professional evaluation."
            }
        }
    }
}

/// AssessmentResult
///
/// Returned once the final answer is in. The questionnaire is a screening aid and
/// the result is shown with that caveat on the completion page.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AssessmentResult {
    pub total_score: u32,
    pub level: AnxietyLevel,
    pub label: String,
    pub description: String,
    #[ts(type = "string")]
    pub completed_at: DateTime<Utc>,
}

/// Rejects anything but a full answer set on the 0-3 scale.
pub fn check_answers(answers: &[u8]) -> Result<(), ValidationError> {
    if answers.len() != QUESTION_COUNT {
        return Err(ValidationError::AnswerCount {
            expected: QUESTION_COUNT,
            got: answers.len(),
        });
    }
    if let Some((index, value)) = answers
        .iter()
        .enumerate()
        .find(|(_, value)| **value > MAX_ANSWER)
    {
        return Err(ValidationError::AnswerOutOfRange {
            question: index + 1,
            value: *value,
        });
    }
    Ok(())
}

/// score
///
/// Sums a complete answer set and maps the total onto a severity band.
pub fn score(answers: &[u8]) -> Result<AssessmentResult, ValidationError> {
    check_answers(answers)?;
    let total_score = answers.iter().map(|value| u32::from(*value)).sum();
    let level = AnxietyLevel::from_score(total_score);

    Ok(AssessmentResult {
        total_score,
        level,
        label: level.label().to_string(),
        description: level.description().to_string(),
        completed_at: Utc::now(),
    })
}

/// AssessmentFlag
///
/// One-way marker that the questionnaire was finished. It carries presence only,
/// no count, so setting it again changes nothing. The access gate is its only reader.
/// It outlives the session cookies so a returning user is not asked again.
#[derive(Clone, Debug)]
pub struct AssessmentFlag {
    max_age: Duration,
    secure: bool,
}

impl AssessmentFlag {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            max_age: Duration::days(FLAG_MAX_AGE_DAYS),
            secure: config.secure_cookies,
        }
    }

    pub fn mark_complete(&self, jar: CookieJar) -> CookieJar {
        jar.add(
            Cookie::build((FLAG_COOKIE, FLAG_VALUE))
                .path("/")
                .same_site(SameSite::Lax)
                .secure(self.secure)
                .max_age(self.max_age),
        )
    }

    pub fn is_complete(&self, jar: &CookieJar) -> bool {
        jar.get(FLAG_COOKIE)
            .is_some_and(|cookie| cookie.value() == FLAG_VALUE)
    }

    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(FLAG_COOKIE).path("/"))
    }
}
