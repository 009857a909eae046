//! The waves quiz: a fixed question bank and one attempt at a time.

use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizQuestion {
    pub id: u32,
    pub prompt: &'static str,
    pub options: [&'static str; 4],
    pub correct_option: usize,
    pub explanation: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("no question with id {0}")]
    UnknownQuestion(u32),
    #[error("question {question} has no option {option}")]
    InvalidOption { question: u32, option: usize },
    #[error("{answered} of {total} questions answered")]
    Incomplete { answered: usize, total: usize },
    #[error("attempt already submitted")]
    AlreadySubmitted,
}

pub static QUESTIONS: [QuizQuestion; 10] = [
    QuizQuestion {
        id: 1,
        prompt: "What is the relationship between wavelength (λ), frequency (f), and wave speed (v)?",
        options: ["λ = v × f", "λ = v ÷ f", "λ = f ÷ v", "λ = v + f"],
        correct_option: 1,
        explanation: "The correct relationship is λ = v ÷ f. This means wavelength equals wave speed divided by frequency. Higher frequency waves have shorter wavelengths when speed is constant.",
    },
    QuizQuestion {
        id: 2,
        prompt: "Which wave property determines the amount of energy carried by the wave?",
        options: ["Frequency", "Wavelength", "Amplitude", "Phase"],
        correct_option: 2,
        explanation: "Amplitude determines the energy carried by a wave. The energy is proportional to the square of the amplitude (E ∝ A²). Higher amplitude means more energy.",
    },
    QuizQuestion {
        id: 3,
        prompt: "What happens to the wavelength when frequency increases while wave speed remains constant?",
        options: [
            "Wavelength increases",
            "Wavelength decreases",
            "Wavelength stays the same",
            "Wavelength becomes zero",
        ],
        correct_option: 1,
        explanation: "When frequency increases and wave speed is constant, wavelength decreases. This is because λ = v/f, so if f increases, λ must decrease.",
    },
    QuizQuestion {
        id: 4,
        prompt: "Which type of wave moves perpendicular to the direction of energy transfer?",
        options: ["Longitudinal wave", "Transverse wave", "Surface wave", "Compression wave"],
        correct_option: 1,
        explanation: "A transverse wave moves perpendicular to the direction of energy transfer. Examples include light waves, water waves, and electromagnetic waves.",
    },
    QuizQuestion {
        id: 5,
        prompt: "What is the unit of frequency?",
        options: ["Meters (m)", "Seconds (s)", "Hertz (Hz)", "Meters per second (m/s)"],
        correct_option: 2,
        explanation: "Frequency is measured in Hertz (Hz), which represents the number of complete cycles per second. 1 Hz = 1 cycle/second.",
    },
    QuizQuestion {
        id: 6,
        prompt: "What does the phase of a wave represent?",
        options: [
            "The wave's speed",
            "The wave's position in its cycle",
            "The wave's amplitude",
            "The wave's frequency",
        ],
        correct_option: 1,
        explanation: "Phase represents the wave's position in its cycle. It determines where the wave starts and can be used to compare two waves or shift a wave horizontally.",
    },
    QuizQuestion {
        id: 7,
        prompt: "If a wave has a frequency of 2 Hz and a wavelength of 3 meters, what is its speed?",
        options: ["1.5 m/s", "3 m/s", "6 m/s", "9 m/s"],
        correct_option: 2,
        explanation: "Using the formula v = f × λ: v = 2 Hz × 3 m = 6 m/s. The wave travels 6 meters per second.",
    },
    QuizQuestion {
        id: 8,
        prompt: "Which wave property affects the pitch of sound?",
        options: ["Amplitude", "Frequency", "Wavelength", "Phase"],
        correct_option: 1,
        explanation: "Frequency affects the pitch of sound. Higher frequency produces higher pitch, while lower frequency produces lower pitch. Amplitude affects volume, not pitch.",
    },
    QuizQuestion {
        id: 9,
        prompt: "What happens when two waves with the same frequency and amplitude meet in phase?",
        options: [
            "They cancel each other out",
            "They create a wave with double amplitude",
            "They create a wave with half amplitude",
            "They create a standing wave",
        ],
        correct_option: 1,
        explanation: "When two waves meet in phase (crest meets crest), they constructively interfere, creating a wave with double amplitude. This is called constructive interference.",
    },
    QuizQuestion {
        id: 10,
        prompt: "Which of the following is NOT a characteristic of all waves?",
        options: [
            "They transfer energy",
            "They have amplitude",
            "They require a medium",
            "They have frequency",
        ],
        correct_option: 2,
        explanation: "Not all waves require a medium. Electromagnetic waves (like light) can travel through vacuum, while mechanical waves (like sound) require a medium to travel.",
    },
];

pub fn question(id: u32) -> Option<&'static QuizQuestion> {
    QUESTIONS.iter().find(|q| q.id == id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptState {
    InProgress,
    Submittable,
    Submitted,
}

/// One row of the post-submission review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewEntry {
    pub question_id: u32,
    pub chosen: usize,
    pub correct: usize,
    pub is_correct: bool,
    pub explanation: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuizAttempt {
    answers: BTreeMap<u32, usize>,
    submitted: bool,
    score: u32,
}

impl QuizAttempt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record or overwrite an answer. Ignored once submitted.
    pub fn select_answer(&mut self, question_id: u32, option: usize) -> Result<(), QuizError> {
        let q = question(question_id).ok_or(QuizError::UnknownQuestion(question_id))?;
        if option >= q.options.len() {
            return Err(QuizError::InvalidOption {
                question: question_id,
                option,
            });
        }
        if self.submitted {
            debug!("answer to q{} ignored after submit", question_id);
            return Ok(());
        }
        self.answers.insert(question_id, option);
        Ok(())
    }

    pub fn answer(&self, question_id: u32) -> Option<usize> {
        self.answers.get(&question_id).copied()
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn can_submit(&self) -> bool {
        !self.submitted && QUESTIONS.iter().all(|q| self.answers.contains_key(&q.id))
    }

    pub fn state(&self) -> AttemptState {
        if self.submitted {
            AttemptState::Submitted
        } else if self.can_submit() {
            AttemptState::Submittable
        } else {
            AttemptState::InProgress
        }
    }

    /// Score the attempt. Only allowed with every question answered.
    pub fn submit(&mut self) -> Result<u32, QuizError> {
        if self.submitted {
            return Err(QuizError::AlreadySubmitted);
        }
        if !self.can_submit() {
            return Err(QuizError::Incomplete {
                answered: self.answered_count(),
                total: QUESTIONS.len(),
            });
        }
        self.score = QUESTIONS
            .iter()
            .filter(|q| self.answers.get(&q.id) == Some(&q.correct_option))
            .count() as u32;
        self.submitted = true;
        debug!("quiz submitted: {}/{}", self.score, QUESTIONS.len());
        Ok(self.score)
    }

    pub fn retake(&mut self) {
        *self = Self::default();
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// `Some` only after submission.
    pub fn score(&self) -> Option<u32> {
        self.submitted.then_some(self.score)
    }

    pub fn review(&self) -> Option<Vec<ReviewEntry>> {
        if !self.submitted {
            return None;
        }
        let rows = QUESTIONS
            .iter()
            .map(|q| {
                let chosen = self.answers.get(&q.id).copied().unwrap_or(0);
                ReviewEntry {
                    question_id: q.id,
                    chosen,
                    correct: q.correct_option,
                    is_correct: chosen == q.correct_option,
                    explanation: q.explanation,
                }
            })
            .collect();
        Some(rows)
    }

    pub fn feedback(&self) -> Option<&'static str> {
        self.score().map(feedback_for)
    }
}

/// Score band message shown with the results.
pub fn feedback_for(score: u32) -> &'static str {
    let ratio = score as f64 / QUESTIONS.len() as f64;
    if ratio >= 0.8 {
        "Excellent! You have a strong understanding of waves."
    } else if ratio >= 0.6 {
        "Good job! You understand most wave concepts."
    } else if ratio >= 0.4 {
        "Not bad! Review the explanations to improve."
    } else {
        "Keep studying! Review the concepts and try again."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer_all(a: &mut QuizAttempt) {
        for q in &QUESTIONS {
            a.select_answer(q.id, q.correct_option).unwrap();
        }
    }

    #[test]
    fn bank_is_well_formed() {
        assert_eq!(QUESTIONS.len(), 10);
        for (i, q) in QUESTIONS.iter().enumerate() {
            assert_eq!(q.id, i as u32 + 1);
            assert!(q.correct_option < 4);
        }
    }

    #[test]
    fn perfect_score() {
        let mut a = QuizAttempt::new();
        answer_all(&mut a);
        assert_eq!(a.state(), AttemptState::Submittable);
        assert_eq!(a.submit(), Ok(10));
        assert_eq!(a.state(), AttemptState::Submitted);
        assert_eq!(a.feedback(), Some("Excellent! You have a strong understanding of waves."));
    }

    #[test]
    fn one_wrong_answer() {
        let mut a = QuizAttempt::new();
        answer_all(&mut a);
        a.select_answer(4, 0).unwrap();
        assert_eq!(a.submit(), Ok(9));
        let review = a.review().unwrap();
        assert!(!review[3].is_correct);
        assert_eq!(review.iter().filter(|r| r.is_correct).count(), 9);
    }

    #[test]
    fn empty_attempt_cannot_submit() {
        let mut a = QuizAttempt::new();
        assert!(!a.can_submit());
        assert_eq!(a.state(), AttemptState::InProgress);
        assert_eq!(a.submit(), Err(QuizError::Incomplete { answered: 0, total: 10 }));
        assert_eq!(a.score(), None);
    }

    #[test]
    fn last_write_wins() {
        let mut a = QuizAttempt::new();
        a.select_answer(1, 0).unwrap();
        a.select_answer(1, 3).unwrap();
        assert_eq!(a.answer(1), Some(3));
        assert_eq!(a.answered_count(), 1);
    }

    #[test]
    fn rejects_bad_ids_and_options() {
        let mut a = QuizAttempt::new();
        assert_eq!(a.select_answer(11, 0), Err(QuizError::UnknownQuestion(11)));
        assert_eq!(
            a.select_answer(2, 4),
            Err(QuizError::InvalidOption { question: 2, option: 4 })
        );
        assert_eq!(a.answered_count(), 0);
    }

    #[test]
    fn answers_frozen_after_submit() {
        let mut a = QuizAttempt::new();
        answer_all(&mut a);
        a.submit().unwrap();
        a.select_answer(1, 0).unwrap();
        assert_eq!(a.answer(1), Some(1));
        assert_eq!(a.submit(), Err(QuizError::AlreadySubmitted));
    }

    #[test]
    fn retake_resets_everything() {
        let mut a = QuizAttempt::new();
        answer_all(&mut a);
        a.submit().unwrap();
        a.retake();
        assert_eq!(a, QuizAttempt::new());
        assert_eq!(a.score(), None);
        assert!(!a.can_submit());
        assert!(a.review().is_none());
    }

    #[test]
    fn feedback_bands() {
        assert_eq!(feedback_for(8), "Excellent! You have a strong understanding of waves.");
        assert_eq!(feedback_for(7), "Good job! You understand most wave concepts.");
        assert_eq!(feedback_for(4), "Not bad! Review the explanations to improve.");
        assert_eq!(feedback_for(3), "Keep studying! Review the concepts and try again.");
    }
}
