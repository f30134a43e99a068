use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::scoring::complexity_factor;

/// One of the four bipolar axes a question shifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dimension {
    EI,
    SN,
    TF,
    JP,
}

impl Dimension {
    pub const fn ordered() -> [Self; 4] {
        [Self::EI, Self::SN, Self::TF, Self::JP]
    }

    /// Pole chosen when the axis score is zero or positive.
    pub const fn first_pole(self) -> char {
        match self {
            Self::EI => 'E',
            Self::SN => 'N',
            Self::TF => 'T',
            Self::JP => 'J',
        }
    }

    pub const fn second_pole(self) -> char {
        match self {
            Self::EI => 'I',
            Self::SN => 'S',
            Self::TF => 'F',
            Self::JP => 'P',
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::EI => "EI",
            Self::SN => "SN",
            Self::TF => "TF",
            Self::JP => "JP",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::EI => "Extraversion / Introversion",
            Self::SN => "Intuition / Sensing",
            Self::TF => "Thinking / Feeling",
            Self::JP => "Judging / Perceiving",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::EI => 0,
            Self::SN => 1,
            Self::TF => 2,
            Self::JP => 3,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A scored Likert statement. Positive weights pull toward the first pole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub text: String,
    pub dimension: Dimension,
    pub weight: f64,
}

/// Ordered, immutable question set. Answers are matched to questions by position.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionCatalog {
    questions: Vec<Question>,
}

impl QuestionCatalog {
    /// Build a catalog, rejecting sets that cannot score every axis in both directions.
    pub fn new(questions: Vec<Question>) -> Result<Self, CatalogError> {
        if questions.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !seen.insert(question.id) {
                return Err(CatalogError::DuplicateId { id: question.id });
            }
            if question.weight == 0.0 || !question.weight.is_finite() {
                return Err(CatalogError::ZeroWeight { id: question.id });
            }
        }

        for dimension in Dimension::ordered() {
            let weights: Vec<f64> = questions
                .iter()
                .filter(|q| q.dimension == dimension)
                .map(|q| q.weight)
                .collect();
            if weights.is_empty() {
                return Err(CatalogError::MissingDimension { dimension });
            }
            let positive = weights.iter().any(|w| *w > 0.0);
            let negative = weights.iter().any(|w| *w < 0.0);
            if !(positive && negative) {
                return Err(CatalogError::OneSided { dimension });
            }
        }

        Ok(Self { questions })
    }

    /// The canonical 60-question weighted catalog, 15 statements per axis.
    pub fn standard() -> Self {
        let questions = STANDARD_QUESTIONS
            .iter()
            .zip(1u32..)
            .map(|(&(text, dimension, weight), id)| Question {
                id,
                text: text.to_string(),
                dimension,
                weight,
            })
            .collect();
        Self { questions }
    }

    /// Parse a replacement catalog from a JSON array of questions.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let questions: Vec<Question> =
            serde_json::from_str(raw).map_err(|err| CatalogError::Parse(err.to_string()))?;
        Self::new(questions)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    pub fn count_for(&self, dimension: Dimension) -> usize {
        self.questions
            .iter()
            .filter(|question| question.dimension == dimension)
            .count()
    }

    /// Largest score magnitude an axis can reach with this catalog.
    pub fn max_axis_magnitude(&self, dimension: Dimension) -> f64 {
        self.questions
            .iter()
            .filter(|question| question.dimension == dimension)
            .map(|question| 2.0 * question.weight.abs() * complexity_factor(question.weight))
            .sum()
    }
}

impl Default for QuestionCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Reasons a replacement catalog is rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("question catalog is empty")]
    Empty,
    #[error("question id {id} appears more than once")]
    DuplicateId { id: u32 },
    #[error("question {id} has a zero or non-finite weight")]
    ZeroWeight { id: u32 },
    #[error("no questions cover the {dimension} axis")]
    MissingDimension { dimension: Dimension },
    #[error("the {dimension} axis needs both positive and negative weights")]
    OneSided { dimension: Dimension },
    #[error("catalog file is not a valid question list: {0}")]
    Parse(String),
}

const STANDARD_QUESTIONS: [(&str, Dimension, f64); 60] = [
    ("After a long week, I'd rather hit up a party with friends than chill alone at home.", Dimension::EI, 1.2),
    ("I get energized by being around lots of people and social situations.", Dimension::EI, 1.0),
    ("I tend to think out loud and process ideas by talking them through.", Dimension::EI, 0.8),
    ("I need alone time to recharge, even if I had fun socializing.", Dimension::EI, -1.0),
    ("I'm comfortable striking up conversations with strangers.", Dimension::EI, 1.1),
    ("I prefer one-on-one conversations over group discussions.", Dimension::EI, -0.9),
    ("Social events drain my energy rather than energize me.", Dimension::EI, -1.2),
    ("I enjoy being the center of attention in social settings.", Dimension::EI, 1.3),
    ("I process my thoughts internally before sharing them with others.", Dimension::EI, -0.8),
    ("I have a wide circle of acquaintances and enjoy meeting new people.", Dimension::EI, 1.0),
    ("I prefer deep conversations with a few close friends over small talk with many.", Dimension::EI, -1.1),
    ("I often take initiative in social situations and group activities.", Dimension::EI, 1.2),
    ("I need time to think before responding in conversations.", Dimension::EI, -0.7),
    ("I enjoy networking events and meeting new professional contacts.", Dimension::EI, 1.1),
    ("I feel most comfortable and authentic when I'm by myself.", Dimension::EI, -1.3),
    ("I trust my gut feelings more than cold, hard facts when making decisions.", Dimension::SN, 1.2),
    ("I'm more interested in future possibilities than what's happening right now.", Dimension::SN, 1.0),
    ("I notice small details—like if someone changed their hair or moved furniture.", Dimension::SN, -1.1),
    ("I daydream a lot about abstract concepts and big-picture ideas.", Dimension::SN, 1.3),
    ("I'm practical and prefer tried-and-true methods over experimental ones.", Dimension::SN, -0.9),
    ("I enjoy brainstorming and coming up with creative, unconventional ideas.", Dimension::SN, 1.2),
    ("I prefer concrete facts over abstract theories.", Dimension::SN, -1.0),
    ("I often see patterns and connections that others miss.", Dimension::SN, 1.1),
    ("I focus on what is rather than what could be.", Dimension::SN, -0.8),
    ("I enjoy thinking about philosophical questions and existential concepts.", Dimension::SN, 1.3),
    ("I prefer step-by-step instructions over figuring things out on my own.", Dimension::SN, -1.1),
    ("I'm good at reading between the lines and understanding hidden meanings.", Dimension::SN, 1.0),
    ("I trust my five senses more than my intuition.", Dimension::SN, -1.2),
    ("I enjoy exploring new theories and concepts just for the sake of learning.", Dimension::SN, 1.1),
    ("I prefer dealing with reality as it is rather than imagining alternatives.", Dimension::SN, -0.9),
    ("When a friend is upset, I focus on solving their problem rather than just listening.", Dimension::TF, 1.0),
    ("I'd rather be respected for my logic than loved for my empathy.", Dimension::TF, 1.2),
    ("In an argument, I prioritize being fair over being kind.", Dimension::TF, 1.1),
    ("I can set aside my feelings to make the most logical choice.", Dimension::TF, 1.3),
    ("People describe me as warm and considerate rather than analytical.", Dimension::TF, -1.0),
    ("I make decisions based on objective criteria rather than personal values.", Dimension::TF, 1.2),
    ("I'm sensitive to other people's feelings and emotional states.", Dimension::TF, -1.1),
    ("I believe truth is more important than tact in most situations.", Dimension::TF, 1.0),
    ("I often consider how my decisions will affect others emotionally.", Dimension::TF, -1.3),
    ("I value justice and fairness over harmony and peace.", Dimension::TF, 1.1),
    ("I'm good at comforting people and providing emotional support.", Dimension::TF, -0.9),
    ("I prefer analyzing problems objectively rather than considering personal factors.", Dimension::TF, 1.2),
    ("I often put others' needs before my own.", Dimension::TF, -1.0),
    ("I believe constructive criticism is more valuable than unconditional support.", Dimension::TF, 1.1),
    ("I'm motivated by creating positive emotional experiences for others.", Dimension::TF, -1.2),
    ("I like to have my day planned out rather than going with the flow.", Dimension::JP, 1.2),
    ("Deadlines stress me out—I work better when I can be spontaneous.", Dimension::JP, -1.1),
    ("I love making to-do lists and checking things off as I finish them.", Dimension::JP, 1.3),
    ("I prefer to keep my options open rather than commit to a strict plan.", Dimension::JP, -1.0),
    ("I feel uncomfortable when things are messy or unorganized.", Dimension::JP, 1.1),
    ("I enjoy the freedom of last-minute changes and improvisation.", Dimension::JP, -1.2),
    ("I prefer clear deadlines and structured schedules.", Dimension::JP, 1.0),
    ("I work best under pressure and tight deadlines.", Dimension::JP, -0.9),
    ("I like to have a clear plan before starting any project.", Dimension::JP, 1.2),
    ("I enjoy exploring new opportunities as they arise rather than sticking to a plan.", Dimension::JP, -1.1),
    ("I'm good at following through on commitments and finishing what I start.", Dimension::JP, 1.3),
    ("I prefer flexible schedules that allow for spontaneity.", Dimension::JP, -1.0),
    ("I feel stressed when things are uncertain or ambiguous.", Dimension::JP, 1.1),
    ("I enjoy adapting to new information and changing my approach.", Dimension::JP, -1.2),
    ("I believe structure and organization lead to better outcomes.", Dimension::JP, 1.0),
];
