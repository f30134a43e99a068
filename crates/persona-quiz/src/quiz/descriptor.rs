//! Narrative content for each base type plus per-axis confidence.

use serde::Serialize;

use super::catalog::Dimension;
use super::scoring::{DimensionScores, DEFAULT_CONFIDENCE_CEILING};
use super::types::{split_identity, Identity, TypeCode};

/// Static descriptive entry for one base type.
#[derive(Debug)]
pub struct TypeProfile {
    pub code: &'static str,
    pub nickname: &'static str,
    pub summary: &'static str,
    pub strengths: &'static [&'static str],
    pub weaknesses: &'static [&'static str],
    pub careers: &'static [&'static str],
    pub relationships: &'static [&'static str],
    pub famous_examples: &'static [&'static str],
}

/// Per-axis confidence, each 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DimensionPercentages {
    #[serde(rename = "EI")]
    pub ei: u8,
    #[serde(rename = "SN")]
    pub sn: u8,
    #[serde(rename = "TF")]
    pub tf: u8,
    #[serde(rename = "JP")]
    pub jp: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalityDescription {
    pub full_type: String,
    pub base_type: String,
    pub nickname: String,
    pub summary: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub careers: Vec<String>,
    pub relationships: Vec<String>,
    pub famous_examples: Vec<String>,
    pub is_turbulent: bool,
    pub percentage: u8,
    pub dimension_percentages: DimensionPercentages,
}

/// Pure lookup over the static table; never fails.
#[derive(Debug, Clone, Copy)]
pub struct PersonalityDescriptor {
    confidence_ceiling: f64,
}

impl Default for PersonalityDescriptor {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_CEILING)
    }
}

impl PersonalityDescriptor {
    pub fn new(confidence_ceiling: f64) -> Self {
        Self { confidence_ceiling }
    }

    pub fn confidence_ceiling(&self) -> f64 {
        self.confidence_ceiling
    }

    /// Confidence for one axis: `|score| / ceiling`, clamped to 0..=100.
    pub fn axis_percentage(&self, score: f64) -> f64 {
        if self.confidence_ceiling <= 0.0 || !score.is_finite() {
            return 0.0;
        }
        (score.abs() / self.confidence_ceiling * 100.0).clamp(0.0, 100.0)
    }

    pub fn dimension_percentages(&self, scores: &DimensionScores) -> DimensionPercentages {
        let pct = |dimension: Dimension| self.axis_percentage(scores.get(dimension)).round() as u8;
        DimensionPercentages {
            ei: pct(Dimension::EI),
            sn: pct(Dimension::SN),
            tf: pct(Dimension::TF),
            jp: pct(Dimension::JP),
        }
    }

    /// Unweighted mean of the four unrounded axis percentages, rounded once.
    pub fn overall_percentage(&self, scores: &DimensionScores) -> u8 {
        let total: f64 = Dimension::ordered()
            .iter()
            .map(|&dimension| self.axis_percentage(scores.get(dimension)))
            .sum();
        (total / 4.0).round() as u8
    }

    pub fn describe(&self, full_type: &str, scores: &DimensionScores) -> PersonalityDescription {
        let (base, identity) = split_identity(full_type);
        let profile = base
            .parse::<TypeCode>()
            .ok()
            .and_then(profile_for)
            .unwrap_or(&FALLBACK_PROFILE);

        PersonalityDescription {
            full_type: full_type.to_string(),
            base_type: base.to_string(),
            nickname: profile.nickname.to_string(),
            summary: profile.summary.to_string(),
            strengths: owned(profile.strengths),
            weaknesses: owned(profile.weaknesses),
            careers: owned(profile.careers),
            relationships: owned(profile.relationships),
            famous_examples: owned(profile.famous_examples),
            is_turbulent: identity.map(Identity::is_turbulent).unwrap_or(false),
            percentage: self.overall_percentage(scores),
            dimension_percentages: self.dimension_percentages(scores),
        }
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

pub fn profile_for(code: TypeCode) -> Option<&'static TypeProfile> {
    PROFILES.iter().find(|profile| profile.code == code.as_str())
}

pub static FALLBACK_PROFILE: TypeProfile = TypeProfile {
    code: "XXXX",
    nickname: "The Individual",
    summary: "Your answers describe a blend of preferences that does not map cleanly onto a single profile. Explore each dimension score to see where you lean.",
    strengths: &["Adaptable across situations", "Draws on several styles of thinking"],
    weaknesses: &["Preferences may be less pronounced or harder to predict"],
    careers: &["Roles that reward a broad mix of skills"],
    relationships: &["Connects with a wide range of personalities"],
    famous_examples: &[],
};

static PROFILES: [TypeProfile; 16] = [
    TypeProfile {
        code: "INTJ",
        nickname: "The Architect",
        summary: "Strategic, analytical, and independent. You see the big picture and create long-term plans to achieve your vision.",
        strengths: &["Strategic planning", "Independent problem solving", "High personal standards", "Decisive under complexity"],
        weaknesses: &["Can come across as aloof", "Impatient with inefficiency", "Dismissive of emotional considerations"],
        careers: &["Systems architect", "Research scientist", "Strategy consultant", "Investment analyst"],
        relationships: &["Values depth and intellectual honesty over small talk", "Shows care through practical problem solving"],
        famous_examples: &["Isaac Newton", "Michelle Obama", "Christopher Nolan"],
    },
    TypeProfile {
        code: "INTP",
        nickname: "The Logician",
        summary: "Innovative, curious, and theoretical. You love exploring ideas and understanding how systems work.",
        strengths: &["Original thinking", "Objective analysis", "Open to new evidence", "Comfortable with abstraction"],
        weaknesses: &["Loses interest once a problem is understood", "Struggles with routine follow-through", "Can overthink decisions"],
        careers: &["Software engineer", "Mathematician", "Philosopher", "Data scientist"],
        relationships: &["Enjoys partners who welcome debate and curiosity", "Needs room for independent thought"],
        famous_examples: &["Albert Einstein", "Marie Curie", "Bill Gates"],
    },
    TypeProfile {
        code: "ENTJ",
        nickname: "The Commander",
        summary: "Bold, strategic, and confident. You're a natural leader who enjoys organizing people and resources.",
        strengths: &["Natural leadership", "Efficient execution", "Long-range vision", "Confident decision making"],
        weaknesses: &["Can be domineering", "Low tolerance for inefficiency", "May overlook feelings in pursuit of goals"],
        careers: &["Executive", "Entrepreneur", "Management consultant", "Attorney"],
        relationships: &["Brings direction and ambition to shared goals", "Respects partners who push back with substance"],
        famous_examples: &["Steve Jobs", "Margaret Thatcher", "Franklin D. Roosevelt"],
    },
    TypeProfile {
        code: "ENTP",
        nickname: "The Debater",
        summary: "Quick-witted, clever, and original. You love intellectual challenges and testing new ideas.",
        strengths: &["Inventive", "Quick on their feet", "Energised by challenge", "Sees many angles at once"],
        weaknesses: &["Argues for sport", "Neglects routine details", "Starts more than they finish"],
        careers: &["Entrepreneur", "Product strategist", "Trial lawyer", "Creative director"],
        relationships: &["Keeps relationships lively and full of ideas", "Needs partners who enjoy spirited discussion"],
        famous_examples: &["Thomas Edison", "Mark Twain", "Celine Dion"],
    },
    TypeProfile {
        code: "INFJ",
        nickname: "The Advocate",
        summary: "Idealistic, compassionate, and insightful. You're driven by deep values and a vision for a better world.",
        strengths: &["Insight into people", "Principled", "Quietly determined", "Creative problem solving"],
        weaknesses: &["Sensitive to criticism", "Prone to burnout", "Perfectionistic about ideals"],
        careers: &["Counselor", "Writer", "Nonprofit director", "Psychologist"],
        relationships: &["Seeks deep, authentic connection", "Highly attuned to a partner's unspoken needs"],
        famous_examples: &["Martin Luther King Jr.", "Nelson Mandela", "Lady Gaga"],
    },
    TypeProfile {
        code: "INFP",
        nickname: "The Mediator",
        summary: "Empathetic, creative, and authentic. You seek meaning and stay true to your values.",
        strengths: &["Empathy", "Creativity", "Strong personal values", "Open-minded"],
        weaknesses: &["Idealistic to the point of impracticality", "Takes criticism personally", "Avoids conflict"],
        careers: &["Author", "Graphic designer", "Therapist", "Social worker"],
        relationships: &["Devoted and supportive partner", "Values harmony and emotional honesty"],
        famous_examples: &["William Shakespeare", "J.R.R. Tolkien", "Princess Diana"],
    },
    TypeProfile {
        code: "ENFJ",
        nickname: "The Protagonist",
        summary: "Charismatic, inspiring, and altruistic. You naturally bring out the best in others.",
        strengths: &["Inspiring communicator", "Reliable", "Natural mentor", "Reads group dynamics well"],
        weaknesses: &["Overextends to help others", "Sensitive to disapproval", "Can be overly idealistic about people"],
        careers: &["Teacher", "Human resources lead", "Public relations manager", "Politician"],
        relationships: &["Invests heavily in a partner's growth", "Needs appreciation to feel secure"],
        famous_examples: &["Barack Obama", "Oprah Winfrey", "Maya Angelou"],
    },
    TypeProfile {
        code: "ENFP",
        nickname: "The Campaigner",
        summary: "Enthusiastic, creative, and sociable. You see life as full of possibilities and connections.",
        strengths: &["Enthusiasm", "Curiosity", "Excellent communicator", "Warm and approachable"],
        weaknesses: &["Easily distracted", "Overthinks others' motives", "Struggles with routine"],
        careers: &["Journalist", "Marketing strategist", "Actor", "Community organizer"],
        relationships: &["Brings warmth, spontaneity, and encouragement", "Craves emotional depth and shared adventures"],
        famous_examples: &["Robin Williams", "Walt Disney", "Ellen DeGeneres"],
    },
    TypeProfile {
        code: "ISTJ",
        nickname: "The Logistician",
        summary: "Practical, reliable, and detail-oriented. You value structure and follow through on commitments.",
        strengths: &["Dependable", "Thorough", "Calm under pressure", "Respects rules and commitments"],
        weaknesses: &["Resistant to sudden change", "Can be overly judgmental", "Reluctant to delegate"],
        careers: &["Accountant", "Auditor", "Operations manager", "Military officer"],
        relationships: &["Shows love through loyalty and follow-through", "Prefers clear expectations and stability"],
        famous_examples: &["George Washington", "Angela Merkel", "Natalie Portman"],
    },
    TypeProfile {
        code: "ISFJ",
        nickname: "The Defender",
        summary: "Warm, dedicated, and meticulous. You protect and care for the people and traditions you value.",
        strengths: &["Supportive", "Observant", "Patient", "Hardworking"],
        weaknesses: &["Downplays own needs", "Avoids confrontation", "Takes on too much responsibility"],
        careers: &["Nurse", "Elementary teacher", "Office manager", "Librarian"],
        relationships: &["Remembers the details that matter to loved ones", "Values stability and quiet appreciation"],
        famous_examples: &["Mother Teresa", "Queen Elizabeth II", "Kate Middleton"],
    },
    TypeProfile {
        code: "ESTJ",
        nickname: "The Executive",
        summary: "Organized, strong-willed, and traditional. You create order and ensure things get done right.",
        strengths: &["Organized", "Direct and honest", "Loyal", "Excellent administrator"],
        weaknesses: &["Inflexible", "Uncomfortable with unconventional ideas", "Can be overly blunt"],
        careers: &["Project manager", "Judge", "Financial officer", "School principal"],
        relationships: &["Dependable partner who keeps promises", "Values tradition and clear roles"],
        famous_examples: &["Judge Judy", "Henry Ford", "Sonia Sotomayor"],
    },
    TypeProfile {
        code: "ESFJ",
        nickname: "The Consul",
        summary: "Caring, social, and dutiful. You create harmony and take care of your community.",
        strengths: &["Strong sense of duty", "Warm and sociable", "Practical helper", "Builds community"],
        weaknesses: &["Seeks approval", "Vulnerable to criticism", "Can be inflexible about social norms"],
        careers: &["Healthcare administrator", "Event planner", "Sales representative", "Social worker"],
        relationships: &["Attentive and generous with time", "Wants warmth and reassurance in return"],
        famous_examples: &["Taylor Swift", "Jennifer Garner", "Bill Clinton"],
    },
    TypeProfile {
        code: "ISTP",
        nickname: "The Virtuoso",
        summary: "Bold, practical, and experimental. You're a master of tools and understand how things work.",
        strengths: &["Hands-on problem solver", "Calm in a crisis", "Practical and realistic", "Adaptable"],
        weaknesses: &["Private to a fault", "Easily bored", "Risk-prone"],
        careers: &["Mechanical engineer", "Pilot", "Forensic analyst", "Paramedic"],
        relationships: &["Shows care through actions rather than words", "Needs personal space and freedom"],
        famous_examples: &["Clint Eastwood", "Michael Jordan", "Bear Grylls"],
    },
    TypeProfile {
        code: "ISFP",
        nickname: "The Adventurer",
        summary: "Flexible, spontaneous, and artistic. You live in the moment and express yourself creatively.",
        strengths: &["Artistic", "Sensitive to others", "Curious", "Lives in the present"],
        weaknesses: &["Fiercely independent", "Unpredictable", "Easily stressed by conflict"],
        careers: &["Photographer", "Interior designer", "Chef", "Veterinary technician"],
        relationships: &["Gentle, caring, and spontaneous", "Expresses affection through shared experiences"],
        famous_examples: &["Frida Kahlo", "Michael Jackson", "Lana Del Rey"],
    },
    TypeProfile {
        code: "ESTP",
        nickname: "The Entrepreneur",
        summary: "Energetic, perceptive, and action-oriented. You dive into life and make things happen.",
        strengths: &["Bold", "Perceptive", "Direct", "Thrives in fast-moving situations"],
        weaknesses: &["Impatient", "Takes risks without planning", "Can miss the bigger picture"],
        careers: &["Sales executive", "Entrepreneur", "Emergency responder", "Stockbroker"],
        relationships: &["Fun, spontaneous, and engaging", "Prefers living in the moment over long talks about the future"],
        famous_examples: &["Ernest Hemingway", "Madonna", "Donald Trump"],
    },
    TypeProfile {
        code: "ESFP",
        nickname: "The Entertainer",
        summary: "Spontaneous, enthusiastic, and playful. You bring joy and excitement wherever you go.",
        strengths: &["Bold and original", "Excellent people skills", "Practical", "Observant"],
        weaknesses: &["Easily bored", "Avoids long-term planning", "Sensitive to criticism"],
        careers: &["Performer", "Tour guide", "Fitness coach", "Hospitality manager"],
        relationships: &["Generous and fun-loving partner", "Needs excitement and affection"],
        famous_examples: &["Marilyn Monroe", "Jamie Oliver", "Adele"],
    },
];
