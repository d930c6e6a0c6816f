use serde::{Serialize, Deserialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StressLevel {
    Low,
    Medium,
    High,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Good,
    Neutral,
    Bad,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct CheckIn {
    pub stress: StressLevel,
    /// Hours slept last night
    pub sleep: f64,
    pub mood: Mood,
}

/// First matching rule wins.
pub fn suggestion(check_in: &CheckIn) -> &'static str {
    use Mood::*;
    use StressLevel::*;

    let CheckIn { stress, sleep, mood } = *check_in;

    match (stress, mood) {
        (High, _) if sleep < 6.0 => {
            "High stress and low sleep are a tough combination. Prioritize a 15-minute screen-free break today. Your mind needs it to recharge."
        }
        (High, _) => {
            "High stress levels detected. Try a 5-minute guided breathing exercise. It can make a huge difference in your focus and calm."
        }
        _ if sleep < 6.0 => {
            "Less than 6 hours of sleep can impact your memory and focus. Aim for an earlier bedtime tonight, even 30 minutes can help."
        }
        (_, Bad) => {
            "Feeling down can make studying harder. A short 10-minute walk outside can boost your mood and reset your energy."
        }
        (Medium, _) if sleep < 7.0 => {
            "You're managing, but you could be better rested. Make sure to hydrate well today and consider a short power nap if you feel a slump."
        }
        (Medium, Neutral) => {
            "It's an average day. Why not make it a great one? Tackle one small, easy task on your to-do list to build some momentum."
        }
        (Low, Good) => {
            "You're in a great state to be productive! Use this energy to tackle one of your more challenging subjects today. You've got this!"
        }
        _ => {
            "Consistency is key. Keep up with your healthy habits to maintain your well-being and stay on top of your studies!"
        }
    }
}
