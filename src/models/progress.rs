//! Progress tracker: smoke-free streak, money saved and daily moods.

use serde::{Deserialize, Serialize};

/// Mood recorded for a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Neutral,
    Sad,
}

/// One mood entry; `date` is `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMood {
    pub date: String,
    pub mood: Mood,
}

/// Per-user progress stored in Firestore (`progress/{userId}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub user_id: String,
    #[serde(default)]
    pub smoke_free_streak: u32,
    #[serde(default)]
    pub money_saved: f64,
    #[serde(default)]
    pub last_updated: String,
    #[serde(default)]
    pub daily_moods: Vec<DailyMood>,
}

impl Progress {
    pub fn empty(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            smoke_free_streak: 0,
            money_saved: 0.0,
            last_updated: String::new(),
            daily_moods: Vec::new(),
        }
    }

    /// Record the mood for a date, replacing any earlier entry for that date.
    /// Entries stay sorted by date.
    pub fn record_mood(&mut self, date: &str, mood: Mood) {
        match self.daily_moods.iter_mut().find(|m| m.date == date) {
            Some(entry) => entry.mood = mood,
            None => {
                self.daily_moods.push(DailyMood {
                    date: date.to_string(),
                    mood,
                });
                self.daily_moods.sort_by(|a, b| a.date.cmp(&b.date));
            }
        }
    }
}
