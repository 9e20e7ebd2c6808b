use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The four fixed round setups offered on the setup screen.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize, strum_macros::Display,
)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
    Insane,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyPreset {
    pub label: &'static str,
    pub pair_count: usize,
    pub duration_secs: u64,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Insane,
    ];

    pub fn preset(self) -> DifficultyPreset {
        let (label, pair_count, duration_secs) = match self {
            Difficulty::Easy => ("Easy", 4, 30),
            Difficulty::Medium => ("Medium", 6, 45),
            Difficulty::Hard => ("Hard", 8, 45),
            Difficulty::Insane => ("Insane", 8, 30),
        };
        DifficultyPreset {
            label,
            pair_count,
            duration_secs,
        }
    }

    /// Next preset in menu order, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|d| *d == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|d| *d == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_table() {
        let table: Vec<_> = Difficulty::ALL
            .iter()
            .map(|d| {
                let p = d.preset();
                (p.label, p.pair_count, p.duration_secs)
            })
            .collect();

        assert_eq!(
            table,
            vec![
                ("Easy", 4, 30),
                ("Medium", 6, 45),
                ("Hard", 8, 45),
                ("Insane", 8, 30)
            ]
        );
    }

    #[test]
    fn test_display_matches_label() {
        for d in Difficulty::ALL {
            assert_eq!(d.to_string(), d.preset().label);
        }
    }

    #[test]
    fn test_menu_cycling_wraps() {
        assert_eq!(Difficulty::Insane.next(), Difficulty::Easy);
        assert_eq!(Difficulty::Easy.prev(), Difficulty::Insane);
        assert_eq!(Difficulty::Medium.next().prev(), Difficulty::Medium);
    }
}
