use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Normal,
    Fire,
    Water,
    Grass,
    Electric,
}

impl ElementType {
    pub const ALL: [ElementType; 5] = [
        ElementType::Normal,
        ElementType::Fire,
        ElementType::Water,
        ElementType::Grass,
        ElementType::Electric,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::Normal => "normal",
            ElementType::Fire => "fire",
            ElementType::Water => "water",
            ElementType::Grass => "grass",
            ElementType::Electric => "electric",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusEffect {
    #[default]
    None,
    Burn,
    Poison,
}

impl StatusEffect {
    pub fn is_none(self) -> bool {
        matches!(self, StatusEffect::None)
    }

    /// Burn and poison both chip HP at the end of a turn.
    pub fn deals_chip_damage(self) -> bool {
        matches!(self, StatusEffect::Burn | StatusEffect::Poison)
    }
}

// Directed chart: the attacking element is matched first, so fire→grass and
// grass→fire are separate rows.
pub fn type_multiplier(attacking: ElementType, defending: ElementType) -> f64 {
    use ElementType::*;
    match attacking {
        Fire => match defending {
            Grass => 2.0,
            Water => 0.5,
            _ => 1.0,
        },
        Water => match defending {
            Fire => 2.0,
            Grass => 0.5,
            _ => 1.0,
        },
        Grass => match defending {
            Water => 2.0,
            Fire => 0.5,
            _ => 1.0,
        },
        Electric => match defending {
            Water => 2.0,
            Grass => 0.5,
            _ => 1.0,
        },
        Normal => 1.0,
    }
}

/// Output multiplier for an attacker carrying `status`.
pub fn status_multiplier(status: StatusEffect) -> f64 {
    match status {
        StatusEffect::Burn => 0.8,
        StatusEffect::None | StatusEffect::Poison => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_matches_expected_pairs() {
        assert_eq!(type_multiplier(ElementType::Fire, ElementType::Grass), 2.0);
        assert_eq!(type_multiplier(ElementType::Fire, ElementType::Water), 0.5);
        assert_eq!(type_multiplier(ElementType::Electric, ElementType::Water), 2.0);
        assert_eq!(type_multiplier(ElementType::Electric, ElementType::Fire), 1.0);
    }

    #[test]
    fn normal_is_neutral_against_everything() {
        for target in ElementType::ALL {
            assert_eq!(type_multiplier(ElementType::Normal, target), 1.0);
        }
    }

    #[test]
    fn chart_is_not_symmetric() {
        assert_eq!(type_multiplier(ElementType::Electric, ElementType::Water), 2.0);
        assert_eq!(type_multiplier(ElementType::Water, ElementType::Electric), 1.0);
    }

    #[test]
    fn only_burn_weakens_output() {
        assert_eq!(status_multiplier(StatusEffect::Burn), 0.8);
        assert_eq!(status_multiplier(StatusEffect::Poison), 1.0);
        assert_eq!(status_multiplier(StatusEffect::None), 1.0);
    }
}
