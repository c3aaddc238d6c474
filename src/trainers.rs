use crate::model::{Battler, TrainerBattle};
use crate::types::{ElementType, StatusEffect};

fn trainer(
    id: &str,
    name: &str,
    badge: &str,
    enemy_name: &str,
    element: ElementType,
    level: u32,
    skills: &[&str],
) -> TrainerBattle {
    TrainerBattle {
        id: id.to_string(),
        name: name.to_string(),
        badge: badge.to_string(),
        enemy: Battler {
            name: enemy_name.to_string(),
            level,
            hp: 22 + level * 2,
            max_hp: 22 + level * 2,
            attack: 8 + level,
            defense: 7 + level,
            speed: 6 + level,
            element,
            status: StatusEffect::None,
            known_skills: Some(skills.iter().map(|s| s.to_string()).collect()),
        },
    }
}

/// The gym roster, easiest first.
pub fn gym_trainers() -> Vec<TrainerBattle> {
    vec![
        trainer(
            "junior-mia",
            "Junior Mia",
            "Bud Badge",
            "Budling",
            ElementType::Grass,
            6,
            &["vine_whip", "tackle"],
        ),
        trainer(
            "ace-ryu",
            "Ace Ryu",
            "Tide Badge",
            "Aquava",
            ElementType::Water,
            8,
            &["water_gun", "bubble_beam", "tackle"],
        ),
        trainer(
            "leader-nova",
            "Leader Nova",
            "Volt Badge",
            "Sparkit",
            ElementType::Electric,
            10,
            &["spark", "thunder_jolt", "quick_jab"],
        ),
    ]
}

pub fn find_trainer(trainer_id: &str) -> Option<TrainerBattle> {
    gym_trainers().into_iter().find(|t| t.id == trainer_id)
}
