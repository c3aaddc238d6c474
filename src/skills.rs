use crate::constants::{DEFAULT_POWER, SKILL_SLOTS};
use crate::model::Battler;
use crate::types::ElementType;
use phf::phf_map;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

pub const DEFAULT_SKILL_ID: &str = "tackle";

/// Visual cue the renderer plays when the skill is cast.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Animation {
    Whip,
    Burst,
    Wave,
    Spark,
    Slam,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sfx {
    Pluck,
    Flame,
    Splash,
    Zap,
    Hit,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Skill {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub element: ElementType,
    pub power: u32,
    pub animation: Animation,
    pub sfx: Sfx,
}

const fn skill(
    id: &'static str,
    name: &'static str,
    element: ElementType,
    power: u32,
    animation: Animation,
    sfx: Sfx,
) -> Skill {
    Skill {
        id,
        name,
        element,
        power,
        animation,
        sfx,
    }
}

// Catalog order matters: it is the last tier of the fallback slot set.
static SKILLS: [Skill; 10] = [
    skill("tackle", "Tackle", ElementType::Normal, DEFAULT_POWER, Animation::Slam, Sfx::Hit),
    skill("vine_whip", "Vine Whip", ElementType::Grass, 28, Animation::Whip, Sfx::Pluck),
    skill("ember", "Ember", ElementType::Fire, 28, Animation::Burst, Sfx::Flame),
    skill("water_gun", "Water Gun", ElementType::Water, 28, Animation::Wave, Sfx::Splash),
    skill("spark", "Spark", ElementType::Electric, 28, Animation::Spark, Sfx::Zap),
    skill("quick_jab", "Quick Jab", ElementType::Normal, 18, Animation::Slam, Sfx::Hit),
    skill("leaf_blade", "Leaf Blade", ElementType::Grass, 36, Animation::Whip, Sfx::Pluck),
    skill("flame_burst", "Flame Burst", ElementType::Fire, 36, Animation::Burst, Sfx::Flame),
    skill("bubble_beam", "Bubble Beam", ElementType::Water, 36, Animation::Wave, Sfx::Splash),
    skill("thunder_jolt", "Thunder Jolt", ElementType::Electric, 36, Animation::Spark, Sfx::Zap),
];

static SKILL_INDEX: phf::Map<&'static str, usize> = phf_map! {
    "tackle" => 0,
    "vine_whip" => 1,
    "ember" => 2,
    "water_gun" => 3,
    "spark" => 4,
    "quick_jab" => 5,
    "leaf_blade" => 6,
    "flame_burst" => 7,
    "bubble_beam" => 8,
    "thunder_jolt" => 9,
};

pub fn catalog() -> &'static [Skill] {
    &SKILLS
}

pub fn find_skill(skill_id: &str) -> Option<&'static Skill> {
    SKILL_INDEX.get(skill_id).map(|&idx| &SKILLS[idx])
}

/// Unknown ids resolve to the default skill.
pub fn get_skill_by_id(skill_id: &str) -> &'static Skill {
    find_skill(skill_id).unwrap_or(&SKILLS[0])
}

/// The first catalog skill sharing the battler's element, if any.
pub fn own_element_skill(element: ElementType) -> Option<&'static Skill> {
    SKILLS.iter().find(|s| s.element == element)
}

/// Usable moves for `battler`, at most four.
///
/// Known skills are used when the battler has any that exist in the catalog.
/// Otherwise the set is filled from the battler's own-element move, the
/// default move, then catalog order, skipping duplicates.
pub fn resolve_skill_slots(battler: &Battler) -> Vec<&'static Skill> {
    let mut slots: Vec<&'static Skill> = Vec::with_capacity(SKILL_SLOTS);
    if let Some(known) = &battler.known_skills {
        for skill in known.iter().filter_map(|id| find_skill(id)) {
            push_unique(&mut slots, skill);
        }
    }
    if !slots.is_empty() {
        return slots;
    }

    let candidates = own_element_skill(battler.element)
        .into_iter()
        .chain(find_skill(DEFAULT_SKILL_ID))
        .chain(SKILLS.iter());
    for skill in candidates {
        push_unique(&mut slots, skill);
    }
    slots
}

fn push_unique(slots: &mut Vec<&'static Skill>, skill: &'static Skill) {
    if slots.len() < SKILL_SLOTS && !slots.iter().any(|s| s.id == skill.id) {
        slots.push(skill);
    }
}

/// Uniform pick over the resolved slots, used for non-player actors.
pub fn choose_skill<R: Rng + ?Sized>(battler: &Battler, rng: &mut R) -> &'static Skill {
    let slots = resolve_skill_slots(battler);
    slots
        .choose(rng)
        .copied()
        .unwrap_or_else(|| get_skill_by_id(DEFAULT_SKILL_ID))
}

/// Honors `requested` only if it is one of the battler's slots.
pub fn select_skill<R: Rng + ?Sized>(
    battler: &Battler,
    requested: Option<&str>,
    rng: &mut R,
) -> &'static Skill {
    if let Some(id) = requested {
        if let Some(skill) = resolve_skill_slots(battler)
            .into_iter()
            .find(|s| s.id == id)
        {
            return skill;
        }
        tracing::debug!(skill_id = id, battler = %battler.name, "requested skill not in slots, choosing automatically");
    }
    choose_skill(battler, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StatusEffect;
    use rand::rngs::mock::StepRng;

    fn make_battler(element: ElementType, known: Option<&[&str]>) -> Battler {
        Battler {
            name: "Slotty".to_string(),
            level: 5,
            hp: 20,
            max_hp: 20,
            attack: 10,
            defense: 10,
            speed: 10,
            element,
            status: StatusEffect::None,
            known_skills: known.map(|ids| ids.iter().map(|id| id.to_string()).collect()),
        }
    }

    fn ids(slots: &[&'static Skill]) -> Vec<&'static str> {
        slots.iter().map(|s| s.id).collect()
    }

    #[test]
    fn index_matches_catalog() {
        for (idx, skill) in SKILLS.iter().enumerate() {
            assert_eq!(SKILL_INDEX.get(skill.id), Some(&idx));
        }
        assert_eq!(SKILL_INDEX.len(), SKILLS.len());
    }

    #[test]
    fn unknown_id_falls_back_to_default() {
        assert_eq!(get_skill_by_id("does-not-exist").id, DEFAULT_SKILL_ID);
    }

    #[test]
    fn fallback_slots_start_with_own_element() {
        let slots = resolve_skill_slots(&make_battler(ElementType::Water, None));
        assert_eq!(ids(&slots), vec!["water_gun", "tackle", "vine_whip", "ember"]);
    }

    #[test]
    fn fallback_slots_deduplicate_default() {
        let slots = resolve_skill_slots(&make_battler(ElementType::Normal, None));
        assert_eq!(ids(&slots), vec!["tackle", "vine_whip", "ember", "water_gun"]);
    }

    #[test]
    fn known_skills_are_capped_at_four() {
        let known = ["ember", "spark", "tackle", "quick_jab", "leaf_blade"];
        let slots = resolve_skill_slots(&make_battler(ElementType::Fire, Some(&known)));
        assert_eq!(ids(&slots), vec!["ember", "spark", "tackle", "quick_jab"]);
    }

    #[test]
    fn unknown_known_skills_use_fallback() {
        let slots = resolve_skill_slots(&make_battler(ElementType::Grass, Some(&["nope"])));
        assert_eq!(slots[0].id, "vine_whip");
    }

    #[test]
    fn explicit_choice_requires_slot_membership() {
        let battler = make_battler(ElementType::Grass, Some(&["vine_whip", "tackle"]));
        let mut rng = StepRng::new(0, 0);
        assert_eq!(select_skill(&battler, Some("tackle"), &mut rng).id, "tackle");
        // Not one of the slots: automatic choice (first slot with a zero rng).
        assert_eq!(select_skill(&battler, Some("thunder_jolt"), &mut rng).id, "vine_whip");
    }
}
