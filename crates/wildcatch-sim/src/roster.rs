//! Built-in species, moves and a small type chart for the headless driver.

use std::sync::Arc;

use wildcatch_core::creature::{
    BaseStats, BehaviorKind, ElementType, GrowthRate, LearnableMove, MoveCategory, MoveDef,
    Species,
};
use wildcatch_core::move_resolver::TypeChart;

fn mv(
    name: &str,
    element: ElementType,
    category: MoveCategory,
    power: u16,
    accuracy: u8,
    uses: u8,
) -> Arc<MoveDef> {
    Arc::new(MoveDef::new(name, element, category, power, accuracy, uses))
}

fn learnset(moves: Vec<(u8, Arc<MoveDef>)>) -> Vec<LearnableMove> {
    moves
        .into_iter()
        .map(|(level, def)| LearnableMove { level, def })
        .collect()
}

/// The player's starter: a fire creature.
pub fn emberkit() -> Arc<Species> {
    Arc::new(Species {
        name: "Emberkit".to_string(),
        primary_type: ElementType::Fire,
        secondary_type: None,
        catch_rate: 0.45,
        base_stats: BaseStats {
            hp: 45,
            attack: 52,
            defense: 43,
            sp_attack: 60,
            sp_defense: 50,
            speed: 65,
        },
        behavior: BehaviorKind::Friendly,
        growth_rate: GrowthRate::MediumSlow,
        learnset: learnset(vec![
            (1, mv("Scratch", ElementType::Normal, MoveCategory::Physical, 40, 100, 35)),
            (1, mv("Growl", ElementType::Normal, MoveCategory::Status, 0, 100, 40)),
            (7, mv("Ember", ElementType::Fire, MoveCategory::Special, 40, 100, 25)),
        ]),
    })
}

/// The wild opponent: a grass creature.
pub fn sproutle() -> Arc<Species> {
    Arc::new(Species {
        name: "Sproutle".to_string(),
        primary_type: ElementType::Grass,
        secondary_type: None,
        catch_rate: 0.45,
        base_stats: BaseStats {
            hp: 45,
            attack: 49,
            defense: 49,
            sp_attack: 65,
            sp_defense: 65,
            speed: 45,
        },
        behavior: BehaviorKind::Idle,
        growth_rate: GrowthRate::MediumSlow,
        learnset: learnset(vec![
            (1, mv("Tackle", ElementType::Normal, MoveCategory::Physical, 40, 100, 35)),
            (3, mv("Vine Whip", ElementType::Grass, MoveCategory::Physical, 45, 100, 25)),
        ]),
    })
}

/// Fire, water and grass triangle; everything else is neutral.
#[derive(Debug, Clone, Copy, Default)]
pub struct StarterChart;

impl StarterChart {
    fn single(attack: ElementType, defend: ElementType) -> f32 {
        use ElementType::{Fire, Grass, Water};
        match (attack, defend) {
            (Fire, Grass) | (Water, Fire) | (Grass, Water) => 2.0,
            (Fire, Fire | Water) | (Water, Water | Grass) | (Grass, Grass | Fire) => 0.5,
            _ => 1.0,
        }
    }
}

impl TypeChart for StarterChart {
    fn effectiveness(&self, attack: ElementType, defender: &Species) -> f32 {
        let primary = Self::single(attack, defender.primary_type);
        let secondary = defender
            .secondary_type
            .map_or(1.0, |t| Self::single(attack, t));
        primary * secondary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fire_beats_grass() {
        let chart = StarterChart;
        assert!((chart.effectiveness(ElementType::Fire, &sproutle()) - 2.0).abs() < f32::EPSILON);
        assert!((chart.effectiveness(ElementType::Grass, &emberkit()) - 0.5).abs() < f32::EPSILON);
        assert!((chart.effectiveness(ElementType::Normal, &emberkit()) - 1.0).abs() < f32::EPSILON);
    }
}
