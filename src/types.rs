use serde::{Deserialize, Serialize};

/// The eighteen modern types. Wire format is the lowercase name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    Normal,
    Fire,
    Water,
    Electric,
    Grass,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

impl Type {
    pub const ALL: [Type; 18] = [
        Type::Normal,
        Type::Fire,
        Type::Water,
        Type::Electric,
        Type::Grass,
        Type::Ice,
        Type::Fighting,
        Type::Poison,
        Type::Ground,
        Type::Flying,
        Type::Psychic,
        Type::Bug,
        Type::Rock,
        Type::Ghost,
        Type::Dragon,
        Type::Dark,
        Type::Steel,
        Type::Fairy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Type::Normal => "normal",
            Type::Fire => "fire",
            Type::Water => "water",
            Type::Electric => "electric",
            Type::Grass => "grass",
            Type::Ice => "ice",
            Type::Fighting => "fighting",
            Type::Poison => "poison",
            Type::Ground => "ground",
            Type::Flying => "flying",
            Type::Psychic => "psychic",
            Type::Bug => "bug",
            Type::Rock => "rock",
            Type::Ghost => "ghost",
            Type::Dragon => "dragon",
            Type::Dark => "dark",
            Type::Steel => "steel",
            Type::Fairy => "fairy",
        }
    }
}

/// Multiplier for one attacking type into one defending type.
pub fn effectiveness(attacking: Type, defending: Type) -> f32 {
    use Type::*;
    match attacking {
        Normal => match defending {
            Rock | Steel => 0.5,
            Ghost => 0.0,
            _ => 1.0,
        },
        Fire => match defending {
            Grass | Ice | Bug | Steel => 2.0,
            Fire | Water | Rock | Dragon => 0.5,
            _ => 1.0,
        },
        Water => match defending {
            Fire | Ground | Rock => 2.0,
            Water | Grass | Dragon => 0.5,
            _ => 1.0,
        },
        Electric => match defending {
            Water | Flying => 2.0,
            Electric | Grass | Dragon => 0.5,
            Ground => 0.0,
            _ => 1.0,
        },
        Grass => match defending {
            Water | Ground | Rock => 2.0,
            Fire | Grass | Poison | Flying | Bug | Dragon | Steel => 0.5,
            _ => 1.0,
        },
        Ice => match defending {
            Grass | Ground | Flying | Dragon => 2.0,
            Fire | Water | Ice | Steel => 0.5,
            _ => 1.0,
        },
        Fighting => match defending {
            Normal | Ice | Rock | Dark | Steel => 2.0,
            Poison | Flying | Psychic | Bug | Fairy => 0.5,
            Ghost => 0.0,
            _ => 1.0,
        },
        Poison => match defending {
            Grass | Fairy => 2.0,
            Poison | Ground | Rock | Ghost => 0.5,
            Steel => 0.0,
            _ => 1.0,
        },
        Ground => match defending {
            Fire | Electric | Poison | Rock | Steel => 2.0,
            Grass | Bug => 0.5,
            Flying => 0.0,
            _ => 1.0,
        },
        Flying => match defending {
            Grass | Fighting | Bug => 2.0,
            Electric | Rock | Steel => 0.5,
            _ => 1.0,
        },
        Psychic => match defending {
            Fighting | Poison => 2.0,
            Psychic | Steel => 0.5,
            Dark => 0.0,
            _ => 1.0,
        },
        Bug => match defending {
            Grass | Psychic | Dark => 2.0,
            Fire | Fighting | Poison | Flying | Ghost | Steel | Fairy => 0.5,
            _ => 1.0,
        },
        Rock => match defending {
            Fire | Ice | Flying | Bug => 2.0,
            Fighting | Ground | Steel => 0.5,
            _ => 1.0,
        },
        Ghost => match defending {
            Ghost | Psychic => 2.0,
            Dark => 0.5,
            Normal => 0.0,
            _ => 1.0,
        },
        Dragon => match defending {
            Dragon => 2.0,
            Steel => 0.5,
            Fairy => 0.0,
            _ => 1.0,
        },
        Dark => match defending {
            Psychic | Ghost => 2.0,
            Fighting | Dark | Fairy => 0.5,
            _ => 1.0,
        },
        Steel => match defending {
            Ice | Rock | Fairy => 2.0,
            Fire | Water | Electric | Steel => 0.5,
            _ => 1.0,
        },
        Fairy => match defending {
            Fighting | Dragon | Dark => 2.0,
            Fire | Poison | Steel => 0.5,
            _ => 1.0,
        },
    }
}

/// Freeze-Dry hits Water super-effectively; otherwise it is an Ice attack.
fn freeze_dry_effectiveness(defending: Type) -> f32 {
    if defending == Type::Water {
        2.0
    } else {
        effectiveness(Type::Ice, defending)
    }
}

/// Combined multiplier of an attack into a dual (or mono) typed target.
/// `move_id` selects override rows (currently only freeze-dry).
pub fn attack_effectiveness(move_id: &str, attacking: Type, defending: &[Type]) -> f32 {
    defending
        .iter()
        .map(|&t| {
            if move_id == "freeze-dry" {
                freeze_dry_effectiveness(t)
            } else {
                effectiveness(attacking, t)
            }
        })
        .product()
}

/// Stealth Rock chip scales with the Rock matchup of the switch-in.
pub fn stealth_rock_multiplier(defending: &[Type]) -> f32 {
    defending
        .iter()
        .map(|&t| effectiveness(Type::Rock, t))
        .product()
}
