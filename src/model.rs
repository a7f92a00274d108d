use crate::state::{Hazards, Weather};
use crate::types::{stealth_rock_multiplier, Type};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

/// Major status conditions. Wire format matches the observation feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Burn,
    Poison,
    Toxic,
    Paralysis,
    Sleep,
    Freeze,
}

impl Status {
    /// Column suffix used by the feature schema.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Status::Burn => "BRN",
            Status::Poison => "PSN",
            Status::Toxic => "TOX",
            Status::Paralysis => "PAR",
            Status::Sleep => "SLP",
            Status::Freeze => "FRZ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Volatile {
    Confusion,
    Taunt,
    Encore,
    LeechSeed,
    Drowsy,
    Cursed,
}

/// Ailment a move may inflict, as tagged in the move data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AilmentKind {
    #[default]
    None,
    Burn,
    Paralysis,
    Sleep,
    Poison,
    Freeze,
    Confusion,
    #[serde(other)]
    Unmodeled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    Atk,
    Def,
    Spa,
    Spd,
    Spe,
    Acc,
    Eva,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatChange {
    pub stat: Stat,
    pub change: i8,
}

/// Who a move points at. Defaults to the opposing active slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoveTarget {
    #[default]
    SelectedPokemon,
    AllOpponents,
    User,
    UserField,
    OpponentField,
    EntireField,
}

impl MoveTarget {
    pub fn hits_opponent(self) -> bool {
        matches!(
            self,
            MoveTarget::SelectedPokemon | MoveTarget::AllOpponents | MoveTarget::OpponentField
        )
    }
}

fn default_priority() -> i32 {
    0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Move {
    /// Kebab-case move id, e.g. "stealth-rock".
    pub name: String,
    #[serde(rename = "type")]
    pub move_type: Type,
    pub category: MoveCategory,
    #[serde(default)]
    pub power: u32,
    /// None means the move cannot miss.
    #[serde(default)]
    pub accuracy: Option<f32>,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default)]
    pub target: MoveTarget,
    #[serde(default)]
    pub ailment: AilmentKind,
    /// Percent chance of the secondary ailment on a damaging move. 0 on a
    /// status move means the ailment is the move's whole effect.
    #[serde(default)]
    pub ailment_chance: f32,
    #[serde(default)]
    pub flinch_chance: f32,
    /// Percent chance of the secondary stat changes on a damaging move.
    #[serde(default)]
    pub stat_chance: f32,
    #[serde(default)]
    pub stat_changes: Vec<StatChange>,
    /// Secondary stat changes land on the user instead of the target
    /// (damage+raise moves).
    #[serde(default)]
    pub self_stat_changes: bool,
    /// Percent of max HP restored on use.
    #[serde(default)]
    pub healing: f32,
    /// Percent of dealt damage drained; negative values are recoil.
    #[serde(default)]
    pub drain: f32,
    #[serde(default)]
    pub crit_rate: u8,
}

impl Move {
    pub fn id(&self) -> &str {
        &self.name
    }

    pub fn is_damaging(&self) -> bool {
        self.category != MoveCategory::Status
    }

    pub fn is_max_move(&self) -> bool {
        self.name.starts_with("max-") || self.name.starts_with("g-max-")
    }
}

/// Leveled (not base) stats, in HP points.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Stats {
    pub hp: f32,
    pub atk: f32,
    pub def: f32,
    pub spa: f32,
    pub spd: f32,
    pub spe: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boosts {
    #[serde(default)]
    pub atk: i8,
    #[serde(default)]
    pub def: i8,
    #[serde(default)]
    pub spa: i8,
    #[serde(default)]
    pub spd: i8,
    #[serde(default)]
    pub spe: i8,
    #[serde(default)]
    pub acc: i8,
    #[serde(default)]
    pub eva: i8,
}

impl Boosts {
    pub fn get(&self, stat: Stat) -> i8 {
        match stat {
            Stat::Atk => self.atk,
            Stat::Def => self.def,
            Stat::Spa => self.spa,
            Stat::Spd => self.spd,
            Stat::Spe => self.spe,
            Stat::Acc => self.acc,
            Stat::Eva => self.eva,
        }
    }

    pub fn set(&mut self, stat: Stat, value: i8) {
        let slot = match stat {
            Stat::Atk => &mut self.atk,
            Stat::Def => &mut self.def,
            Stat::Spa => &mut self.spa,
            Stat::Spd => &mut self.spd,
            Stat::Spe => &mut self.spe,
            Stat::Acc => &mut self.acc,
            Stat::Eva => &mut self.eva,
        };
        *slot = value;
    }
}

/// Stage multiplier for the five battle stats: (2+n)/2 up, 2/(2-n) down.
pub fn stage_multiplier(stage: i8) -> f32 {
    if stage >= 0 {
        (2.0 + stage as f32) / 2.0
    } else {
        2.0 / (2.0 - stage as f32)
    }
}

fn full_hp() -> f32 {
    100.0
}

fn default_level() -> u8 {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combatant {
    pub name: String,
    #[serde(default = "default_level")]
    pub level: u8,
    /// Remaining HP as a percentage of max HP, 0..=100. The observation feed
    /// only exposes percentages for the opponent, so both sides use them.
    #[serde(default = "full_hp")]
    pub hp: f32,
    pub types: Vec<Type>,
    pub stats: Stats,
    #[serde(default)]
    pub ability: String,
    #[serde(default)]
    pub item: Option<String>,
    /// Body weight in kilograms (weight-scaled move power).
    #[serde(default)]
    pub weight: f32,
    #[serde(default)]
    pub boosts: Boosts,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub sleep_turns: u8,
    /// Percent of max HP the next toxic tick will take; 0 until poisoned.
    #[serde(default)]
    pub next_toxic_damage: f32,
    #[serde(default)]
    pub volatiles: Vec<Volatile>,
    #[serde(default)]
    pub confusion_turns: u8,
    /// Remaining substitute HP as a percentage of the owner's max HP.
    #[serde(default)]
    pub substitute_hp: f32,
    #[serde(default)]
    pub fainted: bool,
    #[serde(default)]
    pub in_battle: bool,
    #[serde(default)]
    pub is_revealed: bool,
    #[serde(default)]
    pub is_dynamaxed: bool,
    #[serde(default)]
    pub turns_dynamaxed: u8,
    /// Moves actually seen (always complete for my own side).
    #[serde(default)]
    pub known_moves: Vec<Move>,
    /// Plausible moves for a partially revealed opponent.
    #[serde(default)]
    pub possible_moves: Vec<Move>,
    #[serde(default)]
    pub max_moves: Vec<Move>,
    #[serde(default)]
    pub last_used_move: Option<String>,
    #[serde(default)]
    pub has_moved: bool,
    #[serde(default)]
    pub is_protected: bool,
    #[serde(default)]
    pub flinched: bool,
    /// HP points of the last hit taken, for Counter/Mirror Coat.
    #[serde(default)]
    pub last_damage_taken: f32,
}

impl Combatant {
    pub fn has_ability(&self, name: &str) -> bool {
        self.ability.eq_ignore_ascii_case(name)
    }

    pub fn has_item(&self, name: &str) -> bool {
        self.item
            .as_deref()
            .map_or(false, |item| item.eq_ignore_ascii_case(name))
    }

    pub fn has_type(&self, t: Type) -> bool {
        self.types.contains(&t)
    }

    pub fn has_volatile(&self, v: Volatile) -> bool {
        self.volatiles.contains(&v)
    }

    pub fn is_grounded(&self) -> bool {
        !self.has_type(Type::Flying)
            && !self.has_ability("Levitate")
            && !self.has_item("Air Balloon")
    }

    /// Max HP in points; dynamax doubles it.
    pub fn max_hp(&self) -> f32 {
        if self.is_dynamaxed {
            self.stats.hp * 2.0
        } else {
            self.stats.hp
        }
    }

    pub fn current_hp_points(&self) -> f32 {
        self.max_hp() * self.hp / 100.0
    }

    pub fn heal(&mut self, points: f32) {
        if self.fainted {
            return;
        }
        let max = self.max_hp();
        self.hp = ((self.current_hp_points() + points) / max * 100.0).min(100.0);
    }

    /// Applies a hit of `damage` HP points. Returns false if this faints the
    /// target. Substitute absorbs first; survival items and abilities are
    /// consumed or applied here.
    pub fn take_damage(&mut self, damage: f32) -> bool {
        if damage <= 0.0 {
            return true;
        }
        let max = self.max_hp();
        if self.substitute_hp > 0.0 {
            let remaining = max * self.substitute_hp / 100.0 - damage;
            self.substitute_hp = (remaining / max * 100.0).max(0.0);
            return true;
        }
        let mut damage = damage;
        let current = self.current_hp_points();
        if (self.has_ability("Sturdy") || self.has_item("Focus Sash"))
            && self.hp >= 100.0
            && damage >= current
        {
            if self.has_item("Focus Sash") {
                self.item = None;
            }
            damage = current - 1.0;
        } else if (self.has_ability("Multiscale") || self.has_ability("Shadow Shield"))
            && self.hp >= 100.0
        {
            damage *= 0.5;
        } else if self.has_ability("Stamina") {
            self.boost_stat(Stat::Def, 1);
        }
        self.hp = ((current - damage) / max * 100.0).max(0.0);
        self.last_damage_taken = damage;
        if self.hp <= 0.0 {
            self.faint();
            return false;
        }
        if self.hp < 50.0 && self.has_item("Sitrus Berry") {
            self.item = None;
            self.hp = (self.hp + 25.0).min(100.0);
        }
        if self.has_item("Air Balloon") {
            self.item = None;
        }
        true
    }

    pub fn faint(&mut self) {
        self.fainted = true;
        self.switch_out();
        self.hp = 0.0;
        self.status = None;
    }

    /// Major status with type/ability/item immunities. Returns whether the
    /// status stuck.
    pub fn apply_status(&mut self, status: Status) -> bool {
        if self.status.is_some() || self.fainted || self.substitute_hp > 0.0 {
            return false;
        }
        let immune = match status {
            Status::Paralysis => self.has_type(Type::Electric) || self.has_ability("Limber"),
            Status::Burn => self.has_type(Type::Fire) || self.has_ability("Water Veil"),
            Status::Poison | Status::Toxic => {
                ((self.has_type(Type::Poison) || self.has_type(Type::Steel))
                    && !self.has_ability("Corrosion"))
                    || self.has_ability("Immunity")
            }
            Status::Freeze => self.has_type(Type::Ice) || self.has_ability("Magma Armor"),
            Status::Sleep => self.has_ability("Vital Spirit") || self.has_ability("Insomnia"),
        };
        if immune {
            return false;
        }
        if self.has_item("Lum Berry") || (status == Status::Sleep && self.has_item("Chesto Berry")) {
            self.item = None;
            return false;
        }
        self.status = Some(status);
        match status {
            Status::Sleep => self.sleep_turns = 0,
            Status::Toxic => self.next_toxic_damage = 6.25,
            _ => {}
        }
        true
    }

    /// Volatile condition with its immunities. Returns whether it stuck.
    pub fn add_volatile(&mut self, v: Volatile) -> bool {
        if self.fainted || self.has_volatile(v) {
            return false;
        }
        let blocked = match v {
            Volatile::Confusion => self.substitute_hp > 0.0 || self.has_ability("Own Tempo"),
            Volatile::LeechSeed => self.substitute_hp > 0.0 || self.has_type(Type::Grass),
            Volatile::Taunt => self.has_ability("Oblivious"),
            Volatile::Encore => self.last_used_move.is_none(),
            Volatile::Drowsy => {
                self.substitute_hp > 0.0
                    || self.status.is_some()
                    || self.has_ability("Vital Spirit")
                    || self.has_ability("Insomnia")
            }
            Volatile::Cursed => false,
        };
        if blocked {
            return false;
        }
        if v == Volatile::Confusion {
            self.confusion_turns = 0;
        }
        self.volatiles.push(v);
        true
    }

    pub fn remove_volatile(&mut self, v: Volatile) {
        self.volatiles.retain(|&held| held != v);
        if v == Volatile::Confusion {
            self.confusion_turns = 0;
        }
    }

    /// Stage change with Clear Body / Contrary / Simple / retaliation
    /// abilities applied, clamped to +-6.
    pub fn boost_stat(&mut self, stat: Stat, change: i8) {
        if self.fainted {
            return;
        }
        let mut change = change;
        if change < 0 {
            if self.has_ability("Clear Body")
                || self.has_ability("White Smoke")
                || self.has_ability("Full Metal Body")
            {
                return;
            }
            if self.has_ability("Competitive") {
                let current = self.boosts.get(Stat::Spa);
                self.boosts.set(Stat::Spa, (current + 2).clamp(-6, 6));
            }
            if self.has_ability("Defiant") {
                let current = self.boosts.get(Stat::Atk);
                self.boosts.set(Stat::Atk, (current + 2).clamp(-6, 6));
            }
        }
        if self.has_ability("Contrary") {
            change = -change;
        }
        if self.has_ability("Simple") {
            change = change.saturating_mul(2);
        }
        let value = (self.boosts.get(stat) + change).clamp(-6, 6);
        self.boosts.set(stat, value);
    }

    /// Clears per-battle state on leaving the field.
    pub fn switch_out(&mut self) {
        self.boosts = Boosts::default();
        self.volatiles.clear();
        self.confusion_turns = 0;
        self.substitute_hp = 0.0;
        self.is_dynamaxed = false;
        self.turns_dynamaxed = 0;
        self.in_battle = false;
        self.last_used_move = None;
        self.is_protected = false;
        self.flinched = false;
        self.has_moved = false;
        self.last_damage_taken = 0.0;
        if self.fainted {
            return;
        }
        if self.has_ability("Regenerator") {
            self.heal(self.stats.hp / 3.0);
        }
        if self.has_ability("Natural Cure") {
            self.status = None;
            self.next_toxic_damage = 0.0;
        }
    }

    /// Entry: hazard chip and traps. Returns false if the hazards faint the
    /// switch-in. A grounded Poison type reports absorbed toxic spikes
    /// through the caller (see `BattleState::perform_switch`).
    pub fn switch_in(&mut self, hazards: &Hazards) -> bool {
        self.in_battle = true;
        self.is_revealed = true;
        self.has_moved = false;
        if self.has_item("Heavy-Duty Boots") || self.has_ability("Magic Guard") {
            return true;
        }
        if hazards.stealth_rock {
            let chip = self.stats.hp / 8.0 * stealth_rock_multiplier(&self.types);
            if !self.take_damage(chip) {
                return false;
            }
        }
        if self.is_grounded() {
            if hazards.spikes && !self.take_damage(self.stats.hp / 8.0) {
                return false;
            }
            if hazards.sticky_web {
                self.boost_stat(Stat::Spe, -1);
            }
            if hazards.toxic_spikes && !self.has_type(Type::Poison) {
                self.apply_status(Status::Poison);
            }
        }
        true
    }

    /// Stats after stages, status, items, abilities, and tailwind.
    pub fn effective_stats(&self, tailwind: bool, weather: Option<Weather>) -> Stats {
        let mut s = self.stats;
        if self.is_dynamaxed {
            s.hp *= 2.0;
        }
        s.atk *= stage_multiplier(self.boosts.atk);
        s.def *= stage_multiplier(self.boosts.def);
        s.spa *= stage_multiplier(self.boosts.spa);
        s.spd *= stage_multiplier(self.boosts.spd);
        s.spe *= stage_multiplier(self.boosts.spe);
        if self.status == Some(Status::Paralysis) {
            s.spe *= 0.5;
        }
        if tailwind {
            s.spe *= 2.0;
        }
        match weather {
            Some(Weather::Sun) if self.has_ability("Chlorophyll") => s.spe *= 2.0,
            Some(Weather::Rain) if self.has_ability("Swift Swim") => s.spe *= 2.0,
            Some(Weather::Sandstorm) if self.has_ability("Sand Rush") => s.spe *= 2.0,
            Some(Weather::Hail) if self.has_ability("Slush Rush") => s.spe *= 2.0,
            _ => {}
        }
        if !self.is_dynamaxed {
            if self.has_item("Choice Band") {
                s.atk *= 1.5;
            } else if self.has_item("Choice Specs") {
                s.spa *= 1.5;
            } else if self.has_item("Choice Scarf") {
                s.spe *= 1.5;
            }
        }
        if self.has_item("Assault Vest") {
            s.spd *= 1.5;
        }
        if self.has_item("Eviolite") {
            s.def *= 1.5;
            s.spd *= 1.5;
        }
        if self.has_ability("Huge Power") || self.has_ability("Pure Power") {
            s.atk *= 2.0;
        }
        if self.has_ability("Fur Coat") {
            s.def *= 2.0;
        }
        if self.has_ability("Marvel Scale") && self.status.is_some() {
            s.def *= 1.5;
        }
        s
    }

    /// Locked into the last move by a choice item.
    pub fn choice_locked(&self) -> Option<&str> {
        let locked = !self.is_dynamaxed
            && (self.has_item("Choice Band")
                || self.has_item("Choice Specs")
                || self.has_item("Choice Scarf"));
        if locked {
            self.last_used_move.as_deref()
        } else {
            None
        }
    }
}
