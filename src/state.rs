use crate::model::{Combatant, Stat, Status, Volatile};
use crate::AdvisorError;
use serde::{Deserialize, Serialize};

/// Which side of the field, from the agent's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Mine,
    Foe,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Mine => Side::Foe,
            Side::Foe => Side::Mine,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    Sun,
    Rain,
    Sandstorm,
    Hail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Electric,
    Grassy,
    Psychic,
    Misty,
}

/// Closed interval of turns an effect may persist. The observed duration of
/// opposing effects is uncertain (extension items are hidden), so both ends
/// are tracked; expiry follows the upper bound.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TurnRange {
    #[serde(default)]
    pub min: u8,
    #[serde(default)]
    pub max: u8,
}

impl TurnRange {
    pub fn new(min: u8, max: u8) -> Self {
        TurnRange { min, max }
    }

    /// Advances one turn; returns false once the interval is exhausted.
    pub fn tick(&mut self) -> bool {
        self.min = self.min.saturating_sub(1);
        self.max = self.max.saturating_sub(1);
        self.max > 0
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Screen {
    #[serde(default)]
    pub is_up: bool,
    #[serde(default)]
    pub turns: TurnRange,
}

impl Screen {
    pub fn raise(&mut self, turns: u8) {
        self.is_up = true;
        self.turns = TurnRange::new(turns, turns);
    }

    fn tick(&mut self) {
        if self.is_up && !self.turns.tick() {
            self.is_up = false;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Tailwind {
    #[serde(default)]
    pub is_up: bool,
    #[serde(default)]
    pub turns: u8,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Hazards {
    #[serde(default)]
    pub stealth_rock: bool,
    #[serde(default)]
    pub spikes: bool,
    #[serde(default)]
    pub toxic_spikes: bool,
    #[serde(default)]
    pub sticky_web: bool,
}

impl Hazards {
    pub fn any(&self) -> bool {
        self.stealth_rock || self.spikes || self.toxic_spikes || self.sticky_web
    }

    pub fn damaging(&self) -> bool {
        self.stealth_rock || self.spikes
    }

    pub fn clear(&mut self) {
        *self = Hazards::default();
    }
}

/// One side's half of the field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SideField {
    #[serde(default)]
    pub reflect: Screen,
    #[serde(default)]
    pub light_screen: Screen,
    #[serde(default)]
    pub aurora_veil: Screen,
    #[serde(default)]
    pub tailwind: Tailwind,
    #[serde(default)]
    pub hazards: Hazards,
}

impl SideField {
    pub fn physical_screen(&self) -> bool {
        self.reflect.is_up || self.aurora_veil.is_up
    }

    pub fn special_screen(&self) -> bool {
        self.light_screen.is_up || self.aurora_veil.is_up
    }

    fn tick(&mut self) {
        self.reflect.tick();
        self.light_screen.tick();
        self.aurora_veil.tick();
        if self.tailwind.is_up {
            self.tailwind.turns = self.tailwind.turns.saturating_sub(1);
            if self.tailwind.turns == 0 {
                self.tailwind.is_up = false;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WeatherState {
    #[serde(default)]
    pub kind: Option<Weather>,
    #[serde(default)]
    pub turns: TurnRange,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TerrainState {
    #[serde(default)]
    pub kind: Option<Terrain>,
    #[serde(default)]
    pub turns: TurnRange,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TrickRoom {
    #[serde(default)]
    pub is_up: bool,
    #[serde(default)]
    pub turns: u8,
}

/// Everything the agent knows about the battle at a decision point. My roster
/// is complete; the opposing roster grows as members are revealed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleState {
    #[serde(default)]
    pub opponent_name: String,
    #[serde(default)]
    pub elo: f32,
    pub my_team: Vec<Combatant>,
    pub foe_team: Vec<Combatant>,
    #[serde(default)]
    pub my_lead: usize,
    #[serde(default)]
    pub foe_lead: usize,
    #[serde(default)]
    pub my_field: SideField,
    #[serde(default)]
    pub foe_field: SideField,
    #[serde(default)]
    pub my_dynamax_available: bool,
    #[serde(default)]
    pub foe_dynamax_available: bool,
    #[serde(default)]
    pub my_wish_turns: u8,
    #[serde(default)]
    pub foe_wish_turns: u8,
    #[serde(default)]
    pub weather: WeatherState,
    #[serde(default)]
    pub terrain: TerrainState,
    #[serde(default)]
    pub trick_room: TrickRoom,
    #[serde(default)]
    pub turn: u32,
}

impl BattleState {
    pub fn team(&self, side: Side) -> &[Combatant] {
        match side {
            Side::Mine => &self.my_team,
            Side::Foe => &self.foe_team,
        }
    }

    pub fn team_mut(&mut self, side: Side) -> &mut Vec<Combatant> {
        match side {
            Side::Mine => &mut self.my_team,
            Side::Foe => &mut self.foe_team,
        }
    }

    pub fn lead_index(&self, side: Side) -> usize {
        match side {
            Side::Mine => self.my_lead,
            Side::Foe => self.foe_lead,
        }
    }

    pub fn lead(&self, side: Side) -> &Combatant {
        &self.team(side)[self.lead_index(side)]
    }

    pub fn lead_mut(&mut self, side: Side) -> &mut Combatant {
        let idx = self.lead_index(side);
        &mut self.team_mut(side)[idx]
    }

    pub fn field(&self, side: Side) -> &SideField {
        match side {
            Side::Mine => &self.my_field,
            Side::Foe => &self.foe_field,
        }
    }

    pub fn field_mut(&mut self, side: Side) -> &mut SideField {
        match side {
            Side::Mine => &mut self.my_field,
            Side::Foe => &mut self.foe_field,
        }
    }

    pub fn dynamax_available(&self, side: Side) -> bool {
        match side {
            Side::Mine => self.my_dynamax_available,
            Side::Foe => self.foe_dynamax_available,
        }
    }

    pub fn expend_dynamax(&mut self, side: Side) {
        match side {
            Side::Mine => self.my_dynamax_available = false,
            Side::Foe => self.foe_dynamax_available = false,
        }
    }

    pub fn wish_turns(&self, side: Side) -> u8 {
        match side {
            Side::Mine => self.my_wish_turns,
            Side::Foe => self.foe_wish_turns,
        }
    }

    pub fn make_wish(&mut self, side: Side) {
        let slot = match side {
            Side::Mine => &mut self.my_wish_turns,
            Side::Foe => &mut self.foe_wish_turns,
        };
        if *slot == 0 {
            *slot = 2;
        }
    }

    /// Lead speed after stages, items, tailwind, weather, paralysis.
    pub fn effective_speed(&self, side: Side) -> f32 {
        self.lead(side)
            .effective_stats(self.field(side).tailwind.is_up, self.weather.kind)
            .spe
    }

    /// Team members still standing. Unrevealed opposing members count as
    /// standing (a battle is six a side).
    pub fn remaining(&self, side: Side) -> usize {
        let fainted = self.team(side).iter().filter(|m| m.fainted).count();
        6usize.saturating_sub(fainted)
    }

    pub fn revealed(&self, side: Side) -> usize {
        self.team(side).iter().filter(|m| m.is_revealed).count()
    }

    pub fn statused(&self, side: Side) -> usize {
        self.team(side).iter().filter(|m| m.status.is_some()).count()
    }

    pub fn set_weather(&mut self, weather: Weather) {
        if self.weather.kind == Some(weather) {
            return;
        }
        self.weather = WeatherState {
            kind: Some(weather),
            turns: TurnRange::new(5, 8),
        };
    }

    pub fn set_terrain(&mut self, terrain: Terrain) {
        if self.terrain.kind == Some(terrain) {
            return;
        }
        self.terrain = TerrainState {
            kind: Some(terrain),
            turns: TurnRange::new(5, 8),
        };
    }

    pub fn toggle_trick_room(&mut self) {
        if self.trick_room.is_up {
            self.trick_room = TrickRoom::default();
        } else {
            self.trick_room = TrickRoom { is_up: true, turns: 5 };
        }
    }

    /// Replaces the lead of `side` with team slot `index`, running exit and
    /// entry effects. Switching into the active slot or a fainted member is
    /// a caller bug.
    pub fn perform_switch(&mut self, side: Side, index: usize) -> Result<(), AdvisorError> {
        if index >= self.team(side).len()
            || index == self.lead_index(side)
            || self.team(side)[index].fainted
        {
            return Err(AdvisorError::IllegalSwitch { slot: index });
        }
        let lead = self.lead_index(side);
        self.team_mut(side)[lead].switch_out();
        match side {
            Side::Mine => self.my_lead = index,
            Side::Foe => self.foe_lead = index,
        }
        let hazards = self.field(side).hazards;
        let survived = self.team_mut(side)[index].switch_in(&hazards);
        {
            let entrant = &self.team(side)[index];
            if hazards.toxic_spikes
                && entrant.is_grounded()
                && entrant.has_type(crate::types::Type::Poison)
            {
                self.field_mut(side).hazards.toxic_spikes = false;
            }
        }
        if !survived {
            return Ok(());
        }
        self.on_entry_abilities(side, index);
        Ok(())
    }

    fn on_entry_abilities(&mut self, side: Side, index: usize) {
        let ability = self.team(side)[index].ability.clone();
        match ability.to_ascii_lowercase().as_str() {
            "intimidate" => {
                let foe = self.lead_mut(side.opponent());
                if !foe.fainted {
                    foe.boost_stat(Stat::Atk, -1);
                }
            }
            "drought" => self.set_weather(Weather::Sun),
            "drizzle" => self.set_weather(Weather::Rain),
            "sand stream" => self.set_weather(Weather::Sandstorm),
            "snow warning" => self.set_weather(Weather::Hail),
            "electric surge" => self.set_terrain(Terrain::Electric),
            "grassy surge" => self.set_terrain(Terrain::Grassy),
            "psychic surge" => self.set_terrain(Terrain::Psychic),
            "misty surge" => self.set_terrain(Terrain::Misty),
            "intrepid sword" => self.team_mut(side)[index].boost_stat(Stat::Atk, 1),
            "dauntless shield" => self.team_mut(side)[index].boost_stat(Stat::Def, 1),
            _ => {}
        }
    }

    /// The between-turns sequence: residual damage and healing, condition
    /// countdowns, interval decrements, flag resets.
    pub fn end_turn(&mut self) {
        for side in [Side::Mine, Side::Foe] {
            self.residual_phase(side);
        }
        for side in [Side::Mine, Side::Foe] {
            self.wish_phase(side);
            let field = self.field_mut(side);
            field.tick();
            let lead = self.lead_index(side);
            let mon = &mut self.team_mut(side)[lead];
            if !mon.fainted {
                mon.flinched = false;
                mon.is_protected = false;
                mon.has_moved = false;
                mon.last_damage_taken = 0.0;
                if mon.is_dynamaxed {
                    if mon.turns_dynamaxed >= 2 {
                        mon.is_dynamaxed = false;
                        mon.turns_dynamaxed = 0;
                    } else {
                        mon.turns_dynamaxed += 1;
                    }
                }
            }
        }
        if self.weather.kind.is_some() && !self.weather.turns.tick() {
            self.weather.kind = None;
        }
        if self.terrain.kind.is_some() && !self.terrain.turns.tick() {
            self.terrain.kind = None;
        }
        if self.trick_room.is_up {
            self.trick_room.turns = self.trick_room.turns.saturating_sub(1);
            if self.trick_room.turns == 0 {
                self.trick_room.is_up = false;
            }
        }
        self.turn += 1;
    }

    fn residual_phase(&mut self, side: Side) {
        let lead = self.lead_index(side);
        let weather = self.weather.kind;
        let mon = &mut self.team_mut(side)[lead];
        if mon.fainted {
            return;
        }
        let max = mon.max_hp();
        match weather {
            Some(Weather::Sandstorm) if !sandstorm_immune(mon) => {
                mon.take_damage(max / 16.0);
            }
            Some(Weather::Hail) if !hail_immune(mon) => {
                mon.take_damage(max / 16.0);
            }
            _ => {}
        }
        if mon.fainted {
            return;
        }
        if mon.has_item("Leftovers") {
            mon.heal(max / 16.0);
        }
        if !mon.has_ability("Magic Guard") {
            match mon.status {
                Some(Status::Burn) => {
                    let tick = if mon.has_ability("Heatproof") { max / 32.0 } else { max / 16.0 };
                    mon.take_damage(tick);
                }
                Some(Status::Poison) => {
                    mon.take_damage(max / 8.0);
                }
                Some(Status::Toxic) => {
                    let tick = max * mon.next_toxic_damage / 100.0;
                    mon.take_damage(tick);
                    mon.next_toxic_damage += 6.25;
                }
                _ => {}
            }
        }
        if mon.fainted {
            return;
        }
        if mon.has_volatile(Volatile::Cursed) && !mon.has_ability("Magic Guard") {
            let quarter = max / 4.0;
            mon.take_damage(quarter);
        }
        if mon.fainted {
            return;
        }
        if mon.has_volatile(Volatile::LeechSeed) && !mon.has_ability("Magic Guard") {
            let drained = max / 8.0;
            mon.take_damage(drained);
            let foe = self.lead_mut(side.opponent());
            if !foe.fainted {
                foe.heal(drained);
            }
        }
        let mon = &mut self.team_mut(side)[lead];
        if !mon.fainted && mon.has_volatile(Volatile::Drowsy) {
            mon.remove_volatile(Volatile::Drowsy);
            mon.apply_status(Status::Sleep);
        }
    }

    fn wish_phase(&mut self, side: Side) {
        let turns = match side {
            Side::Mine => &mut self.my_wish_turns,
            Side::Foe => &mut self.foe_wish_turns,
        };
        if *turns == 0 {
            return;
        }
        *turns -= 1;
        if *turns == 0 {
            let lead = self.lead_mut(side);
            if !lead.fainted {
                let half = lead.max_hp() / 2.0;
                lead.heal(half);
            }
        }
    }
}

fn sandstorm_immune(mon: &Combatant) -> bool {
    use crate::types::Type;
    mon.has_type(Type::Rock)
        || mon.has_type(Type::Steel)
        || mon.has_type(Type::Ground)
        || mon.has_ability("Sand Force")
        || mon.has_ability("Sand Rush")
        || mon.has_ability("Sand Veil")
        || mon.has_ability("Magic Guard")
        || mon.has_ability("Overcoat")
}

fn hail_immune(mon: &Combatant) -> bool {
    use crate::types::Type;
    mon.has_type(Type::Ice)
        || mon.has_ability("Ice Body")
        || mon.has_ability("Snow Cloak")
        || mon.has_ability("Magic Guard")
        || mon.has_ability("Overcoat")
}
