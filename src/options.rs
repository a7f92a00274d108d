use crate::model::{Combatant, Move, MoveCategory};
use crate::state::{BattleState, Side, Weather};
use crate::types::{attack_effectiveness, Type};
use rand::seq::SliceRandom;
use rand::Rng;

/// One legal choice for a turn: use a move, or switch to a team slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Move(Move),
    Switch(usize),
}

impl Action {
    pub fn label(&self, state: &BattleState, side: Side) -> String {
        match self {
            Action::Move(m) => m.name.clone(),
            Action::Switch(idx) => format!("switch to {}", state.team(side)[*idx].name),
        }
    }
}

/// Type multiplier of `attack` into `defender`, zeroed by absorption
/// abilities and immunity items the way the damage formula would.
fn matchup(attack: &Move, defender: &Combatant) -> f32 {
    let eff = attack_effectiveness(attack.id(), attack.move_type, &defender.types);
    if eff == 0.0 {
        return 0.0;
    }
    let absorbed = match attack.move_type {
        Type::Ground => defender.has_ability("Levitate") || defender.has_item("Air Balloon"),
        Type::Fire => defender.has_ability("Flash Fire"),
        Type::Water => {
            defender.has_ability("Water Absorb")
                || defender.has_ability("Dry Skin")
                || defender.has_ability("Storm Drain")
        }
        Type::Electric => {
            defender.has_ability("Volt Absorb")
                || defender.has_ability("Lightning Rod")
                || defender.has_ability("Motor Drive")
        }
        Type::Grass => defender.has_ability("Sap Sipper"),
        _ => false,
    };
    if absorbed || (defender.has_ability("Wonder Guard") && eff <= 1.0) {
        0.0
    } else {
        eff
    }
}

fn weather_promotes(attack: &Move, weather: Option<Weather>) -> bool {
    matches!(
        (attack.move_type, weather),
        (Type::Fire, Some(Weather::Sun)) | (Type::Water, Some(Weather::Rain))
    )
}

/// Prunes a move pool to the strongest tier. Attacks land in high, standard,
/// or low tiers by matchup; status moves (and high-odds status riders) are
/// always kept alongside whichever tier survives.
pub fn ranked_moves(
    pool: &[Move],
    attacker: &Combatant,
    defender: &Combatant,
    weather: Option<Weather>,
) -> Vec<Move> {
    let mut high = Vec::new();
    let mut standard = Vec::new();
    let mut low = Vec::new();
    let mut status = Vec::new();
    for attack in pool {
        if attack.category == MoveCategory::Status || attack.ailment_chance >= 30.0 {
            status.push(attack.clone());
            continue;
        }
        let eff = matchup(attack, defender);
        let boosted = weather_promotes(attack, weather);
        let stab = attacker.has_type(attack.move_type);
        if eff > 1.0 || (boosted && eff > 0.5) || (eff == 1.0 && stab) {
            high.push(attack.clone());
        } else if eff == 1.0 || (boosted && eff > 0.25) {
            standard.push(attack.clone());
        } else if eff > 0.0 {
            low.push(attack.clone());
        }
    }
    let mut picked = if !high.is_empty() {
        high
    } else if !standard.is_empty() {
        standard
    } else {
        low
    };
    picked.extend(status);
    picked
}

/// The move pool a side can legally pick from this turn: max moves while
/// dynamaxed, the locked move under a choice item, otherwise the pruned
/// moveset (padding a barely revealed opponent with plausible moves).
pub fn legal_moves(state: &BattleState, side: Side) -> Vec<Move> {
    let lead = state.lead(side);
    let defender = state.lead(side.opponent());
    if lead.is_dynamaxed {
        return lead.max_moves.clone();
    }
    if let Some(locked) = lead.choice_locked() {
        if let Some(m) = lead.known_moves.iter().find(|m| m.name == locked) {
            return vec![m.clone()];
        }
    }
    let mut pool = lead.known_moves.clone();
    if side == Side::Foe && pool.len() < 4 {
        for candidate in &lead.possible_moves {
            if !pool.iter().any(|m| m.name == candidate.name) {
                pool.push(candidate.clone());
            }
        }
    }
    ranked_moves(&pool, lead, defender, state.weather.kind)
}

fn switch_candidates(state: &BattleState, side: Side) -> Vec<usize> {
    state
        .team(side)
        .iter()
        .enumerate()
        .filter(|(idx, mon)| {
            !mon.fainted
                && *idx != state.lead_index(side)
                && (side == Side::Mine || mon.is_revealed)
        })
        .map(|(idx, _)| idx)
        .collect()
}

/// Orders switch candidates: outspeed-and-threaten and no-weakness walls
/// first, plain outspeeders next, everyone else last.
pub fn ranked_switches(state: &BattleState, side: Side, candidates: &[usize]) -> Vec<usize> {
    let foe = side.opponent();
    let foe_lead = state.lead(foe);
    let foe_speed = state.effective_speed(foe);
    let mut high = Vec::new();
    let mut outspeed = Vec::new();
    let mut standard = Vec::new();
    let mut low = Vec::new();
    for &idx in candidates {
        let mon = &state.team(side)[idx];
        let speed = mon
            .effective_stats(state.field(side).tailwind.is_up, state.weather.kind)
            .spe;
        let threatens = mon
            .known_moves
            .iter()
            .chain(mon.possible_moves.iter())
            .any(|m| m.is_damaging() && matchup(m, foe_lead) > 1.0);
        let incoming: Vec<&Move> = foe_lead
            .known_moves
            .iter()
            .chain(foe_lead.possible_moves.iter())
            .filter(|m| m.is_damaging())
            .collect();
        let weaknesses = incoming.iter().filter(|m| matchup(m, mon) > 1.0).count();
        let resistances = incoming.iter().filter(|m| matchup(m, mon) < 1.0).count();
        if speed > foe_speed && threatens {
            high.push(idx);
        } else if weaknesses == 0 && resistances > 0 {
            high.push(idx);
        } else if speed > foe_speed {
            outspeed.push(idx);
        } else if weaknesses == 0 {
            standard.push(idx);
        } else {
            low.push(idx);
        }
    }
    if !high.is_empty() {
        high
    } else if !standard.is_empty() || !outspeed.is_empty() {
        standard.extend(outspeed);
        standard
    } else {
        low
    }
}

/// Replacements after a faint: the ranked non-fainted bench.
pub fn forced_switch_options(state: &BattleState, side: Side) -> Vec<usize> {
    let candidates = switch_candidates(state, side);
    ranked_switches(state, side, &candidates)
}

/// Everything worth searching for my side this turn.
pub fn my_options(state: &BattleState) -> Vec<Action> {
    let mut options: Vec<Action> = legal_moves(state, Side::Mine)
        .into_iter()
        .map(Action::Move)
        .collect();
    let lead = state.lead(Side::Mine);
    if state.my_dynamax_available && !lead.is_dynamaxed && lead.choice_locked().is_none() {
        options.extend(lead.max_moves.iter().cloned().map(Action::Move));
    }
    options.extend(switch_candidates(state, Side::Mine).into_iter().map(Action::Switch));
    options
}

/// The opponent replies worth taking seriously.
pub fn foe_options(state: &BattleState) -> Vec<Action> {
    let mut options: Vec<Action> = legal_moves(state, Side::Foe)
        .into_iter()
        .map(Action::Move)
        .collect();
    let candidates = switch_candidates(state, Side::Foe);
    options.extend(
        ranked_switches(state, Side::Foe, &candidates)
            .into_iter()
            .map(Action::Switch),
    );
    options
}

/// Fallback when the search fails: any legal action, unranked.
pub fn random_action<R: Rng>(state: &BattleState, rng: &mut R) -> Option<Action> {
    let lead = state.lead(Side::Mine);
    let mut pool: Vec<Action> = if lead.fainted || !lead.in_battle {
        Vec::new()
    } else if lead.is_dynamaxed {
        lead.max_moves.iter().cloned().map(Action::Move).collect()
    } else if let Some(locked) = lead.choice_locked() {
        lead.known_moves
            .iter()
            .filter(|m| m.name == locked)
            .cloned()
            .map(Action::Move)
            .collect()
    } else {
        lead.known_moves.iter().cloned().map(Action::Move).collect()
    };
    pool.extend(switch_candidates(state, Side::Mine).into_iter().map(Action::Switch));
    pool.choose(rng).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AilmentKind, Boosts, MoveTarget, Stats};

    fn make_move(name: &str, move_type: Type, category: MoveCategory, power: u32) -> Move {
        Move {
            name: name.to_string(),
            move_type,
            category,
            power,
            accuracy: Some(100.0),
            priority: 0,
            target: MoveTarget::SelectedPokemon,
            ailment: AilmentKind::None,
            ailment_chance: 0.0,
            flinch_chance: 0.0,
            stat_chance: 0.0,
            stat_changes: Vec::new(),
            self_stat_changes: false,
            healing: 0.0,
            drain: 0.0,
            crit_rate: 0,
        }
    }

    fn make_mon(name: &str, types: &[Type], spe: f32) -> Combatant {
        Combatant {
            name: name.to_string(),
            level: 50,
            hp: 100.0,
            types: types.to_vec(),
            stats: Stats {
                hp: 160.0,
                atk: 100.0,
                def: 100.0,
                spa: 100.0,
                spd: 100.0,
                spe,
            },
            ability: String::new(),
            item: None,
            weight: 50.0,
            boosts: Boosts::default(),
            status: None,
            sleep_turns: 0,
            next_toxic_damage: 0.0,
            volatiles: Vec::new(),
            confusion_turns: 0,
            substitute_hp: 0.0,
            fainted: false,
            in_battle: false,
            is_revealed: true,
            is_dynamaxed: false,
            turns_dynamaxed: 0,
            known_moves: Vec::new(),
            possible_moves: Vec::new(),
            max_moves: Vec::new(),
            last_used_move: None,
            has_moved: false,
            is_protected: false,
            flinched: false,
            last_damage_taken: 0.0,
        }
    }

    fn duel(my_team: Vec<Combatant>, foe_team: Vec<Combatant>) -> BattleState {
        let mut state = BattleState {
            opponent_name: String::new(),
            elo: 1000.0,
            my_team,
            foe_team,
            my_lead: 0,
            foe_lead: 0,
            my_field: Default::default(),
            foe_field: Default::default(),
            my_dynamax_available: false,
            foe_dynamax_available: false,
            my_wish_turns: 0,
            foe_wish_turns: 0,
            weather: Default::default(),
            terrain: Default::default(),
            trick_room: Default::default(),
            turn: 0,
        };
        state.my_team[0].in_battle = true;
        state.foe_team[0].in_battle = true;
        state
    }

    #[test]
    fn pruning_keeps_super_effective_and_status_moves() {
        let flame = make_move("flamethrower", Type::Fire, MoveCategory::Special, 90);
        let tackle = make_move("tackle", Type::Normal, MoveCategory::Physical, 40);
        let wisp = make_move("will-o-wisp", Type::Fire, MoveCategory::Status, 0);
        let attacker = make_mon("Arcanine", &[Type::Fire], 95.0);
        let defender = make_mon("Ferrothorn", &[Type::Grass, Type::Steel], 20.0);
        let kept = ranked_moves(
            &[flame.clone(), tackle, wisp.clone()],
            &attacker,
            &defender,
            None,
        );
        let names: Vec<&str> = kept.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["flamethrower", "will-o-wisp"]);
    }

    #[test]
    fn resisted_pool_falls_back_to_low_tier() {
        let ember = make_move("ember", Type::Fire, MoveCategory::Special, 40);
        let attacker = make_mon("Vulpix", &[Type::Fire], 65.0);
        let defender = make_mon("Gyarados", &[Type::Water, Type::Flying], 81.0);
        let kept = ranked_moves(&[ember], &attacker, &defender, None);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn forced_switches_exclude_fainted_and_active() {
        let mut a = make_mon("A", &[Type::Normal], 50.0);
        a.in_battle = true;
        let mut b = make_mon("B", &[Type::Normal], 60.0);
        b.fainted = true;
        let c = make_mon("C", &[Type::Normal], 70.0);
        let state = duel(vec![a, b, c], vec![make_mon("Foe", &[Type::Normal], 55.0)]);
        let options = forced_switch_options(&state, Side::Mine);
        assert_eq!(options, vec![2]);
    }

    #[test]
    fn unrevealed_opponents_stay_out_of_the_bench() {
        let lead = make_mon("Lead", &[Type::Normal], 50.0);
        let mut hidden = make_mon("Hidden", &[Type::Normal], 50.0);
        hidden.is_revealed = false;
        let state = duel(vec![make_mon("Mine", &[Type::Normal], 50.0)], vec![lead, hidden]);
        assert!(forced_switch_options(&state, Side::Foe).is_empty());
    }

    #[test]
    fn switch_ranking_prefers_a_wall() {
        let quake = make_move("earthquake", Type::Ground, MoveCategory::Physical, 100);
        let mut foe = make_mon("Excadrill", &[Type::Ground, Type::Steel], 88.0);
        foe.known_moves = vec![quake];
        foe.in_battle = true;

        let lead = make_mon("Lead", &[Type::Normal], 50.0);
        let bird = make_mon("Corviknight", &[Type::Flying, Type::Steel], 67.0);
        let slug = make_mon("Slug", &[Type::Rock], 20.0);
        let state = duel(vec![lead, bird, slug], vec![foe]);
        let ranked = ranked_switches(&state, Side::Mine, &[1, 2]);
        assert_eq!(ranked, vec![1]);
    }
}
