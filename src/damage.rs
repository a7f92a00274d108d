use crate::model::{Combatant, Move, MoveCategory, Stat, Status};
use crate::state::{BattleState, Side, Weather};
use crate::types::{attack_effectiveness, Type};
use tracing::trace;

/// Fixed median damage roll; the real roll is uniform in 0.85..=1.00.
const MEDIAN_ROLL: f32 = 0.91;

/// Damage of one hit in HP points, mutating the defender only for
/// absorption side effects (Water Absorb heal, Storm Drain boost, ...).
/// Returns 0 on immunity; any positive result is floored at 1.
pub fn damage(state: &mut BattleState, attacker_side: Side, attack: &Move, is_crit: bool) -> f32 {
    if !attack.is_damaging() {
        return 0.0;
    }
    let defender_side = attacker_side.opponent();
    let attacker = state.lead(attacker_side).clone();
    let weather = state.weather.kind;

    if let Some(points) = fixed_damage(state, attacker_side, &attacker, attack) {
        return points;
    }

    let effectiveness = {
        let defender = state.lead(defender_side);
        attack_effectiveness(attack.id(), attack.move_type, &defender.types)
    };
    if effectiveness == 0.0 {
        return 0.0;
    }
    if absorbed(state.lead_mut(defender_side), attack.move_type) {
        return 0.0;
    }
    let defender = state.lead(defender_side).clone();
    if defender.has_ability("Wonder Guard") && effectiveness <= 1.0 {
        return 0.0;
    }

    let is_crit =
        is_crit && !defender.has_ability("Battle Armor") && !defender.has_ability("Shell Armor");

    let power = effective_power(state, attacker_side, &attacker, &defender, attack);
    if power == 0.0 {
        return 0.0;
    }

    let (offense, defense) = offense_defense(state, attacker_side, &attacker, &defender, attack, is_crit);
    let level = attacker.level as f32;
    let mut dmg = (2.0 * level / 5.0 + 2.0) * power * offense / defense / 50.0;

    // Weather
    match weather {
        Some(Weather::Rain) => {
            if attack.move_type == Type::Water {
                dmg *= 1.5;
            } else if attack.move_type == Type::Fire {
                dmg *= 0.5;
            }
        }
        Some(Weather::Sun) => {
            if attack.move_type == Type::Fire {
                dmg *= 1.5;
            } else if attack.move_type == Type::Water {
                dmg *= 0.5;
            }
        }
        _ => {}
    }

    if is_crit {
        dmg *= if attacker.has_ability("Sniper") { 2.25 } else { 1.5 };
    }

    if attacker.has_type(attack.move_type) {
        dmg *= if attacker.has_ability("Adaptability") { 2.0 } else { 1.5 };
    }

    dmg *= effectiveness;
    dmg *= MEDIAN_ROLL;

    if attack.category == MoveCategory::Physical
        && attacker.status == Some(Status::Burn)
        && !attacker.has_ability("Guts")
        && attack.id() != "facade"
    {
        dmg *= 0.5;
    }

    dmg *= other_modifiers(state, attacker_side, &attacker, &defender, attack, is_crit, effectiveness);

    trace!(
        attack = attack.id(),
        power,
        effectiveness,
        damage = dmg,
        "damage computed"
    );
    dmg.max(1.0)
}

/// Self-hit while confused: a typeless 40-power physical hit against the
/// mon's own leveled stats, no modifiers beyond the roll.
pub fn confusion_damage(mon: &Combatant) -> f32 {
    let level = mon.level as f32;
    let dmg = (2.0 * level / 5.0 + 2.0) * 40.0 * mon.stats.atk / mon.stats.def / 50.0 * 0.925;
    dmg.max(1.0)
}

fn fixed_damage(
    state: &BattleState,
    attacker_side: Side,
    attacker: &Combatant,
    attack: &Move,
) -> Option<f32> {
    let defender = state.lead(attacker_side.opponent());
    match attack.id() {
        "seismic-toss" | "night-shade" => {
            let immune =
                attack_effectiveness(attack.id(), attack.move_type, &defender.types) == 0.0;
            Some(if immune { 0.0 } else { attacker.level as f32 })
        }
        "super-fang" => Some((defender.current_hp_points() / 2.0).max(1.0)),
        "counter" | "mirror-coat" => {
            if defender.has_moved && attacker.last_damage_taken > 0.0 {
                Some(attacker.last_damage_taken * 2.0)
            } else {
                Some(0.0)
            }
        }
        _ => None,
    }
}

/// Abilities and items that eat a whole attack. Side effects land on the
/// defender; the Air Balloon pop is handled by the resolver once the hit
/// has fully resolved.
fn absorbed(defender: &mut Combatant, move_type: Type) -> bool {
    match move_type {
        Type::Ground => defender.has_ability("Levitate") || defender.has_item("Air Balloon"),
        Type::Fire => defender.has_ability("Flash Fire"),
        Type::Water => {
            if defender.has_ability("Water Absorb") || defender.has_ability("Dry Skin") {
                let max = defender.max_hp();
                defender.heal(max / 4.0);
                true
            } else if defender.has_ability("Storm Drain") {
                defender.boost_stat(Stat::Spa, 1);
                true
            } else {
                false
            }
        }
        Type::Electric => {
            if defender.has_ability("Volt Absorb") {
                let max = defender.max_hp();
                defender.heal(max / 4.0);
                true
            } else if defender.has_ability("Lightning Rod") {
                defender.boost_stat(Stat::Spa, 1);
                true
            } else if defender.has_ability("Motor Drive") {
                defender.boost_stat(Stat::Spe, 1);
                true
            } else {
                false
            }
        }
        Type::Grass => {
            if defender.has_ability("Sap Sipper") {
                defender.boost_stat(Stat::Atk, 1);
                true
            } else {
                false
            }
        }
        _ => false,
    }
}

fn effective_power(
    state: &BattleState,
    attacker_side: Side,
    attacker: &Combatant,
    defender: &Combatant,
    attack: &Move,
) -> f32 {
    let base = attack.power as f32;
    match attack.id() {
        "gyro-ball" => {
            let own = state.effective_speed(attacker_side).max(1.0);
            let theirs = state.effective_speed(attacker_side.opponent());
            (25.0 * theirs / own).min(150.0)
        }
        "heavy-slam" | "heat-crash" => {
            let ratio = attacker.weight / defender.weight.max(0.1);
            if ratio >= 5.0 {
                120.0
            } else if ratio >= 4.0 {
                100.0
            } else if ratio >= 3.0 {
                80.0
            } else if ratio >= 2.0 {
                60.0
            } else {
                40.0
            }
        }
        "grass-knot" | "low-kick" => {
            let kg = defender.weight;
            if kg >= 200.0 {
                120.0
            } else if kg >= 100.0 {
                100.0
            } else if kg >= 50.0 {
                80.0
            } else if kg >= 25.0 {
                60.0
            } else if kg >= 10.0 {
                40.0
            } else {
                20.0
            }
        }
        "facade" => {
            if attacker.status.is_some() {
                base * 2.0
            } else {
                base
            }
        }
        "hex" => {
            if defender.status.is_some() {
                base * 2.0
            } else {
                base
            }
        }
        "stored-power" => {
            let b = &attacker.boosts;
            let positives = [b.atk, b.def, b.spa, b.spd, b.spe, b.acc, b.eva]
                .iter()
                .filter(|&&s| s > 0)
                .map(|&s| s as f32)
                .sum::<f32>();
            20.0 + 20.0 * positives
        }
        "acrobatics" => {
            if attacker.item.is_none() {
                base * 2.0
            } else {
                base
            }
        }
        "payback" => {
            if defender.has_moved {
                base * 2.0
            } else {
                base
            }
        }
        "dynamax-cannon" | "behemoth-blade" | "behemoth-bash" => {
            if defender.is_dynamaxed {
                base * 2.0
            } else {
                base
            }
        }
        "triple-axel" => 120.0,
        _ => base,
    }
}

fn offense_defense(
    state: &BattleState,
    attacker_side: Side,
    attacker: &Combatant,
    defender: &Combatant,
    attack: &Move,
    is_crit: bool,
) -> (f32, f32) {
    let mut attacker = attacker.clone();
    let mut defender = defender.clone();
    if is_crit {
        // A crit ignores the attacker's drops and the defender's gains.
        attacker.boosts.atk = attacker.boosts.atk.max(0);
        attacker.boosts.spa = attacker.boosts.spa.max(0);
        attacker.boosts.def = attacker.boosts.def.max(0);
        defender.boosts.def = defender.boosts.def.min(0);
        defender.boosts.spd = defender.boosts.spd.min(0);
    }
    let weather = state.weather.kind;
    let a = attacker.effective_stats(state.field(attacker_side).tailwind.is_up, weather);
    let d = defender.effective_stats(
        state.field(attacker_side.opponent()).tailwind.is_up,
        weather,
    );
    let pair = match attack.id() {
        "body-press" => (a.def, d.def),
        "foul-play" => (d.atk, d.def),
        "psyshock" | "psystrike" | "secret-sword" => (a.spa, d.def),
        _ => match attack.category {
            MoveCategory::Physical => (a.atk, d.def),
            MoveCategory::Special | MoveCategory::Status => (a.spa, d.spd),
        },
    };
    (pair.0, pair.1.max(1.0))
}

#[allow(clippy::too_many_arguments)]
fn other_modifiers(
    state: &BattleState,
    attacker_side: Side,
    attacker: &Combatant,
    defender: &Combatant,
    attack: &Move,
    is_crit: bool,
    effectiveness: f32,
) -> f32 {
    let mut m = 1.0;
    let defender_field = state.field(attacker_side.opponent());
    if !is_crit {
        let screened = match attack.category {
            MoveCategory::Physical => defender_field.physical_screen(),
            MoveCategory::Special => defender_field.special_screen(),
            MoveCategory::Status => false,
        };
        if screened && !attacker.has_ability("Infiltrator") {
            m *= 0.5;
        }
    }
    if attacker.has_item("Life Orb") {
        m *= 1.3;
    }
    let pinch = match attack.move_type {
        Type::Grass => "Overgrow",
        Type::Fire => "Blaze",
        Type::Water => "Torrent",
        Type::Bug => "Swarm",
        _ => "",
    };
    if !pinch.is_empty() && attacker.has_ability(pinch) && attacker.hp < 33.4 {
        m *= 1.5;
    }
    if attacker.has_ability("Analytic") && defender.has_moved {
        m *= 1.3;
    }
    if attacker.has_ability("Sand Force")
        && state.weather.kind == Some(Weather::Sandstorm)
        && matches!(attack.move_type, Type::Rock | Type::Ground | Type::Steel)
    {
        m *= 1.3;
    }
    if attacker.has_ability("Tinted Lens") && effectiveness < 1.0 {
        m *= 2.0;
    }
    if (attacker.has_ability("Steelworker") || attacker.has_ability("Steely Spirit"))
        && attack.move_type == Type::Steel
    {
        m *= 1.5;
    }
    if attacker.has_ability("Technician") && attack.power <= 60 {
        m *= 1.5;
    }
    if defender.has_ability("Ice Scales") && attack.category == MoveCategory::Special {
        m *= 0.5;
    }
    if defender.has_ability("Thick Fat")
        && matches!(attack.move_type, Type::Fire | Type::Ice)
    {
        m *= 0.5;
    }
    if defender.has_ability("Dry Skin") && attack.move_type == Type::Fire {
        m *= 1.25;
    }
    if (defender.has_ability("Filter")
        || defender.has_ability("Prism Armor")
        || defender.has_ability("Solid Rock"))
        && effectiveness > 1.0
    {
        m *= 0.75;
    }
    // Only a dynamaxed attacker reaches a protected target; the hit is
    // quartered (the resolver blocks everyone else).
    if defender.is_protected {
        m *= 0.25;
    }
    m
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

    fn make_mon(name: &str, types: &[Type]) -> Combatant {
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
                spe: 100.0,
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
            in_battle: true,
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

    fn duel(mine: Combatant, foe: Combatant) -> BattleState {
        BattleState {
            opponent_name: String::new(),
            elo: 1000.0,
            my_team: vec![mine],
            foe_team: vec![foe],
            my_lead: 0,
            foe_lead: 0,
            my_field: Default::default(),
            foe_field: Default::default(),
            my_dynamax_available: true,
            foe_dynamax_available: true,
            my_wish_turns: 0,
            foe_wish_turns: 0,
            weather: Default::default(),
            terrain: Default::default(),
            trick_room: Default::default(),
            turn: 0,
        }
    }

    #[test]
    fn neutral_hit_matches_the_reference_formula() {
        // Level 50, 80 power, equal offense/defense, no STAB, no items.
        let tackle = make_move("strike", Type::Fighting, MoveCategory::Physical, 80);
        let mut state = duel(
            make_mon("A", &[Type::Normal]),
            make_mon("B", &[Type::Water]),
        );
        let got = damage(&mut state, Side::Mine, &tackle, false);
        let expected = (2.0 * 50.0 / 5.0 + 2.0) * 80.0 * 100.0 / 100.0 / 50.0 * MEDIAN_ROLL;
        assert!((got - expected).abs() < 1e-3, "got {got}, expected {expected}");
    }

    #[test]
    fn stab_and_effectiveness_stack() {
        let surf = make_move("surf", Type::Water, MoveCategory::Special, 80);
        let mut state = duel(make_mon("A", &[Type::Water]), make_mon("B", &[Type::Fire]));
        let neutral = (2.0 * 50.0 / 5.0 + 2.0) * 80.0 / 50.0 * MEDIAN_ROLL;
        let got = damage(&mut state, Side::Mine, &surf, false);
        assert!((got - neutral * 1.5 * 2.0).abs() < 1e-3);
    }

    #[test]
    fn immunities_zero_out() {
        let quake = make_move("earthquake", Type::Ground, MoveCategory::Physical, 100);
        // Type immunity.
        let mut state = duel(make_mon("A", &[Type::Ground]), make_mon("B", &[Type::Flying]));
        assert_eq!(damage(&mut state, Side::Mine, &quake, false), 0.0);
        // Ability immunity.
        let mut levitator = make_mon("B", &[Type::Steel]);
        levitator.ability = "Levitate".to_string();
        let mut state = duel(make_mon("A", &[Type::Ground]), levitator);
        assert_eq!(damage(&mut state, Side::Mine, &quake, false), 0.0);
        // Item immunity.
        let mut balloon = make_mon("B", &[Type::Steel]);
        balloon.item = Some("Air Balloon".to_string());
        let mut state = duel(make_mon("A", &[Type::Ground]), balloon);
        assert_eq!(damage(&mut state, Side::Mine, &quake, false), 0.0);
    }

    #[test]
    fn volt_absorb_heals_instead_of_hurting() {
        let bolt = make_move("thunderbolt", Type::Electric, MoveCategory::Special, 90);
        let mut sponge = make_mon("B", &[Type::Electric]);
        sponge.ability = "Volt Absorb".to_string();
        sponge.hp = 40.0;
        let mut state = duel(make_mon("A", &[Type::Electric]), sponge);
        assert_eq!(damage(&mut state, Side::Mine, &bolt, false), 0.0);
        assert_eq!(state.lead(Side::Foe).hp, 65.0);
    }

    #[test]
    fn burn_halves_physical_unless_guts() {
        let hit = make_move("strike", Type::Fighting, MoveCategory::Physical, 80);
        let mut burned = make_mon("A", &[Type::Normal]);
        burned.status = Some(Status::Burn);
        let mut state = duel(burned.clone(), make_mon("B", &[Type::Water]));
        let halved = damage(&mut state, Side::Mine, &hit, false);

        burned.ability = "Guts".to_string();
        let mut state = duel(burned, make_mon("B", &[Type::Water]));
        let full = damage(&mut state, Side::Mine, &hit, false);
        assert!((full - halved * 2.0).abs() < 1e-3);
    }

    #[test]
    fn weak_hits_floor_at_one_point() {
        let tap = make_move("tap", Type::Normal, MoveCategory::Physical, 1);
        let mut wall = make_mon("B", &[Type::Steel]);
        wall.stats.def = 4000.0;
        let mut state = duel(make_mon("A", &[Type::Fighting]), wall);
        assert_eq!(damage(&mut state, Side::Mine, &tap, false), 1.0);
    }

    #[test]
    fn gyro_ball_scales_with_speed_ratio() {
        let gyro = make_move("gyro-ball", Type::Steel, MoveCategory::Physical, 0);
        let mut slow = make_mon("A", &[Type::Steel]);
        slow.stats.spe = 30.0;
        let mut fast = make_mon("B", &[Type::Normal]);
        fast.stats.spe = 130.0;
        let mut state = duel(slow, fast);
        // power = 25 * 130/30 ~ 108; nonzero damage despite 0 base power.
        assert!(damage(&mut state, Side::Mine, &gyro, false) > 0.0);
    }

    #[test]
    fn reflect_halves_physical_hits() {
        let hit = make_move("strike", Type::Fighting, MoveCategory::Physical, 80);
        let mut state = duel(make_mon("A", &[Type::Normal]), make_mon("B", &[Type::Water]));
        let clean = damage(&mut state, Side::Mine, &hit, false);
        state.foe_field.reflect.raise(5);
        let screened = damage(&mut state, Side::Mine, &hit, false);
        assert!((clean - screened * 2.0).abs() < 1e-3);
    }

    #[test]
    fn confusion_self_hit_uses_own_stats() {
        let mon = make_mon("A", &[Type::Normal]);
        let expected = (2.0 * 50.0 / 5.0 + 2.0) * 40.0 * 100.0 / 100.0 / 50.0 * 0.925;
        assert!((confusion_damage(&mon) - expected).abs() < 1e-3);
    }
}
