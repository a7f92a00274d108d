use crate::damage::{confusion_damage, damage};
use crate::model::{AilmentKind, Move, Stat, StatChange, Status, Volatile};
use crate::state::{BattleState, Side, Terrain, Weather};
use crate::tree::OutcomeTree;
use crate::types::Type;
use phf::phf_map;
use tracing::debug;

/// Chance a sleeper stays asleep, by completed sleep turns.
fn sleep_stay_chance(turns: u8) -> f64 {
    match turns {
        0 => 1.0,
        1 => 2.0 / 3.0,
        2 => 1.0 / 3.0,
        _ => 0.0,
    }
}

/// Chance confusion snaps before acting, by turns spent confused.
fn confusion_snap_chance(turns: u8) -> f64 {
    match turns {
        0 | 1 => 0.0,
        2 => 0.25,
        3 => 0.5,
        4 => 0.75,
        _ => 1.0,
    }
}

const PARALYSIS_HALT_CHANCE: f64 = 0.25;
const FREEZE_STAY_CHANCE: f64 = 0.8;
const PROTECT_REPEAT_CHANCE: f64 = 0.5;

#[derive(Debug, Clone, Copy)]
enum StatusEffect {
    InflictToxic,
    Protect,
    Taunt,
    Wish,
    Encore,
    Substitute,
    HealBell,
    LeechSeed,
    ItemSwap,
    Curse,
    TrickRoom,
    BellyDrum,
    AuroraVeil,
    Reflect,
    LightScreen,
    StealthRock,
    Spikes,
    StickyWeb,
    ToxicSpikes,
    SetWeather(Weather),
}

/// Status moves with bespoke effects, keyed by move id.
static STATUS_EFFECTS: phf::Map<&'static str, StatusEffect> = phf_map! {
    "toxic" => StatusEffect::InflictToxic,
    "protect" => StatusEffect::Protect,
    "detect" => StatusEffect::Protect,
    "kings-shield" => StatusEffect::Protect,
    "spiky-shield" => StatusEffect::Protect,
    "baneful-bunker" => StatusEffect::Protect,
    "max-guard" => StatusEffect::Protect,
    "taunt" => StatusEffect::Taunt,
    "wish" => StatusEffect::Wish,
    "encore" => StatusEffect::Encore,
    "substitute" => StatusEffect::Substitute,
    "heal-bell" => StatusEffect::HealBell,
    "aromatherapy" => StatusEffect::HealBell,
    "leech-seed" => StatusEffect::LeechSeed,
    "trick" => StatusEffect::ItemSwap,
    "switcheroo" => StatusEffect::ItemSwap,
    "curse" => StatusEffect::Curse,
    "trick-room" => StatusEffect::TrickRoom,
    "belly-drum" => StatusEffect::BellyDrum,
    "aurora-veil" => StatusEffect::AuroraVeil,
    "reflect" => StatusEffect::Reflect,
    "light-screen" => StatusEffect::LightScreen,
    "stealth-rock" => StatusEffect::StealthRock,
    "spikes" => StatusEffect::Spikes,
    "sticky-web" => StatusEffect::StickyWeb,
    "toxic-spikes" => StatusEffect::ToxicSpikes,
    "rain-dance" => StatusEffect::SetWeather(Weather::Rain),
    "sunny-day" => StatusEffect::SetWeather(Weather::Sun),
    "sandstorm" => StatusEffect::SetWeather(Weather::Sandstorm),
    "hail" => StatusEffect::SetWeather(Weather::Hail),
};

#[derive(Debug, Clone, Copy)]
enum MaxEffect {
    RaiseSelf(Stat),
    LowerFoe(Stat),
    SetWeather(Weather),
    SetTerrain(Terrain),
}

/// Secondary effects of max moves, keyed by move id.
static MAX_EFFECTS: phf::Map<&'static str, MaxEffect> = phf_map! {
    "max-knuckle" => MaxEffect::RaiseSelf(Stat::Atk),
    "max-steelspike" => MaxEffect::RaiseSelf(Stat::Def),
    "max-ooze" => MaxEffect::RaiseSelf(Stat::Spa),
    "max-quake" => MaxEffect::RaiseSelf(Stat::Spd),
    "max-airstream" => MaxEffect::RaiseSelf(Stat::Spe),
    "max-wyrmwind" => MaxEffect::LowerFoe(Stat::Atk),
    "max-phantasm" => MaxEffect::LowerFoe(Stat::Def),
    "max-flutterby" => MaxEffect::LowerFoe(Stat::Spa),
    "max-darkness" => MaxEffect::LowerFoe(Stat::Spd),
    "max-strike" => MaxEffect::LowerFoe(Stat::Spe),
    "max-flare" => MaxEffect::SetWeather(Weather::Sun),
    "max-geyser" => MaxEffect::SetWeather(Weather::Rain),
    "max-rockfall" => MaxEffect::SetWeather(Weather::Sandstorm),
    "max-hailstorm" => MaxEffect::SetWeather(Weather::Hail),
    "max-lightning" => MaxEffect::SetTerrain(Terrain::Electric),
    "max-overgrowth" => MaxEffect::SetTerrain(Terrain::Grassy),
    "max-mindstorm" => MaxEffect::SetTerrain(Terrain::Psychic),
    "max-starfall" => MaxEffect::SetTerrain(Terrain::Misty),
};

fn is_protect_family(id: &str) -> bool {
    matches!(STATUS_EFFECTS.get(id), Some(StatusEffect::Protect))
}

/// Resolves one use of `attack` by the lead of `side` across every branch in
/// `active`. Branches where the move cannot or does not complete (fainted
/// user, full stop, miss) are suspended for the rest of this move and rejoin
/// the returned set, which holds every still-open leaf.
pub(crate) fn apply_move(
    tree: &mut OutcomeTree,
    active: Vec<usize>,
    side: Side,
    attack: &Move,
) -> Vec<usize> {
    let foe = side.opponent();
    let mut done: Vec<usize> = Vec::new();
    let mut active = active;

    debug!(side = ?side, attack = attack.id(), branches = active.len(), "resolving move");

    // No-effect pre-checks.
    active.retain(|&id| {
        let state = tree.state(id);
        let attacker = state.lead(side);
        let defender = state.lead(foe);
        let blocked = attacker.fainted
            || (defender.fainted && attack.target.hits_opponent())
            || attacker.flinched
            || ((attacker.has_volatile(Volatile::Taunt) || attacker.has_item("Assault Vest"))
                && !attack.is_damaging())
            || (defender.is_protected
                && attack.target.hits_opponent()
                && !defender.is_dynamaxed
                && !attacker.is_dynamaxed
                && !attacker.has_ability("Unseen Fist"));
        if blocked {
            done.push(id);
        }
        !blocked
    });

    active = status_halt_phase(tree, active, &mut done, side);
    active = confusion_phase(tree, active, &mut done, side);
    active = accuracy_phase(tree, active, &mut done, side, attack);

    if attack.is_damaging() {
        active = damaging_exceptions(tree, active, &mut done, side, attack);
        damage_phase(tree, &active, side, attack);
        active = ailment_fork_phase(tree, active, foe, attack);
        active = flinch_fork_phase(tree, active, foe, attack);
        active = stat_fork_phase(tree, active, side, attack);
        max_effect_phase(tree, &active, side, attack);
        active = special_cases_phase(tree, active, side, attack);
    } else {
        active = status_move_phase(tree, active, &mut done, side, attack);
    }

    active.extend(done);
    for &id in &active {
        let attacker = tree.state_mut(id).lead_mut(side);
        if !attacker.fainted {
            attacker.has_moved = true;
            attacker.last_used_move = Some(attack.name.clone());
        }
    }
    active
}

/// Major-status full stops: sleep, freeze, paralysis.
fn status_halt_phase(
    tree: &mut OutcomeTree,
    active: Vec<usize>,
    done: &mut Vec<usize>,
    side: Side,
) -> Vec<usize> {
    let mut next = Vec::new();
    for id in active {
        let status = tree.state(id).lead(side).status;
        match status {
            Some(Status::Sleep) => {
                let turns = tree.state(id).lead(side).sleep_turns;
                let stay = sleep_stay_chance(turns);
                if stay >= 1.0 {
                    tree.state_mut(id).lead_mut(side).sleep_turns += 1;
                    done.push(id);
                } else if stay <= 0.0 {
                    let mon = tree.state_mut(id).lead_mut(side);
                    mon.status = None;
                    mon.sleep_turns = 0;
                    next.push(id);
                } else {
                    let asleep = tree.fork(id, stay, "stays asleep");
                    tree.state_mut(asleep).lead_mut(side).sleep_turns += 1;
                    done.push(asleep);
                    let awake = tree.fork(id, 1.0 - stay, "wakes up");
                    let mon = tree.state_mut(awake).lead_mut(side);
                    mon.status = None;
                    mon.sleep_turns = 0;
                    next.push(awake);
                }
            }
            Some(Status::Freeze) => {
                let frozen = tree.fork(id, FREEZE_STAY_CHANCE, "stays frozen");
                done.push(frozen);
                let thawed = tree.fork(id, 1.0 - FREEZE_STAY_CHANCE, "thaws");
                tree.state_mut(thawed).lead_mut(side).status = None;
                next.push(thawed);
            }
            Some(Status::Paralysis) => {
                let halted = tree.fork(id, PARALYSIS_HALT_CHANCE, "fully paralyzed");
                done.push(halted);
                let acts = tree.fork(id, 1.0 - PARALYSIS_HALT_CHANCE, "acts through paralysis");
                next.push(acts);
            }
            _ => next.push(id),
        }
    }
    next
}

fn confusion_phase(
    tree: &mut OutcomeTree,
    active: Vec<usize>,
    done: &mut Vec<usize>,
    side: Side,
) -> Vec<usize> {
    let mut next = Vec::new();
    for id in active {
        if !tree.state(id).lead(side).has_volatile(Volatile::Confusion) {
            next.push(id);
            continue;
        }
        let turns = tree.state(id).lead(side).confusion_turns;
        let snap = confusion_snap_chance(turns);
        if snap >= 1.0 {
            tree.state_mut(id)
                .lead_mut(side)
                .remove_volatile(Volatile::Confusion);
            next.push(id);
            continue;
        }
        let remainder = 1.0 - snap;
        if snap > 0.0 {
            let snapped = tree.fork(id, snap, "snaps out of confusion");
            tree.state_mut(snapped)
                .lead_mut(side)
                .remove_volatile(Volatile::Confusion);
            next.push(snapped);
        }
        let acts = tree.fork(id, remainder * 2.0 / 3.0, "acts through confusion");
        tree.state_mut(acts).lead_mut(side).confusion_turns += 1;
        next.push(acts);

        let hits_self = tree.fork(id, remainder / 3.0, "hits itself in confusion");
        {
            let mon = tree.state_mut(hits_self).lead_mut(side);
            mon.confusion_turns += 1;
            let self_hit = confusion_damage(mon);
            mon.take_damage(self_hit);
        }
        done.push(hits_self);
    }
    next
}

fn accuracy_phase(
    tree: &mut OutcomeTree,
    active: Vec<usize>,
    done: &mut Vec<usize>,
    side: Side,
    attack: &Move,
) -> Vec<usize> {
    let accuracy = match attack.accuracy {
        Some(acc) if acc < 100.0 => acc as f64,
        _ => return active,
    };
    let mut next = Vec::new();
    for id in active {
        let no_guard = {
            let state = tree.state(id);
            state.lead(side).has_ability("No Guard")
                || state.lead(side.opponent()).has_ability("No Guard")
        };
        if no_guard {
            next.push(id);
            continue;
        }
        let p_hit = accuracy / 100.0;
        let hit = tree.fork(id, p_hit, "hits");
        next.push(hit);
        let miss = tree.fork(id, 1.0 - p_hit, "misses");
        if matches!(attack.id(), "high-jump-kick" | "jump-kick") {
            let mon = tree.state_mut(miss).lead_mut(side);
            let crash = mon.max_hp() / 2.0;
            mon.take_damage(crash);
        }
        done.push(miss);
    }
    next
}

/// Damaging moves that fail outright under a branch condition.
fn damaging_exceptions(
    tree: &mut OutcomeTree,
    active: Vec<usize>,
    done: &mut Vec<usize>,
    side: Side,
    attack: &Move,
) -> Vec<usize> {
    let mut next = Vec::new();
    for id in active {
        let fails = {
            let state = tree.state(id);
            match attack.id() {
                "fake-out" | "first-impression" => state.lead(side).last_used_move.is_some(),
                "poltergeist" => state.lead(side.opponent()).item.is_none(),
                "solar-beam" | "solar-blade" => state.weather.kind != Some(Weather::Sun),
                _ => false,
            }
        };
        if fails {
            done.push(id);
        } else {
            next.push(id);
        }
    }
    next
}

fn damage_phase(tree: &mut OutcomeTree, active: &[usize], side: Side, attack: &Move) {
    let foe = side.opponent();
    for &id in active {
        let state = tree.state_mut(id);
        let balloon_blocked = attack.move_type == Type::Ground
            && state.lead(foe).has_item("Air Balloon");
        let dealt = damage(state, side, attack, false);
        state.lead_mut(foe).take_damage(dealt);
        if balloon_blocked {
            // The balloon saves its holder from this hit but pops doing so.
            state.lead_mut(foe).item = None;
        }
        if dealt > 0.0 {
            if attack.drain != 0.0 {
                let transfer = dealt * attack.drain.abs() / 100.0;
                let attacker = state.lead_mut(side);
                if attack.drain > 0.0 {
                    attacker.heal(transfer);
                } else {
                    attacker.take_damage(transfer);
                }
            }
            let attacker = state.lead_mut(side);
            if attacker.has_item("Life Orb") && !attacker.is_dynamaxed && !attacker.fainted {
                let recoil = attacker.max_hp() / 10.0;
                attacker.take_damage(recoil);
            }
        }
    }
}

/// Secondary ailment chance on damaging moves.
fn ailment_fork_phase(
    tree: &mut OutcomeTree,
    active: Vec<usize>,
    foe: Side,
    attack: &Move,
) -> Vec<usize> {
    let chance = attack.ailment_chance as f64 / 100.0;
    if attack.ailment == AilmentKind::None || chance <= 0.0 {
        return active;
    }
    let mut next = Vec::new();
    for id in active {
        // Skip the fork when the ailment could not stick anyway.
        let sticks = {
            let mut probe = tree.state(id).lead(foe).clone();
            inflict_ailment(&mut probe, attack.ailment)
        };
        if !sticks || chance >= 1.0 {
            if sticks {
                let target = tree.state_mut(id).lead_mut(foe);
                inflict_ailment(target, attack.ailment);
            }
            next.push(id);
            continue;
        }
        let inflicted = tree.fork(id, chance, "secondary ailment lands");
        inflict_ailment(tree.state_mut(inflicted).lead_mut(foe), attack.ailment);
        next.push(inflicted);
        next.push(tree.fork(id, 1.0 - chance, "no secondary ailment"));
    }
    next
}

fn inflict_ailment(target: &mut crate::model::Combatant, ailment: AilmentKind) -> bool {
    match ailment {
        AilmentKind::Burn => target.apply_status(Status::Burn),
        AilmentKind::Paralysis => target.apply_status(Status::Paralysis),
        AilmentKind::Sleep => target.apply_status(Status::Sleep),
        AilmentKind::Poison => target.apply_status(Status::Poison),
        AilmentKind::Freeze => target.apply_status(Status::Freeze),
        AilmentKind::Confusion => target.add_volatile(Volatile::Confusion),
        AilmentKind::None | AilmentKind::Unmodeled => false,
    }
}

fn flinch_fork_phase(
    tree: &mut OutcomeTree,
    active: Vec<usize>,
    foe: Side,
    attack: &Move,
) -> Vec<usize> {
    let chance = attack.flinch_chance as f64 / 100.0;
    if chance <= 0.0 {
        return active;
    }
    let mut next = Vec::new();
    for id in active {
        let can_flinch = {
            let target = tree.state(id).lead(foe);
            !target.fainted
                && !target.has_moved
                && target.substitute_hp <= 0.0
                && !target.has_ability("Inner Focus")
        };
        if !can_flinch {
            next.push(id);
            continue;
        }
        if chance >= 1.0 {
            tree.state_mut(id).lead_mut(foe).flinched = true;
            next.push(id);
            continue;
        }
        let flinched = tree.fork(id, chance, "target flinches");
        tree.state_mut(flinched).lead_mut(foe).flinched = true;
        next.push(flinched);
        next.push(tree.fork(id, 1.0 - chance, "no flinch"));
    }
    next
}

/// Secondary stat-stage chance on damaging moves. A chance of zero in the
/// move data means the stage change is guaranteed.
fn stat_fork_phase(
    tree: &mut OutcomeTree,
    active: Vec<usize>,
    side: Side,
    attack: &Move,
) -> Vec<usize> {
    if attack.stat_changes.is_empty() {
        return active;
    }
    let chance = attack.stat_chance as f64 / 100.0;
    let target_side = if attack.self_stat_changes {
        side
    } else {
        side.opponent()
    };
    let mut next = Vec::new();
    for id in active {
        if tree.state(id).lead(target_side).fainted {
            next.push(id);
            continue;
        }
        if chance <= 0.0 || chance >= 1.0 {
            apply_stat_changes(tree.state_mut(id), target_side, &attack.stat_changes);
            next.push(id);
            continue;
        }
        let changed = tree.fork(id, chance, "secondary stat change lands");
        apply_stat_changes(tree.state_mut(changed), target_side, &attack.stat_changes);
        next.push(changed);
        next.push(tree.fork(id, 1.0 - chance, "no stat change"));
    }
    next
}

fn apply_stat_changes(state: &mut BattleState, side: Side, changes: &[StatChange]) {
    let mon = state.lead_mut(side);
    for change in changes {
        mon.boost_stat(change.stat, change.change);
    }
}

fn max_effect_phase(tree: &mut OutcomeTree, active: &[usize], side: Side, attack: &Move) {
    let Some(effect) = MAX_EFFECTS.get(attack.id()) else {
        return;
    };
    for &id in active {
        if !tree.state(id).lead(side).is_dynamaxed {
            continue;
        }
        let state = tree.state_mut(id);
        match *effect {
            MaxEffect::RaiseSelf(stat) => state.lead_mut(side).boost_stat(stat, 1),
            MaxEffect::LowerFoe(stat) => {
                let target = state.lead_mut(side.opponent());
                if !target.fainted {
                    target.boost_stat(stat, -1);
                }
            }
            MaxEffect::SetWeather(weather) => state.set_weather(weather),
            MaxEffect::SetTerrain(terrain) => state.set_terrain(terrain),
        }
    }
}

fn special_cases_phase(
    tree: &mut OutcomeTree,
    active: Vec<usize>,
    side: Side,
    attack: &Move,
) -> Vec<usize> {
    match attack.id() {
        "rapid-spin" => {
            for &id in &active {
                let state = tree.state_mut(id);
                state.field_mut(side).hazards.clear();
                state.lead_mut(side).boost_stat(Stat::Spe, 1);
            }
            active
        }
        "outrage" | "petal-dance" | "thrash" => {
            // The rampage ends in confusion half the time once it repeats.
            let mut next = Vec::new();
            for id in active {
                let repeating = tree.state(id).lead(side).last_used_move.as_deref()
                    == Some(attack.id());
                if !repeating {
                    next.push(id);
                    continue;
                }
                let confused = tree.fork(id, 0.5, "rampage ends in confusion");
                tree.state_mut(confused)
                    .lead_mut(side)
                    .add_volatile(Volatile::Confusion);
                next.push(confused);
                next.push(tree.fork(id, 0.5, "rampage continues"));
            }
            next
        }
        _ => active,
    }
}

/// One status move applied across the active branches. Only the protect
/// family forks (a consecutive use holds at halved odds).
fn status_move_phase(
    tree: &mut OutcomeTree,
    active: Vec<usize>,
    done: &mut Vec<usize>,
    side: Side,
    attack: &Move,
) -> Vec<usize> {
    let foe = side.opponent();
    let mut next = Vec::new();
    for id in active {
        // Prankster-boosted moves fail into Dark types.
        let prankster_blocked = {
            let state = tree.state(id);
            state.lead(side).has_ability("Prankster")
                && attack.target.hits_opponent()
                && state.lead(foe).has_type(Type::Dark)
        };
        if prankster_blocked {
            done.push(id);
            continue;
        }
        match STATUS_EFFECTS.get(attack.id()) {
            Some(StatusEffect::Protect) => {
                let repeat = tree
                    .state(id)
                    .lead(side)
                    .last_used_move
                    .as_deref()
                    .map_or(false, is_protect_family);
                if !repeat {
                    tree.state_mut(id).lead_mut(side).is_protected = true;
                    next.push(id);
                } else {
                    let held = tree.fork(id, PROTECT_REPEAT_CHANCE, "protect holds");
                    tree.state_mut(held).lead_mut(side).is_protected = true;
                    next.push(held);
                    next.push(tree.fork(id, 1.0 - PROTECT_REPEAT_CHANCE, "protect fails"));
                }
            }
            Some(effect) => {
                apply_status_effect(tree.state_mut(id), side, *effect);
                next.push(id);
            }
            None => {
                generic_status_move(tree.state_mut(id), side, attack);
                next.push(id);
            }
        }
    }
    next
}

fn apply_status_effect(state: &mut BattleState, side: Side, effect: StatusEffect) {
    let foe = side.opponent();
    match effect {
        StatusEffect::InflictToxic => {
            state.lead_mut(foe).apply_status(Status::Toxic);
        }
        StatusEffect::Protect => unreachable!("protect forks in status_move_phase"),
        StatusEffect::Taunt => {
            state.lead_mut(foe).add_volatile(Volatile::Taunt);
        }
        StatusEffect::Wish => state.make_wish(side),
        StatusEffect::Encore => {
            state.lead_mut(foe).add_volatile(Volatile::Encore);
        }
        StatusEffect::Substitute => {
            let mon = state.lead_mut(side);
            if mon.hp > 25.0 && mon.substitute_hp <= 0.0 {
                let quarter = mon.max_hp() / 4.0;
                mon.take_damage(quarter);
                mon.substitute_hp = 25.0;
            }
        }
        StatusEffect::HealBell => {
            for mon in state.team_mut(side) {
                if !mon.fainted {
                    mon.status = None;
                    mon.next_toxic_damage = 0.0;
                    mon.sleep_turns = 0;
                }
            }
        }
        StatusEffect::LeechSeed => {
            state.lead_mut(foe).add_volatile(Volatile::LeechSeed);
        }
        StatusEffect::ItemSwap => {
            let foe_item = state.lead(foe).item.clone();
            let own_item = state.lead(side).item.clone();
            state.lead_mut(foe).item = own_item;
            state.lead_mut(side).item = foe_item;
        }
        StatusEffect::Curse => {
            if state.lead(side).has_type(Type::Ghost) {
                let half = state.lead(side).max_hp() / 2.0;
                state.lead_mut(side).take_damage(half);
                state.lead_mut(foe).add_volatile(Volatile::Cursed);
            } else {
                let mon = state.lead_mut(side);
                mon.boost_stat(Stat::Atk, 1);
                mon.boost_stat(Stat::Def, 1);
                mon.boost_stat(Stat::Spe, -1);
            }
        }
        StatusEffect::TrickRoom => state.toggle_trick_room(),
        StatusEffect::BellyDrum => {
            let mon = state.lead_mut(side);
            if mon.hp > 50.0 {
                let half = mon.max_hp() / 2.0;
                mon.take_damage(half);
                mon.boosts.atk = 6;
            }
        }
        StatusEffect::AuroraVeil => {
            if state.weather.kind == Some(Weather::Hail) {
                let turns = screen_turns(state.lead(side));
                state.field_mut(side).aurora_veil.raise(turns);
            }
        }
        StatusEffect::Reflect => {
            let turns = screen_turns(state.lead(side));
            state.field_mut(side).reflect.raise(turns);
        }
        StatusEffect::LightScreen => {
            let turns = screen_turns(state.lead(side));
            state.field_mut(side).light_screen.raise(turns);
        }
        StatusEffect::StealthRock => state.field_mut(foe).hazards.stealth_rock = true,
        StatusEffect::Spikes => state.field_mut(foe).hazards.spikes = true,
        StatusEffect::StickyWeb => state.field_mut(foe).hazards.sticky_web = true,
        StatusEffect::ToxicSpikes => state.field_mut(foe).hazards.toxic_spikes = true,
        StatusEffect::SetWeather(weather) => state.set_weather(weather),
    }
}

fn screen_turns(mon: &crate::model::Combatant) -> u8 {
    if mon.has_item("Light Clay") {
        8
    } else {
        5
    }
}

/// Status moves without a bespoke entry: move-data ailment, stage changes,
/// and percentage healing.
fn generic_status_move(state: &mut BattleState, side: Side, attack: &Move) {
    let foe = side.opponent();
    if attack.ailment != AilmentKind::None {
        inflict_ailment(state.lead_mut(foe), attack.ailment);
    }
    if !attack.stat_changes.is_empty() {
        let target = if attack.target == crate::model::MoveTarget::User {
            side
        } else {
            foe
        };
        apply_stat_changes(state, target, &attack.stat_changes);
    }
    if attack.healing > 0.0 {
        let mon = state.lead_mut(side);
        let points = mon.max_hp() * attack.healing / 100.0;
        mon.heal(points);
    }
}
