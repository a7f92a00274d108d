use crate::model::{Move, MoveCategory};
use crate::options::Action;
use crate::resolve::apply_move;
use crate::state::{BattleState, Side};
use crate::tree::OutcomeTree;
use crate::AdvisorError;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnOrder {
    MineFirst,
    FoeFirst,
    SpeedTie,
}

fn move_priority(state: &BattleState, side: Side, attack: &Move) -> i32 {
    let mut priority = attack.priority;
    if attack.category == MoveCategory::Status && state.lead(side).has_ability("Prankster") {
        priority += 1;
    }
    priority
}

fn speed_order(state: &BattleState) -> TurnOrder {
    let mine = state.effective_speed(Side::Mine);
    let theirs = state.effective_speed(Side::Foe);
    if (mine - theirs).abs() < f32::EPSILON {
        return TurnOrder::SpeedTie;
    }
    let mine_first = mine > theirs;
    // Trick room inverts the speed comparison, not priority brackets.
    if state.trick_room.is_up != mine_first {
        TurnOrder::MineFirst
    } else {
        TurnOrder::FoeFirst
    }
}

fn turn_order(state: &BattleState, my_move: &Move, foe_move: &Move) -> TurnOrder {
    let mine = move_priority(state, Side::Mine, my_move);
    let theirs = move_priority(state, Side::Foe, foe_move);
    if mine > theirs {
        TurnOrder::MineFirst
    } else if theirs > mine {
        TurnOrder::FoeFirst
    } else {
        speed_order(state)
    }
}

fn apply_switch(
    tree: &mut OutcomeTree,
    active: Vec<usize>,
    side: Side,
    index: usize,
) -> Result<Vec<usize>, AdvisorError> {
    for &id in &active {
        tree.state_mut(id).perform_switch(side, index)?;
    }
    Ok(active)
}

/// Picking a max move spends the side's dynamax and transforms the lead.
fn maybe_dynamax(tree: &mut OutcomeTree, active: &[usize], side: Side, action: Option<&Action>) {
    let Some(Action::Move(attack)) = action else {
        return;
    };
    if !attack.is_max_move() {
        return;
    }
    for &id in active {
        let state = tree.state_mut(id);
        if state.dynamax_available(side) && !state.lead(side).is_dynamaxed {
            state.expend_dynamax(side);
            let lead = state.lead_mut(side);
            lead.is_dynamaxed = true;
            lead.turns_dynamaxed = 0;
        }
    }
}

/// Expands one simultaneous choice pair under `node` into every in-game-RNG
/// outcome, then runs the between-turns sequence on each open leaf. Returns
/// the open leaves.
pub fn simulate_turn(
    tree: &mut OutcomeTree,
    node: usize,
    my_action: Option<&Action>,
    foe_action: Option<&Action>,
) -> Result<Vec<usize>, AdvisorError> {
    let mut active = vec![node];
    maybe_dynamax(tree, &active, Side::Mine, my_action);
    maybe_dynamax(tree, &active, Side::Foe, foe_action);

    debug!(node, my = ?my_action, foe = ?foe_action, "simulating turn");

    active = match (my_action, foe_action) {
        (Some(Action::Switch(mine)), Some(Action::Switch(theirs))) => {
            match speed_order(tree.state(node)) {
                TurnOrder::MineFirst => {
                    let set = apply_switch(tree, active, Side::Mine, *mine)?;
                    apply_switch(tree, set, Side::Foe, *theirs)?
                }
                TurnOrder::FoeFirst => {
                    let set = apply_switch(tree, active, Side::Foe, *theirs)?;
                    apply_switch(tree, set, Side::Mine, *mine)?
                }
                TurnOrder::SpeedTie => {
                    // Entry effects can differ by order, so the tie branches.
                    let mut out = Vec::new();
                    for id in active {
                        let mine_first = tree.fork(id, 0.5, "wins the speed tie");
                        let set = apply_switch(tree, vec![mine_first], Side::Mine, *mine)?;
                        out.extend(apply_switch(tree, set, Side::Foe, *theirs)?);

                        let foe_first = tree.fork(id, 0.5, "loses the speed tie");
                        let set = apply_switch(tree, vec![foe_first], Side::Foe, *theirs)?;
                        out.extend(apply_switch(tree, set, Side::Mine, *mine)?);
                    }
                    out
                }
            }
        }
        (Some(Action::Switch(mine)), Some(Action::Move(theirs))) => {
            let set = apply_switch(tree, active, Side::Mine, *mine)?;
            apply_move(tree, set, Side::Foe, theirs)
        }
        (Some(Action::Move(mine)), Some(Action::Switch(theirs))) => {
            let set = apply_switch(tree, active, Side::Foe, *theirs)?;
            apply_move(tree, set, Side::Mine, mine)
        }
        (Some(Action::Move(mine)), Some(Action::Move(theirs))) => {
            match turn_order(tree.state(node), mine, theirs) {
                TurnOrder::MineFirst => {
                    let set = apply_move(tree, active, Side::Mine, mine);
                    apply_move(tree, set, Side::Foe, theirs)
                }
                TurnOrder::FoeFirst => {
                    let set = apply_move(tree, active, Side::Foe, theirs);
                    apply_move(tree, set, Side::Mine, mine)
                }
                TurnOrder::SpeedTie => {
                    let mut out = Vec::new();
                    for id in active {
                        let mine_first = tree.fork(id, 0.5, "wins the speed tie");
                        let set = apply_move(tree, vec![mine_first], Side::Mine, mine);
                        out.extend(apply_move(tree, set, Side::Foe, theirs));

                        let foe_first = tree.fork(id, 0.5, "loses the speed tie");
                        let set = apply_move(tree, vec![foe_first], Side::Foe, theirs);
                        out.extend(apply_move(tree, set, Side::Mine, mine));
                    }
                    out
                }
            }
        }
        (Some(Action::Switch(mine)), None) => apply_switch(tree, active, Side::Mine, *mine)?,
        (Some(Action::Move(mine)), None) => apply_move(tree, active, Side::Mine, mine),
        (None, Some(Action::Switch(theirs))) => apply_switch(tree, active, Side::Foe, *theirs)?,
        (None, Some(Action::Move(theirs))) => apply_move(tree, active, Side::Foe, theirs),
        (None, None) => active,
    };

    for &id in &active {
        tree.state_mut(id).end_turn();
    }
    Ok(active)
}
