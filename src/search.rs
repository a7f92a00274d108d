use crate::eval::{feature_row, Evaluator};
use crate::options::{foe_options, forced_switch_options, my_options, Action};
use crate::state::Side;
use crate::tree::OutcomeTree;
use crate::turn::simulate_turn;
use crate::AdvisorError;
use tracing::debug;

/// One of my options with the value the search settled on. `node` is the
/// pair node (or forced-switch child) the option expands into.
#[derive(Debug, Clone)]
pub struct RankedOption {
    pub action: Action,
    pub score: f64,
    pub node: usize,
}

/// Ranks my options at `node` by expectimax value: my pick maximizes, the
/// opponent's reply minimizes, in-game RNG averages by branch probability,
/// and leaves at the depth horizon are scored by the oracle. A downed lead
/// resolves its forced switch before the depth horizon is consulted; only
/// after that does depth 0 pass the node through unscored with no ranking.
pub fn decide(
    tree: &mut OutcomeTree,
    node: usize,
    depth: u32,
    oracle: &dyn Evaluator,
) -> Result<Vec<RankedOption>, AdvisorError> {
    {
        let lead = tree.state(node).lead(Side::Mine);
        if lead.fainted || !lead.in_battle {
            return my_forced_switch(tree, node, depth, oracle);
        }
    }
    {
        let lead = tree.state(node).lead(Side::Foe);
        if lead.fainted || !lead.in_battle {
            return foe_forced_switch(tree, node, depth, oracle);
        }
    }
    if depth == 0 {
        return Ok(Vec::new());
    }

    let my_opts = my_options(tree.state(node));
    if my_opts.is_empty() {
        return Ok(Vec::new());
    }
    let foe_opts = foe_options(tree.state(node));
    let mut ranked = Vec::with_capacity(my_opts.len());
    // An opponent with nothing to do still gets one pair node, so every
    // option folds the same way.
    let replies: Vec<Option<Action>> = if foe_opts.is_empty() {
        vec![None]
    } else {
        foe_opts.into_iter().map(Some).collect()
    };
    for my_opt in my_opts {
        let my_label = my_opt.label(tree.state(node), Side::Mine);
        let mut worst: Option<(f64, usize)> = None;
        for foe_opt in &replies {
            let label = match foe_opt {
                Some(reply) => format!(
                    "{} vs {}",
                    my_label,
                    reply.label(tree.state(node), Side::Foe)
                ),
                None => my_label.clone(),
            };
            let pair = tree.fork(node, 1.0, &label);
            tree.node_mut(pair).my_action = Some(my_opt.clone());
            tree.node_mut(pair).foe_action = foe_opt.clone();
            let score = expand_pair(tree, pair, Some(&my_opt), foe_opt.as_ref(), depth, oracle)?;
            if worst.map_or(true, |(w, _)| score < w) {
                worst = Some((score, pair));
            }
        }
        if let Some((score, pair)) = worst {
            debug!(option = %my_label, score, "option evaluated");
            ranked.push(RankedOption {
                action: my_opt,
                score,
                node: pair,
            });
        }
    }
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    if let Some(best) = ranked.first() {
        tree.node_mut(node).score = Some(best.score);
    }
    Ok(ranked)
}

/// Value of a subtree root for folding: oracle at the horizon, otherwise the
/// value of my best option from here.
fn node_value(
    tree: &mut OutcomeTree,
    node: usize,
    depth: u32,
    oracle: &dyn Evaluator,
) -> Result<f64, AdvisorError> {
    if depth == 0 {
        if let Some(score) = tree.node(node).score {
            return Ok(score);
        }
        let score = oracle.score(&feature_row(tree.state(node)))?;
        tree.node_mut(node).score = Some(score);
        return Ok(score);
    }
    let ranked = decide(tree, node, depth, oracle)?;
    if let Some(best) = ranked.first() {
        return Ok(best.score);
    }
    if let Some(score) = tree.node(node).score {
        // Forced-switch dead ends record a decisive score.
        return Ok(score);
    }
    let score = oracle.score(&feature_row(tree.state(node)))?;
    tree.node_mut(node).score = Some(score);
    Ok(score)
}

/// Simulates one choice pair and folds its leaves into a single value:
/// probability-weighted average normalized by the pair's own probability.
fn expand_pair(
    tree: &mut OutcomeTree,
    pair: usize,
    my_action: Option<&Action>,
    foe_action: Option<&Action>,
    depth: u32,
    oracle: &dyn Evaluator,
) -> Result<f64, AdvisorError> {
    let leaves = simulate_turn(tree, pair, my_action, foe_action)?;
    let pair_probability = tree.node(pair).probability;
    let score = fold_leaves(tree, &leaves, depth - 1, oracle, pair_probability)?;
    tree.node_mut(pair).score = Some(score);
    Ok(score)
}

fn fold_leaves(
    tree: &mut OutcomeTree,
    leaves: &[usize],
    depth: u32,
    oracle: &dyn Evaluator,
    parent_probability: f64,
) -> Result<f64, AdvisorError> {
    if leaves.is_empty() {
        return Ok(0.0);
    }
    let normalizer = parent_probability.max(f64::EPSILON);
    let mut total = 0.0;
    if depth == 0 {
        // Horizon leaves go to the oracle in one batch.
        let rows: Vec<Vec<f32>> = leaves
            .iter()
            .map(|&id| feature_row(tree.state(id)))
            .collect();
        let scores = oracle.score_batch(&rows)?;
        for (&id, score) in leaves.iter().zip(scores) {
            tree.node_mut(id).score = Some(score);
            total += score * tree.node(id).probability;
        }
    } else {
        for &id in leaves {
            let value = node_value(tree, id, depth, oracle)?;
            total += value * tree.node(id).probability;
        }
    }
    Ok(total / normalizer)
}

/// My lead is down: pick the replacement with the best value, prune the
/// rest, and report it as the single ranked option. No replacement left
/// means the battle is lost.
fn my_forced_switch(
    tree: &mut OutcomeTree,
    node: usize,
    depth: u32,
    oracle: &dyn Evaluator,
) -> Result<Vec<RankedOption>, AdvisorError> {
    let candidates = forced_switch_options(tree.state(node), Side::Mine);
    if candidates.is_empty() {
        tree.node_mut(node).score = Some(0.0);
        return Ok(Vec::new());
    }
    let mut best: Option<(f64, usize, usize)> = None;
    for idx in candidates {
        let label = format!("send out {}", tree.state(node).team(Side::Mine)[idx].name);
        let child = tree.fork(node, 1.0, &label);
        tree.state_mut(child).perform_switch(Side::Mine, idx)?;
        tree.node_mut(child).my_action = Some(Action::Switch(idx));
        let value = node_value(tree, child, depth.saturating_sub(1), oracle)?;
        if best.map_or(true, |(b, _, _)| value > b) {
            best = Some((value, child, idx));
        }
    }
    let Some((score, child, idx)) = best else {
        return Ok(Vec::new());
    };
    tree.collapse_to(child);
    tree.node_mut(node).score = Some(score);
    Ok(vec![RankedOption {
        action: Action::Switch(idx),
        score,
        node: child,
    }])
}

/// The opposing lead is down: assume the opponent sends out whatever is
/// worst for me, collapse onto it, and rank my options from there. No
/// revealed replacement means they are out of the battle.
fn foe_forced_switch(
    tree: &mut OutcomeTree,
    node: usize,
    depth: u32,
    oracle: &dyn Evaluator,
) -> Result<Vec<RankedOption>, AdvisorError> {
    let candidates = forced_switch_options(tree.state(node), Side::Foe);
    if candidates.is_empty() {
        tree.node_mut(node).score = Some(1.0);
        return Ok(Vec::new());
    }
    let mut worst: Option<(f64, usize)> = None;
    for idx in candidates {
        let label = format!(
            "opponent sends out {}",
            tree.state(node).team(Side::Foe)[idx].name
        );
        let child = tree.fork(node, 1.0, &label);
        tree.state_mut(child).perform_switch(Side::Foe, idx)?;
        tree.node_mut(child).foe_action = Some(Action::Switch(idx));
        let value = node_value(tree, child, depth, oracle)?;
        if worst.map_or(true, |(w, _)| value < w) {
            worst = Some((value, child));
        }
    }
    let Some((score, child)) = worst else {
        return Ok(Vec::new());
    };
    tree.collapse_to(child);
    tree.node_mut(node).score = Some(score);
    decide(tree, child, depth, oracle)
}
