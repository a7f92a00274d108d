use pokemon_battle_advisor::model::{AilmentKind, Status};
use pokemon_battle_advisor::{simulate_turn, Action, BattleState, Combatant, Move, OutcomeTree};
use serde_json::json;

fn make_move(name: &str, move_type: &str, category: &str, power: u32) -> Move {
    serde_json::from_value(json!({
        "name": name,
        "type": move_type,
        "category": category,
        "power": power,
    }))
    .unwrap()
}

fn make_mon(name: &str, types: &[&str], speed: f32, moves: Vec<Move>) -> Combatant {
    let mut mon: Combatant = serde_json::from_value(json!({
        "name": name,
        "level": 50,
        "types": types,
        "stats": {
            "hp": 160.0,
            "atk": 100.0,
            "def": 100.0,
            "spa": 100.0,
            "spd": 100.0,
            "spe": speed,
        },
    }))
    .unwrap();
    mon.is_revealed = true;
    mon.known_moves = moves;
    mon
}

fn make_state(my_team: Vec<Combatant>, foe_team: Vec<Combatant>) -> BattleState {
    let mut state: BattleState =
        serde_json::from_value(json!({ "my_team": [], "foe_team": [] })).unwrap();
    state.my_team = my_team;
    state.foe_team = foe_team;
    state.my_team[0].in_battle = true;
    state.foe_team[0].in_battle = true;
    state
}

#[test]
fn speed_tie_forks_both_orders() {
    let jab = make_move("pound", "normal", "physical", 40);
    let state = make_state(
        vec![make_mon("MonoA", &["normal"], 100.0, vec![jab.clone()])],
        vec![make_mon("MonoB", &["normal"], 100.0, vec![jab.clone()])],
    );
    let mut tree = OutcomeTree::new(state);
    let root = tree.root();
    let leaves = simulate_turn(
        &mut tree,
        root,
        Some(&Action::Move(jab.clone())),
        Some(&Action::Move(jab)),
    )
    .unwrap();

    assert_eq!(leaves.len(), 2, "a speed tie should branch on who acts first");
    let children = &tree.node(root).children;
    assert_eq!(children.len(), 2);
    for &child in children {
        assert!((tree.node(child).probability - 0.5).abs() < 1e-9);
    }
    assert_ne!(tree.node(children[0]).label, tree.node(children[1]).label);
    assert!((tree.leaf_probability_sum(root) - 1.0).abs() < 1e-6);
}

#[test]
fn leaf_probabilities_partition_a_shaky_turn() {
    let mut shaky = make_move("rock-slide", "rock", "physical", 75);
    shaky.accuracy = Some(90.0);
    let mut body_slam = make_move("body-slam", "normal", "physical", 85);
    body_slam.ailment = AilmentKind::Paralysis;
    body_slam.ailment_chance = 30.0;

    let state = make_state(
        vec![make_mon("Thrower", &["rock"], 120.0, vec![shaky.clone()])],
        vec![make_mon("Slammer", &["normal"], 60.0, vec![body_slam.clone()])],
    );
    let mut tree = OutcomeTree::new(state);
    let root = tree.root();
    simulate_turn(
        &mut tree,
        root,
        Some(&Action::Move(shaky)),
        Some(&Action::Move(body_slam)),
    )
    .unwrap();

    let leaves = tree.leaves(root);
    assert!(leaves.len() >= 3, "accuracy and ailment RNG should both fork");
    assert!((tree.leaf_probability_sum(root) - 1.0).abs() < 1e-6);
}

#[test]
fn full_paralysis_suspends_one_branch() {
    let jab = make_move("pound", "normal", "physical", 40);
    let mut state = make_state(
        vec![make_mon("Stiff", &["normal"], 100.0, vec![jab.clone()])],
        vec![make_mon("Target", &["normal"], 50.0, vec![])],
    );
    state.my_team[0].status = Some(Status::Paralysis);

    let mut tree = OutcomeTree::new(state);
    let root = tree.root();
    simulate_turn(&mut tree, root, Some(&Action::Move(jab)), None).unwrap();

    let leaves = tree.leaves(root);
    assert_eq!(leaves.len(), 2);
    let halted = leaves
        .iter()
        .find(|&&id| (tree.node(id).probability - 0.25).abs() < 1e-9)
        .copied()
        .expect("full paralysis branch at 1/4");
    let acted = leaves
        .iter()
        .find(|&&id| (tree.node(id).probability - 0.75).abs() < 1e-9)
        .copied()
        .expect("acting branch at 3/4");
    assert_eq!(tree.state(halted).foe_team[0].hp, 100.0);
    assert!(tree.state(acted).foe_team[0].hp < 100.0);
}

#[test]
fn burn_chips_at_end_of_turn() {
    let mut state = make_state(
        vec![make_mon("Singed", &["normal"], 100.0, vec![])],
        vec![make_mon("Bystander", &["normal"], 100.0, vec![])],
    );
    state.my_team[0].status = Some(Status::Burn);

    let mut tree = OutcomeTree::new(state);
    let root = tree.root();
    simulate_turn(&mut tree, root, None, None).unwrap();

    let after = tree.state(root);
    assert!((after.my_team[0].hp - 93.75).abs() < 1e-3, "burn takes 1/16");
    assert_eq!(after.turn, 1);
}

#[test]
fn air_balloon_blocks_the_hit_and_pops() {
    let quake = make_move("earthquake", "ground", "physical", 100);
    let mut state = make_state(
        vec![make_mon("Stomper", &["ground"], 100.0, vec![quake.clone()])],
        vec![make_mon("Floaty", &["steel"], 50.0, vec![])],
    );
    state.foe_team[0].item = Some("Air Balloon".to_string());

    let mut tree = OutcomeTree::new(state);
    let root = tree.root();
    simulate_turn(&mut tree, root, Some(&Action::Move(quake)), None).unwrap();

    let floaty = &tree.state(root).foe_team[0];
    assert_eq!(floaty.hp, 100.0, "balloon holder takes nothing from a ground move");
    assert_eq!(floaty.item, None, "the balloon pops on the blocked hit");
}

#[test]
fn repeated_protect_holds_at_even_odds() {
    let jab = make_move("pound", "normal", "physical", 40);
    let mut protect = make_move("protect", "normal", "status", 0);
    protect.priority = 4;
    let mut state = make_state(
        vec![make_mon("Turtle", &["normal"], 100.0, vec![protect.clone()])],
        vec![make_mon("Striker", &["normal"], 50.0, vec![jab.clone()])],
    );
    state.my_team[0].last_used_move = Some("protect".to_string());

    let mut tree = OutcomeTree::new(state);
    let root = tree.root();
    let leaves = simulate_turn(
        &mut tree,
        root,
        Some(&Action::Move(protect)),
        Some(&Action::Move(jab)),
    )
    .unwrap();

    assert_eq!(leaves.len(), 2, "a repeat protect forks on whether it holds");
    for &leaf in &leaves {
        assert!(
            (tree.node(leaf).probability - 0.5).abs() < 1e-9,
            "consecutive protect is a coin flip, got {}",
            tree.node(leaf).probability
        );
    }
    let held = leaves
        .iter()
        .find(|&&id| tree.state(id).my_team[0].hp == 100.0)
        .copied()
        .expect("one branch where protect held");
    let failed = leaves
        .iter()
        .find(|&&id| tree.state(id).my_team[0].hp < 100.0)
        .copied()
        .expect("one branch where protect failed");
    assert_ne!(held, failed);
}

#[test]
fn switch_resolves_before_the_move() {
    let jab = make_move("pound", "normal", "physical", 40);
    let state = make_state(
        vec![
            make_mon("Lead", &["normal"], 100.0, vec![]),
            make_mon("Bench", &["normal"], 40.0, vec![]),
        ],
        vec![make_mon("Striker", &["normal"], 100.0, vec![jab.clone()])],
    );

    let mut tree = OutcomeTree::new(state);
    let root = tree.root();
    simulate_turn(
        &mut tree,
        root,
        Some(&Action::Switch(1)),
        Some(&Action::Move(jab)),
    )
    .unwrap();

    let after = tree.state(root);
    assert!(after.my_team[1].in_battle, "the replacement is now the lead");
    assert_eq!(after.my_team[0].hp, 100.0, "the outgoing lead escaped the hit");
    assert!(after.my_team[1].hp < 100.0, "the incoming lead took it instead");
}
