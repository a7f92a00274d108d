use pokemon_battle_advisor::{
    advise, decide, drive_turn, feature_columns, Action, ActionSink, AdvisorError, BattleState,
    Combatant, Evaluator, Move, OutcomeTree,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;
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

/// Toy oracle: favors positions where my lead is healthy and theirs is not.
struct HpLean {
    mine: usize,
    theirs: usize,
}

impl HpLean {
    fn for_state(state: &BattleState) -> Self {
        let columns = feature_columns(state);
        let find = |name: &str| columns.iter().position(|c| c == name).unwrap();
        HpLean {
            mine: find("P1LeadHP"),
            theirs: find("P2LeadHP"),
        }
    }
}

impl Evaluator for HpLean {
    fn score(&self, features: &[f32]) -> Result<f64, AdvisorError> {
        let lean = (features[self.mine] - features[self.theirs]) as f64 / 400.0;
        Ok((0.5 + lean).clamp(0.0, 1.0))
    }
}

#[test]
fn depth_zero_produces_no_ranking() {
    let jab = make_move("pound", "normal", "physical", 40);
    let state = make_state(
        vec![make_mon("Mine", &["normal"], 100.0, vec![jab.clone()])],
        vec![make_mon("Theirs", &["normal"], 50.0, vec![jab])],
    );
    let oracle = HpLean::for_state(&state);
    let mut tree = OutcomeTree::new(state);
    let root = tree.root();

    let ranked = decide(&mut tree, root, 0, &oracle).unwrap();
    assert!(ranked.is_empty());
    assert_eq!(tree.node(root).score, None, "depth 0 leaves the node unscored");
}

#[test]
fn no_replacement_left_means_the_battle_is_lost() {
    let jab = make_move("pound", "normal", "physical", 40);
    let mut state = make_state(
        vec![make_mon("LastMon", &["normal"], 100.0, vec![])],
        vec![make_mon("Theirs", &["normal"], 50.0, vec![jab])],
    );
    state.my_team[0].fainted = true;
    state.my_team[0].in_battle = false;
    state.my_team[0].hp = 0.0;
    let oracle = HpLean::for_state(&state);
    let mut tree = OutcomeTree::new(state);
    let root = tree.root();

    let ranked = decide(&mut tree, root, 2, &oracle).unwrap();
    assert!(ranked.is_empty());
    assert_eq!(tree.node(root).score, Some(0.0));
}

#[test]
fn ranks_the_harder_hit_first() {
    let water_gun = make_move("water-gun", "water", "special", 40);
    let hydro_pump = make_move("hydro-pump", "water", "special", 110);
    let jab = make_move("pound", "normal", "physical", 40);
    let mut state = make_state(
        vec![make_mon(
            "Soaker",
            &["water"],
            100.0,
            vec![water_gun, hydro_pump],
        )],
        vec![make_mon("Ember", &["fire"], 50.0, vec![jab])],
    );
    state.foe_team[0].hp = 80.0;
    let oracle = HpLean::for_state(&state);
    let mut tree = OutcomeTree::new(state);
    let root = tree.root();

    let ranked = decide(&mut tree, root, 1, &oracle).unwrap();
    assert!(ranked.len() >= 2, "both super-effective moves should be offered");
    let Action::Move(best) = &ranked[0].action else {
        panic!("expected a move, got {:?}", ranked[0].action);
    };
    assert_eq!(best.name, "hydro-pump");
    for pair in ranked.windows(2) {
        assert!(pair[0].score >= pair[1].score, "ranking must be descending");
    }
}

#[test]
fn forced_switch_collapses_to_one_replacement() {
    let jab = make_move("pound", "normal", "physical", 40);
    let mut state = make_state(
        vec![
            make_mon("Downed", &["normal"], 100.0, vec![]),
            make_mon("BenchA", &["normal"], 90.0, vec![jab.clone()]),
            make_mon("BenchB", &["normal"], 80.0, vec![jab.clone()]),
        ],
        vec![make_mon("Theirs", &["normal"], 50.0, vec![jab])],
    );
    state.my_team[0].fainted = true;
    state.my_team[0].in_battle = false;
    state.my_team[0].hp = 0.0;
    let oracle = HpLean::for_state(&state);
    let mut tree = OutcomeTree::new(state);
    let root = tree.root();

    let ranked = decide(&mut tree, root, 1, &oracle).unwrap();
    assert_eq!(ranked.len(), 1, "a forced switch reports a single option");
    assert!(matches!(ranked[0].action, Action::Switch(_)));
    assert_eq!(
        tree.node(root).children.len(),
        1,
        "losing replacements are pruned from the tree"
    );
}

#[test]
fn a_downed_lead_is_replaced_even_at_the_horizon() {
    let jab = make_move("pound", "normal", "physical", 40);
    let mut state = make_state(
        vec![
            make_mon("Downed", &["normal"], 100.0, vec![]),
            make_mon("Bench", &["normal"], 90.0, vec![jab.clone()]),
        ],
        vec![make_mon("Theirs", &["normal"], 50.0, vec![jab])],
    );
    state.my_team[0].fainted = true;
    state.my_team[0].in_battle = false;
    state.my_team[0].hp = 0.0;
    let oracle = HpLean::for_state(&state);
    let mut tree = OutcomeTree::new(state);
    let root = tree.root();

    let ranked = decide(&mut tree, root, 0, &oracle).unwrap();
    assert_eq!(ranked.len(), 1, "the replacement is still chosen at depth 0");
    assert!(matches!(ranked[0].action, Action::Switch(1)));
    assert!(tree.node(root).score.is_some());
}

#[test]
fn opponent_faint_collapses_onto_their_replacement() {
    let jab = make_move("pound", "normal", "physical", 40);
    let mut state = make_state(
        vec![make_mon("Mine", &["normal"], 100.0, vec![jab.clone()])],
        vec![
            make_mon("TheirDowned", &["normal"], 50.0, vec![]),
            make_mon("TheirBench", &["normal"], 40.0, vec![jab]),
        ],
    );
    state.foe_team[0].fainted = true;
    state.foe_team[0].in_battle = false;
    state.foe_team[0].hp = 0.0;
    let oracle = HpLean::for_state(&state);
    let mut tree = OutcomeTree::new(state);
    let root = tree.root();

    let ranked = decide(&mut tree, root, 1, &oracle).unwrap();
    assert!(!ranked.is_empty(), "my options are ranked from the collapsed node");
    assert_eq!(
        tree.node(root).children.len(),
        1,
        "only the opponent's chosen replacement survives"
    );
    assert!(tree.node(root).score.is_some());
}

#[test]
fn advise_degrades_to_a_random_action_at_depth_zero() {
    let jab = make_move("pound", "normal", "physical", 40);
    let state = make_state(
        vec![make_mon("Mine", &["normal"], 100.0, vec![jab.clone()])],
        vec![make_mon("Theirs", &["normal"], 50.0, vec![jab])],
    );
    let oracle = HpLean::for_state(&state);
    let mut rng = SmallRng::seed_from_u64(7);

    let actions = advise(&state, 0, &oracle, &mut rng);
    assert_eq!(actions.len(), 1, "no ranking still yields one legal action");
}

struct RejectFirst {
    submissions: usize,
}

impl ActionSink for RejectFirst {
    fn submit(&mut self, _action: &Action) -> bool {
        self.submissions += 1;
        self.submissions > 1
    }
}

#[test]
fn drive_turn_retries_past_a_rejected_action() {
    let water_gun = make_move("water-gun", "water", "special", 40);
    let hydro_pump = make_move("hydro-pump", "water", "special", 110);
    let jab = make_move("pound", "normal", "physical", 40);
    let state = make_state(
        vec![make_mon(
            "Soaker",
            &["water"],
            100.0,
            vec![water_gun, hydro_pump],
        )],
        vec![make_mon("Ember", &["fire"], 50.0, vec![jab])],
    );
    let oracle = HpLean::for_state(&state);
    let mut rng = SmallRng::seed_from_u64(7);
    let mut sink = RejectFirst { submissions: 0 };

    let chosen = drive_turn(&state, 1, &oracle, &mut sink, &mut rng);
    assert!(chosen.is_some(), "the second candidate should be accepted");
    assert_eq!(sink.submissions, 2);
}
