use crate::options::Action;
use crate::state::BattleState;

/// One branch point in the outcome tree. States are deep-copied on fork so
/// sibling branches never alias.
#[derive(Debug, Clone)]
pub struct OutcomeNode {
    pub state: BattleState,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// Cumulative probability of reaching this node from the root.
    pub probability: f64,
    pub label: String,
    /// The choice pair that produced this subtree (set on option-pair nodes).
    pub my_action: Option<Action>,
    pub foe_action: Option<Action>,
    pub terminal: bool,
    pub score: Option<f64>,
}

/// Arena-backed outcome tree: nodes live in one `Vec` and refer to each
/// other by index.
#[derive(Debug, Clone)]
pub struct OutcomeTree {
    nodes: Vec<OutcomeNode>,
}

impl OutcomeTree {
    pub fn new(root_state: BattleState) -> Self {
        OutcomeTree {
            nodes: vec![OutcomeNode {
                state: root_state,
                parent: None,
                children: Vec::new(),
                probability: 1.0,
                label: String::from("root"),
                my_action: None,
                foe_action: None,
                terminal: false,
                score: None,
            }],
        }
    }

    pub fn root(&self) -> usize {
        0
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: usize) -> &OutcomeNode {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: usize) -> &mut OutcomeNode {
        &mut self.nodes[id]
    }

    pub fn state(&self, id: usize) -> &BattleState {
        &self.nodes[id].state
    }

    pub fn state_mut(&mut self, id: usize) -> &mut BattleState {
        &mut self.nodes[id].state
    }

    /// Adds a child of `parent` carrying a deep copy of the parent state.
    /// `probability` is the chance of this branch given the parent; the
    /// stored probability is cumulative and clamped to [0, 1].
    pub fn fork(&mut self, parent: usize, probability: f64, label: &str) -> usize {
        let id = self.nodes.len();
        let state = self.nodes[parent].state.clone();
        let cumulative = (self.nodes[parent].probability * probability).clamp(0.0, 1.0);
        self.nodes.push(OutcomeNode {
            state,
            parent: Some(parent),
            children: Vec::new(),
            probability: cumulative,
            label: label.to_string(),
            my_action: None,
            foe_action: None,
            terminal: false,
            score: None,
        });
        self.nodes[parent].children.push(id);
        id
    }

    /// All leaves of the subtree rooted at `id`, terminal or not.
    pub fn leaves(&self, id: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let node = &self.nodes[cur];
            if node.children.is_empty() {
                out.push(cur);
            } else {
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// Leaves of the subtree that are still live branch points.
    pub fn open_leaves(&self, id: usize) -> Vec<usize> {
        self.leaves(id)
            .into_iter()
            .filter(|&leaf| !self.nodes[leaf].terminal)
            .collect()
    }

    pub fn mark_terminal(&mut self, id: usize) {
        self.nodes[id].terminal = true;
    }

    /// Discards every sibling of `winner` under its parent. Used when a
    /// forced switch has been decided and only one branch stays relevant.
    pub fn collapse_to(&mut self, winner: usize) {
        if let Some(parent) = self.nodes[winner].parent {
            self.nodes[parent].children.retain(|&c| c == winner);
        }
    }

    /// Sum of leaf probabilities under `id`; equals the node's own
    /// probability when every fork partitions its parent.
    pub fn leaf_probability_sum(&self, id: usize) -> f64 {
        self.leaves(id)
            .iter()
            .map(|&leaf| self.nodes[leaf].probability)
            .sum()
    }
}
