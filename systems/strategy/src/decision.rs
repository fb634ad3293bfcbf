//! Pure decision rules for every strategy variant.

use std::cmp::Ordering;

use rand::Rng;
use tower_war_core::{DispatchOrder, Owner, Position, TacticalMode, TowerSnapshot, TowerView};

use crate::Thresholds;

/// Towers partitioned by their relation to the deciding side.
pub(crate) struct Battlefield<'a> {
    pub(crate) own: Vec<&'a TowerSnapshot>,
    pub(crate) opponents: Vec<&'a TowerSnapshot>,
    pub(crate) neutrals: Vec<&'a TowerSnapshot>,
}

impl<'a> Battlefield<'a> {
    pub(crate) fn partition(towers: &'a TowerView, side: Owner) -> Self {
        let mut own = Vec::new();
        let mut opponents = Vec::new();
        let mut neutrals = Vec::new();
        for tower in towers.iter() {
            if tower.owner == side {
                own.push(tower);
            } else if tower.owner == Owner::Neutral {
                neutrals.push(tower);
            } else {
                opponents.push(tower);
            }
        }
        Self {
            own,
            opponents,
            neutrals,
        }
    }

    fn sources_above(&self, minimum: u32) -> Vec<&'a TowerSnapshot> {
        self.own
            .iter()
            .copied()
            .filter(|tower| tower.troops > minimum)
            .collect()
    }

    fn non_allied(&self) -> Vec<&'a TowerSnapshot> {
        let mut targets: Vec<_> = self
            .opponents
            .iter()
            .chain(self.neutrals.iter())
            .copied()
            .collect();
        targets.sort_by_key(|tower| tower.id);
        targets
    }
}

/// Strongest tower, lowest id on ties.
fn strongest<'a>(towers: &[&'a TowerSnapshot]) -> Option<&'a TowerSnapshot> {
    towers
        .iter()
        .copied()
        .min_by(|a, b| b.troops.cmp(&a.troops).then(a.id.cmp(&b.id)))
}

/// Weakest tower, nearest to `from` on ties, then lowest id.
fn weakest_near<'a>(towers: &[&'a TowerSnapshot], from: Position) -> Option<&'a TowerSnapshot> {
    towers.iter().copied().min_by(|a, b| {
        a.troops
            .cmp(&b.troops)
            .then_with(|| by_distance(a, b, from))
            .then(a.id.cmp(&b.id))
    })
}

/// Nearest tower to `to`, lowest id on ties.
fn nearest<'a>(towers: &[&'a TowerSnapshot], to: Position) -> Option<&'a TowerSnapshot> {
    towers
        .iter()
        .copied()
        .min_by(|a, b| by_distance(a, b, to).then(a.id.cmp(&b.id)))
}

fn by_distance(a: &TowerSnapshot, b: &TowerSnapshot, from: Position) -> Ordering {
    from.distance_to(a.position)
        .total_cmp(&from.distance_to(b.position))
}

/// Strongest tower above the commit threshold strikes the weakest non-allied tower.
pub(crate) fn aggressive(field: &Battlefield<'_>, thresholds: &Thresholds) -> Vec<DispatchOrder> {
    let sources = field.sources_above(thresholds.minimum_commit);
    let Some(source) = strongest(&sources) else {
        return Vec::new();
    };
    let targets = field.non_allied();
    weakest_near(&targets, source.position)
        .map(|target| vec![DispatchOrder::new(source.id, target.id)])
        .unwrap_or_default()
}

/// Expands into the nearest neutral tower; otherwise attacks only from a surplus.
pub(crate) fn defensive(field: &Battlefield<'_>, thresholds: &Thresholds) -> Vec<DispatchOrder> {
    let sources = field.sources_above(thresholds.defensive_commit);
    if sources.is_empty() {
        return Vec::new();
    }

    if !field.neutrals.is_empty() {
        let mut best: Option<(f32, &TowerSnapshot, &TowerSnapshot)> = None;
        for &source in &sources {
            for &target in &field.neutrals {
                let distance = source.position.distance_to(target.position);
                let closer = match best {
                    None => true,
                    Some((shortest, _, _)) => distance < shortest,
                };
                if closer {
                    best = Some((distance, source, target));
                }
            }
        }
        return best
            .map(|(_, source, target)| vec![DispatchOrder::new(source.id, target.id)])
            .unwrap_or_default();
    }

    let Some(anchor) = strongest(&sources) else {
        return Vec::new();
    };
    let Some(target) = weakest_near(&field.opponents, anchor.position) else {
        return Vec::new();
    };
    let Some(source) = nearest(&sources, target.position) else {
        return Vec::new();
    };

    let sendable = source.troops / 2;
    if sendable >= target.troops.saturating_add(thresholds.surplus_margin) {
        vec![DispatchOrder::new(source.id, target.id)]
    } else {
        Vec::new()
    }
}

/// Ratio of own strength to opponent strength mapped onto a tactical mode.
pub(crate) fn assess(towers: &TowerView, side: Owner, thresholds: &Thresholds) -> TacticalMode {
    let own = towers.strength_of(side) as f64;
    let opponent = side
        .opponent()
        .map(|opponent| towers.strength_of(opponent))
        .unwrap_or(0) as f64;

    if own > opponent * thresholds.upper_ratio {
        TacticalMode::Aggressive
    } else if own < opponent * thresholds.lower_ratio {
        TacticalMode::Defensive
    } else {
        TacticalMode::Balanced
    }
}

/// Adaptive decision for an already assessed mode.
pub(crate) fn adaptive<R: Rng>(
    field: &Battlefield<'_>,
    mode: TacticalMode,
    thresholds: &Thresholds,
    rng: &mut R,
) -> Vec<DispatchOrder> {
    match mode {
        TacticalMode::Aggressive => coordinated_assault(field, thresholds),
        TacticalMode::Defensive => expand_or_consolidate(field, thresholds),
        TacticalMode::Balanced => {
            if rng.gen_bool(0.5) {
                coordinated_assault(field, thresholds)
            } else {
                expand_or_consolidate(field, thresholds)
            }
        }
    }
}

/// Several towers converge on the weakest non-allied tower until their
/// combined strength matches its garrison.
fn coordinated_assault(field: &Battlefield<'_>, thresholds: &Thresholds) -> Vec<DispatchOrder> {
    let mut sources = field.sources_above(thresholds.minimum_commit);
    sources.sort_by(|a, b| b.troops.cmp(&a.troops).then(a.id.cmp(&b.id)));
    let Some(lead) = sources.first() else {
        return Vec::new();
    };

    let targets = field.non_allied();
    let Some(target) = weakest_near(&targets, lead.position) else {
        return Vec::new();
    };

    let mut orders = Vec::new();
    let mut committed: u32 = 0;
    for source in sources.iter().take(thresholds.max_assault_sources.max(1)) {
        orders.push(DispatchOrder::new(source.id, target.id));
        committed = committed.saturating_add(source.troops / 2);
        if committed >= target.troops {
            break;
        }
    }
    orders
}

/// Takes the cheapest nearby neutral tower, otherwise moves troops from the
/// strongest own tower to the weakest one.
fn expand_or_consolidate(field: &Battlefield<'_>, thresholds: &Thresholds) -> Vec<DispatchOrder> {
    let sources = field.sources_above(thresholds.minimum_commit);
    let Some(source) = strongest(&sources) else {
        return Vec::new();
    };

    let expansion = field.neutrals.iter().copied().min_by(|a, b| {
        neutral_cost(source, a, thresholds)
            .total_cmp(&neutral_cost(source, b, thresholds))
            .then(a.id.cmp(&b.id))
    });
    if let Some(target) = expansion {
        return vec![DispatchOrder::new(source.id, target.id)];
    }

    let reserve = field
        .own
        .iter()
        .copied()
        .filter(|tower| tower.id != source.id)
        .min_by(|a, b| {
            a.troops
                .cmp(&b.troops)
                .then_with(|| by_distance(a, b, source.position))
                .then(a.id.cmp(&b.id))
        });
    if let Some(target) = reserve {
        if target.troops < source.troops {
            return vec![DispatchOrder::new(source.id, target.id)];
        }
        return Vec::new();
    }

    weakest_near(&field.opponents, source.position)
        .map(|target| vec![DispatchOrder::new(source.id, target.id)])
        .unwrap_or_default()
}

fn neutral_cost(source: &TowerSnapshot, target: &TowerSnapshot, thresholds: &Thresholds) -> f32 {
    source.position.distance_to(target.position)
        + target.troops as f32 * thresholds.neutral_troop_weight
}
