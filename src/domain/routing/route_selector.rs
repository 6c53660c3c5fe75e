//! Ranking of candidate routes

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::cmp::Ordering;

use super::Route;
use crate::math;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorSettings {
    /// Outputs closer than this, in display units of the output coin, tie
    pub tie_epsilon: Decimal,
    pub max_alternatives: usize,
}

impl Default for SelectorSettings {
    fn default() -> Self {
        Self {
            tie_epsilon: dec!(0.001),
            max_alternatives: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedRoutes {
    pub best: Route,
    pub alternatives: Vec<Route>,
}

/// Orders candidate routes: most output first, lower impact among near-equal outputs
#[derive(Debug, Clone, Default)]
pub struct RouteSelector {
    settings: SelectorSettings,
}

impl RouteSelector {
    pub fn new(settings: SelectorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SelectorSettings {
        &self.settings
    }

    /// Best route plus up to `max_alternatives` runners-up, `None` without candidates
    pub fn select(&self, routes: Vec<Route>) -> Option<RankedRoutes> {
        let mut ranked = self.rank(routes).into_iter();
        let best = ranked.next()?;
        let alternatives = ranked.take(self.settings.max_alternatives).collect();
        Some(RankedRoutes { best, alternatives })
    }

    /// Full ranking.
    ///
    /// A strict sort by output first; then each run of routes within epsilon
    /// of its leader is re-sorted by price impact. Both passes are total orders.
    pub fn rank(&self, mut routes: Vec<Route>) -> Vec<Route> {
        routes.sort_by(by_output);

        let mut start = 0;
        while start < routes.len() {
            let leader = &routes[start];
            let mut end = start + 1;
            while end < routes.len() && self.is_tie(leader, &routes[end]) {
                end += 1;
            }
            routes[start..end].sort_by(by_impact);
            start = end;
        }

        routes
    }

    /// `candidate` trails `leader` by less than epsilon
    fn is_tie(&self, leader: &Route, candidate: &Route) -> bool {
        let gap = leader.amount_out.saturating_sub(candidate.amount_out);
        match math::to_display_units(gap, leader.coin_out_decimals) {
            Ok(gap) => gap < self.settings.tie_epsilon,
            Err(_) => false,
        }
    }
}

fn by_output(a: &Route, b: &Route) -> Ordering {
    b.amount_out
        .cmp(&a.amount_out)
        .then(a.price_impact.cmp(&b.price_impact))
        .then(a.steps.len().cmp(&b.steps.len()))
}

fn by_impact(a: &Route, b: &Route) -> Ordering {
    a.price_impact
        .cmp(&b.price_impact)
        .then(b.amount_out.cmp(&a.amount_out))
        .then(a.steps.len().cmp(&b.steps.len()))
}
