//! The droppable algebra: a leaf drop with a rate and quantity range, a
//! chance wrapper around any droppable, and a weighted table choosing one
//! entry. Rolls walk the tree with the engine RNG; the expected-items fold
//! multiplies rates through for the rate estimator.

use crate::id::Id;
use crate::rng::SimRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn one() -> i64 {
    1
}

fn full_rate() -> f64 {
    1.0
}

fn is_one(v: &i64) -> bool {
    *v == 1
}

fn is_full_rate(v: &f64) -> bool {
    *v == 1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Droppable {
    /// Leaf: `rate` chance of `min..=max` of `item`.
    #[serde(rename = "drop")]
    Drop {
        item: Id,
        #[serde(default = "one", skip_serializing_if = "is_one")]
        min: i64,
        #[serde(default = "one", skip_serializing_if = "is_one")]
        max: i64,
        #[serde(default = "full_rate", skip_serializing_if = "is_full_rate")]
        rate: f64,
    },
    /// `rate` chance of rolling the child at all.
    #[serde(rename = "chance")]
    Chance { rate: f64, child: Box<Droppable> },
    /// Weighted choice of exactly one entry.
    #[serde(rename = "table")]
    Table { entries: Vec<WeightedEntry> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedEntry {
    pub weight: f64,
    pub droppable: Droppable,
}

impl Droppable {
    pub fn item(item: Id) -> Self {
        Droppable::Drop {
            item,
            min: 1,
            max: 1,
            rate: 1.0,
        }
    }

    pub fn item_range(item: Id, min: i64, max: i64) -> Self {
        Droppable::Drop {
            item,
            min,
            max,
            rate: 1.0,
        }
    }

    pub fn chance(rate: f64, child: Droppable) -> Self {
        Droppable::Chance {
            rate,
            child: Box::new(child),
        }
    }

    /// Roll the tree, appending `(item, quantity)` results.
    pub fn roll(&self, rng: &mut SimRng, out: &mut Vec<(Id, i64)>) {
        match self {
            Droppable::Drop {
                item,
                min,
                max,
                rate,
            } => {
                if *rate >= 1.0 || rng.next_double() < *rate {
                    let qty = rng.uniform_int(*min, *max);
                    if qty > 0 {
                        out.push((item.clone(), qty));
                    }
                }
            }
            Droppable::Chance { rate, child } => {
                if rng.next_double() < *rate {
                    child.roll(rng, out);
                }
            }
            Droppable::Table { entries } => {
                let total: f64 = entries.iter().map(|e| e.weight).sum();
                if total <= 0.0 {
                    return;
                }
                let mut pick = rng.next_double() * total;
                for entry in entries {
                    pick -= entry.weight;
                    if pick < 0.0 {
                        entry.droppable.roll(rng, out);
                        return;
                    }
                }
                // Floating point residue lands on the last entry.
                if let Some(last) = entries.last() {
                    last.droppable.roll(rng, out);
                }
            }
        }
    }

    /// Expected items per roll, multiplying rates through the tree.
    pub fn expected_items(&self) -> BTreeMap<Id, f64> {
        let mut out = BTreeMap::new();
        self.expected_into(1.0, &mut out);
        out
    }

    fn expected_into(&self, multiplier: f64, out: &mut BTreeMap<Id, f64>) {
        match self {
            Droppable::Drop {
                item,
                min,
                max,
                rate,
            } => {
                let mean_qty = (*min + *max) as f64 / 2.0;
                *out.entry(item.clone()).or_insert(0.0) += multiplier * rate * mean_qty;
            }
            Droppable::Chance { rate, child } => {
                child.expected_into(multiplier * rate, out);
            }
            Droppable::Table { entries } => {
                let total: f64 = entries.iter().map(|e| e.weight).sum();
                if total <= 0.0 {
                    return;
                }
                for entry in entries {
                    entry
                        .droppable
                        .expected_into(multiplier * entry.weight / total, out);
                }
            }
        }
    }
}
