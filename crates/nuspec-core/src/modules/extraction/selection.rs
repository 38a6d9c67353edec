use super::samples::EventRecord;
use crate::domain::{ComputeResult, EventClass, InteractionChannel, NuSpecError};
use serde::{Deserialize, Serialize};

/// Event filter evaluated against one [`EventRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Selection {
    All,
    Channel(InteractionChannel),
    EventClass(EventClass),
    /// Half-open `[min, max)` window on reconstructed energy.
    RecoEnergy { min: f64, max: f64 },
    And(Vec<Selection>),
    Or(Vec<Selection>),
    Not(Box<Selection>),
}

impl Selection {
    pub fn channel_and_class(channel: InteractionChannel, event_class: EventClass) -> Self {
        Self::And(vec![Self::EventClass(event_class), Self::Channel(channel)])
    }

    pub fn and(self, other: Selection) -> Self {
        match self {
            Self::And(mut terms) => {
                terms.push(other);
                Self::And(terms)
            }
            Self::All => other,
            lhs => Self::And(vec![lhs, other]),
        }
    }

    pub fn accepts(&self, event: &EventRecord) -> bool {
        match self {
            Self::All => true,
            Self::Channel(channel) => event.channel() == *channel,
            Self::EventClass(class) => event.event_class == *class,
            Self::RecoEnergy { min, max } => event.ev_reco >= *min && event.ev_reco < *max,
            Self::And(terms) => terms.iter().all(|term| term.accepts(event)),
            Self::Or(terms) => terms.iter().any(|term| term.accepts(event)),
            Self::Not(inner) => !inner.accepts(event),
        }
    }
}

/// Per-event weight: unity, a named column, or a product of weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Weight {
    Unit,
    Column(String),
    Product(Vec<Weight>),
}

impl Weight {
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column(name.into())
    }

    pub fn evaluate(&self, event: &EventRecord) -> ComputeResult<f64> {
        match self {
            Self::Unit => Ok(1.0),
            Self::Column(name) => event.weight(name).ok_or_else(|| {
                NuSpecError::config(
                    "CONFIG.WEIGHT_COLUMN",
                    format!("event has no weight column '{name}'"),
                )
            }),
            Self::Product(factors) => factors
                .iter()
                .try_fold(1.0, |acc, factor| Ok(acc * factor.evaluate(event)?)),
        }
    }
}
