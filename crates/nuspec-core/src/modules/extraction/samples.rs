use crate::domain::{ComputeResult, EventClass, InteractionChannel, NuSpecError, SampleId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One simulated interaction: true and reconstructed neutrino energy in GeV,
/// whether it was charged-current, its reconstructed class and any named
/// weight columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub ev: f64,
    pub ev_reco: f64,
    pub cc: bool,
    pub event_class: EventClass,
    #[serde(default)]
    pub weights: BTreeMap<String, f64>,
}

impl EventRecord {
    pub fn new(ev: f64, ev_reco: f64, cc: bool, event_class: EventClass) -> Self {
        Self {
            ev,
            ev_reco,
            cc,
            event_class,
            weights: BTreeMap::new(),
        }
    }

    pub fn with_weight(mut self, column: impl Into<String>, value: f64) -> Self {
        self.weights.insert(column.into(), value);
        self
    }

    pub fn weight(&self, column: &str) -> Option<f64> {
        self.weights.get(column).copied()
    }

    pub fn channel(&self) -> InteractionChannel {
        if self.cc {
            InteractionChannel::Cc
        } else {
            InteractionChannel::Nc
        }
    }
}

/// Source of per-sample event tables.
pub trait SampleRepository {
    fn events(&self, sample: &SampleId) -> ComputeResult<&[EventRecord]>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemorySampleRepository {
    samples: BTreeMap<SampleId, Vec<EventRecord>>,
}

impl InMemorySampleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sample: SampleId, events: Vec<EventRecord>) {
        self.samples.insert(sample, events);
    }

    pub fn with_sample(mut self, sample: SampleId, events: Vec<EventRecord>) -> Self {
        self.insert(sample, events);
        self
    }

    pub fn samples(&self) -> impl Iterator<Item = &SampleId> {
        self.samples.keys()
    }
}

impl SampleRepository for InMemorySampleRepository {
    fn events(&self, sample: &SampleId) -> ComputeResult<&[EventRecord]> {
        self.samples
            .get(sample)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                NuSpecError::config(
                    "CONFIG.UNKNOWN_SAMPLE",
                    format!("sample '{sample}' is not in the repository"),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{EventRecord, InMemorySampleRepository, SampleRepository};
    use crate::domain::{
        BeamMode, EventClass, Flavor, InteractionChannel, NuSpecErrorCategory, SampleId,
    };

    #[test]
    fn unknown_sample_is_a_config_error() {
        let known = SampleId::new(BeamMode::Neutrino, Flavor::NUMU, Flavor::NUMU).expect("sample");
        let missing = SampleId::new(BeamMode::Neutrino, Flavor::NUMU, Flavor::NUE).expect("sample");
        let repository = InMemorySampleRepository::new()
            .with_sample(known, vec![EventRecord::new(1.0, 1.1, true, EventClass::NumuCcLike)]);

        assert_eq!(repository.events(&known).expect("known").len(), 1);
        let error = repository.events(&missing).expect_err("missing sample");
        assert_eq!(error.category(), NuSpecErrorCategory::ConfigError);
        assert!(error.message().contains("nuflux_numuflux_nue"));
    }

    #[test]
    fn records_parse_from_camel_case_json() {
        let record: EventRecord = serde_json::from_str(
            r#"{"ev": 2.5, "evReco": 2.25, "cc": false, "eventClass": "ncLike", "weights": {"flux": 0.5}}"#,
        )
        .expect("record should parse");
        assert_eq!(record.channel(), InteractionChannel::Nc);
        assert_eq!(record.event_class, EventClass::NcLike);
        assert_eq!(record.weight("flux"), Some(0.5));
    }
}
