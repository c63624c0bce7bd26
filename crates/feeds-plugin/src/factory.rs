//! Median reporting plugin factory.
//!
//! Validates a [`PluginConfig`] once, up front, and holds what every
//! reporting plugin instance shares: the two pipeline specs, the report codec
//! and the optional deviation function. Data sources are bound later, when the
//! host provides a pipeline runner.

use std::sync::Arc;

use feeds_codec::GenericCodec;
use feeds_median::data_source::{DataSource, PipelineRunner};
use feeds_median::deviation::DeviationFunc;
use feeds_median::report_codec::ReportCodec;
use feeds_median::Result;

use crate::config::{PluginConfig, DEFAULT_PIPELINE, JUELS_PER_FEE_COIN_PIPELINE};

/// Data sources bound to one pipeline runner.
#[derive(Debug)]
pub struct DataSources<R> {
    /// Produces this oracle's observation.
    pub observation: DataSource<R>,
    /// Produces the juels-per-fee-coin rate.
    pub juels_per_fee_coin: DataSource<R>,
}

/// Shared state of median reporting plugins.
pub struct MedianFactory<C> {
    observation_spec: String,
    juels_per_fee_coin_spec: String,
    report_codec: ReportCodec<C>,
    deviation: Option<Box<dyn DeviationFunc>>,
}

impl<C: GenericCodec> MedianFactory<C> {
    /// Validate `config` and assemble a factory around `codec`.
    ///
    /// # Errors
    ///
    /// - [`feeds_median::MedianError::InvalidConfig`] if either required
    ///   pipeline is missing or the deviation definition is malformed
    pub fn new(config: &PluginConfig, codec: C) -> Result<Self> {
        let observation_spec = config.pipeline(DEFAULT_PIPELINE)?.to_string();
        let juels_per_fee_coin_spec = config.pipeline(JUELS_PER_FEE_COIN_PIPELINE)?.to_string();
        let deviation = config.deviation_config()?.map(|d| d.build());

        tracing::info!(
            pipelines = config.pipelines.len(),
            deviation = deviation.is_some(),
            "median factory configured"
        );

        Ok(Self {
            observation_spec,
            juels_per_fee_coin_spec,
            report_codec: ReportCodec::new(codec),
            deviation,
        })
    }

    /// Bind both pipelines to `runner`.
    pub fn data_sources<R: PipelineRunner>(&self, runner: Arc<R>) -> DataSources<Arc<R>> {
        DataSources {
            observation: DataSource::new(Arc::clone(&runner), self.observation_spec.clone()),
            juels_per_fee_coin: DataSource::new(runner, self.juels_per_fee_coin_spec.clone()),
        }
    }

    /// The report codec.
    pub fn report_codec(&self) -> &ReportCodec<C> {
        &self.report_codec
    }

    /// The deviation function, if one is configured.
    pub fn deviation(&self) -> Option<&dyn DeviationFunc> {
        self.deviation.as_deref()
    }
}

impl<C> std::fmt::Debug for MedianFactory<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MedianFactory")
            .field("observation_spec", &self.observation_spec)
            .field("juels_per_fee_coin_spec", &self.juels_per_fee_coin_spec)
            .field("deviation", &self.deviation.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use feeds_median::data_source::RunResult;
    use feeds_median::report_codec::median_report_codec;
    use feeds_median::MedianError;
    use feeds_types::{AttributedObservation, BigInt};
    use serde_json::Value;

    use super::*;
    use crate::config::PipelineSpec;

    /// Runner double answering each spec with a fixed value.
    struct SpecRunner {
        seen: Mutex<Vec<String>>,
    }

    impl PipelineRunner for SpecRunner {
        fn execute_run(&self, spec: &str, _vars: &Value) -> Result<Vec<RunResult>> {
            self.seen.lock().expect("lock").push(spec.to_string());
            let value = if spec == "prices" { "1834.5" } else { "6000000" };
            Ok(vec![RunResult::ok(value)])
        }
    }

    fn config() -> PluginConfig {
        PluginConfig {
            pipelines: vec![
                PipelineSpec {
                    name: DEFAULT_PIPELINE.to_string(),
                    spec: "prices".to_string(),
                },
                PipelineSpec {
                    name: JUELS_PER_FEE_COIN_PIPELINE.to_string(),
                    spec: "link".to_string(),
                },
            ],
            ..PluginConfig::default()
        }
    }

    #[test]
    fn test_factory_binds_pipelines() {
        let factory = MedianFactory::new(&config(), median_report_codec()).expect("factory");
        assert!(factory.deviation().is_none());

        let runner = Arc::new(SpecRunner {
            seen: Mutex::new(Vec::new()),
        });
        let sources = factory.data_sources(Arc::clone(&runner));
        assert_eq!(sources.observation.spec(), "prices");
        assert_eq!(sources.juels_per_fee_coin.spec(), "link");

        assert_eq!(sources.observation.observe().expect("value"), BigInt::from(1834));
        assert_eq!(
            sources.juels_per_fee_coin.observe().expect("juels"),
            BigInt::from(6_000_000)
        );
        assert_eq!(*runner.seen.lock().expect("lock"), vec!["prices", "link"]);
    }

    #[test]
    fn test_factory_report_codec_roundtrip() {
        let factory = MedianFactory::new(&config(), median_report_codec()).expect("factory");
        let observations = vec![
            AttributedObservation::new(10, 300, 5, 0),
            AttributedObservation::new(11, 100, 5, 1),
            AttributedObservation::new(12, 200, 5, 2),
        ];
        let report = factory
            .report_codec()
            .build_report(&observations)
            .expect("build");
        assert_eq!(
            factory
                .report_codec()
                .median_from_report(&report)
                .expect("median"),
            BigInt::from(200)
        );
    }

    #[test]
    fn test_factory_requires_both_pipelines() {
        let mut only_default = config();
        only_default.pipelines.truncate(1);
        let err = MedianFactory::new(&only_default, median_report_codec()).expect_err("missing");
        assert_eq!(
            err,
            MedianError::InvalidConfig("no pipeline found for juelsPerFeeCoinPipeline".to_string())
        );

        let err = MedianFactory::new(&PluginConfig::default(), median_report_codec())
            .expect_err("missing");
        assert_eq!(
            err,
            MedianError::InvalidConfig("no pipeline found for __DEFAULT_PIPELINE__".to_string())
        );
    }

    #[test]
    fn test_factory_builds_deviation() {
        let mut with_deviation = config();
        with_deviation.deviation = Some(
            serde_json::from_value(serde_json::json!({
                "kind": "expiring-instrument",
                "expiresAt": 4_102_444_800u64,
            }))
            .expect("definition"),
        );
        let factory = MedianFactory::new(&with_deviation, median_report_codec()).expect("factory");
        let deviation = factory.deviation().expect("configured");

        let old = BigInt::from(1_000_000_000_000_000_000u64);
        assert!(!deviation
            .deviates(1_000_000, Some(&old), Some(&old))
            .expect("equal values"));
        assert!(deviation
            .deviates(1_000_000, Some(&old), Some(&(old.clone() * 2)))
            .expect("doubled"));
    }

    #[test]
    fn test_factory_rejects_bad_deviation() {
        let mut bad = config();
        bad.deviation = Some(feeds_median::deviation::DeviationDefinition::default());
        let err = MedianFactory::new(&bad, median_report_codec()).expect_err("no kind");
        assert!(matches!(err, MedianError::InvalidConfig(_)));
    }
}
