use colored::Colorize;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::scenarios::{Check, Scenario};
use crate::util::iteration_seed;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
}

pub struct ScenarioRunner {
    verbose: bool,
}

impl ScenarioRunner {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub async fn run_scenario(
        &self,
        scenario: &Scenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::with_capacity(seeds.len());
        for &seed in seeds {
            if self.verbose {
                println!(
                    "🧪 Testing scenario: {} (seed: {seed})",
                    scenario.name.bright_white()
                );
            }
            results.push(self.run_single_scenario(scenario, seed, iterations).await);
        }
        results
    }

    async fn run_single_scenario(
        &self,
        scenario: &Scenario,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let mut failures = Vec::new();
        let mut timings = Vec::with_capacity(iterations);
        for iteration in 0..iterations {
            let rng = ChaCha20Rng::seed_from_u64(iteration_seed(seed, iteration));
            let started = Instant::now();
            let outcome = match scenario.check {
                Check::Sync(check) => {
                    let mut rng = rng;
                    check(&mut rng)
                }
                Check::Async(check) => check(rng).await,
            };
            timings.push(started.elapsed());
            if let Err(err) = outcome {
                log::debug!("{} seed {seed} iteration {iteration}: {err:#}", scenario.name);
                if self.verbose {
                    println!("   ❌ iteration {iteration}: {}", format!("{err:#}").red());
                }
                failures.push(format!("iteration {iteration}: {err:#}"));
            }
        }

        let average_duration = if timings.is_empty() {
            Duration::ZERO
        } else {
            timings.iter().sum::<Duration>() / u32::try_from(timings.len()).unwrap_or(u32::MAX)
        };

        ScenarioResult {
            scenario_name: scenario.name.to_string(),
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: iterations - failures.len(),
            failures,
            average_duration,
        }
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_micros().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let micros = u128::deserialize(deserializer)?;
        Ok(Duration::from_micros(u64::try_from(micros).unwrap_or(u64::MAX)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::get_scenario;

    #[tokio::test]
    async fn runner_counts_every_iteration() {
        let scenario = get_scenario("cep-mask").expect("scenario");
        let results = ScenarioRunner::new(false)
            .run_scenario(&scenario, &[1, 2], 3)
            .await;
        assert_eq!(results.len(), 2);
        for result in &results {
            assert!(result.passed, "{:?}", result.failures);
            assert_eq!(result.iterations_run, 3);
            assert_eq!(result.successful_iterations, 3);
        }
    }

    #[test]
    fn failing_check_is_reported_per_iteration() {
        fn always_fails(_rng: &mut ChaCha20Rng) -> anyhow::Result<()> {
            anyhow::bail!("boom")
        }
        let scenario = Scenario {
            name: "broken",
            description: "always fails",
            check: Check::Sync(always_fails),
        };
        let result = futures::executor::block_on(
            ScenarioRunner::new(false).run_single_scenario(&scenario, 9, 2),
        );
        assert!(!result.passed);
        assert_eq!(result.successful_iterations, 0);
        assert_eq!(result.failures.len(), 2);
        assert!(result.failures[0].contains("boom"));
    }

    #[test]
    fn durations_serialize_as_micros() {
        let result = ScenarioResult {
            scenario_name: "cep-mask".to_string(),
            seed: 1,
            passed: true,
            iterations_run: 1,
            successful_iterations: 1,
            failures: Vec::new(),
            average_duration: Duration::from_micros(1500),
        };
        let json = serde_json::to_value(&result).expect("serialize");
        assert_eq!(json["average_duration"], 1500);
        let back: ScenarioResult = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back.average_duration, Duration::from_micros(1500));
    }
}
