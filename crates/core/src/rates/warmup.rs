//! Background warmup for tracked exchange rates.
//!
//! Warms every tracked currency once at startup and then every 24 hours, so
//! the first calculation of the day does not pay the upstream round-trip.
//! Failures are logged and swallowed; the next cycle tries again.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use super::rates_traits::RateServiceTrait;
use crate::constants::TRACKED_CURRENCIES;

/// Refresh period after the initial warm.
const WARMUP_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Handle to a running warmup task.
pub struct WarmupHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl WarmupHandle {
    /// Signals the warmup loop to stop and waits for it to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

pub struct RateWarmup;

impl RateWarmup {
    /// Starts the warmup task on the current runtime.
    pub fn spawn(rates: Arc<dyn RateServiceTrait>) -> WarmupHandle {
        Self::spawn_with_period(rates, WARMUP_PERIOD)
    }

    fn spawn_with_period(rates: Arc<dyn RateServiceTrait>, period: Duration) -> WarmupHandle {
        let (shutdown, mut rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The interval's first tick completes immediately; consume it so
            // the startup warm below is not doubled.
            ticker.tick().await;

            loop {
                warm_all(rates.as_ref()).await;

                tokio::select! {
                    biased;
                    changed = rx.changed() => {
                        if changed.is_err() || *rx.borrow() {
                            log::debug!("rate warmup stopped");
                            return;
                        }
                    }
                    _ = ticker.tick() => {}
                }
            }
        });

        WarmupHandle { shutdown, task }
    }
}

async fn warm_all(rates: &dyn RateServiceTrait) {
    for code in TRACKED_CURRENCIES {
        match rates.rate(code).await {
            Ok(rate) => log::info!("warmed {} rate: {}", code, rate),
            Err(err) => log::warn!("rate warmup for {} failed: {}", code, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{Error, Result};
    use crate::rates::rates_model::RatePair;
    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct CountingRates {
        calls: AtomicU32,
        fail: bool,
    }

    impl CountingRates {
        fn failing() -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail: true,
            }
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RateServiceTrait for CountingRates {
        async fn rate(&self, currency_code: &str) -> Result<Decimal> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::RatesUnavailable {
                    currency: currency_code.to_string(),
                    reason: "scripted failure".to_string(),
                });
            }
            Ok(dec!(48))
        }

        async fn rate_pair(&self) -> Result<RatePair> {
            Ok(RatePair {
                eur: self.rate("EUR").await?,
                usd: self.rate("USD").await?,
                date: Utc::now(),
            })
        }

        async fn cross_rate(&self, _source: &str, _target: &str) -> Result<Decimal> {
            Ok(Decimal::ONE)
        }
    }

    #[tokio::test]
    async fn test_warms_at_startup_and_periodically() {
        let rates = Arc::new(CountingRates::default());
        let handle =
            RateWarmup::spawn_with_period(
                Arc::clone(&rates) as Arc<dyn RateServiceTrait>,
                Duration::from_millis(25),
            );

        tokio::time::sleep(Duration::from_millis(70)).await;
        // The startup cycle plus at least one periodic cycle, two currencies each.
        assert!(rates.call_count() >= 4, "count was {}", rates.call_count());

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_the_loop() {
        let rates = Arc::new(CountingRates::default());
        let handle =
            RateWarmup::spawn_with_period(
                Arc::clone(&rates) as Arc<dyn RateServiceTrait>,
                Duration::from_millis(10),
            );

        tokio::time::sleep(Duration::from_millis(5)).await;
        handle.shutdown().await;
        let frozen = rates.call_count();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(rates.call_count(), frozen);
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_loop() {
        let rates = Arc::new(CountingRates::failing());
        let handle =
            RateWarmup::spawn_with_period(
                Arc::clone(&rates) as Arc<dyn RateServiceTrait>,
                Duration::from_millis(15),
            );

        tokio::time::sleep(Duration::from_millis(50)).await;
        // Still cycling despite every call failing.
        assert!(rates.call_count() > 2, "count was {}", rates.call_count());

        handle.shutdown().await;
    }
}
