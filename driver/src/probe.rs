//! Driver identifier probing.
//!
//! A [`DriverProber`] tries candidate identifiers against a loader context
//! and keeps a record of every attempt, in order. The record feeds both
//! verbose diagnostics and the final `DriverNotAvailable` message, which
//! must name everything that was tried.

use std::sync::Arc;

use reportlink_core::Diagnostics;

use crate::api::Driver;
use crate::context::LoaderContext;

/// Tries candidate identifiers and records the trial order.
pub struct DriverProber {
    attempts: Vec<String>,
}

impl DriverProber {
    /// A prober with an empty attempt record.
    pub fn new() -> Self {
        Self {
            attempts: Vec::new(),
        }
    }

    /// Tries to resolve `identifier` through `ctx`, recording the attempt.
    pub fn try_identifier(
        &mut self,
        ctx: &Arc<LoaderContext>,
        identifier: &str,
        diag: &mut Diagnostics,
    ) -> Option<Arc<dyn Driver>> {
        diag.step(format!("Trying driver: {identifier}"));
        self.attempts.push(identifier.to_string());
        match ctx.lookup(identifier) {
            Some(driver) => {
                diag.step(format!("Successfully resolved driver: {identifier}"));
                Some(driver)
            }
            None => {
                diag.step(format!("Driver not resolvable: {identifier}"));
                None
            }
        }
    }

    /// Tries each identifier in order, returning the first resolvable
    /// driver. Every identifier up to and including the winning one is
    /// recorded.
    pub fn try_chain(
        &mut self,
        ctx: &Arc<LoaderContext>,
        identifiers: &[&str],
        diag: &mut Diagnostics,
    ) -> Option<Arc<dyn Driver>> {
        for identifier in identifiers {
            if let Some(driver) = self.try_identifier(ctx, identifier, diag) {
                return Some(driver);
            }
        }
        None
    }

    /// Identifiers attempted so far, in trial order.
    pub fn attempts(&self) -> &[String] {
        &self.attempts
    }

    /// Consumes the prober, yielding the attempt record.
    pub fn into_attempts(self) -> Vec<String> {
        self.attempts
    }
}

impl Default for DriverProber {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDriver;

    #[test]
    fn test_chain_stops_at_first_resolvable() {
        let ctx = LoaderContext::root();
        ctx.register(FakeDriver::accepting("com.mysql.jdbc.Driver", "mysql://"));

        let mut prober = DriverProber::new();
        let mut diag = Diagnostics::quiet();
        let driver = prober
            .try_chain(
                &ctx,
                &["com.mysql.jdbc.Driver", "com.mysql.cj.jdbc.Driver"],
                &mut diag,
            )
            .unwrap();
        assert_eq!(driver.identifier(), "com.mysql.jdbc.Driver");
        assert_eq!(prober.attempts(), ["com.mysql.jdbc.Driver"]);
    }

    #[test]
    fn test_exhausted_chain_records_every_attempt() {
        let ctx = LoaderContext::root();
        let mut prober = DriverProber::new();
        let mut diag = Diagnostics::quiet();
        assert!(
            prober
                .try_chain(
                    &ctx,
                    &["com.mysql.jdbc.Driver", "com.mysql.cj.jdbc.Driver"],
                    &mut diag,
                )
                .is_none()
        );
        assert_eq!(
            prober.attempts(),
            ["com.mysql.jdbc.Driver", "com.mysql.cj.jdbc.Driver"]
        );
    }
}
