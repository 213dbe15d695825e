//! One monitoring pass over everything the watcher tracks.

use std::str::FromStr;

use anyhow::{bail, Context};
use bitcoin::{Address, Network};
use satsentry_db::tracker::{PathStateDb, WatchedAddressDb};
use satsentry_gap_limit::{
    ActivityChecker, GapLimitMaintainer, MaintainerConfig, NewActivity, PathConfig, TrackerError,
};
use satsentry_primitives::{PathId, TransactionSummary, WatchedAddress};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Totals of a single pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PassReport {
    pub new_transactions: usize,
    pub generated: u32,
    pub failures: usize,
}

#[derive(Debug)]
pub(crate) struct Monitor<A, D> {
    checker: A,
    maintainer: GapLimitMaintainer<A, D>,
}

impl<A, D> Monitor<A, D>
where
    A: ActivityChecker + Clone,
    D: PathStateDb + WatchedAddressDb + Clone + Send + Sync,
{
    pub(crate) fn new(checker: A, db: D, config: MaintainerConfig) -> Self {
        Self {
            maintainer: GapLimitMaintainer::new(checker.clone(), db, config),
            checker,
        }
    }

    #[cfg(test)]
    pub(crate) fn maintainer(&self) -> &GapLimitMaintainer<A, D> {
        &self.maintainer
    }

    /// Adds a mainnet address to the watch list. Returns `false` if it was already watched.
    pub(crate) async fn register_address(
        &self,
        address: &str,
        label: &str,
    ) -> anyhow::Result<bool> {
        let address = address.trim();
        Address::from_str(address)
            .with_context(|| format!("invalid address {address}"))?
            .require_network(Network::Bitcoin)
            .with_context(|| format!("{address} is not a mainnet address"))?;

        let db = self.maintainer.db();
        if db.get_watched_address(address).await?.is_some() {
            debug!(%address, "address already watched");
            return Ok(false);
        }

        db.set_watched_address(&WatchedAddress::new(address, label))
            .await?;
        info!(%address, %label, "watching address");

        Ok(true)
    }

    /// Starts tracking a path below `key`. Returns `None` if the path was already tracked.
    pub(crate) async fn register_extended_key(
        &self,
        key: &str,
        derivation_path: Option<&str>,
        config: PathConfig,
    ) -> anyhow::Result<Option<PathId>> {
        match self
            .maintainer
            .create_path(key, derivation_path, config)
            .await
        {
            Ok((id, outcome)) => {
                report_path_activity(&outcome.new_activity);
                Ok(Some(id))
            }
            Err(TrackerError::PathExists(id)) => {
                debug!(%id, "path already tracked");
                Ok(None)
            }
            Err(e) => Err(e).context("could not register extended key"),
        }
    }

    /// Checks every watched address, then refreshes every tracked path.
    ///
    /// Failures are logged and counted; one bad address or path does not end the pass.
    pub(crate) async fn check_all(&self) -> anyhow::Result<PassReport> {
        let mut report = PassReport::default();

        let watched = self.maintainer.db().list_watched_addresses().await?;
        for mut entry in watched {
            match self.latest_activity(&entry.address).await {
                Ok(Some(tx)) => {
                    let previous = entry.last_transaction.clone();
                    if entry.observe(tx.clone()) {
                        report.new_transactions += 1;
                        info!(
                            address = %entry.address,
                            label = %entry.label,
                            txid = %tx.txid,
                            direction = %tx.direction,
                            timestamp = %tx.timestamp,
                            "new transaction"
                        );
                    }
                    // a confirmation changes the timestamp of a known txid
                    if entry.last_transaction != previous {
                        self.maintainer.db().set_watched_address(&entry).await?;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    report.failures += 1;
                    warn!(address = %entry.address, %e, "activity check failed");
                }
            }
        }

        for id in self.maintainer.list_paths().await? {
            match self.maintainer.refresh_path(&id).await {
                Ok(outcome) => {
                    report.new_transactions += outcome.new_activity.len();
                    report.generated += outcome.generated;
                    report_path_activity(&outcome.new_activity);
                }
                Err(e) => {
                    report.failures += 1;
                    error!(%id, %e, "path refresh failed");
                }
            }
        }

        info!(
            new_transactions = report.new_transactions,
            generated = report.generated,
            failures = report.failures,
            "monitoring pass complete"
        );

        Ok(report)
    }

    async fn latest_activity(&self, address: &str) -> anyhow::Result<Option<TransactionSummary>> {
        let limit = self.maintainer.config().activity_timeout();
        match timeout(limit, self.checker.check_activity(address)).await {
            Ok(result) => Ok(result?),
            Err(_) => bail!("activity check timed out after {limit:?}"),
        }
    }
}

fn report_path_activity(activity: &[NewActivity]) {
    for seen in activity {
        info!(
            path = %seen.path,
            index = seen.index,
            address = %seen.address,
            txid = %seen.transaction.txid,
            direction = %seen.transaction.direction,
            timestamp = %seen.transaction.timestamp,
            "new transaction"
        );
    }
}
