//! The gap-limit maintenance algorithm.

use satsentry_db::tracker::PathStateDb;
use satsentry_key_deriv::{addresses_for_range, parse, ExtendedPublicKey};
use satsentry_primitives::{DerivationPathState, PathId, TransactionSummary};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::{
    activity::ActivityChecker,
    config::{MaintainerConfig, PathConfig},
    errors::TrackerError,
    locks::PathLocks,
};

/// A transaction observed on a tracked address that differs from the one previously recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivity {
    /// The path the address belongs to.
    pub path: PathId,

    /// Leaf index of the address.
    pub index: u32,

    /// The address itself.
    pub address: String,

    /// The newest transaction.
    pub transaction: TransactionSummary,
}

/// What a maintenance pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// Transactions seen for the first time.
    pub new_activity: Vec<NewActivity>,

    /// Number of addresses derived to restore the gap limit.
    pub generated: u32,
}

/// Keeps every tracked path's trailing run of unused addresses at least `gap_limit` long.
///
/// All operations on a path run under that path's lock and persist the state after each mutation,
/// so a stored snapshot always has `current_index` consistent with its records.
#[derive(Debug)]
pub struct GapLimitMaintainer<A, D> {
    checker: A,
    db: D,
    locks: PathLocks,
    config: MaintainerConfig,
}

impl<A, D> GapLimitMaintainer<A, D>
where
    A: ActivityChecker,
    D: PathStateDb + Send + Sync,
{
    /// Creates a maintainer over the given activity capability and store.
    pub fn new(checker: A, db: D, config: MaintainerConfig) -> Self {
        Self {
            checker,
            db,
            locks: PathLocks::default(),
            config,
        }
    }

    /// Returns the underlying store.
    pub fn db(&self) -> &D {
        &self.db
    }

    /// Returns the maintainer configuration.
    pub fn config(&self) -> &MaintainerConfig {
        &self.config
    }

    /// Starts tracking a new path below `raw_key`.
    ///
    /// Derives `initial_address_count` receive addresses from `start_index`, persists them, checks
    /// each one for activity and then tops the path up to its gap limit. Without a label, the
    /// family's default account path is used.
    pub async fn create_path(
        &self,
        raw_key: &str,
        label: Option<&str>,
        config: PathConfig,
    ) -> Result<(PathId, RefreshOutcome), TrackerError> {
        config.validate()?;
        let key = parse(raw_key)?;

        let label = match label {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => key.family.default_account_path(),
        };
        let id = PathId::new(raw_key.trim(), label);

        let _guard = self.locks.acquire(&id).await;
        if self.db.get_path_state(&id).await?.is_some() {
            return Err(TrackerError::PathExists(id));
        }

        let derived = addresses_for_range(
            &key,
            false,
            config.start_index(),
            config.initial_address_count(),
        )?;
        let mut state =
            DerivationPathState::new(config.start_index(), config.gap_limit(), derived)?;
        self.db.set_path_state(&id, &state).await?;

        info!(
            %id,
            family = %key.family,
            addresses = state.len(),
            gap_limit = state.gap_limit(),
            "created derivation path"
        );

        let mut outcome = RefreshOutcome::default();
        let indices: Vec<u32> = state.addresses().keys().copied().collect();
        if self
            .scan(&id, &mut state, &indices, &mut outcome.new_activity)
            .await?
        {
            self.db.set_path_state(&id, &state).await?;
        }
        outcome.generated = self
            .top_up(&id, &key, &mut state, &mut outcome.new_activity)
            .await?;

        Ok((id, outcome))
    }

    /// Derives addresses until the path satisfies its gap limit again.
    ///
    /// Returns the number of addresses derived. Running it again without new activity in between
    /// derives nothing and writes nothing.
    pub async fn ensure_gap_limit(&self, id: &PathId) -> Result<u32, TrackerError> {
        let _guard = self.locks.acquire(id).await;
        let (key, mut state) = self.load(id).await?;

        let mut found = Vec::new();
        let generated = self.top_up(id, &key, &mut state, &mut found).await?;

        Ok(generated)
    }

    /// The monitoring pass for one path: checks every address, records activity and tops up.
    pub async fn refresh_path(&self, id: &PathId) -> Result<RefreshOutcome, TrackerError> {
        let _guard = self.locks.acquire(id).await;
        let (key, mut state) = self.load(id).await?;

        let mut outcome = RefreshOutcome::default();
        let indices: Vec<u32> = state.addresses().keys().copied().collect();
        if self
            .scan(id, &mut state, &indices, &mut outcome.new_activity)
            .await?
        {
            self.db.set_path_state(id, &state).await?;
        }
        outcome.generated = self
            .top_up(id, &key, &mut state, &mut outcome.new_activity)
            .await?;

        debug!(
            %id,
            new = outcome.new_activity.len(),
            generated = outcome.generated,
            "refreshed derivation path"
        );

        Ok(outcome)
    }

    /// Changes the gap limit of a path without deriving anything.
    ///
    /// Returns whether the limit changed. Call [`Self::ensure_gap_limit`] to derive the addresses a
    /// larger limit calls for.
    pub async fn update_gap_limit(
        &self,
        id: &PathId,
        gap_limit: u32,
    ) -> Result<bool, TrackerError> {
        let _guard = self.locks.acquire(id).await;
        let mut state = self.load_state(id).await?;

        let changed = state.set_gap_limit(gap_limit)?;
        if changed {
            self.db.set_path_state(id, &state).await?;
            info!(%id, gap_limit, "updated gap limit");
        }

        Ok(changed)
    }

    /// Records externally observed activity on the address at `index`, then tops the path up.
    ///
    /// Returns the number of addresses derived.
    pub async fn record_activity(
        &self,
        id: &PathId,
        index: u32,
        transaction: TransactionSummary,
    ) -> Result<u32, TrackerError> {
        let _guard = self.locks.acquire(id).await;
        let (key, mut state) = self.load(id).await?;

        if state.mark_used(index, transaction)? {
            self.db.set_path_state(id, &state).await?;
        }

        let mut found = Vec::new();
        self.top_up(id, &key, &mut state, &mut found).await
    }

    /// Explicit correction: marks the address at `index` unused again.
    ///
    /// This can only lengthen the trailing unused run, so nothing is derived.
    pub async fn mark_unused(&self, id: &PathId, index: u32) -> Result<bool, TrackerError> {
        let _guard = self.locks.acquire(id).await;
        let mut state = self.load_state(id).await?;

        let changed = state.mark_unused(index)?;
        if changed {
            self.db.set_path_state(id, &state).await?;
            info!(%id, index, "marked address unused");
        }

        Ok(changed)
    }

    /// Stops tracking a path. Returns whether it existed.
    pub async fn delete_path(&self, id: &PathId) -> Result<bool, TrackerError> {
        let guard = self.locks.acquire(id).await;
        let existed = self.db.delete_path_state(id).await?;
        drop(guard);
        self.locks.forget(id);

        if existed {
            info!(%id, "deleted derivation path");
        }

        Ok(existed)
    }

    /// Returns the current state of a path.
    pub async fn path_state(
        &self,
        id: &PathId,
    ) -> Result<Option<DerivationPathState>, TrackerError> {
        Ok(self.db.get_path_state(id).await?)
    }

    /// Returns every tracked path.
    pub async fn list_paths(&self) -> Result<Vec<PathId>, TrackerError> {
        Ok(self.db.list_path_ids().await?)
    }

    async fn load_state(&self, id: &PathId) -> Result<DerivationPathState, TrackerError> {
        self.db
            .get_path_state(id)
            .await?
            .ok_or_else(|| TrackerError::PathNotFound(id.clone()))
    }

    async fn load(
        &self,
        id: &PathId,
    ) -> Result<(ExtendedPublicKey, DerivationPathState), TrackerError> {
        let state = self.load_state(id).await?;
        let key = parse(&id.extended_key)?;
        Ok((key, state))
    }

    /// The gap-limit loop. Caller holds the path lock.
    ///
    /// Each round derives exactly the missing number of addresses after `current_index`, persists
    /// them, and checks them for activity. Activity on a fresh address can shorten the trailing
    /// unused run again, so the loop repeats; it stops at the first round that finds no activity.
    /// Every round strictly advances `current_index`.
    async fn top_up(
        &self,
        id: &PathId,
        key: &ExtendedPublicKey,
        state: &mut DerivationPathState,
        found: &mut Vec<NewActivity>,
    ) -> Result<u32, TrackerError> {
        let mut generated = 0;

        loop {
            let needed = state.addresses_needed();
            if needed == 0 {
                break;
            }

            let derived = addresses_for_range(key, false, state.next_index(), needed)?;
            let indices: Vec<u32> = derived.iter().map(|(index, _)| *index).collect();
            state.extend(derived)?;
            self.db.set_path_state(id, state).await?;
            generated += needed;

            info!(
                %id,
                generated = needed,
                current_index = state.current_index(),
                "extended derivation path"
            );

            if !self.scan(id, state, &indices, found).await? {
                break;
            }
            self.db.set_path_state(id, state).await?;
        }

        Ok(generated)
    }

    /// Checks the addresses at `indices` and records any activity in `state`.
    ///
    /// Returns whether `state` changed. Lookup failures and timeouts count as "not used".
    async fn scan(
        &self,
        id: &PathId,
        state: &mut DerivationPathState,
        indices: &[u32],
        found: &mut Vec<NewActivity>,
    ) -> Result<bool, TrackerError> {
        let mut changed = false;

        for &index in indices {
            let Some(record) = state.get(index) else {
                continue;
            };
            let address = record.address.clone();
            let previous = record.last_transaction.clone();

            let Some(transaction) = self.check(&address).await else {
                continue;
            };

            if transaction.is_new_relative_to(previous.as_ref()) {
                info!(
                    %id,
                    %address,
                    index,
                    txid = %transaction.txid,
                    direction = %transaction.direction,
                    "new transaction on derived address"
                );
                found.push(NewActivity {
                    path: id.clone(),
                    index,
                    address,
                    transaction: transaction.clone(),
                });
            }

            changed |= state.mark_used(index, transaction)?;
        }

        Ok(changed)
    }

    async fn check(&self, address: &str) -> Option<TransactionSummary> {
        let limit = self.config.activity_timeout();

        match timeout(limit, self.checker.check_activity(address)).await {
            Ok(Ok(activity)) => activity,
            Ok(Err(e)) => {
                warn!(%address, %e, "activity check failed, treating address as unused");
                None
            }
            Err(_) => {
                warn!(%address, ?limit, "activity check timed out, treating address as unused");
                None
            }
        }
    }
}
