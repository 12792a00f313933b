use super::{ExchangeClient, ExchangeError, OkxNetwork, WithdrawalRequest};
use core_logic::{DelayRange, Delayer};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Wait after a recoverable exchange error before sweeping again.
pub const RETRY_BACKOFF: DelayRange = DelayRange::new(600, 1200);
/// Wait after the network reports withdrawals as suspended.
pub const SUSPENDED_BACKOFF: DelayRange = DelayRange::new(3600, 3600);
/// Closes every attempt, successful or not.
pub const THROTTLE: DelayRange = DelayRange::new(400, 600);

#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawalOrder {
    pub currency: String,
    /// Already rounded to 4 decimals by the caller.
    pub amount: f64,
    pub address: String,
    pub network: OkxNetwork,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WithdrawalOutcome {
    Completed { withdrawal_id: String, attempts: u32 },
    /// The network stayed closed; the account moves on without funds.
    Suspended { attempts: u32 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WithdrawalError {
    #[error("Withdrawal failed on attempt {attempts}: {source}")]
    Unclassified {
        attempts: u32,
        #[source]
        source: ExchangeError,
    },

    #[error("Withdrawal gave up after {attempts} attempts, last error: {last}")]
    AttemptsExhausted { attempts: u32, last: ExchangeError },
}

enum Step {
    Done(Result<WithdrawalOutcome, WithdrawalError>),
    Retry,
}

pub struct ExchangeWithdrawalManager {
    client: Arc<dyn ExchangeClient>,
    delayer: Arc<dyn Delayer>,
    max_attempts: Option<u32>,
}

impl ExchangeWithdrawalManager {
    pub fn new(client: Arc<dyn ExchangeClient>, delayer: Arc<dyn Delayer>) -> Self {
        Self {
            client,
            delayer,
            max_attempts: None,
        }
    }

    /// Caps the retry rounds; unbounded when never set.
    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts.filter(|n| *n > 0);
        self
    }

    /// Sweeps sub-accounts and withdraws `order.amount`, retrying recoverable
    /// exchange errors until the withdrawal is accepted.
    pub async fn withdraw(
        &self,
        order: &WithdrawalOrder,
    ) -> Result<WithdrawalOutcome, WithdrawalError> {
        let mut attempts = 0u32;

        loop {
            attempts += 1;

            let step = match self.sweep_and_submit(order).await {
                Ok(withdrawal_id) => {
                    info!(
                        "SUCCESS {} {} withdrawn from OKX to {} (id {})",
                        order.amount, order.currency, order.address, withdrawal_id
                    );
                    Step::Done(Ok(WithdrawalOutcome::Completed {
                        withdrawal_id,
                        attempts,
                    }))
                }
                Err(e) => self.handle_failure(order, attempts, e).await,
            };

            info!(
                "Waiting {}-{}s before the next OKX request",
                THROTTLE.min, THROTTLE.max
            );
            self.delayer.wait(THROTTLE.min, THROTTLE.max).await;

            if let Step::Done(result) = step {
                return result;
            }
        }
    }

    async fn handle_failure(
        &self,
        order: &WithdrawalOrder,
        attempts: u32,
        err: ExchangeError,
    ) -> Step {
        if let ExchangeError::WithdrawalSuspended(_) = err {
            error!(
                "Withdrawals suspended in {} network, waiting 1 hour",
                order.network
            );
            self.delayer
                .wait(SUSPENDED_BACKOFF.min, SUSPENDED_BACKOFF.max)
                .await;
            return Step::Done(Ok(WithdrawalOutcome::Suspended {
                attempts,
            }));
        }

        if !err.is_retryable() {
            error!("OKX withdrawal FAILED: {}", err);
            return Step::Done(Err(WithdrawalError::Unclassified {
                attempts,
                source: err,
            }));
        }

        match &err {
            ExchangeError::InsufficientFunds(_) => {
                error!("Insufficient Funds on OKX account: {}", err);
            }
            ExchangeError::PermissionDenied(_) => {
                error!("OKX IP IS NOT WHITELISTED: {}", err);
            }
            _ => {
                error!(
                    "Withdrawal address {} is not allowlisted on OKX: {}",
                    order.address, err
                );
            }
        }

        if self.max_attempts.is_some_and(|max| attempts >= max) {
            return Step::Done(Err(WithdrawalError::AttemptsExhausted {
                attempts,
                last: err,
            }));
        }

        info!(
            "Retrying OKX withdrawal in {}-{}s (attempt {} failed: {})",
            RETRY_BACKOFF.min, RETRY_BACKOFF.max, attempts, err
        );
        self.delayer.wait(RETRY_BACKOFF.min, RETRY_BACKOFF.max).await;
        Step::Retry
    }

    async fn sweep_and_submit(&self, order: &WithdrawalOrder) -> Result<String, ExchangeError> {
        self.sweep(&order.currency).await?;
        self.submit(order).await
    }

    /// Moves every non-zero sub-account balance of `currency` to the master account.
    async fn sweep(&self, currency: &str) -> Result<(), ExchangeError> {
        for sub_account in self.client.sub_accounts().await? {
            let balances = self
                .client
                .sub_account_balances(&sub_account, currency)
                .await?;

            for balance in balances {
                if balance.currency != currency || balance.is_empty() {
                    continue;
                }
                self.client.transfer_to_master(&balance).await?;
                info!(
                    "Transferred {} {} from sub-account {} to master",
                    balance.available, balance.currency, balance.sub_account
                );
            }
        }
        Ok(())
    }

    async fn submit(&self, order: &WithdrawalOrder) -> Result<String, ExchangeError> {
        let chain = self
            .client
            .withdrawal_chain(&order.currency, order.network)
            .await?;

        let request = WithdrawalRequest {
            currency: order.currency.clone(),
            amount: order.amount.to_string(),
            address: order.address.clone(),
            chain: chain.chain,
            fee: chain.fee,
        };
        self.client.withdraw(&request).await
    }
}
