//! Sequential per-account pipeline.
//!
//! Each account runs inside its own `wallet` span; a failure ends that
//! account only and the batch moves on after the usual post-wallet delay.

use crate::chain::{ChainConnector, ChainError};
use crate::exchange::{
    ExchangeWithdrawalManager, OkxNetwork, WithdrawalError, WithdrawalOrder, WithdrawalOutcome,
};
use crate::task::{ActionError, ChainActionRunner};
use crate::utils::gas::GasGate;
use core_logic::{random_amount, Account, AmountRange, DelayRange, Delayer};
use ethers::types::{Address, U256};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, info_span, warn, Instrument};

/// Enable flags for the pipeline steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Features {
    pub cex_withdrawal: bool,
    pub swell_deposit: bool,
    pub approve: bool,
    pub eigen_deposit: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            cex_withdrawal: false,
            swell_deposit: true,
            approve: true,
            eigen_deposit: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchSettings {
    pub features: Features,
    pub after_action: DelayRange,
    pub after_wallet: DelayRange,
    /// ETH left on the wallet by the Swell deposit.
    pub remain_wei: U256,
    pub withdraw_amount: AmountRange,
    pub currency: String,
    pub network: OkxNetwork,
    pub shuffle: bool,
}

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Could not open signer: {0}")]
    Connect(#[source] ChainError),

    #[error(transparent)]
    Withdrawal(WithdrawalError),

    #[error("Swell deposit failed: {0}")]
    Deposit(#[source] ActionError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AccountStatus {
    Completed,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountReport {
    /// 1-based position in processing order.
    pub position: usize,
    pub destination: String,
    pub address: Option<Address>,
    pub withdrawal: Option<WithdrawalOutcome>,
    pub status: AccountStatus,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub accounts: Vec<AccountReport>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.accounts
            .iter()
            .filter(|a| a.status == AccountStatus::Completed)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.accounts.len() - self.succeeded()
    }
}

/// What one account produced before it finished or failed.
#[derive(Default)]
struct AccountProgress {
    address: Option<Address>,
    withdrawal: Option<WithdrawalOutcome>,
}

pub struct BatchOrchestrator {
    settings: BatchSettings,
    connector: Arc<dyn ChainConnector>,
    withdrawals: Option<ExchangeWithdrawalManager>,
    gas_gate: GasGate,
    actions: ChainActionRunner,
    delayer: Arc<dyn Delayer>,
}

impl BatchOrchestrator {
    pub fn new(
        settings: BatchSettings,
        connector: Arc<dyn ChainConnector>,
        gas_gate: GasGate,
        actions: ChainActionRunner,
        delayer: Arc<dyn Delayer>,
    ) -> Self {
        Self {
            settings,
            connector,
            withdrawals: None,
            gas_gate,
            actions,
            delayer,
        }
    }

    pub fn with_withdrawals(mut self, manager: ExchangeWithdrawalManager) -> Self {
        self.withdrawals = Some(manager);
        self
    }

    pub fn settings(&self) -> &BatchSettings {
        &self.settings
    }

    /// Shuffles once when enabled; otherwise keeps file order.
    pub fn order_accounts<R: Rng + ?Sized>(
        &self,
        mut accounts: Vec<Account>,
        rng: &mut R,
    ) -> Vec<Account> {
        if self.settings.shuffle {
            accounts.shuffle(rng);
        }
        accounts
    }

    pub async fn run(&self, accounts: Vec<Account>) -> BatchReport {
        let accounts = self.order_accounts(accounts, &mut rand::thread_rng());
        let total = accounts.len();
        let started = std::time::Instant::now();
        let mut report = BatchReport::default();

        info!("Processing {} wallets (shuffle: {})", total, self.settings.shuffle);

        for (i, account) in accounts.iter().enumerate() {
            let span = info_span!("wallet", wallet_id = %format!("{:03}", i + 1));
            let account_report = self
                .run_account(account, i + 1, total)
                .instrument(span)
                .await;
            report.accounts.push(account_report);

            let pause = self.settings.after_wallet;
            info!("Next wallet in {}-{}s", pause.min, pause.max);
            self.delayer.wait(pause.min, pause.max).await;
        }

        info!(
            "Batch finished in {:.1}s | Completed: {} | Failed: {}",
            started.elapsed().as_secs_f64(),
            report.succeeded(),
            report.failed()
        );
        report
    }

    async fn run_account(
        &self,
        account: &Account,
        position: usize,
        total: usize,
    ) -> AccountReport {
        let mut progress = AccountProgress::default();
        let result = self
            .process_account(account, position, total, &mut progress)
            .await;
        let status = match result {
            Ok(()) => AccountStatus::Completed,
            Err(e) => {
                error!("Wallet {}/{} FAILED: {}", position, total, e);
                AccountStatus::Failed(e.to_string())
            }
        };

        AccountReport {
            position,
            destination: account.destination.clone(),
            address: progress.address,
            withdrawal: progress.withdrawal,
            status,
        }
    }

    async fn process_account(
        &self,
        account: &Account,
        position: usize,
        total: usize,
        progress: &mut AccountProgress,
    ) -> Result<(), AccountError> {
        let features = self.settings.features;
        info!("Starting process wallet {}/{}", position, total);

        let chain = self
            .connector
            .connect(&account.private_key)
            .await
            .map_err(AccountError::Connect)?;
        let address = chain.address();
        progress.address = Some(address);
        info!("Wallet address {:?}", address);

        if features.cex_withdrawal {
            progress.withdrawal = self.withdraw_from_exchange(account).await?;
        }

        if features.swell_deposit {
            self.gas_gate.await_acceptable_gas(chain.as_ref()).await;
            self.actions
                .deposit_remainder(chain.as_ref(), self.settings.remain_wei)
                .await
                .map_err(AccountError::Deposit)?;
            self.after_action().await;
        }

        if features.approve {
            self.gas_gate.await_acceptable_gas(chain.as_ref()).await;
            if let Err(e) = self.actions.approve_allowance_if_needed(chain.as_ref()).await {
                error!("Approve FAILED: {}", e);
            }
            self.after_action().await;
        }

        if features.eigen_deposit {
            self.gas_gate.await_acceptable_gas(chain.as_ref()).await;
            self.actions.deposit_into_strategy(chain.as_ref()).await;
            self.after_action().await;
        }

        info!("----{:?} processed----", address);
        Ok(())
    }

    async fn withdraw_from_exchange(
        &self,
        account: &Account,
    ) -> Result<Option<WithdrawalOutcome>, AccountError> {
        let Some(manager) = &self.withdrawals else {
            warn!("CEX withdrawal is enabled but no OKX credentials are configured, skipping");
            return Ok(None);
        };

        let range = self.settings.withdraw_amount;
        let order = WithdrawalOrder {
            currency: self.settings.currency.clone(),
            amount: random_amount(range.min, range.max),
            address: account.destination.clone(),
            network: self.settings.network,
        };
        info!(
            "Withdrawing {} {} via {} to {}",
            order.amount, order.currency, order.network, order.address
        );

        match manager.withdraw(&order).await {
            Ok(outcome) => {
                if let WithdrawalOutcome::Suspended { attempts } = &outcome {
                    warn!(
                        "OKX withdrawal skipped after {} attempt(s), {} network suspended",
                        attempts, order.network
                    );
                }
                Ok(Some(outcome))
            }
            Err(e @ WithdrawalError::AttemptsExhausted { .. }) => {
                error!("{}, continuing with on-chain steps", e);
                Ok(None)
            }
            Err(e) => Err(AccountError::Withdrawal(e)),
        }
    }

    async fn after_action(&self) {
        let pause = self.settings.after_action;
        info!("Waiting {}-{}s before the next action", pause.min, pause.max);
        self.delayer.wait(pause.min, pause.max).await;
    }
}
