#![allow(dead_code)]

use async_trait::async_trait;
use core_logic::Delayer;
use ethers::types::{Address, H256, U256};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use swell_restake::chain::{ChainClient, ChainConnector, ChainError};
use swell_restake::contracts::ContractAddresses;
use swell_restake::exchange::{
    ExchangeClient, ExchangeError, OkxNetwork, SubAccountBalance, WithdrawalChain,
    WithdrawalRequest,
};

pub fn gwei(n: u64) -> U256 {
    U256::from(n) * U256::exp10(9)
}

pub fn eth(n: &str) -> U256 {
    ethers::utils::parse_ether(n).unwrap()
}

pub fn addresses() -> ContractAddresses {
    ContractAddresses {
        swell_deposit: Address::from_low_u64_be(0x51),
        sweth_token: Address::from_low_u64_be(0x51),
        strategy_manager: Address::from_low_u64_be(0x5a),
        sweth_strategy: Address::from_low_u64_be(0x5b),
    }
}

// --- Delayer ---

/// Records requested bounds instead of sleeping.
#[derive(Default)]
pub struct RecordingDelayer {
    calls: Mutex<Vec<(u64, u64)>>,
}

impl RecordingDelayer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<(u64, u64)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, min: u64, max: u64) -> usize {
        self.calls()
            .iter()
            .filter(|call| **call == (min, max))
            .count()
    }
}

#[async_trait]
impl Delayer for RecordingDelayer {
    async fn wait(&self, min_secs: u64, max_secs: u64) {
        self.calls.lock().unwrap().push((min_secs, max_secs));
    }
}

// --- Chain ---

#[derive(Debug, Clone, PartialEq)]
pub struct DepositCall {
    pub value: U256,
    pub gas_limit: U256,
    pub gas_price: U256,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyCall {
    pub strategy: Address,
    pub token: Address,
    pub amount: U256,
    pub gas_price: U256,
}

pub struct ChainState {
    pub balance: U256,
    pub gas_price: U256,
    /// Consumed before falling back to `gas_price`.
    pub gas_quotes: VecDeque<Result<U256, ChainError>>,
    pub trial_gas: U256,
    pub token_balance: U256,
    pub allowance: U256,
    pub fail_deposit: Option<ChainError>,
    pub fail_approve: Option<ChainError>,
    pub fail_strategy: Option<ChainError>,
    pub deposits: Vec<DepositCall>,
    pub approvals: Vec<(Address, U256)>,
    pub strategy_deposits: Vec<StrategyCall>,
}

pub struct MockChain {
    address: Address,
    pub state: Mutex<ChainState>,
    tx_counter: AtomicUsize,
}

impl MockChain {
    pub fn new(address: u64) -> Self {
        Self {
            address: Address::from_low_u64_be(address),
            state: Mutex::new(ChainState {
                balance: eth("1"),
                gas_price: gwei(10),
                gas_quotes: VecDeque::new(),
                trial_gas: U256::from(21_000u64),
                token_balance: U256::zero(),
                allowance: U256::zero(),
                fail_deposit: None,
                fail_approve: None,
                fail_strategy: None,
                deposits: Vec::new(),
                approvals: Vec::new(),
                strategy_deposits: Vec::new(),
            }),
            tx_counter: AtomicUsize::new(0),
        }
    }

    pub fn with_state(self, f: impl FnOnce(&mut ChainState)) -> Self {
        f(&mut *self.state.lock().unwrap());
        self
    }

    pub fn deposits(&self) -> Vec<DepositCall> {
        self.state.lock().unwrap().deposits.clone()
    }

    pub fn approvals(&self) -> Vec<(Address, U256)> {
        self.state.lock().unwrap().approvals.clone()
    }

    pub fn strategy_deposits(&self) -> Vec<StrategyCall> {
        self.state.lock().unwrap().strategy_deposits.clone()
    }

    pub fn writes(&self) -> usize {
        self.tx_counter.load(Ordering::SeqCst)
    }

    fn next_hash(&self) -> H256 {
        let n = self.tx_counter.fetch_add(1, Ordering::SeqCst) + 1;
        H256::from_low_u64_be(n as u64)
    }
}

#[async_trait]
impl ChainClient for MockChain {
    fn address(&self) -> Address {
        self.address
    }

    async fn gas_price(&self) -> Result<U256, ChainError> {
        let mut state = self.state.lock().unwrap();
        match state.gas_quotes.pop_front() {
            Some(quote) => quote,
            None => Ok(state.gas_price),
        }
    }

    async fn balance(&self) -> Result<U256, ChainError> {
        Ok(self.state.lock().unwrap().balance)
    }

    async fn estimate_deposit(&self, _value: U256) -> Result<U256, ChainError> {
        Ok(self.state.lock().unwrap().trial_gas)
    }

    async fn deposit(
        &self,
        value: U256,
        gas_limit: U256,
        gas_price: U256,
    ) -> Result<H256, ChainError> {
        {
            let mut state = self.state.lock().unwrap();
            if let Some(err) = state.fail_deposit.clone() {
                return Err(err);
            }
            state.balance = state.balance - value - gas_limit * gas_price;
            state.token_balance += value;
            state.deposits.push(DepositCall {
                value,
                gas_limit,
                gas_price,
            });
        }
        Ok(self.next_hash())
    }

    async fn token_balance(&self) -> Result<U256, ChainError> {
        Ok(self.state.lock().unwrap().token_balance)
    }

    async fn allowance(&self, _spender: Address) -> Result<U256, ChainError> {
        Ok(self.state.lock().unwrap().allowance)
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<H256, ChainError> {
        {
            let mut state = self.state.lock().unwrap();
            if let Some(err) = state.fail_approve.clone() {
                return Err(err);
            }
            state.allowance = amount;
            state.approvals.push((spender, amount));
        }
        Ok(self.next_hash())
    }

    async fn deposit_into_strategy(
        &self,
        strategy: Address,
        token: Address,
        amount: U256,
        gas_price: U256,
    ) -> Result<H256, ChainError> {
        {
            let mut state = self.state.lock().unwrap();
            if let Some(err) = state.fail_strategy.clone() {
                return Err(err);
            }
            state.token_balance -= amount;
            state.strategy_deposits.push(StrategyCall {
                strategy,
                token,
                amount,
                gas_price,
            });
        }
        Ok(self.next_hash())
    }
}

/// Hands out pre-built chains keyed by private key.
#[derive(Default)]
pub struct MockConnector {
    chains: HashMap<String, Arc<MockChain>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chain(mut self, private_key: &str, chain: Arc<MockChain>) -> Self {
        self.chains.insert(private_key.to_string(), chain);
        self
    }
}

#[async_trait]
impl ChainConnector for MockConnector {
    async fn connect(&self, private_key: &str) -> Result<Arc<dyn ChainClient>, ChainError> {
        match self.chains.get(private_key) {
            Some(chain) => Ok(chain.clone() as Arc<dyn ChainClient>),
            None => Err(ChainError::InvalidKey(format!("unknown key {}", private_key))),
        }
    }
}

// --- Exchange ---

#[derive(Default)]
pub struct MockExchange {
    pub sub_accounts: Vec<String>,
    pub balances: HashMap<String, Vec<SubAccountBalance>>,
    /// Replies for successive withdrawals, then `fallback`.
    pub script: Mutex<VecDeque<Result<String, ExchangeError>>>,
    pub fallback: Option<ExchangeError>,
    /// Withdrawals to this address always fail with the given error.
    pub reject_address: Option<(String, ExchangeError)>,
    pub transfers: Mutex<Vec<SubAccountBalance>>,
    pub requests: Mutex<Vec<WithdrawalRequest>>,
}

impl MockExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(self, replies: Vec<Result<String, ExchangeError>>) -> Self {
        *self.script.lock().unwrap() = replies.into();
        self
    }

    pub fn with_fallback(mut self, err: ExchangeError) -> Self {
        self.fallback = Some(err);
        self
    }

    pub fn rejecting(mut self, address: &str, err: ExchangeError) -> Self {
        self.reject_address = Some((address.to_string(), err));
        self
    }

    pub fn with_balance(mut self, sub_account: &str, currency: &str, available: &str) -> Self {
        if !self.sub_accounts.iter().any(|s| s == sub_account) {
            self.sub_accounts.push(sub_account.to_string());
        }
        self.balances
            .entry(sub_account.to_string())
            .or_default()
            .push(SubAccountBalance {
                sub_account: sub_account.to_string(),
                currency: currency.to_string(),
                available: available.to_string(),
            });
        self
    }

    pub fn withdraw_calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<WithdrawalRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn transfers(&self) -> Vec<SubAccountBalance> {
        self.transfers.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExchangeClient for MockExchange {
    async fn sub_accounts(&self) -> Result<Vec<String>, ExchangeError> {
        Ok(self.sub_accounts.clone())
    }

    async fn sub_account_balances(
        &self,
        sub_account: &str,
        _currency: &str,
    ) -> Result<Vec<SubAccountBalance>, ExchangeError> {
        Ok(self.balances.get(sub_account).cloned().unwrap_or_default())
    }

    async fn transfer_to_master(&self, balance: &SubAccountBalance) -> Result<(), ExchangeError> {
        self.transfers.lock().unwrap().push(balance.clone());
        Ok(())
    }

    async fn withdrawal_chain(
        &self,
        currency: &str,
        network: OkxNetwork,
    ) -> Result<WithdrawalChain, ExchangeError> {
        Ok(WithdrawalChain {
            chain: network.chain_id(currency),
            fee: "0.0001".to_string(),
        })
    }

    async fn withdraw(&self, request: &WithdrawalRequest) -> Result<String, ExchangeError> {
        let n = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };

        if let Some((address, err)) = &self.reject_address {
            if *address == request.address {
                return Err(err.clone());
            }
        }
        if let Some(reply) = self.script.lock().unwrap().pop_front() {
            return reply;
        }
        match &self.fallback {
            Some(err) => Err(err.clone()),
            None => Ok(format!("wd-{}", n)),
        }
    }
}
