use super::{ChainClient, ChainConnector, ChainError};
use crate::contracts::{ContractAbis, ContractAddresses};
use async_trait::async_trait;
use ethers::prelude::*;
use ethers::types::transaction::eip2718::TypedTransaction;
use std::sync::Arc;
use tracing::debug;

type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Opens one signing client per account against a shared HTTP provider.
#[derive(Clone)]
pub struct EthersConnector {
    provider: Provider<Http>,
    chain_id: u64,
    addresses: ContractAddresses,
    abis: Arc<ContractAbis>,
}

impl EthersConnector {
    pub fn new(rpc_url: &str, chain_id: u64, addresses: ContractAddresses) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().build()?;
        let provider = Provider::new(Http::new_with_client(
            reqwest::Url::parse(rpc_url)?,
            client,
        ));

        Ok(Self {
            provider,
            chain_id,
            addresses,
            abis: Arc::new(ContractAbis::load()?),
        })
    }
}

#[async_trait]
impl ChainConnector for EthersConnector {
    async fn connect(&self, private_key: &str) -> Result<Arc<dyn ChainClient>, ChainError> {
        let wallet = private_key
            .trim()
            .parse::<LocalWallet>()
            .map_err(|e| ChainError::InvalidKey(e.to_string()))?
            .with_chain_id(self.chain_id);

        let client = Arc::new(SignerMiddleware::new(self.provider.clone(), wallet));
        Ok(Arc::new(EthersChainClient::new(
            client,
            self.addresses,
            &self.abis,
        )))
    }
}

pub struct EthersChainClient {
    client: Arc<SignerClient>,
    swell: Contract<SignerClient>,
    token: Contract<SignerClient>,
    strategy_manager: Contract<SignerClient>,
}

impl EthersChainClient {
    fn new(client: Arc<SignerClient>, addresses: ContractAddresses, abis: &ContractAbis) -> Self {
        Self {
            swell: Contract::new(addresses.swell_deposit, abis.swell_deposit.clone(), client.clone()),
            token: Contract::new(addresses.sweth_token, abis.erc20.clone(), client.clone()),
            strategy_manager: Contract::new(
                addresses.strategy_manager,
                abis.strategy_manager.clone(),
                client.clone(),
            ),
            client,
        }
    }

    fn deposit_request(&self, value: U256) -> Result<TransactionRequest, ChainError> {
        let data = self
            .swell
            .encode("deposit", ())
            .map_err(|e| ChainError::Call(e.to_string()))?;

        Ok(TransactionRequest::new()
            .from(self.address())
            .to(self.swell.address())
            .data(data)
            .value(value))
    }

    /// Sends `tx` and waits for a successful receipt.
    async fn send_and_confirm(&self, tx: TransactionRequest) -> Result<H256, ChainError> {
        let pending = self
            .client
            .send_transaction(tx, None)
            .await
            .map_err(ChainError::from_send)?;
        let tx_hash = pending.tx_hash();
        debug!("Submitted {:?}, waiting for receipt", tx_hash);

        let receipt = pending
            .await
            .map_err(|e| ChainError::Call(format!("waiting for {:?}: {}", tx_hash, e)))?
            .ok_or_else(|| {
                ChainError::Call(format!("transaction {:?} dropped from mempool", tx_hash))
            })?;

        if receipt.status != Some(U64::from(1)) {
            return Err(ChainError::Call(format!(
                "transaction {:?} reverted",
                receipt.transaction_hash
            )));
        }

        Ok(receipt.transaction_hash)
    }
}

#[async_trait]
impl ChainClient for EthersChainClient {
    fn address(&self) -> Address {
        self.client.address()
    }

    async fn gas_price(&self) -> Result<U256, ChainError> {
        self.client
            .get_gas_price()
            .await
            .map_err(ChainError::from_fetch)
    }

    async fn balance(&self) -> Result<U256, ChainError> {
        self.client
            .get_balance(self.address(), None)
            .await
            .map_err(ChainError::from_fetch)
    }

    async fn estimate_deposit(&self, value: U256) -> Result<U256, ChainError> {
        let tx: TypedTransaction = self.deposit_request(value)?.into();
        self.client
            .estimate_gas(&tx, None)
            .await
            .map_err(ChainError::from_fetch)
    }

    async fn deposit(
        &self,
        value: U256,
        gas_limit: U256,
        gas_price: U256,
    ) -> Result<H256, ChainError> {
        let tx = self
            .deposit_request(value)?
            .gas(gas_limit)
            .gas_price(gas_price);
        self.send_and_confirm(tx).await
    }

    async fn token_balance(&self) -> Result<U256, ChainError> {
        self.token
            .method::<_, U256>("balanceOf", self.address())
            .map_err(|e| ChainError::Call(e.to_string()))?
            .call()
            .await
            .map_err(ChainError::from_fetch)
    }

    async fn allowance(&self, spender: Address) -> Result<U256, ChainError> {
        self.token
            .method::<_, U256>("allowance", (self.address(), spender))
            .map_err(|e| ChainError::Call(e.to_string()))?
            .call()
            .await
            .map_err(ChainError::from_fetch)
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<H256, ChainError> {
        let data = self
            .token
            .encode("approve", (spender, amount))
            .map_err(|e| ChainError::Call(e.to_string()))?;

        let tx = TransactionRequest::new()
            .from(self.address())
            .to(self.token.address())
            .data(data);
        self.send_and_confirm(tx).await
    }

    async fn deposit_into_strategy(
        &self,
        strategy: Address,
        token: Address,
        amount: U256,
        gas_price: U256,
    ) -> Result<H256, ChainError> {
        let data = self
            .strategy_manager
            .encode("depositIntoStrategy", (strategy, token, amount))
            .map_err(|e| ChainError::Call(e.to_string()))?;

        let tx = TransactionRequest::new()
            .from(self.address())
            .to(self.strategy_manager.address())
            .data(data)
            .value(U256::zero())
            .gas_price(gas_price);
        self.send_and_confirm(tx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn addresses() -> ContractAddresses {
        let swell: Address = "0xf951E335afb289353dc249e82926178EaC7DEd78".parse().unwrap();
        ContractAddresses {
            swell_deposit: swell,
            sweth_token: swell,
            strategy_manager: "0x858646372CC42E1A627fcE94aa7A7033e7CF075A".parse().unwrap(),
            sweth_strategy: "0x0Fe4F44beE93503346A3Ac9EE5A26b130a5796d6".parse().unwrap(),
        }
    }

    #[tokio::test]
    async fn test_deposit_estimate_request_is_typed_payable_call() {
        let connector = EthersConnector::new("http://127.0.0.1:8545", 1, addresses()).unwrap();
        let wallet = KEY.parse::<LocalWallet>().unwrap().with_chain_id(1u64);
        let client = Arc::new(SignerMiddleware::new(connector.provider.clone(), wallet));
        let chain = EthersChainClient::new(client, addresses(), &connector.abis);

        let value = U256::exp10(17);
        let tx: TypedTransaction = chain.deposit_request(value).unwrap().into();

        assert_eq!(tx.from(), Some(&chain.address()));
        assert_eq!(tx.to_addr(), Some(&addresses().swell_deposit));
        assert_eq!(tx.value(), Some(&value));
        // deposit() selector
        assert_eq!(tx.data().unwrap().to_vec(), vec![0xd0, 0xe3, 0x0d, 0xb0]);
    }
}
