//! Contract state snapshots, one per contract per transaction that touched it.

use crate::error::RegistryError;
use crate::filter::Filterable;
use crate::order::{
    Attribute, Direction, OrderRegistry, OrderRegistryBuilder, OrderSpec, Orderable, SortValue,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractStateAttr {
    BlockNumber,
    TransactionIndex,
    ContractAddress,
}

impl Attribute for ContractStateAttr {
    fn name(&self) -> &'static str {
        match self {
            ContractStateAttr::BlockNumber => "block_number",
            ContractStateAttr::TransactionIndex => "transaction_index",
            ContractStateAttr::ContractAddress => "contract_address",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractState {
    pub contract_address: String,
    pub block_number: u64,
    pub transaction_index: u32,
    pub transaction_hash: String,
    pub state: Value,
}

impl Orderable for ContractState {
    type Attribute = ContractStateAttr;

    fn sort_value(&self, attribute: ContractStateAttr) -> SortValue {
        match attribute {
            ContractStateAttr::BlockNumber => self.block_number.into(),
            ContractStateAttr::TransactionIndex => self.transaction_index.into(),
            ContractStateAttr::ContractAddress => self.contract_address.as_str().into(),
        }
    }
}

impl Filterable for ContractState {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "contract_address" => Some(self.contract_address.clone()),
            "transaction_hash" => Some(self.transaction_hash.clone()),
            "block_number" => Some(self.block_number.to_string()),
            _ => None,
        }
    }
}

impl ContractState {
    pub const FILTER_PARAMS: &'static [&'static str] =
        &["contract_address", "transaction_hash", "block_number"];

    pub fn order_registry() -> Result<OrderRegistry<Self>, RegistryError> {
        use ContractStateAttr::*;

        OrderRegistryBuilder::new(vec![BlockNumber, TransactionIndex, ContractAddress])?
            .register(
                "newest_first",
                OrderSpec::new([
                    (BlockNumber, Direction::Desc),
                    (TransactionIndex, Direction::Desc),
                    (ContractAddress, Direction::Desc),
                ]),
            )?
            .register(
                "oldest_first",
                OrderSpec::new([
                    (BlockNumber, Direction::Asc),
                    (TransactionIndex, Direction::Asc),
                    (ContractAddress, Direction::Asc),
                ]),
            )?
            .build()
    }
}
