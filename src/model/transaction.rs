//! Transactions, paged by `(block_number, transaction_index)`.

use crate::error::RegistryError;
use crate::filter::Filterable;
use crate::order::{
    Attribute, Direction, OrderRegistry, OrderRegistryBuilder, OrderSpec, Orderable, SortValue,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sortable attributes of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionAttr {
    BlockNumber,
    TransactionIndex,
}

impl Attribute for TransactionAttr {
    fn name(&self) -> &'static str {
        match self {
            TransactionAttr::BlockNumber => "block_number",
            TransactionAttr::TransactionIndex => "transaction_index",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_hash: String,
    pub block_number: u64,
    pub transaction_index: u32,
    pub block_timestamp: DateTime<Utc>,
    pub from_address: String,
    pub to_address: Option<String>,
    /// Wei; can exceed 2^53
    pub value: u128,
    pub gas_used: u64,
    pub status: u8,
}

impl Orderable for Transaction {
    type Attribute = TransactionAttr;

    fn sort_value(&self, attribute: TransactionAttr) -> SortValue {
        match attribute {
            TransactionAttr::BlockNumber => self.block_number.into(),
            TransactionAttr::TransactionIndex => self.transaction_index.into(),
        }
    }
}

impl Filterable for Transaction {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "transaction_hash" => Some(self.transaction_hash.clone()),
            "block_number" => Some(self.block_number.to_string()),
            "from_address" => Some(self.from_address.clone()),
            "to_address" => self.to_address.clone(),
            "status" => Some(self.status.to_string()),
            _ => None,
        }
    }
}

impl Transaction {
    pub const FILTER_PARAMS: &'static [&'static str] =
        &["transaction_hash", "block_number", "from_address", "to_address", "status"];

    /// `newest_first` (default) and `oldest_first`, keyed by block position.
    pub fn order_registry() -> Result<OrderRegistry<Self>, RegistryError> {
        use TransactionAttr::*;

        OrderRegistryBuilder::new(vec![BlockNumber, TransactionIndex])?
            .register(
                "newest_first",
                OrderSpec::new([(BlockNumber, Direction::Desc), (TransactionIndex, Direction::Desc)]),
            )?
            .register(
                "oldest_first",
                OrderSpec::new([(BlockNumber, Direction::Asc), (TransactionIndex, Direction::Asc)]),
            )?
            .build()
    }
}
