//! Chain entities served through keyset pagination.

mod contract_state;
mod transaction;

pub use contract_state::{ContractState, ContractStateAttr};
pub use transaction::{Transaction, TransactionAttr};
