pub mod commands;
pub mod crypto;
pub mod handler;
pub mod hash;
pub mod transaction;
pub mod utxo;

pub use self::{crypto::*, handler::*, hash::*, transaction::*, utxo::*};
