mod atomic;
mod identifier;
mod interface;
mod lock;

pub use atomic::*;
pub use identifier::*;
pub use interface::*;
pub use lock::*;
