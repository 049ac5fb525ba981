pub mod cart;
pub mod order;
pub mod product;
pub mod query;
pub mod token;

pub use cart::*;
pub use order::*;
pub use product::*;
pub use query::*;
pub use token::*;
