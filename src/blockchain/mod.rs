pub mod node;
pub mod price;
pub mod traits;

pub use node::HttpNodeClient;
pub use price::{CoinGeckoClient, FiatEstimate, PriceEnricher, PriceFeed};
pub use traits::{BalanceReport, Block, BlockTransaction, MineOutcome, NodeClient, SubmitReceipt};
