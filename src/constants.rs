//! Application-wide constants.

/// Maximum fractional digits carried by currency amounts.
pub const MONEY_SCALE: u32 = 2;

/// Maximum fractional digits carried by share quantities.
pub const SHARE_SCALE: u32 = 4;

/// Currency assigned to newly created wallets.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Name of the portfolio created alongside a new user.
pub const DEFAULT_PORTFOLIO_NAME: &str = "Main Portfolio";

/// Description of the portfolio created alongside a new user.
pub const DEFAULT_PORTFOLIO_DESCRIPTION: &str = "Default trading portfolio";

/// Default page size for paginated listings.
pub const DEFAULT_PAGE_SIZE: i64 = 10;
