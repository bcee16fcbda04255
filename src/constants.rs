use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Decimal precision for calculation results
pub const DECIMAL_PRECISION: u32 = 6;

/// Decimal precision for display
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Annualization factor for volatility on trading-day series
pub const TRADING_DAYS_PER_YEAR: u32 = 252;

/// Annualization factor for portfolios valued every calendar day
pub const CALENDAR_DAYS_PER_YEAR: u32 = 365;

/// Average days per year used when annualizing period returns
pub const DAYS_PER_YEAR_DECIMAL: Decimal = dec!(365.25);

/// sqrt(252), fallback when Decimal::sqrt fails
pub const SQRT_TRADING_DAYS_APPROX: Decimal = dec!(15.874507866);

/// Asset-class bucket for symbols absent from the injected mapping
pub const UNCLASSIFIED_ASSET_CLASS: &str = "UNCLASSIFIED";
