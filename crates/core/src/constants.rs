/// Euro - the currency vehicle prices and taxes are quoted in
pub const EUR: &str = "EUR";

/// US dollar - the currency market price aggregates come back in
pub const USD: &str = "USD";

/// Currencies the warmup scheduler keeps fresh and the rates endpoint serves
pub const TRACKED_CURRENCIES: [&str; 2] = [EUR, USD];
