//! Column-name constants shared by the schemas, the feature deriver and the
//! pipeline. Names follow the point-of-sale export verbatim.

// ── Sales export ────────────────────────────────────────────────────

pub const DATE: &str = "date";
pub const HOURS_OPENED: &str = "hours_opened";
pub const TIPS: &str = "tips_normalized";
pub const TOTAL_SALES: &str = "total_sales_normalized";
pub const IN_STORE_ORDERS: &str = "in_store_orders";
pub const ITEM_A_SALES: &str = "item_A_sales";
pub const ITEM_B_SALES: &str = "item_B_sales";
pub const ITEM_C_SALES: &str = "item_C_sales";
/// Sales linked to the festival promotion.
pub const FESTIVAL_SALES: &str = "HCF_sales";
pub const TYPE_OF_DAY: &str = "type_of_day";

// ── Weather export ──────────────────────────────────────────────────

pub const AVG_TEMPERATURE: &str = "avg_temperature";
pub const RAIN: &str = "rain";
pub const SNOW: &str = "snow";

/// Columns kept from the raw weather export, in output order.
pub const WEATHER: [&str; 4] = [DATE, AVG_TEMPERATURE, RAIN, SNOW];

/// Weather value columns attached to each sales day by the merge.
pub const WEATHER_VALUES: [&str; 3] = [AVG_TEMPERATURE, RAIN, SNOW];

// ── Derived features ────────────────────────────────────────────────

pub const IS_LONG_WEEKEND: &str = "is_long_weekend";
pub const IS_FESTIVAL: &str = "is_festival";
pub const IS_HOLIDAY: &str = "is_holiday";
pub const SEASON: &str = "season";
pub const DAY_OF_WEEK: &str = "day_of_week";
