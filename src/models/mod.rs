use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Ad type imputed for listings that carry no explicit ad-type row. Unlabeled
/// ads are sale offers, not rentals or wanted posts.
pub const AD_TYPE_FOR_SALE: &str = "معروض للبيع";

/// Pay types accepted by the ingestion filter.
pub const PAY_TYPE_CASH: &str = "كاش";
pub const PAY_TYPE_NEGOTIABLE: &str = "قابل للبدل";

/// Core listing data model: one normalized classified ad.
///
/// Every optional field is `None` when the source page lacks the matching row,
/// never an empty string. `price` keeps its `0` sentinel when no price could
/// be extracted. `url` is the natural identity: one record per ad URL per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub governorate: Option<String>,
    pub city: Option<String>,
    /// `None` when the posted-date caption was missing or unparseable.
    pub posted: Option<NaiveDate>,
    pub year: Option<String>,
    pub kilometers: Option<String>,
    pub pay_type: Option<String>,
    pub ad_type: String,
    pub transmission: Option<String>,
    pub engine_cc: Option<String>,
    pub chassis: Option<String>,
    pub features: Option<Vec<String>>,
    pub color: Option<String>,
    pub condition: Option<String>,
    pub price: i64,
    pub url: String,
    pub images: Vec<String>,
    pub description: String,
    pub scraped_at: DateTime<Utc>,
}

impl Listing {
    /// Domain filter applied before persistence: plain for-sale ads paid in
    /// cash or negotiable.
    pub fn is_cash_sale(&self) -> bool {
        self.ad_type == AD_TYPE_FOR_SALE
            && self
                .pay_type
                .as_deref()
                .map(|p| p == PAY_TYPE_CASH || p == PAY_TYPE_NEGOTIABLE)
                .unwrap_or(false)
    }
}
