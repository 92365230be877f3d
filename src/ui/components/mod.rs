mod quota_card;

pub use quota_card::{CardContext, CardLayout, QuotaCard};
