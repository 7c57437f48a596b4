//! Adapters that turn mailing-platform exports into campaign tables.

pub mod brevo;
pub mod errors;

pub use brevo::{CAMPAIGN_COLUMNS, Campaign, CampaignExport, campaign_table, load_campaigns};
pub use errors::ImportError;
