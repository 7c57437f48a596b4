use std::path::Path;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::{info, warn};

use sheetjitter_core::{Cell, Table};

use crate::errors::ImportError;

/// Column order of the campaign statistics sheet.
pub const CAMPAIGN_COLUMNS: [&str; 18] = [
    "CampaignID",
    "CampaignName",
    "SentDate",
    "ListID",
    "UniqueClicks",
    "Clickers",
    "Complaints",
    "Delivered",
    "Sent",
    "SoftBounces",
    "HardBounces",
    "UniqueViews",
    "TrackableViews",
    "Unsubscriptions",
    "Viewed",
    "Deferred",
    "Year",
    "Month",
];

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A saved `emailCampaigns` response: one page, or every page in a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CampaignExport {
    Pages(Vec<CampaignPage>),
    Page(CampaignPage),
}

impl CampaignExport {
    pub fn into_campaigns(self) -> Vec<Campaign> {
        let pages = match self {
            CampaignExport::Pages(pages) => pages,
            CampaignExport::Page(page) => vec![page],
        };
        pages
            .into_iter()
            .flat_map(|page| page.campaigns.unwrap_or_default())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CampaignPage {
    #[serde(default)]
    pub campaigns: Option<Vec<Campaign>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sent_date: Option<String>,
    #[serde(default)]
    pub recipients: Option<Recipients>,
    #[serde(default)]
    pub statistics: Option<Statistics>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Recipients {
    #[serde(default)]
    pub lists: Option<Vec<u64>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    #[serde(default)]
    pub global_stats: Option<GlobalStats>,
}

/// Aggregate counters of one campaign. Missing counters read as 0.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalStats {
    pub unique_clicks: Option<f64>,
    pub clickers: Option<f64>,
    pub complaints: Option<f64>,
    pub delivered: Option<f64>,
    pub sent: Option<f64>,
    pub soft_bounces: Option<f64>,
    pub hard_bounces: Option<f64>,
    pub unique_views: Option<f64>,
    pub trackable_views: Option<f64>,
    pub unsubscriptions: Option<f64>,
    pub viewed: Option<f64>,
    pub deferred: Option<f64>,
}

impl GlobalStats {
    /// Counters in [`CAMPAIGN_COLUMNS`] order, `UniqueClicks` through `Deferred`.
    fn counters(&self) -> [Option<f64>; 12] {
        [
            self.unique_clicks,
            self.clickers,
            self.complaints,
            self.delivered,
            self.sent,
            self.soft_bounces,
            self.hard_bounces,
            self.unique_views,
            self.trackable_views,
            self.unsubscriptions,
            self.viewed,
            self.deferred,
        ]
    }
}

/// Read a saved campaign export from disk.
pub fn load_campaigns(path: &Path) -> Result<Vec<Campaign>, ImportError> {
    let content = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let export: CampaignExport =
        serde_json::from_str(&content).map_err(|source| ImportError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(export.into_campaigns())
}

/// Build the campaign sheet: header plus one row per campaign.
pub fn campaign_table(campaigns: &[Campaign]) -> Table {
    if campaigns.is_empty() {
        warn!("campaign export holds no campaigns");
    }
    let header = CAMPAIGN_COLUMNS.iter().map(|name| Cell::from(*name)).collect();
    let rows = campaigns.iter().map(campaign_row).collect();
    info!(campaigns = campaigns.len(), "campaign rows built");
    Table::with_header(header, rows)
}

fn campaign_row(campaign: &Campaign) -> Vec<Cell> {
    let id = campaign
        .id
        .filter(|id| *id != 0)
        .map(|id| id.to_string())
        .unwrap_or_default();

    let (sent_date, year, month) = match campaign.sent_date.as_deref() {
        Some(raw) if !raw.is_empty() => match parse_sent_date(raw) {
            Some(date) => (
                date.format("%d-%m-%Y").to_string(),
                date.year().to_string(),
                format!("{:02}", date.month()),
            ),
            None => {
                warn!(campaign_id = %id, sent_date = raw, "unparseable sentDate, date columns left empty");
                Default::default()
            }
        },
        _ => Default::default(),
    };

    let lists = campaign
        .recipients
        .as_ref()
        .and_then(|recipients| recipients.lists.as_ref())
        .map(|lists| {
            lists
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();

    let stats = campaign
        .statistics
        .as_ref()
        .and_then(|statistics| statistics.global_stats.clone())
        .unwrap_or_default();

    let mut row = Vec::with_capacity(CAMPAIGN_COLUMNS.len());
    row.push(text_cell(id));
    row.push(text_cell(campaign.name.clone().unwrap_or_default()));
    row.push(text_cell(sent_date));
    row.push(text_cell(lists));
    row.extend(
        stats
            .counters()
            .into_iter()
            .map(|value| Cell::Number(value.unwrap_or(0.0))),
    );
    row.push(text_cell(year));
    row.push(text_cell(month));
    row
}

/// Calendar date of an ISO 8601 timestamp, in the timestamp's own offset.
fn parse_sent_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.date_naive());
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|datetime| datetime.date())
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
}

fn text_cell(value: String) -> Cell {
    if value.is_empty() {
        Cell::Empty
    } else {
        Cell::Text(value)
    }
}
