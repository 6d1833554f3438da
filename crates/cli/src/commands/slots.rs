//! Slot prediction CLI commands

use anyhow::Result;
use tabled::Tabled;

use crate::client::{ApiClient, SlotsRecord};
use crate::output::{color_occupancy, facility_label, print_error, print_warning, OutputFormat};

/// Row for the slots table
#[derive(Tabled)]
struct SlotsRow {
    #[tabled(rename = "Requested")]
    datetime: String,
    #[tabled(rename = "Facility")]
    facility: String,
    #[tabled(rename = "Slots")]
    total_slots: u32,
    #[tabled(rename = "Occupied")]
    occupied: u32,
    #[tabled(rename = "Empty")]
    empty: u32,
    #[tabled(rename = "Load")]
    load: String,
}

impl From<&SlotsRecord> for SlotsRow {
    fn from(r: &SlotsRecord) -> Self {
        Self {
            datetime: r.datetime.clone(),
            facility: facility_label(r.id),
            total_slots: r.total_slots,
            occupied: r.total_occupied,
            empty: r.total_empty,
            load: color_occupancy(r.total_occupied, r.total_slots),
        }
    }
}

/// Query predictions for each timestamp and print them
pub async fn show_slots(client: &ApiClient, datetimes: &[String], format: OutputFormat) -> Result<()> {
    let mut records = Vec::new();
    for datetime in datetimes {
        match client.slots(datetime).await {
            Ok(mut batch) => {
                if batch.iter().all(|r| r.id.is_none()) {
                    print_warning(&format!(
                        "Server could not parse {:?}; expected YYYY-MM-DD HH:MM",
                        datetime
                    ));
                }
                records.append(&mut batch);
            }
            Err(e) => print_error(&format!("{}: {:#}", datetime, e)),
        }
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        OutputFormat::Table => {
            if records.is_empty() {
                print_warning("No predictions returned");
                return Ok(());
            }
            let rows: Vec<SlotsRow> = records.iter().map(SlotsRow::from).collect();
            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
        }
    }

    Ok(())
}
