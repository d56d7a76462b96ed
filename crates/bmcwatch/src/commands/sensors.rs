//! `bmcwatch sensors`: every entity reading in one table.

use tabled::Tabled;

use bmcwatch_core::entity::{self, EntityReading, Platform};

use crate::cli::{GlobalOpts, PlatformFilter, SensorsArgs};
use crate::config::Target;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct ReadingRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    platform: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Category")]
    category: String,
}

fn row(r: &EntityReading) -> ReadingRow {
    let value = match (&r.value, r.unit, r.available) {
        (_, _, false) => "unavailable".to_owned(),
        (Some(v), Some(unit), true) => format!("{v} {unit}"),
        (Some(v), None, true) => v.clone(),
        (None, _, true) => "-".to_owned(),
    };
    ReadingRow {
        key: r.key.clone(),
        name: r.name.clone(),
        platform: r.platform.to_string(),
        value,
        category: r.category.to_string(),
    }
}

fn platform_of(filter: PlatformFilter) -> Platform {
    match filter {
        PlatformFilter::Sensor => Platform::Sensor,
        PlatformFilter::BinarySensor => Platform::BinarySensor,
        PlatformFilter::Switch => Platform::Switch,
        PlatformFilter::Button => Platform::Button,
        PlatformFilter::Select => Platform::Select,
    }
}

/// Apply `--platform` and `--all`.
///
/// Buttons carry no value and are hidden unless asked for.
pub fn filter_readings(readings: Vec<EntityReading>, args: &SensorsArgs) -> Vec<EntityReading> {
    let wanted = args.platform.map(platform_of);
    readings
        .into_iter()
        .filter(|r| wanted.is_none_or(|p| r.platform == p))
        .filter(|r| {
            args.all
                || (r.available && (r.platform != Platform::Button || wanted.is_some()))
        })
        .collect()
}

pub async fn handle(target: Target, args: SensorsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let readings = util::with_coordinator(target, |coordinator| async move {
        let snap = util::snapshot_of(&coordinator)?;
        let stats = coordinator.client().stats();
        Ok(entity::readings(
            coordinator.entry_id(),
            &snap,
            stats.as_ref(),
        ))
    })
    .await?;

    let readings = filter_readings(readings, &args);
    let out = output::render_list(
        &global.output,
        &readings,
        row,
        |r| format!("{}\t{}", r.key, r.value.as_deref().unwrap_or("")),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
