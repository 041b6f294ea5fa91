use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use launchdeck_application::EntityLookup;
use launchdeck_core::{Collection, Launch, LaunchPad, Named};

use super::AppContext;
use super::browse::{Listing, favorite_marker};

const RECENT_LAUNCHES: u64 = 3;

pub async fn launch(ctx: &AppContext, id: &str) -> Result<()> {
    let lookup = EntityLookup::new(Arc::clone(&ctx.client));
    let launch: Launch = lookup
        .find(id, &["rocket", "launchpad"])
        .await
        .with_context(|| format!("Failed to load launch {}", id))?;

    let is_favorite = ctx
        .favorites
        .contains(Collection::Launches.storage_key(), launch.id());
    println!("{} {}", favorite_marker(is_favorite), launch.name.bold());

    if let Some(flight_number) = launch.flight_number {
        print_field("Flight", &format!("#{}", flight_number));
    }
    if let Some(date) = launch.date_local.map(|date| date.to_rfc2822()) {
        print_field("Date", &date);
    }
    let outcome = match launch.success {
        Some(true) => "Successful".green().to_string(),
        Some(false) => "Failed".red().to_string(),
        None => "Unknown".to_string(),
    };
    print_field("Outcome", &outcome);
    if let Some(rocket) = launch.rocket.as_ref().and_then(|rocket| rocket.populated()) {
        let success_rate = rocket
            .success_rate_pct
            .map(|pct| format!(" ({}% success rate)", pct))
            .unwrap_or_default();
        print_field("Rocket", &format!("{}{}", rocket.name, success_rate));
    }
    if let Some(pad) = launch.launchpad.as_ref().and_then(|pad| pad.populated()) {
        print_field("Launch pad", &format!("{} ({})", pad.display_name(), pad.id));
    }
    if let Some(image) = launch.image_url() {
        print_field("Image", image);
    }
    if let Some(webcast) = &launch.links.webcast {
        print_field("Webcast", webcast);
    }
    if let Some(details) = &launch.details {
        println!("\n{}", details);
    }
    Ok(())
}

pub async fn launch_pad(ctx: &AppContext, id: &str) -> Result<()> {
    let lookup = EntityLookup::new(Arc::clone(&ctx.client));
    let pad: LaunchPad = lookup
        .find(id, &["rockets"])
        .await
        .with_context(|| format!("Failed to load launch pad {}", id))?;

    let is_favorite = ctx
        .favorites
        .contains(Collection::LaunchPads.storage_key(), pad.id());
    println!("{} {}", favorite_marker(is_favorite), pad.summary());

    let location = [pad.locality.as_deref(), pad.region.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");
    if !location.is_empty() {
        print_field("Location", &location);
    }
    print_field("Short name", &pad.name);
    if let Some(details) = &pad.details {
        println!("\n{}", details);
    }

    let launches = lookup
        .recent_launches(&pad.id, RECENT_LAUNCHES)
        .await
        .with_context(|| format!("Failed to load recent launches of {}", pad.id))?;
    if !launches.is_empty() {
        println!("\n{}", "Recent launches".bold());
        for launch in &launches {
            let date = launch
                .date_utc
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            println!("  {}  {}  ({})", launch.name, date, launch.id);
        }
    }
    Ok(())
}

fn print_field(label: &str, value: &str) {
    let label = format!("{:<12}", format!("{}:", label));
    println!("  {}{}", label.dimmed(), value);
}
