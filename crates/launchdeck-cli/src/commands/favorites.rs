use anyhow::{Context, Result};
use colored::Colorize;
use launchdeck_core::Collection;

use super::AppContext;

pub fn list(ctx: &AppContext, collection: Collection) -> Result<()> {
    let ids = ctx
        .favorites
        .try_get_all(collection.storage_key())
        .with_context(|| format!("Failed to read favorite {}", collection))?;

    if ids.is_empty() {
        println!("No favorite {} yet.", collection);
        return Ok(());
    }

    println!("{}", format!("Favorite {} ({})", collection, ids.len()).bold());
    for id in ids {
        println!("  {} {}", "★".yellow(), id);
    }
    Ok(())
}

pub fn add(ctx: &AppContext, collection: Collection, id: &str) -> Result<()> {
    let added = ctx
        .favorites
        .try_add(collection.storage_key(), id)
        .with_context(|| format!("Failed to add {} to favorite {}", id, collection))?;

    if added {
        println!("{} Added {} to favorite {}", "✓".green(), id, collection);
    } else {
        println!("{} is already a favorite {}", id, collection.entity_name());
    }
    Ok(())
}

pub fn remove(ctx: &AppContext, collection: Collection, id: &str) -> Result<()> {
    let removed = ctx
        .favorites
        .try_remove(collection.storage_key(), id)
        .with_context(|| format!("Failed to remove {} from favorite {}", id, collection))?;

    if removed {
        println!("{} Removed {} from favorite {}", "✓".green(), id, collection);
    } else {
        println!("{} is not a favorite {}", id, collection.entity_name());
    }
    Ok(())
}

pub fn clear(ctx: &AppContext, collection: Collection) -> Result<()> {
    ctx.favorites
        .try_clear(collection.storage_key())
        .with_context(|| format!("Failed to clear favorite {}", collection))?;
    println!("{} Cleared favorite {}", "✓".green(), collection);
    Ok(())
}
