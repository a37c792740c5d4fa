//! wakey entry point.
//!
//! Headless status sweep: loads settings, makes sure the backing file
//! exists, probes every device once, and logs the resulting device and group
//! tables.  Interactive frontends drive the same operations through
//! `infrastructure::ui_bridge`.
//!
//! ```text
//! main()
//!  └─ load_settings()            -- TOML, defaults when absent
//!  └─ AppState::from_settings()  -- backing file, prober, broadcast sender
//!  └─ ensure_exists()
//!  └─ refresh_state()            -- one concurrent probe sweep
//! ```

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use wakey::infrastructure::storage::settings::{load_settings, Settings};
use wakey::infrastructure::ui_bridge::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Settings are read before logging is up because they carry the level.
    let loaded = load_settings();
    let fallback_level = loaded
        .as_ref()
        .map(|s| s.general.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&fallback_level))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = loaded.unwrap_or_else(|e| {
        warn!("failed to load settings, using defaults: {e}");
        Settings::default()
    });

    info!("wakey starting");

    let state = AppState::from_settings(&settings)?;
    if state.store.ensure_exists().await? {
        info!("created empty device store");
    }

    let refreshed = ui_bridge::refresh_state(state.clone()).await;
    match (refreshed.data, refreshed.error) {
        (Some(devices), _) => {
            info!("{} device(s)", devices.len());
            for d in &devices {
                info!(
                    "  {:<20} {:<17} {:<15} {:<7}  {}",
                    d.name,
                    d.mac_address,
                    d.ip_address,
                    d.state.as_deref().unwrap_or("-"),
                    d.description
                );
            }
        }
        (None, Some(e)) => warn!("state refresh failed ({:?}): {}", e.kind, e.message),
        (None, None) => {}
    }

    if let Some(groups) = ui_bridge::list_groups(state).await.data {
        info!("{} group(s)", groups.len());
        for g in &groups {
            info!("  {:<20} {}", g.name, g.member_names.join(", "));
        }
    }

    info!("wakey done");
    Ok(())
}
