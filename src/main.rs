#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use procurement_portal::{
    config::{self, database},
    core::{award, decision::DecisionBoard, export::TextExporter, report, rfp, store::Store},
    errors::{Error, Result},
    models::PortalDocument,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Set to discard an unreadable stored document and start again from the seed.
const DISCARD_CORRUPT_VAR: &str = "PORTAL_DISCARD_CORRUPT";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load the portal configuration
    let portal_config = config::load_default_config()
        .inspect_err(|e| error!("Failed to load portal configuration: {}", e))?;
    info!(
        "Using storage key '{}', exporting to {}",
        portal_config.storage_key,
        portal_config.export_dir.display()
    );

    // 4. Open the database and make sure the storage table exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Load (or seed) the portal document
    let store = Store::new(db, &portal_config.storage_key, portal_config.seed.to_document());
    let document = open_document(&store).await?;

    // 6. Run the requested command, or summarize what is stored
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("generate-wa") => {
            let Some(rfp_id) = args.get(1) else {
                return Err(Error::validation("usage: generate-wa <RFP-ID> [VENDOR-ID]"));
            };
            let exporter = TextExporter::new(&portal_config.export_dir);
            let wa = award::generate_wa(
                &store,
                rfp_id,
                args.get(2).map(String::as_str),
                &DecisionBoard::new(),
                &exporter,
            )
            .await
            .inspect_err(|e| error!("Failed to generate work authorization: {}", e))?;
            info!(
                "{} issued to {} for {}",
                wa.number,
                wa.vendor_id,
                report::format_currency(wa.total())
            );
        }
        Some("create-rfp") => {
            let Some(title) = args.get(1) else {
                return Err(Error::validation(
                    "usage: create-rfp <TITLE> [MODEL,MODEL...] [VENDOR-ID,VENDOR-ID...]",
                ));
            };
            let form = rfp::form_from_catalog(
                &portal_config.catalog,
                title,
                split_list(args.get(2)),
                split_list(args.get(3)),
            );
            let created = rfp::create_rfp(&store, &form)
                .await
                .inspect_err(|e| error!("Failed to create RFP: {}", e))?;
            info!(
                "{} '{}' created with {} catalog line(s)",
                created.id,
                created.title,
                created.items.len()
            );
        }
        Some(other) => {
            return Err(Error::validation(format!("unknown command '{other}'")));
        }
        None => log_summary(&store, &document).await?,
    }
    Ok(())
}

/// Splits a comma-separated argument, skipping blank entries.
fn split_list(arg: Option<&String>) -> Vec<String> {
    arg.map(|list| {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect()
    })
    .unwrap_or_default()
}

async fn open_document(store: &Store) -> Result<PortalDocument> {
    match store.initialize().await {
        Err(Error::CorruptDocument { key, message }) => {
            if std::env::var_os(DISCARD_CORRUPT_VAR).is_some() {
                warn!("Discarding unreadable document '{}' ({})", key, message);
                store.reset().await
            } else {
                error!(
                    "Stored document '{}' is unreadable; set {} to replace it with the seed",
                    key, DISCARD_CORRUPT_VAR
                );
                Err(Error::CorruptDocument { key, message })
            }
        }
        other => other,
    }
}

async fn log_summary(store: &Store, document: &PortalDocument) -> Result<()> {
    info!(
        "{} vendor(s), {} RFP(s), {} bid(s); next RFP {}, next WA {}",
        document.vendors.len(),
        document.rfps.len(),
        document.bids.len(),
        document.counters.rfp,
        document.counters.wa
    );

    for rfp in &document.rfps {
        let comparison = report::compare_bids(store, &rfp.id).await?;
        let lowest = comparison.lowest_bidder().map_or_else(
            || "no bids".to_string(),
            |v| {
                format!(
                    "lowest {} at {}",
                    v.vendor_name,
                    report::format_currency(v.total.unwrap_or_default())
                )
            },
        );
        info!(
            "{} '{}': {}/{} invited vendor(s) bid, {}{}",
            rfp.id,
            rfp.title,
            comparison.bid_count(),
            rfp.invited_vendor_ids.len(),
            lowest,
            rfp.awarded_to
                .as_deref()
                .map(|v| format!(", awarded to {v}"))
                .unwrap_or_default()
        );
    }
    Ok(())
}
