use car_scout::ingest::IngestJob;
use car_scout::scrapers::ScrapeParams;
use car_scout::storage::MemoryStore;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("🚗 Car Scout - OLX cars-for-sale scraper");
    info!("=========================================");
    info!("");

    let params = ScrapeParams::default();
    let job = IngestJob::new(params, MemoryStore::new())?;

    let (listings, report) = job.run().await;

    for (i, listing) in listings.iter().enumerate() {
        println!(
            "{}. {} {} ({} EGP)",
            i + 1,
            listing.brand.as_deref().unwrap_or("?"),
            listing.model.as_deref().unwrap_or("?"),
            listing.price
        );
        if let (Some(city), Some(gov)) = (&listing.city, &listing.governorate) {
            println!("   {}, {}", city, gov);
        }
        println!("   URL: {}", listing.url);
        println!();
    }

    // Save to main JSON file
    let json = serde_json::to_string_pretty(&listings)?;
    tokio::fs::write("scraped_listings.json", json).await?;
    info!("💾 Saved all listings to scraped_listings.json");
    info!(
        "{} of {} scraped ads persisted",
        report.created, report.scraped
    );

    Ok(())
}
