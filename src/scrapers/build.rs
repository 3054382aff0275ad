use chrono::Utc;
use scraper::Html;

use crate::models::{Listing, AD_TYPE_FOR_SALE};

use super::error::Result;
use super::extract::{self, SpecsTable};

/// Builds one normalized record from a parsed listing page.
///
/// Extractors run in a fixed order; only a missing description aborts the
/// record, every other failure degrades to `None` or the price sentinel. The
/// seven specs-table prefix fields are read before the features run is
/// spliced out and the trailing fields after it, so every lookup sees aligned
/// indices.
pub fn build_listing(doc: &Html, url: &str) -> Result<Listing> {
    let posted = extract::posted_date(doc);
    let price = extract::price(doc, url);
    let images = extract::images(doc);
    let (city, governorate) = extract::location(doc, url);
    let brand = extract::brand(doc, city.as_deref(), url);
    let description = extract::description(doc, url)?;

    let mut specs = SpecsTable::from_document(doc);

    let engine_cc = specs.lookup(extract::LABEL_ENGINE_CC);
    let year = specs.lookup(extract::LABEL_YEAR);
    let model = specs.lookup(extract::LABEL_MODEL);
    let condition = specs.lookup(extract::LABEL_CONDITION);
    let pay_type = specs.lookup(extract::LABEL_PAY_TYPE);
    let kilometers = specs.lookup(extract::LABEL_KILOMETERS);
    let transmission = specs.lookup(extract::LABEL_TRANSMISSION);

    let features = specs.take_features();

    let color = specs.lookup(extract::LABEL_COLOR);
    let chassis = specs.lookup(extract::LABEL_CHASSIS);
    let ad_type = specs
        .lookup(extract::LABEL_AD_TYPE)
        .unwrap_or_else(|| AD_TYPE_FOR_SALE.to_string());

    Ok(Listing {
        brand,
        model,
        governorate,
        city,
        posted,
        year,
        kilometers,
        pay_type,
        ad_type,
        transmission,
        engine_cc,
        chassis,
        features,
        color,
        condition,
        price: price.unwrap_or(0),
        url: url.to_string(),
        images,
        description,
        scraped_at: Utc::now(),
    })
}
