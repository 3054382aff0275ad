use std::time::{Duration, Instant};

use car_scout::ingest::IngestJob;
use car_scout::scrapers::{Fetcher, OlxScraper, ScrapeError, ScrapeParams};
use car_scout::storage::MemoryStore;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn results_page(ad_urls: &[String]) -> String {
    let links = ad_urls
        .iter()
        .enumerate()
        .map(|(i, url)| {
            format!(
                "<a class=\"ads__item__ad--title\" href=\"{}\">Ad {}</a>",
                url,
                i + 1
            )
        })
        .collect::<String>();
    format!("<html><body><div class=\"ads\">{links}</div></body></html>")
}

fn detail_page(model: &str, pay_type: &str) -> String {
    format!(
        "<html><body>\
         <p><small><span>تم إضافة الإعلان في 10:30, 15 يناير 2020</span></small></p>\
         <div><span class=\"pricelabel\">السعر: <strong>350,000 جنيه</strong></span></div>\
         <a class=\"show-map-link\"><strong>مدينة نصر، القاهرة</strong></a>\
         <table><tr><td class=\"middle\"><span>مدينة نصر</span><span>تويوتا مدينة نصر</span></td></tr></table>\
         <div class=\"photo-glow\"><img src=\"https://img.example/1.jpg\"></div>\
         <div id=\"textContent\"><p>سيارة بحالة ممتازة</p></div>\
         <div class=\"details\"><table>\
         <tr><th>الحالة</th><td><strong><a>مستعملة</a></strong></td></tr>\
         <tr><th>موديل</th><td><strong><a>{model}</a></strong></td></tr>\
         <tr><th>السنة</th><td><strong><a>2016</a></strong></td></tr>\
         <tr><th>كيلومترات</th><td><strong><a>90000</a></strong></td></tr>\
         <tr><th>ناقل الحركة</th><td><strong><a>اوتوماتيك</a></strong></td></tr>\
         <tr><th>المحرك (سي سي)</th><td><strong><a>1600</a></strong></td></tr>\
         <tr><th>طريقة الدفع</th><td><strong><a>{pay_type}</a></strong></td></tr>\
         <tr><th>اللون</th><td><strong><a>أحمر</a></strong></td></tr>\
         <tr><th>نوع الهيكل</th><td><strong><a>سيدان</a></strong></td></tr>\
         </table></div>\
         </body></html>"
    )
}

async fn mount_results_page(server: &MockServer, ad_urls: &[String]) {
    Mock::given(method("GET"))
        .and(path("/vehicles/cars-for-sale/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(ad_urls)))
        .mount(server)
        .await;
}

fn test_params(server: &MockServer) -> ScrapeParams {
    ScrapeParams::default()
        .with_base_url(server.uri())
        .with_pages(1, 2)
        .with_jitter(false)
}

#[tokio::test]
async fn failing_detail_page_skips_only_that_listing() {
    let server = MockServer::start().await;
    let ad_urls: Vec<String> = (1..=3).map(|i| format!("{}/ad/{}", server.uri(), i)).collect();
    mount_results_page(&server, &ad_urls).await;

    Mock::given(method("GET"))
        .and(path("/ad/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("كورولا", "كاش")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ad/2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ad/3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("لانسر", "كاش")))
        .mount(&server)
        .await;

    let scraper = OlxScraper::with_params(test_params(&server)).unwrap();
    let listings = scraper.scrape_page(1).await.unwrap();

    assert_eq!(listings.len(), 2);
    let mut models: Vec<_> = listings
        .iter()
        .map(|l| l.model.as_deref().unwrap().to_string())
        .collect();
    models.sort();
    assert_eq!(models, vec!["كورولا", "لانسر"]);
    assert!(listings.iter().all(|l| l.price == 350_000));
}

#[tokio::test]
async fn gate_of_one_serializes_listing_fetches() {
    let server = MockServer::start().await;
    let ad_urls: Vec<String> = (1..=3).map(|i| format!("{}/ad/{}", server.uri(), i)).collect();
    mount_results_page(&server, &ad_urls).await;

    for i in 1..=3 {
        Mock::given(method("GET"))
            .and(path(format!("/ad/{}", i)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(detail_page("كورولا", "كاش"))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;
    }

    let params = test_params(&server).with_max_concurrent(1);
    let scraper = OlxScraper::with_params(params).unwrap();

    let start = Instant::now();
    let listings = scraper.scrape_page(1).await.unwrap();
    let elapsed = start.elapsed();

    // all three workers completed before the page barrier released
    assert_eq!(listings.len(), 3);
    // with one permit the three 200ms fetches cannot overlap
    assert!(
        elapsed >= Duration::from_millis(550),
        "fetches overlapped: {elapsed:?}"
    );
}

#[tokio::test]
async fn wide_gate_overlaps_listing_fetches() {
    let server = MockServer::start().await;
    let ad_urls: Vec<String> = (1..=3).map(|i| format!("{}/ad/{}", server.uri(), i)).collect();
    mount_results_page(&server, &ad_urls).await;

    for i in 1..=3 {
        Mock::given(method("GET"))
            .and(path(format!("/ad/{}", i)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(detail_page("كورولا", "كاش"))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;
    }

    let params = test_params(&server).with_max_concurrent(3);
    let scraper = OlxScraper::with_params(params).unwrap();

    let start = Instant::now();
    let listings = scraper.scrape_page(1).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(listings.len(), 3);
    // serialized execution would need at least 900ms
    assert!(
        elapsed < Duration::from_millis(800),
        "fetches did not overlap: {elapsed:?}"
    );
}

#[tokio::test]
async fn failed_results_page_is_skipped_not_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vehicles/cars-for-sale/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let scraper = OlxScraper::with_params(test_params(&server)).unwrap();

    let err = scraper.scrape_page(1).await.unwrap_err();
    assert!(matches!(err, ScrapeError::BadStatus { .. }));

    // the range walker absorbs the failure
    let listings = scraper.scrape_range(1, 2).await;
    assert!(listings.is_empty());
}

#[tokio::test]
async fn ingest_job_persists_only_cash_sales() {
    let server = MockServer::start().await;
    let ad_urls: Vec<String> = (1..=2).map(|i| format!("{}/ad/{}", server.uri(), i)).collect();
    mount_results_page(&server, &ad_urls).await;

    Mock::given(method("GET"))
        .and(path("/ad/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("كورولا", "كاش")))
        .mount(&server)
        .await;
    // installment ads fail the domain filter
    Mock::given(method("GET"))
        .and(path("/ad/2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("لانسر", "تقسيط")))
        .mount(&server)
        .await;

    let job = IngestJob::new(test_params(&server), MemoryStore::new()).unwrap();
    let (listings, report) = job.run().await;

    assert_eq!(report.scraped, 2);
    assert_eq!(report.created, 1);
    assert_eq!(listings.len(), 2);

    let ads = job.store().ads();
    assert_eq!(ads.len(), 1);
    assert_eq!(ads[0].listing.model.as_deref(), Some("كورولا"));
    assert_eq!(job.store().brand_count(), 1);
    assert_eq!(job.store().model_count(), 1);
}

#[tokio::test]
async fn fetcher_surfaces_exhausted_retries() {
    // nothing listens here; every attempt is a transport failure
    let params = ScrapeParams::default().with_base_url("http://127.0.0.1:1");
    let fetcher = Fetcher::new(&params).unwrap();

    let err = fetcher.get("http://127.0.0.1:1/down").await.unwrap_err();
    assert!(matches!(err, ScrapeError::RetriesExhausted { .. }));
}
