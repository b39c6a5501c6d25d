// tests/providers_days_of_the_year.rs
use chrono::NaiveDate;
use onthisday_digest::sources::{DaysOfTheYearSource, FixtureFetcher, Source};
use onthisday_digest::{EventType, SourceError, DEFAULT_WEIGHT};
use std::sync::Arc;

const PAGE: &str = include_str!("fixtures/daysoftheyear_2022_09_20.html");
const PAGE_URL: &str = "https://www.daysoftheyear.com/days/2022/09/20/";

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn source_with(fetcher: FixtureFetcher) -> DaysOfTheYearSource {
    DaysOfTheYearSource::new(
        Arc::new(fetcher),
        DaysOfTheYearSource::URL_TEMPLATE,
        DEFAULT_WEIGHT,
    )
    .unwrap()
}

#[tokio::test]
async fn fixture_page_yields_one_national_day_per_card() {
    let src = source_with(FixtureFetcher::new().with_page(PAGE_URL, PAGE));
    let evs = src
        .fetch_events(20, 9, Some(2022), d(2024, 1, 1))
        .await
        .expect("fixture parse ok");

    assert_eq!(evs.len(), 5, "sidebar post card must not count");
    assert!(evs.iter().all(|e| e.category == EventType::NationalDay));
    assert!(evs.iter().all(|e| e.end_date >= e.date));
    assert!(evs.iter().all(|e| e.source.name == "days_of_the_year"));

    let titles: Vec<&str> = evs.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "National Pepperoni Pizza Day",
            "World Gratitude Day",
            "Hispanic Heritage Month",
            "National Honey Month",
            "Pollution Prevention Week",
        ]
    );
}

#[tokio::test]
async fn ranged_and_month_only_cards_normalize_to_spans() {
    let src = source_with(FixtureFetcher::new().with_page(PAGE_URL, PAGE));
    let evs = src
        .fetch_events(20, 9, Some(2022), d(2024, 1, 1))
        .await
        .unwrap();

    let heritage = evs
        .iter()
        .find(|e| e.title == "Hispanic Heritage Month")
        .unwrap();
    assert_eq!(heritage.date, d(2022, 9, 15));
    assert_eq!(heritage.end_date, d(2022, 10, 15));
    assert!(!heritage.is_single_day());
    assert_eq!(
        heritage.link,
        "https://www.daysoftheyear.com/days/hispanic-heritage-month/"
    );

    let honey = evs.iter().find(|e| e.title == "National Honey Month").unwrap();
    assert_eq!((honey.date, honey.end_date), (d(2022, 9, 1), d(2022, 9, 30)));

    let pizza = evs
        .iter()
        .find(|e| e.title == "National Pepperoni Pizza Day")
        .unwrap();
    assert!(pizza.is_single_day());
    assert_eq!(pizza.date, d(2022, 9, 20));
}

#[tokio::test]
async fn missing_page_is_a_fetch_error() {
    let src = source_with(FixtureFetcher::new());
    let err = src
        .fetch_events(20, 9, Some(2022), d(2024, 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::Fetch { .. }));
}
