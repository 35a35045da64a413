//! Quote selection against real asset files and persisted cursors.

use crate::helpers::{Fixture, monday_morning, sunday_morning};
use jaculatoria::JaculatoriaError;
use jaculatoria::liturgy::{LiturgicalContext, LiturgicalSeason, Rank};

#[tokio::test]
async fn first_quote_of_the_day_advances_the_cursor() {
    let fixture = Fixture::new();
    let (use_case, _) = fixture.next_quote(LiturgicalContext::ordinary(), sunday_morning());

    let quote = use_case.execute().await.unwrap();

    assert_eq!(quote.text, "Quote 1");
    assert_eq!(quote.theme, "Ressurreição");
    assert_eq!(quote.season, LiturgicalSeason::Ordinary);
    assert!(quote.feast.is_none());
    let indices = fixture.read_indices();
    assert_eq!(indices["quoteIndices"]["1"], 1);
    assert_eq!(indices["lastDay"], 1);
}

#[tokio::test]
async fn rotation_wraps_and_images_alternate() {
    let fixture = Fixture::new();
    let (use_case, _) = fixture.next_quote(LiturgicalContext::ordinary(), sunday_morning());

    let mut texts = Vec::new();
    let mut images = Vec::new();
    for _ in 0..4 {
        let quote = use_case.execute().await.unwrap();
        texts.push(quote.text);
        images.push(quote.image.unwrap());
    }

    assert_eq!(texts, ["Quote 1", "Quote 2", "Quote 3", "Quote 1"]);
    assert!(images[0].ends_with("a.png"));
    assert!(images[1].ends_with("b.jpg"));
    assert!(images[2].ends_with("a.png"));
}

#[tokio::test]
async fn new_day_resets_every_cursor() {
    let fixture = Fixture::new();
    let (use_case, schedule) =
        fixture.next_quote(LiturgicalContext::ordinary(), sunday_morning());

    use_case.execute().await.unwrap();
    use_case.execute().await.unwrap();
    schedule.clock().set(monday_morning());

    let monday = use_case.execute().await.unwrap();
    assert_eq!(monday.text, "Monday 1");
    assert!(monday.image.is_none());

    let indices = fixture.read_indices();
    assert_eq!(indices["lastDay"], 2);
    assert_eq!(indices["quoteIndices"]["2"], 1);
    assert!(indices["quoteIndices"].get("1").is_none());
}

#[tokio::test]
async fn feast_pool_merges_curated_and_calendar_quotes() {
    let fixture = Fixture::new();
    fixture.write(
        "assets/feasts/sao-jose/quotes.json",
        r#"["Sede santos", "Rogai por nós"]"#,
    );
    fixture.write("assets/feasts/sao-jose/icon.png", "");
    let context = LiturgicalContext {
        feast: Some("sao-jose".to_owned()),
        feast_name: Some("São José".to_owned()),
        rank: Rank::Solemnity,
        api_quotes: vec!["Sede santos!".to_owned(), "Com toda a corte celeste.".to_owned()],
        ..LiturgicalContext::ordinary()
    };
    let (use_case, _) = fixture.next_quote(context, sunday_morning());

    let texts: Vec<String> = {
        let mut texts = Vec::new();
        for _ in 0..3 {
            let quote = use_case.execute().await.unwrap();
            assert_eq!(quote.feast.as_deref(), Some("sao-jose"));
            assert_eq!(quote.feast_name.as_deref(), Some("São José"));
            assert!(quote.image.as_deref().unwrap().ends_with("icon.png"));
            texts.push(quote.text);
        }
        texts
    };

    assert_eq!(texts, ["Sede santos", "Rogai por nós", "Com toda a corte celeste."]);
    assert_eq!(fixture.read_indices()["feastImageIndices"]["sao-jose"], 0);
}

#[tokio::test]
async fn empty_feast_pool_falls_back_to_the_day() {
    let fixture = Fixture::new();
    let context = LiturgicalContext {
        feast: Some("santo-desconhecido".to_owned()),
        rank: Rank::Memorial,
        ..LiturgicalContext::ordinary()
    };
    let (use_case, _) = fixture.next_quote(context, sunday_morning());

    let quote = use_case.execute().await.unwrap();
    assert_eq!(quote.text, "Quote 1");
    assert!(quote.feast.is_none());
}

#[tokio::test]
async fn corrupted_cursor_heals_to_first_quote() {
    let fixture = Fixture::new();
    fixture.write(
        "indices.json",
        r#"{"quoteIndices": {"1": 42}, "imageIndices": {}, "lastDay": 1}"#,
    );
    let (use_case, _) = fixture.next_quote(LiturgicalContext::ordinary(), sunday_morning());

    let quote = use_case.execute().await.unwrap();
    assert_eq!(quote.text, "Quote 1");
    assert_eq!(fixture.read_indices()["quoteIndices"]["1"], 1);
}

#[tokio::test]
async fn day_without_quotes_is_reported() {
    let fixture = Fixture::new();
    let (use_case, _) = fixture.next_quote(LiturgicalContext::ordinary(), sunday_morning());
    let saturday = sunday_morning() - chrono::Duration::days(1);
    let (saturday_case, _) = fixture.next_quote(LiturgicalContext::ordinary(), saturday);

    assert!(use_case.execute().await.is_ok());
    let err = saturday_case.execute().await.unwrap_err();
    assert!(matches!(err, JaculatoriaError::QuotesNotFound { day } if day.get() == 7));
}
