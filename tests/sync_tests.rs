mod common;

use common::{draft_with_lines, row, FlakyStore, Op};
use quote_composer::{
    quote::{HeaderField, LineField},
    storage::{Filter, MemoryStore, TableStore, LINE_ITEMS_TABLE, QUOTES_TABLE},
    sync::{QuoteSynchronizer, SubmitOutcome},
    QuoteError,
};
use serde_json::json;
use std::sync::Arc;

async fn seed_quote_seven(store: &MemoryStore) {
    store
        .seed(
            QUOTES_TABLE,
            vec![row(json!({
                "id": 7,
                "date": "2024-01-10",
                "quotation_number": "Q-7",
                "company_name": "Hanbit Tech",
                "company_id": 3,
                "currency": "KRW",
                "vat_rate": 10.0,
                "memo": "old memo",
                "remarks": "",
                "subtotal": 60.0,
                "vat_amount": 6.0,
                "total_amount": 66.0,
                "created_at": "2024-01-10T09:00:00Z"
            }))],
        )
        .await;
    let lines = (0..3)
        .map(|position| {
            row(json!({
                "quote_id": 7,
                "position": position,
                "item_name": format!("old-{}", position),
                "model_name": "",
                "description": "",
                "quantity": 1.0,
                "unit_price": 20.0,
                "amount": 20.0
            }))
        })
        .collect();
    store.seed(LINE_ITEMS_TABLE, lines).await;
}

#[tokio::test]
async fn create_inserts_header_then_tagged_lines() {
    let store = FlakyStore::new();
    store.inner.set_next_id(QUOTES_TABLE, 42).await;
    let sync = QuoteSynchronizer::new(store.clone());
    let mut draft = draft_with_lines(&[("2", "100"), ("1", "50")], 10.0);
    draft
        .set_header_field(HeaderField::QuotationNumber, "Q-2024-001")
        .unwrap();

    let receipt = sync.submit(&draft).await.unwrap();

    assert_eq!(receipt.quote_id, 42);
    assert_eq!(receipt.outcome, SubmitOutcome::Created);
    assert_eq!(receipt.line_count, 2);
    assert_eq!(receipt.totals.subtotal, 250.0);
    assert_eq!(receipt.totals.vat_amount, 25.0);
    assert_eq!(receipt.totals.total_amount, 275.0);

    let calls = store.calls();
    assert_eq!(
        calls,
        vec![
            (Op::Insert, QUOTES_TABLE.to_string()),
            (Op::Insert, LINE_ITEMS_TABLE.to_string())
        ]
    );

    let headers = store.inner.select(QUOTES_TABLE, &Filter::All).await.unwrap();
    assert_eq!(headers.len(), 1);
    assert_eq!(headers[0]["subtotal"], json!(250.0));
    assert_eq!(headers[0]["total_amount"], json!(275.0));
    assert_eq!(headers[0]["quotation_number"], json!("Q-2024-001"));

    let lines = store
        .inner
        .select(LINE_ITEMS_TABLE, &Filter::eq("quote_id", 42))
        .await
        .unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["amount"], json!(200.0));
    assert_eq!(lines[1]["amount"], json!(50.0));
}

#[tokio::test]
async fn edit_replaces_all_lines_and_updates_header_in_place() {
    let store = FlakyStore::new();
    seed_quote_seven(&store.inner).await;
    let sync = QuoteSynchronizer::new(store.clone());

    let mut draft = sync.load(7).await.unwrap().into_draft();
    assert_eq!(draft.lines().len(), 3);
    draft.remove_line(2).unwrap();
    draft.remove_line(1).unwrap();
    draft.set_line_field(0, LineField::Quantity, "5").unwrap();
    draft.set_header_field(HeaderField::Memo, "new memo").unwrap();
    store.clear_calls();

    let receipt = sync.submit(&draft).await.unwrap();
    assert_eq!(receipt.quote_id, 7);
    assert_eq!(receipt.outcome, SubmitOutcome::Updated);

    assert_eq!(
        store.calls(),
        vec![
            (Op::Update, QUOTES_TABLE.to_string()),
            (Op::Delete, LINE_ITEMS_TABLE.to_string()),
            (Op::Insert, LINE_ITEMS_TABLE.to_string())
        ]
    );
    assert_eq!(store.inner.row_count(QUOTES_TABLE).await, 1);
    assert_eq!(store.inner.row_count(LINE_ITEMS_TABLE).await, 1);

    let reloaded = sync.load(7).await.unwrap();
    assert_eq!(reloaded.header.memo, "new memo");
    assert_eq!(reloaded.header.quotation_number.as_deref(), Some("Q-7"));
    assert_eq!(reloaded.header.subtotal, 100.0);
    assert_eq!(reloaded.header.total_amount, 110.0);
    assert_eq!(reloaded.lines[0].quantity, 5.0);
}

#[tokio::test]
async fn header_failure_never_touches_lines() {
    let store = FlakyStore::new();
    store.fail_on(Op::Insert, QUOTES_TABLE);
    let sync = QuoteSynchronizer::new(store.clone());
    let draft = draft_with_lines(&[("1", "10")], 0.0);
    let before = draft.clone();

    let err = sync.submit(&draft).await.unwrap_err();
    assert!(matches!(err, QuoteError::Persistence(ref message) if message.contains("simulated")));
    assert!(!store.touched(Op::Insert, LINE_ITEMS_TABLE));
    assert_eq!(draft, before);
    assert_eq!(store.inner.row_count(QUOTES_TABLE).await, 0);
}

#[tokio::test]
async fn line_failure_after_create_flags_the_orphaned_header() {
    let store = FlakyStore::new();
    store.fail_on(Op::Insert, LINE_ITEMS_TABLE);
    let sync = QuoteSynchronizer::new(store.clone());

    let err = sync
        .submit(&draft_with_lines(&[("1", "10")], 0.0))
        .await
        .unwrap_err();
    assert!(matches!(err, QuoteError::LinesMissing { quote_id: 1, .. }));
    assert_eq!(store.inner.row_count(QUOTES_TABLE).await, 1);
    assert_eq!(store.inner.row_count(LINE_ITEMS_TABLE).await, 0);
}

#[tokio::test]
async fn failed_line_delete_stops_before_insert() {
    let store = FlakyStore::new();
    seed_quote_seven(&store.inner).await;
    let sync = QuoteSynchronizer::new(store.clone());
    let draft = sync.load(7).await.unwrap().into_draft();
    store.fail_on(Op::Delete, LINE_ITEMS_TABLE);
    store.clear_calls();

    let err = sync.submit(&draft).await.unwrap_err();
    assert!(matches!(err, QuoteError::Persistence(_)));
    assert!(!store.touched(Op::Insert, LINE_ITEMS_TABLE));
    assert_eq!(store.inner.row_count(LINE_ITEMS_TABLE).await, 3);
}

#[tokio::test]
async fn failed_line_insert_on_edit_leaves_header_without_lines() {
    let store = FlakyStore::new();
    seed_quote_seven(&store.inner).await;
    let sync = QuoteSynchronizer::new(store.clone());
    let mut draft = sync.load(7).await.unwrap().into_draft();
    draft.set_header_field(HeaderField::Remarks, "rush").unwrap();
    store.fail_on(Op::Insert, LINE_ITEMS_TABLE);

    let err = sync.submit(&draft).await.unwrap_err();
    assert!(matches!(err, QuoteError::LinesMissing { quote_id: 7, .. }));
    assert_eq!(store.inner.row_count(LINE_ITEMS_TABLE).await, 0);

    store.heal();
    let reloaded = sync.load(7).await.unwrap();
    assert_eq!(reloaded.header.remarks, "rush");
    assert!(reloaded.lines.is_empty());
    assert_eq!(reloaded.into_draft().lines().len(), 1);
}

#[tokio::test]
async fn editing_a_vanished_quote_is_not_found() {
    let store = Arc::new(MemoryStore::new());
    seed_quote_seven(&store).await;
    let sync = QuoteSynchronizer::new(store.clone());
    let draft = sync.load(7).await.unwrap().into_draft();
    sync.delete(&[7]).await.unwrap();

    assert_eq!(sync.submit(&draft).await.unwrap_err(), QuoteError::NotFound(7));
    assert_eq!(sync.load(7).await.unwrap_err(), QuoteError::NotFound(7));
    assert_eq!(store.row_count(LINE_ITEMS_TABLE).await, 0);
}

#[tokio::test]
async fn list_is_newest_first_and_filters_by_company() {
    let store = Arc::new(MemoryStore::new());
    let sync = QuoteSynchronizer::new(store.clone());
    for (company, created_at) in [
        ("Acme Corp", "2024-03-01T00:00:00Z"),
        ("Globex", "2024-03-03T00:00:00Z"),
        ("acme labs", "2024-03-02T00:00:00Z"),
    ] {
        store
            .seed(
                QUOTES_TABLE,
                vec![row(json!({
                    "date": "2024-03-01",
                    "company_name": company,
                    "created_at": created_at
                }))],
            )
            .await;
    }

    let all: Vec<_> = sync
        .list(None)
        .await
        .unwrap()
        .into_iter()
        .map(|quote| quote.company_name)
        .collect();
    assert_eq!(all, vec!["Globex", "acme labs", "Acme Corp"]);

    let acme: Vec<_> = sync
        .list(Some("ACME"))
        .await
        .unwrap()
        .into_iter()
        .map(|quote| quote.company_name)
        .collect();
    assert_eq!(acme, vec!["acme labs", "Acme Corp"]);
}

#[tokio::test]
async fn bulk_delete_removes_lines_before_headers() {
    let store = FlakyStore::new();
    let sync = QuoteSynchronizer::new(store.clone());
    let first = sync.submit(&draft_with_lines(&[("1", "1")], 0.0)).await.unwrap();
    let second = sync
        .submit(&draft_with_lines(&[("1", "1"), ("2", "2")], 0.0))
        .await
        .unwrap();
    let keep = sync.submit(&draft_with_lines(&[("3", "3")], 0.0)).await.unwrap();
    store.clear_calls();

    let removed = sync
        .delete(&[first.quote_id, second.quote_id])
        .await
        .unwrap();
    assert_eq!(removed, 2);
    assert_eq!(
        store.calls(),
        vec![
            (Op::Delete, LINE_ITEMS_TABLE.to_string()),
            (Op::Delete, QUOTES_TABLE.to_string())
        ]
    );
    let remaining = sync.list(None).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, Some(keep.quote_id));
    assert_eq!(store.inner.row_count(LINE_ITEMS_TABLE).await, 1);
}
