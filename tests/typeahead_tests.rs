use std::time::{Duration, Instant};

use quote_composer::{
    config::Config,
    typeahead::{
        filter_candidates, CandidateList, CandidateRegistry, FieldId, Key, KeyOutcome,
        TypeaheadEngine, TypeaheadState,
    },
};

fn currencies() -> CandidateList {
    CandidateList::new(["USD", "EUR", "KRW"])
}

fn engine() -> TypeaheadEngine {
    TypeaheadEngine::new(Duration::from_millis(150))
}

#[test]
fn arrows_then_enter_select_in_display_order() {
    let countries = CandidateList::new(["Korea", "Kenya", "Japan"]);
    let mut engine = engine();
    engine.input(FieldId::Country, "k", &countries);
    assert_eq!(engine.suggestions(), &["Korea".to_string(), "Kenya".to_string()]);

    assert_eq!(
        engine.key(FieldId::Country, Key::Down),
        KeyOutcome::Navigated { highlighted: 0 }
    );
    assert_eq!(
        engine.key(FieldId::Country, Key::Down),
        KeyOutcome::Navigated { highlighted: 1 }
    );
    assert_eq!(
        engine.key(FieldId::Country, Key::Enter),
        KeyOutcome::Selected("Kenya".into())
    );
    assert_eq!(engine.state(), TypeaheadState::Idle);
}

#[test]
fn navigation_wraps_both_ways() {
    let mut engine = engine();
    engine.input(FieldId::Currency, "u", &CandidateList::new(["USD", "UAH", "EUR"]));
    assert_eq!(
        engine.key(FieldId::Currency, Key::Up),
        KeyOutcome::Navigated { highlighted: 1 }
    );
    assert_eq!(
        engine.key(FieldId::Currency, Key::Down),
        KeyOutcome::Navigated { highlighted: 0 }
    );
    assert_eq!(
        engine.key(FieldId::Currency, Key::Up),
        KeyOutcome::Navigated { highlighted: 1 }
    );
}

#[test]
fn enter_without_highlight_belongs_to_the_form() {
    let mut engine = engine();
    engine.input(FieldId::Currency, "e", &currencies());
    assert_eq!(engine.key(FieldId::Currency, Key::Enter), KeyOutcome::Submit);
    assert!(engine.is_open(FieldId::Currency));
}

#[test]
fn no_match_keeps_an_empty_open_list() {
    let mut engine = engine();
    engine.input(FieldId::Currency, "zz", &currencies());
    assert!(engine.is_open(FieldId::Currency));
    assert!(engine.suggestions().is_empty());
    assert_eq!(engine.key(FieldId::Currency, Key::Down), KeyOutcome::Ignored);
}

#[test]
fn clearing_the_text_closes_suggestions() {
    let mut engine = engine();
    engine.input(FieldId::Currency, "k", &currencies());
    engine.key(FieldId::Currency, Key::Down);
    engine.input(FieldId::Currency, "", &currencies());
    assert_eq!(engine.state(), TypeaheadState::Idle);
    assert_eq!(engine.highlighted(), None);
}

#[test]
fn focusing_another_field_moves_the_list() {
    let mut engine = engine();
    engine.input(FieldId::Currency, "u", &currencies());
    engine.focus(FieldId::Country, "Ja", &CandidateList::new(["Japan", "Jamaica"]));
    assert_eq!(engine.active_field(), Some(FieldId::Country));
    assert!(!engine.is_open(FieldId::Currency));
    assert_eq!(engine.suggestions().len(), 2);
}

#[test]
fn blur_dismisses_only_after_the_grace_window() {
    let mut engine = engine();
    let start = Instant::now();
    engine.input(FieldId::Currency, "k", &currencies());
    engine.blur(FieldId::Currency, start);
    assert!(engine.pending_dismissal().is_some());

    assert!(!engine.tick(start + Duration::from_millis(100)));
    assert!(engine.is_open(FieldId::Currency));
    assert!(engine.tick(start + Duration::from_millis(150)));
    assert!(!engine.is_open(FieldId::Currency));
}

#[test]
fn enter_after_expired_blur_goes_to_the_form() {
    let mut engine = engine();
    let start = Instant::now();
    engine.input(FieldId::Currency, "k", &currencies());
    engine.key_at(FieldId::Currency, Key::Down, start);
    engine.blur(FieldId::Currency, start);

    assert_eq!(
        engine.key_at(FieldId::Currency, Key::Enter, start + Duration::from_millis(200)),
        KeyOutcome::Submit
    );
    assert_eq!(engine.state(), TypeaheadState::Idle);
}

#[test]
fn refocus_cancels_a_pending_dismissal() {
    let mut engine = engine();
    let start = Instant::now();
    engine.input(FieldId::Currency, "k", &currencies());
    engine.blur(FieldId::Currency, start);
    engine.focus(FieldId::Currency, "k", &currencies());
    assert_eq!(engine.pending_dismissal(), None);
    assert!(!engine.tick(start + Duration::from_secs(1)));
}

#[test]
fn hover_moves_highlight_used_by_enter() {
    let mut engine = engine();
    engine.input(FieldId::ShippingMethod, "a", &CandidateList::new(["Air", "Air Express", "Sea"]));
    assert!(engine.hover(FieldId::ShippingMethod, 1));
    assert!(!engine.hover(FieldId::ShippingMethod, 7));
    assert_eq!(
        engine.key(FieldId::ShippingMethod, Key::Enter),
        KeyOutcome::Selected("Air Express".into())
    );
}

#[test]
fn registry_prefers_configured_overrides() {
    let mut config = Config::default();
    config
        .candidate_overrides
        .insert("currency".into(), vec!["CHF".into(), "CHF".into(), "CAD".into()]);
    let registry = CandidateRegistry::with_defaults(&config);

    assert_eq!(registry.list(FieldId::Currency), &["CHF".to_string(), "CAD".to_string()]);
    assert!(!registry.list(FieldId::Country).is_empty());
    assert!(registry.list(FieldId::CompanyName).is_empty());
    assert_eq!(
        filter_candidates(registry.list(FieldId::Currency), "c"),
        vec!["CHF".to_string(), "CAD".to_string()]
    );
}
