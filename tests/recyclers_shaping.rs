use ecoscan::config::Geo;
use ecoscan::error::ScanError;
use ecoscan::model::{RecyclerRecord, backfill_ids};
use ecoscan::recyclers::{
    GeoPosition, RecyclerPanel, SortKey, filter_records, resolve_position, sort_records,
};
use std::sync::atomic::{AtomicUsize, Ordering};

fn rec(name: &str, address: &str, rating: f64, distance_km: f64) -> RecyclerRecord {
    RecyclerRecord {
        name: name.into(),
        address: address.into(),
        rating,
        distance_km,
        ..Default::default()
    }
}

#[test]
fn wire_decoding_is_lenient() {
    let raw = r#"[
        {"name": "GreenCycle", "address": "12 Oak St", "rating": "N/A", "distance": "3.2 km"},
        {"name": "E-Waste Hub", "address": "9 Elm Ave", "rating": "4.6", "distance": 1.1},
        {"id": "abc", "name": "ReTech", "address": "4 Birch Rd", "rating": 4.2, "distance": "0.4km"}
    ]"#;
    let mut records: Vec<RecyclerRecord> = serde_json::from_str(raw).unwrap();
    backfill_ids(&mut records);

    assert_eq!(records[0].rating, 0.0);
    assert_eq!(records[0].distance_km, 3.2);
    assert_eq!(records[0].id, "1");
    assert_eq!(records[1].rating, 4.6);
    assert_eq!(records[1].distance_km, 1.1);
    assert_eq!(records[2].id, "abc");
    assert_eq!(records[2].distance_km, 0.4);
}

#[test]
fn sorts_by_distance_ascending() {
    let mut records = vec![
        rec("a", "", 1.0, 5.2),
        rec("b", "", 2.0, 1.1),
        rec("c", "", 3.0, 3.0),
    ];
    sort_records(&mut records, SortKey::Distance);
    let distances: Vec<f64> = records.iter().map(|r| r.distance_km).collect();
    assert_eq!(distances, vec![1.1, 3.0, 5.2]);
}

#[test]
fn rating_sort_places_unrated_last() {
    let mut records = vec![
        rec("unrated", "", 0.0, 0.5),
        rec("great", "", 4.8, 9.0),
        rec("fine", "", 3.1, 2.0),
    ];
    sort_records(&mut records, SortKey::Rating);
    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["great", "fine", "unrated"]);
}

#[test]
fn filter_matches_name_or_address_case_insensitively() {
    let records = vec![
        rec("GreenCycle", "12 Oak Street", 4.0, 1.0),
        rec("E-Waste Hub", "9 ELM Avenue", 4.0, 2.0),
    ];

    let by_name = filter_records(&records, "greencycle");
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].name, "GreenCycle");

    // Matching only the address still returns the record.
    let by_address = filter_records(&records, "elm");
    assert_eq!(by_address.len(), 1);
    assert_eq!(by_address[0].name, "E-Waste Hub");

    assert_eq!(filter_records(&records, "").len(), 2);
    assert!(filter_records(&records, "nothing here").is_empty());
}

#[test]
fn position_sources_in_order() {
    let geo = Geo {
        latitude: Some(48.1),
        longitude: Some(11.5),
    };

    let explicit = GeoPosition {
        latitude: 52.52,
        longitude: 13.405,
    };
    let pos = resolve_position(Some(explicit), Some("1.0,2.0"), &geo).unwrap();
    assert_eq!(pos, explicit);

    let pos = resolve_position(None, Some("52.52, 13.405"), &geo).unwrap();
    assert_eq!(pos.latitude, 52.52);
    assert_eq!(pos.longitude, 13.405);

    let pos = resolve_position(None, None, &geo).unwrap();
    assert_eq!(pos.latitude, 48.1);
}

#[test]
fn no_position_source_is_unsupported() {
    let err = resolve_position(None, None, &Geo::default()).unwrap_err();
    assert!(matches!(err, ScanError::GeolocationUnsupported));
}

#[test]
fn broken_position_source_is_unavailable() {
    let err = resolve_position(None, Some("somewhere nice"), &Geo::default()).unwrap_err();
    assert!(matches!(err, ScanError::LocationUnavailable(_)));

    let err = resolve_position(
        Some(GeoPosition {
            latitude: 95.0,
            longitude: 0.0,
        }),
        None,
        &Geo::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ScanError::LocationUnavailable(_)));
}

#[tokio::test]
async fn panel_toggle_is_idempotent_show_hide() {
    let calls = AtomicUsize::new(0);
    let mut panel = RecyclerPanel::default();

    let fetch = || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Ok(vec![rec("GreenCycle", "12 Oak St", 4.0, 1.0)]) }
    };

    assert!(panel.toggle(fetch).await.unwrap());
    assert!(panel.is_expanded());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(panel.records().len(), 1);

    // Collapsing re-queries nothing and keeps the cached list.
    let fetch = || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Ok(vec![]) }
    };
    assert!(!panel.toggle(fetch).await.unwrap());
    assert!(!panel.is_expanded());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(panel.records().len(), 1);

    // Expanding again queries afresh.
    let fetch = || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Ok(vec![]) }
    };
    assert!(panel.toggle(fetch).await.unwrap());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(panel.records().is_empty());
}

#[tokio::test]
async fn failed_lookup_leaves_panel_collapsed() {
    let mut panel = RecyclerPanel::default();
    let err = panel
        .toggle(|| async { Err(ScanError::RecyclerLookupFailed("backend down".into())) })
        .await
        .unwrap_err();
    assert!(matches!(err, ScanError::RecyclerLookupFailed(_)));
    assert!(!panel.is_expanded());
    assert!(panel.records().is_empty());
}
