// Integration tests for SmartLiving
use smartliving::prelude::*;
use smartliving::{bootstrap, fit_and_save, restore, retrain};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CATALOG_CSV: &str = "\
No,Property_Type,Floor_Area,Amenities,Num_Rooms,Num_Bathrooms,Price,Latitude,Longitude,Location,Price_To_Income_Ratio,Smart_Living_Score
1,Apartment,850,\"['Gym', 'Parking']\",2,1,100000,29.76,-95.36,Houston,2.0,62.5
2,Apartment,900,\"['Gym', 'Pool']\",2,1,500000,29.75,-95.37,Houston,6.5,71.0
3,Apartment,1200,\"['Gym', 'Parking', 'Pool']\",3,2,1000000,29.74,-95.38,Houston,11.0,88.0
4,House,2400,\"['Garden', 'Parking']\",4,3,350000,30.27,-97.74,Austin,4.2,79.5
5,Condo,700,Gym,1,1,180000,29.70,-95.40,houston,,44.0
6,House,3100,\"['Pool', 'Garden']\",5,3,,30.26,-97.75,Austin,5.0,90.0
";

fn write_catalog(dir: &Path) -> PathBuf {
    let path = dir.join("properties.csv");
    fs::write(&path, CATALOG_CSV).unwrap();
    path
}

#[test]
fn test_csv_catalog_sanitation() {
    let dir = TempDir::new().unwrap();
    let catalog = Catalog::load(&CsvSource::new(write_catalog(dir.path()))).unwrap();

    // Row 6 has no price
    assert_eq!(catalog.ids(), vec![1, 2, 3, 4, 5]);
    assert!(catalog.columns().iter().any(|c| c == "floor_area_m2"));

    // Median floor area 900 stays in m2
    let record = catalog.get(4).unwrap();
    assert_eq!(record.floor_area_m2, Some(2400.0));
    assert_eq!(record.num_rooms, 4);
    assert_eq!(catalog.get(5).unwrap().price_to_income_ratio, None);
}

#[test]
fn test_bootstrap_fits_then_loads() {
    let dir = TempDir::new().unwrap();
    let source = CsvSource::new(write_catalog(dir.path()));
    let store = ArtifactStore::new(dir.path().join("models"));

    let first = bootstrap(&source, &store, RecommenderConfig::default()).unwrap();
    assert!(store.exists());

    let second = bootstrap(&source, &store, RecommenderConfig::default()).unwrap();
    let prefs = Preferences::new()
        .with_property_type("Apartment")
        .with_amenities("gym, pool");
    let weights = BlendWeights::default();

    assert_eq!(
        first.recommend_by_preferences(&prefs, 5, &weights).unwrap(),
        second.recommend_by_preferences(&prefs, 5, &weights).unwrap()
    );
}

#[test]
fn test_budget_scenario() {
    let dir = TempDir::new().unwrap();
    let source = CsvSource::new(write_catalog(dir.path()));
    let store = ArtifactStore::new(dir.path().join("models"));
    let service = bootstrap(&source, &store, RecommenderConfig::default()).unwrap();

    let prefs = Preferences::new()
        .with_property_type("Apartment")
        .with_location("Houston")
        .with_max_budget(400_000.0)
        .with_min_rooms(2.0);
    let results = service
        .recommend_by_preferences(&prefs, 10, &BlendWeights::default())
        .unwrap();

    let ids: Vec<PropertyId> = results.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1]);
}

#[test]
fn test_filter_correctness_from_json() {
    let dir = TempDir::new().unwrap();
    let source = CsvSource::new(write_catalog(dir.path()));
    let store = ArtifactStore::new(dir.path().join("models"));
    let service = bootstrap(&source, &store, RecommenderConfig::default()).unwrap();

    let prefs = Preferences::from_value(&serde_json::json!({
        "location": "HOUSTON",
        "max_budget": "600000",
        "amenities": ["Gym"],
        "unused_key": true
    }))
    .unwrap();
    let results = service
        .recommend_by_preferences(&prefs, 10, &BlendWeights::default())
        .unwrap();

    assert!(!results.is_empty());
    for r in &results {
        assert!(r.price <= 600_000.0);
        assert_eq!(r.location.as_deref().map(str::to_lowercase).as_deref(), Some("houston"));
    }
}

#[test]
fn test_similar_never_returns_query() {
    let dir = TempDir::new().unwrap();
    let source = CsvSource::new(write_catalog(dir.path()));
    let store = ArtifactStore::new(dir.path().join("models"));
    let service = bootstrap(&source, &store, RecommenderConfig::default()).unwrap();

    for id in 1..=5 {
        let results = service
            .recommend_similar(id, 3, &BlendWeights::default())
            .unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.id != id));
    }
    assert!(matches!(
        service.recommend_similar(6, 3, &BlendWeights::default()),
        Err(Error::PropertyNotFound(6))
    ));
}

#[test]
fn test_restore_survives_reordered_catalog() {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(dir.path().join("models"));
    let catalog = Catalog::load(&CsvSource::new(write_catalog(dir.path()))).unwrap();
    let fitted = fit_and_save(catalog.clone(), &store, RecommenderConfig::default()).unwrap();

    let reversed = Catalog::from_records(catalog.records().iter().rev().cloned().collect());
    let restored = restore(&reversed, &store, RecommenderConfig::default()).unwrap();

    assert_eq!(restored.index_to_id(), fitted.index_to_id());
    let weights = BlendWeights::default();
    assert_eq!(
        restored.recommend_similar(3, 2, &weights).unwrap(),
        fitted.recommend_similar(3, 2, &weights).unwrap()
    );
}

#[test]
fn test_bootstrap_refits_when_catalog_lacks_saved_id() {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(dir.path().join("models"));
    let source = CsvSource::new(write_catalog(dir.path()));
    bootstrap(&source, &store, RecommenderConfig::default()).unwrap();

    let smaller = MemorySource::new(
        Catalog::load(&source)
            .unwrap()
            .records()
            .iter()
            .take(3)
            .map(|r| {
                let mut row = serde_json::Map::new();
                row.insert("no".into(), r.id.into());
                row.insert("price".into(), r.price.into());
                row.insert("latitude".into(), r.latitude.into());
                row.insert("longitude".into(), r.longitude.into());
                row
            })
            .collect(),
    );
    let service = bootstrap(&smaller, &store, RecommenderConfig::default()).unwrap();

    assert_eq!(service.current().unwrap().catalog().len(), 3);
    assert_eq!(store.load_manifest().unwrap().index_to_id(), &[1, 2, 3]);
}

#[test]
fn test_bootstrap_refits_when_catalog_gains_listing() {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(dir.path().join("models"));
    let source = CsvSource::new(write_catalog(dir.path()));
    bootstrap(&source, &store, RecommenderConfig::default()).unwrap();

    let grown = dir.path().join("grown.csv");
    fs::write(
        &grown,
        format!("{}7,Studio,400,Gym,1,1,150000,29.77,-95.35,Houston,3.1,58.0\n", CATALOG_CSV),
    )
    .unwrap();
    let service = bootstrap(&CsvSource::new(&grown), &store, RecommenderConfig::default()).unwrap();

    assert_eq!(service.current().unwrap().catalog().len(), 6);
    assert!(store.load_manifest().unwrap().index_to_id().contains(&7));
    let results = service
        .recommend_similar(7, 3, &BlendWeights::default())
        .unwrap();
    assert_eq!(results.len(), 3);
}

#[test]
fn test_retrain_swaps_state() {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(dir.path().join("models"));
    let service = RecommenderService::new();
    assert!(matches!(
        service.recommend_similar(1, 3, &BlendWeights::default()),
        Err(Error::NotFitted)
    ));

    let source = CsvSource::new(write_catalog(dir.path()));
    retrain(&service, &source, &store, RecommenderConfig::default()).unwrap();

    assert!(service.is_ready());
    assert_eq!(service.current().unwrap().catalog().len(), 5);
}

#[test]
fn test_empty_catalog_is_config_error() {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(dir.path().join("models"));
    let source = MemorySource::new(vec![]);

    assert!(matches!(
        bootstrap(&source, &store, RecommenderConfig::default()),
        Err(Error::Config(_))
    ));
}

#[test]
fn test_json_lines_catalog() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("properties.jsonl");
    fs::write(
        &path,
        "{\"no\": 1, \"price\": 1000, \"latitude\": 1, \"longitude\": 2, \"amenities\": [\"Gym\"]}\n\
         {\"no\": 2, \"price\": 2000, \"latitude\": 1, \"longitude\": 2, \"amenities\": \"Pool\"}\n",
    )
    .unwrap();

    let source = smartliving::source_for_path(&path).unwrap();
    let store = ArtifactStore::new(dir.path().join("models"));
    let service = bootstrap(source.as_ref(), &store, RecommenderConfig::default()).unwrap();

    let results = service
        .recommend_similar(2, 5, &BlendWeights::default())
        .unwrap();
    let ids: Vec<PropertyId> = results.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1]);
}
