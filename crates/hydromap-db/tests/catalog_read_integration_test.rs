//! Integration tests for the perceptual model and taxonomy repositories.
//!
//! Run with a live PostgreSQL instance:
//! `cargo test -- --ignored`

use hydromap_db::test_fixtures::TestDatabase;
use hydromap_db::{Error, PerceptualModelRepository, TaxonomyRepository};
use hydromap_geo::{project_feature, GeoJsonGeometry};

#[tokio::test]
#[ignore = "requires a live database"]
async fn test_list_and_get_models() {
    let test_db = TestDatabase::new().await;
    let seed = test_db.seed_catalog().await;

    let models = test_db.db.perceptual_models.list().await.unwrap();
    assert_eq!(models.len(), 3);

    let model = test_db
        .db
        .perceptual_models
        .get(seed.model_infiltration)
        .await
        .unwrap()
        .expect("seeded model should exist");
    assert_eq!(model.location_id, seed.location_maimai);
    assert_eq!(model.model_type_id, Some(seed.type_infiltration));

    assert!(test_db
        .db
        .perceptual_models
        .get(999_999)
        .await
        .unwrap()
        .is_none());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a live database"]
async fn test_relation_getters() {
    let test_db = TestDatabase::new().await;
    let seed = test_db.seed_catalog().await;
    let repo = &test_db.db.perceptual_models;

    // Exactly one citation object, never a list
    let citation = repo
        .citation(seed.model_infiltration)
        .await
        .unwrap()
        .expect("citation is a required relation");
    assert_eq!(citation.id, seed.citation_mcglynn);

    let location = repo.location(seed.model_infiltration).await.unwrap().unwrap();
    assert_eq!(location.country.as_deref(), Some("New Zealand"));

    let spatial = repo
        .spatial_zone_type(seed.model_infiltration)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(spatial.spatial_property.as_deref(), Some("hillslope"));

    // Optional relation absent yields None, not an error
    assert!(repo.model_type(seed.model_untyped).await.unwrap().is_none());

    // Missing model id is NotFound, not None
    let err = repo.citation(999_999).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)), "got {:?}", err);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a live database"]
async fn test_process_taxonomies_carry_link_annotations() {
    let test_db = TestDatabase::new().await;
    let seed = test_db.seed_catalog().await;

    let linked = test_db
        .db
        .perceptual_models
        .process_taxonomies(seed.model_infiltration)
        .await
        .unwrap();
    assert_eq!(linked.len(), 2);
    let macropore = linked
        .iter()
        .find(|l| l.taxonomy.id == seed.taxonomy_macropore)
        .unwrap();
    assert_eq!(
        macropore.original_text.as_deref(),
        Some("rapid lateral flow through old root channels")
    );

    // A model with no links gets an empty list, not an error
    let unlinked = test_db
        .db
        .perceptual_models
        .process_taxonomies(seed.model_untyped)
        .await
        .unwrap();
    assert!(unlinked.is_empty());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a live database"]
async fn test_bundles_resolve_every_relation() {
    let test_db = TestDatabase::new().await;
    let seed = test_db.seed_catalog().await;

    let bundle = test_db
        .db
        .perceptual_models
        .get_bundle(seed.model_infiltration)
        .await
        .unwrap()
        .expect("seeded model should exist");
    assert_eq!(bundle.location.id, seed.location_maimai);
    assert_eq!(bundle.citation.id, seed.citation_mcglynn);
    assert_eq!(
        bundle.model_type.as_ref().and_then(|t| t.name.clone()),
        Some("Infiltration".to_string())
    );
    assert_eq!(bundle.process_taxonomies.len(), 2);

    let bundles = test_db.db.perceptual_models.list_bundles().await.unwrap();
    assert_eq!(bundles.len(), 3);
    let untyped = bundles
        .iter()
        .find(|b| b.model.id == seed.model_untyped)
        .unwrap();
    assert!(untyped.model_type.is_none());
    assert!(untyped.process_taxonomies.is_empty());

    assert!(test_db
        .db
        .perceptual_models
        .get_bundle(999_999)
        .await
        .unwrap()
        .is_none());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a live database"]
async fn test_geojson_projection_round_trips_stored_point() {
    let test_db = TestDatabase::new().await;
    let seed = test_db.seed_catalog().await;

    let bundle = test_db
        .db
        .perceptual_models
        .get_bundle(seed.model_infiltration)
        .await
        .unwrap()
        .unwrap();

    let first = project_feature(&bundle).unwrap();
    let second = project_feature(&bundle).unwrap();
    assert_eq!(first, second);

    // Coordinates equal the decoded value of the stored point
    assert_eq!(
        first.geometry,
        GeoJsonGeometry::Point {
            coordinates: [171.8, -42.08]
        }
    );
    assert_eq!(first.properties["citation"]["id"], seed.citation_mcglynn);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a live database"]
async fn test_taxonomy_listing_includes_function_and_alt_names() {
    let test_db = TestDatabase::new().await;
    let seed = test_db.seed_catalog().await;

    let entries = test_db.db.taxonomy.list().await.unwrap();
    assert_eq!(entries.len(), 2);

    let macropore = entries
        .iter()
        .find(|e| e.taxonomy.id == seed.taxonomy_macropore)
        .unwrap();
    assert_eq!(
        macropore.function_type.as_ref().and_then(|f| f.name.clone()),
        Some("Storage and release".to_string())
    );
    assert_eq!(macropore.process_alt_names.len(), 1);
    assert_eq!(
        macropore.process_alt_names[0].alternative_names,
        "preferential flow"
    );

    let subsurface = entries
        .iter()
        .find(|e| e.taxonomy.id == seed.taxonomy_subsurface)
        .unwrap();
    assert!(subsurface.process_alt_names.is_empty());

    let spatial = test_db.db.taxonomy.list_spatial_zones().await.unwrap();
    assert_eq!(spatial.len(), 2);
    let temporal = test_db.db.taxonomy.list_temporal_zones().await.unwrap();
    assert_eq!(temporal.len(), 2);

    test_db.cleanup().await;
}
