use serde_json::json;

use geoquiz::world::{
    geometry::{ConcatUnion, Geometry, GeometryOps},
    regions::{effective_country_id, Region, RegionCollection, SOMALIA_ID},
    topology::{TopoId, WorldTopology},
};

fn topo(geometries: serde_json::Value) -> WorldTopology {
    WorldTopology::from_value(json!({
        "type": "Topology",
        "objects": { "countries": { "type": "GeometryCollection", "geometries": geometries } }
    }))
}

fn region_ids(collection: &RegionCollection) -> Vec<Option<u32>> {
    collection.regions.iter().map(Region::numeric_id).collect()
}

#[test]
fn somaliland_is_merged_into_somalia_and_dropped() {
    let topo = topo(json!([
        { "type": "Polygon", "id": "404", "arcs": [[1]], "properties": { "name": "Kenya" } },
        { "type": "Polygon", "id": "706", "arcs": [[2]], "properties": { "name": "Somalia" } },
        { "type": "Polygon", "id": "906", "arcs": [[3]], "properties": { "name": "Somaliland" } }
    ]));

    let collection = RegionCollection::from_topology(&topo, &ConcatUnion);

    assert_eq!(collection.len(), 2);
    assert_eq!(region_ids(&collection), vec![Some(404), Some(706)]);

    let somalia = &collection.regions[1];
    assert_eq!(somalia.geometry.kind.as_deref(), Some("MultiPolygon"));
    let shape = somalia.geometry.shape.as_ref().expect("merged shape");
    assert_eq!(shape.as_array().map(Vec::len), Some(2));
}

#[test]
fn merge_falls_back_to_name_matching() {
    // Neither region carries a usable id; the parent matches by exact
    // name, the territory by substring.
    let topo = topo(json!([
        { "type": "Polygon", "id": "-99", "arcs": [[0]], "properties": { "name": "somalia" } },
        { "type": "Polygon", "arcs": [[1]], "properties": { "name": "Rep. of Somaliland" } }
    ]));

    let collection = RegionCollection::from_topology(&topo, &ConcatUnion);

    assert_eq!(collection.len(), 1);
    assert_eq!(collection.regions[0].name.as_deref(), Some("somalia"));
    assert_eq!(
        collection.regions[0].geometry.kind.as_deref(),
        Some("MultiPolygon")
    );
}

#[test]
fn dataset_without_the_split_passes_through_unchanged() {
    let topo = topo(json!([
        { "type": "Polygon", "id": "706", "arcs": [[0]], "properties": { "name": "Somalia" } },
        { "type": "Polygon", "id": "404", "arcs": [[1]], "properties": { "name": "Kenya" } }
    ]));

    let collection = RegionCollection::from_topology(&topo, &ConcatUnion);

    assert_eq!(collection.len(), 2);
    // Somalia's own geometry is untouched when there is nothing to merge.
    assert_eq!(collection.regions[0].geometry.kind.as_deref(), Some("Polygon"));
}

#[test]
fn malformed_documents_normalize_to_empty_collections() {
    for value in [
        json!("not a topology"),
        json!(42),
        json!({ "type": "Topology" }),
        json!({ "objects": {} }),
        json!({ "objects": { "countries": {} } }),
    ] {
        let topo = WorldTopology::from_value(value);
        let collection = RegionCollection::from_topology(&topo, &ConcatUnion);
        assert!(collection.is_empty());
    }
}

#[test]
fn effective_id_prefers_own_identifier() {
    let region = Region {
        id: Some(TopoId::Text("076".to_string())),
        name: Some("Brazil".to_string()),
        geometry: Geometry::default(),
    };
    assert_eq!(effective_country_id(&region), Some(76));
}

#[test]
fn effective_id_maps_leftover_somaliland_paths_to_somalia() {
    let region = Region {
        id: Some(TopoId::Text("-99".to_string())),
        name: Some("Somaliland".to_string()),
        geometry: Geometry::default(),
    };
    assert_eq!(effective_country_id(&region), Some(SOMALIA_ID));

    let unknown = Region {
        id: None,
        name: Some("Atlantis".to_string()),
        geometry: Geometry::default(),
    };
    assert_eq!(effective_country_id(&unknown), None);
}

#[test]
fn concat_union_flattens_polygons_into_a_multipolygon() {
    let a = Geometry {
        kind: Some("Polygon".to_string()),
        shape: Some(json!([[0, 1]])),
    };
    let b = Geometry {
        kind: Some("MultiPolygon".to_string()),
        shape: Some(json!([[[2]], [[3]]])),
    };

    let merged = ConcatUnion.merge(&a, &b);
    assert_eq!(merged.kind.as_deref(), Some("MultiPolygon"));
    assert!(!merged.is_degenerate());
    assert_eq!(
        merged.shape.and_then(|s| s.as_array().map(Vec::len)),
        Some(3)
    );
}
