use std::sync::Arc;

use nitrite::{
    collection::{FindPlan, NitriteId},
    common::{FieldValues, Value},
    errors::{ErrorKind, NitriteError, NitriteResult},
    index::IndexDescriptor,
    nitrite_config::NitriteConfig,
    store::NitriteStore,
};

use crate::{
    disk_rtree::{Cell, Constraint, CoordKind, IntersectsCallback, MatchPredicate, RTree, SpatialError},
    filter::{as_spatial_filter, is_spatial_filter, value_to_geometry},
    BoundingBox, Geometry,
};

/// Number of dimensions every spatial index is opened with. Nitrite's
/// spatial indexer only ever stores 2D bounding boxes, so the tree
/// underneath is always bound at N=2.
const NDIM: usize = 2;
const DEFAULT_PAGE_SIZE: usize = 4096;

fn to_nitrite_error(err: SpatialError) -> NitriteError {
    NitriteError::new(&err.to_string(), ErrorKind::Extension("Spatial".to_string()))
}

/// A spatial index instance for a specific field.
/// Uses Pimpl pattern for cheap cloning and encapsulation.
#[derive(Clone)]
pub struct SpatialIndex {
    inner: Arc<SpatialIndexInner>,
}

/// Private implementation details of SpatialIndex.
struct SpatialIndexInner {
    index_descriptor: IndexDescriptor,
    rtree: RTree,
    store: NitriteStore,
    collection_name: String,
}

impl SpatialIndex {
    pub fn new(index_descriptor: IndexDescriptor, store: NitriteStore) -> NitriteResult<Self> {
        let base_name = derive_index_map_name(&index_descriptor);
        let collection_name = index_descriptor.collection_name().to_string();

        let rtree = match RTree::connect(&store, &base_name, NDIM, CoordKind::Float32, DEFAULT_PAGE_SIZE) {
            Ok(tree) => tree,
            Err(SpatialError::Corruption(_)) => {
                RTree::create(&store, &base_name, NDIM, CoordKind::Float32, DEFAULT_PAGE_SIZE).map_err(to_nitrite_error)?
            }
            Err(e) => return Err(to_nitrite_error(e)),
        };

        Ok(Self {
            inner: Arc::new(SpatialIndexInner {
                index_descriptor,
                rtree,
                store,
                collection_name,
            }),
        })
    }

    pub fn write(&self, field_values: &FieldValues) -> NitriteResult<()> {
        let fields = field_values.fields();
        let field_names = fields.field_names();

        if field_names.is_empty() {
            return Ok(());
        }

        let first_field = &field_names[0];
        let value = field_values.get_value(first_field);
        let nitrite_id = field_values.nitrite_id().id_value();

        let bbox = bbox_for_value(value);
        let rowid = nitrite_id as i64;

        self.inner
            .rtree
            .insert(rowid, &bbox_to_coords(&bbox))
            .map_err(to_nitrite_error)
    }

    pub fn remove(&self, field_values: &FieldValues) -> NitriteResult<()> {
        let fields = field_values.fields();
        let field_names = fields.field_names();

        if field_names.is_empty() {
            return Ok(());
        }

        let nitrite_id = field_values.nitrite_id().id_value();
        let rowid = nitrite_id as i64;

        self.inner.rtree.remove(rowid).map_err(to_nitrite_error)?;
        Ok(())
    }

    pub fn find_nitrite_ids(
        &self,
        find_plan: &FindPlan,
        config: &NitriteConfig,
    ) -> NitriteResult<Vec<NitriteId>> {
        let index_scan_filter = find_plan
            .index_scan_filter()
            .ok_or_else(|| NitriteError::new("No spatial filter found", ErrorKind::FilterError))?;

        let filters = index_scan_filter.filters();

        if filters.is_empty() {
            return Err(NitriteError::new("No spatial filter found", ErrorKind::FilterError));
        }

        let filter = &filters[0];

        if !is_spatial_filter(filter) {
            return Err(NitriteError::new(
                "Spatial filter must be the first filter for index scan",
                ErrorKind::FilterError,
            ));
        }

        let spatial_filter = as_spatial_filter(filter)
            .ok_or_else(|| NitriteError::new("Failed to get spatial filter", ErrorKind::FilterError))?;

        let search_geometry = spatial_filter.geometry();
        let search_bbox = search_geometry.bounding_box();

        // Phase 1: R-tree bounding box search. Intersects and Within both
        // narrow on the same overlap test; the exact predicate is applied
        // in phase 2 against the stored geometry.
        let candidates = self
            .inner
            .rtree
            .query(vec![bbox_overlap_constraint(&search_bbox)])
            .map_err(to_nitrite_error)?;

        // Phase 2: geometry refinement against the precise predicate.
        let mut results = Vec::new();
        for cell in candidates {
            let nitrite_id = NitriteId::create_id(cell.rowid as u64)?;
            if let Some(stored_geom) = self.get_stored_geometry(&nitrite_id, config)? {
                if spatial_filter.matches_geometry(&stored_geom) {
                    results.push(nitrite_id);
                }
            }
        }

        Ok(results)
    }

    /// Retrieves the stored geometry for a document.
    /// This is used in Phase 2 of the two-phase query for precise filtering.
    fn get_stored_geometry(
        &self,
        nitrite_id: &NitriteId,
        config: &NitriteConfig,
    ) -> NitriteResult<Option<Geometry>> {
        let field_names = self.inner.index_descriptor.index_fields().field_names();

        if field_names.is_empty() {
            return Ok(None);
        }

        let collection_name = &self.inner.collection_name;
        let nitrite_map = config
            .nitrite_store()
            .and_then(|store| store.open_map(collection_name))?;

        let document_opt = nitrite_map.get(&Value::NitriteId(nitrite_id.clone()))?;

        if let Some(value) = document_opt {
            let first_field = &field_names[0];
            return match value {
                Value::Document(doc) => {
                    let geom_value = doc.get(first_field)?;
                    value_to_geometry(&geom_value).map(Some).ok_or_else(|| {
                        NitriteError::new(
                            "Failed to convert stored value to geometry",
                            ErrorKind::Extension("Spatial".to_string()),
                        )
                    })
                }
                _ => Ok(None),
            };
        };

        Ok(None)
    }

    pub fn close(&self) -> NitriteResult<()> {
        Ok(())
    }

    pub fn drop(&self) -> NitriteResult<()> {
        let base_name = derive_index_map_name(&self.inner.index_descriptor);
        RTree::destroy(&self.inner.store, &base_name).map_err(to_nitrite_error)
    }
}

fn bbox_for_value(value: Option<&Value>) -> BoundingBox {
    match value {
        Some(v) => value_to_geometry(v).map(|g| g.bounding_box()).unwrap_or_default(),
        None => BoundingBox::default(),
    }
}

/// Converts a 2D bounding box into the tree's `[lo_0, hi_0, lo_1, hi_1]`
/// cell coordinate layout (dimension 0 = x, dimension 1 = y).
fn bbox_to_coords(bbox: &BoundingBox) -> [f64; 4] {
    [bbox.min_x, bbox.max_x, bbox.min_y, bbox.max_y]
}

fn bbox_overlap_constraint(bbox: &BoundingBox) -> Constraint {
    let coords = bbox_to_coords(bbox);
    let target = Cell::new(0, &coords);
    let callback = Arc::new(IntersectsCallback { target });
    Constraint::Match(MatchPredicate::new(callback, coords.to_vec()))
}

/// Derives the index map name from an index descriptor.
pub(crate) fn derive_index_map_name(descriptor: &IndexDescriptor) -> String {
    let collection = descriptor.collection_name();
    let fields = descriptor.index_fields().field_names().join("_");
    let index_type = descriptor.index_type();
    format!("{}_{}_{}_{}", collection, fields, index_type, "idx")
}
