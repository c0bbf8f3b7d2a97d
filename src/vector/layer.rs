use std::rc::Rc;

use crate::config::cpl_error;
use crate::errors::*;
use crate::spatial_ref::SpatialRef;
use crate::vector::{
    AlterFieldFlags, Defn, Feature, FieldDefn, FieldValue, Geometry, OGREnvelope,
};

/// Layer capabilities, tested with [`LayerAccess::has_capability`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum LayerCaps {
    /// Features can be fetched by id.
    OLCRandomRead,
    /// New features can be appended.
    OLCSequentialWrite,
    /// Existing features can be rewritten.
    OLCRandomWrite,
    /// Counting features does not need a scan.
    OLCFastFeatureCount,
    /// The extent is known without a scan.
    OLCFastGetExtent,
    /// Spatial filters use an index.
    OLCFastSpatialFilter,
    OLCCreateField,
    OLCDeleteField,
    OLCReorderFields,
    /// Field names, types and widths can be changed.
    OLCAlterFieldDefn,
    OLCDeleteFeature,
    /// Fields can be skipped when reading.
    OLCIgnoreFields,
    /// String values are known to be UTF-8.
    OLCStringsAsUTF8,
}

/// Access to the features of a vector layer.
///
/// ```no_run
/// use ogr_shape::vector::{LayerAccess, OpenFlags, ShapeLayer};
///
/// let mut layer = ShapeLayer::open("roads.shp", OpenFlags::READONLY).unwrap();
/// for feature in layer.features() {
///     // do something with each feature
/// }
/// ```
pub trait LayerAccess: Sized {
    /// The definition shared by every feature of the layer.
    fn defn(&self) -> &Rc<Defn>;

    /// Get the name of this layer.
    fn name(&self) -> String {
        self.defn().name().to_string()
    }

    /// Restart sequential reading from the first feature.
    fn reset_reading(&mut self);

    /// The next feature in sequential order that passes the spatial filter,
    /// `None` at the end.
    fn get_next_feature(&mut self) -> Result<Option<Feature>>;

    /// Fetch a feature by id, `None` when no such feature exists.
    fn feature(&mut self, fid: i64) -> Result<Option<Feature>>;

    /// Iterate over all features in this layer, from the first one.
    fn features(&mut self) -> FeatureIterator<'_, Self> {
        self.reset_reading();
        FeatureIterator::_with_layer(self)
    }

    /// Number of features that pass the spatial filter.
    fn feature_count(&mut self) -> Result<u64>;

    /// The extent of the layer's geometries.
    fn get_extent(&self) -> Result<OGREnvelope>;

    /// Restrict reading to features whose geometry intersects `geometry`.
    fn set_spatial_filter(&mut self, geometry: &Geometry);

    fn clear_spatial_filter(&mut self);

    fn has_capability(&self, capability: LayerCaps) -> bool;

    /// Skip the named fields when reading features. `OGR_GEOMETRY` and
    /// `OGR_STYLE` stand for the geometry and the style string. Every field
    /// not listed is read again.
    fn set_ignored_fields(&mut self, names: &[&str]) -> Result<()>;

    /// Append `feature`, assigning its id.
    fn create_feature(&mut self, feature: &mut Feature) -> Result<()>;

    /// Rewrite the existing feature with the id of `feature`.
    fn set_feature(&mut self, feature: &Feature) -> Result<()>;

    fn delete_feature(&mut self, fid: i64) -> Result<()>;

    /// Add a field to the layer definition.
    ///
    /// With `approx_ok`, the layer may store a field that differs from the
    /// request (a shortened name, say) instead of failing.
    fn create_field(&mut self, field: &FieldDefn, approx_ok: bool) -> Result<()>;

    fn delete_field(&mut self, index: usize) -> Result<()>;

    /// Reorder fields: field `i` of the result is the current field
    /// `new_order[i]`.
    fn reorder_fields(&mut self, new_order: &[usize]) -> Result<()>;

    /// Change field `index` to match `new_defn`, for the parts of the
    /// definition selected by `flags`. Existing values are kept.
    fn alter_field_defn(
        &mut self,
        index: usize,
        new_defn: &FieldDefn,
        flags: AlterFieldFlags,
    ) -> Result<()>;

    /// Flush pending changes to storage.
    fn sync_to_disk(&mut self) -> Result<()>;

    /// The spatial reference of the first geometry field.
    fn spatial_ref(&self) -> Option<Rc<SpatialRef>> {
        self.defn()
            .geom_field_defn(0)
            .ok()
            .and_then(|field| field.spatial_ref().cloned())
    }

    /// Add one field per `(name, type)` pair.
    fn create_defn_fields(&mut self, fields_def: &[(&str, crate::vector::OGRFieldType)]) -> Result<()> {
        for (name, field_type) in fields_def {
            self.create_field(&FieldDefn::new(name, *field_type), false)?;
        }
        Ok(())
    }

    /// Append a feature built from `geometry` and the named field values.
    fn create_feature_fields(
        &mut self,
        geometry: Geometry,
        field_names: &[&str],
        values: &[FieldValue],
    ) -> Result<()> {
        let mut feature = Feature::new(self.defn());
        feature.set_geometry_directly(geometry)?;
        for (name, value) in field_names.iter().zip(values) {
            let index = feature
                .field_index(name)
                .ok_or_else(|| OgrError::InvalidFieldName {
                    field_name: name.to_string(),
                    method_name: "create_feature_fields",
                })?;
            feature.set_field(index, value)?;
        }
        self.create_feature(&mut feature)
    }
}

/// Sequential reader over the features of a layer.
///
/// Reading stops at the first error, after reporting it on the diagnostics
/// channel.
pub struct FeatureIterator<'a, L: LayerAccess> {
    layer: &'a mut L,
}

impl<L: LayerAccess> Iterator for FeatureIterator<'_, L> {
    type Item = Feature;

    #[inline]
    fn next(&mut self) -> Option<Feature> {
        match self.layer.get_next_feature() {
            Ok(feature) => feature,
            Err(e) => {
                cpl_error(CplErrType::Failure, cple::FILE_IO, &e.to_string());
                None
            }
        }
    }
}

impl<'a, L: LayerAccess> FeatureIterator<'a, L> {
    pub fn _with_layer(layer: &'a mut L) -> FeatureIterator<'a, L> {
        FeatureIterator { layer }
    }
}
