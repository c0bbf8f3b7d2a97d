use std::fmt::{Debug, Formatter};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, error};

use crate::config::{cpl_error, find_config_option, get_config_bool};
use crate::errors::*;
use crate::spatial_ref::SpatialRef;
use crate::vector::defn::check_permutation;
use crate::vector::shape::dbf::{DbfFile, MAX_FIELD_NAME_LEN, MAX_FIELD_WIDTH};
use crate::vector::shape::shape2ogr::{derive_feature_schema, read_feature, read_geometry, write_feature};
use crate::vector::shape::shp::{sibling, ShapeType, ShpFile};
use crate::vector::{
    field_type_to_name, AlterFieldFlags, Defn, Feature, FieldDefn, Geometry, LayerAccess,
    LayerCaps, LayerOptions, OGREnvelope, OGRFieldType, OGRwkbGeometryType, OpenFlags,
    SpecialField,
};

/// A layer stored as a `.shp`/`.shx`/`.dbf` file set, with an optional
/// `.prj`.
///
/// Changes are written through as they are made. Headers are brought up to
/// date by [`LayerAccess::sync_to_disk`], which also runs when the layer is
/// dropped. Deleted features stay in the files, flagged in the `.dbf`, until
/// [`ShapeLayer::repack`] or the drop of the layer.
pub struct ShapeLayer {
    path: PathBuf,
    shp: ShpFile,
    dbf: DbfFile,
    defn: Rc<Defn>,
    update: bool,
    next_index: usize,
    spatial_filter: Option<Geometry>,
    needs_repack: bool,
    auto_repack: bool,
    truncation_warned: bool,
}

impl Debug for ShapeLayer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapeLayer")
            .field("path", &self.path)
            .field("shape_type", &self.shp.shape_type())
            .field("records", &self.dbf.record_count())
            .field("update", &self.update)
            .finish()
    }
}

fn layer_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_string()
}

fn shp_path(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension("shp")
    }
}

impl ShapeLayer {
    /// Create a new, empty layer at `path`, overwriting existing files.
    ///
    /// The shape type follows `options.ty`, unless overridden by a `SHPT`
    /// creation option such as `SHPT=ARCZ`. A layer created with
    /// `wkbUnknown` takes the type of the first feature written.
    ///
    /// Text is stored as UTF-8, named in a `.cpg` file. An `ENCODING`
    /// creation option, or else the `SHAPE_ENCODING` configuration option,
    /// picks another code page; `LDID/<n>` values go to the DBF header
    /// instead, and an empty value stores text unconverted.
    pub fn create(path: impl AsRef<Path>, options: &LayerOptions) -> Result<ShapeLayer> {
        let path = shp_path(path.as_ref());
        let shpt = options.options.and_then(|o| o.fetch_name_value("SHPT"));
        let shape_type = match shpt {
            Some(name) => ShapeType::from_name(name).ok_or_else(|| {
                let msg = format!(
                    "Unknown SHPT value of `{name}' passed to Shapefile layer creation. \
                     Creation aborted."
                );
                cpl_error(CplErrType::Failure, cple::NOT_SUPPORTED, &msg);
                OgrError::BadArgument(msg)
            })?,
            None => ShapeType::from_geometry_type(options.ty).ok_or_else(|| {
                cpl_error(
                    CplErrType::Failure,
                    cple::NOT_SUPPORTED,
                    &format!(
                        "Geometry type of `{}' not supported in shapefiles. \
                         Type can be overridden with a layer creation option \
                         of SHPT=POINT/ARC/POLYGON/MULTIPOINT/POINTZ/ARCZ/POLYGONZ/MULTIPOINTZ/MULTIPATCH.",
                        crate::vector::geometry_type_to_name(options.ty)
                    ),
                );
                OgrError::UnsupportedGeometryType {
                    geometry_type: options.ty,
                    target: "shapefile",
                }
            })?,
        };

        let code_page = match options.options.and_then(|o| o.fetch_name_value("ENCODING")) {
            Some(encoding) => encoding.to_string(),
            None => find_config_option("SHAPE_ENCODING")?.unwrap_or_else(|| "UTF-8".to_string()),
        };

        let shp = ShpFile::create(&path, shape_type)?;
        let dbf = DbfFile::create_with_code_page(
            &sibling(&path, "dbf"),
            Some(code_page.as_str()).filter(|cp| !cp.is_empty()),
        )?;
        let name = if options.name.is_empty() {
            layer_name(&path)
        } else {
            options.name.to_string()
        };
        let mut defn = derive_feature_schema(&name, &shp, &dbf);
        if let Some(srs) = options.srs {
            fs::write(sibling(&path, "prj"), srs.to_wkt()?)?;
            defn.geom_field_defn_mut(0)?
                .set_spatial_ref(Some(Rc::new(srs.clone())));
        }
        debug!(path = %path.display(), shape_type = shape_type.name(), "created shape layer");
        Ok(ShapeLayer::new(path, shp, dbf, defn, true))
    }

    /// Open the layer stored at `path`, the `.shp` file of the set.
    ///
    /// A missing `.shx` is rebuilt when the `SHAPE_RESTORE_SHX` configuration
    /// option is set.
    pub fn open(path: impl AsRef<Path>, flags: OpenFlags) -> Result<ShapeLayer> {
        let path = shp_path(path.as_ref());
        let update = flags.contains(OpenFlags::UPDATE);
        let restore_shx = get_config_bool("SHAPE_RESTORE_SHX", false);
        let shp = ShpFile::open(&path, update, restore_shx)?;
        let dbf = DbfFile::open(&sibling(&path, "dbf"), update)?;

        let mut defn = derive_feature_schema(&layer_name(&path), &shp, &dbf);
        match fs::read_to_string(sibling(&path, "prj")) {
            Ok(wkt) => match SpatialRef::from_wkt(&wkt) {
                Ok(srs) => defn
                    .geom_field_defn_mut(0)?
                    .set_spatial_ref(Some(Rc::new(srs))),
                Err(e) => cpl_error(
                    CplErrType::Warning,
                    cple::APP_DEFINED,
                    &format!("Failed to parse .prj file, ignoring it: {e}"),
                ),
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        if shp.record_count() != dbf.record_count() {
            debug!(
                shapes = shp.record_count(),
                records = dbf.record_count(),
                "shape and attribute record counts differ"
            );
        }
        debug!(path = %path.display(), update, "opened shape layer");
        Ok(ShapeLayer::new(path, shp, dbf, defn, update))
    }

    fn new(path: PathBuf, shp: ShpFile, dbf: DbfFile, defn: Defn, update: bool) -> ShapeLayer {
        ShapeLayer {
            path,
            shp,
            dbf,
            defn: Rc::new(defn),
            update,
            next_index: 0,
            spatial_filter: None,
            needs_repack: false,
            auto_repack: get_config_bool("OGR_SHAPE_AUTO_REPACK", true),
            truncation_warned: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The shape type stored in the `.shp` header.
    pub fn shape_type(&self) -> ShapeType {
        self.shp.shape_type()
    }

    /// Name of the encoding attribute text is recoded from, `UTF-8` when
    /// it is not recoded.
    pub fn encoding(&self) -> &'static str {
        self.dbf.encoding().name()
    }

    fn total_count(&self) -> usize {
        self.shp.record_count()
    }

    fn check_writable(&self, method_name: &'static str) -> Result<()> {
        if self.update {
            Ok(())
        } else {
            cpl_error(
                CplErrType::Failure,
                cple::NOT_SUPPORTED,
                &format!(
                    "{method_name} : unsupported operation on a read-only datasource."
                ),
            );
            Err(OgrError::NotWritable {
                name: self.defn.name().to_string(),
                method_name,
            })
        }
    }

    /// Features written to the layer must follow its definition.
    fn check_schema(&self, feature: &Feature, method_name: &'static str) -> Result<()> {
        let defn = feature.defn();
        let compatible = Rc::ptr_eq(defn, &self.defn)
            || (defn.field_count() == self.defn.field_count()
                && defn
                    .fields()
                    .zip(self.defn.fields())
                    .all(|(a, b)| a.field_type() == b.field_type()));
        if compatible {
            return Ok(());
        }
        let msg = format!(
            "{method_name}: feature schema with {} fields does not match layer {} with {} fields",
            defn.field_count(),
            self.defn.name(),
            self.defn.field_count()
        );
        cpl_error(CplErrType::Failure, cple::APP_DEFINED, &msg);
        Err(OgrError::BadArgument(msg))
    }

    fn existing_index(&self, fid: i64, method_name: &'static str) -> Result<usize> {
        usize::try_from(fid)
            .ok()
            .filter(|&index| index < self.total_count() && index < self.dbf.record_count())
            .ok_or_else(|| {
                cpl_error(
                    CplErrType::Failure,
                    cple::APP_DEFINED,
                    &format!("Attempt to access shape with feature id ({fid}) which does not exist."),
                );
                OgrError::OgrError {
                    err: OGRErr::NonExistingFeature,
                    method_name,
                }
            })
    }

    fn is_deleted(&mut self, index: usize) -> Result<bool> {
        if index < self.dbf.record_count() {
            self.dbf.is_deleted(index)
        } else {
            Ok(false)
        }
    }

    fn passes_filter(&mut self, index: usize) -> Result<bool> {
        let Some(filter) = &self.spatial_filter else {
            return Ok(true);
        };
        Ok(match read_geometry(&mut self.shp, index)? {
            Some(geometry) => geometry.intersects(filter),
            None => false,
        })
    }

    /// Change the shape type of a layer that holds no feature yet, by
    /// rewriting the shape type word of the `.shp` and `.shx` headers.
    pub fn reset_geom_type(&mut self, geom_type: OGRwkbGeometryType) -> Result<()> {
        self.check_writable("reset_geom_type")?;
        if self.total_count() > 0 {
            cpl_error(
                CplErrType::Failure,
                cple::NOT_SUPPORTED,
                "Cannot reset the geometry type of a layer holding features.",
            );
            return Err(OgrError::failure("reset_geom_type"));
        }
        let shape_type = ShapeType::from_geometry_type(geom_type).ok_or(
            OgrError::UnsupportedGeometryType {
                geometry_type: geom_type,
                target: "shapefile",
            },
        )?;
        let defn = Defn::make_mut(&mut self.defn)?;
        self.shp.set_shape_type(shape_type)?;
        defn.set_geom_type(shape_type.geometry_type());
        debug!(shape_type = shape_type.name(), "reset shape type");
        Ok(())
    }

    /// Physically remove deleted records, renumbering the remaining ones.
    pub fn repack(&mut self) -> Result<()> {
        self.check_writable("repack")?;
        let count = self.total_count().min(self.dbf.record_count());
        let mut keep = Vec::with_capacity(count);
        for index in 0..count {
            if !self.dbf.is_deleted(index)? {
                keep.push(index);
            }
        }
        self.shp.repack(&keep)?;
        self.dbf.repack(&keep)?;
        self.needs_repack = false;
        self.next_index = 0;
        debug!(path = %self.path.display(), records = keep.len(), "repacked shape layer");
        Ok(())
    }

    /// The geometry type of the first geometry written to a layer created
    /// with an unknown type.
    fn adopt_shape_type(&mut self, geometry: &Geometry) -> Result<()> {
        let shape_type = ShapeType::from_geometry_type(geometry.geometry_type()).ok_or(
            OgrError::UnsupportedGeometryType {
                geometry_type: geometry.geometry_type(),
                target: "shapefile",
            },
        )?;
        self.shp.set_shape_type(shape_type)?;
        if !self.defn.settle_geometry_type(shape_type.geometry_type()) {
            debug!(
                geometry_type = ?self.defn.geometry_type(),
                "layer definition keeps its geometry type"
            );
        }
        debug!(shape_type = shape_type.name(), "shape type set from first feature");
        Ok(())
    }

    /// DBF column for `field`: name, type code, width and decimals.
    fn dbf_column(&self, field: &FieldDefn, approx_ok: bool) -> Result<(String, u8, usize, usize)> {
        let width = usize::try_from(field.width()).unwrap_or(0);
        let precision = usize::try_from(field.precision()).unwrap_or(0);
        let (kind, width, decimals) = match field.field_type() {
            OGRFieldType::OFTInteger => (b'N', if width == 0 { 11 } else { width }, 0),
            OGRFieldType::OFTInteger64 => (b'N', if width == 0 { 18 } else { width }, 0),
            OGRFieldType::OFTReal => match width {
                0 => (b'N', 24, 15),
                _ => (b'N', width, precision),
            },
            OGRFieldType::OFTString => match width {
                0 => (b'C', 80, 0),
                w if w > MAX_FIELD_WIDTH => {
                    cpl_error(
                        CplErrType::Warning,
                        cple::APP_DEFINED,
                        &format!(
                            "Field {} of width {w} truncated to {MAX_FIELD_WIDTH}.",
                            field.name()
                        ),
                    );
                    (b'C', MAX_FIELD_WIDTH, 0)
                }
                w => (b'C', w, 0),
            },
            OGRFieldType::OFTDate => (b'D', 8, 0),
            OGRFieldType::OFTDateTime => {
                cpl_error(
                    CplErrType::Warning,
                    cple::NOT_SUPPORTED,
                    &format!(
                        "Field {} create as date field, though DateTime requested.",
                        field.name()
                    ),
                );
                (b'D', 8, 0)
            }
            field_type => {
                cpl_error(
                    CplErrType::Failure,
                    cple::NOT_SUPPORTED,
                    &format!(
                        "Can't create fields of type {} on shapefile layers.",
                        field_type_to_name(field_type)
                    ),
                );
                return Err(OgrError::UnhandledFieldType {
                    field_type,
                    method_name: "create_field",
                });
            }
        };

        let name = self.launder_name(field.name(), approx_ok)?;
        Ok((name, kind, width, decimals))
    }

    /// A DBF column name for `name`: cut to the DBF name length and, with
    /// `approx_ok`, made unique by a numeric suffix.
    fn launder_name(&self, name: &str, approx_ok: bool) -> Result<String> {
        let failed = || {
            cpl_error(
                CplErrType::Failure,
                cple::APP_DEFINED,
                &format!("Failed to add field named '{name}'"),
            );
            OgrError::InvalidFieldName {
                field_name: name.to_string(),
                method_name: "create_field",
            }
        };

        let mut laundered = truncate_to_boundary(name, MAX_FIELD_NAME_LEN).to_string();
        if laundered.is_empty() {
            return Err(failed());
        }
        if laundered != name && !approx_ok {
            return Err(failed());
        }
        if self.dbf.field_index(&laundered).is_some() {
            if !approx_ok {
                return Err(failed());
            }
            laundered = (1..100)
                .map(|i| {
                    let suffix = format!("_{i}");
                    let stem = truncate_to_boundary(name, MAX_FIELD_NAME_LEN - suffix.len());
                    format!("{stem}{suffix}")
                })
                .find(|candidate| self.dbf.field_index(candidate).is_none())
                .ok_or_else(failed)?;
        }
        if laundered != name {
            cpl_error(
                CplErrType::Warning,
                cple::APP_DEFINED,
                &format!("Normalized/laundered field name: '{name}' to '{laundered}'"),
            );
        }
        Ok(laundered)
    }
}

fn truncate_to_boundary(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

impl LayerAccess for ShapeLayer {
    fn defn(&self) -> &Rc<Defn> {
        &self.defn
    }

    fn reset_reading(&mut self) {
        self.next_index = 0;
    }

    fn get_next_feature(&mut self) -> Result<Option<Feature>> {
        while self.next_index < self.total_count() {
            let index = self.next_index;
            self.next_index += 1;
            if self.is_deleted(index)? || !self.passes_filter(index)? {
                continue;
            }
            return read_feature(&mut self.shp, &mut self.dbf, &self.defn, index).map(Some);
        }
        Ok(None)
    }

    fn feature(&mut self, fid: i64) -> Result<Option<Feature>> {
        let index = match usize::try_from(fid) {
            Ok(index) if index < self.total_count() => index,
            _ => return Ok(None),
        };
        if self.is_deleted(index)? {
            return Ok(None);
        }
        read_feature(&mut self.shp, &mut self.dbf, &self.defn, index).map(Some)
    }

    fn feature_count(&mut self) -> Result<u64> {
        let mut count = 0;
        for index in 0..self.total_count() {
            if !self.is_deleted(index)? && self.passes_filter(index)? {
                count += 1;
            }
        }
        Ok(count)
    }

    fn get_extent(&self) -> Result<OGREnvelope> {
        Ok(self.shp.extent())
    }

    fn set_spatial_filter(&mut self, geometry: &Geometry) {
        self.spatial_filter = Some(geometry.clone());
    }

    fn clear_spatial_filter(&mut self) {
        self.spatial_filter = None;
    }

    fn has_capability(&self, capability: LayerCaps) -> bool {
        match capability {
            LayerCaps::OLCRandomRead
            | LayerCaps::OLCFastGetExtent
            | LayerCaps::OLCIgnoreFields
            | LayerCaps::OLCStringsAsUTF8 => true,
            LayerCaps::OLCFastFeatureCount => self.spatial_filter.is_none(),
            LayerCaps::OLCFastSpatialFilter => false,
            LayerCaps::OLCSequentialWrite
            | LayerCaps::OLCRandomWrite
            | LayerCaps::OLCCreateField
            | LayerCaps::OLCDeleteField
            | LayerCaps::OLCReorderFields
            | LayerCaps::OLCAlterFieldDefn
            | LayerCaps::OLCDeleteFeature => self.update,
        }
    }

    fn set_ignored_fields(&mut self, names: &[&str]) -> Result<()> {
        let geometry = SpecialField::Geometry.name();
        let style = SpecialField::Style.name();
        let defn = Defn::make_mut(&mut self.defn)?;
        if let Some(unknown) = names.iter().find(|name| {
            **name != geometry && **name != style && defn.field_index(name).is_none()
        }) {
            return Err(OgrError::InvalidFieldName {
                field_name: unknown.to_string(),
                method_name: "set_ignored_fields",
            });
        }
        for index in 0..defn.field_count() {
            let field_name = defn.field_defn(index)?.name();
            let ignored = names.iter().any(|name| name.eq_ignore_ascii_case(field_name));
            defn.field_defn_mut(index)?.set_ignored(ignored);
        }
        defn.set_geometry_ignored(names.contains(&geometry));
        defn.set_style_ignored(names.contains(&style));
        Ok(())
    }

    fn create_feature(&mut self, feature: &mut Feature) -> Result<()> {
        self.check_writable("create_feature")?;
        self.check_schema(feature, "create_feature")?;
        feature.set_fid(None);
        if self.shp.shape_type() == ShapeType::Null && self.total_count() == 0 {
            if let Some(geometry) = feature.geometry().filter(|g| !g.is_empty()) {
                self.adopt_shape_type(geometry)?;
            }
        }
        let index = write_feature(
            &mut self.shp,
            &mut self.dbf,
            &self.defn,
            feature,
            &mut self.truncation_warned,
        )?;
        feature.set_fid(Some(index as i64));
        Ok(())
    }

    fn set_feature(&mut self, feature: &Feature) -> Result<()> {
        self.check_writable("set_feature")?;
        self.check_schema(feature, "set_feature")?;
        let fid = feature.fid().ok_or_else(|| {
            cpl_error(
                CplErrType::Failure,
                cple::APP_DEFINED,
                "set_feature() with unset FID fails.",
            );
            OgrError::OgrError {
                err: OGRErr::NonExistingFeature,
                method_name: "set_feature",
            }
        })?;
        self.existing_index(fid, "set_feature")?;
        write_feature(
            &mut self.shp,
            &mut self.dbf,
            &self.defn,
            feature,
            &mut self.truncation_warned,
        )?;
        Ok(())
    }

    fn delete_feature(&mut self, fid: i64) -> Result<()> {
        self.check_writable("delete_feature")?;
        let index = self.existing_index(fid, "delete_feature")?;
        if self.dbf.is_deleted(index)? {
            cpl_error(
                CplErrType::Failure,
                cple::APP_DEFINED,
                &format!("Attempt to delete shape in .dbf file that is already deleted ({fid})."),
            );
            return Err(OgrError::OgrError {
                err: OGRErr::NonExistingFeature,
                method_name: "delete_feature",
            });
        }
        self.dbf.set_deleted(index, true)?;
        self.needs_repack = true;
        Ok(())
    }

    fn create_field(&mut self, field: &FieldDefn, approx_ok: bool) -> Result<()> {
        self.check_writable("create_field")?;
        if self.total_count() > 0 || self.dbf.record_count() > 0 {
            cpl_error(
                CplErrType::Failure,
                cple::NOT_SUPPORTED,
                "Can't create fields on a Shapefile layer with features.",
            );
            return Err(OgrError::failure("create_field"));
        }
        let (name, kind, width, decimals) = self.dbf_column(field, approx_ok)?;
        let defn = Defn::make_mut(&mut self.defn)?;
        self.dbf.add_field(&name, kind, width, decimals)?;

        let mut stored = FieldDefn::from_prototype(field);
        stored.set_name(&name);
        stored.set_width(width as i32);
        stored.set_precision(decimals as i32);
        if kind == b'D' {
            stored.set_field_type(OGRFieldType::OFTDate);
        }
        defn.add_field_defn(&stored);
        Ok(())
    }

    fn delete_field(&mut self, index: usize) -> Result<()> {
        self.check_writable("delete_field")?;
        if index >= self.defn.field_count() {
            return Err(OgrError::InvalidFieldIndex {
                index,
                method_name: "delete_field",
            });
        }
        let defn = Defn::make_mut(&mut self.defn)?;
        self.dbf.delete_field(index)?;
        defn.delete_field_defn(index)
    }

    fn reorder_fields(&mut self, new_order: &[usize]) -> Result<()> {
        self.check_writable("reorder_fields")?;
        check_permutation(new_order, self.defn.field_count())?;
        let defn = Defn::make_mut(&mut self.defn)?;
        self.dbf.reorder_fields(new_order)?;
        defn.reorder_field_defns(new_order)
    }

    /// Only integer to 64 bit integer and any type to string conversions
    /// are supported. Names are cut to the DBF name length.
    fn alter_field_defn(
        &mut self,
        index: usize,
        new_defn: &FieldDefn,
        flags: AlterFieldFlags,
    ) -> Result<()> {
        self.check_writable("alter_field_defn")?;
        let column = match self.dbf.field(index) {
            Some(column) if index < self.defn.field_count() => column.clone(),
            _ => {
                cpl_error(CplErrType::Failure, cple::NOT_SUPPORTED, "Invalid field index");
                return Err(OgrError::InvalidFieldIndex {
                    index,
                    method_name: "alter_field_defn",
                });
            }
        };

        let old_type = self.defn.field_defn(index)?.field_type();
        let mut field_type = old_type;
        let mut kind = column.kind;
        if flags.contains(AlterFieldFlags::TYPE) && new_defn.field_type() != old_type {
            match new_defn.field_type() {
                OGRFieldType::OFTInteger64 if old_type == OGRFieldType::OFTInteger => {}
                OGRFieldType::OFTString => kind = b'C',
                _ => {
                    cpl_error(
                        CplErrType::Failure,
                        cple::NOT_SUPPORTED,
                        "Can only convert to OFTString",
                    );
                    return Err(OgrError::failure("alter_field_defn"));
                }
            }
            field_type = new_defn.field_type();
        }

        let mut name = column.name.clone();
        if flags.contains(AlterFieldFlags::NAME) {
            name = truncate_to_boundary(new_defn.name(), MAX_FIELD_NAME_LEN).to_string();
            let taken = self.dbf.field_index(&name).is_some_and(|i| i != index);
            if name.is_empty() || taken {
                cpl_error(
                    CplErrType::Failure,
                    cple::APP_DEFINED,
                    &format!("Failed to rename field to '{}'", new_defn.name()),
                );
                return Err(OgrError::InvalidFieldName {
                    field_name: new_defn.name().to_string(),
                    method_name: "alter_field_defn",
                });
            }
        }

        let (mut width, mut decimals) = (column.width, column.decimals);
        if flags.contains(AlterFieldFlags::WIDTH_PRECISION) {
            width = usize::try_from(new_defn.width()).unwrap_or(0);
            decimals = usize::try_from(new_defn.precision()).unwrap_or(0);
        }
        if kind == b'C' {
            decimals = 0;
        }

        let defn = Defn::make_mut(&mut self.defn)?;
        self.dbf.alter_field(index, &name, kind, width, decimals)?;
        let width = self.dbf.field(index).map_or(width, |c| c.width);
        let field = defn.field_defn_mut(index)?;
        field.set_field_type(field_type);
        field.set_name(&name);
        field.set_width(width as i32);
        field.set_precision(decimals as i32);
        Ok(())
    }

    fn sync_to_disk(&mut self) -> Result<()> {
        if !self.update {
            return Ok(());
        }
        self.shp.sync()?;
        self.dbf.sync()
    }
}

impl Drop for ShapeLayer {
    /// Deleted records are dropped from the files at this point, unless
    /// `OGR_SHAPE_AUTO_REPACK` is off.
    fn drop(&mut self) {
        if self.update && self.needs_repack && self.auto_repack {
            if let Err(e) = self.repack() {
                error!(path = %self.path.display(), "failed to repack shape layer: {e}");
            }
        }
        if let Err(e) = self.sync_to_disk() {
            error!(path = %self.path.display(), "failed to sync shape layer: {e}");
        }
    }
}
