use bitflags::bitflags;

use crate::cpl::CslStringList;
use crate::spatial_ref::SpatialRef;
use crate::vector::OGRwkbGeometryType;

/// Parameters for [`crate::vector::ShapeLayer::create`].
#[derive(Clone, Debug)]
pub struct LayerOptions<'a> {
    /// The name of the newly created layer. When empty, the file stem is used.
    pub name: &'a str,
    /// The SRS of the newly created layer, written to the `.prj` file, or
    /// `None` for no SRS.
    pub srs: Option<&'a SpatialRef>,
    /// The type of geometry for the new layer.
    pub ty: OGRwkbGeometryType,
    /// Additional creation options, such as `SHPT=ARCZ`.
    pub options: Option<&'a CslStringList>,
}

const EMPTY_LAYER_NAME: &str = "";

impl Default for LayerOptions<'_> {
    /// Returns creation options for a new layer with no name, no SRS and unknown geometry type.
    fn default() -> Self {
        LayerOptions {
            name: EMPTY_LAYER_NAME,
            srs: None,
            ty: OGRwkbGeometryType::wkbUnknown,
            options: None,
        }
    }
}

bitflags! {
    /// Open flags used by [`crate::vector::ShapeLayer::open`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct OpenFlags: u32 {
        /// Open in read-only mode (default).
        const READONLY = 0x00;
        /// Open in update mode.
        const UPDATE = 0x01;
    }
}

impl Default for OpenFlags {
    fn default() -> OpenFlags {
        OpenFlags::READONLY
    }
}

bitflags! {
    /// Parts of a field definition changed by
    /// [`crate::vector::LayerAccess::alter_field_defn`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct AlterFieldFlags: u32 {
        const NAME = 0x01;
        const TYPE = 0x02;
        const WIDTH_PRECISION = 0x04;
        const ALL = Self::NAME.bits() | Self::TYPE.bits() | Self::WIDTH_PRECISION.bits();
    }
}
