use std::fmt::{Display, Formatter};

/// Type of an attribute field.
///
/// Discriminants are the classic OGR codes, which is what
/// [`OGRFieldType::from_code`] accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OGRFieldType {
    OFTInteger = 0,
    OFTIntegerList = 1,
    OFTReal = 2,
    OFTRealList = 3,
    OFTString = 4,
    OFTStringList = 5,
    /// Deprecated, never produced.
    OFTWideString = 6,
    /// Deprecated, never produced.
    OFTWideStringList = 7,
    OFTBinary = 8,
    OFTDate = 9,
    OFTTime = 10,
    OFTDateTime = 11,
    OFTInteger64 = 12,
    OFTInteger64List = 13,
}

impl OGRFieldType {
    pub fn from_code(code: i32) -> Option<OGRFieldType> {
        use OGRFieldType::*;
        let ty = match code {
            0 => OFTInteger,
            1 => OFTIntegerList,
            2 => OFTReal,
            3 => OFTRealList,
            4 => OFTString,
            5 => OFTStringList,
            6 => OFTWideString,
            7 => OFTWideStringList,
            8 => OFTBinary,
            9 => OFTDate,
            10 => OFTTime,
            11 => OFTDateTime,
            12 => OFTInteger64,
            13 => OFTInteger64List,
            _ => return None,
        };
        Some(ty)
    }

    pub fn is_list(self) -> bool {
        matches!(
            self,
            OGRFieldType::OFTIntegerList
                | OGRFieldType::OFTInteger64List
                | OGRFieldType::OFTRealList
                | OGRFieldType::OFTStringList
                | OGRFieldType::OFTWideStringList
        )
    }

    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            OGRFieldType::OFTDate | OGRFieldType::OFTTime | OGRFieldType::OFTDateTime
        )
    }
}

impl Display for OGRFieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(field_type_to_name(*self))
    }
}

/// Sub-type refining an [`OGRFieldType`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OGRFieldSubType {
    #[default]
    OFSTNone = 0,
    /// Only valid with `OFTInteger` and `OFTIntegerList`.
    OFSTBoolean = 1,
    /// Only valid with `OFTInteger` and `OFTIntegerList`.
    OFSTInt16 = 2,
    /// Only valid with `OFTReal` and `OFTRealList`.
    OFSTFloat32 = 3,
}

impl Display for OGRFieldSubType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(field_sub_type_to_name(*self))
    }
}

/// Display justification of a field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OGRJustification {
    #[default]
    OJUndefined = 0,
    OJLeft = 1,
    OJRight = 2,
}

/// Fetch human readable name for a field type.
pub fn field_type_to_name(ty: OGRFieldType) -> &'static str {
    use OGRFieldType::*;
    match ty {
        OFTInteger => "Integer",
        OFTInteger64 => "Integer64",
        OFTReal => "Real",
        OFTString => "String",
        OFTIntegerList => "IntegerList",
        OFTInteger64List => "Integer64List",
        OFTRealList => "RealList",
        OFTStringList => "StringList",
        OFTBinary => "Binary",
        OFTDate => "Date",
        OFTTime => "Time",
        OFTDateTime => "DateTime",
        OFTWideString | OFTWideStringList => "(unknown)",
    }
}

/// Fetch human readable name for a raw field type code, `(unknown)` when
/// the code does not map to a supported type.
pub fn field_type_code_to_name(code: i32) -> &'static str {
    OGRFieldType::from_code(code).map_or("(unknown)", field_type_to_name)
}

/// Fetch human readable name for a field sub-type.
pub fn field_sub_type_to_name(sub_type: OGRFieldSubType) -> &'static str {
    match sub_type {
        OGRFieldSubType::OFSTNone => "None",
        OGRFieldSubType::OFSTBoolean => "Boolean",
        OGRFieldSubType::OFSTInt16 => "Int16",
        OGRFieldSubType::OFSTFloat32 => "Float32",
    }
}

/// Whether a type and a sub-type can be combined.
pub fn are_type_subtype_compatible(ty: OGRFieldType, sub_type: OGRFieldSubType) -> bool {
    match sub_type {
        OGRFieldSubType::OFSTNone => true,
        OGRFieldSubType::OFSTBoolean | OGRFieldSubType::OFSTInt16 => {
            matches!(ty, OGRFieldType::OFTInteger | OGRFieldType::OFTIntegerList)
        }
        OGRFieldSubType::OFSTFloat32 => {
            matches!(ty, OGRFieldType::OFTReal | OGRFieldType::OFTRealList)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_names() {
        assert_eq!(field_type_to_name(OGRFieldType::OFTInteger64List), "Integer64List");
        assert_eq!(OGRFieldType::OFTDateTime.to_string(), "DateTime");
        assert_eq!(field_type_code_to_name(4), "String");
        assert_eq!(field_type_code_to_name(6), "(unknown)");
        assert_eq!(field_type_code_to_name(42), "(unknown)");
        assert_eq!(field_sub_type_to_name(OGRFieldSubType::OFSTFloat32), "Float32");
    }

    #[test]
    fn test_subtype_compatibility() {
        use OGRFieldSubType::*;
        use OGRFieldType::*;
        assert!(are_type_subtype_compatible(OFTInteger, OFSTBoolean));
        assert!(are_type_subtype_compatible(OFTIntegerList, OFSTInt16));
        assert!(!are_type_subtype_compatible(OFTInteger64, OFSTInt16));
        assert!(are_type_subtype_compatible(OFTRealList, OFSTFloat32));
        assert!(!are_type_subtype_compatible(OFTString, OFSTFloat32));
        assert!(are_type_subtype_compatible(OFTBinary, OFSTNone));
    }
}
